// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input and output port definitions.

use crate::block::BlockId;
use crate::data::{Data, DataKind, Metadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an input port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputId(pub Uuid);

impl InputId {
    /// Create a new random input ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InputId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for an output port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputId(pub Uuid);

impl OutputId {
    /// Create a new random output ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OutputId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Description of an input port to be created on a block.
#[derive(Debug, Clone)]
pub struct InputSpec {
    /// Port name
    pub name: String,
    /// Data kind this input requires
    pub kind: DataKind,
}

impl InputSpec {
    /// Create an input spec.
    pub fn new(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Convenience for the common signal-consuming input.
    pub fn signal(name: impl Into<String>) -> Self {
        Self::new(name, DataKind::Signal)
    }
}

/// Description of an output port to be created on a block.
#[derive(Debug, Clone)]
pub struct OutputSpec {
    /// Port name
    pub name: String,
    /// Data kind this output produces
    pub kind: DataKind,
    /// Initial metadata
    pub metadata: Metadata,
}

impl OutputSpec {
    /// Create an output spec.
    pub fn new(name: impl Into<String>, kind: DataKind, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            kind,
            metadata,
        }
    }

    /// Convenience for the common signal-producing output.
    pub fn signal(name: impl Into<String>) -> Self {
        Self::new(name, DataKind::Signal, Metadata::default())
    }
}

/// Which axes of an output's metadata are pinned by the user rather than
/// derived from upstream data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataMode {
    /// Abscissa quantity/symbol/unit are fixed
    pub abscissa_fixed: bool,
    /// Ordinate quantity/symbol/unit are fixed
    pub ordinate_fixed: bool,
}

/// A consuming port. Holds at most one connection.
#[derive(Debug)]
pub struct InputPort {
    /// Unique port ID
    pub id: InputId,
    /// Owning block
    pub block: BlockId,
    /// Port name
    pub name: String,
    /// Data kind this input requires
    pub kind: DataKind,
    /// The output currently feeding this input, if any
    pub(crate) connected: Option<OutputId>,
}

impl InputPort {
    pub(crate) fn new(block: BlockId, spec: InputSpec) -> Self {
        Self {
            id: InputId::new(),
            block,
            name: spec.name,
            kind: spec.kind,
            connected: None,
        }
    }

    /// The output currently feeding this input, if any.
    pub fn connected_output(&self) -> Option<OutputId> {
        self.connected
    }
}

/// A producing port. Knows its consumers for propagation and disconnect
/// cascade, but never owns them.
#[derive(Debug)]
pub struct OutputPort {
    /// Unique port ID
    pub id: OutputId,
    /// Owning block
    pub block: BlockId,
    /// Port name
    pub name: String,
    /// Data kind this output produces
    pub kind: DataKind,
    /// Current data, if the block has produced any
    pub(crate) data: Option<Data>,
    /// Current metadata
    pub(crate) metadata: Metadata,
    /// Per-axis fixed/inherited flags
    pub(crate) metadata_mode: MetadataMode,
    /// Inputs consuming this output, in connection order
    pub(crate) consumers: Vec<InputId>,
}

impl OutputPort {
    pub(crate) fn new(block: BlockId, spec: OutputSpec) -> Self {
        Self {
            id: OutputId::new(),
            block,
            name: spec.name,
            kind: spec.kind,
            data: None,
            metadata: spec.metadata,
            metadata_mode: MetadataMode::default(),
            consumers: Vec::new(),
        }
    }

    /// Current data, if the block has produced any.
    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Current metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Per-axis fixed/inherited flags.
    pub fn metadata_mode(&self) -> MetadataMode {
        self.metadata_mode
    }

    /// Inputs consuming this output, in connection order.
    pub fn consumers(&self) -> &[InputId] {
        &self.consumers
    }

    /// Resolve the metadata to publish: axes flagged as fixed keep their
    /// stored values, the rest come from `derived`.
    pub fn effective_metadata(&self, derived: &Metadata) -> Metadata {
        let mut resolved = derived.clone();
        if self.metadata_mode.abscissa_fixed {
            resolved.quantity_a = self.metadata.quantity_a.clone();
            resolved.symbol_a = self.metadata.symbol_a.clone();
            resolved.unit_a = self.metadata.unit_a.clone();
        }
        if self.metadata_mode.ordinate_fixed {
            resolved.quantity_o = self.metadata.quantity_o.clone();
            resolved.symbol_o = self.metadata.symbol_o.clone();
            resolved.unit_o = self.metadata.unit_o.clone();
        }
        if resolved.name.is_empty() {
            resolved.name = self.metadata.name.clone();
        }
        resolved
    }
}
