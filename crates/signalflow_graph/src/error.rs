// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the dataflow core.

use crate::block::BlockId;
use crate::data::{DataKind, Unit};
use crate::port::{InputId, OutputId, PortDirection};
use std::path::PathBuf;

/// Structural graph invariant violated.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A port with this identity is already registered
    #[error("port already registered in the graph")]
    DuplicateNode,

    /// Block not found
    #[error("unknown block: {0:?}")]
    UnknownBlock(BlockId),

    /// Input port not found
    #[error("unknown input port: {0:?}")]
    UnknownInput(InputId),

    /// Output port not found
    #[error("unknown output port: {0:?}")]
    UnknownOutput(OutputId),

    /// Port index out of range for the owning block
    #[error("port index {0} out of range")]
    PortIndex(usize),
}

/// Port-count rule violation on a dynamic block or an already-taken input.
#[derive(Debug, thiserror::Error)]
pub enum InputOutputError {
    /// The block declares no dynamic capability for this direction
    #[error("block has no dynamic {0} capability")]
    NotDynamic(PortDirection),

    /// Adding the port would exceed the declared upper bound
    #[error("maximum number of {0} ports reached")]
    UpperBound(PortDirection),

    /// Deleting the port would drop below the declared lower bound
    #[error("minimum number of {0} ports reached")]
    LowerBound(PortDirection),

    /// The input already holds a different connection
    #[error("input {input:?} is already connected; disconnect it first")]
    AlreadyConnected {
        /// The occupied input
        input: InputId,
    },
}

/// A port's data does not match the kind or units a consumer requires.
#[derive(Debug, thiserror::Error)]
pub enum DataTypeError {
    /// Produced and required data kinds are incompatible
    #[error("port '{port}' requires {expected:?} data, got {actual:?}")]
    KindMismatch {
        /// Name of the offending port
        port: String,
        /// Kind the consumer requires
        expected: DataKind,
        /// Kind actually present or produced
        actual: DataKind,
    },

    /// Units that must agree do not
    #[error("unit mismatch: expected {expected}, got {actual}")]
    UnitMismatch {
        /// Unit required by the first operand
        expected: Unit,
        /// Conflicting unit
        actual: Unit,
    },

    /// Sampling increments differ or abscissa grids are misaligned
    #[error("signals have incompatible sampling intervals")]
    IntervalMismatch,
}

/// Connectivity would or does form a cycle.
#[derive(Debug, thiserror::Error)]
#[error("graph contains a cycle")]
pub struct GraphCycleError;

/// External I/O precondition failed while saving or loading.
#[derive(Debug, thiserror::Error)]
pub enum DataSavingError {
    /// The file path does not carry the required extension
    #[error("'{path}' does not end in the required extension '{expected}'")]
    WrongExtension {
        /// Offending path
        path: PathBuf,
        /// Required extension
        expected: &'static str,
    },

    /// There is no data to save
    #[error("no data present to save")]
    MissingData,

    /// A saved block references a type id the library does not know
    #[error("unknown block type '{0}'")]
    UnknownBlockType(String),

    /// The saved structure is internally inconsistent
    #[error("invalid saved structure: {0}")]
    InvalidStructure(String),

    /// Underlying filesystem failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// A parameter assignment failed validation.
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    /// No parameter with this name on the block
    #[error("unknown parameter '{0}'")]
    Missing(String),

    /// Value kind does not match the parameter kind
    #[error("parameter '{name}' expects a {expected} value")]
    WrongKind {
        /// Parameter name
        name: String,
        /// Expected value kind
        expected: &'static str,
    },

    /// Numeric value outside the declared range
    #[error("parameter '{name}' value out of range")]
    OutOfRange {
        /// Parameter name
        name: String,
    },

    /// Value is not a member of the enumerated choice set
    #[error("'{value}' is not a valid choice for parameter '{name}'")]
    UnknownChoice {
        /// Parameter name
        name: String,
        /// Rejected value
        value: String,
    },

    /// Path value does not carry one of the allowed extensions
    #[error("parameter '{name}' requires a path ending in one of {extensions:?}")]
    BadExtension {
        /// Parameter name
        name: String,
        /// Allowed extensions
        extensions: Vec<String>,
    },

    /// Action parameters carry no assignable value
    #[error("parameter '{0}' is an action and cannot be assigned")]
    NotAssignable(String),
}

/// Unifying error for operations that can fail in several ways.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Structural graph error
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Port-count rule violation
    #[error(transparent)]
    InputOutput(#[from] InputOutputError),

    /// Data kind or unit mismatch
    #[error(transparent)]
    DataType(#[from] DataTypeError),

    /// Cycle detected or would be created
    #[error(transparent)]
    Cycle(#[from] GraphCycleError),

    /// Save/load precondition failed
    #[error(transparent)]
    Saving(#[from] DataSavingError),

    /// Parameter validation failed
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}
