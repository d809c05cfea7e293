// SPDX-License-Identifier: MIT OR Apache-2.0
//! Block definitions: the unit of computation and its `process` contract.

use crate::data::{Data, DataKind, Metadata, Signal};
use crate::error::{DataTypeError, FlowError, GraphError, ParameterError};
use crate::parameter::Parameter;
use crate::port::{InputId, InputSpec, OutputId, OutputSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub Uuid);

impl BlockId {
    /// Create a new random block ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

/// Dynamic port-count capability: `[min, max]` with an optional upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBounds {
    /// Lower limit, always concrete
    pub min: usize,
    /// Upper limit; `None` means unbounded
    pub max: Option<usize>,
}

impl PortBounds {
    /// Bounded capability; `max` must exceed `min`.
    pub fn new(min: usize, max: usize) -> Self {
        debug_assert!(max > min);
        Self {
            min,
            max: Some(max),
        }
    }

    /// Capability with no finite upper limit.
    pub fn unbounded(min: usize) -> Self {
        Self { min, max: None }
    }
}

/// Static description of a block: identity, initial ports, parameters and
/// dynamic capabilities. Returned by [`BlockBehavior::descriptor`].
#[derive(Debug)]
pub struct BlockDescriptor {
    /// Stable type identifier used by persistence and the block library
    pub type_id: &'static str,
    /// Display name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Initial input ports, in index order
    pub inputs: Vec<InputSpec>,
    /// Initial output ports, in index order
    pub outputs: Vec<OutputSpec>,
    /// Parameters as `(key, cell)` pairs, in display order
    pub parameters: Vec<(String, Parameter)>,
    /// Dynamic input capability, if any
    pub dynamic_input: Option<PortBounds>,
    /// Dynamic output capability, if any
    pub dynamic_output: Option<PortBounds>,
}

/// The computation contract of a block.
///
/// `process` reads inputs and parameters through the [`ProcessContext`] and
/// stages output writes; the graph commits the staged writes only when
/// `process` returns `Ok`, so a failing invocation never corrupts outputs
/// already on the ports. `process` must be idempotent: with unchanged
/// inputs it stages identical writes.
pub trait BlockBehavior: fmt::Debug {
    /// Static description of this block type.
    fn descriptor(&self) -> BlockDescriptor;

    /// Compute outputs from the current inputs and parameters.
    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError>;

    /// Handle an action parameter trigger. The context is read-only here;
    /// staged writes are discarded.
    fn action(&self, name: &str, ctx: &ProcessContext<'_>) -> Result<(), FlowError> {
        let _ = (name, ctx);
        Ok(())
    }

    /// Spec for a dynamically added input at `index`. Blocks with a
    /// dynamic input capability override this when their added inputs
    /// need a specific kind or naming.
    fn dynamic_input_spec(&self, index: usize) -> InputSpec {
        InputSpec::new(format!("in {index}"), DataKind::Any)
    }

    /// Spec for a dynamically added output at `index`.
    fn dynamic_output_spec(&self, index: usize) -> OutputSpec {
        OutputSpec::new(format!("out {index}"), DataKind::Any, Metadata::default())
    }
}

/// A block instance owned by the graph: behavior, ordered ports,
/// parameters and dynamic capabilities.
#[derive(Debug)]
pub struct Block {
    pub(crate) behavior: Box<dyn BlockBehavior>,
    pub(crate) type_id: &'static str,
    pub(crate) name: String,
    pub(crate) inputs: Vec<InputId>,
    pub(crate) outputs: Vec<OutputId>,
    pub(crate) parameters: IndexMap<String, Parameter>,
    pub(crate) dynamic_input: Option<PortBounds>,
    pub(crate) dynamic_output: Option<PortBounds>,
    pub(crate) process_count: u64,
}

impl Block {
    /// Stable type identifier.
    pub fn type_id(&self) -> &'static str {
        self.type_id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input port IDs in index order.
    pub fn inputs(&self) -> &[InputId] {
        &self.inputs
    }

    /// Output port IDs in index order.
    pub fn outputs(&self) -> &[OutputId] {
        &self.outputs
    }

    /// Input port ID at `index`.
    pub fn input(&self, index: usize) -> Option<InputId> {
        self.inputs.get(index).copied()
    }

    /// Output port ID at `index`.
    pub fn output(&self, index: usize) -> Option<OutputId> {
        self.outputs.get(index).copied()
    }

    /// Parameter cell by key.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// All parameters in display order.
    pub fn parameters(&self) -> &IndexMap<String, Parameter> {
        &self.parameters
    }

    /// Dynamic input capability, if any.
    pub fn dynamic_input(&self) -> Option<PortBounds> {
        self.dynamic_input
    }

    /// Dynamic output capability, if any.
    pub fn dynamic_output(&self) -> Option<PortBounds> {
        self.dynamic_output
    }

    /// Number of completed `process` invocations.
    pub fn process_count(&self) -> u64 {
        self.process_count
    }
}

/// Snapshot of one input as seen by `process`.
#[derive(Debug)]
pub struct ResolvedInput {
    pub(crate) name: String,
    pub(crate) kind: DataKind,
    pub(crate) data: Option<Data>,
    pub(crate) metadata: Option<Metadata>,
}

/// A present, kind-validated signal input.
#[derive(Debug)]
pub struct SignalInput<'a> {
    /// The signal data
    pub signal: &'a Signal,
    /// Metadata published by the upstream output
    pub metadata: &'a Metadata,
}

#[derive(Debug)]
pub(crate) enum OutputWrite {
    Clear,
    Publish { data: Data, derived: Metadata },
}

#[derive(Debug)]
struct StagedOutput {
    write: Option<OutputWrite>,
}

/// Execution context handed to [`BlockBehavior::process`].
///
/// Inputs are immutable snapshots; output writes are staged and committed
/// by the graph after `process` succeeds (all-or-nothing).
#[derive(Debug)]
pub struct ProcessContext<'a> {
    inputs: Vec<ResolvedInput>,
    outputs: Vec<StagedOutput>,
    parameters: &'a IndexMap<String, Parameter>,
}

impl<'a> ProcessContext<'a> {
    pub(crate) fn new(
        inputs: Vec<ResolvedInput>,
        output_count: usize,
        parameters: &'a IndexMap<String, Parameter>,
    ) -> Self {
        Self {
            inputs,
            outputs: (0..output_count)
                .map(|_| StagedOutput { write: None })
                .collect(),
            parameters,
        }
    }

    pub(crate) fn into_writes(self) -> Vec<Option<OutputWrite>> {
        self.outputs.into_iter().map(|staged| staged.write).collect()
    }

    /// Number of input ports.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output ports.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Data currently present on input `index`, or `None` if the input is
    /// unconnected or its upstream produced nothing.
    pub fn input_data(&self, index: usize) -> Option<&Data> {
        self.inputs.get(index).and_then(|input| input.data.as_ref())
    }

    /// Metadata of the output feeding input `index`, if connected.
    pub fn input_metadata(&self, index: usize) -> Option<&Metadata> {
        self.inputs
            .get(index)
            .and_then(|input| input.metadata.as_ref())
    }

    /// True when no input carries data. Guard for the
    /// "abort if all inputs empty" policy; run before any type check.
    pub fn all_inputs_empty(&self) -> bool {
        self.inputs.iter().all(|input| input.data.is_none())
    }

    /// True when at least one input lacks data. Guard for the
    /// "abort if any input empty" policy; run before any type check.
    pub fn any_input_empty(&self) -> bool {
        self.inputs.iter().any(|input| input.data.is_none())
    }

    /// The signal on input `index`. Fails with [`DataTypeError`] naming the
    /// port when the data present there is not a signal.
    ///
    /// Callers are expected to have handled the empty case via the policy
    /// guards first; an empty input fails like a kind mismatch here.
    pub fn signal_input(&self, index: usize) -> Result<SignalInput<'_>, FlowError> {
        let input = self
            .inputs
            .get(index)
            .ok_or(GraphError::PortIndex(index))?;
        let data = input.data.as_ref().ok_or_else(|| DataTypeError::KindMismatch {
            port: input.name.clone(),
            expected: DataKind::Signal,
            actual: input.kind,
        })?;
        match (data, input.metadata.as_ref()) {
            (Data::Signal(signal), Some(metadata)) => Ok(SignalInput { signal, metadata }),
            _ => Err(DataTypeError::KindMismatch {
                port: input.name.clone(),
                expected: DataKind::Signal,
                actual: data.kind(),
            }
            .into()),
        }
    }

    /// All inputs that carry data, each validated to be a signal.
    /// Empty inputs are skipped (dynamic blocks tolerate gaps).
    pub fn present_signals(&self) -> Result<Vec<SignalInput<'_>>, FlowError> {
        let mut signals = Vec::new();
        for (index, input) in self.inputs.iter().enumerate() {
            if input.data.is_some() {
                signals.push(self.signal_input(index)?);
            }
        }
        Ok(signals)
    }

    /// Stage a data write for output `index`. The graph resolves the final
    /// metadata from `derived` and the output's fixed/inherit flags on
    /// commit.
    pub fn publish(
        &mut self,
        index: usize,
        data: Data,
        derived: Metadata,
    ) -> Result<(), FlowError> {
        let staged = self
            .outputs
            .get_mut(index)
            .ok_or(GraphError::PortIndex(index))?;
        staged.write = Some(OutputWrite::Publish { data, derived });
        Ok(())
    }

    /// Stage a signal write for output `index`.
    pub fn publish_signal(
        &mut self,
        index: usize,
        signal: Signal,
        derived: Metadata,
    ) -> Result<(), FlowError> {
        self.publish(index, Data::Signal(signal), derived)
    }

    /// Stage clearing every output. The standard idle result of the
    /// empty-input policies.
    pub fn clear_outputs(&mut self) {
        for staged in &mut self.outputs {
            staged.write = Some(OutputWrite::Clear);
        }
    }

    /// Boolean parameter value.
    pub fn bool_parameter(&self, name: &str) -> Result<bool, FlowError> {
        match self.parameter(name)? {
            Parameter::Bool(p) => Ok(p.value),
            _ => Err(self.wrong_kind(name, "bool")),
        }
    }

    /// Integer parameter value.
    pub fn int_parameter(&self, name: &str) -> Result<i64, FlowError> {
        match self.parameter(name)? {
            Parameter::Int(p) => Ok(p.value),
            _ => Err(self.wrong_kind(name, "int")),
        }
    }

    /// Float parameter value.
    pub fn float_parameter(&self, name: &str) -> Result<f64, FlowError> {
        match self.parameter(name)? {
            Parameter::Float(p) => Ok(p.value),
            _ => Err(self.wrong_kind(name, "float")),
        }
    }

    /// String parameter value.
    pub fn str_parameter(&self, name: &str) -> Result<&str, FlowError> {
        match self.parameter(name)? {
            Parameter::Str(p) => Ok(&p.value),
            _ => Err(self.wrong_kind(name, "string")),
        }
    }

    /// Choice parameter value.
    pub fn choice_parameter(&self, name: &str) -> Result<&str, FlowError> {
        match self.parameter(name)? {
            Parameter::Choice(p) => Ok(&p.value),
            _ => Err(self.wrong_kind(name, "choice")),
        }
    }

    /// Path parameter value.
    pub fn path_parameter(&self, name: &str) -> Result<&PathBuf, FlowError> {
        match self.parameter(name)? {
            Parameter::Path(p) => Ok(&p.value),
            _ => Err(self.wrong_kind(name, "path")),
        }
    }

    fn parameter(&self, name: &str) -> Result<&Parameter, FlowError> {
        self.parameters
            .get(name)
            .ok_or_else(|| ParameterError::Missing(name.to_string()).into())
    }

    fn wrong_kind(&self, name: &str, expected: &'static str) -> FlowError {
        ParameterError::WrongKind {
            name: name.to_string(),
            expected,
        }
        .into()
    }
}
