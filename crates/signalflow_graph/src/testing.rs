// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixture blocks shared by the core tests. Scalar-valued so graph and
//! propagation behavior can be asserted without signal plumbing.

use crate::block::{BlockBehavior, BlockDescriptor, PortBounds, ProcessContext};
use crate::data::{Data, DataKind, Metadata, Unit};
use crate::error::{DataTypeError, FlowError};
use crate::parameter::Parameter;
use crate::port::{InputSpec, OutputSpec};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared recorder for asserting process order across blocks.
pub type Recorder = Rc<RefCell<Vec<String>>>;

fn scalar_input(index: usize) -> InputSpec {
    InputSpec::new(format!("in {}", index + 1), DataKind::Scalar)
}

fn scalar_output() -> OutputSpec {
    OutputSpec::new("out", DataKind::Scalar, Metadata::default())
}

fn read_scalar(ctx: &ProcessContext<'_>, index: usize) -> Result<f64, FlowError> {
    match ctx.input_data(index) {
        Some(Data::Scalar(value)) => Ok(*value),
        Some(other) => Err(DataTypeError::KindMismatch {
            port: format!("in {}", index + 1),
            expected: DataKind::Scalar,
            actual: other.kind(),
        }
        .into()),
        None => Ok(0.0),
    }
}

/// 0 inputs, 1 scalar output; emits its "value" parameter.
#[derive(Debug)]
pub struct SourceBlock;

impl BlockBehavior for SourceBlock {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "test.source",
            name: "Source".to_string(),
            description: "Emits a constant scalar".to_string(),
            inputs: vec![],
            outputs: vec![scalar_output()],
            parameters: vec![(
                "value".to_string(),
                Parameter::float("Value", 1.0, None, None, Unit::one()),
            )],
            dynamic_input: None,
            dynamic_output: None,
        }
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        let value = ctx.float_parameter("value")?;
        ctx.publish(0, Data::Scalar(value), Metadata::default())
    }
}

/// 1 scalar input, 1 scalar output; emits input + 1. Aborts (clearing
/// its output) when the input is empty.
#[derive(Debug)]
pub struct IncrementBlock;

impl BlockBehavior for IncrementBlock {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "test.increment",
            name: "Increment".to_string(),
            description: "Emits input + 1".to_string(),
            inputs: vec![scalar_input(0)],
            outputs: vec![scalar_output()],
            parameters: vec![],
            dynamic_input: None,
            dynamic_output: None,
        }
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        if ctx.any_input_empty() {
            ctx.clear_outputs();
            return Ok(());
        }
        let value = read_scalar(ctx, 0)?;
        ctx.publish(0, Data::Scalar(value + 1.0), Metadata::default())
    }
}

/// Dynamic-input block, bounds (1, 3); sums the present inputs.
#[derive(Debug)]
pub struct SumBlock;

impl BlockBehavior for SumBlock {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "test.sum",
            name: "Sum".to_string(),
            description: "Sums present scalar inputs".to_string(),
            inputs: vec![scalar_input(0)],
            outputs: vec![scalar_output()],
            parameters: vec![],
            dynamic_input: Some(PortBounds::new(1, 3)),
            dynamic_output: None,
        }
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        if ctx.all_inputs_empty() {
            ctx.clear_outputs();
            return Ok(());
        }
        let mut sum = 0.0;
        for index in 0..ctx.input_count() {
            sum += read_scalar(ctx, index)?;
        }
        ctx.publish(0, Data::Scalar(sum), Metadata::default())
    }

    fn dynamic_input_spec(&self, index: usize) -> InputSpec {
        scalar_input(index)
    }
}

/// Dynamic-output block, bounds (1, unbounded); copies the input scalar
/// to every output.
#[derive(Debug)]
pub struct CopyBlock;

impl BlockBehavior for CopyBlock {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "test.copy",
            name: "Copy".to_string(),
            description: "Copies the input to every output".to_string(),
            inputs: vec![scalar_input(0)],
            outputs: vec![scalar_output()],
            parameters: vec![],
            dynamic_input: None,
            dynamic_output: Some(PortBounds::unbounded(1)),
        }
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        if ctx.any_input_empty() {
            ctx.clear_outputs();
            return Ok(());
        }
        let value = read_scalar(ctx, 0)?;
        for index in 0..ctx.output_count() {
            ctx.publish(index, Data::Scalar(value), Metadata::default())?;
        }
        Ok(())
    }

    fn dynamic_output_spec(&self, _index: usize) -> OutputSpec {
        scalar_output()
    }
}

/// 1 input requiring signal data, 0 outputs. For kind-mismatch tests.
#[derive(Debug)]
pub struct SignalSink;

impl BlockBehavior for SignalSink {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "test.signal_sink",
            name: "Signal sink".to_string(),
            description: "Consumes a signal".to_string(),
            inputs: vec![InputSpec::signal("in 1")],
            outputs: vec![],
            parameters: vec![],
            dynamic_input: None,
            dynamic_output: None,
        }
    }

    fn process(&self, _ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        Ok(())
    }
}

/// Fails whenever its input carries data. For abort-pass tests.
#[derive(Debug)]
pub struct FailingBlock;

impl BlockBehavior for FailingBlock {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "test.failing",
            name: "Failing".to_string(),
            description: "Errors on any present input".to_string(),
            inputs: vec![scalar_input(0)],
            outputs: vec![scalar_output()],
            parameters: vec![],
            dynamic_input: None,
            dynamic_output: None,
        }
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        if ctx.all_inputs_empty() {
            ctx.clear_outputs();
            return Ok(());
        }
        Err(DataTypeError::IntervalMismatch.into())
    }
}

/// Records its label on every process call. With zero inputs it acts as
/// a source emitting its "value" parameter; otherwise it emits the sum
/// of its present inputs plus one.
#[derive(Debug)]
pub struct ProbeBlock {
    label: String,
    input_count: usize,
    recorder: Recorder,
}

impl ProbeBlock {
    /// Create a probe with `input_count` scalar inputs.
    pub fn new(label: impl Into<String>, input_count: usize, recorder: &Recorder) -> Self {
        Self {
            label: label.into(),
            input_count,
            recorder: Rc::clone(recorder),
        }
    }
}

impl BlockBehavior for ProbeBlock {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "test.probe",
            name: format!("Probe {}", self.label),
            description: "Records its process order".to_string(),
            inputs: (0..self.input_count).map(scalar_input).collect(),
            outputs: vec![scalar_output()],
            parameters: vec![(
                "value".to_string(),
                Parameter::float("Value", 1.0, None, None, Unit::one()),
            )],
            dynamic_input: None,
            dynamic_output: None,
        }
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        self.recorder.borrow_mut().push(self.label.clone());
        if ctx.input_count() == 0 {
            let value = ctx.float_parameter("value")?;
            return ctx.publish(0, Data::Scalar(value), Metadata::default());
        }
        if ctx.all_inputs_empty() {
            ctx.clear_outputs();
            return Ok(());
        }
        let mut sum = 0.0;
        for index in 0..ctx.input_count() {
            sum += read_scalar(ctx, index)?;
        }
        ctx.publish(0, Data::Scalar(sum + 1.0), Metadata::default())
    }
}

/// Scalar currently held by an output, if any.
pub fn output_scalar(graph: &crate::graph::Graph, output: crate::port::OutputId) -> Option<f64> {
    graph.output(output).and_then(|port| port.data()?.as_scalar())
}
