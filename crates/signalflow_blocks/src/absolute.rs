// SPDX-License-Identifier: MIT OR Apache-2.0
//! Absolute value of a signal.

use signalflow_graph::block::{BlockBehavior, BlockDescriptor, ProcessContext};
use signalflow_graph::port::{InputSpec, OutputSpec};
use signalflow_graph::{DataKind, FlowError, Metadata, Signal};

/// Emits the sample-wise absolute value of its input signal.
#[derive(Debug)]
pub struct Absolute;

impl BlockBehavior for Absolute {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "signalflow.absolute",
            name: "Absolute".to_string(),
            description: "Takes the absolute value of the input signal".to_string(),
            inputs: vec![InputSpec::signal("in 1")],
            outputs: vec![OutputSpec::new(
                "out",
                DataKind::Signal,
                Metadata::default(),
            )],
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
        let input = ctx.signal_input(0)?;
        let ordinate = input.signal.ordinate.iter().map(|v| v.abs()).collect();
        let result = Signal::new(input.signal.abscissa_start, input.signal.increment, ordinate);
        let derived = input.metadata.clone();
        ctx.publish_signal(0, result, derived)
    }
}
