// SPDX-License-Identifier: MIT OR Apache-2.0
//! Adds signals sample by sample.

use crate::helpers::fill_zeros;
use signalflow_graph::block::{BlockBehavior, BlockDescriptor, PortBounds, ProcessContext};
use signalflow_graph::port::{InputSpec, OutputSpec};
use signalflow_graph::{validator, DataKind, FlowError, Metadata, Signal, Unit};

/// Sums its input signals. Inputs may cover different abscissa spans;
/// shorter ones are zero-padded onto the union span. Signals with
/// mismatched units or sampling grids cannot be added.
#[derive(Debug)]
pub struct Adder;

impl BlockBehavior for Adder {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "signalflow.adder",
            name: "Adder".to_string(),
            description: "Adds the input signals".to_string(),
            inputs: vec![InputSpec::signal("in 1"), InputSpec::signal("in 2")],
            outputs: vec![OutputSpec::new(
                "out",
                DataKind::Signal,
                Metadata::default(),
            )],
            parameters: vec![],
            dynamic_input: Some(PortBounds::unbounded(2)),
            dynamic_output: None,
        }
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        if ctx.all_inputs_empty() {
            ctx.clear_outputs();
            return Ok(());
        }
        let inputs = ctx.present_signals()?;
        let abscissa_units: Vec<&Unit> =
            inputs.iter().map(|input| &input.metadata.unit_a).collect();
        validator::check_same_units(&abscissa_units)?;
        let ordinate_units: Vec<&Unit> =
            inputs.iter().map(|input| &input.metadata.unit_o).collect();
        validator::check_same_units(&ordinate_units)?;
        let signals: Vec<&Signal> = inputs.iter().map(|input| input.signal).collect();
        validator::check_intervals(&signals)?;

        let matched = fill_zeros(&signals);
        let Some(first) = matched.first() else {
            ctx.clear_outputs();
            return Ok(());
        };
        let mut ordinate = vec![0.0; first.values];
        for signal in &matched {
            for (acc, value) in ordinate.iter_mut().zip(&signal.ordinate) {
                *acc += value;
            }
        }
        let derived = Metadata::with_units(
            inputs[0].metadata.unit_a.clone(),
            inputs[0].metadata.unit_o.clone(),
        );
        let result = Signal::new(first.abscissa_start, first.increment, ordinate);
        ctx.publish_signal(0, result, derived)
    }

    fn dynamic_input_spec(&self, index: usize) -> InputSpec {
        InputSpec::signal(format!("in {}", index + 1))
    }
}
