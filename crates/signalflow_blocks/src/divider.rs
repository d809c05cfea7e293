// SPDX-License-Identifier: MIT OR Apache-2.0
//! Divides two signals sample by sample.

use crate::helpers::fill_zeros;
use signalflow_graph::block::{BlockBehavior, BlockDescriptor, ProcessContext};
use signalflow_graph::port::{InputSpec, OutputSpec};
use signalflow_graph::{validator, DataKind, FlowError, Metadata, Signal};

/// Divides the first input signal by the second. Both inputs are
/// required; the ordinate unit of the result is the ratio of the input
/// units.
#[derive(Debug)]
pub struct Divider;

impl BlockBehavior for Divider {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "signalflow.divider",
            name: "Divider".to_string(),
            description: "Divides the two input signals".to_string(),
            inputs: vec![InputSpec::signal("dividend"), InputSpec::signal("divisor")],
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
        if ctx.any_input_empty() {
            ctx.clear_outputs();
            return Ok(());
        }
        let dividend = ctx.signal_input(0)?;
        let divisor = ctx.signal_input(1)?;
        validator::check_same_units(&[&dividend.metadata.unit_a, &divisor.metadata.unit_a])?;
        validator::check_intervals(&[dividend.signal, divisor.signal])?;

        let matched = fill_zeros(&[dividend.signal, divisor.signal]);
        let ordinate = matched[0]
            .ordinate
            .iter()
            .zip(&matched[1].ordinate)
            .map(|(a, b)| a / b)
            .collect();
        let derived = Metadata::with_units(
            dividend.metadata.unit_a.clone(),
            dividend.metadata.unit_o.ratio(&divisor.metadata.unit_o),
        );
        let result = Signal::new(matched[0].abscissa_start, matched[0].increment, ordinate);
        ctx.publish_signal(0, result, derived)
    }
}
