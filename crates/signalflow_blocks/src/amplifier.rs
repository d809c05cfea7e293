// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scales a signal by a constant factor.

use signalflow_graph::block::{BlockBehavior, BlockDescriptor, ProcessContext};
use signalflow_graph::port::{InputSpec, OutputSpec};
use signalflow_graph::{DataKind, FlowError, Metadata, Parameter, Signal, Unit};

/// Multiplies the input signal by a dimensionless gain factor.
/// Metadata passes through from the input.
#[derive(Debug)]
pub struct Amplifier;

impl BlockBehavior for Amplifier {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "signalflow.amplifier",
            name: "Amplifier".to_string(),
            description: "Scales the input signal by a constant factor".to_string(),
            inputs: vec![InputSpec::signal("in 1")],
            outputs: vec![OutputSpec::new(
                "out",
                DataKind::Signal,
                Metadata::default(),
            )],
            parameters: vec![(
                "gain".to_string(),
                Parameter::float("Gain", 1.0, None, None, Unit::one()),
            )],
            dynamic_input: None,
            dynamic_output: None,
        }
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        if ctx.any_input_empty() {
            ctx.clear_outputs();
            return Ok(());
        }
        let input = ctx.signal_input(0)?;
        let gain = ctx.float_parameter("gain")?;
        let ordinate = input.signal.ordinate.iter().map(|v| v * gain).collect();
        let result = Signal::new(input.signal.abscissa_start, input.signal.increment, ordinate);
        let derived = input.metadata.clone();
        ctx.publish_signal(0, result, derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{add_volt_source, output_signal};
    use signalflow_graph::{Graph, ParameterValue};

    #[test]
    fn applies_the_gain_and_inherits_metadata() {
        let mut graph = Graph::new("test");
        let source = add_volt_source(&mut graph, vec![1.0, -2.0]);
        let amplifier = graph.add_block(Box::new(Amplifier)).unwrap();
        let input = graph.block(amplifier).unwrap().input(0).unwrap();
        graph.connect(input, source).unwrap();
        graph
            .set_parameter(amplifier, "gain", ParameterValue::Float(3.0))
            .unwrap();

        let out = graph.block(amplifier).unwrap().output(0).unwrap();
        assert_eq!(
            output_signal(&graph, out).unwrap().ordinate,
            vec![3.0, -6.0]
        );
        assert_eq!(graph.output(out).unwrap().metadata().unit_o, Unit::new("V"));
    }
}
