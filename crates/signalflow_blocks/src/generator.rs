// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sine signal generator.

use signalflow_graph::block::{BlockBehavior, BlockDescriptor, ProcessContext};
use signalflow_graph::port::OutputSpec;
use signalflow_graph::{DataKind, FlowError, Metadata, Parameter, Signal, Unit};

/// Generates a sine signal from its parameters. The only standard block
/// that produces data from nothing.
#[derive(Debug)]
pub struct SignalGenerator;

impl BlockBehavior for SignalGenerator {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "signalflow.generator",
            name: "Signal generator".to_string(),
            description: "Generates a sine signal".to_string(),
            inputs: vec![],
            outputs: vec![OutputSpec::new(
                "out",
                DataKind::Signal,
                Metadata::time_voltage(""),
            )],
            parameters: vec![
                (
                    "frequency".to_string(),
                    Parameter::float("Frequency", 1.0, Some(0.0), None, Unit::new("Hz")),
                ),
                (
                    "amplitude".to_string(),
                    Parameter::float("Amplitude", 1.0, None, None, Unit::new("V")),
                ),
                (
                    "abscissa_start".to_string(),
                    Parameter::float("Start", 0.0, None, None, Unit::new("s")),
                ),
                (
                    "increment".to_string(),
                    Parameter::float(
                        "Increment",
                        0.01,
                        Some(f64::MIN_POSITIVE),
                        None,
                        Unit::new("s"),
                    ),
                ),
                (
                    "values".to_string(),
                    Parameter::int("Values", 628, Some(1), None),
                ),
            ],
            dynamic_input: None,
            dynamic_output: None,
        }
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        let frequency = ctx.float_parameter("frequency")?;
        let amplitude = ctx.float_parameter("amplitude")?;
        let abscissa_start = ctx.float_parameter("abscissa_start")?;
        let increment = ctx.float_parameter("increment")?;
        let values = ctx.int_parameter("values")? as usize;

        let ordinate = (0..values)
            .map(|index| {
                let t = abscissa_start + index as f64 * increment;
                amplitude * (std::f64::consts::TAU * frequency * t).sin()
            })
            .collect();
        ctx.publish_signal(
            0,
            Signal::new(abscissa_start, increment, ordinate),
            Metadata::time_voltage(""),
        )
    }
}
