// SPDX-License-Identifier: MIT OR Apache-2.0
//! Test fixtures: a source block emitting a fixed signal.

use signalflow_graph::block::{BlockBehavior, BlockDescriptor, ProcessContext};
use signalflow_graph::port::OutputSpec;
use signalflow_graph::{DataKind, FlowError, Graph, Metadata, OutputId, Signal, Unit};

/// Emits one fixed signal with fixed metadata.
#[derive(Debug)]
pub struct ConstSource {
    /// The signal to emit
    pub signal: Signal,
    /// Metadata to publish alongside
    pub metadata: Metadata,
}

impl ConstSource {
    pub fn new(signal: Signal, metadata: Metadata) -> Self {
        Self { signal, metadata }
    }
}

impl BlockBehavior for ConstSource {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "test.const_source",
            name: "Const source".to_string(),
            description: "Emits a fixed signal".to_string(),
            inputs: vec![],
            outputs: vec![OutputSpec::new("out", DataKind::Signal, Metadata::default())],
            parameters: vec![],
            dynamic_input: None,
            dynamic_output: None,
        }
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        ctx.publish_signal(0, self.signal.clone(), self.metadata.clone())
    }
}

/// Signal on the default 0.01 s grid.
pub fn signal(ordinate: Vec<f64>) -> Signal {
    Signal::new(0.0, 0.01, ordinate)
}

/// Time/voltage metadata.
pub fn volt_metadata() -> Metadata {
    Metadata::with_units(Unit::new("s"), Unit::new("V"))
}

/// Add a const source emitting `ordinate` volts and return its output.
pub fn add_volt_source(graph: &mut Graph, ordinate: Vec<f64>) -> OutputId {
    let block = graph
        .add_block(Box::new(ConstSource::new(signal(ordinate), volt_metadata())))
        .unwrap();
    graph.block(block).unwrap().output(0).unwrap()
}

/// Signal currently held by an output.
pub fn output_signal(graph: &Graph, output: OutputId) -> Option<Signal> {
    graph
        .output(output)
        .and_then(|port| port.data()?.as_signal().cloned())
}
