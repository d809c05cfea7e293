// SPDX-License-Identifier: MIT OR Apache-2.0
//! Writes the incoming signal to a JSON file on demand.

use signalflow_graph::block::{BlockBehavior, BlockDescriptor, ProcessContext};
use signalflow_graph::port::InputSpec;
use signalflow_graph::{validator, DataSavingError, FlowError, Parameter};
use tracing::info;

/// Sink block that saves its input signal when the "save" action fires.
/// Saving without data or to a non-`.json` path fails.
#[derive(Debug)]
pub struct SignalSaver;

impl BlockBehavior for SignalSaver {
    fn descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            type_id: "signalflow.saver",
            name: "Signal saver".to_string(),
            description: "Saves the input signal to a JSON file".to_string(),
            inputs: vec![InputSpec::signal("in 1")],
            outputs: vec![],
            parameters: vec![
                (
                    "file".to_string(),
                    Parameter::path("File", vec!["json".to_string()]),
                ),
                ("save".to_string(), Parameter::action("Save")),
            ],
            dynamic_input: None,
            dynamic_output: None,
        }
    }

    /// Pure sink; nothing to compute.
    fn process(&self, _ctx: &mut ProcessContext<'_>) -> Result<(), FlowError> {
        Ok(())
    }

    fn action(&self, name: &str, ctx: &ProcessContext<'_>) -> Result<(), FlowError> {
        if name != "save" {
            return Ok(());
        }
        let data = ctx.input_data(0).ok_or(DataSavingError::MissingData)?;
        let signal = validator::check_type_signal("in 1", data)?;
        let metadata = ctx.input_metadata(0).cloned().unwrap_or_default();
        let path = ctx.path_parameter("file")?;
        // The path parameter validates extensions on assignment, but the
        // default (empty) path never passed through an assignment
        let has_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "json");
        if !has_extension {
            return Err(DataSavingError::WrongExtension {
                path: path.clone(),
                expected: "json",
            }
            .into());
        }

        let payload = serde_json::json!({
            "metadata": metadata,
            "signal": signal,
        });
        let json = serde_json::to_string_pretty(&payload).map_err(DataSavingError::from)?;
        std::fs::write(path, json).map_err(DataSavingError::from)?;
        info!(?path, "saved signal");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::add_volt_source;
    use signalflow_graph::{Graph, ParameterValue};

    #[test]
    fn writes_the_signal_as_json() {
        let mut graph = Graph::new("test");
        let source = add_volt_source(&mut graph, vec![1.0, 2.0]);
        let saver = graph.add_block(Box::new(SignalSaver)).unwrap();
        let input = graph.block(saver).unwrap().input(0).unwrap();
        graph.connect(input, source).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signal.json");
        graph
            .set_parameter(saver, "file", ParameterValue::Path(path.clone()))
            .unwrap();
        graph.trigger_action(saver, "save").unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["signal"]["ordinate"][1], 2.0);
        assert_eq!(written["metadata"]["unit_o"], "V");
    }

    #[test]
    fn saving_without_data_fails() {
        let mut graph = Graph::new("test");
        let saver = graph.add_block(Box::new(SignalSaver)).unwrap();
        let err = graph.trigger_action(saver, "save").unwrap_err();
        assert!(matches!(
            err,
            FlowError::Saving(DataSavingError::MissingData)
        ));
    }

    #[test]
    fn non_json_path_is_rejected_at_assignment() {
        let mut graph = Graph::new("test");
        let saver = graph.add_block(Box::new(SignalSaver)).unwrap();
        let err = graph
            .set_parameter(
                saver,
                "file",
                ParameterValue::Path(std::path::PathBuf::from("signal.wav")),
            )
            .unwrap_err();
        assert!(matches!(err, FlowError::Parameter(_)));
    }
}
