// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persistence of the block structure as JSON.
//!
//! Saved per block: type id, parameter values, per-output identity and
//! metadata, per-input connected-output identity. Loading reconstructs
//! blocks through a [`BlockLibrary`], replays parameters, replays
//! connections in save order and settles all outputs with one
//! propagation pass. Save -> load -> save round-trips to a semantically
//! equivalent structure (fresh ids, same shape).

use crate::block::BlockId;
use crate::data::Metadata;
use crate::error::{DataSavingError, FlowError};
use crate::graph::Graph;
use crate::library::BlockLibrary;
use crate::parameter::ParameterValue;
use crate::port::OutputId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

const EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct SavedStructure {
    blocks: Vec<SavedBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedBlock {
    type_id: String,
    parameters: IndexMap<String, ParameterValue>,
    inputs: Vec<SavedInput>,
    outputs: Vec<SavedOutput>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedInput {
    connected_output: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedOutput {
    id: Uuid,
    metadata: Metadata,
    abscissa_fixed: bool,
    ordinate_fixed: bool,
}

/// Save the graph's block structure to a `.json` file.
pub fn save_block_structure(graph: &Graph, path: &Path) -> Result<(), FlowError> {
    check_extension(path)?;
    let structure = structure_from_graph(graph);
    let json = serde_json::to_string_pretty(&structure).map_err(DataSavingError::from)?;
    fs::write(path, json).map_err(DataSavingError::from)?;
    info!(?path, blocks = structure.blocks.len(), "saved block structure");
    Ok(())
}

/// Load a block structure into `graph`, constructing blocks through
/// `library`. Returns the created block ids in save order.
pub fn load_block_structure(
    graph: &mut Graph,
    library: &BlockLibrary,
    path: &Path,
) -> Result<Vec<BlockId>, FlowError> {
    check_extension(path)?;
    let json = fs::read_to_string(path).map_err(DataSavingError::from)?;
    let structure: SavedStructure =
        serde_json::from_str(&json).map_err(DataSavingError::from)?;

    // Pass 1: blocks, parameters and output metadata. Connections wait
    // until every output exists.
    let mut block_ids = Vec::with_capacity(structure.blocks.len());
    let mut output_ids: HashMap<Uuid, OutputId> = HashMap::new();
    for saved in &structure.blocks {
        let behavior = library
            .create(&saved.type_id)
            .ok_or_else(|| DataSavingError::UnknownBlockType(saved.type_id.clone()))?;
        let block_id = graph.insert_block(behavior)?;
        for (name, value) in &saved.parameters {
            graph.set_parameter_value(block_id, name, value.clone())?;
        }
        align_output_count(graph, block_id, saved.outputs.len())?;
        let created_outputs = graph
            .block(block_id)
            .map(|block| block.outputs().to_vec())
            .unwrap_or_default();
        for (saved_output, output_id) in saved.outputs.iter().zip(&created_outputs) {
            output_ids.insert(saved_output.id, *output_id);
            if let Some(port) = graph.outputs.get_mut(output_id) {
                port.metadata = saved_output.metadata.clone();
                port.metadata_mode.abscissa_fixed = saved_output.abscissa_fixed;
                port.metadata_mode.ordinate_fixed = saved_output.ordinate_fixed;
            }
        }
        block_ids.push(block_id);
    }

    // Pass 2: connections, replayed in save order.
    for (saved, block_id) in structure.blocks.iter().zip(&block_ids) {
        align_input_count(graph, *block_id, saved.inputs.len())?;
        let created_inputs = graph
            .block(*block_id)
            .map(|block| block.inputs().to_vec())
            .unwrap_or_default();
        for (saved_input, input_id) in saved.inputs.iter().zip(&created_inputs) {
            let Some(saved_output) = saved_input.connected_output else {
                continue;
            };
            let output_id = output_ids.get(&saved_output).ok_or_else(|| {
                DataSavingError::InvalidStructure(format!(
                    "input references unknown output id {saved_output}"
                ))
            })?;
            graph.connect_edge(*input_id, *output_id)?;
        }
    }

    // One full pass settles every loaded output.
    graph.propagate(&block_ids)?;
    info!(?path, blocks = block_ids.len(), "loaded block structure");
    Ok(block_ids)
}

/// Grow or shrink a freshly constructed block's dynamic input count to
/// match the saved structure. A count mismatch on a non-dynamic block
/// surfaces as the underlying `InputOutputError`.
fn align_input_count(graph: &mut Graph, block: BlockId, saved: usize) -> Result<(), FlowError> {
    loop {
        let current = graph
            .block(block)
            .map(|entry| entry.inputs().len())
            .unwrap_or_default();
        match current.cmp(&saved) {
            std::cmp::Ordering::Less => {
                graph.grow_input(block)?;
            }
            std::cmp::Ordering::Greater => {
                graph.delete_input(block, current - 1)?;
            }
            std::cmp::Ordering::Equal => return Ok(()),
        }
    }
}

fn align_output_count(graph: &mut Graph, block: BlockId, saved: usize) -> Result<(), FlowError> {
    loop {
        let current = graph
            .block(block)
            .map(|entry| entry.outputs().len())
            .unwrap_or_default();
        match current.cmp(&saved) {
            std::cmp::Ordering::Less => {
                graph.grow_output(block)?;
            }
            std::cmp::Ordering::Greater => {
                graph.delete_output(block, current - 1)?;
            }
            std::cmp::Ordering::Equal => return Ok(()),
        }
    }
}

fn structure_from_graph(graph: &Graph) -> SavedStructure {
    let mut blocks = Vec::with_capacity(graph.block_count());
    for (_, block) in graph.blocks() {
        let mut parameters = IndexMap::new();
        for (name, parameter) in block.parameters() {
            // Action parameters carry no value to persist
            if let Some(value) = parameter.value() {
                parameters.insert(name.clone(), value);
            }
        }
        let inputs = block
            .inputs()
            .iter()
            .map(|input_id| SavedInput {
                connected_output: graph
                    .input(*input_id)
                    .and_then(|input| input.connected_output())
                    .map(|output| output.0),
            })
            .collect();
        let outputs = block
            .outputs()
            .iter()
            .filter_map(|output_id| graph.output(*output_id))
            .map(|output| SavedOutput {
                id: output.id.0,
                metadata: output.metadata().clone(),
                abscissa_fixed: output.metadata_mode().abscissa_fixed,
                ordinate_fixed: output.metadata_mode().ordinate_fixed,
            })
            .collect();
        blocks.push(SavedBlock {
            type_id: block.type_id().to_string(),
            parameters,
            inputs,
            outputs,
        });
    }
    SavedStructure { blocks }
}

fn check_extension(path: &Path) -> Result<(), DataSavingError> {
    let ok = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == EXTENSION);
    if ok {
        Ok(())
    } else {
        Err(DataSavingError::WrongExtension {
            path: path.to_path_buf(),
            expected: EXTENSION,
        })
    }
}
