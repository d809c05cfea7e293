// SPDX-License-Identifier: MIT OR Apache-2.0
//! The graph: authoritative registry of blocks, ports and connections.
//!
//! All mutation goes through `&mut self` methods; every data-affecting
//! edit synchronously runs an update propagation pass before returning,
//! so callers can immediately read fresh output data.

use crate::block::{Block, BlockBehavior, BlockId, PortBounds};
use crate::data::Metadata;
use crate::error::{DataTypeError, FlowError, GraphCycleError, GraphError, InputOutputError};
use crate::parameter::{Parameter, ParameterValue};
use crate::port::{
    InputId, InputPort, InputSpec, MetadataMode, OutputId, OutputPort, OutputSpec, PortDirection,
};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// A block-diagram graph.
///
/// Owns every block and port; connections are the relation between an
/// input's back-reference and the producing output's fan-out list, kept
/// mutually consistent by [`connect`](Graph::connect) and
/// [`disconnect`](Graph::disconnect).
#[derive(Debug)]
pub struct Graph {
    /// Graph name
    pub name: String,
    pub(crate) blocks: IndexMap<BlockId, Block>,
    pub(crate) inputs: IndexMap<InputId, InputPort>,
    pub(crate) outputs: IndexMap<OutputId, OutputPort>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: IndexMap::new(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }

    /// Add a block and run its first propagation pass, so source blocks
    /// materialize their initial output data before this returns.
    pub fn add_block(&mut self, behavior: Box<dyn BlockBehavior>) -> Result<BlockId, FlowError> {
        let id = self.insert_block(behavior)?;
        self.propagate(&[id])?;
        Ok(id)
    }

    /// Register a block and its initial ports without propagating.
    /// Used by `add_block` and by persistence, which settles all outputs
    /// with one pass at the end of loading.
    pub(crate) fn insert_block(
        &mut self,
        behavior: Box<dyn BlockBehavior>,
    ) -> Result<BlockId, FlowError> {
        let descriptor = behavior.descriptor();
        check_initial_count(
            descriptor.inputs.len(),
            descriptor.dynamic_input,
            PortDirection::Input,
        )?;
        check_initial_count(
            descriptor.outputs.len(),
            descriptor.dynamic_output,
            PortDirection::Output,
        )?;

        let id = BlockId::new();
        let mut inputs = Vec::with_capacity(descriptor.inputs.len());
        for spec in descriptor.inputs {
            inputs.push(self.register_input(InputPort::new(id, spec))?);
        }
        let mut outputs = Vec::with_capacity(descriptor.outputs.len());
        for spec in descriptor.outputs {
            outputs.push(self.register_output(OutputPort::new(id, spec))?);
        }

        debug!(block = descriptor.type_id, ?id, "adding block");
        self.blocks.insert(
            id,
            Block {
                behavior,
                type_id: descriptor.type_id,
                name: descriptor.name,
                inputs,
                outputs,
                parameters: descriptor.parameters.into_iter().collect(),
                dynamic_input: descriptor.dynamic_input,
                dynamic_output: descriptor.dynamic_output,
                process_count: 0,
            },
        );
        Ok(id)
    }

    /// Delete a block: disconnects and removes all its ports, then the
    /// block itself. Former consumers see their inputs go empty and are
    /// recomputed.
    pub fn remove_block(&mut self, id: BlockId) -> Result<(), FlowError> {
        let block = self.blocks.get(&id).ok_or(GraphError::UnknownBlock(id))?;
        let input_ids = block.inputs.clone();
        let output_ids = block.outputs.clone();

        let mut affected = Vec::new();
        for input_id in &input_ids {
            self.sever_input(*input_id);
            self.inputs.shift_remove(input_id);
        }
        for output_id in &output_ids {
            affected.extend(self.sever_output(*output_id));
            self.outputs.shift_remove(output_id);
        }
        self.blocks.shift_remove(&id);
        debug!(?id, "removed block");

        affected.retain(|block_id| *block_id != id);
        affected.dedup();
        self.propagate(&affected)
    }

    /// Connect `input` to `output` (producer to consumer).
    ///
    /// Fails without mutating anything if a port is unknown, the input
    /// already holds a different connection, the data kinds are
    /// incompatible, or the edge would close a cycle. Reconnecting the
    /// identical pair is a no-op. On success the consumer's block and
    /// everything downstream of it are recomputed before returning.
    pub fn connect(&mut self, input: InputId, output: OutputId) -> Result<(), FlowError> {
        let consumer_block = self.connect_edge(input, output)?;
        match consumer_block {
            Some(block) => self.propagate(&[block]),
            None => Ok(()),
        }
    }

    /// Structural part of `connect`; returns the consumer block to
    /// propagate from, or `None` for the no-op case.
    pub(crate) fn connect_edge(
        &mut self,
        input: InputId,
        output: OutputId,
    ) -> Result<Option<BlockId>, FlowError> {
        let input_port = self
            .inputs
            .get(&input)
            .ok_or(GraphError::UnknownInput(input))?;
        let output_port = self
            .outputs
            .get(&output)
            .ok_or(GraphError::UnknownOutput(output))?;

        if input_port.connected == Some(output) {
            return Ok(None);
        }
        if input_port.connected.is_some() {
            return Err(InputOutputError::AlreadyConnected { input }.into());
        }
        if !input_port.kind.accepts(output_port.kind) {
            return Err(DataTypeError::KindMismatch {
                port: input_port.name.clone(),
                expected: input_port.kind,
                actual: output_port.kind,
            }
            .into());
        }
        // Edge direction is producer -> consumer, so the edge closes a
        // cycle exactly when the producer is already downstream of the
        // consumer.
        if self.reaches(input_port.block, output_port.block) {
            return Err(GraphCycleError.into());
        }

        let consumer_block = input_port.block;
        if let Some(port) = self.inputs.get_mut(&input) {
            port.connected = Some(output);
        }
        if let Some(port) = self.outputs.get_mut(&output) {
            port.consumers.push(input);
        }
        debug!(?input, ?output, "connected");
        Ok(Some(consumer_block))
    }

    /// Remove the connection feeding `input`, if any. A no-op when the
    /// input is unconnected. The consumer's block is recomputed so it can
    /// treat the port as empty.
    pub fn disconnect(&mut self, input: InputId) -> Result<(), FlowError> {
        let input_port = self
            .inputs
            .get(&input)
            .ok_or(GraphError::UnknownInput(input))?;
        if input_port.connected.is_none() {
            return Ok(());
        }
        let consumer_block = input_port.block;
        self.sever_input(input);
        debug!(?input, "disconnected");
        self.propagate(&[consumer_block])
    }

    /// Append an input port to a dynamic block.
    pub fn add_input(&mut self, block: BlockId, spec: InputSpec) -> Result<InputId, FlowError> {
        let entry = self
            .blocks
            .get(&block)
            .ok_or(GraphError::UnknownBlock(block))?;
        let bounds = entry
            .dynamic_input
            .ok_or(InputOutputError::NotDynamic(PortDirection::Input))?;
        if bounds.max.is_some_and(|max| entry.inputs.len() >= max) {
            return Err(InputOutputError::UpperBound(PortDirection::Input).into());
        }
        let id = self.register_input(InputPort::new(block, spec))?;
        if let Some(entry) = self.blocks.get_mut(&block) {
            entry.inputs.push(id);
        }
        Ok(id)
    }

    /// Append an output port to a dynamic block. The block is reprocessed
    /// so the new output gets an initial value.
    pub fn add_output(&mut self, block: BlockId, spec: OutputSpec) -> Result<OutputId, FlowError> {
        let entry = self
            .blocks
            .get(&block)
            .ok_or(GraphError::UnknownBlock(block))?;
        let bounds = entry
            .dynamic_output
            .ok_or(InputOutputError::NotDynamic(PortDirection::Output))?;
        if bounds.max.is_some_and(|max| entry.outputs.len() >= max) {
            return Err(InputOutputError::UpperBound(PortDirection::Output).into());
        }
        let id = self.register_output(OutputPort::new(block, spec))?;
        if let Some(entry) = self.blocks.get_mut(&block) {
            entry.outputs.push(id);
        }
        self.propagate(&[block])?;
        Ok(id)
    }

    /// Append a dynamic input using the spec the block's own behavior
    /// declares for that slot. What a GUI's "add input" button calls.
    pub fn grow_input(&mut self, block: BlockId) -> Result<InputId, FlowError> {
        let entry = self
            .blocks
            .get(&block)
            .ok_or(GraphError::UnknownBlock(block))?;
        let spec = entry.behavior.dynamic_input_spec(entry.inputs.len());
        self.add_input(block, spec)
    }

    /// Append a dynamic output using the spec the block's own behavior
    /// declares for that slot.
    pub fn grow_output(&mut self, block: BlockId) -> Result<OutputId, FlowError> {
        let entry = self
            .blocks
            .get(&block)
            .ok_or(GraphError::UnknownBlock(block))?;
        let spec = entry.behavior.dynamic_output_spec(entry.outputs.len());
        self.add_output(block, spec)
    }

    /// Delete the input port at `index` of a dynamic block. Later ports
    /// shift down by one; stale indices must be re-resolved by callers.
    pub fn delete_input(&mut self, block: BlockId, index: usize) -> Result<(), FlowError> {
        let entry = self
            .blocks
            .get(&block)
            .ok_or(GraphError::UnknownBlock(block))?;
        let bounds = entry
            .dynamic_input
            .ok_or(InputOutputError::NotDynamic(PortDirection::Input))?;
        if entry.inputs.len() <= bounds.min {
            return Err(InputOutputError::LowerBound(PortDirection::Input).into());
        }
        if index >= entry.inputs.len() {
            return Err(GraphError::PortIndex(index).into());
        }
        let input_id = entry.inputs[index];
        self.sever_input(input_id);
        self.inputs.shift_remove(&input_id);
        if let Some(entry) = self.blocks.get_mut(&block) {
            entry.inputs.remove(index);
        }
        debug!(?input_id, "deleted input");
        self.propagate(&[block])
    }

    /// Delete the output port at `index` of a dynamic block, cascading a
    /// disconnect to every consumer.
    pub fn delete_output(&mut self, block: BlockId, index: usize) -> Result<(), FlowError> {
        let entry = self
            .blocks
            .get(&block)
            .ok_or(GraphError::UnknownBlock(block))?;
        let bounds = entry
            .dynamic_output
            .ok_or(InputOutputError::NotDynamic(PortDirection::Output))?;
        if entry.outputs.len() <= bounds.min {
            return Err(InputOutputError::LowerBound(PortDirection::Output).into());
        }
        if index >= entry.outputs.len() {
            return Err(GraphError::PortIndex(index).into());
        }
        let output_id = entry.outputs[index];
        let mut affected = self.sever_output(output_id);
        self.outputs.shift_remove(&output_id);
        if let Some(entry) = self.blocks.get_mut(&block) {
            entry.outputs.remove(index);
        }
        debug!(?output_id, "deleted output");
        affected.dedup();
        self.propagate(&affected)
    }

    /// Assign a parameter value. Validation happens before the value
    /// becomes visible; on success the block and its downstream consumers
    /// are recomputed.
    pub fn set_parameter(
        &mut self,
        block: BlockId,
        name: &str,
        value: ParameterValue,
    ) -> Result<(), FlowError> {
        self.set_parameter_value(block, name, value)?;
        self.propagate(&[block])
    }

    /// Validate and assign without propagating (persistence replay).
    pub(crate) fn set_parameter_value(
        &mut self,
        block: BlockId,
        name: &str,
        value: ParameterValue,
    ) -> Result<(), FlowError> {
        let entry = self
            .blocks
            .get_mut(&block)
            .ok_or(GraphError::UnknownBlock(block))?;
        let parameter = entry
            .parameters
            .get_mut(name)
            .ok_or_else(|| crate::error::ParameterError::Missing(name.to_string()))?;
        parameter.set(name, value)?;
        Ok(())
    }

    /// Fire an action parameter (e.g. a saver block's write trigger).
    /// The behavior gets a read-only view of inputs and parameters; graph
    /// data does not change.
    pub fn trigger_action(&mut self, block: BlockId, name: &str) -> Result<(), FlowError> {
        let entry = self
            .blocks
            .get(&block)
            .ok_or(GraphError::UnknownBlock(block))?;
        match entry.parameters.get(name) {
            Some(Parameter::Action(_)) => {}
            Some(_) => {
                return Err(crate::error::ParameterError::WrongKind {
                    name: name.to_string(),
                    expected: "action",
                }
                .into())
            }
            None => {
                return Err(crate::error::ParameterError::Missing(name.to_string()).into());
            }
        }
        let ctx = self.build_context(block)?;
        let entry = self
            .blocks
            .get(&block)
            .ok_or(GraphError::UnknownBlock(block))?;
        entry.behavior.action(name, &ctx)
    }

    /// Replace an output's metadata and fixed/inherit flags, then
    /// recompute the owning block so the new metadata is published.
    pub fn set_output_metadata(
        &mut self,
        output: OutputId,
        metadata: Metadata,
        mode: MetadataMode,
    ) -> Result<(), FlowError> {
        let port = self
            .outputs
            .get_mut(&output)
            .ok_or(GraphError::UnknownOutput(output))?;
        let block = port.block;
        port.metadata = metadata;
        port.metadata_mode = mode;
        self.propagate(&[block])
    }

    /// Get a block by ID.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// All blocks in registration order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().map(|(id, block)| (*id, block))
    }

    /// All block IDs in registration order.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.keys().copied()
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Get an input port by ID.
    pub fn input(&self, id: InputId) -> Option<&InputPort> {
        self.inputs.get(&id)
    }

    /// Get an output port by ID.
    pub fn output(&self, id: OutputId) -> Option<&OutputPort> {
        self.outputs.get(&id)
    }

    fn register_input(&mut self, port: InputPort) -> Result<InputId, GraphError> {
        let id = port.id;
        if self.inputs.contains_key(&id) {
            return Err(GraphError::DuplicateNode);
        }
        self.inputs.insert(id, port);
        Ok(id)
    }

    fn register_output(&mut self, port: OutputPort) -> Result<OutputId, GraphError> {
        let id = port.id;
        if self.outputs.contains_key(&id) {
            return Err(GraphError::DuplicateNode);
        }
        self.outputs.insert(id, port);
        Ok(id)
    }

    /// Drop the connection feeding `input`, fixing up the producer's
    /// fan-out list. Keeps the bidirectional relation consistent.
    fn sever_input(&mut self, input: InputId) {
        let Some(port) = self.inputs.get_mut(&input) else {
            return;
        };
        let Some(output) = port.connected.take() else {
            return;
        };
        if let Some(output_port) = self.outputs.get_mut(&output) {
            output_port.consumers.retain(|consumer| *consumer != input);
        }
    }

    /// Drop every connection fed by `output`; returns the affected
    /// consumer blocks in fan-out order.
    fn sever_output(&mut self, output: OutputId) -> Vec<BlockId> {
        let Some(port) = self.outputs.get_mut(&output) else {
            return Vec::new();
        };
        let consumers = std::mem::take(&mut port.consumers);
        let mut affected = Vec::new();
        for consumer in consumers {
            if let Some(input_port) = self.inputs.get_mut(&consumer) {
                input_port.connected = None;
                affected.push(input_port.block);
            }
        }
        affected
    }

    /// Downstream reachability over producer->consumer edges, inclusive
    /// of `from == to`.
    fn reaches(&self, from: BlockId, to: BlockId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(block) = stack.pop() {
            if block == to {
                return true;
            }
            if !seen.insert(block) {
                continue;
            }
            for consumer in self.consumer_blocks(block) {
                stack.push(consumer);
            }
        }
        false
    }

    /// Blocks directly consuming any output of `block`.
    pub(crate) fn consumer_blocks(&self, block: BlockId) -> Vec<BlockId> {
        let Some(entry) = self.blocks.get(&block) else {
            return Vec::new();
        };
        let mut consumers = Vec::new();
        for output_id in &entry.outputs {
            if let Some(output) = self.outputs.get(output_id) {
                for input_id in &output.consumers {
                    if let Some(input) = self.inputs.get(input_id) {
                        consumers.push(input.block);
                    }
                }
            }
        }
        consumers
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

fn check_initial_count(
    count: usize,
    bounds: Option<PortBounds>,
    direction: PortDirection,
) -> Result<(), InputOutputError> {
    let Some(bounds) = bounds else {
        return Ok(());
    };
    if count < bounds.min {
        return Err(InputOutputError::LowerBound(direction));
    }
    if bounds.max.is_some_and(|max| count > max) {
        return Err(InputOutputError::UpperBound(direction));
    }
    Ok(())
}
