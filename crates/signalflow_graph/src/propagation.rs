// SPDX-License-Identifier: MIT OR Apache-2.0
//! Update propagation: after any data-affecting edit, recompute every
//! downstream block exactly once, in dependency order.

use crate::block::{BlockId, OutputWrite, ProcessContext, ResolvedInput};
use crate::error::{FlowError, GraphCycleError, GraphError};
use crate::graph::Graph;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::debug;

impl Graph {
    /// Recompute every block reachable downstream of `roots` (the roots
    /// included), each exactly once, in topological order.
    ///
    /// Scheduling uses Kahn's algorithm restricted to the reachable
    /// subgraph; ties among ready blocks break by registration order, so
    /// passes are deterministic. A block whose `process` fails aborts the
    /// pass: its own outputs keep their prior values and blocks not yet
    /// run stay stale.
    pub(crate) fn propagate(&mut self, roots: &[BlockId]) -> Result<(), FlowError> {
        if roots.is_empty() {
            return Ok(());
        }

        // Forward-reachable subgraph (transitive consumers of the roots).
        let mut scheduled = HashSet::new();
        let mut stack: Vec<BlockId> = roots.to_vec();
        while let Some(block) = stack.pop() {
            if !scheduled.insert(block) {
                continue;
            }
            stack.extend(self.consumer_blocks(block));
        }

        // In-degree per scheduled block, counting only edges whose
        // producer is itself scheduled in this pass.
        let mut indegree: HashMap<BlockId, usize> = HashMap::new();
        for block in &scheduled {
            let mut count = 0;
            if let Some(entry) = self.blocks.get(block) {
                for input_id in &entry.inputs {
                    let producer = self
                        .inputs
                        .get(input_id)
                        .and_then(|input| input.connected)
                        .and_then(|output| self.outputs.get(&output))
                        .map(|output| output.block);
                    if let Some(producer) = producer {
                        if scheduled.contains(&producer) && producer != *block {
                            count += 1;
                        }
                    }
                }
            }
            indegree.insert(*block, count);
        }

        let mut ready = BinaryHeap::new();
        for (block, count) in &indegree {
            if *count == 0 {
                ready.push(Reverse((self.registration_index(*block), *block)));
            }
        }

        debug!(scheduled = scheduled.len(), "propagation pass");
        let mut processed = 0usize;
        while let Some(Reverse((_, block))) = ready.pop() {
            self.process_block(block)?;
            processed += 1;
            for consumer in self.consumer_blocks(block) {
                if consumer == block {
                    continue;
                }
                if let Some(count) = indegree.get_mut(&consumer) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse((self.registration_index(consumer), consumer)));
                    }
                }
            }
        }

        // Every scheduled block must have run; leftovers mean a residual
        // cycle survived the connect-time rejection.
        if processed != scheduled.len() {
            return Err(GraphCycleError.into());
        }
        Ok(())
    }

    /// Invoke one block's `process` and commit its staged output writes.
    ///
    /// Writes land on the ports only after `process` succeeds, so a
    /// failing invocation leaves all outputs at their prior values.
    pub(crate) fn process_block(&mut self, id: BlockId) -> Result<(), FlowError> {
        let mut ctx = self.build_context(id)?;
        let entry = self.blocks.get(&id).ok_or(GraphError::UnknownBlock(id))?;
        entry.behavior.process(&mut ctx)?;
        let writes = ctx.into_writes();
        let output_ids = entry.outputs.clone();

        for (output_id, write) in output_ids.into_iter().zip(writes) {
            let Some(write) = write else {
                continue;
            };
            if let Some(port) = self.outputs.get_mut(&output_id) {
                match write {
                    OutputWrite::Clear => port.data = None,
                    OutputWrite::Publish { data, derived } => {
                        port.metadata = port.effective_metadata(&derived);
                        port.data = Some(data);
                    }
                }
            }
        }
        if let Some(entry) = self.blocks.get_mut(&id) {
            entry.process_count += 1;
        }
        Ok(())
    }

    /// Snapshot a block's inputs and parameters into a process context.
    pub(crate) fn build_context(&self, id: BlockId) -> Result<ProcessContext<'_>, FlowError> {
        let entry = self.blocks.get(&id).ok_or(GraphError::UnknownBlock(id))?;
        let mut inputs = Vec::with_capacity(entry.inputs.len());
        for input_id in &entry.inputs {
            let input = self
                .inputs
                .get(input_id)
                .ok_or(GraphError::UnknownInput(*input_id))?;
            let upstream = input.connected.and_then(|output| self.outputs.get(&output));
            inputs.push(ResolvedInput {
                name: input.name.clone(),
                kind: input.kind,
                data: upstream.and_then(|output| output.data.clone()),
                metadata: upstream.map(|output| output.metadata.clone()),
            });
        }
        Ok(ProcessContext::new(
            inputs,
            entry.outputs.len(),
            &entry.parameters,
        ))
    }

    fn registration_index(&self, block: BlockId) -> usize {
        self.blocks.get_index_of(&block).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::FlowError;
    use crate::graph::Graph;
    use crate::parameter::ParameterValue;
    use crate::testing::{
        output_scalar, FailingBlock, IncrementBlock, ProbeBlock, Recorder, SourceBlock,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn source_feeds_increment_and_disconnect_empties_it() {
        let mut graph = Graph::new("test");
        let source = graph.add_block(Box::new(SourceBlock)).unwrap();
        let increment = graph.add_block(Box::new(IncrementBlock)).unwrap();
        let output = graph.block(source).unwrap().output(0).unwrap();
        let input = graph.block(increment).unwrap().input(0).unwrap();
        let increment_out = graph.block(increment).unwrap().output(0).unwrap();

        graph.connect(input, output).unwrap();
        assert_eq!(output_scalar(&graph, increment_out), Some(2.0));

        graph.disconnect(input).unwrap();
        assert_eq!(output_scalar(&graph, increment_out), None);
    }

    #[test]
    fn reprocessing_unchanged_inputs_is_idempotent() {
        let mut graph = Graph::new("test");
        let source = graph.add_block(Box::new(SourceBlock)).unwrap();
        let increment = graph.add_block(Box::new(IncrementBlock)).unwrap();
        let output = graph.block(source).unwrap().output(0).unwrap();
        let input = graph.block(increment).unwrap().input(0).unwrap();
        let increment_out = graph.block(increment).unwrap().output(0).unwrap();
        graph.connect(input, output).unwrap();

        let before = output_scalar(&graph, increment_out);
        let source_count = graph.block(source).unwrap().process_count();
        let increment_count = graph.block(increment).unwrap().process_count();

        // Re-assigning the same value triggers a pass with unchanged inputs
        graph
            .set_parameter(source, "value", ParameterValue::Float(1.0))
            .unwrap();

        assert_eq!(output_scalar(&graph, increment_out), before);
        assert_eq!(
            graph.block(source).unwrap().process_count(),
            source_count + 1
        );
        assert_eq!(
            graph.block(increment).unwrap().process_count(),
            increment_count + 1
        );
    }

    /// Diamond A -> B, A -> C, B -> D, C -> D: one edit on A runs every
    /// block once, in dependency order, with ties broken by registration
    /// order.
    #[test]
    fn diamond_runs_each_block_exactly_once_in_order() {
        let recorder: Recorder = Rc::new(RefCell::new(Vec::new()));
        let mut graph = Graph::new("test");
        let a = graph
            .add_block(Box::new(ProbeBlock::new("A", 0, &recorder)))
            .unwrap();
        let b = graph
            .add_block(Box::new(ProbeBlock::new("B", 1, &recorder)))
            .unwrap();
        let c = graph
            .add_block(Box::new(ProbeBlock::new("C", 1, &recorder)))
            .unwrap();
        let d = graph
            .add_block(Box::new(ProbeBlock::new("D", 2, &recorder)))
            .unwrap();

        let a_out = graph.block(a).unwrap().output(0).unwrap();
        let b_in = graph.block(b).unwrap().input(0).unwrap();
        let b_out = graph.block(b).unwrap().output(0).unwrap();
        let c_in = graph.block(c).unwrap().input(0).unwrap();
        let c_out = graph.block(c).unwrap().output(0).unwrap();
        let d_in0 = graph.block(d).unwrap().input(0).unwrap();
        let d_in1 = graph.block(d).unwrap().input(1).unwrap();

        graph.connect(b_in, a_out).unwrap();
        graph.connect(c_in, a_out).unwrap();
        graph.connect(d_in0, b_out).unwrap();
        graph.connect(d_in1, c_out).unwrap();

        let d_count = graph.block(d).unwrap().process_count();
        recorder.borrow_mut().clear();

        graph
            .set_parameter(a, "value", ParameterValue::Float(2.0))
            .unwrap();

        assert_eq!(*recorder.borrow(), vec!["A", "B", "C", "D"]);
        assert_eq!(graph.block(d).unwrap().process_count(), d_count + 1);

        // A emits 2, B and C emit 3, D emits 3 + 3 + 1
        let d_out = graph.block(d).unwrap().output(0).unwrap();
        assert_eq!(output_scalar(&graph, d_out), Some(7.0));
    }

    #[test]
    fn failing_block_aborts_the_pass_and_leaves_downstream_stale() {
        let mut graph = Graph::new("test");
        let source = graph.add_block(Box::new(SourceBlock)).unwrap();
        let failing = graph.add_block(Box::new(FailingBlock)).unwrap();
        let increment = graph.add_block(Box::new(IncrementBlock)).unwrap();

        let source_out = graph.block(source).unwrap().output(0).unwrap();
        let failing_in = graph.block(failing).unwrap().input(0).unwrap();
        let failing_out = graph.block(failing).unwrap().output(0).unwrap();
        let increment_in = graph.block(increment).unwrap().input(0).unwrap();

        graph.connect(increment_in, failing_out).unwrap();
        let increment_count = graph.block(increment).unwrap().process_count();

        // Feeding the failing block makes its process error out
        let err = graph.connect(failing_in, source_out).unwrap_err();
        assert!(matches!(err, FlowError::DataType(_)));

        // The edit itself persists; the failed block's outputs keep their
        // prior (empty) value and downstream was never rerun
        assert_eq!(
            graph.input(failing_in).unwrap().connected_output(),
            Some(source_out)
        );
        assert_eq!(output_scalar(&graph, failing_out), None);
        assert_eq!(
            graph.block(increment).unwrap().process_count(),
            increment_count
        );
    }

    #[test]
    fn unrelated_blocks_are_not_rescheduled() {
        let mut graph = Graph::new("test");
        let edited = graph.add_block(Box::new(SourceBlock)).unwrap();
        let unrelated = graph.add_block(Box::new(SourceBlock)).unwrap();
        let unrelated_count = graph.block(unrelated).unwrap().process_count();

        graph
            .set_parameter(edited, "value", ParameterValue::Float(3.0))
            .unwrap();
        assert_eq!(
            graph.block(unrelated).unwrap().process_count(),
            unrelated_count
        );
    }
}
