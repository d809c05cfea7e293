// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dataflow core for the signalflow block-diagram editor.
//!
//! Users compose processing blocks into a directed acyclic graph; the
//! core propagates signal data through connected ports so every edit
//! leaves all downstream outputs freshly computed.
//!
//! ## Architecture
//!
//! - [`Graph`] owns all blocks and ports and is the sole source of truth
//!   for connectivity. Every mutating operation runs synchronously and
//!   triggers an update propagation pass before returning.
//! - [`BlockBehavior`] is the computation contract: read inputs, stage
//!   output writes, all-or-nothing commit.
//! - Dynamic blocks may grow or shrink their port lists within declared
//!   bounds.
//! - The propagation engine schedules the downstream subgraph with
//!   Kahn's algorithm: each affected block runs exactly once, in
//!   dependency order, deterministically.

pub mod block;
pub mod data;
pub mod error;
pub mod graph;
pub mod library;
pub mod parameter;
pub mod port;
mod propagation;
pub mod save;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use block::{Block, BlockBehavior, BlockDescriptor, BlockId, PortBounds, ProcessContext};
pub use data::{Data, DataKind, Metadata, Signal, Unit};
pub use error::{
    DataSavingError, DataTypeError, FlowError, GraphCycleError, GraphError, InputOutputError,
    ParameterError,
};
pub use graph::Graph;
pub use library::BlockLibrary;
pub use parameter::{Parameter, ParameterValue};
pub use port::{InputId, InputSpec, MetadataMode, OutputId, OutputSpec, PortDirection};
