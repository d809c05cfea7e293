// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of available block types.

use crate::block::{BlockBehavior, BlockDescriptor};
use indexmap::IndexMap;

/// Constructor for a block behavior.
pub type BlockConstructor = fn() -> Box<dyn BlockBehavior>;

/// Registry of block constructors keyed by type id. Persistence uses it
/// to reconstruct saved blocks; a host UI can enumerate it to offer the
/// available block palette.
#[derive(Default)]
pub struct BlockLibrary {
    constructors: IndexMap<String, BlockConstructor>,
}

impl BlockLibrary {
    /// Create a new empty library.
    pub fn new() -> Self {
        Self {
            constructors: IndexMap::new(),
        }
    }

    /// Register a block type. The type id is taken from the descriptor
    /// of a probe instance.
    pub fn register(&mut self, constructor: BlockConstructor) {
        let type_id = constructor().descriptor().type_id;
        self.constructors.insert(type_id.to_string(), constructor);
    }

    /// Create a block behavior by type id.
    pub fn create(&self, type_id: &str) -> Option<Box<dyn BlockBehavior>> {
        self.constructors.get(type_id).map(|constructor| constructor())
    }

    /// Registered type ids, in registration order.
    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Descriptors of all registered types, for palette display.
    pub fn descriptors(&self) -> impl Iterator<Item = BlockDescriptor> + '_ {
        self.constructors
            .values()
            .map(|constructor| constructor().descriptor())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// True when no types are registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
