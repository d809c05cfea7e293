// SPDX-License-Identifier: MIT OR Apache-2.0
//! Standard processing blocks for the signalflow editor.
//!
//! Every block implements `signalflow_graph`'s `BlockBehavior` contract:
//! guard clauses for the empty-input policies first, then kind and
//! unit/interval validation, then the actual computation.

pub mod absolute;
pub mod adder;
pub mod amplifier;
pub mod divider;
pub mod generator;
mod helpers;
pub mod multiplier;
pub mod saver;

#[cfg(test)]
pub(crate) mod testutil;

pub use absolute::Absolute;
pub use adder::Adder;
pub use amplifier::Amplifier;
pub use divider::Divider;
pub use generator::SignalGenerator;
pub use multiplier::Multiplier;
pub use saver::SignalSaver;

use signalflow_graph::BlockLibrary;

/// Library with every standard block registered, for persistence and
/// block palettes.
pub fn standard_library() -> BlockLibrary {
    let mut library = BlockLibrary::new();
    library.register(|| Box::new(SignalGenerator));
    library.register(|| Box::new(Adder));
    library.register(|| Box::new(Multiplier));
    library.register(|| Box::new(Divider));
    library.register(|| Box::new(Amplifier));
    library.register(|| Box::new(Absolute));
    library.register(|| Box::new(SignalSaver));
    library
}
