// src/lib.rs
//
// Library entry point: patch/port graph core of a drag-and-drop audio
// composer.

mod audio_buffer;
mod catalog;
mod composer;
mod config;
mod connection;
mod engine;
mod error;
mod event;
mod geometry;
mod graph;
mod interaction;
mod node;
mod node_factory;
mod placement;
mod routing;
mod state;

pub mod nodes;

#[cfg(feature = "web")]
pub mod wasm;

// Re-export key types for Rust consumers
pub use audio_buffer::{DecodeError, SampleBuffer, SharedBuffer};
pub use catalog::NodeCatalog;
pub use composer::Composer;
pub use config::{ComposerConfig, PatchGeometry};
pub use engine::{AudioEngine, Directive};
pub use error::{ComposerError, ComposerResult, ConnectionError, PatchError};
pub use event::{DropOutcome, PatchEvent, RejectReason};
pub use geometry::{Point, Rect};
pub use graph::PatchGraph;
pub use interaction::{Hit, Interaction, Wire};
pub use node::AudioNode;
pub use node_factory::{NodeFactory, SimpleNodeFactory};
pub use placement::{PaletteSlot, PlacementArea};
pub use routing::{Edge, RoutingTable};
pub use state::*;
