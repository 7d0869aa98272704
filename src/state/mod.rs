// src/state/mod.rs
//
// Data model for the composer.
//
// This module contains the plain data the rest of the crate manipulates:
// node type descriptors, patches, ports and the gestures that drive them.
//
// Key principles:
// - Patches and ports are addressed by arena keys, never by reference
// - Ports point back at their patch for lookup only
// - Wiring is mutated exclusively by the connection protocol

mod descriptor;
mod gesture;
mod param_info;
mod patch;
mod port;

pub use descriptor::*;
pub use gesture::*;
pub use param_info::*;
pub use patch::*;
pub use port::*;
