// src/state/patch.rs
//
// A placed instance of a node type.

use std::fmt;

use slotmap::new_key_type;

use super::{NodeType, PortDirection, PortId};
use crate::config::PatchGeometry;
use crate::geometry::{Point, Rect};
use crate::node::AudioNode;

new_key_type! {
    /// Stable identifier for a patch. Keys of deleted patches are never reused.
    pub struct PatchId;
}

/// Where a patch currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    InPalette,
    Dragging,
    OnCanvas,
    Deleted,
}

/// An instance of a node type with its fixed set of ports.
///
/// Port counts never change after construction; only the location, the
/// position and the wiring of the ports do.
pub struct Patch {
    pub(crate) id: PatchId,
    pub(crate) node_type: NodeType,
    pub(crate) location: Location,
    pub(crate) position: Point,
    /// False while a dropped file is still decoding.
    pub(crate) enabled: bool,
    pub(crate) inputs: Vec<PortId>,
    pub(crate) outputs: Vec<PortId>,
    /// `None` once the node has been released.
    pub(crate) node: Option<Box<dyn AudioNode>>,
}

impl Patch {
    pub fn id(&self) -> PatchId {
        self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn inputs(&self) -> &[PortId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PortId] {
        &self.outputs
    }

    pub fn ports(&self, direction: PortDirection) -> &[PortId] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    /// Every port, outputs first.
    pub fn all_ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.outputs.iter().chain(self.inputs.iter()).copied()
    }

    pub fn node(&self) -> Option<&dyn AudioNode> {
        self.node.as_deref()
    }

    pub fn node_mut(&mut self) -> Option<&mut (dyn AudioNode + 'static)> {
        self.node.as_deref_mut()
    }

    pub fn bounds(&self, geometry: &PatchGeometry) -> Rect {
        geometry.bounds(self.position)
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patch")
            .field("id", &self.id)
            .field("node_type", &self.node_type)
            .field("location", &self.location)
            .field("position", &self.position)
            .field("enabled", &self.enabled)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("released", &self.node.is_none())
            .finish()
    }
}
