// src/state/port.rs
//
// Wiring terminals.
//
// Ports live in the graph's port arena and refer to each other by key.
// The peer relation is always mutual; only the connection protocol in
// `crate::connection` mutates it.

use slotmap::new_key_type;

use super::PatchId;
use crate::geometry::Point;

new_key_type! {
    /// Stable identifier for a port.
    pub struct PortId;
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn opposite(self) -> Self {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        }
    }
}

/// A typed connection terminal owned by exactly one patch.
#[derive(Debug, Clone)]
pub struct Port {
    /// Owning patch; lookup only, the patch controls the port's lifetime.
    owner: PatchId,
    direction: PortDirection,
    /// Index within the owner's ports of this direction.
    channel: usize,
    /// Centre of the hit box relative to the owner's centre.
    offset: Point,
    /// Wiring partners in connection order.
    peers: Vec<PortId>,
}

impl Port {
    pub(crate) fn new(owner: PatchId, direction: PortDirection, channel: usize, offset: Point) -> Self {
        Self {
            owner,
            direction,
            channel,
            offset,
            peers: Vec::new(),
        }
    }

    pub fn owner(&self) -> PatchId {
        self.owner
    }

    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn peers(&self) -> &[PortId] {
        &self.peers
    }

    pub fn is_connected(&self) -> bool {
        !self.peers.is_empty()
    }

    pub fn has_peer(&self, peer: PortId) -> bool {
        self.peers.contains(&peer)
    }

    /// Returns false if `peer` was already present.
    pub(crate) fn add_peer(&mut self, peer: PortId) -> bool {
        if self.has_peer(peer) {
            return false;
        }
        self.peers.push(peer);
        true
    }

    pub(crate) fn remove_peer(&mut self, peer: PortId) -> bool {
        let before = self.peers.len();
        self.peers.retain(|&p| p != peer);
        self.peers.len() != before
    }

    pub(crate) fn take_peers(&mut self) -> Vec<PortId> {
        std::mem::take(&mut self.peers)
    }
}
