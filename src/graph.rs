//! Patch and port arena.
//!
//! [`PatchGraph`] owns every live patch and port, the node catalog used to
//! construct them, and the [`AudioEngine`] their wiring is issued to. The
//! connection protocol (`crate::connection`) and the placement state machine
//! (`crate::placement`) are both layered on top of it.

use slotmap::SlotMap;

use crate::audio_buffer::SharedBuffer;
use crate::catalog::NodeCatalog;
use crate::config::PatchGeometry;
use crate::engine::AudioEngine;
use crate::error::PatchError;
use crate::geometry::{Point, Rect};
use crate::state::{Location, NodeType, ParamId, Patch, PatchId, Port, PortDirection, PortId};

/// Arena of patches and ports plus the engine they drive.
pub struct PatchGraph<E: AudioEngine> {
    catalog: NodeCatalog,
    geometry: PatchGeometry,
    pub(crate) patches: SlotMap<PatchId, Patch>,
    pub(crate) ports: SlotMap<PortId, Port>,
    pub(crate) engine: E,
}

impl<E: AudioEngine> PatchGraph<E> {
    pub fn new(catalog: NodeCatalog, geometry: PatchGeometry, engine: E) -> Self {
        Self {
            catalog,
            geometry,
            patches: SlotMap::with_key(),
            ports: SlotMap::with_key(),
            engine,
        }
    }

    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    pub fn geometry(&self) -> &PatchGeometry {
        &self.geometry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn patch(&self, id: PatchId) -> Option<&Patch> {
        self.patches.get(id)
    }

    pub(crate) fn patch_mut(&mut self, id: PatchId) -> Result<&mut Patch, PatchError> {
        self.patches.get_mut(id).ok_or(PatchError::UnknownPatch(id))
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id)
    }

    /// Iterate over all live patches, in no particular order.
    pub fn patches(&self) -> impl Iterator<Item = &Patch> {
        self.patches.values()
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Location of a patch; ids of discarded patches report `Deleted`.
    pub fn location(&self, id: PatchId) -> Location {
        self.patches
            .get(id)
            .map_or(Location::Deleted, |p| p.location)
    }

    /// Build a patch of `node_type`.
    ///
    /// The processing node comes from the catalog's factory; one port is
    /// allocated per declared input and output, with channels numbered
    /// from zero in declaration order.
    pub fn create_patch(
        &mut self,
        node_type: NodeType,
        location: Location,
        position: Point,
    ) -> Result<PatchId, PatchError> {
        let node = self
            .catalog
            .build(node_type)
            .ok_or(PatchError::UnregisteredType(node_type))?;
        let (num_inputs, num_outputs) = (node.num_inputs(), node.num_outputs());

        let id = self.patches.insert_with_key(|id| Patch {
            id,
            node_type,
            location,
            position,
            enabled: true,
            inputs: Vec::with_capacity(num_inputs),
            outputs: Vec::with_capacity(num_outputs),
            node: Some(node),
        });

        let geometry = self.geometry;
        let inputs: Vec<PortId> = (0..num_inputs)
            .map(|ch| {
                let offset = geometry.port_offset(true, ch, num_inputs);
                self.ports
                    .insert(Port::new(id, PortDirection::Input, ch, offset))
            })
            .collect();
        let outputs: Vec<PortId> = (0..num_outputs)
            .map(|ch| {
                let offset = geometry.port_offset(false, ch, num_outputs);
                self.ports
                    .insert(Port::new(id, PortDirection::Output, ch, offset))
            })
            .collect();

        let patch = self.patch_mut(id)?;
        patch.inputs = inputs;
        patch.outputs = outputs;

        self.engine.add_node(id, num_inputs, num_outputs);

        log::debug!(
            "created {} patch {:?} ({} in / {} out) in {:?}",
            node_type,
            id,
            num_inputs,
            num_outputs,
            location
        );
        Ok(id)
    }

    /// Whether any port of the patch has peers.
    pub fn is_wired(&self, id: PatchId) -> bool {
        self.patches.get(id).is_some_and(|patch| {
            patch
                .all_ports()
                .any(|p| self.ports.get(p).is_some_and(Port::is_connected))
        })
    }

    /// Discard a patch: free its ports, release its node and drop it.
    ///
    /// Fails with `StillWired` if any port has peers; run
    /// `disconnect_all` on every port first.
    pub fn delete_patch(&mut self, id: PatchId) -> Result<(), PatchError> {
        if !self.patches.contains_key(id) {
            return Err(PatchError::UnknownPatch(id));
        }
        if self.is_wired(id) {
            return Err(PatchError::StillWired(id));
        }

        let Some(mut patch) = self.patches.remove(id) else {
            return Err(PatchError::UnknownPatch(id));
        };
        for port in patch.all_ports() {
            self.ports.remove(port);
        }
        if let Some(mut node) = patch.node.take() {
            node.release();
        }
        self.engine.remove_node(id);

        log::debug!("released {} patch {:?}", patch.node_type, id);
        Ok(())
    }

    pub(crate) fn set_location(&mut self, id: PatchId, location: Location) -> Result<(), PatchError> {
        self.patch_mut(id)?.location = location;
        Ok(())
    }

    pub(crate) fn set_position(&mut self, id: PatchId, position: Point) -> Result<(), PatchError> {
        self.patch_mut(id)?.position = position;
        Ok(())
    }

    pub(crate) fn set_enabled(&mut self, id: PatchId, enabled: bool) -> Result<(), PatchError> {
        self.patch_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Bounds of a patch in stage coordinates.
    pub fn patch_bounds(&self, id: PatchId) -> Option<Rect> {
        self.patches.get(id).map(|p| p.bounds(&self.geometry))
    }

    /// Centre of a port in stage coordinates.
    pub fn port_position(&self, id: PortId) -> Option<Point> {
        let port = self.ports.get(id)?;
        let owner = self.patches.get(port.owner())?;
        Some(owner.position + port.offset())
    }

    /// First port of `direction` on `patch` whose hit box contains `point`.
    pub fn port_under_point(
        &self,
        patch: PatchId,
        direction: PortDirection,
        point: Point,
    ) -> Option<PortId> {
        let owner = self.patches.get(patch)?;
        owner.ports(direction).iter().copied().find(|&id| {
            self.ports.get(id).is_some_and(|port| {
                self.geometry
                    .port_bounds(owner.position + port.offset())
                    .includes(point)
            })
        })
    }

    /// Forward a parameter value to the patch's node, clamped to the
    /// parameter's declared range.
    pub fn set_param(&mut self, id: PatchId, param: ParamId, value: f32) -> Result<(), PatchError> {
        let node_type = self
            .patches
            .get(id)
            .map(|p| p.node_type)
            .ok_or(PatchError::UnknownPatch(id))?;
        let value = self
            .catalog
            .describe(node_type)
            .and_then(|d| d.find_param(param))
            .map_or(value, |info| info.clamp(value));

        let patch = self.patch_mut(id)?;
        if let Some(node) = patch.node_mut() {
            node.set_param(param, value);
        }
        Ok(())
    }

    /// Hand decoded sample data to the patch's node.
    pub fn load_buffer(&mut self, id: PatchId, buffer: SharedBuffer) -> Result<(), PatchError> {
        let patch = self.patch_mut(id)?;
        if let Some(node) = patch.node_mut() {
            node.load_buffer(buffer);
        }
        Ok(())
    }
}
