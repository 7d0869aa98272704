// src/placement.rs
//
// Palette and canvas bookkeeping plus the placement state machine.
//
// Transitions:
//
//   InPalette --pick_up--> Dragging --drop_patch--> OnCanvas
//                              |
//                              +--(rejected)--> discarded, slot keeps its
//                                               replacement
//   OnCanvas --move_on_canvas--> OnCanvas (trash armed or not)
//   OnCanvas --release_on_canvas(armed)--> Deleted
//
// Every palette slot holds exactly one live patch at all times: the
// replacement is created before the picked-up patch leaves the slot.
//
// The palette strip scrolls horizontally when its slots are wider than the
// stage. Palette patches are kept at their scrolled positions, and only the
// part of the strip inside the palette bounds can be hit.

use crate::config::ComposerConfig;
use crate::engine::AudioEngine;
use crate::error::{ComposerResult, PatchError};
use crate::event::{DropOutcome, PatchEvent, RejectReason};
use crate::geometry::Point;
use crate::graph::PatchGraph;
use crate::state::{Location, NodeType, PatchId};

/// One palette slot and the patch currently offered in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteSlot {
    pub node_type: NodeType,
    pub slot: usize,
    pub patch: PatchId,
}

/// The palette strip, the canvas and the lifecycle event queue.
#[derive(Debug)]
pub struct PlacementArea {
    config: ComposerConfig,
    slots: Vec<PaletteSlot>,
    /// Horizontal palette scroll, in `0.0..=max_scroll()`.
    scroll: f32,
    /// Canvas patches in placement order; hit-testing is first-match.
    canvas: Vec<PatchId>,
    events: Vec<PatchEvent>,
}

impl PlacementArea {
    /// Fill one palette slot per offered node type.
    pub fn new<E: AudioEngine>(
        config: ComposerConfig,
        graph: &mut PatchGraph<E>,
    ) -> Result<Self, PatchError> {
        let mut area = Self {
            config,
            slots: Vec::new(),
            scroll: 0.0,
            canvas: Vec::new(),
            events: Vec::new(),
        };

        for node_type in graph.catalog().list_palette_types() {
            let Some(slot) = graph
                .catalog()
                .describe(node_type)
                .and_then(|d| d.palette_slot)
            else {
                continue;
            };
            let patch = area.stock(graph, node_type, slot)?;
            area.slots.push(PaletteSlot {
                node_type,
                slot,
                patch,
            });
        }

        log::debug!("palette populated with {} slot(s)", area.slots.len());
        Ok(area)
    }

    /// Create the palette instance for `slot`.
    fn stock<E: AudioEngine>(
        &mut self,
        graph: &mut PatchGraph<E>,
        node_type: NodeType,
        slot: usize,
    ) -> Result<PatchId, PatchError> {
        let position = self.slot_position(slot);
        let patch = graph.create_patch(node_type, Location::InPalette, position)?;
        self.emit(PatchEvent::Created { patch, node_type });
        Ok(patch)
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn slots(&self) -> &[PaletteSlot] {
        &self.slots
    }

    /// Centre of a palette slot with the current scroll applied.
    pub fn slot_position(&self, slot: usize) -> Point {
        self.config.slot_position(slot) - Point::new(self.scroll, 0.0)
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// How far the strip can scroll before its last slot is fully shown.
    pub fn max_scroll(&self) -> f32 {
        let Some(last) = self.slots.iter().map(|s| s.slot).max() else {
            return 0.0;
        };
        let right = self.config.slot_position(last).x
            + self.config.patch.width / 2.0
            + self.config.patch_margin;
        (right - self.config.stage_width).max(0.0)
    }

    /// Scroll the strip by `delta` (positive reveals slots further right).
    ///
    /// The offset is clamped to `0.0..=max_scroll()` and every palette
    /// patch follows it. Returns the new offset.
    pub fn scroll_palette<E: AudioEngine>(
        &mut self,
        graph: &mut PatchGraph<E>,
        delta: f32,
    ) -> Result<f32, PatchError> {
        let scroll = (self.scroll + delta).clamp(0.0, self.max_scroll());
        if scroll == self.scroll {
            return Ok(scroll);
        }

        self.scroll = scroll;
        for i in 0..self.slots.len() {
            let PaletteSlot { slot, patch, .. } = self.slots[i];
            graph.set_position(patch, self.slot_position(slot))?;
        }
        log::trace!("palette scrolled to {}", scroll);
        Ok(scroll)
    }

    /// The patch currently offered for `node_type`.
    pub fn palette_patch(&self, node_type: NodeType) -> Option<PatchId> {
        self.slots
            .iter()
            .find(|s| s.node_type == node_type)
            .map(|s| s.patch)
    }

    pub fn canvas_patches(&self) -> &[PatchId] {
        &self.canvas
    }

    pub fn is_on_canvas(&self, patch: PatchId) -> bool {
        self.canvas.contains(&patch)
    }

    /// Number of canvas patches of `node_type`.
    pub fn canvas_count<E: AudioEngine>(&self, graph: &PatchGraph<E>, node_type: NodeType) -> usize {
        self.canvas
            .iter()
            .filter(|&&id| graph.patch(id).is_some_and(|p| p.node_type() == node_type))
            .count()
    }

    /// Whether one more `node_type` patch may enter the canvas.
    pub fn has_capacity<E: AudioEngine>(&self, graph: &PatchGraph<E>, node_type: NodeType) -> bool {
        graph
            .catalog()
            .describe(node_type)
            .is_some_and(|d| d.max_instances.allows(self.canvas_count(graph, node_type)))
    }

    /// First canvas patch whose bounds include `point`.
    pub fn patch_under_point<E: AudioEngine>(
        &self,
        graph: &PatchGraph<E>,
        point: Point,
    ) -> Option<PatchId> {
        self.canvas.iter().copied().find(|&id| {
            graph
                .patch_bounds(id)
                .is_some_and(|bounds| bounds.includes(point))
        })
    }

    /// Palette patch whose bounds include `point`. Points outside the
    /// visible strip hit nothing.
    pub fn palette_patch_under_point<E: AudioEngine>(
        &self,
        graph: &PatchGraph<E>,
        point: Point,
    ) -> Option<PatchId> {
        if !self.config.palette_bounds().includes(point) {
            return None;
        }
        self.slots.iter().map(|s| s.patch).find(|&id| {
            graph
                .patch_bounds(id)
                .is_some_and(|bounds| bounds.includes(point))
        })
    }

    pub(crate) fn emit(&mut self, event: PatchEvent) {
        self.events.push(event);
    }

    /// Take every queued lifecycle event, oldest first.
    pub fn drain_events(&mut self) -> Vec<PatchEvent> {
        std::mem::take(&mut self.events)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Transitions
    // ═══════════════════════════════════════════════════════════════════

    fn expect_location<E: AudioEngine>(
        graph: &PatchGraph<E>,
        patch: PatchId,
        expected: Location,
    ) -> Result<(), PatchError> {
        let actual = graph
            .patch(patch)
            .map(|p| p.location())
            .ok_or(PatchError::UnknownPatch(patch))?;
        if actual != expected {
            return Err(PatchError::UnexpectedLocation {
                patch,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// `InPalette -> Dragging`. The slot is restocked first.
    pub fn pick_up<E: AudioEngine>(
        &mut self,
        graph: &mut PatchGraph<E>,
        patch: PatchId,
        point: Point,
    ) -> Result<(), PatchError> {
        Self::expect_location(graph, patch, Location::InPalette)?;
        let index = self
            .slots
            .iter()
            .position(|s| s.patch == patch)
            .ok_or(PatchError::UnknownPatch(patch))?;

        let PaletteSlot {
            node_type, slot, ..
        } = self.slots[index];
        let replacement = self.stock(graph, node_type, slot)?;
        self.slots[index].patch = replacement;

        graph.set_location(patch, Location::Dragging)?;
        graph.set_position(patch, point)?;
        log::debug!("picked up {} patch {:?}", node_type, patch);
        Ok(())
    }

    /// Follow the pointer while dragging out of the palette.
    pub fn drag_to<E: AudioEngine>(
        &mut self,
        graph: &mut PatchGraph<E>,
        patch: PatchId,
        point: Point,
    ) -> Result<(), PatchError> {
        Self::expect_location(graph, patch, Location::Dragging)?;
        graph.set_position(patch, point)
    }

    /// Clear the wiring of every output then every input of `patch`.
    fn unwire<E: AudioEngine>(graph: &mut PatchGraph<E>, patch: PatchId) -> ComposerResult<()> {
        let (outputs, inputs) = match graph.patch(patch) {
            Some(p) => (p.outputs().to_vec(), p.inputs().to_vec()),
            None => return Err(PatchError::UnknownPatch(patch).into()),
        };
        for port in outputs.into_iter().chain(inputs) {
            graph.disconnect_all(port)?;
        }
        debug_assert!(!graph.is_wired(patch));
        Ok(())
    }

    /// `Dragging -> OnCanvas`, or discard the patch.
    ///
    /// The drop lands only if `point` is inside the canvas and the type is
    /// under its instance limit. A rejected patch is unwired and released,
    /// and a `Rejected` event carries its slot position for the return
    /// animation.
    pub fn drop_patch<E: AudioEngine>(
        &mut self,
        graph: &mut PatchGraph<E>,
        patch: PatchId,
        point: Point,
    ) -> ComposerResult<DropOutcome> {
        Self::expect_location(graph, patch, Location::Dragging)?;
        let node_type = graph
            .patch(patch)
            .map(|p| p.node_type())
            .ok_or(PatchError::UnknownPatch(patch))?;

        let reason = if !self.config.canvas_bounds().includes(point) {
            Some(RejectReason::OutsideCanvas)
        } else if !self.has_capacity(graph, node_type) {
            log::warn!("{} is at its instance limit; drop refused", node_type);
            Some(RejectReason::InstanceLimitExceeded)
        } else {
            None
        };

        if let Some(reason) = reason {
            let return_to = self
                .slots
                .iter()
                .find(|s| s.node_type == node_type)
                .map_or(point, |s| self.slot_position(s.slot));
            Self::unwire(graph, patch)?;
            graph.delete_patch(patch)?;
            self.emit(PatchEvent::Rejected {
                patch,
                reason,
                return_to,
            });
            log::debug!("rejected {} patch {:?}: {:?}", node_type, patch, reason);
            return Ok(DropOutcome::Rejected(reason));
        }

        graph.set_position(patch, point)?;
        graph.set_location(patch, Location::OnCanvas)?;
        self.canvas.push(patch);
        self.emit(PatchEvent::EnteredCanvas { patch });
        log::info!("{} patch {:?} placed at ({}, {})", node_type, patch, point.x, point.y);
        Ok(DropOutcome::Placed)
    }

    /// Drag a canvas patch. Returns whether it is now over the trash target.
    ///
    /// The patch only follows the pointer while the pointer is inside the
    /// canvas. A `TrashHover` event is emitted when the armed flag flips.
    pub fn move_on_canvas<E: AudioEngine>(
        &mut self,
        graph: &mut PatchGraph<E>,
        patch: PatchId,
        point: Point,
        was_armed: bool,
    ) -> Result<bool, PatchError> {
        Self::expect_location(graph, patch, Location::OnCanvas)?;
        if self.config.canvas_bounds().includes(point) {
            graph.set_position(patch, point)?;
        }

        let armed = graph
            .patch_bounds(patch)
            .is_some_and(|bounds| bounds.intersects(&self.config.trash_bounds()));
        if armed != was_armed {
            self.emit(PatchEvent::TrashHover { patch, armed });
        }
        Ok(armed)
    }

    /// End a canvas drag. Returns true if the patch was deleted.
    pub fn release_on_canvas<E: AudioEngine>(
        &mut self,
        graph: &mut PatchGraph<E>,
        patch: PatchId,
        armed: bool,
    ) -> ComposerResult<bool> {
        if !armed {
            return Ok(false);
        }
        self.delete(graph, patch)?;
        Ok(true)
    }

    /// `OnCanvas -> Deleted`.
    ///
    /// Clears the wiring of every output then every input, takes the patch
    /// off the canvas and releases it.
    pub fn delete<E: AudioEngine>(
        &mut self,
        graph: &mut PatchGraph<E>,
        patch: PatchId,
    ) -> ComposerResult<()> {
        Self::expect_location(graph, patch, Location::OnCanvas)?;
        let node_type = graph
            .patch(patch)
            .map(|p| p.node_type())
            .ok_or(PatchError::UnknownPatch(patch))?;
        Self::unwire(graph, patch)?;

        self.canvas.retain(|&id| id != patch);
        graph.delete_patch(patch)?;
        self.emit(PatchEvent::Deleted { patch });
        log::info!("{} patch {:?} deleted", node_type, patch);
        Ok(())
    }

    /// Put a disabled patch straight onto the canvas, as for a file drop.
    ///
    /// Returns `None` when `point` is outside the canvas or the type is at
    /// its instance limit.
    pub fn place_loading<E: AudioEngine>(
        &mut self,
        graph: &mut PatchGraph<E>,
        node_type: NodeType,
        point: Point,
    ) -> Result<Option<PatchId>, PatchError> {
        if !self.config.canvas_bounds().includes(point) {
            log::debug!("file drop outside the canvas ignored");
            return Ok(None);
        }
        if !self.has_capacity(graph, node_type) {
            log::warn!("{} is at its instance limit; file drop ignored", node_type);
            return Ok(None);
        }

        let patch = graph.create_patch(node_type, Location::OnCanvas, point)?;
        graph.set_enabled(patch, false)?;
        self.canvas.push(patch);
        self.emit(PatchEvent::Created { patch, node_type });
        self.emit(PatchEvent::EnteredCanvas { patch });
        log::info!("{} patch {:?} placed, loading", node_type, patch);
        Ok(Some(patch))
    }
}
