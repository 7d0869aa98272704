//! The composer façade.
//!
//! [`Composer`] ties the patch arena, the placement area and the
//! interaction session together behind one gesture entry point.
//!
//! # Architecture
//!
//! - **UI layer** delivers [`Gesture`]s and drains [`PatchEvent`]s
//! - **Composer** owns every patch, port and palette slot
//! - **Engine** receives physical wiring directives through [`AudioEngine`]
//!
//! Everything runs to completion on the caller's thread.
//!
//! # Usage
//!
//! ```ignore
//! let mut composer = Composer::new(ComposerConfig::default())?;
//!
//! // UI layer: forward pointer gestures
//! composer.handle(Gesture::DragStart { point, target: None })?;
//! composer.handle(Gesture::DragRelease { point })?;
//!
//! // Presentation layer: react to lifecycle changes
//! for event in composer.drain_events() { /* ... */ }
//! ```

use crate::audio_buffer::{DecodeError, SharedBuffer};
use crate::catalog::NodeCatalog;
use crate::config::ComposerConfig;
use crate::engine::AudioEngine;
use crate::error::{ComposerResult, PatchError};
use crate::event::PatchEvent;
use crate::geometry::Point;
use crate::graph::PatchGraph;
use crate::interaction::{Hit, Interaction, Wire};
use crate::nodes::channel_label;
use crate::placement::PlacementArea;
use crate::routing::RoutingTable;
use crate::state::{
    Gesture, GestureTarget, Location, NodeType, ParamId, Patch, PatchId, PortDirection, PortId,
};

/// Patch/port graph editor driven by pointer gestures.
pub struct Composer<E: AudioEngine = RoutingTable> {
    graph: PatchGraph<E>,
    area: PlacementArea,
    interaction: Interaction,
    /// Canvas patch whose parameters are shown.
    selected: Option<PatchId>,
}

impl Composer<RoutingTable> {
    /// A composer with the standard catalog and an in-memory routing table.
    pub fn new(config: ComposerConfig) -> ComposerResult<Self> {
        Self::with_engine(config, NodeCatalog::standard(), RoutingTable::new())
    }
}

impl<E: AudioEngine> Composer<E> {
    /// Build a composer over a custom catalog and engine. The palette is
    /// stocked immediately; its `Created` events are queued.
    pub fn with_engine(config: ComposerConfig, catalog: NodeCatalog, engine: E) -> ComposerResult<Self> {
        let mut graph = PatchGraph::new(catalog, config.patch, engine);
        let area = PlacementArea::new(config, &mut graph)?;
        log::info!(
            "composer ready: {}x{} stage, {} palette slot(s)",
            config.stage_width,
            config.stage_height,
            area.slots().len()
        );
        Ok(Self {
            graph,
            area,
            interaction: Interaction::Idle,
            selected: None,
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════

    pub fn catalog(&self) -> &NodeCatalog {
        self.graph.catalog()
    }

    pub fn config(&self) -> &ComposerConfig {
        self.area.config()
    }

    pub fn graph(&self) -> &PatchGraph<E> {
        &self.graph
    }

    pub fn placement(&self) -> &PlacementArea {
        &self.area
    }

    pub fn engine(&self) -> &E {
        self.graph.engine()
    }

    pub fn engine_mut(&mut self) -> &mut E {
        self.graph.engine_mut()
    }

    pub fn patch(&self, id: PatchId) -> Option<&Patch> {
        self.graph.patch(id)
    }

    pub fn location(&self, id: PatchId) -> Location {
        self.graph.location(id)
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selected(&self) -> Option<PatchId> {
        self.selected
    }

    pub fn palette_patch(&self, node_type: NodeType) -> Option<PatchId> {
        self.area.palette_patch(node_type)
    }

    pub fn canvas_patches(&self) -> &[PatchId] {
        self.area.canvas_patches()
    }

    /// First canvas patch whose bounds include `point`.
    pub fn patch_under_point(&self, point: Point) -> Option<PatchId> {
        self.area.patch_under_point(&self.graph, point)
    }

    /// First port of `direction` on `patch` whose hit box includes `point`.
    pub fn port_under_point(
        &self,
        patch: PatchId,
        direction: PortDirection,
        point: Point,
    ) -> Option<PortId> {
        self.graph.port_under_point(patch, direction, point)
    }

    /// Whether `patch` is an enabled canvas patch.
    fn accepts_gestures(&self, patch: PatchId) -> bool {
        self.graph
            .patch(patch)
            .is_some_and(|p| p.is_enabled() && p.location() == Location::OnCanvas)
    }

    /// Resolve what lies under `point`.
    ///
    /// Canvas ports win over canvas patches, which win over palette
    /// patches. Disabled patches are transparent, and so is any part of
    /// the palette strip scrolled off the stage.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        for &patch in self.area.canvas_patches() {
            if !self.accepts_gestures(patch) {
                continue;
            }
            let port = self
                .graph
                .port_under_point(patch, PortDirection::Input, point)
                .or_else(|| self.graph.port_under_point(patch, PortDirection::Output, point));
            if let Some(port) = port {
                return Some(Hit::Port { patch, port });
            }
        }

        let on_canvas = self
            .area
            .canvas_patches()
            .iter()
            .copied()
            .find(|&id| {
                self.accepts_gestures(id)
                    && self
                        .graph
                        .patch_bounds(id)
                        .is_some_and(|b| b.includes(point))
            });
        if let Some(patch) = on_canvas {
            return Some(Hit::CanvasPatch(patch));
        }

        self.area
            .palette_patch_under_point(&self.graph, point)
            .map(Hit::PalettePatch)
    }

    /// Classify a target the UI already resolved.
    fn resolve(&self, target: GestureTarget) -> Option<Hit> {
        match target {
            GestureTarget::Port(port) => {
                let patch = self.graph.port(port)?.owner();
                self.accepts_gestures(patch)
                    .then_some(Hit::Port { patch, port })
            }
            GestureTarget::Patch(patch) => match self.graph.location(patch) {
                Location::InPalette => Some(Hit::PalettePatch(patch)),
                Location::OnCanvas if self.accepts_gestures(patch) => Some(Hit::CanvasPatch(patch)),
                _ => None,
            },
        }
    }

    /// The wire being pulled, if a wiring drag is in progress.
    pub fn pending_wire(&self) -> Option<Wire> {
        let Interaction::Wiring { from, origin, cursor } = self.interaction else {
            return None;
        };
        let direction = self.graph.port(from)?.direction();
        Some(match direction {
            PortDirection::Output => Wire {
                output: origin,
                input: cursor,
            },
            PortDirection::Input => Wire {
                output: cursor,
                input: origin,
            },
        })
    }

    /// Channel label drawn next to a splitter output or merger input.
    pub fn port_label(&self, port: PortId) -> Option<&'static str> {
        let port = self.graph.port(port)?;
        let node_type = self.graph.patch(port.owner())?.node_type();
        match (node_type, port.direction()) {
            (NodeType::ChannelSplitter, PortDirection::Output)
            | (NodeType::ChannelMerger, PortDirection::Input) => channel_label(port.channel()),
            _ => None,
        }
    }

    /// Every established wire between canvas patches.
    pub fn wires(&self) -> Vec<Wire> {
        let mut wires = Vec::new();
        for &patch in self.area.canvas_patches() {
            let Some(patch) = self.graph.patch(patch) else {
                continue;
            };
            for &input in patch.inputs() {
                let (Some(port), Some(input_at)) =
                    (self.graph.port(input), self.graph.port_position(input))
                else {
                    continue;
                };
                for &peer in port.peers() {
                    if let Some(output_at) = self.graph.port_position(peer) {
                        wires.push(Wire {
                            output: output_at,
                            input: input_at,
                        });
                    }
                }
            }
        }
        wires
    }

    /// Take every queued lifecycle event, oldest first.
    pub fn drain_events(&mut self) -> Vec<PatchEvent> {
        self.area.drain_events()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Direct operations
    // ═══════════════════════════════════════════════════════════════════

    /// Wire two ports. Returns false if they were already peers.
    pub fn connect(&mut self, a: PortId, b: PortId) -> ComposerResult<bool> {
        Ok(self.graph.connect(a, b)?)
    }

    /// Clear every wire on `port`. Returns the former peers.
    pub fn disconnect_all(&mut self, port: PortId) -> ComposerResult<Vec<PortId>> {
        Ok(self.graph.disconnect_all(port)?)
    }

    /// Remove the wire between `a` and `b`. Returns false if there was none.
    pub fn disconnect(&mut self, a: PortId, b: PortId) -> ComposerResult<bool> {
        Ok(self.graph.disconnect(a, b)?)
    }

    /// Unwire and discard a canvas patch, as if it were dropped on the trash.
    ///
    /// A drag of that patch in progress is abandoned.
    pub fn delete_patch(&mut self, patch: PatchId) -> ComposerResult<()> {
        self.area.delete(&mut self.graph, patch)?;
        if self.interaction.dragged_patch() == Some(patch) {
            log::debug!("drag of deleted patch {:?} abandoned", patch);
            self.interaction = Interaction::Idle;
        }
        self.forget(patch);
        Ok(())
    }

    /// Scroll the palette strip by `delta`. Returns the clamped offset.
    pub fn scroll_palette(&mut self, delta: f32) -> ComposerResult<f32> {
        Ok(self.area.scroll_palette(&mut self.graph, delta)?)
    }

    /// Forward a parameter value to a patch's node.
    pub fn set_param(&mut self, patch: PatchId, param: ParamId, value: f32) -> ComposerResult<()> {
        Ok(self.graph.set_param(patch, param, value)?)
    }

    /// A file was dropped at `point`: place a disabled buffer source there.
    ///
    /// The host decodes the file and reports back through
    /// [`Composer::complete_file_drop`]. Returns `None` if nothing was placed.
    pub fn begin_file_drop(&mut self, point: Point) -> ComposerResult<Option<PatchId>> {
        Ok(self
            .area
            .place_loading(&mut self.graph, NodeType::BufferSource, point)?)
    }

    /// Finish a file drop with the decode result.
    ///
    /// On success the buffer goes to the node and the patch is enabled. On
    /// failure the error is logged and the patch stays disabled.
    pub fn complete_file_drop(
        &mut self,
        patch: PatchId,
        decoded: Result<SharedBuffer, DecodeError>,
    ) -> ComposerResult<()> {
        if !self.area.is_on_canvas(patch) {
            return Err(PatchError::UnknownPatch(patch).into());
        }

        match decoded {
            Ok(buffer) => {
                log::info!(
                    "patch {:?} loaded {} frame(s) x {} channel(s)",
                    patch,
                    buffer.frames(),
                    buffer.channels()
                );
                self.graph.load_buffer(patch, buffer)?;
                self.graph.set_enabled(patch, true)?;
                self.area.emit(PatchEvent::Loaded { patch });
            }
            Err(err) => {
                log::error!("patch {:?}: {}", patch, err);
            }
        }
        Ok(())
    }

    fn forget(&mut self, patch: PatchId) {
        if self.selected == Some(patch) {
            self.selected = None;
            self.area.emit(PatchEvent::Selected { patch: None });
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Gesture dispatch
    // ═══════════════════════════════════════════════════════════════════

    /// Apply one gesture to completion.
    pub fn handle(&mut self, gesture: Gesture) -> ComposerResult<()> {
        log::trace!("gesture {:?} during {:?}", gesture, self.interaction);
        match gesture {
            Gesture::DragStart { point, target } => self.begin_drag(point, target),
            Gesture::DragMove { point } => self.drag_move(point),
            Gesture::DragRelease { point } => self.release(point),
            Gesture::Activate { point } => {
                self.activate(point);
                Ok(())
            }
            Gesture::DoubleActivate { point, target } => self.double_activate(point, target),
        }
    }

    fn begin_drag(&mut self, point: Point, target: Option<GestureTarget>) -> ComposerResult<()> {
        if !self.interaction.is_idle() {
            log::debug!("drag start ignored during {:?}", self.interaction);
            return Ok(());
        }

        let hit = match target {
            Some(target) => self.resolve(target),
            None => self.hit_test(point),
        };

        self.interaction = match hit {
            Some(Hit::Port { port, .. }) => Interaction::Wiring {
                from: port,
                origin: self.graph.port_position(port).unwrap_or(point),
                cursor: point,
            },
            Some(Hit::CanvasPatch(patch)) => Interaction::CanvasDrag {
                patch,
                trash_armed: false,
            },
            Some(Hit::PalettePatch(patch)) => {
                self.area.pick_up(&mut self.graph, patch, point)?;
                Interaction::PaletteDrag { patch }
            }
            None if self.config().palette_bounds().includes(point) => {
                Interaction::PaletteScroll { last: point }
            }
            None => Interaction::Idle,
        };
        Ok(())
    }

    fn drag_move(&mut self, point: Point) -> ComposerResult<()> {
        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::PaletteDrag { patch } => {
                self.area.drag_to(&mut self.graph, *patch, point)?;
            }
            Interaction::CanvasDrag { patch, trash_armed } => {
                *trash_armed =
                    self.area
                        .move_on_canvas(&mut self.graph, *patch, point, *trash_armed)?;
            }
            Interaction::PaletteScroll { last } => {
                let moved = *last - point;
                self.area.scroll_palette(&mut self.graph, moved.x)?;
                *last = point;
            }
            Interaction::Wiring { cursor, .. } => *cursor = point,
        }
        Ok(())
    }

    fn release(&mut self, point: Point) -> ComposerResult<()> {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle | Interaction::PaletteScroll { .. } => {}
            Interaction::PaletteDrag { patch } => {
                self.area.drop_patch(&mut self.graph, patch, point)?;
            }
            Interaction::CanvasDrag { patch, trash_armed } => {
                if self
                    .area
                    .release_on_canvas(&mut self.graph, patch, trash_armed)?
                {
                    self.forget(patch);
                }
            }
            Interaction::Wiring { from, .. } => self.finish_wire(from, point),
        }
        Ok(())
    }

    /// Complete a wiring drag released at `point`.
    fn finish_wire(&mut self, from: PortId, point: Point) {
        let Some(direction) = self.graph.port(from).map(|p| p.direction()) else {
            return;
        };
        let Some(patch) = self
            .patch_under_point(point)
            .filter(|&p| self.accepts_gestures(p))
        else {
            return;
        };
        let Some(to) = self
            .graph
            .port_under_point(patch, direction.opposite(), point)
        else {
            return;
        };

        match self.graph.connect(from, to) {
            Ok(true) => {
                let (output, input) = match direction {
                    PortDirection::Output => (from, to),
                    PortDirection::Input => (to, from),
                };
                self.area.emit(PatchEvent::Connected { output, input });
            }
            Ok(false) => {}
            Err(err) => log::debug!("wire dropped: {}", err),
        }
    }

    fn activate(&mut self, point: Point) {
        let patch = self
            .patch_under_point(point)
            .filter(|&p| self.accepts_gestures(p));
        self.selected = patch;
        self.area.emit(PatchEvent::Selected { patch });
    }

    fn double_activate(&mut self, point: Point, target: Option<GestureTarget>) -> ComposerResult<()> {
        let hit = match target {
            Some(target) => self.resolve(target),
            None => self.hit_test(point),
        };
        let Some(Hit::Port { port, .. }) = hit else {
            return Ok(());
        };

        if !self.graph.disconnect_all(port)?.is_empty() {
            self.area.emit(PatchEvent::Disconnected { port });
        }
        Ok(())
    }
}
