//! WebAssembly bindings via wasm-bindgen for browser integration.
//!
//! This module is only compiled when the `web` feature is enabled.
//!
//! # Usage
//!
//! Build with wasm-pack:
//! ```bash
//! wasm-pack build --target web --features web
//! ```
//!
//! # JavaScript Example
//!
//! ```javascript
//! import init, { patchbay_init, PatchbayComposer } from './patchbay.js';
//!
//! await init();
//! patchbay_init();
//!
//! const composer = new PatchbayComposer(canvas.width, canvas.height);
//!
//! canvas.onpointerdown = (e) => composer.drag_start(e.offsetX, e.offsetY);
//! canvas.onpointermove = (e) => composer.drag_move(e.offsetX, e.offsetY);
//! canvas.onpointerup = (e) => composer.drag_release(e.offsetX, e.offsetY);
//!
//! // Once per frame
//! for (let ev = composer.next_event(); ev; ev = composer.next_event()) {
//!     animate(ev.kind, ev.patch, ev.x, ev.y);
//! }
//! drawWires(composer.wire_coords());
//! ```
//!
//! Patch and port ids cross the boundary as `u64` (`BigInt` in JS).

use std::collections::VecDeque;

use slotmap::{Key, KeyData};
use wasm_bindgen::prelude::*;

use crate::audio_buffer::{DecodeError, SampleBuffer};
use crate::composer::Composer;
use crate::config::ComposerConfig;
use crate::error::ComposerError;
use crate::event::PatchEvent;
use crate::geometry::Point;
use crate::interaction::Wire;
use crate::state::{Gesture, NodeType, PatchId, PortId};

// ═══════════════════════════════════════════════════════════════════════════
// Initialization
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize the wasm module. Call this once before using any other functions.
/// Sets up panic hooks and console logging.
#[wasm_bindgen]
pub fn patchbay_init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
}

fn patch_key(id: u64) -> PatchId {
    KeyData::from_ffi(id).into()
}

fn port_key(id: u64) -> PortId {
    KeyData::from_ffi(id).into()
}

fn ffi<K: Key>(key: K) -> u64 {
    key.data().as_ffi()
}

fn js_error(err: ComposerError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn flatten(wire: Wire) -> [f32; 4] {
    [wire.output.x, wire.output.y, wire.input.x, wire.input.y]
}

// ═══════════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════════

/// Kind of a lifecycle event.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Created,
    EnteredCanvas,
    Rejected,
    TrashHover,
    Deleted,
    Selected,
    Loaded,
    Connected,
    Disconnected,
}

/// A lifecycle event flattened for JS. Fields that do not apply to the
/// event's kind are `undefined`.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug)]
pub struct PatchbayEvent {
    kind: EventKind,
    patch: Option<PatchId>,
    port: Option<PortId>,
    peer: Option<PortId>,
    node_type: Option<NodeType>,
    reason: Option<crate::event::RejectReason>,
    armed: bool,
    x: f32,
    y: f32,
}

impl PatchbayEvent {
    fn of(kind: EventKind) -> Self {
        Self {
            kind,
            patch: None,
            port: None,
            peer: None,
            node_type: None,
            reason: None,
            armed: false,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl From<PatchEvent> for PatchbayEvent {
    fn from(event: PatchEvent) -> Self {
        match event {
            PatchEvent::Created { patch, node_type } => Self {
                patch: Some(patch),
                node_type: Some(node_type),
                ..Self::of(EventKind::Created)
            },
            PatchEvent::EnteredCanvas { patch } => Self {
                patch: Some(patch),
                ..Self::of(EventKind::EnteredCanvas)
            },
            PatchEvent::Rejected {
                patch,
                reason,
                return_to,
            } => Self {
                patch: Some(patch),
                reason: Some(reason),
                x: return_to.x,
                y: return_to.y,
                ..Self::of(EventKind::Rejected)
            },
            PatchEvent::TrashHover { patch, armed } => Self {
                patch: Some(patch),
                armed,
                ..Self::of(EventKind::TrashHover)
            },
            PatchEvent::Deleted { patch } => Self {
                patch: Some(patch),
                ..Self::of(EventKind::Deleted)
            },
            PatchEvent::Selected { patch } => Self {
                patch,
                ..Self::of(EventKind::Selected)
            },
            PatchEvent::Loaded { patch } => Self {
                patch: Some(patch),
                ..Self::of(EventKind::Loaded)
            },
            PatchEvent::Connected { output, input } => Self {
                port: Some(output),
                peer: Some(input),
                ..Self::of(EventKind::Connected)
            },
            PatchEvent::Disconnected { port } => Self {
                port: Some(port),
                ..Self::of(EventKind::Disconnected)
            },
        }
    }
}

#[wasm_bindgen]
impl PatchbayEvent {
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    #[wasm_bindgen(getter)]
    pub fn patch(&self) -> Option<u64> {
        self.patch.map(ffi)
    }

    /// Output port for `Connected`, the cleared port for `Disconnected`.
    #[wasm_bindgen(getter)]
    pub fn port(&self) -> Option<u64> {
        self.port.map(ffi)
    }

    /// Input port for `Connected`.
    #[wasm_bindgen(getter)]
    pub fn peer(&self) -> Option<u64> {
        self.peer.map(ffi)
    }

    #[wasm_bindgen(getter)]
    pub fn node_type(&self) -> Option<String> {
        self.node_type.map(|t| t.name().to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn reason(&self) -> Option<String> {
        self.reason.map(|r| format!("{:?}", r))
    }

    #[wasm_bindgen(getter)]
    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Return position of a `Rejected` patch.
    #[wasm_bindgen(getter)]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> f32 {
        self.y
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Composer
// ═══════════════════════════════════════════════════════════════════════════

/// Browser-side handle to a composer with the standard catalog.
#[wasm_bindgen]
pub struct PatchbayComposer {
    inner: Composer,
    pending: VecDeque<PatchEvent>,
}

#[wasm_bindgen]
impl PatchbayComposer {
    /// Create a composer for a stage of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Result<PatchbayComposer, JsValue> {
        let inner = Composer::new(ComposerConfig::new(width, height)).map_err(js_error)?;
        Ok(Self {
            inner,
            pending: VecDeque::new(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Gestures
    // ─────────────────────────────────────────────────────────────────────────

    pub fn drag_start(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.inner
            .handle(Gesture::DragStart {
                point: Point::new(x, y),
                target: None,
            })
            .map_err(js_error)
    }

    pub fn drag_move(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.inner
            .handle(Gesture::DragMove {
                point: Point::new(x, y),
            })
            .map_err(js_error)
    }

    pub fn drag_release(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.inner
            .handle(Gesture::DragRelease {
                point: Point::new(x, y),
            })
            .map_err(js_error)
    }

    pub fn activate(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.inner
            .handle(Gesture::Activate {
                point: Point::new(x, y),
            })
            .map_err(js_error)
    }

    pub fn double_activate(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.inner
            .handle(Gesture::DoubleActivate {
                point: Point::new(x, y),
                target: None,
            })
            .map_err(js_error)
    }

    /// Scroll the palette strip, e.g. from a wheel event. Returns the offset.
    pub fn scroll_palette(&mut self, delta: f32) -> Result<f32, JsValue> {
        self.inner.scroll_palette(delta).map_err(js_error)
    }

    /// Next queued lifecycle event, or `undefined`.
    pub fn next_event(&mut self) -> Option<PatchbayEvent> {
        if self.pending.is_empty() {
            self.pending.extend(self.inner.drain_events());
        }
        self.pending.pop_front().map(PatchbayEvent::from)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wiring
    // ─────────────────────────────────────────────────────────────────────────

    /// Wire two ports. Returns false if they were already wired.
    pub fn connect(&mut self, a: u64, b: u64) -> Result<bool, JsValue> {
        self.inner
            .connect(port_key(a), port_key(b))
            .map_err(js_error)
    }

    /// Clear a port. Returns how many wires were removed.
    pub fn disconnect_all(&mut self, port: u64) -> Result<u32, JsValue> {
        self.inner
            .disconnect_all(port_key(port))
            .map(|former| former.len() as u32)
            .map_err(js_error)
    }

    /// Established wires as `[out_x, out_y, in_x, in_y, ...]`.
    pub fn wire_coords(&self) -> Vec<f32> {
        self.inner.wires().into_iter().flat_map(flatten).collect()
    }

    /// The wire being pulled as `[out_x, out_y, in_x, in_y]`, or empty.
    pub fn pending_wire_coords(&self) -> Vec<f32> {
        self.inner
            .pending_wire()
            .map(|w| flatten(w).to_vec())
            .unwrap_or_default()
    }

    /// Channel label for a splitter output or merger input, e.g. `"LFE"`.
    pub fn port_label(&self, port: u64) -> Option<String> {
        self.inner.port_label(port_key(port)).map(str::to_string)
    }

    /// Patches feeding input channel `input` of `patch`, as
    /// `[patch, output, ...]` pairs.
    pub fn sources_of(&self, patch: u64, input: u32) -> Vec<u64> {
        self.inner
            .engine()
            .sources_of(patch_key(patch), input as usize)
            .into_iter()
            .flat_map(|(source, output)| [ffi(source), output as u64])
            .collect()
    }

    /// Patch ids in the order the engine should evaluate them.
    pub fn eval_order(&self) -> Vec<u64> {
        self.inner.engine().eval_order().into_iter().map(ffi).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Patches
    // ─────────────────────────────────────────────────────────────────────────

    /// Patch currently offered for a node type name, e.g. `"Gain"`.
    pub fn palette_patch(&self, node_type: &str) -> Option<u64> {
        let node_type = NodeType::from_name(node_type)?;
        self.inner.palette_patch(node_type).map(ffi)
    }

    pub fn canvas_patches(&self) -> Vec<u64> {
        self.inner.canvas_patches().iter().copied().map(ffi).collect()
    }

    pub fn selected(&self) -> Option<u64> {
        self.inner.selected().map(ffi)
    }

    pub fn patch_type(&self, patch: u64) -> Option<String> {
        self.inner
            .patch(patch_key(patch))
            .map(|p| p.node_type().name().to_string())
    }

    /// Patch centre as `[x, y]`, or empty if the patch is gone.
    pub fn patch_position(&self, patch: u64) -> Vec<f32> {
        self.inner
            .patch(patch_key(patch))
            .map(|p| vec![p.position().x, p.position().y])
            .unwrap_or_default()
    }

    pub fn patch_enabled(&self, patch: u64) -> bool {
        self.inner
            .patch(patch_key(patch))
            .is_some_and(|p| p.is_enabled())
    }

    pub fn set_param(&mut self, patch: u64, param_id: u32, value: f32) -> Result<(), JsValue> {
        self.inner
            .set_param(patch_key(patch), param_id, value)
            .map_err(js_error)
    }

    pub fn delete_patch(&mut self, patch: u64) -> Result<(), JsValue> {
        self.inner.delete_patch(patch_key(patch)).map_err(js_error)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File drop
    // ─────────────────────────────────────────────────────────────────────────

    /// A file was dropped; returns the loading patch, if one was placed.
    pub fn begin_file_drop(&mut self, x: f32, y: f32) -> Result<Option<u64>, JsValue> {
        self.inner
            .begin_file_drop(Point::new(x, y))
            .map(|patch| patch.map(ffi))
            .map_err(js_error)
    }

    /// Deliver decoded planar samples for a loading patch.
    pub fn load_buffer(
        &mut self,
        patch: u64,
        channels: u32,
        sample_rate: f32,
        data: Vec<f32>,
    ) -> Result<(), JsValue> {
        let buffer = SampleBuffer::new(channels as usize, sample_rate, data).into_shared();
        self.inner
            .complete_file_drop(patch_key(patch), Ok(buffer))
            .map_err(js_error)
    }

    /// Report that decoding failed; the patch stays disabled.
    pub fn fail_file_drop(&mut self, patch: u64, message: &str) -> Result<(), JsValue> {
        self.inner
            .complete_file_drop(patch_key(patch), Err(DecodeError::new(message)))
            .map_err(js_error)
    }
}
