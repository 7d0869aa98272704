// src/state/gesture.rs
//
// Pointer gestures delivered by the UI layer.
//
// Gestures are the ONLY way the UI drives structural changes. Each one is
// handled to completion by `Composer::handle` before the next arrives.

use super::{PatchId, PortId};
use crate::geometry::Point;

/// What the pointer was over when a gesture began, if the UI already knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureTarget {
    Patch(PatchId),
    Port(PortId),
}

/// A gesture from the UI layer, in stage coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Pointer pressed and dragging began.
    ///
    /// With `target: None` the composer hit-tests `point` itself.
    DragStart {
        point: Point,
        target: Option<GestureTarget>,
    },

    /// Pointer moved while pressed.
    DragMove { point: Point },

    /// Pointer released.
    DragRelease { point: Point },

    /// Single click; selects the canvas patch under the pointer.
    Activate { point: Point },

    /// Double click; on a port this clears its wiring.
    DoubleActivate {
        point: Point,
        target: Option<GestureTarget>,
    },
}
