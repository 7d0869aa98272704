// src/interaction.rs
//
// Interaction session.
//
// At most one pointer interaction is in progress at a time. The session is
// a plain value owned by the composer; each gesture is dispatched with a
// single `match` on it, so there are no handlers to attach or detach.

use crate::geometry::Point;
use crate::state::{PatchId, PortId};

/// The pointer interaction in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,

    /// A patch picked up from the palette follows the pointer.
    PaletteDrag { patch: PatchId },

    /// A canvas patch is being moved.
    CanvasDrag { patch: PatchId, trash_armed: bool },

    /// Empty palette space was grabbed; the strip scrolls with the pointer.
    PaletteScroll { last: Point },

    /// A wire is being pulled out of `from`.
    Wiring {
        from: PortId,
        /// Centre of `from` when the drag began.
        origin: Point,
        cursor: Point,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// The patch being dragged, if any.
    pub fn dragged_patch(&self) -> Option<PatchId> {
        match *self {
            Interaction::PaletteDrag { patch } | Interaction::CanvasDrag { patch, .. } => {
                Some(patch)
            }
            Interaction::Idle
            | Interaction::PaletteScroll { .. }
            | Interaction::Wiring { .. } => None,
        }
    }
}

/// What lies under the pointer, in hit-test priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A port of an enabled canvas patch.
    Port { patch: PatchId, port: PortId },
    /// An enabled canvas patch, away from its ports.
    CanvasPatch(PatchId),
    /// The patch offered in a palette slot.
    PalettePatch(PatchId),
}

/// Endpoints of a drawn wire, always oriented output to input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wire {
    pub output: Point,
    pub input: Point,
}

impl Wire {
    /// Cubic Bézier control polygon `[start, c1, c2, end]`.
    ///
    /// The curve leaves the output horizontally to the right and enters the
    /// input from the left; control arms are capped at 100 units.
    pub fn curve(&self) -> [Point; 4] {
        let (out, inp) = (self.output, self.input);
        let c1 = Point::new(out.x + (out.x - inp.x).abs().min(100.0), out.y);
        let c2 = Point::new(inp.x - (out.y - inp.y).abs().min(100.0), inp.y);
        [out, c1, c2, inp]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_curve_arms() {
        let wire = Wire {
            output: Point::new(0.0, 0.0),
            input: Point::new(300.0, 40.0),
        };
        let [start, c1, c2, end] = wire.curve();
        assert_eq!(start, wire.output);
        assert_eq!(c1, Point::new(100.0, 0.0));
        assert_eq!(c2, Point::new(260.0, 40.0));
        assert_eq!(end, wire.input);
    }

    #[test]
    fn test_dragged_patch() {
        assert_eq!(Interaction::default().dragged_patch(), None);
        let patch = PatchId::default();
        let drag = Interaction::CanvasDrag {
            patch,
            trash_armed: false,
        };
        assert_eq!(drag.dragged_patch(), Some(patch));
        assert!(!drag.is_idle());
    }
}
