// src/event.rs

use crate::geometry::Point;
use crate::state::{NodeType, PatchId, PortId};

/// ===============================
/// Lifecycle events
/// ===============================

/// Something the presentation layer may want to react to.
///
/// These events:
/// - are queued by the composer and drained by the host
/// - carry ids only; look the patch up for anything else
/// - are informational: the model is already updated when they are queued
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatchEvent {
    /// A patch was constructed (palette replenishment or file drop).
    Created {
        patch: PatchId,
        node_type: NodeType,
    },

    /// A dragged patch was accepted onto the canvas.
    EnteredCanvas { patch: PatchId },

    /// A dragged patch was refused. `return_to` is the palette slot it came
    /// from; the instance itself has already been discarded.
    Rejected {
        patch: PatchId,
        reason: RejectReason,
        return_to: Point,
    },

    /// A canvas drag started or stopped overlapping the trash target.
    TrashHover { patch: PatchId, armed: bool },

    /// A patch was dropped on the trash target and released.
    Deleted { patch: PatchId },

    /// Selection changed.
    Selected { patch: Option<PatchId> },

    /// A file-dropped patch finished loading and accepts gestures.
    Loaded { patch: PatchId },

    /// Two ports were wired by a gesture.
    Connected { output: PortId, input: PortId },

    /// A port's wiring was cleared by a gesture.
    Disconnected { port: PortId },
}

/// ===============================
/// Drop outcome
/// ===============================

/// Why a palette drag did not land on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    OutsideCanvas,
    InstanceLimitExceeded,
}

/// Result of releasing a patch dragged out of the palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    Placed,
    Rejected(RejectReason),
}
