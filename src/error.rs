// src/error.rs
//
// Error taxonomy.
//
// None of these reach the user: gesture handling degrades to "no effect".
// `ConnectionError` arises from hit-testing mistakes and is dropped after
// logging; `PatchError::StillWired` is a programming error the placement
// state machine never triggers.

use thiserror::Error;

use crate::state::{Location, NodeType, PatchId, PortId};

/// An invalid request to the connection protocol. No state was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("ports {a:?} and {b:?} have the same direction")]
    SameDirection { a: PortId, b: PortId },

    #[error("ports {a:?} and {b:?} both belong to patch {patch:?}")]
    SameOwner { a: PortId, b: PortId, patch: PatchId },

    #[error("port {0:?} does not exist")]
    UnknownPort(PortId),

    #[error("port {0:?} is not an output")]
    NotAnOutput(PortId),

    /// Palette and dragging patches have inert ports.
    #[error("port {port:?} belongs to patch {patch:?}, which is not on the canvas")]
    NotOnCanvas { port: PortId, patch: PatchId },
}

/// A patch lifecycle request that violates the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("patch {0:?} does not exist")]
    UnknownPatch(PatchId),

    #[error("no node type {0} in the catalog")]
    UnregisteredType(NodeType),

    /// Deletion was attempted while a port still has peers.
    #[error("patch {0:?} still has wired ports")]
    StillWired(PatchId),

    #[error("patch {patch:?} is {actual:?}, expected {expected:?}")]
    UnexpectedLocation {
        patch: PatchId,
        expected: Location,
        actual: Location,
    },
}

/// Any error surfaced by the composer façade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComposerError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Result of a composer operation.
pub type ComposerResult<T> = Result<T, ComposerError>;
