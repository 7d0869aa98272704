// src/engine.rs

use crate::state::PatchId;

/// The physical audio graph the composer drives.
///
/// Physical wiring is channel-granular and all-or-nothing: an output channel
/// can be connected to many inputs, but the only removal primitive severs
/// *every* edge leaving that channel. The connection protocol keeps the
/// logical peer sets authoritative and re-derives physical state from them.
///
/// Nodes are keyed by the id of the patch that owns them.
pub trait AudioEngine {
    /// A node was constructed for `node` with the given arity.
    fn add_node(&mut self, _node: PatchId, _inputs: usize, _outputs: usize) {}

    /// Wire `source`'s output channel to `dest`'s input channel.
    /// Connecting an existing edge again is a no-op.
    fn connect(&mut self, source: PatchId, output: usize, dest: PatchId, input: usize);

    /// Sever every edge leaving `source`'s output channel.
    fn disconnect_output(&mut self, source: PatchId, output: usize);

    /// The node owned by `node` was released.
    fn remove_node(&mut self, _node: PatchId) {}
}

/// One wiring directive, as issued to an [`AudioEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    AddNode {
        node: PatchId,
        inputs: usize,
        outputs: usize,
    },
    Connect {
        source: PatchId,
        output: usize,
        dest: PatchId,
        input: usize,
    },
    DisconnectOutput {
        source: PatchId,
        output: usize,
    },
    RemoveNode {
        node: PatchId,
    },
}

/// Recording engine: keeps the directives and nothing else.
impl AudioEngine for Vec<Directive> {
    fn add_node(&mut self, node: PatchId, inputs: usize, outputs: usize) {
        self.push(Directive::AddNode {
            node,
            inputs,
            outputs,
        });
    }

    fn connect(&mut self, source: PatchId, output: usize, dest: PatchId, input: usize) {
        self.push(Directive::Connect {
            source,
            output,
            dest,
            input,
        });
    }

    fn disconnect_output(&mut self, source: PatchId, output: usize) {
        self.push(Directive::DisconnectOutput { source, output });
    }

    fn remove_node(&mut self, node: PatchId) {
        self.push(Directive::RemoveNode { node });
    }
}
