// src/node.rs

use crate::audio_buffer::SharedBuffer;
use crate::state::ParamId;

/// Contract between a patch and the processing node it owns.
///
/// The composer only relies on:
/// - the declared input/output arity, fixed for the node's lifetime
/// - parameter forwarding from the parameter panels
/// - the release hook, called exactly once when the patch is discarded
///
/// Nodes do NOT know about wiring; physical connections are issued to the
/// `AudioEngine` by the connection protocol.
pub trait AudioNode: Send {
    /// Number of input channels.
    fn num_inputs(&self) -> usize;

    /// Number of output channels.
    fn num_outputs(&self) -> usize;

    /// Set a parameter value. Unknown ids are ignored.
    fn set_param(&mut self, param_id: ParamId, value: f32);

    /// Current value of a parameter, if the node has it.
    fn param(&self, _param_id: ParamId) -> Option<f32> {
        None
    }

    /// Install decoded sample data (buffer sources only).
    fn load_buffer(&mut self, _buffer: SharedBuffer) {}

    /// Called once when the owning patch is deleted or discarded.
    fn release(&mut self) {}
}
