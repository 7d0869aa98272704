// src/nodes/host.rs
//
// Host-side node handle.
//
// The DSP of the standard node types runs in the host's audio engine. The
// composer keeps one `HostNode` per patch: it carries the declared arity,
// mirrors the live parameter values the panels have set, and holds the
// sample buffer of a buffer source once decoding has finished.

use std::collections::HashMap;

use crate::audio_buffer::SharedBuffer;
use crate::node::AudioNode;
use crate::state::{NodeTypeDescriptor, ParamId};

pub struct HostNode {
    inputs: usize,
    outputs: usize,
    params: HashMap<ParamId, f32>,
    buffer: Option<SharedBuffer>,
    released: bool,
}

impl HostNode {
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            params: HashMap::new(),
            buffer: None,
            released: false,
        }
    }

    /// A node with the descriptor's arity and every parameter at its default.
    pub fn from_descriptor(desc: &NodeTypeDescriptor) -> Self {
        let mut node = Self::new(desc.inputs, desc.outputs);
        for param in &desc.params {
            node.params.insert(param.id, param.default);
        }
        node
    }

    pub fn buffer(&self) -> Option<&SharedBuffer> {
        self.buffer.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl AudioNode for HostNode {
    fn num_inputs(&self) -> usize {
        self.inputs
    }

    fn num_outputs(&self) -> usize {
        self.outputs
    }

    fn set_param(&mut self, param_id: ParamId, value: f32) {
        if let Some(slot) = self.params.get_mut(&param_id) {
            *slot = value;
        }
    }

    fn param(&self, param_id: ParamId) -> Option<f32> {
        self.params.get(&param_id).copied()
    }

    fn load_buffer(&mut self, buffer: SharedBuffer) {
        self.buffer = Some(buffer);
    }

    fn release(&mut self) {
        self.buffer = None;
        self.released = true;
    }
}
