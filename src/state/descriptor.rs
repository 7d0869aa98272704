// src/state/descriptor.rs
//
// Node type identifiers and their immutable catalog entries.

use std::fmt;

use super::ParamInfo;

/// Closed set of node types the composer offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    /// Singleton source fed by the host's media element.
    MediaElementSource,
    Oscillator,
    /// Sample player; only created by dropping an audio file.
    BufferSource,
    Gain,
    ChannelSplitter,
    ChannelMerger,
    BiquadFilter,
    Convolver,
    Delay,
    DynamicsCompressor,
    WaveShaper,
    Analyser,
    /// Singleton sink: the audio device.
    Destination,
}

impl NodeType {
    pub const ALL: [NodeType; 13] = [
        NodeType::MediaElementSource,
        NodeType::Oscillator,
        NodeType::BufferSource,
        NodeType::Gain,
        NodeType::ChannelSplitter,
        NodeType::ChannelMerger,
        NodeType::BiquadFilter,
        NodeType::Convolver,
        NodeType::Delay,
        NodeType::DynamicsCompressor,
        NodeType::WaveShaper,
        NodeType::Analyser,
        NodeType::Destination,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NodeType::MediaElementSource => "MediaElementSource",
            NodeType::Oscillator => "Oscillator",
            NodeType::BufferSource => "BufferSource",
            NodeType::Gain => "Gain",
            NodeType::ChannelSplitter => "ChannelSplitter",
            NodeType::ChannelMerger => "ChannelMerger",
            NodeType::BiquadFilter => "BiquadFilter",
            NodeType::Convolver => "Convolver",
            NodeType::Delay => "Delay",
            NodeType::DynamicsCompressor => "DynamicsCompressor",
            NodeType::WaveShaper => "WaveShaper",
            NodeType::Analyser => "Analyser",
            NodeType::Destination => "Destination",
        }
    }

    /// Parse a type from its `name()`.
    pub fn from_name(name: &str) -> Option<NodeType> {
        NodeType::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ceiling on how many patches of one type may sit on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceLimit {
    Bounded(usize),
    Unbounded,
}

impl InstanceLimit {
    /// Whether one more instance fits when `current` are already placed.
    #[inline]
    pub fn allows(&self, current: usize) -> bool {
        match self {
            InstanceLimit::Bounded(max) => current < *max,
            InstanceLimit::Unbounded => true,
        }
    }
}

/// Immutable catalog entry for a node type.
///
/// Used by:
/// - the palette, to lay out one slot per offered type
/// - the placement rules, to enforce instance ceilings
/// - the parameter panels, to build their controls
#[derive(Debug, Clone)]
pub struct NodeTypeDescriptor {
    pub node_type: NodeType,

    /// Short label drawn on the patch.
    pub label: String,

    /// Palette position; `None` keeps the type out of the palette.
    pub palette_slot: Option<usize>,

    pub max_instances: InstanceLimit,

    /// Declared input arity of nodes built for this type.
    pub inputs: usize,

    /// Declared output arity of nodes built for this type.
    pub outputs: usize,

    pub params: Vec<ParamInfo>,
}

impl NodeTypeDescriptor {
    pub fn new(node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            node_type,
            label: label.into(),
            palette_slot: None,
            max_instances: InstanceLimit::Unbounded,
            inputs: 0,
            outputs: 0,
            params: Vec::new(),
        }
    }

    pub fn slot(mut self, slot: usize) -> Self {
        self.palette_slot = Some(slot);
        self
    }

    pub fn singleton(mut self) -> Self {
        self.max_instances = InstanceLimit::Bounded(1);
        self
    }

    pub fn ports(mut self, inputs: usize, outputs: usize) -> Self {
        self.inputs = inputs;
        self.outputs = outputs;
        self
    }

    pub fn with_param(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    pub fn find_param(&self, id: u32) -> Option<&ParamInfo> {
        self.params.iter().find(|p| p.id == id)
    }
}
