// src/nodes/mod.rs
//
// Standard node types offered by the composer.

mod host;

pub use host::*;

use crate::catalog::NodeCatalog;
use crate::node_factory::SimpleNodeFactory;
use crate::state::{DisplayCurve, NodeType, NodeTypeDescriptor, ParamInfo, ParamUnit};

/// Labels for the six surround channels of splitters and mergers.
pub const CHANNEL_LABELS: [&str; 6] = ["L", "R", "C", "LFE", "SL", "SR"];

/// Label for a splitter output or merger input.
pub fn channel_label(channel: usize) -> Option<&'static str> {
    CHANNEL_LABELS.get(channel).copied()
}

// ═══════════════════════════════════════════════════════════════════
// Parameter IDs (per-node-type)
// ═══════════════════════════════════════════════════════════════════

pub mod params {
    // Oscillator params
    pub const FREQUENCY: u32 = 0;
    pub const DETUNE: u32 = 1;
    pub const WAVEFORM: u32 = 2;

    // Buffer source params
    pub const PLAYBACK_RATE: u32 = 0;

    // Gain params
    pub const GAIN: u32 = 0;

    // Biquad params (FREQUENCY and DETUNE shared with the oscillator)
    pub const Q: u32 = 2;
    pub const FILTER_GAIN: u32 = 3;
    pub const FILTER_TYPE: u32 = 4;

    // Convolver params
    pub const NORMALIZE: u32 = 0;

    // Delay params
    pub const DELAY_TIME: u32 = 0;

    // Compressor params
    pub const THRESHOLD: u32 = 0;
    pub const KNEE: u32 = 1;
    pub const RATIO: u32 = 2;
    pub const ATTACK: u32 = 3;
    pub const RELEASE: u32 = 4;

    // Wave shaper params
    pub const OVERSAMPLE: u32 = 0;
}

// ═══════════════════════════════════════════════════════════════════
// Registry Population
// ═══════════════════════════════════════════════════════════════════

/// Populate the catalog with all standard node types.
pub fn register_standard_nodes(catalog: &mut NodeCatalog) {
    register_sources(catalog);
    register_routing(catalog);
    register_effects(catalog);
    register_sinks(catalog);
}

/// Register a descriptor backed by a `HostNode`.
fn register_host(catalog: &mut NodeCatalog, desc: NodeTypeDescriptor) {
    let template = desc.clone();
    catalog.register(
        desc,
        SimpleNodeFactory::new(move || Box::new(HostNode::from_descriptor(&template))),
    );
}

fn frequency(default: f32) -> ParamInfo {
    ParamInfo::new(params::FREQUENCY, "Frequency")
        .range(10.0, 24_000.0)
        .default(default)
        .unit(ParamUnit::Hz)
        .curve(DisplayCurve::Logarithmic)
}

fn detune() -> ParamInfo {
    ParamInfo::new(params::DETUNE, "Detune")
        .range(-1200.0, 1200.0)
        .default(0.0)
        .unit(ParamUnit::Cents)
        .curve(DisplayCurve::Symmetric)
}

fn register_sources(catalog: &mut NodeCatalog) {
    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::MediaElementSource, "media")
            .slot(0)
            .singleton()
            .ports(0, 1),
    );

    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::Oscillator, "oscillator")
            .slot(1)
            .ports(0, 1)
            .with_param(frequency(440.0))
            .with_param(detune())
            .with_param(ParamInfo::new(params::WAVEFORM, "Type").range(0.0, 3.0)),
    );

    // Not offered in the palette; created by dropping an audio file.
    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::BufferSource, "buffer")
            .ports(0, 1)
            .with_param(
                ParamInfo::new(params::PLAYBACK_RATE, "Playback rate")
                    .range(0.0, 8.0)
                    .default(1.0)
                    .unit(ParamUnit::Ratio),
            ),
    );
}

fn register_routing(catalog: &mut NodeCatalog) {
    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::Gain, "gain")
            .slot(2)
            .ports(1, 1)
            .with_param(
                ParamInfo::new(params::GAIN, "Gain")
                    .range(0.0, 2.0)
                    .default(1.0)
                    .unit(ParamUnit::Ratio),
            ),
    );

    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::ChannelSplitter, "split")
            .slot(3)
            .ports(1, CHANNEL_LABELS.len()),
    );

    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::ChannelMerger, "merge")
            .slot(4)
            .ports(CHANNEL_LABELS.len(), 1),
    );
}

fn register_effects(catalog: &mut NodeCatalog) {
    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::BiquadFilter, "biquad")
            .slot(5)
            .ports(1, 1)
            .with_param(frequency(350.0))
            .with_param(detune())
            .with_param(
                ParamInfo::new(params::Q, "Q")
                    .range(0.0001, 1000.0)
                    .default(1.0)
                    .curve(DisplayCurve::Logarithmic),
            )
            .with_param(
                ParamInfo::new(params::FILTER_GAIN, "Gain")
                    .range(-40.0, 40.0)
                    .default(0.0)
                    .unit(ParamUnit::Db),
            )
            .with_param(ParamInfo::new(params::FILTER_TYPE, "Type").range(0.0, 7.0)),
    );

    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::Convolver, "convolve")
            .slot(6)
            .ports(1, 1)
            .with_param(
                ParamInfo::new(params::NORMALIZE, "Normalize")
                    .range(0.0, 1.0)
                    .default(1.0),
            ),
    );

    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::Delay, "delay")
            .slot(7)
            .ports(1, 1)
            .with_param(
                ParamInfo::new(params::DELAY_TIME, "Delay time")
                    .range(0.0, 5.0)
                    .default(0.0)
                    .unit(ParamUnit::Seconds),
            ),
    );

    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::DynamicsCompressor, "compress")
            .slot(8)
            .ports(1, 1)
            .with_param(
                ParamInfo::new(params::THRESHOLD, "Threshold")
                    .range(-100.0, 0.0)
                    .default(-24.0)
                    .unit(ParamUnit::Db),
            )
            .with_param(
                ParamInfo::new(params::KNEE, "Knee")
                    .range(0.0, 40.0)
                    .default(30.0)
                    .unit(ParamUnit::Db),
            )
            .with_param(ParamInfo::new(params::RATIO, "Ratio").range(1.0, 20.0).default(12.0))
            .with_param(
                ParamInfo::new(params::ATTACK, "Attack")
                    .range(0.0, 1.0)
                    .default(0.003)
                    .unit(ParamUnit::Seconds),
            )
            .with_param(
                ParamInfo::new(params::RELEASE, "Release")
                    .range(0.0, 1.0)
                    .default(0.25)
                    .unit(ParamUnit::Seconds),
            ),
    );

    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::WaveShaper, "shaper")
            .slot(9)
            .ports(1, 1)
            .with_param(ParamInfo::new(params::OVERSAMPLE, "Oversample").range(0.0, 2.0)),
    );

    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::Analyser, "analyser")
            .slot(10)
            .ports(1, 1),
    );
}

fn register_sinks(catalog: &mut NodeCatalog) {
    register_host(
        catalog,
        NodeTypeDescriptor::new(NodeType::Destination, "dest")
            .slot(11)
            .singleton()
            .ports(1, 0),
    );
}
