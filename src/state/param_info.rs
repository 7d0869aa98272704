// src/state/param_info.rs
//
// Parameter metadata for the parameter-panel layer.

use std::fmt;

/// Unique identifier for a parameter within a node type.
pub type ParamId = u32;

/// Display curve for parameter UI.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DisplayCurve {
    /// Linear mapping
    #[default]
    Linear,
    /// Logarithmic (frequency, time constants)
    Logarithmic,
    /// Symmetric around zero (detune)
    Symmetric,
}

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamUnit {
    #[default]
    None,
    /// Hertz (frequency)
    Hz,
    /// Decibels
    Db,
    /// Cents (detune)
    Cents,
    /// Seconds
    Seconds,
    /// Plain multiplier (gain, playback rate)
    Ratio,
}

impl fmt::Display for ParamUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamUnit::None | ParamUnit::Ratio => Ok(()),
            ParamUnit::Hz => write!(f, "Hz"),
            ParamUnit::Db => write!(f, "dB"),
            ParamUnit::Cents => write!(f, "ct"),
            ParamUnit::Seconds => write!(f, "s"),
        }
    }
}

/// Metadata describing one live parameter of a node type.
///
/// The composer never interprets values; it hands them to the node
/// untouched. Panels use the range to lay out their sliders.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    /// Unique ID within the node type
    pub id: ParamId,

    /// Human-readable name
    pub name: String,

    /// Minimum value
    pub min: f32,

    /// Maximum value
    pub max: f32,

    /// Default value
    pub default: f32,

    /// Unit for display
    pub unit: ParamUnit,

    /// Display curve for UI mapping
    pub curve: DisplayCurve,
}

impl ParamInfo {
    pub fn new(id: ParamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            min: 0.0,
            max: 1.0,
            default: 0.0,
            unit: ParamUnit::None,
            curve: DisplayCurve::Linear,
        }
    }

    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn default(mut self, value: f32) -> Self {
        self.default = value;
        self
    }

    pub fn unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn curve(mut self, curve: DisplayCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Clamp a value to the valid range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Format a value for display.
    pub fn format(&self, value: f32) -> String {
        if self.unit == ParamUnit::None || self.unit == ParamUnit::Ratio {
            format!("{:.2}", value)
        } else {
            format!("{:.2} {}", value, self.unit)
        }
    }
}
