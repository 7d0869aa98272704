// src/audio_buffer.rs
//
// Decoded sample data delivered by the host after a file drop.

use std::sync::Arc;

/// A decoded audio asset, planar: `[ch0 frames.., ch1 frames..]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: usize,
    sample_rate: f32,
    data: Vec<f32>,
}

/// Decoded assets are shared between the composer and the node playing them.
pub type SharedBuffer = Arc<SampleBuffer>;

impl SampleBuffer {
    /// Wrap planar sample data. Trailing samples that do not fill a whole
    /// frame are dropped.
    pub fn new(channels: usize, sample_rate: f32, mut data: Vec<f32>) -> Self {
        let channels = channels.max(1);
        let frames = data.len() / channels;
        data.truncate(frames * channels);
        Self {
            channels,
            sample_rate,
            data,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.data.len() / self.channels
    }

    #[inline]
    pub fn channel(&self, ch: usize) -> &[f32] {
        let frames = self.frames();
        let start = ch * frames;
        &self.data[start..start + frames]
    }

    /// Length in seconds.
    pub fn duration(&self) -> f32 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate
    }

    pub fn into_shared(self) -> SharedBuffer {
        Arc::new(self)
    }
}

/// Failure reported by the host's decoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decoding error: {message}")]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_layout() {
        let buf = SampleBuffer::new(2, 4.0, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(buf.frames(), 3);
        assert_eq!(buf.channel(0), &[1.0, 2.0, 3.0]);
        assert_eq!(buf.channel(1), &[4.0, 5.0, 6.0]);
        assert_eq!(buf.duration(), 0.75);
    }
}
