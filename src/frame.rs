//! Decoded audio frame handed over by the producer.

use std::time::Duration;

use crate::BridgeError;

/// A discrete unit of decoded audio as delivered by the frame source.
///
/// Samples are interleaved signed 16-bit PCM. The bridge borrows a frame only
/// for the duration of the call that delivers it and copies what it needs into
/// its ring buffer.
///
/// # Example
///
/// ```
/// use audio_bridge::AudioFrame;
///
/// let frame = AudioFrame::new(vec![0i16; 960], 48000, 2).unwrap();
/// assert_eq!(frame.samples_per_channel(), 480);
/// assert_eq!(frame.byte_len(), 1920);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
    samples_per_channel: usize,
}

impl AudioFrame {
    /// Creates a frame from interleaved samples.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `channels` is zero or the sample count is
    /// not a multiple of `channels`.
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Result<Self, BridgeError> {
        if channels == 0 {
            return Err(BridgeError::invalid_config("frame channel count is zero"));
        }
        if samples.len() % channels as usize != 0 {
            return Err(BridgeError::invalid_config(format!(
                "{} samples do not divide into {channels} channels",
                samples.len()
            )));
        }

        let samples_per_channel = samples.len() / channels as usize;
        Ok(Self {
            samples,
            sample_rate,
            channels,
            samples_per_channel,
        })
    }

    /// Creates a mono frame.
    pub fn mono(samples: Vec<i16>, sample_rate: u32) -> Self {
        let samples_per_channel = samples.len();
        Self {
            samples,
            sample_rate,
            channels: 1,
            samples_per_channel,
        }
    }

    /// Interleaved sample data.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of samples in each channel.
    pub fn samples_per_channel(&self) -> usize {
        self.samples_per_channel
    }

    /// Size of the sample data in bytes.
    pub fn byte_len(&self) -> usize {
        self.samples.len() * 2
    }

    /// Returns `true` if this frame carries no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback duration of this frame.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples_per_channel as f64 / f64::from(self.sample_rate))
    }
}
