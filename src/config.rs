//! Configuration types for the bridge.

use std::time::Duration;

use crate::BridgeError;

/// Default ring buffer headroom.
///
/// Absorbs jitter between irregular frame arrivals and the steady pull cadence
/// while keeping latency bounded.
pub const DEFAULT_BUFFER_DURATION: Duration = Duration::from_millis(200);

/// Shortest buffer duration accepted by [`BridgeConfig::validate`].
pub const MIN_BUFFER_DURATION: Duration = Duration::from_millis(1);

/// Playback format requested from an output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Use the device's default output format.
    ///
    /// The bridge adapts to whatever the device pulls with.
    #[default]
    Native,

    /// Request a specific sample rate and channel count.
    Fixed {
        /// Sample rate in Hz.
        sample_rate: u32,
        /// Number of interleaved channels.
        channels: u16,
    },
}

impl OutputFormat {
    /// Returns the requested sample rate, or `None` for native.
    #[must_use]
    pub fn sample_rate(&self) -> Option<u32> {
        match self {
            Self::Native => None,
            Self::Fixed { sample_rate, .. } => Some(*sample_rate),
        }
    }

    /// Returns the requested channel count, or `None` for native.
    #[must_use]
    pub fn channels(&self) -> Option<u16> {
        match self {
            Self::Native => None,
            Self::Fixed { channels, .. } => Some(*channels),
        }
    }
}

/// Configuration for bridge behavior.
///
/// Use [`BridgeConfig::default()`] for sensible defaults, or customize as needed.
///
/// # Example
///
/// ```
/// use audio_bridge::BridgeConfig;
/// use std::time::Duration;
///
/// let config = BridgeConfig {
///     buffer_duration: Duration::from_millis(100),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Amount of audio the ring buffer holds at the consumer's format.
    ///
    /// When the producer gets further ahead than this, the oldest audio is
    /// overwritten.
    /// Default: 200ms
    pub buffer_duration: Duration,

    /// Format requested from the playback device.
    ///
    /// Default: [`OutputFormat::Native`]
    pub output: OutputFormat,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            buffer_duration: DEFAULT_BUFFER_DURATION,
            output: OutputFormat::default(),
        }
    }
}

impl BridgeConfig {
    /// Checks the configuration for values the bridge cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a buffer duration under
    /// [`MIN_BUFFER_DURATION`] or a fixed output format with zero channels or
    /// zero sample rate.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.buffer_duration < MIN_BUFFER_DURATION {
            return Err(BridgeError::invalid_config(format!(
                "buffer duration {:?} is below the {:?} minimum",
                self.buffer_duration, MIN_BUFFER_DURATION
            )));
        }
        if let OutputFormat::Fixed {
            sample_rate,
            channels,
        } = self.output
        {
            if sample_rate == 0 || channels == 0 {
                return Err(BridgeError::invalid_config(format!(
                    "fixed output format {sample_rate}Hz/{channels}ch is not playable"
                )));
            }
        }
        Ok(())
    }

    /// Ring buffer capacity in bytes for the given consumer format.
    ///
    /// Holds `channels × sample_rate × buffer_duration` 16-bit samples.
    pub fn buffer_bytes(&self, channels: u16, sample_rate: u32) -> usize {
        // Integer math, so 200ms at 44.1kHz is 8820 frames exactly
        let frames =
            (u128::from(sample_rate) * self.buffer_duration.as_nanos() / 1_000_000_000) as usize;
        frames * channels as usize * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.buffer_duration, Duration::from_millis(200));
        assert_eq!(config.output, OutputFormat::Native);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_buffer_bytes_stereo_48k() {
        let config = BridgeConfig::default();
        // 48000 * 0.2 = 9600 frames, * 2 channels * 2 bytes
        assert_eq!(config.buffer_bytes(2, 48000), 38400);
    }

    #[test]
    fn test_buffer_bytes_zero_format() {
        let config = BridgeConfig::default();
        assert_eq!(config.buffer_bytes(0, 48000), 0);
        assert_eq!(config.buffer_bytes(2, 0), 0);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let config = BridgeConfig {
            buffer_duration: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BridgeError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_sub_millisecond_duration_rejected() {
        let config = BridgeConfig {
            buffer_duration: Duration::from_micros(10),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BridgeConfig {
            buffer_duration: MIN_BUFFER_DURATION,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer_bytes(2, 48000), 192);
    }

    #[test]
    fn test_fixed_output_validation() {
        let config = BridgeConfig {
            output: OutputFormat::Fixed {
                sample_rate: 48000,
                channels: 0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let fixed = OutputFormat::Fixed {
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(fixed.sample_rate(), Some(44100));
        assert_eq!(fixed.channels(), Some(2));
        assert_eq!(OutputFormat::Native.sample_rate(), None);
    }
}
