//! Remixing and sample rate conversion.
//!
//! The bridge treats conversion as an external collaborator behind the
//! [`Resampler`] trait. [`LinearResampler`] is the built-in implementation:
//! linear interpolation for rate changes, averaging/duplication for 1↔2
//! channel remixes. It is fast and adequate for speech, not a mastering-grade
//! resampler.

use crate::format::convert::{mono_to_stereo, stereo_to_mono};
use crate::AudioFrame;

/// Converts a frame to a target channel count and sample rate.
///
/// Implementations return interleaved samples at the target format. An empty
/// result is meaningful: it signals that this input/output pair is not
/// supported, which is distinct from a frame that simply carried no audio.
///
/// Closures of the right shape implement this trait:
///
/// ```
/// use audio_bridge::{AudioFrame, Resampler};
///
/// let passthrough = |frame: &AudioFrame, _channels: u16, _rate: u32| frame.samples().to_vec();
/// let frame = AudioFrame::mono(vec![1, 2, 3], 48000);
/// assert_eq!(passthrough.resample(&frame, 1, 48000), vec![1, 2, 3]);
/// ```
pub trait Resampler: Send + Sync {
    /// Remixes and resamples `frame` to `target_channels` at `target_sample_rate`.
    fn resample(&self, frame: &AudioFrame, target_channels: u16, target_sample_rate: u32)
        -> Vec<i16>;
}

impl<F> Resampler for F
where
    F: Fn(&AudioFrame, u16, u32) -> Vec<i16> + Send + Sync,
{
    fn resample(
        &self,
        frame: &AudioFrame,
        target_channels: u16,
        target_sample_rate: u32,
    ) -> Vec<i16> {
        self(frame, target_channels, target_sample_rate)
    }
}

/// Linear-interpolation resampler with 1↔2 channel remixing.
///
/// Supported channel conversions: N→N, mono→stereo, stereo→mono. Any other
/// pair, and any zero sample rate, yields an empty result.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearResampler;

impl LinearResampler {
    /// Creates a new linear resampler.
    pub fn new() -> Self {
        Self
    }
}

impl Resampler for LinearResampler {
    fn resample(
        &self,
        frame: &AudioFrame,
        target_channels: u16,
        target_sample_rate: u32,
    ) -> Vec<i16> {
        if frame.sample_rate() == 0 || target_sample_rate == 0 || frame.is_empty() {
            return Vec::new();
        }

        let remixed = match (frame.channels(), target_channels) {
            (from, to) if from == to => frame.samples().to_vec(),
            (1, 2) => mono_to_stereo(frame.samples()),
            (2, 1) => stereo_to_mono(frame.samples()),
            (from, to) => {
                tracing::trace!(from, to, "unsupported channel remix");
                return Vec::new();
            }
        };

        resample_interleaved(
            &remixed,
            target_channels,
            frame.sample_rate(),
            target_sample_rate,
        )
    }
}

/// Resamples audio from one sample rate to another.
///
/// Uses linear interpolation, which is fast but may introduce artifacts
/// for large rate changes.
///
/// # Arguments
///
/// * `samples` - Input samples (mono)
/// * `from_rate` - Source sample rate in Hz
/// * `to_rate` - Target sample rate in Hz
///
/// Returns an empty vector if either rate is zero.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == 0 || to_rate == 0 {
        return Vec::new();
    }
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = src_pos - src_idx as f64;

        let sample = if src_idx + 1 < samples.len() {
            let s1 = f64::from(samples[src_idx]);
            let s2 = f64::from(samples[src_idx + 1]);
            (s1 + (s2 - s1) * frac) as i16
        } else if src_idx < samples.len() {
            samples[src_idx]
        } else {
            *samples.last().unwrap_or(&0)
        };

        output.push(sample);
    }

    output
}

/// Resamples interleaved audio with any channel count.
///
/// Each channel is deinterleaved, resampled independently, and interleaved
/// again. A trailing partial frame is discarded when resampling. Returns an
/// empty vector if either rate or the channel count is zero.
pub fn resample_interleaved(
    samples: &[i16],
    channels: u16,
    from_rate: u32,
    to_rate: u32,
) -> Vec<i16> {
    if from_rate == 0 || to_rate == 0 || channels == 0 {
        return Vec::new();
    }
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let channels = channels as usize;
    if channels == 1 {
        return resample(samples, from_rate, to_rate);
    }

    let resampled: Vec<Vec<i16>> = (0..channels)
        .map(|ch| {
            let plane: Vec<i16> = samples
                .chunks_exact(channels)
                .map(|frame| frame[ch])
                .collect();
            resample(&plane, from_rate, to_rate)
        })
        .collect();

    let frames = resampled.first().map_or(0, Vec::len);
    let mut output = Vec::with_capacity(frames * channels);
    for i in 0..frames {
        for plane in &resampled {
            output.push(plane[i]);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_same_rate() {
        let samples = vec![100i16, 200, 300];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn test_resample_empty() {
        assert!(resample(&[], 16000, 8000).is_empty());
    }

    #[test]
    fn test_resample_downsample() {
        let samples: Vec<i16> = (0..480).map(|i| (i * 10) as i16).collect();
        let resampled = resample(&samples, 48000, 16000);
        assert_eq!(resampled.len(), 160);
    }

    #[test]
    fn test_resample_upsample() {
        let resampled = resample(&[0, 1000, 2000, 3000], 16000, 48000);
        assert_eq!(resampled.len(), 12);
        assert_eq!(resampled[0], 0);
    }

    #[test]
    fn test_resample_precision_boundary() {
        let result = resample(&[0, 100, 200, 300], 1, 2);
        assert_eq!(result[0], 0);
        assert_eq!(result[2], 100);
        assert_eq!(result[4], 200);
        assert_eq!(result[6], 300);
    }

    #[test]
    fn test_resample_zero_to_rate() {
        assert!(resample(&[100, 200, 300], 16000, 0).is_empty());
    }

    #[test]
    fn test_resample_interleaved_stereo_downsample() {
        let samples = vec![0i16, 0, 100, 100, 200, 200, 300, 300];
        let resampled = resample_interleaved(&samples, 2, 48000, 16000);
        assert!(resampled.len() < samples.len());
        assert_eq!(resampled.len() % 2, 0);
    }

    #[test]
    fn test_resample_interleaved_keeps_channels_apart() {
        // Left ramps, right stays constant
        let samples = vec![0i16, 7, 100, 7, 200, 7, 300, 7];
        let resampled = resample_interleaved(&samples, 2, 1, 2);
        assert_eq!(resampled.len(), 16);
        assert!(resampled.iter().skip(1).step_by(2).all(|&s| s == 7));
        assert_eq!(resampled[4], 100);
    }

    #[test]
    fn test_linear_mono_to_stereo_same_rate() {
        let frame = AudioFrame::mono(vec![1, 2, 3], 48000);
        let out = LinearResampler::new().resample(&frame, 2, 48000);
        assert_eq!(out, vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_linear_stereo_to_mono() {
        let frame = AudioFrame::new(vec![100, 200, 300, 400], 16000, 2).unwrap();
        let out = LinearResampler::new().resample(&frame, 1, 16000);
        assert_eq!(out, vec![150, 350]);
    }

    #[test]
    fn test_linear_rate_change() {
        let frame = AudioFrame::mono(vec![0; 480], 48000);
        let out = LinearResampler::new().resample(&frame, 2, 16000);
        assert_eq!(out.len(), 320);
    }

    #[test]
    fn test_linear_unsupported_pair_is_empty() {
        let frame = AudioFrame::new(vec![0; 6], 48000, 6).unwrap();
        assert!(LinearResampler::new().resample(&frame, 2, 48000).is_empty());
    }

    #[test]
    fn test_linear_zero_rates_are_empty() {
        let frame = AudioFrame::mono(vec![1, 2], 0);
        assert!(LinearResampler::new().resample(&frame, 1, 48000).is_empty());

        let frame = AudioFrame::mono(vec![1, 2], 48000);
        assert!(LinearResampler::new().resample(&frame, 1, 0).is_empty());
    }

    #[test]
    fn test_closure_resampler() {
        let declining = |_: &AudioFrame, _: u16, _: u32| Vec::<i16>::new();
        let frame = AudioFrame::mono(vec![1], 8000);
        assert!(declining.resample(&frame, 2, 8000).is_empty());
    }

    #[test]
    fn test_zero_rates_yield_nothing() {
        assert!(resample(&[1, 2, 3], 0, 48000).is_empty());
        assert!(resample(&[1, 2, 3], 48000, 0).is_empty());
        assert!(resample(&[1, 2, 3], 0, 0).is_empty());
        assert!(resample_interleaved(&[1, 2, 3, 4], 2, 0, 48000).is_empty());
        assert!(resample_interleaved(&[1, 2, 3, 4], 2, 48000, 0).is_empty());
    }
}
