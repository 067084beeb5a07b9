//! Manual mono to stereo upmix for resamplers that decline the conversion.
//!
//! Some remix implementations return nothing for a mono frame headed to a
//! stereo device at the same rate. The bridge then duplicates each sample
//! itself, producing exactly what a correct remix would.

use crate::format::mono_to_stereo;
use crate::AudioFrame;

/// Returns `true` when an empty resample result for `frame` should be
/// replaced by a manual upmix.
///
/// Only a mono frame, a stereo target, and matching sample rates qualify.
pub(crate) fn applies(frame: &AudioFrame, target_channels: u16, target_sample_rate: u32) -> bool {
    frame.channels() == 1 && target_channels == 2 && frame.sample_rate() == target_sample_rate
}

/// Duplicates every mono sample into a left/right pair.
///
/// The result has `2 × samples_per_channel` entries.
pub(crate) fn upmix_mono(frame: &AudioFrame) -> Vec<i16> {
    mono_to_stereo(frame.samples())
}
