//! Audio format conversion utilities.
//!
//! This module provides utilities for converting between audio formats:
//! - Sample format conversion (f32 ↔ i16) and little-endian byte packing
//! - Channel conversion (stereo ↔ mono)
//! - Sample rate conversion (resampling) behind the [`Resampler`] trait

mod convert;
mod resample;

pub use convert::{
    f32_to_i16, i16_to_f32, mono_to_stereo, pack_i16_le, stereo_to_mono, unpack_i16_le_to_f32,
};
pub use resample::{resample, resample_interleaved, LinearResampler, Resampler};
