//! Sample format, byte layout, and channel conversion.

/// Scale between normalized floats and 16-bit integers on the read path.
const I16_SCALE: f32 = 32768.0;

/// Converts f32 samples to i16.
///
/// Input should be in the range [-1.0, 1.0].
/// Values outside this range are clamped.
///
/// Uses × 32767 (not 32768) for symmetric scaling. This means -1.0 maps
/// to -32767 rather than -32768, losing 1 LSB at the negative extreme.
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

/// Converts i16 samples to f32.
///
/// Divides by 32768, so the result is exact and lies in [-1.0, 1.0).
#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / I16_SCALE
}

/// Appends `samples` to `out` as little-endian byte pairs.
pub fn pack_i16_le(samples: &[i16], out: &mut Vec<u8>) {
    out.reserve(samples.len() * 2);
    for &sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
}

/// Decodes little-endian i16 byte pairs into normalized floats.
///
/// Converts `min(bytes.len() / 2, out.len())` samples and returns that count.
/// A trailing odd byte is ignored. Entries of `out` past the returned count
/// are left untouched.
pub fn unpack_i16_le_to_f32(bytes: &[u8], out: &mut [f32]) -> usize {
    let mut converted = 0;
    for (dst, pair) in out.iter_mut().zip(bytes.chunks_exact(2)) {
        *dst = i16_to_f32(i16::from_le_bytes([pair[0], pair[1]]));
        converted += 1;
    }
    converted
}

/// Converts stereo samples to mono by averaging channels.
///
/// Input must have an even number of samples (left, right pairs).
/// Returns a vector half the size of the input.
pub fn stereo_to_mono(stereo: &[i16]) -> Vec<i16> {
    stereo
        .chunks_exact(2)
        .map(|pair| {
            let left = i32::from(pair[0]);
            let right = i32::from(pair[1]);
            ((left + right) / 2) as i16
        })
        .collect()
}

/// Converts mono samples to stereo by duplicating each sample.
pub fn mono_to_stereo(mono: &[i16]) -> Vec<i16> {
    mono.iter().flat_map(|&s| [s, s]).collect()
}
