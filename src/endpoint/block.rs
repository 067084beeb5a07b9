//! Fixed-size pulls behind variable-size device buffers.

use crate::endpoint::PullCallback;

/// Serves device buffers of any length from pulls of one constant length.
///
/// Backends may change the callback buffer size from one call to the next.
/// The bridge treats a new pull length as a new format, so the device side
/// always pulls whole blocks and carries the unread tail into the next
/// callback. The block is allocated once, up front.
pub(crate) struct BlockPuller {
    block: Vec<f32>,
    position: usize,
    channels: u16,
    sample_rate: u32,
}

impl BlockPuller {
    /// Creates a puller that requests `block_frames` frames per pull.
    pub(crate) fn new(block_frames: usize, channels: u16, sample_rate: u32) -> Self {
        let len = block_frames.max(1) * usize::from(channels.max(1));
        Self {
            block: vec![0.0; len],
            position: len,
            channels,
            sample_rate,
        }
    }

    /// Samples per pull.
    pub(crate) fn block_len(&self) -> usize {
        self.block.len()
    }

    /// Fills `out`, pulling new blocks as the current one runs out.
    pub(crate) fn fill<T>(
        &mut self,
        out: &mut [T],
        pull: &PullCallback,
        convert: impl Fn(f32) -> T,
    ) {
        let mut written = 0;
        while written < out.len() {
            if self.position == self.block.len() {
                pull(&mut self.block, self.channels, self.sample_rate);
                self.position = 0;
            }

            let n = (self.block.len() - self.position).min(out.len() - written);
            let source = &self.block[self.position..self.position + n];
            for (dst, &sample) in out[written..written + n].iter_mut().zip(source) {
                *dst = convert(sample);
            }
            self.position += n;
            written += n;
        }
    }
}
