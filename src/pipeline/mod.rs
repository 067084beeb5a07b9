//! Audio pipeline components.
//!
//! The bridge sits between two threads that never wait on each other for
//! longer than a bounded copy:
//!
//! ```text
//! Frame producer → remix/resample → Ring Buffer → int16 → f32 → Playback pull
//! ```
//!
//! - **Ring Buffer**: fixed-capacity byte store, overwrite-oldest on overflow
//! - **Bridge**: sizes the ring buffer from the consumer's format and
//!   reallocates it whenever that format changes
//! - **Fallback**: mono to stereo duplication when the resampler declines
//! - **Monitor**: tracks starvation transitions on the consumer side

mod bridge;
mod fallback;
mod monitor;
mod ring_buffer;

pub use bridge::AudioBridge;
pub use ring_buffer::ByteRingBuffer;
