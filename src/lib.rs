//! # audio-bridge
//!
//! **Note:** This crate is under active development. The API may change before 1.0.
//!
//! Real-time bridge from an irregular audio frame producer to a fixed-cadence
//! playback callback.
//!
//! A decoder or network receiver hands over [`AudioFrame`]s whenever they
//! arrive, in whatever sample rate and channel layout the sender chose. A sound
//! device pulls interleaved `f32` samples on its own clock. `audio-bridge`
//! converts each frame to the device's format, buffers it in a byte ring
//! buffer, and fills every pull with buffered audio or silence.
//!
//! ## Quick Start
//!
//! ```
//! use audio_bridge::{AudioBridgeBuilder, ManualEndpoint};
//! use audio_bridge::source::MockFrameSource;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), audio_bridge::BridgeError> {
//! let source = MockFrameSource::new(48000, 1);
//! let endpoint = ManualEndpoint::new();
//!
//! let mut session = AudioBridgeBuilder::new()
//!     .buffer_duration(Duration::from_millis(200))
//!     .on_event(|e| tracing::debug!(?e, "bridge event"))
//!     .start(source.clone(), endpoint.clone())?;
//!
//! // The first pull establishes the playback format
//! let silence = endpoint.pull(960, 2, 48000);
//! assert!(silence.iter().all(|&s| s == 0.0));
//!
//! source.emit(&source.sine_frame(440.0, Duration::from_millis(10)));
//! let audio = endpoint.pull(960, 2, 48000);
//! assert!(audio.iter().any(|&s| s != 0.0));
//!
//! session.stop()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The crate maintains a strict thread boundary:
//!
//! - **Producer thread**: calls [`AudioBridge::on_frame_produced`]; resampling
//!   runs here, outside the state lock
//! - **Ring Buffer**: byte store sized from the consumer's format, overwriting
//!   the oldest audio when the producer runs ahead
//! - **Playback thread**: calls [`AudioBridge::on_consumer_pull`]; holds the
//!   lock only for a bounded copy and never waits for the producer
//!
//! A change in the consumer's format replaces the ring buffer, so stale audio
//! at the old format is never played at the new one.

#![warn(missing_docs)]
// Audio code requires intentional numeric casts between sample formats
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless
)]
// unwrap/expect allowed in tests only
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
// These doc lints are too strict for internal implementation details
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod builder;
mod config;
pub mod endpoint;
mod error;
mod event;
pub mod format;
mod frame;
mod pipeline;
mod session;
pub mod source;

pub use builder::AudioBridgeBuilder;
pub use config::{BridgeConfig, OutputFormat, DEFAULT_BUFFER_DURATION, MIN_BUFFER_DURATION};
pub use endpoint::{
    default_output_device_name, list_output_devices, CpalOutput, ManualEndpoint,
    PlaybackCallbacks, PlaybackEndpoint,
};
pub use error::BridgeError;
pub use event::{event_callback, BridgeEvent, EventCallback};
pub use format::{LinearResampler, Resampler};
pub use frame::AudioFrame;
pub use pipeline::{AudioBridge, ByteRingBuffer};
pub use session::{BridgeSession, BridgeStats};
pub use source::{ChannelFrameSource, FrameHandler, FrameSource, MockFrameSource};
