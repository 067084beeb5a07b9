//! Error types for audio-bridge.
//!
//! Errors are split into two categories:
//! - **Construction errors** ([`BridgeError`] returned from builders and
//!   constructors): the bridge, buffer, or endpoint cannot be created
//! - **Runtime conditions**: dropped frames, underrun, overrun. These never
//!   cross the producer/consumer boundary; they surface through
//!   [`BridgeStats`](crate::BridgeStats) and the
//!   [`EventCallback`](crate::EventCallback) instead

/// Errors produced by the bridge and its collaborators.
///
/// Only `InvalidConfig` and the endpoint/source variants are ever returned to
/// callers of public constructors. `NotReady` and `Closed` are reported by the
/// fallible ingestion entry point ([`AudioBridge::push_frame`]) and by the ring
/// buffer; the real-time entry points absorb them.
///
/// [`AudioBridge::push_frame`]: crate::AudioBridge::push_frame
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// Bad construction parameters.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the parameters.
        reason: String,
    },

    /// A frame arrived before any consumer format was known.
    #[error("no consumer format established yet")]
    NotReady,

    /// The buffer or bridge has already been torn down.
    #[error("bridge closed")]
    Closed,

    /// No default output device is configured on this system.
    #[error("no default output device configured")]
    NoDefaultDevice,

    /// The requested output device was not found.
    #[error("device not found: {name}")]
    DeviceNotFound {
        /// Name of the device that wasn't found.
        name: String,
    },

    /// The device's sample format is not supported.
    #[error("unsupported sample format: {format}")]
    UnsupportedFormat {
        /// The format that wasn't supported.
        format: String,
    },

    /// An error from the audio backend (CPAL) or the frame source runtime.
    #[error("audio backend error: {0}")]
    Backend(String),
}

impl BridgeError {
    /// Creates an invalid configuration error with the given reason.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Creates a backend error from anything displayable.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}
