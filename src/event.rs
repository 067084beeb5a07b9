//! Runtime events for monitoring bridge health.
//!
//! Events are non-fatal notifications. The bridge keeps running after any of
//! them; they exist for logging and metrics, not error handling. Callbacks are
//! always invoked after the bridge has released its state lock.

use std::sync::Arc;

/// Runtime events emitted by the bridge.
///
/// # Example
///
/// ```
/// use audio_bridge::BridgeEvent;
///
/// fn handle_event(event: BridgeEvent) {
///     match event {
///         BridgeEvent::FormatChanged { previous, current, buffer_bytes } => {
///             eprintln!("format {:?} -> {:?}, buffer {} bytes", previous, current, buffer_bytes);
///         }
///         BridgeEvent::Overrun { dropped_bytes } => {
///             eprintln!("overwrote {} unread bytes", dropped_bytes);
///         }
///         BridgeEvent::FallbackRemix { samples_per_channel } => {
///             eprintln!("mono upmix fallback engaged ({} samples)", samples_per_channel);
///         }
///         BridgeEvent::Starved { missing_samples } => {
///             eprintln!("starved: {} samples of silence", missing_samples);
///         }
///         BridgeEvent::Resumed => eprintln!("audio resumed"),
///         BridgeEvent::EndpointError { reason } => eprintln!("endpoint: {}", reason),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// The consumer pulled with a new format and the ring buffer was replaced.
    ///
    /// Emitted on the first pull as well, with `previous` set to `None`.
    FormatChanged {
        /// Previous consumer format (`sample_rate`, `channels`).
        previous: Option<(u32, u16)>,
        /// Current consumer format (`sample_rate`, `channels`).
        current: (u32, u16),
        /// Capacity of the new ring buffer in bytes.
        buffer_bytes: usize,
    },

    /// The producer got ahead of the consumer and unread audio was overwritten.
    Overrun {
        /// Number of unread bytes discarded.
        dropped_bytes: usize,
    },

    /// The resampler declined a mono to stereo conversion and the bridge
    /// duplicated the samples itself.
    ///
    /// Emitted once per bridge, the first time the fallback engages.
    FallbackRemix {
        /// Samples per channel in the frame that triggered the fallback.
        samples_per_channel: usize,
    },

    /// A pull found less audio than requested and padded with silence.
    ///
    /// Emitted on the transition into starvation only, not on every short pull.
    Starved {
        /// Number of output samples filled with silence on that pull.
        missing_samples: usize,
    },

    /// A full pull succeeded after a [`Starved`](BridgeEvent::Starved) event.
    Resumed,

    /// The playback endpoint reported an error from its backend.
    EndpointError {
        /// Description of the error.
        reason: String,
    },
}

/// Callback type for receiving runtime events.
pub type EventCallback = Arc<dyn Fn(BridgeEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// # Example
///
/// ```
/// use audio_bridge::{event_callback, BridgeEvent};
///
/// let callback = event_callback(|event: BridgeEvent| {
///     println!("Got event: {:?}", event);
/// });
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(BridgeEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}
