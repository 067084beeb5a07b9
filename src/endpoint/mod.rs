//! Playback endpoints: where the bridge's audio goes.
//!
//! A [`PlaybackEndpoint`] owns the fixed-cadence consumer. When started it
//! calls the pull callback whenever it needs samples; the bridge fills the
//! buffer and never blocks beyond a bounded copy. The crate provides:
//!
//! - [`CpalOutput`]: a CPAL output stream on a real device
//! - [`ManualEndpoint`]: pulls on demand, for tests and offline rendering

mod block;
mod cpal_output;
mod manual;

pub use cpal_output::{default_output_device_name, list_output_devices, CpalOutput};
pub use manual::ManualEndpoint;

use std::sync::Arc;

use crate::{BridgeError, OutputFormat};

/// Fills an interleaved `f32` buffer for the given channel count and sample rate.
pub type PullCallback = Arc<dyn Fn(&mut [f32], u16, u32) + Send + Sync>;

/// Receives backend errors raised while playback runs.
pub type ErrorCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callbacks an endpoint drives while playing.
#[derive(Clone)]
pub struct PlaybackCallbacks {
    /// Called from the playback thread for every device buffer.
    pub pull: PullCallback,
    /// Called when the backend reports a runtime error.
    pub on_error: ErrorCallback,
}

/// A consumer that pulls audio at its own cadence.
///
/// # Implementation Notes
///
/// - `start` is called once when the session starts; keep the callbacks and
///   begin pulling
/// - `stop` is called once when the session stops; stop pulling and drop the
///   callbacks before returning
/// - Pull with a buffer length that is a multiple of the channel count and
///   stays the same between format changes; a new length resets the bridge
pub trait PlaybackEndpoint {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Starts playback, pulling through `callbacks`.
    ///
    /// `requested` is a hint; endpoints that cannot honor it may play at their
    /// native format. Errors here are fatal and prevent the session from
    /// starting.
    fn start(
        &mut self,
        callbacks: PlaybackCallbacks,
        requested: OutputFormat,
    ) -> Result<(), BridgeError>;

    /// Stops playback and detaches the pull callback.
    fn stop(&mut self) -> Result<(), BridgeError>;
}
