//! Endpoint that pulls only when asked.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::endpoint::{PlaybackCallbacks, PlaybackEndpoint};
use crate::{BridgeError, OutputFormat};

#[derive(Default)]
struct ManualShared {
    callbacks: Mutex<Option<PlaybackCallbacks>>,
    start_count: AtomicUsize,
    stop_count: AtomicUsize,
}

/// A playback endpoint driven by explicit [`pull`](ManualEndpoint::pull) calls.
///
/// Useful for tests and for rendering the bridge output without a device.
/// Clones share the same registration.
///
/// # Example
///
/// ```
/// use audio_bridge::ManualEndpoint;
///
/// let endpoint = ManualEndpoint::new();
/// // Not started, so pulls are silent
/// assert_eq!(endpoint.pull(4, 2, 48000), vec![0.0; 4]);
/// ```
#[derive(Clone, Default)]
pub struct ManualEndpoint {
    shared: Arc<ManualShared>,
}

impl ManualEndpoint {
    /// Creates an endpoint that is not yet started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulls `len` interleaved samples at the given format.
    ///
    /// Returns silence if the endpoint is not started.
    pub fn pull(&self, len: usize, channels: u16, sample_rate: u32) -> Vec<f32> {
        let mut output = vec![0.0f32; len];
        self.pull_into(&mut output, channels, sample_rate);
        output
    }

    /// Pulls into an existing buffer. Returns `false` if not started, in which
    /// case `output` is zeroed.
    pub fn pull_into(&self, output: &mut [f32], channels: u16, sample_rate: u32) -> bool {
        let pull = self
            .shared
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|callbacks| callbacks.pull.clone());

        match pull {
            Some(pull) => {
                pull(output, channels, sample_rate);
                true
            }
            None => {
                output.fill(0.0);
                false
            }
        }
    }

    /// Simulates a backend error while playing.
    pub fn raise_error(&self, reason: impl Into<String>) {
        let on_error = self
            .shared
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|callbacks| callbacks.on_error.clone());

        if let Some(on_error) = on_error {
            on_error(reason.into());
        }
    }

    /// Returns `true` between `start` and `stop`.
    pub fn is_playing(&self) -> bool {
        self.shared
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of times `start` has been called.
    pub fn start_count(&self) -> usize {
        self.shared.start_count.load(Ordering::SeqCst)
    }

    /// Number of times `stop` has been called.
    pub fn stop_count(&self) -> usize {
        self.shared.stop_count.load(Ordering::SeqCst)
    }
}

impl PlaybackEndpoint for ManualEndpoint {
    fn name(&self) -> &str {
        "manual"
    }

    fn start(
        &mut self,
        callbacks: PlaybackCallbacks,
        _requested: OutputFormat,
    ) -> Result<(), BridgeError> {
        self.shared.start_count.fetch_add(1, Ordering::SeqCst);
        *self
            .shared
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(callbacks);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        self.shared.stop_count.fetch_add(1, Ordering::SeqCst);
        self.shared
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
