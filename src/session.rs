//! Bridge session lifecycle and statistics.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::endpoint::PlaybackEndpoint;
use crate::source::FrameSource;
use crate::{AudioBridge, BridgeError};

/// Counters describing what a bridge has done so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Frames handed to the producer entry point.
    pub frames_received: u64,
    /// Frames whose samples reached the ring buffer.
    pub frames_written: u64,
    /// Frames discarded (no consumer format yet, unsupported conversion, closed).
    pub frames_dropped: u64,
    /// Frames upmixed by the mono to stereo fallback.
    pub fallback_remixes: u64,
    /// Consumer pulls served.
    pub pulls: u64,
    /// Pulls that were padded with silence.
    pub underruns: u64,
    /// Unread bytes discarded by overwrite-oldest.
    pub overrun_bytes: u64,
    /// Ring buffer reallocations caused by consumer format changes.
    pub format_changes: u64,
}

/// Live counters updated from both bridge threads.
pub(crate) struct BridgeCounters {
    pub frames_received: AtomicU64,
    pub frames_written: AtomicU64,
    pub frames_dropped: AtomicU64,
    pub fallback_remixes: AtomicU64,
    pub pulls: AtomicU64,
    pub underruns: AtomicU64,
    pub overrun_bytes: AtomicU64,
    pub format_changes: AtomicU64,
}

impl BridgeCounters {
    pub fn new() -> Self {
        Self {
            frames_received: AtomicU64::new(0),
            frames_written: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            fallback_remixes: AtomicU64::new(0),
            pulls: AtomicU64::new(0),
            underruns: AtomicU64::new(0),
            overrun_bytes: AtomicU64::new(0),
            format_changes: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> BridgeStats {
        BridgeStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_written: self.frames_written.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            fallback_remixes: self.fallback_remixes.load(Ordering::Relaxed),
            pulls: self.pulls.load(Ordering::Relaxed),
            underruns: self.underruns.load(Ordering::Relaxed),
            overrun_bytes: self.overrun_bytes.load(Ordering::Relaxed),
            format_changes: self.format_changes.load(Ordering::Relaxed),
        }
    }
}

/// Handle to a bridge attached to a frame source and a playback endpoint.
///
/// The `BridgeSession` is returned by [`AudioBridgeBuilder::start()`]. While it
/// exists, frames from the source flow into the bridge and the endpoint pulls
/// audio out of it.
///
/// # Lifecycle
///
/// 1. Created by [`AudioBridgeBuilder::start()`]: source attached, playback started
/// 2. Audio flows between the source and the endpoint
/// 3. Call [`stop()`](BridgeSession::stop) to detach, stop playback and
///    release the ring buffer
/// 4. Dropping the `BridgeSession` runs the same teardown (prefer explicit `stop()`)
///
/// Teardown happens once; later calls are no-ops.
///
/// [`AudioBridgeBuilder::start()`]: crate::AudioBridgeBuilder::start
pub struct BridgeSession {
    bridge: Arc<AudioBridge>,
    source: Box<dyn FrameSource>,
    endpoint: Box<dyn PlaybackEndpoint>,
    running: AtomicBool,
}

impl BridgeSession {
    pub(crate) fn new(
        bridge: Arc<AudioBridge>,
        source: Box<dyn FrameSource>,
        endpoint: Box<dyn PlaybackEndpoint>,
    ) -> Self {
        Self {
            bridge,
            source,
            endpoint,
            running: AtomicBool::new(true),
        }
    }

    /// Returns `true` until the session has been stopped.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The bridge this session drives.
    pub fn bridge(&self) -> &Arc<AudioBridge> {
        &self.bridge
    }

    /// Returns current bridge statistics.
    pub fn stats(&self) -> BridgeStats {
        self.bridge.stats()
    }

    /// Tears the session down.
    ///
    /// This will:
    /// 1. Detach from the frame source
    /// 2. Stop the playback endpoint
    /// 3. Close the bridge and release its ring buffer
    ///
    /// Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// Returns the endpoint's error if stopping playback failed. The source is
    /// detached and the bridge closed regardless.
    pub fn stop(&mut self) -> Result<(), BridgeError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        self.source.detach();
        let stopped = self.endpoint.stop();
        self.bridge.close();

        tracing::debug!(
            source = self.source.name(),
            endpoint = self.endpoint.name(),
            "Bridge session stopped"
        );
        stopped
    }
}

impl Drop for BridgeSession {
    fn drop(&mut self) {
        if self.is_running() {
            if let Err(err) = self.stop() {
                tracing::warn!(error = %err, "Playback endpoint failed to stop cleanly");
            }
        }
    }
}

impl std::fmt::Debug for BridgeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeSession")
            .field("source", &self.source.name())
            .field("endpoint", &self.endpoint.name())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
