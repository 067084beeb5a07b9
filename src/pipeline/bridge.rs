//! The bridge between the frame producer and the playback callback.
//!
//! Two entry points, called from two unrelated threads:
//! - [`AudioBridge::on_frame_produced`]: remix/resample a frame to the
//!   consumer's format and append its bytes to the ring buffer
//! - [`AudioBridge::on_consumer_pull`]: fill the device buffer from the ring
//!   buffer, reallocating it first if the device format changed
//!
//! All mutable state sits behind one mutex. Critical sections are bounded
//! copies; resampling runs outside the lock. Ingestion snapshots the consumer
//! format, converts unlocked, then re-locks to write. A frame converted for a
//! format the consumer has since left is dropped.

use std::sync::atomic::Ordering;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::event::EventCallback;
use crate::format::{pack_i16_le, unpack_i16_le_to_f32, Resampler};
use crate::pipeline::fallback;
use crate::pipeline::monitor::StarvationMonitor;
use crate::pipeline::ByteRingBuffer;
use crate::session::BridgeCounters;
use crate::{AudioFrame, BridgeConfig, BridgeError, BridgeEvent, BridgeStats};

/// State shared between the producer and consumer paths.
struct BridgeState {
    ring: Option<ByteRingBuffer>,
    /// Byte view of the int16 conversion buffer, `2 × output length` long.
    scratch: Vec<u8>,
    /// Producer-side packing buffer, reused across frames.
    packed: Vec<u8>,
    /// Set once a consumer format too small for any buffer has been logged.
    sizing_warned: bool,
    tracked_channels: u16,
    tracked_sample_rate: u32,
    monitor: StarvationMonitor,
    fallback_reported: bool,
    closed: bool,
}

impl BridgeState {
    fn new() -> Self {
        Self {
            ring: None,
            scratch: Vec::new(),
            packed: Vec::new(),
            sizing_warned: false,
            tracked_channels: 0,
            tracked_sample_rate: 0,
            monitor: StarvationMonitor::new(),
            fallback_reported: false,
            closed: false,
        }
    }

    fn needs_reallocation(&self, channels: u16, sample_rate: u32, output_len: usize) -> bool {
        self.ring.is_none()
            || channels != self.tracked_channels
            || sample_rate != self.tracked_sample_rate
            || output_len * 2 != self.scratch.len()
    }
}

/// Real-time bridge from an irregular frame producer to a fixed-cadence
/// consumer.
///
/// The producer hands over [`AudioFrame`]s in whatever format the sender
/// chose; the consumer pulls interleaved `f32` samples at the device format.
/// The bridge sizes its ring buffer from the consumer's format, so frames that
/// arrive before the first pull are dropped.
///
/// # Example
///
/// ```
/// use audio_bridge::{AudioBridge, AudioFrame, BridgeConfig, LinearResampler};
///
/// let bridge = AudioBridge::new(LinearResampler::new(), BridgeConfig::default()).unwrap();
///
/// // The first pull establishes the consumer format
/// let mut output = vec![0.0f32; 960];
/// bridge.on_consumer_pull(&mut output, 2, 48000);
/// assert!(output.iter().all(|&s| s == 0.0));
///
/// bridge.on_frame_produced(&AudioFrame::mono(vec![16384; 480], 48000));
/// bridge.on_consumer_pull(&mut output, 2, 48000);
/// assert!(output.iter().all(|&s| s == 0.5));
/// ```
pub struct AudioBridge {
    state: Mutex<BridgeState>,
    resampler: Box<dyn Resampler>,
    config: BridgeConfig,
    counters: BridgeCounters,
    event_callback: Option<EventCallback>,
}

impl AudioBridge {
    /// Creates a bridge using `resampler` for format conversion.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation.
    pub fn new<R: Resampler + 'static>(
        resampler: R,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        Self::from_parts(Box::new(resampler), config, None)
    }

    pub(crate) fn from_parts(
        resampler: Box<dyn Resampler>,
        config: BridgeConfig,
        event_callback: Option<EventCallback>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(BridgeState::new()),
            resampler,
            config,
            counters: BridgeCounters::new(),
            event_callback,
        })
    }

    /// Sets the callback that receives runtime events.
    #[must_use]
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    /// Producer entry point. Never fails and never surfaces an error.
    ///
    /// Returns the number of bytes written to the ring buffer; zero means the
    /// frame was dropped (no consumer format yet, unsupported conversion, or
    /// the bridge is closed).
    pub fn on_frame_produced(&self, frame: &AudioFrame) -> usize {
        match self.push_frame(frame) {
            Ok(written) => written,
            Err(err) => {
                tracing::trace!(error = %err, "Frame dropped");
                0
            }
        }
    }

    /// Ingests a frame, reporting why it was dropped.
    ///
    /// Returns the number of bytes written. `Ok(0)` means the resampler
    /// produced nothing usable for this frame, or the consumer switched
    /// format while it was being converted.
    ///
    /// # Errors
    ///
    /// - `NotReady` if no consumer pull has established a format yet
    /// - `Closed` if the bridge has been closed
    pub fn push_frame(&self, frame: &AudioFrame) -> Result<usize, BridgeError> {
        self.counters.frames_received.fetch_add(1, Ordering::Relaxed);

        let mut events = Vec::new();
        let result = self.ingest(frame, &mut events);

        match result {
            Ok(written) if written > 0 => {
                self.counters.frames_written.fetch_add(1, Ordering::Relaxed);
            }
            _ => {
                self.counters.frames_dropped.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.emit_all(events);
        result
    }

    fn ingest(
        &self,
        frame: &AudioFrame,
        events: &mut Vec<BridgeEvent>,
    ) -> Result<usize, BridgeError> {
        // Snapshot the target format, then convert without holding the lock
        let (channels, sample_rate) = {
            let state = self.lock_state();
            if state.closed {
                return Err(BridgeError::Closed);
            }
            if state.tracked_channels == 0 {
                return Err(BridgeError::NotReady);
            }
            (state.tracked_channels, state.tracked_sample_rate)
        };

        let mut samples = self.resampler.resample(frame, channels, sample_rate);
        let mut used_fallback = false;
        if samples.is_empty() && fallback::applies(frame, channels, sample_rate) {
            samples = fallback::upmix_mono(frame);
            used_fallback = true;
        }

        if samples.is_empty() {
            tracing::trace!(
                from_channels = frame.channels(),
                from_rate = frame.sample_rate(),
                to_channels = channels,
                to_rate = sample_rate,
                "Resampler produced no samples"
            );
            return Ok(0);
        }

        let mut guard = self.lock_state();
        let state = &mut *guard;
        if state.closed {
            return Err(BridgeError::Closed);
        }

        if state.tracked_channels != channels || state.tracked_sample_rate != sample_rate {
            // Consumer format changed while converting; these samples no longer fit
            tracing::trace!("Consumer format changed during conversion, frame dropped");
            return Ok(0);
        }

        if used_fallback {
            self.counters.fallback_remixes.fetch_add(1, Ordering::Relaxed);
            if !state.fallback_reported {
                state.fallback_reported = true;
                tracing::debug!(
                    samples_per_channel = frame.samples_per_channel(),
                    "Resampler declined mono to stereo, duplicating samples"
                );
                events.push(BridgeEvent::FallbackRemix {
                    samples_per_channel: frame.samples_per_channel(),
                });
            }
        }

        let Some(ring) = state.ring.as_mut() else {
            return Err(BridgeError::NotReady);
        };

        state.packed.clear();
        pack_i16_le(&samples, &mut state.packed);

        let overwritten_before = ring.overwritten();
        let written = ring.write(&state.packed)?;
        let dropped = ring.overwritten() - overwritten_before;

        if dropped > 0 {
            self.counters
                .overrun_bytes
                .fetch_add(dropped, Ordering::Relaxed);
            tracing::warn!(
                dropped_bytes = dropped,
                capacity = ring.capacity(),
                "Ring buffer overrun - oldest audio overwritten"
            );
            events.push(BridgeEvent::Overrun {
                dropped_bytes: dropped as usize,
            });
        }

        Ok(written)
    }

    /// Consumer entry point: fills `output` with interleaved samples.
    ///
    /// `output` is zeroed first; any samples the ring buffer cannot supply stay
    /// silent. A change in `channels`, `sample_rate`, or `output.len()` since
    /// the previous pull replaces the ring buffer, discarding buffered audio.
    ///
    /// Returns the number of samples filled with buffered audio.
    pub fn on_consumer_pull(&self, output: &mut [f32], channels: u16, sample_rate: u32) -> usize {
        self.counters.pulls.fetch_add(1, Ordering::Relaxed);
        output.fill(0.0);

        let mut events = Vec::new();
        let filled = {
            let mut guard = self.lock_state();
            self.pull_locked(&mut guard, output, channels, sample_rate, &mut events)
        };

        if filled < output.len() {
            self.counters.underruns.fetch_add(1, Ordering::Relaxed);
        }

        self.emit_all(events);
        filled
    }

    fn pull_locked(
        &self,
        state: &mut BridgeState,
        output: &mut [f32],
        channels: u16,
        sample_rate: u32,
        events: &mut Vec<BridgeEvent>,
    ) -> usize {
        if state.closed || output.is_empty() {
            return 0;
        }
        if channels == 0 || sample_rate == 0 {
            tracing::trace!(channels, sample_rate, "Pull with unplayable format ignored");
            return 0;
        }

        if state.needs_reallocation(channels, sample_rate, output.len()) {
            self.reallocate(state, channels, sample_rate, output.len(), events);
        }

        let Some(ring) = state.ring.as_mut() else {
            return 0;
        };

        let read = ring.read(&mut state.scratch).unwrap_or(0);
        let filled = unpack_i16_le_to_f32(&state.scratch[..read], output);

        if let Some(event) = state.monitor.update(output.len() - filled) {
            events.push(event);
        }

        filled
    }

    fn reallocate(
        &self,
        state: &mut BridgeState,
        channels: u16,
        sample_rate: u32,
        output_len: usize,
        events: &mut Vec<BridgeEvent>,
    ) {
        let previous = state
            .ring
            .is_some()
            .then_some((state.tracked_sample_rate, state.tracked_channels));

        if let Some(mut old) = state.ring.take() {
            old.dispose();
        }

        let buffer_bytes = self.config.buffer_bytes(channels, sample_rate);
        match ByteRingBuffer::new(buffer_bytes) {
            Ok(ring) => state.ring = Some(ring),
            Err(err) => {
                if state.sizing_warned {
                    tracing::trace!(channels, sample_rate, "Ring buffer still unsized");
                } else {
                    state.sizing_warned = true;
                    tracing::warn!(
                        channels,
                        sample_rate,
                        error = %err,
                        "Cannot size ring buffer for consumer format"
                    );
                }
                state.scratch.clear();
                state.tracked_channels = 0;
                state.tracked_sample_rate = 0;
                return;
            }
        }

        state.scratch = vec![0u8; output_len * 2];
        state.sizing_warned = false;
        state.tracked_channels = channels;
        state.tracked_sample_rate = sample_rate;
        state.monitor.reset();
        self.counters.format_changes.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            ?previous,
            sample_rate,
            channels,
            output_len,
            buffer_bytes,
            "Consumer format changed, ring buffer reallocated"
        );
        events.push(BridgeEvent::FormatChanged {
            previous,
            current: (sample_rate, channels),
            buffer_bytes,
        });
    }

    /// Releases the ring buffer and stops accepting frames. Pulls keep
    /// producing silence.
    ///
    /// Returns `true` on the first call, `false` if already closed.
    pub fn close(&self) -> bool {
        let mut state = self.lock_state();
        if state.closed {
            return false;
        }

        state.closed = true;
        if let Some(mut ring) = state.ring.take() {
            ring.dispose();
        }
        state.scratch = Vec::new();
        state.tracked_channels = 0;
        state.tracked_sample_rate = 0;
        tracing::debug!("Bridge closed");
        true
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    /// The consumer format (`sample_rate`, `channels`) the ring buffer is
    /// currently sized for, if any.
    pub fn tracked_format(&self) -> Option<(u32, u16)> {
        let state = self.lock_state();
        (state.tracked_channels != 0).then_some((state.tracked_sample_rate, state.tracked_channels))
    }

    /// Bytes currently buffered and not yet pulled.
    pub fn buffered_bytes(&self) -> usize {
        self.lock_state()
            .ring
            .as_ref()
            .map_or(0, ByteRingBuffer::available)
    }

    /// Capacity of the current ring buffer in bytes, zero before the first pull.
    pub fn buffer_capacity(&self) -> usize {
        self.lock_state()
            .ring
            .as_ref()
            .map_or(0, ByteRingBuffer::capacity)
    }

    /// The configuration this bridge was built with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns current counters.
    pub fn stats(&self) -> BridgeStats {
        self.counters.snapshot()
    }

    /// Logs a backend error from the playback endpoint and forwards it as an event.
    pub(crate) fn report_endpoint_error(&self, reason: String) {
        tracing::error!("Playback endpoint error: {}", reason);
        self.emit(BridgeEvent::EndpointError { reason });
    }

    fn emit(&self, event: BridgeEvent) {
        if let Some(callback) = &self.event_callback {
            callback(event);
        }
    }

    fn emit_all(&self, events: Vec<BridgeEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, BridgeState> {
        // A panic on the other side must not silence the device
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AudioBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioBridge")
            .field("config", &self.config)
            .field("tracked_format", &self.tracked_format())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
