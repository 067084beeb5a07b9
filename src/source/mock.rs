//! Mock frame source for testing without a real producer.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::format::f32_to_i16;
use crate::source::{FrameHandler, FrameSource};
use crate::{AudioFrame, BridgeError};

#[derive(Default)]
struct MockShared {
    handler: Mutex<Option<FrameHandler>>,
    attach_count: AtomicUsize,
    detach_count: AtomicUsize,
    /// Frames generated so far per channel, for continuous sine phase.
    position: AtomicU64,
}

/// A frame source that generates synthetic audio on demand.
///
/// Frames are delivered synchronously on the calling thread. Clones share the
/// same registration, so a test can keep a clone after handing the source to
/// a session.
///
/// # Example
///
/// ```
/// use audio_bridge::source::MockFrameSource;
/// use std::time::Duration;
///
/// let mock = MockFrameSource::new(48000, 1);
///
/// let silence = mock.silence_frame(Duration::from_millis(10));
/// assert_eq!(silence.samples_per_channel(), 480);
///
/// // Not attached yet, so nothing is delivered
/// assert!(!mock.emit(&silence));
/// ```
#[derive(Clone)]
pub struct MockFrameSource {
    sample_rate: u32,
    channels: u16,
    shared: Arc<MockShared>,
}

impl MockFrameSource {
    /// Creates a mock source producing frames in the given format.
    ///
    /// A zero channel count is treated as mono.
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            shared: Arc::new(MockShared::default()),
        }
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Builds a frame of silence lasting `duration`.
    pub fn silence_frame(&self, duration: Duration) -> AudioFrame {
        let samples = vec![0i16; self.frames_for(duration) * self.channels as usize];
        self.frame_from(samples)
    }

    /// Builds a sine frame lasting `duration`, continuing the phase of the
    /// previous sine frame.
    pub fn sine_frame(&self, frequency: f64, duration: Duration) -> AudioFrame {
        let frames = self.frames_for(duration);
        let start = self
            .shared
            .position
            .fetch_add(frames as u64, Ordering::Relaxed);
        let sample_rate = f64::from(self.sample_rate.max(1));

        let mut samples = Vec::with_capacity(frames * self.channels as usize);
        for i in 0..frames {
            let t = (start + i as u64) as f64 / sample_rate;
            let value = (2.0 * std::f64::consts::PI * frequency * t).sin();
            let sample = f32_to_i16(value as f32);

            // Same sample on every channel
            for _ in 0..self.channels {
                samples.push(sample);
            }
        }

        self.frame_from(samples)
    }

    /// Builds a frame from raw interleaved samples.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the samples do not divide into the channel count.
    pub fn frame(&self, samples: Vec<i16>) -> Result<AudioFrame, BridgeError> {
        AudioFrame::new(samples, self.sample_rate, self.channels)
    }

    /// Delivers `frame` to the attached handler.
    ///
    /// Returns `false` if nothing is attached.
    pub fn emit(&self, frame: &AudioFrame) -> bool {
        let handler = self
            .shared
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match handler {
            Some(handler) => {
                handler(frame);
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a handler is attached.
    pub fn is_attached(&self) -> bool {
        self.shared
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of times `attach` has been called.
    pub fn attach_count(&self) -> usize {
        self.shared.attach_count.load(Ordering::SeqCst)
    }

    /// Number of times `detach` has been called.
    pub fn detach_count(&self) -> usize {
        self.shared.detach_count.load(Ordering::SeqCst)
    }

    fn frames_for(&self, duration: Duration) -> usize {
        (u128::from(self.sample_rate) * duration.as_micros() / 1_000_000) as usize
    }

    fn frame_from(&self, samples: Vec<i16>) -> AudioFrame {
        // Sample count is always a multiple of the channel count here
        AudioFrame::new(samples, self.sample_rate, self.channels)
            .unwrap_or_else(|_| AudioFrame::mono(Vec::new(), self.sample_rate))
    }
}

impl FrameSource for MockFrameSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn attach(&mut self, handler: FrameHandler) -> Result<(), BridgeError> {
        self.shared.attach_count.fetch_add(1, Ordering::SeqCst);
        *self
            .shared
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
        Ok(())
    }

    fn detach(&mut self) {
        self.shared.detach_count.fetch_add(1, Ordering::SeqCst);
        self.shared
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
