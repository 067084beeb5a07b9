//! Builder pattern for `AudioBridge` sessions.

use std::sync::Arc;
use std::time::Duration;

use crate::endpoint::{PlaybackCallbacks, PlaybackEndpoint};
use crate::format::{LinearResampler, Resampler};
use crate::source::FrameSource;
use crate::{
    event_callback, AudioBridge, AudioFrame, BridgeConfig, BridgeError, BridgeEvent,
    BridgeSession, EventCallback, OutputFormat,
};

/// Builder for configuring a bridge and wiring it between a frame source and a
/// playback endpoint.
///
/// Use [`AudioBridge::builder()`] or [`AudioBridgeBuilder::new()`] to create one.
///
/// # Example
///
/// ```no_run
/// use audio_bridge::{AudioBridge, CpalOutput, OutputFormat};
/// use audio_bridge::source::MockFrameSource;
///
/// # fn main() -> Result<(), audio_bridge::BridgeError> {
/// let source = MockFrameSource::new(16000, 1);
///
/// let session = AudioBridge::builder()
///     .output_format(OutputFormat::Fixed { sample_rate: 48000, channels: 2 })
///     .on_event(|e| tracing::warn!(?e, "bridge event"))
///     .start(source, CpalOutput::open_default()?)?;
/// # drop(session);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct AudioBridgeBuilder {
    /// Bridge configuration.
    config: BridgeConfig,
    /// Converter applied to every frame. Defaults to [`LinearResampler`].
    resampler: Option<Box<dyn Resampler>>,
    /// Event callback.
    event_callback: Option<EventCallback>,
}

impl Default for AudioBridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBridgeBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            resampler: None,
            event_callback: None,
        }
    }

    /// Set how much audio the ring buffer holds at the consumer's format.
    ///
    /// Default: 200ms
    pub fn buffer_duration(mut self, duration: Duration) -> Self {
        self.config.buffer_duration = duration;
        self
    }

    /// Set the format requested from the playback endpoint.
    ///
    /// Default: [`OutputFormat::Native`]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output = format;
        self
    }

    /// Set custom bridge configuration.
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the converter used to bring frames to the consumer's format.
    ///
    /// Any `Fn(&AudioFrame, u16, u32) -> Vec<i16>` closure works as well.
    pub fn resampler<R: Resampler + 'static>(mut self, resampler: R) -> Self {
        self.resampler = Some(Box::new(resampler));
        self
    }

    /// Set a callback to receive runtime events.
    ///
    /// Events include format changes, overruns, starvation and endpoint errors.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(BridgeEvent) + Send + Sync + 'static,
    {
        self.event_callback = Some(event_callback(callback));
        self
    }

    /// Builds a standalone bridge without attaching anything to it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation.
    pub fn build(self) -> Result<AudioBridge, BridgeError> {
        let resampler = self
            .resampler
            .unwrap_or_else(|| Box::new(LinearResampler::new()));
        AudioBridge::from_parts(resampler, self.config, self.event_callback)
    }

    /// Builds the bridge, attaches it to `source` and starts `endpoint`.
    ///
    /// Returns a [`BridgeSession`] handle that owns all three.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The source refuses the attachment
    /// - The endpoint fails to start (the source is detached again)
    pub fn start<S, E>(self, source: S, endpoint: E) -> Result<BridgeSession, BridgeError>
    where
        S: FrameSource + 'static,
        E: PlaybackEndpoint + 'static,
    {
        let requested = self.config.output;
        let bridge = Arc::new(self.build()?);
        let mut source: Box<dyn FrameSource> = Box::new(source);
        let mut endpoint: Box<dyn PlaybackEndpoint> = Box::new(endpoint);

        let producer = Arc::clone(&bridge);
        if let Err(err) = source.attach(Arc::new(move |frame: &AudioFrame| {
            producer.on_frame_produced(frame);
        })) {
            bridge.close();
            return Err(err);
        }

        let consumer = Arc::clone(&bridge);
        let reporter = Arc::clone(&bridge);
        let callbacks = PlaybackCallbacks {
            pull: Arc::new(move |output: &mut [f32], channels: u16, sample_rate: u32| {
                consumer.on_consumer_pull(output, channels, sample_rate);
            }),
            on_error: Arc::new(move |reason: String| reporter.report_endpoint_error(reason)),
        };

        if let Err(err) = endpoint.start(callbacks, requested) {
            tracing::warn!(
                endpoint = endpoint.name(),
                error = %err,
                "Playback endpoint failed to start"
            );
            source.detach();
            bridge.close();
            return Err(err);
        }

        tracing::debug!(
            source = source.name(),
            endpoint = endpoint.name(),
            buffer_ms = bridge.config().buffer_duration.as_millis() as u64,
            "Bridge session started"
        );

        Ok(BridgeSession::new(bridge, source, endpoint))
    }
}

impl AudioBridge {
    /// Creates a new builder for configuring a bridge.
    pub fn builder() -> AudioBridgeBuilder {
        AudioBridgeBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockFrameSource;
    use crate::ManualEndpoint;

    struct FailingEndpoint;

    impl PlaybackEndpoint for FailingEndpoint {
        fn name(&self) -> &str {
            "failing"
        }

        fn start(&mut self, _: PlaybackCallbacks, _: OutputFormat) -> Result<(), BridgeError> {
            Err(BridgeError::NoDefaultDevice)
        }

        fn stop(&mut self) -> Result<(), BridgeError> {
            Ok(())
        }
    }

    #[test]
    fn test_builder_default() {
        let builder = AudioBridgeBuilder::new();
        assert_eq!(builder.config.buffer_duration, Duration::from_millis(200));
        assert_eq!(builder.config.output, OutputFormat::Native);
        assert!(builder.resampler.is_none());
        assert!(builder.event_callback.is_none());
    }

    #[test]
    fn test_builder_settings() {
        let builder = AudioBridge::builder()
            .buffer_duration(Duration::from_millis(50))
            .output_format(OutputFormat::Fixed {
                sample_rate: 44100,
                channels: 2,
            });

        assert_eq!(builder.config.buffer_duration, Duration::from_millis(50));
        assert_eq!(builder.config.output.sample_rate(), Some(44100));
    }

    #[test]
    fn test_build_rejects_zero_duration() {
        let result = AudioBridge::builder()
            .buffer_duration(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(BridgeError::InvalidConfig { .. })));
    }

    #[test]
    fn test_custom_resampler_is_used() {
        let bridge = AudioBridge::builder()
            .resampler(|frame: &AudioFrame, _: u16, _: u32| vec![4096; frame.samples().len()])
            .build()
            .unwrap();

        let mut output = vec![0.0f32; 2];
        bridge.on_consumer_pull(&mut output, 1, 8000);
        bridge.push_frame(&AudioFrame::mono(vec![1, 2], 8000)).unwrap();
        bridge.on_consumer_pull(&mut output, 1, 8000);
        assert_eq!(output, vec![0.125, 0.125]);
    }

    #[test]
    fn test_start_wires_source_and_endpoint() {
        let source = MockFrameSource::new(8000, 1);
        let endpoint = ManualEndpoint::new();

        let session = AudioBridge::builder()
            .start(source.clone(), endpoint.clone())
            .unwrap();

        assert!(session.is_running());
        assert!(source.is_attached());
        assert!(endpoint.is_playing());
    }

    #[test]
    fn test_failed_endpoint_detaches_source() {
        let source = MockFrameSource::new(8000, 1);

        let result = AudioBridge::builder().start(source.clone(), FailingEndpoint);

        assert!(matches!(result, Err(BridgeError::NoDefaultDevice)));
        assert!(!source.is_attached());
        assert_eq!(source.attach_count(), 1);
        assert_eq!(source.detach_count(), 1);
    }
}
