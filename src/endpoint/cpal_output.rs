//! CPAL output stream endpoint.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig,
    SupportedBufferSize,
};

use crate::endpoint::block::BlockPuller;
use crate::endpoint::{PlaybackCallbacks, PlaybackEndpoint};
use crate::{BridgeError, OutputFormat};

/// Lists all available output devices.
///
/// # Errors
///
/// Returns an error if the audio host cannot be accessed.
pub fn list_output_devices() -> Result<Vec<String>, BridgeError> {
    let host = cpal::default_host();
    let devices = host.output_devices().map_err(BridgeError::backend)?;

    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Gets the name of the default output device, if any.
pub fn default_output_device_name() -> Option<String> {
    cpal::default_host()
        .default_output_device()
        .and_then(|d| d.name().ok())
}

/// Playback endpoint backed by a CPAL output stream.
///
/// The device callback pulls `f32` samples from the bridge in fixed 10ms
/// blocks, whatever buffer size the backend hands it, and converts them to the
/// device's sample type (`f32`, `i16` or `u16`). The stream runs while
/// the endpoint is started; `stop` drops it.
#[must_use]
pub struct CpalOutput {
    device: Device,
    name: String,
    stream: Option<Stream>,
    active_format: Option<(u32, u16)>,
}

impl CpalOutput {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `NoDefaultDevice` if no default output device is configured.
    pub fn open_default() -> Result<Self, BridgeError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(BridgeError::NoDefaultDevice)?;

        Ok(Self::from_device(device))
    }

    /// Opens a specific output device by name.
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` if no device with the given name exists.
    pub fn open_by_name(name: &str) -> Result<Self, BridgeError> {
        let host = cpal::default_host();
        let devices = host.output_devices().map_err(BridgeError::backend)?;

        for device in devices {
            if let Ok(device_name) = device.name() {
                if device_name == name {
                    return Ok(Self::from_device(device));
                }
            }
        }

        Err(BridgeError::DeviceNotFound {
            name: name.to_string(),
        })
    }

    fn from_device(device: Device) -> Self {
        let name = device.name().unwrap_or_else(|_| "unknown".to_string());
        Self {
            device,
            name,
            stream: None,
            active_format: None,
        }
    }

    /// Returns the device's default output format (sample rate, channels).
    pub fn native_config(&self) -> Result<(u32, u16), BridgeError> {
        let config = self
            .device
            .default_output_config()
            .map_err(BridgeError::backend)?;
        Ok((config.sample_rate().0, config.channels()))
    }

    /// The format the running stream plays at, if started.
    pub fn active_format(&self) -> Option<(u32, u16)> {
        self.active_format
    }

    fn build_stream<T>(
        &self,
        config: &StreamConfig,
        block_frames: usize,
        callbacks: PlaybackCallbacks,
    ) -> Result<Stream, BridgeError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let PlaybackCallbacks { pull, on_error } = callbacks;
        let mut puller = BlockPuller::new(block_frames, config.channels, config.sample_rate.0);

        self.device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    puller.fill(data, &pull, |sample: f32| T::from_sample(sample));
                },
                move |err| on_error(err.to_string()),
                None,
            )
            .map_err(BridgeError::backend)
    }
}

/// Frames per bridge pull: 10ms, clamped into the device's supported range.
fn block_frames(sample_rate: u32, supported: &SupportedBufferSize) -> u32 {
    let frames = (sample_rate / 100).max(1);
    match supported {
        SupportedBufferSize::Range { min, max } if min <= max => frames.clamp(*min, *max),
        _ => frames,
    }
}

impl PlaybackEndpoint for CpalOutput {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(
        &mut self,
        callbacks: PlaybackCallbacks,
        requested: OutputFormat,
    ) -> Result<(), BridgeError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let supported = self
            .device
            .default_output_config()
            .map_err(BridgeError::backend)?;
        let sample_format = supported.sample_format();
        let supported_buffer = supported.buffer_size().clone();

        let mut config: StreamConfig = supported.into();
        if let OutputFormat::Fixed {
            sample_rate,
            channels,
        } = requested
        {
            config.sample_rate = cpal::SampleRate(sample_rate);
            config.channels = channels;
        }

        // Ask for a steady device buffer where the backend reports a range.
        // The pull length stays constant either way.
        let frames = block_frames(config.sample_rate.0, &supported_buffer);
        if matches!(supported_buffer, SupportedBufferSize::Range { .. }) {
            config.buffer_size = BufferSize::Fixed(frames);
        }
        let frames = frames as usize;

        let stream = match sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(&config, frames, callbacks)?,
            SampleFormat::I16 => self.build_stream::<i16>(&config, frames, callbacks)?,
            SampleFormat::U16 => self.build_stream::<u16>(&config, frames, callbacks)?,
            format => {
                return Err(BridgeError::UnsupportedFormat {
                    format: format!("{format:?}"),
                });
            }
        };

        stream.play().map_err(BridgeError::backend)?;

        tracing::debug!(
            device = %self.name,
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            ?sample_format,
            block_frames = frames,
            "Playback started"
        );

        self.stream = Some(stream);
        self.active_format = Some((config.sample_rate.0, config.channels));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        if let Some(stream) = self.stream.take() {
            // Dropping the stream detaches the callback even if pause fails
            let paused = stream.pause().map_err(BridgeError::backend);
            drop(stream);
            self.active_format = None;
            tracing::debug!(device = %self.name, "Playback stopped");
            return paused;
        }
        Ok(())
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::warn!(
                device = %self.name,
                error = %err,
                "Output stream failed to stop cleanly"
            );
        }
    }
}
