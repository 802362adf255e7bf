use std::str::FromStr;

use cpal::{
    Device, Host, SampleFormat,
    traits::{DeviceTrait, HostTrait},
};

use crate::CHANNELS;

/// Errors that can occur while configuring or creating an audio output
/// stream.
///
/// This error type represents failures that may occur during output stream
/// setup, including device discovery, configuration negotiation and stream
/// construction.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The host reports no default output device.
    #[error("no output device available")]
    NoOutputDevice,
    /// No output device matches the requested ID.
    #[error("no output device with id {0}")]
    DeviceNotFound(String),
    /// Failed to enumerate audio output devices. This error occurs when the
    /// underlying audio backend fails to query the list of available output
    /// devices for the host.
    #[error("failed to read device's information: {0}")]
    ReadDevices(#[from] cpal::DevicesError),
    /// Failed to enumerate the output configurations of the device. This
    /// error occurs when the device disappears or the backend fails to query
    /// its capabilities.
    #[error("failed to read device's output configurations: {0}")]
    ReadConfigs(#[from] cpal::SupportedStreamConfigsError),
    /// The device cannot play stereo at the sample rate of the source.
    #[error("device does not support {channels} channel output at {sample_rate} Hz")]
    UnsupportedConfig { channels: u16, sample_rate: u32 },
    /// The device only offers a sample format the renderer cannot convert to.
    #[error("unsupported device sample format: {0:?}")]
    UnsupportedSampleFormat(SampleFormat),
    /// Failed to construct an output audio stream. This error is returned
    /// when the audio backend rejects the requested stream configuration or
    /// fails to initialize the output stream.
    #[error("failed to build device output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    /// Failed to start the output stream.
    #[error("failed to start device output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    /// Failed to parse the provided device ID, or to read the one reported
    /// by the backend. You should refer to CPAL's error for more information.
    #[error("failed to parse device id: {0}")]
    ReadDeviceId(#[from] cpal::DeviceIdError),
}

/// Represents an output audio device belonging to a specific host.
#[derive(Clone)]
pub struct HostOutputDevice {
    /// Unique identifier of the device within the host.
    pub id: cpal::DeviceId,
    /// Human-readable device description.
    pub description: String,

    device: Device,
}

impl std::fmt::Display for HostOutputDevice {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{} ({})", self.description, self.id)
    }
}

impl HostOutputDevice {
    fn from_device(device: Device) -> Result<Self, DeviceError> {
        let description = device
            .description()
            .map(|description| description.to_string())
            .unwrap_or_else(|_| String::from("unknown device"));
        Ok(Self {
            id: device.id()?,
            description,
            device,
        })
    }

    /// Negotiates a stereo stream configuration at `sample_rate`.
    ///
    /// Among the supported configurations with two channels that include
    /// `sample_rate`, a signed 16-bit one is preferred since it matches the
    /// spatializer's output without conversion. The buffer size is fixed to
    /// `buffer_frames` clamped to the range the device reports, or left to
    /// the backend when the range is unknown.
    pub fn stream_config(
        &self,
        sample_rate: u32,
        buffer_frames: u32,
    ) -> Result<(cpal::StreamConfig, SampleFormat), DeviceError> {
        let candidates: Vec<cpal::SupportedStreamConfig> = self
            .device
            .supported_output_configs()?
            .filter(|range| range.channels() as usize == CHANNELS)
            .filter_map(|range| range.try_with_sample_rate(sample_rate))
            .collect();

        let supported = candidates
            .iter()
            .find(|config| config.sample_format() == SampleFormat::I16)
            .or_else(|| candidates.first())
            .cloned()
            .ok_or(DeviceError::UnsupportedConfig {
                channels: CHANNELS as u16,
                sample_rate,
            })?;

        let buffer_size = match supported.buffer_size() {
            cpal::SupportedBufferSize::Range { min, max } => {
                cpal::BufferSize::Fixed(buffer_frames.clamp(*min, *max))
            }
            cpal::SupportedBufferSize::Unknown => cpal::BufferSize::Default,
        };

        let sample_format = supported.sample_format();
        let mut config: cpal::StreamConfig = supported.into();
        config.buffer_size = buffer_size;
        Ok((config, sample_format))
    }
}

/// Returns the default output device of the given host.
pub fn default_output_device(host: &Host) -> Result<HostOutputDevice, DeviceError> {
    let device = host
        .default_output_device()
        .ok_or(DeviceError::NoOutputDevice)?;
    HostOutputDevice::from_device(device)
}

/// Returns a list of all output audio devices available on the given host.
pub fn list_host_output_devices(host: &Host) -> Result<Vec<HostOutputDevice>, DeviceError> {
    host.output_devices()?
        .map(HostOutputDevice::from_device)
        .collect()
}

/// Retrieves a specific output device by its unique identifier within a
/// given host.
///
/// Attempts to look up the device using a string representation of its
/// [`cpal::DeviceId`].
pub fn output_device_by_id(
    host: &Host,
    device_id: &str,
) -> Result<HostOutputDevice, DeviceError> {
    let parsed_id = cpal::DeviceId::from_str(device_id)?;
    let device = host
        .device_by_id(&parsed_id)
        .ok_or_else(|| DeviceError::DeviceNotFound(device_id.to_string()))?;
    HostOutputDevice::from_device(device)
}

/// Creates an output audio stream that pulls interleaved stereo `i16`
/// samples from `fill`.
///
/// The stream configuration is negotiated with
/// [`HostOutputDevice::stream_config`]. It registers two callbacks:
/// - `fill` is invoked on the audio thread whenever the device needs more
///   samples. It receives an `i16` buffer the size of the device buffer,
///   which is then converted to the device's sample format.
/// - `error_callback` is invoked on the audio thread if a runtime stream
///   error occurs.
///
/// The stream is returned paused; call `play` to start it.
///
/// # Threading
///
/// Both callbacks are executed on a real-time audio thread. They must:
/// - Be fast and non-blocking.
/// - Avoid memory allocation.
/// - Avoid locks and I/O.
///
/// Blocking operations in callbacks may cause audio dropouts.
pub fn open_cpal_output_stream(
    output_device: &HostOutputDevice,
    sample_rate: u32,
    buffer_frames: u32,
    fill: impl FnMut(&mut [i16]) + Send + 'static,
    error_callback: impl FnMut(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, DeviceError> {
    let (config, sample_format) = output_device.stream_config(sample_rate, buffer_frames)?;
    log::debug!("Negotiated output config {config:?} with {sample_format:?} samples");

    let device = &output_device.device;
    let capacity = render_capacity(config.buffer_size, buffer_frames);
    match sample_format {
        SampleFormat::I16 => build_stream::<i16>(device, &config, capacity, fill, error_callback),
        SampleFormat::I32 => build_stream::<i32>(device, &config, capacity, fill, error_callback),
        SampleFormat::U16 => build_stream::<u16>(device, &config, capacity, fill, error_callback),
        SampleFormat::F32 => build_stream::<f32>(device, &config, capacity, fill, error_callback),
        SampleFormat::F64 => build_stream::<f64>(device, &config, capacity, fill, error_callback),
        other => Err(DeviceError::UnsupportedSampleFormat(other)),
    }
}

/// Number of `i16` samples to preallocate for the render buffer.
///
/// When the backend picks the buffer size itself, the preferred size is
/// used as the estimate so the first callbacks do not allocate.
fn render_capacity(buffer_size: cpal::BufferSize, buffer_frames: u32) -> usize {
    let frames = match buffer_size {
        cpal::BufferSize::Fixed(frames) => frames,
        cpal::BufferSize::Default => buffer_frames,
    };
    frames as usize * CHANNELS
}

fn build_stream<T>(
    device: &Device,
    config: &cpal::StreamConfig,
    capacity: usize,
    mut fill: impl FnMut(&mut [i16]) + Send + 'static,
    error_callback: impl FnMut(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, DeviceError>
where
    T: cpal::SizedSample + cpal::FromSample<i16>,
{
    let mut rendered: Vec<i16> = Vec::with_capacity(capacity);

    Ok(device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            // only allocates when the backend hands over more samples than
            // were reserved up front
            if rendered.len() != data.len() {
                rendered.resize(data.len(), 0);
            }
            fill(&mut rendered);
            for (output, sample) in data.iter_mut().zip(&rendered) {
                *output = T::from_sample(*sample);
            }
        },
        error_callback,
        None,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_capacity_follows_the_fixed_buffer_size() {
        assert_eq!(render_capacity(cpal::BufferSize::Fixed(512), 2048), 1024);
    }

    #[test]
    fn render_capacity_is_reserved_when_the_backend_picks_the_size() {
        assert_eq!(render_capacity(cpal::BufferSize::Default, 2048), 4096);
    }
}
