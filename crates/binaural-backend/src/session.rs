use std::sync::Arc;

use binaural_audio::{
    device::{DeviceError, HostOutputDevice},
    source::SourceBuffer,
    spatializer,
};
use binaural_bridge::{AcousticParameters, PlaybackProgress, SharedParameters};
use cpal::traits::StreamTrait;

/// A running playback stream together with the state it shares with the
/// foreground loop.
///
/// The source buffer is moved into the output callback, which is its only
/// owner from then on. The foreground side keeps the parameter cell it
/// publishes into and the progress counter the callback reports to.
///
/// Dropping the session stops the stream and releases the decoded samples.
pub struct PlaybackSession {
    /// Parameter snapshot read by the callback once per invocation.
    pub parameters: Arc<SharedParameters>,
    /// Remaining source bytes as last reported by the callback.
    pub progress: Arc<PlaybackProgress>,

    _stream: cpal::Stream,
}

impl PlaybackSession {
    /// Opens an output stream on `output_device` at the source's sample rate
    /// and starts playing it immediately.
    pub fn start(
        output_device: &HostOutputDevice,
        mut source: SourceBuffer,
        initial: AcousticParameters,
        buffer_frames: u32,
    ) -> Result<Self, DeviceError> {
        let parameters = Arc::new(SharedParameters::new(initial));
        let progress = Arc::new(PlaybackProgress::new(source.remaining_bytes()));
        let sample_rate = source.sample_rate();

        let fill = {
            let parameters = Arc::clone(&parameters);
            let progress = Arc::clone(&progress);
            move |output: &mut [i16]| {
                spatializer::fill(output, &mut source, parameters.snapshot());
                progress.update(source.remaining_bytes());
            }
        };
        let handle_error = move |error| log::error!("Output stream error: {error}");

        let stream = binaural_audio::device::open_cpal_output_stream(
            output_device,
            sample_rate,
            buffer_frames,
            fill,
            handle_error,
        )?;
        stream.play()?;
        log::info!("Playing on {output_device} at {sample_rate} Hz");

        Ok(Self {
            parameters,
            progress,
            _stream: stream,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.progress.is_finished()
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        log::info!(
            "Closing output stream with {} bytes left unplayed",
            self.progress.remaining_bytes()
        );
    }
}
