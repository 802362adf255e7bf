//! Session setup and the foreground parameter loop.
//!
//! This module wires together configuration, the decoded source, the output
//! device and the loop that listens for new listener geometry.

use std::{
    io::{BufRead, Write},
    path::Path,
};

use binaural_audio::{
    device::{self, DeviceError},
    solver::{GeometryError, GeometrySolver},
    source::{SourceBuffer, SourceError},
};
use binaural_bridge::{
    PlaybackProgress, SharedParameters,
    config::{ConfigError, SpatialConfig},
};

use crate::{input::ParameterReader, session::PlaybackSession};

/// Errors that end a playback session before the input runs out.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The configuration holds unusable physical constants.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The source file could not be decoded or has the wrong format.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The initial geometry could not be solved.
    #[error("invalid initial geometry: {0}")]
    Geometry(#[from] GeometryError),
    /// The audio subsystem failed to provide or start an output stream.
    #[error("audio subsystem error: {0}")]
    Device(#[from] DeviceError),
    /// Reading geometry or writing the prompt failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Returns a description of every output device on the default host.
pub fn list_output_devices() -> Result<Vec<String>, SessionError> {
    let host = cpal::default_host();
    Ok(device::list_host_output_devices(&host)?
        .iter()
        .map(ToString::to_string)
        .collect())
}

/// Plays the WAV file at `path` until the parameter input ends or the whole
/// file has been played.
///
/// Listener geometry is read from standard input, and the prompt is written
/// to standard output. `device_id` selects an output device by its ID,
/// falling back to the host's default device.
pub fn run(
    config: &SpatialConfig,
    path: &Path,
    device_id: Option<&str>,
) -> Result<(), SessionError> {
    config.validate()?;

    let source = SourceBuffer::open(path)?;
    let solver = GeometrySolver::from_config(config, source.sample_rate());
    let initial = solver.solve(config.initial_geometry)?;

    let host = cpal::default_host();
    let output_device = match device_id {
        Some(id) => device::output_device_by_id(&host, id)?,
        None => device::default_output_device(&host)?,
    };

    let session = PlaybackSession::start(&output_device, source, initial, config.buffer_frames)?;
    run_parameter_loop(
        &solver,
        &session.parameters,
        &session.progress,
        std::io::stdin().lock(),
        std::io::stdout().lock(),
    )?;

    if session.is_finished() {
        log::info!("Reached the end of the source");
    }
    Ok(())
}

/// Prompts for geometry and publishes the solved parameters until the input
/// ends or playback finishes.
///
/// The parameters currently in effect are printed before every prompt.
/// Geometry the solver rejects is logged and leaves the previous parameters
/// in place.
pub fn run_parameter_loop<R: BufRead, W: Write>(
    solver: &GeometrySolver,
    parameters: &SharedParameters,
    progress: &PlaybackProgress,
    input: R,
    mut output: W,
) -> std::io::Result<()> {
    let mut reader = ParameterReader::new(input);
    while !progress.is_finished() {
        writeln!(output, "{}", parameters.snapshot())?;
        writeln!(output, "l; θ:")?;
        output.flush()?;

        let Some(geometry) = reader.next_geometry()? else {
            log::info!("Parameter input ended");
            break;
        };

        match solver.solve(geometry) {
            Ok(solved) => {
                log::debug!("Solved {geometry} into {solved}");
                parameters.publish(solved);
            }
            Err(error) => log::warn!("Keeping previous parameters: {error}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use binaural_bridge::{AcousticParameters, ListenerGeometry};

    use super::*;

    fn centred(solver: &GeometrySolver) -> SharedParameters {
        let initial = solver
            .solve(ListenerGeometry::new(10.0, 0.0))
            .expect("valid geometry");
        SharedParameters::new(initial)
    }

    #[test]
    fn publishes_each_solved_geometry() {
        let solver = GeometrySolver::new(44_100);
        let parameters = centred(&solver);
        let progress = PlaybackProgress::new(1024);
        let mut output = Vec::new();

        run_parameter_loop(
            &solver,
            &parameters,
            &progress,
            Cursor::new("10 90\n"),
            &mut output,
        )
        .expect("in-memory loop");

        assert_eq!(parameters.snapshot().delay_frames, 28);
        assert_eq!(
            String::from_utf8(output).expect("prompt is utf-8"),
            "delay: 0; balance: 1.000000\nl; θ:\n\
             delay: 28; balance: 0.980198\nl; θ:\n"
        );
    }

    #[test]
    fn rejected_geometry_keeps_previous_parameters() {
        let solver = GeometrySolver::new(44_100);
        let parameters = centred(&solver);
        let progress = PlaybackProgress::new(1024);

        run_parameter_loop(
            &solver,
            &parameters,
            &progress,
            Cursor::new("10 -90\n0 45\n"),
            std::io::sink(),
        )
        .expect("in-memory loop");

        assert_eq!(parameters.snapshot().delay_frames, -28);
    }

    #[test]
    fn finished_playback_stops_before_prompting() {
        let solver = GeometrySolver::new(44_100);
        let parameters = centred(&solver);
        let progress = PlaybackProgress::new(0);
        let mut output = Vec::new();

        run_parameter_loop(
            &solver,
            &parameters,
            &progress,
            Cursor::new("10 90\n"),
            &mut output,
        )
        .expect("in-memory loop");

        assert!(output.is_empty());
        assert_eq!(parameters.snapshot(), AcousticParameters::default());
    }

    #[test]
    fn run_rejects_invalid_configuration_before_touching_the_file() {
        let config = SpatialConfig {
            speed_of_sound: 0.0,
            ..SpatialConfig::default()
        };
        let result = run(&config, Path::new("does-not-exist.wav"), None);
        assert!(matches!(
            result,
            Err(SessionError::Config(ConfigError::SpeedOfSound(_)))
        ));
    }

    #[test]
    fn run_reports_missing_files() {
        let result = run(
            &SpatialConfig::default(),
            Path::new("does-not-exist.wav"),
            None,
        );
        assert!(matches!(
            result,
            Err(SessionError::Source(SourceError::Decode { .. }))
        ));
    }
}
