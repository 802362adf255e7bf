use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use binaural_bridge::{ListenerGeometry, config::SpatialConfig};
use clap::Parser;

/// Plays a WAV file as a point sound source placed around the listener.
///
/// While playing, type a distance in metres and an angle in degrees away
/// from straight ahead (positive is to the right) to move the source.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Signed 16-bit stereo WAV file to play.
    #[arg(required_unless_present = "list_devices")]
    wav_file: Option<PathBuf>,
    /// Initial distance of the source, in metres.
    #[arg(long)]
    distance: Option<f64>,
    /// Initial azimuth of the source, in degrees.
    #[arg(long, allow_negative_numbers = true)]
    azimuth: Option<f64>,
    /// Distance between the ears, in metres.
    #[arg(long)]
    ear_separation: Option<f64>,
    /// Speed of sound, in metres per second.
    #[arg(long)]
    speed_of_sound: Option<f64>,
    /// Upper bound for the inter-aural delay, in seconds.
    #[arg(long)]
    max_delay: Option<f64>,
    /// Preferred output buffer size, in frames.
    #[arg(long)]
    buffer_frames: Option<u32>,
    /// ID of the output device to use instead of the default one.
    #[arg(long)]
    device: Option<String>,
    /// Print the available output devices and exit.
    #[arg(long)]
    list_devices: bool,
}

impl Cli {
    fn spatial_config(&self) -> SpatialConfig {
        let defaults = SpatialConfig::default();
        SpatialConfig {
            ear_separation: self.ear_separation.unwrap_or(defaults.ear_separation),
            speed_of_sound: self.speed_of_sound.unwrap_or(defaults.speed_of_sound),
            initial_geometry: ListenerGeometry::new(
                self.distance.unwrap_or(defaults.initial_geometry.distance),
                self.azimuth.unwrap_or(defaults.initial_geometry.azimuth_degrees),
            ),
            max_delay_seconds: self.max_delay.unwrap_or(defaults.max_delay_seconds),
            buffer_frames: self.buffer_frames.unwrap_or(defaults.buffer_frames),
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.list_devices {
        let devices =
            binaural_backend::list_output_devices().context("failed to list output devices")?;
        for (index, device) in devices.iter().enumerate() {
            println!("{}. Output device: {device}", index + 1);
        }
        return Ok(());
    }

    let config = cli.spatial_config();
    let path = cli.wav_file.context("missing WAV file argument")?;
    log::debug!("Using {config:?}");

    binaural_backend::run(&config, &path, cli.device.as_deref())
        .with_context(|| format!("failed to play {}", path.display()))
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // usage errors exit with 1, help and version output with 0
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .without_timestamps()
        .init()
        .expect("failed to create logger instance");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_defaults() {
        let cli = Cli::try_parse_from([
            "binaural",
            "song.wav",
            "--azimuth",
            "-45",
            "--speed-of-sound",
            "343",
        ])
        .expect("valid arguments");
        let config = cli.spatial_config();

        assert_eq!(config.initial_geometry, ListenerGeometry::new(10.0, -45.0));
        assert_eq!(config.speed_of_sound, 343.0);
        assert_eq!(config.ear_separation, SpatialConfig::default().ear_separation);
        assert_eq!(cli.wav_file, Some(PathBuf::from("song.wav")));
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let error = Cli::try_parse_from(["binaural"]).expect_err("file is required");
        assert!(error.use_stderr());
    }

    #[test]
    fn device_listing_does_not_need_a_file() {
        let cli = Cli::try_parse_from(["binaural", "--list-devices"]).expect("valid arguments");
        assert!(cli.list_devices);
        assert!(cli.wav_file.is_none());
    }
}
