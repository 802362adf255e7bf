use crate::geometry::ListenerGeometry;

/// Errors reported when a [`SpatialConfig`] holds values the solver cannot
/// work with.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// Ear separation must be a positive, finite length.
    #[error("ear separation must be positive, got {0} m")]
    EarSeparation(f64),
    /// Speed of sound must be a positive, finite speed.
    #[error("speed of sound must be positive, got {0} m/s")]
    SpeedOfSound(f64),
    /// The delay clamp must be a positive, finite duration.
    #[error("maximum delay must be positive, got {0} s")]
    MaxDelay(f64),
    /// The device buffer size must hold at least one frame.
    #[error("buffer size must be at least one frame")]
    BufferFrames,
}

/// Physical constants and playback settings for a spatialization session.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialConfig {
    /// Distance between the two ears, in metres.
    pub ear_separation: f64,
    /// Speed of sound in air, in metres per second. Roughly 300 m/s plus the
    /// air temperature in degrees Celsius.
    pub speed_of_sound: f64,
    /// Geometry in effect before the first value is read from the input.
    pub initial_geometry: ListenerGeometry,
    /// Upper bound for the inter-aural delay, in seconds. Keeps extreme
    /// geometry from producing pathological per-callback iteration counts.
    pub max_delay_seconds: f64,
    /// Preferred device buffer size, in frames.
    pub buffer_frames: u32,
}

impl SpatialConfig {
    /// Checks that every physical constant is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ear_separation.is_finite() && self.ear_separation > 0.0) {
            return Err(ConfigError::EarSeparation(self.ear_separation));
        }
        if !(self.speed_of_sound.is_finite() && self.speed_of_sound > 0.0) {
            return Err(ConfigError::SpeedOfSound(self.speed_of_sound));
        }
        if !(self.max_delay_seconds.is_finite() && self.max_delay_seconds > 0.0) {
            return Err(ConfigError::MaxDelay(self.max_delay_seconds));
        }
        if self.buffer_frames == 0 {
            return Err(ConfigError::BufferFrames);
        }
        Ok(())
    }

    /// Largest delay, in frames, allowed at the given sample rate.
    pub fn max_delay_frames(&self, sample_rate: u32) -> i32 {
        let frames = self.max_delay_seconds * f64::from(sample_rate);
        frames.min(f64::from(i32::MAX)) as i32
    }
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            ear_separation: 0.20,
            speed_of_sound: 320.0,
            initial_geometry: ListenerGeometry::default(),
            max_delay_seconds: 1.0,
            buffer_frames: 2048,
        }
    }
}
