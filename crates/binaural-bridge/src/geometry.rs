/// Position of a point sound source relative to the listener's head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerGeometry {
    /// Distance from the source to the centre of the head, in metres.
    pub distance: f64,
    /// Angle away from straight ahead, in degrees. Positive values place the
    /// source to the listener's right.
    pub azimuth_degrees: f64,
}

impl ListenerGeometry {
    pub fn new(distance: f64, azimuth_degrees: f64) -> Self {
        Self {
            distance,
            azimuth_degrees,
        }
    }
}

impl Default for ListenerGeometry {
    fn default() -> Self {
        Self::new(10.0, 10.0)
    }
}

impl std::fmt::Display for ListenerGeometry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "distance {} m, azimuth {}°",
            self.distance, self.azimuth_degrees
        )
    }
}

/// Inter-aural time and level difference derived from a [`ListenerGeometry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcousticParameters {
    /// Inter-aural delay in frames. Positive values delay the left ear
    /// (the source is closer to the right ear), negative values delay the
    /// right ear.
    pub delay_frames: i32,
    /// Ratio of the right-ear distance to the left-ear distance. Values at or
    /// below `1.0` attenuate the left channel by this factor; values above
    /// `1.0` attenuate the right channel by its inverse.
    pub balance: f32,
}

impl Default for AcousticParameters {
    /// Centred source: no delay, equal levels.
    fn default() -> Self {
        Self {
            delay_frames: 0,
            balance: 1.0,
        }
    }
}

impl std::fmt::Display for AcousticParameters {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "delay: {}; balance: {:.6}",
            self.delay_frames, self.balance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_prompt_format() {
        let parameters = AcousticParameters {
            delay_frames: 28,
            balance: 0.980198,
        };
        assert_eq!(parameters.to_string(), "delay: 28; balance: 0.980198");
    }
}
