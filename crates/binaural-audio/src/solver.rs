//! Geometry solver: listener geometry to inter-aural delay and balance.
//!
//! The head is modelled as two points `ear_separation` apart on a line
//! perpendicular to the forward direction. The source position is split into
//! a forward and a lateral offset, each ear's straight-line distance to the
//! source is measured, and the difference between the two distances becomes
//! the delay while their ratio becomes the level balance.

use binaural_bridge::{AcousticParameters, ListenerGeometry, config::SpatialConfig};

/// Ear distances below this many metres count as the source touching the ear.
const MIN_EAR_DISTANCE: f64 = 1e-9;

/// Errors returned for geometry the solver cannot turn into parameters.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    /// The source distance is zero, negative or not a finite number.
    #[error("distance must be a positive number, got {0}")]
    InvalidDistance(f64),
    /// The azimuth is not a finite number.
    #[error("azimuth must be a finite number of degrees, got {0}")]
    InvalidAzimuth(f64),
    /// The source sits exactly on one of the ears, so the level ratio is
    /// undefined.
    #[error("source at {0} coincides with an ear")]
    SourceAtEar(ListenerGeometry),
}

/// Physical constants needed to solve geometry at a given sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometrySolver {
    ear_separation: f64,
    speed_of_sound: f64,
    sample_rate: u32,
    max_delay_frames: i32,
}

impl GeometrySolver {
    /// Creates a solver with the default head model (20 cm between the
    /// ears, 320 m/s speed of sound).
    pub fn new(sample_rate: u32) -> Self {
        Self::from_config(&SpatialConfig::default(), sample_rate)
    }

    pub fn from_config(config: &SpatialConfig, sample_rate: u32) -> Self {
        Self {
            ear_separation: config.ear_separation,
            speed_of_sound: config.speed_of_sound,
            sample_rate,
            max_delay_frames: config.max_delay_frames(sample_rate),
        }
    }

    /// Solves `geometry` into a delay and balance pair.
    ///
    /// The delay is rounded to the nearest frame and clamped to the
    /// configured maximum. A positive delay means the source is closer to
    /// the right ear, so the left ear hears it later.
    pub fn solve(&self, geometry: ListenerGeometry) -> Result<AcousticParameters, GeometryError> {
        let ListenerGeometry {
            distance,
            azimuth_degrees,
        } = geometry;
        if !(distance.is_finite() && distance > 0.0) {
            return Err(GeometryError::InvalidDistance(distance));
        }
        if !azimuth_degrees.is_finite() {
            return Err(GeometryError::InvalidAzimuth(azimuth_degrees));
        }

        let theta = azimuth_degrees.to_radians();
        let forward = distance * theta.cos();
        let lateral = distance * theta.sin();

        let half_separation = self.ear_separation / 2.0;
        let right_lateral = (lateral - half_separation).abs();
        let left_lateral = (lateral + half_separation).abs();

        let right_distance = right_lateral.hypot(forward);
        let left_distance = left_lateral.hypot(forward);
        if right_distance < MIN_EAR_DISTANCE || left_distance < MIN_EAR_DISTANCE {
            return Err(GeometryError::SourceAtEar(geometry));
        }

        let delay = ((left_distance - right_distance) / self.speed_of_sound
            * f64::from(self.sample_rate))
        .round();
        let max_delay = f64::from(self.max_delay_frames);
        let delay_frames = delay.clamp(-max_delay, max_delay) as i32;

        // amplitude falls with distance, i.e. the square root of the power
        // ratio er^2 / el^2
        let balance = (right_distance / left_distance) as f32;

        Ok(AcousticParameters {
            delay_frames,
            balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn source_straight_ahead_has_no_difference() {
        let solver = GeometrySolver::new(44_100);
        for distance in [0.5, 1.0, 10.0, 250.0] {
            let parameters = solver
                .solve(ListenerGeometry::new(distance, 0.0))
                .expect("valid geometry");
            assert_eq!(parameters, AcousticParameters::default());
        }
    }

    #[test]
    fn source_to_the_right_delays_the_left_ear() {
        let solver = GeometrySolver::new(44_100);
        let parameters = solver
            .solve(ListenerGeometry::new(10.0, 90.0))
            .expect("valid geometry");

        // (10.1 - 9.9) / 320 * 44100 = 27.5625
        assert_eq!(parameters.delay_frames, 28);
        assert_relative_eq!(parameters.balance, 9.9f32 / 10.1, epsilon = 1e-6);
    }

    #[test]
    fn mirrored_azimuth_mirrors_the_parameters() {
        let solver = GeometrySolver::new(48_000);
        for azimuth in [5.0, 30.0, 60.0, 90.0, 135.0] {
            let right = solver
                .solve(ListenerGeometry::new(2.0, azimuth))
                .expect("valid geometry");
            let left = solver
                .solve(ListenerGeometry::new(2.0, -azimuth))
                .expect("valid geometry");

            assert_eq!(left.delay_frames, -right.delay_frames);
            assert!(right.balance < 1.0);
            assert!(left.balance > 1.0);
            assert_relative_eq!(left.balance, 1.0 / right.balance, max_relative = 1e-6);
        }
    }

    #[test]
    fn solving_is_deterministic() {
        let solver = GeometrySolver::new(44_100);
        let geometry = ListenerGeometry::new(3.7, -41.3);
        let first = solver.solve(geometry).expect("valid geometry");
        let second = solver.solve(geometry).expect("valid geometry");
        assert_eq!(first.delay_frames, second.delay_frames);
        assert_eq!(first.balance.to_bits(), second.balance.to_bits());
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let solver = GeometrySolver::new(44_100);
        assert_eq!(
            solver.solve(ListenerGeometry::new(0.0, 10.0)),
            Err(GeometryError::InvalidDistance(0.0))
        );
        assert_eq!(
            solver.solve(ListenerGeometry::new(-1.0, 10.0)),
            Err(GeometryError::InvalidDistance(-1.0))
        );
        assert!(matches!(
            solver.solve(ListenerGeometry::new(f64::NAN, 10.0)),
            Err(GeometryError::InvalidDistance(_))
        ));
        assert!(matches!(
            solver.solve(ListenerGeometry::new(1.0, f64::INFINITY)),
            Err(GeometryError::InvalidAzimuth(_))
        ));

        let at_left_ear = ListenerGeometry::new(0.1, -90.0);
        assert!(matches!(
            solver.solve(at_left_ear),
            Err(GeometryError::SourceAtEar(_))
        ));
    }

    #[test]
    fn delay_is_clamped_to_the_configured_maximum() {
        let config = SpatialConfig {
            ear_separation: 1_000.0,
            speed_of_sound: 1.0,
            max_delay_seconds: 0.5,
            ..SpatialConfig::default()
        };
        let solver = GeometrySolver::from_config(&config, 8_000);

        let right = solver
            .solve(ListenerGeometry::new(2_000.0, 90.0))
            .expect("valid geometry");
        assert_eq!(right.delay_frames, 4_000);

        let left = solver
            .solve(ListenerGeometry::new(2_000.0, -90.0))
            .expect("valid geometry");
        assert_eq!(left.delay_frames, -4_000);
    }
}
