//! Parallel helpers over slices of hit points.
//!
//! Points are plain values, so readers on different threads need no
//! coordination. Output order always matches input order.

use crate::hit::{DetectorHitPoint, UsabilityPolicy};
use crate::point::TrackCrossing;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Track position of one hit point resampled at a z plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackSample {
    pub track_id: i32,
    pub detector_copy_id: i32,
    /// Plane the sample was taken at [cm].
    pub z: f64,
    pub x: f64,
    pub y: f64,
    /// Whether the source point passed the usability policy.
    pub usable: bool,
}

impl TrackSample {
    /// Samples a single point at plane `z`.
    #[must_use]
    pub fn from_point(point: &DetectorHitPoint, z: f64, policy: &UsabilityPolicy) -> Self {
        Self {
            track_id: point.track_id(),
            detector_copy_id: point.detector_copy_id(),
            z,
            x: point.x_at(z),
            y: point.y_at(z),
            usable: point.is_usable_with(policy),
        }
    }
}

/// Resamples every point at plane `z`.
#[must_use]
pub fn resample(points: &[DetectorHitPoint], z: f64, policy: &UsabilityPolicy) -> Vec<TrackSample> {
    points
        .par_iter()
        .map(|point| TrackSample::from_point(point, z, policy))
        .collect()
}

/// Resamples every point at each of `planes`; one vector per plane.
#[must_use]
pub fn resample_planes(
    points: &[DetectorHitPoint],
    planes: &[f64],
    policy: &UsabilityPolicy,
) -> Vec<Vec<TrackSample>> {
    planes
        .iter()
        .map(|&z| resample(points, z, policy))
        .collect()
}

/// Counts points accepted by `policy`.
#[must_use]
pub fn count_usable(points: &[DetectorHitPoint], policy: &UsabilityPolicy) -> usize {
    points
        .par_iter()
        .filter(|point| point.is_usable_with(policy))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;
    use approx::assert_relative_eq;

    fn make_points() -> Vec<DetectorHitPoint> {
        (0..100)
            .map(|i| {
                let exit_z = if i % 10 == 0 { 0.0 } else { 10.0 };
                DetectorHitPoint::new(
                    i,
                    1,
                    i % 4,
                    2.0,
                    4.0,
                    Vec3::zero(),
                    Vec3::new(f64::from(i), 2.0, exit_z),
                    Vec3::zero(),
                    Vec3::zero(),
                    0.0,
                    0.0,
                    0.0,
                    0.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_resample_preserves_order() {
        let points = make_points();
        let samples = resample(&points, 5.0, &UsabilityPolicy::default());
        assert_eq!(samples.len(), points.len());
        for (i, sample) in samples.iter().enumerate() {
            assert_eq!(sample.track_id, i32::try_from(i).unwrap());
        }
        assert_relative_eq!(samples[3].x, 1.5);
        assert_relative_eq!(samples[3].y, 1.0);
        assert!(samples[3].usable);
        // Degenerate point falls back to its entrance
        assert_relative_eq!(samples[10].x, 0.0);
        assert!(!samples[10].usable);
    }

    #[test]
    fn test_resample_planes() {
        let points = make_points();
        let planes = [0.0, 10.0, 20.0];
        let samples = resample_planes(&points, &planes, &UsabilityPolicy::default());
        assert_eq!(samples.len(), 3);
        assert_relative_eq!(samples[2][5].x, 10.0);
        assert_relative_eq!(samples[1][5].z, 10.0);
    }

    #[test]
    fn test_count_usable() {
        let points = make_points();
        assert_eq!(count_usable(&points, &UsabilityPolicy::default()), 90);
        assert_eq!(count_usable(&[], &UsabilityPolicy::default()), 0);
    }
}
