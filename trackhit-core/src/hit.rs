//! Detector hit points: entrance and exit of a simulated track through
//! a sensitive volume.
//!
//! Exit position, exit momentum and fragment identity are persisted as
//! `f32` to keep large simulated event samples small. In memory every
//! field is `f64`; [`DetectorHitPoint::stored`] gives the value a point
//! reads back as after a round trip through a file.
#![allow(clippy::cast_possible_truncation, clippy::float_cmp)]

use crate::point::{TrackCrossing, TrackPoint};
use crate::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometric measure used to decide whether a point is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SeparationMetric {
    /// Absolute z-extent `|z_out - z_in|`.
    ///
    /// A usable point under this metric always has a well defined
    /// interpolation along z.
    #[default]
    ZExtent,
    /// Euclidean distance between entrance and exit.
    Euclidean,
}

/// Policy for [`DetectorHitPoint::is_usable_with`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsabilityPolicy {
    /// Separation measure.
    pub metric: SeparationMetric,
    /// Minimum separation between entrance and exit [cm].
    pub min_separation_cm: f64,
}

impl Default for UsabilityPolicy {
    fn default() -> Self {
        Self {
            metric: SeparationMetric::ZExtent,
            min_separation_cm: Self::DEFAULT_MIN_SEPARATION_CM,
        }
    }
}

impl UsabilityPolicy {
    /// Default separation threshold: one micrometre.
    pub const DEFAULT_MIN_SEPARATION_CM: f64 = 1.0e-4;

    /// Creates a policy with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the separation metric.
    #[must_use]
    pub fn with_metric(mut self, metric: SeparationMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the minimum separation.
    #[must_use]
    pub fn with_min_separation(mut self, min_separation_cm: f64) -> Self {
        self.min_separation_cm = min_separation_cm;
        self
    }

    /// Separation of a point under this policy's metric [cm].
    #[must_use]
    pub fn separation(&self, point: &DetectorHitPoint) -> f64 {
        match self.metric {
            SeparationMetric::ZExtent => (point.z_out() - point.z_in()).abs(),
            SeparationMetric::Euclidean => point.separation(),
        }
    }

    /// Returns true if the point passes this policy.
    ///
    /// Zero separation never passes, whatever the threshold.
    #[must_use]
    pub fn accepts(&self, point: &DetectorHitPoint) -> bool {
        let separation = self.separation(point);
        separation.is_finite() && separation > 0.0 && separation >= self.min_separation_cm
    }
}

/// Simulated hit point of one track crossing one sensitive volume.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorHitPoint {
    base: TrackPoint,
    x_out: f64,
    y_out: f64,
    z_out: f64,
    px_out: f64,
    py_out: f64,
    pz_out: f64,
    detector_copy_id: i32,
    fragment_z: f64,
    fragment_a: f64,
    light_yield: f64,
}

impl DetectorHitPoint {
    /// Creates a fully populated hit point.
    ///
    /// # Arguments
    ///
    /// * `track_id` - Index of the simulated track.
    /// * `detector_id` - Logical detector identifier.
    /// * `detector_copy_id` - Physical copy of the sensitive volume.
    /// * `z`, `a` - Atomic and mass number of the fragment.
    /// * `pos_in`, `pos_out` - Entrance and exit coordinates [cm].
    /// * `mom_in`, `mom_out` - Momentum at entrance and exit [GeV].
    /// * `tof` - Time since event start [ns].
    /// * `length` - Track length since creation [cm].
    /// * `energy_loss` - Energy deposit [GeV].
    /// * `light_yield` - Simulated scintillation light yield.
    ///
    /// No range checks are performed.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        track_id: i32,
        detector_id: i32,
        detector_copy_id: i32,
        z: f64,
        a: f64,
        pos_in: Vec3,
        pos_out: Vec3,
        mom_in: Vec3,
        mom_out: Vec3,
        tof: f64,
        length: f64,
        energy_loss: f64,
        light_yield: f64,
    ) -> Self {
        let mut point = Self {
            base: TrackPoint::new(track_id, detector_id, pos_in, mom_in, tof, length, energy_loss),
            detector_copy_id,
            fragment_z: z,
            fragment_a: a,
            light_yield,
            ..Self::default()
        };
        point.set_position_out(pos_out);
        point.set_momentum_out(mom_out);
        point
    }

    /// Builds a point around an existing base record.
    #[must_use]
    pub fn from_base(base: TrackPoint) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Mutable access to the entrance record.
    pub fn base_mut(&mut self) -> &mut TrackPoint {
        &mut self.base
    }

    #[inline]
    #[must_use]
    pub fn detector_copy_id(&self) -> i32 {
        self.detector_copy_id
    }

    #[inline]
    #[must_use]
    pub fn x_out(&self) -> f64 {
        self.x_out
    }

    #[inline]
    #[must_use]
    pub fn y_out(&self) -> f64 {
        self.y_out
    }

    #[inline]
    #[must_use]
    pub fn z_out(&self) -> f64 {
        self.z_out
    }

    #[inline]
    #[must_use]
    pub fn px_out(&self) -> f64 {
        self.px_out
    }

    #[inline]
    #[must_use]
    pub fn py_out(&self) -> f64 {
        self.py_out
    }

    #[inline]
    #[must_use]
    pub fn pz_out(&self) -> f64 {
        self.pz_out
    }

    /// Atomic number of the fragment.
    #[inline]
    #[must_use]
    pub fn fragment_z(&self) -> f64 {
        self.fragment_z
    }

    /// Mass number of the fragment.
    #[inline]
    #[must_use]
    pub fn fragment_a(&self) -> f64 {
        self.fragment_a
    }

    #[inline]
    #[must_use]
    pub fn light_yield(&self) -> f64 {
        self.light_yield
    }

    /// Exit position as a vector [cm].
    #[must_use]
    pub fn position_out(&self) -> Vec3 {
        Vec3::new(self.x_out(), self.y_out(), self.z_out())
    }

    /// Exit momentum as a vector [GeV].
    #[must_use]
    pub fn momentum_out(&self) -> Vec3 {
        Vec3::new(self.px_out(), self.py_out(), self.pz_out())
    }

    /// Replaces the exit position.
    pub fn set_position_out(&mut self, pos: Vec3) {
        self.x_out = pos.x;
        self.y_out = pos.y;
        self.z_out = pos.z;
    }

    /// Replaces the exit momentum.
    pub fn set_momentum_out(&mut self, mom: Vec3) {
        self.px_out = mom.x;
        self.py_out = mom.y;
        self.pz_out = mom.z;
    }

    pub fn set_detector_copy_id(&mut self, id: i32) {
        self.detector_copy_id = id;
    }

    /// Replaces the fragment identity, e.g. after an identity correction.
    pub fn set_fragment(&mut self, z: f64, a: f64) {
        self.fragment_z = z;
        self.fragment_a = a;
    }

    pub fn set_light_yield(&mut self, light_yield: f64) {
        self.light_yield = light_yield;
    }

    /// Copy with the reduced-precision fields rounded to `f32`, as they
    /// read back from a point file.
    #[must_use]
    pub fn stored(&self) -> Self {
        let narrow = |v: f64| f64::from(v as f32);
        Self {
            x_out: narrow(self.x_out),
            y_out: narrow(self.y_out),
            z_out: narrow(self.z_out),
            px_out: narrow(self.px_out),
            py_out: narrow(self.py_out),
            pz_out: narrow(self.pz_out),
            fragment_z: narrow(self.fragment_z),
            fragment_a: narrow(self.fragment_a),
            ..*self
        }
    }

    /// Vector from entrance to exit [cm].
    #[must_use]
    pub fn path_vector(&self) -> Vec3 {
        self.position_out() - self.position_in()
    }

    /// Euclidean distance between entrance and exit [cm].
    #[must_use]
    pub fn separation(&self) -> f64 {
        self.path_vector().norm()
    }

    /// X coordinate of the track at plane `z`.
    ///
    /// The track is a straight line through entrance and exit. Planes
    /// outside the segment are extrapolated. If entrance and exit share
    /// the same z, the entrance x is returned; check [`Self::is_usable`]
    /// first when the result matters.
    #[must_use]
    pub fn x_at(&self, z: f64) -> f64 {
        self.interpolate(z, self.x_in(), self.x_out())
    }

    /// Y coordinate of the track at plane `z`. See [`Self::x_at`].
    #[must_use]
    pub fn y_at(&self, z: f64) -> f64 {
        self.interpolate(z, self.y_in(), self.y_out())
    }

    /// Track position at plane `z`.
    #[must_use]
    pub fn position_at(&self, z: f64) -> Vec3 {
        Vec3::new(self.x_at(z), self.y_at(z), z)
    }

    fn interpolate(&self, z: f64, value_in: f64, value_out: f64) -> f64 {
        let z_in = self.z_in();
        let dz = self.z_out() - z_in;
        if dz == 0.0 {
            return value_in;
        }
        value_in + (z - z_in) / dz * (value_out - value_in)
    }

    /// Returns true if entrance and exit are far enough apart for
    /// interpolation, using [`UsabilityPolicy::default`].
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.is_usable_with(&UsabilityPolicy::default())
    }

    /// Usability under a caller-chosen policy.
    #[must_use]
    pub fn is_usable_with(&self, policy: &UsabilityPolicy) -> bool {
        policy.accepts(self)
    }
}

impl TrackCrossing for DetectorHitPoint {
    #[inline]
    fn base(&self) -> &TrackPoint {
        &self.base
    }
}
