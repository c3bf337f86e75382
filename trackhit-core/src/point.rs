//! Generic track-crossing record shared by every detector point type.

use crate::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Entrance state of a simulated track segment inside a sensitive volume.
///
/// Detector-specific point types embed a `TrackPoint` and add their own
/// fields on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackPoint {
    /// Index of the originating simulated track.
    pub track_id: i32,
    /// Event the track belongs to.
    pub event_id: i32,
    /// Logical detector identifier.
    pub detector_id: i32,
    /// Coordinates at entrance to the active volume [cm].
    pub position: Vec3,
    /// Momentum of the track at entrance [GeV].
    pub momentum: Vec3,
    /// Time since event start [ns].
    pub time: f64,
    /// Track length since creation [cm].
    pub length: f64,
    /// Energy deposit [GeV].
    pub energy_loss: f64,
}

impl TrackPoint {
    /// Creates a new base record.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        track_id: i32,
        detector_id: i32,
        position: Vec3,
        momentum: Vec3,
        time: f64,
        length: f64,
        energy_loss: f64,
    ) -> Self {
        Self {
            track_id,
            event_id: 0,
            detector_id,
            position,
            momentum,
            time,
            length,
            energy_loss,
        }
    }

    pub fn set_track_id(&mut self, id: i32) {
        self.track_id = id;
    }

    pub fn set_event_id(&mut self, id: i32) {
        self.event_id = id;
    }

    pub fn set_detector_id(&mut self, id: i32) {
        self.detector_id = id;
    }

    pub fn set_position(&mut self, pos: Vec3) {
        self.position = pos;
    }

    pub fn set_momentum(&mut self, mom: Vec3) {
        self.momentum = mom;
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn set_length(&mut self, length: f64) {
        self.length = length;
    }

    pub fn set_energy_loss(&mut self, energy_loss: f64) {
        self.energy_loss = energy_loss;
    }
}

/// Trait for records describing one track crossing a sensitive volume.
///
/// Implementors only provide access to their embedded [`TrackPoint`];
/// the entrance accessors come for free.
pub trait TrackCrossing: Send + Sync {
    /// Returns the embedded base record.
    fn base(&self) -> &TrackPoint;

    #[inline]
    fn track_id(&self) -> i32 {
        self.base().track_id
    }

    #[inline]
    fn event_id(&self) -> i32 {
        self.base().event_id
    }

    #[inline]
    fn detector_id(&self) -> i32 {
        self.base().detector_id
    }

    /// Entrance position as a vector [cm].
    #[inline]
    fn position_in(&self) -> Vec3 {
        self.base().position
    }

    /// Entrance momentum as a vector [GeV].
    #[inline]
    fn momentum_in(&self) -> Vec3 {
        self.base().momentum
    }

    #[inline]
    fn x_in(&self) -> f64 {
        self.base().position.x
    }

    #[inline]
    fn y_in(&self) -> f64 {
        self.base().position.y
    }

    #[inline]
    fn z_in(&self) -> f64 {
        self.base().position.z
    }

    #[inline]
    fn px_in(&self) -> f64 {
        self.base().momentum.x
    }

    #[inline]
    fn py_in(&self) -> f64 {
        self.base().momentum.y
    }

    #[inline]
    fn pz_in(&self) -> f64 {
        self.base().momentum.z
    }

    /// Time of flight since event start [ns].
    #[inline]
    fn time(&self) -> f64 {
        self.base().time
    }

    /// Track length since creation [cm].
    #[inline]
    fn length(&self) -> f64 {
        self.base().length
    }

    /// Energy deposited in the volume [GeV].
    #[inline]
    fn energy_loss(&self) -> f64 {
        self.base().energy_loss
    }

    /// Magnitude of the entrance momentum [GeV].
    #[inline]
    fn momentum_magnitude_in(&self) -> f64 {
        self.base().momentum.norm()
    }
}

impl TrackCrossing for TrackPoint {
    #[inline]
    fn base(&self) -> &TrackPoint {
        self
    }
}
