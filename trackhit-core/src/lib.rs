//! trackhit-core: Track-crossing records for simulated detector data.
//!
//! This crate provides the simulated hit point of one track through one
//! sensitive volume, its straight-line interpolation and usability test,
//! and the parameter containers that accompany it.
//!

pub mod batch;
pub mod error;
pub mod hit;
pub mod params;
pub mod point;
pub mod vector;

pub use batch::{count_usable, resample, resample_planes, TrackSample};
pub use error::{Error, Result};
pub use hit::{DetectorHitPoint, SeparationMetric, UsabilityPolicy};
pub use params::{DetectorHitPar, ParSetInfo, ParamList, ParamValue, ParameterContainer};
pub use point::{TrackCrossing, TrackPoint};
pub use vector::Vec3;
