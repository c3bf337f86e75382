//! trackhit-io: Schema-versioned point files for trackhit.
//!
//! This crate provides binary persistence of hit points with an explicit,
//! versioned record schema, memory-mapped reading via memmap2, JSON and
//! CSV export, and the JSON analysis configuration.
//!

pub mod config;
mod error;
mod reader;
pub mod schema;
mod writer;

pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use reader::{decode_points, read_points_json, FileHeader, PointFileReader};
pub use schema::{Field, FieldSpec, FieldWidth, Schema};
pub use writer::{encode_points, encode_points_with, PointFileWriter};
