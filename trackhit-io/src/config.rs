//! Analysis configuration loaded from JSON.

use crate::Result;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use trackhit_core::{SeparationMetric, UsabilityPolicy};

/// Settings for resampling hit points.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisConfig {
    /// Policy used to flag points as usable.
    pub usability: UsabilityPolicy,
    /// Planes to resample at [cm].
    pub z_planes: Vec<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            usability: UsabilityPolicy::default(),
            z_planes: vec![0.0],
        }
    }
}

// Intermediate structs for the JSON schema
#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonConfig {
    usability: JsonUsability,
    sampling: JsonSampling,
}

#[derive(Deserialize)]
#[serde(default)]
struct JsonUsability {
    metric: SeparationMetric,
    min_separation_cm: f64,
}

impl Default for JsonUsability {
    fn default() -> Self {
        Self {
            metric: SeparationMetric::ZExtent,
            min_separation_cm: UsabilityPolicy::DEFAULT_MIN_SEPARATION_CM,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct JsonSampling {
    z_planes: Vec<f64>,
}

impl Default for JsonSampling {
    fn default() -> Self {
        Self {
            z_planes: vec![0.0],
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if the
    /// configuration is invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let json_config: JsonConfig = serde_json::from_reader(reader)?;
        Self::from_json_config(json_config)
    }

    /// Load configuration from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed or the
    /// configuration is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let json_config: JsonConfig = serde_json::from_str(json)?;
        Self::from_json_config(json_config)
    }

    fn from_json_config(config: JsonConfig) -> Result<Self> {
        let config = Self {
            usability: UsabilityPolicy::new()
                .with_metric(config.usability.metric)
                .with_min_separation(config.usability.min_separation_cm),
            z_planes: config.sampling.z_planes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks thresholds and planes.
    ///
    /// # Errors
    /// Returns a configuration error for a negative or non-finite
    /// threshold, or a non-finite plane.
    pub fn validate(&self) -> trackhit_core::Result<()> {
        let min = self.usability.min_separation_cm;
        if !min.is_finite() || min < 0.0 {
            return Err(trackhit_core::Error::ConfigError(format!(
                "min_separation_cm must be finite and non-negative, got {min}"
            )));
        }
        if let Some(z) = self.z_planes.iter().find(|z| !z.is_finite()) {
            return Err(trackhit_core::Error::ConfigError(format!(
                "z plane must be finite, got {z}"
            )));
        }
        Ok(())
    }
}
