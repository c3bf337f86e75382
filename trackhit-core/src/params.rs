//! Parameter containers for detector calibration data.
//!
//! A container is filled from a [`ParamList`] source and written back into
//! a [`ParamList`] sink. The hit-level container does not define any
//! parameters yet; its hooks only keep the bookkeeping consistent.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Value of a single named parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ParamValue {
    Int(i64),
    Double(f64),
    IntArray(Vec<i64>),
    DoubleArray(Vec<f64>),
    Text(String),
}

/// Named parameter list used as a load source and a store sink.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ParamList {
    values: BTreeMap<String, ParamValue>,
}

impl ParamList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a parameter.
    pub fn add(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), value);
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Bookkeeping shared by every parameter container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParSetInfo {
    pub name: String,
    pub title: String,
    pub context: String,
    /// True once the container holds valid parameters.
    pub status: bool,
    /// True if parameters changed since the last store.
    pub changed: bool,
    /// Version of each input slot, `-1` when unset.
    pub input_versions: [i32; 3],
}

impl ParSetInfo {
    #[must_use]
    pub fn new(name: &str, title: &str, context: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            context: context.to_string(),
            status: false,
            changed: false,
            input_versions: [-1; 3],
        }
    }

    /// Marks every input version as unset.
    pub fn reset_input_versions(&mut self) {
        self.input_versions = [-1; 3];
        self.changed = false;
    }
}

/// Trait for parameter containers.
pub trait ParameterContainer {
    /// Container bookkeeping.
    fn info(&self) -> &ParSetInfo;

    fn info_mut(&mut self) -> &mut ParSetInfo;

    /// Resets to an empty state.
    fn clear(&mut self);

    /// Populates the container from `source`.
    ///
    /// # Errors
    /// Returns [`Error::MissingParamSource`] when `source` is `None`.
    fn load(&mut self, source: Option<&ParamList>) -> Result<()>;

    /// Writes the container into `sink`. A missing sink is ignored.
    fn store(&self, sink: Option<&mut ParamList>);

    /// Logs a human-readable dump.
    fn print(&self);
}

/// Hit-level parameters for the scintillator array.
///
/// Reserved for calibration data such as per-channel light-yield
/// corrections; no parameters are defined yet.
#[derive(Debug, Clone)]
pub struct DetectorHitPar {
    info: ParSetInfo,
}

impl Default for DetectorHitPar {
    fn default() -> Self {
        Self::new(
            "DetectorHitPar",
            "Detector hit parameters",
            "DetectorHitParContext",
        )
    }
}

impl DetectorHitPar {
    #[must_use]
    pub fn new(name: &str, title: &str, context: &str) -> Self {
        Self {
            info: ParSetInfo::new(name, title, context),
        }
    }
}

impl ParameterContainer for DetectorHitPar {
    fn info(&self) -> &ParSetInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ParSetInfo {
        &mut self.info
    }

    fn clear(&mut self) {
        self.info.status = false;
        self.info.reset_input_versions();
    }

    fn load(&mut self, source: Option<&ParamList>) -> Result<()> {
        log::info!("{}::load() called", self.info.name);
        if source.is_none() {
            log::error!("{}: could not find parameter list", self.info.name);
            return Err(Error::MissingParamSource(self.info.name.clone()));
        }
        self.info.status = true;
        Ok(())
    }

    fn store(&self, sink: Option<&mut ParamList>) {
        log::info!("{}::store() called", self.info.name);
        if let Some(sink) = sink {
            // No parameters defined yet; the sink is left untouched.
            log::debug!("{}: sink holds {} entries", self.info.name, sink.len());
        }
    }

    fn print(&self) {
        log::info!("{}: {} parameters", self.info.name, self.info.title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_requires_source() {
        let mut par = DetectorHitPar::default();
        let err = par.load(None).unwrap_err();
        assert!(matches!(err, Error::MissingParamSource(_)));
        assert!(!par.info().status);
    }

    #[test]
    fn test_load_and_clear() {
        let mut par = DetectorHitPar::default();
        par.info_mut().input_versions = [3, 4, -1];
        par.load(Some(&ParamList::new())).unwrap();
        assert!(par.info().status);

        par.clear();
        assert!(!par.info().status);
        assert_eq!(par.info().input_versions, [-1, -1, -1]);
    }

    #[test]
    fn test_store_is_noop() {
        let par = DetectorHitPar::default();
        par.store(None);

        let mut sink = ParamList::new();
        par.store(Some(&mut sink));
        assert!(sink.is_empty());
        par.print();
    }

    #[test]
    fn test_param_list_add_get() {
        let mut list = ParamList::new();
        list.add("nChannels", ParamValue::Int(64));
        list.add("gain", ParamValue::Double(1.25));
        list.add("offsets", ParamValue::DoubleArray(vec![0.5, 0.75]));
        list.add("label", ParamValue::Text("krab".into()));

        assert_eq!(list.len(), 4);
        assert_eq!(list.get("nChannels"), Some(&ParamValue::Int(64)));
        assert_eq!(
            list.get("offsets"),
            Some(&ParamValue::DoubleArray(vec![0.5, 0.75]))
        );
        assert!(list.get("missing").is_none());

        list.add("nChannels", ParamValue::Int(32));
        assert_eq!(list.len(), 4);
        assert_eq!(list.get("nChannels"), Some(&ParamValue::Int(32)));

        let names: Vec<&str> = list.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["gain", "label", "nChannels", "offsets"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_param_list_json() {
        let list: ParamList =
            serde_json::from_str(r#"{ "gain": 1.5, "nChannels": 8, "offsets": [0.5, 1.5] }"#)
                .unwrap();
        assert_eq!(list.get("nChannels"), Some(&ParamValue::Int(8)));
        assert_eq!(list.get("gain"), Some(&ParamValue::Double(1.5)));
        assert_eq!(
            list.get("offsets"),
            Some(&ParamValue::DoubleArray(vec![0.5, 1.5]))
        );
    }
}
