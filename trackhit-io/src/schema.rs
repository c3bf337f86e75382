//! Record layout of hit point files.
//!
//! Every file starts with a 10-byte header followed by fixed-size records:
//!
//! | offset | size | content                  |
//! |--------|------|--------------------------|
//! | 0      | 4    | magic `THPF`             |
//! | 4      | 2    | schema version (LE u16)  |
//! | 6      | 4    | record count (LE u32)    |
//!
//! Each record is the schema's fields in order, little-endian, with the
//! declared width. Bump the version whenever the field list changes and
//! keep the old layout decodable.
#![allow(clippy::cast_possible_truncation, clippy::float_cmp)]

use crate::error::{Error, Result};
use trackhit_core::{DetectorHitPoint, TrackCrossing, Vec3};

/// File magic.
pub const MAGIC: [u8; 4] = *b"THPF";

/// Header size in bytes.
pub const HEADER_SIZE: usize = 10;

/// Storage width of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    I32,
    F32,
    F64,
}

impl FieldWidth {
    /// Size in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

/// Fields of a persisted [`DetectorHitPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TrackId,
    EventId,
    DetectorId,
    XIn,
    YIn,
    ZIn,
    PxIn,
    PyIn,
    PzIn,
    Time,
    Length,
    EnergyLoss,
    XOut,
    YOut,
    ZOut,
    PxOut,
    PyOut,
    PzOut,
    DetectorCopyId,
    FragmentZ,
    FragmentA,
    LightYield,
}

impl Field {
    /// Number of distinct fields.
    pub const COUNT: usize = 22;

    /// Column name used in headers and diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TrackId => "track_id",
            Self::EventId => "event_id",
            Self::DetectorId => "detector_id",
            Self::XIn => "x_in",
            Self::YIn => "y_in",
            Self::ZIn => "z_in",
            Self::PxIn => "px_in",
            Self::PyIn => "py_in",
            Self::PzIn => "pz_in",
            Self::Time => "time",
            Self::Length => "length",
            Self::EnergyLoss => "energy_loss",
            Self::XOut => "x_out",
            Self::YOut => "y_out",
            Self::ZOut => "z_out",
            Self::PxOut => "px_out",
            Self::PyOut => "py_out",
            Self::PzOut => "pz_out",
            Self::DetectorCopyId => "detector_copy_id",
            Self::FragmentZ => "fragment_z",
            Self::FragmentA => "fragment_a",
            Self::LightYield => "light_yield",
        }
    }

    /// Reads this field from a point. Integer and `f32` fields widen
    /// losslessly.
    #[must_use]
    pub fn get(self, point: &DetectorHitPoint) -> f64 {
        match self {
            Self::TrackId => f64::from(point.track_id()),
            Self::EventId => f64::from(point.event_id()),
            Self::DetectorId => f64::from(point.detector_id()),
            Self::XIn => point.x_in(),
            Self::YIn => point.y_in(),
            Self::ZIn => point.z_in(),
            Self::PxIn => point.px_in(),
            Self::PyIn => point.py_in(),
            Self::PzIn => point.pz_in(),
            Self::Time => point.time(),
            Self::Length => point.length(),
            Self::EnergyLoss => point.energy_loss(),
            Self::XOut => point.x_out(),
            Self::YOut => point.y_out(),
            Self::ZOut => point.z_out(),
            Self::PxOut => point.px_out(),
            Self::PyOut => point.py_out(),
            Self::PzOut => point.pz_out(),
            Self::DetectorCopyId => f64::from(point.detector_copy_id()),
            Self::FragmentZ => point.fragment_z(),
            Self::FragmentA => point.fragment_a(),
            Self::LightYield => point.light_yield(),
        }
    }
}

/// One entry of a schema's field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub width: FieldWidth,
}

const fn spec(field: Field, width: FieldWidth) -> FieldSpec {
    FieldSpec { field, width }
}

const BASE_TAIL: [FieldSpec; 10] = [
    spec(Field::DetectorId, FieldWidth::I32),
    spec(Field::XIn, FieldWidth::F64),
    spec(Field::YIn, FieldWidth::F64),
    spec(Field::ZIn, FieldWidth::F64),
    spec(Field::PxIn, FieldWidth::F64),
    spec(Field::PyIn, FieldWidth::F64),
    spec(Field::PzIn, FieldWidth::F64),
    spec(Field::Time, FieldWidth::F64),
    spec(Field::Length, FieldWidth::F64),
    spec(Field::EnergyLoss, FieldWidth::F64),
];

const POINT_FIELDS: [FieldSpec; 10] = [
    spec(Field::XOut, FieldWidth::F32),
    spec(Field::YOut, FieldWidth::F32),
    spec(Field::ZOut, FieldWidth::F32),
    spec(Field::PxOut, FieldWidth::F32),
    spec(Field::PyOut, FieldWidth::F32),
    spec(Field::PzOut, FieldWidth::F32),
    spec(Field::DetectorCopyId, FieldWidth::I32),
    spec(Field::FragmentZ, FieldWidth::F32),
    spec(Field::FragmentA, FieldWidth::F32),
    spec(Field::LightYield, FieldWidth::F64),
];

const fn concat<const N: usize>(head: &[FieldSpec]) -> [FieldSpec; N] {
    let mut out = [spec(Field::TrackId, FieldWidth::I32); N];
    let mut i = 0;
    while i < head.len() {
        out[i] = head[i];
        i += 1;
    }
    let mut j = 0;
    while j < BASE_TAIL.len() {
        out[i + j] = BASE_TAIL[j];
        j += 1;
    }
    let offset = i + j;
    let mut k = 0;
    while k < POINT_FIELDS.len() {
        out[offset + k] = POINT_FIELDS[k];
        k += 1;
    }
    out
}

const V1_FIELDS: [FieldSpec; 21] = concat(&[spec(Field::TrackId, FieldWidth::I32)]);

const V2_FIELDS: [FieldSpec; 22] = concat(&[
    spec(Field::TrackId, FieldWidth::I32),
    spec(Field::EventId, FieldWidth::I32),
]);

/// Versioned field list of a hit point record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub version: u16,
    pub fields: &'static [FieldSpec],
}

/// Original layout, without the event id.
pub const SCHEMA_V1: Schema = Schema {
    name: "DetectorHitPoint",
    version: 1,
    fields: &V1_FIELDS,
};

/// Current layout.
pub const SCHEMA_V2: Schema = Schema {
    name: "DetectorHitPoint",
    version: 2,
    fields: &V2_FIELDS,
};

impl Schema {
    /// Schema written by this version of the library.
    #[must_use]
    pub const fn current() -> &'static Schema {
        &SCHEMA_V2
    }

    /// Looks up a known schema version.
    #[must_use]
    pub fn for_version(version: u16) -> Option<&'static Schema> {
        match version {
            1 => Some(&SCHEMA_V1),
            2 => Some(&SCHEMA_V2),
            _ => None,
        }
    }

    /// Record size in bytes.
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.fields.iter().map(|f| f.width.size()).sum()
    }

    /// Returns true if the schema stores `field`.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// Appends one record to `out`.
    pub fn encode_record(&self, point: &DetectorHitPoint, out: &mut Vec<u8>) {
        for spec in self.fields {
            let value = spec.field.get(point);
            match spec.width {
                FieldWidth::I32 => out.extend_from_slice(&(value as i32).to_le_bytes()),
                FieldWidth::F32 => out.extend_from_slice(&(value as f32).to_le_bytes()),
                FieldWidth::F64 => out.extend_from_slice(&value.to_le_bytes()),
            }
        }
    }

    /// Decodes one record. Fields absent from the schema stay zero.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] unless `data` is exactly
    /// [`Self::record_size`] bytes long.
    pub fn decode_record(&self, data: &[u8]) -> Result<DetectorHitPoint> {
        let record_size = self.record_size();
        if data.len() != record_size {
            return Err(Error::InvalidFormat(format!(
                "schema v{} record is {} bytes, found {}",
                self.version,
                record_size,
                data.len()
            )));
        }
        let mut values = [0.0_f64; Field::COUNT];
        let mut offset = 0;
        for spec in self.fields {
            let size = spec.width.size();
            let bytes = &data[offset..offset + size];
            values[spec.field as usize] = match spec.width {
                FieldWidth::I32 => f64::from(i32::from_le_bytes(le4(bytes))),
                FieldWidth::F32 => f64::from(f32::from_le_bytes(le4(bytes))),
                FieldWidth::F64 => f64::from_le_bytes(le8(bytes)),
            };
            offset += size;
        }
        Ok(point_from_values(&values))
    }
}

fn le4(b: &[u8]) -> [u8; 4] {
    [b[0], b[1], b[2], b[3]]
}

fn le8(b: &[u8]) -> [u8; 8] {
    [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]
}

fn point_from_values(v: &[f64; Field::COUNT]) -> DetectorHitPoint {
    let get = |field: Field| v[field as usize];
    let mut point = DetectorHitPoint::new(
        get(Field::TrackId) as i32,
        get(Field::DetectorId) as i32,
        get(Field::DetectorCopyId) as i32,
        get(Field::FragmentZ),
        get(Field::FragmentA),
        Vec3::new(get(Field::XIn), get(Field::YIn), get(Field::ZIn)),
        Vec3::new(get(Field::XOut), get(Field::YOut), get(Field::ZOut)),
        Vec3::new(get(Field::PxIn), get(Field::PyIn), get(Field::PzIn)),
        Vec3::new(get(Field::PxOut), get(Field::PyOut), get(Field::PzOut)),
        get(Field::Time),
        get(Field::Length),
        get(Field::EnergyLoss),
        get(Field::LightYield),
    );
    point.base_mut().set_event_id(get(Field::EventId) as i32);
    point
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        // 2 ints + 9 doubles + 6 floats + 1 int + 2 floats + 1 double
        assert_eq!(SCHEMA_V1.record_size(), 8 + 72 + 24 + 4 + 8 + 8);
        assert_eq!(SCHEMA_V2.record_size(), SCHEMA_V1.record_size() + 4);
        assert_eq!(SCHEMA_V1.fields.len(), 21);
        assert_eq!(SCHEMA_V2.fields.len(), Field::COUNT);
    }

    #[test]
    fn test_versions() {
        assert_eq!(Schema::current().version, 2);
        assert_eq!(Schema::for_version(1), Some(&SCHEMA_V1));
        assert!(Schema::for_version(0).is_none());
        assert!(Schema::for_version(3).is_none());
        assert!(!SCHEMA_V1.contains(Field::EventId));
        assert!(SCHEMA_V2.contains(Field::EventId));
    }

    #[test]
    fn test_field_order() {
        assert_eq!(SCHEMA_V2.fields[0].field, Field::TrackId);
        assert_eq!(SCHEMA_V2.fields[1].field, Field::EventId);
        assert_eq!(SCHEMA_V2.fields[2].field, Field::DetectorId);
        assert_eq!(SCHEMA_V1.fields[1].field, Field::DetectorId);
        assert_eq!(SCHEMA_V2.fields[21].field, Field::LightYield);
        assert_eq!(SCHEMA_V2.fields[21].width, FieldWidth::F64);
    }

    #[test]
    fn test_record_round_trip_is_exact() {
        let mut point = DetectorHitPoint::new(
            12,
            7,
            31,
            6.0,
            12.5,
            Vec3::new(0.1, 0.2, 0.3),
            Vec3::new(0.4, 0.5, 0.6),
            Vec3::new(1.1, 1.2, 1.3),
            Vec3::new(1.4, 1.5, 1.6),
            17.3,
            250.25,
            0.000_42,
            987.654_321,
        );
        point.base_mut().set_event_id(-3);

        let mut buf = Vec::new();
        SCHEMA_V2.encode_record(&point, &mut buf);
        assert_eq!(buf.len(), SCHEMA_V2.record_size());
        assert_eq!(SCHEMA_V2.decode_record(&buf).unwrap(), point.stored());
    }

    #[test]
    fn test_encode_narrows_reduced_fields() {
        let point = DetectorHitPoint::new(
            1,
            1,
            1,
            6.0,
            12.0,
            Vec3::new(0.0, 0.0, 0.1),
            Vec3::new(0.3, 0.0, 100.001),
            Vec3::zero(),
            Vec3::zero(),
            0.0,
            0.0,
            0.0,
            0.0,
        );
        let mut buf = Vec::new();
        SCHEMA_V2.encode_record(&point, &mut buf);
        let decoded = SCHEMA_V2.decode_record(&buf).unwrap();
        assert_eq!(decoded.z_in(), 0.1);
        assert_eq!(decoded.z_out(), f64::from(100.001_f32));
        assert_eq!(decoded.x_out(), f64::from(0.3_f32));
    }

    #[test]
    fn test_decode_record_rejects_wrong_length() {
        let mut buf = Vec::new();
        SCHEMA_V2.encode_record(&DetectorHitPoint::default(), &mut buf);
        assert!(matches!(
            SCHEMA_V2.decode_record(&buf[..buf.len() - 1]),
            Err(Error::InvalidFormat(_))
        ));
        assert!(matches!(
            SCHEMA_V1.decode_record(&buf),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_v1_record_drops_event_id() {
        let mut point = DetectorHitPoint::default();
        point.base_mut().set_event_id(9);
        point.base_mut().set_track_id(5);

        let mut buf = Vec::new();
        SCHEMA_V1.encode_record(&point, &mut buf);
        let decoded = SCHEMA_V1.decode_record(&buf).unwrap();
        assert_eq!(decoded.track_id(), 5);
        assert_eq!(decoded.event_id(), 0);
    }
}
