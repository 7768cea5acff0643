#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Typed records for the precomputed subsidence model outputs.
//!
//! The model pipeline produces four files: a per-region probability
//! table, a region geometry collection, a factor-group attribution table
//! and a detailed factor-item attribution table. The serde renames below
//! are the external contract with that pipeline. Extra columns are
//! ignored when reading.
//!
//! Missing numbers never fail a load: an empty or `NaN` probability cell
//! reads as `None`, and an empty or `NaN` attribution cell reads as
//! `f64::NAN`, which the presentation layer ranks after every number.

use std::borrow::Borrow;

use geo::MultiPolygon;
use serde::{Deserialize, Deserializer, Serialize};

/// Separator joining district and sub-district into a [`RegionKey`].
pub const KEY_SEPARATOR: char = '_';

/// Region key column/property shared by the geometry and attribution data.
pub const REGION_KEY_COLUMN: &str = "법정동";
/// Probability column/property.
pub const PROBABILITY_COLUMN: &str = "예측확률";

/// Composite region identifier: `district ⊕ "_" ⊕ sub-district`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionKey(String);

impl RegionKey {
    /// Wraps an already-joined key as found in the geometry and
    /// attribution data.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Joins a district and sub-district into a key.
    #[must_use]
    pub fn from_parts(district: &str, subdistrict: &str) -> Self {
        Self(format!("{district}{KEY_SEPARATOR}{subdistrict}"))
    }

    /// Returns the raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable name with the separator replaced by a space
    /// (e.g. `강남구_역삼동` → `강남구 역삼동`).
    #[must_use]
    pub fn display_name(&self) -> String {
        self.0.replace(KEY_SEPARATOR, " ")
    }
}

impl std::fmt::Display for RegionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RegionKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RegionKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Filters out NaN, the pipeline's marker for "no model output".
#[must_use]
pub fn known_probability(value: f64) -> Option<f64> {
    if value.is_nan() { None } else { Some(value) }
}

/// Reads an optional probability cell. Empty cells and `NaN` both map to
/// `None`; any other unparseable text is an error.
fn deserialize_probability<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed.parse().map_err(serde::de::Error::custom)?;
    Ok(known_probability(value))
}

/// Reads an attribution cell. Empty cells map to `NaN`; any other
/// unparseable text is an error.
fn deserialize_shap_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(f64::NAN),
        Some(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

/// A row of the region probability table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionProbability {
    /// District (자치구) name.
    #[serde(rename = "시군구명")]
    pub district: String,
    /// Sub-district (법정동) name.
    #[serde(rename = "법정동명")]
    pub subdistrict: String,
    /// Predicted probability, when the table carries one.
    #[serde(
        rename = "예측확률",
        default,
        deserialize_with = "deserialize_probability"
    )]
    pub probability: Option<f64>,
}

impl RegionProbability {
    /// Region key for this row.
    #[must_use]
    pub fn key(&self) -> RegionKey {
        RegionKey::from_parts(&self.district, &self.subdistrict)
    }
}

/// A region of the geometry collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeature {
    /// Region key.
    pub key: RegionKey,
    /// Predicted probability, `None` when absent or NaN.
    pub probability: Option<f64>,
    /// Region outline. Single polygons are stored as one-member
    /// multipolygons.
    pub geometry: MultiPolygon<f64>,
}

/// One (region, factor group) attribution row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorGroupAttribution {
    /// Region key.
    #[serde(rename = "법정동")]
    pub region_key: RegionKey,
    /// Risk-factor group name.
    #[serde(rename = "위험요인그룹")]
    pub factor_group: String,
    /// Signed contribution; positive raises the predicted risk. `NaN`
    /// when the cell is empty.
    #[serde(deserialize_with = "deserialize_shap_value")]
    pub shap_value: f64,
}

/// One (region, factor group, detailed item) attribution row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorItemAttribution {
    /// Region key.
    #[serde(rename = "법정동")]
    pub region_key: RegionKey,
    /// Risk-factor group the item belongs to.
    #[serde(rename = "위험요인그룹")]
    pub factor_group: String,
    /// Detailed item label, underscore-joined in the source data.
    #[serde(rename = "영향 인자")]
    pub item_label: String,
    /// Signed contribution; positive raises the predicted risk. `NaN`
    /// when the cell is empty.
    #[serde(deserialize_with = "deserialize_shap_value")]
    pub shap_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_joins_parts_with_separator() {
        let key = RegionKey::from_parts("Gu1", "Dong1");
        assert_eq!(key.as_str(), "Gu1_Dong1");
        assert_eq!(key.display_name(), "Gu1 Dong1");
    }

    #[test]
    fn nan_is_not_a_known_probability() {
        assert_eq!(known_probability(f64::NAN), None);
        assert_eq!(known_probability(0.4), Some(0.4));
    }

    #[test]
    fn probability_row_tolerates_missing_and_nan_cells() {
        let data = "시군구명,법정동명,예측확률,extra\n\
                    강남구,역삼동,0.81,x\n\
                    강남구,삼성동,,x\n\
                    서초구,서초동,NaN,x\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<RegionProbability> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].probability, Some(0.81));
        assert_eq!(rows[0].key().as_str(), "강남구_역삼동");
        assert_eq!(rows[1].probability, None);
        assert_eq!(rows[2].probability, None);
    }

    #[test]
    fn probability_column_is_optional() {
        let data = "시군구명,법정동명\n강남구,역삼동\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<RegionProbability> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows[0].probability, None);
    }

    #[test]
    fn garbage_probability_is_rejected() {
        let data = "시군구명,법정동명,예측확률\n강남구,역삼동,high\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Result<Vec<RegionProbability>, _> = reader.deserialize().collect();

        assert!(rows.is_err());
    }

    #[test]
    fn empty_attribution_cell_reads_as_nan() {
        let data = "법정동,위험요인그룹,shap_value\n\
                    강남구_역삼동,지반,\n\
                    강남구_역삼동,지하 공사,-0.25\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<FactorGroupAttribution> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(rows[0].shap_value.is_nan());
        assert!((rows[1].shap_value + 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn garbage_attribution_cell_is_rejected() {
        let data = "법정동,위험요인그룹,영향 인자,shap_value\n강남구_역삼동,지반,a_b,lots\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Result<Vec<FactorItemAttribution>, _> = reader.deserialize().collect();

        assert!(rows.is_err());
    }

    #[test]
    fn item_row_reads_spaced_column_name() {
        let data = "법정동,위험요인그룹,영향 인자,shap_value\n\
                    강남구_역삼동,지하시설물,상수관_길이,0.12\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<FactorItemAttribution> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows[0].item_label, "상수관_길이");
        assert_eq!(rows[0].region_key, RegionKey::new("강남구_역삼동"));
    }
}
