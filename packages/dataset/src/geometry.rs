//! Parses the region geometry collection into [`RegionFeature`] values.
//!
//! Every feature must carry the region key property and a polygon or
//! multipolygon geometry. The probability property is optional and may be
//! `null`, `NaN` or a numeric string.

use geo::MultiPolygon;
use geojson::{Feature, GeoJson};
use subsidence_map_dataset_models::{
    PROBABILITY_COLUMN, REGION_KEY_COLUMN, RegionFeature, RegionKey, known_probability,
};

/// Why a single feature could not be turned into a region.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    /// The input is valid `GeoJSON` but not a `FeatureCollection`.
    #[error("expected a FeatureCollection")]
    NotACollection,

    /// The region key property is missing, empty or not a string.
    #[error("feature {index} has no region key property")]
    MissingKey {
        /// Position of the feature in the collection.
        index: usize,
    },

    /// The geometry is missing or not a polygon/multipolygon.
    #[error("feature {index} ({key}) has no polygon geometry")]
    InvalidGeometry {
        /// Position of the feature in the collection.
        index: usize,
        /// Region key of the offending feature.
        key: String,
    },

    /// The probability property holds something other than a number.
    #[error("feature {index} ({key}) has a non-numeric probability")]
    InvalidProbability {
        /// Position of the feature in the collection.
        index: usize,
        /// Region key of the offending feature.
        key: String,
    },
}

/// Parses a `GeoJSON` document into regions, preserving feature order.
///
/// # Errors
///
/// Returns [`ParseError::GeoJson`] when the text is not `GeoJSON` and
/// [`ParseError::Feature`] when a feature violates the column contract.
pub fn parse_regions(text: &str) -> Result<Vec<RegionFeature>, ParseError> {
    let geojson: GeoJson = text.parse().map_err(ParseError::GeoJson)?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(ParseError::Feature(FeatureError::NotACollection));
    };

    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| parse_feature(index, feature).map_err(ParseError::Feature))
        .collect()
}

/// Errors from [`parse_regions`].
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The text is not valid `GeoJSON`.
    #[error(transparent)]
    GeoJson(geojson::Error),

    /// A feature violates the column contract.
    #[error(transparent)]
    Feature(FeatureError),
}

fn parse_feature(index: usize, feature: &Feature) -> Result<RegionFeature, FeatureError> {
    let key = feature
        .property(REGION_KEY_COLUMN)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(FeatureError::MissingKey { index })?
        .to_string();

    let probability = match feature.property(PROBABILITY_COLUMN) {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => n.as_f64().and_then(known_probability),
        Some(serde_json::Value::String(s)) => {
            let value: f64 = s.trim().parse().map_err(|_| {
                FeatureError::InvalidProbability {
                    index,
                    key: key.clone(),
                }
            })?;
            known_probability(value)
        }
        Some(_) => {
            return Err(FeatureError::InvalidProbability { index, key });
        }
    };

    let Some(geometry) = feature.geometry.clone().and_then(to_multipolygon) else {
        return Err(FeatureError::InvalidGeometry { index, key });
    };

    Ok(RegionFeature {
        key: RegionKey::new(key),
        probability,
        geometry,
    })
}

/// Converts a `GeoJSON` geometry to a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(features: &str) -> String {
        format!(r#"{{"type":"FeatureCollection","features":[{features}]}}"#)
    }

    const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#;

    #[test]
    fn parses_polygon_and_probability() {
        let text = collection(&format!(
            r#"{{"type":"Feature","properties":{{"법정동":"강남구_역삼동","예측확률":0.8}},"geometry":{SQUARE}}}"#
        ));

        let regions = parse_regions(&text).unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].key.as_str(), "강남구_역삼동");
        assert_eq!(regions[0].probability, Some(0.8));
        assert_eq!(regions[0].geometry.0.len(), 1);
    }

    #[test]
    fn null_and_nan_probabilities_are_missing() {
        let text = collection(&format!(
            r#"{{"type":"Feature","properties":{{"법정동":"a_b","예측확률":null}},"geometry":{SQUARE}}},
               {{"type":"Feature","properties":{{"법정동":"a_c","예측확률":"NaN"}},"geometry":{SQUARE}}},
               {{"type":"Feature","properties":{{"법정동":"a_d"}},"geometry":{SQUARE}}}"#
        ));

        let regions = parse_regions(&text).unwrap();

        assert!(regions.iter().all(|r| r.probability.is_none()));
    }

    #[test]
    fn missing_key_is_rejected() {
        let text = collection(&format!(
            r#"{{"type":"Feature","properties":{{"예측확률":0.1}},"geometry":{SQUARE}}}"#
        ));

        let err = parse_regions(&text).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Feature(FeatureError::MissingKey { index: 0 })
        ));
    }

    #[test]
    fn point_geometry_is_rejected() {
        let text = collection(
            r#"{"type":"Feature","properties":{"법정동":"a_b"},"geometry":{"type":"Point","coordinates":[0,0]}}"#,
        );

        let err = parse_regions(&text).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Feature(FeatureError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn bare_geometry_is_not_a_collection() {
        let err = parse_regions(SQUARE).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Feature(FeatureError::NotACollection)
        ));
    }
}
