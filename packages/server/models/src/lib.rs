#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the subsidence map server.
//!
//! These types are serialized to JSON for the presentation host. They
//! wrap the dashboard's view models so the HTTP contract can evolve
//! independently of the presentation logic.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, feature::Id};
use serde::{Deserialize, Serialize};
use subsidence_map_dashboard::{
    ActiveSelection, DropdownSelection, ExplanationPanel, MapClick, MapLayer, RegionLayer,
    SelectedMarker,
};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Number of regions in the loaded snapshot.
    pub region_count: usize,
}

/// Query parameters for the map endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQueryParams {
    /// Selected district, or the "none" sentinel.
    pub district: Option<String>,
    /// Selected sub-district, or the "none" sentinel.
    pub subdistrict: Option<String>,
}

impl MapQueryParams {
    /// Dropdown selection carried by the query.
    #[must_use]
    pub fn dropdown(&self) -> DropdownSelection {
        DropdownSelection::new(self.district.as_deref(), self.subdistrict.as_deref())
    }
}

/// Query parameters for the explanation endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationQueryParams {
    /// Selected district, or the "none" sentinel.
    pub district: Option<String>,
    /// Selected sub-district, or the "none" sentinel.
    pub subdistrict: Option<String>,
    /// Key of the clicked region, as reported by the map.
    pub clicked: Option<String>,
    /// Longitude of a click that carried no key.
    pub lng: Option<f64>,
    /// Latitude of a click that carried no key.
    pub lat: Option<f64>,
}

impl ExplanationQueryParams {
    /// Dropdown selection carried by the query.
    #[must_use]
    pub fn dropdown(&self) -> DropdownSelection {
        DropdownSelection::new(self.district.as_deref(), self.subdistrict.as_deref())
    }

    /// Map click carried by the query. A clicked key takes precedence
    /// over coordinates; coordinates need both axes.
    #[must_use]
    pub fn click(&self) -> Option<MapClick> {
        MapClick::from_key(self.clicked.as_deref()).or_else(|| match (self.lng, self.lat) {
            (Some(lng), Some(lat)) => Some(MapClick::Coordinates { lng, lat }),
            _ => None,
        })
    }
}

/// Response from the map endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    /// One feature per region with style, tooltip and popup properties.
    pub regions: FeatureCollection,
    /// Marker for the dropdown-selected region.
    pub marker: Option<SelectedMarker>,
}

impl From<MapLayer<'_>> for MapResponse {
    fn from(layer: MapLayer<'_>) -> Self {
        let features = layer.regions.iter().map(region_feature).collect();
        Self {
            regions: FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
            marker: layer.marker,
        }
    }
}

/// Converts one styled region into a `GeoJSON` feature.
fn region_feature(region: &RegionLayer<'_>) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), region.key.as_str().into());
    properties.insert("selected".to_string(), region.selected.into());
    properties.insert(
        "style".to_string(),
        serde_json::to_value(region.style).unwrap_or_default(),
    );
    properties.insert("tooltipHtml".to_string(), region.tooltip_html.clone().into());
    properties.insert("popupHtml".to_string(), region.popup_html.clone().into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(region.geometry))),
        id: Some(Id::String(region.key.as_str().to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Response from the explanation endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationResponse {
    /// How the two selection channels were resolved.
    pub selection: ActiveSelection,
    /// Panel content for the explained region.
    pub panel: ExplanationPanel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use subsidence_map_dataset_models::RegionKey;

    #[test]
    fn clicked_key_beats_coordinates() {
        let params = ExplanationQueryParams {
            clicked: Some("Gu2_Dong5".to_string()),
            lng: Some(1.0),
            lat: Some(2.0),
            ..ExplanationQueryParams::default()
        };

        assert_eq!(
            params.click(),
            Some(MapClick::Region(RegionKey::new("Gu2_Dong5")))
        );
    }

    #[test]
    fn coordinates_need_both_axes() {
        let params = ExplanationQueryParams {
            lng: Some(1.0),
            ..ExplanationQueryParams::default()
        };
        assert_eq!(params.click(), None);

        let params = ExplanationQueryParams {
            lng: Some(1.0),
            lat: Some(2.0),
            ..ExplanationQueryParams::default()
        };
        assert_eq!(
            params.click(),
            Some(MapClick::Coordinates { lng: 1.0, lat: 2.0 })
        );
    }

    #[test]
    fn sentinel_dropdown_has_no_key() {
        let params = MapQueryParams {
            district: Some("선택 안 함".to_string()),
            subdistrict: None,
        };

        assert_eq!(params.dropdown().key(), None);
    }
}
