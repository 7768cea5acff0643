//! Per-region styling and popup payloads for the mapping widget.
//!
//! Everything the widget needs is computed up front into plain values
//! ([`FeatureStyle`], popup and tooltip markup), so the widget only has
//! to draw what it is given.

use geo::{Centroid, MultiPolygon};
use serde::Serialize;
use subsidence_map_dataset::Datasets;
use subsidence_map_dataset_models::RegionKey;
use subsidence_map_risk_models::{NO_RISK_INFO_LABEL, RiskColor, RiskGrade, format_percent};

/// Initial map position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Center latitude.
    pub lat: f64,
    /// Center longitude.
    pub lng: f64,
    /// Initial zoom level.
    pub zoom: u8,
}

/// Seoul City Hall at city-wide zoom.
pub const DEFAULT_MAP_VIEW: MapView = MapView {
    lat: 37.5665,
    lng: 126.9780,
    zoom: 11,
};

/// Drawing style of one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    /// Fill color from the risk tier.
    pub fill_color: &'static str,
    /// Border color, same as the fill.
    pub color: &'static str,
    /// Border weight in pixels.
    pub weight: u8,
    /// Fill opacity.
    pub fill_opacity: f64,
    /// Border opacity.
    pub opacity: f64,
}

impl FeatureStyle {
    /// Style of a region given its probability and whether the dropdown
    /// selection points at it.
    #[must_use]
    pub fn for_region(probability: Option<f64>, selected: bool) -> Self {
        let fill = RiskColor::for_optional(probability).css();
        Self {
            fill_color: fill,
            color: fill,
            weight: if selected { 4 } else { 1 },
            fill_opacity: if selected { 1.0 } else { 0.5 },
            opacity: 1.0,
        }
    }
}

/// Escapes text for inclusion in popup markup.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Tooltip markup: the region's display name.
#[must_use]
pub fn tooltip_html(key: &RegionKey) -> String {
    format!(
        "<div style='font-size:12px'>{}</div>",
        escape_html(&key.display_name())
    )
}

/// Popup markup: display name, risk percentage and grade.
#[must_use]
pub fn popup_html(key: &RegionKey, probability: Option<f64>) -> String {
    let name = escape_html(&key.display_name());
    match probability {
        Some(p) => format!(
            "<div style=\"font-size: 12px;\"><b>{name}</b><br><b>위험률:</b> {}<br><b>위험 등급:</b> {}</div>",
            format_percent(p),
            RiskGrade::from_probability(p).label()
        ),
        None => format!("<div style=\"font-size: 12px;\"><b>{name}</b><br>{NO_RISK_INFO_LABEL}</div>"),
    }
}

/// Everything the widget draws for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionLayer<'a> {
    /// Region key.
    pub key: &'a RegionKey,
    /// Region outline.
    pub geometry: &'a MultiPolygon<f64>,
    /// Whether the dropdown selection points at this region.
    pub selected: bool,
    /// Drawing style.
    pub style: FeatureStyle,
    /// Hover tooltip markup.
    pub tooltip_html: String,
    /// Click popup markup.
    pub popup_html: String,
}

/// Marker placed at the selected region's centroid with its popup open.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedMarker {
    /// Selected region key.
    pub key: RegionKey,
    /// Centroid longitude.
    pub lng: f64,
    /// Centroid latitude.
    pub lat: f64,
    /// Popup markup, shown open.
    pub popup_html: String,
}

/// The full map for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer<'a> {
    /// Every region in collection order.
    pub regions: Vec<RegionLayer<'a>>,
    /// Marker for the highlighted region, if it exists on the map.
    pub marker: Option<SelectedMarker>,
}

impl<'a> MapLayer<'a> {
    /// Builds the map, highlighting the dropdown-selected region.
    #[must_use]
    pub fn build(datasets: &'a Datasets, highlighted: Option<&RegionKey>) -> Self {
        let mut marker = None;

        let regions = datasets
            .regions()
            .iter()
            .map(|region| {
                let selected = highlighted == Some(&region.key);
                let popup_html = popup_html(&region.key, region.probability);

                if selected {
                    marker = region.geometry.centroid().map(|c| SelectedMarker {
                        key: region.key.clone(),
                        lng: c.x(),
                        lat: c.y(),
                        popup_html: popup_html.clone(),
                    });
                }

                RegionLayer {
                    key: &region.key,
                    geometry: &region.geometry,
                    selected,
                    style: FeatureStyle::for_region(region.probability, selected),
                    tooltip_html: tooltip_html(&region.key),
                    popup_html,
                }
            })
            .collect();

        if let Some(key) = highlighted
            && marker.is_none()
        {
            log::debug!("Highlighted region {key} is not on the map");
        }

        Self { regions, marker }
    }
}
