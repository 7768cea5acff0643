//! Turns a region's attribution rows into chart bars and a top-item table.

use std::cmp::Ordering;

use serde::Serialize;
use subsidence_map_dataset_models::{FactorGroupAttribution, FactorItemAttribution};
use subsidence_map_risk_models::ContributionDirection;

/// Number of detailed items shown under the chart.
pub const TOP_ITEM_COUNT: usize = 5;

/// Shown when the selected region has no factor-group rows.
pub const NO_ATTRIBUTION_MESSAGE: &str = "선택된 지역의 위험 요인 분석 정보가 없습니다.";

/// Cosmetic rewrites applied to factor-group names for display.
const FACTOR_LABEL_SUBSTITUTIONS: &[(&str, &str)] = &[("지하 공사", "지하공사")];

/// Display label of a factor group. Never used for matching.
#[must_use]
pub fn factor_label(factor_group: &str) -> String {
    FACTOR_LABEL_SUBSTITUTIONS
        .iter()
        .fold(factor_group.to_string(), |label, (from, to)| {
            label.replace(from, to)
        })
}

/// Display label of a detailed item (`상수관_길이` → `상수관 길이`).
#[must_use]
pub fn item_label(label: &str) -> String {
    label.replace('_', " ")
}

/// Formats a contribution with exactly two decimals.
#[must_use]
pub fn format_contribution(value: f64) -> String {
    format!("{value:.2}")
}

/// One bar of the factor-group chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBar {
    /// Factor-group name as stored.
    pub factor_group: String,
    /// Display label.
    pub label: String,
    /// Contribution value.
    pub value: f64,
    /// Contribution with two decimals.
    pub formatted_value: String,
    /// Sign class of the contribution.
    pub direction: ContributionDirection,
    /// Bar color.
    pub color: &'static str,
}

/// One row of the top detailed items table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItem {
    /// Factor group the item belongs to.
    pub factor_group: String,
    /// Display label of the item.
    pub item: String,
    /// Contribution value.
    pub value: f64,
    /// Contribution with two decimals.
    pub formatted_value: String,
}

/// Attribution section of the explanation panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Attribution {
    /// The region has no factor-group rows.
    Unavailable {
        /// Informational message for the user.
        message: &'static str,
    },
    /// Factor groups and top items for the region.
    #[serde(rename_all = "camelCase")]
    Available {
        /// Factor groups, largest contribution first.
        bars: Vec<ChartBar>,
        /// Up to [`TOP_ITEM_COUNT`] detailed items, largest first.
        top_items: Vec<TopItem>,
    },
}

/// Orders contributions largest first, with NaN after every number.
fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.total_cmp(&a),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

/// Factor-group rows of one region, largest contribution first.
///
/// The sort is stable, so equal values keep their file order. Missing
/// (NaN) values sort last.
#[must_use]
pub fn sorted_factor_groups<'a>(
    region_key: &str,
    rows: &'a [FactorGroupAttribution],
) -> Vec<&'a FactorGroupAttribution> {
    let mut groups: Vec<&FactorGroupAttribution> = rows
        .iter()
        .filter(|row| row.region_key.as_str() == region_key)
        .collect();
    groups.sort_by(|a, b| descending_nan_last(a.shap_value, b.shap_value));
    groups
}

/// Detailed items of one region whose factor group appears in `groups`,
/// largest contribution first with NaN last, truncated to `limit`.
#[must_use]
pub fn top_items<'a>(
    region_key: &str,
    groups: &[&FactorGroupAttribution],
    items: &'a [FactorItemAttribution],
    limit: usize,
) -> Vec<&'a FactorItemAttribution> {
    let mut candidates: Vec<&FactorItemAttribution> = items
        .iter()
        .filter(|item| item.region_key.as_str() == region_key)
        .filter(|item| groups.iter().any(|g| g.factor_group == item.factor_group))
        .collect();
    candidates.sort_by(|a, b| descending_nan_last(a.shap_value, b.shap_value));
    candidates.truncate(limit);
    candidates
}

/// Builds the attribution section for one region.
///
/// Rows belonging to other regions are ignored, so callers may pass
/// either pre-filtered slices or whole tables.
#[must_use]
pub fn explain(
    region_key: &str,
    groups: &[FactorGroupAttribution],
    items: &[FactorItemAttribution],
) -> Attribution {
    let groups = sorted_factor_groups(region_key, groups);
    if groups.is_empty() {
        return Attribution::Unavailable {
            message: NO_ATTRIBUTION_MESSAGE,
        };
    }

    let bars = groups
        .iter()
        .map(|row| {
            let direction = ContributionDirection::from_shap_value(row.shap_value);
            ChartBar {
                factor_group: row.factor_group.clone(),
                label: factor_label(&row.factor_group),
                value: row.shap_value,
                formatted_value: format_contribution(row.shap_value),
                direction,
                color: direction.color(),
            }
        })
        .collect();

    let top_items = top_items(region_key, &groups, items, TOP_ITEM_COUNT)
        .into_iter()
        .map(|row| TopItem {
            factor_group: row.factor_group.clone(),
            item: item_label(&row.item_label),
            value: row.shap_value,
            formatted_value: format_contribution(row.shap_value),
        })
        .collect();

    Attribution::Available { bars, top_items }
}
