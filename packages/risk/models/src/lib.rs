#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Subsidence risk grade taxonomy and display palette definitions.
//!
//! This crate defines the five-tier ordinal risk grade derived from the
//! model's predicted subsidence probability, the choropleth fill colors
//! bound to the same breakpoints, and the two-class palette used for
//! signed attribution values.
//!
//! Classification is only defined for known probabilities. Callers must
//! branch on a missing probability before classifying and render the
//! "no information" state instead.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Lower bounds (exclusive) of each tier, highest tier first.
///
/// A probability strictly greater than a bound belongs to that bound's
/// tier. Anything at or below the last bound is the lowest tier.
const TIER_LOWER_BOUNDS: [f64; 4] = [0.75, 0.55, 0.35, 0.15];

/// Label shown wherever a region has no usable probability.
pub const NO_RISK_INFO_LABEL: &str = "위험 정보 없음";

/// Returns the zero-based tier index for a probability (0 = highest risk).
fn tier(probability: f64) -> usize {
    TIER_LOWER_BOUNDS
        .iter()
        .position(|bound| probability > *bound)
        .unwrap_or(TIER_LOWER_BOUNDS.len())
}

/// Ordinal subsidence risk grade, from 1 (highest risk) to 5 (lowest).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskGrade {
    /// Probability above 0.75
    Grade1,
    /// Probability in (0.55, 0.75]
    Grade2,
    /// Probability in (0.35, 0.55]
    Grade3,
    /// Probability in (0.15, 0.35]
    Grade4,
    /// Probability at or below 0.15
    Grade5,
}

impl RiskGrade {
    /// Classifies a known probability into a grade.
    ///
    /// Total over every finite input. Values above 1.0 land in
    /// [`Self::Grade1`] and values below 0.0 land in [`Self::Grade5`].
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        Self::all()[tier(probability)]
    }

    /// Display label for this grade (e.g. `1등급`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Grade1 => "1등급",
            Self::Grade2 => "2등급",
            Self::Grade3 => "3등급",
            Self::Grade4 => "4등급",
            Self::Grade5 => "5등급",
        }
    }

    /// Choropleth fill color bound to this grade's tier.
    #[must_use]
    pub const fn fill_color(self) -> RiskColor {
        match self {
            Self::Grade1 => RiskColor::DarkRed,
            Self::Grade2 => RiskColor::Red,
            Self::Grade3 => RiskColor::Orange,
            Self::Grade4 => RiskColor::Amber,
            Self::Grade5 => RiskColor::Gray,
        }
    }

    /// Returns all variants of this enum, highest risk first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Grade1,
            Self::Grade2,
            Self::Grade3,
            Self::Grade4,
            Self::Grade5,
        ]
    }
}

/// Fill color for a region on the choropleth map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskColor {
    /// Highest-risk tier
    DarkRed,
    /// High tier
    Red,
    /// Medium tier
    Orange,
    /// Low tier
    Amber,
    /// Lowest tier, also used when no probability is known
    Gray,
}

impl RiskColor {
    /// Color used for regions without a known probability.
    pub const NO_DATA: Self = Self::Gray;

    /// Maps a known probability to its fill color.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        RiskGrade::from_probability(probability).fill_color()
    }

    /// Maps an optional probability to its fill color, falling back to
    /// [`Self::NO_DATA`].
    #[must_use]
    pub fn for_optional(probability: Option<f64>) -> Self {
        probability.map_or(Self::NO_DATA, Self::from_probability)
    }

    /// CSS color token understood by the mapping widget.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::DarkRed => "darkred",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Amber => "#FFDA7A",
            Self::Gray => "#A9A9A9",
        }
    }
}

/// Whether an attribution value pushes the predicted risk up or not.
///
/// Only two classes exist: zero counts as non-increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContributionDirection {
    /// Positive attribution value
    Increases,
    /// Zero or negative attribution value
    Decreases,
}

impl ContributionDirection {
    /// Classifies a signed attribution value.
    #[must_use]
    pub fn from_shap_value(value: f64) -> Self {
        if value > 0.0 {
            Self::Increases
        } else {
            Self::Decreases
        }
    }

    /// Bar color for the charting widget.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Increases => "#E74C3C",
            Self::Decreases => "#3498DB",
        }
    }
}

/// Formats a probability as a percentage rounded to one decimal place
/// (e.g. `0.4531` → `45.3%`).
#[must_use]
pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
