//! The explanation panel shown next to the map.
//!
//! The panel distinguishes three empty states: nothing selected, a region
//! without a probability, and a region without attribution rows. None of
//! them is an error.

use serde::Serialize;
use subsidence_map_dataset::Datasets;
use subsidence_map_dataset_models::RegionKey;
use subsidence_map_risk_models::{NO_RISK_INFO_LABEL, RiskColor, RiskGrade, format_percent};

use crate::attribution::{self, Attribution};

/// Prompt shown when no region is active.
pub const SELECT_PROMPT: &str = "자치구와 법정동을 선택해주세요.";

/// Risk summary of a region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RiskInfo {
    /// The model produced a probability for the region.
    #[serde(rename_all = "camelCase")]
    Known {
        /// Predicted probability in [0, 1].
        probability: f64,
        /// Probability as a one-decimal percentage.
        percent: String,
        /// Derived grade.
        grade: RiskGrade,
        /// Display label of the grade.
        grade_label: &'static str,
        /// Fill color of the grade's tier.
        color: &'static str,
    },
    /// No probability is available.
    Unavailable {
        /// Display label for the missing state.
        message: &'static str,
    },
}

impl RiskInfo {
    /// Summarizes an optional probability. The classifier only runs on
    /// known values.
    #[must_use]
    pub fn from_probability(probability: Option<f64>) -> Self {
        probability.map_or(
            Self::Unavailable {
                message: NO_RISK_INFO_LABEL,
            },
            |p| {
                let grade = RiskGrade::from_probability(p);
                Self::Known {
                    probability: p,
                    percent: format_percent(p),
                    grade,
                    grade_label: grade.label(),
                    color: RiskColor::from_probability(p).css(),
                }
            },
        )
    }
}

/// Panel content for a selected region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionExplanation {
    /// Region key.
    pub key: RegionKey,
    /// Key with the separator replaced by a space.
    pub display_name: String,
    /// Panel heading.
    pub title: String,
    /// Probability and grade.
    pub risk: RiskInfo,
    /// Factor-group chart and top items.
    pub attribution: Attribution,
}

/// Explanation panel state for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ExplanationPanel {
    /// No region is active.
    NoSelection {
        /// Prompt asking the user to choose a region.
        message: &'static str,
    },
    /// A region is active.
    Region(RegionExplanation),
}

impl ExplanationPanel {
    /// Builds the panel for the active region, if any.
    ///
    /// Unknown keys are not an error: they produce a region panel with
    /// missing risk information and no attribution.
    #[must_use]
    pub fn build(datasets: &Datasets, explained: Option<&RegionKey>) -> Self {
        let Some(key) = explained else {
            return Self::NoSelection {
                message: SELECT_PROMPT,
            };
        };

        if datasets.region(key.as_str()).is_none() {
            log::debug!("Explaining region {key} which has no geometry");
        }

        let display_name = key.display_name();
        Self::Region(RegionExplanation {
            key: key.clone(),
            title: format!("{display_name} 지반침하 위험 요인"),
            display_name,
            risk: RiskInfo::from_probability(datasets.probability(key.as_str())),
            attribution: attribution::explain(
                key.as_str(),
                datasets.factor_groups(key.as_str()),
                datasets.factor_items(key.as_str()),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{DropdownSelection, SelectionState, NONE_SENTINEL};
    use subsidence_map_dataset_models::{
        FactorGroupAttribution, FactorItemAttribution, RegionProbability,
    };

    fn datasets() -> Datasets {
        Datasets::from_parts(
            vec![
                RegionProbability {
                    district: "Gu1".to_string(),
                    subdistrict: "Dong1".to_string(),
                    probability: Some(0.8),
                },
                RegionProbability {
                    district: "Gu1".to_string(),
                    subdistrict: "Dong2".to_string(),
                    probability: None,
                },
            ],
            Vec::new(),
            vec![FactorGroupAttribution {
                region_key: RegionKey::new("Gu1_Dong1"),
                factor_group: "지반".to_string(),
                shap_value: 0.456,
            }],
            vec![FactorItemAttribution {
                region_key: RegionKey::new("Gu1_Dong1"),
                factor_group: "지반".to_string(),
                item_label: "지하_시설물".to_string(),
                shap_value: 0.2,
            }],
        )
    }

    #[test]
    fn no_selection_prompts() {
        assert_eq!(
            ExplanationPanel::build(&datasets(), None),
            ExplanationPanel::NoSelection {
                message: SELECT_PROMPT
            }
        );
    }

    #[test]
    fn selected_region_has_risk_and_attribution() {
        let key = RegionKey::new("Gu1_Dong1");
        let ExplanationPanel::Region(panel) = ExplanationPanel::build(&datasets(), Some(&key))
        else {
            panic!("expected region panel");
        };

        assert_eq!(panel.title, "Gu1 Dong1 지반침하 위험 요인");
        let RiskInfo::Known {
            percent,
            grade,
            grade_label,
            ..
        } = panel.risk
        else {
            panic!("expected known risk");
        };
        assert_eq!(percent, "80.0%");
        assert_eq!(grade, RiskGrade::Grade1);
        assert_eq!(grade_label, "1등급");

        let Attribution::Available { bars, top_items } = panel.attribution else {
            panic!("expected attribution");
        };
        assert_eq!(bars[0].formatted_value, "0.46");
        assert_eq!(top_items[0].item, "지하 시설물");
    }

    #[test]
    fn missing_probability_is_not_classified() {
        let key = RegionKey::new("Gu1_Dong2");
        let ExplanationPanel::Region(panel) = ExplanationPanel::build(&datasets(), Some(&key))
        else {
            panic!("expected region panel");
        };

        assert_eq!(
            panel.risk,
            RiskInfo::Unavailable {
                message: NO_RISK_INFO_LABEL
            }
        );
    }

    #[test]
    fn unknown_clicked_key_degrades_to_no_attribution() {
        let key = RegionKey::new("Gu9_Dong9");
        let ExplanationPanel::Region(panel) = ExplanationPanel::build(&datasets(), Some(&key))
        else {
            panic!("expected region panel");
        };

        assert!(matches!(panel.attribution, Attribution::Unavailable { .. }));
        assert!(matches!(panel.risk, RiskInfo::Unavailable { .. }));
    }

    #[test]
    fn empty_state_after_reselection_is_not_stale() {
        let data = datasets();
        let mut state = SelectionState::default();

        state.select_dropdown(DropdownSelection::new(Some("Gu1"), Some("Dong1")));
        assert!(matches!(
            ExplanationPanel::build(&data, state.active().explained.as_ref()),
            ExplanationPanel::Region(RegionExplanation {
                attribution: Attribution::Available { .. },
                ..
            })
        ));

        state.select_dropdown(DropdownSelection::new(Some(NONE_SENTINEL), Some(NONE_SENTINEL)));
        assert!(matches!(
            ExplanationPanel::build(&data, state.active().explained.as_ref()),
            ExplanationPanel::NoSelection { .. }
        ));

        state.select_dropdown(DropdownSelection::new(Some("Gu1"), Some("Dong2")));
        assert!(matches!(
            ExplanationPanel::build(&data, state.active().explained.as_ref()),
            ExplanationPanel::Region(RegionExplanation {
                attribution: Attribution::Unavailable { .. },
                ..
            })
        ));
    }

    #[test]
    fn panel_serializes_with_state_tag() {
        let key = RegionKey::new("Gu1_Dong2");
        let json = serde_json::to_value(ExplanationPanel::build(&datasets(), Some(&key))).unwrap();

        assert_eq!(json["state"], "region");
        assert_eq!(json["displayName"], "Gu1 Dong2");
        assert_eq!(json["risk"]["state"], "unavailable");
        assert_eq!(json["attribution"]["state"], "unavailable");
    }
}
