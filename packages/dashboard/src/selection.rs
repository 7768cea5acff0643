//! Resolves the active region from the two selection channels.
//!
//! The dropdown pair and the map click are independent inputs. The
//! dropdown pair decides which region the map draws as selected; a click,
//! when present, decides which region the explanation panel describes.
//! A click never writes back into the dropdown state.

use serde::{Deserialize, Serialize};
use subsidence_map_dataset_models::RegionKey;
use subsidence_map_spatial::RegionIndex;

/// Dropdown entry meaning "nothing chosen".
pub const NONE_SENTINEL: &str = "선택 안 함";

/// Turns a raw dropdown value into a choice, mapping blanks and the
/// sentinel to `None`.
fn normalize(choice: Option<&str>) -> Option<String> {
    choice
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != NONE_SENTINEL)
        .map(ToString::to_string)
}

/// Current values of the district and sub-district dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropdownSelection {
    /// Chosen district, if any.
    pub district: Option<String>,
    /// Chosen sub-district, if any. Always `None` without a district.
    pub subdistrict: Option<String>,
}

impl DropdownSelection {
    /// Builds a selection from raw dropdown values.
    #[must_use]
    pub fn new(district: Option<&str>, subdistrict: Option<&str>) -> Self {
        let district = normalize(district);
        let subdistrict = district.as_ref().and_then(|_| normalize(subdistrict));
        Self {
            district,
            subdistrict,
        }
    }

    /// Region key of the selection, defined only when both dropdowns hold
    /// a real choice.
    #[must_use]
    pub fn key(&self) -> Option<RegionKey> {
        match (&self.district, &self.subdistrict) {
            (Some(district), Some(subdistrict)) => {
                Some(RegionKey::from_parts(district, subdistrict))
            }
            _ => None,
        }
    }
}

/// A click reported by the mapping widget.
#[derive(Debug, Clone, PartialEq)]
pub enum MapClick {
    /// The widget reported the clicked feature's key.
    Region(RegionKey),
    /// The widget reported only the clicked coordinates.
    Coordinates {
        /// Longitude.
        lng: f64,
        /// Latitude.
        lat: f64,
    },
}

impl MapClick {
    /// Builds a click from a raw feature key, ignoring blank keys.
    #[must_use]
    pub fn from_key(key: Option<&str>) -> Option<Self> {
        key.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self::Region(RegionKey::new(s)))
    }

    /// Resolves the click to a region key. Coordinates outside every
    /// region resolve to `None`.
    #[must_use]
    pub fn resolve(&self, index: &RegionIndex) -> Option<RegionKey> {
        match self {
            Self::Region(key) => Some(key.clone()),
            Self::Coordinates { lng, lat } => {
                let key = index.lookup(*lng, *lat).cloned();
                if key.is_none() {
                    log::debug!("Click at ({lng}, {lat}) is outside every region");
                }
                key
            }
        }
    }
}

/// Outcome of merging the two channels for one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSelection {
    /// Region drawn as selected on the map (dropdown channel only).
    pub highlighted: Option<RegionKey>,
    /// Region described by the explanation panel (click wins).
    pub explained: Option<RegionKey>,
}

/// Merges the dropdown selection with an optional clicked region.
#[must_use]
pub fn resolve(dropdown: &DropdownSelection, clicked: Option<RegionKey>) -> ActiveSelection {
    let highlighted = dropdown.key();
    let explained = clicked.or_else(|| highlighted.clone());
    ActiveSelection {
        highlighted,
        explained,
    }
}

/// Selection state carried across interactions of one session.
///
/// Changing the dropdown pair discards any earlier click, so the panel
/// follows the freshly chosen region. Re-submitting the same pair keeps
/// the click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    dropdown: DropdownSelection,
    click: Option<RegionKey>,
}

impl SelectionState {
    /// Records new dropdown values.
    pub fn select_dropdown(&mut self, dropdown: DropdownSelection) {
        if dropdown != self.dropdown {
            self.click = None;
        }
        self.dropdown = dropdown;
    }

    /// Records a map click, or clears it with `None`.
    pub fn click(&mut self, key: Option<RegionKey>) {
        self.click = key;
    }

    /// Current dropdown values.
    #[must_use]
    pub const fn dropdown(&self) -> &DropdownSelection {
        &self.dropdown
    }

    /// Resolves the current state.
    #[must_use]
    pub fn active(&self) -> ActiveSelection {
        resolve(&self.dropdown, self.click.clone())
    }
}
