#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Presentation logic for the subsidence risk dashboard.
//!
//! Each render pass runs the same pipeline over the read-only
//! [`Datasets`](subsidence_map_dataset::Datasets) snapshot:
//!
//! 1. [`selection`] merges the dropdown pair and the map click into the
//!    highlighted and explained regions.
//! 2. [`map_layer`] styles every region for the mapping widget.
//! 3. [`panel`] builds the explanation panel, using [`attribution`] for
//!    the factor chart and the top detailed items.
//!
//! Nothing here performs I/O or mutates the snapshot.

pub mod attribution;
pub mod map_layer;
pub mod panel;
pub mod selection;

pub use attribution::{Attribution, ChartBar, TopItem};
pub use map_layer::{DEFAULT_MAP_VIEW, FeatureStyle, MapLayer, MapView, RegionLayer, SelectedMarker};
pub use panel::{ExplanationPanel, RegionExplanation, RiskInfo};
pub use selection::{ActiveSelection, DropdownSelection, MapClick, SelectionState};
