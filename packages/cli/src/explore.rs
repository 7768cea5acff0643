//! Terminal explorer mirroring the dashboard's dropdowns and map clicks.
//!
//! Each pass prints the highlighted region and the explanation panel,
//! then asks for the next interaction. Changing the dropdown pair clears
//! an earlier click, exactly as in the web dashboard.

use dialoguer::{Input, Select};
use subsidence_map_cli_utils::{MultiProgress, Spinner};
use subsidence_map_dashboard::selection::NONE_SENTINEL;
use subsidence_map_dashboard::{
    DropdownSelection, ExplanationPanel, MapClick, RiskInfo, SelectionState,
};
use subsidence_map_dataset::{DatasetPaths, Datasets};
use subsidence_map_spatial::RegionIndex;

use crate::render::render_panel;

/// One interaction offered after each render pass.
enum Action {
    ChooseRegion,
    ClickByName,
    ClickByPoint,
    ClearClick,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::ChooseRegion,
        Self::ClickByName,
        Self::ClickByPoint,
        Self::ClearClick,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ChooseRegion => "Choose district / sub-district",
            Self::ClickByName => "Click a region by key",
            Self::ClickByPoint => "Click a point (longitude, latitude)",
            Self::ClearClick => "Clear map click",
            Self::Quit => "Quit",
        }
    }
}

/// Loads the datasets and runs the explorer until the user quits.
///
/// # Errors
///
/// Returns an error if the datasets fail to load or a prompt fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let spinner = Spinner::start(multi, "Loading datasets...");
    let datasets = match subsidence_map_dataset::init(&DatasetPaths::from_env()) {
        Ok(datasets) => datasets,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    spinner.finish(&format!("Loaded {} regions", datasets.regions().len()));

    let index = RegionIndex::build(datasets.regions());
    let mut state = SelectionState::default();

    loop {
        let active = state.active();
        println!();
        println!("{}", highlighted_line(datasets, &state));
        println!();
        print!(
            "{}",
            render_panel(&ExplanationPanel::build(datasets, active.explained.as_ref()))
        );
        println!();

        let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
        let idx = Select::new()
            .with_prompt("Next")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::ChooseRegion => state.select_dropdown(choose_dropdown(datasets)?),
            Action::ClickByName => {
                let key: String = Input::new()
                    .with_prompt("Region key (district_sub-district)")
                    .allow_empty(true)
                    .interact_text()?;
                state.click(MapClick::from_key(Some(&key)).and_then(|c| c.resolve(&index)));
            }
            Action::ClickByPoint => {
                let lng: f64 = Input::new().with_prompt("Longitude").interact_text()?;
                let lat: f64 = Input::new().with_prompt("Latitude").interact_text()?;
                let clicked = MapClick::Coordinates { lng, lat }.resolve(&index);
                if clicked.is_none() {
                    println!("No region at ({lng}, {lat}).");
                }
                state.click(clicked);
            }
            Action::ClearClick => state.click(None),
            Action::Quit => return Ok(()),
        }
    }
}

/// Prompts for a district and, when one is chosen, a sub-district.
fn choose_dropdown(datasets: &Datasets) -> Result<DropdownSelection, dialoguer::Error> {
    let districts = with_sentinel(datasets.districts());
    let idx = Select::new()
        .with_prompt("자치구 선택")
        .items(&districts)
        .default(0)
        .interact()?;
    let district = districts[idx];
    if district == NONE_SENTINEL {
        return Ok(DropdownSelection::default());
    }

    let subdistricts = with_sentinel(datasets.subdistricts(district));
    let idx = Select::new()
        .with_prompt("법정동 선택")
        .items(&subdistricts)
        .default(0)
        .interact()?;

    Ok(DropdownSelection::new(Some(district), Some(subdistricts[idx])))
}

fn with_sentinel(choices: Vec<&str>) -> Vec<&str> {
    std::iter::once(NONE_SENTINEL).chain(choices).collect()
}

/// Summary of the region the map would draw as selected.
fn highlighted_line(datasets: &Datasets, state: &SelectionState) -> String {
    let Some(key) = state.dropdown().key() else {
        return "지도 선택: 없음".to_string();
    };
    let risk = match RiskInfo::from_probability(datasets.probability(key.as_str())) {
        RiskInfo::Known {
            percent,
            grade_label,
            ..
        } => format!("{percent}, {grade_label}"),
        RiskInfo::Unavailable { message } => message.to_string(),
    };
    format!("지도 선택: {} ({risk})", key.display_name())
}
