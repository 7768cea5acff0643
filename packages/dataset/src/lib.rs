#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads the precomputed subsidence model outputs into a read-only
//! snapshot.
//!
//! The four input files are read once at startup into [`Datasets`], which
//! offers key-based lookups with defined behavior on missing keys: every
//! per-region accessor returns an empty slice or `None` rather than an
//! error. Only the initial load can fail, and a failed load is fatal for
//! the caller; no partial-load mode exists.
//!
//! [`init`] installs the snapshot process-wide so that every request
//! handler shares the same immutable data without locking.

pub mod geometry;
pub mod tables;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use subsidence_map_dataset_models::{
    FactorGroupAttribution, FactorItemAttribution, RegionFeature, RegionKey, RegionProbability,
};

/// Default directory holding the four input files.
pub const DEFAULT_DATA_DIR: &str = "data";

/// File name of the region probability table.
pub const PROBABILITY_FILE: &str = "df_test_with_proba.csv";
/// File name of the region geometry collection.
pub const GEOMETRY_FILE: &str = "gdf_final.geojson";
/// File name of the factor-group attribution table.
pub const FACTOR_GROUP_FILE: &str = "group_shap.csv";
/// File name of the detailed factor-item attribution table.
pub const FACTOR_ITEM_FILE: &str = "dong_to_shap.csv";

/// Errors that can occur while loading the datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// A file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A table could not be parsed.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path to the CSV file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// The geometry collection could not be parsed.
    #[error("GeoJSON error in {path}: {source}")]
    Geometry {
        /// Path to the `GeoJSON` file.
        path: String,
        /// Underlying parse error.
        source: geometry::ParseError,
    },
}

/// Locations of the four input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    /// Region probability table (CSV).
    pub probabilities: PathBuf,
    /// Region geometry collection (`GeoJSON`).
    pub geometry: PathBuf,
    /// Factor-group attribution table (CSV).
    pub factor_groups: PathBuf,
    /// Detailed factor-item attribution table (CSV).
    pub factor_items: PathBuf,
}

impl DatasetPaths {
    /// Uses the default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            probabilities: dir.join(PROBABILITY_FILE),
            geometry: dir.join(GEOMETRY_FILE),
            factor_groups: dir.join(FACTOR_GROUP_FILE),
            factor_items: dir.join(FACTOR_ITEM_FILE),
        }
    }

    /// Resolves the data directory from `DATA_DIR`, falling back to
    /// [`DEFAULT_DATA_DIR`].
    #[must_use]
    pub fn from_env() -> Self {
        let dir = std::env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        Self::in_dir(dir)
    }
}

/// Read-only snapshot of all four datasets.
#[derive(Debug, Default)]
pub struct Datasets {
    probabilities: Vec<RegionProbability>,
    regions: Vec<RegionFeature>,
    region_index: BTreeMap<RegionKey, usize>,
    factor_groups: BTreeMap<RegionKey, Vec<FactorGroupAttribution>>,
    factor_items: BTreeMap<RegionKey, Vec<FactorItemAttribution>>,
}

impl Datasets {
    /// Reads and parses all four files.
    ///
    /// # Errors
    ///
    /// Returns an error if any file is missing or malformed.
    pub fn load(paths: &DatasetPaths) -> Result<Self, DatasetError> {
        log::info!("Loading region probabilities from {}", paths.probabilities.display());
        let probabilities = read_csv(&paths.probabilities)?;

        log::info!("Loading region geometry from {}", paths.geometry.display());
        let text = std::fs::read_to_string(&paths.geometry).map_err(|source| DatasetError::Io {
            path: paths.geometry.display().to_string(),
            source,
        })?;
        let regions =
            geometry::parse_regions(&text).map_err(|source| DatasetError::Geometry {
                path: paths.geometry.display().to_string(),
                source,
            })?;

        log::info!("Loading factor-group attributions from {}", paths.factor_groups.display());
        let factor_groups = read_csv(&paths.factor_groups)?;

        log::info!("Loading factor-item attributions from {}", paths.factor_items.display());
        let factor_items = read_csv(&paths.factor_items)?;

        let datasets = Self::from_parts(probabilities, regions, factor_groups, factor_items);
        log::info!(
            "Loaded {} probability rows, {} regions, {} regions with factor groups, {} regions with detailed items",
            datasets.probabilities.len(),
            datasets.regions.len(),
            datasets.factor_groups.len(),
            datasets.factor_items.len(),
        );

        Ok(datasets)
    }

    /// Builds a snapshot from already-parsed records.
    ///
    /// Attribution rows are grouped per region in file order.
    /// When the geometry collection repeats a key, the first feature wins.
    #[must_use]
    pub fn from_parts(
        probabilities: Vec<RegionProbability>,
        regions: Vec<RegionFeature>,
        factor_groups: Vec<FactorGroupAttribution>,
        factor_items: Vec<FactorItemAttribution>,
    ) -> Self {
        let mut region_index = BTreeMap::new();
        for (idx, region) in regions.iter().enumerate() {
            if region_index.contains_key(&region.key) {
                log::warn!("Duplicate region key {} in geometry collection", region.key);
                continue;
            }
            region_index.insert(region.key.clone(), idx);
        }

        let mut groups: BTreeMap<RegionKey, Vec<FactorGroupAttribution>> = BTreeMap::new();
        for row in factor_groups {
            groups.entry(row.region_key.clone()).or_default().push(row);
        }

        let mut items: BTreeMap<RegionKey, Vec<FactorItemAttribution>> = BTreeMap::new();
        for row in factor_items {
            items.entry(row.region_key.clone()).or_default().push(row);
        }

        Self {
            probabilities,
            regions,
            region_index,
            factor_groups: groups,
            factor_items: items,
        }
    }

    /// Sorted, de-duplicated district names from the probability table.
    #[must_use]
    pub fn districts(&self) -> Vec<&str> {
        self.probabilities
            .iter()
            .map(|row| row.district.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted, de-duplicated sub-district names of one district. Empty
    /// for an unknown district.
    #[must_use]
    pub fn subdistricts(&self, district: &str) -> Vec<&str> {
        self.probabilities
            .iter()
            .filter(|row| row.district == district)
            .map(|row| row.subdistrict.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// All regions in geometry-collection order.
    #[must_use]
    pub fn regions(&self) -> &[RegionFeature] {
        &self.regions
    }

    /// Looks up a region by key.
    #[must_use]
    pub fn region(&self, key: &str) -> Option<&RegionFeature> {
        self.region_index.get(key).map(|&idx| &self.regions[idx])
    }

    /// Predicted probability of a region.
    ///
    /// The geometry collection is authoritative. Regions it lacks fall
    /// back to the probability table.
    #[must_use]
    pub fn probability(&self, key: &str) -> Option<f64> {
        if let Some(region) = self.region(key) {
            return region.probability;
        }
        self.probabilities
            .iter()
            .find(|row| row.key().as_str() == key)
            .and_then(|row| row.probability)
    }

    /// Factor-group attribution rows of a region, in file order.
    #[must_use]
    pub fn factor_groups(&self, key: &str) -> &[FactorGroupAttribution] {
        self.factor_groups.get(key).map_or(&[], Vec::as_slice)
    }

    /// Detailed factor-item attribution rows of a region, in file order.
    #[must_use]
    pub fn factor_items(&self, key: &str) -> &[FactorItemAttribution] {
        self.factor_items.get(key).map_or(&[], Vec::as_slice)
    }
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tables::read_table(std::io::BufReader::new(file)).map_err(|source| DatasetError::Csv {
        path: path.display().to_string(),
        source,
    })
}

static SNAPSHOT: OnceLock<Datasets> = OnceLock::new();

/// Loads the datasets into the process-wide snapshot, or returns the
/// snapshot if an earlier call already installed one.
///
/// # Errors
///
/// Returns an error if the first load fails. Nothing is installed in that
/// case.
pub fn init(paths: &DatasetPaths) -> Result<&'static Datasets, DatasetError> {
    if let Some(existing) = SNAPSHOT.get() {
        return Ok(existing);
    }
    let loaded = Datasets::load(paths)?;
    Ok(SNAPSHOT.get_or_init(|| loaded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, polygon};

    fn square() -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ]])
    }

    fn row(district: &str, subdistrict: &str, probability: Option<f64>) -> RegionProbability {
        RegionProbability {
            district: district.to_string(),
            subdistrict: subdistrict.to_string(),
            probability,
        }
    }

    fn group(key: &str, name: &str, value: f64) -> FactorGroupAttribution {
        FactorGroupAttribution {
            region_key: RegionKey::new(key),
            factor_group: name.to_string(),
            shap_value: value,
        }
    }

    fn sample() -> Datasets {
        Datasets::from_parts(
            vec![
                row("서초구", "서초동", Some(0.2)),
                row("강남구", "역삼동", Some(0.8)),
                row("강남구", "삼성동", None),
                row("강남구", "역삼동", Some(0.8)),
                row("마포구", "합정동", Some(0.4)),
            ],
            vec![
                RegionFeature {
                    key: RegionKey::new("강남구_역삼동"),
                    probability: Some(0.81),
                    geometry: square(),
                },
                RegionFeature {
                    key: RegionKey::new("강남구_역삼동"),
                    probability: Some(0.1),
                    geometry: square(),
                },
            ],
            vec![
                group("강남구_역삼동", "지반", 0.3),
                group("강남구_역삼동", "지하 공사", -0.2),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn districts_are_sorted_and_unique() {
        let data = sample();
        assert_eq!(data.districts(), vec!["강남구", "마포구", "서초구"]);
        assert_eq!(data.subdistricts("강남구"), vec!["삼성동", "역삼동"]);
        assert!(data.subdistricts("없는구").is_empty());
    }

    #[test]
    fn first_duplicate_region_wins() {
        let data = sample();
        assert_eq!(data.probability("강남구_역삼동"), Some(0.81));
    }

    #[test]
    fn probability_falls_back_to_table() {
        let data = sample();
        assert_eq!(data.probability("마포구_합정동"), Some(0.4));
        assert_eq!(data.probability("강남구_삼성동"), None);
        assert_eq!(data.probability("없는구_없는동"), None);
    }

    #[test]
    fn missing_keys_yield_empty_attributions() {
        let data = sample();
        assert_eq!(data.factor_groups("강남구_역삼동").len(), 2);
        assert!(data.factor_groups("서초구_서초동").is_empty());
        assert!(data.factor_items("강남구_역삼동").is_empty());
    }

    #[test]
    fn attribution_rows_keep_file_order() {
        let data = sample();
        let names: Vec<&str> = data
            .factor_groups("강남구_역삼동")
            .iter()
            .map(|g| g.factor_group.as_str())
            .collect();
        assert_eq!(names, vec!["지반", "지하 공사"]);
    }

    const PROBABILITY_CSV: &str = "시군구명,법정동명,예측확률,기타\n\
                                   강남구,역삼동,0.81,x\n\
                                   강남구,삼성동,,x\n\
                                   서초구,서초동,0.12,x\n";

    const GEOMETRY_JSON: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"법정동":"강남구_역삼동","예측확률":0.81},
         "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
        {"type":"Feature","properties":{"법정동":"강남구_삼성동","예측확률":null},
         "geometry":{"type":"MultiPolygon","coordinates":[[[[1,0],[2,0],[2,1],[1,1],[1,0]]]]}}
    ]}"#;

    const GROUP_CSV: &str = "법정동,위험요인그룹,shap_value\n\
                             강남구_역삼동,지하 공사,0.30\n\
                             강남구_역삼동,지반,-0.10\n";

    const ITEM_CSV: &str = "법정동,위험요인그룹,영향 인자,shap_value\n\
                            강남구_역삼동,지하 공사,굴착_깊이,0.21\n";

    /// Writes the four input files into a fresh directory under the
    /// system temp dir.
    fn write_fixtures(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "subsidence_map_dataset_{name}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(PROBABILITY_FILE), PROBABILITY_CSV).unwrap();
        std::fs::write(dir.join(GEOMETRY_FILE), GEOMETRY_JSON).unwrap();
        std::fs::write(dir.join(FACTOR_GROUP_FILE), GROUP_CSV).unwrap();
        std::fs::write(dir.join(FACTOR_ITEM_FILE), ITEM_CSV).unwrap();
        dir
    }

    #[test]
    fn loads_all_four_files_from_disk() {
        let dir = write_fixtures("complete");

        let data = Datasets::load(&DatasetPaths::in_dir(&dir)).unwrap();

        assert_eq!(data.districts(), vec!["강남구", "서초구"]);
        assert_eq!(data.regions().len(), 2);
        assert_eq!(data.regions()[1].geometry.0.len(), 1);
        assert_eq!(data.probability("강남구_역삼동"), Some(0.81));
        assert_eq!(data.probability("강남구_삼성동"), None);
        assert_eq!(data.probability("서초구_서초동"), Some(0.12));
        assert_eq!(data.factor_groups("강남구_역삼동")[0].factor_group, "지하 공사");
        assert_eq!(data.factor_items("강남구_역삼동")[0].item_label, "굴착_깊이");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn malformed_table_is_a_csv_error_naming_the_file() {
        let dir = write_fixtures("bad_csv");
        std::fs::write(
            dir.join(FACTOR_ITEM_FILE),
            "법정동,위험요인그룹,영향 인자,shap_value\n강남구_역삼동,지반,a_b,lots\n",
        )
        .unwrap();

        let err = Datasets::load(&DatasetPaths::in_dir(&dir)).unwrap_err();

        assert!(
            matches!(&err, DatasetError::Csv { path, .. } if path.ends_with(FACTOR_ITEM_FILE)),
            "unexpected error: {err:?}"
        );

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn malformed_geometry_is_a_geometry_error_naming_the_file() {
        let dir = write_fixtures("bad_geojson");
        std::fs::write(
            dir.join(GEOMETRY_FILE),
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"예측확률":0.5},
                 "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}
            ]}"#,
        )
        .unwrap();

        let err = Datasets::load(&DatasetPaths::in_dir(&dir)).unwrap_err();

        assert!(
            matches!(&err, DatasetError::Geometry { path, .. } if path.ends_with(GEOMETRY_FILE)),
            "unexpected error: {err:?}"
        );

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_files_fail_to_load() {
        let paths = DatasetPaths::in_dir("definitely/not/a/real/dir");
        let err = Datasets::load(&paths).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn paths_use_default_file_names() {
        let paths = DatasetPaths::in_dir("data");
        assert_eq!(paths.geometry, Path::new("data").join(GEOMETRY_FILE));
        assert_eq!(paths.factor_items, Path::new("data").join(FACTOR_ITEM_FILE));
    }
}
