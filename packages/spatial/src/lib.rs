#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index over region outlines.
//!
//! Built once from the loaded geometry collection and used to resolve a
//! map click delivered as coordinates into the region key under the
//! cursor.

use geo::{BoundingRect, Contains, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};
use subsidence_map_dataset_models::{RegionFeature, RegionKey};

/// A region outline stored in the R-tree with its key.
struct RegionEntry {
    key: RegionKey,
    /// Position in the source collection, used to keep lookups
    /// deterministic when outlines overlap.
    order: usize,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for RegionEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over every region outline.
pub struct RegionIndex {
    regions: RTree<RegionEntry>,
}

impl RegionIndex {
    /// Builds the index from the loaded regions.
    #[must_use]
    pub fn build(regions: &[RegionFeature]) -> Self {
        let entries: Vec<RegionEntry> = regions
            .iter()
            .enumerate()
            .filter_map(|(order, region)| {
                let Some(envelope) = compute_envelope(&region.geometry) else {
                    log::warn!("Region {} has an empty outline, skipping", region.key);
                    return None;
                };
                Some(RegionEntry {
                    key: region.key.clone(),
                    order,
                    envelope,
                    polygon: region.geometry.clone(),
                })
            })
            .collect();

        let regions = RTree::bulk_load(entries);
        log::info!("Loaded {} regions into spatial index", regions.size());

        Self { regions }
    }

    /// Looks up the region containing a point.
    ///
    /// Sub-districts tile the city without overlap; if the data has
    /// slivers, the region earliest in the collection wins.
    #[must_use]
    pub fn lookup(&self, lng: f64, lat: f64) -> Option<&RegionKey> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.regions
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.contains(&point))
            .min_by_key(|entry| entry.order)
            .map(|entry| &entry.key)
    }

    /// Number of indexed regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.size()
    }

    /// Whether the index holds no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.size() == 0
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}
