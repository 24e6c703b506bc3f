#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Layered spatial index for amenity and location geometries.
//!
//! Each amenity category and the location layer get their own R-tree.
//! Queries pre-filter by bounding box and then compute exact planar
//! distances, so results are in the units of the projected CRS (meters).

pub mod parse;

use std::collections::BTreeMap;

use geo::{BoundingRect, Distance, Euclidean, Geometry, Intersects};
use land_availability_amenity_models::AmenityCategory;
use rstar::{AABB, RTree, RTreeObject};

pub use parse::{GeometryParseError, parse_geojson_geometry, parse_geojson_to_multipolygon};

/// A group of indexed features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Amenities of one category.
    Amenity(AmenityCategory),
    /// Land parcels.
    Locations,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amenity(category) => write!(f, "{category}"),
            Self::Locations => f.write_str("locations"),
        }
    }
}

/// A feature found by a distance query.
#[derive(Debug, Clone, PartialEq)]
pub struct Nearby {
    /// Key of the feature within its layer.
    pub key: String,
    /// Distance between the feature and the query geometry.
    pub distance_m: f64,
}

/// Distance and intersection queries over layered geometries.
pub trait SpatialIndex {
    /// Features of `layer` within `radius_m` of `geometry`, closest first.
    /// Equidistant features are ordered by key.
    fn query_nearby(&self, layer: Layer, geometry: &Geometry<f64>, radius_m: f64) -> Vec<Nearby>;

    /// Keys of features of `layer` that intersect `geometry`, ordered by key.
    fn query_intersecting(&self, layer: Layer, geometry: &Geometry<f64>) -> Vec<String>;

    /// Adds or replaces the feature `key` in `layer`.
    fn upsert(&mut self, layer: Layer, key: &str, geometry: Geometry<f64>);

    /// Removes the feature `key` from `layer`. Returns whether it existed.
    fn remove(&mut self, layer: Layer, key: &str) -> bool;
}

/// A geometry stored in the R-tree with its key.
#[derive(Debug, Clone, PartialEq)]
struct IndexedGeometry {
    key: String,
    envelope: AABB<[f64; 2]>,
    geometry: Geometry<f64>,
}

impl RTreeObject for IndexedGeometry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

#[derive(Default)]
struct LayerIndex {
    tree: RTree<IndexedGeometry>,
    /// key -> entry, so replaced or removed geometries can be found in the
    /// tree by their old envelope
    entries: BTreeMap<String, IndexedGeometry>,
}

/// In-memory [`SpatialIndex`] backed by one R-tree per layer.
#[derive(Default)]
pub struct RTreeSpatialIndex {
    layers: BTreeMap<Layer, LayerIndex>,
}

impl RTreeSpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a layer in one pass from `(key, geometry)` pairs, replacing
    /// anything previously indexed in it. Later duplicates of a key win.
    pub fn bulk_load(
        &mut self,
        layer: Layer,
        features: impl IntoIterator<Item = (String, Geometry<f64>)>,
    ) {
        let mut entries = BTreeMap::new();
        for (key, geometry) in features {
            let entry = IndexedGeometry {
                key: key.clone(),
                envelope: compute_envelope(&geometry),
                geometry,
            };
            entries.insert(key, entry);
        }

        let tree = RTree::bulk_load(entries.values().cloned().collect());
        log::info!("Loaded {} features into the {layer} layer", tree.size());

        self.layers.insert(layer, LayerIndex { tree, entries });
    }

    /// Number of features indexed in `layer`.
    #[must_use]
    pub fn len(&self, layer: Layer) -> usize {
        self.layers.get(&layer).map_or(0, |index| index.tree.size())
    }

    /// Whether `layer` has no features.
    #[must_use]
    pub fn is_empty(&self, layer: Layer) -> bool {
        self.len(layer) == 0
    }
}

impl SpatialIndex for RTreeSpatialIndex {
    fn query_nearby(&self, layer: Layer, geometry: &Geometry<f64>, radius_m: f64) -> Vec<Nearby> {
        let Some(index) = self.layers.get(&layer) else {
            return Vec::new();
        };
        if radius_m.is_nan() || radius_m < 0.0 {
            return Vec::new();
        }

        let query_env = expand_envelope(&compute_envelope(geometry), radius_m);

        let mut found: Vec<Nearby> = index
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .filter_map(|entry| {
                let distance_m = Euclidean.distance(&entry.geometry, geometry);
                (distance_m <= radius_m).then(|| Nearby {
                    key: entry.key.clone(),
                    distance_m,
                })
            })
            .collect();

        found.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.key.cmp(&b.key))
        });
        found
    }

    fn query_intersecting(&self, layer: Layer, geometry: &Geometry<f64>) -> Vec<String> {
        let Some(index) = self.layers.get(&layer) else {
            return Vec::new();
        };

        let query_env = compute_envelope(geometry);

        let mut keys: Vec<String> = index
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.geometry.intersects(geometry))
            .map(|entry| entry.key.clone())
            .collect();
        keys.sort();
        keys
    }

    fn upsert(&mut self, layer: Layer, key: &str, geometry: Geometry<f64>) {
        let index = self.layers.entry(layer).or_default();

        if let Some(previous) = index.entries.remove(key) {
            index.tree.remove(&previous);
        }

        let entry = IndexedGeometry {
            key: key.to_string(),
            envelope: compute_envelope(&geometry),
            geometry,
        };
        index.tree.insert(entry.clone());
        index.entries.insert(key.to_string(), entry);
    }

    fn remove(&mut self, layer: Layer, key: &str) -> bool {
        let Some(index) = self.layers.get_mut(&layer) else {
            return false;
        };
        let Some(previous) = index.entries.remove(key) else {
            return false;
        };
        if index.tree.remove(&previous).is_none() {
            log::warn!("Feature {key} was missing from the {layer} R-tree");
        }
        true
    }
}

/// Compute the bounding box envelope for a [`Geometry`].
fn compute_envelope(geometry: &Geometry<f64>) -> AABB<[f64; 2]> {
    geometry.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

fn expand_envelope(envelope: &AABB<[f64; 2]>, by: f64) -> AABB<[f64; 2]> {
    let [min_x, min_y] = envelope.lower();
    let [max_x, max_y] = envelope.upper();
    AABB::from_corners([min_x - by, min_y - by], [max_x + by, max_y + by])
}
