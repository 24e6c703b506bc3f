#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Maintenance of the nearest-amenity links stored on each location.
//!
//! Links are computed once when a location is created and then adjusted
//! incrementally: an inserted amenity replaces a link only when it is
//! strictly closer, and a deleted amenity clears the links pointing at it
//! without searching for a replacement. Greenbelt changes recompute the
//! overlap flag of every location they touch.
//!
//! The maintainer never owns storage or the index. Callers pass them in
//! after applying the amenity change, and each affected location is read,
//! updated and written back on its own. A failed write is logged and
//! counted, and processing carries on with the next location.

pub mod config;
pub mod registry;

use std::collections::BTreeSet;

use geo::Geometry;
use land_availability_amenity_models::{Amenity, AmenityCategory};
use land_availability_database::LocationStore;
use land_availability_location_models::Location;
use land_availability_spatial::{Layer, SpatialIndex};

pub use config::{ConfigError, ProximityConfig};
pub use registry::{CategoryDescriptor, CategoryRegistry};

/// Outcome counts of one maintenance operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// Locations considered.
    pub examined: u64,
    /// Locations changed and written back.
    pub updated: u64,
    /// Locations that could not be read or written.
    pub failed: u64,
}

impl MaintenanceReport {
    /// Merge another report into this one.
    pub const fn merge(&mut self, other: Self) {
        self.examined += other.examined;
        self.updated += other.updated;
        self.failed += other.failed;
    }
}

impl std::fmt::Display for MaintenanceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} examined, {} updated, {} failed",
            self.examined, self.updated, self.failed
        )
    }
}

/// A change to a greenbelt area.
///
/// Updates carry both footprints so locations that only touched the old
/// shape are recomputed too.
#[derive(Debug, Clone, PartialEq)]
pub enum GreenbeltChange {
    /// A new greenbelt area.
    Inserted(Geometry<f64>),
    /// An existing area whose record or geometry changed.
    Updated {
        /// Geometry before the change.
        previous: Geometry<f64>,
        /// Geometry after the change.
        current: Geometry<f64>,
    },
    /// A removed area, with its pre-change geometry.
    Deleted(Geometry<f64>),
}

impl GreenbeltChange {
    /// The geometries whose intersecting locations need recomputing.
    #[must_use]
    pub fn footprints(&self) -> Vec<&Geometry<f64>> {
        match self {
            Self::Inserted(geometry) | Self::Deleted(geometry) => vec![geometry],
            Self::Updated { previous, current } => vec![previous, current],
        }
    }
}

/// Keeps location nearest-links and greenbelt overlap current.
#[derive(Debug, Clone, Default)]
pub struct ProximityMaintainer {
    registry: CategoryRegistry,
}

impl ProximityMaintainer {
    /// Creates a maintainer using the given category registry.
    #[must_use]
    pub const fn new(registry: CategoryRegistry) -> Self {
        Self { registry }
    }

    /// The category registry in use.
    #[must_use]
    pub const fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Computes every nearest-link and the greenbelt overlap of `location`
    /// from the current index contents.
    ///
    /// Categories with nothing in range end up with no link. Run this
    /// before the location is first persisted.
    pub fn on_location_created(&self, index: &impl SpatialIndex, location: &mut Location) {
        let geometry = Geometry::MultiPolygon(location.geometry.clone());

        for descriptor in self.registry.linkable() {
            let closest = index
                .query_nearby(descriptor.layer(), &geometry, descriptor.radius_m)
                .into_iter()
                .next();

            match closest {
                Some(nearby) => {
                    log::debug!(
                        "Location {}: nearest {} is {} at {:.1}m",
                        location.uprn,
                        descriptor.category,
                        nearby.key,
                        nearby.distance_m
                    );
                    location.set_nearest(descriptor.category, nearby.key, nearby.distance_m);
                }
                None => {
                    location.nearest.remove(&descriptor.category);
                }
            }
        }

        location.greenbelt_overlap = overlaps_greenbelt(index, &geometry);
    }

    /// Offers a newly inserted or re-posted amenity to every location within
    /// its category radius.
    ///
    /// Greenbelt amenities are handled as [`GreenbeltChange::Inserted`].
    pub fn on_amenity_inserted(
        &self,
        index: &impl SpatialIndex,
        store: &mut impl LocationStore,
        amenity: &Amenity,
    ) -> MaintenanceReport {
        let radius_m = self.registry.descriptor(amenity.category()).radius_m;
        self.on_amenity_inserted_within(index, store, amenity, radius_m)
    }

    /// [`Self::on_amenity_inserted`] with an explicit search radius.
    ///
    /// A location's link is replaced when it has none or when the amenity
    /// is strictly closer than the linked one. At equal distance the
    /// existing link stays.
    pub fn on_amenity_inserted_within(
        &self,
        index: &impl SpatialIndex,
        store: &mut impl LocationStore,
        amenity: &Amenity,
        radius_m: f64,
    ) -> MaintenanceReport {
        let category = amenity.category();
        if category == AmenityCategory::Greenbelt {
            return self.on_greenbelt_changed(
                index,
                store,
                &GreenbeltChange::Inserted(amenity.geometry()),
            );
        }

        let key = amenity.key();
        let mut report = MaintenanceReport::default();

        for nearby in index.query_nearby(Layer::Locations, &amenity.geometry(), radius_m) {
            report.examined += 1;

            let Some(mut location) = load_location(store, &nearby.key, &mut report) else {
                continue;
            };

            let replace = location
                .nearest(category)
                .is_none_or(|link| nearby.distance_m < link.distance_m);

            if !replace {
                log::debug!(
                    "Location {}: keeping {category} link, {key} at {:.1}m is not closer",
                    location.uprn,
                    nearby.distance_m
                );
                continue;
            }

            log::debug!(
                "Location {}: {category} link replaced by {key} at {:.1}m",
                location.uprn,
                nearby.distance_m
            );
            location.set_nearest(category, key, nearby.distance_m);
            save_location(store, &location, &mut report);
        }

        log::info!("Inserted {category} {key}: {report}");
        report
    }

    /// Clears every link that references a deleted amenity. No replacement
    /// amenity is searched for.
    ///
    /// Greenbelt amenities are handled as [`GreenbeltChange::Deleted`]; the
    /// index must no longer contain them.
    pub fn on_amenity_deleted(
        &self,
        index: &impl SpatialIndex,
        store: &mut impl LocationStore,
        amenity: &Amenity,
    ) -> MaintenanceReport {
        if amenity.category() == AmenityCategory::Greenbelt {
            return self.on_greenbelt_changed(
                index,
                store,
                &GreenbeltChange::Deleted(amenity.geometry()),
            );
        }

        let id = amenity.id();
        let mut report = MaintenanceReport::default();

        let uprns = match store.locations_linked_to(&id) {
            Ok(uprns) => uprns,
            Err(e) => {
                log::error!("Failed to find locations linked to {id}: {e}");
                report.failed += 1;
                return report;
            }
        };

        for uprn in uprns {
            report.examined += 1;

            let Some(mut location) = load_location(store, &uprn, &mut report) else {
                continue;
            };

            log::debug!("Location {uprn}: clearing {} link to {id}", id.category);
            location.clear_nearest(id.category);
            save_location(store, &location, &mut report);
        }

        log::info!("Deleted {id}: {report}");
        report
    }

    /// Recomputes the greenbelt overlap flag of every location intersecting
    /// the changed area. The index must already reflect the change.
    pub fn on_greenbelt_changed(
        &self,
        index: &impl SpatialIndex,
        store: &mut impl LocationStore,
        change: &GreenbeltChange,
    ) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        let affected: BTreeSet<String> = change
            .footprints()
            .into_iter()
            .flat_map(|footprint| index.query_intersecting(Layer::Locations, footprint))
            .collect();

        for uprn in affected {
            report.examined += 1;

            let Some(mut location) = load_location(store, &uprn, &mut report) else {
                continue;
            };

            let overlap =
                overlaps_greenbelt(index, &Geometry::MultiPolygon(location.geometry.clone()));
            if overlap == location.greenbelt_overlap {
                continue;
            }

            log::debug!("Location {uprn}: greenbelt overlap now {overlap}");
            location.greenbelt_overlap = overlap;
            save_location(store, &location, &mut report);
        }

        log::info!("Greenbelt change: {report}");
        report
    }
}

fn overlaps_greenbelt(index: &impl SpatialIndex, geometry: &Geometry<f64>) -> bool {
    !index
        .query_intersecting(Layer::Amenity(AmenityCategory::Greenbelt), geometry)
        .is_empty()
}

fn load_location(
    store: &impl LocationStore,
    uprn: &str,
    report: &mut MaintenanceReport,
) -> Option<Location> {
    match store.location(uprn) {
        Ok(Some(location)) => Some(location),
        Ok(None) => {
            log::warn!("Location {uprn} is indexed but not stored, skipping");
            None
        }
        Err(e) => {
            log::error!("Failed to load location {uprn}: {e}");
            report.failed += 1;
            None
        }
    }
}

fn save_location(
    store: &mut impl LocationStore,
    location: &Location,
    report: &mut MaintenanceReport,
) {
    match store.save_location(location) {
        Ok(()) => report.updated += 1,
        Err(e) => {
            log::error!("Failed to save location {}: {e}", location.uprn);
            report.failed += 1;
        }
    }
}
