#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The catalog owns the stored amenities, locations and postcode reference
//! data together with their spatial index.
//!
//! Every mutation goes through here. After updating the store and the
//! index, the catalog calls the proximity maintainer explicitly so the
//! affected locations' nearest-links stay current.

mod search;

use geo::Geometry;
use land_availability_amenity_models::{Amenity, AmenityCategory, AmenityShape, Broadband};
use land_availability_database::{
    AmenityStore, LocationStore, MemoryDatabase, PersistenceError, ReferenceStore,
};
use land_availability_location_models::{
    Address, CodePoint, EmptyGeometryError, Location, LocationDraft, normalize_postcode,
};
use land_availability_proximity::{GreenbeltChange, MaintenanceReport, ProximityMaintainer};
use land_availability_spatial::{Layer, RTreeSpatialIndex, SpatialIndex};

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The store failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A broadband record or lookup names a postcode with no code point.
    #[error("Postcode not found: {postcode}")]
    PostcodeNotFound {
        /// The normalized postcode.
        postcode: String,
    },

    /// An amenity's geometry does not have its category's shape.
    #[error("{category} {key} needs a {expected:?} geometry")]
    GeometryMismatch {
        /// The amenity category.
        category: AmenityCategory,
        /// The amenity's natural key.
        key: String,
        /// The shape the category requires.
        expected: AmenityShape,
    },

    /// No amenity with this key exists.
    #[error("Unknown {category} with {} {key}", .category.natural_key_name())]
    UnknownAmenity {
        /// The amenity category.
        category: AmenityCategory,
        /// The requested key.
        key: String,
    },

    /// No location with this key exists.
    #[error("Unknown location {uprn}")]
    UnknownLocation {
        /// The requested parcel key.
        uprn: String,
    },

    /// A location draft has no usable geometry.
    #[error("Invalid location: {0}")]
    InvalidLocation(#[from] EmptyGeometryError),

    /// A search could not be resolved.
    #[error("Search error: {0}")]
    Search(#[from] land_availability_search::SearchError),
}

/// Amenity, location and reference data with a spatial index over them.
pub struct Catalog<S = MemoryDatabase, I = RTreeSpatialIndex> {
    store: S,
    index: I,
    maintainer: ProximityMaintainer,
}

impl Catalog {
    /// An empty catalog backed by [`MemoryDatabase`] and
    /// [`RTreeSpatialIndex`].
    #[must_use]
    pub fn in_memory(maintainer: ProximityMaintainer) -> Self {
        Self::new(MemoryDatabase::new(), RTreeSpatialIndex::new(), maintainer)
    }
}

impl<S, I> Catalog<S, I>
where
    S: LocationStore + AmenityStore + ReferenceStore,
    I: SpatialIndex,
{
    /// Creates a catalog over an existing store and index. The index must
    /// already hold every stored feature.
    #[must_use]
    pub const fn new(store: S, index: I, maintainer: ProximityMaintainer) -> Self {
        Self {
            store,
            index,
            maintainer,
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The spatial index.
    #[must_use]
    pub const fn index(&self) -> &I {
        &self.index
    }

    /// Inserts or updates an amenity by its category's natural key, then
    /// updates the nearest-links (or greenbelt overlap) of the locations
    /// around it.
    ///
    /// A school whose type changed is moved between the school categories.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::GeometryMismatch`] if the geometry does not
    /// have the category's shape, or [`CatalogError::Persistence`] if the
    /// amenity cannot be stored.
    pub fn upsert_amenity(&mut self, mut amenity: Amenity) -> Result<MaintenanceReport, CatalogError> {
        normalize_amenity_postcode(&mut amenity);

        let category = amenity.category();
        let key = amenity.key().to_string();
        let geometry = amenity.geometry();

        let expected = self.maintainer.registry().descriptor(category).shape;
        if !expected.accepts(&geometry) {
            return Err(CatalogError::GeometryMismatch {
                category,
                key,
                expected,
            });
        }

        let mut report = MaintenanceReport::default();

        if let Amenity::School(school) = &amenity {
            let other = match school.school_type.category() {
                AmenityCategory::PrimarySchool => AmenityCategory::SecondarySchool,
                _ => AmenityCategory::PrimarySchool,
            };
            if self.store.amenity(other, &key)?.is_some() {
                log::info!("School {key} changed type, removing it from {other}");
                report.merge(self.delete_amenity(other, &key)?);
            }
        }

        let previous = self.store.save_amenity(&amenity)?;
        self.index.upsert(Layer::Amenity(category), &key, geometry.clone());

        report.merge(if category == AmenityCategory::Greenbelt {
            let change = match &previous {
                Some(previous) => GreenbeltChange::Updated {
                    previous: previous.geometry(),
                    current: geometry,
                },
                None => GreenbeltChange::Inserted(geometry),
            };
            self.maintainer
                .on_greenbelt_changed(&self.index, &mut self.store, &change)
        } else {
            self.maintainer
                .on_amenity_inserted(&self.index, &mut self.store, &amenity)
        });

        log::info!(
            "{} {category} {key}",
            if previous.is_some() { "Updated" } else { "Inserted" }
        );
        Ok(report)
    }

    /// Stores broadband statistics for a postcode. The record's point is
    /// replaced by the postcode's code point.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::PostcodeNotFound`] if the postcode has no
    /// code point, or [`CatalogError::Persistence`] if storage fails.
    pub fn upsert_broadband(
        &mut self,
        mut broadband: Broadband,
    ) -> Result<MaintenanceReport, CatalogError> {
        broadband.postcode = normalize_postcode(&broadband.postcode);
        let codepoint = self.store.codepoint(&broadband.postcode)?.ok_or_else(|| {
            CatalogError::PostcodeNotFound {
                postcode: broadband.postcode.clone(),
            }
        })?;
        broadband.point = codepoint.point;
        self.upsert_amenity(Amenity::Broadband(broadband))
    }

    /// Deletes an amenity and clears the links pointing at it. Deleting a
    /// greenbelt recomputes the overlap of the locations it covered.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownAmenity`] if nothing is stored under
    /// the key, or [`CatalogError::Persistence`] if storage fails.
    pub fn delete_amenity(
        &mut self,
        category: AmenityCategory,
        key: &str,
    ) -> Result<MaintenanceReport, CatalogError> {
        let amenity = self.store.delete_amenity(category, key)?.ok_or_else(|| {
            CatalogError::UnknownAmenity {
                category,
                key: key.to_string(),
            }
        })?;
        self.index.remove(Layer::Amenity(category), key);

        let report = self
            .maintainer
            .on_amenity_deleted(&self.index, &mut self.store, &amenity);

        log::info!("Deleted {category} {key}");
        Ok(report)
    }

    /// Creates or updates a location by parcel key.
    ///
    /// New locations get their nearest-links and greenbelt overlap computed
    /// before they are stored. Existing locations keep their links; only
    /// their attributes, geometry and representative point change.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidLocation`] for an empty geometry, or
    /// [`CatalogError::Persistence`] if storage fails.
    pub fn upsert_location(&mut self, draft: LocationDraft) -> Result<Location, CatalogError> {
        let location = match self.store.location(&draft.uprn)? {
            Some(mut existing) => {
                draft.apply_to(&mut existing)?;
                log::info!("Updated location {}", existing.uprn);
                existing
            }
            None => {
                let mut created = draft.into_location()?;
                self.maintainer
                    .on_location_created(&self.index, &mut created);
                log::info!(
                    "Created location {} with {} nearest link(s)",
                    created.uprn,
                    created.nearest.len()
                );
                created
            }
        };

        self.store.save_location(&location)?;
        self.index.upsert(
            Layer::Locations,
            &location.uprn,
            Geometry::MultiPolygon(location.geometry.clone()),
        );
        Ok(location)
    }

    /// Deletes a location, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] if storage fails.
    pub fn delete_location(&mut self, uprn: &str) -> Result<bool, CatalogError> {
        let existed = self.store.delete_location(uprn)?;
        self.index.remove(Layer::Locations, uprn);
        if existed {
            log::info!("Deleted location {uprn}");
        }
        Ok(existed)
    }

    /// Recomputes every nearest-link and the greenbelt overlap of a stored
    /// location from the current amenities. Links cleared by deletions are
    /// filled again if a replacement is in range.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownLocation`] if the location does not
    /// exist, or [`CatalogError::Persistence`] if storage fails.
    pub fn refresh_location(&mut self, uprn: &str) -> Result<Location, CatalogError> {
        let mut location =
            self.store
                .location(uprn)?
                .ok_or_else(|| CatalogError::UnknownLocation {
                    uprn: uprn.to_string(),
                })?;

        self.maintainer
            .on_location_created(&self.index, &mut location);
        self.store.save_location(&location)?;
        log::info!("Refreshed nearest links of location {uprn}");
        Ok(location)
    }

    /// Recomputes the links of every stored location.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] if the locations cannot be
    /// listed. Failures on individual locations are counted in the report.
    pub fn refresh_all_locations(&mut self) -> Result<MaintenanceReport, CatalogError> {
        let mut report = MaintenanceReport::default();

        for mut location in self.store.all_locations()? {
            report.examined += 1;
            self.maintainer
                .on_location_created(&self.index, &mut location);
            match self.store.save_location(&location) {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    log::error!("Failed to save location {}: {e}", location.uprn);
                    report.failed += 1;
                }
            }
        }

        log::info!("Refreshed all locations: {report}");
        Ok(report)
    }

    /// Stores a postcode centroid under its normalized postcode.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] if storage fails.
    pub fn upsert_codepoint(&mut self, mut codepoint: CodePoint) -> Result<(), CatalogError> {
        codepoint.postcode = normalize_postcode(&codepoint.postcode);
        self.store.save_codepoint(&codepoint)?;
        Ok(())
    }

    /// Stores a postal address, normalizing its postcode.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] if storage fails.
    pub fn upsert_address(&mut self, mut address: Address) -> Result<(), CatalogError> {
        address.postcode = address.postcode.as_deref().map(normalize_postcode);
        self.store.save_address(&address)?;
        Ok(())
    }

    /// The code point of a postcode, in any spacing or case.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] if the store cannot be read.
    pub fn codepoint_for_postcode(&self, postcode: &str) -> Result<Option<CodePoint>, CatalogError> {
        Ok(self.store.codepoint(&normalize_postcode(postcode))?)
    }

    /// Every address with a postcode, in any spacing or case.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] if the store cannot be read.
    pub fn addresses_for_postcode(&self, postcode: &str) -> Result<Vec<Address>, CatalogError> {
        Ok(self.store.addresses_for_postcode(&normalize_postcode(postcode))?)
    }
}

fn normalize_amenity_postcode(amenity: &mut Amenity) {
    match amenity {
        Amenity::Broadband(broadband) => {
            broadband.postcode = normalize_postcode(&broadband.postcode);
        }
        Amenity::School(school) => {
            school.postcode = school.postcode.as_deref().map(normalize_postcode);
        }
        _ => {}
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use geo::{LineString, MultiPolygon, point, polygon};
    use land_availability_amenity_models::{BusStop, Greenbelt, OverheadLine, School, SchoolType};
    use land_availability_location_models::NearestLink;

    pub fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]])
    }

    pub fn draft(uprn: &str, geometry: MultiPolygon<f64>) -> LocationDraft {
        LocationDraft {
            uprn: uprn.to_string(),
            name: None,
            authority: Some("Oldham".to_string()),
            owner: None,
            unique_asset_id: None,
            geometry,
            estimated_floor_space: None,
        }
    }

    pub fn bus_stop(code: &str, x: f64, y: f64) -> Amenity {
        Amenity::BusStop(BusStop {
            amic_code: code.to_string(),
            name: None,
            direction: None,
            area: None,
            road: None,
            nptg_code: None,
            point: point!(x: x, y: y),
        })
    }

    pub fn codepoint(postcode: &str, x: f64, y: f64) -> CodePoint {
        CodePoint {
            postcode: postcode.to_string(),
            quality: Some(10),
            point: point!(x: x, y: y),
            country: None,
            nhs_region: None,
            nhs_health_authority: None,
            county: None,
            district: None,
            ward: None,
        }
    }

    pub fn broadband(postcode: &str, pct: f64) -> Broadband {
        Broadband {
            postcode: postcode.to_string(),
            speed_30_mb_percentage: Some(pct),
            min_download_speed: None,
            avg_download_speed: None,
            max_download_speed: None,
            min_upload_speed: None,
            avg_upload_speed: None,
            max_upload_speed: None,
            point: point!(x: 0.0, y: 0.0),
        }
    }

    pub fn school(urn: &str, school_type: SchoolType, x: f64, y: f64) -> Amenity {
        Amenity::School(School {
            urn: urn.to_string(),
            la_name: None,
            school_name: None,
            school_type,
            school_capacity: Some(420),
            school_pupils: Some(400),
            postcode: Some("ol4 1aa".to_string()),
            point: point!(x: x, y: y),
        })
    }

    fn catalog() -> Catalog {
        Catalog::in_memory(ProximityMaintainer::default())
    }

    fn stored(catalog: &Catalog, uprn: &str) -> Location {
        catalog.store().location(uprn).unwrap().unwrap()
    }

    #[test]
    fn reposting_amenity_updates_in_place() {
        let mut catalog = catalog();
        catalog.upsert_amenity(bus_stop("BS1", 0.0, 0.0)).unwrap();
        catalog.upsert_amenity(bus_stop("BS1", 10.0, 10.0)).unwrap();

        assert_eq!(
            catalog
                .store()
                .count_amenities(AmenityCategory::BusStop)
                .unwrap(),
            1
        );
        assert_eq!(
            catalog
                .index()
                .query_nearby(
                    Layer::Amenity(AmenityCategory::BusStop),
                    &point!(x: 10.0, y: 10.0).into(),
                    0.5
                )
                .len(),
            1
        );
    }

    #[test]
    fn new_location_is_linked_and_existing_keeps_links() {
        let mut catalog = catalog();
        catalog.upsert_amenity(bus_stop("BS1", 150.0, 50.0)).unwrap();

        let created = catalog
            .upsert_location(draft("1", square(0.0, 0.0, 100.0)))
            .unwrap();
        assert_eq!(created.nearest_distance(AmenityCategory::BusStop), Some(50.0));

        // Moving the parcel does not recompute links.
        let mut moved = draft("1", square(20.0, 0.0, 100.0));
        moved.name = Some("Renamed".to_string());
        let updated = catalog.upsert_location(moved).unwrap();
        assert_eq!(updated.name.as_deref(), Some("Renamed"));
        assert_eq!(updated.nearest_distance(AmenityCategory::BusStop), Some(50.0));
        assert_eq!(catalog.store().location_count(), 1);
    }

    #[test]
    fn amenity_insert_updates_existing_locations() {
        let mut catalog = catalog();
        catalog
            .upsert_location(draft("1", square(0.0, 0.0, 100.0)))
            .unwrap();

        let report = catalog.upsert_amenity(bus_stop("BS1", 150.0, 50.0)).unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(
            stored(&catalog, "1").nearest_distance(AmenityCategory::BusStop),
            Some(50.0)
        );
    }

    #[test]
    fn delete_clears_link_and_refresh_repairs_it() {
        let mut catalog = catalog();
        catalog.upsert_amenity(bus_stop("near", 150.0, 50.0)).unwrap();
        catalog.upsert_amenity(bus_stop("far", 400.0, 50.0)).unwrap();
        catalog
            .upsert_location(draft("1", square(0.0, 0.0, 100.0)))
            .unwrap();

        catalog
            .delete_amenity(AmenityCategory::BusStop, "near")
            .unwrap();
        assert_eq!(
            stored(&catalog, "1").nearest.get(&AmenityCategory::BusStop),
            Some(&NearestLink::cleared())
        );

        let refreshed = catalog.refresh_location("1").unwrap();
        assert_eq!(
            refreshed.nearest_distance(AmenityCategory::BusStop),
            Some(300.0)
        );
        assert_eq!(
            stored(&catalog, "1").nearest_distance(AmenityCategory::BusStop),
            Some(300.0)
        );
    }

    #[test]
    fn moved_amenity_keeps_link_until_refresh() {
        let mut catalog = catalog();
        catalog.upsert_amenity(bus_stop("A", 150.0, 50.0)).unwrap();
        catalog
            .upsert_location(draft("1", square(0.0, 0.0, 100.0)))
            .unwrap();

        catalog.upsert_amenity(bus_stop("A", 900.0, 50.0)).unwrap();
        assert_eq!(
            stored(&catalog, "1").nearest.get(&AmenityCategory::BusStop),
            Some(&NearestLink::to("A", 50.0))
        );

        let refreshed = catalog.refresh_location("1").unwrap();
        assert_eq!(
            refreshed.nearest.get(&AmenityCategory::BusStop),
            Some(&NearestLink::to("A", 800.0))
        );
    }

    #[test]
    fn delete_unknown_amenity_fails() {
        let mut catalog = catalog();
        let err = catalog
            .delete_amenity(AmenityCategory::Motorway, "J99")
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownAmenity { .. }));
        assert_eq!(err.to_string(), "Unknown motorway with identifier J99");
    }

    #[test]
    fn rejects_mismatched_geometry() {
        let mut catalog = catalog();
        let line = Amenity::OverheadLine(OverheadLine {
            gdo_gid: "OHL1".to_string(),
            route_asset: None,
            towers: None,
            action_dtt: None,
            status: None,
            operating: None,
            circuit_1: None,
            circuit_2: None,
            geometry: point!(x: 0.0, y: 0.0).into(),
        });
        let err = catalog.upsert_amenity(line).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::GeometryMismatch {
                category: AmenityCategory::OverheadLine,
                expected: AmenityShape::Line,
                ..
            }
        ));

        let line = Amenity::OverheadLine(OverheadLine {
            gdo_gid: "OHL1".to_string(),
            route_asset: None,
            towers: None,
            action_dtt: None,
            status: None,
            operating: None,
            circuit_1: None,
            circuit_2: None,
            geometry: LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]).into(),
        });
        assert!(catalog.upsert_amenity(line).is_ok());
    }

    #[test]
    fn broadband_takes_codepoint_position() {
        let mut catalog = catalog();
        catalog
            .upsert_codepoint(codepoint("ol4 1aa", 120.0, 50.0))
            .unwrap();
        catalog
            .upsert_location(draft("1", square(0.0, 0.0, 100.0)))
            .unwrap();

        catalog.upsert_broadband(broadband("OL4 1AA", 67.0)).unwrap();

        let stored_broadband = catalog
            .store()
            .amenity(AmenityCategory::Broadband, "OL41AA")
            .unwrap()
            .unwrap();
        let Amenity::Broadband(stored_broadband) = stored_broadband else {
            panic!("expected broadband");
        };
        assert!((stored_broadband.point.x() - 120.0).abs() < f64::EPSILON);
        assert_eq!(
            stored(&catalog, "1").nearest_distance(AmenityCategory::Broadband),
            Some(20.0)
        );
    }

    #[test]
    fn broadband_for_unknown_postcode_fails() {
        let mut catalog = catalog();
        let err = catalog
            .upsert_broadband(broadband("ZZ9 9ZZ", 10.0))
            .unwrap_err();
        assert!(matches!(err, CatalogError::PostcodeNotFound { postcode } if postcode == "ZZ99ZZ"));
    }

    #[test]
    fn postcode_lookups_normalize_input() {
        let mut catalog = catalog();
        catalog
            .upsert_codepoint(codepoint("M1 1AE", 1.0, 2.0))
            .unwrap();
        catalog
            .upsert_address(Address {
                uprn: "100".to_string(),
                address_line_1: Some("1 Piccadilly".to_string()),
                address_line_2: None,
                address_line_3: None,
                city: Some("Manchester".to_string()),
                county: None,
                postcode: Some("m1 1ae".to_string()),
                country_code: None,
                point: point!(x: 1.0, y: 2.0),
            })
            .unwrap();

        assert!(catalog.codepoint_for_postcode(" m11ae ").unwrap().is_some());
        assert!(catalog.codepoint_for_postcode("M2 2BB").unwrap().is_none());
        assert_eq!(catalog.addresses_for_postcode("M1 1AE").unwrap().len(), 1);
        assert!(catalog.addresses_for_postcode("M2 2BB").unwrap().is_empty());
    }

    #[test]
    fn school_type_change_moves_category() {
        let mut catalog = catalog();
        catalog
            .upsert_location(draft("1", square(0.0, 0.0, 100.0)))
            .unwrap();
        catalog
            .upsert_amenity(school("100", SchoolType::Primary, 150.0, 50.0))
            .unwrap();
        assert!(stored(&catalog, "1")
            .nearest(AmenityCategory::PrimarySchool)
            .is_some());

        catalog
            .upsert_amenity(school("100", SchoolType::Secondary, 150.0, 50.0))
            .unwrap();
        let location = stored(&catalog, "1");
        assert!(location.nearest(AmenityCategory::PrimarySchool).is_none());
        assert_eq!(
            location.nearest_distance(AmenityCategory::SecondarySchool),
            Some(50.0)
        );
        assert_eq!(
            catalog
                .store()
                .count_amenities(AmenityCategory::PrimarySchool)
                .unwrap(),
            0
        );

        let Some(Amenity::School(stored_school)) = catalog
            .store()
            .amenity(AmenityCategory::SecondarySchool, "100")
            .unwrap()
        else {
            panic!("expected school");
        };
        assert_eq!(stored_school.postcode.as_deref(), Some("OL41AA"));
    }

    #[test]
    fn greenbelt_upsert_and_delete_track_overlap() {
        let mut catalog = catalog();
        catalog
            .upsert_location(draft("1", square(0.0, 0.0, 100.0)))
            .unwrap();

        let belt = Amenity::Greenbelt(Greenbelt {
            code: "GB1".to_string(),
            la_name: None,
            gb_name: None,
            ons_code: None,
            year: None,
            area_ha: Some(12.0),
            perimeter_km: None,
            geometry: square(90.0, 90.0, 50.0).into(),
        });
        catalog.upsert_amenity(belt).unwrap();
        assert!(stored(&catalog, "1").greenbelt_overlap);

        // A location created inside an existing greenbelt starts flagged.
        let inside = catalog
            .upsert_location(draft("2", square(100.0, 100.0, 10.0)))
            .unwrap();
        assert!(inside.greenbelt_overlap);

        catalog
            .delete_amenity(AmenityCategory::Greenbelt, "GB1")
            .unwrap();
        assert!(!stored(&catalog, "1").greenbelt_overlap);
        assert!(!stored(&catalog, "2").greenbelt_overlap);
    }

    #[test]
    fn moving_greenbelt_clears_overlap_left_behind() {
        let mut catalog = catalog();
        catalog
            .upsert_location(draft("1", square(0.0, 0.0, 100.0)))
            .unwrap();
        catalog
            .upsert_location(draft("2", square(10_000.0, 10_000.0, 100.0)))
            .unwrap();

        let belt = |geometry: MultiPolygon<f64>| {
            Amenity::Greenbelt(Greenbelt {
                code: "GB1".to_string(),
                la_name: None,
                gb_name: None,
                ons_code: None,
                year: None,
                area_ha: None,
                perimeter_km: None,
                geometry: geometry.into(),
            })
        };
        catalog.upsert_amenity(belt(square(50.0, 50.0, 100.0))).unwrap();
        assert!(stored(&catalog, "1").greenbelt_overlap);

        catalog
            .upsert_amenity(belt(square(10_000.0, 10_000.0, 50.0)))
            .unwrap();
        assert!(!stored(&catalog, "1").greenbelt_overlap);
        assert!(stored(&catalog, "2").greenbelt_overlap);
        assert_eq!(
            catalog
                .store()
                .count_amenities(AmenityCategory::Greenbelt)
                .unwrap(),
            1
        );
    }

    #[test]
    fn delete_location_removes_it_from_index() {
        let mut catalog = catalog();
        catalog
            .upsert_location(draft("1", square(0.0, 0.0, 100.0)))
            .unwrap();
        assert!(catalog.delete_location("1").unwrap());
        assert!(!catalog.delete_location("1").unwrap());

        let report = catalog.upsert_amenity(bus_stop("BS1", 150.0, 50.0)).unwrap();
        assert_eq!(report.examined, 0);
    }

    #[test]
    fn refresh_unknown_location_fails() {
        let mut catalog = catalog();
        assert!(matches!(
            catalog.refresh_location("404"),
            Err(CatalogError::UnknownLocation { .. })
        ));
    }

    #[test]
    fn refresh_all_recomputes_every_location() {
        let mut catalog = catalog();
        catalog
            .upsert_location(draft("1", square(0.0, 0.0, 100.0)))
            .unwrap();
        catalog
            .upsert_location(draft("2", square(300.0, 0.0, 100.0)))
            .unwrap();
        catalog
            .upsert_amenity(bus_stop("BS1", 150.0, 50.0))
            .unwrap();
        catalog
            .delete_amenity(AmenityCategory::BusStop, "BS1")
            .unwrap();
        catalog
            .upsert_amenity(bus_stop("BS2", 500.0, 50.0))
            .unwrap();

        let report = catalog.refresh_all_locations().unwrap();
        assert_eq!(report.examined, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(
            stored(&catalog, "1").nearest_distance(AmenityCategory::BusStop),
            Some(400.0)
        );
    }
}
