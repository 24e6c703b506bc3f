//! Turns a location and its nearest-links into a [`FeatureVector`].

use land_availability_amenity_models::{Amenity, AmenityCategory};
use land_availability_database::AmenityStore;
use land_availability_location_models::Location;
use land_availability_ranking_models::{Criterion, FeatureVector};

/// Distance criteria and the link category they are read from.
const DISTANCE_FEATURES: &[(Criterion, AmenityCategory)] = &[
    (Criterion::DistanceToBusStop, AmenityCategory::BusStop),
    (Criterion::DistanceToMetroStation, AmenityCategory::MetroTube),
    (
        Criterion::DistanceToMotorwayJunction,
        AmenityCategory::Motorway,
    ),
    (
        Criterion::DistanceToOverheadLine,
        AmenityCategory::OverheadLine,
    ),
    (
        Criterion::DistanceToPrimarySchool,
        AmenityCategory::PrimarySchool,
    ),
    (Criterion::DistanceToRailStation, AmenityCategory::TrainStop),
    (
        Criterion::DistanceToSecondarySchool,
        AmenityCategory::SecondarySchool,
    ),
    (Criterion::DistanceToSubstation, AmenityCategory::Substation),
];

/// Builds feature vectors, resolving linked amenities through a store.
pub struct FeatureExtractor<'a, S: AmenityStore> {
    amenities: &'a S,
}

impl<'a, S: AmenityStore> FeatureExtractor<'a, S> {
    /// Creates an extractor reading amenities from `amenities`.
    #[must_use]
    pub const fn new(amenities: &'a S) -> Self {
        Self { amenities }
    }

    /// Feature vector of `location`.
    ///
    /// Distances come from the stored links. A missing link, or a link
    /// whose amenity no longer exists, gives a missing value. `BROADBAND`
    /// is 1.0 when the linked postcode has any 30 Mbit/s coverage and 0.0
    /// otherwise. `COVERAGE BY GREENBELT` is never supplied.
    #[must_use]
    pub fn extract(&self, location: &Location) -> FeatureVector {
        let mut features = FeatureVector::new().with(Criterion::Area, location.estimated_floor_space);

        for (criterion, category) in DISTANCE_FEATURES {
            let distance = self
                .linked_amenity(location, *category)
                .and_then(|_| location.nearest_distance(*category));
            features.set(*criterion, distance);
        }

        let fast = matches!(
            self.linked_amenity(location, AmenityCategory::Broadband),
            Some(Amenity::Broadband(broadband)) if broadband.is_fast()
        );
        features.set(Criterion::Broadband, Some(if fast { 1.0 } else { 0.0 }));

        features
    }

    fn linked_amenity(&self, location: &Location, category: AmenityCategory) -> Option<Amenity> {
        let key = location.nearest(category)?.amenity_key.as_deref()?;
        match self.amenities.amenity(category, key) {
            Ok(Some(amenity)) => Some(amenity),
            Ok(None) => {
                log::warn!(
                    "Location {} links to missing {category} {key}",
                    location.uprn
                );
                None
            }
            Err(e) => {
                log::warn!(
                    "Failed to look up {category} {key} for location {}: {e}",
                    location.uprn
                );
                None
            }
        }
    }
}
