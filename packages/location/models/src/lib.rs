#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Land parcel types and the reference data attached to them.
//!
//! A [`Location`] is a candidate land parcel. Besides its own geometry and
//! attributes it carries one denormalized [`NearestLink`] per amenity
//! category, kept current by the proximity maintainer, and a greenbelt
//! overlap flag.

use std::collections::BTreeMap;

use geo::{Centroid, Intersects, MultiPolygon, Point};
use land_availability_amenity_models::{AmenityCategory, AmenityId};
use serde::{Deserialize, Serialize};

/// The nearest amenity of one category, as last computed for a location.
///
/// A link whose amenity was deleted is kept as `(None, 0.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestLink {
    /// Natural key of the linked amenity, `None` once cleared.
    pub amenity_key: Option<String>,
    /// Distance in meters between the amenity and the parcel geometry.
    pub distance_m: f64,
}

impl NearestLink {
    /// A link to `amenity_key` at `distance_m`.
    #[must_use]
    pub fn to(amenity_key: impl Into<String>, distance_m: f64) -> Self {
        Self {
            amenity_key: Some(amenity_key.into()),
            distance_m,
        }
    }

    /// A cleared link.
    #[must_use]
    pub const fn cleared() -> Self {
        Self {
            amenity_key: None,
            distance_m: 0.0,
        }
    }

    /// Whether this link still references an amenity.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.amenity_key.is_some()
    }
}

/// Error returned when a parcel geometry has no usable representative
/// point (an empty multi-polygon).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyGeometryError {
    /// Parcel key of the rejected location.
    pub uprn: String,
}

impl std::fmt::Display for EmptyGeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "location {} has an empty geometry", self.uprn)
    }
}

impl std::error::Error for EmptyGeometryError {}

/// A candidate land parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique parcel key.
    pub uprn: String,
    /// Parcel name or address description.
    pub name: Option<String>,
    /// Local authority.
    pub authority: Option<String>,
    /// Land owner.
    pub owner: Option<String>,
    /// Owner's asset identifier.
    pub unique_asset_id: Option<String>,
    /// Parcel boundary.
    pub geometry: MultiPolygon<f64>,
    /// Representative point (see [`representative_point`]).
    pub point: Point<f64>,
    /// Estimated floor area in square meters.
    pub estimated_floor_space: Option<f64>,
    /// Whether the parcel intersects any green belt area.
    #[serde(default)]
    pub greenbelt_overlap: bool,
    /// Nearest amenity per category.
    #[serde(default)]
    pub nearest: BTreeMap<AmenityCategory, NearestLink>,
}

impl Location {
    /// Creates a location with no links from a parcel key and boundary.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyGeometryError`] if the boundary has no polygons.
    pub fn new(
        uprn: impl Into<String>,
        geometry: MultiPolygon<f64>,
    ) -> Result<Self, EmptyGeometryError> {
        let uprn = uprn.into();
        let Some(point) = representative_point(&geometry) else {
            return Err(EmptyGeometryError { uprn });
        };

        Ok(Self {
            uprn,
            name: None,
            authority: None,
            owner: None,
            unique_asset_id: None,
            geometry,
            point,
            estimated_floor_space: None,
            greenbelt_overlap: false,
            nearest: BTreeMap::new(),
        })
    }

    /// The active nearest link for `category`, ignoring cleared links.
    #[must_use]
    pub fn nearest(&self, category: AmenityCategory) -> Option<&NearestLink> {
        self.nearest.get(&category).filter(|link| link.is_active())
    }

    /// Distance to the nearest amenity of `category`, if linked.
    #[must_use]
    pub fn nearest_distance(&self, category: AmenityCategory) -> Option<f64> {
        self.nearest(category).map(|link| link.distance_m)
    }

    /// Points the `category` link at `amenity_key`.
    pub fn set_nearest(
        &mut self,
        category: AmenityCategory,
        amenity_key: impl Into<String>,
        distance_m: f64,
    ) {
        self.nearest
            .insert(category, NearestLink::to(amenity_key, distance_m));
    }

    /// Clears the `category` link to `(None, 0.0)`.
    pub fn clear_nearest(&mut self, category: AmenityCategory) {
        self.nearest.insert(category, NearestLink::cleared());
    }

    /// Whether the link for the amenity's category references it.
    #[must_use]
    pub fn links_to(&self, amenity: &AmenityId) -> bool {
        self.nearest(amenity.category)
            .and_then(|link| link.amenity_key.as_deref())
            == Some(amenity.key.as_str())
    }
}

/// Input for creating or refreshing a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDraft {
    /// Unique parcel key.
    pub uprn: String,
    /// Parcel name or address description.
    pub name: Option<String>,
    /// Local authority.
    pub authority: Option<String>,
    /// Land owner.
    pub owner: Option<String>,
    /// Owner's asset identifier.
    pub unique_asset_id: Option<String>,
    /// Parcel boundary.
    pub geometry: MultiPolygon<f64>,
    /// Estimated floor area in square meters.
    pub estimated_floor_space: Option<f64>,
}

impl LocationDraft {
    /// Copies the draft's attributes and geometry onto `location`.
    ///
    /// Nearest links and the greenbelt flag are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyGeometryError`] if the draft boundary is empty.
    pub fn apply_to(&self, location: &mut Location) -> Result<(), EmptyGeometryError> {
        let point = representative_point(&self.geometry).ok_or_else(|| EmptyGeometryError {
            uprn: self.uprn.clone(),
        })?;
        location.name.clone_from(&self.name);
        location.authority.clone_from(&self.authority);
        location.owner.clone_from(&self.owner);
        location.unique_asset_id.clone_from(&self.unique_asset_id);
        location.geometry.clone_from(&self.geometry);
        location.point = point;
        location.estimated_floor_space = self.estimated_floor_space;
        Ok(())
    }

    /// Builds a new, unlinked location from the draft.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyGeometryError`] if the draft boundary is empty.
    pub fn into_location(self) -> Result<Location, EmptyGeometryError> {
        let mut location = Location::new(self.uprn.clone(), self.geometry.clone())?;
        self.apply_to(&mut location)?;
        Ok(location)
    }
}

/// Picks a point that represents a parcel.
///
/// Uses the centroid when it lies on the parcel. Concave parcels (L and C
/// shapes) can have their centroid outside the boundary; those fall back
/// to the first exterior vertex. Returns `None` for an empty geometry.
#[must_use]
pub fn representative_point(geometry: &MultiPolygon<f64>) -> Option<Point<f64>> {
    let fallback = geometry
        .0
        .first()
        .and_then(|polygon| polygon.exterior().0.first())
        .map(|coord| Point::from(*coord));

    match geometry.centroid() {
        Some(centroid) if geometry.intersects(&centroid) => Some(centroid),
        _ => fallback,
    }
}

/// Normalizes a UK postcode for storage and lookup: trims, drops all
/// whitespace and uppercases (`" aa1 1zz "` becomes `"AA11ZZ"`).
#[must_use]
pub fn normalize_postcode(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// A postcode centroid from the Code-Point dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodePoint {
    /// Normalized postcode (natural key).
    pub postcode: String,
    /// Positional quality indicator.
    pub quality: Option<i32>,
    /// Postcode centroid.
    pub point: Point<f64>,
    /// Country code.
    pub country: Option<String>,
    /// NHS region code.
    pub nhs_region: Option<String>,
    /// NHS health authority code.
    pub nhs_health_authority: Option<String>,
    /// County code.
    pub county: Option<String>,
    /// District code.
    pub district: Option<String>,
    /// Ward code.
    pub ward: Option<String>,
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Unique property reference number (natural key).
    pub uprn: String,
    /// First address line.
    pub address_line_1: Option<String>,
    /// Second address line.
    pub address_line_2: Option<String>,
    /// Third address line.
    pub address_line_3: Option<String>,
    /// Post town.
    pub city: Option<String>,
    /// County.
    pub county: Option<String>,
    /// Normalized postcode.
    pub postcode: Option<String>,
    /// Country code.
    pub country_code: Option<String>,
    /// Address position.
    pub point: Point<f64>,
}
