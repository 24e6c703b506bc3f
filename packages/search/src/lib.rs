#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query boundary for location searches.
//!
//! Raw parameters ([`SearchParams`]) are validated once into a typed
//! [`LocationSearch`]; everything past this point assumes valid input.

pub mod page;
pub mod params;

use geo::{MultiPolygon, Point};
use land_availability_location_models::Location;
use land_availability_ranking::SchoolRequirement;
use serde::{Deserialize, Serialize};

pub use page::Page;
pub use params::{SearchLimits, SearchParams};

/// Errors raised while validating or resolving a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A parameter could not be parsed or is out of range.
    #[error("Invalid {field}: {message}")]
    InvalidParameter {
        /// Name of the offending parameter.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// Neither a point, a postcode nor a polygon was given.
    #[error("A point, postcode or polygon is required")]
    MissingFilter,

    /// The postcode has no code point.
    #[error("Unknown postcode: {postcode}")]
    UnknownPostcode {
        /// The normalized postcode.
        postcode: String,
    },
}

/// Where a radius search is centred.
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    /// A point in the projected CRS.
    Point(Point<f64>),
    /// A normalized postcode, resolved through the code point table.
    Postcode(String),
}

/// How candidate locations are selected.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialFilter {
    /// Locations within `radius_m` of the origin, closest first.
    Around {
        /// Centre of the search.
        origin: Origin,
        /// Search radius in meters.
        radius_m: f64,
    },
    /// Locations intersecting an area, ordered by parcel key.
    Within(MultiPolygon<f64>),
}

/// A validated location search.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSearch {
    /// Candidate selection.
    pub filter: SpatialFilter,
    /// Rank candidates for this school, if given.
    pub ranking: Option<SchoolRequirement>,
    /// 1-based page number.
    pub page: usize,
    /// Results per page.
    pub page_size: usize,
}

/// A location returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The matching location.
    pub location: Location,
    /// Distance from the search origin, for radius searches.
    pub distance_m: Option<f64>,
    /// Suitability score, for ranked searches.
    pub score: Option<f64>,
    /// Whether the site area fits the school, for ranked searches.
    pub area_suitable: Option<bool>,
}

/// The requested page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// The hits on this page, in result order.
    pub page: Page<SearchHit>,
    /// Lower site requirement used for ranking.
    pub lower_site_req: Option<f64>,
    /// Upper site requirement used for ranking.
    pub upper_site_req: Option<f64>,
}
