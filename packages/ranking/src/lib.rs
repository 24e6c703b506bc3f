#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ranking of land parcels for a "build a school" query.
//!
//! [`features::FeatureExtractor`] turns locations into feature vectors,
//! [`site_size`] derives the acceptable site area from the pupil numbers
//! and [`engine`] normalizes and scores the vectors against a
//! [`criteria::ScoringCriteria`] table.

pub mod criteria;
pub mod engine;
pub mod features;
pub mod site_size;

use land_availability_amenity_models::SchoolType;
use land_availability_ranking_models::{FeatureVector, Ranking, RankingQuery};

pub use criteria::{Ideal, ScoringCriteria};
pub use engine::{rank, score_candidates};
pub use features::FeatureExtractor;
pub use site_size::{area_per_pupil, school_site_size, school_site_size_range};

/// Pupil numbers and school type of a school to be sited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchoolRequirement {
    /// The kind of school.
    pub school_type: SchoolType,
    /// Total pupils, including post-16.
    pub pupils: u32,
    /// Sixth form pupils.
    pub post16: u32,
}

impl SchoolRequirement {
    /// The ranking query for this school: its site-size bounds and type.
    #[must_use]
    pub fn query(&self) -> RankingQuery {
        let (lower_site_req, upper_site_req) =
            school_site_size_range(self.pupils, self.post16, self.school_type);
        RankingQuery {
            lower_site_req,
            upper_site_req,
            school_type: self.school_type,
        }
    }
}

/// Ranks candidates for `requirement` with the default criteria table for
/// its school type.
#[must_use]
pub fn rank_school_sites(features: &[FeatureVector], requirement: &SchoolRequirement) -> Ranking {
    rank(
        features,
        &requirement.query(),
        &ScoringCriteria::for_school_type(requirement.school_type),
    )
}
