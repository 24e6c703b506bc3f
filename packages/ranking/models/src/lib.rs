#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Types shared by the feature extractor and the ranking engine.
//!
//! Criterion names use the upper-case labels of the land attribute feed
//! (`"DISTANCE TO BUS STOP"`), so feature rows exported from elsewhere can
//! be ranked without renaming.

use std::collections::BTreeMap;

use land_availability_amenity_models::{SchoolType, numeric};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A named feature of a candidate location.
///
/// `Area` is an input to the `AreaSuitable` flag rather than a scored
/// column of its own.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Criterion {
    /// Estimated floor area in square meters.
    #[serde(rename = "AREA")]
    #[strum(serialize = "AREA")]
    Area,
    /// Whether the area falls inside the site requirement bounds.
    #[serde(rename = "area_suitable")]
    #[strum(serialize = "area_suitable")]
    AreaSuitable,
    /// Fast broadband flag.
    #[serde(rename = "BROADBAND")]
    #[strum(serialize = "BROADBAND")]
    Broadband,
    /// Green belt coverage.
    #[serde(rename = "COVERAGE BY GREENBELT")]
    #[strum(serialize = "COVERAGE BY GREENBELT")]
    CoverageByGreenbelt,
    #[serde(rename = "DISTANCE TO BUS STOP")]
    #[strum(serialize = "DISTANCE TO BUS STOP")]
    DistanceToBusStop,
    #[serde(rename = "DISTANCE TO METRO STATION")]
    #[strum(serialize = "DISTANCE TO METRO STATION")]
    DistanceToMetroStation,
    #[serde(rename = "DISTANCE TO MOTORWAY JUNCTION")]
    #[strum(serialize = "DISTANCE TO MOTORWAY JUNCTION")]
    DistanceToMotorwayJunction,
    #[serde(rename = "DISTANCE TO OVERHEAD LINE")]
    #[strum(serialize = "DISTANCE TO OVERHEAD LINE")]
    DistanceToOverheadLine,
    #[serde(rename = "DISTANCE TO PRIMARY SCHOOL")]
    #[strum(serialize = "DISTANCE TO PRIMARY SCHOOL")]
    DistanceToPrimarySchool,
    #[serde(rename = "DISTANCE TO RAIL STATION")]
    #[strum(serialize = "DISTANCE TO RAIL STATION")]
    DistanceToRailStation,
    #[serde(rename = "DISTANCE TO SECONDARY SCHOOL")]
    #[strum(serialize = "DISTANCE TO SECONDARY SCHOOL")]
    DistanceToSecondarySchool,
    #[serde(rename = "DISTANCE TO SUBSTATION")]
    #[strum(serialize = "DISTANCE TO SUBSTATION")]
    DistanceToSubstation,
}

impl Criterion {
    /// The columns a candidate is scored on, in score order.
    #[must_use]
    pub const fn scoring() -> &'static [Self] {
        &[
            Self::AreaSuitable,
            Self::Broadband,
            Self::CoverageByGreenbelt,
            Self::DistanceToBusStop,
            Self::DistanceToMetroStation,
            Self::DistanceToMotorwayJunction,
            Self::DistanceToOverheadLine,
            Self::DistanceToPrimarySchool,
            Self::DistanceToRailStation,
            Self::DistanceToSecondarySchool,
            Self::DistanceToSubstation,
        ]
    }

    /// The distance criterion for schools of `school_type`.
    #[must_use]
    pub const fn school_distance(school_type: SchoolType) -> Self {
        match school_type {
            SchoolType::Primary => Self::DistanceToPrimarySchool,
            SchoolType::Secondary => Self::DistanceToSecondarySchool,
        }
    }
}

/// A feature value that may arrive as a number or a numeric string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(transparent)]
pub struct LenientValue(
    #[serde(deserialize_with = "numeric::deserialize_lenient_f64")] pub Option<f64>,
);

/// Feature values of one candidate. Absent criteria are missing values,
/// which are distinct from zero.
///
/// Deserializes from a map of criterion labels to numbers or numeric
/// strings. Unknown labels are ignored and unparseable values are treated
/// as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, LenientValue>",
    into = "BTreeMap<Criterion, f64>"
)]
pub struct FeatureVector {
    values: BTreeMap<Criterion, f64>,
}

impl FeatureVector {
    /// An empty vector (every criterion missing).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `criterion`, `None` when missing.
    #[must_use]
    pub fn get(&self, criterion: Criterion) -> Option<f64> {
        self.values.get(&criterion).copied()
    }

    /// Sets `criterion`, or marks it missing when `value` is `None` or not
    /// finite.
    pub fn set(&mut self, criterion: Criterion, value: Option<f64>) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                self.values.insert(criterion, v);
            }
            None => {
                self.values.remove(&criterion);
            }
        }
    }

    /// Builder form of [`Self::set`].
    #[must_use]
    pub fn with(mut self, criterion: Criterion, value: Option<f64>) -> Self {
        self.set(criterion, value);
        self
    }

    /// Iterates over the present values.
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, f64)> + '_ {
        self.values.iter().map(|(c, v)| (*c, *v))
    }
}

impl From<BTreeMap<String, LenientValue>> for FeatureVector {
    fn from(raw: BTreeMap<String, LenientValue>) -> Self {
        let mut features = Self::new();
        for (label, LenientValue(value)) in raw {
            if let Ok(criterion) = label.parse::<Criterion>() {
                features.set(criterion, value);
            }
        }
        features
    }
}

impl From<FeatureVector> for BTreeMap<Criterion, f64> {
    fn from(features: FeatureVector) -> Self {
        features.values
    }
}

/// Site-size bounds and target school type for one ranking call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingQuery {
    /// Exclusive lower bound on `AREA`, in square meters.
    pub lower_site_req: f64,
    /// Exclusive upper bound on `AREA`, in square meters.
    pub upper_site_req: f64,
    /// The kind of school being sited.
    pub school_type: SchoolType,
}

impl RankingQuery {
    /// Whether `area` lies strictly between the bounds. A missing area is
    /// never suitable.
    #[must_use]
    pub fn is_area_suitable(&self, area: Option<f64>) -> bool {
        area.is_some_and(|a| self.lower_site_req < a && a < self.upper_site_req)
    }
}

/// Score of one candidate, in input order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Euclidean norm of the normalized criteria. Higher is better.
    pub score: f64,
    /// Whether the candidate's area fits the site requirement.
    pub area_suitable: bool,
}

/// A scored candidate in rank order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Position of the candidate in the input.
    pub index: usize,
    /// Euclidean norm of the normalized criteria.
    pub score: f64,
    /// Whether the candidate's area fits the site requirement.
    pub area_suitable: bool,
}

/// Output of a ranking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Lower site requirement used for `area_suitable`.
    pub lower_site_req: f64,
    /// Upper site requirement used for `area_suitable`.
    pub upper_site_req: f64,
    /// Candidates, best first.
    pub candidates: Vec<RankedCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criterion_labels_round_trip() {
        for criterion in Criterion::scoring() {
            let parsed: Criterion = criterion.to_string().parse().unwrap();
            assert_eq!(parsed, *criterion);
        }
        assert_eq!(
            Criterion::DistanceToMotorwayJunction.to_string(),
            "DISTANCE TO MOTORWAY JUNCTION"
        );
        assert_eq!(Criterion::scoring().len(), 11);
        assert!(!Criterion::scoring().contains(&Criterion::Area));
    }

    #[test]
    fn feature_vector_reads_numeric_strings() {
        let features: FeatureVector = serde_json::from_str(
            r#"{
                "AREA": 8711.73,
                "BROADBAND": "67",
                "DISTANCE TO BUS STOP": 2.07,
                "FLOORSPACE": 8711.73,
                "DISTANCE TO SUBSTATION": "n/a"
            }"#,
        )
        .unwrap();

        assert_eq!(features.get(Criterion::Broadband), Some(67.0));
        assert_eq!(features.get(Criterion::Area), Some(8711.73));
        assert_eq!(features.get(Criterion::DistanceToSubstation), None);
        assert_eq!(features.get(Criterion::CoverageByGreenbelt), None);
        assert_eq!(features.iter().count(), 3);
    }

    #[test]
    fn non_finite_values_are_missing() {
        let features = FeatureVector::new()
            .with(Criterion::Area, Some(f64::NAN))
            .with(Criterion::Broadband, Some(1.0));
        assert_eq!(features.get(Criterion::Area), None);
        assert_eq!(features.get(Criterion::Broadband), Some(1.0));
    }

    #[test]
    fn area_suitability_is_strict() {
        let query = RankingQuery {
            lower_site_req: 332.5,
            upper_site_req: 525.0,
            school_type: SchoolType::Primary,
        };
        assert!(query.is_area_suitable(Some(400.0)));
        assert!(!query.is_area_suitable(Some(332.5)));
        assert!(!query.is_area_suitable(Some(525.0)));
        assert!(!query.is_area_suitable(None));
    }
}
