//! Ideal-value table for the scored criteria.
//!
//! After rescaling to `[0, 1]`, criteria whose ideal value is 0 are flipped
//! so that 1 always means "better".

use std::collections::BTreeMap;

use land_availability_amenity_models::SchoolType;
use land_availability_ranking_models::Criterion;

/// The ideal rescaled value of a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ideal {
    /// Lower is better; the column is flipped.
    Zero,
    /// Higher is better.
    One,
}

/// Ideal value per scored criterion, passed by value into each ranking call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringCriteria {
    ideals: BTreeMap<Criterion, Ideal>,
}

impl ScoringCriteria {
    /// The table for siting a school of `school_type`.
    ///
    /// Being close to schools of the type being built counts in a site's
    /// favour; being far from schools of the other type does too.
    #[must_use]
    pub fn for_school_type(school_type: SchoolType) -> Self {
        let matching = Criterion::school_distance(school_type);
        let other = Criterion::school_distance(match school_type {
            SchoolType::Primary => SchoolType::Secondary,
            SchoolType::Secondary => SchoolType::Primary,
        });

        Self::from_ideals([
            (Criterion::AreaSuitable, Ideal::One),
            (Criterion::Broadband, Ideal::One),
            (Criterion::CoverageByGreenbelt, Ideal::Zero),
            (Criterion::DistanceToBusStop, Ideal::Zero),
            (Criterion::DistanceToMetroStation, Ideal::Zero),
            (Criterion::DistanceToMotorwayJunction, Ideal::One),
            (Criterion::DistanceToOverheadLine, Ideal::One),
            (Criterion::DistanceToRailStation, Ideal::Zero),
            (Criterion::DistanceToSubstation, Ideal::One),
            (matching, Ideal::Zero),
            (other, Ideal::One),
        ])
    }

    /// Builds a table from explicit `(criterion, ideal)` pairs.
    #[must_use]
    pub fn from_ideals(ideals: impl IntoIterator<Item = (Criterion, Ideal)>) -> Self {
        Self {
            ideals: ideals.into_iter().collect(),
        }
    }

    /// The ideal value of `criterion`, if it is declared.
    #[must_use]
    pub fn ideal(&self, criterion: Criterion) -> Option<Ideal> {
        self.ideals.get(&criterion).copied()
    }

    /// Declared criteria, in order.
    pub fn criteria(&self) -> impl Iterator<Item = Criterion> + '_ {
        self.ideals.keys().copied()
    }
}
