//! Normalization and scoring of candidate feature vectors.
//!
//! Each scored criterion is a column over all candidates. Columns are
//! min-max rescaled over their present values, flipped where the ideal
//! value is 0, and missing values then count as 0. A candidate's score is
//! the Euclidean norm of its row.

use std::collections::BTreeSet;

use land_availability_ranking_models::{
    CandidateScore, Criterion, FeatureVector, RankedCandidate, Ranking, RankingQuery,
};

use crate::criteria::{Ideal, ScoringCriteria};

/// Divisor used when every present value in a column is equal.
const FLAT_COLUMN_RANGE: f64 = 0.1;

/// Scores each candidate, in input order.
///
/// # Panics
///
/// Panics if `criteria` does not declare an ideal value for exactly the
/// scored criteria.
#[must_use]
pub fn score_candidates(
    features: &[FeatureVector],
    query: &RankingQuery,
    criteria: &ScoringCriteria,
) -> Vec<CandidateScore> {
    let area_suitable: Vec<bool> = features
        .iter()
        .map(|f| query.is_area_suitable(f.get(Criterion::Area)))
        .collect();

    let declared: BTreeSet<Criterion> = criteria.criteria().collect();
    let scored: BTreeSet<Criterion> = Criterion::scoring().iter().copied().collect();
    assert!(
        declared == scored,
        "Scoring criteria mismatch: missing ideal values for {:?}, unexpected {:?}",
        scored.difference(&declared).collect::<Vec<_>>(),
        declared.difference(&scored).collect::<Vec<_>>(),
    );

    let mut sums = vec![0.0f64; features.len()];

    for criterion in Criterion::scoring() {
        let column: Vec<Option<f64>> = if *criterion == Criterion::AreaSuitable {
            area_suitable
                .iter()
                .map(|suitable| Some(if *suitable { 1.0 } else { 0.0 }))
                .collect()
        } else {
            features.iter().map(|f| f.get(*criterion)).collect()
        };

        let mut column = rescale(&column);
        if criteria.ideal(*criterion) == Some(Ideal::Zero) {
            column = column.into_iter().map(|v| v.map(flip)).collect();
        }

        for (sum, value) in sums.iter_mut().zip(column) {
            let value = value.unwrap_or(0.0);
            *sum += value * value;
        }
    }

    sums.into_iter()
        .zip(area_suitable)
        .map(|(sum, area_suitable)| CandidateScore {
            score: sum.sqrt(),
            area_suitable,
        })
        .collect()
}

/// Scores and sorts candidates, best first. Equal scores keep input order.
///
/// # Panics
///
/// Panics if `criteria` does not declare an ideal value for exactly the
/// scored criteria.
#[must_use]
pub fn rank(
    features: &[FeatureVector],
    query: &RankingQuery,
    criteria: &ScoringCriteria,
) -> Ranking {
    let mut candidates: Vec<RankedCandidate> = score_candidates(features, query, criteria)
        .into_iter()
        .enumerate()
        .map(|(index, scored)| RankedCandidate {
            index,
            score: scored.score,
            area_suitable: scored.area_suitable,
        })
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    log::debug!(
        "Ranked {} candidate(s) for a {} site of {:.1}-{:.1}m2",
        candidates.len(),
        query.school_type,
        query.lower_site_req,
        query.upper_site_req
    );

    Ranking {
        lower_site_req: query.lower_site_req,
        upper_site_req: query.upper_site_req,
        candidates,
    }
}

/// Rescales present values to `[0, 1]`: the column minimum maps to 0 and
/// the maximum to 1. A column with a single distinct value maps to 0.
/// Missing values stay missing.
#[must_use]
pub fn rescale(column: &[Option<f64>]) -> Vec<Option<f64>> {
    let present = column.iter().flatten().copied();
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    #[allow(clippy::float_cmp)]
    let range = if max == min { FLAT_COLUMN_RANGE } else { max - min };

    column
        .iter()
        .map(|value| value.map(|v| (v - min) / range))
        .collect()
}

/// Turns a rescaled "lower is better" value into "higher is better".
#[must_use]
pub fn flip(value: f64) -> f64 {
    1.0 - value
}
