//! Scene filter predicate shared by discovery queries and harvest runs.
//!
//! Every dimension is evaluated independently. A dimension that cannot be
//! evaluated, because either side lacks the value or the value does not parse,
//! is skipped and never blocks a match.

use chrono::DateTime;
use serde::Serialize;

use crate::models::Feature;

/// Constraint dimensions checked by the predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    CloudCover,
    BitDepth,
    RelevanceScore,
    AcquiredDate,
    Bands,
    BoundingBox,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::CloudCover,
        Dimension::BitDepth,
        Dimension::RelevanceScore,
        Dimension::AcquiredDate,
        Dimension::Bands,
        Dimension::BoundingBox,
    ];
}

/// Outcome of a single dimension check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    Pass,
    Fail,
    /// Unset or unparsable on either side
    Skipped,
}

/// Per-dimension verdicts for one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterReport {
    pub verdicts: Vec<(Dimension, Verdict)>,
}

impl FilterReport {
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|(_, v)| *v != Verdict::Fail)
    }

    pub fn verdict(&self, dimension: Dimension) -> Verdict {
        self.verdicts
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, v)| *v)
            .unwrap_or(Verdict::Skipped)
    }

    /// Dimensions that rejected the candidate
    pub fn failures(&self) -> Vec<Dimension> {
        self.verdicts.iter().filter(|(_, v)| *v == Verdict::Fail).map(|(d, _)| *d).collect()
    }
}

/// Decide whether `candidate` satisfies `constraint`
///
/// A missing constraint matches everything.
pub fn matches(candidate: &Feature, constraint: Option<&Feature>) -> bool {
    match constraint {
        None => true,
        Some(constraint) => Dimension::ALL
            .iter()
            .all(|dimension| check(*dimension, candidate, constraint) != Verdict::Fail),
    }
}

/// Evaluate every dimension and report the individual verdicts
pub fn explain(candidate: &Feature, constraint: &Feature) -> FilterReport {
    FilterReport {
        verdicts: Dimension::ALL
            .iter()
            .map(|dimension| (*dimension, check(*dimension, candidate, constraint)))
            .collect(),
    }
}

fn check(dimension: Dimension, candidate: &Feature, constraint: &Feature) -> Verdict {
    match dimension {
        Dimension::CloudCover => {
            compare(candidate.cloud_cover(), constraint.cloud_cover(), |c, t| c <= t)
        }
        Dimension::BitDepth => {
            compare(candidate.bit_depth(), constraint.bit_depth(), |c, t| c >= t)
        }
        Dimension::RelevanceScore => {
            compare(candidate.relevance_score(), constraint.relevance_score(), |c, t| c >= t)
        }
        Dimension::AcquiredDate => check_acquired_date(candidate, constraint),
        Dimension::Bands => check_bands(candidate, constraint),
        Dimension::BoundingBox => match (candidate.bbox, constraint.bbox) {
            (Some(candidate_box), Some(constraint_box)) => {
                verdict(constraint_box.overlaps(&candidate_box))
            }
            _ => Verdict::Skipped,
        },
    }
}

fn compare<T>(candidate: Option<T>, constraint: Option<T>, pass: impl Fn(T, T) -> bool) -> Verdict {
    match (candidate, constraint) {
        (Some(c), Some(t)) => verdict(pass(c, t)),
        _ => Verdict::Skipped,
    }
}

fn check_acquired_date(candidate: &Feature, constraint: &Feature) -> Verdict {
    let (Some(candidate_date), Some(constraint_date)) =
        (candidate.acquired_date(), constraint.acquired_date())
    else {
        return Verdict::Skipped;
    };

    match (
        DateTime::parse_from_rfc3339(candidate_date),
        DateTime::parse_from_rfc3339(constraint_date),
    ) {
        (Ok(c), Ok(t)) => verdict(c >= t),
        _ => Verdict::Skipped,
    }
}

fn check_bands(candidate: &Feature, constraint: &Feature) -> Verdict {
    let Some(required) = constraint.bands().filter(|b| !b.is_empty()) else {
        return Verdict::Skipped;
    };
    let Some(available) = candidate.bands() else {
        return Verdict::Skipped;
    };
    verdict(required.names().iter().all(|band| available.contains(band)))
}

fn verdict(pass: bool) -> Verdict {
    if pass {
        Verdict::Pass
    } else {
        Verdict::Fail
    }
}
