//! # Comparator
//!
//! Per-stage gaps between a brand's stage scores and a reference vector,
//! plus the weakest-first priority view.
//!
//! - `gap = own - reference`
//! - advantage: `gap > 0`; vulnerability: `gap < 0`; `gap == 0` is neither
//! - a flat benchmark compares every stage against one explicit constant

use crate::scorer::{StageScore, StageScores};
use crate::{Score, ScoreError, StageId};
use serde::{Deserialize, Serialize};

/// Category benchmark the diagnostic tool compares against.
///
/// Callers pass it explicitly through [`ReferenceVector::benchmark`];
/// it is never applied by default.
pub const CATEGORY_BENCHMARK: u8 = 60;

// =============================================================================
// REFERENCE VECTOR
// =============================================================================

/// What a brand's stage scores are compared against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceVector {
    /// A named competitor's per-stage scores.
    Competitor { name: String, scores: StageScores },
    /// The same constant for every stage.
    Benchmark { score: Score },
}

impl ReferenceVector {
    /// Compare against a named competitor.
    #[must_use]
    pub fn competitor(name: impl Into<String>, scores: StageScores) -> Self {
        ReferenceVector::Competitor {
            name: name.into(),
            scores,
        }
    }

    /// Compare every stage against one constant.
    #[must_use]
    pub fn benchmark(score: Score) -> Self {
        ReferenceVector::Benchmark { score }
    }

    /// Human-readable name of the reference.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            ReferenceVector::Competitor { name, .. } => name.clone(),
            ReferenceVector::Benchmark { score } => format!("Benchmark ({})", score),
        }
    }

    /// Reference score for a stage.
    #[must_use]
    pub fn score_for(&self, stage: &StageId) -> Option<Score> {
        match self {
            ReferenceVector::Competitor { scores, .. } => scores.get(stage),
            ReferenceVector::Benchmark { score } => Some(*score),
        }
    }
}

// =============================================================================
// COMPARISON
// =============================================================================

/// Signed difference for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageGap {
    pub stage: StageId,
    pub own_score: Score,
    pub reference_score: Score,
    pub gap: i16,
}

impl StageGap {
    /// Own score is above the reference.
    #[must_use]
    pub fn is_advantage(&self) -> bool {
        self.gap > 0
    }

    /// Own score is below the reference.
    #[must_use]
    pub fn is_vulnerability(&self) -> bool {
        self.gap < 0
    }
}

/// Gap records in the order of the compared stage scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub reference: String,
    pub gaps: Vec<StageGap>,
}

impl Comparison {
    /// Stages where the brand leads.
    #[must_use]
    pub fn advantages(&self) -> Vec<&StageGap> {
        self.gaps.iter().filter(|g| g.is_advantage()).collect()
    }

    /// Stages where the brand trails.
    #[must_use]
    pub fn vulnerabilities(&self) -> Vec<&StageGap> {
        self.gaps.iter().filter(|g| g.is_vulnerability()).collect()
    }

    /// Sum of own scores.
    #[must_use]
    pub fn own_total(&self) -> i64 {
        self.gaps.iter().map(|g| i64::from(g.own_score.value())).sum()
    }

    /// Sum of reference scores.
    #[must_use]
    pub fn reference_total(&self) -> i64 {
        self.gaps
            .iter()
            .map(|g| i64::from(g.reference_score.value()))
            .sum()
    }

    /// Sum of gaps; equals `own_total - reference_total`.
    #[must_use]
    pub fn total_gap(&self) -> i64 {
        self.gaps.iter().map(|g| i64::from(g.gap)).sum()
    }
}

/// Compare stage scores against a reference vector.
///
/// # Errors
/// Returns `ScoreError::MissingReferenceStage` if a competitor vector has
/// no score for one of the compared stages.
pub fn compare(scores: &StageScores, reference: &ReferenceVector) -> Result<Comparison, ScoreError> {
    let gaps = scores
        .iter()
        .map(|own| -> Result<StageGap, ScoreError> {
            let reference_score = reference
                .score_for(&own.stage)
                .ok_or_else(|| ScoreError::MissingReferenceStage(own.stage.clone()))?;
            Ok(StageGap {
                stage: own.stage.clone(),
                own_score: own.score,
                reference_score,
                gap: i16::from(own.score.value()) - i16::from(reference_score.value()),
            })
        })
        .collect::<Result<Vec<_>, ScoreError>>()?;

    Ok(Comparison {
        reference: reference.label(),
        gaps,
    })
}

// =============================================================================
// PRIORITY ORDER
// =============================================================================

/// Stage scores weakest first.
///
/// Ties keep their original order (stable sort), never label order.
#[must_use]
pub fn priority_order(scores: &StageScores) -> Vec<StageScore> {
    let mut ordered: Vec<StageScore> = scores.iter().cloned().collect();
    ordered.sort_by_key(|s| s.score);
    ordered
}

/// The `limit` weakest stages.
#[must_use]
pub fn priority_stages(scores: &StageScores, limit: usize) -> Vec<StageScore> {
    let mut ordered = priority_order(scores);
    ordered.truncate(limit);
    ordered
}

// =============================================================================
// TESTS
// =============================================================================
