//! # Aggregator
//!
//! Combines stage scores into the overall score and classifies scores into
//! status bands.
//!
//! ## Overall score
//!
//! ```text
//! overall = round(exp(mean(ln(max(score, 1)))))
//! ```
//!
//! The geometric mean rewards balance: a brand strong in two stages and
//! near zero in four scores far lower than its arithmetic mean. Each score
//! is floored to 1 so a single zero stage does not force the product to 0.
//!
//! ## Status bands
//!
//! | Overall | Stage | Score |
//! |---------|-------|-------|
//! | DOMINANT | Optimal | >= 80 |
//! | ESTABLISHED | Healthy | >= 60 |
//! | VULNERABLE | At-Risk | >= 40 |
//! | FRAGILE | Impaired | >= 20 |
//! | DORMANT | Impaired | < 20 |
//!
//! Bands depend on the score alone: no hysteresis, no history.

use crate::scorer::StageScores;
use crate::{Score, ScoreError, StageId};
use serde::{Deserialize, Serialize};

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Lower bound of DOMINANT / Optimal.
pub const DOMINANT_THRESHOLD: u8 = 80;

/// Lower bound of ESTABLISHED / Healthy.
pub const ESTABLISHED_THRESHOLD: u8 = 60;

/// Lower bound of VULNERABLE / At-Risk.
pub const VULNERABLE_THRESHOLD: u8 = 40;

/// Lower bound of FRAGILE.
pub const FRAGILE_THRESHOLD: u8 = 20;

// =============================================================================
// STATUS BANDS
// =============================================================================

/// Status band of the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Dormant,
    Fragile,
    Vulnerable,
    Established,
    Dominant,
}

impl OverallStatus {
    /// Classify an overall score.
    #[must_use]
    pub fn from_score(score: Score) -> Self {
        match score.value() {
            s if s >= DOMINANT_THRESHOLD => OverallStatus::Dominant,
            s if s >= ESTABLISHED_THRESHOLD => OverallStatus::Established,
            s if s >= VULNERABLE_THRESHOLD => OverallStatus::Vulnerable,
            s if s >= FRAGILE_THRESHOLD => OverallStatus::Fragile,
            _ => OverallStatus::Dormant,
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            OverallStatus::Dominant => "DOMINANT",
            OverallStatus::Established => "ESTABLISHED",
            OverallStatus::Vulnerable => "VULNERABLE",
            OverallStatus::Fragile => "FRAGILE",
            OverallStatus::Dormant => "DORMANT",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Status band of a single stage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StageStatus {
    Impaired,
    #[serde(rename = "At-Risk")]
    AtRisk,
    Healthy,
    Optimal,
}

impl StageStatus {
    /// Classify a stage score.
    #[must_use]
    pub fn from_score(score: Score) -> Self {
        match score.value() {
            s if s >= DOMINANT_THRESHOLD => StageStatus::Optimal,
            s if s >= ESTABLISHED_THRESHOLD => StageStatus::Healthy,
            s if s >= VULNERABLE_THRESHOLD => StageStatus::AtRisk,
            _ => StageStatus::Impaired,
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            StageStatus::Optimal => "Optimal",
            StageStatus::Healthy => "Healthy",
            StageStatus::AtRisk => "At-Risk",
            StageStatus::Impaired => "Impaired",
        }
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

// =============================================================================
// AGGREGATION
// =============================================================================

/// Overall score with its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallScore {
    pub value: Score,
    pub status: OverallStatus,
}

impl OverallScore {
    /// Classify an overall score value.
    #[must_use]
    pub fn new(value: Score) -> Self {
        Self {
            value,
            status: OverallStatus::from_score(value),
        }
    }
}

/// One stage's score with its band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAssessment {
    pub stage: StageId,
    pub score: Score,
    pub status: StageStatus,
}

/// Overall score plus per-stage bands, in stage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub overall: OverallScore,
    pub stages: Vec<StageAssessment>,
}

/// Unrounded geometric mean of the scores, each floored to 1.
///
/// Logs are summed in ascending score order so the result does not depend
/// on the iteration order of the input. Returns `None` for no scores.
#[must_use]
pub fn geometric_mean(scores: &StageScores) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }

    let mut values: Vec<u8> = scores.iter().map(|s| s.score.value().max(1)).collect();
    values.sort_unstable();

    let log_sum: f64 = values.iter().map(|&v| f64::from(v).ln()).sum();
    Some((log_sum / values.len() as f64).exp())
}

/// Overall score of a set of stage scores.
///
/// # Errors
/// Returns `ScoreError::InvalidStageDefinition` if there are no stages.
pub fn overall_score(scores: &StageScores) -> Result<OverallScore, ScoreError> {
    let mean = geometric_mean(scores).ok_or_else(|| {
        ScoreError::definition(&StageId::new(""), "no stage scores to aggregate")
    })?;
    Ok(OverallScore::new(Score::from_f64(mean)))
}

/// Overall score plus per-stage status bands.
pub fn aggregate(scores: &StageScores) -> Result<Aggregate, ScoreError> {
    let overall = overall_score(scores)?;
    let stages = scores
        .iter()
        .map(|s| StageAssessment {
            stage: s.stage.clone(),
            score: s.score,
            status: StageStatus::from_score(s.score),
        })
        .collect();

    Ok(Aggregate { overall, stages })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[u8]) -> StageScores {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (StageId::new(format!("s{i}")), Score::from_f64(f64::from(v))))
            .collect()
    }

    fn score(v: u8) -> Score {
        Score::from_f64(f64::from(v))
    }

    #[test]
    fn six_stage_scenario() {
        let overall = overall_score(&scores(&[70, 60, 55, 45, 40, 65])).expect("overall");
        assert_eq!(overall.value.value(), 55);
        assert_eq!(overall.status, OverallStatus::Vulnerable);
    }

    #[test]
    fn geometric_mean_penalizes_imbalance() {
        // Arithmetic mean is 50.5; geometric mean is 10.
        let overall = overall_score(&scores(&[100, 100, 100, 1, 1, 1])).expect("overall");
        assert_eq!(overall.value.value(), 10);
    }

    #[test]
    fn zero_stage_floored_to_one() {
        let overall = overall_score(&scores(&[0, 100])).expect("overall");
        assert_eq!(overall.value.value(), 10);
    }

    #[test]
    fn empty_scores_rejected() {
        assert!(matches!(
            overall_score(&StageScores::new()),
            Err(ScoreError::InvalidStageDefinition { .. })
        ));
    }

    #[test]
    fn overall_bands_at_boundaries() {
        let cases = [
            (100, OverallStatus::Dominant),
            (80, OverallStatus::Dominant),
            (79, OverallStatus::Established),
            (60, OverallStatus::Established),
            (59, OverallStatus::Vulnerable),
            (40, OverallStatus::Vulnerable),
            (39, OverallStatus::Fragile),
            (20, OverallStatus::Fragile),
            (19, OverallStatus::Dormant),
            (0, OverallStatus::Dormant),
        ];
        for (value, expected) in cases {
            assert_eq!(OverallStatus::from_score(score(value)), expected, "score {value}");
        }
    }

    #[test]
    fn stage_bands_at_boundaries() {
        let cases = [
            (80, StageStatus::Optimal),
            (79, StageStatus::Healthy),
            (60, StageStatus::Healthy),
            (59, StageStatus::AtRisk),
            (40, StageStatus::AtRisk),
            (39, StageStatus::Impaired),
            (0, StageStatus::Impaired),
        ];
        for (value, expected) in cases {
            assert_eq!(StageStatus::from_score(score(value)), expected, "score {value}");
        }
    }

    #[test]
    fn labels_and_serialization() {
        assert_eq!(StageStatus::AtRisk.to_string(), "At-Risk");
        assert_eq!(
            serde_json::to_string(&StageStatus::AtRisk).expect("json"),
            "\"At-Risk\""
        );
        assert_eq!(
            serde_json::to_string(&OverallStatus::Established).expect("json"),
            "\"ESTABLISHED\""
        );
    }

    #[test]
    fn aggregate_keeps_stage_order() {
        let agg = aggregate(&scores(&[85, 30, 65])).expect("aggregate");
        let statuses: Vec<_> = agg.stages.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![StageStatus::Optimal, StageStatus::Impaired, StageStatus::Healthy]
        );
        assert_eq!(agg.stages[1].stage.as_str(), "s1");
    }
}
