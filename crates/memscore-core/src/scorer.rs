//! # Stage Scorer
//!
//! Computes one stage's 0-100 score from its raw metric values.
//!
//! ## Benchmark ratio
//!
//! ```text
//! signal   = clamp(0, 100, raw / benchmark * 100)          (normal)
//! signal   = clamp(0, 100, benchmark / max(raw, 1) * 100)  (inverted)
//! stage    = round( Σ weight_i * round(signal_i) / Σ weight_i )
//! ```
//!
//! Signal scores are rounded before averaging. With the create stage at
//! 58/65, 32/35, 22/25 this gives 89, 91, 88 and a stage score of 89
//! (averaging first would give 90).
//!
//! ## Weighted sum
//!
//! ```text
//! term     = raw / benchmark * 100        (normal)
//! term     = 100 - raw / benchmark * 100  (inverted)
//! amp      = 1 + (raw[amp.signal] - amp.reference) / 100   (or 1)
//! stage    = clamp(0, 100, round((offset + Σ weight_i * term_i) * amp))
//! ```

use crate::inputs::{MetricInputs, StageValues, validate_value};
use crate::schema::{Schema, ScoringStrategy, SignalDefinition, StageDefinition};
use crate::{Score, ScoreError, SignalKey, StageId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// STAGE SCORES
// =============================================================================

/// Score of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageScore {
    pub stage: StageId,
    pub score: Score,
}

/// Ordered mapping stage id → score.
///
/// Keeps insertion order (schema definition order when produced by
/// [`score_all`]); lookups are by id. Stage ids are unique, including in
/// deserialized data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<StageScore>", into = "Vec<StageScore>")]
pub struct StageScores(Vec<StageScore>);

impl StageScores {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a stage score. New stages are appended.
    pub fn insert(&mut self, stage: StageId, score: Score) {
        match self.0.iter_mut().find(|s| s.stage == stage) {
            Some(existing) => existing.score = score,
            None => self.0.push(StageScore { stage, score }),
        }
    }

    /// Score of a stage.
    #[must_use]
    pub fn get(&self, stage: &StageId) -> Option<Score> {
        self.0.iter().find(|s| &s.stage == stage).map(|s| s.score)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, StageScore> {
        self.0.iter()
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all scores.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.0.iter().map(|s| i64::from(s.score.value())).sum()
    }
}

impl FromIterator<(StageId, Score)> for StageScores {
    fn from_iter<I: IntoIterator<Item = (StageId, Score)>>(iter: I) -> Self {
        let mut scores = StageScores::new();
        for (stage, score) in iter {
            scores.insert(stage, score);
        }
        scores
    }
}

impl TryFrom<Vec<StageScore>> for StageScores {
    type Error = ScoreError;

    fn try_from(entries: Vec<StageScore>) -> Result<Self, Self::Error> {
        let mut seen = BTreeSet::new();
        for entry in &entries {
            if !seen.insert(&entry.stage) {
                return Err(ScoreError::definition(&entry.stage, "duplicate stage id"));
            }
        }
        Ok(Self(entries))
    }
}

impl From<StageScores> for Vec<StageScore> {
    fn from(scores: StageScores) -> Self {
        scores.0
    }
}

impl<'a> IntoIterator for &'a StageScores {
    type Item = &'a StageScore;
    type IntoIter = std::slice::Iter<'a, StageScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-signal breakdown entry: raw value and its score against benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalScore {
    pub key: SignalKey,
    pub raw: f64,
    pub benchmark: f64,
    pub inverted: bool,
    pub score: Score,
}

// =============================================================================
// SIGNAL SCORING
// =============================================================================

/// Unrounded score of one signal against its benchmark, in `[0, 100]`.
#[must_use]
pub fn signal_score(signal: &SignalDefinition, raw: f64) -> f64 {
    let ratio = if signal.inverted {
        signal.benchmark / raw.max(1.0)
    } else {
        raw / signal.benchmark
    };
    (ratio * 100.0).clamp(0.0, 100.0)
}

/// Term of a signal in a weighted sum (unclamped).
fn weighted_term(signal: &SignalDefinition, raw: f64) -> f64 {
    let normalized = raw / signal.benchmark * 100.0;
    if signal.inverted {
        100.0 - normalized
    } else {
        normalized
    }
}

/// Read and validate the raw values of a stage, in signal order.
fn read_values(stage: &StageDefinition, raw: &StageValues) -> Result<Vec<f64>, ScoreError> {
    if let Some(unknown) = raw.keys().find(|key| stage.signal(key).is_none()) {
        return Err(ScoreError::metric(&stage.id, unknown, "unknown signal"));
    }

    stage
        .signals
        .iter()
        .map(|signal| {
            let value = raw
                .get(&signal.key)
                .copied()
                .ok_or_else(|| ScoreError::metric(&stage.id, &signal.key, "missing value"))?;
            validate_value(&stage.id, signal, value)
        })
        .collect()
}

// =============================================================================
// STAGE SCORING
// =============================================================================

/// Score one stage.
///
/// Validates the stage definition first, so a malformed configuration
/// never produces a number.
///
/// # Errors
/// - `InvalidStageDefinition` if the stage definition is malformed
/// - `InvalidMetricValue` if a value is missing, not finite, negative,
///   outside its bounds, or keyed by an unknown signal
pub fn score_stage(stage: &StageDefinition, raw: &StageValues) -> Result<Score, ScoreError> {
    stage.validate()?;
    let values = read_values(stage, raw)?;

    let score = match &stage.strategy {
        ScoringStrategy::BenchmarkRatio => {
            let total_weight: f64 = stage.signals.iter().map(|s| s.weight).sum();
            let weighted: f64 = stage
                .signals
                .iter()
                .zip(&values)
                .map(|(signal, &value)| signal.weight * signal_score(signal, value).round())
                .sum();
            Score::from_f64(weighted / total_weight)
        }
        ScoringStrategy::WeightedSum {
            offset,
            amplification,
        } => {
            let sum: f64 = stage
                .signals
                .iter()
                .zip(&values)
                .map(|(signal, &value)| signal.weight * weighted_term(signal, value))
                .sum();

            let amp = amplification
                .as_ref()
                .and_then(|amp| {
                    let idx = stage.signals.iter().position(|s| s.key == amp.signal)?;
                    Some(amp.factor(values[idx]))
                })
                .unwrap_or(1.0);

            Score::from_f64((offset + sum) * amp)
        }
    };

    Ok(score)
}

/// Per-signal scores of a stage against their benchmarks.
///
/// Applies the same validation as [`score_stage`].
pub fn signal_breakdown(
    stage: &StageDefinition,
    raw: &StageValues,
) -> Result<Vec<SignalScore>, ScoreError> {
    stage.validate()?;
    let values = read_values(stage, raw)?;

    Ok(stage
        .signals
        .iter()
        .zip(values)
        .map(|(signal, value)| SignalScore {
            key: signal.key.clone(),
            raw: value,
            benchmark: signal.benchmark,
            inverted: signal.inverted,
            score: Score::from_f64(signal_score(signal, value)),
        })
        .collect())
}

/// Score every stage of a schema.
///
/// The result follows schema definition order.
///
/// # Errors
/// - `InvalidMetricValue` for any bad value, a stage missing from the
///   inputs (reported against its first signal), or an input stage id the
///   schema does not define
/// - `InvalidStageDefinition` if a stage definition is malformed
pub fn score_all(schema: &Schema, inputs: &MetricInputs) -> Result<StageScores, ScoreError> {
    if let Some(unknown) = inputs.stage_ids().find(|id| schema.stage(id).is_none()) {
        return Err(ScoreError::metric(
            unknown,
            &SignalKey::new("*"),
            "unknown stage",
        ));
    }

    let empty = BTreeMap::new();
    schema
        .stages()
        .iter()
        .map(|stage| -> Result<(StageId, Score), ScoreError> {
            let raw = inputs.stage(&stage.id).unwrap_or(&empty);
            Ok((stage.id.clone(), score_stage(stage, raw)?))
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
