//! # Decay Projector
//!
//! Extrapolates the overall score forward over a horizon of time offsets,
//! assuming no media reinforcement.
//!
//! ```text
//! projected(offset) = round(overall * retention(offset))
//! retention(offset) = (1 - rate) ^ offset        (geometric)
//!                   = schedule[offset]           (stepped)
//! ```
//!
//! `projected(0)` is always the overall score itself. Every point is
//! flagged when it falls below the VULNERABLE threshold, and the
//! projection reports the first offset where that happens.

use crate::aggregate::VULNERABLE_THRESHOLD;
use crate::{Score, ScoreError};
use serde::{Deserialize, Serialize};

/// Default decline per time unit (5% per week).
pub const DEFAULT_DECAY_RATE: f64 = 0.05;

/// Default horizon: now and every four weeks up to week sixteen.
pub const DEFAULT_HORIZON: [u32; 5] = [0, 4, 8, 12, 16];

// =============================================================================
// HORIZON
// =============================================================================

/// Validated, strictly ascending offsets starting at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u32>")]
pub struct Horizon(Vec<u32>);

impl Horizon {
    /// Build a horizon.
    ///
    /// A leading zero is inserted when absent.
    ///
    /// # Errors
    /// Returns `ScoreError::InvalidHorizon` if an offset is negative, too
    /// large, or the sequence is not strictly ascending.
    pub fn new(offsets: Vec<i64>) -> Result<Self, ScoreError> {
        let mut validated = Vec::with_capacity(offsets.len().saturating_add(1));

        for offset in offsets {
            if offset < 0 {
                return Err(ScoreError::InvalidHorizon(format!(
                    "negative offset {}",
                    offset
                )));
            }
            let offset = u32::try_from(offset).map_err(|_| {
                ScoreError::InvalidHorizon(format!("offset {} is too large", offset))
            })?;
            if let Some(&last) = validated.last() {
                if offset <= last {
                    return Err(ScoreError::InvalidHorizon(format!(
                        "offsets must be strictly ascending: {} follows {}",
                        offset, last
                    )));
                }
            }
            validated.push(offset);
        }

        if validated.first() != Some(&0) {
            validated.insert(0, 0);
        }

        Ok(Self(validated))
    }

    /// The offsets, ascending, starting at zero.
    #[must_use]
    pub fn offsets(&self) -> &[u32] {
        &self.0
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(DEFAULT_HORIZON.to_vec())
    }
}

impl TryFrom<Vec<i64>> for Horizon {
    type Error = ScoreError;

    fn try_from(offsets: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(offsets)
    }
}

impl From<Horizon> for Vec<u32> {
    fn from(horizon: Horizon) -> Self {
        horizon.0
    }
}

// =============================================================================
// DECAY MODEL
// =============================================================================

/// Retention factor at one offset of a stepped schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetentionStep {
    pub offset: u32,
    pub factor: f64,
}

/// How much of the score is retained at an offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecayModel {
    /// Constant multiplicative decline per time unit.
    Geometric { rate_per_unit: f64 },
    /// Explicit retention factor per offset. Offset 0 retains everything.
    Stepped { steps: Vec<RetentionStep> },
}

impl Default for DecayModel {
    fn default() -> Self {
        Self::geometric(DEFAULT_DECAY_RATE)
    }
}

impl DecayModel {
    /// Geometric model with the given rate.
    #[must_use]
    pub fn geometric(rate_per_unit: f64) -> Self {
        DecayModel::Geometric { rate_per_unit }
    }

    /// The irregular four-weekly schedule: 95%, 88%, 80%, 72%.
    #[must_use]
    pub fn irregular() -> Self {
        let steps = [(4, 0.95), (8, 0.88), (12, 0.80), (16, 0.72)]
            .into_iter()
            .map(|(offset, factor)| RetentionStep { offset, factor })
            .collect();
        DecayModel::Stepped { steps }
    }

    /// Check the model parameters.
    ///
    /// Rates and factors must be finite and within `[0, 1]`.
    pub fn validate(&self) -> Result<(), ScoreError> {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);

        match self {
            DecayModel::Geometric { rate_per_unit } => {
                if !in_unit(*rate_per_unit) {
                    return Err(ScoreError::InvalidHorizon(format!(
                        "decay rate must be within [0, 1], got {}",
                        rate_per_unit
                    )));
                }
            }
            DecayModel::Stepped { steps } => {
                if let Some(step) = steps.iter().find(|s| !in_unit(s.factor)) {
                    return Err(ScoreError::InvalidHorizon(format!(
                        "retention factor at offset {} must be within [0, 1], got {}",
                        step.offset, step.factor
                    )));
                }
            }
        }

        Ok(())
    }

    /// Retention factor at an offset.
    ///
    /// # Errors
    /// Returns `ScoreError::InvalidHorizon` if a stepped schedule has no
    /// factor for a non-zero offset.
    pub fn retention(&self, offset: u32) -> Result<f64, ScoreError> {
        if offset == 0 {
            return Ok(1.0);
        }

        match self {
            DecayModel::Geometric { rate_per_unit } => {
                Ok((1.0 - rate_per_unit).powf(f64::from(offset)))
            }
            DecayModel::Stepped { steps } => steps
                .iter()
                .find(|s| s.offset == offset)
                .map(|s| s.factor)
                .ok_or_else(|| {
                    ScoreError::InvalidHorizon(format!(
                        "no retention factor scheduled for offset {}",
                        offset
                    ))
                }),
        }
    }
}

/// How projected scores are rounded to integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionRounding {
    /// Half away from zero.
    #[default]
    Nearest,
    /// Ceiling.
    Up,
}

impl ProjectionRounding {
    fn apply(self, value: f64) -> Score {
        match self {
            ProjectionRounding::Nearest => Score::from_f64(value),
            ProjectionRounding::Up => Score::from_f64_ceil(value),
        }
    }
}

// =============================================================================
// PROJECTION
// =============================================================================

/// One projected point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayPoint {
    pub offset: u32,
    pub projected_score: Score,
    /// Projected score is below the VULNERABLE threshold.
    pub below_threshold: bool,
}

/// Projected scores in ascending offset order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayProjection {
    pub points: Vec<DecayPoint>,
    /// First offset whose projected score is below the threshold.
    pub first_below_threshold: Option<u32>,
}

impl DecayProjection {
    /// Whether any point falls below the VULNERABLE threshold.
    #[must_use]
    pub fn crosses_threshold(&self) -> bool {
        self.first_below_threshold.is_some()
    }

    /// Projected scores only, in offset order.
    #[must_use]
    pub fn scores(&self) -> Vec<u8> {
        self.points.iter().map(|p| p.projected_score.value()).collect()
    }
}

/// Project an overall score over a horizon with any decay model.
pub fn project(
    overall: Score,
    horizon: &Horizon,
    model: &DecayModel,
    rounding: ProjectionRounding,
) -> Result<DecayProjection, ScoreError> {
    model.validate()?;

    let points = horizon
        .offsets()
        .iter()
        .map(|&offset| -> Result<DecayPoint, ScoreError> {
            let projected_score = if offset == 0 {
                overall
            } else {
                rounding.apply(f64::from(overall.value()) * model.retention(offset)?)
            };
            Ok(DecayPoint {
                offset,
                projected_score,
                below_threshold: projected_score.value() < VULNERABLE_THRESHOLD,
            })
        })
        .collect::<Result<Vec<_>, ScoreError>>()?;

    let first_below_threshold = points.iter().find(|p| p.below_threshold).map(|p| p.offset);

    Ok(DecayProjection {
        points,
        first_below_threshold,
    })
}

/// Project an overall score with geometric decay and nearest rounding.
///
/// # Errors
/// Returns `ScoreError::InvalidHorizon` if the rate is outside `[0, 1]`.
pub fn project_decay(
    overall: Score,
    horizon: &Horizon,
    rate_per_unit: f64,
) -> Result<DecayProjection, ScoreError> {
    project(
        overall,
        horizon,
        &DecayModel::geometric(rate_per_unit),
        ProjectionRounding::Nearest,
    )
}

// =============================================================================
// TESTS
// =============================================================================
