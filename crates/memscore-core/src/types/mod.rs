//! # Core Type Definitions
//!
//! This module contains the shared types of the Memory Score engine:
//! - Identifiers (`StageId`, `SignalKey`)
//! - The bounded score value (`Score`)
//! - Error types (`ScoreError`)
//!
//! ## Determinism Guarantees
//!
//! All identifiers implement `Ord` so they can key `BTreeMap`/`BTreeSet`
//! without introducing hash-order dependence. Scores are integers in
//! `[0, 100]`; every float produced during scoring is rounded exactly once
//! on its way into a `Score`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a stage in the brand-memory lifecycle (e.g. `create`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub String);

impl StageId {
    /// Create a new stage id.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the stage id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Key of a signal, unique within its stage (e.g. `awareness`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalKey(pub String);

impl SignalKey {
    /// Create a new signal key.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the signal key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SignalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SignalKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// SCORE
// =============================================================================

/// Float noise ignored when rounding up.
const CEIL_TOLERANCE: f64 = 1e-9;

/// Integer score in `[0, 100]`.
///
/// Every derived score in the engine (stage, overall, projected, reference)
/// is a `Score`, so the range invariant is carried by the type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Lowest possible score.
    pub const MIN: Score = Score(0);

    /// Highest possible score.
    pub const MAX: Score = Score(100);

    /// Create a score from an integer.
    ///
    /// Returns `ScoreError::ScoreOutOfRange` outside `[0, 100]`.
    pub fn new(value: i64) -> Result<Self, ScoreError> {
        if (0..=100).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ScoreError::ScoreOutOfRange(value))
        }
    }

    /// Clamp a float to `[0, 100]` and round it half away from zero.
    ///
    /// `NaN` maps to zero.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.clamp(0.0, 100.0).round() as u8)
    }

    /// Clamp a float to `[0, 100]` and round it up.
    ///
    /// Values within `CEIL_TOLERANCE` above an integer stay on it, so
    /// `80.0 * 0.8` is 64 and not 65.
    #[must_use]
    pub fn from_f64_ceil(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self((value - CEIL_TOLERANCE).clamp(0.0, 100.0).ceil() as u8)
    }

    /// Get the raw score value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Memory Score engine.
///
/// - No silent failures: a malformed configuration prevents scoring
/// - Every error is a rejected call; inputs are never modified
/// - Nothing is transient, so nothing is retried
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// A raw metric value is missing, not a finite number, negative, out of
    /// its declared bounds, or addressed to an unknown stage or signal.
    #[error("Invalid metric value for {stage}.{signal}: {reason}")]
    InvalidMetricValue {
        stage: StageId,
        signal: SignalKey,
        reason: String,
    },

    /// The stage configuration is malformed.
    #[error("Invalid stage definition '{stage}': {reason}")]
    InvalidStageDefinition { stage: StageId, reason: String },

    /// The decay request is malformed (offsets or rate).
    #[error("Invalid decay horizon: {0}")]
    InvalidHorizon(String),

    /// The reference vector has no score for a stage being compared.
    #[error("Reference vector is missing stage: {0}")]
    MissingReferenceStage(StageId),

    /// An externally supplied score lies outside `[0, 100]`.
    #[error("Score out of range [0, 100]: {0}")]
    ScoreOutOfRange(i64),
}

impl ScoreError {
    /// Shorthand for an `InvalidMetricValue` error.
    pub fn metric(stage: &StageId, signal: &SignalKey, reason: impl Into<String>) -> Self {
        Self::InvalidMetricValue {
            stage: stage.clone(),
            signal: signal.clone(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an `InvalidStageDefinition` error.
    pub fn definition(stage: &StageId, reason: impl Into<String>) -> Self {
        Self::InvalidStageDefinition {
            stage: stage.clone(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
