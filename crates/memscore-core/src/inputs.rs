//! # Metric Inputs
//!
//! Raw metric values supplied by the caller: stage id → signal key → value.
//!
//! The engine only ever borrows a `MetricInputs` snapshot. Values are
//! checked against the schema at scoring time, never coerced: a negative,
//! non-finite or out-of-bounds value is rejected rather than clamped.

use crate::schema::SignalDefinition;
use crate::{ScoreError, SignalKey, StageId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw values of one stage, keyed by signal.
pub type StageValues = BTreeMap<SignalKey, f64>;

/// Raw metric values for all stages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricInputs(BTreeMap<StageId, StageValues>);

impl MetricInputs {
    /// Create an empty input set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for one raw value.
    #[must_use]
    pub fn with(mut self, stage: &str, signal: &str, value: f64) -> Self {
        self.set(stage, signal, value);
        self
    }

    /// Set one raw value, replacing any previous one.
    pub fn set(&mut self, stage: &str, signal: &str, value: f64) {
        self.0
            .entry(StageId::new(stage))
            .or_default()
            .insert(SignalKey::new(signal), value);
    }

    /// Raw values of a stage.
    #[must_use]
    pub fn stage(&self, id: &StageId) -> Option<&StageValues> {
        self.0.get(id)
    }

    /// Stage ids present in the inputs, in key order.
    pub fn stage_ids(&self) -> impl Iterator<Item = &StageId> {
        self.0.keys()
    }
}

impl FromIterator<(StageId, StageValues)> for MetricInputs {
    fn from_iter<I: IntoIterator<Item = (StageId, StageValues)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Check one raw value against its signal definition.
///
/// Returns `ScoreError::InvalidMetricValue` if the value is not finite,
/// negative, or outside the signal's declared bounds.
pub fn validate_value(
    stage: &StageId,
    signal: &SignalDefinition,
    value: f64,
) -> Result<f64, ScoreError> {
    if !value.is_finite() {
        return Err(ScoreError::metric(stage, &signal.key, "not a finite number"));
    }

    if value < 0.0 {
        return Err(ScoreError::metric(
            stage,
            &signal.key,
            format!("negative value {}", value),
        ));
    }

    if !signal.bounds.contains(value) {
        return Err(ScoreError::metric(
            stage,
            &signal.key,
            format!(
                "value {} outside declared bounds [{}, {}]",
                value, signal.bounds.min, signal.bounds.max
            ),
        ));
    }

    Ok(value)
}

// =============================================================================
// TESTS
// =============================================================================
