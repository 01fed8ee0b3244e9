//! # Metric Schema
//!
//! Declarative definition of each stage's signals: benchmark, weight,
//! directionality and declared bounds, plus the stage's scoring strategy.
//!
//! The schema carries scoring-relevant fields only. Labels, colours and
//! narrative copy live in [`crate::profile`], keyed by stage id.
//!
//! A [`Schema`] can only be built through validation, so every stage an
//! [`crate::Engine`] sees is well-formed. [`StageDefinition::validate`] is
//! still public because [`crate::scorer::score_stage`] accepts bare stage
//! definitions and re-checks them before scoring.

use crate::{ScoreError, SignalKey, StageId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// BOUNDS
// =============================================================================

/// Inclusive bounds a raw value must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Create new bounds.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Bounds for a percentage signal: `[0, 100]`.
    #[must_use]
    pub const fn percent() -> Self {
        Self::new(0.0, 100.0)
    }

    /// Check whether a value lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::percent()
    }
}

// =============================================================================
// SIGNAL DEFINITION
// =============================================================================

fn default_weight() -> f64 {
    1.0
}

/// One raw measured input feeding a stage's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDefinition {
    /// Key, unique within the stage.
    pub key: SignalKey,
    /// Reference value the raw signal is compared against. Must be > 0.
    pub benchmark: f64,
    /// Relative weight of the signal within its stage.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Lower raw values are better (e.g. churn rate).
    #[serde(default)]
    pub inverted: bool,
    /// Declared bounds of the raw value.
    #[serde(default)]
    pub bounds: Bounds,
}

impl SignalDefinition {
    /// A normal (higher is better) signal with unit weight and percent bounds.
    #[must_use]
    pub fn new(key: impl Into<String>, benchmark: f64) -> Self {
        Self {
            key: SignalKey::new(key),
            benchmark,
            weight: default_weight(),
            inverted: false,
            bounds: Bounds::percent(),
        }
    }

    /// An inverted (lower is better) signal with unit weight and percent bounds.
    #[must_use]
    pub fn inverted(key: impl Into<String>, benchmark: f64) -> Self {
        Self {
            inverted: true,
            ..Self::new(key, benchmark)
        }
    }

    /// Set the weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the declared bounds.
    #[must_use]
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = Bounds::new(min, max);
        self
    }
}

// =============================================================================
// SCORING STRATEGY
// =============================================================================

/// Benchmark-delta amplification of a weighted stage.
///
/// The weighted sum is multiplied by
/// `1 + (raw[signal] - reference) / 100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amplification {
    /// Signal whose raw value drives the amplification.
    pub signal: SignalKey,
    /// Category reference the raw value is compared against.
    pub reference: f64,
}

impl Amplification {
    /// Amplification factor for a raw value of the driving signal.
    #[must_use]
    pub fn factor(&self, raw: f64) -> f64 {
        1.0 + (raw - self.reference) / 100.0
    }
}

/// How a stage turns its signals into one score.
///
/// Both variants share the per-signal normalization `raw / benchmark * 100`
/// and differ in how terms are combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Each signal is scored against its benchmark, clamped to `[0, 100]`
    /// and rounded; the stage score is the weight-averaged signal scores,
    /// rounded once more. Inverted signals score `benchmark / max(raw, 1)`.
    #[default]
    BenchmarkRatio,

    /// Weighted sum of normalized terms plus a constant offset, optionally
    /// amplified by a benchmark delta, clamped and rounded once. Inverted
    /// signals contribute `100 - normalized`.
    WeightedSum {
        #[serde(default)]
        offset: f64,
        #[serde(default)]
        amplification: Option<Amplification>,
    },
}

impl ScoringStrategy {
    /// Short name of the strategy.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ScoringStrategy::BenchmarkRatio => "benchmark_ratio",
            ScoringStrategy::WeightedSum { .. } => "weighted_sum",
        }
    }
}

// =============================================================================
// STAGE DEFINITION
// =============================================================================

/// Scoring definition of one stage. Authored once, shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub id: StageId,
    #[serde(default)]
    pub strategy: ScoringStrategy,
    pub signals: Vec<SignalDefinition>,
}

impl StageDefinition {
    /// Create a benchmark-ratio stage.
    #[must_use]
    pub fn new(id: impl Into<String>, signals: Vec<SignalDefinition>) -> Self {
        Self {
            id: StageId::new(id),
            strategy: ScoringStrategy::BenchmarkRatio,
            signals,
        }
    }

    /// Replace the scoring strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ScoringStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Look up a signal by key.
    #[must_use]
    pub fn signal(&self, key: &SignalKey) -> Option<&SignalDefinition> {
        self.signals.iter().find(|s| &s.key == key)
    }

    /// Validate the stage definition.
    ///
    /// Returns `ScoreError::InvalidStageDefinition` if:
    /// - The id is empty or the signal set is empty
    /// - A signal key is empty or duplicated
    /// - A benchmark is not a finite number > 0
    /// - A weight is negative or not finite
    /// - Bounds are not finite, start below zero, or are reversed
    /// - A benchmark-ratio stage has no positive weight
    /// - A weighted stage has a non-finite offset, or its amplification
    ///   names an unknown or inverted signal, or a non-finite reference
    pub fn validate(&self) -> Result<(), ScoreError> {
        let id = &self.id;

        if id.as_str().is_empty() {
            return Err(ScoreError::definition(id, "empty stage id"));
        }

        if self.signals.is_empty() {
            return Err(ScoreError::definition(id, "empty signal set"));
        }

        let mut seen = BTreeSet::new();
        for signal in &self.signals {
            let key = signal.key.as_str();

            if key.is_empty() {
                return Err(ScoreError::definition(id, "empty signal key"));
            }

            if !seen.insert(key) {
                return Err(ScoreError::definition(
                    id,
                    format!("duplicate signal key '{}'", key),
                ));
            }

            if !signal.benchmark.is_finite() || signal.benchmark <= 0.0 {
                return Err(ScoreError::definition(
                    id,
                    format!(
                        "benchmark for '{}' must be a positive number, got {}",
                        key, signal.benchmark
                    ),
                ));
            }

            if !signal.weight.is_finite() || signal.weight < 0.0 {
                return Err(ScoreError::definition(
                    id,
                    format!(
                        "weight for '{}' must be a non-negative number, got {}",
                        key, signal.weight
                    ),
                ));
            }

            let Bounds { min, max } = signal.bounds;
            if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
                return Err(ScoreError::definition(
                    id,
                    format!("bounds for '{}' are malformed: [{}, {}]", key, min, max),
                ));
            }
        }

        match &self.strategy {
            ScoringStrategy::BenchmarkRatio => {
                let total: f64 = self.signals.iter().map(|s| s.weight).sum();
                if total <= 0.0 {
                    return Err(ScoreError::definition(id, "signal weights sum to zero"));
                }
            }
            ScoringStrategy::WeightedSum {
                offset,
                amplification,
            } => {
                if !offset.is_finite() {
                    return Err(ScoreError::definition(id, "offset must be finite"));
                }
                if let Some(amp) = amplification {
                    match self.signal(&amp.signal) {
                        None => {
                            return Err(ScoreError::definition(
                                id,
                                format!("amplification names unknown signal '{}'", amp.signal),
                            ));
                        }
                        // A rising inverted value would raise the factor and the score.
                        Some(signal) if signal.inverted => {
                            return Err(ScoreError::definition(
                                id,
                                format!("amplification names inverted signal '{}'", amp.signal),
                            ));
                        }
                        Some(_) => {}
                    }
                    if !amp.reference.is_finite() {
                        return Err(ScoreError::definition(
                            id,
                            "amplification reference must be finite",
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// SCHEMA
// =============================================================================

/// Ordered, validated set of stage definitions.
///
/// Definition order is significant: it is the order of every per-stage
/// result and the tie-breaker of the weakest-first priority view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema", into = "RawSchema")]
pub struct Schema {
    stages: Vec<StageDefinition>,
}

#[derive(Serialize, Deserialize)]
struct RawSchema {
    stages: Vec<StageDefinition>,
}

impl TryFrom<RawSchema> for Schema {
    type Error = ScoreError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        Schema::new(raw.stages)
    }
}

impl From<Schema> for RawSchema {
    fn from(schema: Schema) -> Self {
        RawSchema {
            stages: schema.stages,
        }
    }
}

impl Schema {
    /// Build a schema, validating every stage.
    ///
    /// Also rejects an empty stage list and duplicate stage ids.
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, ScoreError> {
        if stages.is_empty() {
            return Err(ScoreError::definition(
                &StageId::new(""),
                "schema has no stages",
            ));
        }

        let mut seen = BTreeSet::new();
        for stage in &stages {
            stage.validate()?;
            if !seen.insert(stage.id.as_str()) {
                return Err(ScoreError::definition(&stage.id, "duplicate stage id"));
            }
        }

        Ok(Self { stages })
    }

    /// Wrap stages known to be valid (the built-in catalogues).
    pub(crate) fn trusted(stages: Vec<StageDefinition>) -> Self {
        Self { stages }
    }

    /// All stages, in definition order.
    #[must_use]
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Look up a stage by id.
    #[must_use]
    pub fn stage(&self, id: &StageId) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| &s.id == id)
    }

    /// Position of a stage in definition order.
    #[must_use]
    pub fn position(&self, id: &StageId) -> Option<usize> {
        self.stages.iter().position(|s| &s.id == id)
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// A validated schema is never empty; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stage() -> StageDefinition {
        StageDefinition::new(
            "create",
            vec![
                SignalDefinition::new("awareness", 65.0),
                SignalDefinition::new("consideration", 35.0),
            ],
        )
    }

    fn reason(err: ScoreError) -> String {
        match err {
            ScoreError::InvalidStageDefinition { reason, .. } => reason,
            other => format!("unexpected: {other}"),
        }
    }

    #[test]
    fn valid_stage_passes() {
        assert!(stage().validate().is_ok());
    }

    #[test]
    fn empty_signal_set_rejected() {
        let err = StageDefinition::new("create", vec![]).validate().expect_err("rejected");
        assert_eq!(reason(err), "empty signal set");
    }

    #[test]
    fn duplicate_signal_key_rejected() {
        let mut def = stage();
        def.signals.push(SignalDefinition::new("awareness", 10.0));
        let err = def.validate().expect_err("rejected");
        assert!(reason(err).contains("duplicate signal key 'awareness'"));
    }

    #[test]
    fn non_positive_benchmark_rejected() {
        for benchmark in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let mut def = stage();
            def.signals[0].benchmark = benchmark;
            assert!(matches!(
                def.validate(),
                Err(ScoreError::InvalidStageDefinition { .. })
            ));
        }
    }

    #[test]
    fn reversed_bounds_rejected() {
        let mut def = stage();
        def.signals[1] = SignalDefinition::new("consideration", 35.0).with_bounds(50.0, 10.0);
        assert!(reason(def.validate().expect_err("rejected")).contains("bounds"));
    }

    #[test]
    fn zero_weight_ratio_stage_rejected() {
        let def = StageDefinition::new(
            "create",
            vec![SignalDefinition::new("awareness", 65.0).with_weight(0.0)],
        );
        assert_eq!(reason(def.validate().expect_err("rejected")), "signal weights sum to zero");
    }

    #[test]
    fn amplification_must_name_known_signal() {
        let def = stage().with_strategy(ScoringStrategy::WeightedSum {
            offset: 0.0,
            amplification: Some(Amplification {
                signal: SignalKey::new("recall"),
                reference: 45.0,
            }),
        });
        assert!(reason(def.validate().expect_err("rejected")).contains("unknown signal 'recall'"));
    }

    #[test]
    fn amplification_on_inverted_signal_rejected() {
        let def = StageDefinition::new(
            "reinstate",
            vec![
                SignalDefinition::inverted("lapse", 100.0).with_weight(0.1),
                SignalDefinition::new("reengage", 100.0).with_weight(0.5),
            ],
        )
        .with_strategy(ScoringStrategy::WeightedSum {
            offset: 0.0,
            amplification: Some(Amplification {
                signal: SignalKey::new("lapse"),
                reference: 0.0,
            }),
        });
        assert!(reason(def.validate().expect_err("rejected")).contains("inverted signal 'lapse'"));
    }

    #[test]
    fn schema_rejects_duplicate_stage_ids() {
        let err = Schema::new(vec![stage(), stage()]).expect_err("rejected");
        assert_eq!(reason(err), "duplicate stage id");
    }

    #[test]
    fn schema_rejects_empty_stage_list() {
        assert!(Schema::new(vec![]).is_err());
    }

    #[test]
    fn schema_preserves_definition_order() {
        let other = StageDefinition::new("alpha", vec![SignalDefinition::new("x", 1.0)]);
        let schema = Schema::new(vec![stage(), other]).expect("schema");
        let ids: Vec<_> = schema.stages().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["create", "alpha"]);
        assert_eq!(schema.position(&StageId::new("alpha")), Some(1));
    }

    #[test]
    fn schema_deserializes_from_toml_with_defaults() {
        let text = r#"
            [[stages]]
            id = "reinstate"

            [stages.strategy]
            kind = "weighted_sum"
            offset = 30.0

            [[stages.signals]]
            key = "lapse_rate"
            benchmark = 100.0
            weight = 0.4
            inverted = true

            [[stages.signals]]
            key = "days_since_purchase"
            benchmark = 100.0
            weight = 0.3
            inverted = true
            bounds = { min = 0.0, max = 365.0 }
        "#;
        let schema: Schema = toml::from_str(text).expect("parse");
        let stage = &schema.stages()[0];
        assert_eq!(stage.strategy.name(), "weighted_sum");
        assert!(stage.signals[0].inverted);
        assert_eq!(stage.signals[0].bounds, Bounds::percent());
        assert_eq!(stage.signals[1].bounds.max, 365.0);
    }

    #[test]
    fn schema_deserialization_validates() {
        let text = r#"
            [[stages]]
            id = "create"
            [[stages.signals]]
            key = "awareness"
            benchmark = 0.0
        "#;
        assert!(toml::from_str::<Schema>(text).is_err());
    }
}
