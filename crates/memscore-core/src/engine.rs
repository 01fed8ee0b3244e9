//! # Engine
//!
//! Facade over the scoring pipeline for one schema.
//!
//! The engine holds only its validated schema. Every call is a pure
//! function of its arguments; nothing is cached between calls, so one
//! engine can be shared freely across threads.

use crate::aggregate::{self, OverallScore, StageAssessment};
use crate::compare::{self, Comparison, ReferenceVector};
use crate::decay::{self, DecayModel, DecayProjection, Horizon, ProjectionRounding};
use crate::inputs::MetricInputs;
use crate::schema::{Schema, StageDefinition};
use crate::scorer::{self, StageScore, StageScores};
use crate::{Score, ScoreError};
use serde::{Deserialize, Serialize};

/// Number of weakest stages reported as priorities.
pub const PRIORITY_LIMIT: usize = 3;

/// Full result of one diagnostic run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub stages: Vec<StageAssessment>,
    pub overall: OverallScore,
    pub decay: DecayProjection,
    /// Weakest stages first, at most [`PRIORITY_LIMIT`].
    pub priorities: Vec<StageScore>,
}

/// Scoring engine bound to one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    schema: Schema,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Schema::diagnostic())
    }
}

impl Engine {
    /// Create an engine over a validated schema.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// The schema this engine scores against.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Stage definitions in lifecycle order.
    #[must_use]
    pub fn list_stages(&self) -> &[StageDefinition] {
        self.schema.stages()
    }

    /// Score every stage of the schema.
    pub fn score_all(&self, inputs: &MetricInputs) -> Result<StageScores, ScoreError> {
        scorer::score_all(&self.schema, inputs)
    }

    /// Overall score of already computed stage scores.
    pub fn overall_score(&self, scores: &StageScores) -> Result<OverallScore, ScoreError> {
        aggregate::overall_score(scores)
    }

    /// Geometric decay projection with nearest rounding.
    pub fn project_decay(
        &self,
        overall: Score,
        horizon: &Horizon,
        rate_per_unit: f64,
    ) -> Result<DecayProjection, ScoreError> {
        decay::project_decay(overall, horizon, rate_per_unit)
    }

    /// Per-stage gaps against a reference vector.
    pub fn compare(
        &self,
        scores: &StageScores,
        reference: &ReferenceVector,
    ) -> Result<Comparison, ScoreError> {
        compare::compare(scores, reference)
    }

    /// Score, aggregate, project and prioritise in one pass.
    pub fn diagnose(
        &self,
        inputs: &MetricInputs,
        horizon: &Horizon,
        model: &DecayModel,
        rounding: ProjectionRounding,
    ) -> Result<Diagnosis, ScoreError> {
        let scores = self.score_all(inputs)?;
        let aggregate = aggregate::aggregate(&scores)?;
        let decay = decay::project(aggregate.overall.value, horizon, model, rounding)?;

        Ok(Diagnosis {
            stages: aggregate.stages,
            overall: aggregate.overall,
            decay,
            priorities: compare::priority_stages(&scores, PRIORITY_LIMIT),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
