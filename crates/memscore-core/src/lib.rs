//! # memscore-core
//!
//! The deterministic scoring engine for Memory Score - THE LOGIC.
//!
//! This crate maps raw brand metrics to per-stage memory scores across the
//! brand-memory lifecycle (create, expand, strengthen, retrieve, reinstate,
//! defend) and derives:
//! - the overall score (geometric mean of the stage scores)
//! - status bands for the overall score and each stage
//! - a decay projection of the overall score without reinforcement
//! - a gap analysis against a competitor or a flat benchmark
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is pure: no I/O, no logging, no async, no network dependencies
//! - Is deterministic: identical inputs always produce identical outputs
//! - Is stateless: inputs are borrowed, never mutated, and nothing is cached
//! - Is closed: stage behaviour is selected through the schema, not code

// =============================================================================
// MODULES
// =============================================================================

pub mod aggregate;
pub mod catalogue;
pub mod compare;
pub mod decay;
pub mod engine;
pub mod inputs;
pub mod profile;
pub mod schema;
pub mod scorer;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Score, ScoreError, SignalKey, StageId};

// =============================================================================
// RE-EXPORTS: Scoring Pipeline
// =============================================================================

pub use aggregate::{
    Aggregate, DOMINANT_THRESHOLD, ESTABLISHED_THRESHOLD, FRAGILE_THRESHOLD, OverallScore,
    OverallStatus, StageAssessment, StageStatus, VULNERABLE_THRESHOLD, aggregate, overall_score,
};
pub use compare::{
    CATEGORY_BENCHMARK, Comparison, ReferenceVector, StageGap, compare, priority_order,
    priority_stages,
};
pub use decay::{
    DEFAULT_DECAY_RATE, DEFAULT_HORIZON, DecayModel, DecayPoint, DecayProjection, Horizon,
    ProjectionRounding, RetentionStep, project, project_decay,
};
pub use engine::{Diagnosis, Engine, PRIORITY_LIMIT};
pub use inputs::{MetricInputs, StageValues};
pub use schema::{
    Amplification, Bounds, Schema, ScoringStrategy, SignalDefinition, StageDefinition,
};
pub use scorer::{SignalScore, StageScore, StageScores, score_all, score_stage, signal_breakdown};

// =============================================================================
// RE-EXPORTS: Presentation
// =============================================================================

pub use profile::{StageProfile, default_profiles, profile_for};
