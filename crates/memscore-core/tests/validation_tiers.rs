//! # Validation Tier Tests (T0-T4)
//!
//! If ANY tier fails, the engine is INVALID.
//!
//! ## Tiers
//! - T0: Schema Integrity
//! - T1: Stage Scoring
//! - T2: Aggregation
//! - T3: Decay Projection
//! - T4: Comparison and Priorities

use memscore_core::{
    DecayModel, Engine, Horizon, MetricInputs, OverallStatus, ProjectionRounding,
    ReferenceVector, Schema, Score, ScoreError, SignalDefinition, StageDefinition, StageId,
    StageScores, StageStatus,
};

fn score(v: i64) -> Score {
    Score::new(v).expect("score")
}

fn stage_scores(pairs: &[(&str, i64)]) -> StageScores {
    pairs
        .iter()
        .map(|(id, v)| (StageId::new(*id), score(*v)))
        .collect()
}

/// Default inputs of the weighted catalogue.
fn dynamic_inputs() -> MetricInputs {
    MetricInputs::new()
        .with("create", "brandAwareness", 50.0)
        .with("create", "firstTimeConsideration", 30.0)
        .with("create", "unpromptedRecall", 20.0)
        .with("expand", "brandAssociationsCount", 5.0)
        .with("expand", "categoriesPurchased", 2.0)
        .with("expand", "usageOccasions", 3.0)
        .with("strengthen", "brandLoyalty", 60.0)
        .with("strengthen", "repeatPurchase", 45.0)
        .with("strengthen", "favourability", 55.0)
        .with("strengthen", "promptedRecall", 70.0)
        .with("retrieve", "topOfMindAwareness", 15.0)
        .with("retrieve", "purchaseIntent", 25.0)
        .with("retrieve", "spontaneousRecallPOS", 20.0)
        .with("reinstate", "lapsedUsage", 30.0)
        .with("reinstate", "timeSinceLastPurchase", 60.0)
        .with("reinstate", "reengagementResponse", 15.0)
        .with("defend", "switchingBehavior", 20.0)
        .with("defend", "competitorAssociationStrength", 40.0)
        .with("defend", "differentiationScore", 55.0)
}

// =============================================================================
// TIER T0: SCHEMA INTEGRITY
// =============================================================================

mod t0_schema_integrity {
    use super::*;

    /// T0.1: Built-in catalogues list six stages in lifecycle order.
    #[test]
    fn catalogues_list_six_stages() {
        for schema in [Schema::diagnostic(), Schema::dynamic()] {
            let engine = Engine::new(schema);
            let ids: Vec<_> = engine.list_stages().iter().map(|s| s.id.as_str()).collect();
            assert_eq!(
                ids,
                vec!["create", "expand", "strengthen", "retrieve", "reinstate", "defend"]
            );
        }
    }

    /// T0.2: A non-positive benchmark is rejected at schema construction.
    #[test]
    fn non_positive_benchmark_rejected() {
        let stage = StageDefinition::new("create", vec![SignalDefinition::new("awareness", 0.0)]);
        assert!(matches!(
            Schema::new(vec![stage]),
            Err(ScoreError::InvalidStageDefinition { .. })
        ));
    }

    /// T0.3: Custom schemas load from TOML with validation.
    #[test]
    fn custom_schema_from_toml() {
        let text = r#"
            [[stages]]
            id = "awareness"

            [[stages.signals]]
            key = "aided"
            benchmark = 50.0

            [[stages.signals]]
            key = "churn"
            benchmark = 10.0
            inverted = true
        "#;
        let schema: Schema = toml::from_str(text).expect("schema");
        assert_eq!(schema.len(), 1);

        let invalid = text.replace("benchmark = 10.0", "benchmark = -10.0");
        assert!(toml::from_str::<Schema>(&invalid).is_err());
    }
}

// =============================================================================
// TIER T1: STAGE SCORING
// =============================================================================

mod t1_stage_scoring {
    use super::*;

    /// T1.1: The create scenario scores 89.
    #[test]
    fn create_scenario() {
        let engine = Engine::new(
            Schema::new(vec![StageDefinition::new(
                "create",
                vec![
                    SignalDefinition::new("awareness", 65.0),
                    SignalDefinition::new("consideration", 35.0),
                    SignalDefinition::new("recall", 25.0),
                ],
            )])
            .expect("schema"),
        );
        let inputs = MetricInputs::new()
            .with("create", "awareness", 58.0)
            .with("create", "consideration", 32.0)
            .with("create", "recall", 22.0);

        let scores = engine.score_all(&inputs).expect("scores");
        assert_eq!(scores.get(&StageId::new("create")), Some(score(89)));
    }

    /// T1.2: An inverted signal above its benchmark scores below 100.
    #[test]
    fn inverted_scenario() {
        let engine = Engine::new(
            Schema::new(vec![StageDefinition::new(
                "reinstate",
                vec![SignalDefinition::inverted("lapseRate", 25.0)],
            )])
            .expect("schema"),
        );
        let inputs = MetricInputs::new().with("reinstate", "lapseRate", 30.0);
        let scores = engine.score_all(&inputs).expect("scores");
        assert_eq!(scores.get(&StageId::new("reinstate")), Some(score(83)));
    }

    /// T1.3: The weighted catalogue reproduces its reference values.
    #[test]
    fn dynamic_catalogue_defaults() {
        let engine = Engine::new(Schema::dynamic());
        let scores = engine.score_all(&dynamic_inputs()).expect("scores");
        let values: Vec<u8> = scores.iter().map(|s| s.score.value()).collect();
        assert_eq!(values, vec![34, 43, 57, 18, 75, 65]);
    }

    /// T1.4: Negative raw values are rejected, never clamped.
    #[test]
    fn negative_value_rejected() {
        let engine = Engine::new(Schema::dynamic());
        let inputs = dynamic_inputs().with("expand", "usageOccasions", -3.0);
        let err = engine.score_all(&inputs).expect_err("negative");
        assert!(matches!(
            err,
            ScoreError::InvalidMetricValue { ref stage, .. } if stage.as_str() == "expand"
        ));
    }

    /// T1.5: Non-finite raw values are rejected.
    #[test]
    fn non_finite_value_rejected() {
        let engine = Engine::new(Schema::dynamic());
        for bad in [f64::NAN, f64::INFINITY] {
            let inputs = dynamic_inputs().with("defend", "differentiationScore", bad);
            assert!(matches!(
                engine.score_all(&inputs),
                Err(ScoreError::InvalidMetricValue { .. })
            ));
        }
    }

    /// T1.6: Unknown stages in the inputs are rejected.
    #[test]
    fn unknown_stage_rejected() {
        let engine = Engine::new(Schema::dynamic());
        let inputs = dynamic_inputs().with("recover", "x", 1.0);
        assert!(matches!(
            engine.score_all(&inputs),
            Err(ScoreError::InvalidMetricValue { .. })
        ));
    }
}

// =============================================================================
// TIER T2: AGGREGATION
// =============================================================================

mod t2_aggregation {
    use super::*;

    /// T2.1: The six-stage scenario aggregates to 55, VULNERABLE.
    #[test]
    fn six_stage_scenario() {
        let engine = Engine::default();
        let scores = stage_scores(&[
            ("create", 70),
            ("expand", 60),
            ("strengthen", 55),
            ("retrieve", 45),
            ("reinstate", 40),
            ("defend", 65),
        ]);
        let overall = engine.overall_score(&scores).expect("overall");
        assert_eq!(overall.value, score(55));
        assert_eq!(overall.status, OverallStatus::Vulnerable);
    }

    /// T2.2: Imbalance is penalized relative to the arithmetic mean.
    #[test]
    fn imbalance_penalized() {
        let engine = Engine::default();
        let balanced = stage_scores(&[("a", 50), ("b", 50)]);
        let skewed = stage_scores(&[("a", 95), ("b", 5)]);
        let balanced = engine.overall_score(&balanced).expect("overall");
        let skewed = engine.overall_score(&skewed).expect("overall");
        assert!(skewed.value < balanced.value);
        assert_eq!(skewed.status, OverallStatus::Fragile);
    }

    /// T2.3: Per-stage bands follow the stage thresholds.
    #[test]
    fn stage_bands() {
        let engine = Engine::new(Schema::dynamic());
        let diagnosis = engine
            .diagnose(
                &dynamic_inputs(),
                &Horizon::default(),
                &DecayModel::default(),
                ProjectionRounding::Nearest,
            )
            .expect("diagnose");
        let statuses: Vec<_> = diagnosis.stages.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                StageStatus::Impaired,
                StageStatus::AtRisk,
                StageStatus::AtRisk,
                StageStatus::Impaired,
                StageStatus::Healthy,
                StageStatus::Healthy,
            ]
        );
    }

    /// T2.4: No stages, no overall score.
    #[test]
    fn empty_scores_rejected() {
        let engine = Engine::default();
        assert!(matches!(
            engine.overall_score(&StageScores::new()),
            Err(ScoreError::InvalidStageDefinition { .. })
        ));
    }
}

// =============================================================================
// TIER T3: DECAY PROJECTION
// =============================================================================

mod t3_decay_projection {
    use super::*;

    /// T3.1: Nearest rounding of the 5% scenario.
    #[test]
    fn scenario_nearest() {
        let engine = Engine::default();
        let projection = engine
            .project_decay(score(55), &Horizon::default(), 0.05)
            .expect("project");
        assert_eq!(projection.scores(), vec![55, 45, 36, 30, 24]);
        assert_eq!(projection.first_below_threshold, Some(8));
        assert!(projection.points[4].below_threshold);
    }

    /// T3.2: Ceiling rounding of the 5% scenario.
    #[test]
    fn scenario_ceiling() {
        let projection = memscore_core::project(
            score(55),
            &Horizon::default(),
            &DecayModel::geometric(0.05),
            ProjectionRounding::Up,
        )
        .expect("project");
        assert_eq!(projection.scores(), vec![55, 45, 37, 30, 25]);
        assert_eq!(projection.first_below_threshold, Some(8));
        assert!(projection.points[4].below_threshold);
    }

    /// T3.3: The irregular schedule of the weighted variant.
    #[test]
    fn irregular_schedule() {
        let projection = memscore_core::project(
            score(50),
            &Horizon::default(),
            &DecayModel::irregular(),
            ProjectionRounding::Nearest,
        )
        .expect("project");
        assert_eq!(projection.scores(), vec![50, 48, 44, 40, 36]);
        assert_eq!(projection.first_below_threshold, Some(16));
    }

    /// T3.4: Malformed horizons are rejected.
    #[test]
    fn malformed_horizon_rejected() {
        for offsets in [vec![0, -4], vec![0, 8, 4], vec![0, 4, 4]] {
            assert!(matches!(
                Horizon::new(offsets),
                Err(ScoreError::InvalidHorizon(_))
            ));
        }
    }
}

// =============================================================================
// TIER T4: COMPARISON AND PRIORITIES
// =============================================================================

mod t4_comparison {
    use super::*;

    fn own() -> StageScores {
        stage_scores(&[
            ("create", 70),
            ("expand", 60),
            ("strengthen", 55),
            ("retrieve", 45),
            ("reinstate", 40),
            ("defend", 65),
        ])
    }

    /// T4.1: Competitor gaps partition into advantages and vulnerabilities.
    #[test]
    fn competitor_gaps() {
        let competitor = stage_scores(&[
            ("create", 65),
            ("expand", 55),
            ("strengthen", 60),
            ("retrieve", 50),
            ("reinstate", 45),
            ("defend", 58),
        ]);
        let engine = Engine::default();
        let comparison = engine
            .compare(&own(), &ReferenceVector::competitor("Competitor", competitor))
            .expect("compare");

        let gaps: Vec<i16> = comparison.gaps.iter().map(|g| g.gap).collect();
        assert_eq!(gaps, vec![5, 5, -5, -5, -5, 7]);
        assert_eq!(comparison.advantages().len(), 3);
        assert_eq!(comparison.vulnerabilities().len(), 3);
        assert_eq!(comparison.total_gap(), 2);
    }

    /// T4.2: A flat benchmark is compared explicitly.
    #[test]
    fn flat_benchmark() {
        let engine = Engine::default();
        let comparison = engine
            .compare(&own(), &ReferenceVector::benchmark(score(60)))
            .expect("compare");
        let equal = comparison.gaps.iter().filter(|g| g.gap == 0).count();
        assert_eq!(equal, 1);
        assert_eq!(comparison.reference_total(), 360);
    }

    /// T4.3: A competitor missing a compared stage is rejected.
    #[test]
    fn missing_reference_stage() {
        let engine = Engine::default();
        let competitor = stage_scores(&[("create", 65)]);
        let err = engine
            .compare(&own(), &ReferenceVector::competitor("Competitor", competitor))
            .expect_err("missing");
        assert_eq!(err, ScoreError::MissingReferenceStage(StageId::new("expand")));
    }

    /// T4.4: Priorities list the weakest stages first.
    #[test]
    fn priorities_weakest_first() {
        let weakest: Vec<_> = memscore_core::priority_stages(&own(), 3)
            .into_iter()
            .map(|s| s.stage.0)
            .collect();
        assert_eq!(weakest, vec!["reinstate", "retrieve", "strengthen"]);
    }
}
