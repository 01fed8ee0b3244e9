//! # Built-in Stage Catalogues
//!
//! Two six-stage catalogues of the brand-memory lifecycle:
//!
//! | Stage | Diagnostic (benchmark ratio) | Dynamic (weighted sum) |
//! |-------|------------------------------|------------------------|
//! | create | awareness 65, consideration 35, recall 25 | 0.3/0.3/0.4, amplified by awareness vs 45 |
//! | expand | associations 8, occasions 5, cross-category 30 | associations /10, categories /5, occasions /8 |
//! | strengthen | loyalty 55, repeat 45, favourability 60 | 0.3/0.25/0.25/0.2 incl. prompted recall |
//! | retrieve | top-of-mind 20, intent 40, POS recall 35 | 0.4/0.35/0.25, amplified by top-of-mind vs 22 |
//! | reinstate | lapse 25 (inv), days 60 (inv), re-engagement 15 | offset 30, lapse/days inverted |
//! | defend | switching 20 (inv), competitor 30 (inv), differentiation 50 | switching/competitor inverted |
//!
//! Both catalogues are checked by the same validation as any custom schema
//! (see the tests below).

use crate::schema::{Amplification, Schema, ScoringStrategy, SignalDefinition, StageDefinition};
use crate::SignalKey;

/// Stage ids shared by both catalogues, in lifecycle order.
pub const STAGE_IDS: [&str; 6] = [
    "create",
    "expand",
    "strengthen",
    "retrieve",
    "reinstate",
    "defend",
];

/// Upper bound for count-valued signals (associations, occasions).
const COUNT_MAX: f64 = 15.0;

/// Upper bound for day-valued signals.
const DAYS_MAX: f64 = 365.0;

impl Schema {
    /// Benchmark-ratio catalogue of the diagnostic tool.
    #[must_use]
    pub fn diagnostic() -> Self {
        Schema::trusted(vec![
            StageDefinition::new(
                "create",
                vec![
                    SignalDefinition::new("awareness", 65.0),
                    SignalDefinition::new("consideration", 35.0),
                    SignalDefinition::new("recall", 25.0),
                ],
            ),
            StageDefinition::new(
                "expand",
                vec![
                    SignalDefinition::new("associations", 8.0).with_bounds(0.0, COUNT_MAX),
                    SignalDefinition::new("occasions", 5.0).with_bounds(0.0, COUNT_MAX),
                    SignalDefinition::new("crossCategory", 30.0),
                ],
            ),
            StageDefinition::new(
                "strengthen",
                vec![
                    SignalDefinition::new("loyalty", 55.0),
                    SignalDefinition::new("repeatPurchase", 45.0),
                    SignalDefinition::new("favourability", 60.0),
                ],
            ),
            StageDefinition::new(
                "retrieve",
                vec![
                    SignalDefinition::new("topOfMind", 20.0),
                    SignalDefinition::new("purchaseIntent", 40.0),
                    SignalDefinition::new("posRecall", 35.0),
                ],
            ),
            StageDefinition::new(
                "reinstate",
                vec![
                    SignalDefinition::inverted("lapseRate", 25.0),
                    SignalDefinition::inverted("timeSincePurchase", 60.0)
                        .with_bounds(0.0, DAYS_MAX),
                    SignalDefinition::new("reengagement", 15.0),
                ],
            ),
            StageDefinition::new(
                "defend",
                vec![
                    SignalDefinition::inverted("switching", 20.0),
                    SignalDefinition::inverted("competitorStrength", 30.0),
                    SignalDefinition::new("differentiation", 50.0),
                ],
            ),
        ])
    }

    /// Weighted-sum catalogue of the dynamic framework.
    ///
    /// Percent signals use a benchmark of 100 so the normalized term is
    /// the raw percentage itself.
    #[must_use]
    pub fn dynamic() -> Self {
        let weighted = |offset: f64, amplify: Option<(&str, f64)>| ScoringStrategy::WeightedSum {
            offset,
            amplification: amplify.map(|(signal, reference)| Amplification {
                signal: SignalKey::new(signal),
                reference,
            }),
        };

        Schema::trusted(vec![
            StageDefinition::new(
                "create",
                vec![
                    SignalDefinition::new("brandAwareness", 100.0).with_weight(0.3),
                    SignalDefinition::new("firstTimeConsideration", 100.0).with_weight(0.3),
                    SignalDefinition::new("unpromptedRecall", 100.0).with_weight(0.4),
                ],
            )
            .with_strategy(weighted(0.0, Some(("brandAwareness", 45.0)))),
            StageDefinition::new(
                "expand",
                vec![
                    SignalDefinition::new("brandAssociationsCount", 10.0)
                        .with_weight(0.4)
                        .with_bounds(0.0, COUNT_MAX),
                    SignalDefinition::new("categoriesPurchased", 5.0)
                        .with_weight(0.3)
                        .with_bounds(0.0, COUNT_MAX),
                    SignalDefinition::new("usageOccasions", 8.0)
                        .with_weight(0.3)
                        .with_bounds(0.0, COUNT_MAX),
                ],
            )
            .with_strategy(weighted(0.0, None)),
            StageDefinition::new(
                "strengthen",
                vec![
                    SignalDefinition::new("brandLoyalty", 100.0).with_weight(0.3),
                    SignalDefinition::new("repeatPurchase", 100.0).with_weight(0.25),
                    SignalDefinition::new("favourability", 100.0).with_weight(0.25),
                    SignalDefinition::new("promptedRecall", 100.0).with_weight(0.2),
                ],
            )
            .with_strategy(weighted(0.0, None)),
            StageDefinition::new(
                "retrieve",
                vec![
                    SignalDefinition::new("topOfMindAwareness", 100.0).with_weight(0.4),
                    SignalDefinition::new("purchaseIntent", 100.0).with_weight(0.35),
                    SignalDefinition::new("spontaneousRecallPOS", 100.0).with_weight(0.25),
                ],
            )
            .with_strategy(weighted(0.0, Some(("topOfMindAwareness", 22.0)))),
            StageDefinition::new(
                "reinstate",
                vec![
                    SignalDefinition::inverted("lapsedUsage", 100.0).with_weight(0.4),
                    SignalDefinition::inverted("timeSinceLastPurchase", 100.0)
                        .with_weight(0.3)
                        .with_bounds(0.0, DAYS_MAX),
                    SignalDefinition::new("reengagementResponse", 100.0).with_weight(0.3),
                ],
            )
            .with_strategy(weighted(30.0, None)),
            StageDefinition::new(
                "defend",
                vec![
                    SignalDefinition::inverted("switchingBehavior", 100.0).with_weight(0.35),
                    SignalDefinition::inverted("competitorAssociationStrength", 100.0)
                        .with_weight(0.3),
                    SignalDefinition::new("differentiationScore", 100.0).with_weight(0.35),
                ],
            )
            .with_strategy(weighted(0.0, None)),
        ])
    }
}

// =============================================================================
// TESTS
// =============================================================================
