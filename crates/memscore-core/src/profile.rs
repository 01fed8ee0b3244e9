//! # Stage Profiles
//!
//! Presentation-only metadata for the built-in stages: names, colour,
//! narrative copy, diagnostic questions and recommended interventions.
//!
//! Nothing here takes part in scoring. Front ends look profiles up by stage
//! id next to the engine's results; custom schemas simply have no profile.

use crate::StageId;
use serde::Serialize;

/// Display metadata of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
    pub hex: &'static str,
    pub cognitive_process: &'static str,
    pub questions: &'static [&'static str],
    pub indicators: &'static [&'static str],
    pub interventions: &'static [&'static str],
}

static PROFILES: [StageProfile; 6] = [
    StageProfile {
        id: "create",
        name: "CREATE MEMORY",
        short_name: "Create",
        hex: "#10b981",
        cognitive_process: "Initial encoding; formation of brand-category association; entry into awareness set",
        questions: &[
            "Do consumers know we exist in this category?",
            "Are we breaking through the clutter to register in memory?",
            "Is our brand being encoded for the first time among new prospects?",
            "Are we building awareness faster or slower than category benchmarks?",
            "Is our creative distinctive enough to create initial memory traces?",
        ],
        indicators: &[
            "Low awareness relative to category spend",
            "Low consideration despite awareness (encoding failure)",
            "Weak or absent spontaneous associations",
        ],
        interventions: &[
            "Increase reach among non-aware segments",
            "Deploy high-attention, emotionally distinctive creative",
            "Establish clear category membership cues",
        ],
    },
    StageProfile {
        id: "expand",
        name: "EXPAND MEMORY",
        short_name: "Expand",
        hex: "#3b82f6",
        cognitive_process: "Spreading activation; formation of multiple retrieval pathways; CEP linkage",
        questions: &[
            "How many Category Entry Points (situations) trigger our brand?",
            "Are we linked to enough occasions to maximize retrieval opportunities?",
            "Do consumers associate us with diverse needs or just one narrow context?",
            "Are we building mental availability breadth or just depth?",
            "What new occasions or need-states could we own?",
        ],
        indicators: &[
            "Narrow associations (few attributes linked)",
            "Limited usage occasions (single context dependency)",
            "Low cross-category purchase (shallow relationship)",
        ],
        interventions: &[
            "Develop campaigns targeting new Category Entry Points",
            "Create occasion-specific messaging variants",
            "Expand brand narrative beyond core positioning",
        ],
    },
    StageProfile {
        id: "strengthen",
        name: "STRENGTHEN MEMORY",
        short_name: "Strengthen",
        hex: "#8b5cf6",
        cognitive_process: "Memory consolidation; trace reinforcement; affective encoding maintenance",
        questions: &[
            "Are our existing memory structures decaying or staying strong?",
            "Is our media continuity sufficient to prevent forgetting?",
            "Do customers still feel positively about us (affective memory)?",
            "Are we maintaining loyalty or losing ground to habit erosion?",
            "How quickly do consumers forget us when we stop advertising?",
        ],
        indicators: &[
            "Declining loyalty scores over time",
            "Fading prompted recall (memory trace weakening)",
            "Drop in repeat purchase frequency",
        ],
        interventions: &[
            "Maintain continuous media presence (avoid dark periods)",
            "Deploy loyalty-focused messaging to existing customers",
            "Refresh creative while maintaining brand codes",
        ],
    },
    StageProfile {
        id: "retrieve",
        name: "RETRIEVE MEMORY",
        short_name: "Retrieve",
        hex: "#f59e0b",
        cognitive_process: "Cue-dependent retrieval; retrieval fluency; mental availability activation",
        questions: &[
            "Do consumers think of us when they have a need we can solve?",
            "Are we top-of-mind or buried in the consideration set?",
            "Why do people know us but not buy us? (awareness-action gap)",
            "Is our brand accessible at the moment of decision?",
            "Are the right retrieval cues present in the purchase environment?",
        ],
        indicators: &[
            "Not recalled at purchase moment despite awareness",
            "Low purchase intent despite positive perceptions",
            "Encoding-retrieval context mismatch",
        ],
        interventions: &[
            "Increase recency of exposure (continuous presence)",
            "Deploy point-of-sale and contextual triggers",
            "Strengthen distinctive brand assets as retrieval cues",
        ],
    },
    StageProfile {
        id: "reinstate",
        name: "REINSTATE MEMORY",
        short_name: "Reinstate",
        hex: "#f43f5e",
        cognitive_process: "Memory reactivation; context reinstatement; retrieval pathway restoration",
        questions: &[
            "Are we losing customers faster than we're acquiring them?",
            "Can we reactivate dormant memories among lapsed buyers?",
            "What triggers bring former customers back to the brand?",
            "How long before lapsed customers forget us entirely?",
            "Is our win-back messaging reconnecting with stored memories?",
        ],
        indicators: &[
            "High lapse rate (customers leaving faster than acquired)",
            "Long time since last purchase (memory decay progressing)",
            "Low response to re-engagement efforts",
        ],
        interventions: &[
            "Develop win-back campaigns with memory reinstatement cues",
            "Use personalized retargeting referencing past behavior",
            "Recreate original purchase context in messaging",
        ],
    },
    StageProfile {
        id: "defend",
        name: "DEFEND MEMORY",
        short_name: "Defend",
        hex: "#64748b",
        cognitive_process: "Competitive interference defense; memory inhibition resistance; differentiation",
        questions: &[
            "Are competitors overwriting our memory structures?",
            "Is our brand distinctive enough to resist substitution?",
            "Why are customers switching away from us?",
            "Are competitors stealing the associations we built?",
            "Do we own any attributes that competitors can't claim?",
        ],
        indicators: &[
            "High switching to competitors (memory displacement)",
            "Strong competitor associations on key attributes",
            "Weak differentiation (brand interchangeable)",
        ],
        interventions: &[
            "Audit competitor messaging and ownership",
            "Strengthen distinctive positioning",
            "Increase SOV during competitive heavy-ups",
        ],
    },
];

/// Profiles of all built-in stages, in lifecycle order.
#[must_use]
pub fn default_profiles() -> &'static [StageProfile] {
    &PROFILES
}

/// Profile of a stage, if it is one of the built-in stages.
#[must_use]
pub fn profile_for(stage: &StageId) -> Option<&'static StageProfile> {
    PROFILES.iter().find(|p| p.id == stage.as_str())
}
