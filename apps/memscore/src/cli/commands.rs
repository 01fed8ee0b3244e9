//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command writes to the given output, either as aligned text or,
//! in JSON mode, as a single pretty-printed JSON document.

use crate::cli::{CompareArgs, DecayArgs};
use crate::config::{Config, DecayConfig, DecayModelKind};
use crate::error::CliError;
use memscore_core::{
    DecayModel, DecayProjection, Engine, Horizon, MetricInputs, OverallStatus, ProjectionRounding,
    ReferenceVector, Schema, Score, ScoreError, ScoringStrategy, SignalKey, StageId, StageScores,
    VULNERABLE_THRESHOLD, profile_for,
};
use std::io::Write;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a metric or competitor input file (10 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
pub const MAX_INPUT_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum size of a TOML schema file (1 MB).
pub const MAX_SCHEMA_FILE_SIZE: u64 = 1024 * 1024;

/// Maximum size of a TOML config file (1 MB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Diagnostic questions shown per priority stage in the report.
pub const REPORT_QUESTION_LIMIT: usize = 2;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CliError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CliError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(CliError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input path.
///
/// Canonicalizes the path to resolve symlinks and "..", and ensures it
/// names an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CliError> {
    let canonical = path.canonicalize().map_err(|e| {
        CliError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CliError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read a UTF-8 file after path and size validation.
pub fn read_text_file(path: &Path, max_size: u64) -> Result<String, CliError> {
    let validated_path = validate_file_path(path)?;
    validate_file_size(&validated_path, max_size)?;

    std::fs::read_to_string(&validated_path)
        .map_err(|e| CliError::Io(format!("Read file '{}': {}", path.display(), e)))
}

// =============================================================================
// INPUT LOADING
// =============================================================================

/// Resolve the `--schema` selector to a validated schema.
///
/// `diagnostic` and `dynamic` name the built-in catalogues; anything else
/// is read as a TOML schema file. Stage validation runs during
/// deserialization, so its failures are reported as TOML errors.
pub fn load_schema(selector: &str) -> Result<Schema, CliError> {
    match selector {
        "diagnostic" => Ok(Schema::diagnostic()),
        "dynamic" => Ok(Schema::dynamic()),
        path => {
            let text = read_text_file(Path::new(path), MAX_SCHEMA_FILE_SIZE)?;
            let schema: Schema = toml::from_str(&text).map_err(|e| CliError::Toml {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            tracing::info!("Loaded schema with {} stages from {}", schema.len(), path);
            Ok(schema)
        }
    }
}

fn json_error(origin: &str, reason: impl Into<String>) -> CliError {
    CliError::Json {
        path: origin.to_string(),
        reason: reason.into(),
    }
}

/// Parse metric inputs: `{ "stage": { "signal": number, ... }, ... }`.
///
/// A value that is not a JSON number is rejected as an invalid metric
/// value for its stage and signal.
pub fn parse_inputs(text: &str, origin: &str) -> Result<MetricInputs, CliError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| json_error(origin, e.to_string()))?;
    let stages = value
        .as_object()
        .ok_or_else(|| json_error(origin, "expected an object keyed by stage id"))?;

    let mut inputs = MetricInputs::new();
    for (stage, signals) in stages {
        let signals = signals.as_object().ok_or_else(|| {
            json_error(
                origin,
                format!("stage '{}' must be an object keyed by signal", stage),
            )
        })?;

        for (signal, raw) in signals {
            let value = raw.as_f64().ok_or_else(|| {
                ScoreError::metric(
                    &StageId::new(stage.as_str()),
                    &SignalKey::new(signal.as_str()),
                    format!("not a number: {}", raw),
                )
            })?;
            inputs.set(stage, signal, value);
        }
    }

    Ok(inputs)
}

/// Load metric inputs from a JSON file.
pub fn load_inputs(path: &Path) -> Result<MetricInputs, CliError> {
    let text = read_text_file(path, MAX_INPUT_FILE_SIZE)?;
    let inputs = parse_inputs(&text, &path.display().to_string())?;
    tracing::info!(
        "Loaded inputs for {} stages from {}",
        inputs.stage_ids().count(),
        path.display()
    );
    Ok(inputs)
}

/// Parse reference stage scores: `{ "stage": integer, ... }`, in file order.
pub fn parse_reference_scores(text: &str, origin: &str) -> Result<StageScores, CliError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| json_error(origin, e.to_string()))?;
    let stages = value
        .as_object()
        .ok_or_else(|| json_error(origin, "expected an object keyed by stage id"))?;

    let mut scores = StageScores::new();
    for (stage, raw) in stages {
        let value = raw
            .as_i64()
            .or_else(|| raw.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64))
            .ok_or_else(|| {
                json_error(
                    origin,
                    format!("score for stage '{}' must be an integer", stage),
                )
            })?;
        scores.insert(StageId::new(stage.as_str()), Score::new(value)?);
    }

    Ok(scores)
}

/// Load reference stage scores from a JSON file.
pub fn load_reference_scores(path: &Path) -> Result<StageScores, CliError> {
    let text = read_text_file(path, MAX_INPUT_FILE_SIZE)?;
    parse_reference_scores(&text, &path.display().to_string())
}

/// Parse a comma-separated horizon such as `0,4,8,12,16`.
pub fn parse_horizon(text: &str) -> Result<Horizon, CliError> {
    let offsets = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| CliError::Usage(format!("invalid horizon offset '{}'", s)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Horizon::new(offsets)?)
}

/// Parse a rounding mode name.
pub fn parse_rounding(text: &str) -> Result<ProjectionRounding, CliError> {
    match text.to_ascii_lowercase().as_str() {
        "nearest" => Ok(ProjectionRounding::Nearest),
        "up" | "ceil" => Ok(ProjectionRounding::Up),
        other => Err(CliError::Usage(format!(
            "unknown rounding '{}', expected 'nearest' or 'up'",
            other
        ))),
    }
}

// =============================================================================
// COMMAND CONTEXT
// =============================================================================

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub engine: Engine,
    /// The `--schema` selector, shown in output.
    pub schema_name: String,
    pub config: Config,
    pub json_mode: bool,
}

impl Context {
    /// Context over a built-in or loaded schema with default config.
    #[must_use]
    pub fn new(schema: Schema, schema_name: impl Into<String>, json_mode: bool) -> Self {
        Self {
            engine: Engine::new(schema),
            schema_name: schema_name.into(),
            config: Config::default(),
            json_mode,
        }
    }
}

/// Decay parameters after merging config and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct DecaySettings {
    pub horizon: Horizon,
    pub model: DecayModel,
    pub rounding: ProjectionRounding,
}

impl DecaySettings {
    /// Merge the `[decay]` config section with command-line flags.
    ///
    /// Flags win. `--stepped` selects the stepped schedule and `--rate` the
    /// geometric model; without either the config's `model` decides.
    pub fn resolve(config: &DecayConfig, args: &DecayArgs) -> Result<Self, CliError> {
        let horizon = match &args.horizon {
            Some(text) => parse_horizon(text)?,
            None => Horizon::new(config.horizon.clone())?,
        };

        let rounding = match &args.rounding {
            Some(text) => parse_rounding(text)?,
            None => config.rounding,
        };

        let model = match (args.stepped, args.rate) {
            (true, Some(_)) => {
                return Err(CliError::Usage(
                    "--rate does not apply to the stepped schedule".to_string(),
                ));
            }
            (true, None) => DecayModel::irregular(),
            (false, Some(rate)) => DecayModel::geometric(rate),
            (false, None) => match config.model {
                DecayModelKind::Stepped => DecayModel::irregular(),
                DecayModelKind::Geometric => DecayModel::geometric(config.rate),
            },
        };
        model.validate()?;

        Ok(Self {
            horizon,
            model,
            rounding,
        })
    }
}

// =============================================================================
// RENDERING HELPERS
// =============================================================================

fn display_name(stage: &StageId) -> &str {
    profile_for(stage).map_or(stage.as_str(), |p| p.short_name)
}

fn write_json<W: Write>(out: &mut W, value: &serde_json::Value) -> Result<(), CliError> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn describe_model(model: &DecayModel) -> String {
    match model {
        DecayModel::Geometric { rate_per_unit } => {
            format!("geometric, {:.1}% per unit", rate_per_unit * 100.0)
        }
        DecayModel::Stepped { steps } => format!("stepped, {} scheduled offsets", steps.len()),
    }
}

fn rounding_name(rounding: ProjectionRounding) -> &'static str {
    match rounding {
        ProjectionRounding::Nearest => "nearest",
        ProjectionRounding::Up => "up",
    }
}

fn write_projection<W: Write>(out: &mut W, projection: &DecayProjection) -> Result<(), CliError> {
    writeln!(out, "{:>6}  {:>5}  Status", "Offset", "Score")?;
    for point in &projection.points {
        let status = OverallStatus::from_score(point.projected_score);
        let flag = if point.below_threshold {
            "  below threshold"
        } else {
            ""
        };
        writeln!(
            out,
            "{:>6}  {:>5}  {}{}",
            point.offset, point.projected_score, status, flag
        )?;
    }

    writeln!(out)?;
    match projection.first_below_threshold {
        Some(offset) => writeln!(
            out,
            "Warning: without reinforcement the score falls below {} at offset {}.",
            VULNERABLE_THRESHOLD, offset
        )?,
        None => writeln!(
            out,
            "Score stays at or above {} across the horizon.",
            VULNERABLE_THRESHOLD
        )?,
    }
    Ok(())
}

fn score_inputs(ctx: &Context, input: &Path) -> Result<StageScores, CliError> {
    let inputs = load_inputs(input)?;
    let scores = ctx.engine.score_all(&inputs)?;
    tracing::debug!("Stage scores: {:?}", scores);
    Ok(scores)
}

// =============================================================================
// STAGES COMMAND
// =============================================================================

/// List the stages of the active schema.
pub fn cmd_stages<W: Write>(ctx: &Context, out: &mut W) -> Result<(), CliError> {
    let stages = ctx.engine.list_stages();

    if ctx.json_mode {
        let output = serde_json::json!({
            "schema": ctx.schema_name,
            "stages": stages,
        });
        return write_json(out, &output);
    }

    let title = format!("Memory Score Stages ({})", ctx.schema_name);
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.len()))?;

    for stage in stages {
        writeln!(out)?;
        let detail = match &stage.strategy {
            ScoringStrategy::BenchmarkRatio => String::new(),
            ScoringStrategy::WeightedSum {
                offset,
                amplification,
            } => {
                let mut detail = String::new();
                if *offset != 0.0 {
                    detail.push_str(&format!(", offset {}", offset));
                }
                if let Some(amp) = amplification {
                    detail.push_str(&format!(
                        ", amplified by {} vs {}",
                        amp.signal, amp.reference
                    ));
                }
                detail
            }
        };
        writeln!(
            out,
            "{} ({}) [{}{}]",
            stage.id,
            display_name(&stage.id),
            stage.strategy.name(),
            detail
        )?;

        for signal in &stage.signals {
            let key = if signal.inverted {
                format!("{} (inverted)", signal.key)
            } else {
                signal.key.to_string()
            };
            writeln!(
                out,
                "  {:<32} benchmark {:<6} weight {:<5} bounds [{}, {}]",
                key, signal.benchmark, signal.weight, signal.bounds.min, signal.bounds.max
            )?;
        }
    }

    Ok(())
}

// =============================================================================
// SCORE COMMAND
// =============================================================================

/// Score metric inputs per stage and overall.
pub fn cmd_score<W: Write>(ctx: &Context, out: &mut W, input: &Path) -> Result<(), CliError> {
    let scores = score_inputs(ctx, input)?;
    let aggregate = memscore_core::aggregate(&scores)?;

    if ctx.json_mode {
        let output = serde_json::json!({
            "schema": ctx.schema_name,
            "stages": aggregate.stages,
            "overall": aggregate.overall,
        });
        return write_json(out, &output);
    }

    writeln!(out, "Memory Score")?;
    writeln!(out, "============")?;
    writeln!(out)?;
    writeln!(out, "{:<12} {:>5}  Status", "Stage", "Score")?;
    for stage in &aggregate.stages {
        writeln!(
            out,
            "{:<12} {:>5}  {}",
            display_name(&stage.stage),
            stage.score,
            stage.status
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Overall: {} ({})",
        aggregate.overall.value, aggregate.overall.status
    )?;

    Ok(())
}

// =============================================================================
// DECAY COMMAND
// =============================================================================

/// Project the overall score forward without reinforcement.
pub fn cmd_decay<W: Write>(ctx: &Context, out: &mut W, args: &DecayArgs) -> Result<(), CliError> {
    let overall = match (args.score, &args.input) {
        (Some(score), _) => Score::new(score)?,
        (None, Some(input)) => {
            let scores = score_inputs(ctx, input)?;
            ctx.engine.overall_score(&scores)?.value
        }
        (None, None) => {
            return Err(CliError::Usage(
                "decay needs --score or --input".to_string(),
            ));
        }
    };

    let settings = DecaySettings::resolve(&ctx.config.decay, args)?;
    let projection =
        memscore_core::project(overall, &settings.horizon, &settings.model, settings.rounding)?;
    tracing::debug!("Projected scores: {:?}", projection.scores());

    if ctx.json_mode {
        let output = serde_json::json!({
            "overall": overall,
            "model": settings.model,
            "rounding": settings.rounding,
            "points": projection.points,
            "first_below_threshold": projection.first_below_threshold,
        });
        return write_json(out, &output);
    }

    writeln!(out, "Decay Projection")?;
    writeln!(out, "================")?;
    writeln!(out, "Starting score: {}", overall)?;
    writeln!(out, "Model:          {}", describe_model(&settings.model))?;
    writeln!(out, "Rounding:       {}", rounding_name(settings.rounding))?;
    writeln!(out)?;
    write_projection(out, &projection)
}

// =============================================================================
// COMPARE COMMAND
// =============================================================================

/// Gap analysis against a competitor or a flat benchmark.
pub fn cmd_compare<W: Write>(
    ctx: &Context,
    out: &mut W,
    args: &CompareArgs,
) -> Result<(), CliError> {
    let scores = score_inputs(ctx, &args.input)?;

    let reference = match (&args.competitor, args.benchmark.or(ctx.config.compare.benchmark)) {
        (Some(path), _) => {
            let name = args.name.clone().unwrap_or_else(|| "Competitor".to_string());
            ReferenceVector::competitor(name, load_reference_scores(path)?)
        }
        (None, Some(benchmark)) => ReferenceVector::benchmark(Score::new(benchmark)?),
        (None, None) => {
            return Err(CliError::Usage(
                "compare needs --competitor or --benchmark (or [compare] benchmark in the config)"
                    .to_string(),
            ));
        }
    };

    let comparison = ctx.engine.compare(&scores, &reference)?;

    if ctx.json_mode {
        let output = serde_json::json!({
            "reference": comparison.reference,
            "gaps": comparison.gaps,
            "advantages": comparison.advantages().iter().map(|g| &g.stage).collect::<Vec<_>>(),
            "vulnerabilities": comparison.vulnerabilities().iter().map(|g| &g.stage).collect::<Vec<_>>(),
            "own_total": comparison.own_total(),
            "reference_total": comparison.reference_total(),
            "total_gap": comparison.total_gap(),
        });
        return write_json(out, &output);
    }

    let title = format!("Comparison vs {}", comparison.reference);
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.len()))?;
    writeln!(out)?;
    writeln!(out, "{:<12} {:>4} {:>4} {:>5}", "Stage", "Own", "Ref", "Gap")?;
    for gap in &comparison.gaps {
        writeln!(
            out,
            "{:<12} {:>4} {:>4} {:>+5}",
            display_name(&gap.stage),
            gap.own_score,
            gap.reference_score,
            gap.gap
        )?;
    }
    writeln!(
        out,
        "{:<12} {:>4} {:>4} {:>+5}",
        "Total",
        comparison.own_total(),
        comparison.reference_total(),
        comparison.total_gap()
    )?;

    let names = |gaps: Vec<&memscore_core::StageGap>| {
        if gaps.is_empty() {
            "none".to_string()
        } else {
            gaps.iter()
                .map(|g| display_name(&g.stage).to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    };
    writeln!(out)?;
    writeln!(out, "Advantages:      {}", names(comparison.advantages()))?;
    writeln!(out, "Vulnerabilities: {}", names(comparison.vulnerabilities()))?;

    Ok(())
}

// =============================================================================
// REPORT COMMAND
// =============================================================================

/// Full diagnosis with priority interventions for the weakest stages.
pub fn cmd_report<W: Write>(ctx: &Context, out: &mut W, input: &Path) -> Result<(), CliError> {
    let inputs = load_inputs(input)?;
    let settings = DecaySettings::resolve(&ctx.config.decay, &DecayArgs::default())?;
    let diagnosis = ctx.engine.diagnose(
        &inputs,
        &settings.horizon,
        &settings.model,
        settings.rounding,
    )?;
    tracing::debug!("Diagnosis: {:?}", diagnosis);

    if ctx.json_mode {
        let priorities: Vec<_> = diagnosis
            .priorities
            .iter()
            .map(|p| {
                let profile = profile_for(&p.stage);
                serde_json::json!({
                    "stage": p.stage,
                    "score": p.score,
                    "interventions": profile.map(|pr| pr.interventions).unwrap_or_default(),
                    "questions": profile
                        .map(|pr| pr.questions.iter().take(REPORT_QUESTION_LIMIT).collect::<Vec<_>>())
                        .unwrap_or_default(),
                })
            })
            .collect();
        let output = serde_json::json!({
            "schema": ctx.schema_name,
            "overall": diagnosis.overall,
            "stages": diagnosis.stages,
            "decay": diagnosis.decay,
            "priorities": priorities,
        });
        return write_json(out, &output);
    }

    writeln!(out, "Memory Score Report")?;
    writeln!(out, "===================")?;
    writeln!(out)?;
    writeln!(
        out,
        "Overall: {} ({})",
        diagnosis.overall.value, diagnosis.overall.status
    )?;
    writeln!(out)?;
    for stage in &diagnosis.stages {
        writeln!(
            out,
            "  {:<12} {:>5}  {}",
            display_name(&stage.stage),
            stage.score,
            stage.status
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Decay Outlook ({})", describe_model(&settings.model))?;
    writeln!(out, "-------------")?;
    write_projection(out, &diagnosis.decay)?;

    writeln!(out)?;
    writeln!(out, "Priority Stages")?;
    writeln!(out, "---------------")?;
    for (rank, priority) in diagnosis.priorities.iter().enumerate() {
        writeln!(out)?;
        match profile_for(&priority.stage) {
            Some(profile) => {
                writeln!(
                    out,
                    "{}. {} ({}): {}",
                    rank + 1,
                    profile.name,
                    priority.score,
                    profile.cognitive_process
                )?;
                for intervention in profile.interventions {
                    writeln!(out, "   - {}", intervention)?;
                }
                for question in profile.questions.iter().take(REPORT_QUESTION_LIMIT) {
                    writeln!(out, "   ? {}", question)?;
                }
            }
            None => writeln!(out, "{}. {} ({})", rank + 1, priority.stage, priority.score)?,
        }
    }

    Ok(())
}
