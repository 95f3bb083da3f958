//! Stage-graph modelling, impact aggregation, and circularity scoring for metal
//! production routes.
//!
//! A route is an ordered sequence of processing stages (extraction through
//! recycling), each carrying environmental metrics per functional unit and
//! optionally declaring circular loops that send recovered material back to an
//! earlier stage. This crate validates loosely typed route payloads, folds the
//! stage metrics into route totals, credits loop savings to their target
//! stages, scores circularity on a 0–100 scale, and compares routes.
//!
//! # Features
//!
//! - **Validation** — Untyped JSON is normalized into a typed
//!   [`ProcessingRoute`], with fatal errors and recoverable warnings kept apart
//! - **Aggregation** — Deterministic field-wise totals of carbon, energy,
//!   water, and waste
//! - **Loop attribution** — Carbon savings of circular loops grouped by the
//!   stage receiving the recovered material
//! - **Circularity scoring** — Authoritative scores pass through; otherwise a
//!   weighted mean of recycled content, recovery, and carbon savings
//! - **Comparison** — Field-by-field deltas between two routes and ranked
//!   multi-scenario comparisons with recommendations
//! - **Compliance** — Route carbon checked against per-metal emission
//!   benchmarks
//! - **Edges** — A built-in reference catalog, a route generator client, and
//!   an in-memory repository for projects and scenarios
//!
//! # Quick Start
//!
//! The main entry point is [`evaluate_payload`], which validates a payload and
//! evaluates the resulting route under a [`ScoringConfig`]:
//!
//! ```
//! use circu_forge::{ScoringConfig, ValidationError, evaluate_payload};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "id": "cu-demo",
//!     "name": "Copper demo route",
//!     "stages": [
//!         { "id": "mine", "type": "extraction",
//!           "metrics": { "carbonEmissions": 15, "energyConsumption": 120 } },
//!         { "id": "smelt", "type": "smelting",
//!           "metrics": { "carbonEmissions": 1500, "energyConsumption": 900 },
//!           "circularLoops": [
//!               { "targetStage": "mine", "material": "slag",
//!                 "recoveryRate": 60, "carbonSavings": 50 }
//!           ] },
//!         { "id": "fab", "type": "manufacturing",
//!           "metrics": { "carbonEmissions": 8000 } }
//!     ]
//! });
//!
//! let (validated, evaluation) = evaluate_payload(&payload, &ScoringConfig::default())?;
//!
//! // Stage metrics sum in route order
//! assert_eq!(evaluation.aggregate.total_carbon, 9515.0);
//! assert_eq!(evaluation.aggregate.stage_count, 3);
//!
//! // The smelter's loop credits its savings to the mine
//! assert_eq!(evaluation.aggregate.carbon_saved, 50.0);
//! assert_eq!(evaluation.loops.savings_for("mine"), 50.0);
//!
//! // Scores are always on a 0-100 scale
//! let score = evaluation.aggregate.circularity_score;
//! assert!((0.0..=100.0).contains(&score));
//!
//! // Every loop resolved, so nothing was flagged
//! assert!(validated.warnings.is_empty());
//! # Ok::<(), ValidationError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`] — JSON/TOML reading and writing, the reference catalog, the route
//!   generator client, and the persistence interface
//! - [`evaluate`] / [`evaluate_payload`] — Full route evaluation
//! - [`ScoringConfig`] — Default score weights and recommendation thresholds
//!
//! # Pipeline Steps
//!
//! - [`validate`] — Payload to [`ValidatedRoute`]
//! - [`build_graph`] — Stage order plus loops keyed by target ([`StageGraph`])
//! - [`aggregate`] — Route [`Totals`]
//! - [`attribute_loops`] — Loop savings per target ([`LoopSummary`])
//! - [`score`] — [`CircularityScore`]
//! - [`compare`] / [`compare_scenarios`] — [`DeltaResult`] and
//!   [`ScenarioComparison`]
//! - [`check_emission_compliance`] — [`ComplianceCheck`] against
//!   [`EmissionBenchmarks`]
//!
//! # Data Types
//!
//! - [`ProcessingRoute`] — Ordered stages with optional cached totals
//! - [`Stage`] — One processing step with [`StageMetrics`] and
//!   [`CircularLoop`]s
//! - [`StageType`] — The closed set of stage kinds
//! - [`AggregateResult`] — Route-level totals and score
//! - [`Metal`], [`Ore`] — Reference data
//! - [`Project`], [`Scenario`], [`Report`] — Stored records

mod model;
mod pipeline;

pub mod io;

pub use model::types::{ParseStageTypeError, StageType};

pub use model::stage::{ByproductFlow, CircularLoop, Facility, InputMass, Stage, StageMetrics};

pub use model::route::{LogisticsData, ProcessingRoute, ScoreWeights, TransportLeg};

pub use model::reference::{Metal, Ore};

pub use model::record::{Project, Report, Scenario, ScenarioKind};

pub use model::result::{
    AggregateResult, AlternativeOutcome, DeltaResult, FieldDelta, NamedResult, ScenarioComparison,
    StageBreakdown,
};

pub use pipeline::{
    BEST_AVAILABLE, BenchmarkSource, CircularityScore, CompareError, ComplianceCheck,
    ComplianceStatus, DanglingLoop, EmissionBenchmarks, Evaluation, LoopEdge, LoopSummary,
    LoopsByTarget, RecommendationThresholds, ScoringConfig, StageGraph, SubScores, Totals,
    ValidatedRoute, ValidationError, ValidationWarning, aggregate, attribute_loops, build_graph,
    check_emission_compliance, compare, compare_scenarios, evaluate, evaluate_payload, score,
    validate,
};
