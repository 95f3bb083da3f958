mod aggregate;
mod attribute;
mod compare;
mod compliance;
mod config;
mod error;
mod graph;
mod score;
mod validate;

pub use aggregate::{Totals, aggregate};
pub use attribute::{LoopSummary, attribute_loops};
pub use compare::{compare, compare_scenarios};
pub use compliance::{
    BEST_AVAILABLE, BenchmarkSource, ComplianceCheck, ComplianceStatus, EmissionBenchmarks,
    check_emission_compliance,
};
pub use config::{RecommendationThresholds, ScoringConfig};
pub use error::{CompareError, ValidationError, ValidationWarning};
pub use graph::{DanglingLoop, LoopEdge, LoopsByTarget, StageGraph, build_graph};
pub use score::{CircularityScore, SubScores, score};
pub use validate::{ValidatedRoute, validate};

use crate::model::result::{AggregateResult, StageBreakdown};
use crate::model::route::ProcessingRoute;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Everything derived from one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub aggregate: AggregateResult,
    pub breakdown: Vec<StageBreakdown>,
    pub loops: LoopSummary,
    pub dangling: Vec<DanglingLoop>,
    pub score: CircularityScore,
}

pub fn evaluate(route: &ProcessingRoute, config: &ScoringConfig) -> Evaluation {
    let graph = build_graph(route);
    let totals = aggregate(graph.order);
    let loops = attribute_loops(&graph.loops_by_target);
    let score = score(route, &totals, &loops, &graph, config);

    check_cached_totals(route, &totals);

    let breakdown = breakdown(&graph, &totals, &loops);

    let aggregate = AggregateResult {
        total_carbon: totals.total_carbon,
        total_energy: totals.total_energy,
        total_water: totals.total_water,
        total_waste: totals.total_waste,
        stage_count: totals.stage_count,
        circular_loops_count: loops.circular_loops_count,
        carbon_saved: loops.carbon_saved,
        circularity_score: score.value(),
    };

    debug!(
        route = %route.id,
        total_carbon = aggregate.total_carbon,
        carbon_saved = aggregate.carbon_saved,
        score = aggregate.circularity_score,
        "evaluated route"
    );

    Evaluation {
        aggregate,
        breakdown,
        loops,
        dangling: graph.dangling,
        score,
    }
}

/// Validates a raw payload and evaluates the resulting route.
pub fn evaluate_payload(
    payload: &Value,
    config: &ScoringConfig,
) -> Result<(ValidatedRoute, Evaluation), ValidationError> {
    let validated = validate(payload)?;
    let evaluation = evaluate(&validated.route, config);
    Ok((validated, evaluation))
}

fn breakdown(graph: &StageGraph<'_>, totals: &Totals, loops: &LoopSummary) -> Vec<StageBreakdown> {
    graph
        .order
        .iter()
        .map(|stage| {
            let carbon_share = if totals.total_carbon > 0.0 {
                100.0 * stage.metrics.carbon_emissions / totals.total_carbon
            } else {
                0.0
            };
            StageBreakdown {
                stage_id: stage.id.clone(),
                name: stage.name.clone(),
                stage_type: stage.stage_type,
                metrics: stage.metrics,
                carbon_share,
                savings_received: loops.savings_for(&stage.id),
                loops_declared: stage.loop_count(),
            }
        })
        .collect()
}

// Cached totals are informational; the recomputed aggregate is always used.
fn check_cached_totals(route: &ProcessingRoute, totals: &Totals) {
    let stale = |cached: f64, actual: f64| (cached - actual).abs() > 1e-6 * actual.abs().max(1.0);

    if let Some(cached) = route.total_carbon {
        if stale(cached, totals.total_carbon) {
            warn!(
                route = %route.id,
                cached,
                computed = totals.total_carbon,
                "route totalCarbon disagrees with its stages"
            );
        }
    }
    if let Some(cached) = route.total_energy {
        if stale(cached, totals.total_energy) {
            warn!(
                route = %route.id,
                cached,
                computed = totals.total_energy,
                "route totalEnergy disagrees with its stages"
            );
        }
    }
}
