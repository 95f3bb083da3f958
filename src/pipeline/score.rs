//! Circularity scoring.
//!
//! A route either carries an authoritative score, which is passed through
//! untouched, or gets one computed from three sub-scores in `[0, 1]`:
//!
//! - **recycled content**: recycled share of the input mass at the earliest
//!   stage that declares one
//! - **recovery**: average recovery rate of the loops leaving end-of-life and
//!   recycling stages
//! - **carbon savings**: loop savings relative to gross emissions
//!
//! The weighted mean is scaled to `0..=100` and rounded.

use super::aggregate::Totals;
use super::attribute::LoopSummary;
use super::config::ScoringConfig;
use super::graph::StageGraph;
use crate::model::route::{ProcessingRoute, ScoreWeights};
use crate::model::stage::Stage;
use serde::Serialize;
use tracing::debug;

/// The three normalized components of a computed score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub recycled_content: f64,
    pub recovery: f64,
    pub carbon_savings: f64,
}

/// Where a route's circularity score came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum CircularityScore {
    /// Supplied on the route and returned as is.
    Authoritative { value: f64 },
    /// Derived from the route's stages and loops.
    Computed {
        value: f64,
        weights: ScoreWeights,
        sub_scores: SubScores,
    },
}

impl CircularityScore {
    #[inline]
    pub fn value(&self) -> f64 {
        match *self {
            Self::Authoritative { value } | Self::Computed { value, .. } => value,
        }
    }

    #[inline]
    pub fn is_authoritative(&self) -> bool {
        matches!(self, Self::Authoritative { .. })
    }
}

/// Scores a route.
///
/// Weight precedence is route, then `config`, then equal weights; see
/// [`ScoreWeights::normalized`] for how degenerate weight sets are handled.
pub fn score(
    route: &ProcessingRoute,
    totals: &Totals,
    loops: &LoopSummary,
    graph: &StageGraph<'_>,
    config: &ScoringConfig,
) -> CircularityScore {
    if let Some(value) = route.circularity_score {
        debug!(value, "using authoritative circularity score");
        return CircularityScore::Authoritative { value };
    }

    let weights = route.score_weights.unwrap_or(config.weights).normalized();

    if totals.stage_count == 0 {
        return CircularityScore::Computed {
            value: 0.0,
            weights,
            sub_scores: SubScores::default(),
        };
    }

    let sub_scores = SubScores {
        recycled_content: recycled_content(graph.order),
        recovery: recovery(graph),
        carbon_savings: carbon_savings(totals.total_carbon, loops.carbon_saved),
    };

    let mean = (weights.recycled_content * sub_scores.recycled_content
        + weights.recovery * sub_scores.recovery
        + weights.carbon_savings * sub_scores.carbon_savings)
        / weights.sum();
    // `clamp` passes NaN through unchanged.
    let value = if mean.is_finite() {
        (100.0 * mean).round().clamp(0.0, 100.0)
    } else {
        0.0
    };

    debug!(
        value,
        recycled_content = sub_scores.recycled_content,
        recovery = sub_scores.recovery,
        carbon_savings = sub_scores.carbon_savings,
        "computed circularity score"
    );

    CircularityScore::Computed {
        value,
        weights,
        sub_scores,
    }
}

fn recycled_content(order: &[Stage]) -> f64 {
    order
        .iter()
        .find_map(|stage| stage.input_mass.and_then(|m| m.recycled_ratio()))
        .unwrap_or(0.0)
}

fn recovery(graph: &StageGraph<'_>) -> f64 {
    let mut stage_means = Vec::new();

    for (index, stage) in graph.order.iter().enumerate() {
        if !stage.stage_type.is_recovery_stage() {
            continue;
        }
        let rates: Vec<f64> = graph
            .loops_from(index)
            .map(|edge| (edge.circular_loop.recovery_rate / 100.0).clamp(0.0, 1.0))
            .collect();
        if !rates.is_empty() {
            stage_means.push(rates.iter().sum::<f64>() / rates.len() as f64);
        }
    }

    if stage_means.is_empty() {
        0.0
    } else {
        stage_means.iter().sum::<f64>() / stage_means.len() as f64
    }
}

/// Share of gross carbon avoided by loops. Totals that overflowed to
/// infinity have no defined share and score 0.
fn carbon_savings(total_carbon: f64, carbon_saved: f64) -> f64 {
    let gross = total_carbon + carbon_saved;
    if !(gross.is_finite() && gross > 0.0) {
        return 0.0;
    }
    let ratio = carbon_saved / gross;
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stage::{CircularLoop, StageMetrics};
    use crate::model::types::StageType;
    use crate::pipeline::aggregate::aggregate;
    use crate::pipeline::attribute::attribute_loops;
    use crate::pipeline::graph::build_graph;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn run(route: &ProcessingRoute, config: &ScoringConfig) -> CircularityScore {
        let graph = build_graph(route);
        let totals = aggregate(graph.order);
        let loops = attribute_loops(&graph.loops_by_target);
        score(route, &totals, &loops, &graph, config)
    }

    fn circular_route() -> ProcessingRoute {
        ProcessingRoute::new("r", "Circular")
            .with_stage(
                Stage::new("smelt", "Smelt", StageType::Smelting)
                    .with_metrics(StageMetrics::new(300.0, 0.0, 0.0, 0.0))
                    .with_input_mass(40.0, 100.0),
            )
            .with_stage(
                Stage::new("rc", "Recycle", StageType::Recycling)
                    .with_loop(CircularLoop::new("smelt", "scrap", 80.0, 100.0)),
            )
    }

    #[test]
    fn authoritative_score_wins() {
        let mut route = circular_route();
        route.circularity_score = Some(42.5);
        let result = run(&route, &ScoringConfig::default());
        assert!(result.is_authoritative());
        assert_eq!(result.value(), 42.5);
    }

    #[test]
    fn authoritative_zero_is_honored() {
        let mut route = circular_route();
        route.circularity_score = Some(0.0);
        assert_eq!(
            run(&route, &ScoringConfig::default()),
            CircularityScore::Authoritative { value: 0.0 }
        );
    }

    #[test]
    fn zero_stage_route_scores_zero() {
        let route = ProcessingRoute::new("empty", "Empty");
        let result = run(&route, &ScoringConfig::default());
        assert!(!result.is_authoritative());
        assert_eq!(result.value(), 0.0);
    }

    #[test]
    fn computes_equal_weighted_mean() {
        // recycled 0.4, recovery 0.8, carbon 100 / 400 = 0.25
        let result = run(&circular_route(), &ScoringConfig::default());
        match result {
            CircularityScore::Computed {
                value, sub_scores, ..
            } => {
                assert!(approx_eq(sub_scores.recycled_content, 0.4));
                assert!(approx_eq(sub_scores.recovery, 0.8));
                assert!(approx_eq(sub_scores.carbon_savings, 0.25));
                assert_eq!(value, 48.0);
            }
            other => panic!("expected computed score, got {:?}", other),
        }
    }

    #[test]
    fn route_weights_override_config() {
        let mut route = circular_route();
        route.score_weights = Some(ScoreWeights {
            recycled_content: 0.0,
            recovery: 1.0,
            carbon_savings: 0.0,
        });
        let config = ScoringConfig {
            weights: ScoreWeights {
                recycled_content: 1.0,
                recovery: 0.0,
                carbon_savings: 0.0,
            },
            ..ScoringConfig::default()
        };
        assert_eq!(run(&route, &config).value(), 80.0);
    }

    #[test]
    fn config_weights_apply_when_route_has_none() {
        let config = ScoringConfig {
            weights: ScoreWeights {
                recycled_content: 1.0,
                recovery: 0.0,
                carbon_savings: 0.0,
            },
            ..ScoringConfig::default()
        };
        assert_eq!(run(&circular_route(), &config).value(), 40.0);
    }

    #[test]
    fn all_zero_weights_fall_back_to_equal() {
        let mut route = circular_route();
        route.score_weights = Some(ScoreWeights {
            recycled_content: 0.0,
            recovery: -2.0,
            carbon_savings: 0.0,
        });
        assert_eq!(run(&route, &ScoringConfig::default()).value(), 48.0);
    }

    #[test]
    fn linear_route_without_loops_has_no_carbon_term() {
        let route = ProcessingRoute::new("r", "Linear").with_stage(
            Stage::new("mine", "Mine", StageType::Extraction)
                .with_metrics(StageMetrics::new(50.0, 1.0, 1.0, 1.0)),
        );
        match run(&route, &ScoringConfig::default()) {
            CircularityScore::Computed {
                value, sub_scores, ..
            } => {
                assert_eq!(sub_scores, SubScores::default());
                assert_eq!(value, 0.0);
            }
            other => panic!("expected computed score, got {:?}", other),
        }
    }

    #[test]
    fn score_stays_within_bounds() {
        let route = ProcessingRoute::new("r", "Saturated")
            .with_stage(Stage::new("m", "Manufacture", StageType::Manufacturing).with_input_mass(500.0, 100.0))
            .with_stage(
                Stage::new("eol", "Collection", StageType::Eol)
                    .with_loop(CircularLoop::new("m", "scrap", 250.0, 1e9)),
            );
        let value = run(&route, &ScoringConfig::default()).value();
        assert!((0.0..=100.0).contains(&value));
        assert_eq!(value, 100.0);
    }

    #[test]
    fn recovery_averages_per_stage_means() {
        let route = ProcessingRoute::new("r", "Two recyclers")
            .with_stage(Stage::new("s", "Smelt", StageType::Smelting))
            .with_stage(
                Stage::new("eol", "Collection", StageType::Eol)
                    .with_loop(CircularLoop::new("s", "scrap", 100.0, 0.0))
                    .with_loop(CircularLoop::new("s", "scrap", 50.0, 0.0)),
            )
            .with_stage(
                Stage::new("rc", "Recycle", StageType::Recycling)
                    .with_loop(CircularLoop::new("s", "dross", 25.0, 0.0)),
            )
            .with_stage(
                Stage::new("r2", "Refine", StageType::Refining)
                    .with_loop(CircularLoop::new("s", "off-cuts", 100.0, 0.0)),
            );
        let graph = build_graph(&route);
        // (0.75 + 0.25) / 2; refining loops do not count
        assert!(approx_eq(recovery(&graph), 0.5));
    }

    #[test]
    fn recycled_content_uses_earliest_declared_mass() {
        let order = vec![
            Stage::new("a", "Mine", StageType::Extraction).with_input_mass(0.0, 0.0),
            Stage::new("b", "Smelt", StageType::Smelting).with_input_mass(10.0, 40.0),
            Stage::new("c", "Refine", StageType::Refining).with_input_mass(40.0, 40.0),
        ];
        assert!(approx_eq(recycled_content(&order), 0.25));
    }

    #[test]
    fn overflowing_totals_keep_score_defined() {
        let route = ProcessingRoute::new("r", "Huge")
            .with_stage(
                Stage::new("s1", "Smelt A", StageType::Smelting)
                    .with_metrics(StageMetrics::new(1e308, 0.0, 0.0, 0.0)),
            )
            .with_stage(
                Stage::new("s2", "Smelt B", StageType::Smelting)
                    .with_metrics(StageMetrics::new(1e308, 0.0, 0.0, 0.0)),
            )
            .with_stage(
                Stage::new("rc", "Recycle", StageType::Recycling)
                    .with_loop(CircularLoop::new("s1", "scrap", 80.0, 1e308))
                    .with_loop(CircularLoop::new("s2", "scrap", 80.0, 1e308)),
            );

        let result = run(&route, &ScoringConfig::default());
        let CircularityScore::Computed { value, sub_scores, .. } = result else {
            panic!("expected a computed score");
        };
        assert!(value.is_finite());
        assert!((0.0..=100.0).contains(&value));
        assert_eq!(sub_scores.carbon_savings, 0.0);
        assert_eq!(value, 27.0);
    }

    #[test]
    fn carbon_savings_of_infinite_totals_is_zero() {
        assert_eq!(carbon_savings(f64::INFINITY, f64::INFINITY), 0.0);
        assert_eq!(carbon_savings(10.0, f64::INFINITY), 0.0);
        assert_eq!(carbon_savings(f64::INFINITY, 10.0), 0.0);
        assert!(approx_eq(carbon_savings(300.0, 100.0), 0.25));
    }
}
