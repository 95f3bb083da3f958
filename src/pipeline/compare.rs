//! Route and scenario comparison.
//!
//! [`compare`] is the field-by-field difference of two aggregate results.
//! [`compare_scenarios`] ranks several alternatives against one baseline and
//! phrases the outcome as short recommendations.

use super::config::{RecommendationThresholds, ScoringConfig};
use super::error::CompareError;
use crate::model::result::{
    AggregateResult, AlternativeOutcome, DeltaResult, FieldDelta, NamedResult, ScenarioComparison,
};
use tracing::debug;

const FALLBACK_RECOMMENDATION: &str = "Continue monitoring and optimizing production processes";

fn field(baseline: f64, scenario: f64) -> FieldDelta {
    let delta = scenario - baseline;
    let percent_change = if baseline == 0.0 {
        None
    } else {
        Some(100.0 * delta / baseline)
    };
    FieldDelta {
        baseline,
        scenario,
        delta,
        percent_change,
    }
}

/// Computes `b - a` for every aggregate field.
///
/// Percent changes are relative to `a` and absent wherever `a` is zero.
pub fn compare(a: &AggregateResult, b: &AggregateResult) -> DeltaResult {
    DeltaResult {
        total_carbon: field(a.total_carbon, b.total_carbon),
        total_energy: field(a.total_energy, b.total_energy),
        total_water: field(a.total_water, b.total_water),
        total_waste: field(a.total_waste, b.total_waste),
        stage_count: field(a.stage_count as f64, b.stage_count as f64),
        circular_loops_count: field(
            a.circular_loops_count as f64,
            b.circular_loops_count as f64,
        ),
        carbon_saved: field(a.carbon_saved, b.carbon_saved),
        circularity_score: field(a.circularity_score, b.circularity_score),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compares each alternative against `baseline`.
///
/// The best scenario is the one with the largest positive carbon reduction;
/// the baseline keeps the title when nothing improves on it. Scenarios that
/// name a metal must all name the same one.
///
/// # Errors
///
/// Returns [`CompareError::MetalMismatch`] if an alternative was evaluated
/// for a different metal than the baseline.
pub fn compare_scenarios(
    baseline: &NamedResult,
    alternatives: &[NamedResult],
    config: &ScoringConfig,
) -> Result<ScenarioComparison, CompareError> {
    if let Some(expected) = &baseline.metal {
        for alt in alternatives {
            match &alt.metal {
                Some(found) if !found.eq_ignore_ascii_case(expected) => {
                    return Err(CompareError::MetalMismatch {
                        name: alt.name.clone(),
                        expected: expected.clone(),
                        found: found.clone(),
                    });
                }
                _ => {}
            }
        }
    }

    let base = &baseline.result;
    let mut best_scenario = baseline.name.clone();
    let mut max_reduction = 0.0_f64;
    let mut max_improvement = 0.0_f64;

    let outcomes: Vec<AlternativeOutcome> = alternatives
        .iter()
        .map(|alt| {
            let delta = compare(base, &alt.result);
            let carbon_reduction_pct = delta.total_carbon.percent_change.map(|p| -p);
            let circularity_improvement = delta.circularity_score.delta;

            match carbon_reduction_pct {
                Some(reduction) if reduction > max_reduction => {
                    max_reduction = reduction;
                    best_scenario = alt.name.clone();
                }
                _ => {}
            }
            max_improvement = max_improvement.max(circularity_improvement);

            AlternativeOutcome {
                name: alt.name.clone(),
                result: alt.result,
                delta,
                carbon_reduction_pct,
                circularity_improvement,
            }
        })
        .collect();

    let recommendations = recommend(base, &outcomes, &config.recommendations);

    debug!(
        alternatives = outcomes.len(),
        best = %best_scenario,
        "compared scenarios"
    );

    Ok(ScenarioComparison {
        metal: baseline.metal.clone(),
        baseline_name: baseline.name.clone(),
        baseline: *base,
        alternatives: outcomes,
        best_scenario,
        max_carbon_reduction_pct: round1(max_reduction),
        max_circularity_improvement: round1(max_improvement),
        recommendations,
    })
}

fn recommend(
    baseline: &AggregateResult,
    outcomes: &[AlternativeOutcome],
    thresholds: &RecommendationThresholds,
) -> Vec<String> {
    let mut out = Vec::new();

    let reduction = |o: &AlternativeOutcome| o.carbon_reduction_pct.unwrap_or(0.0);
    let best = outcomes.iter().fold(None::<&AlternativeOutcome>, |best, o| match best {
        Some(b) if reduction(b) >= reduction(o) => Some(b),
        _ => Some(o),
    });

    if let Some(best) = best {
        let pct = reduction(best);
        if pct > thresholds.carbon_reduction_pct {
            out.push(format!(
                "Adopting '{}' could reduce carbon emissions by {:.0}%",
                best.name, pct
            ));
        }
        if best.result.circularity_score > thresholds.high_circularity {
            out.push(format!(
                "'{}' achieves a high circularity score of {:.0}",
                best.name, best.result.circularity_score
            ));
        }
        if best.result.total_energy < baseline.total_energy * thresholds.energy_ratio {
            out.push(format!(
                "Consider transitioning to '{}' for significant energy savings",
                best.name
            ));
        }
    }

    if baseline.circularity_score < thresholds.low_circularity {
        out.push(
            "Increase recycled content to improve circularity and reduce environmental impact"
                .to_string(),
        );
    }

    if out.is_empty() {
        out.push(FALLBACK_RECOMMENDATION.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(carbon: f64, energy: f64, score: f64) -> AggregateResult {
        AggregateResult {
            total_carbon: carbon,
            total_energy: energy,
            total_water: 10.0,
            total_waste: 5.0,
            stage_count: 4,
            circular_loops_count: 1,
            carbon_saved: 20.0,
            circularity_score: score,
        }
    }

    #[test]
    fn compare_with_itself_is_zero() {
        let a = result(9515.0, 300.0, 45.0);
        let delta = compare(&a, &a);
        assert!(delta.is_zero());
        assert_eq!(delta.total_carbon.percent_change, Some(0.0));
    }

    #[test]
    fn delta_is_b_minus_a_with_percent() {
        let a = result(200.0, 100.0, 40.0);
        let b = result(150.0, 120.0, 60.0);
        let delta = compare(&a, &b);
        assert_eq!(delta.total_carbon.delta, -50.0);
        assert_eq!(delta.total_carbon.percent_change, Some(-25.0));
        assert_eq!(delta.total_energy.percent_change, Some(20.0));
        assert_eq!(delta.circularity_score.delta, 20.0);
    }

    #[test]
    fn percent_change_is_absent_for_zero_baseline() {
        let a = AggregateResult::default();
        let b = result(10.0, 10.0, 10.0);
        let delta = compare(&a, &b);
        assert_eq!(delta.total_carbon.delta, 10.0);
        assert_eq!(delta.total_carbon.percent_change, None);

        let json = serde_json::to_value(delta).unwrap();
        assert!(json["totalCarbon"]["percentChange"].is_null());
    }

    #[test]
    fn picks_best_scenario_by_carbon_reduction() {
        let baseline = NamedResult::new("Primary", result(1000.0, 500.0, 20.0));
        let alternatives = vec![
            NamedResult::new("Partial scrap", result(700.0, 450.0, 40.0)),
            NamedResult::new("Full recycling", result(300.0, 200.0, 85.0)),
        ];
        let cmp = compare_scenarios(&baseline, &alternatives, &ScoringConfig::default()).unwrap();

        assert_eq!(cmp.best_scenario, "Full recycling");
        assert_eq!(cmp.max_carbon_reduction_pct, 70.0);
        assert_eq!(cmp.max_circularity_improvement, 65.0);
        assert_eq!(cmp.alternatives[0].carbon_reduction_pct, Some(30.0));
        assert_eq!(
            cmp.recommendations,
            vec![
                "Adopting 'Full recycling' could reduce carbon emissions by 70%".to_string(),
                "'Full recycling' achieves a high circularity score of 85".to_string(),
                "Consider transitioning to 'Full recycling' for significant energy savings"
                    .to_string(),
                "Increase recycled content to improve circularity and reduce environmental impact"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn baseline_stays_best_when_nothing_improves() {
        let baseline = NamedResult::new("Current", result(100.0, 100.0, 50.0));
        let alternatives = vec![NamedResult::new("Worse", result(120.0, 100.0, 40.0))];
        let cmp = compare_scenarios(&baseline, &alternatives, &ScoringConfig::default()).unwrap();

        assert_eq!(cmp.best_scenario, "Current");
        assert_eq!(cmp.max_carbon_reduction_pct, 0.0);
        assert_eq!(cmp.max_circularity_improvement, 0.0);
        assert_eq!(cmp.recommendations, vec![FALLBACK_RECOMMENDATION.to_string()]);
    }

    #[test]
    fn no_alternatives_still_advises_on_baseline() {
        let baseline = NamedResult::new("Linear", result(100.0, 100.0, 5.0));
        let cmp = compare_scenarios(&baseline, &[], &ScoringConfig::default()).unwrap();
        assert!(cmp.alternatives.is_empty());
        assert_eq!(cmp.recommendations.len(), 1);
        assert!(cmp.recommendations[0].starts_with("Increase recycled content"));
    }

    #[test]
    fn rejects_mixed_metals() {
        let baseline = NamedResult::new("Cu primary", result(100.0, 100.0, 50.0)).with_metal("copper");
        let alternatives = vec![
            NamedResult::new("Cu scrap", result(50.0, 50.0, 80.0)).with_metal("Copper"),
            NamedResult::new("Al scrap", result(50.0, 50.0, 80.0)).with_metal("aluminium"),
        ];
        let err = compare_scenarios(&baseline, &alternatives, &ScoringConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            CompareError::MetalMismatch {
                name: "Al scrap".into(),
                expected: "copper".into(),
                found: "aluminium".into(),
            }
        );
    }
}
