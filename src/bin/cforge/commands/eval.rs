use anyhow::{Result, bail};
use serde::Serialize;

use circu_forge::io::write_json;
use circu_forge::{
    AggregateResult, CircularityScore, ComplianceCheck, DanglingLoop, Evaluation, ProcessingRoute,
    StageBreakdown, ValidationWarning, check_emission_compliance, evaluate,
};

use crate::cli::{EvalArgs, OutputFormat};
use crate::config::build_scoring_config;
use crate::display::{
    Context as DisplayContext, Progress, print_aggregate, print_breakdown, print_compliance,
    print_warnings,
};
use crate::io::{create_output, load_route};

const TOTAL_STEPS: u8 = 3;

/// JSON document written by `cforge eval`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalReport<'a> {
    pub route_id: &'a str,
    pub route_name: &'a str,
    pub aggregate: &'a AggregateResult,
    pub score: &'a CircularityScore,
    pub warnings: &'a [ValidationWarning],
    pub dangling: &'a [DanglingLoop],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<&'a [StageBreakdown]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<&'a ComplianceCheck>,
}

impl<'a> EvalReport<'a> {
    pub fn new(
        route: &'a ProcessingRoute,
        evaluation: &'a Evaluation,
        warnings: &'a [ValidationWarning],
        with_breakdown: bool,
    ) -> Self {
        Self {
            route_id: &route.id,
            route_name: &route.name,
            aggregate: &evaluation.aggregate,
            score: &evaluation.score,
            warnings,
            dangling: &evaluation.dangling,
            breakdown: with_breakdown.then_some(evaluation.breakdown.as_slice()),
            compliance: None,
        }
    }

    pub fn with_compliance(mut self, check: Option<&'a ComplianceCheck>) -> Self {
        self.compliance = check;
        self
    }
}

pub fn run_eval(args: EvalArgs, ctx: DisplayContext) -> Result<()> {
    let config = build_scoring_config(&args.scoring)?;
    let show_tables = ctx.interactive || args.output.format == OutputFormat::Table;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Loading route");
    let validated = match load_route(&args.route) {
        Ok(v) => v,
        Err(e) => {
            progress.abandon();
            return Err(e);
        }
    };
    progress.complete_step(
        "Loading route",
        &[
            format!("Read {}", args.route),
            format!(
                "Validate {} stages ({} warnings)",
                validated.route.stage_count(),
                validated.warnings.len()
            ),
        ],
    );

    if show_tables {
        print_warnings(&validated.warnings);
    }

    if args.strict && !validated.warnings.is_empty() {
        progress.abandon();
        bail!(
            "Route '{}' produced {} validation warning(s) and --strict is set",
            validated.route.id,
            validated.warnings.len()
        );
    }

    progress.step("Evaluating route");
    let evaluation = evaluate(&validated.route, &config);
    progress.complete_step(
        "Evaluating route",
        &[
            format!("Aggregate {} stages", evaluation.aggregate.stage_count),
            format!(
                "Attribute {} circular loops",
                evaluation.aggregate.circular_loops_count
            ),
            if evaluation.score.is_authoritative() {
                "Use declared circularity score".to_string()
            } else {
                "Compute circularity score".to_string()
            },
        ],
    );

    let compliance = args.metal.as_deref().map(|metal| {
        check_emission_compliance(
            &evaluation.aggregate,
            metal,
            args.process.as_deref(),
            &config.benchmarks,
        )
    });

    if show_tables {
        print_aggregate(&validated.route, &evaluation);
        if args.breakdown {
            print_breakdown(&evaluation.breakdown);
        }
        if let Some(check) = &compliance {
            print_compliance(check);
        }
    }

    if args.output.format == OutputFormat::Json {
        progress.step("Writing output");
        let report = EvalReport::new(
            &validated.route,
            &evaluation,
            &validated.warnings,
            args.breakdown,
        )
        .with_compliance(compliance.as_ref());
        let out = create_output(args.output.output.as_deref())?;
        write_json(out, &report)?;
        progress.complete_step("Writing output", &[output_label(&args.output.output)]);
    }

    progress.finish("Evaluation complete");

    Ok(())
}

pub fn output_label(path: &Option<std::path::PathBuf>) -> String {
    match path {
        Some(p) => format!(
            "Write JSON → {}",
            p.file_name().unwrap_or_default().to_string_lossy()
        ),
        None => "Write JSON → stdout".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circu_forge::{ScoringConfig, evaluate_payload};
    use serde_json::json;

    #[test]
    fn report_omits_breakdown_unless_requested() {
        let payload = json!({
            "id": "r", "name": "R",
            "stages": [
                { "id": "a", "name": "A", "type": "extraction",
                  "metrics": { "carbonEmissions": 10, "energyConsumption": 1,
                               "waterUsage": 1, "wasteGenerated": 1 } }
            ]
        });
        let (validated, evaluation) =
            evaluate_payload(&payload, &ScoringConfig::default()).unwrap();

        let plain = serde_json::to_value(EvalReport::new(
            &validated.route,
            &evaluation,
            &validated.warnings,
            false,
        ))
        .unwrap();
        assert!(plain.get("breakdown").is_none());
        assert_eq!(plain["routeId"], "r");
        assert_eq!(plain["aggregate"]["totalCarbon"], 10.0);

        let full = serde_json::to_value(EvalReport::new(
            &validated.route,
            &evaluation,
            &validated.warnings,
            true,
        ))
        .unwrap();
        assert_eq!(full["breakdown"].as_array().unwrap().len(), 1);
        assert!(full.get("compliance").is_none());
    }

    #[test]
    fn report_carries_compliance_when_checked() {
        let payload = json!({
            "id": "al", "name": "Secondary aluminium",
            "stages": [
                { "id": "melt", "type": "smelting", "metrics": { "carbonEmissions": 640 } }
            ]
        });
        let config = ScoringConfig::default();
        let (validated, evaluation) = evaluate_payload(&payload, &config).unwrap();
        let check = check_emission_compliance(
            &evaluation.aggregate,
            "aluminium",
            Some("secondary"),
            &config.benchmarks,
        );

        let report = serde_json::to_value(
            EvalReport::new(&validated.route, &evaluation, &validated.warnings, false)
                .with_compliance(Some(&check)),
        )
        .unwrap();
        assert_eq!(report["compliance"]["status"], "warning");
        assert_eq!(report["compliance"]["threshold"], 600.0);
    }

    #[test]
    fn output_label_names_file_or_stdout() {
        assert_eq!(output_label(&None), "Write JSON → stdout");
        assert_eq!(
            output_label(&Some("out/result.json".into())),
            "Write JSON → result.json"
        );
    }
}
