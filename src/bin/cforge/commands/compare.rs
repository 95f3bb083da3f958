use anyhow::{Context, Result, bail};

use circu_forge::io::catalog::Catalog;
use circu_forge::io::write_json;
use circu_forge::{NamedResult, ScoringConfig, ValidatedRoute, compare_scenarios, evaluate};

use crate::cli::{CompareArgs, OutputFormat};
use crate::commands::eval::output_label;
use crate::config::build_scoring_config;
use crate::display::{Context as DisplayContext, Progress, print_comparison, print_warnings};
use crate::io::{RouteSource, create_output, load_routes};

const TOTAL_STEPS: u8 = 3;

pub fn run_compare(args: CompareArgs, ctx: DisplayContext) -> Result<()> {
    let config = build_scoring_config(&args.scoring)?;
    let show_tables = ctx.interactive || args.output.format == OutputFormat::Table;

    let sources: Vec<&RouteSource> = std::iter::once(&args.baseline)
        .chain(args.alternatives.iter())
        .collect();

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Loading routes");
    let routes = match load_routes(&sources) {
        Ok(r) => r,
        Err(e) => {
            progress.abandon();
            return Err(e);
        }
    };
    let warning_count: usize = routes.iter().map(|r| r.warnings.len()).sum();
    progress.complete_step(
        "Loading routes",
        &[
            format!("Read {} routes", routes.len()),
            format!("{} validation warnings", warning_count),
        ],
    );

    if show_tables {
        for route in &routes {
            print_warnings(&route.warnings);
        }
    }

    progress.step("Comparing scenarios");
    let mut named = sources
        .iter()
        .zip(&routes)
        .map(|(source, route)| named_result(source, route, &config));

    let Some(mut baseline) = named.next() else {
        progress.abandon();
        bail!("No baseline route given");
    };
    if let Some(metal) = &args.metal {
        baseline.metal = Some(metal.clone());
    }
    let alternatives: Vec<NamedResult> = named.collect();

    let comparison = match compare_scenarios(&baseline, &alternatives, &config) {
        Ok(c) => c,
        Err(e) => {
            progress.abandon();
            return Err(e).context("Scenario comparison failed");
        }
    };
    progress.complete_step(
        "Comparing scenarios",
        &[
            format!("Baseline: {}", comparison.baseline_name),
            format!("Best scenario: {}", comparison.best_scenario),
        ],
    );

    if show_tables {
        print_comparison(&comparison);
    }

    if args.output.format == OutputFormat::Json {
        progress.step("Writing output");
        let out = create_output(args.output.output.as_deref())?;
        write_json(out, &comparison)?;
        progress.complete_step("Writing output", &[output_label(&args.output.output)]);
    }

    progress.finish("Comparison complete");

    Ok(())
}

/// Evaluates a loaded route, tagging catalog routes with their metal.
fn named_result(source: &RouteSource, route: &ValidatedRoute, config: &ScoringConfig) -> NamedResult {
    let evaluation = evaluate(&route.route, config);
    let named = NamedResult::new(route.route.name.clone(), evaluation.aggregate);

    let metal = match source {
        RouteSource::Catalog(id) => Catalog::builtin()
            .route(id)
            .map(|entry| entry.metal.id.clone()),
        _ => None,
    };

    match metal {
        Some(m) => named.with_metal(m),
        None => named,
    }
}
