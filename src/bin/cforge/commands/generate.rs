use std::time::Duration;

use anyhow::{Context, Result, bail};

use circu_forge::evaluate;
use circu_forge::io::generator::{GenerationRequest, GeneratorClient};
use circu_forge::io::write_json;

use crate::cli::{GenerateArgs, OutputFormat};
use crate::commands::eval::{EvalReport, output_label};
use crate::config::build_scoring_config;
use crate::display::{
    Context as DisplayContext, Progress, print_aggregate, print_breakdown, print_warnings,
};
use crate::io::create_output;

const TOTAL_STEPS: u8 = 3;

pub fn run_generate(args: GenerateArgs, ctx: DisplayContext) -> Result<()> {
    let config = build_scoring_config(&args.scoring)?;
    let show_tables = ctx.interactive || args.output.format == OutputFormat::Table;

    let timeout = Duration::from_secs(args.generator.timeout);
    let client = GeneratorClient::new(args.generator.endpoint.as_str(), timeout)?;
    let request = build_request(&args);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Requesting route");
    let outcome = runtime.block_on(async {
        tokio::select! {
            res = client.generate(&request) => Some(res),
            _ = tokio::signal::ctrl_c() => None,
        }
    });

    let validated = match outcome {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            progress.abandon();
            return Err(e).context("Route generation failed");
        }
        None => {
            progress.abandon();
            bail!("Route generation cancelled");
        }
    };
    progress.complete_step(
        "Requesting route",
        &[
            format!("POST {}", client.endpoint()),
            format!(
                "Received '{}' with {} stages",
                validated.route.name,
                validated.route.stage_count()
            ),
        ],
    );

    if show_tables {
        print_warnings(&validated.warnings);
    }

    let evaluation = if args.evaluate {
        progress.step("Evaluating route");
        let evaluation = evaluate(&validated.route, &config);
        progress.complete_step(
            "Evaluating route",
            &[format!(
                "Circularity score {:.0}",
                evaluation.aggregate.circularity_score
            )],
        );
        if show_tables {
            print_aggregate(&validated.route, &evaluation);
            print_breakdown(&evaluation.breakdown);
        }
        Some(evaluation)
    } else {
        None
    };

    if args.output.format == OutputFormat::Json {
        progress.step("Writing output");
        let out = create_output(args.output.output.as_deref())?;
        match &evaluation {
            Some(evaluation) => write_json(
                out,
                &EvalReport::new(&validated.route, evaluation, &validated.warnings, true),
            )?,
            None => write_json(out, &validated.route)?,
        }
        progress.complete_step("Writing output", &[output_label(&args.output.output)]);
    }

    progress.finish("Generation complete");

    Ok(())
}

fn build_request(args: &GenerateArgs) -> GenerationRequest {
    let request = GenerationRequest::new(args.metal.as_str(), args.ore.as_str());
    match &args.grade {
        Some(grade) => request.with_grade(grade.as_str()),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn generate_args(extra: &[&str]) -> GenerateArgs {
        let mut argv = vec![
            "cforge",
            "generate",
            "--metal",
            "Copper",
            "--ore",
            "Chalcopyrite",
            "--endpoint",
            "http://localhost:9/generate",
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Generate(args) => args,
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn request_carries_grade_when_given() {
        let req = build_request(&generate_args(&["--grade", "0.8% Cu"]));
        assert_eq!(req.metal, "Copper");
        assert_eq!(req.ore_name, "Chalcopyrite");
        assert_eq!(req.ore_grade, "0.8% Cu");
    }

    #[test]
    fn request_without_grade() {
        let req = build_request(&generate_args(&[]));
        assert!(req.ore_grade.is_empty());
    }
}
