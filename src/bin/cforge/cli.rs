use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::io::RouteSource;

#[derive(Parser)]
#[command(
    name = "cforge",
    about = "Impact aggregation and circularity scoring for metal production routes",
    version,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate and evaluate a single route
    #[command(visible_alias = "e")]
    Eval(EvalArgs),

    /// Compare alternative routes against a baseline
    #[command(visible_alias = "c")]
    Compare(CompareArgs),

    /// Request a route from the route generator service
    #[command(visible_alias = "g")]
    Generate(GenerateArgs),

    /// List the built-in reference catalog
    Catalog(CatalogArgs),
}

impl Command {
    pub fn quiet(&self) -> bool {
        match self {
            Command::Eval(args) => args.output.quiet,
            Command::Compare(args) => args.output.quiet,
            Command::Generate(args) => args.output.quiet,
            Command::Catalog(args) => args.output.quiet,
        }
    }
}

/// Output options shared by all commands.
#[derive(Args)]
pub struct OutputOptions {
    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    pub format: OutputFormat,

    /// Suppress banner, progress, and summary tables (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Scoring options shared by eval and compare.
#[derive(Args)]
#[command(next_help_heading = "Scoring")]
pub struct ScoringOptions {
    /// Scoring configuration (TOML file)
    #[arg(long, value_name = "FILE")]
    pub weights: Option<PathBuf>,

    /// Weight of the recycled-content sub-score
    #[arg(long = "w-recycled", value_name = "W")]
    pub recycled_content: Option<f64>,

    /// Weight of the recovery sub-score
    #[arg(long = "w-recovery", value_name = "W")]
    pub recovery: Option<f64>,

    /// Weight of the carbon-savings sub-score
    #[arg(long = "w-carbon", value_name = "W")]
    pub carbon_savings: Option<f64>,
}

#[derive(Args)]
pub struct EvalArgs {
    /// Route to evaluate: a JSON file, `-` for stdin, or `catalog:<ROUTE-ID>`
    #[arg(value_name = "ROUTE", default_value = "-")]
    pub route: RouteSource,

    /// Include the per-stage breakdown in the output
    #[arg(long)]
    pub breakdown: bool,

    /// Fail if validation produced any warning
    #[arg(long)]
    pub strict: bool,

    /// Check total carbon against this metal's emission benchmark
    #[arg(long, value_name = "METAL")]
    pub metal: Option<String>,

    /// Process route used to pick the benchmark (e.g. `secondary`)
    #[arg(long, value_name = "ROUTE", requires = "metal")]
    pub process: Option<String>,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub scoring: ScoringOptions,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Baseline route: a JSON file, `-` for stdin, or `catalog:<ROUTE-ID>`
    #[arg(value_name = "BASELINE")]
    pub baseline: RouteSource,

    /// Alternative routes, in the same forms as the baseline
    #[arg(value_name = "ALTERNATIVE", required = true, num_args = 1..)]
    pub alternatives: Vec<RouteSource>,

    /// Metal all scenarios are expected to produce
    #[arg(long, value_name = "METAL")]
    pub metal: Option<String>,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub scoring: ScoringOptions,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Metal to produce
    #[arg(long, value_name = "METAL")]
    pub metal: String,

    /// Ore to start from
    #[arg(long, value_name = "ORE")]
    pub ore: String,

    /// Ore grade (free text, e.g. "1.2% Cu")
    #[arg(long, value_name = "GRADE")]
    pub grade: Option<String>,

    /// Evaluate the generated route instead of printing it
    #[arg(long)]
    pub evaluate: bool,

    #[command(flatten)]
    pub generator: GeneratorOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub scoring: ScoringOptions,
}

#[derive(Args)]
#[command(next_help_heading = "Generator")]
pub struct GeneratorOptions {
    /// Route generator endpoint
    #[arg(long, value_name = "URL", env = "CFORGE_GENERATOR_URL")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "60")]
    pub timeout: u64,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Only list this metal (id, name, or symbol)
    #[arg(long, value_name = "METAL")]
    pub metal: Option<String>,

    #[command(flatten)]
    pub output: OutputOptions,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Summary tables only
    Table,
}

pub fn parse() -> Cli {
    Cli::parse()
}
