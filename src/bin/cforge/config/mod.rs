use anyhow::{Context, Result, bail};
use circu_forge::ScoringConfig;
use circu_forge::io::read_scoring_config;

use crate::cli::ScoringOptions;
use crate::io::open_input;

/// Builds the scoring configuration: defaults, then `--weights`, then the
/// individual weight flags.
pub fn build_scoring_config(opts: &ScoringOptions) -> Result<ScoringConfig> {
    let mut config = match &opts.weights {
        Some(path) => {
            let input = open_input(Some(path))?;
            read_scoring_config(input)
                .with_context(|| format!("Failed to load scoring config: {}", path.display()))?
        }
        None => ScoringConfig::default(),
    };

    for (flag, value) in [
        ("--w-recycled", opts.recycled_content),
        ("--w-recovery", opts.recovery),
        ("--w-carbon", opts.carbon_savings),
    ] {
        if let Some(w) = value {
            if !w.is_finite() || w < 0.0 {
                bail!("{} must be a non-negative number, got {}", flag, w);
            }
        }
    }

    if let Some(w) = opts.recycled_content {
        config.weights.recycled_content = w;
    }
    if let Some(w) = opts.recovery {
        config.weights.recovery = w;
    }
    if let Some(w) = opts.carbon_savings {
        config.weights.carbon_savings = w;
    }

    Ok(config)
}
