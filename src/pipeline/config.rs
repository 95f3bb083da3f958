//! Configuration for circularity scoring and scenario comparison.
//!
//! Route-level settings always win: a route that declares its own
//! [`ScoreWeights`] is scored with them, and a route carrying an authoritative
//! circularity score bypasses the weights entirely. [`ScoringConfig`] only
//! supplies the fallbacks.
//!
//! # Overview
//!
//! - [`ScoringConfig`] — Main configuration struct
//! - [`RecommendationThresholds`] — Cut-offs used to phrase comparison advice
//! - [`EmissionBenchmarks`] — Per-metal carbon benchmarks for compliance checks

use super::compliance::EmissionBenchmarks;
use crate::model::route::ScoreWeights;
use serde::{Deserialize, Serialize};

/// Main configuration for route evaluation.
///
/// # Examples
///
/// ```
/// use circu_forge::{ScoreWeights, ScoringConfig};
///
/// let default = ScoringConfig::default();
/// assert_eq!(default.weights, ScoreWeights::EQUAL);
///
/// let toml = r#"
/// [weights]
/// recycled_content = 2.0
/// recovery = 1.0
/// carbon_savings = 1.0
/// "#;
/// let custom = ScoringConfig::from_toml_str(toml).unwrap();
/// assert_eq!(custom.weights.recycled_content, 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Sub-score weights used when a route declares none.
    #[serde(with = "weights_toml")]
    pub weights: ScoreWeights,

    /// Thresholds for multi-scenario recommendations.
    pub recommendations: RecommendationThresholds,

    /// Emission benchmarks for compliance checks.
    pub benchmarks: EmissionBenchmarks,
}

impl ScoringConfig {
    /// Parses a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml)
    }
}

/// Cut-offs for the advice emitted by scenario comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    /// Carbon reduction (percent) above which an alternative is called out.
    pub carbon_reduction_pct: f64,

    /// Circularity score (0–100) at which an alternative counts as highly circular.
    pub high_circularity: f64,

    /// Baseline circularity score (0–100) below which recycled content is advised.
    pub low_circularity: f64,

    /// Fraction of baseline energy below which an alternative counts as energy saving.
    pub energy_ratio: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            carbon_reduction_pct: 50.0,
            high_circularity: 70.0,
            low_circularity: 30.0,
            energy_ratio: 0.7,
        }
    }
}

/// TOML uses snake_case keys for weights while route JSON uses camelCase.
mod weights_toml {
    use crate::model::route::ScoreWeights;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(default)]
    struct Raw {
        recycled_content: f64,
        recovery: f64,
        carbon_savings: f64,
    }

    impl Default for Raw {
        fn default() -> Self {
            Self {
                recycled_content: 1.0,
                recovery: 1.0,
                carbon_savings: 1.0,
            }
        }
    }

    pub fn serialize<S: Serializer>(w: &ScoreWeights, s: S) -> Result<S::Ok, S::Error> {
        Raw {
            recycled_content: w.recycled_content,
            recovery: w.recovery,
            carbon_savings: w.carbon_savings,
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<ScoreWeights, D::Error> {
        let raw = Raw::deserialize(d)?;
        Ok(ScoreWeights {
            recycled_content: raw.recycled_content,
            recovery: raw.recovery,
            carbon_savings: raw.carbon_savings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = ScoringConfig::default();
        assert_eq!(config.weights, ScoreWeights::EQUAL);
        assert_eq!(config.recommendations.carbon_reduction_pct, 50.0);
        assert_eq!(config.recommendations.high_circularity, 70.0);
        assert_eq!(config.recommendations.low_circularity, 30.0);
        assert_eq!(config.recommendations.energy_ratio, 0.7);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ScoringConfig::from_toml_str("").unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = ScoringConfig::from_toml_str(
            r#"
            [weights]
            recovery = 3.0

            [recommendations]
            low_circularity = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(config.weights.recovery, 3.0);
        assert_eq!(config.weights.recycled_content, 1.0);
        assert_eq!(config.recommendations.low_circularity, 20.0);
        assert_eq!(config.recommendations.high_circularity, 70.0);
    }

    #[test]
    fn benchmarks_load_from_toml() {
        let config = ScoringConfig::from_toml_str(
            r#"
            [benchmarks]
            fallback = 2500.0

            [benchmarks.metals.copper]
            pyrometallurgical = 4000.0
            "#,
        )
        .unwrap();
        assert_eq!(config.benchmarks.fallback, 2500.0);
        assert_eq!(config.benchmarks.metals["copper"]["pyrometallurgical"], 4000.0);
        assert!(!config.benchmarks.metals.contains_key("aluminium"));
        assert_eq!(config.weights, ScoreWeights::EQUAL);
    }

    #[test]
    fn default_benchmarks_survive_unrelated_toml() {
        let config = ScoringConfig::from_toml_str("[weights]\nrecovery = 2.0").unwrap();
        assert_eq!(config.benchmarks, EmissionBenchmarks::default());
        assert_eq!(config.benchmarks.metals["aluminium"]["secondary"], 600.0);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(ScoringConfig::from_toml_str("[weights\nrecovery = ").is_err());
        assert!(ScoringConfig::from_toml_str("[weights]\nrecovery = \"high\"").is_err());
    }
}
