//! Emission-benchmark compliance for evaluated routes.
//!
//! A route's total carbon is compared with a per-metal benchmark (kg CO2e per
//! functional unit) and placed in one of four bands:
//!
//! | Ratio to benchmark | Status                                  |
//! |--------------------|-----------------------------------------|
//! | ≤ 0.8              | [`Compliant`](ComplianceStatus::Compliant), well below |
//! | ≤ 1.0              | [`Compliant`](ComplianceStatus::Compliant) |
//! | ≤ 1.1              | [`Warning`](ComplianceStatus::Warning)  |
//! | > 1.1              | [`NonCompliant`](ComplianceStatus::NonCompliant) |

use crate::model::result::AggregateResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Process-route key used when the caller names none.
pub const BEST_AVAILABLE: &str = "best_available";

const WELL_BELOW_RATIO: f64 = 0.8;
const WARNING_RATIO: f64 = 1.1;

const WELL_BELOW_ADVICE: &[&str] = &[
    "Continue current practices",
    "Consider applying for green certification",
];
const WITHIN_ADVICE: &[&str] = &[
    "Monitor emissions regularly",
    "Explore efficiency improvements",
];
const APPROACHING_ADVICE: &[&str] = &[
    "Implement emission reduction measures",
    "Increase recycled content",
    "Transition to renewable energy",
];
const EXCEEDS_ADVICE: &[&str] = &[
    "Immediate action required",
    "Conduct energy audit",
    "Develop emission reduction roadmap",
    "Consider technology upgrade",
];

/// Per-metal emission benchmarks, keyed by metal then process route.
///
/// A `metals` table given in TOML replaces the built-in table as a whole.
///
/// ```toml
/// [benchmarks]
/// fallback = 2000.0
///
/// [benchmarks.metals.aluminium]
/// primary = 16000.0
/// best_available = 12000.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionBenchmarks {
    /// Benchmark for metals with no entry at all.
    pub fallback: f64,

    /// Benchmarks per metal key, then per process-route key.
    pub metals: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Default for EmissionBenchmarks {
    fn default() -> Self {
        let table = |entries: &[(&str, f64)]| {
            entries
                .iter()
                .map(|(route, value)| (route.to_string(), *value))
                .collect::<BTreeMap<_, _>>()
        };

        let mut metals = BTreeMap::new();
        metals.insert(
            "iron_steel".to_string(),
            table(&[
                ("bf_bof", 2200.0),
                ("eaf", 600.0),
                ("dri_eaf", 1400.0),
                (BEST_AVAILABLE, 1800.0),
            ]),
        );
        metals.insert(
            "aluminium".to_string(),
            table(&[
                ("primary", 16000.0),
                ("secondary", 600.0),
                (BEST_AVAILABLE, 12000.0),
            ]),
        );

        Self {
            fallback: 2000.0,
            metals,
        }
    }
}

impl EmissionBenchmarks {
    /// Resolves the benchmark for `metal` and an optional process route.
    ///
    /// Lookup falls back from the named route to `best_available` for the
    /// metal, then to [`fallback`](Self::fallback).
    pub fn resolve(&self, metal: &str, process_route: Option<&str>) -> (f64, BenchmarkSource) {
        let Some(routes) = self.metals.get(&benchmark_key(metal)) else {
            return (self.fallback, BenchmarkSource::Fallback);
        };

        if let Some(route) = process_route {
            if let Some(value) = routes.get(&benchmark_key(route)) {
                return (*value, BenchmarkSource::ProcessRoute);
            }
        }

        match routes.get(BEST_AVAILABLE) {
            Some(value) => (*value, BenchmarkSource::BestAvailable),
            None => (self.fallback, BenchmarkSource::Fallback),
        }
    }
}

/// Which table entry supplied a benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BenchmarkSource {
    ProcessRoute,
    BestAvailable,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComplianceStatus {
    Compliant,
    Warning,
    NonCompliant,
}

impl ComplianceStatus {
    pub fn severity(&self) -> &'static str {
        match self {
            Self::Compliant => "info",
            Self::Warning => "warning",
            Self::NonCompliant => "critical",
        }
    }
}

/// Outcome of checking one route against its emission benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheck {
    pub metal: String,
    pub process_route: Option<String>,
    pub actual: f64,
    pub threshold: f64,
    pub source: BenchmarkSource,
    pub status: ComplianceStatus,
    pub message: String,
    pub recommendations: Vec<String>,
}

impl ComplianceCheck {
    pub fn is_compliant(&self) -> bool {
        self.status == ComplianceStatus::Compliant
    }
}

/// Checks a route's total carbon against the benchmark for `metal`.
///
/// Totals that are not finite are non-compliant.
///
/// # Examples
///
/// ```
/// use circu_forge::{AggregateResult, ComplianceStatus, EmissionBenchmarks, check_emission_compliance};
///
/// let aggregate = AggregateResult { total_carbon: 500.0, ..Default::default() };
/// let check = check_emission_compliance(
///     &aggregate,
///     "aluminium",
///     Some("secondary"),
///     &EmissionBenchmarks::default(),
/// );
/// assert_eq!(check.threshold, 600.0);
/// assert_eq!(check.status, ComplianceStatus::Compliant);
/// ```
pub fn check_emission_compliance(
    aggregate: &AggregateResult,
    metal: &str,
    process_route: Option<&str>,
    benchmarks: &EmissionBenchmarks,
) -> ComplianceCheck {
    let (threshold, source) = benchmarks.resolve(metal, process_route);
    let actual = aggregate.total_carbon;

    if source == BenchmarkSource::Fallback {
        debug!(metal, threshold, "no benchmark for metal, using fallback");
    }

    let (status, lead, recommendations) = if !actual.is_finite() {
        (ComplianceStatus::NonCompliant, "Emissions exceed benchmark", EXCEEDS_ADVICE)
    } else if actual <= threshold * WELL_BELOW_RATIO {
        (ComplianceStatus::Compliant, "Emissions well below benchmark", WELL_BELOW_ADVICE)
    } else if actual <= threshold {
        (ComplianceStatus::Compliant, "Emissions within benchmark", WITHIN_ADVICE)
    } else if actual <= threshold * WARNING_RATIO {
        (ComplianceStatus::Warning, "Emissions approaching limit", APPROACHING_ADVICE)
    } else {
        (ComplianceStatus::NonCompliant, "Emissions exceed benchmark", EXCEEDS_ADVICE)
    };

    debug!(metal, actual, threshold, status = ?status, "checked emission compliance");

    ComplianceCheck {
        metal: metal.to_string(),
        process_route: process_route.map(str::to_string),
        actual,
        threshold,
        source,
        status,
        message: format!("{} ({:.0} vs {:.0} kg CO2e)", lead, actual, threshold),
        recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
    }
}

// "Iron Steel", "iron-steel" and "iron_steel" share one key.
fn benchmark_key(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_carbon(total_carbon: f64) -> AggregateResult {
        AggregateResult {
            total_carbon,
            ..Default::default()
        }
    }

    fn status_at(carbon: f64) -> ComplianceStatus {
        check_emission_compliance(
            &with_carbon(carbon),
            "iron_steel",
            Some("bf_bof"),
            &EmissionBenchmarks::default(),
        )
        .status
    }

    #[test]
    fn bands_follow_ratio_to_benchmark() {
        assert_eq!(status_at(1000.0), ComplianceStatus::Compliant);
        assert_eq!(status_at(1760.0), ComplianceStatus::Compliant);
        assert_eq!(status_at(2200.0), ComplianceStatus::Compliant);
        assert_eq!(status_at(2300.0), ComplianceStatus::Warning);
        assert_eq!(status_at(2420.0), ComplianceStatus::Warning);
        assert_eq!(status_at(2421.0), ComplianceStatus::NonCompliant);
    }

    #[test]
    fn well_below_and_within_differ_only_in_advice() {
        let benchmarks = EmissionBenchmarks::default();
        let low = check_emission_compliance(&with_carbon(100.0), "aluminium", Some("secondary"), &benchmarks);
        let near = check_emission_compliance(&with_carbon(590.0), "aluminium", Some("secondary"), &benchmarks);

        assert!(low.is_compliant() && near.is_compliant());
        assert!(low.message.starts_with("Emissions well below benchmark"));
        assert!(near.message.starts_with("Emissions within benchmark"));
        assert_ne!(low.recommendations, near.recommendations);
    }

    #[test]
    fn unknown_route_uses_best_available() {
        let check = check_emission_compliance(
            &with_carbon(11000.0),
            "aluminium",
            Some("inert-anode"),
            &EmissionBenchmarks::default(),
        );
        assert_eq!(check.threshold, 12000.0);
        assert_eq!(check.source, BenchmarkSource::BestAvailable);
        assert_eq!(check.process_route.as_deref(), Some("inert-anode"));
    }

    #[test]
    fn unknown_metal_uses_fallback() {
        let check =
            check_emission_compliance(&with_carbon(2100.0), "copper", None, &EmissionBenchmarks::default());
        assert_eq!(check.threshold, 2000.0);
        assert_eq!(check.source, BenchmarkSource::Fallback);
        assert_eq!(check.status, ComplianceStatus::Warning);
        assert_eq!(check.status.severity(), "warning");
    }

    #[test]
    fn metal_and_route_names_are_normalized() {
        let benchmarks = EmissionBenchmarks::default();
        assert_eq!(
            benchmarks.resolve("Iron Steel", Some("DRI-EAF")),
            (1400.0, BenchmarkSource::ProcessRoute)
        );
        assert_eq!(
            benchmarks.resolve(" Aluminium ", None),
            (12000.0, BenchmarkSource::BestAvailable)
        );
    }

    #[test]
    fn metal_without_best_available_uses_fallback() {
        let mut benchmarks = EmissionBenchmarks::default();
        benchmarks
            .metals
            .insert("zinc".into(), BTreeMap::from([("electrolytic".to_string(), 3500.0)]));
        assert_eq!(
            benchmarks.resolve("zinc", Some("electrolytic")),
            (3500.0, BenchmarkSource::ProcessRoute)
        );
        assert_eq!(benchmarks.resolve("zinc", None), (2000.0, BenchmarkSource::Fallback));
    }

    #[test]
    fn non_finite_total_is_non_compliant() {
        let check = check_emission_compliance(
            &with_carbon(f64::INFINITY),
            "aluminium",
            None,
            &EmissionBenchmarks::default(),
        );
        assert_eq!(check.status, ComplianceStatus::NonCompliant);
        assert_eq!(check.status.severity(), "critical");
    }

    #[test]
    fn zero_benchmark_only_admits_zero_emissions() {
        let benchmarks = EmissionBenchmarks {
            fallback: 0.0,
            metals: BTreeMap::new(),
        };
        let clean = check_emission_compliance(&with_carbon(0.0), "lithium", None, &benchmarks);
        let dirty = check_emission_compliance(&with_carbon(1.0), "lithium", None, &benchmarks);
        assert_eq!(clean.status, ComplianceStatus::Compliant);
        assert_eq!(dirty.status, ComplianceStatus::NonCompliant);
    }

    #[test]
    fn check_serializes_camel_case() {
        let check = check_emission_compliance(
            &with_carbon(500.0),
            "aluminium",
            Some("secondary"),
            &EmissionBenchmarks::default(),
        );
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["status"], "compliant");
        assert_eq!(json["source"], "processRoute");
        assert_eq!(json["processRoute"], "secondary");
        assert_eq!(json["threshold"], 600.0);
    }
}
