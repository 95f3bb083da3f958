use super::stage::StageMetrics;
use super::types::StageType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub total_carbon: f64,
    pub total_energy: f64,
    pub total_water: f64,
    pub total_waste: f64,
    pub stage_count: usize,
    pub circular_loops_count: usize,
    pub carbon_saved: f64,
    pub circularity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageBreakdown {
    pub stage_id: String,
    pub name: String,
    pub stage_type: StageType,
    pub metrics: StageMetrics,
    pub carbon_share: f64,
    pub savings_received: f64,
    pub loops_declared: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDelta {
    pub baseline: f64,
    pub scenario: f64,
    pub delta: f64,
    pub percent_change: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaResult {
    pub total_carbon: FieldDelta,
    pub total_energy: FieldDelta,
    pub total_water: FieldDelta,
    pub total_waste: FieldDelta,
    pub stage_count: FieldDelta,
    pub circular_loops_count: FieldDelta,
    pub carbon_saved: FieldDelta,
    pub circularity_score: FieldDelta,
}

impl DeltaResult {
    pub fn fields(&self) -> [(&'static str, &FieldDelta); 8] {
        [
            ("totalCarbon", &self.total_carbon),
            ("totalEnergy", &self.total_energy),
            ("totalWater", &self.total_water),
            ("totalWaste", &self.total_waste),
            ("stageCount", &self.stage_count),
            ("circularLoopsCount", &self.circular_loops_count),
            ("carbonSaved", &self.carbon_saved),
            ("circularityScore", &self.circularity_score),
        ]
    }

    pub fn is_zero(&self) -> bool {
        self.fields().iter().all(|(_, d)| d.delta == 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeOutcome {
    pub name: String,
    pub result: AggregateResult,
    pub delta: DeltaResult,
    pub carbon_reduction_pct: Option<f64>,
    pub circularity_improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub metal: Option<String>,
    pub baseline_name: String,
    pub baseline: AggregateResult,
    pub alternatives: Vec<AlternativeOutcome>,
    pub best_scenario: String,
    pub max_carbon_reduction_pct: f64,
    pub max_circularity_improvement: f64,
    pub recommendations: Vec<String>,
}

/// An evaluated scenario handed to multi-scenario comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal: Option<String>,
    pub result: AggregateResult,
}

impl NamedResult {
    pub fn new(name: impl Into<String>, result: AggregateResult) -> Self {
        Self {
            name: name.into(),
            metal: None,
            result,
        }
    }

    pub fn with_metal(mut self, metal: impl Into<String>) -> Self {
        self.metal = Some(metal.into());
        self
    }
}
