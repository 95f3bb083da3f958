use super::stage::Stage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWeights {
    pub recycled_content: f64,
    pub recovery: f64,
    pub carbon_savings: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::EQUAL
    }
}

impl ScoreWeights {
    pub const EQUAL: ScoreWeights = ScoreWeights {
        recycled_content: 1.0,
        recovery: 1.0,
        carbon_savings: 1.0,
    };

    /// Clamps negative and non-finite weights to zero; falls back to equal
    /// weights when nothing positive remains.
    pub fn normalized(&self) -> ScoreWeights {
        let fix = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let weights = ScoreWeights {
            recycled_content: fix(self.recycled_content),
            recovery: fix(self.recovery),
            carbon_savings: fix(self.carbon_savings),
        };
        if weights.sum() > 0.0 {
            weights
        } else {
            Self::EQUAL
        }
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.recycled_content + self.recovery + self.carbon_savings
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportLeg {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsData {
    #[serde(default)]
    pub transport_legs: Vec<TransportLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_route: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingRoute {
    pub id: String,
    pub name: String,
    pub stages: Vec<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carbon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circularity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_weights: Option<ScoreWeights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistics: Option<LogisticsData>,
}

impl ProcessingRoute {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stages: Vec::new(),
            total_carbon: None,
            total_energy: None,
            circularity_score: None,
            score_weights: None,
            logistics: None,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    #[inline]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    #[inline]
    pub fn loop_count(&self) -> usize {
        self.stages.iter().map(Stage::loop_count).sum()
    }

    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn stage_ids(&self) -> HashSet<&str> {
        self.stages.iter().map(|s| s.id.as_str()).collect()
    }
}
