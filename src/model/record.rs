use super::result::AggregateResult;
use super::route::ProcessingRoute;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub metal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ore: Option<String>,
    #[serde(default)]
    pub scenario_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    #[default]
    Baseline,
    Circular,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub kind: ScenarioKind,
    pub route: ProcessingRoute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub project_id: String,
    pub scenario_id: String,
    pub title: String,
    pub result: AggregateResult,
    #[serde(default)]
    pub notes: Vec<String>,
}
