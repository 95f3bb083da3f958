use super::route::ProcessingRoute;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ore {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mineralogy: String,
    #[serde(default)]
    pub grade_range: String,
    #[serde(default)]
    pub associated_metals: Vec<String>,
    #[serde(default)]
    pub source_regions: Vec<String>,
    #[serde(default)]
    pub routes: Vec<ProcessingRoute>,
}

impl Ore {
    pub fn route(&self, id: &str) -> Option<&ProcessingRoute> {
        self.routes.iter().find(|r| r.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metal {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub ores: Vec<Ore>,
}

impl Metal {
    pub fn ore(&self, id: &str) -> Option<&Ore> {
        self.ores.iter().find(|o| o.id == id)
    }

    #[inline]
    pub fn route_count(&self) -> usize {
        self.ores.iter().map(|o| o.routes.len()).sum()
    }
}
