use crate::model::stage::{Stage, StageMetrics};
use serde::Serialize;

/// Route-level sums of per-stage metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_carbon: f64,
    pub total_energy: f64,
    pub total_water: f64,
    pub total_waste: f64,
    pub stage_count: usize,
}

impl Totals {
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::new(
            self.total_carbon,
            self.total_energy,
            self.total_water,
            self.total_waste,
        )
    }
}

/// Sums stage metrics field by field in stage order.
///
/// Stages normalized by validation always carry metrics; a stage built
/// without them holds the zero vector and adds nothing.
pub fn aggregate(order: &[Stage]) -> Totals {
    let sum: StageMetrics = order.iter().map(|stage| &stage.metrics).sum();

    Totals {
        total_carbon: sum.carbon_emissions,
        total_energy: sum.energy_consumption,
        total_water: sum.water_usage,
        total_waste: sum.waste_generated,
        stage_count: order.len(),
    }
}
