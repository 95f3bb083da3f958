use super::graph::LoopsByTarget;
use serde::Serialize;
use std::collections::BTreeMap;

/// Loop totals attributed to the stages receiving recovered material.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopSummary {
    pub circular_loops_count: usize,
    pub carbon_saved: f64,
    pub savings_by_target: BTreeMap<String, f64>,
}

impl LoopSummary {
    /// Carbon savings credited to `stage_id`, zero if it receives no loop.
    pub fn savings_for(&self, stage_id: &str) -> f64 {
        self.savings_by_target.get(stage_id).copied().unwrap_or(0.0)
    }
}

/// Credits every resolved loop's savings to its target stage.
///
/// Savings are summed flat across loops, even when several loops return
/// material to the same target. No mass balance is applied, so routes with
/// many overlapping loops can report more savings than physically possible.
pub fn attribute_loops(loops_by_target: &LoopsByTarget<'_>) -> LoopSummary {
    let mut summary = LoopSummary::default();

    for (&target, edges) in loops_by_target {
        let saved: f64 = edges
            .iter()
            .map(|edge| edge.circular_loop.carbon_savings)
            .sum();
        summary.circular_loops_count += edges.len();
        summary.carbon_saved += saved;
        summary.savings_by_target.insert(target.to_string(), saved);
    }

    summary
}
