//! Stage graph representation shared by aggregation and loop attribution.
//!
//! A route's forward flow is nothing more than its stage order. Circular
//! loops are back-references declared on a source stage; they are kept in a
//! separate collection keyed by target stage id and are never walked as part
//! of the forward sequence. Both the [`aggregate`](super::aggregate) and
//! [`attribute`](super::attribute) steps consume the same [`StageGraph`], so
//! they always agree on which loops resolved.

use crate::model::route::ProcessingRoute;
use crate::model::stage::{CircularLoop, Stage};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A resolved circular loop, stored by index into the stage order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopEdge<'a> {
    /// Index of the declaring (source) stage in the stage order.
    pub source_index: usize,
    /// Index of the target stage in the stage order.
    pub target_index: usize,
    /// The loop record as declared on the source stage.
    pub circular_loop: &'a CircularLoop,
}

/// Loops grouped by the id of the stage they return material to.
pub type LoopsByTarget<'a> = BTreeMap<&'a str, Vec<LoopEdge<'a>>>;

/// A loop excluded from aggregation because its target does not resolve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingLoop {
    /// Index of the declaring stage.
    pub source_index: usize,
    /// Id of the declaring stage.
    pub source_id: String,
    /// The unresolved target id.
    pub target_stage: String,
}

/// Ordered stages plus the keyed side collection of circular loops.
#[derive(Debug, Clone)]
pub struct StageGraph<'a> {
    /// Stages in route-authored order.
    pub order: &'a [Stage],
    /// Resolved loops keyed by target stage id.
    pub loops_by_target: LoopsByTarget<'a>,
    /// Loops whose target failed to resolve.
    pub dangling: Vec<DanglingLoop>,
}

impl<'a> StageGraph<'a> {
    /// Total number of resolved loops.
    pub fn resolved_loop_count(&self) -> usize {
        self.loops_by_target.values().map(Vec::len).sum()
    }

    /// Resolved loops declared on the stage at `source_index`.
    pub fn loops_from(&self, source_index: usize) -> impl Iterator<Item = &LoopEdge<'a>> {
        self.loops_by_target
            .values()
            .flatten()
            .filter(move |edge| edge.source_index == source_index)
    }
}

/// Builds the stage graph of a route.
///
/// The stage order is borrowed verbatim. Every loop whose target id matches a
/// stage in the same route is filed under that id; the rest are reported in
/// [`StageGraph::dangling`] and take no further part in the computation.
pub fn build_graph(route: &ProcessingRoute) -> StageGraph<'_> {
    let order = route.stages.as_slice();

    let index_of: BTreeMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, stage)| (stage.id.as_str(), idx))
        .collect();

    let mut loops_by_target: LoopsByTarget<'_> = BTreeMap::new();
    let mut dangling = Vec::new();

    for (source_index, stage) in order.iter().enumerate() {
        for circular_loop in &stage.circular_loops {
            match index_of.get_key_value(circular_loop.target_stage.as_str()) {
                Some((&target_id, &target_index)) => {
                    loops_by_target.entry(target_id).or_default().push(LoopEdge {
                        source_index,
                        target_index,
                        circular_loop,
                    });
                }
                None => dangling.push(DanglingLoop {
                    source_index,
                    source_id: stage.id.clone(),
                    target_stage: circular_loop.target_stage.clone(),
                }),
            }
        }
    }

    debug!(
        stages = order.len(),
        targets = loops_by_target.len(),
        dangling = dangling.len(),
        "built stage graph"
    );

    StageGraph {
        order,
        loops_by_target,
        dangling,
    }
}
