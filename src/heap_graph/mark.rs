use tracing::{debug, trace, trace_span};

use super::{HeapGraph, NodeId, RefSite};
use crate::heap_error::Result;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MarkStats {
    /// Nodes marked reachable, including ones we don't traverse through.
    pub marked: usize,
    /// Marked nodes that will be emitted.
    pub included: usize,
}

/// Transitively mark everything reachable from the roots.
///
/// Heap logs contain nodes for all permanent atoms even though most are never
/// referenced, along with whatever other garbage happened to be around, and
/// none of that should end up in the reconstruction.
///
/// Nodes are marked when they are pushed so nothing is queued twice.  Shapes,
/// base shapes and prop maps get marked if something points at them but we
/// don't look through them; anything only reachable via those stays
/// unmarked.
pub fn mark_reachable(graph: &mut HeapGraph) -> Result<MarkStats> {
    let span = trace_span!("mark_reachable", nodes = graph.nodes.len());
    let _span_guard = span.enter();

    let mut worklist: Vec<NodeId> = vec![];
    let mut stats = MarkStats::default();

    let mut root_targets = vec![];
    for root in graph.all_roots() {
        root_targets.push(graph.registry.resolve(root.address, RefSite::Root)?);
    }
    for id in root_targets {
        let target = &mut graph.nodes[id.index()];
        if !target.marked {
            target.marked = true;
            stats.marked += 1;
            worklist.push(id);
        }
    }
    trace!(seeded = worklist.len(), "seeded worklist from roots");

    while let Some(id) = worklist.pop() {
        let node = graph.get(id);
        if !node.kind.is_includable() {
            continue;
        }
        stats.included += 1;

        let mut targets = Vec::with_capacity(node.edges.len());
        for edge in &node.edges {
            targets.push(graph.registry.resolve(edge.target, RefSite::Edge)?);
        }

        for target_id in targets {
            let target = &mut graph.nodes[target_id.index()];
            if !target.marked {
                target.marked = true;
                stats.marked += 1;
                worklist.push(target_id);
            }
        }
    }

    debug!(
        marked = stats.marked,
        included = stats.included,
        total = graph.nodes.len(),
        "marked reachable nodes"
    );
    Ok(stats)
}
