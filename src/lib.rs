extern crate itertools;
#[macro_use]
extern crate lazy_static;
extern crate regex;
extern crate serde_json;
extern crate tracing;
extern crate tracing_subscriber;

pub mod describe;
pub mod file_format;
pub mod heap_error;
pub mod heap_graph;
pub mod logging;
pub mod reconstruct;

use serde_json::Value;
use tracing::{info, info_span};

use crate::file_format::gc_log::parse_gc_log;
use crate::heap_error::Result;
use crate::heap_graph::{mark::mark_reachable, HeapGraph};

/// Parse a GC log and mark everything reachable from its roots.
pub fn load_marked_graph(text: &str) -> Result<HeapGraph> {
    let mut graph = parse_gc_log(text)?;
    mark_reachable(&mut graph)?;
    Ok(graph)
}

/// Turn the text of a GC log into a JS program that recreates the structure
/// of that heap.  Nothing is returned unless the whole log made sense.
pub fn reconstruct_heap(text: &str) -> Result<String> {
    let span = info_span!("reconstruct_heap");
    let _span_guard = span.enter();

    let graph = load_marked_graph(text)?;
    let mut script = vec![];
    let stats = reconstruct::emit_script(&graph, &mut script)?;
    info!(
        nodes = graph.nodes.len(),
        declarations = stats.declarations,
        bytes = script.len(),
        "reconstructed heap"
    );
    // We only ever write ASCII plus formatted numbers.
    Ok(String::from_utf8_lossy(&script).into_owned())
}

/// Like `reconstruct_heap` but produces the JSON description of the marked
/// graph instead of a script.
pub fn describe_heap(text: &str) -> Result<Value> {
    let span = info_span!("describe_heap");
    let _span_guard = span.enter();

    let graph = load_marked_graph(text)?;
    info!(nodes = graph.nodes.len(), "described heap");
    Ok(describe::graph_to_json(&graph))
}
