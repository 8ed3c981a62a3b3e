//! Parser for the textual GC heap logs the JS engine writes out
//! (`JS::DumpHeap`-style dumps).  The log looks like:
//!
//! ```text
//! # Roots.
//! 0x12345 B some root name
//! # Weak maps.
//! ...
//! ==========
//! 0x12345 B Object <unknown object>
//! > 0x23456 B shape
//! ```
//!
//! optionally followed by a `{`-initiated blob of JSON metadata that we don't
//! care about.

use tracing::{debug, trace_span};

use crate::file_format::node_kind::NodeKind;
use crate::heap_error::{HeapError, Result};
use crate::heap_graph::{GcColor, HeapGraph, NodeId};

const ROOTS_HEADER: &str = "# Roots.";
const WEAK_MAPS_HEADER: &str = "# Weak maps.";
const MAIN_SEPARATOR: &str = "==========";
const TRAILER_START: &str = "{";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Section {
    Roots,
    WeakMaps,
    Main,
}

#[derive(Debug, Default)]
struct LineCounts {
    roots: usize,
    weak_map_entries: usize,
    nodes: usize,
    edges: usize,
    comments: usize,
}

/// Parse an `0x`-prefixed hexadecimal address.
pub fn parse_addr(s: &str) -> Result<u64> {
    let hex = match s.strip_prefix("0x") {
        Some(hex) => hex,
        None => return Err(HeapError::format(format!("Expected address: {}", s))),
    };
    u64::from_str_radix(hex, 16)
        .map_err(|_| HeapError::format(format!("Can't parse address: {}", s)))
}

pub fn parse_color(s: &str) -> Result<GcColor> {
    match s {
        "B" => Ok(GcColor::Black),
        "G" => Ok(GcColor::Gray),
        _ => Err(HeapError::format(format!("Unrecognised GC log color: {}", s))),
    }
}

fn required<'a>(words: &[&'a str], index: usize, what: &str) -> Result<&'a str> {
    words
        .get(index)
        .copied()
        .ok_or_else(|| HeapError::format(format!("Missing {}", what)))
}

/// Parse a complete GC log into a graph.  Any problem aborts the whole parse
/// and is reported with the 1-based line it was found on.
pub fn parse_gc_log(text: &str) -> Result<HeapGraph> {
    let span = trace_span!("parse_gc_log", bytes = text.len());
    let _span_guard = span.enter();

    let mut graph = HeapGraph::new();
    let mut counts = LineCounts::default();
    let mut section = None;
    let mut current_node: Option<NodeId> = None;

    for (line_ix, line) in text.split('\n').enumerate() {
        if line.is_empty() {
            continue;
        }
        let lineno = line_ix + 1;

        match line {
            ROOTS_HEADER => section = Some(Section::Roots),
            WEAK_MAPS_HEADER => section = Some(Section::WeakMaps),
            MAIN_SEPARATOR => section = Some(Section::Main),
            TRAILER_START => break,
            _ if line.starts_with('#') => counts.comments += 1,
            _ => parse_record(
                &mut graph,
                section,
                &mut current_node,
                &mut counts,
                line,
            )
            .map_err(|e| e.at_line(lineno))?,
        }
    }

    debug!(
        roots = counts.roots,
        weak_map_entries = counts.weak_map_entries,
        nodes = counts.nodes,
        edges = counts.edges,
        comments = counts.comments,
        edge_names = graph.edge_names.names().len(),
        "parsed gc log"
    );
    Ok(graph)
}

fn parse_record(
    graph: &mut HeapGraph,
    section: Option<Section>,
    current_node: &mut Option<NodeId>,
    counts: &mut LineCounts,
    line: &str,
) -> Result<()> {
    let words: Vec<&str> = line.split(' ').collect();

    match section {
        Some(Section::Roots) => {
            let addr = parse_addr(words[0])?;
            let color = parse_color(required(&words, 1, "root color")?)?;
            let name = words[2.min(words.len())..].join(" ");
            graph.add_root(addr, color, name);
            counts.roots += 1;
        }
        // TODO: model weak map entries so keys and values that are only held
        // alive through a weak map survive reconstruction.
        Some(Section::WeakMaps) => {
            counts.weak_map_entries += 1;
        }
        Some(Section::Main) => {
            if words[0] == ">" {
                let source = match current_node {
                    Some(id) => *id,
                    None => return Err(HeapError::format("Unexpected >".to_string())),
                };
                let addr = parse_addr(required(&words, 1, "edge target")?)?;
                let name = words[3.min(words.len())..].join(" ");
                graph.add_edge(source, &name, addr)?;
                counts.edges += 1;
            } else {
                let addr = parse_addr(words[0])?;
                let color = parse_color(required(&words, 1, "node color")?)?;
                let type_tag = required(&words, 2, "node type")?;
                let details = words[3.min(words.len())..].join(" ");
                let kind = NodeKind::classify(type_tag, &details)?;
                *current_node = Some(graph.add_node(addr, color, kind, details)?);
                counts.nodes += 1;
            }
        }
        None => {
            return Err(HeapError::format(format!(
                "Record outside of any section: {}",
                line
            )));
        }
    }

    Ok(())
}
