/*!
Emit a JS program that rebuilds the structure of a marked heap graph.

For every emitted node we declare a binding (strings get a unique value
derived from their id, symbols a fresh `Symbol()`, and every other kind is
faked with a plain object), then we output one assignment per edge to wire
the graph together, and finally we push the root targets into the
`blackRoot()` and `grayRoot()` arrays provided by the shell.

Everything is printed in node id order so the same log always produces the
same script.
*/

use std::io::Write;

use itertools::Itertools;
use tracing::{debug, trace_span};

use crate::file_format::node_kind::NodeKind;
use crate::heap_error::Result;
use crate::heap_graph::{EdgeLabel, HeapGraph, HeapNode, HeapRoot, RefSite};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EmitStats {
    pub declarations: usize,
    pub edges: usize,
    pub black_roots: usize,
    pub gray_roots: usize,
}

/// Write the whole reconstruction script.  The graph must already have been
/// marked.
pub fn emit_script(graph: &HeapGraph, writer: &mut dyn Write) -> Result<EmitStats> {
    let span = trace_span!("emit_script", nodes = graph.nodes.len());
    let _span_guard = span.enter();

    let mut stats = EmitStats::default();

    writeln!(writer, "(() => {{")?;
    stats.declarations = emit_declarations(graph, writer)?;
    writeln!(writer)?;
    stats.edges = emit_edges(graph, writer)?;
    writeln!(writer)?;
    stats.black_roots = emit_root_array(graph, "black", &graph.black_roots, writer)?;
    stats.gray_roots = emit_root_array(graph, "gray", &graph.gray_roots, writer)?;
    writeln!(writer, "}})();")?;

    debug!(
        declarations = stats.declarations,
        edges = stats.edges,
        black_roots = stats.black_roots,
        gray_roots = stats.gray_roots,
        "emitted script"
    );
    Ok(stats)
}

/// The node's edges whose targets get emitted, along with those targets.
fn emitted_edges<'a>(
    graph: &'a HeapGraph,
    node: &'a HeapNode,
) -> Result<Vec<(EdgeLabel, &'a HeapNode)>> {
    let mut edges = vec![];
    for edge in &node.edges {
        let target = graph.resolve(edge.target, RefSite::Edge)?;
        // Targets are only emitted if they're includable, and since we're
        // marked, so are they.
        if target.kind.is_includable() {
            edges.push((edge.label, target));
        }
    }
    Ok(edges)
}

fn emit_declarations(graph: &HeapGraph, writer: &mut dyn Write) -> Result<usize> {
    let mut count = 0;
    for node in graph.nodes.iter().filter(|n| graph.is_emitted(n)) {
        match node.kind {
            // Don't use real string contents, just make a unique string.
            NodeKind::String => writeln!(writer, "let {}=\"{}\";", node.id, node.id.0)?,
            NodeKind::Symbol => writeln!(writer, "const {}=Symbol();", node.id)?,
            _ => {
                let props = emitted_edges(graph, node)?
                    .into_iter()
                    .filter_map(|(label, _)| match label {
                        EdgeLabel::Named(_) => Some(label),
                        EdgeLabel::Index(_) => None,
                    })
                    .unique()
                    .map(|label| format!("{}:0", label))
                    .join(",");
                writeln!(writer, "let {}={{{}}};", node.id, props)?;
            }
        }
        count += 1;
    }
    Ok(count)
}

fn emit_edges(graph: &HeapGraph, writer: &mut dyn Write) -> Result<usize> {
    let mut count = 0;
    for node in graph.nodes.iter().filter(|n| graph.is_emitted(n)) {
        for (label, target) in emitted_edges(graph, node)? {
            match label {
                EdgeLabel::Named(_) => writeln!(writer, "{}.{}={};", node.id, label, target.id)?,
                EdgeLabel::Index(index) => {
                    writeln!(writer, "{}[{}]={};", node.id, index, target.id)?
                }
            }
            count += 1;
        }
    }
    Ok(count)
}

fn emit_root_array(
    graph: &HeapGraph,
    color: &str,
    roots: &[HeapRoot],
    writer: &mut dyn Write,
) -> Result<usize> {
    let mut index = 0;
    for root in roots {
        let target = graph.resolve(root.address, RefSite::Root)?;
        if target.kind.is_includable() {
            writeln!(writer, "{}Root()[{}]={};", color, index, target.id)?;
            index += 1;
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap_graph::{mark::mark_reachable, GcColor, NodeId};

    fn emit(graph: &HeapGraph) -> String {
        let mut out = vec![];
        emit_script(graph, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn add(graph: &mut HeapGraph, address: u64, kind: NodeKind) -> NodeId {
        graph
            .add_node(address, GcColor::Black, kind, "".to_string())
            .unwrap()
    }

    #[test]
    fn test_empty_graph() {
        let graph = HeapGraph::new();
        assert_eq!(emit(&graph), "(() => {\n\n\n})();\n");
    }

    #[test]
    fn test_declarations_by_kind() {
        let mut graph = HeapGraph::new();
        let obj = add(&mut graph, 0x10, NodeKind::Object);
        add(&mut graph, 0x20, NodeKind::String);
        add(&mut graph, 0x30, NodeKind::Symbol);
        add(&mut graph, 0x40, NodeKind::Script);
        add(&mut graph, 0x50, NodeKind::Shape);
        graph.add_edge(obj, "str", 0x20).unwrap();
        graph.add_edge(obj, "sym", 0x30).unwrap();
        graph.add_edge(obj, "objectElements[1]", 0x40).unwrap();
        graph.add_edge(obj, "shape", 0x50).unwrap();
        graph.add_edge(obj, "str", 0x20).unwrap();
        graph.add_root(0x10, GcColor::Black, "root".to_string());
        mark_reachable(&mut graph).unwrap();

        assert_eq!(
            emit(&graph),
            "(() => {\n\
             let n0={e0:0,e1:0};\n\
             let n1=\"1\";\n\
             const n2=Symbol();\n\
             let n3={};\n\
             \n\
             n0.e0=n1;\n\
             n0.e1=n2;\n\
             n0[1]=n3;\n\
             n0.e0=n1;\n\
             \n\
             blackRoot()[0]=n0;\n\
             })();\n"
        );
    }

    #[test]
    fn test_unmarked_nodes_are_skipped() {
        let mut graph = HeapGraph::new();
        add(&mut graph, 0x10, NodeKind::String);
        add(&mut graph, 0x20, NodeKind::Object);
        graph.add_root(0x20, GcColor::Gray, "root".to_string());
        mark_reachable(&mut graph).unwrap();

        assert_eq!(
            emit(&graph),
            "(() => {\nlet n1={};\n\n\ngrayRoot()[0]=n1;\n})();\n"
        );
    }

    #[test]
    fn test_root_indices_skip_excluded_targets() {
        let mut graph = HeapGraph::new();
        add(&mut graph, 0x10, NodeKind::Object);
        add(&mut graph, 0x20, NodeKind::PropMap);
        add(&mut graph, 0x30, NodeKind::Symbol);
        graph.add_root(0x10, GcColor::Black, "a".to_string());
        graph.add_root(0x20, GcColor::Black, "b".to_string());
        graph.add_root(0x30, GcColor::Black, "c".to_string());
        graph.add_root(0x20, GcColor::Gray, "d".to_string());
        graph.add_root(0x10, GcColor::Gray, "e".to_string());
        mark_reachable(&mut graph).unwrap();

        let mut out = vec![];
        let stats = emit_script(&graph, &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert!(script.ends_with(
            "blackRoot()[0]=n0;\nblackRoot()[1]=n2;\ngrayRoot()[0]=n0;\n})();\n"
        ));
        assert_eq!(
            stats,
            EmitStats {
                declarations: 2,
                edges: 0,
                black_roots: 2,
                gray_roots: 1,
            }
        );
    }

    #[test]
    fn test_dangling_edge_on_emitted_node() {
        let mut graph = HeapGraph::new();
        let obj = add(&mut graph, 0x10, NodeKind::Object);
        graph.add_edge(obj, "gone", 0xdead).unwrap();
        // Skip marking so the emitter is the first to look at the edge.
        graph.nodes[0].marked = true;

        let mut out = vec![];
        let err = emit_script(&graph, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "referential error: Unknown edge target 0xdead");
    }

    #[test]
    fn test_edges_from_excluded_sources_are_skipped() {
        let mut graph = HeapGraph::new();
        let shape = add(&mut graph, 0x1, NodeKind::Shape);
        let func = add(&mut graph, 0x2, NodeKind::Object);
        graph.add_edge(shape, "proto", 0x2).unwrap();
        graph.add_edge(func, "shape", 0x1).unwrap();
        graph.add_root(0x1, GcColor::Black, "s".to_string());
        graph.add_root(0x2, GcColor::Gray, "o".to_string());
        mark_reachable(&mut graph).unwrap();

        // The shape is marked but has no binding, so nothing may be assigned
        // through it even though its target is emitted.
        assert!(graph.get(shape).marked);
        let script = emit(&graph);
        assert!(!script.contains("n0."), "{}", script);
        assert_eq!(script, "(() => {\nlet n1={};\n\n\ngrayRoot()[0]=n1;\n})();\n");
    }
}
