use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::heap_error::format_addr;
use crate::heap_graph::{HeapGraph, HeapRoot};

#[derive(Serialize)]
struct GraphStats {
    nodes: usize,
    marked: usize,
    included: usize,
}

fn roots_to_json(roots: &[HeapRoot]) -> Value {
    roots
        .iter()
        .map(|root| {
            json!({
                "address": format_addr(root.address),
                "name": root.name,
            })
        })
        .collect()
}

/// Render the graph as JSON for debugging what the parser and marker made of
/// a log.  Nodes come out in id order with their edges in log order, and
/// `edge_names` maps each original edge name to the id it was interned as.
pub fn graph_to_json(graph: &HeapGraph) -> Value {
    let nodes: Vec<Value> = graph
        .nodes
        .iter()
        .map(|node| {
            let edges: Vec<Value> = node
                .edges
                .iter()
                .map(|edge| {
                    json!({
                        "target": format_addr(edge.target),
                        "label": edge.label.to_string(),
                    })
                })
                .collect();
            json!({
                "id": node.id.0,
                "address": format_addr(node.address),
                "color": node.color.to_string(),
                "kind": node.kind.to_string(),
                "details": node.details,
                "marked": node.marked,
                "edges": edges,
            })
        })
        .collect();

    let mut edge_names = Map::new();
    for (id, name) in graph.edge_names.names().iter().enumerate() {
        edge_names.insert(name.clone(), json!(id));
    }

    let stats = GraphStats {
        nodes: graph.nodes.len(),
        marked: graph.nodes.iter().filter(|n| n.marked).count(),
        included: graph.nodes.iter().filter(|n| graph.is_emitted(n)).count(),
    };

    json!({
        "nodes": nodes,
        "roots": {
            "black": roots_to_json(&graph.black_roots),
            "gray": roots_to_json(&graph.gray_roots),
        },
        "edge_names": edge_names,
        "stats": stats,
    })
}

#[test]
fn test_graph_to_json() {
    use crate::file_format::node_kind::NodeKind;
    use crate::heap_graph::GcColor;

    let mut graph = HeapGraph::new();
    let a = graph
        .add_node(0xa0, GcColor::Gray, NodeKind::Object, "<unknown object>".to_string())
        .unwrap();
    graph.add_edge(a, "zeta", 0xb0).unwrap();
    graph.add_edge(a, "alpha", 0xb0).unwrap();
    graph.add_edge(a, "objectElements[5]", 0xa0).unwrap();
    graph
        .add_node(0xb0, GcColor::Black, NodeKind::BaseShape, "".to_string())
        .unwrap();
    graph.add_root(0xa0, GcColor::Gray, "holder".to_string());
    graph.nodes[0].marked = true;
    graph.nodes[1].marked = true;

    let value = graph_to_json(&graph);
    assert_eq!(value["nodes"][0]["address"], "0xa0");
    assert_eq!(value["nodes"][0]["color"], "gray");
    assert_eq!(value["nodes"][0]["edges"][2]["label"], "5");
    assert_eq!(value["nodes"][1]["kind"], "base_shape");
    assert_eq!(value["roots"]["gray"][0]["name"], "holder");
    assert_eq!(value["stats"]["included"], 1);

    // Interned names keep their id order rather than being sorted.
    let names: Vec<&String> = value["edge_names"].as_object().unwrap().keys().collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
}
