use heaplog::heap_error::{ErrorLayer, HeapError};
use heaplog::{describe_heap, load_marked_graph, reconstruct_heap};

const SMALL_HEAP: &str = include_str!("fixtures/small-heap.log");

fn reconstruct_err(text: &str) -> HeapError {
    match reconstruct_heap(text) {
        Ok(script) => panic!("expected failure, got script:\n{}", script),
        Err(err) => err,
    }
}

#[test]
fn test_small_heap_script() {
    let script = reconstruct_heap(SMALL_HEAP).unwrap();

    // - The base shape and the object behind it are only reachable through
    //   the shape, so they're left out.
    // - The root pointing straight at the shape doesn't take up a slot.
    // - The unreferenced atom is dropped.
    insta::assert_snapshot!(script, @r###"
    (() => {
    let n0={e1:0};
    let n2="2";
    const n3=Symbol();
    let n4={e3:0,e4:0,e1:0};
    let n6={e6:0};

    n0.e1=n2;
    n0[0]=n3;
    n0[1]=n3;
    n4.e3=n0;
    n4.e4=n6;
    n4.e1=n2;
    n6.e6=n2;

    blackRoot()[0]=n0;
    blackRoot()[1]=n2;
    grayRoot()[0]=n4;
    })();
    "###);
}

#[test]
fn test_output_is_deterministic() {
    let first = reconstruct_heap(SMALL_HEAP).unwrap();
    let second = reconstruct_heap(SMALL_HEAP).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_string_contents_never_leak() {
    let script = reconstruct_heap(SMALL_HEAP).unwrap();
    assert!(!script.contains("hello"), "{}", script);
    assert!(!script.contains("atom"), "{}", script);
    assert!(!script.contains("length"), "{}", script);
}

#[test]
fn test_named_edge_between_objects() {
    let log = "\
# Roots.
0x200 B R
==========
0x100 B Object <unknown object>
> 0x200 B foo
0x200 B Object <unknown object>
";
    // A isn't reachable from any root so only B survives.
    assert_eq!(
        reconstruct_heap(log).unwrap(),
        "(() => {\nlet n1={};\n\n\nblackRoot()[0]=n1;\n})();\n"
    );

    let log = "\
# Roots.
0x100 B A
0x200 B R
==========
0x100 B Object <unknown object>
> 0x200 B foo
> 0x200 B objectElements[7]
0x200 B Object <unknown object>
";
    assert_eq!(
        reconstruct_heap(log).unwrap(),
        "(() => {\n\
         let n0={e0:0};\n\
         let n1={};\n\
         \n\
         n0.e0=n1;\n\
         n0[7]=n1;\n\
         \n\
         blackRoot()[0]=n0;\n\
         blackRoot()[1]=n1;\n\
         })();\n"
    );
}

#[test]
fn test_every_declaration_is_marked_and_includable() {
    let graph = load_marked_graph(SMALL_HEAP).unwrap();
    let script = reconstruct_heap(SMALL_HEAP).unwrap();

    for node in &graph.nodes {
        let declared = script.contains(&format!("let {}=", node.id))
            || script.contains(&format!("const {}=", node.id));
        assert_eq!(
            declared,
            node.marked && node.kind.is_includable(),
            "node {} ({})",
            node.id,
            node.kind
        );
    }
}

#[test]
fn test_unknown_kind_fails() {
    let err = reconstruct_err("==========\n0x10 B Object plain details\n");
    assert_eq!(err.layer(), ErrorLayer::Classification);
    assert_eq!(
        err.to_string(),
        "classification error on line 2: unknown kind: Object plain details"
    );
}

#[test]
fn test_dangling_edge_fails() {
    let log = "\
# Roots.
0x10 B root
==========
0x10 B Function
> 0xdead B missing
";
    let err = reconstruct_err(log);
    assert_eq!(err.layer(), ErrorLayer::Referential);
    assert_eq!(err.to_string(), "referential error: Unknown edge target 0xdead");
}

#[test]
fn test_dangling_root_fails() {
    let err = reconstruct_err("# Roots.\n0xdead G root\n==========\n0x10 B Function\n");
    assert_eq!(err.layer(), ErrorLayer::Referential);
    assert_eq!(err.to_string(), "referential error: Unknown root target 0xdead");
}

#[test]
fn test_describe_small_heap() {
    let value = describe_heap(SMALL_HEAP).unwrap();
    insta::assert_json_snapshot!(value, @r###"
    {
      "nodes": [
        {
          "id": 0,
          "address": "0x7f0000001000",
          "color": "black",
          "kind": "object",
          "details": "<unknown object>",
          "marked": true,
          "edges": [
            {
              "target": "0x7f0000002000",
              "label": "e0"
            },
            {
              "target": "0x7f0000003000",
              "label": "e1"
            },
            {
              "target": "0x7f0000004000",
              "label": "0"
            },
            {
              "target": "0x7f0000004000",
              "label": "1"
            }
          ]
        },
        {
          "id": 1,
          "address": "0x7f0000002000",
          "color": "black",
          "kind": "shape",
          "details": "",
          "marked": true,
          "edges": [
            {
              "target": "0x7f0000006000",
              "label": "e2"
            }
          ]
        },
        {
          "id": 2,
          "address": "0x7f0000003000",
          "color": "black",
          "kind": "string",
          "details": "<length 5> hello",
          "marked": true,
          "edges": []
        },
        {
          "id": 3,
          "address": "0x7f0000004000",
          "color": "black",
          "kind": "symbol",
          "details": "",
          "marked": true,
          "edges": []
        },
        {
          "id": 4,
          "address": "0x7f0000005000",
          "color": "gray",
          "kind": "object",
          "details": "fn",
          "marked": true,
          "edges": [
            {
              "target": "0x7f0000001000",
              "label": "e3"
            },
            {
              "target": "0x7f0000007000",
              "label": "e4"
            },
            {
              "target": "0x7f0000003000",
              "label": "e1"
            }
          ]
        },
        {
          "id": 5,
          "address": "0x7f0000006000",
          "color": "black",
          "kind": "base_shape",
          "details": "",
          "marked": false,
          "edges": [
            {
              "target": "0x7f0000008000",
              "label": "e5"
            }
          ]
        },
        {
          "id": 6,
          "address": "0x7f0000007000",
          "color": "gray",
          "kind": "script",
          "details": "",
          "marked": true,
          "edges": [
            {
              "target": "0x7f0000003000",
              "label": "e6"
            }
          ]
        },
        {
          "id": 7,
          "address": "0x7f0000008000",
          "color": "black",
          "kind": "object",
          "details": "<unknown object>",
          "marked": false,
          "edges": []
        },
        {
          "id": 8,
          "address": "0x7f000000a000",
          "color": "black",
          "kind": "string",
          "details": "<length 4> atom",
          "marked": false,
          "edges": []
        }
      ],
      "roots": {
        "black": [
          {
            "address": "0x7f0000001000",
            "name": "global"
          },
          {
            "address": "0x7f0000003000",
            "name": "stack rooted string"
          }
        ],
        "gray": [
          {
            "address": "0x7f0000005000",
            "name": "gray wrapper"
          },
          {
            "address": "0x7f0000002000",
            "name": "shape root"
          }
        ]
      },
      "edge_names": {
        "shape": 0,
        "name": 1,
        "base": 2,
        "global": 3,
        "script": 4,
        "proto": 5,
        "script source": 6
      },
      "stats": {
        "nodes": 9,
        "marked": 6,
        "included": 5
      }
    }
    "###);
}

#[test]
fn test_shape_edges_are_not_emitted() {
    let log = "\
# Roots.
0x1 B s
0x2 G o
==========
0x1 B shape
> 0x2 B proto
0x2 B Function
> 0x1 B shape
";
    // The shape is rooted and marked but never declared, so its edge to the
    // function can't be written out even though the function itself is.
    let script = reconstruct_heap(log).unwrap();
    assert!(!script.contains("n0."), "{}", script);
    assert_eq!(script, "(() => {\nlet n1={};\n\n\ngrayRoot()[0]=n1;\n})();\n");
}
