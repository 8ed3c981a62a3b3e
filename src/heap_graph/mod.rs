/*!
In-memory model of a GC heap log.

The graph is built append-only by the log parser, then marked once by
`mark::mark_reachable`, then read by the emitters.  Nodes live in a single
arena vec indexed by their `NodeId`, which is also their position in the log.
Edges hold on to the *address* of their target rather than its id, since the
target may not have been declared yet when the edge is parsed; everything
downstream resolves targets through the `AddressRegistry`, which turns any
dangling reference into an error instead of a silently missing edge.
*/

pub mod address_registry;
pub mod edge_names;
pub mod mark;

use std::convert::TryFrom;
use std::fmt;

pub use address_registry::{AddressRegistry, RefSite};
pub use edge_names::{EdgeLabel, EdgeNameInterner};

use crate::file_format::node_kind::NodeKind;
use crate::heap_error::{HeapError, Result};

/// Dense, 0-based node identifier assigned in log order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Prints the name the node gets in generated scripts.
impl fmt::Display for NodeId {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "n{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GcColor {
    Black,
    Gray,
}

impl fmt::Display for GcColor {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(match self {
            GcColor::Black => "black",
            GcColor::Gray => "gray",
        })
    }
}

#[derive(Clone, Debug)]
pub struct HeapEdge {
    pub target: u64,
    pub label: EdgeLabel,
}

#[derive(Debug)]
pub struct HeapNode {
    pub id: NodeId,
    pub address: u64,
    pub color: GcColor,
    pub kind: NodeKind,
    pub details: String,
    pub edges: Vec<HeapEdge>,
    pub marked: bool,
}

#[derive(Clone, Debug)]
pub struct HeapRoot {
    pub address: u64,
    pub color: GcColor,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct HeapGraph {
    pub nodes: Vec<HeapNode>,
    pub black_roots: Vec<HeapRoot>,
    pub gray_roots: Vec<HeapRoot>,
    pub registry: AddressRegistry,
    pub edge_names: EdgeNameInterner,
}

impl HeapGraph {
    pub fn new() -> Self {
        HeapGraph {
            nodes: vec![],
            black_roots: vec![],
            gray_roots: vec![],
            registry: AddressRegistry::new(),
            edge_names: EdgeNameInterner::new(),
        }
    }

    pub fn add_root(&mut self, address: u64, color: GcColor, name: String) {
        let root = HeapRoot {
            address,
            color,
            name,
        };
        match color {
            GcColor::Black => self.black_roots.push(root),
            GcColor::Gray => self.gray_roots.push(root),
        }
    }

    /// Append a new node, failing if its address was already declared.
    pub fn add_node(
        &mut self,
        address: u64,
        color: GcColor,
        kind: NodeKind,
        details: String,
    ) -> Result<NodeId> {
        let id = node_id_for_index(self.nodes.len())?;
        self.registry.register(address, id)?;
        self.nodes.push(HeapNode {
            id,
            address,
            color,
            kind,
            details,
            edges: vec![],
            marked: false,
        });
        Ok(id)
    }

    /// Add an edge from `source` to whatever ends up living at `target`.
    /// The target doesn't need to exist yet.
    pub fn add_edge(&mut self, source: NodeId, raw_name: &str, target: u64) -> Result<()> {
        let label = self.edge_names.intern(raw_name)?;
        self.nodes[source.index()]
            .edges
            .push(HeapEdge { target, label });
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> &HeapNode {
        // Only the graph mints ids, so they're always in bounds.
        &self.nodes[id.index()]
    }

    /// Resolve an address to its node, failing on dangling references.
    pub fn resolve(&self, address: u64, site: RefSite) -> Result<&HeapNode> {
        let id = self.registry.resolve(address, site)?;
        Ok(self.get(id))
    }

    /// Black roots followed by gray roots.
    pub fn all_roots(&self) -> impl Iterator<Item = &HeapRoot> {
        self.black_roots.iter().chain(self.gray_roots.iter())
    }

    /// A node that is reachable and gets its own binding when reconstructed.
    pub fn is_emitted(&self, node: &HeapNode) -> bool {
        node.marked && node.kind.is_includable()
    }
}

fn node_id_for_index(index: usize) -> Result<NodeId> {
    u32::try_from(index)
        .map(NodeId)
        .map_err(|_| HeapError::format(format!("Too many nodes: {}", index)))
}
