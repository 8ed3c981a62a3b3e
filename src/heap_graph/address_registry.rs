use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use super::NodeId;
use crate::heap_error::{format_addr, HeapError, Result};

/// Where an address being resolved came from, for diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefSite {
    Edge,
    Root,
}

impl fmt::Display for RefSite {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(match self {
            RefSite::Edge => "edge",
            RefSite::Root => "root",
        })
    }
}

/// Maps heap addresses from the log onto the dense ids of the nodes declared
/// at those addresses.
#[derive(Debug, Default)]
pub struct AddressRegistry {
    address_to_id: HashMap<u64, NodeId>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        AddressRegistry {
            address_to_id: HashMap::new(),
        }
    }

    /// Record that `id` lives at `address`.  Each address may only be
    /// declared once.
    pub fn register(&mut self, address: u64, id: NodeId) -> Result<()> {
        match self.address_to_id.entry(address) {
            Entry::Occupied(_) => Err(HeapError::referential(format!(
                "Duplicate address {}",
                format_addr(address)
            ))),
            Entry::Vacant(v) => {
                v.insert(id);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, address: u64) -> Option<NodeId> {
        self.address_to_id.get(&address).copied()
    }

    /// Like `lookup` but an unknown address is a referential error.
    pub fn resolve(&self, address: u64, site: RefSite) -> Result<NodeId> {
        self.lookup(address).ok_or_else(|| {
            HeapError::referential(format!(
                "Unknown {} target {}",
                site,
                format_addr(address)
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.address_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.address_to_id.is_empty()
    }
}
