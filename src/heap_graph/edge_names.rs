use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::heap_error::{HeapError, Result};

/// The label on an outgoing edge.  Dense element slots keep their index so
/// they can be reconstructed with index syntax; everything else is squashed
/// down to a short generated property name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EdgeLabel {
    Index(u32),
    Named(u32),
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EdgeLabel::Index(index) => write!(formatter, "{}", index),
            EdgeLabel::Named(id) => write!(formatter, "e{}", id),
        }
    }
}

/// Assigns compact ids to edge names in first-seen order.
#[derive(Debug, Default)]
pub struct EdgeNameInterner {
    name_to_id: HashMap<String, u32>,
    /// Names in id order.
    names: Vec<String>,
}

impl EdgeNameInterner {
    pub fn new() -> Self {
        EdgeNameInterner {
            name_to_id: HashMap::new(),
            names: vec![],
        }
    }

    pub fn intern(&mut self, raw: &str) -> Result<EdgeLabel> {
        lazy_static! {
            static ref ELEMENTS_RE: Regex = Regex::new(r"^objectElements\[(\d+)\]$").unwrap();
        }
        if let Some(caps) = ELEMENTS_RE.captures(raw) {
            let index = caps[1].parse::<u32>().map_err(|e| {
                HeapError::format(format!("Error parsing element index in {}: {}", raw, e))
            })?;
            return Ok(EdgeLabel::Index(index));
        }

        if let Some(id) = self.name_to_id.get(raw) {
            return Ok(EdgeLabel::Named(*id));
        }

        let id = self.names.len() as u32;
        self.name_to_id.insert(raw.to_string(), id);
        self.names.push(raw.to_string());
        Ok(EdgeLabel::Named(id))
    }

    /// The original name behind a `Named` label id.
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(|s| s.as_str())
    }

    /// All interned names, in id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[test]
fn test_intern_first_seen_order() {
    let mut interner = EdgeNameInterner::new();
    assert_eq!(interner.intern("shape").unwrap(), EdgeLabel::Named(0));
    assert_eq!(interner.intern("group").unwrap(), EdgeLabel::Named(1));
    assert_eq!(interner.intern("shape").unwrap(), EdgeLabel::Named(0));
    assert_eq!(interner.intern("objectElements[3]").unwrap(), EdgeLabel::Index(3));
    // Element edges don't consume ids.
    assert_eq!(interner.intern("private").unwrap(), EdgeLabel::Named(2));

    assert_eq!(interner.name(1), Some("group"));
    assert_eq!(interner.name(3), None);
    assert_eq!(interner.names(), &["shape", "group", "private"]);
}

#[test]
fn test_intern_element_lookalikes() {
    let mut interner = EdgeNameInterner::new();
    // Only the exact pattern is an element index; everything else is a name,
    // including names with spaces.
    assert_eq!(interner.intern("objectElements[]").unwrap(), EdgeLabel::Named(0));
    assert_eq!(interner.intern("objectElements[-1]").unwrap(), EdgeLabel::Named(1));
    assert_eq!(interner.intern("xobjectElements[1]").unwrap(), EdgeLabel::Named(2));
    assert_eq!(interner.intern("objectElements[1] ").unwrap(), EdgeLabel::Named(3));
    assert_eq!(interner.intern("script source").unwrap(), EdgeLabel::Named(4));
    assert_eq!(interner.intern("objectElements[007]").unwrap(), EdgeLabel::Index(7));

    let err = interner.intern("objectElements[99999999999]").unwrap_err();
    assert!(err.to_string().contains("Error parsing element index"), "{}", err);
}

#[test]
fn test_label_display() {
    assert_eq!(EdgeLabel::Named(12).to_string(), "e12");
    assert_eq!(EdgeLabel::Index(4).to_string(), "4");
}
