use std::fmt;

use crate::heap_error::{HeapError, Result};

/// Details suffix the GC log uses for objects whose class it can't name.
const UNKNOWN_OBJECT_SUFFIX: &str = "<unknown object>";

/// The structural category of a GC thing.
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum NodeKind {
    String,
    Object,
    Symbol,
    // Treated as objects; we don't rebuild code.
    JitCode,
    // Treated as objects.
    Script,
    // Shapes, base shapes and property maps are object internals and are
    // never emitted on their own.
    Shape,
    BaseShape,
    GetterSetter,
    PropMap,
    Scope,
    RegExpShared,
}

impl NodeKind {
    /// Map a node line's type tag (and the details that follow it) onto a
    /// kind.  Everything we don't explicitly recognize is an error.
    pub fn classify(type_tag: &str, details: &str) -> Result<NodeKind> {
        let kind = match type_tag {
            "string" | "substring" => NodeKind::String,
            "symbol" => NodeKind::Symbol,
            "jitcode" => NodeKind::JitCode,
            "script" => NodeKind::Script,
            "shape" => NodeKind::Shape,
            "base_shape" => NodeKind::BaseShape,
            "getter_setter" => NodeKind::GetterSetter,
            "prop_map" => NodeKind::PropMap,
            "scope" => NodeKind::Scope,
            "reg_exp_shared" => NodeKind::RegExpShared,
            "Function" => NodeKind::Object,
            _ if details.ends_with(UNKNOWN_OBJECT_SUFFIX) => NodeKind::Object,
            _ => {
                return Err(HeapError::classification(format!(
                    "unknown kind: {} {}",
                    type_tag, details
                )));
            }
        };
        Ok(kind)
    }

    /// Whether nodes of this kind get their own binding in the reconstructed
    /// heap (and are traversed through when marking).
    pub fn is_includable(self) -> bool {
        match self {
            NodeKind::Shape | NodeKind::BaseShape | NodeKind::PropMap => false,
            _ => true,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let str = match self {
            NodeKind::String => "string",
            NodeKind::Object => "object",
            NodeKind::Symbol => "symbol",
            NodeKind::JitCode => "jitcode",
            NodeKind::Script => "script",
            NodeKind::Shape => "shape",
            NodeKind::BaseShape => "base_shape",
            NodeKind::GetterSetter => "getter_setter",
            NodeKind::PropMap => "prop_map",
            NodeKind::Scope => "scope",
            NodeKind::RegExpShared => "reg_exp_shared",
        };
        formatter.write_str(str)
    }
}
