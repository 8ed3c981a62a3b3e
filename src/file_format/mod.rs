pub mod gc_log;
pub mod node_kind;
