//! DOM Module - Arena-based document tree
//!
//! Implements the tree using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - A recursive-descent builder driven by the lexer
//! - Ordered record serialization for JSON output

pub mod builder;
pub mod document;
pub mod node;
pub mod serialize;

pub use document::Document;
pub use node::{Element, Node, NodeData, NodeId, NodeKind, ROOT};
pub use serialize::NodeRecord;
