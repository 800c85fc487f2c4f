//! Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

use crate::core::lexer::Chunk;
use crate::core::Attributes;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// The root always sits at index 0
pub const ROOT: NodeId = 0;

/// Type of node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Element node (the root included)
    Element,
    /// Text content
    Text,
    /// Comment or declaration
    Comment,
}

/// Element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Empty for the root
    pub tag_name: String,
    pub attributes: Attributes,
    /// `/` or `?` when the start tag closed itself
    pub self_closing: Option<char>,
    /// The root holds the top-level nodes and has no tag of its own
    pub is_root: bool,
}

impl Element {
    /// Tag name, `None` for the root
    #[inline]
    pub fn tag_name(&self) -> Option<&str> {
        if self.is_root {
            None
        } else {
            Some(&self.tag_name)
        }
    }

    /// Get attribute value by name. Valueless properties read as `None`.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)?.as_deref()
    }

    #[inline]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// Node payload: an explicit sum of the node kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Element),
    Text(String),
    Comment(String),
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    /// Byte span in the source. Elements cover their start tag only.
    pub start: usize,
    pub end: usize,
    /// Parent node (None for the root)
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Node {
    fn with_data(data: NodeData, start: usize, end: usize, parent: Option<NodeId>) -> Self {
        Node {
            data,
            start,
            end,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    /// Create the root node
    pub fn root() -> Self {
        let element = Element {
            tag_name: String::new(),
            attributes: Attributes::new(),
            self_closing: None,
            is_root: true,
        };
        Node::with_data(NodeData::Element(element), 0, 0, None)
    }

    /// Create an element node from a start chunk
    pub fn element(chunk: Chunk, parent: NodeId) -> Self {
        let element = Element {
            tag_name: chunk.tag_name.unwrap_or_default(),
            attributes: chunk.attributes.unwrap_or_default(),
            self_closing: chunk.self_closing,
            is_root: false,
        };
        Node::with_data(NodeData::Element(element), chunk.start, chunk.end, Some(parent))
    }

    /// Create a text node
    pub fn text(value: String, start: usize, end: usize, parent: NodeId) -> Self {
        Node::with_data(NodeData::Text(value), start, end, Some(parent))
    }

    /// Create a comment node
    pub fn comment(value: String, start: usize, end: usize, parent: NodeId) -> Self {
        Node::with_data(NodeData::Comment(value), start, end, Some(parent))
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }

    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match &mut self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Content of a text node
    #[inline]
    pub fn text_value(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Tag name of a non-root element
    #[inline]
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element()?.tag_name()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.as_element().is_some_and(|e| e.is_root)
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}
