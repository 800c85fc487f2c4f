//! Document - Arena-based tree of lexed markup
//!
//! Efficient tree storage with:
//! - Arena allocation for nodes
//! - NodeId indices for traversal (parent links are upward-only lookups)
//! - The source text kept alongside for raw slices
//! - The page map, built once by `collect_pages`

use std::collections::BTreeMap;

use super::node::{Element, Node, NodeData, NodeId, NodeKind, ROOT};
use crate::config::{LayoutConfig, PageGeometryKeys};
use crate::core::tag_writer::write_start_tag;
use crate::error::{Error, Result};
use crate::layout::page::{collect_pages, Page};

/// A parsed markup document
#[derive(Debug)]
pub struct Document {
    /// Source text the spans point into
    source: String,
    /// Arena of nodes, the root at index 0
    nodes: Vec<Node>,
    /// Page map, present once collected
    pages: Option<BTreeMap<i64, Page>>,
}

impl Document {
    /// Create a document from an arena built over `source`
    pub(crate) fn from_parts(source: String, nodes: Vec<Node>) -> Self {
        Document {
            source,
            nodes,
            pages: None,
        }
    }

    /// The source text
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Root node ID (always 0)
    #[inline]
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Get a node by ID
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// Get a mutable node by ID
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize)
    }

    /// Get total number of nodes, the root included
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the element payload of a node
    #[inline]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id)?.as_element()
    }

    /// Get node tag name (`None` for the root and non-elements)
    #[inline]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.tag_name()
    }

    /// Get attribute value by name
    #[inline]
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    #[inline]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_attribute(name))
    }

    /// Get attribute as float. Missing attributes are `Ok(None)`.
    pub fn get_float(&self, id: NodeId, name: &str) -> Result<Option<f64>> {
        let Some(value) = self.get_attribute(id, name) else {
            return Ok(None);
        };
        value
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| self.invalid_number(id, name, value))
    }

    /// Get attribute as integer. Missing attributes are `Ok(None)`.
    pub fn get_int(&self, id: NodeId, name: &str) -> Result<Option<i64>> {
        let Some(value) = self.get_attribute(id, name) else {
            return Ok(None);
        };
        value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| self.invalid_number(id, name, value))
    }

    fn invalid_number(&self, id: NodeId, name: &str, value: &str) -> Error {
        Error::InvalidNumber {
            attribute: name.to_string(),
            value: value.to_string(),
            offset: self.node(id).map_or(0, |n| n.start),
        }
    }

    /// Check whether any ancestor (not the node itself) carries `name`
    pub fn ancestor_has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.ancestors(id).any(|ancestor| self.has_attribute(ancestor, name))
    }

    /// Set (or add) an attribute. Returns false for non-elements and the root.
    ///
    /// Nothing is validated here; `to_markup` rejects keys and values that
    /// cannot be written back.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: Option<String>) -> bool {
        match self.node_mut(id).and_then(Node::as_element_mut) {
            Some(element) if !element.is_root => {
                element.attributes.insert(name.to_string(), value);
                true
            }
            _ => false,
        }
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.node(id).and_then(|n| n.first_child);
        ChildIter { doc: self, next: first }
    }

    /// Iterate over all descendants of a node (depth-first, document order)
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let mut stack = Vec::new();
        if let Some(node) = self.node(id) {
            let mut child_id = node.last_child;
            while let Some(cid) = child_id {
                stack.push(cid);
                child_id = self.node(cid).and_then(|n| n.prev_sibling);
            }
        }
        DescendantIter { doc: self, stack }
    }

    /// Iterate from the parent of a node up to the root
    pub fn ancestors(&self, id: NodeId) -> AncestorIter<'_> {
        let next = self.node(id).and_then(|n| n.parent);
        AncestorIter { doc: self, next }
    }

    /// First element with the given tag, in document order
    pub fn find_first(&self, tag: &str) -> Option<NodeId> {
        self.descendants(ROOT).find(|&id| self.tag_name(id) == Some(tag))
    }

    /// All elements with the given tag, in document order
    pub fn find_all(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(ROOT)
            .filter(|&id| self.tag_name(id) == Some(tag))
            .collect()
    }

    /// The main document-body element: a `document_tag` child of a top-level element
    pub fn document_node(&self, document_tag: &str) -> Option<NodeId> {
        self.children(ROOT)
            .flat_map(|top| self.children(top))
            .find(|&id| self.tag_name(id) == Some(document_tag))
    }

    /// Title attribute of the document-body element
    pub fn title(&self, keys: &PageGeometryKeys) -> Option<&str> {
        let document = self.document_node(&keys.document_tag)?;
        self.get_attribute(document, &keys.title)
    }

    /// Build the page map. Pages can only be collected once.
    pub fn collect_pages(&mut self, config: &LayoutConfig) -> Result<()> {
        if self.pages.is_some() {
            return Err(Error::PagesAlreadyCollected);
        }
        let pages = collect_pages(self, config)?;
        self.pages = Some(pages);
        Ok(())
    }

    /// The page map, if collected
    #[inline]
    pub fn pages(&self) -> Option<&BTreeMap<i64, Page>> {
        self.pages.as_ref()
    }

    pub(crate) fn store_pages(&mut self, pages: BTreeMap<i64, Page>) {
        self.pages = Some(pages);
    }

    /// Regenerate the markup text from the tree.
    ///
    /// Start tags are written from their (possibly edited) attribute maps;
    /// text and comments are written as lexed. Uses an explicit stack so
    /// deep documents do not recurse.
    pub fn to_markup(&self) -> Result<String> {
        enum StackEntry {
            Enter(NodeId),
            Close(NodeId),
        }

        let mut buf = String::with_capacity(self.source.len());
        let mut stack: Vec<StackEntry> = Vec::with_capacity(64);
        stack.push(StackEntry::Enter(ROOT));

        while let Some(entry) = stack.pop() {
            match entry {
                StackEntry::Close(id) => {
                    if let Some(name) = self.tag_name(id) {
                        buf.push_str("</");
                        buf.push_str(name);
                        buf.push('>');
                    }
                }
                StackEntry::Enter(current_id) => {
                    let Some(node) = self.node(current_id) else {
                        continue;
                    };

                    match &node.data {
                        NodeData::Element(element) => {
                            let opens = !element.is_root && element.self_closing.is_none();
                            if !element.is_root {
                                write_start_tag(
                                    &mut buf,
                                    &element.tag_name,
                                    &element.attributes,
                                    element.self_closing,
                                )?;
                            }
                            if opens {
                                stack.push(StackEntry::Close(current_id));
                            }

                            // Children in reverse so the first is processed first
                            let mut child_id = node.last_child;
                            while let Some(cid) = child_id {
                                stack.push(StackEntry::Enter(cid));
                                child_id = self.node(cid).and_then(|n| n.prev_sibling);
                            }
                        }
                        NodeData::Text(value) | NodeData::Comment(value) => buf.push_str(value),
                    }
                }
            }
        }

        Ok(buf)
    }

    /// Count nodes of each kind (elements exclude the root)
    pub fn kind_counts(&self) -> (usize, usize, usize) {
        self.nodes.iter().skip(1).fold((0, 0, 0), |(e, t, c), node| match node.kind() {
            NodeKind::Element => (e + 1, t, c),
            NodeKind::Text => (e, t + 1, c),
            NodeKind::Comment => (e, t, c + 1),
        })
    }
}

/// Iterator over child nodes
pub struct ChildIter<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl<'d> Iterator for ChildIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first)
pub struct DescendantIter<'d> {
    doc: &'d Document,
    stack: Vec<NodeId>,
}

impl<'d> Iterator for DescendantIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Add children to stack in reverse order (so first child is processed first)
        if let Some(node) = self.doc.node(current) {
            let mut child_id = node.last_child;
            while let Some(id) = child_id {
                self.stack.push(id);
                child_id = self.doc.node(id).and_then(|n| n.prev_sibling);
            }
        }

        Some(current)
    }
}

/// Iterator over ancestors, nearest first
pub struct AncestorIter<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl<'d> Iterator for AncestorIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).and_then(|n| n.parent);
        Some(current)
    }
}
