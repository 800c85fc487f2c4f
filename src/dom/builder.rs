//! Chunk-to-node tree builder
//!
//! Recursive descent over lexer chunks: a start chunk opens an element and
//! recurses until its end chunk, so recursion depth equals markup depth.

use super::document::Document;
use super::node::{Node, NodeId, ROOT};
use crate::config::LexerOptions;
use crate::core::lexer::{ChunkKind, Lexer};
use crate::error::Result;

/// Builds the node arena from a lexer
struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    fn new(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity);
        nodes.push(Node::root());
        TreeBuilder { nodes }
    }

    /// Consume chunks into `parent` until its end chunk or end of input
    fn populate(&mut self, lexer: &mut Lexer, parent: NodeId) -> Result<()> {
        while let Some(chunk) = lexer.next_chunk()? {
            match chunk.kind {
                ChunkKind::Start => {
                    let opens = !chunk.is_self_closing();
                    let id = self.push(parent, Node::element(chunk, parent));
                    if opens {
                        self.populate(lexer, id)?;
                    }
                }
                ChunkKind::Content => {
                    let value = lexer.data()[chunk.start..chunk.end].to_string();
                    self.push(parent, Node::text(value, chunk.start, chunk.end, parent));
                }
                ChunkKind::Comment => {
                    let value = lexer.data()[chunk.start..chunk.end].to_string();
                    self.push(parent, Node::comment(value, chunk.start, chunk.end, parent));
                }
                ChunkKind::End => {
                    if parent != ROOT {
                        return Ok(());
                    }
                    // Only reachable when lenient lexing let a stray end tag through
                    log::debug!(
                        "Ignoring </{}> at byte {} outside any element",
                        chunk.tag_name.as_deref().unwrap_or_default(),
                        chunk.start
                    );
                }
            }
        }
        Ok(())
    }

    /// Append a node and link it as the last child of `parent`
    fn push(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        self.link_child(parent, id);
        id
    }

    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        // Get parent's last_child first to avoid borrow issues
        let last_child_opt = self.nodes[parent_id as usize].last_child;

        if let Some(last_child_id) = last_child_opt {
            self.nodes[child_id as usize].prev_sibling = Some(last_child_id);
            self.nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
    }
}

impl Document {
    /// Lex and build a document from markup text
    pub fn parse(text: impl Into<String>, options: LexerOptions) -> Result<Document> {
        Document::from_lexer(Lexer::new(text, options))
    }

    /// Build a document by draining a lexer
    pub fn from_lexer(mut lexer: Lexer) -> Result<Document> {
        let mut builder = TreeBuilder::new(lexer.data().len() / 100 + 16);
        builder.populate(&mut lexer, ROOT)?;
        log::debug!(
            "Built {} nodes from {} bytes",
            builder.nodes.len(),
            lexer.data().len()
        );
        Ok(Document::from_parts(lexer.into_data(), builder.nodes))
    }
}
