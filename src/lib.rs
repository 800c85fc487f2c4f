//! slatext - Text extraction from Scribus (SLA) projects
//!
//! Pipeline:
//! A: Tolerant lexer (chunks with an open-tag stack)
//! B: Arena document tree built from the chunk stream
//! C: Page collection and two-column reading-order sort
//! D: Markdown text dump (and JSON tree serialization)

pub mod config;
pub mod core;
pub mod dom;
pub mod dump;
pub mod error;
pub mod layout;
pub mod project;

pub use config::{AttributeRoles, DumpOptions, LayoutConfig, LexerOptions, PageGeometryKeys};
pub use crate::core::{decode_source, Attributes, Chunk, ChunkKind, Lexer, ProgressCallback};
pub use dom::{Document, NodeData, NodeId, NodeKind, NodeRecord};
pub use dump::{dump_attribute_values, TextDumper};
pub use error::{Error, ErrorKind, Result};
pub use layout::{Page, PageGeometry, PageObject};
pub use project::ScribusProject;

// ============================================================================
// Convenience entry points
// ============================================================================

/// Parse markup into a document, failing on unbalanced tags
pub fn parse(text: impl Into<String>) -> Result<Document> {
    Document::parse(text, LexerOptions::default())
}

/// Parse markup into a document, logging unbalanced tags
pub fn parse_lenient(text: impl Into<String>) -> Result<Document> {
    Document::parse(text, LexerOptions::lenient())
}

/// Lex markup into a list of chunks
pub fn lex(text: impl Into<String>, options: LexerOptions) -> Result<Vec<Chunk>> {
    Lexer::new(text, options).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strict_and_lenient() {
        let err = parse("<a><b></a>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(err.to_string().contains("</a>"));
        assert!(parse_lenient("<a><b></a>").is_ok());
    }

    #[test]
    fn test_lex() {
        let chunks = lex("<a x=\"1\">t</a>", LexerOptions::default()).unwrap();
        let kinds: Vec<_> = chunks.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChunkKind::Start, ChunkKind::Content, ChunkKind::End]);
        assert_eq!(chunks[0].attribute("x"), Some("1"));
    }
}
