//! Core markup lexing primitives
//!
//! - Scanner: memchr-based delimiter detection (quote and comment aware)
//! - Attributes: property list parsing into an ordered map
//! - Lexer: pull-style chunking with an open-tag stack
//! - TagWriter: start tag regeneration with write-back validation
//! - Encoding: BOM/UTF-16 detection and decoding

pub mod attributes;
pub mod encoding;
pub mod lexer;
pub mod scanner;
pub mod tag_writer;

pub use attributes::Attributes;
pub use encoding::decode_source;
pub use lexer::{Chunk, ChunkKind, Lexer, ProgressCallback};
