//! Tolerant markup lexer
//!
//! Pull-style lexer that cuts markup text into start, end and content
//! chunks. It tracks an open-tag stack but validates nothing else: unknown
//! tags, odd attribute syntax and stray `>` characters all pass through.
//!
//! - Start: `<name key="value" flag>`, `<name/>` or `<?name ...?>`
//! - End: `</name>`
//! - Content: everything from the cursor up to the next `<`
//! - Comment: `<!-- ... -->` and `<!...>` declarations, kept opaque

use std::borrow::Cow;

use super::attributes::{parse_attributes, Attributes};
use super::scanner::{find_whitespace, Scanner, COMMENT_OPEN};
use super::tag_writer::start_tag;
use crate::config::LexerOptions;
use crate::error::{Error, Result};

/// Progress reporter, called with `offset / total` before each chunk and
/// with `1.0` at the end of input
pub type ProgressCallback = Box<dyn FnMut(f64)>;

/// Type of chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// Element start tag
    Start,
    /// Element end tag
    End,
    /// Text between tags
    Content,
    /// Comment or `<!...>` declaration
    Comment,
}

/// A lexed slice of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset past the last character
    pub end: usize,
    /// Start and End chunks only
    pub tag_name: Option<String>,
    /// Start chunks only
    pub attributes: Option<Attributes>,
    /// `/` or `?` for self-closing start tags
    pub self_closing: Option<char>,
}

impl Chunk {
    fn plain(kind: ChunkKind, start: usize, end: usize) -> Self {
        Chunk {
            kind,
            start,
            end,
            tag_name: None,
            attributes: None,
            self_closing: None,
        }
    }

    #[inline]
    pub fn is_self_closing(&self) -> bool {
        self.self_closing.is_some()
    }

    /// Get an attribute value by key (Start chunks only)
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.as_ref()?.get(key)?.as_deref()
    }
}

/// An element that has been opened but not closed yet
#[derive(Debug, Clone)]
struct OpenTag {
    name: String,
    offset: usize,
}

/// Lexer over an owned markup buffer
pub struct Lexer {
    data: String,
    options: LexerOptions,
    stack: Vec<OpenTag>,
    /// Span of the previously returned chunk
    previous: Option<(usize, usize)>,
    progress: Option<ProgressCallback>,
    done: bool,
    failed: bool,
}

impl Lexer {
    /// Create a lexer over `data`
    pub fn new(data: impl Into<String>, options: LexerOptions) -> Self {
        Lexer {
            data: data.into(),
            options,
            stack: Vec::new(),
            previous: None,
            progress: None,
            done: false,
            failed: false,
        }
    }

    /// Attach a progress callback
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Append more input. Progress ratios become estimates.
    pub fn feed(&mut self, data: &str) {
        self.data.push_str(data);
        self.done = false;
    }

    /// The whole buffer
    #[inline]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Take the buffer back
    pub fn into_data(self) -> String {
        self.data
    }

    /// Names of the tags still open, innermost first
    pub fn open_tags(&self) -> Vec<String> {
        self.stack.iter().rev().map(|t| t.name.clone()).collect()
    }

    /// Text of a chunk.
    ///
    /// Start chunks are regenerated from their tag name and attributes so
    /// edits to the attribute map show up; `raw` returns the original slice
    /// instead. Other chunks are always the original slice.
    pub fn chunk_text<'a>(&'a self, chunk: &Chunk, raw: bool) -> Result<Cow<'a, str>> {
        if chunk.kind != ChunkKind::Start || raw {
            return Ok(Cow::Borrowed(&self.data[chunk.start..chunk.end]));
        }
        let tag_name = chunk.tag_name.as_deref().unwrap_or_default();
        let empty = Attributes::new();
        let attributes = chunk.attributes.as_ref().unwrap_or(&empty);
        Ok(Cow::Owned(start_tag(tag_name, attributes, chunk.self_closing)?))
    }

    /// Lex the next chunk, or `None` at the end of input
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        loop {
            if self.done {
                return Ok(None);
            }

            let start = match self.previous {
                None => 0,
                Some((previous_start, previous_end)) => {
                    if previous_start == previous_end {
                        return Err(Error::Stalled { offset: previous_end });
                    }
                    previous_end
                }
            };

            let len = self.data.len();
            if start > len {
                return Err(Error::CursorOutOfRange { offset: start, len });
            }
            if start == len {
                self.report(1.0);
                self.finish()?;
                return Ok(None);
            }
            self.report(start as f64 / len as f64);

            let chunk = self.lex_at(start)?;
            self.previous = Some((chunk.start, chunk.end));

            if self.options.skip_blank
                && chunk.kind == ChunkKind::Content
                && self.data[chunk.start..chunk.end].trim().is_empty()
            {
                continue;
            }
            return Ok(Some(chunk));
        }
    }

    fn report(&mut self, ratio: f64) {
        if let Some(progress) = self.progress.as_mut() {
            progress(ratio);
        }
    }

    /// End of input: whatever is still open was never closed
    fn finish(&mut self) -> Result<()> {
        self.done = true;
        if self.stack.is_empty() {
            return Ok(());
        }
        let open = self.open_tags();
        if self.options.strict {
            return Err(Error::UnclosedTags { open });
        }
        log::warn!("The input ended before closing {:?}", open);
        Ok(())
    }

    fn lex_at(&mut self, start: usize) -> Result<Chunk> {
        let scanner = Scanner::new(self.data.as_bytes(), start);

        if scanner.starts_with(COMMENT_OPEN) {
            let end = scanner
                .find_comment_end()
                .ok_or(Error::UnterminatedTag { offset: start })?;
            return Ok(Chunk::plain(ChunkKind::Comment, start, end));
        }
        if scanner.starts_with(b"</") {
            let end = self.tag_end(&scanner, start)?;
            return self.lex_end_tag(start, end);
        }
        if scanner.starts_with(b"<!") {
            let end = self.tag_end(&scanner, start)?;
            return Ok(Chunk::plain(ChunkKind::Comment, start, end));
        }
        if scanner.peek() == Some(b'<') {
            let end = self.tag_end(&scanner, start)?;
            return Ok(self.lex_start_tag(start, end));
        }

        if scanner.peek() == Some(b'>') {
            log::warn!("Unexpected '>' at byte {}", start);
        }
        let end = match scanner.find_next_tag_start() {
            Some(end) => end,
            None => {
                let content = &self.data[start..];
                if !content.trim().is_empty() {
                    log::warn!(
                        "The input ended with content after the last tag at byte {}: {:?}",
                        start,
                        content
                    );
                }
                self.data.len()
            }
        };
        Ok(Chunk::plain(ChunkKind::Content, start, end))
    }

    /// Offset just past the `>` closing the tag at `start`
    #[inline]
    fn tag_end(&self, scanner: &Scanner<'_>, start: usize) -> Result<usize> {
        scanner
            .find_tag_end_quoted()
            .map(|close| close + 1)
            .ok_or(Error::UnterminatedTag { offset: start })
    }

    fn lex_start_tag(&mut self, start: usize, end: usize) -> Chunk {
        let raw = &self.data[start..end];

        // Exclude '>' and any self-closing marker
        let mut props_end = raw.len() - 1;
        let self_closing = if raw.ends_with("/>") {
            props_end -= 1;
            Some('/')
        } else if raw.ends_with("?>") {
            props_end -= 1;
            Some('?')
        } else {
            None
        };

        let (tag_name, attributes) = match find_whitespace(raw.as_bytes()) {
            Some(props_start) => {
                let props_start = props_start.min(props_end);
                (
                    raw[1..props_start].trim().to_string(),
                    parse_attributes(&raw[props_start..props_end]),
                )
            }
            None => (raw[1..props_end].trim().to_string(), Attributes::new()),
        };

        if self_closing.is_none() {
            self.stack.push(OpenTag {
                name: tag_name.clone(),
                offset: start,
            });
        }

        Chunk {
            kind: ChunkKind::Start,
            start,
            end,
            tag_name: Some(tag_name),
            attributes: Some(attributes),
            self_closing,
        }
    }

    fn lex_end_tag(&mut self, start: usize, end: usize) -> Result<Chunk> {
        let raw = &self.data[start..end];
        let tag_name = raw[2..raw.len() - 1].trim().to_string();

        match self.stack.last() {
            None => {
                if self.options.strict {
                    return Err(Error::UnexpectedEndTag {
                        tag: tag_name,
                        offset: start,
                    });
                }
                log::warn!("</{}> at byte {} has no matching opening tag", tag_name, start);
            }
            Some(open) if open.name != tag_name => {
                if self.options.strict {
                    return Err(Error::MismatchedEndTag {
                        tag: tag_name,
                        offset: start,
                        open: self.open_tags(),
                    });
                }
                log::warn!(
                    "</{}> at byte {} does not close <{}> opened at byte {}",
                    tag_name,
                    start,
                    open.name,
                    open.offset
                );
            }
            Some(_) => {
                self.stack.pop();
            }
        }

        let mut chunk = Chunk::plain(ChunkKind::End, start, end);
        chunk.tag_name = Some(tag_name);
        Ok(chunk)
    }
}

impl Iterator for Lexer {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
