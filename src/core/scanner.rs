//! Delimiter scanning using memchr
//!
//! memchr picks SSE2/AVX2/NEON at runtime. Scribus files are mostly long
//! attribute lists, so the quote-aware `>` search dominates lexing time.

use memchr::{memchr, memchr2, memmem};

/// Opening and closing markers of a comment region
pub const COMMENT_OPEN: &[u8] = b"<!--";
pub const COMMENT_CLOSE: &[u8] = b"-->";

/// Byte cursor over markup text
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner positioned at `pos`
    #[inline]
    pub fn new(input: &'a [u8], pos: usize) -> Self {
        Scanner { input, pos }
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.input.get(self.pos..).is_some_and(|rest| rest.starts_with(needle))
    }

    /// Find next occurrence of a specific byte at or after `from`
    #[inline]
    pub fn find_byte_from(&self, byte: u8, from: usize) -> Option<usize> {
        let rest = self.input.get(from..)?;
        memchr(byte, rest).map(|i| from + i)
    }

    /// Find the start of the next chunk: the first `<` strictly after the cursor
    #[inline]
    pub fn find_next_tag_start(&self) -> Option<usize> {
        self.find_byte_from(b'<', self.pos + 1)
    }

    /// Find the end of a comment that opens at the cursor.
    ///
    /// Returns the position just past `-->`.
    pub fn find_comment_end(&self) -> Option<usize> {
        let from = self.pos + COMMENT_OPEN.len();
        let rest = self.input.get(from..)?;
        memmem::find(rest, COMMENT_CLOSE).map(|i| from + i + COMMENT_CLOSE.len())
    }

    /// Find the `>` that closes the tag opened at the cursor.
    ///
    /// `>` inside double quotes does not count, and neither does anything
    /// inside a `<!-- ... -->` region. Single quotes are ordinary characters
    /// in SLA attribute values (`CH="don't"`).
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let mut pos = self.pos + 1;
        let mut in_quote = false;

        while pos < self.input.len() {
            let rest = &self.input[pos..];
            if in_quote {
                // Jump straight to the closing quote
                let offset = memchr(b'"', rest)?;
                pos += offset + 1;
                in_quote = false;
                continue;
            }

            let offset = memchr2(b'"', b'>', rest).map(|found| {
                // A comment may open before the next delimiter
                match memmem::find(&rest[..found], COMMENT_OPEN) {
                    Some(comment) => comment,
                    None => found,
                }
            });
            let offset = match offset {
                Some(offset) => offset,
                None => match memmem::find(rest, COMMENT_OPEN) {
                    Some(comment) => comment,
                    None => return None,
                },
            };

            pos += offset;
            match self.input[pos] {
                b'"' => {
                    in_quote = true;
                    pos += 1;
                }
                b'>' => return Some(pos),
                _ => {
                    // Skip the comment region
                    let after = &self.input[pos + COMMENT_OPEN.len()..];
                    let close = memmem::find(after, COMMENT_CLOSE)?;
                    pos += COMMENT_OPEN.len() + close + COMMENT_CLOSE.len();
                }
            }
        }
        None
    }
}

/// Position of the first ASCII whitespace byte in `input`
#[inline]
pub fn find_whitespace(input: &[u8]) -> Option<usize> {
    input.iter().position(|b| is_whitespace(*b))
}

/// Check if byte is whitespace
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}
