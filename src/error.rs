//! Error types
//!
//! Every failure is fatal for the document being processed. `Error::kind`
//! groups the variants into the categories callers usually branch on.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Markup or layout structure is inconsistent
    Structural,
    /// Generated markup would be ambiguous (write-back path)
    Validation,
    /// A node lacks data the dump requires
    MissingData,
    /// A referenced file does not exist
    NotFound,
    /// Reading, writing or serializing failed
    Io,
}

/// Errors raised while lexing, building, sorting or dumping a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `<` was never closed by an unquoted `>`
    #[error("The '<' at {offset} wasn't closed")]
    UnterminatedTag { offset: usize },

    /// End tag does not match the innermost open tag (strict mode)
    #[error("</{tag}> ended at {offset} before the expected {open:?}")]
    MismatchedEndTag {
        tag: String,
        offset: usize,
        /// Open tags, innermost first
        open: Vec<String>,
    },

    /// End tag with no open tag at all (strict mode)
    #[error("</{tag}> ended at {offset} before a matching opening tag")]
    UnexpectedEndTag { tag: String, offset: usize },

    /// Input ended while tags were still open (strict mode)
    #[error("The input ended before closing {open:?}")]
    UnclosedTags { open: Vec<String> },

    /// The lexer cursor did not advance
    #[error("The cursor didn't move from {offset}")]
    Stalled { offset: usize },

    /// The lexer cursor is past the end of the buffer
    #[error("Cursor {offset} is past the input length {len}")]
    CursorOutOfRange { offset: usize, len: usize },

    /// A full-width object lies above the current band floor
    #[error("Sorting page {page} failed: y {y} < {min_y} in {boundaries:?}")]
    NonMonotonicLayout {
        page: i64,
        y: f64,
        min_y: f64,
        /// (x, y) of every boundary on the page
        boundaries: Vec<(f64, f64)>,
    },

    /// Spatial sort dropped or duplicated objects
    #[error("Sorting page {page} produced {actual} objects from {expected}")]
    SortCountMismatch {
        page: i64,
        expected: usize,
        actual: usize,
    },

    /// An element that is not a known page object carries the page attribute
    #[error("<{tag}> at {offset} carries a page number but is not one of {expected:?}")]
    UnsupportedPageObject {
        tag: String,
        offset: usize,
        expected: Vec<String>,
    },

    /// Attribute key that cannot be written back
    #[error("A property name must not be blank nor contain '=' or whitespace but got `{key}`")]
    InvalidAttributeKey { key: String },

    /// Attribute value that cannot be written back
    #[error("A property value must not contain '\"': {key}=\"{value}\"")]
    InvalidAttributeValue { key: String, value: String },

    /// A text run element has no text
    #[error("No {attribute} though tagName is {tag} at {offset}")]
    MissingText {
        attribute: String,
        tag: String,
        offset: usize,
    },

    /// A known marker was not followed by a bullet run
    #[error("No bullet in value={next:?} following {previous:?} at {offset}")]
    MissingBullet {
        previous: String,
        next: Option<String>,
        offset: usize,
    },

    /// A required attribute is absent
    #[error("<{tag}> at {offset} has no {attribute}")]
    MissingAttribute {
        tag: String,
        attribute: String,
        offset: usize,
    },

    /// An attribute value could not be read as a number
    #[error("{attribute}=\"{value}\" at {offset} is not a number")]
    InvalidNumber {
        attribute: String,
        value: String,
        offset: usize,
    },

    /// No element carries the page attribute
    #[error("There are no visible objects with {attribute}")]
    NoVisiblePages { attribute: String },

    /// Pages can only be collected once per document
    #[error("Pages were already collected")]
    PagesAlreadyCollected,

    /// Image referenced by the document is missing
    #[error("No such file: {0}")]
    ImageNotFound(std::path::PathBuf),

    /// Input bytes could not be decoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnterminatedTag { .. }
            | Error::MismatchedEndTag { .. }
            | Error::UnexpectedEndTag { .. }
            | Error::UnclosedTags { .. }
            | Error::Stalled { .. }
            | Error::CursorOutOfRange { .. }
            | Error::NonMonotonicLayout { .. }
            | Error::SortCountMismatch { .. }
            | Error::UnsupportedPageObject { .. }
            | Error::PagesAlreadyCollected
            | Error::Encoding(_) => ErrorKind::Structural,
            Error::InvalidAttributeKey { .. } | Error::InvalidAttributeValue { .. } => {
                ErrorKind::Validation
            }
            Error::MissingText { .. }
            | Error::MissingBullet { .. }
            | Error::MissingAttribute { .. }
            | Error::InvalidNumber { .. }
            | Error::NoVisiblePages { .. } => ErrorKind::MissingData,
            Error::ImageNotFound(_) => ErrorKind::NotFound,
            Error::Io(_) | Error::Json(_) => ErrorKind::Io,
        }
    }
}
