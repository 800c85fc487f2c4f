//! Configuration
//!
//! Option structs for lexing, page collection and text dumping. Defaults
//! match the attribute and tag names Scribus writes, so `LayoutConfig::default()`
//! handles `.sla` files as-is. Every struct deserializes from a partial JSON
//! object; missing fields keep their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Lexer behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerOptions {
    /// Raise on unmatched start or end tags instead of logging them
    pub strict: bool,
    /// Suppress whitespace-only content chunks
    pub skip_blank: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        LexerOptions {
            strict: true,
            skip_blank: false,
        }
    }
}

impl LexerOptions {
    /// Tolerate tag mismatches
    pub fn lenient() -> Self {
        LexerOptions {
            strict: false,
            skip_blank: false,
        }
    }

    /// Options used for Scribus projects: strict, blank content dropped
    pub fn scribus() -> Self {
        LexerOptions {
            strict: true,
            skip_blank: true,
        }
    }
}

/// Names of the attributes that carry layout meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeRoles {
    /// Page designator (`OwnPage`)
    pub page: String,
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
    /// Visible text of a run (`CH`)
    pub text: String,
    /// Image file reference (`PFILE`)
    pub image: String,
}

impl Default for AttributeRoles {
    fn default() -> Self {
        AttributeRoles {
            page: "OwnPage".to_string(),
            x: "XPOS".to_string(),
            y: "YPOS".to_string(),
            width: "WIDTH".to_string(),
            height: "HEIGHT".to_string(),
            text: "CH".to_string(),
            image: "PFILE".to_string(),
        }
    }
}

/// Where the page geometry lives: the document element and its attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometryKeys {
    pub document_tag: String,
    pub title: String,
    pub page_width: String,
    pub page_height: String,
    pub margin_left: String,
    pub margin_right: String,
    pub margin_top: String,
    pub margin_bottom: String,
}

impl Default for PageGeometryKeys {
    fn default() -> Self {
        PageGeometryKeys {
            document_tag: "DOCUMENT".to_string(),
            title: "TITLE".to_string(),
            page_width: "PAGEWIDTH".to_string(),
            page_height: "PAGEHEIGHT".to_string(),
            margin_left: "BORDERLEFT".to_string(),
            margin_right: "BORDERRIGHT".to_string(),
            margin_top: "BORDERTOP".to_string(),
            margin_bottom: "BORDERBOTTOM".to_string(),
        }
    }
}

/// Text dump settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpOptions {
    /// Tags that start a paragraph
    pub paragraph_tags: Vec<String>,
    /// Mark written before a paragraph tag
    pub paragraph_mark: String,
    /// Tags that stand for a tab stop
    pub tab_tags: Vec<String>,
    pub tab_mark: String,
    /// Tags whose text attribute is mandatory
    pub text_run_tags: Vec<String>,
    /// Text fragments that must be followed by a bulleted paragraph.
    /// Empty disables the check.
    pub bullet_expected_after: Vec<String>,
    /// Directory relative image references resolve against.
    /// `None` means the working directory.
    pub image_base: Option<PathBuf>,
}

impl Default for DumpOptions {
    fn default() -> Self {
        DumpOptions {
            paragraph_tags: vec!["PAGEOBJECT".to_string(), "para".to_string()],
            paragraph_mark: "\n\n".to_string(),
            tab_tags: vec!["tab".to_string()],
            tab_mark: "\t".to_string(),
            text_run_tags: vec!["ITEXT".to_string()],
            bullet_expected_after: Vec::new(),
            image_base: None,
        }
    }
}

impl DumpOptions {
    #[inline]
    pub fn is_paragraph(&self, tag: &str) -> bool {
        self.paragraph_tags.iter().any(|t| t == tag)
    }

    #[inline]
    pub fn is_tab(&self, tag: &str) -> bool {
        self.tab_tags.iter().any(|t| t == tag)
    }

    #[inline]
    pub fn is_text_run(&self, tag: &str) -> bool {
        self.text_run_tags.iter().any(|t| t == tag)
    }

    /// Resolve an image reference against `image_base`
    pub fn resolve_image(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        match &self.image_base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Everything page collection, sorting and dumping need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub lexer: LexerOptions,
    pub roles: AttributeRoles,
    pub geometry: PageGeometryKeys,
    /// Tags allowed to carry the page attribute
    pub page_object_tags: Vec<String>,
    pub dump: DumpOptions,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            lexer: LexerOptions::scribus(),
            roles: AttributeRoles::default(),
            geometry: PageGeometryKeys::default(),
            page_object_tags: ["PAGEOBJECT", "MASTEROBJECT", "PatternItem", "FRAMEOBJECT"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            dump: DumpOptions::default(),
        }
    }
}

impl LayoutConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    #[inline]
    pub fn is_page_object(&self, tag: &str) -> bool {
        self.page_object_tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scribus_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.roles.page, "OwnPage");
        assert_eq!(config.geometry.margin_left, "BORDERLEFT");
        assert!(config.is_page_object("FRAMEOBJECT"));
        assert!(!config.is_page_object("StoryText"));
        assert!(config.lexer.skip_blank);
        assert!(config.dump.is_paragraph("para"));
    }

    #[test]
    fn test_partial_json() {
        let config = LayoutConfig::from_json(
            r#"{"roles": {"text": "TEXT"}, "dump": {"bullet_expected_after": ["giant silhouettes"]}}"#,
        )
        .unwrap();
        assert_eq!(config.roles.text, "TEXT");
        assert_eq!(config.roles.x, "XPOS");
        assert_eq!(config.dump.bullet_expected_after, vec!["giant silhouettes".to_string()]);
        assert_eq!(config.dump.tab_mark, "\t");
    }

    #[test]
    fn test_bad_json() {
        let err = LayoutConfig::from_json("{").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[test]
    fn test_resolve_image() {
        let options = DumpOptions {
            image_base: Some(PathBuf::from("/projects/book")),
            ..DumpOptions::default()
        };
        assert_eq!(
            options.resolve_image("images/a.png"),
            PathBuf::from("/projects/book/images/a.png")
        );
        assert_eq!(options.resolve_image("/abs/b.png"), PathBuf::from("/abs/b.png"));
    }
}
