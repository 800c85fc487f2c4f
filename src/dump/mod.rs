//! Text dump
//!
//! Writes the visible text of a document as light markdown: a title
//! heading, one `## Page N` section per visible page, blank lines between
//! paragraphs and markdown images with captions. Page objects are visited
//! in reading order; the text runs inside each object keep source order.

pub mod caption;

use std::collections::BTreeMap;
use std::io::Write;

use crate::config::{LayoutConfig, LexerOptions};
use crate::core::{ChunkKind, Lexer};
use crate::dom::{Document, NodeData, NodeId, ROOT};
use crate::error::{Error, Result};
use crate::layout::{collect_pages, Page};

pub use caption::{image_caption, image_name, write_image, CAPTION_TIME_FORMAT};

/// Bullet character written by layout programs
pub const BULLET: char = '\u{2022}';

/// Replace layout bullets with markdown list markers
#[inline]
pub fn normalize_bullets(text: &str) -> String {
    text.replace(BULLET, "*")
}

/// Walks a document and writes its text
pub struct TextDumper<'a> {
    doc: &'a Document,
    config: &'a LayoutConfig,
    /// Descend into page objects nested in other page objects
    include_nested: bool,
}

impl<'a> TextDumper<'a> {
    /// Dumper for page output. Nested page objects are left to their own page.
    pub fn new(doc: &'a Document, config: &'a LayoutConfig) -> Self {
        TextDumper {
            doc,
            config,
            include_nested: false,
        }
    }

    /// Dumper for plain document order, nested page objects included
    pub fn document_order(doc: &'a Document, config: &'a LayoutConfig) -> Self {
        TextDumper {
            doc,
            config,
            include_nested: true,
        }
    }

    /// Sort and write every visible page. Returns the number of pages written.
    ///
    /// Negative page numbers hold objects that are not displayed and are
    /// skipped; gaps in the numbering are logged.
    pub fn write_pages<W: Write + ?Sized>(
        &self,
        pages: &mut BTreeMap<i64, Page>,
        out: &mut W,
    ) -> Result<usize> {
        let (Some(&first), Some(&last)) = (pages.keys().next(), pages.keys().next_back()) else {
            return Err(Error::NoVisiblePages {
                attribute: self.config.roles.page.clone(),
            });
        };
        let first = first.max(0);

        let title = self.doc.title(&self.config.geometry).unwrap_or_default();
        write!(out, "\n\n# {}\n", title)?;

        let numbers: Vec<i64> = pages.keys().copied().collect();
        let mut count = 0;
        for index in first..=last {
            let Some(page) = pages.get_mut(&index) else {
                log::debug!("Blank page {}+1={} (not in {:?})", index, index + 1, numbers);
                continue;
            };
            count += 1;
            page.sort_spatially(self.doc, self.config)?;
            write!(out, "\n\n## Page {}\n", index + 1)?;
            self.write_page(page, out)?;
        }

        log::info!("Dumped {} pages", count);
        Ok(count)
    }

    /// Write the page's elements in their current order
    pub fn write_page<W: Write + ?Sized>(&self, page: &Page, out: &mut W) -> Result<()> {
        for &id in &page.elements {
            self.write_node(id, &self.config.dump.paragraph_mark, out)?;
        }
        Ok(())
    }

    /// Write one node and its subtree in document order.
    ///
    /// `para_mark` is written if the node is a paragraph tag.
    pub fn write_node<W: Write + ?Sized>(
        &self,
        id: NodeId,
        para_mark: &str,
        out: &mut W,
    ) -> Result<()> {
        let Some(node) = self.doc.node(id) else {
            return Ok(());
        };
        let element = match &node.data {
            NodeData::Element(element) => element,
            NodeData::Text(value) => {
                out.write_all(normalize_bullets(value).as_bytes())?;
                return Ok(());
            }
            NodeData::Comment(_) => return Ok(()),
        };

        let roles = &self.config.roles;
        let dump = &self.config.dump;
        let tag = element.tag_name().unwrap_or_default();

        if dump.is_paragraph(tag) {
            out.write_all(para_mark.as_bytes())?;
        }
        if dump.is_tab(tag) {
            out.write_all(dump.tab_mark.as_bytes())?;
        }

        let text = element.attribute(&roles.text).filter(|v| !v.is_empty());
        let image = element.attribute(&roles.image).filter(|v| !v.is_empty());
        if text.is_none() && dump.is_text_run(tag) {
            return Err(Error::MissingText {
                attribute: roles.text.clone(),
                tag: tag.to_string(),
                offset: node.start,
            });
        }

        if let Some(reference) = image {
            write_image(out, reference, &dump.resolve_image(reference))?;
        } else if let Some(text) = text {
            out.write_all(normalize_bullets(text).as_bytes())?;
        }

        let children: Vec<NodeId> = self
            .doc
            .children(id)
            .filter(|&child| self.include_nested || !self.doc.has_attribute(child, &roles.page))
            .collect();

        // The mark falls back to the parent's for every child; a single-spaced
        // bullet paragraph does not carry over to the siblings after it.
        for (i, &child) in children.iter().enumerate() {
            let mut mark = para_mark;
            if let Some(&next) = children.get(i + 1) {
                if self.starts_with_bullet(next) {
                    // Paragraphs between bullet items are single-spaced
                    mark = "\n";
                } else if let Some(previous) =
                    i.checked_sub(1).and_then(|p| self.text_of(children[p]))
                {
                    if dump.bullet_expected_after.iter().any(|m| previous.contains(m.as_str())) {
                        return Err(Error::MissingBullet {
                            previous: previous.to_string(),
                            next: self.text_of(next).map(str::to_string),
                            offset: self.doc.node(child).map_or(0, |n| n.start),
                        });
                    }
                }
            }
            self.write_node(child, mark, out)?;
        }
        Ok(())
    }

    /// Text attribute of an element, or the content of a text node
    fn text_of(&self, id: NodeId) -> Option<&'a str> {
        let node = self.doc.node(id)?;
        match &node.data {
            NodeData::Element(element) => element.attribute(&self.config.roles.text),
            NodeData::Text(value) => Some(value),
            NodeData::Comment(_) => None,
        }
    }

    #[inline]
    fn starts_with_bullet(&self, id: NodeId) -> bool {
        self.text_of(id).is_some_and(|text| text.starts_with(BULLET))
    }
}

impl Document {
    /// Collect pages, sort each visible page and write its text.
    ///
    /// The page map is kept on the document afterwards, so a document can
    /// only be dumped this way once. Returns the number of pages written.
    pub fn dump_text<W: Write + ?Sized>(
        &mut self,
        out: &mut W,
        config: &LayoutConfig,
    ) -> Result<usize> {
        if self.pages().is_some() {
            return Err(Error::PagesAlreadyCollected);
        }
        let mut pages = collect_pages(self, config)?;
        let count = TextDumper::new(self, config).write_pages(&mut pages, out)?;
        self.store_pages(pages);
        Ok(count)
    }

    /// Write all text in document order, ignoring pages and positions
    pub fn dump_text_unsorted<W: Write + ?Sized>(
        &self,
        out: &mut W,
        config: &LayoutConfig,
    ) -> Result<()> {
        TextDumper::document_order(self, config).write_node(ROOT, &config.dump.paragraph_mark, out)
    }
}

/// Write every value of `attribute` on its own line, in source order.
///
/// Only lexes, leniently; no tree is built, so unbalanced markup is fine.
/// Returns the number of values written.
pub fn dump_attribute_values<W: Write + ?Sized>(
    text: &str,
    attribute: &str,
    out: &mut W,
) -> Result<usize> {
    let mut count = 0;
    for chunk in Lexer::new(text, LexerOptions::lenient()) {
        let chunk = chunk?;
        if chunk.kind != ChunkKind::Start {
            continue;
        }
        if let Some(value) = chunk.attribute(attribute) {
            writeln!(out, "{}", value)?;
            count += 1;
        }
    }
    Ok(count)
}
