//! Page model
//!
//! Elements carrying the page attribute anchor a page. Everything below an
//! anchor belongs to that page unless a nested anchor claims it.

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::dom::{Document, NodeId, ROOT};
use crate::error::{Error, Result};

use super::object::PageObject;
use super::sort::{sort_spatially, PageGeometry};

/// One page and its anchored elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page number from the page attribute (0-based, may be negative)
    pub number: i64,
    /// The first element that anchored this page
    pub anchor: NodeId,
    /// The document-body element in scope when the page was found
    pub document: Option<NodeId>,
    /// Anchored elements, in document order until sorted
    pub elements: Vec<NodeId>,
}

impl Page {
    fn new(number: i64, anchor: NodeId, document: Option<NodeId>) -> Self {
        Page {
            number,
            anchor,
            document,
            elements: Vec::new(),
        }
    }

    /// Reorder `elements` into reading order
    pub fn sort_spatially(&mut self, doc: &Document, config: &LayoutConfig) -> Result<()> {
        let document = self
            .document
            .or_else(|| doc.document_node(&config.geometry.document_tag))
            .ok_or_else(|| Error::MissingAttribute {
                tag: config.geometry.document_tag.clone(),
                attribute: config.geometry.page_width.clone(),
                offset: 0,
            })?;
        let geometry = PageGeometry::from_document(doc, document, &config.geometry)?;

        let objects = self
            .elements
            .iter()
            .map(|&id| PageObject::from_node(doc, id, &config.roles))
            .collect::<Result<Vec<_>>>()?;

        let sorted = sort_spatially(objects, &geometry, self.number)?;
        self.elements = sorted.into_iter().map(|o| o.node).collect();
        Ok(())
    }
}

/// Walk the tree once and group anchored elements by page number
pub fn collect_pages(doc: &Document, config: &LayoutConfig) -> Result<BTreeMap<i64, Page>> {
    let mut pages = BTreeMap::new();
    collect_into(doc, config, ROOT, None, &mut pages)?;
    log::debug!(
        "Collected {} pages with {} anchored elements",
        pages.len(),
        pages.values().map(|p: &Page| p.elements.len()).sum::<usize>()
    );
    Ok(pages)
}

fn collect_into(
    doc: &Document,
    config: &LayoutConfig,
    id: NodeId,
    mut document: Option<NodeId>,
    pages: &mut BTreeMap<i64, Page>,
) -> Result<()> {
    let Some(element) = doc.element(id) else {
        return Ok(());
    };

    if element.tag_name() == Some(config.geometry.document_tag.as_str()) {
        document = Some(id);
    }

    if let Some(number) = doc.get_int(id, &config.roles.page)? {
        let tag = element.tag_name.as_str();
        if !config.is_page_object(tag) {
            return Err(Error::UnsupportedPageObject {
                tag: tag.to_string(),
                offset: doc.node(id).map_or(0, |n| n.start),
                expected: config.page_object_tags.clone(),
            });
        }
        if doc.ancestor_has_attribute(id, &config.roles.page) {
            log::debug!("<{}> on page {} is nested in another page object", tag, number);
        }
        pages
            .entry(number)
            .or_insert_with(|| Page::new(number, id, document))
            .elements
            .push(id);
    }

    for child in doc.children(id) {
        collect_into(doc, config, child, document, pages)?;
    }
    Ok(())
}
