//! Column-aware spatial sort
//!
//! Pages are laid out in up to two columns, interrupted by full-width
//! objects (headings, banners, wide images). Objects wider than a little
//! over half the safe width are "wide" and split the page into horizontal
//! bands; inside each band the left column is read before the right one.

use crate::config::PageGeometryKeys;
use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};

use super::object::PageObject;

/// Page size and margins, in whole points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    pub width: i64,
    pub height: i64,
    pub margin_left: i64,
    pub margin_right: i64,
    pub margin_top: i64,
    pub margin_bottom: i64,
}

impl PageGeometry {
    /// Read the geometry from the document-body element.
    ///
    /// Width and the horizontal margins are required; fractional values are
    /// truncated. Height and vertical margins default to 0.
    pub fn from_document(
        doc: &Document,
        document: NodeId,
        keys: &PageGeometryKeys,
    ) -> Result<Self> {
        let read = |name: &str| -> Result<Option<i64>> {
            Ok(doc.get_float(document, name)?.map(|v| v.trunc() as i64))
        };
        let required = |name: &str| -> Result<i64> {
            read(name)?.ok_or_else(|| Error::MissingAttribute {
                tag: keys.document_tag.clone(),
                attribute: name.to_string(),
                offset: doc.node(document).map_or(0, |n| n.start),
            })
        };

        Ok(PageGeometry {
            width: required(&keys.page_width)?,
            height: read(&keys.page_height)?.unwrap_or(0),
            margin_left: required(&keys.margin_left)?,
            margin_right: required(&keys.margin_right)?,
            margin_top: read(&keys.margin_top)?.unwrap_or(0),
            margin_bottom: read(&keys.margin_bottom)?.unwrap_or(0),
        })
    }

    /// Width minus the horizontal margins
    #[inline]
    pub fn safe_width(&self) -> i64 {
        self.width - self.margin_left - self.margin_right
    }

    /// Height minus the vertical margins
    #[inline]
    pub fn safe_height(&self) -> i64 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Half the safe width, floored
    #[inline]
    pub fn half_width(&self) -> i64 {
        self.safe_width().div_euclid(2)
    }

    /// Objects wider than this span both columns. Slightly over half, since
    /// a column picture with a blank border often overhangs a little.
    #[inline]
    pub fn wide_threshold(&self) -> i64 {
        let half = self.half_width();
        half + half.div_euclid(6)
    }

    /// The vertical line between the columns
    #[inline]
    pub fn center_x(&self) -> i64 {
        self.margin_left + self.half_width()
    }
}

/// Separate wide and narrow objects, keeping their relative order
pub fn wide_and_narrow(
    objects: Vec<PageObject>,
    geometry: &PageGeometry,
) -> (Vec<PageObject>, Vec<PageObject>) {
    let threshold = geometry.wide_threshold() as f64;
    objects.into_iter().partition(|o| o.width > threshold)
}

/// Separate narrow objects into left and right columns by their centers
pub fn left_and_right(
    narrow: &[PageObject],
    geometry: &PageGeometry,
) -> (Vec<PageObject>, Vec<PageObject>) {
    let center = geometry.center_x() as f64;
    narrow.iter().copied().partition(|o| o.center_x() < center)
}

/// Sort a page's objects into reading order.
///
/// Wide and narrow objects are each sorted by `y` then `x`. Walking down
/// the wide objects, every band emits its left-column objects, then its
/// right-column objects, then the wide object closing the band. A final
/// band below the last wide object collects the remaining columns.
pub fn sort_spatially(
    objects: Vec<PageObject>,
    geometry: &PageGeometry,
    page: i64,
) -> Result<Vec<PageObject>> {
    let expected = objects.len();
    let (mut wide, mut narrow) = wide_and_narrow(objects, geometry);
    wide.sort_by(PageObject::reading_order);
    narrow.sort_by(PageObject::reading_order);

    if wide.is_empty() {
        log::debug!("There are no wide elements on page {}+1={}", page, page + 1);
    }
    log::debug!(
        "Sorting page {}+1={}: {} wide, {} narrow",
        page,
        page + 1,
        wide.len(),
        narrow.len()
    );

    let (left, right) = left_and_right(&narrow, geometry);
    let sorted = merge_bands(&wide, &left, &right, page)?;

    if sorted.len() != expected {
        return Err(Error::SortCountMismatch {
            page,
            expected,
            actual: sorted.len(),
        });
    }
    Ok(sorted)
}

/// Interleave sorted columns with the wide objects that separate them
fn merge_bands(
    wide: &[PageObject],
    left: &[PageObject],
    right: &[PageObject],
    page: i64,
) -> Result<Vec<PageObject>> {
    // The last band ends just below the lowest column object
    let divider = left
        .iter()
        .chain(right)
        .map(|o| o.y)
        .reduce(f64::max)
        .map_or(f64::INFINITY, |y| y + 1.0);

    let mut min_y = wide
        .iter()
        .chain(left)
        .chain(right)
        .map(|o| o.y)
        .reduce(f64::min)
        .unwrap_or(f64::NEG_INFINITY);

    let mut sorted = Vec::with_capacity(wide.len() + left.len() + right.len());
    for boundary in wide.iter().map(Some).chain(std::iter::once(None)) {
        let limit = boundary.map_or(divider, |w| w.y);

        let in_band = |o: &&PageObject| o.y >= min_y && o.y < limit;
        sorted.extend(left.iter().filter(in_band).copied());
        sorted.extend(right.iter().filter(in_band).copied());

        if let Some(wide_object) = boundary {
            sorted.push(*wide_object);
            if wide_object.y < min_y {
                return Err(Error::NonMonotonicLayout {
                    page,
                    y: wide_object.y,
                    min_y,
                    boundaries: wide.iter().map(|w| (w.x, w.y)).collect(),
                });
            }
            min_y = wide_object.y;
        }
    }

    Ok(sorted)
}
