//! Positioned page objects
//!
//! A `PageObject` is the geometry of one page-anchored element, read once
//! from its attributes so sorting does not re-parse strings.

use std::cmp::Ordering;

use crate::config::AttributeRoles;
use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};

/// Geometry of a page-anchored element, in points
#[derive(Debug, Clone, Copy)]
pub struct PageObject {
    pub node: NodeId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageObject {
    /// Read the geometry of `node`. Position and width are required;
    /// height defaults to 0. Values must be finite.
    pub fn from_node(doc: &Document, node: NodeId, roles: &AttributeRoles) -> Result<Self> {
        let offset = doc.node(node).map_or(0, |n| n.start);
        let finite = |name: &str| -> Result<Option<f64>> {
            match doc.get_float(node, name)? {
                Some(value) if !value.is_finite() => Err(Error::InvalidNumber {
                    attribute: name.to_string(),
                    value: doc.get_attribute(node, name).unwrap_or_default().to_string(),
                    offset,
                }),
                value => Ok(value),
            }
        };
        let required = |name: &str| -> Result<f64> {
            finite(name)?.ok_or_else(|| Error::MissingAttribute {
                tag: doc.tag_name(node).unwrap_or_default().to_string(),
                attribute: name.to_string(),
                offset,
            })
        };

        Ok(PageObject {
            node,
            x: required(&roles.x)?,
            y: required(&roles.y)?,
            width: required(&roles.width)?,
            height: finite(&roles.height)?.unwrap_or(0.0),
        })
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal center, with the half width floored
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + (self.width / 2.0).floor()
    }

    /// Vertical center, with the half height floored
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y + (self.height / 2.0).floor()
    }

    /// Reading order: top to bottom, then left to right on the same `y`
    pub fn reading_order(a: &PageObject, b: &PageObject) -> Ordering {
        a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x))
    }
}

/// Two objects are equal when they start on the same row, whatever their
/// `x`. Sorting goes through `reading_order`, which does look at `x`.
impl PartialEq for PageObject {
    fn eq(&self, other: &Self) -> bool {
        self.y == other.y
    }
}
