//! Layout Module - pages and reading order
//!
//! - Object: geometry of one page-anchored element
//! - Page: grouping of anchored elements by page number
//! - Sort: two-column spatial sort with full-width band breaks

pub mod object;
pub mod page;
pub mod sort;

pub use object::PageObject;
pub use page::{collect_pages, Page};
pub use sort::{left_and_right, sort_spatially, wide_and_narrow, PageGeometry};
