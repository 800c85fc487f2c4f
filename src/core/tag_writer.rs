//! Start tag regeneration
//!
//! Edited attribute maps are written back as `<tag key="value" flag/>`.
//! Nothing is escaped: a key or value that would change how the tag lexes
//! is rejected instead.

use super::attributes::Attributes;
use crate::error::{Error, Result};

/// Append a start tag to `buf`
pub fn write_start_tag(
    buf: &mut String,
    tag_name: &str,
    attributes: &Attributes,
    self_closing: Option<char>,
) -> Result<()> {
    buf.push('<');
    buf.push_str(tag_name);

    for (key, value) in attributes {
        validate_key(key)?;
        buf.push(' ');
        buf.push_str(key);
        if let Some(value) = value {
            if value.contains('"') {
                return Err(Error::InvalidAttributeValue {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
            buf.push_str("=\"");
            buf.push_str(value);
            buf.push('"');
        }
    }

    if let Some(marker) = self_closing {
        buf.push(marker);
    }
    buf.push('>');
    Ok(())
}

/// Regenerate a start tag as a new string
pub fn start_tag(
    tag_name: &str,
    attributes: &Attributes,
    self_closing: Option<char>,
) -> Result<String> {
    let mut buf = String::with_capacity(tag_name.len() + 2 + attributes.len() * 16);
    write_start_tag(&mut buf, tag_name, attributes, self_closing)?;
    Ok(buf)
}

/// Keys must be non-blank and free of `=` and whitespace
fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() || key.contains('=') || key.chars().any(char::is_whitespace) {
        return Err(Error::InvalidAttributeKey { key: key.to_string() });
    }
    Ok(())
}
