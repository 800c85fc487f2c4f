//! Tree serialization
//!
//! Converts the arena into nested `NodeRecord`s with ordered keys and
//! attributes, then to JSON with serde_json.

use serde::{Deserialize, Serialize};

use super::document::Document;
use super::node::{NodeData, NodeId, ROOT};
use crate::core::Attributes;
use crate::error::Result;

/// Serializable view of one node and its subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end: Option<usize>,
    /// Text and comment content
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<String>,
    /// `start`, `content` or `comment`; absent on the root
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub context: Option<String>,
    #[serde(rename = "tagName", skip_serializing_if = "Option::is_none", default)]
    pub tag_name: Option<String>,
    /// Elements only; the root has an empty map
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub attributes: Option<Attributes>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub self_closer: Option<char>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<NodeRecord>,
}

impl Document {
    /// Build the record tree for the whole document.
    ///
    /// `include_locations` adds the byte span of every non-root node.
    pub fn to_record(&self, include_locations: bool) -> NodeRecord {
        self.record_for(ROOT, include_locations)
    }

    /// Build the record tree under one node
    pub fn record_for(&self, id: NodeId, include_locations: bool) -> NodeRecord {
        let mut record = NodeRecord {
            start: None,
            end: None,
            value: None,
            context: None,
            tag_name: None,
            attributes: None,
            self_closer: None,
            children: Vec::new(),
        };
        let Some(node) = self.node(id) else {
            return record;
        };

        if include_locations && !node.is_root() {
            record.start = Some(node.start);
            record.end = Some(node.end);
        }

        match &node.data {
            NodeData::Element(element) => {
                if !element.is_root {
                    record.context = Some("start".to_string());
                    record.tag_name = Some(element.tag_name.clone());
                }
                record.attributes = Some(element.attributes.clone());
                record.self_closer = element.self_closing;
            }
            NodeData::Text(value) => {
                record.value = Some(value.clone());
                record.context = Some("content".to_string());
            }
            NodeData::Comment(value) => {
                record.value = Some(value.clone());
                record.context = Some("comment".to_string());
            }
        }

        record.children = self
            .children(id)
            .map(|child| self.record_for(child, include_locations))
            .collect();
        record
    }

    /// Serialize the record tree as compact JSON
    pub fn to_json(&self, include_locations: bool) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record(include_locations))?)
    }

    /// Serialize the record tree as indented JSON
    pub fn to_json_pretty(&self, include_locations: bool) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_record(include_locations))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LexerOptions;
    use serde_json::json;

    #[test]
    fn test_record_structure() {
        let doc = Document::parse("<a x=\"1\" y><b/>hi</a>", LexerOptions::default()).unwrap();
        let value = serde_json::to_value(doc.to_record(false)).unwrap();
        assert_eq!(
            value,
            json!({
                "attributes": {},
                "children": [{
                    "context": "start",
                    "tagName": "a",
                    "attributes": {"x": "1", "y": null},
                    "children": [
                        {"context": "start", "tagName": "b", "attributes": {}, "self_closer": "/"},
                        {"value": "hi", "context": "content"}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_key_order_is_stable() {
        let doc = Document::parse("<a z=\"1\" b=\"2\"/>", LexerOptions::default()).unwrap();
        let text = doc.to_json(true).unwrap();
        let start = text.find("\"start\":0").unwrap();
        let tag = text.find("\"tagName\"").unwrap();
        let z = text.find("\"z\"").unwrap();
        let b = text.find("\"b\"").unwrap();
        assert!(start < tag);
        assert!(z < b);
    }

    #[test]
    fn test_locations() {
        let doc = Document::parse("<a>x</a>", LexerOptions::default()).unwrap();
        let record = doc.to_record(true);
        assert_eq!(record.start, None);
        let a = &record.children[0];
        assert_eq!((a.start, a.end), (Some(0), Some(3)));
        assert_eq!((a.children[0].start, a.children[0].end), (Some(3), Some(4)));
    }

    #[test]
    fn test_json_round_trip_into_record() {
        let doc = Document::parse("<a x=\"1\"><!-- c --></a>", LexerOptions::default()).unwrap();
        let text = doc.to_json_pretty(true).unwrap();
        let record: NodeRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(record, doc.to_record(true));
    }
}
