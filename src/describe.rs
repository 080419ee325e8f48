//! Image description interpretation.
//!
//! ImageDescription tags hold either plain text (Aperio SVS headers,
//! ImageJ key=value lines) or an XML document (OME-XML). XML documents are
//! turned into a JSON-like tree so they can be pruned with
//! [`truncate_tree`](crate::tree::truncate_tree):
//!
//! - the root becomes `{root_name: node}`
//! - an element with neither attributes nor child elements becomes its text,
//!   or null when it has none
//! - otherwise an element becomes a mapping holding `@name` attributes, then
//!   child elements by local name, then its text under `#text`
//! - repeated child names collect into a list in document order

use roxmltree::{Document, Node};
use serde_json::{Map, Value};

use crate::tree::{truncate_text, truncate_tree};

/// Whether `text` is a well-formed XML document.
pub fn is_xml(text: &str) -> bool {
    Document::parse(text).is_ok()
}

/// A parsed ImageDescription.
#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    Xml(Value),
    Plain(String),
}

impl Description {
    pub fn parse(text: &str) -> Self {
        match Document::parse(text) {
            Ok(doc) => Description::Xml(document_to_value(&doc)),
            Err(_) => Description::Plain(text.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Description::Xml(_) => "xml",
            Description::Plain(_) => "text",
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Description::Xml(tree) => tree.clone(),
            Description::Plain(text) => Value::String(text.clone()),
        }
    }

    /// Bounded rendering: XML trees are pruned to `max_depth`, plain text is
    /// cut to `max_text_length` characters.
    pub fn render(&self, max_depth: Option<usize>, max_text_length: Option<usize>) -> Value {
        match self {
            Description::Xml(tree) => truncate_tree(tree, max_depth, max_text_length),
            Description::Plain(text) => Value::String(truncate_text(text, max_text_length)),
        }
    }
}

/// Convert an XML document into a tree.
pub fn xml_to_value(text: &str) -> Result<Value, roxmltree::Error> {
    Document::parse(text).map(|doc| document_to_value(&doc))
}

fn document_to_value(doc: &Document<'_>) -> Value {
    let root = doc.root_element();
    let mut tree = Map::new();
    tree.insert(root.tag_name().name().to_string(), element_to_value(root));
    Value::Object(tree)
}

fn element_to_value(node: Node<'_, '_>) -> Value {
    let text = element_text(node);
    let has_children = node.children().any(|child| child.is_element());

    if node.attributes().next().is_none() && !has_children {
        return text.map_or(Value::Null, Value::String);
    }

    let mut map = Map::new();
    for attribute in node.attributes() {
        map.insert(
            format!("@{}", attribute.name()),
            Value::String(attribute.value().to_string()),
        );
    }

    for child in node.children().filter(Node::is_element) {
        let name = child.tag_name().name().to_string();
        let value = element_to_value(child);
        match map.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(name, value);
            }
        }
    }

    if let Some(text) = text {
        map.insert("#text".to_string(), Value::String(text));
    }

    Value::Object(map)
}

/// Direct text content, trimmed, or None when blank.
fn element_text(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
