//! Bounded-depth rendering of JSON-like trees.
//!
//! Parsed image descriptions can be arbitrarily deep. [`truncate_tree`]
//! keeps the first levels of such a tree and folds every mapping below the
//! depth limit into a one-key summary holding its serialized form:
//!
//! ```text
//! {"Image": {"Pixels": {...}}}   --max_depth 1-->   {"Image": {"TRUNCATED (1)": "{\"Pixels\": ...}"}}
//! ```

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value};

const TRUNCATED_PREFIX: &str = "TRUNCATED (";

/// Prune `node` below `max_depth` levels.
///
/// With no depth limit the tree is returned as is. At depth 0 a mapping
/// becomes `{"TRUNCATED (<N>)": <serialized mapping>}` where `N` is its key
/// count, and the serialized text is cut to `max_text_length` characters.
/// Lists and scalars are never folded. A mapping that already is such a
/// summary is left alone.
pub fn truncate_tree(node: &Value, max_depth: Option<usize>, max_text_length: Option<usize>) -> Value {
    let Some(depth) = max_depth else {
        return node.clone();
    };

    match node {
        Value::Object(map) if is_truncation_summary(map) => node.clone(),
        Value::Object(map) if depth == 0 => {
            let mut summary = Map::new();
            summary.insert(
                format!("{}{})", TRUNCATED_PREFIX, map.len()),
                Value::String(truncate_text(&dumps(node), max_text_length)),
            );
            Value::Object(summary)
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    (
                        key.clone(),
                        truncate_tree(value, Some(depth - 1), max_text_length),
                    )
                })
                .collect(),
        ),
        Value::Array(items) if depth > 0 => Value::Array(
            items
                .iter()
                .map(|item| truncate_tree(item, Some(depth - 1), max_text_length))
                .collect(),
        ),
        _ => node.clone(),
    }
}

/// Cut `text` to `max_length` characters and mark the cut with `...`.
pub fn truncate_text(text: &str, max_length: Option<usize>) -> String {
    match max_length {
        Some(max) => match text.char_indices().nth(max) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_string(),
        },
        None => text.to_string(),
    }
}

/// Whether a mapping is exactly `{"TRUNCATED (<N>)": "<text>"}`.
fn is_truncation_summary(map: &Map<String, Value>) -> bool {
    if map.len() != 1 {
        return false;
    }
    map.iter().next().is_some_and(|(key, value)| {
        let count = key
            .strip_prefix(TRUNCATED_PREFIX)
            .and_then(|rest| rest.strip_suffix(')'));
        value.is_string()
            && count.is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    })
}

// =============================================================================
// Serialization
// =============================================================================

/// Serialize compactly with spaced separators and ASCII-only output.
///
/// `{"a":1,"b":[1,2]}` becomes `{"a": 1, "b": [1, 2]}`; characters outside
/// ASCII are written as `\uXXXX` escapes (surrogate pairs above U+FFFF).
pub fn dumps(value: &Value) -> String {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, SpacedAsciiFormatter);
    // Writing a Value into memory cannot fail and only emits ASCII
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(out).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

struct SpacedAsciiFormatter;

impl Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}
