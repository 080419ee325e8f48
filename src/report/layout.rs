//! One-line-per-node summary of a report's layout.

use serde_json::Value;

use crate::tree::dumps;

use super::{Metadata, Report};

const INDENT: &str = "    ";

/// Render the series, level, page and frame layout of a report.
///
/// ```text
/// Series index:0 name:(Baseline) shape:[3, 1024, 1024]
///     Level index:0 name:(Baseline) shape:[3, 1024, 1024]
///         Page index:0 shape:[1024, 1024, 3]
///         Frame index:1
/// ```
pub fn structure_lines(report: &Report) -> Vec<String> {
    let mut lines = Vec::new();

    for series in &report.series {
        lines.push(format!(
            "Series index:{} name:({}) shape:{}",
            field(&series.metadata, "index"),
            name_or(&series.metadata, "Unnamed Series"),
            field(&series.metadata, "shape"),
        ));

        for level in &series.levels {
            lines.push(format!(
                "{INDENT}Level index:{} name:({}) shape:{}",
                level.level_index,
                name_or(&level.metadata, "Unnamed Level"),
                field(&level.metadata, "shape"),
            ));

            for page in &level.pages {
                lines.push(format!(
                    "{INDENT}{INDENT}Page index:{} shape:{}",
                    field(&page.metadata, "index"),
                    field(&page.metadata, "shape"),
                ));
                for frame in &page.frames {
                    lines.push(format!(
                        "{INDENT}{INDENT}Frame index:{}",
                        field(&frame.metadata, "index"),
                    ));
                }
            }
        }
    }

    lines
}

fn field(metadata: &Metadata, key: &str) -> String {
    dumps(metadata.get(key).unwrap_or(&Value::Null))
}

fn name_or(metadata: &Metadata, fallback: &str) -> String {
    match metadata.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(Value::Null | Value::String(_)) | None => fallback.to_string(),
        Some(other) => dumps(other),
    }
}
