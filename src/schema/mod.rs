//! Schema registry.
//!
//! A schema document is a JSON Schema whose `properties.metadata.properties`
//! object names, in order, the attributes that a report extracts at one
//! structural level. The five documents ship in `schemas/` and are compiled
//! into the binary; [`SchemaSet::from_dir`] loads a replacement set from disk.
//!
//! Documents are loaded in two steps. [`load_schema`] returns the ordered key
//! names of a document. [`Schema::from_document`] then checks those names
//! against the level's key enum, so a report never asks a structural object
//! for an attribute it does not have.

mod keys;

use std::fmt;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::SchemaError;

pub use keys::{FrameKey, LevelKey, PageKey, SchemaKey, SeriesKey, TiffKey};

// =============================================================================
// Schema Names
// =============================================================================

/// The structural level a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaName {
    Tiff,
    Series,
    Level,
    Page,
    Frame,
}

impl SchemaName {
    pub const ALL: [SchemaName; 5] = [
        SchemaName::Tiff,
        SchemaName::Series,
        SchemaName::Level,
        SchemaName::Page,
        SchemaName::Frame,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SchemaName::Tiff => "tiff",
            SchemaName::Series => "series",
            SchemaName::Level => "level",
            SchemaName::Page => "page",
            SchemaName::Frame => "frame",
        }
    }

    /// File name of the document, e.g. `page_schema.json`.
    pub fn file_name(self) -> String {
        format!("{}_schema.json", self.as_str())
    }

    /// Resolve `tiff` as well as `tiff_schema`.
    pub fn parse(name: &str) -> Option<Self> {
        let base = name.strip_suffix("_schema").unwrap_or(name);
        Self::ALL.into_iter().find(|n| n.as_str() == base)
    }

    fn embedded_text(self) -> &'static str {
        match self {
            SchemaName::Tiff => include_str!("../../schemas/tiff_schema.json"),
            SchemaName::Series => include_str!("../../schemas/series_schema.json"),
            SchemaName::Level => include_str!("../../schemas/level_schema.json"),
            SchemaName::Page => include_str!("../../schemas/page_schema.json"),
            SchemaName::Frame => include_str!("../../schemas/frame_schema.json"),
        }
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Documents
// =============================================================================

/// The ordered attribute names declared by one schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    pub name: SchemaName,
    pub keys: Vec<String>,
}

/// Load one of the embedded schema documents by name.
pub fn load_schema(name: &str) -> Result<SchemaDocument, SchemaError> {
    let schema = SchemaName::parse(name).ok_or_else(|| SchemaError::NotFound(name.to_string()))?;
    parse_schema_document(schema, schema.embedded_text())
}

/// Parse the text of a schema document.
pub fn parse_schema_document(name: SchemaName, text: &str) -> Result<SchemaDocument, SchemaError> {
    let format_error = |message: String| SchemaError::Format {
        name: name.to_string(),
        message,
    };

    let document: Value = serde_json::from_str(text).map_err(|e| format_error(e.to_string()))?;

    let properties = document
        .get("properties")
        .and_then(|p| p.get("metadata"))
        .and_then(|m| m.get("properties"))
        .and_then(Value::as_object)
        .ok_or_else(|| format_error("missing properties.metadata.properties object".into()))?;

    Ok(SchemaDocument {
        name,
        keys: properties.keys().cloned().collect(),
    })
}

// =============================================================================
// Typed Schemas
// =============================================================================

/// A schema checked against the key enum of its level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema<K> {
    keys: Vec<K>,
}

impl<K: SchemaKey> Schema<K> {
    pub fn from_document(document: &SchemaDocument) -> Result<Self, SchemaError> {
        if document.name != K::SCHEMA {
            return Err(SchemaError::Format {
                name: document.name.to_string(),
                message: format!("expected the {} schema", K::SCHEMA),
            });
        }

        let mut keys: Vec<K> = Vec::with_capacity(document.keys.len());
        for name in &document.keys {
            let key = K::from_name(name).ok_or_else(|| SchemaError::UnknownKey {
                schema: K::SCHEMA.to_string(),
                key: name.clone(),
            })?;
            if keys.contains(&key) {
                return Err(SchemaError::DuplicateKey {
                    schema: K::SCHEMA.to_string(),
                    key: name.clone(),
                });
            }
            keys.push(key);
        }

        Ok(Self { keys })
    }

    /// Schema naming every attribute of the level.
    pub fn all() -> Self {
        Self {
            keys: K::ALL.to_vec(),
        }
    }

    /// Keys in document order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn contains(&self, key: K) -> bool {
        self.keys.contains(&key)
    }
}

/// The five schemas a report build uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSet {
    pub tiff: Schema<TiffKey>,
    pub series: Schema<SeriesKey>,
    pub level: Schema<LevelKey>,
    pub page: Schema<PageKey>,
    pub frame: Schema<FrameKey>,
}

impl SchemaSet {
    /// Load the schemas compiled into the crate.
    pub fn embedded() -> Result<Self, SchemaError> {
        Self::load_with(|name| load_schema(name.as_str()))
    }

    /// Load `{name}_schema.json` documents from a directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        Self::load_with(|name| {
            let path = dir.join(name.file_name());
            let text = std::fs::read_to_string(&path)
                .map_err(|_| SchemaError::NotFound(path.display().to_string()))?;
            debug!(schema = %name, path = %path.display(), "Loaded schema document");
            parse_schema_document(name, &text)
        })
    }

    fn load_with<F>(mut load: F) -> Result<Self, SchemaError>
    where
        F: FnMut(SchemaName) -> Result<SchemaDocument, SchemaError>,
    {
        Ok(Self {
            tiff: Schema::from_document(&load(SchemaName::Tiff)?)?,
            series: Schema::from_document(&load(SchemaName::Series)?)?,
            level: Schema::from_document(&load(SchemaName::Level)?)?,
            page: Schema::from_document(&load(SchemaName::Page)?)?,
            frame: Schema::from_document(&load(SchemaName::Frame)?)?,
        })
    }
}
