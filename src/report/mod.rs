//! The metadata report and the operations over it.
//!
//! A [`Report`] is a plain value tree:
//!
//! ```text
//! Report
//! └── SeriesReport
//!     └── LevelReport
//!         └── PageReport  (tags, frames)
//!             └── FrameReport
//! ```
//!
//! Every `metadata` mapping holds exactly the attributes named by the schema
//! of its level, in schema order. Counters always agree with the tree:
//!
//! - `series_count == series.len()`
//! - `level_count == levels.len()`
//! - `tiffpage_count == pages.len()` and
//!   `tiffpage_count + tiffframe_count == page_count`
//! - `frame_count == frames.len()`
//!
//! Reports are built by [`ReportBuilder`], narrowed by [`select_series`] and
//! [`select_levels`], and serialize to JSON with a stable key order.

mod builder;
pub mod layout;
mod normalize;
mod select;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SelectError;

pub use builder::{build_report, ReportBuilder};
pub use normalize::{hash_hex, normalize, normalize_tag_value, sampleformat_text};
pub use select::{select_levels, select_series, Selector, SliceSpec};

/// Attribute name to normalized value, in schema order.
pub type Metadata = serde_json::Map<String, Value>;

// =============================================================================
// Report Tree
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: Metadata,

    /// Shape of the default series
    pub shape: Vec<u64>,

    /// Data type name of the default series
    pub dtype: Option<String>,

    pub series: Vec<SeriesReport>,

    pub series_count: usize,

    /// Pages in the main IFD chain of the source file
    pub page_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub metadata: Metadata,
    pub level_count: usize,
    pub levels: Vec<LevelReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    pub metadata: Metadata,

    /// Number of structural units, pages and frames together
    pub page_count: usize,

    /// Position of the level within its series
    pub level_index: usize,

    pub tiffpage_count: usize,
    pub tiffframe_count: usize,
    pub pages: Vec<PageReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    pub metadata: Metadata,
    pub tags: Vec<TagRecord>,
    pub frames: Vec<FrameReport>,
    pub frame_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub metadata: Metadata,
}

/// One tag of a page.
///
/// Serialized as the array `[name, dtype, value_offset, count, value]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TagTuple", into = "TagTuple")]
pub struct TagRecord {
    pub name: String,
    pub dtype: String,
    pub value_offset: u64,
    pub count: u64,
    pub value: Value,
}

type TagTuple = (String, String, u64, u64, Value);

impl From<TagTuple> for TagRecord {
    fn from((name, dtype, value_offset, count, value): TagTuple) -> Self {
        Self {
            name,
            dtype,
            value_offset,
            count,
            value,
        }
    }
}

impl From<TagRecord> for TagTuple {
    fn from(record: TagRecord) -> Self {
        (
            record.name,
            record.dtype,
            record.value_offset,
            record.count,
            record.value,
        )
    }
}

// =============================================================================
// Access
// =============================================================================

/// An ImageDescription found in a report, with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptionRef<'a> {
    pub series: usize,
    pub level: usize,
    pub page: usize,
    pub text: &'a str,
}

impl PageReport {
    /// Value of the first tag with this name.
    pub fn tag(&self, name: &str) -> Option<&Value> {
        self.tags.iter().find(|t| t.name == name).map(|t| &t.value)
    }

    pub fn image_description(&self) -> Option<&str> {
        self.tag("ImageDescription").and_then(Value::as_str)
    }
}

impl Report {
    /// Serialize to JSON, indented when `pretty` is set.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Every page carrying a textual ImageDescription, in tree order.
    pub fn image_descriptions(&self) -> Vec<DescriptionRef<'_>> {
        let mut found = Vec::new();
        for (i, series) in self.series.iter().enumerate() {
            for (j, level) in series.levels.iter().enumerate() {
                for (k, page) in level.pages.iter().enumerate() {
                    if let Some(text) = page.image_description() {
                        found.push(DescriptionRef {
                            series: i,
                            level: j,
                            page: k,
                            text,
                        });
                    }
                }
            }
        }
        found
    }

    /// Report with only the selected series.
    pub fn select_series(&self, selector: &Selector) -> Result<Report, SelectError> {
        select_series(self, selector)
    }

    /// Report with only the selected levels of every series.
    pub fn select_levels(&self, selector: &Selector) -> Result<Report, SelectError> {
        select_levels(self, selector)
    }

    /// Lines of the layout summary.
    pub fn structure_lines(&self) -> Vec<String> {
        layout::structure_lines(self)
    }
}
