//! # TIFF Inspector
//!
//! Builds a normalized, serializable metadata report from a TIFF or BigTIFF
//! file.
//!
//! The file's IFD chain is read through byte-range requests, so only the
//! header, the IFDs and the tag values they point at are ever loaded. Pages
//! are grouped into series and resolution levels, and a schema for each
//! structural level decides which attributes end up in the report.
//!
//! ## Features
//!
//! - **Range-based reading**: classic TIFF and BigTIFF, both byte orders
//! - **Schema-driven reports**: one JSON schema per structural level names the
//!   extracted attributes and their order
//! - **Series grouping**: multi-page stacks, reduced-resolution pyramids,
//!   SubIFD pyramids and Aperio SVS layouts
//! - **Report views**: series and level selection with Python slice semantics
//! - **Description rendering**: XML image descriptions become trees that can
//!   be pruned to a bounded depth
//!
//! ## Architecture
//!
//! - [`io`] - Range reader trait with file and in-memory implementations
//! - [`mod@format`] - TIFF parsing and the container reader
//! - [`source`] - The series/level/page/frame object model
//! - [`schema`] - Schema documents and typed attribute keys
//! - [`report`] - Report construction, views and layout
//! - [`tree`] - Bounded-depth tree truncation
//! - [`describe`] - Image description interpretation
//! - [`config`] - CLI configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use tiff_inspector::{inspect_file, SchemaSet, Selector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schemas = SchemaSet::embedded()?;
//!     let report = inspect_file("slide.svs", &schemas).await?;
//!
//!     let baseline = report.select_series(&Selector::Index(0))?;
//!     for line in baseline.structure_lines() {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod describe;
pub mod error;
pub mod format;
pub mod inspect;
pub mod io;
pub mod report;
pub mod schema;
pub mod source;
pub mod tree;

// Re-export commonly used types
pub use config::{Config, OutputFormat};
pub use describe::{is_xml, xml_to_value, Description};
pub use error::{
    BuildError, InspectError, IoError, NormalizeError, SchemaError, SelectError, TiffError,
};
pub use format::tiff::{
    ByteOrder, FieldType, Ifd, IfdEntry, TiffHeader, TiffTag, ValueReader, BIGTIFF_HEADER_SIZE,
    TIFF_HEADER_SIZE,
};
pub use format::{detect_flags, is_tiff_header, ContainerReader};
pub use inspect::{inspect, inspect_file};
pub use io::{FileRangeReader, MemoryRangeReader, RangeReader};
pub use report::{
    build_report, select_levels, select_series, FrameReport, LevelReport, Metadata, PageReport,
    Report, ReportBuilder, Selector, SeriesReport, SliceSpec, TagRecord,
};
pub use schema::{load_schema, Schema, SchemaKey, SchemaName, SchemaSet};
pub use source::{Container, Frame, Level, Page, Series, StructuralUnit};
pub use tree::{dumps, truncate_text, truncate_tree};
