//! Configuration for the `tiff-inspector` binary.
//!
//! Every option can be given on the command line or through an environment
//! variable with the `TIFF_INSPECTOR_` prefix:
//!
//! - `TIFF_INSPECTOR_SERIES` - Series selector (index or `start:stop:step`)
//! - `TIFF_INSPECTOR_LEVELS` - Level selector applied within each series
//! - `TIFF_INSPECTOR_OUTPUT` - `json`, `structure` or `descriptions` (default: json)
//! - `TIFF_INSPECTOR_MAX_DEPTH` - Depth limit for parsed XML descriptions
//!   (`--no-depth-limit` turns it off)
//! - `TIFF_INSPECTOR_MAX_TEXT_LENGTH` - Character limit for truncated text
//! - `TIFF_INSPECTOR_SCHEMA_DIR` - Directory with `{name}_schema.json` files
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use tiff_inspector::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::report::Selector;

// =============================================================================
// Default Values
// =============================================================================

/// Default depth limit for parsed XML descriptions.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Default character limit for truncated text.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 500;

// =============================================================================
// CLI Arguments
// =============================================================================

/// What the binary prints.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The full report as JSON
    #[default]
    Json,

    /// One line per series, level, page and frame
    Structure,

    /// Every ImageDescription, XML pruned to the depth limit
    Descriptions,
}

/// TIFF Inspector - Metadata reports for TIFF and BigTIFF files.
///
/// Reads the IFD structure of a file, groups its pages into series and
/// resolution levels, and prints a schema-driven metadata report.
#[derive(Parser, Debug, Clone)]
#[command(name = "tiff-inspector")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path of the TIFF file to inspect.
    pub path: PathBuf,

    // =========================================================================
    // Selection
    // =========================================================================
    /// Keep only these series: an index (`0`, `-1`) or a slice (`1:3`, `::-1`).
    #[arg(long, env = "TIFF_INSPECTOR_SERIES", allow_hyphen_values = true)]
    pub series: Option<Selector>,

    /// Keep only these levels of each series; series left empty are dropped.
    #[arg(long, env = "TIFF_INSPECTOR_LEVELS", allow_hyphen_values = true)]
    pub levels: Option<Selector>,

    // =========================================================================
    // Output
    // =========================================================================
    /// Output view.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json, env = "TIFF_INSPECTOR_OUTPUT")]
    pub output: OutputFormat,

    /// Depth limit for parsed XML descriptions.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, env = "TIFF_INSPECTOR_MAX_DEPTH")]
    pub max_depth: usize,

    /// Render parsed XML descriptions in full, ignoring `--max-depth`.
    #[arg(long, default_value_t = false, conflicts_with = "max_depth")]
    pub no_depth_limit: bool,

    /// Character limit for truncated text.
    #[arg(long, env = "TIFF_INSPECTOR_MAX_TEXT_LENGTH")]
    pub max_text_length: Option<usize>,

    /// Print JSON on a single line.
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    // =========================================================================
    // Schemas
    // =========================================================================
    /// Load schema documents from this directory instead of the built-in ones.
    #[arg(long, env = "TIFF_INSPECTOR_SCHEMA_DIR")]
    pub schema_dir: Option<PathBuf>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.path.exists() {
            return Err(format!("File not found: {}", self.path.display()));
        }
        if !self.path.is_file() {
            return Err(format!("Not a file: {}", self.path.display()));
        }

        if self.max_text_length == Some(0) {
            return Err("max_text_length must be greater than 0".to_string());
        }

        if let Some(ref dir) = self.schema_dir {
            if !dir.is_dir() {
                return Err(format!("Schema directory not found: {}", dir.display()));
            }
        }

        Ok(())
    }

    /// Depth limit applied when rendering descriptions; `None` keeps the whole tree.
    pub fn depth_limit(&self) -> Option<usize> {
        if self.no_depth_limit {
            None
        } else {
            Some(self.max_depth)
        }
    }

    /// Text limit applied when rendering descriptions.
    pub fn text_limit(&self) -> usize {
        self.max_text_length.unwrap_or(DEFAULT_MAX_TEXT_LENGTH)
    }
}

// =============================================================================
// Tests
// =============================================================================
