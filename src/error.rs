use thiserror::Error;

/// I/O errors that can occur when reading container bytes
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Error from the local filesystem
    #[error("File error: {0}")]
    File(String),

    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// File not found
    #[error("File not found: {0}")]
    NotFound(String),
}

/// Errors that can occur when parsing TIFF files
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// The IFD chain points back at an IFD that was already read
    #[error("IFD chain loops back to offset {0}")]
    IfdLoop(u64),

    /// The IFD chain is longer than the reader accepts
    #[error("Too many IFDs: more than {0}")]
    TooManyIfds(usize),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: String, message: String },

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),
}

/// Errors raised while loading schema documents
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No schema document with this name exists
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// The document is not JSON or lacks `properties.metadata.properties`
    #[error("Malformed schema '{name}': {message}")]
    Format { name: String, message: String },

    /// The schema names an attribute that the structural level does not have
    #[error("Schema '{schema}' declares unknown attribute '{key}'")]
    UnknownKey { schema: String, key: String },

    /// The schema names the same attribute twice
    #[error("Schema '{schema}' declares attribute '{key}' more than once")]
    DuplicateKey { schema: String, key: String },
}

/// Errors raised by the attribute normalizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The value is an object with no JSON representation
    #[error("Value of kind '{0}' has no JSON representation")]
    Unrepresentable(&'static str),
}

/// Errors raised while building a report
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Schema loading failed
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// An attribute could not be normalized
    #[error("Cannot normalize attribute '{key}': {source}")]
    Normalize {
        key: &'static str,
        #[source]
        source: NormalizeError,
    },

    /// A frame appeared before any page in its level
    #[error("Frame at unit {unit} of series {series}, level {level} has no preceding page")]
    OrphanFrame {
        series: usize,
        level: usize,
        unit: usize,
    },
}

/// Errors raised by report view operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// A single index is outside the sequence
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    /// The selector is neither an index nor a slice
    #[error("Unsupported selector '{0}': use an integer index or a start:stop:step slice")]
    InvalidSelector(String),

    /// A slice with step zero
    #[error("Slice step cannot be zero")]
    ZeroStep,
}

/// Errors from the full open-and-build pipeline
#[derive(Debug, Clone, Error)]
pub enum InspectError {
    /// Reading the container failed
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),

    /// Building the report failed
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Schema loading failed
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A view operation failed
    #[error("Selection error: {0}")]
    Select(#[from] SelectError),
}

impl From<IoError> for InspectError {
    fn from(err: IoError) -> Self {
        InspectError::Tiff(TiffError::Io(err))
    }
}
