//! Values as the container reader hands them over, before normalization.

use std::fmt;

/// A raw attribute value read off a structural object.
///
/// Most variants have an obvious JSON form. `DataType` and `Unit` are
/// objects: the normalizer refuses them and the report builder decides how
/// each one is represented.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// Ordered, fixed-length sequence
    Tuple(Vec<RawValue>),
    /// Unordered collection; order is whatever the source iterated in
    Set(Vec<RawValue>),
    /// Numeric code from a closed vocabulary
    Code(CodedValue),
    /// Pixel data type object
    DataType(Option<DataType>),
    /// Reference to another structural unit
    Unit(UnitRef),
}

impl RawValue {
    /// Tuple of unsigned integers, the usual form of a shape.
    pub fn shape(dims: &[u64]) -> Self {
        RawValue::Tuple(dims.iter().map(|&d| RawValue::UInt(d)).collect())
    }

    /// String or null.
    pub fn optional_str(value: Option<&str>) -> Self {
        match value {
            Some(s) => RawValue::Str(s.to_string()),
            None => RawValue::Null,
        }
    }

    /// Short name of the variant, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Int(_) | RawValue::UInt(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Str(_) => "string",
            RawValue::Tuple(_) => "tuple",
            RawValue::Set(_) => "set",
            RawValue::Code(_) => "code",
            RawValue::DataType(_) => "dtype",
            RawValue::Unit(_) => "unit reference",
        }
    }
}

/// A numeric code together with its readable name, if the code is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodedValue {
    pub code: u32,
    pub name: Option<&'static str>,
}

impl CodedValue {
    /// Look the code up with one of the `*_name` tables.
    pub fn lookup(code: u32, table: fn(u32) -> Option<&'static str>) -> Self {
        Self {
            code,
            name: table(code),
        }
    }
}

/// Reference to a structural unit by its page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitRef {
    pub index: usize,
}

/// Position of a page in the file.
///
/// Pages in the main IFD chain are numbered from 0. Pages reached through
/// a SubIFDs tag carry the parent's number and their position in that tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitIndex {
    Top(usize),
    Sub { parent: usize, position: usize },
}

impl UnitIndex {
    pub fn to_raw(self) -> RawValue {
        match self {
            UnitIndex::Top(index) => RawValue::UInt(index as u64),
            UnitIndex::Sub { parent, position } => RawValue::Tuple(vec![
                RawValue::UInt(parent as u64),
                RawValue::UInt(position as u64),
            ]),
        }
    }
}

impl fmt::Display for UnitIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitIndex::Top(index) => write!(f, "{}", index),
            UnitIndex::Sub { parent, position } => write!(f, "{}.{}", parent, position),
        }
    }
}

// =============================================================================
// DataType
// =============================================================================

/// Pixel data type of a page, derived from SampleFormat and BitsPerSample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float16,
    Float32,
    Float64,
}

impl DataType {
    /// Data type for a SampleFormat code and a bit depth.
    ///
    /// Returns `None` for combinations without a native representation
    /// (e.g. 12-bit samples or the "undefined" sample format).
    pub fn from_sample_format(sample_format: u16, bits_per_sample: u16) -> Option<Self> {
        match (sample_format, bits_per_sample) {
            (1, 1) => Some(DataType::Bool),
            (1, 8) => Some(DataType::Uint8),
            (1, 16) => Some(DataType::Uint16),
            (1, 32) => Some(DataType::Uint32),
            (1, 64) => Some(DataType::Uint64),
            (2, 8) => Some(DataType::Int8),
            (2, 16) => Some(DataType::Int16),
            (2, 32) => Some(DataType::Int32),
            (2, 64) => Some(DataType::Int64),
            (3, 16) => Some(DataType::Float16),
            (3, 32) => Some(DataType::Float32),
            (3, 64) => Some(DataType::Float64),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Uint8 => "uint8",
            DataType::Uint16 => "uint16",
            DataType::Uint32 => "uint32",
            DataType::Uint64 => "uint64",
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float16 => "float16",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TagValue
// =============================================================================

/// Decoded value of a tag.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// UNDEFINED data
    Bytes(Vec<u8>),
    /// ASCII text with the NUL terminator removed
    Ascii(String),
    /// BYTE, SHORT, LONG, LONG8, IFD and IFD8
    Unsigned(Vec<u64>),
    /// SBYTE, SSHORT, SLONG and SLONG8
    Signed(Vec<i64>),
    /// FLOAT and DOUBLE
    Float(Vec<f64>),
    /// RATIONAL numerator/denominator pairs
    Rational(Vec<(u32, u32)>),
    /// SRATIONAL numerator/denominator pairs
    SRational(Vec<(i32, i32)>),
}

impl TagValue {
    /// First unsigned value, if this is an unsigned tag.
    pub fn first_unsigned(&self) -> Option<u64> {
        match self {
            TagValue::Unsigned(values) => values.first().copied(),
            _ => None,
        }
    }

    /// Text value, if this is an ASCII tag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Ascii(s) => Some(s),
            _ => None,
        }
    }
}
