//! Object model of an opened container.
//!
//! This is the boundary between whatever reads a file and the report
//! builder. The TIFF reader in [`crate::format`] produces it, but any
//! collaborator can construct these values directly.
//!
//! # Hierarchy
//!
//! ```text
//! Container
//! └── Series            (one logical image)
//!     └── Level         (one resolution)
//!         └── StructuralUnit
//!             ├── Page  (full metadata and tags)
//!             └── Frame (reduced metadata, trails a Page)
//! ```
//!
//! Each level has a typed attribute struct. [`AttributeSource`] maps the
//! schema keys of that level to accessor code, so a schema can only ever
//! name attributes that exist.

mod value;

use std::collections::BTreeSet;

pub use value::{CodedValue, DataType, RawValue, TagValue, UnitIndex, UnitRef};

use crate::format::tiff::{
    compression_name, photometric_name, planar_config_name, subfile_type_name, ByteOrder,
    FieldType,
};
use crate::schema::{FrameKey, LevelKey, PageKey, SchemaKey, SeriesKey, TiffKey};

/// Read schema-named attributes off a structural object.
pub trait AttributeSource {
    type Key: SchemaKey;

    fn attribute(&self, key: Self::Key) -> RawValue;
}

// =============================================================================
// Hierarchy
// =============================================================================

/// A fully read container.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub attributes: FileAttributes,

    /// Shape of the default (first) series
    pub shape: Vec<u64>,

    /// Data type of the default (first) series
    pub dtype: Option<DataType>,

    /// Number of pages in the main IFD chain
    pub page_count: usize,

    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub attributes: SeriesAttributes,
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub attributes: LevelAttributes,
    pub units: Vec<StructuralUnit>,
}

/// One entry of a level's unit sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralUnit {
    /// Primary unit: full metadata and tag records
    Page(Page),
    /// Secondary unit: shares its state with the preceding page
    Frame(Frame),
}

impl StructuralUnit {
    pub fn is_page(&self) -> bool {
        matches!(self, StructuralUnit::Page(_))
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, StructuralUnit::Frame(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub attributes: PageAttributes,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub attributes: FrameAttributes,
}

/// A tag of a page, with its value already read.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub code: u16,
    pub name: String,
    pub field_type: FieldType,
    /// File position of the value (the entry itself for inline values)
    pub value_offset: u64,
    pub count: u64,
    pub value: TagValue,
}

// =============================================================================
// Attribute Structs
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FileAttributes {
    pub filename: String,
    pub filesize: u64,
    pub byteorder: ByteOrder,
    pub is_bigtiff: bool,
    pub flags: BTreeSet<&'static str>,
}

impl AttributeSource for FileAttributes {
    type Key = TiffKey;

    fn attribute(&self, key: TiffKey) -> RawValue {
        match key {
            TiffKey::Filename => RawValue::Str(self.filename.clone()),
            TiffKey::Filesize => RawValue::UInt(self.filesize),
            TiffKey::Byteorder => RawValue::Str(self.byteorder.symbol().to_string()),
            TiffKey::IsBigtiff => RawValue::Bool(self.is_bigtiff),
            TiffKey::Flags => RawValue::Set(
                self.flags
                    .iter()
                    .map(|flag| RawValue::Str(flag.to_string()))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesAttributes {
    pub index: usize,
    pub name: Option<String>,
    pub kind: String,
    pub shape: Vec<u64>,
    pub axes: String,
    pub dtype: Option<DataType>,
    pub keyframe: UnitRef,
    pub is_pyramidal: bool,
}

impl AttributeSource for SeriesAttributes {
    type Key = SeriesKey;

    fn attribute(&self, key: SeriesKey) -> RawValue {
        match key {
            SeriesKey::Index => RawValue::UInt(self.index as u64),
            SeriesKey::Name => RawValue::optional_str(self.name.as_deref()),
            SeriesKey::Kind => RawValue::Str(self.kind.clone()),
            SeriesKey::Shape => RawValue::shape(&self.shape),
            SeriesKey::Axes => RawValue::Str(self.axes.clone()),
            SeriesKey::Dtype => RawValue::DataType(self.dtype),
            SeriesKey::Keyframe => RawValue::Unit(self.keyframe),
            SeriesKey::IsPyramidal => RawValue::Bool(self.is_pyramidal),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelAttributes {
    pub name: Option<String>,
    pub shape: Vec<u64>,
    pub axes: String,
    pub dtype: Option<DataType>,
}

impl AttributeSource for LevelAttributes {
    type Key = LevelKey;

    fn attribute(&self, key: LevelKey) -> RawValue {
        match key {
            LevelKey::Name => RawValue::optional_str(self.name.as_deref()),
            LevelKey::Shape => RawValue::shape(&self.shape),
            LevelKey::Axes => RawValue::Str(self.axes.clone()),
            LevelKey::Dtype => RawValue::DataType(self.dtype),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageAttributes {
    pub index: UnitIndex,
    /// File position of the page's IFD
    pub offset: u64,
    pub shape: Vec<u64>,
    pub dtype: Option<DataType>,
    pub axes: String,
    pub imagewidth: u64,
    pub imagelength: u64,
    /// 0 for stripped pages
    pub tilewidth: u64,
    /// 0 for stripped pages
    pub tilelength: u64,
    pub bitspersample: u16,
    pub samplesperpixel: u16,
    pub sampleformat: u16,
    pub compression: u32,
    pub photometric: Option<u32>,
    pub planarconfig: u32,
    pub subfiletype: u32,
    pub is_tiled: bool,
    pub is_reduced: bool,
    /// Structural hash; pages with equal hashes share their layout
    pub hash: i64,
}

impl AttributeSource for PageAttributes {
    type Key = PageKey;

    fn attribute(&self, key: PageKey) -> RawValue {
        match key {
            PageKey::Index => self.index.to_raw(),
            PageKey::Offset => RawValue::UInt(self.offset),
            PageKey::Shape => RawValue::shape(&self.shape),
            PageKey::Dtype => RawValue::DataType(self.dtype),
            PageKey::Axes => RawValue::Str(self.axes.clone()),
            PageKey::ImageWidth => RawValue::UInt(self.imagewidth),
            PageKey::ImageLength => RawValue::UInt(self.imagelength),
            PageKey::TileWidth => RawValue::UInt(self.tilewidth),
            PageKey::TileLength => RawValue::UInt(self.tilelength),
            PageKey::BitsPerSample => RawValue::UInt(self.bitspersample as u64),
            PageKey::SamplesPerPixel => RawValue::UInt(self.samplesperpixel as u64),
            PageKey::SampleFormat => RawValue::UInt(self.sampleformat as u64),
            PageKey::Compression => {
                RawValue::Code(CodedValue::lookup(self.compression, compression_name))
            }
            PageKey::Photometric => match self.photometric {
                Some(code) => RawValue::Code(CodedValue::lookup(code, photometric_name)),
                None => RawValue::Null,
            },
            PageKey::PlanarConfig => {
                RawValue::Code(CodedValue::lookup(self.planarconfig, planar_config_name))
            }
            PageKey::SubfileType => {
                RawValue::Code(CodedValue::lookup(self.subfiletype, subfile_type_name))
            }
            PageKey::IsTiled => RawValue::Bool(self.is_tiled),
            PageKey::IsReduced => RawValue::Bool(self.is_reduced),
            PageKey::Hash => RawValue::Int(self.hash),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameAttributes {
    pub index: UnitIndex,
    pub offset: u64,
    pub shape: Vec<u64>,
    /// Number of tiles or strips
    pub chunk_count: u64,
}

impl AttributeSource for FrameAttributes {
    type Key = FrameKey;

    fn attribute(&self, key: FrameKey) -> RawValue {
        match key {
            FrameKey::Index => self.index.to_raw(),
            FrameKey::Offset => RawValue::UInt(self.offset),
            FrameKey::Shape => RawValue::shape(&self.shape),
            FrameKey::ChunkCount => RawValue::UInt(self.chunk_count),
        }
    }
}
