//! TIFF tag and field type definitions.
//!
//! This module defines the vocabulary for TIFF inspection:
//! - Field types that determine how values are encoded
//! - Tag IDs and their names
//! - Coded values (compression, photometric, ...) and their readable names
//!
//! The definitions support both classic TIFF and BigTIFF formats.

// =============================================================================
// TIFF Field Types
// =============================================================================

/// TIFF field types that determine how values are encoded.
///
/// Each field type has a specific size in bytes, which is critical for:
/// - Determining if a value fits inline in an IFD entry
/// - Reading arrays of values correctly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer
    Byte = 1,

    /// 8-bit ASCII character, NUL terminated
    Ascii = 2,

    /// Unsigned 16-bit integer
    Short = 3,

    /// Unsigned 32-bit integer
    Long = 4,

    /// Two LONGs: numerator and denominator
    Rational = 5,

    /// Signed 8-bit integer
    SByte = 6,

    /// Undefined byte data
    Undefined = 7,

    /// Signed 16-bit integer
    SShort = 8,

    /// Signed 32-bit integer
    SLong = 9,

    /// Two SLONGs: numerator and denominator
    SRational = 10,

    /// IEEE single precision float
    Float = 11,

    /// IEEE double precision float
    Double = 12,

    /// 32-bit IFD offset
    Ifd = 13,

    /// Unsigned 64-bit integer - BigTIFF only
    Long8 = 16,

    /// Signed 64-bit integer - BigTIFF only
    SLong8 = 17,

    /// 64-bit IFD offset - BigTIFF only
    Ifd8 = 18,
}

impl FieldType {
    /// Size of a single value of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => 1,
            FieldType::Short | FieldType::SShort => 2,
            FieldType::Long | FieldType::SLong | FieldType::Float | FieldType::Ifd => 4,
            FieldType::Rational
            | FieldType::SRational
            | FieldType::Double
            | FieldType::Long8
            | FieldType::SLong8
            | FieldType::Ifd8 => 8,
        }
    }

    /// Create a FieldType from its numeric value.
    ///
    /// Returns `None` for unknown type values.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            6 => Some(FieldType::SByte),
            7 => Some(FieldType::Undefined),
            8 => Some(FieldType::SShort),
            9 => Some(FieldType::SLong),
            10 => Some(FieldType::SRational),
            11 => Some(FieldType::Float),
            12 => Some(FieldType::Double),
            13 => Some(FieldType::Ifd),
            16 => Some(FieldType::Long8),
            17 => Some(FieldType::SLong8),
            18 => Some(FieldType::Ifd8),
            _ => None,
        }
    }

    /// Name of the type as it appears in tag records.
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::Byte => "BYTE",
            FieldType::Ascii => "ASCII",
            FieldType::Short => "SHORT",
            FieldType::Long => "LONG",
            FieldType::Rational => "RATIONAL",
            FieldType::SByte => "SBYTE",
            FieldType::Undefined => "UNDEFINED",
            FieldType::SShort => "SSHORT",
            FieldType::SLong => "SLONG",
            FieldType::SRational => "SRATIONAL",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::Ifd => "IFD",
            FieldType::Long8 => "LONG8",
            FieldType::SLong8 => "SLONG8",
            FieldType::Ifd8 => "IFD8",
        }
    }

    /// Maximum bytes that can be stored inline in a classic TIFF IFD entry.
    pub const INLINE_THRESHOLD_TIFF: usize = 4;

    /// Maximum bytes that can be stored inline in a BigTIFF IFD entry.
    pub const INLINE_THRESHOLD_BIGTIFF: usize = 8;

    /// Check if a value with this type and count fits inline in an IFD entry.
    #[inline]
    pub fn fits_inline(self, count: u64, is_bigtiff: bool) -> bool {
        let total_size = (self.size_in_bytes() as u64).saturating_mul(count);
        let threshold = if is_bigtiff {
            Self::INLINE_THRESHOLD_BIGTIFF as u64
        } else {
            Self::INLINE_THRESHOLD_TIFF as u64
        };
        total_size <= threshold
    }
}

// =============================================================================
// TIFF Tags
// =============================================================================

/// TIFF tag IDs that the container reader interprets.
///
/// Every other tag is still reported, by name when [`tag_name`] knows it and
/// by numeric code otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TiffTag {
    /// Subfile kind bit flags (bit 0 = reduced resolution)
    NewSubfileType = 254,
    ImageWidth = 256,
    ImageLength = 257,
    BitsPerSample = 258,
    Compression = 259,
    PhotometricInterpretation = 262,
    DocumentName = 269,
    ImageDescription = 270,
    StripOffsets = 273,
    SamplesPerPixel = 277,
    RowsPerStrip = 278,
    StripByteCounts = 279,
    PlanarConfiguration = 284,
    PageName = 285,
    TileWidth = 322,
    TileLength = 323,
    TileOffsets = 324,
    TileByteCounts = 325,
    /// Offsets of child IFDs (used for pyramid levels)
    SubIfds = 330,
    SampleFormat = 339,
    ImageDepth = 32997,
}

impl TiffTag {
    /// Get the numeric tag ID.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Name of a tag code, for the tags this crate knows about.
pub fn tag_name(code: u16) -> Option<&'static str> {
    let name = match code {
        254 => "NewSubfileType",
        255 => "SubfileType",
        256 => "ImageWidth",
        257 => "ImageLength",
        258 => "BitsPerSample",
        259 => "Compression",
        262 => "PhotometricInterpretation",
        263 => "Thresholding",
        264 => "CellWidth",
        265 => "CellLength",
        266 => "FillOrder",
        269 => "DocumentName",
        270 => "ImageDescription",
        271 => "Make",
        272 => "Model",
        273 => "StripOffsets",
        274 => "Orientation",
        277 => "SamplesPerPixel",
        278 => "RowsPerStrip",
        279 => "StripByteCounts",
        280 => "MinSampleValue",
        281 => "MaxSampleValue",
        282 => "XResolution",
        283 => "YResolution",
        284 => "PlanarConfiguration",
        285 => "PageName",
        286 => "XPosition",
        287 => "YPosition",
        290 => "GrayResponseUnit",
        291 => "GrayResponseCurve",
        292 => "T4Options",
        293 => "T6Options",
        296 => "ResolutionUnit",
        297 => "PageNumber",
        301 => "TransferFunction",
        305 => "Software",
        306 => "DateTime",
        315 => "Artist",
        316 => "HostComputer",
        317 => "Predictor",
        318 => "WhitePoint",
        319 => "PrimaryChromaticities",
        320 => "ColorMap",
        321 => "HalftoneHints",
        322 => "TileWidth",
        323 => "TileLength",
        324 => "TileOffsets",
        325 => "TileByteCounts",
        330 => "SubIFDs",
        332 => "InkSet",
        333 => "InkNames",
        334 => "NumberOfInks",
        336 => "DotRange",
        337 => "TargetPrinter",
        338 => "ExtraSamples",
        339 => "SampleFormat",
        340 => "SMinSampleValue",
        341 => "SMaxSampleValue",
        342 => "TransferRange",
        347 => "JPEGTables",
        512 => "JPEGProc",
        513 => "JPEGInterchangeFormat",
        514 => "JPEGInterchangeFormatLength",
        529 => "YCbCrCoefficients",
        530 => "YCbCrSubSampling",
        531 => "YCbCrPositioning",
        532 => "ReferenceBlackWhite",
        700 => "XMP",
        32995 => "Matteing",
        32996 => "DataType",
        32997 => "ImageDepth",
        32998 => "TileDepth",
        33432 => "Copyright",
        33723 => "IPTCNAA",
        33550 => "ModelPixelScaleTag",
        33922 => "ModelTiepointTag",
        34264 => "ModelTransformationTag",
        34377 => "Photoshop",
        34665 => "ExifTag",
        34675 => "InterColorProfile",
        34735 => "GeoKeyDirectoryTag",
        34736 => "GeoDoubleParamsTag",
        34737 => "GeoAsciiParamsTag",
        34853 => "GPSTag",
        42112 => "GDAL_METADATA",
        42113 => "GDAL_NODATA",
        50838 => "IJMetadataByteCounts",
        50839 => "IJMetadata",
        _ => return None,
    };
    Some(name)
}

// =============================================================================
// Coded Values
// =============================================================================

/// Readable name of a Compression code.
pub fn compression_name(code: u32) -> Option<&'static str> {
    let name = match code {
        1 => "NONE",
        2 => "CCITTRLE",
        3 => "CCITT_T4",
        4 => "CCITT_T6",
        5 => "LZW",
        6 => "OJPEG",
        7 => "JPEG",
        8 => "ADOBE_DEFLATE",
        32773 => "PACKBITS",
        32946 => "DEFLATE",
        33003 => "APERIO_JP2000_YCBC",
        33005 => "APERIO_JP2000_RGB",
        34712 => "JPEG2000",
        34887 => "LERC",
        34925 => "LZMA",
        50000 => "ZSTD",
        50001 => "WEBP",
        50002 => "JPEGXL",
        _ => return None,
    };
    Some(name)
}

/// Readable name of a PhotometricInterpretation code.
pub fn photometric_name(code: u32) -> Option<&'static str> {
    let name = match code {
        0 => "MINISWHITE",
        1 => "MINISBLACK",
        2 => "RGB",
        3 => "PALETTE",
        4 => "MASK",
        5 => "SEPARATED",
        6 => "YCBCR",
        8 => "CIELAB",
        9 => "ICCLAB",
        10 => "ITULAB",
        32844 => "LOGL",
        32845 => "LOGLUV",
        32803 => "CFA",
        _ => return None,
    };
    Some(name)
}

/// Readable name of a PlanarConfiguration code.
pub fn planar_config_name(code: u32) -> Option<&'static str> {
    match code {
        1 => Some("CONTIG"),
        2 => Some("SEPARATE"),
        _ => None,
    }
}

/// Readable name of a NewSubfileType bit set.
///
/// Only single-flag values have a name; combinations are reported as numbers.
pub fn subfile_type_name(code: u32) -> Option<&'static str> {
    match code {
        0 => Some("UNDEFINED"),
        1 => Some("REDUCEDIMAGE"),
        2 => Some("PAGE"),
        4 => Some("MASK"),
        _ => None,
    }
}

/// NewSubfileType bit marking a reduced-resolution image.
pub const SUBFILE_REDUCED_IMAGE: u32 = 1;

// =============================================================================
// Tests
// =============================================================================
