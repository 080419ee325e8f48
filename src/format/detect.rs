//! Format flag detection.
//!
//! A TIFF file can carry vendor or application conventions on top of the
//! baseline format. The reader reports the ones it recognises as a set of
//! flags in the file metadata:
//!
//! - **bigtiff**: 64-bit offsets (version 43 header)
//! - **ome**: OME-XML in the first ImageDescription
//! - **imagej**: ImageJ hyperstack description
//! - **svs**: Aperio SVS, identified by "Aperio" in the first ImageDescription
//! - **tiled**: the first page is tiled
//! - **pyramidal**: some series has more than one resolution level

use std::collections::BTreeSet;

use super::tiff::{ByteOrder, TiffHeader, TIFF_HEADER_SIZE};

/// Marker string for Aperio SVS files.
const APERIO_MARKER: &str = "Aperio";

/// Prefix of ImageJ descriptions.
const IMAGEJ_MARKER: &str = "ImageJ=";

pub const FLAG_BIGTIFF: &str = "bigtiff";
pub const FLAG_OME: &str = "ome";
pub const FLAG_IMAGEJ: &str = "imagej";
pub const FLAG_SVS: &str = "svs";
pub const FLAG_TILED: &str = "tiled";
pub const FLAG_PYRAMIDAL: &str = "pyramidal";

/// What the reader knows about a file once its pages are grouped.
#[derive(Debug, Clone, Copy)]
pub struct FlagInputs<'a> {
    pub header: &'a TiffHeader,
    pub first_description: Option<&'a str>,
    pub first_is_tiled: bool,
    pub is_pyramidal: bool,
}

/// Collect the format flags of a file.
pub fn detect_flags(inputs: FlagInputs<'_>) -> BTreeSet<&'static str> {
    let mut flags = BTreeSet::new();

    if inputs.header.is_bigtiff {
        flags.insert(FLAG_BIGTIFF);
    }
    if let Some(description) = inputs.first_description {
        if is_ome_description(description) {
            flags.insert(FLAG_OME);
        }
        if is_imagej_description(description) {
            flags.insert(FLAG_IMAGEJ);
        }
        if is_svs_description(description) {
            flags.insert(FLAG_SVS);
        }
    }
    if inputs.first_is_tiled {
        flags.insert(FLAG_TILED);
    }
    if inputs.is_pyramidal {
        flags.insert(FLAG_PYRAMIDAL);
    }

    flags
}

/// Aperio writes its vendor name into the first ImageDescription.
pub fn is_svs_description(description: &str) -> bool {
    description.contains(APERIO_MARKER)
}

pub fn is_imagej_description(description: &str) -> bool {
    description.starts_with(IMAGEJ_MARKER)
}

/// OME-TIFF stores an OME-XML document whose root element is `OME`.
pub fn is_ome_description(description: &str) -> bool {
    let trimmed = description.trim_start();
    trimmed.starts_with('<') && (trimmed.contains("<OME ") || trimmed.contains("<OME>"))
}

/// Check if bytes represent a valid TIFF header.
///
/// This is a quick check that can be used before attempting full parsing.
pub fn is_tiff_header(bytes: &[u8]) -> bool {
    if bytes.len() < TIFF_HEADER_SIZE {
        return false;
    }

    let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
    let byte_order = match magic {
        0x4949 => ByteOrder::LittleEndian,
        0x4D4D => ByteOrder::BigEndian,
        _ => return false,
    };

    let version = byte_order.read_u16(&bytes[2..4]);
    version == 42 || version == 43
}

// =============================================================================
// Tests
// =============================================================================
