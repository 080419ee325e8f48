//! TIFF container reading.
//!
//! This module handles parsing of TIFF and BigTIFF files and turns their IFD
//! structure into the [`crate::source`] object model.
//!
//! # Key Concepts
//!
//! - **Byte order**: TIFF files declare their endianness (II = little-endian, MM = big-endian)
//!   in the header. All multi-byte values must be read respecting this order.
//!
//! - **Classic TIFF vs BigTIFF**: Classic TIFF uses 32-bit offsets (max 4GB files),
//!   while BigTIFF uses 64-bit offsets. The parser handles both transparently.
//!
//! - **IFD (Image File Directory)**: Contains the tags of one page. IFDs are
//!   chained through a next-IFD offset; SubIFDs hang off a page through a tag.
//!
//! - **Inline vs offset values**: Small values are stored inline in the IFD entry,
//!   larger values are stored at an offset pointed to by the entry.

mod container;
mod parser;
mod tags;
mod values;

pub use container::{ContainerReader, MAX_IFDS};
pub use parser::{ByteOrder, Ifd, IfdEntry, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE};
pub use tags::{
    compression_name, photometric_name, planar_config_name, subfile_type_name, tag_name,
    FieldType, TiffTag, SUBFILE_REDUCED_IMAGE,
};
pub use values::{decode_value, ValueReader};
