//! TIFF header and IFD parsing.
//!
//! # TIFF Header Structure
//!
//! ## Classic TIFF (8 bytes)
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD (4 bytes)
//! ```
//!
//! ## BigTIFF (16 bytes)
//! ```text
//! Bytes 0-1: Byte order
//! Bytes 2-3: Version (43 = 0x002B)
//! Bytes 4-5: Offset byte size (must be 8)
//! Bytes 6-7: Reserved (must be 0)
//! Bytes 8-15: Offset to first IFD (8 bytes)
//! ```
//!
//! # IFD Structure
//!
//! ```text
//! entry count (2 bytes, BigTIFF: 8)
//! entries     (12 bytes each, BigTIFF: 20)
//!   tag (2) | type (2) | count (4, BigTIFF: 8) | value or offset (4, BigTIFF: 8)
//! next IFD offset (4 bytes, BigTIFF: 8)
//! ```

use std::collections::HashMap;

use crate::error::TiffError;

use super::tags::{FieldType, TiffTag};

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Version number for classic TIFF
const VERSION_TIFF: u16 = 42;

/// Version number for BigTIFF
const VERSION_BIGTIFF: u16 = 43;

/// Size of classic TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of BigTIFF header in bytes
pub const BIGTIFF_HEADER_SIZE: usize = 16;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

/// Copy the first `N` bytes of a slice into an array.
///
/// # Panics
/// Panics if the slice has fewer than `N` bytes.
#[inline]
fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

impl ByteOrder {
    /// Marker used for this order in reports (`<` little, `>` big).
    pub const fn symbol(self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "<",
            ByteOrder::BigEndian => ">",
        }
    }

    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(array(bytes)),
            ByteOrder::BigEndian => u16::from_be_bytes(array(bytes)),
        }
    }

    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(array(bytes)),
            ByteOrder::BigEndian => u32::from_be_bytes(array(bytes)),
        }
    }

    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(array(bytes)),
            ByteOrder::BigEndian => u64::from_be_bytes(array(bytes)),
        }
    }

    #[inline]
    pub fn read_f32(self, bytes: &[u8]) -> f32 {
        f32::from_bits(self.read_u32(bytes))
    }

    #[inline]
    pub fn read_f64(self, bytes: &[u8]) -> f64 {
        f64::from_bits(self.read_u64(bytes))
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the file
    pub byte_order: ByteOrder,

    /// Whether this is a BigTIFF file (64-bit offsets)
    pub is_bigtiff: bool,

    /// Offset to the first IFD in the file
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Parse a TIFF header from raw bytes.
    ///
    /// # Errors
    /// - `InvalidMagic` if byte order bytes are not II or MM
    /// - `InvalidVersion` if version is not 42 or 43
    /// - `InvalidBigTiffOffsetSize` if BigTIFF offset size is not 8
    /// - `FileTooSmall` if there aren't enough bytes for the header
    /// - `InvalidIfdOffset` if the first IFD offset is outside the file
    pub fn parse(bytes: &[u8], file_size: u64) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        // The marker is a byte pattern, not a number, so the order doesn't matter here
        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let version = byte_order.read_u16(&bytes[2..4]);
        let (is_bigtiff, first_ifd_offset) = match version {
            VERSION_TIFF => (false, byte_order.read_u32(&bytes[4..8]) as u64),
            VERSION_BIGTIFF => {
                if bytes.len() < BIGTIFF_HEADER_SIZE {
                    return Err(TiffError::FileTooSmall {
                        required: BIGTIFF_HEADER_SIZE as u64,
                        actual: bytes.len() as u64,
                    });
                }

                let offset_size = byte_order.read_u16(&bytes[4..6]);
                if offset_size != 8 {
                    return Err(TiffError::InvalidBigTiffOffsetSize(offset_size));
                }

                (true, byte_order.read_u64(&bytes[8..16]))
            }
            _ => return Err(TiffError::InvalidVersion(version)),
        };

        if first_ifd_offset >= file_size {
            return Err(TiffError::InvalidIfdOffset(first_ifd_offset));
        }

        Ok(TiffHeader {
            byte_order,
            is_bigtiff,
            first_ifd_offset,
        })
    }

    /// Size of an IFD entry in bytes (12, BigTIFF: 20).
    #[inline]
    pub const fn ifd_entry_size(&self) -> usize {
        if self.is_bigtiff {
            20
        } else {
            12
        }
    }

    /// Size of the entry count field at the start of an IFD (2, BigTIFF: 8).
    #[inline]
    pub const fn ifd_count_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            2
        }
    }

    /// Size of the value/offset field of an entry and of the next-IFD
    /// pointer (4, BigTIFF: 8).
    #[inline]
    pub const fn offset_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            4
        }
    }

    /// Read an entry count from the start of an IFD.
    pub fn read_entry_count(&self, bytes: &[u8]) -> u64 {
        if self.is_bigtiff {
            self.byte_order.read_u64(bytes)
        } else {
            self.byte_order.read_u16(bytes) as u64
        }
    }

    /// Read an offset-sized value (u32, BigTIFF: u64).
    pub fn read_offset(&self, bytes: &[u8]) -> u64 {
        if self.is_bigtiff {
            self.byte_order.read_u64(bytes)
        } else {
            self.byte_order.read_u32(bytes) as u64
        }
    }
}

// =============================================================================
// IfdEntry
// =============================================================================

/// A single entry of an IFD, before its value is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdEntry {
    /// Tag code
    pub tag_id: u16,

    /// Field type, `None` when the type code is unknown
    pub field_type: Option<FieldType>,

    /// Field type code as stored in the file
    pub field_type_raw: u16,

    /// Number of values
    pub count: u64,

    /// Raw bytes of the value/offset field (4, BigTIFF: 8)
    pub value_offset_bytes: Vec<u8>,

    /// Whether the value is stored in `value_offset_bytes` itself
    pub is_inline: bool,

    /// File position of the value/offset field
    pub field_position: u64,
}

impl IfdEntry {
    /// Total size of the value in bytes, `None` for unknown types.
    pub fn value_byte_size(&self) -> Option<u64> {
        self.field_type
            .map(|t| (t.size_in_bytes() as u64).saturating_mul(self.count))
    }

    /// File position of the value: the field itself for inline values,
    /// otherwise the offset stored in it.
    pub fn value_offset(&self, byte_order: ByteOrder) -> u64 {
        if self.is_inline {
            return self.field_position;
        }
        if self.value_offset_bytes.len() == 8 {
            byte_order.read_u64(&self.value_offset_bytes)
        } else {
            byte_order.read_u32(&self.value_offset_bytes) as u64
        }
    }
}

// =============================================================================
// Ifd
// =============================================================================

/// A parsed Image File Directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ifd {
    /// File position of the IFD
    pub offset: u64,

    /// Entries in file order
    pub entries: Vec<IfdEntry>,

    /// Index into `entries` by tag code
    pub entries_by_tag: HashMap<u16, usize>,

    /// Offset of the next IFD in the chain (0 = end)
    pub next_ifd_offset: u64,
}

impl Ifd {
    /// Number of bytes an IFD with `entry_count` entries occupies.
    pub fn calculate_size(entry_count: u64, header: &TiffHeader) -> usize {
        (entry_count as usize)
            .saturating_mul(header.ifd_entry_size())
            .saturating_add(header.ifd_count_size() + header.offset_size())
    }

    /// Parse an IFD read from file position `offset`.
    ///
    /// `bytes` must hold the whole IFD as sized by [`Ifd::calculate_size`].
    pub fn parse(bytes: &[u8], offset: u64, header: &TiffHeader) -> Result<Self, TiffError> {
        let count_size = header.ifd_count_size();
        if bytes.len() < count_size {
            return Err(TiffError::InvalidIfdOffset(offset));
        }

        let entry_count = header.read_entry_count(bytes);
        let required = Self::calculate_size(entry_count, header);
        if bytes.len() < required {
            return Err(TiffError::FileTooSmall {
                required: offset + required as u64,
                actual: offset + bytes.len() as u64,
            });
        }

        let entry_size = header.ifd_entry_size();
        let field_size = header.offset_size();
        let byte_order = header.byte_order;

        let mut entries = Vec::with_capacity(entry_count as usize);
        let mut entries_by_tag = HashMap::with_capacity(entry_count as usize);

        for i in 0..entry_count as usize {
            let start = count_size + i * entry_size;
            let raw = &bytes[start..start + entry_size];

            let tag_id = byte_order.read_u16(&raw[0..2]);
            let field_type_raw = byte_order.read_u16(&raw[2..4]);
            let field_type = FieldType::from_u16(field_type_raw);
            let (count, value_start) = if header.is_bigtiff {
                (byte_order.read_u64(&raw[4..12]), 12)
            } else {
                (byte_order.read_u32(&raw[4..8]) as u64, 8)
            };

            let is_inline = field_type
                .map(|t| t.fits_inline(count, header.is_bigtiff))
                .unwrap_or(false);

            // First entry with a given tag wins, like most readers
            entries_by_tag.entry(tag_id).or_insert(entries.len());
            entries.push(IfdEntry {
                tag_id,
                field_type,
                field_type_raw,
                count,
                value_offset_bytes: raw[value_start..value_start + field_size].to_vec(),
                is_inline,
                field_position: offset + (start + value_start) as u64,
            });
        }

        let next_start = count_size + entry_count as usize * entry_size;
        let next_ifd_offset = header.read_offset(&bytes[next_start..next_start + field_size]);

        Ok(Ifd {
            offset,
            entries,
            entries_by_tag,
            next_ifd_offset,
        })
    }

    /// Get an entry by tag.
    pub fn get_entry_by_tag(&self, tag: TiffTag) -> Option<&IfdEntry> {
        self.entries_by_tag
            .get(&tag.as_u16())
            .map(|&idx| &self.entries[idx])
    }

    /// Whether the IFD declares tile geometry.
    pub fn is_tiled(&self) -> bool {
        self.get_entry_by_tag(TiffTag::TileWidth).is_some()
            && self.get_entry_by_tag(TiffTag::TileLength).is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
