//! TIFF tag value reading.
//!
//! Values are stored either inline in the IFD entry (for small values) or at
//! an offset in the file. [`ValueReader`] fetches the bytes of a value in a
//! single range request and [`decode_value`] turns them into a [`TagValue`].

use bytes::Bytes;

use crate::error::TiffError;
use crate::io::RangeReader;
use crate::source::TagValue;

use super::parser::{ByteOrder, IfdEntry, TiffHeader};
use super::tags::FieldType;

// =============================================================================
// ValueReader
// =============================================================================

/// Reads tag values from a TIFF file.
///
/// This struct combines a RangeReader with TIFF header information to
/// read values respecting the file's byte order and format.
pub struct ValueReader<'a, R: RangeReader + ?Sized> {
    reader: &'a R,
    header: &'a TiffHeader,
}

impl<'a, R: RangeReader + ?Sized> ValueReader<'a, R> {
    pub fn new(reader: &'a R, header: &'a TiffHeader) -> Self {
        Self { reader, header }
    }

    /// Read raw bytes for an IFD entry's value.
    ///
    /// For inline values, returns the bytes from the entry.
    /// For offset values, fetches the bytes from the file.
    pub async fn read_bytes(&self, entry: &IfdEntry) -> Result<Bytes, TiffError> {
        let size = entry
            .value_byte_size()
            .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;

        if entry.is_inline {
            Ok(Bytes::copy_from_slice(
                &entry.value_offset_bytes[..size as usize],
            ))
        } else {
            let len = usize::try_from(size).map_err(|_| TiffError::InvalidTagValue {
                tag: entry.tag_id.to_string(),
                message: format!("value of {} bytes cannot be addressed", size),
            })?;
            let offset = entry.value_offset(self.header.byte_order);
            Ok(self.reader.read_exact_at(offset, len).await?)
        }
    }

    /// Read and decode the value of an entry.
    pub async fn read_value(&self, entry: &IfdEntry) -> Result<TagValue, TiffError> {
        let field_type = entry
            .field_type
            .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;
        let bytes = self.read_bytes(entry).await?;
        Ok(decode_value(
            &bytes,
            field_type,
            entry.count as usize,
            self.header.byte_order,
        ))
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode `count` values of `field_type` from `bytes`.
///
/// Values that do not fit in `bytes` are dropped, so a short buffer gives
/// a short value rather than a panic.
pub fn decode_value(
    bytes: &[u8],
    field_type: FieldType,
    count: usize,
    byte_order: ByteOrder,
) -> TagValue {
    let size = field_type.size_in_bytes();
    let chunks = || bytes.chunks_exact(size).take(count);

    match field_type {
        FieldType::Undefined => TagValue::Bytes(bytes.iter().take(count).copied().collect()),
        FieldType::Ascii => {
            let raw = &bytes[..count.min(bytes.len())];
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            TagValue::Ascii(String::from_utf8_lossy(&raw[..end]).into_owned())
        }
        FieldType::Byte => TagValue::Unsigned(chunks().map(|c| c[0] as u64).collect()),
        FieldType::Short => {
            TagValue::Unsigned(chunks().map(|c| byte_order.read_u16(c) as u64).collect())
        }
        FieldType::Long | FieldType::Ifd => {
            TagValue::Unsigned(chunks().map(|c| byte_order.read_u32(c) as u64).collect())
        }
        FieldType::Long8 | FieldType::Ifd8 => {
            TagValue::Unsigned(chunks().map(|c| byte_order.read_u64(c)).collect())
        }
        FieldType::SByte => TagValue::Signed(chunks().map(|c| c[0] as i8 as i64).collect()),
        FieldType::SShort => TagValue::Signed(
            chunks()
                .map(|c| byte_order.read_u16(c) as i16 as i64)
                .collect(),
        ),
        FieldType::SLong => TagValue::Signed(
            chunks()
                .map(|c| byte_order.read_u32(c) as i32 as i64)
                .collect(),
        ),
        FieldType::SLong8 => {
            TagValue::Signed(chunks().map(|c| byte_order.read_u64(c) as i64).collect())
        }
        FieldType::Float => {
            TagValue::Float(chunks().map(|c| byte_order.read_f32(c) as f64).collect())
        }
        FieldType::Double => TagValue::Float(chunks().map(|c| byte_order.read_f64(c)).collect()),
        FieldType::Rational => TagValue::Rational(
            chunks()
                .map(|c| (byte_order.read_u32(&c[0..4]), byte_order.read_u32(&c[4..8])))
                .collect(),
        ),
        FieldType::SRational => TagValue::SRational(
            chunks()
                .map(|c| {
                    (
                        byte_order.read_u32(&c[0..4]) as i32,
                        byte_order.read_u32(&c[4..8]) as i32,
                    )
                })
                .collect(),
        ),
    }
}

// =============================================================================
// Tests
// =============================================================================
