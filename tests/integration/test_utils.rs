//! Test utilities for integration tests.
//!
//! This module synthesizes TIFF files in memory: classic and BigTIFF, both
//! byte orders, multi-page chains, reduced-resolution pages, SubIFD pyramids
//! and image descriptions. Pixel data is never written; strip and tile
//! offsets point at the start of the file.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use tiff_inspector::error::IoError;
use tiff_inspector::io::{MemoryRangeReader, RangeReader};
use tiff_inspector::schema::SchemaSet;
use tiff_inspector::{inspect, Report};

// =============================================================================
// Range Reader with Request Tracking
// =============================================================================

/// A range reader that counts the read requests it serves.
pub struct TrackingReader {
    inner: MemoryRangeReader,
    request_count: Arc<AtomicUsize>,
}

impl TrackingReader {
    pub fn new(data: Vec<u8>, identifier: impl Into<String>) -> Self {
        Self {
            inner: MemoryRangeReader::new(data, identifier),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RangeReader for TrackingReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.inner.read_exact_at(offset, len).await
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn identifier(&self) -> &str {
        self.inner.identifier()
    }
}

// =============================================================================
// Report Helpers
// =============================================================================

/// Build the report of an in-memory TIFF with the built-in schemas.
pub async fn report_for(data: Vec<u8>, name: &str) -> Report {
    let schemas = SchemaSet::embedded().expect("embedded schemas load");
    let reader = MemoryRangeReader::new(data, name);
    inspect(&reader, &schemas).await.expect("report builds")
}

// =============================================================================
// TIFF File Builders
// =============================================================================

#[derive(Clone, Copy, Debug)]
pub enum ByteOrderType {
    LittleEndian,
    BigEndian,
}

/// A typed tag value, encoded at build time.
#[derive(Clone, Debug)]
pub enum EntryValue {
    Short(Vec<u16>),
    Long(Vec<u32>),
    Long8(Vec<u64>),
    Ascii(String),
    Rational(Vec<(u32, u32)>),
    Undefined(Vec<u8>),
    Double(Vec<f64>),
}

impl EntryValue {
    fn field_type(&self) -> u16 {
        match self {
            EntryValue::Short(_) => 3,
            EntryValue::Long(_) => 4,
            EntryValue::Long8(_) => 16,
            EntryValue::Ascii(_) => 2,
            EntryValue::Rational(_) => 5,
            EntryValue::Undefined(_) => 7,
            EntryValue::Double(_) => 12,
        }
    }

    fn count(&self) -> u64 {
        match self {
            EntryValue::Short(v) => v.len() as u64,
            EntryValue::Long(v) => v.len() as u64,
            EntryValue::Long8(v) => v.len() as u64,
            EntryValue::Ascii(s) => s.len() as u64 + 1,
            EntryValue::Rational(v) => v.len() as u64,
            EntryValue::Undefined(v) => v.len() as u64,
            EntryValue::Double(v) => v.len() as u64,
        }
    }

    fn encode(&self, order: ByteOrderType) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            EntryValue::Short(values) => {
                for &v in values {
                    write_value(&mut out, order, v as u64, 2);
                }
            }
            EntryValue::Long(values) => {
                for &v in values {
                    write_value(&mut out, order, v as u64, 4);
                }
            }
            EntryValue::Long8(values) => {
                for &v in values {
                    write_value(&mut out, order, v, 8);
                }
            }
            EntryValue::Ascii(text) => {
                out.extend_from_slice(text.as_bytes());
                out.push(0);
            }
            EntryValue::Rational(values) => {
                for &(n, d) in values {
                    write_value(&mut out, order, n as u64, 4);
                    write_value(&mut out, order, d as u64, 4);
                }
            }
            EntryValue::Undefined(bytes) => out.extend_from_slice(bytes),
            EntryValue::Double(values) => {
                for &v in values {
                    write_value(&mut out, order, v.to_bits(), 8);
                }
            }
        }
        out
    }
}

/// Builder for creating test TIFF files.
pub struct TiffBuilder {
    byte_order: ByteOrderType,
    is_bigtiff: bool,
    ifds: Vec<IfdBuilder>,
}

impl TiffBuilder {
    pub fn new() -> Self {
        Self {
            byte_order: ByteOrderType::LittleEndian,
            is_bigtiff: false,
            ifds: Vec::new(),
        }
    }

    pub fn with_byte_order(mut self, order: ByteOrderType) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_bigtiff(mut self, is_bigtiff: bool) -> Self {
        self.is_bigtiff = is_bigtiff;
        self
    }

    pub fn add_ifd(mut self, ifd: IfdBuilder) -> Self {
        self.ifds.push(ifd);
        self
    }

    /// Build the TIFF file data.
    pub fn build(self) -> Vec<u8> {
        let mut data = Vec::new();
        let order = self.byte_order;

        match order {
            ByteOrderType::LittleEndian => data.extend_from_slice(b"II"),
            ByteOrderType::BigEndian => data.extend_from_slice(b"MM"),
        }
        if self.is_bigtiff {
            write_value(&mut data, order, 43, 2);
            write_value(&mut data, order, 8, 2);
            write_value(&mut data, order, 0, 2);
        } else {
            write_value(&mut data, order, 42, 2);
        }

        // Position of the offset field that must point at the next IFD
        let mut link = data.len();
        write_value(&mut data, order, 0, self.offset_size());

        for ifd in &self.ifds {
            align(&mut data);
            let offset = data.len() as u64;
            patch(&mut data, order, link, offset, self.offset_size());
            link = self.write_ifd(&mut data, ifd);
        }

        data
    }

    fn offset_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            4
        }
    }

    /// Write an IFD followed by its out-of-line values and SubIFDs.
    ///
    /// Returns the position of the IFD's next-offset field.
    fn write_ifd(&self, data: &mut Vec<u8>, ifd: &IfdBuilder) -> usize {
        let order = self.byte_order;
        let offset_size = self.offset_size();

        let mut entries = ifd.entries.clone();
        if !ifd.sub_ifds.is_empty() {
            let placeholder = if self.is_bigtiff {
                EntryValue::Long8(vec![0; ifd.sub_ifds.len()])
            } else {
                EntryValue::Long(vec![0; ifd.sub_ifds.len()])
            };
            entries.push((330, placeholder));
        }
        entries.sort_by_key(|(tag, _)| *tag);

        write_value(data, order, entries.len() as u64, if self.is_bigtiff { 8 } else { 2 });

        let mut pending = Vec::new();
        let mut sub_ifd_field = None;
        for (tag, value) in &entries {
            write_value(data, order, *tag as u64, 2);
            write_value(data, order, value.field_type() as u64, 2);
            write_value(data, order, value.count(), offset_size);

            let field_position = data.len();
            let bytes = value.encode(order);
            if *tag == 330 {
                sub_ifd_field = Some((field_position, bytes.len() <= offset_size));
            }
            if bytes.len() <= offset_size {
                let mut inline = bytes;
                inline.resize(offset_size, 0);
                data.extend_from_slice(&inline);
            } else {
                write_value(data, order, 0, offset_size);
                if *tag != 330 {
                    pending.push((field_position, bytes));
                }
            }
        }

        let next_field = data.len();
        write_value(data, order, 0, offset_size);

        for (field_position, bytes) in pending {
            align(data);
            let offset = data.len() as u64;
            patch(data, order, field_position, offset, offset_size);
            data.extend_from_slice(&bytes);
        }

        if let Some((field_position, inline)) = sub_ifd_field {
            let mut offsets = Vec::with_capacity(ifd.sub_ifds.len());
            for sub in &ifd.sub_ifds {
                align(data);
                offsets.push(data.len() as u64);
                self.write_ifd(data, sub);
            }

            let width = if self.is_bigtiff { 8 } else { 4 };
            if inline {
                for (i, &offset) in offsets.iter().enumerate() {
                    patch(data, order, field_position + i * width, offset, width);
                }
            } else {
                align(data);
                let array_offset = data.len() as u64;
                patch(data, order, field_position, array_offset, offset_size);
                for offset in offsets {
                    write_value(data, order, offset, width);
                }
            }
        }

        next_field
    }
}

impl Default for TiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating IFD entries.
#[derive(Clone, Debug, Default)]
pub struct IfdBuilder {
    entries: Vec<(u16, EntryValue)>,
    sub_ifds: Vec<IfdBuilder>,
}

impl IfdBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stripped, uncompressed 8-bit grayscale image.
    pub fn image(width: u32, height: u32) -> Self {
        let mut builder = Self::new();
        builder
            .add_entry(256, EntryValue::Long(vec![width])) // ImageWidth
            .add_entry(257, EntryValue::Long(vec![height])) // ImageLength
            .add_entry(258, EntryValue::Short(vec![8])) // BitsPerSample
            .add_entry(259, EntryValue::Short(vec![1])) // Compression = None
            .add_entry(262, EntryValue::Short(vec![1])) // PhotometricInterpretation = MinIsBlack
            .add_entry(273, EntryValue::Long(vec![0])) // StripOffsets
            .add_entry(277, EntryValue::Short(vec![1])) // SamplesPerPixel
            .add_entry(278, EntryValue::Long(vec![height])) // RowsPerStrip
            .add_entry(279, EntryValue::Long(vec![width * height])); // StripByteCounts
        builder
    }

    /// A tiled, JPEG-compressed RGB image.
    pub fn tiled_rgb(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        let tiles_x = width.div_ceil(tile_width);
        let tiles_y = height.div_ceil(tile_height);
        let tile_count = (tiles_x * tiles_y) as usize;

        let mut builder = Self::new();
        builder
            .add_entry(256, EntryValue::Long(vec![width]))
            .add_entry(257, EntryValue::Long(vec![height]))
            .add_entry(258, EntryValue::Short(vec![8, 8, 8]))
            .add_entry(259, EntryValue::Short(vec![7])) // Compression = JPEG
            .add_entry(262, EntryValue::Short(vec![6])) // PhotometricInterpretation = YCbCr
            .add_entry(277, EntryValue::Short(vec![3]))
            .add_entry(284, EntryValue::Short(vec![1])) // PlanarConfiguration = Contig
            .add_entry(322, EntryValue::Short(vec![tile_width as u16])) // TileWidth
            .add_entry(323, EntryValue::Short(vec![tile_height as u16])) // TileLength
            .add_entry(324, EntryValue::Long(vec![0; tile_count])) // TileOffsets
            .add_entry(325, EntryValue::Long(vec![1; tile_count])); // TileByteCounts
        builder
    }

    /// Add a tag entry, replacing an earlier entry with the same tag.
    pub fn add_entry(&mut self, tag: u16, value: EntryValue) -> &mut Self {
        self.entries.retain(|(t, _)| *t != tag);
        self.entries.push((tag, value));
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.add_entry(270, EntryValue::Ascii(text.to_string()));
        self
    }

    pub fn page_name(mut self, name: &str) -> Self {
        self.add_entry(285, EntryValue::Ascii(name.to_string()));
        self
    }

    /// Mark as a reduced-resolution version of another image.
    pub fn reduced(mut self) -> Self {
        self.add_entry(254, EntryValue::Long(vec![1])); // NewSubfileType
        self
    }

    pub fn with_entry(mut self, tag: u16, value: EntryValue) -> Self {
        self.add_entry(tag, value);
        self
    }

    pub fn with_sub_ifd(mut self, sub: IfdBuilder) -> Self {
        self.sub_ifds.push(sub);
        self
    }
}

// =============================================================================
// Encoding Helpers
// =============================================================================

pub fn write_value(data: &mut Vec<u8>, order: ByteOrderType, value: u64, size: usize) {
    let bytes = match order {
        ByteOrderType::LittleEndian => value.to_le_bytes(),
        ByteOrderType::BigEndian => value.to_be_bytes(),
    };
    match order {
        ByteOrderType::LittleEndian => data.extend_from_slice(&bytes[..size]),
        ByteOrderType::BigEndian => data.extend_from_slice(&bytes[8 - size..]),
    }
}

fn patch(data: &mut [u8], order: ByteOrderType, position: usize, value: u64, size: usize) {
    let mut encoded = Vec::with_capacity(size);
    write_value(&mut encoded, order, value, size);
    data[position..position + size].copy_from_slice(&encoded);
}

/// Pad to an even offset, as TIFF requires for IFDs and values.
fn align(data: &mut Vec<u8>) {
    if data.len() % 2 == 1 {
        data.push(0);
    }
}

// =============================================================================
// Canned Files
// =============================================================================

/// A single 64x48 grayscale page.
pub fn single_page_tiff(order: ByteOrderType, bigtiff: bool) -> Vec<u8> {
    TiffBuilder::new()
        .with_byte_order(order)
        .with_bigtiff(bigtiff)
        .add_ifd(IfdBuilder::image(64, 48))
        .build()
}

/// `pages` identical 32x32 grayscale pages.
pub fn stack_tiff(pages: usize) -> Vec<u8> {
    (0..pages)
        .fold(TiffBuilder::new(), |builder, _| {
            builder.add_ifd(IfdBuilder::image(32, 32))
        })
        .build()
}

/// A 3-level pyramid of reduced-resolution pages in the main chain.
pub fn reduced_pyramid_tiff() -> Vec<u8> {
    TiffBuilder::new()
        .add_ifd(IfdBuilder::tiled_rgb(1024, 768, 256, 256).page_name("Pyramid"))
        .add_ifd(IfdBuilder::tiled_rgb(512, 384, 256, 256).reduced())
        .add_ifd(IfdBuilder::tiled_rgb(256, 192, 256, 256).reduced())
        .build()
}

/// Two pages each with two SubIFD levels.
pub fn subifd_pyramid_tiff(bigtiff: bool) -> Vec<u8> {
    let page = || {
        IfdBuilder::tiled_rgb(1024, 1024, 256, 256)
            .with_sub_ifd(IfdBuilder::tiled_rgb(512, 512, 256, 256).reduced())
            .with_sub_ifd(IfdBuilder::tiled_rgb(256, 256, 256, 256).reduced())
    };
    TiffBuilder::new()
        .with_bigtiff(bigtiff)
        .add_ifd(page())
        .add_ifd(page())
        .build()
}

/// An Aperio-style file: tiled baseline, thumbnail, one reduced level,
/// label and macro.
pub fn svs_tiff() -> Vec<u8> {
    let header = "Aperio Image Library v12.0.15\r\n2048x1536 [0,0 2048x1536] (256x256) JPEG/RGB Q=70|AppMag = 20|MPP = 0.499";
    TiffBuilder::new()
        .add_ifd(IfdBuilder::tiled_rgb(2048, 1536, 256, 256).description(header))
        .add_ifd(
            IfdBuilder::image(256, 192).description("Aperio Image Library v12.0.15\r\n2048x1536 -> 256x192"),
        )
        .add_ifd(IfdBuilder::tiled_rgb(512, 384, 256, 256).description(header))
        .add_ifd(IfdBuilder::image(400, 300).description("Aperio Image Library v12.0.15\r\nlabel 400x300"))
        .add_ifd(IfdBuilder::image(800, 300).description("Aperio Image Library v12.0.15\r\nmacro 800x300"))
        .build()
}

pub const OME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06" Creator="tiff-inspector tests">
  <Image ID="Image:0" Name="cells">
    <Pixels ID="Pixels:0" DimensionOrder="XYZCT" Type="uint8" SizeX="32" SizeY="32" SizeZ="1" SizeC="1" SizeT="2">
      <Channel ID="Channel:0:0" Name="DAPI"/>
      <TiffData IFD="0" PlaneCount="2"/>
    </Pixels>
  </Image>
</OME>"#;

/// Two identical pages, the first carrying an OME-XML description.
pub fn ome_tiff() -> Vec<u8> {
    TiffBuilder::new()
        .add_ifd(IfdBuilder::image(32, 32).description(OME_XML))
        .add_ifd(IfdBuilder::image(32, 32))
        .build()
}
