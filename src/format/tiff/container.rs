//! Reading a whole TIFF file into the [`Container`] object model.
//!
//! # Reading
//!
//! The reader walks the main IFD chain from the header, reads every tag
//! value of every IFD and follows SubIFDs one level deep. All reads go
//! through [`RangeReader`]; once [`ContainerReader::read`] returns, the
//! container holds no reference to the file.
//!
//! # Grouping
//!
//! Pages are grouped into series and levels by their structural hash:
//!
//! 1. Consecutive top-level pages with equal hash form one series. The first
//!    page is the keyframe; the rest become frames.
//! 2. A reduced-resolution page directly after a series adds a level to it.
//! 3. SubIFDs of a series' pages form further levels, one per SubIFD position.
//!
//! Aperio SVS files are grouped by their own convention: tiled pages form
//! the Baseline pyramid and the remaining pages are the Thumbnail, Label
//! and Macro series.

use std::collections::HashSet;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::TiffError;
use crate::format::detect::{detect_flags, is_svs_description, FlagInputs};
use crate::io::RangeReader;
use crate::source::{
    Container, DataType, FileAttributes, Frame, FrameAttributes, Level, LevelAttributes, Page,
    PageAttributes, Series, SeriesAttributes, StructuralUnit, Tag, TagValue, UnitIndex, UnitRef,
};

use super::parser::{Ifd, TiffHeader, BIGTIFF_HEADER_SIZE};
use super::tags::{tag_name, TiffTag, SUBFILE_REDUCED_IMAGE};
use super::values::ValueReader;

// =============================================================================
// Constants
// =============================================================================

/// Maximum number of IFDs to parse (safety limit)
pub const MAX_IFDS: usize = 16384;

/// Maximum number of SubIFDs followed per page
const MAX_SUBIFDS: usize = 64;

// =============================================================================
// ParsedPage
// =============================================================================

/// A page read from the file, before grouping.
#[derive(Debug, Clone)]
struct ParsedPage {
    attributes: PageAttributes,
    tags: Vec<Tag>,
    chunk_count: u64,
    description: Option<String>,
    name: Option<String>,
    subpages: Vec<ParsedPage>,
}

impl ParsedPage {
    fn hash(&self) -> i64 {
        self.attributes.hash
    }

    fn to_page(&self) -> Page {
        Page {
            attributes: self.attributes.clone(),
            tags: self.tags.clone(),
        }
    }

    fn to_frame(&self) -> Frame {
        Frame {
            attributes: FrameAttributes {
                index: self.attributes.index,
                offset: self.attributes.offset,
                shape: self.attributes.shape.clone(),
                chunk_count: self.chunk_count,
            },
        }
    }
}

/// Lookup of decoded tag values by code.
struct TagLookup<'a>(&'a [Tag]);

impl<'a> TagLookup<'a> {
    fn get(&self, tag: TiffTag) -> Option<&'a Tag> {
        self.0.iter().find(|t| t.code == tag.as_u16())
    }

    fn unsigned(&self, tag: TiffTag) -> Option<u64> {
        self.get(tag).and_then(|t| t.value.first_unsigned())
    }

    fn text(&self, tag: TiffTag) -> Option<&'a str> {
        self.get(tag).and_then(|t| t.value.as_str())
    }

    fn count(&self, tag: TiffTag) -> Option<u64> {
        self.get(tag).map(|t| t.count)
    }
}

// =============================================================================
// ContainerReader
// =============================================================================

/// Reads the IFD structure of a TIFF file.
pub struct ContainerReader<'a, R: RangeReader + ?Sized> {
    reader: &'a R,
    header: TiffHeader,
    visited: HashSet<u64>,
}

impl<'a, R: RangeReader + ?Sized> ContainerReader<'a, R> {
    /// Read a TIFF file into a [`Container`].
    pub async fn read(reader: &'a R) -> Result<Container, TiffError> {
        let size = reader.size();
        let header_len = (BIGTIFF_HEADER_SIZE as u64).min(size) as usize;
        let header_bytes = reader.read_exact_at(0, header_len).await?;
        let header = TiffHeader::parse(&header_bytes, size)?;

        debug!(
            file = reader.identifier(),
            bigtiff = header.is_bigtiff,
            byte_order = header.byte_order.symbol(),
            "Parsed TIFF header"
        );

        let mut this = Self {
            reader,
            header,
            visited: HashSet::new(),
        };
        let pages = this.read_pages().await?;
        let container = assemble(reader.identifier(), size, &header, &pages);

        info!(
            file = reader.identifier(),
            pages = container.page_count,
            series = container.series.len(),
            "Read TIFF container"
        );

        Ok(container)
    }

    /// Read every page of the main IFD chain along with its SubIFDs.
    async fn read_pages(&mut self) -> Result<Vec<ParsedPage>, TiffError> {
        let mut pages = Vec::new();
        let mut offset = self.header.first_ifd_offset;

        while offset != 0 {
            let ifd = self.read_ifd(offset).await?;
            let index = pages.len();
            let mut page = self.read_page(&ifd, UnitIndex::Top(index)).await?;

            let sub_offsets = TagLookup(&page.tags)
                .get(TiffTag::SubIfds)
                .map(|tag| match &tag.value {
                    TagValue::Unsigned(offsets) => offsets.clone(),
                    _ => Vec::new(),
                })
                .unwrap_or_default();

            if sub_offsets.len() > MAX_SUBIFDS {
                warn!(
                    page = index,
                    count = sub_offsets.len(),
                    "Too many SubIFDs, reading the first {}",
                    MAX_SUBIFDS
                );
            }

            for (position, &sub_offset) in sub_offsets.iter().take(MAX_SUBIFDS).enumerate() {
                let sub_ifd = self.read_ifd(sub_offset).await?;
                let sub_index = UnitIndex::Sub {
                    parent: index,
                    position,
                };
                let subpage = self.read_page(&sub_ifd, sub_index).await?;
                page.subpages.push(subpage);
            }

            offset = ifd.next_ifd_offset;
            pages.push(page);
        }

        Ok(pages)
    }

    /// Read and parse the IFD at `offset`.
    async fn read_ifd(&mut self, offset: u64) -> Result<Ifd, TiffError> {
        let size = self.reader.size();
        if offset >= size {
            return Err(TiffError::InvalidIfdOffset(offset));
        }
        if !self.visited.insert(offset) {
            return Err(TiffError::IfdLoop(offset));
        }
        if self.visited.len() > MAX_IFDS {
            return Err(TiffError::TooManyIfds(MAX_IFDS));
        }

        // First, read just enough to get the entry count
        let count_size = self.header.ifd_count_size();
        let count_bytes = self.reader.read_exact_at(offset, count_size).await?;
        let entry_count = self.header.read_entry_count(&count_bytes);

        // Now read the full IFD
        let ifd_size = Ifd::calculate_size(entry_count, &self.header);
        let available = (size - offset) as usize;
        if ifd_size > available {
            return Err(TiffError::FileTooSmall {
                required: offset.saturating_add(ifd_size as u64),
                actual: size,
            });
        }
        let ifd_bytes = self.reader.read_exact_at(offset, ifd_size).await?;
        let ifd = Ifd::parse(&ifd_bytes, offset, &self.header)?;

        debug!(
            offset,
            entries = ifd.entries.len(),
            next = ifd.next_ifd_offset,
            "Parsed IFD"
        );

        Ok(ifd)
    }

    /// Read the tag values of an IFD and derive its page attributes.
    async fn read_page(&self, ifd: &Ifd, index: UnitIndex) -> Result<ParsedPage, TiffError> {
        let byte_order = self.header.byte_order;
        let value_reader = ValueReader::new(self.reader, &self.header);

        let mut tags = Vec::with_capacity(ifd.entries.len());
        for entry in &ifd.entries {
            let Some(field_type) = entry.field_type else {
                warn!(
                    page = %index,
                    tag = entry.tag_id,
                    field_type = entry.field_type_raw,
                    "Skipping tag with unknown field type"
                );
                continue;
            };

            let value = match value_reader.read_value(entry).await {
                Ok(value) => value,
                Err(TiffError::Io(err)) => {
                    warn!(page = %index, tag = entry.tag_id, error = %err, "Skipping unreadable tag");
                    continue;
                }
                Err(err) => return Err(err),
            };

            tags.push(Tag {
                code: entry.tag_id,
                name: tag_name(entry.tag_id)
                    .map(str::to_string)
                    .unwrap_or_else(|| entry.tag_id.to_string()),
                field_type,
                value_offset: entry.value_offset(byte_order),
                count: entry.count,
                value,
            });
        }

        let lookup = TagLookup(&tags);
        let attributes = page_attributes(&lookup, ifd, index);
        let chunk_count = if attributes.is_tiled {
            lookup.count(TiffTag::TileOffsets)
        } else {
            lookup.count(TiffTag::StripOffsets)
        }
        .unwrap_or(0);
        let description = lookup.text(TiffTag::ImageDescription).map(str::to_string);
        let name = lookup
            .text(TiffTag::PageName)
            .or_else(|| lookup.text(TiffTag::DocumentName))
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(ParsedPage {
            attributes,
            tags,
            chunk_count,
            description,
            name,
            subpages: Vec::new(),
        })
    }
}

// =============================================================================
// Page Attributes
// =============================================================================

fn page_attributes(tags: &TagLookup<'_>, ifd: &Ifd, index: UnitIndex) -> PageAttributes {
    let imagewidth = tags.unsigned(TiffTag::ImageWidth).unwrap_or(0);
    let imagelength = tags.unsigned(TiffTag::ImageLength).unwrap_or(0);
    let imagedepth = tags.unsigned(TiffTag::ImageDepth).unwrap_or(1);
    let samplesperpixel = tags.unsigned(TiffTag::SamplesPerPixel).unwrap_or(1) as u16;
    let bitspersample = tags.unsigned(TiffTag::BitsPerSample).unwrap_or(1) as u16;
    let sampleformat = tags.unsigned(TiffTag::SampleFormat).unwrap_or(1) as u16;
    let compression = tags.unsigned(TiffTag::Compression).unwrap_or(1) as u32;
    let photometric = tags
        .unsigned(TiffTag::PhotometricInterpretation)
        .map(|p| p as u32);
    let planarconfig = tags.unsigned(TiffTag::PlanarConfiguration).unwrap_or(1) as u32;
    let subfiletype = tags.unsigned(TiffTag::NewSubfileType).unwrap_or(0) as u32;

    let is_tiled = ifd.is_tiled();
    let (tilewidth, tilelength) = if is_tiled {
        (
            tags.unsigned(TiffTag::TileWidth).unwrap_or(0),
            tags.unsigned(TiffTag::TileLength).unwrap_or(0),
        )
    } else {
        (0, 0)
    };
    let is_reduced = subfiletype & SUBFILE_REDUCED_IMAGE != 0;

    let dtype = DataType::from_sample_format(sampleformat, bitspersample);
    let (shape, axes) = page_shape(
        imagedepth,
        imagelength,
        imagewidth,
        samplesperpixel as u64,
        planarconfig,
    );

    let hash = structural_hash(&StructureKey {
        shape: &shape,
        dtype,
        bitspersample,
        sampleformat,
        tile: (tilewidth, tilelength),
        compression,
        photometric,
        planarconfig,
        is_reduced,
    });

    PageAttributes {
        index,
        offset: ifd.offset,
        shape,
        dtype,
        axes,
        imagewidth,
        imagelength,
        tilewidth,
        tilelength,
        bitspersample,
        samplesperpixel,
        sampleformat,
        compression,
        photometric,
        planarconfig,
        subfiletype,
        is_tiled,
        is_reduced,
        hash,
    }
}

/// Shape and axes of a single page.
///
/// Samples go last for contiguous data and first for separate planes.
fn page_shape(depth: u64, length: u64, width: u64, samples: u64, planar: u32) -> (Vec<u64>, String) {
    let mut shape = Vec::with_capacity(4);
    let mut axes = String::with_capacity(4);

    let separate = samples > 1 && planar == 2;
    if separate {
        shape.push(samples);
        axes.push('S');
    }
    if depth > 1 {
        shape.push(depth);
        axes.push('Z');
    }
    shape.extend([length, width]);
    axes.push_str("YX");
    if samples > 1 && !separate {
        shape.push(samples);
        axes.push('S');
    }

    (shape, axes)
}

/// Everything that decides whether two pages share their layout.
struct StructureKey<'a> {
    shape: &'a [u64],
    dtype: Option<DataType>,
    bitspersample: u16,
    sampleformat: u16,
    tile: (u64, u64),
    compression: u32,
    photometric: Option<u32>,
    planarconfig: u32,
    is_reduced: bool,
}

/// SHA-256 over the structural description; the first 8 bytes as a signed
/// big-endian integer.
fn structural_hash(key: &StructureKey<'_>) -> i64 {
    let description = format!(
        "shape={:?};dtype={:?};bits={};format={};tile={}x{};compression={};photometric={:?};planar={};reduced={}",
        key.shape,
        key.dtype,
        key.bitspersample,
        key.sampleformat,
        key.tile.0,
        key.tile.1,
        key.compression,
        key.photometric,
        key.planarconfig,
        key.is_reduced,
    );
    let digest = Sha256::digest(description.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(head)
}

// =============================================================================
// Grouping
// =============================================================================

/// Pages of one series, level by level, before conversion.
struct SeriesPlan<'p> {
    name: Option<String>,
    levels: Vec<Vec<&'p ParsedPage>>,
}

fn group_generic(pages: &[ParsedPage]) -> Vec<SeriesPlan<'_>> {
    let mut plans: Vec<SeriesPlan<'_>> = Vec::new();

    for page in pages {
        if let Some(plan) = plans.last_mut() {
            if let Some(level) = plan.levels.last_mut() {
                if level[0].hash() == page.hash() {
                    level.push(page);
                    continue;
                }
                if page.attributes.is_reduced {
                    plan.levels.push(vec![page]);
                    continue;
                }
            }
        }
        plans.push(SeriesPlan {
            name: page.name.clone(),
            levels: vec![vec![page]],
        });
    }

    plans
}

fn group_svs(pages: &[ParsedPage]) -> Vec<SeriesPlan<'_>> {
    let Some((baseline, rest)) = pages.split_first() else {
        return Vec::new();
    };

    let mut pyramid = SeriesPlan {
        name: Some("Baseline".to_string()),
        levels: vec![vec![baseline]],
    };
    let mut others = Vec::new();

    for page in rest {
        let description = page
            .description
            .as_deref()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let name = if description.contains("label") {
            "Label"
        } else if description.contains("macro") {
            "Macro"
        } else if page.attributes.is_tiled {
            pyramid.levels.push(vec![page]);
            continue;
        } else {
            "Thumbnail"
        };
        others.push(SeriesPlan {
            name: Some(name.to_string()),
            levels: vec![vec![page]],
        });
    }

    let mut plans = vec![pyramid];
    plans.extend(others);
    plans
}

/// Append one level per SubIFD position of the first level's pages.
fn add_subifd_levels(plan: &mut SeriesPlan<'_>) {
    let base = plan.levels[0].clone();
    let positions = base.iter().map(|p| p.subpages.len()).max().unwrap_or(0);

    for position in 0..positions {
        let level: Vec<&ParsedPage> = base
            .iter()
            .filter_map(|p| p.subpages.get(position))
            .collect();
        if !level.is_empty() {
            plan.levels.push(level);
        }
    }
}

/// Shape and axes of `count` stacked pages.
fn stacked_shape(keyframe: &ParsedPage, count: usize) -> (Vec<u64>, String) {
    let attributes = &keyframe.attributes;
    if count > 1 {
        let mut shape = vec![count as u64];
        shape.extend(&attributes.shape);
        (shape, format!("I{}", attributes.axes))
    } else {
        (attributes.shape.clone(), attributes.axes.clone())
    }
}

fn build_level(pages: &[&ParsedPage], name: Option<String>) -> Level {
    let keyframe = pages[0];
    let mut units = Vec::with_capacity(pages.len());
    let mut current_hash = None;

    for page in pages {
        if current_hash == Some(page.hash()) {
            units.push(StructuralUnit::Frame(page.to_frame()));
        } else {
            current_hash = Some(page.hash());
            units.push(StructuralUnit::Page(page.to_page()));
        }
    }

    let (shape, axes) = stacked_shape(keyframe, pages.len());
    Level {
        attributes: LevelAttributes {
            name,
            shape,
            axes,
            dtype: keyframe.attributes.dtype,
        },
        units,
    }
}

fn build_series(index: usize, plan: &SeriesPlan<'_>) -> Series {
    let levels: Vec<Level> = plan
        .levels
        .iter()
        .enumerate()
        .map(|(j, pages)| {
            let name = if j == 0 { plan.name.clone() } else { None };
            build_level(pages, name)
        })
        .collect();

    let keyframe = plan.levels[0][0];
    let keyframe_index = match keyframe.attributes.index {
        UnitIndex::Top(index) => index,
        UnitIndex::Sub { parent, .. } => parent,
    };
    let is_pyramidal = levels.len() > 1;
    let base = &levels[0].attributes;

    debug!(
        series = index,
        levels = levels.len(),
        keyframe = keyframe_index,
        "Grouped series"
    );

    Series {
        attributes: SeriesAttributes {
            index,
            name: plan.name.clone(),
            kind: if is_pyramidal { "pyramidal" } else { "generic" }.to_string(),
            shape: base.shape.clone(),
            axes: base.axes.clone(),
            dtype: base.dtype,
            keyframe: UnitRef {
                index: keyframe_index,
            },
            is_pyramidal,
        },
        levels,
    }
}

fn assemble(identifier: &str, size: u64, header: &TiffHeader, pages: &[ParsedPage]) -> Container {
    let first_description = pages.first().and_then(|p| p.description.as_deref());
    let is_svs = first_description.is_some_and(is_svs_description);

    let mut plans = if is_svs {
        group_svs(pages)
    } else {
        group_generic(pages)
    };
    for plan in &mut plans {
        add_subifd_levels(plan);
    }

    let series: Vec<Series> = plans
        .iter()
        .enumerate()
        .map(|(i, plan)| build_series(i, plan))
        .collect();

    let flags = detect_flags(FlagInputs {
        header,
        first_description,
        first_is_tiled: pages.first().is_some_and(|p| p.attributes.is_tiled),
        is_pyramidal: series.iter().any(|s| s.attributes.is_pyramidal),
    });

    let filename = Path::new(identifier)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| identifier.to_string());

    let (shape, dtype) = series
        .first()
        .map(|s| (s.attributes.shape.clone(), s.attributes.dtype))
        .unwrap_or_default();

    Container {
        attributes: FileAttributes {
            filename,
            filesize: size,
            byteorder: header.byte_order,
            is_bigtiff: header.is_bigtiff,
            flags,
        },
        shape,
        dtype,
        page_count: pages.len(),
        series,
    }
}

// =============================================================================
// Tests
// =============================================================================
