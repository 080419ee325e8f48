//! Container reader tests against synthesized files.

use tiff_inspector::error::TiffError;
use tiff_inspector::format::ContainerReader;
use tiff_inspector::io::MemoryRangeReader;
use tiff_inspector::source::{StructuralUnit, TagValue, UnitIndex};
use tiff_inspector::ByteOrder;

use super::test_utils::*;

async fn read(data: Vec<u8>) -> Result<tiff_inspector::Container, TiffError> {
    let reader = MemoryRangeReader::new(data, "/slides/test.tif");
    ContainerReader::read(&reader).await
}

// =============================================================================
// Byte Order and BigTIFF
// =============================================================================

#[tokio::test]
async fn test_single_page_all_variants() {
    for (order, bigtiff) in [
        (ByteOrderType::LittleEndian, false),
        (ByteOrderType::BigEndian, false),
        (ByteOrderType::LittleEndian, true),
        (ByteOrderType::BigEndian, true),
    ] {
        let container = read(single_page_tiff(order, bigtiff)).await.unwrap();

        assert_eq!(container.page_count, 1);
        assert_eq!(container.series.len(), 1);
        assert_eq!(container.shape, vec![48, 64]);
        assert_eq!(container.attributes.is_bigtiff, bigtiff);
        assert_eq!(container.attributes.filename, "test.tif");

        let expected_order = match order {
            ByteOrderType::LittleEndian => ByteOrder::LittleEndian,
            ByteOrderType::BigEndian => ByteOrder::BigEndian,
        };
        assert_eq!(container.attributes.byteorder, expected_order);

        let flags: Vec<_> = container.attributes.flags.iter().copied().collect();
        if bigtiff {
            assert_eq!(flags, vec!["bigtiff"]);
        } else {
            assert!(flags.is_empty());
        }
    }
}

#[tokio::test]
async fn test_tags_are_decoded() {
    let data = TiffBuilder::new()
        .with_byte_order(ByteOrderType::BigEndian)
        .add_ifd(
            IfdBuilder::image(64, 48)
                .with_entry(282, EntryValue::Rational(vec![(300, 1)])) // XResolution
                .with_entry(305, EntryValue::Ascii("synth".into())) // Software
                .with_entry(65000, EntryValue::Undefined(vec![1, 2, 3, 4, 5])),
        )
        .build();
    let container = read(data).await.unwrap();

    let StructuralUnit::Page(page) = &container.series[0].levels[0].units[0] else {
        panic!("first unit must be a page");
    };
    let tag = |code: u16| page.tags.iter().find(|t| t.code == code).unwrap();

    assert_eq!(tag(256).value, TagValue::Unsigned(vec![64]));
    assert_eq!(tag(282).value, TagValue::Rational(vec![(300, 1)]));
    assert_eq!(tag(305).value, TagValue::Ascii("synth".into()));
    assert_eq!(tag(305).name, "Software");
    assert_eq!(tag(65000).name, "65000");
    assert_eq!(tag(65000).value, TagValue::Bytes(vec![1, 2, 3, 4, 5]));

    // Tags keep file order
    let codes: Vec<u16> = page.tags.iter().map(|t| t.code).collect();
    let mut sorted = codes.clone();
    sorted.sort();
    assert_eq!(codes, sorted);
}

#[tokio::test]
async fn test_inline_value_offset_is_field_position() {
    let container = read(single_page_tiff(ByteOrderType::LittleEndian, false))
        .await
        .unwrap();
    let StructuralUnit::Page(page) = &container.series[0].levels[0].units[0] else {
        panic!("first unit must be a page");
    };

    // Header (8) + entry count (2) + tag, type and count (8)
    let width = &page.tags[0];
    assert_eq!(width.code, 256);
    assert_eq!(width.value_offset, 18);
    assert_eq!(page.attributes.offset, 8);
}

// =============================================================================
// Grouping
// =============================================================================

#[tokio::test]
async fn test_stack_becomes_page_and_frames() {
    let container = read(stack_tiff(4)).await.unwrap();

    assert_eq!(container.page_count, 4);
    assert_eq!(container.series.len(), 1);
    assert_eq!(container.shape, vec![4, 32, 32]);

    let series = &container.series[0];
    assert_eq!(series.attributes.axes, "IYX");
    assert_eq!(series.attributes.kind, "generic");
    assert_eq!(series.levels.len(), 1);

    let units = &series.levels[0].units;
    assert_eq!(units.len(), 4);
    assert!(units[0].is_page());
    assert!(units[1..].iter().all(StructuralUnit::is_frame));

    let StructuralUnit::Frame(frame) = &units[3] else {
        panic!("expected a frame");
    };
    assert_eq!(frame.attributes.index, UnitIndex::Top(3));
    assert_eq!(frame.attributes.chunk_count, 1);
}

#[tokio::test]
async fn test_different_pages_become_series() {
    let data = TiffBuilder::new()
        .add_ifd(IfdBuilder::image(32, 32).page_name("first"))
        .add_ifd(IfdBuilder::image(16, 16).page_name("second"))
        .build();
    let container = read(data).await.unwrap();

    assert_eq!(container.series.len(), 2);
    assert_eq!(container.series[0].attributes.name.as_deref(), Some("first"));
    assert_eq!(container.series[1].attributes.name.as_deref(), Some("second"));
    assert_eq!(container.series[1].attributes.keyframe.index, 1);
    assert_eq!(container.shape, vec![32, 32]);
}

#[tokio::test]
async fn test_reduced_pages_extend_pyramid() {
    let container = read(reduced_pyramid_tiff()).await.unwrap();

    assert_eq!(container.series.len(), 1);
    let series = &container.series[0];
    assert!(series.attributes.is_pyramidal);
    assert_eq!(series.attributes.kind, "pyramidal");
    assert_eq!(series.attributes.name.as_deref(), Some("Pyramid"));

    let shapes: Vec<_> = series
        .levels
        .iter()
        .map(|l| l.attributes.shape.clone())
        .collect();
    assert_eq!(
        shapes,
        vec![vec![768, 1024, 3], vec![384, 512, 3], vec![192, 256, 3]]
    );
    assert_eq!(series.levels[0].attributes.name.as_deref(), Some("Pyramid"));
    assert_eq!(series.levels[1].attributes.name, None);

    assert!(container.attributes.flags.contains("tiled"));
    assert!(container.attributes.flags.contains("pyramidal"));
}

#[tokio::test]
async fn test_subifds_become_levels() {
    for bigtiff in [false, true] {
        let container = read(subifd_pyramid_tiff(bigtiff)).await.unwrap();

        assert_eq!(container.page_count, 2);
        assert_eq!(container.series.len(), 1);

        let series = &container.series[0];
        assert_eq!(series.levels.len(), 3);
        assert_eq!(series.levels[0].attributes.shape, vec![2, 1024, 1024, 3]);
        assert_eq!(series.levels[1].attributes.shape, vec![2, 512, 512, 3]);
        assert_eq!(series.levels[2].attributes.shape, vec![2, 256, 256, 3]);

        let level = &series.levels[1];
        assert!(level.units[0].is_page());
        assert!(level.units[1].is_frame());

        let StructuralUnit::Frame(frame) = &level.units[1] else {
            panic!("expected a frame");
        };
        assert_eq!(
            frame.attributes.index,
            UnitIndex::Sub {
                parent: 1,
                position: 0
            }
        );
    }
}

#[tokio::test]
async fn test_svs_series() {
    let container = read(svs_tiff()).await.unwrap();

    let names: Vec<_> = container
        .series
        .iter()
        .map(|s| s.attributes.name.clone().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Baseline", "Thumbnail", "Label", "Macro"]);

    let baseline = &container.series[0];
    assert_eq!(baseline.levels.len(), 2);
    assert_eq!(baseline.levels[1].attributes.shape, vec![384, 512, 3]);
    assert_eq!(container.series[3].attributes.keyframe.index, 4);

    let flags: Vec<_> = container.attributes.flags.iter().copied().collect();
    assert_eq!(flags, vec!["pyramidal", "svs", "tiled"]);
}

#[tokio::test]
async fn test_ome_flag() {
    let container = read(ome_tiff()).await.unwrap();
    assert!(container.attributes.flags.contains("ome"));
    assert_eq!(container.series.len(), 1);
}

// =============================================================================
// Malformed Files
// =============================================================================

#[tokio::test]
async fn test_invalid_magic() {
    let result = read(b"XX\x2a\x00\x08\x00\x00\x00".to_vec()).await;
    assert!(matches!(result, Err(TiffError::InvalidMagic(_))));
}

#[tokio::test]
async fn test_file_too_small() {
    let result = read(b"II\x2a".to_vec()).await;
    assert!(matches!(result, Err(TiffError::FileTooSmall { .. })));
}

#[tokio::test]
async fn test_ifd_offset_outside_file() {
    let mut data = single_page_tiff(ByteOrderType::LittleEndian, false);
    let size = data.len() as u32;
    data[4..8].copy_from_slice(&(size + 100).to_le_bytes());

    let result = read(data).await;
    assert!(matches!(result, Err(TiffError::InvalidIfdOffset(_))));
}

#[tokio::test]
async fn test_ifd_loop_is_rejected() {
    let mut data = single_page_tiff(ByteOrderType::LittleEndian, false);

    // Point the page's next-IFD field back at itself
    let entry_count = u16::from_le_bytes([data[8], data[9]]) as usize;
    let next_field = 8 + 2 + entry_count * 12;
    data[next_field..next_field + 4].copy_from_slice(&8u32.to_le_bytes());

    let result = read(data).await;
    assert!(matches!(result, Err(TiffError::IfdLoop(8))));
}

#[tokio::test]
async fn test_truncated_ifd() {
    let data = single_page_tiff(ByteOrderType::LittleEndian, false);
    let result = read(data[..20].to_vec()).await;
    assert!(matches!(result, Err(TiffError::FileTooSmall { .. })));
}

#[tokio::test]
async fn test_reads_only_structure() {
    let data = stack_tiff(3);
    let reader = TrackingReader::new(data, "stack.tif");
    ContainerReader::read(&reader).await.unwrap();

    // Header, then count and body per IFD; every value in these pages is inline
    assert_eq!(reader.request_count(), 1 + 3 * 2);
}
