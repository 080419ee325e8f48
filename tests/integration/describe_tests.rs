//! Image descriptions and tree truncation on real report content.

use serde_json::{json, Value};

use tiff_inspector::describe::{is_xml, Description};
use tiff_inspector::{dumps, truncate_text, truncate_tree};

use super::test_utils::*;

#[tokio::test]
async fn test_descriptions_are_enumerated() {
    let report = report_for(svs_tiff(), "slide.svs").await;
    let found = report.image_descriptions();

    let positions: Vec<_> = found.iter().map(|d| (d.series, d.level, d.page)).collect();
    assert_eq!(
        positions,
        vec![(0, 0, 0), (0, 1, 0), (1, 0, 0), (2, 0, 0), (3, 0, 0)]
    );
    assert!(found.iter().all(|d| d.text.starts_with("Aperio")));
    assert!(found.iter().all(|d| !is_xml(d.text)));
}

#[tokio::test]
async fn test_ome_description_tree() {
    let report = report_for(ome_tiff(), "cells.ome.tif").await;
    let found = report.image_descriptions();
    assert_eq!(found.len(), 1);

    let description = Description::parse(found[0].text);
    assert_eq!(description.kind(), "xml");

    let tree = description.to_value();
    let pixels = &tree["OME"]["Image"]["Pixels"];
    assert_eq!(pixels["@SizeT"], json!("2"));
    assert_eq!(pixels["Channel"], json!({"@ID": "Channel:0:0", "@Name": "DAPI"}));
    assert_eq!(tree["OME"]["@Creator"], json!("tiff-inspector tests"));
}

#[tokio::test]
async fn test_ome_description_render() {
    let report = report_for(ome_tiff(), "cells.ome.tif").await;
    let description = Description::parse(report.image_descriptions()[0].text);

    let rendered = description.render(Some(2), None);
    let image = rendered["OME"]["Image"].as_object().unwrap();
    assert_eq!(image.len(), 1);

    let (key, text) = image.iter().next().unwrap();
    assert_eq!(key, "TRUNCATED (3)");
    let text = text.as_str().unwrap();
    assert!(text.starts_with(r#"{"@ID": "Image:0", "@Name": "cells", "Pixels": {"#));

    let short = description.render(Some(2), Some(12));
    assert_eq!(
        short["OME"]["Image"]["TRUNCATED (3)"],
        json!(r#"{"@ID": "Ima..."#)
    );

    // No depth limit keeps the whole tree
    assert_eq!(description.render(None, Some(1)), description.to_value());
}

#[test]
fn test_truncate_tree_examples() {
    let tree = json!({"a": 1, "b": 2});
    assert_eq!(
        truncate_tree(&tree, Some(0), None),
        json!({"TRUNCATED (2)": "{\"a\": 1, \"b\": 2}"})
    );

    let nested = json!({"list": [{"x": {"y": 1}}, 3, "s"], "n": null});
    assert_eq!(
        truncate_tree(&nested, Some(2), None),
        json!({"list": [{"TRUNCATED (1)": "{\"x\": {\"y\": 1}}"}, 3, "s"], "n": null})
    );
}

#[test]
fn test_truncate_tree_identity_and_idempotence() {
    let samples = [
        json!(null),
        json!(42),
        json!("text"),
        json!([1, [2, [3, [4]]]]),
        json!({"a": {"b": {"c": {"d": {}}}}, "e": [{"f": 1}]}),
    ];
    for sample in &samples {
        assert_eq!(&truncate_tree(sample, None, None), sample);
        assert_eq!(&truncate_tree(sample, None, Some(0)), sample);

        for depth in 0..5 {
            for limit in [None, Some(4)] {
                let once = truncate_tree(sample, Some(depth), limit);
                let twice = truncate_tree(&once, Some(depth), limit);
                assert_eq!(once, twice, "depth {depth}, limit {limit:?}");
            }
        }
    }
}

#[test]
fn test_truncate_text_examples() {
    assert_eq!(truncate_text("0123456789", Some(4)), "0123...");
    assert_eq!(truncate_text("0123", Some(4)), "0123");
    assert_eq!(truncate_text("0123", None), "0123");
}

#[test]
fn test_dumps_matches_summary_format() {
    let value: Value = json!({"key": ["v", 1, 2.5, true, null]});
    assert_eq!(dumps(&value), r#"{"key": ["v", 1, 2.5, true, null]}"#);
}
