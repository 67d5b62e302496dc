//! Decodes hand-written tensors stored as JSON fixtures under `tests/data`.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use yolo_decode::{decode, DecoderConfig, LabelTable, OwnedTensor};

#[derive(Debug, Deserialize)]
struct ExpectedBox {
    label: String,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

#[derive(Debug, Deserialize)]
struct Case {
    case_id: String,
    input_size: u32,
    labels: Vec<String>,
    num_attributes: usize,
    num_anchors: usize,
    rows: Vec<Vec<f32>>,
    expected: Vec<ExpectedBox>,
}

fn load_case(name: &str) -> Case {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    let text = fs::read_to_string(&path).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn two_signs_fixture_decodes_to_expected_boxes() {
    let case = load_case("two_signs.json");
    let tensor = OwnedTensor::from_rows(&case.rows[..]).unwrap();
    let view = tensor.view();
    assert_eq!(view.num_attributes(), case.num_attributes);
    assert_eq!(view.num_anchors(), case.num_anchors);

    let labels = LabelTable::new(case.labels.clone());
    let cfg = DecoderConfig {
        input_size: case.input_size,
        ..DecoderConfig::default()
    };
    let out = decode(view, &labels, &cfg).unwrap();

    assert_eq!(out.len(), case.expected.len(), "case {}", case.case_id);
    for (det, expected) in out.iter().zip(case.expected.iter()) {
        assert_eq!(det.label, expected.label);
        assert_eq!(
            (det.x1, det.y1, det.x2, det.y2),
            (expected.x1, expected.y1, expected.x2, expected.y2)
        );
    }
}
