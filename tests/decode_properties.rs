//! Randomized checks of the decoder's output invariants.
//!
//! Tensors are generated from fixed seeds so failures are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use yolo_decode::{decode, DecoderConfig, LabelTable, TensorView};

const INPUT_SIZE: u32 = 640;
const NUM_CLASSES: usize = 6;
const NUM_ANCHORS: usize = 400;

fn random_tensor(rng: &mut StdRng) -> Vec<f32> {
    let num_attributes = 5 + NUM_CLASSES;
    let mut data = vec![0.0f32; num_attributes * NUM_ANCHORS];
    for anchor in 0..NUM_ANCHORS {
        let cx = rng.random_range(0.0..INPUT_SIZE as f32);
        let cy = rng.random_range(0.0..INPUT_SIZE as f32);
        let w = rng.random_range(4.0..200.0f32);
        let h = rng.random_range(4.0..200.0f32);
        let objectness = rng.random_range(-6.0..6.0f32);
        data[anchor] = cx;
        data[NUM_ANCHORS + anchor] = cy;
        data[2 * NUM_ANCHORS + anchor] = w;
        data[3 * NUM_ANCHORS + anchor] = h;
        data[4 * NUM_ANCHORS + anchor] = objectness;
        for class in 0..NUM_CLASSES {
            data[(5 + class) * NUM_ANCHORS + anchor] = rng.random_range(-6.0..6.0f32);
        }
    }
    data
}

fn labels() -> LabelTable {
    (0..NUM_CLASSES).map(|i| format!("sign_{i}")).collect()
}

fn configs() -> Vec<DecoderConfig> {
    vec![
        DecoderConfig::default(),
        DecoderConfig {
            confidence_threshold: 0.1,
            iou_threshold: 0.2,
            max_detections: 50,
            ..DecoderConfig::default()
        },
        DecoderConfig {
            confidence_threshold: 0.6,
            iou_threshold: 0.7,
            max_detections: 3,
            ..DecoderConfig::default()
        },
    ]
}

#[test]
fn random_tensors_respect_output_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let labels = labels();
    let mut total = 0usize;

    for _ in 0..20 {
        let data = random_tensor(&mut rng);
        let view = TensorView::attribute_major(&data, 5 + NUM_CLASSES, NUM_ANCHORS).unwrap();

        for cfg in configs() {
            let out = decode(view, &labels, &cfg).unwrap();
            total += out.len();

            assert!(out.len() <= cfg.max_detections);
            for pair in out.windows(2) {
                assert!(pair[0].confidence >= pair[1].confidence);
            }
            for det in &out {
                assert!(det.confidence >= cfg.confidence_threshold);
                assert!(det.confidence <= 1.0);
                assert!(det.x1 >= 0 && det.y1 >= 0);
                assert!(det.x2 <= INPUT_SIZE as i32 && det.y2 <= INPUT_SIZE as i32);
                // Widths are drawn from [4, 200), so rounding cannot collapse a box.
                assert!(det.x1 < det.x2 && det.y1 < det.y2, "degenerate box {det:?}");
                assert_eq!(labels.get(det.class_index), Some(det.label.as_str()));
            }
            for (i, a) in out.iter().enumerate() {
                for b in &out[i + 1..] {
                    assert!(
                        a.iou(b) <= cfg.iou_threshold,
                        "iou {} above {}",
                        a.iou(b),
                        cfg.iou_threshold
                    );
                }
            }
        }
    }

    assert!(total > 0, "random tensors produced no detections at all");
}

#[test]
fn repeated_decodes_are_identical() {
    let mut rng = StdRng::seed_from_u64(7);
    let data = random_tensor(&mut rng);
    let view = TensorView::attribute_major(&data, 5 + NUM_CLASSES, NUM_ANCHORS).unwrap();
    let labels = labels();
    let cfg = DecoderConfig::default();

    let reference = decode(view, &labels, &cfg).unwrap();
    for _ in 0..5 {
        assert_eq!(decode(view, &labels, &cfg).unwrap(), reference);
    }
}

#[test]
fn raising_the_threshold_never_adds_low_scores() {
    let mut rng = StdRng::seed_from_u64(99);
    let data = random_tensor(&mut rng);
    let view = TensorView::attribute_major(&data, 5 + NUM_CLASSES, NUM_ANCHORS).unwrap();
    let labels = labels();

    for threshold in [0.2f32, 0.4, 0.6, 0.8] {
        let cfg = DecoderConfig {
            confidence_threshold: threshold,
            max_detections: usize::MAX,
            ..DecoderConfig::default()
        };
        let out = decode(view, &labels, &cfg).unwrap();
        assert!(out.iter().all(|det| det.confidence >= threshold));
    }
}
