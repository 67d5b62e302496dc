//! Greedy, class-agnostic non-maximum suppression.

use crate::decoder::Detection;

/// Intersection-over-union of two boxes in integer pixel corners.
///
/// Areas are computed in `i64` so extreme corners cannot overflow. A
/// non-positive union yields `0.0`, which never suppresses anything.
pub fn iou(a: &Detection, b: &Detection) -> f32 {
    let ix1 = i64::from(a.x1.max(b.x1));
    let iy1 = i64::from(a.y1.max(b.y1));
    let ix2 = i64::from(a.x2.min(b.x2));
    let iy2 = i64::from(a.y2.min(b.y2));

    let intersection = (ix2 - ix1).max(0) * (iy2 - iy1).max(0);
    let union = area(a) + area(b) - intersection;
    if union <= 0 {
        return 0.0;
    }
    intersection as f32 / union as f32
}

fn area(d: &Detection) -> i64 {
    (i64::from(d.x2) - i64::from(d.x1)) * (i64::from(d.y2) - i64::from(d.y1))
}

/// Applies greedy NMS across all classes and keeps at most `max_detections`.
///
/// Boxes are stably sorted by descending confidence, so equal confidences
/// keep their input order. A box survives when its IoU with every
/// previously kept box is at most `iou_threshold`.
pub fn nms(mut boxes: Vec<Detection>, iou_threshold: f32, max_detections: usize) -> Vec<Detection> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::with_capacity(max_detections.min(boxes.len()));
    for candidate in boxes {
        // Later boxes can only be appended after this point.
        if kept.len() >= max_detections {
            break;
        }
        if kept.iter().any(|chosen| iou(chosen, &candidate) > iou_threshold) {
            continue;
        }
        kept.push(candidate);
    }

    kept
}
