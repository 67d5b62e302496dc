//! Center/size to corner mapping in input-image pixels.

use crate::candidate::Candidate;
use crate::decoder::{DecoderConfig, Detection};
use crate::labels::LabelTable;
use crate::util::math::round_half_away;

/// Integer corners `(x1, y1, x2, y2)` of a center/size box.
///
/// Coordinates are normalized by `input_size` and scaled back before rounding
/// half away from zero. Returns `None` for non-finite input.
pub fn corners(cx: f32, cy: f32, w: f32, h: f32, input_size: u32) -> Option<(i32, i32, i32, i32)> {
    if !(cx.is_finite() && cy.is_finite() && w.is_finite() && h.is_finite()) {
        return None;
    }
    let size = input_size as f32;
    let scaled_cx = cx / size;
    let scaled_cy = cy / size;
    let scaled_w = w / size;
    let scaled_h = h / size;

    let x1 = round_half_away((scaled_cx - scaled_w / 2.0) * size);
    let y1 = round_half_away((scaled_cy - scaled_h / 2.0) * size);
    let x2 = round_half_away((scaled_cx + scaled_w / 2.0) * size);
    let y2 = round_half_away((scaled_cy + scaled_h / 2.0) * size);
    Some((x1, y1, x2, y2))
}

/// Maps a scored candidate to a detection, or drops it.
///
/// A candidate is dropped when any corner leaves `[0, input_size]`, when its
/// class has no label, or (only with `reject_degenerate`) when the rounded box
/// has no positive width or height.
pub fn map_candidate(
    candidate: &Candidate,
    labels: &LabelTable,
    cfg: &DecoderConfig,
) -> Option<Detection> {
    let (x1, y1, x2, y2) = corners(
        candidate.cx,
        candidate.cy,
        candidate.w,
        candidate.h,
        cfg.input_size,
    )?;

    let limit = i64::from(cfg.input_size);
    if x1 < 0 || y1 < 0 || i64::from(x2) > limit || i64::from(y2) > limit {
        return None;
    }
    if cfg.reject_degenerate && (x1 >= x2 || y1 >= y2) {
        return None;
    }

    let label = labels.get(candidate.class_index)?;
    Some(Detection {
        x1,
        y1,
        x2,
        y2,
        label: label.to_string(),
        class_index: candidate.class_index,
        confidence: candidate.score,
        timestamp: None,
    })
}
