//! Transient per-anchor candidates and their suppression.
//!
//! A [`Candidate`] lives between scoring and geometry mapping; it is never
//! returned to callers. Suppression runs on the mapped detections.

pub(crate) mod nms;

/// Anchor that passed both confidence filters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Index of the anchor in the tensor (or row in the row list).
    pub anchor_index: usize,
    /// Sigmoid of the objectness logit.
    pub objectness: f32,
    /// Index of the best class, first occurrence on ties.
    pub class_index: usize,
    /// Sigmoid of the best class logit.
    pub class_score: f32,
    /// `class_score * objectness`, reported as the detection confidence.
    pub score: f32,
    /// Box center x in input pixels.
    pub cx: f32,
    /// Box center y in input pixels.
    pub cy: f32,
    /// Box width in input pixels.
    pub w: f32,
    /// Box height in input pixels.
    pub h: f32,
}
