//! Per-anchor scoring.
//!
//! Objectness is checked before any class logit is read, so the common case
//! of an empty anchor costs one `exp`.

use crate::candidate::Candidate;
use crate::decoder::DecoderConfig;
use crate::tensor::{AnchorView, TensorView, BOX_ATTRIBUTES};
use crate::trace::{trace_event, trace_span};
use crate::util::math::sigmoid;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Smallest attribute vector carrying a box, objectness and one class.
pub const MIN_ANCHOR_ATTRIBUTES: usize = BOX_ATTRIBUTES + 1;

/// Read access to one anchor's attribute vector.
pub trait AnchorAttributes {
    /// Number of attributes available for the anchor.
    fn num_attributes(&self) -> usize;

    /// Attribute at `index`, or `None` when out of range.
    fn attribute(&self, index: usize) -> Option<f32>;
}

impl AnchorAttributes for [f32] {
    fn num_attributes(&self) -> usize {
        self.len()
    }

    fn attribute(&self, index: usize) -> Option<f32> {
        self.get(index).copied()
    }
}

impl AnchorAttributes for AnchorView<'_> {
    fn num_attributes(&self) -> usize {
        self.len()
    }

    fn attribute(&self, index: usize) -> Option<f32> {
        self.get(index)
    }
}

/// Scores a single anchor.
///
/// Returns `None` when the anchor has fewer than [`MIN_ANCHOR_ATTRIBUTES`]
/// values, when objectness or the combined score falls below
/// `confidence_threshold`, or when the winning class has no label
/// (`class_index >= num_labels`). NaN scores never pass a threshold.
pub fn score_anchor<A>(
    anchor_index: usize,
    attrs: &A,
    confidence_threshold: f32,
    num_labels: usize,
) -> Option<Candidate>
where
    A: AnchorAttributes + ?Sized,
{
    let len = attrs.num_attributes();
    if len < MIN_ANCHOR_ATTRIBUTES {
        return None;
    }

    let objectness = sigmoid(attrs.attribute(4)?);
    if !(objectness >= confidence_threshold) {
        return None;
    }

    let mut class_index = 0usize;
    let mut class_score = sigmoid(attrs.attribute(BOX_ATTRIBUTES)?);
    for attr in (BOX_ATTRIBUTES + 1)..len {
        let value = sigmoid(attrs.attribute(attr)?);
        if value > class_score {
            class_score = value;
            class_index = attr - BOX_ATTRIBUTES;
        }
    }

    let score = class_score * objectness;
    if !(score >= confidence_threshold) {
        return None;
    }
    if class_index >= num_labels {
        return None;
    }

    Some(Candidate {
        anchor_index,
        objectness,
        class_index,
        class_score,
        score,
        cx: attrs.attribute(0)?,
        cy: attrs.attribute(1)?,
        w: attrs.attribute(2)?,
        h: attrs.attribute(3)?,
    })
}

/// Scores every anchor of `tensor`, returning survivors in anchor order.
pub fn score_tensor(
    tensor: TensorView<'_>,
    cfg: &DecoderConfig,
    num_labels: usize,
) -> Vec<Candidate> {
    let _span = trace_span!("score", anchors = tensor.num_anchors()).entered();

    #[cfg(feature = "rayon")]
    let candidates: Vec<Candidate> = if cfg.parallel {
        (0..tensor.num_anchors())
            .into_par_iter()
            .filter_map(|idx| {
                let anchor = tensor.anchor(idx)?;
                score_anchor(idx, &anchor, cfg.confidence_threshold, num_labels)
            })
            .collect()
    } else {
        score_sequential(tensor, cfg, num_labels)
    };

    #[cfg(not(feature = "rayon"))]
    let candidates = score_sequential(tensor, cfg, num_labels);

    trace_event!("scored_candidates", count = candidates.len());
    candidates
}

fn score_sequential(tensor: TensorView<'_>, cfg: &DecoderConfig, num_labels: usize) -> Vec<Candidate> {
    tensor
        .anchors()
        .filter_map(|anchor| {
            score_anchor(anchor.index(), &anchor, cfg.confidence_threshold, num_labels)
        })
        .collect()
}

/// Scores anchor-major rows of possibly differing lengths.
pub fn score_rows<R: AsRef<[f32]>>(
    rows: &[R],
    cfg: &DecoderConfig,
    num_labels: usize,
) -> Vec<Candidate> {
    let _span = trace_span!("score_rows", rows = rows.len()).entered();
    let candidates: Vec<Candidate> = rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            score_anchor(idx, row.as_ref(), cfg.confidence_threshold, num_labels)
        })
        .collect();
    trace_event!("scored_candidates", count = candidates.len());
    candidates
}
