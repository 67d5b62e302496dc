//! Top-level detection decoding.
//!
//! Decoding is a pure function of the tensor, label table and config:
//! scoring, geometry mapping and greedy suppression run in sequence with no
//! retained state. "No detection" is an empty vector, never an error; only
//! structurally unusable input is rejected.

pub(crate) mod geometry;
pub(crate) mod score;

use crate::candidate::nms::{iou, nms};
use crate::candidate::Candidate;
use crate::labels::LabelTable;
use crate::listener::DetectionListener;
use crate::tensor::{TensorView, BOX_ATTRIBUTES};
use crate::trace::{trace_event, trace_span};
use crate::util::{DecodeError, DecodeResult};
use std::time::Duration;

use self::geometry::map_candidate;
use self::score::{score_rows, score_tensor, MIN_ANCHOR_ATTRIBUTES};

/// A decoded bounding box in input-image pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Left edge.
    pub x1: i32,
    /// Top edge.
    pub y1: i32,
    /// Right edge.
    pub x2: i32,
    /// Bottom edge.
    pub y2: i32,
    /// Class name from the label table.
    pub label: String,
    /// Index of the class in the label table.
    pub class_index: usize,
    /// Objectness times class score, in `[0, 1]`.
    pub confidence: f32,
    /// Optional capture time supplied by the caller.
    pub timestamp: Option<f32>,
}

impl Detection {
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Signed box area; non-positive for degenerate boxes.
    pub fn area(&self) -> i64 {
        i64::from(self.width()) * i64::from(self.height())
    }

    /// Intersection-over-union with another detection.
    pub fn iou(&self, other: &Detection) -> f32 {
        iou(self, other)
    }

    /// Returns the detection stamped with a capture time.
    pub fn with_timestamp(mut self, timestamp: f32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Thresholds and limits for a decode call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecoderConfig {
    /// Minimum objectness and combined score for an anchor to survive.
    pub confidence_threshold: f32,
    /// Boxes overlapping a kept box by more than this IoU are suppressed.
    pub iou_threshold: f32,
    /// Side length of the square model input in pixels.
    pub input_size: u32,
    /// Maximum number of detections returned.
    pub max_detections: usize,
    /// Expected class count; when set, the tensor must carry `5 + n` attributes.
    pub num_classes: Option<usize>,
    /// Drop boxes whose rounded width or height is not positive.
    pub reject_degenerate: bool,
    /// Score anchors in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.35,
            iou_threshold: 0.45,
            input_size: 640,
            max_detections: 10,
            num_classes: None,
            reject_degenerate: false,
            parallel: false,
        }
    }
}

impl DecoderConfig {
    /// Checks that thresholds and sizes are usable.
    pub fn validate(&self) -> DecodeResult<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(DecodeError::InvalidConfig(
                "confidence_threshold must be within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(DecodeError::InvalidConfig(
                "iou_threshold must be within [0, 1]",
            ));
        }
        if self.input_size == 0 {
            return Err(DecodeError::InvalidConfig("input_size must be positive"));
        }
        if self.num_classes == Some(0) {
            return Err(DecodeError::InvalidConfig("num_classes must be positive"));
        }
        Ok(())
    }
}

/// Decodes a raw detection tensor into suppressed, confidence-ordered boxes.
///
/// Fails only on structural problems: an invalid config, fewer than six
/// attributes per anchor, an attribute count that disagrees with
/// `config.num_classes`, or an empty label table.
pub fn decode(
    tensor: TensorView<'_>,
    labels: &LabelTable,
    config: &DecoderConfig,
) -> DecodeResult<Vec<Detection>> {
    config.validate()?;
    check_shape(tensor.num_attributes(), labels, config)?;

    let _span = trace_span!(
        "decode",
        anchors = tensor.num_anchors(),
        attributes = tensor.num_attributes()
    )
    .entered();

    let candidates = score_tensor(tensor, config, labels.len());
    Ok(suppress(&candidates, labels, config))
}

/// Decodes anchor-major rows whose lengths may differ.
///
/// Rows shorter than six values are skipped rather than rejected, so a
/// partially malformed output still yields its valid detections. When
/// `config.num_classes` is set, any full-length row with other than `5 + n`
/// values is a `ShapeMismatch`, as it is for [`decode`].
pub fn decode_rows<R: AsRef<[f32]>>(
    rows: &[R],
    labels: &LabelTable,
    config: &DecoderConfig,
) -> DecodeResult<Vec<Detection>> {
    config.validate()?;
    if let Some(classes) = config.num_classes {
        let expected = BOX_ATTRIBUTES + classes;
        let mismatch = rows
            .iter()
            .map(|row| row.as_ref().len())
            .find(|&len| len >= MIN_ANCHOR_ATTRIBUTES && len != expected);
        if let Some(got) = mismatch {
            return Err(DecodeError::ShapeMismatch { expected, got });
        }
    }
    if labels.is_empty() {
        return Err(DecodeError::EmptyLabelTable);
    }

    let _span = trace_span!("decode_rows", rows = rows.len()).entered();
    let candidates = score_rows(rows, config, labels.len());
    Ok(suppress(&candidates, labels, config))
}

/// Returns the highest-confidence detection; the first one wins ties.
pub fn best_detection(detections: &[Detection]) -> Option<&Detection> {
    detections.iter().reduce(|best, det| {
        if det.confidence > best.confidence {
            det
        } else {
            best
        }
    })
}

fn check_shape(
    num_attributes: usize,
    labels: &LabelTable,
    config: &DecoderConfig,
) -> DecodeResult<()> {
    if num_attributes < MIN_ANCHOR_ATTRIBUTES {
        return Err(DecodeError::MissingClassAttributes {
            attributes: num_attributes,
        });
    }
    if let Some(classes) = config.num_classes {
        let expected = BOX_ATTRIBUTES + classes;
        if num_attributes != expected {
            return Err(DecodeError::ShapeMismatch {
                expected,
                got: num_attributes,
            });
        }
    }
    if labels.is_empty() {
        return Err(DecodeError::EmptyLabelTable);
    }
    Ok(())
}

fn suppress(
    candidates: &[Candidate],
    labels: &LabelTable,
    config: &DecoderConfig,
) -> Vec<Detection> {
    let boxes: Vec<Detection> = candidates
        .iter()
        .filter_map(|cand| map_candidate(cand, labels, config))
        .collect();
    trace_event!("valid_boxes", count = boxes.len());

    let _span = trace_span!(
        "nms",
        boxes = boxes.len(),
        iou_threshold = config.iou_threshold,
        max_detections = config.max_detections
    )
    .entered();
    let kept = nms(boxes, config.iou_threshold, config.max_detections);
    trace_event!("kept_detections", count = kept.len());
    kept
}

/// Decoder bound to a label table and config.
///
/// Holds no per-frame state; one instance can serve any number of threads.
#[derive(Clone, Debug)]
pub struct Decoder {
    labels: LabelTable,
    config: DecoderConfig,
}

impl Decoder {
    /// Creates a decoder with the default config.
    pub fn new(labels: LabelTable) -> Self {
        Self {
            labels,
            config: DecoderConfig::default(),
        }
    }

    /// Replaces the decoder config.
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes one tensor; see [`decode`].
    pub fn decode(&self, tensor: TensorView<'_>) -> DecodeResult<Vec<Detection>> {
        decode(tensor, &self.labels, &self.config)
    }

    /// Decodes anchor-major rows; see [`decode_rows`].
    pub fn decode_anchor_rows<R: AsRef<[f32]>>(&self, rows: &[R]) -> DecodeResult<Vec<Detection>> {
        decode_rows(rows, &self.labels, &self.config)
    }

    /// Decodes one frame and reports the outcome to `listener`.
    ///
    /// Exactly one of `on_empty` or `on_detect` is called on success; nothing
    /// is called when decoding fails.
    pub fn decode_and_notify<L>(
        &self,
        tensor: TensorView<'_>,
        inference_time: Duration,
        listener: &mut L,
    ) -> DecodeResult<()>
    where
        L: DetectionListener + ?Sized,
    {
        let detections = self.decode(tensor)?;
        if detections.is_empty() {
            listener.on_empty();
        } else {
            listener.on_detect(&detections, inference_time);
        }
        Ok(())
    }
}
