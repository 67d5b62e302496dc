//! Error types for yolo-decode.

use thiserror::Error;

/// Result alias for decoder operations.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Errors signalling input the decoder cannot safely process.
///
/// Per-anchor problems (low scores, short rows, out-of-range class indices,
/// boxes outside the input image) are never reported here; they only reduce
/// the number of detections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A tensor dimension is zero.
    #[error("invalid tensor dimensions: {attributes} attributes x {anchors} anchors")]
    InvalidDimensions { attributes: usize, anchors: usize },
    /// The backing buffer does not hold exactly `attributes * anchors` values.
    #[error("tensor buffer size mismatch: expected {expected} values, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },
    /// Nested rows do not share a common length.
    #[error("ragged tensor rows: row {row} has {got} values, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },
    /// The tensor has no room for class logits after the box and objectness.
    #[error("tensor has {attributes} attributes, at least 6 are required")]
    MissingClassAttributes { attributes: usize },
    /// The attribute count disagrees with the configured class count.
    #[error("shape mismatch: expected {expected} attributes (5 + classes), got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    /// No label can ever be resolved for any class index.
    #[error("label table is empty")]
    EmptyLabelTable,
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// Reading a label file failed.
    #[error("label io error: {reason}")]
    LabelIo { reason: String },
}
