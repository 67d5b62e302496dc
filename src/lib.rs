//! yolo-decode turns raw object-detection head output into labelled boxes.
//!
//! The decoder consumes a `[attributes][anchors]` tensor whose per-anchor
//! layout is `[cx, cy, w, h, objectness, class_0 .. class_{K-1}]`, scores
//! every anchor, maps surviving boxes to integer corners in input-image
//! pixels, and applies greedy class-agnostic non-maximum suppression. It
//! performs no inference, image preprocessing, or rendering.
//!
//! Anchor scoring can run in parallel with the `rayon` feature; the `tracing`
//! feature emits debug spans for each stage.

mod candidate;
pub mod decoder;
pub mod labels;
pub mod listener;
pub mod lowlevel;
pub mod tensor;
mod trace;
pub mod util;

pub use decoder::{best_detection, decode, decode_rows, Decoder, DecoderConfig, Detection};
pub use labels::LabelTable;
pub use listener::{DetectionListener, FnListener};
pub use tensor::{AnchorView, OwnedTensor, TensorLayout, TensorView};
pub use util::{DecodeError, DecodeResult};
