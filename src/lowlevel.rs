//! Low-level building blocks for custom decoding pipelines.
//!
//! These expose the individual stages behind [`crate::decode`]. Most users
//! should prefer [`crate::Decoder`] or the top-level `decode` functions.

pub use crate::candidate::nms::{iou, nms};
pub use crate::candidate::Candidate;
pub use crate::decoder::geometry::{corners, map_candidate};
pub use crate::decoder::score::{
    score_anchor, score_rows, score_tensor, AnchorAttributes, MIN_ANCHOR_ATTRIBUTES,
};
pub use crate::tensor::BOX_ATTRIBUTES;
