//! Per-frame result delivery.

use crate::decoder::Detection;
use std::time::Duration;

/// Receives the outcome of one decoded frame.
pub trait DetectionListener {
    /// Called when no anchor survived filtering.
    fn on_empty(&mut self);

    /// Called with the final, confidence-ordered detections.
    fn on_detect(&mut self, detections: &[Detection], inference_time: Duration);
}

/// Listener built from two closures.
pub struct FnListener<E, D> {
    on_empty: E,
    on_detect: D,
}

impl<E, D> FnListener<E, D>
where
    E: FnMut(),
    D: FnMut(&[Detection], Duration),
{
    pub fn new(on_empty: E, on_detect: D) -> Self {
        Self {
            on_empty,
            on_detect,
        }
    }
}

impl<E, D> DetectionListener for FnListener<E, D>
where
    E: FnMut(),
    D: FnMut(&[Detection], Duration),
{
    fn on_empty(&mut self) {
        (self.on_empty)();
    }

    fn on_detect(&mut self, detections: &[Detection], inference_time: Duration) {
        (self.on_detect)(detections, inference_time);
    }
}
