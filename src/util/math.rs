//! Scalar helpers for score calibration and pixel rounding.

/// Logistic function mapping a raw logit into `(0, 1)`.
#[inline]
pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Rounds half away from zero and casts to `i32`.
///
/// Ties round away from zero on both signs, so an edge at `-0.5` becomes
/// `-1` and the box is rejected by the bounds check. Round-half-up would
/// give `0` and keep it; corners here are pinned to the symmetric rule.
///
/// `f32::round` already rounds ties away from zero; the cast saturates on
/// overflow and maps NaN to zero, so callers must reject non-finite input
/// beforehand.
#[inline]
pub(crate) fn round_half_away(x: f32) -> i32 {
    x.round() as i32
}
