//! Numeric helpers for hashing and score ordering.

/// Rounds half-to-even and converts to `i64`.
///
/// The cast saturates at the `i64` range and maps NaN to zero, so every
/// input yields a well-defined bin.
#[inline]
pub(crate) fn quantize(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Maps a score onto a totally ordered key where NaN ranks lowest.
#[inline]
pub(crate) fn score_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}
