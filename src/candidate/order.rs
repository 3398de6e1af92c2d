//! Deterministic score ordering for box indices.

use crate::util::math::score_key;
use std::cmp::Ordering;

/// Compares two candidates by descending score, then ascending index.
///
/// `Ordering::Less` means `(score_a, a)` is selected before `(score_b, b)`.
#[inline]
pub(crate) fn cmp_desc(score_a: f32, a: usize, score_b: f32, b: usize) -> Ordering {
    score_key(score_b)
        .total_cmp(&score_key(score_a))
        .then_with(|| a.cmp(&b))
}

/// Returns true when candidate `a` beats the current holder `b`.
#[inline]
pub(crate) fn beats(score_a: f32, a: usize, score_b: f32, b: usize) -> bool {
    cmp_desc(score_a, a, score_b, b) == Ordering::Less
}

/// Sorts `indices` in selection order for `scores`.
pub(crate) fn sort_indices_desc(indices: &mut [usize], scores: &[f32]) {
    indices.sort_unstable_by(|&a, &b| cmp_desc(scores[a], a, scores[b], b));
}

/// Returns `0..scores.len()` in selection order.
pub(crate) fn score_order_desc(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    sort_indices_desc(&mut order, scores);
    order
}
