//! Rayon-parallel HNMS bucket reduction (feature-gated).
//!
//! Boxes are hashed and reduced into per-thread bucket maps which are then
//! merged pairwise. The bucket winner is the maximum of a total order
//! (score, then lower index), so the merge is associative and commutative
//! and the output matches [`hnms`](super::hnms) exactly.

use super::{finish_buckets, hash_code, HashCode, HashGridConfig};
use crate::candidate::order::beats;
use crate::geometry::BoxSet;
use crate::trace::{trace_event, trace_span};
use rayon::prelude::*;
use std::collections::HashMap;

/// Parallel HNMS; same contract and output as the sequential primitive.
pub fn hnms_par(set: BoxSet<'_>, grid: &HashGridConfig) -> Vec<usize> {
    if set.is_empty() {
        return Vec::new();
    }

    let _span = trace_span!("hnms", boxes = set.len(), parallel = true).entered();

    let boxes = set.boxes();
    let scores = set.scores();
    let best = (0..boxes.len())
        .into_par_iter()
        .fold(HashMap::new, |mut map: HashMap<HashCode, usize>, idx| {
            offer(&mut map, hash_code(&boxes[idx], grid), idx, scores);
            map
        })
        .reduce(HashMap::new, |mut acc, other| {
            for (code, idx) in other {
                offer(&mut acc, code, idx, scores);
            }
            acc
        });

    let keep = finish_buckets(best, scores);
    trace_event!("hnms_kept", kept = keep.len());
    keep
}

fn offer(map: &mut HashMap<HashCode, usize>, code: HashCode, idx: usize, scores: &[f32]) {
    map.entry(code)
        .and_modify(|holder| {
            if beats(scores[idx], idx, scores[*holder], *holder) {
                *holder = idx;
            }
        })
        .or_insert(idx);
}
