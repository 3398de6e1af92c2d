//! Exact greedy non-maximum suppression.
//!
//! Boxes are visited by descending score (lower index first on ties); each
//! unsuppressed box is kept and suppresses every later box whose IoU with it
//! is strictly greater than the threshold. Cost is `O(N^2)` IoU evaluations
//! in the worst case.

use crate::candidate::order::score_order_desc;
use crate::geometry::{BoxSet, Rect};
use crate::trace::{trace_event, trace_span};
use crate::util::{HashNmsError, HashNmsResult};

/// Runs exact NMS and returns kept indices in selection order.
pub fn nms(set: BoxSet<'_>, iou_threshold: f32) -> HashNmsResult<Vec<usize>> {
    if iou_threshold.is_nan() || !(0.0..=1.0).contains(&iou_threshold) {
        return Err(HashNmsError::InvalidInput("iou_threshold must be in [0, 1]"));
    }
    if set.is_empty() {
        return Ok(Vec::new());
    }

    let _span = trace_span!("nms", boxes = set.len()).entered();

    let boxes = set.boxes();
    let order = score_order_desc(set.scores());
    let areas: Vec<f32> = boxes.iter().map(Rect::area).collect();

    let mut suppressed = vec![false; boxes.len()];
    let mut keep = Vec::new();

    for (rank, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }
        keep.push(i);

        let (ix1, iy1, ix2, iy2) = boxes[i].corners();
        for &j in &order[rank + 1..] {
            if suppressed[j] {
                continue;
            }
            let (jx1, jy1, jx2, jy2) = boxes[j].corners();
            let inter_w = (ix2.min(jx2) - ix1.max(jx1)).max(0.0);
            let inter_h = (iy2.min(jy2) - iy1.max(jy1)).max(0.0);
            let inter = inter_w * inter_h;
            let union = areas[i] + areas[j] - inter;
            if union > 0.0 && inter / union > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    trace_event!("nms_kept", kept = keep.len());
    Ok(keep)
}

/// Convenience wrapper over parallel box and score slices.
pub fn nms_slices(boxes: &[Rect], scores: &[f32], iou_threshold: f32) -> HashNmsResult<Vec<usize>> {
    nms(BoxSet::new(boxes, scores)?, iou_threshold)
}

#[cfg(test)]
mod tests {
    use super::{nms, nms_slices};
    use crate::geometry::{BoxSet, Rect};
    use crate::util::HashNmsError;

    fn two_clusters() -> (Vec<Rect>, Vec<f32>) {
        (
            vec![
                Rect::new(0.0, 0.0, 10.0, 10.0),
                Rect::new(1.0, 1.0, 10.0, 10.0),
                Rect::new(50.0, 50.0, 10.0, 10.0),
                Rect::new(51.0, 51.0, 10.0, 10.0),
            ],
            vec![0.9, 0.8, 0.7, 0.6],
        )
    }

    #[test]
    fn keeps_one_box_per_cluster() {
        let (boxes, scores) = two_clusters();
        assert_eq!(nms_slices(&boxes, &scores, 0.5).unwrap(), vec![0, 2]);
    }

    #[test]
    fn result_follows_score_order() {
        let (boxes, _) = two_clusters();
        let scores = [0.2, 0.8, 0.95, 0.6];
        assert_eq!(nms_slices(&boxes, &scores, 0.5).unwrap(), vec![2, 1]);
    }

    #[test]
    fn threshold_one_keeps_everything_but_exact_overlap_is_not_greater() {
        let (boxes, scores) = two_clusters();
        assert_eq!(nms_slices(&boxes, &scores, 1.0).unwrap(), vec![0, 1, 2, 3]);

        let same = [Rect::new(5.0, 5.0, 4.0, 4.0); 3];
        assert_eq!(nms_slices(&same, &[0.5; 3], 1.0).unwrap(), vec![0, 1, 2]);
        assert_eq!(nms_slices(&same, &[0.5; 3], 0.99).unwrap(), vec![0]);
    }

    #[test]
    fn empty_input_is_not_an_error() {
        assert!(nms(BoxSet::empty(), 0.5).unwrap().is_empty());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let (boxes, scores) = two_clusters();
        let set = BoxSet::new(&boxes, &scores).unwrap();
        for thr in [-0.1, 1.5, f32::NAN] {
            assert_eq!(
                nms(set, thr).unwrap_err(),
                HashNmsError::InvalidInput("iou_threshold must be in [0, 1]")
            );
        }
    }

    #[test]
    fn zero_area_boxes_never_suppress() {
        let boxes = [Rect::new(1.0, 1.0, 0.0, 0.0); 2];
        assert_eq!(nms_slices(&boxes, &[0.4, 0.4], 0.0).unwrap(), vec![0, 1]);
    }
}
