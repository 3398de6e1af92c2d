//! Boxes, box sets, and the IoU utility.
//!
//! A [`Rect`] is `(x, y, w, h)` with `(x, y)` at the box **center** and
//! `w`/`h` the full extents. [`BoxSet`] is a borrowed view pairing boxes with
//! scores index-for-index; the pairing invariant is checked by every
//! constructor so downstream primitives never re-validate it. [`OwnedBoxSet`]
//! holds gathered subsets between chain stages.

use crate::util::{HashNmsError, HashNmsResult};

/// Axis-aligned box in center format.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Center x coordinate.
    pub x: f32,
    /// Center y coordinate.
    pub y: f32,
    /// Full width.
    pub w: f32,
    /// Full height.
    pub h: f32,
}

impl Rect {
    /// Creates a box from its center and extents.
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns `(x1, y1, x2, y2)` with negative extents collapsed to zero.
    pub fn corners(&self) -> (f32, f32, f32, f32) {
        let half_w = 0.5 * self.w.max(0.0);
        let half_h = 0.5 * self.h.max(0.0);
        (
            self.x - half_w,
            self.y - half_h,
            self.x + half_w,
            self.y + half_h,
        )
    }

    /// Returns the box area; negative extents count as zero.
    pub fn area(&self) -> f32 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    /// Intersection-over-union with `other`, in `[0, 1]`.
    ///
    /// Disjoint boxes and pairs with zero union area yield `0`.
    pub fn iou(&self, other: &Rect) -> f32 {
        let (ax1, ay1, ax2, ay2) = self.corners();
        let (bx1, by1, bx2, by2) = other.corners();

        let inter_w = (ax2.min(bx2) - ax1.max(bx1)).max(0.0);
        let inter_h = (ay2.min(by2) - ay1.max(by1)).max(0.0);
        let inter = inter_w * inter_h;
        let union = self.area() + other.area() - inter;

        if union > 0.0 {
            (inter / union).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl From<[f32; 4]> for Rect {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// Free-function form of [`Rect::iou`].
pub fn iou(a: &Rect, b: &Rect) -> f32 {
    a.iou(b)
}

/// Borrowed boxes paired with their scores.
#[derive(Clone, Copy, Debug)]
pub struct BoxSet<'a> {
    boxes: &'a [Rect],
    scores: &'a [f32],
}

impl<'a> BoxSet<'a> {
    /// Pairs `boxes` with `scores`; lengths must match.
    pub fn new(boxes: &'a [Rect], scores: &'a [f32]) -> HashNmsResult<Self> {
        if boxes.len() != scores.len() {
            return Err(HashNmsError::LengthMismatch {
                boxes: boxes.len(),
                scores: scores.len(),
            });
        }
        Ok(Self { boxes, scores })
    }

    /// Returns an empty set.
    pub fn empty() -> Self {
        Self {
            boxes: &[],
            scores: &[],
        }
    }

    /// Returns the number of boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns true when the set holds no boxes.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Returns the boxes.
    pub fn boxes(&self) -> &'a [Rect] {
        self.boxes
    }

    /// Returns the scores.
    pub fn scores(&self) -> &'a [f32] {
        self.scores
    }

    /// Returns the box and score at `idx`.
    pub fn get(&self, idx: usize) -> Option<(Rect, f32)> {
        Some((*self.boxes.get(idx)?, *self.scores.get(idx)?))
    }

    /// Copies the entries at `indices` into an owned set, in that order.
    pub fn gather(&self, indices: &[usize]) -> HashNmsResult<OwnedBoxSet> {
        if let Some(&index) = indices.iter().find(|&&idx| idx >= self.len()) {
            return Err(HashNmsError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok(self.select(indices))
    }

    /// Gathers indices already known to be in range.
    pub(crate) fn select(&self, indices: &[usize]) -> OwnedBoxSet {
        OwnedBoxSet {
            boxes: indices.iter().map(|&idx| self.boxes[idx]).collect(),
            scores: indices.iter().map(|&idx| self.scores[idx]).collect(),
        }
    }
}

/// Owned boxes paired with their scores.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnedBoxSet {
    boxes: Vec<Rect>,
    scores: Vec<f32>,
}

impl OwnedBoxSet {
    /// Takes ownership of paired boxes and scores; lengths must match.
    pub fn new(boxes: Vec<Rect>, scores: Vec<f32>) -> HashNmsResult<Self> {
        if boxes.len() != scores.len() {
            return Err(HashNmsError::LengthMismatch {
                boxes: boxes.len(),
                scores: scores.len(),
            });
        }
        Ok(Self { boxes, scores })
    }

    /// Builds a set from an `N x 4` row-major buffer of `(x, y, w, h)`.
    pub fn from_flat(flat: &[f32], scores: &[f32]) -> HashNmsResult<Self> {
        if flat.len() % 4 != 0 {
            return Err(HashNmsError::BufferShape { len: flat.len() });
        }
        let boxes: Vec<Rect> = flat
            .chunks_exact(4)
            .map(|row| Rect::new(row[0], row[1], row[2], row[3]))
            .collect();
        Self::new(boxes, scores.to_vec())
    }

    /// Returns a borrowed view.
    pub fn view(&self) -> BoxSet<'_> {
        BoxSet {
            boxes: &self.boxes,
            scores: &self.scores,
        }
    }

    /// Returns the number of boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns true when the set holds no boxes.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
