//! Hashed non-maximum suppression (HNMS).
//!
//! Each box is mapped to a 4-component code: two scale bins and two position
//! bins. Scale bins quantize `log(w)` and `log(h)` in steps of `log(alpha)`
//! relative to the reference cell `(w0, h0)`; the position cell size grows
//! with the scale bin, so large boxes share coarse cells and small boxes
//! fine ones. The offsets `(bx, by)` shift the position grid by a fraction
//! of a cell.
//!
//! Boxes with equal codes are duplicates under that grid. Only the exact
//! bucket is consulted (no neighboring cells); the bucket keeps its best box
//! by descending score with the lower index winning ties. Winners are
//! returned in the same selection order, so a stage applied to its own
//! output keeps everything.

use crate::candidate::order::{beats, sort_indices_desc};
use crate::geometry::{BoxSet, Rect};
use crate::trace::{trace_event, trace_span};
use crate::util::math::quantize;
use crate::util::{HashNmsError, HashNmsResult};
use std::collections::HashMap;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Smallest extent used when taking logarithms of box sizes.
pub const MIN_EXTENT: f64 = 1e-12;

/// Parameters of one hashing grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HashGridConfig {
    w0: f32,
    h0: f32,
    alpha: f32,
    bx: f32,
    by: f32,
    ln_w0: f64,
    ln_h0: f64,
    ln_alpha: f64,
    cell_w: f64,
    cell_h: f64,
}

impl HashGridConfig {
    /// Validates and precomputes a grid.
    ///
    /// `w0` and `h0` must be finite and positive, `alpha` finite, positive
    /// and different from 1, and the offsets finite.
    pub fn new(w0: f32, h0: f32, alpha: f32, bx: f32, by: f32) -> HashNmsResult<Self> {
        if !w0.is_finite() || w0 <= 0.0 {
            return Err(HashNmsError::InvalidInput("w0 must be finite and > 0"));
        }
        if !h0.is_finite() || h0 <= 0.0 {
            return Err(HashNmsError::InvalidInput("h0 must be finite and > 0"));
        }
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(HashNmsError::InvalidInput("alpha must be finite and > 0"));
        }
        if alpha == 1.0 {
            return Err(HashNmsError::InvalidInput("alpha must differ from 1"));
        }
        if !bx.is_finite() || !by.is_finite() {
            return Err(HashNmsError::InvalidInput("grid offsets must be finite"));
        }

        let alpha64 = f64::from(alpha);
        let ratio = (1.0 - alpha64) / (1.0 + alpha64);
        Ok(Self {
            w0,
            h0,
            alpha,
            bx,
            by,
            ln_w0: f64::from(w0).ln(),
            ln_h0: f64::from(h0).ln(),
            ln_alpha: alpha64.ln(),
            cell_w: f64::from(w0) * ratio,
            cell_h: f64::from(h0) * ratio,
        })
    }

    /// Reference cell width.
    pub fn w0(&self) -> f32 {
        self.w0
    }

    /// Reference cell height.
    pub fn h0(&self) -> f32 {
        self.h0
    }

    /// Scale decay factor.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Horizontal grid offset in cells.
    pub fn bx(&self) -> f32 {
        self.bx
    }

    /// Vertical grid offset in cells.
    pub fn by(&self) -> f32 {
        self.by
    }

    fn scale_bin(&self, ln_ref: f64, extent: f32) -> i64 {
        let extent = f64::from(extent).max(MIN_EXTENT);
        quantize((ln_ref - extent.ln()) / self.ln_alpha)
    }

    fn position_bin(&self, coord: f32, cell: f64, bin: i64, offset: f32) -> i64 {
        // Saturated bins may give a zero or infinite cell; quantize absorbs both.
        let size = cell / (self.ln_alpha * bin as f64).exp();
        quantize(f64::from(coord) / size - f64::from(offset))
    }
}

/// Bucket key of one box under one grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashCode {
    /// Position bin along x.
    pub qx: i64,
    /// Position bin along y.
    pub qy: i64,
    /// Width scale bin.
    pub i: i64,
    /// Height scale bin.
    pub j: i64,
}

/// Computes the bucket key of `rect` under `grid`.
pub fn hash_code(rect: &Rect, grid: &HashGridConfig) -> HashCode {
    let i = grid.scale_bin(grid.ln_w0, rect.w);
    let j = grid.scale_bin(grid.ln_h0, rect.h);
    HashCode {
        qx: grid.position_bin(rect.x, grid.cell_w, i, grid.bx),
        qy: grid.position_bin(rect.y, grid.cell_h, j, grid.by),
        i,
        j,
    }
}

/// Runs HNMS with a validated grid; returns kept indices in selection order.
pub fn hnms(set: BoxSet<'_>, grid: &HashGridConfig) -> Vec<usize> {
    if set.is_empty() {
        return Vec::new();
    }

    let _span = trace_span!("hnms", boxes = set.len(), w0 = grid.w0, bx = grid.bx).entered();

    let scores = set.scores();
    let mut best: HashMap<HashCode, usize> = HashMap::with_capacity(set.len());
    for (idx, rect) in set.boxes().iter().enumerate() {
        let code = hash_code(rect, grid);
        best.entry(code)
            .and_modify(|holder| {
                if beats(scores[idx], idx, scores[*holder], *holder) {
                    *holder = idx;
                }
            })
            .or_insert(idx);
    }

    let keep = finish_buckets(best, scores);
    trace_event!("hnms_kept", kept = keep.len());
    keep
}

/// Runs HNMS with raw grid parameters, validating them on every call.
///
/// Prefer building a [`HashGridConfig`] (or a stage) once when the grid is
/// reused.
pub fn hnms_with_params(
    set: BoxSet<'_>,
    w0: f32,
    h0: f32,
    alpha: f32,
    bx: f32,
    by: f32,
) -> HashNmsResult<Vec<usize>> {
    let grid = HashGridConfig::new(w0, h0, alpha, bx, by)?;
    Ok(hnms(set, &grid))
}

pub(crate) fn finish_buckets(best: HashMap<HashCode, usize>, scores: &[f32]) -> Vec<usize> {
    let mut keep: Vec<usize> = best.into_values().collect();
    sort_indices_desc(&mut keep, scores);
    keep
}
