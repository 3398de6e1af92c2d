//! Single-hash suppression stage.

use crate::geometry::BoxSet;
use crate::hash::{hnms, HashGridConfig};
use crate::util::HashNmsResult;

/// One HNMS grid, validated at construction and reused across calls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SingleHashStage {
    grid: HashGridConfig,
    parallel: bool,
}

impl SingleHashStage {
    /// Builds a stage; invalid grid parameters fail here, not per call.
    pub fn new(w0: f32, h0: f32, alpha: f32, bx: f32, by: f32) -> HashNmsResult<Self> {
        Ok(Self::from_grid(HashGridConfig::new(w0, h0, alpha, bx, by)?))
    }

    /// Wraps an already validated grid.
    pub fn from_grid(grid: HashGridConfig) -> Self {
        Self {
            grid,
            parallel: false,
        }
    }

    /// Requests rayon bucket reduction. Without the `rayon` feature this is
    /// recorded but the stage runs sequentially; output is identical.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the grid.
    pub fn grid(&self) -> &HashGridConfig {
        &self.grid
    }

    /// Returns whether parallel reduction was requested.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Suppresses `set`; indices are local to `set`.
    pub fn apply(&self, set: BoxSet<'_>) -> Vec<usize> {
        #[cfg(feature = "rayon")]
        {
            if self.parallel {
                return crate::hash::rayon::hnms_par(set, &self.grid);
            }
        }
        hnms(set, &self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::SingleHashStage;
    use crate::geometry::{BoxSet, Rect};
    use crate::util::HashNmsError;

    #[test]
    fn construction_validates_parameters() {
        assert!(matches!(
            SingleHashStage::new(1.0, 1.0, 0.0, 0.5, 0.5),
            Err(HashNmsError::InvalidInput(_))
        ));
        assert!(matches!(
            SingleHashStage::new(-1.0, 1.0, 0.5, 0.5, 0.5),
            Err(HashNmsError::InvalidInput(_))
        ));
    }

    #[test]
    fn apply_is_idempotent_on_its_output() {
        let stage = SingleHashStage::new(1.0, 1.0, 0.5, 0.0, 0.0).unwrap();
        let boxes: Vec<Rect> = (0..40)
            .map(|k| {
                let k = k as f32;
                Rect::new((k * 7.3) % 60.0, (k * 3.1) % 45.0, 8.0 + k % 5.0, 9.0)
            })
            .collect();
        let scores: Vec<f32> = (0..40).map(|k| ((k * 37) % 17) as f32 / 17.0).collect();
        let set = BoxSet::new(&boxes, &scores).unwrap();

        let keep = stage.apply(set);
        let sub = set.gather(&keep).unwrap();
        let again = stage.apply(sub.view());
        assert_eq!(again, (0..keep.len()).collect::<Vec<_>>());
    }
}
