//! Multi-hash suppression chain.
//!
//! A chain of `num_stages` single-hash stages approximates multi-scale NMS.
//! Stage `i` uses reference cell `alpha^(-i / num_stages)` and a grid offset
//! of `i / num_stages` cells, so cell sizes grow geometrically and each stage
//! shifts the grid; duplicates split by a cell boundary in one stage are
//! likely to share a bucket in another. Each stage only sees the survivors of
//! the previous one, and its local keep indices are remapped back to the
//! original input.

use crate::geometry::BoxSet;
use crate::stage::SingleHashStage;
use crate::trace::{trace_event, trace_span};
use crate::util::{HashNmsError, HashNmsResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Construction parameters of a [`MultiHashChain`].
#[derive(Clone, Debug, PartialEq)]
pub struct ChainConfig {
    /// Number of stages; must be at least 1.
    pub num_stages: usize,
    /// Scale decay shared by all stages; finite, positive and not 1.
    pub alpha: f32,
    /// Use rayon inside stages and across batch entries when available.
    pub parallel: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            num_stages: 4,
            alpha: 0.7,
            parallel: false,
        }
    }
}

impl ChainConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> HashNmsResult<()> {
        if self.num_stages == 0 {
            return Err(HashNmsError::InvalidStageCount);
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(HashNmsError::InvalidInput("alpha must be finite and > 0"));
        }
        if self.alpha == 1.0 {
            return Err(HashNmsError::InvalidInput("alpha must differ from 1"));
        }
        Ok(())
    }
}

/// Ordered stages applied to progressively smaller survivor sets.
#[derive(Clone, Debug)]
pub struct MultiHashChain {
    cfg: ChainConfig,
    stages: Vec<SingleHashStage>,
}

impl MultiHashChain {
    /// Generates the stages for `cfg`.
    pub fn new(cfg: ChainConfig) -> HashNmsResult<Self> {
        cfg.validate()?;

        let num = cfg.num_stages as f64;
        let neg_ln_alpha = -f64::from(cfg.alpha).ln();
        let mut stages = Vec::with_capacity(cfg.num_stages);
        for i in 0..cfg.num_stages {
            let t = i as f64 / num;
            let cell = (t * neg_ln_alpha).exp() as f32;
            let offset = t as f32;
            let stage = SingleHashStage::new(cell, cell, cfg.alpha, offset, offset)?
                .with_parallel(cfg.parallel);
            stages.push(stage);
        }

        Ok(Self { cfg, stages })
    }

    /// Shorthand for a sequential chain.
    pub fn with_stages(num_stages: usize, alpha: f32) -> HashNmsResult<Self> {
        Self::new(ChainConfig {
            num_stages,
            alpha,
            ..ChainConfig::default()
        })
    }

    /// Returns the configuration the chain was built from.
    pub fn config(&self) -> &ChainConfig {
        &self.cfg
    }

    /// Returns the stages in application order.
    pub fn stages(&self) -> &[SingleHashStage] {
        &self.stages
    }

    /// Returns the number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false for a constructed chain.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns a chain made of the first `len` stages, with unchanged grids.
    pub fn prefix(&self, len: usize) -> HashNmsResult<Self> {
        if len == 0 {
            return Err(HashNmsError::InvalidStageCount);
        }
        let len = len.min(self.stages.len());
        Ok(Self {
            cfg: ChainConfig {
                num_stages: len,
                ..self.cfg.clone()
            },
            stages: self.stages[..len].to_vec(),
        })
    }

    /// Suppresses `set`; returned indices refer to `set`.
    pub fn apply(&self, set: BoxSet<'_>) -> Vec<usize> {
        let _span = trace_span!("multi_hash_chain", boxes = set.len(), stages = self.len()).entered();

        let mut current: Vec<usize> = (0..set.len()).collect();
        for (stage_idx, stage) in self.stages.iter().enumerate() {
            if current.is_empty() {
                break;
            }
            let local = if stage_idx == 0 {
                stage.apply(set)
            } else {
                let subset = set.select(&current);
                stage.apply(subset.view())
            };
            current = local.into_iter().map(|idx| current[idx]).collect();
            trace_event!("chain_stage", stage = stage_idx, kept = current.len());
        }

        current
    }

    /// Suppresses each set independently, one result per input.
    pub fn apply_batch(&self, sets: &[BoxSet<'_>]) -> Vec<Vec<usize>> {
        #[cfg(feature = "rayon")]
        {
            if self.cfg.parallel {
                return sets.par_iter().map(|set| self.apply(*set)).collect();
            }
        }
        sets.iter().map(|set| self.apply(*set)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainConfig, MultiHashChain};
    use crate::geometry::{BoxSet, Rect};
    use crate::util::HashNmsError;

    #[test]
    fn stage_grids_follow_geometric_schedule() {
        let chain = MultiHashChain::with_stages(4, 0.5).unwrap();
        assert_eq!(chain.len(), 4);
        for (i, stage) in chain.stages().iter().enumerate() {
            let grid = stage.grid();
            let expected = 2f32.powf(i as f32 / 4.0);
            assert!((grid.w0() - expected).abs() < 1e-6);
            assert_eq!(grid.w0(), grid.h0());
            assert!((grid.bx() - i as f32 / 4.0).abs() < 1e-7);
            assert_eq!(grid.bx(), grid.by());
            assert_eq!(grid.alpha(), 0.5);
        }
    }

    #[test]
    fn config_validation_fails_fast() {
        assert_eq!(
            MultiHashChain::with_stages(0, 0.5).unwrap_err(),
            HashNmsError::InvalidStageCount
        );
        for alpha in [0.0, -0.3, 1.0, f32::NAN] {
            assert!(matches!(
                MultiHashChain::with_stages(3, alpha),
                Err(HashNmsError::InvalidInput(_))
            ));
        }
        assert!(ChainConfig::default().validate().is_ok());
    }

    #[test]
    fn remaps_local_indices_to_original_input() {
        // Later stages see only survivors; the result must still index the
        // full input.
        let boxes = [
            Rect::new(200.0, 200.0, 10.0, 10.0),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(1.0, 1.0, 10.0, 10.0),
            Rect::new(50.0, 50.0, 10.0, 10.0),
        ];
        let scores = [0.1, 0.9, 0.8, 0.7];
        let set = BoxSet::new(&boxes, &scores).unwrap();
        let chain = MultiHashChain::with_stages(2, 0.5).unwrap();
        assert_eq!(chain.apply(set), vec![1, 3, 0]);
    }

    #[test]
    fn prefix_keeps_leading_stages() {
        let chain = MultiHashChain::with_stages(5, 0.6).unwrap();
        let head = chain.prefix(2).unwrap();
        assert_eq!(head.len(), 2);
        assert_eq!(head.stages(), &chain.stages()[..2]);
        assert_eq!(chain.prefix(9).unwrap().len(), 5);
        assert_eq!(chain.prefix(0).unwrap_err(), HashNmsError::InvalidStageCount);
    }

    #[test]
    fn empty_input_passes_through_all_stages() {
        let chain = MultiHashChain::with_stages(3, 0.5).unwrap();
        assert!(chain.apply(BoxSet::empty()).is_empty());
        assert_eq!(chain.apply_batch(&[BoxSet::empty(), BoxSet::empty()]).len(), 2);
    }
}
