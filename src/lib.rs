//! HashNMS is a CPU box-suppression library for object-detection pipelines.
//!
//! It provides exact greedy NMS, a hashed approximate variant (HNMS) that
//! buckets boxes by position and scale instead of comparing them pairwise,
//! and a multi-hash chain that composes several HNMS grids with growing cell
//! sizes and shifted offsets. Boxes are `(x, y, w, h)` with `(x, y)` at the
//! center. Parallel bucket reduction is available via the `rayon` feature and
//! spans/events via the `tracing` feature.

mod candidate;
pub mod chain;
pub mod geometry;
pub mod hash;
pub mod lowlevel;
pub mod nms;
pub mod stage;
mod trace;
pub mod util;

pub use chain::{ChainConfig, MultiHashChain};
pub use geometry::{iou, BoxSet, OwnedBoxSet, Rect};
pub use hash::{hnms, hnms_with_params, HashGridConfig};
pub use nms::{nms, nms_slices};
pub use stage::SingleHashStage;
pub use util::{HashNmsError, HashNmsResult};
