//! Low-level building blocks for custom suppression pipelines.
//!
//! Most users should prefer [`MultiHashChain`](crate::MultiHashChain) or the
//! top-level [`nms`](crate::nms) and [`hnms`](crate::hnms) functions. These
//! re-exports expose bucket keys and the parallel primitive for callers that
//! compose their own stages.

pub use crate::hash::{hash_code, HashCode, MIN_EXTENT};
#[cfg(feature = "rayon")]
pub use crate::hash::rayon::hnms_par;
