//! Error types for hashnms.

use thiserror::Error;

/// Result alias for hashnms operations.
pub type Result<T> = std::result::Result<T, HashNmsError>;

/// Errors that can occur when running suppression primitives.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HashNmsError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Boxes and scores do not pair up index-for-index.
    #[error("length mismatch: {boxes} boxes but {scores} scores")]
    LengthMismatch { boxes: usize, scores: usize },
    /// A flat box buffer does not hold whole `(x, y, w, h)` rows.
    #[error("flat box buffer of length {len} is not a multiple of 4")]
    BufferShape { len: usize },
    /// A multi-hash chain needs at least one stage.
    #[error("multi-hash chain requires at least one stage")]
    InvalidStageCount,
    /// An index is outside the valid range.
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}
