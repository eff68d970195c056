use crate::value::{DType, Device, ValueKind};
use thiserror::Error;

/// Errors raised by tree and payload operations.
///
/// All errors are raised synchronously at the point of detection; nothing is
/// retried or recovered internally, and no partial results are returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Operations that pair leaves across trees (reduce, zip, unzip, cat,
    /// stack) need every tree, or every leaf shape, to agree.
    #[error("tree topologies do not match: {0}")]
    TopologyMismatch(String),

    /// An operation requiring one uniform leaf kind found mixed kinds.
    #[error("leaves have inconsistent kinds: expected {expected:?}, found {found:?}")]
    InconsistentType {
        /// The kind of the first leaf.
        expected: ValueKind,
        /// The first differing kind.
        found: ValueKind,
    },

    /// The operation does not support this payload representation.
    #[error("unsupported payload for `{op}`: {kind:?}")]
    UnsupportedPayload {
        /// The operation that rejected the payload.
        op: &'static str,
        /// The payload representation found.
        kind: ValueKind,
    },

    /// `cat`, `stack` and `split` only operate along the batch dimension.
    #[error("only dim 0 is supported, got dim {0}")]
    NotImplementedDim(usize),

    /// `split` needs at least one row per chunk.
    #[error("split size must be non-zero")]
    ZeroSplitSize,

    /// Leaves combined into one buffer must share a dtype.
    #[error("leaf dtypes do not match: expected {expected:?}, found {found:?}")]
    DTypeMismatch {
        /// The dtype of the first leaf.
        expected: DType,
        /// The first differing dtype.
        found: DType,
    },

    /// Tensors combined into one tensor must live on the same device.
    #[error("tensor devices do not match: expected {expected:?}, found {found:?}")]
    DeviceMismatch {
        /// The device of the first tensor.
        expected: Device,
        /// The first differing device.
        found: Device,
    },

    /// A row index past the end of the batch dimension.
    #[error("row index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The dim-0 length that was indexed.
        len: usize,
    },
}
