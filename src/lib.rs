#![warn(missing_docs)]

//! Recursive nested-tuple containers ("TupleLeaf" trees) for numeric array
//! data. A tree is an ordered group of children where every child is either
//! another group or a leaf payload, so nested batches of arrays and tensors
//! can be mapped, reduced, zipped, flattened, concatenated and split as a
//! single value.
//!
//! ```
//! use tupleleaf::tuplefy;
//!
//! let data = tuplefy![1, [2, 3], 4];
//! assert_eq!(data.levels(), tuplefy![0, [1, 1], 0]);
//! assert_eq!(data.flatten(), tuplefy![1, 2, 3, 4]);
//!
//! let summed = data.repeat(3).reduce(|acc, x| acc + x).unwrap();
//! assert_eq!(summed, tuplefy![3, [6, 9], 12].into());
//! ```

#[macro_use]
extern crate derive_new;

mod error;

/// Dataset and dataloader boundary for mini-batch iteration over trees.
pub mod data;

/// The tree container and its structural algorithms.
pub mod tree;

/// Numeric leaf payloads and the operations over trees of them.
pub mod value;

pub use error::*;
pub use tree::*;
pub use value::*;
