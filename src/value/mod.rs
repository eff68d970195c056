mod array;
mod base;
mod element;
mod index;
mod ops;
mod shape;
mod tensor;

pub use array::*;
pub use base::*;
pub use element::*;
pub use index::*;
pub use shape::*;
pub use tensor::*;
