mod base;
mod iterator;
mod partial;
mod tree;

pub use base::*;
pub use iterator::*;
pub use partial::*;
pub use tree::*;
