mod algorithm;
mod base;
mod construct;

pub use base::*;
pub use construct::*;
