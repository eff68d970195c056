mod base;
mod batch;
mod builder;
mod multithread;
mod strategy;

pub use base::*;
pub use batch::*;
pub use builder::*;
pub use multithread::*;
pub use strategy::*;
