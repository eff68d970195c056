/// Dataloaders yielding mini-batch trees.
pub mod dataloader;

/// Datasets over trees of numeric payloads.
pub mod dataset;

pub use dataloader::*;
pub use dataset::*;
