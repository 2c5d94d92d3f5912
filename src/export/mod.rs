//! Batch export of feed stills.

/// Concurrent still rendering and zip bundling.
pub mod batch;
