//! CPU rasterization (vello_cpu) and image filters.

/// Color normalization and letterbox backdrops.
pub mod adjust;
/// Frame type and PNG encoding.
pub mod backend;
pub(crate) mod cpu;
