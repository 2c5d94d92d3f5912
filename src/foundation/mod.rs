//! Core value types and the crate error.

/// Frame rate, canvas, colors and geometry re-exports.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;
