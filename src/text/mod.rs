//! Font loading, measurement and shrink-to-fit.

/// Parley-backed text engine and the [`TextMeasure`](engine::TextMeasure) seam.
pub mod engine;
