//! Still and animated composition.

/// Looping reels compositor.
pub mod animated;
/// Listing overlay layout.
pub mod overlay;
/// Cover and contain placement math.
pub mod placement;
/// Feed still composer.
pub mod still;
