//! Image decoding, concurrent loading, placeholders and soundtrack resolution.

/// Image decoding into premultiplied RGBA8.
pub mod decode;
/// All-or-nothing concurrent asset loading.
pub mod loader;
/// Soundtrack PCM.
pub mod media;
/// Deterministic placeholder images.
pub mod placeholder;
