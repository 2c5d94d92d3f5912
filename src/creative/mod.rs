//! Listing metadata, collaborator seams and project files.

/// Seams to the text extractor, caption generator and publisher.
pub mod collab;
/// Listing metadata and defaults.
pub mod metadata;
/// JSON project files.
pub mod project;
