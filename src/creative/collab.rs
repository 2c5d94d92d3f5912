//! Boundaries to the external text-generation and publishing services.
//!
//! The engine never depends on these for rendering. They are traits so hosts can plug in whatever
//! client they use; the helpers here give the engine-side handling of their results.

use crate::creative::metadata::{CreativeMetadata, PartialMetadata};

/// Turns free text or a listing URL into structured fields.
pub trait MetadataExtractor {
    /// Extract whatever fields are recognizable. `None` means nothing usable was found.
    fn extract(&self, input: &str) -> Option<PartialMetadata>;
}

/// Post captions for the two outputs.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Captions {
    /// Caption for the feed carousel.
    pub feed: String,
    /// Caption for the reels clip.
    pub reels: String,
}

impl Captions {
    /// Stock captions used when generation fails.
    pub fn fallback() -> Self {
        Self {
            feed: "Oportunidade!".to_owned(),
            reels: "Veja!".to_owned(),
        }
    }

    /// Parse a generator's JSON response, falling back on malformed or empty output.
    pub fn from_response_json(text: &str) -> Self {
        serde_json::from_str::<Captions>(text)
            .ok()
            .filter(|c| !c.feed.trim().is_empty() || !c.reels.trim().is_empty())
            .unwrap_or_else(Self::fallback)
    }
}

/// Writes captions for a listing.
pub trait CaptionGenerator {
    /// Generate captions. `None` selects [`Captions::fallback`].
    fn generate(&self, metadata: &CreativeMetadata) -> Option<Captions>;
}

/// Result of a publish call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Whether the platform accepted the post.
    pub success: bool,
}

/// Posts a rendered image with a caption. No retries are attempted by the engine.
pub trait Publisher {
    /// Publish one image.
    fn publish(&self, image_png: &[u8], caption: &str) -> PublishOutcome;
}

/// Parse an extractor's JSON response. Malformed output counts as "nothing extracted".
pub fn parse_extraction_json(text: &str) -> Option<PartialMetadata> {
    serde_json::from_str::<PartialMetadata>(text)
        .ok()
        .filter(|p| *p != PartialMetadata::default())
}

/// Run `extractor` on `input` and merge the result. A `None` extraction returns an unchanged copy.
#[tracing::instrument(skip_all)]
pub fn apply_extraction(
    metadata: &CreativeMetadata,
    extractor: &dyn MetadataExtractor,
    input: &str,
) -> CreativeMetadata {
    match extractor.extract(input) {
        Some(partial) => metadata.merged(partial),
        None => {
            tracing::debug!("metadata extractor returned nothing; fields left unset");
            metadata.clone()
        }
    }
}

/// Generate captions, substituting the stock pair on failure.
pub fn captions_or_fallback(
    generator: &dyn CaptionGenerator,
    metadata: &CreativeMetadata,
) -> Captions {
    generator
        .generate(metadata)
        .unwrap_or_else(Captions::fallback)
}

#[cfg(test)]
#[path = "../../tests/unit/creative/collab.rs"]
mod tests;
