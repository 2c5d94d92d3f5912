use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::decode::{DecodedAsset, decode_image};
use crate::foundation::error::{VitrineError, VitrineResult};
use crate::timeline::model::{AssetSource, EntryId, Timeline, TimelineEntry};

/// Decoded assets for one timeline, indexed like its entries.
///
/// `None` slots are entries with no bound source; composers draw a placeholder for them.
#[derive(Clone, Debug, Default)]
pub struct AssetSet {
    ids: Vec<EntryId>,
    assets: Vec<Option<Arc<DecodedAsset>>>,
}

impl AssetSet {
    /// Asset for entry `index`, if one was bound.
    pub fn get(&self, index: usize) -> Option<&Arc<DecodedAsset>> {
        self.assets.get(index).and_then(Option::as_ref)
    }

    /// Asset for the entry with `id`, if one was bound.
    pub fn by_id(&self, id: &EntryId) -> Option<&Arc<DecodedAsset>> {
        let i = self.ids.iter().position(|x| x == id)?;
        self.get(i)
    }

    /// Number of slots (equals the timeline length).
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the set has no slots.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Number of slots holding a decoded asset.
    pub fn bound_count(&self) -> usize {
        self.assets.iter().filter(|a| a.is_some()).count()
    }

    pub(crate) fn slots(&self) -> &[Option<Arc<DecodedAsset>>] {
        &self.assets
    }
}

/// Decode every entry of `timeline` concurrently.
///
/// Returns only once all entries have resolved. If any decode fails, the error names the first
/// failing entry in timeline order and no decoded asset is returned.
#[tracing::instrument(skip(timeline), fields(entries = timeline.len()))]
pub fn load_assets(timeline: &Timeline) -> VitrineResult<AssetSet> {
    let results: Vec<VitrineResult<Option<Arc<DecodedAsset>>>> = timeline
        .entries()
        .par_iter()
        .map(load_entry)
        .collect();

    let mut assets = Vec::with_capacity(results.len());
    for r in results {
        assets.push(r?);
    }

    let set = AssetSet {
        ids: timeline.entries().iter().map(|e| e.id.clone()).collect(),
        assets,
    };
    tracing::debug!(bound = set.bound_count(), "assets decoded");
    Ok(set)
}

fn load_entry(entry: &TimelineEntry) -> VitrineResult<Option<Arc<DecodedAsset>>> {
    let decoded = match &entry.source {
        AssetSource::Unbound => return Ok(None),
        AssetSource::Bytes(bytes) => decode_image(bytes),
        AssetSource::Path(path) => match std::fs::read(path) {
            Ok(bytes) => decode_image(&bytes),
            Err(e) => {
                return Err(VitrineError::asset_decode(
                    entry.id.as_str(),
                    format!("failed to read '{}': {e}", path.display()),
                ));
            }
        },
    };
    decoded
        .map(|a| Some(Arc::new(a)))
        .map_err(|e| VitrineError::asset_decode(entry.id.as_str(), e))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
