use std::io::{Cursor, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::assets::loader::AssetSet;
use crate::compose::still::StaticComposer;
use crate::creative::metadata::CreativeMetadata;
use crate::foundation::core::Canvas;
use crate::foundation::error::{VitrineError, VitrineResult};
use crate::text::engine::FontBook;
use crate::timeline::model::{EntryId, EntryKind, Timeline, TimelineFormat};

/// Default archive name for a feed carousel.
pub const DEFAULT_ZIP_NAME: &str = "carrossel_completo.zip";

/// One exported feed still.
#[derive(Clone, Debug)]
pub struct ExportedStill {
    /// Position in the carousel.
    pub index: usize,
    /// Timeline entry it was rendered from.
    pub entry_id: EntryId,
    /// `feed_{n}.png`, numbered from 1.
    pub file_name: String,
    /// Encoded PNG.
    pub png: Vec<u8>,
    /// Whether the call-to-action badge was drawn.
    pub has_cta: bool,
}

/// Every still of a feed carousel, in timeline order.
#[derive(Clone, Debug, Default)]
pub struct StillBatch {
    /// Stills in timeline order.
    pub stills: Vec<ExportedStill>,
}

impl StillBatch {
    /// Bundle all stills into one zip archive.
    pub fn to_zip(&self) -> VitrineResult<Vec<u8>> {
        let zip_err = |e: zip::result::ZipError| VitrineError::evaluation(format!("zip: {e}"));
        let mut zw = zip::ZipWriter::new(Cursor::new(Vec::new()));
        // PNG data is already deflated.
        let opts = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for still in &self.stills {
            zw.start_file(still.file_name.as_str(), opts).map_err(zip_err)?;
            zw.write_all(&still.png)
                .with_context(|| format!("write '{}' into zip", still.file_name))?;
        }
        Ok(zw.finish().map_err(zip_err)?.into_inner())
    }

    /// Write each still as its own file under `dir`.
    pub fn write_dir(&self, dir: &Path) -> VitrineResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output directory '{}'", dir.display()))?;
        self.stills
            .iter()
            .map(|s| {
                let path = dir.join(&s.file_name);
                std::fs::write(&path, &s.png)
                    .with_context(|| format!("write still '{}'", path.display()))?;
                Ok::<_, VitrineError>(path)
            })
            .collect()
    }
}

/// Render every entry of a feed timeline to PNG.
///
/// Entries are composed concurrently and collected by position. Only the first non-closing entry
/// gets the call-to-action badge. Any failure fails the whole batch.
#[tracing::instrument(skip_all, fields(entries = timeline.len()))]
pub fn export_feed_stills(
    timeline: &Timeline,
    assets: &AssetSet,
    metadata: &CreativeMetadata,
    canvas: Canvas,
    fonts: Option<&FontBook>,
) -> VitrineResult<StillBatch> {
    if timeline.format() != TimelineFormat::Feed {
        return Err(VitrineError::validation(
            "still export needs a feed timeline",
        ));
    }
    if assets.len() != timeline.len() {
        return Err(VitrineError::validation(format!(
            "asset set has {} slots, timeline has {} entries",
            assets.len(),
            timeline.len()
        )));
    }

    let first = timeline
        .entries()
        .iter()
        .position(|e| e.kind != EntryKind::Closing);

    let stills = timeline
        .entries()
        .par_iter()
        .enumerate()
        .map_init(
            || StaticComposer::new(canvas, fonts),
            |composer, (i, entry)| {
                let composer = composer.as_mut().map_err(|e| {
                    VitrineError::evaluation(format!("still composer init failed: {e}"))
                })?;
                let still = composer.compose(
                    entry,
                    i,
                    assets.get(i).map(|a| a.as_ref()),
                    metadata,
                    Some(i) == first,
                )?;
                Ok::<_, VitrineError>(ExportedStill {
                    index: i,
                    entry_id: entry.id.clone(),
                    file_name: format!("feed_{}.png", i + 1),
                    png: still.to_png()?,
                    has_cta: still.has_cta,
                })
            },
        )
        .collect::<VitrineResult<Vec<_>>>()?;

    tracing::debug!(stills = stills.len(), "feed stills exported");
    Ok(StillBatch { stills })
}

#[cfg(test)]
#[path = "../../tests/unit/export/batch.rs"]
mod tests;
