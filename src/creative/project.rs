use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::policy::TimingPolicy;
use crate::creative::metadata::{AudioRef, CreativeMetadata};
use crate::foundation::error::{VitrineError, VitrineResult};
use crate::timeline::model::{
    AssetSource, EntryKind, Timeline, TimelineEntry, TimelineFormat,
};

/// One entry of a project file. `source` is relative to the project directory.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProjectEntry {
    /// Stable entry id.
    pub id: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Image path. Missing means "unbound" (placeholder).
    #[serde(default)]
    pub source: Option<String>,
}

/// A creative as stored on disk: listing metadata plus both sequences.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CreativeProject {
    /// Listing fields.
    pub metadata: CreativeMetadata,
    /// Soundtrack path for the reels clip.
    pub audio: Option<String>,
    /// Feed carousel entries.
    pub feed: Vec<ProjectEntry>,
    /// Reels entries.
    pub reels: Vec<ProjectEntry>,
    #[serde(skip)]
    root: PathBuf,
}

impl CreativeProject {
    /// Parse a project from JSON. Relative sources resolve against `root`.
    pub fn from_json_str(s: &str, root: impl Into<PathBuf>) -> VitrineResult<Self> {
        let mut p: Self =
            serde_json::from_str(s).map_err(|e| VitrineError::serde(e.to_string()))?;
        p.root = root.into();
        Ok(p)
    }

    /// Read a project file. Sources resolve against the file's directory.
    pub fn from_path(path: &Path) -> VitrineResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read project file '{}'", path.display()))?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_json_str(&s, root)
    }

    /// Directory that relative sources resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Metadata with stock defaults filled in and the soundtrack resolved.
    pub fn resolved_metadata(&self) -> VitrineResult<CreativeMetadata> {
        let mut m = self.metadata.clone().with_defaults();
        m.audio = match self.audio.as_deref() {
            Some(rel) => AudioRef::Path(self.root.join(normalize_rel_path(rel)?)),
            None => AudioRef::None,
        };
        Ok(m)
    }

    /// Build the feed timeline. The closing art is required.
    pub fn feed_timeline(&self, timing: TimingPolicy) -> VitrineResult<Timeline> {
        let t = Timeline::new(TimelineFormat::Feed, self.entries(&self.feed)?, timing)?;
        t.require_bookends()?;
        Ok(t)
    }

    /// Build the reels timeline. Cover and closing arts are required.
    pub fn reels_timeline(&self, timing: TimingPolicy) -> VitrineResult<Timeline> {
        let t = Timeline::new(TimelineFormat::Reels, self.entries(&self.reels)?, timing)?;
        t.require_bookends()?;
        Ok(t)
    }

    fn entries(&self, list: &[ProjectEntry]) -> VitrineResult<Vec<TimelineEntry>> {
        list.iter()
            .map(|e| {
                let source = match e.source.as_deref() {
                    Some(rel) => AssetSource::Path(self.root.join(normalize_rel_path(rel)?)),
                    None => AssetSource::Unbound,
                };
                Ok(TimelineEntry::new(e.id.clone(), e.kind, source))
            })
            .collect()
    }
}

/// Normalize a project-relative path.
///
/// Uses `/` separators, drops `.` segments, and rejects absolute paths and `..` traversal.
pub(crate) fn normalize_rel_path(source: &str) -> VitrineResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(VitrineError::validation("project paths must be relative"));
    }
    if s.is_empty() {
        return Err(VitrineError::validation("project path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(VitrineError::validation(
                "project paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(VitrineError::validation(
            "project path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/creative/project.rs"]
mod tests;
