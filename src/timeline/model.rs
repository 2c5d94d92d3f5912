use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::policy::TimingPolicy;
use crate::foundation::error::{VitrineError, VitrineResult};

/// Kind of a timeline entry. Each kind has a fixed on-screen duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A listing photograph. Overlay text is drawn over photos only.
    Photo,
    /// Opening cover art (reels only, first position).
    Cover,
    /// Closing/contact art (last position).
    Closing,
}

impl EntryKind {
    /// Duration of a segment of this kind under `timing`, in milliseconds.
    pub fn duration_ms(self, timing: &TimingPolicy) -> u64 {
        match self {
            EntryKind::Photo => timing.photo_ms,
            EntryKind::Cover => timing.cover_ms,
            EntryKind::Closing => timing.closing_ms,
        }
    }
}

/// Opaque entry identifier, unique within a timeline and stable across reorders.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Where the pixels of an entry come from.
#[derive(Clone, Debug, Default)]
pub enum AssetSource {
    /// No asset bound. Composers substitute a deterministic placeholder.
    #[default]
    Unbound,
    /// Encoded image bytes already in memory.
    Bytes(Arc<Vec<u8>>),
    /// Encoded image file on disk.
    Path(PathBuf),
}

impl AssetSource {
    /// Whether a source is bound.
    pub fn is_bound(&self) -> bool {
        !matches!(self, AssetSource::Unbound)
    }
}

/// One typed, ordered unit of visual content.
#[derive(Clone, Debug)]
pub struct TimelineEntry {
    /// Stable identifier.
    pub id: EntryId,
    /// Entry kind.
    pub kind: EntryKind,
    /// Image source.
    pub source: AssetSource,
}

impl TimelineEntry {
    /// Build an entry.
    pub fn new(id: impl Into<String>, kind: EntryKind, source: AssetSource) -> Self {
        Self {
            id: EntryId(id.into()),
            kind,
            source,
        }
    }
}

/// Output format a timeline is laid out for. Decides placement rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineFormat {
    /// Portrait carousel stills. Covers are not allowed.
    Feed,
    /// Tall animated clip.
    Reels,
}

/// Direction for [`Timeline::move_entry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    /// Toward index 0.
    Left,
    /// Toward the end.
    Right,
}

/// Validated, ordered sequence of entries with derived segment timing.
///
/// A `Timeline` is immutable: [`Timeline::reorder`] and [`Timeline::move_entry`] return a new
/// value and leave `self` untouched on both success and failure.
#[derive(Clone, Debug)]
pub struct Timeline {
    format: TimelineFormat,
    timing: TimingPolicy,
    entries: Vec<TimelineEntry>,
    // starts_ms[i] = sum of durations before i; one extra trailing element holds the total.
    starts_ms: Vec<u64>,
}

impl Timeline {
    /// Validate placement rules and derive segment timing.
    pub fn new(
        format: TimelineFormat,
        entries: Vec<TimelineEntry>,
        timing: TimingPolicy,
    ) -> VitrineResult<Self> {
        timing.validate()?;
        check_placement(format, &entries)?;

        let mut starts_ms = Vec::with_capacity(entries.len() + 1);
        let mut acc = 0u64;
        starts_ms.push(acc);
        for e in &entries {
            acc = acc.saturating_add(e.kind.duration_ms(&timing));
            starts_ms.push(acc);
        }

        Ok(Self {
            format,
            timing,
            entries,
            starts_ms,
        })
    }

    /// Default feed carousel: photos `img-{i}` followed by an optional closing `feed-closing`.
    pub fn feed(
        photos: impl IntoIterator<Item = AssetSource>,
        closing: Option<AssetSource>,
        timing: TimingPolicy,
    ) -> VitrineResult<Self> {
        let mut entries: Vec<TimelineEntry> = photos
            .into_iter()
            .enumerate()
            .map(|(i, src)| TimelineEntry::new(format!("img-{i}"), EntryKind::Photo, src))
            .collect();
        if let Some(src) = closing {
            entries.push(TimelineEntry::new("feed-closing", EntryKind::Closing, src));
        }
        Self::new(TimelineFormat::Feed, entries, timing)
    }

    /// Default reels sequence: `reels-cover`, photos `img-r-{i}`, `reels-closing`.
    pub fn reels(
        cover: Option<AssetSource>,
        photos: impl IntoIterator<Item = AssetSource>,
        closing: Option<AssetSource>,
        timing: TimingPolicy,
    ) -> VitrineResult<Self> {
        let mut entries = Vec::new();
        if let Some(src) = cover {
            entries.push(TimelineEntry::new("reels-cover", EntryKind::Cover, src));
        }
        entries.extend(
            photos
                .into_iter()
                .enumerate()
                .map(|(i, src)| TimelineEntry::new(format!("img-r-{i}"), EntryKind::Photo, src)),
        );
        if let Some(src) = closing {
            entries.push(TimelineEntry::new("reels-closing", EntryKind::Closing, src));
        }
        Self::new(TimelineFormat::Reels, entries, timing)
    }

    /// Require the bookend arts a complete creative needs: a closing for feed, a cover and a
    /// closing for reels.
    pub fn require_bookends(&self) -> VitrineResult<()> {
        let first = self.entries.first().map(|e| e.kind);
        let last = self.entries.last().map(|e| e.kind);
        if self.format == TimelineFormat::Reels && first != Some(EntryKind::Cover) {
            return Err(VitrineError::invariant("reels timeline requires a cover art"));
        }
        if last != Some(EntryKind::Closing) {
            return Err(VitrineError::invariant(format!(
                "{} timeline requires a closing art",
                match self.format {
                    TimelineFormat::Feed => "feed",
                    TimelineFormat::Reels => "reels",
                }
            )));
        }
        Ok(())
    }

    /// Swap the entries at `from` and `to`, returning the reordered timeline.
    ///
    /// Fails with [`VitrineError::OutOfRange`] when either index is outside `[0, len)`, and with
    /// [`VitrineError::InvariantViolation`] when the swap would break a placement rule.
    pub fn reorder(&self, from: usize, to: usize) -> VitrineResult<Self> {
        let len = self.entries.len();
        if from >= len || to >= len {
            return Err(VitrineError::OutOfRange { from, to, len });
        }
        let mut entries = self.entries.clone();
        entries.swap(from, to);
        Self::new(self.format, entries, self.timing)
    }

    /// Swap the entry at `index` with its neighbour in `dir`.
    ///
    /// Moving the first entry left reports `to = usize::MAX`.
    pub fn move_entry(&self, index: usize, dir: MoveDirection) -> VitrineResult<Self> {
        let to = match dir {
            MoveDirection::Left => index.checked_sub(1).unwrap_or(usize::MAX),
            MoveDirection::Right => index.saturating_add(1),
        };
        self.reorder(index, to)
    }

    /// Layout format.
    pub fn format(&self) -> TimelineFormat {
        self.format
    }

    /// Timing policy the durations were derived from.
    pub fn timing(&self) -> &TimingPolicy {
        &self.timing
    }

    /// Entries in order.
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Entry at `index`.
    pub fn entry(&self, index: usize) -> Option<&TimelineEntry> {
        self.entries.get(index)
    }

    /// Number of entries (always at least one).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; empty timelines are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Duration of segment `index` in milliseconds.
    pub fn segment_duration_ms(&self, index: usize) -> u64 {
        match (self.starts_ms.get(index), self.starts_ms.get(index + 1)) {
            (Some(a), Some(b)) => b - a,
            _ => 0,
        }
    }

    /// Start offset of segment `index` in milliseconds.
    pub fn segment_start_ms(&self, index: usize) -> u64 {
        self.starts_ms.get(index).copied().unwrap_or(self.total_duration_ms())
    }

    /// Sum of all segment durations, in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.starts_ms.last().copied().unwrap_or(0)
    }

    /// Sum of all segment durations.
    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.total_duration_ms())
    }

    pub(crate) fn starts_ms(&self) -> &[u64] {
        &self.starts_ms
    }
}

fn check_placement(format: TimelineFormat, entries: &[TimelineEntry]) -> VitrineResult<()> {
    if entries.is_empty() {
        return Err(VitrineError::invariant("timeline must contain at least one entry"));
    }

    let mut seen = std::collections::HashSet::with_capacity(entries.len());
    for e in entries {
        if e.id.0.is_empty() {
            return Err(VitrineError::invariant("entry ids must be non-empty"));
        }
        if !seen.insert(e.id.as_str()) {
            return Err(VitrineError::invariant(format!(
                "duplicate entry id '{}'",
                e.id
            )));
        }
    }

    let last = entries.len() - 1;
    for (i, e) in entries.iter().enumerate() {
        match e.kind {
            EntryKind::Photo => {}
            EntryKind::Cover => {
                if format == TimelineFormat::Feed {
                    return Err(VitrineError::invariant(format!(
                        "feed timeline must not contain a cover (entry '{}')",
                        e.id
                    )));
                }
                if i != 0 {
                    return Err(VitrineError::invariant(format!(
                        "cover '{}' must be the first entry (found at {i})",
                        e.id
                    )));
                }
            }
            EntryKind::Closing => {
                if i != last {
                    return Err(VitrineError::invariant(format!(
                        "closing '{}' must be the last entry (found at {i})",
                        e.id
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
