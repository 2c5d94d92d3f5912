//! Mapping from playback time to the active segment and cross-fade state.
//!
//! This is the single timing law shared by the repaint loop and the capture session. It is a pure
//! function of the timeline and an elapsed time, independent of where ticks come from.

use std::time::Duration;

use crate::timeline::model::Timeline;

/// The segment fading in underneath the active one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IncomingSegment {
    /// Index of the next segment.
    pub index: usize,
    /// Opacity of the next segment, `1 - current opacity`.
    pub opacity: f32,
}

/// State of the timeline at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSample {
    /// Active segment index.
    pub index: usize,
    /// Milliseconds since the active segment started.
    pub offset_ms: f64,
    /// `offset / duration`, in `[0, 1)`.
    pub progress: f64,
    /// Opacity of the active segment. Below 1 only inside a transition window.
    pub opacity: f32,
    /// Next segment while cross-fading. Never set for the last segment.
    pub incoming: Option<IncomingSegment>,
}

/// Wrap time since the playback origin into one loop iteration, in milliseconds.
pub fn loop_elapsed_ms(since_origin: Duration, total_ms: u64) -> f64 {
    if total_ms == 0 {
        return 0.0;
    }
    let ms = since_origin.as_secs_f64() * 1000.0;
    ms.rem_euclid(total_ms as f64)
}

/// Locate the active segment at `elapsed_ms` (already wrapped into `[0, total)`).
pub fn sample_at(timeline: &Timeline, elapsed_ms: f64) -> SegmentSample {
    let starts = timeline.starts_ms();
    let n = timeline.len();
    let total = timeline.total_duration_ms() as f64;
    let t = elapsed_ms.clamp(0.0, total.max(0.0));

    // Last segment whose start is <= t. `starts` is sorted, so partition_point finds it.
    let index = starts[..n]
        .partition_point(|&s| (s as f64) <= t)
        .saturating_sub(1);

    let start = starts[index] as f64;
    let duration = timeline.segment_duration_ms(index) as f64;
    let offset_ms = (t - start).max(0.0);
    let progress = if duration > 0.0 {
        (offset_ms / duration).min(1.0)
    } else {
        0.0
    };

    let transition = timeline.timing().transition_ms as f64;
    let remaining = duration - offset_ms;
    let (opacity, incoming) = if index + 1 < n && transition > 0.0 && remaining <= transition {
        let current = (remaining / transition).clamp(0.0, 1.0) as f32;
        (
            current,
            Some(IncomingSegment {
                index: index + 1,
                opacity: 1.0 - current,
            }),
        )
    } else {
        (1.0, None)
    };

    SegmentSample {
        index,
        offset_ms,
        progress,
        opacity,
        incoming,
    }
}

/// Convenience: wrap `since_origin` and sample.
pub fn sample_since_origin(timeline: &Timeline, since_origin: Duration) -> SegmentSample {
    sample_at(
        timeline,
        loop_elapsed_ms(since_origin, timeline.total_duration_ms()),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/schedule.rs"]
mod tests;
