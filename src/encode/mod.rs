//! Encoding sinks.
//!
//! Sinks consume captured frames and PCM in order and return one encoded artifact.

/// `ffmpeg`-based sink (WebM or MP4 via the system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and the [`FrameLog`](sink::FrameLog) recorder.
pub mod sink;
