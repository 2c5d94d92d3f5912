//! Capture audio graph.
//!
//! Samples are pulled per video frame, so audio and video stay aligned from the first frame.

/// Source, gain, splitter and outputs.
pub mod graph;
pub(crate) mod mix;
