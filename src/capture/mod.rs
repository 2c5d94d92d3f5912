//! Playback and clip capture: clocks, the repaint loop, the player and the capture session.

/// Clocks and the repaint timer thread.
pub mod clock;
/// Continuous playback driven by a repaint loop.
pub mod player;
/// One-loop capture into a frame sink.
pub mod session;
