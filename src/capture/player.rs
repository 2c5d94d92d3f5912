//! Continuous playback: a compositor driven by its own repaint loop.

use std::sync::Arc;
use std::time::Duration;

use crate::capture::clock::{Clock, RepaintLoop, SystemClock};
use crate::compose::animated::{AnimatedCompositor, CompositorState};
use crate::foundation::core::Fps;
use crate::foundation::error::{VitrineError, VitrineResult};
use crate::render::backend::FrameRGBA;

/// Owns a playing compositor and the repaint registration that drives it.
///
/// At most one repaint loop is alive at a time. `restart` and `teardown` stop and join the
/// current loop before anything else happens, so ticks from an earlier registration never reach
/// the new one.
pub struct Player {
    compositor: AnimatedCompositor,
    clock: Arc<dyn Clock>,
    interval: Duration,
    repaint: Option<RepaintLoop>,
}

impl Player {
    /// Start playing `compositor`, repainting once per frame of `fps`.
    ///
    /// The compositor must already be `Playing`; its origin is reset to the clock's now.
    pub fn start(compositor: AnimatedCompositor, fps: Fps) -> VitrineResult<Self> {
        Self::with_clock(compositor, fps, Arc::new(SystemClock::new()))
    }

    /// Like [`Player::start`], reading time from `clock`.
    pub fn with_clock(
        mut compositor: AnimatedCompositor,
        fps: Fps,
        clock: Arc<dyn Clock>,
    ) -> VitrineResult<Self> {
        compositor.restart(clock.now())?;
        let interval = fps.frame_start(1);
        Ok(Self {
            compositor,
            clock,
            interval,
            repaint: Some(RepaintLoop::start(interval)),
        })
    }

    /// The driven compositor.
    pub fn compositor(&self) -> &AnimatedCompositor {
        &self.compositor
    }

    /// Whether a repaint loop is registered.
    pub fn is_ticking(&self) -> bool {
        self.repaint.as_ref().is_some_and(|r| !r.is_cancelled())
    }

    /// Wait for the next repaint tick and render the frame for the clock's now.
    ///
    /// `None` once torn down.
    pub fn next_frame(&mut self) -> VitrineResult<Option<FrameRGBA>> {
        let Some(repaint) = self.repaint.as_ref() else {
            return Ok(None);
        };
        if repaint.wait_tick().is_none() {
            return Ok(None);
        }
        self.compositor.render_at(self.clock.now()).map(Some)
    }

    /// Take the tick pending on the current registration, if any, without blocking.
    pub fn take_pending_tick(&self) -> Option<u64> {
        self.repaint.as_ref().and_then(RepaintLoop::try_tick)
    }

    /// Restart the loop at segment 0 with a fresh repaint registration.
    pub fn restart(&mut self) -> VitrineResult<()> {
        if self.compositor.state() != CompositorState::Playing {
            return Err(VitrineError::validation(
                "cannot restart a player whose compositor is not playing",
            ));
        }
        self.cancel_repaint();
        self.compositor.restart(self.clock.now())?;
        self.repaint = Some(RepaintLoop::start(self.interval));
        tracing::debug!("player restarted");
        Ok(())
    }

    /// Stop repainting and tear the compositor down. Idempotent.
    pub fn teardown(&mut self) {
        self.cancel_repaint();
        self.compositor.teardown();
    }

    fn cancel_repaint(&mut self) {
        if let Some(mut repaint) = self.repaint.take() {
            repaint.cancel();
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.cancel_repaint();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/player.rs"]
mod tests;
