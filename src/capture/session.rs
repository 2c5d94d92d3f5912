use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::assets::media::{MIX_SAMPLE_RATE, resolve_audio};
use crate::audio::graph::{AudioGraph, CaptureStream};
use crate::audio::mix::frame_to_sample;
use crate::capture::clock::{Clock, RepaintLoop, SystemClock};
use crate::compose::animated::{AnimatedCompositor, CompositorState};
use crate::config::policy::CaptureConfig;
use crate::creative::metadata::AudioRef;
use crate::encode::sink::{AudioStreamConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{VitrineError, VitrineResult};

/// How frames are timed during capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pacing {
    /// Render as fast as possible. Output is deterministic.
    #[default]
    Offline,
    /// Push one frame per repaint tick on the wall clock.
    RealTime,
}

/// Stop request shared with whoever may tear the session down early.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an early stop. Capture flushes what it has and returns.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Whether the clip carries the soundtrack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioTrackStatus {
    /// The soundtrack was mixed in.
    Mixed,
    /// The clip is silent.
    Silent {
        /// Why no soundtrack was mixed.
        reason: String,
    },
}

/// One encoded clip.
#[derive(Clone, Debug)]
pub struct ClipArtifact {
    /// Container bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime: String,
    /// Frames captured.
    pub frames: u64,
    /// Capture frame rate.
    pub fps: Fps,
    /// Clip length (`frames / fps`).
    pub duration: Duration,
    /// Soundtrack status.
    pub audio: AudioTrackStatus,
    /// Whether capture was stopped before the full loop.
    pub truncated: bool,
}

/// Records one loop of an [`AnimatedCompositor`] into a [`FrameSink`].
///
/// The session samples the same compositor the repaint loop draws, reading times from one clock.
pub struct CaptureSession<'a> {
    compositor: &'a mut AnimatedCompositor,
    config: CaptureConfig,
    pacing: Pacing,
    clock: Arc<dyn Clock>,
    cancel: CancelToken,
}

impl<'a> CaptureSession<'a> {
    /// Offline session on the system clock.
    pub fn new(compositor: &'a mut AnimatedCompositor, config: &CaptureConfig) -> Self {
        Self {
            compositor,
            config: config.clone(),
            pacing: Pacing::Offline,
            clock: Arc::new(SystemClock::new()),
            cancel: CancelToken::new(),
        }
    }

    /// Use `pacing`.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Read times from `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Stop early when `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Frames in a full capture: `round((total - guard) * fps)`.
    pub fn frame_count(&self) -> u64 {
        let total = self.compositor.total_duration();
        let span = total.saturating_sub(Duration::from_millis(self.config.guard_ms));
        self.config.fps.duration_to_frames_round(span)
    }

    /// Capture one loop, starting from segment 0.
    ///
    /// An unresolvable soundtrack is not fatal: the clip is recorded silent and flagged.
    #[tracing::instrument(skip_all, fields(fps = self.config.fps.as_f64(), pacing = ?self.pacing))]
    pub fn capture(
        &mut self,
        audio: &AudioRef,
        sink: &mut dyn FrameSink,
    ) -> VitrineResult<ClipArtifact> {
        if self.compositor.state() != CompositorState::Playing {
            return Err(VitrineError::validation(format!(
                "capture requires a playing compositor (state {:?})",
                self.compositor.state()
            )));
        }

        let fps = self.config.fps;
        let frames = self.frame_count();
        let origin = self.clock.now();
        self.compositor.restart(origin)?;

        let (mut graph, status) = match self.build_audio(audio) {
            Ok((graph, stream)) => (Some((graph, stream)), AudioTrackStatus::Mixed),
            Err(reason) => (None, AudioTrackStatus::Silent { reason }),
        };

        let canvas = self.compositor.canvas();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
            video_bitrate: self.config.video_bitrate,
            container: self.config.container,
            audio: graph.as_ref().map(|_| AudioStreamConfig {
                sample_rate: MIX_SAMPLE_RATE,
                channels: 2,
            }),
        })?;

        let mut repaint = match self.pacing {
            Pacing::Offline => None,
            Pacing::RealTime => Some(RepaintLoop::start(fps.frame_start(1))),
        };

        let mut captured = 0u64;
        let mut truncated = false;
        for i in 0..frames {
            if self.cancel.is_cancelled() {
                truncated = true;
                break;
            }
            if let Some(repaint) = repaint.as_ref()
                && repaint.wait_tick().is_none()
            {
                truncated = true;
                break;
            }

            let t = origin + fps.frame_start(i);
            let step = (|| -> VitrineResult<()> {
                let frame = self.compositor.render_at(t)?;
                sink.push_frame(FrameIndex(i), &frame)?;
                if let Some((graph, stream)) = graph.as_mut() {
                    let n = frame_to_sample(i + 1, fps, MIX_SAMPLE_RATE)
                        - frame_to_sample(i, fps, MIX_SAMPLE_RATE);
                    graph.render(n as usize);
                    sink.push_audio(&stream.drain())?;
                }
                Ok(())
            })();
            if let Err(e) = step {
                tracing::warn!(frame = i, error = %e, "capture failed, aborting sink");
                sink.abort();
                if let Some((graph, _stream)) = graph.take() {
                    graph.release();
                }
                return Err(e);
            }
            captured += 1;
        }

        if let Some(repaint) = repaint.as_mut() {
            repaint.cancel();
        }
        if let Some((graph, _stream)) = graph.take() {
            graph.release();
        }

        let out = sink.end()?;
        let duration = fps.frame_start(captured);
        tracing::info!(
            frames = captured,
            duration_ms = duration.as_millis() as u64,
            bytes = out.bytes.len(),
            truncated,
            "capture complete"
        );
        Ok(ClipArtifact {
            bytes: out.bytes,
            mime: out.mime,
            frames: captured,
            fps,
            duration,
            audio: status,
            truncated,
        })
    }

    fn build_audio(&self, audio: &AudioRef) -> Result<(AudioGraph, CaptureStream), String> {
        let pcm = match resolve_audio(audio) {
            Ok(Some(pcm)) => pcm,
            Ok(None) => {
                tracing::debug!("no soundtrack requested, capturing silent");
                return Err("no soundtrack".to_owned());
            }
            Err(e) => {
                tracing::warn!(error = %e, "soundtrack unavailable, capturing silent");
                return Err(e.to_string());
            }
        };
        match AudioGraph::new(pcm, self.config.gain) {
            Ok((graph, stream, _levels)) => Ok((graph, stream)),
            Err(e) => {
                tracing::warn!(error = %e, "audio graph failed, capturing silent");
                Err(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/session.rs"]
mod tests;
