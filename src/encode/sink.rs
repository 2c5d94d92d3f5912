use crate::config::policy::Container;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{VitrineError, VitrineResult};
use crate::foundation::math::fnv1a64;
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] when capture starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Target video bitrate in bits per second.
    pub video_bitrate: u64,
    /// Output container.
    pub container: Container,
    /// Audio stream layout, when the clip carries sound.
    pub audio: Option<AudioStreamConfig>,
}

/// Layout of PCM passed to [`FrameSink::push_audio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioStreamConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

/// Finished clip bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedOutput {
    /// Container bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime: String,
}

/// Sink contract for consuming captured frames and audio as one multiplexed stream.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order. Audio for
/// a frame is pushed right after that frame, so both streams start together.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> VitrineResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> VitrineResult<()>;
    /// Push interleaved PCM covering the most recent frame.
    fn push_audio(&mut self, samples: &[f32]) -> VitrineResult<()> {
        let _ = samples;
        Ok(())
    }
    /// Flush everything into one artifact.
    fn end(&mut self) -> VitrineResult<EncodedOutput>;
    /// Abandon the stream after a failure, releasing whatever `begin` acquired. `end` is not
    /// called afterwards.
    fn abort(&mut self) {}
}

/// One frame as recorded by [`FrameLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LoggedFrame {
    /// Frame index.
    pub index: u64,
    /// FNV-1a hash of the pixels.
    pub fingerprint: u64,
}

/// Sink that records frame order, pixel fingerprints and audio sample counts instead of encoding.
///
/// `end` returns a JSON summary of what was received.
#[derive(Debug, Default)]
pub struct FrameLog {
    cfg: Option<SinkConfig>,
    frames: Vec<LoggedFrame>,
    audio_samples: usize,
    ended: bool,
}

#[derive(serde::Serialize)]
struct FrameLogSummary<'a> {
    width: u32,
    height: u32,
    fps: Fps,
    frames: &'a [LoggedFrame],
    audio_samples: usize,
}

impl FrameLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration received in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames in arrival order.
    pub fn frames(&self) -> &[LoggedFrame] {
        &self.frames
    }

    /// Total interleaved audio samples received.
    pub fn audio_samples(&self) -> usize {
        self.audio_samples
    }

    /// Whether `end` has been called.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for FrameLog {
    fn begin(&mut self, cfg: SinkConfig) -> VitrineResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.audio_samples = 0;
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> VitrineResult<()> {
        if self.cfg.is_none() {
            return Err(VitrineError::evaluation("frame log not started"));
        }
        if let Some(last) = self.frames.last()
            && idx.0 <= last.index
        {
            return Err(VitrineError::evaluation(
                "frame log received out-of-order frame index",
            ));
        }
        self.frames.push(LoggedFrame {
            index: idx.0,
            fingerprint: fnv1a64(&frame.data),
        });
        Ok(())
    }

    fn push_audio(&mut self, samples: &[f32]) -> VitrineResult<()> {
        self.audio_samples += samples.len();
        Ok(())
    }

    fn end(&mut self) -> VitrineResult<EncodedOutput> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| VitrineError::evaluation("frame log not started"))?;
        let summary = FrameLogSummary {
            width: cfg.width,
            height: cfg.height,
            fps: cfg.fps,
            frames: &self.frames,
            audio_samples: self.audio_samples,
        };
        let bytes = serde_json::to_vec(&summary).map_err(|e| VitrineError::serde(e.to_string()))?;
        self.ended = true;
        Ok(EncodedOutput {
            bytes,
            mime: "application/json".to_owned(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
