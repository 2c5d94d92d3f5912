use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::Fps;
use crate::foundation::error::{VitrineError, VitrineResult};

/// Per-kind segment durations and the cross-fade window, in milliseconds.
///
/// These are policy constants rather than derived values; tests substitute smaller numbers to run
/// fast without changing the timing algorithm.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingPolicy {
    /// On-screen time of a photo segment.
    pub photo_ms: u64,
    /// On-screen time of the opening cover art.
    pub cover_ms: u64,
    /// On-screen time of the closing/contact art.
    pub closing_ms: u64,
    /// Length of the cross-fade window at the end of each non-final segment.
    pub transition_ms: u64,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            photo_ms: 4_500,
            cover_ms: 3_500,
            closing_ms: 8_000,
            transition_ms: 700,
        }
    }
}

impl TimingPolicy {
    /// Reject zero-length segments and transitions longer than the shortest segment.
    pub fn validate(&self) -> VitrineResult<()> {
        if self.photo_ms == 0 || self.cover_ms == 0 || self.closing_ms == 0 {
            return Err(VitrineError::validation(
                "segment durations must be > 0 ms",
            ));
        }
        let shortest = self.photo_ms.min(self.cover_ms).min(self.closing_ms);
        if self.transition_ms > shortest {
            return Err(VitrineError::validation(format!(
                "transition_ms ({}) must not exceed the shortest segment ({shortest} ms)",
                self.transition_ms
            )));
        }
        Ok(())
    }
}

/// Fixed stylistic color normalization applied to every image draw.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ColorAdjust {
    /// Linear RGB multiplier.
    pub brightness: f32,
    /// Contrast around mid grey.
    pub contrast: f32,
    /// Saturation multiplier (1.0 = unchanged, 0.0 = greyscale).
    pub saturation: f32,
}

impl Default for ColorAdjust {
    fn default() -> Self {
        Self {
            brightness: 1.15,
            contrast: 1.08,
            saturation: 1.10,
        }
    }
}

impl ColorAdjust {
    /// A pass that leaves pixels unchanged.
    pub const IDENTITY: ColorAdjust = ColorAdjust {
        brightness: 1.0,
        contrast: 1.0,
        saturation: 1.0,
    };

    /// Whether applying this adjustment is a no-op.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Placement parameters for the letterboxed ("fit") presentation and the fill zoom.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FitPolicy {
    /// Largest fraction of the canvas width the letterboxed asset may take.
    pub max_width_frac: f64,
    /// Largest fraction of the canvas height the letterboxed asset may take.
    pub max_height_frac: f64,
    /// Extra scale reached at the end of a fill segment (Ken Burns zoom).
    pub zoom_max: f64,
    /// Blur radius of the letterbox backdrop, in 1080px design pixels.
    pub backdrop_blur_px: f64,
    /// Brightness multiplier of the letterbox backdrop.
    pub backdrop_brightness: f32,
    /// How far the backdrop bleeds past each canvas edge, in design pixels.
    pub backdrop_bleed_px: f64,
}

impl Default for FitPolicy {
    fn default() -> Self {
        Self {
            max_width_frac: 0.94,
            max_height_frac: 0.94,
            zoom_max: 0.08,
            backdrop_blur_px: 60.0,
            backdrop_brightness: 0.4,
            backdrop_bleed_px: 150.0,
        }
    }
}

/// Output container produced by the ffmpeg sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    /// WebM with VP8 video and Opus audio.
    #[default]
    Webm,
    /// MP4 with H.264 video and AAC audio.
    Mp4,
}

impl Container {
    /// MIME type of the encoded artifact.
    pub fn mime(self) -> &'static str {
        match self {
            Container::Webm => "video/webm",
            Container::Mp4 => "video/mp4",
        }
    }

    /// Conventional file extension (without dot).
    pub fn extension(self) -> &'static str {
        match self {
            Container::Webm => "webm",
            Container::Mp4 => "mp4",
        }
    }
}

/// Capture/encode settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Fixed capture frame rate.
    pub fps: Fps,
    /// Trailing time subtracted from the loop length so the next loop's first frame is not
    /// captured.
    pub guard_ms: u64,
    /// Target video bitrate in bits per second.
    pub video_bitrate: u64,
    /// Linear gain applied to the audio source.
    pub gain: f32,
    /// Output container.
    pub container: Container,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            guard_ms: 50,
            video_bitrate: 16_000_000,
            gain: 1.0,
            container: Container::Webm,
        }
    }
}

/// Font files used by the overlay text.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontPaths {
    /// Heavy face used for badges, headline and call to action.
    pub heavy: Option<PathBuf>,
    /// Regular face used for the prefix and specs lines. Falls back to `heavy`.
    pub regular: Option<PathBuf>,
}

/// Complete engine configuration, loadable from JSON.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Segment timing.
    pub timing: TimingPolicy,
    /// Image color normalization.
    pub color: ColorAdjust,
    /// Fill/fit placement parameters.
    pub fit: FitPolicy,
    /// Capture/encode settings.
    pub capture: CaptureConfig,
    /// Overlay fonts.
    pub fonts: FontPaths,
}

impl EngineConfig {
    /// Parse configuration from a JSON string.
    pub fn from_json_str(s: &str) -> VitrineResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| VitrineError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read configuration from a JSON file.
    pub fn from_path(path: &Path) -> VitrineResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read engine config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Validate all nested policies.
    pub fn validate(&self) -> VitrineResult<()> {
        self.timing.validate()?;
        Fps::new(self.capture.fps.num, self.capture.fps.den)?;
        if !self.capture.gain.is_finite() || self.capture.gain < 0.0 {
            return Err(VitrineError::validation("capture gain must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&self.fit.max_width_frac)
            || !(0.0..=1.0).contains(&self.fit.max_height_frac)
        {
            return Err(VitrineError::validation(
                "fit max_width_frac/max_height_frac must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/policy.rs"]
mod tests;
