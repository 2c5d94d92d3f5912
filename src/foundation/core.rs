use std::time::Duration;

use crate::foundation::error::{VitrineError, VitrineResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Sequential index of a captured frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Rational frames-per-second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, must be > 0.
    pub den: u32,
}

impl Fps {
    /// Build a validated frame rate.
    pub fn new(num: u32, den: u32) -> VitrineResult<Self> {
        if den == 0 {
            return Err(VitrineError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(VitrineError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Nearest whole frame count covering `ms` milliseconds.
    pub fn ms_to_frames_round(self, ms: f64) -> u64 {
        (ms.max(0.0) * f64::from(self.num) / (1000.0 * f64::from(self.den))).round() as u64
    }

    /// Nearest whole frame count covering `span`, in exact integer arithmetic.
    pub fn duration_to_frames_round(self, span: Duration) -> u64 {
        let num = span.as_nanos() * u128::from(self.num);
        let den = u128::from(self.den) * 1_000_000_000;
        ((num + den / 2) / den) as u64
    }

    /// Start time of frame `frames`, rounded to the nearest nanosecond.
    pub fn frame_start(self, frames: u64) -> Duration {
        let num = u128::from(frames) * u128::from(self.den) * 1_000_000_000;
        let den = u128::from(self.num);
        Duration::from_nanos(((num + den / 2) / den) as u64)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Pixel size of a render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Portrait feed still (4:5).
    pub const FEED: Canvas = Canvas {
        width: 1080,
        height: 1350,
    };

    /// Tall reels frame (9:16).
    pub const REELS: Canvas = Canvas {
        width: 1080,
        height: 1920,
    };

    /// Build a validated canvas. Sizes must fit the `u16` raster backend.
    pub fn new(width: u32, height: u32) -> VitrineResult<Self> {
        if width == 0 || height == 0 {
            return Err(VitrineError::validation("canvas width/height must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(VitrineError::validation("canvas width/height exceed u16"));
        }
        Ok(Self { width, height })
    }

    /// Ratio of this canvas width to the 1080px design width that layouts are authored in.
    pub fn design_scale(self) -> f64 {
        f64::from(self.width) / 1080.0
    }

    /// Width as `f64`.
    pub fn w(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`.
    pub fn h(self) -> f64 {
        f64::from(self.height)
    }

    /// Number of bytes in one RGBA8 frame of this size.
    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Straight-alpha RGBA8 color as authored in styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 255,
        }
    }

    /// Same color with alpha replaced by `alpha` in `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Convert to premultiplied form.
    pub fn premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply a straight-alpha color.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
