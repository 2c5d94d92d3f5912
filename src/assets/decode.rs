use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::VitrineResult;
use crate::foundation::math::mul_div255_u16;

/// Decoded raster image in premultiplied RGBA8 form.
///
/// Bound to one timeline entry for the lifetime of one render or capture session. Read-only once
/// built; composers share it through `Arc`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedAsset {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedAsset {
    /// Wrap premultiplied pixels. `rgba8_premul.len()` must equal `width * height * 4`.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if width == 0 || height == 0 || rgba8_premul.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Width over height.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Decode any raster format the `image` crate recognises (PNG, JPEG, WebP, ...).
///
/// Straight alpha is premultiplied on the way in so every composer blends the same way.
pub fn decode_image(bytes: &[u8]) -> VitrineResult<DecodedAsset> {
    let rgba = image::load_from_memory(bytes)
        .context("image bytes are not a supported raster format")?
        .into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixels = rgba.into_raw();
    premultiply_in_place(&mut pixels);
    DecodedAsset::from_premul(width, height, pixels)
        .ok_or_else(|| anyhow::anyhow!("decoded image is empty ({width}x{height})").into())
}

fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let alpha = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = mul_div255_u16(u16::from(*c), alpha) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
