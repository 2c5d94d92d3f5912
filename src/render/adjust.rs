//! Whole-image pixel passes on premultiplied RGBA8: color matrices, Gaussian blur and resampling.
//!
//! These run once per session on decoded assets, not per frame.

use crate::assets::decode::DecodedAsset;
use crate::config::policy::{ColorAdjust, FitPolicy};
use crate::foundation::core::Canvas;
use crate::foundation::error::{VitrineError, VitrineResult};

/// Row-major 4x5 color matrix over straight-alpha RGBA in `[0, 1]`.
pub(crate) type ColorMatrix = [f32; 20];

pub(crate) fn brightness_matrix(b: f32) -> ColorMatrix {
    [
        b, 0.0, 0.0, 0.0, 0.0, //
        0.0, b, 0.0, 0.0, 0.0, //
        0.0, 0.0, b, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]
}

pub(crate) fn contrast_matrix(c: f32) -> ColorMatrix {
    let t = 0.5 - 0.5 * c;
    [
        c, 0.0, 0.0, 0.0, t, //
        0.0, c, 0.0, 0.0, t, //
        0.0, 0.0, c, 0.0, t, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]
}

pub(crate) fn saturation_matrix(s: f32) -> ColorMatrix {
    [
        0.213 + 0.787 * s,
        0.715 - 0.715 * s,
        0.072 - 0.072 * s,
        0.0,
        0.0,
        0.213 - 0.213 * s,
        0.715 + 0.285 * s,
        0.072 - 0.072 * s,
        0.0,
        0.0,
        0.213 - 0.213 * s,
        0.715 - 0.715 * s,
        0.072 + 0.928 * s,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        1.0,
        0.0,
    ]
}

pub(crate) fn color_matrix_rgba8_premul(src: &[u8], dst: &mut [u8], m: ColorMatrix) {
    debug_assert_eq!(src.len(), dst.len());
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let pa = s[3] as f32 / 255.0;
        if pa <= 0.0 {
            d.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }

        // Convert premul -> straight for matrix application.
        let inv_a = 1.0 / pa;
        let r = s[0] as f32 / 255.0 * inv_a;
        let g = s[1] as f32 / 255.0 * inv_a;
        let b = s[2] as f32 / 255.0 * inv_a;
        let a = pa;

        let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
        let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
        let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
        let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

        d[0] = (out_r * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[1] = (out_g * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[2] = (out_b * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

/// Apply brightness, then contrast, then saturation, clamping after each step.
pub fn apply_color_adjust(asset: &DecodedAsset, adjust: &ColorAdjust) -> DecodedAsset {
    if adjust.is_identity() {
        return asset.clone();
    }
    let mut a = asset.rgba8_premul.as_ref().clone();
    let mut b = vec![0u8; a.len()];
    for m in [
        brightness_matrix(adjust.brightness),
        contrast_matrix(adjust.contrast),
        saturation_matrix(adjust.saturation),
    ] {
        color_matrix_rgba8_premul(&a, &mut b, m);
        std::mem::swap(&mut a, &mut b);
    }
    DecodedAsset {
        width: asset.width,
        height: asset.height,
        rgba8_premul: std::sync::Arc::new(a),
    }
}

/// Build the letterbox backdrop: a small, heavily blurred, darkened copy of `asset`.
///
/// The result is meant to be stretched over the canvas plus its bleed; working at reduced size
/// keeps the blur cheap without visible difference.
pub fn fit_backdrop(
    asset: &DecodedAsset,
    canvas: Canvas,
    policy: &FitPolicy,
) -> VitrineResult<DecodedAsset> {
    const DOWNSCALE: f64 = 8.0;

    let s = canvas.design_scale();
    let bleed = policy.backdrop_bleed_px * s;
    let tw = (((canvas.w() + 2.0 * bleed) / DOWNSCALE).round() as u32).max(1);
    let th = (((canvas.h() + 2.0 * bleed) / DOWNSCALE).round() as u32).max(1);
    let small = resize_premul(asset, tw, th)?;

    let sigma = ((policy.backdrop_blur_px * s) / DOWNSCALE) as f32;
    let radius = (sigma * 3.0).ceil().max(0.0) as u32;
    let kernel = if sigma > 0.0 {
        gaussian_kernel_q16(radius, sigma)?
    } else {
        vec![1 << 16]
    };

    let src = small.rgba8_premul.as_ref();
    let mut blurred = vec![0u8; src.len()];
    let mut tmp = vec![0u8; src.len()];
    blur_rgba8_premul_q16(src, &mut blurred, &mut tmp, tw, th, &kernel);

    let mut out = vec![0u8; blurred.len()];
    color_matrix_rgba8_premul(
        &blurred,
        &mut out,
        brightness_matrix(policy.backdrop_brightness),
    );
    Ok(DecodedAsset {
        width: tw,
        height: th,
        rgba8_premul: std::sync::Arc::new(out),
    })
}

/// Resample a premultiplied asset with a triangle filter.
pub(crate) fn resize_premul(asset: &DecodedAsset, w: u32, h: u32) -> VitrineResult<DecodedAsset> {
    let buf = image::RgbaImage::from_raw(
        asset.width,
        asset.height,
        asset.rgba8_premul.as_ref().clone(),
    )
    .ok_or_else(|| VitrineError::evaluation("asset byte length does not match its size"))?;
    let resized = image::imageops::resize(&buf, w, h, image::imageops::FilterType::Triangle);
    Ok(DecodedAsset {
        width: w,
        height: h,
        rgba8_premul: std::sync::Arc::new(resized.into_raw()),
    })
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> VitrineResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(VitrineError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Put the rounding residue on the center tap so the kernel sums to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

pub(crate) fn blur_rgba8_premul_q16(
    src: &[u8],
    dst: &mut [u8],
    tmp: &mut [u8],
    width: u32,
    height: u32,
    kernel_q16: &[u32],
) {
    if kernel_q16.len() == 1 {
        dst.copy_from_slice(src);
        return;
    }
    horizontal_blur_q16(src, tmp, width, height, kernel_q16);
    vertical_blur_q16(tmp, dst, width, height, kernel_q16);
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/adjust.rs"]
mod tests;
