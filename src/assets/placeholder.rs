use crate::assets::decode::DecodedAsset;
use crate::foundation::math::{Fnv1a64, fnv1a64};

/// Deterministic stand-in image for an entry with no bound asset.
///
/// Keyed by entry index: the same index always yields the same pixels, so stills rendered from an
/// incomplete timeline are reproducible.
pub fn placeholder_asset(index: usize, width: u32, height: u32) -> DecodedAsset {
    let width = width.max(1);
    let height = height.max(1);
    let seed = fnv1a64(format!("rsi-{index}").as_bytes());

    let top = seed_color(seed);
    let bottom = seed_color(seed.rotate_left(29));

    let mut bytes = vec![0u8; (width as usize) * (height as usize) * 4];
    let denom = (width + height).saturating_sub(2).max(1) as f32;
    for y in 0..height {
        for x in 0..width {
            let t = ((x + y) as f32 / denom).clamp(0.0, 1.0);
            let grain = (hash_xy(seed, x, y) & 0x0f) as f32 - 7.5;
            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            for c in 0..3 {
                let v = f32::from(top[c]) + (f32::from(bottom[c]) - f32::from(top[c])) * t + grain;
                bytes[idx + c] = v.round().clamp(0.0, 255.0) as u8;
            }
            bytes[idx + 3] = 255;
        }
    }

    DecodedAsset {
        width,
        height,
        rgba8_premul: std::sync::Arc::new(bytes),
    }
}

fn seed_color(seed: u64) -> [u8; 3] {
    // Muted tones: each channel in [64, 191].
    [
        64 + (seed & 0x7f) as u8,
        64 + ((seed >> 8) & 0x7f) as u8,
        64 + ((seed >> 16) & 0x7f) as u8,
    ]
}

fn hash_xy(seed: u64, x: u32, y: u32) -> u64 {
    let mut h = Fnv1a64::new(seed);
    h.write_u64(u64::from(x));
    h.write_u64(u64::from(y));
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/placeholder.rs"]
mod tests;
