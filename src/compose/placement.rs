//! Aspect-preserving placement of an image inside a target rectangle.

use crate::foundation::core::{Point, Rect};

/// Scale to fill `target` completely, centering the overflowing axis (which is cropped).
///
/// `scale = max(target_w / img_w, target_h / img_h)`.
pub fn cover_fit(img_w: u32, img_h: u32, target: Rect) -> Rect {
    let (iw, ih) = (f64::from(img_w.max(1)), f64::from(img_h.max(1)));
    let scale = (target.width() / iw).max(target.height() / ih);
    centered(target.center(), iw * scale, ih * scale)
}

/// Scale to fit inside `max_w_frac` x `max_h_frac` of `target`, centered (letterbox).
pub fn contain_fit(img_w: u32, img_h: u32, target: Rect, max_w_frac: f64, max_h_frac: f64) -> Rect {
    let (iw, ih) = (f64::from(img_w.max(1)), f64::from(img_h.max(1)));
    let bw = target.width() * max_w_frac.clamp(0.0, 1.0);
    let bh = target.height() * max_h_frac.clamp(0.0, 1.0);
    let scale = (bw / iw).min(bh / ih);
    centered(target.center(), iw * scale, ih * scale)
}

/// Grow `rect` by `scale` about `center`.
pub fn zoom_about(rect: Rect, center: Point, scale: f64) -> Rect {
    Rect::new(
        center.x + (rect.x0 - center.x) * scale,
        center.y + (rect.y0 - center.y) * scale,
        center.x + (rect.x1 - center.x) * scale,
        center.y + (rect.y1 - center.y) * scale,
    )
}

fn centered(c: Point, w: f64, h: f64) -> Rect {
    Rect::new(c.x - w / 2.0, c.y - h / 2.0, c.x + w / 2.0, c.y + h / 2.0)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/placement.rs"]
mod tests;
