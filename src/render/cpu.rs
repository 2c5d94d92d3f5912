use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape;

use crate::assets::decode::DecodedAsset;
use crate::foundation::core::{Affine, Canvas, Rect, Rgba8};
use crate::foundation::error::{VitrineError, VitrineResult};
use crate::render::backend::FrameRGBA;
use crate::text::engine::{FontFace, TextBrushRgba8, TextLayoutEngine};

/// A decoded asset uploaded as a `vello_cpu` image paint.
#[derive(Clone)]
pub(crate) struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

impl ImagePaint {
    pub(crate) fn from_asset(asset: &DecodedAsset) -> VitrineResult<Self> {
        let pixmap = pixmap_from_premul_bytes(&asset.rgba8_premul, asset.width, asset.height)?;
        Ok(Self {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            w: asset.width,
            h: asset.height,
        })
    }

    pub(crate) fn width(&self) -> u32 {
        self.w
    }

    pub(crate) fn height(&self) -> u32 {
        self.h
    }
}

/// Vertical alpha ramp over black, as `(offset in [0,1], alpha)` stops.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GradientStops(pub(crate) Vec<(f32, f32)>);

impl GradientStops {
    fn alpha_at(&self, t: f32) -> f32 {
        let stops = &self.0;
        let Some(&(first_t, first_a)) = stops.first() else {
            return 0.0;
        };
        if t <= first_t {
            return first_a;
        }
        for w in stops.windows(2) {
            let (t0, a0) = w[0];
            let (t1, a1) = w[1];
            if t <= t1 {
                let span = (t1 - t0).max(f32::EPSILON);
                return a0 + (a1 - a0) * ((t - t0) / span);
            }
        }
        stops.last().map(|s| s.1).unwrap_or(0.0)
    }

    fn key(&self) -> Vec<u32> {
        self.0
            .iter()
            .flat_map(|(t, a)| [t.to_bits(), a.to_bits()])
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    stops: Vec<u32>,
    h: u32,
}

/// CPU rasterizer for composed frames, powered by `vello_cpu`.
///
/// One painter is owned by one composer; its render context and cached paints are reused across
/// frames of the same size.
#[derive(Default)]
pub(crate) struct CpuPainter {
    ctx: Option<vello_cpu::RenderContext>,
    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
}

impl CpuPainter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run `draw` against a cleared surface of `canvas` size and read the pixels back.
    pub(crate) fn paint(
        &mut self,
        canvas: Canvas,
        draw: impl FnOnce(&mut Scope<'_>) -> VitrineResult<()>,
    ) -> VitrineResult<FrameRGBA> {
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| VitrineError::evaluation("canvas width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| VitrineError::evaluation("canvas height exceeds u16"))?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let mut scope = Scope {
            ctx: &mut ctx,
            canvas,
            gradient_cache: &mut self.gradient_cache,
        };
        let drawn = draw(&mut scope);
        if let Err(e) = drawn {
            self.ctx = Some(ctx);
            return Err(e);
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

/// Drawing operations available while painting one frame.
pub(crate) struct Scope<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
    canvas: Canvas,
    gradient_cache: &'a mut HashMap<GradientKey, vello_cpu::Image>,
}

impl Scope<'_> {
    pub(crate) fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn reset_state(&mut self) {
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    /// Group everything drawn by `f` and composite it at `opacity`.
    pub(crate) fn with_opacity(
        &mut self,
        opacity: f32,
        f: impl FnOnce(&mut Self) -> VitrineResult<()>,
    ) -> VitrineResult<()> {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return Ok(());
        }
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
        }
        let out = f(self);
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
        out
    }

    pub(crate) fn fill_canvas(&mut self, color: Rgba8) {
        let full = Rect::new(0.0, 0.0, self.canvas.w(), self.canvas.h());
        self.fill_rect(full, color);
    }

    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.reset_state();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(to_color(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    /// Draw `image` stretched over `dest`. Parts outside the canvas are clipped.
    pub(crate) fn draw_image(&mut self, image: &ImagePaint, dest: Rect) {
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return;
        }
        self.reset_state();
        let tr = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(
                dest.width() / f64::from(image.w),
                dest.height() / f64::from(image.h),
            );
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(image.paint.clone());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.w),
            f64::from(image.h),
        ));
    }

    /// Fill `rect` with a top-to-bottom black alpha ramp.
    pub(crate) fn fill_vertical_gradient(
        &mut self,
        rect: Rect,
        stops: &GradientStops,
    ) -> VitrineResult<()> {
        let h = rect.height().round().max(1.0) as u32;
        let img = self.gradient_paint(stops, h)?;
        self.reset_state();
        let tr = Affine::translate((rect.x0, rect.y0))
            * Affine::scale_non_uniform(rect.width(), rect.height() / f64::from(h));
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(img);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 1.0, f64::from(h)));
        Ok(())
    }

    pub(crate) fn fill_round_rect(&mut self, rect: Rect, radius: f64, color: Rgba8) {
        let rr = kurbo::RoundedRect::from_rect(rect, radius);
        self.fill_path(&rr.to_path(0.1), color);
    }

    pub(crate) fn fill_path(&mut self, path: &kurbo::BezPath, color: Rgba8) {
        self.reset_state();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(to_color(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    /// Draw one line of text with its baseline starting at `(x, baseline)`.
    pub(crate) fn draw_text(
        &mut self,
        engine: &mut TextLayoutEngine,
        text: &str,
        face: FontFace,
        size_px: f32,
        x: f64,
        baseline: f64,
        color: Rgba8,
    ) -> VitrineResult<()> {
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        let layout = engine.layout_line(text, face, size_px, brush)?;
        let font = engine.font_data(face).clone();

        self.reset_state();
        self.ctx
            .set_transform(affine_to_cpu(Affine::translate((x, baseline))));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let b = run.style().brush;
                self.ctx
                    .set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
                let run_baseline = run.baseline();
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y - run_baseline,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn gradient_paint(&mut self, stops: &GradientStops, h: u32) -> VitrineResult<vello_cpu::Image> {
        let key = GradientKey {
            stops: stops.key(),
            h,
        };
        if let Some(img) = self.gradient_cache.get(&key).cloned() {
            return Ok(img);
        }
        let mut bytes = vec![0u8; (h as usize) * 4];
        let h1 = (h.max(1) - 1) as f32;
        for y in 0..h {
            let t = if h1 <= 0.0 { 0.0 } else { y as f32 / h1 };
            let a = (stops.alpha_at(t).clamp(0.0, 1.0) * 255.0).round() as u8;
            // Premultiplied black: only alpha is non-zero.
            bytes[(y as usize) * 4 + 3] = a;
        }
        let pixmap = pixmap_from_premul_bytes(&bytes, 1, h)?;
        let img = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.gradient_cache.insert(key, img.clone());
        Ok(img)
    }
}

fn to_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> VitrineResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| VitrineError::evaluation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| VitrineError::evaluation("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(VitrineError::evaluation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
