use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::config::policy::FontPaths;
use crate::foundation::error::{VitrineError, VitrineResult};

/// Which of the two overlay faces a line uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontFace {
    /// Black/extra-bold face: badges, chip, headline, call to action.
    Heavy,
    /// Semi-bold face: location prefix and specs line.
    Regular,
}

/// Measures the advance width of single-line text.
///
/// Overlay layout depends only on this, so plans can be built and tested without font files.
pub trait TextMeasure {
    /// Width in pixels of `text` set in `face` at `size_px`.
    fn advance_width(&mut self, text: &str, face: FontFace, size_px: f32) -> f32;
}

/// Approximate measurer: every character advances `em_ratio * size`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvance {
    /// Advance per character as a fraction of the font size.
    pub em_ratio: f32,
}

impl Default for FixedAdvance {
    fn default() -> Self {
        Self { em_ratio: 0.6 }
    }
}

impl TextMeasure for FixedAdvance {
    fn advance_width(&mut self, text: &str, _face: FontFace, size_px: f32) -> f32 {
        text.chars().count() as f32 * size_px * self.em_ratio
    }
}

/// Largest size in `[floor, max]` (whole design pixels, times `scale`) at which `text` fits
/// `available` pixels.
///
/// When even `floor` is too wide, `floor` is returned anyway: the line may overflow, but the
/// caller never loops forever or fails.
pub fn shrink_to_fit(
    measure: &mut dyn TextMeasure,
    text: &str,
    face: FontFace,
    max: u32,
    floor: u32,
    scale: f32,
    available: f32,
) -> f32 {
    let floor = floor.min(max);
    for size in (floor..=max).rev() {
        let px = size as f32 * scale;
        if measure.advance_width(text, face, px) <= available {
            return px;
        }
    }
    floor as f32 * scale
}

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Raw bytes of the two overlay faces.
#[derive(Clone, Debug)]
pub struct FontBook {
    heavy: Arc<Vec<u8>>,
    regular: Arc<Vec<u8>>,
}

impl FontBook {
    /// Use `heavy` for both faces.
    pub fn single(heavy: Vec<u8>) -> Self {
        let heavy = Arc::new(heavy);
        Self {
            regular: heavy.clone(),
            heavy,
        }
    }

    /// Separate heavy and regular faces.
    pub fn new(heavy: Vec<u8>, regular: Vec<u8>) -> Self {
        Self {
            heavy: Arc::new(heavy),
            regular: Arc::new(regular),
        }
    }

    /// Load the configured font files. `Ok(None)` when no heavy face is configured.
    pub fn from_paths(paths: &FontPaths) -> VitrineResult<Option<Self>> {
        let Some(heavy) = paths.heavy.as_deref() else {
            return Ok(None);
        };
        let heavy = read_font(heavy)?;
        Ok(Some(match paths.regular.as_deref() {
            Some(regular) => Self::new(heavy, read_font(regular)?),
            None => Self::single(heavy),
        }))
    }

    fn bytes(&self, face: FontFace) -> &Arc<Vec<u8>> {
        match face {
            FontFace::Heavy => &self.heavy,
            FontFace::Regular => &self.regular,
        }
    }
}

fn read_font(path: &Path) -> VitrineResult<Vec<u8>> {
    Ok(std::fs::read(path).with_context(|| format!("read font file '{}'", path.display()))?)
}

/// Stateful helper for building Parley text layouts from the registered overlay faces.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    heavy_family: String,
    regular_family: String,
    heavy_font: vello_cpu::peniko::FontData,
    regular_font: vello_cpu::peniko::FontData,
}

impl TextLayoutEngine {
    /// Register both faces with a fresh Parley font context.
    pub fn new(book: &FontBook) -> VitrineResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let heavy_family = register_family(&mut font_ctx, book.bytes(FontFace::Heavy))?;
        let regular_family = register_family(&mut font_ctx, book.bytes(FontFace::Regular))?;
        let font_data = |face| {
            vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(book.bytes(face).as_ref().clone()),
                0,
            )
        };
        Ok(Self {
            heavy_font: font_data(FontFace::Heavy),
            regular_font: font_data(FontFace::Regular),
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            heavy_family,
            regular_family,
        })
    }

    /// Shape and lay out one unwrapped line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        face: FontFace,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> VitrineResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(VitrineError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family = match face {
            FontFace::Heavy => self.heavy_family.clone(),
            FontFace::Regular => self.regular_family.clone(),
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Font data for drawing glyphs of `face`.
    pub(crate) fn font_data(&self, face: FontFace) -> &vello_cpu::peniko::FontData {
        match face {
            FontFace::Heavy => &self.heavy_font,
            FontFace::Regular => &self.regular_font,
        }
    }
}

impl TextMeasure for TextLayoutEngine {
    fn advance_width(&mut self, text: &str, face: FontFace, size_px: f32) -> f32 {
        match self.layout_line(text, face, size_px, TextBrushRgba8::default()) {
            Ok(layout) => layout.width(),
            Err(_) => 0.0,
        }
    }
}

fn register_family(font_ctx: &mut parley::FontContext, bytes: &Arc<Vec<u8>>) -> VitrineResult<String> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.as_ref().clone()), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| VitrineError::validation("no font families registered from font bytes"))?;
    Ok(font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| VitrineError::validation("registered font family has no name"))?
        .to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/text/engine.rs"]
mod tests;
