use crate::assets::decode::DecodedAsset;
use crate::assets::placeholder::placeholder_asset;
use crate::compose::overlay::{OverlayPlan, OverlayProfile, build_overlay, paint_overlay};
use crate::compose::placement::cover_fit;
use crate::creative::metadata::CreativeMetadata;
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::VitrineResult;
use crate::render::backend::{FrameRGBA, encode_png};
use crate::render::cpu::{CpuPainter, ImagePaint};
use crate::text::engine::{FixedAdvance, FontBook, TextLayoutEngine};
use crate::timeline::model::{EntryKind, TimelineEntry};

/// One composited feed still.
#[derive(Clone, Debug)]
pub struct ComposedStill {
    /// Premultiplied pixels.
    pub frame: FrameRGBA,
    /// Whether the call-to-action badge was drawn.
    pub has_cta: bool,
}

impl ComposedStill {
    /// Encode as PNG.
    pub fn to_png(&self) -> VitrineResult<Vec<u8>> {
        encode_png(&self.frame)
    }
}

/// Renders single feed stills: the entry's image cover-fitted, plus the listing overlay on photos.
pub struct StaticComposer {
    canvas: Canvas,
    profile: OverlayProfile,
    painter: CpuPainter,
    text: Option<TextLayoutEngine>,
}

impl StaticComposer {
    /// Composer for `canvas` using the feed overlay layout.
    ///
    /// Without `fonts`, overlay shapes are still drawn but text is skipped.
    pub fn new(canvas: Canvas, fonts: Option<&FontBook>) -> VitrineResult<Self> {
        let text = fonts.map(TextLayoutEngine::new).transpose()?;
        if text.is_none() {
            tracing::warn!("no overlay fonts configured, still text will be skipped");
        }
        Ok(Self {
            canvas,
            profile: OverlayProfile::feed(),
            painter: CpuPainter::new(),
            text,
        })
    }

    /// Composer for the standard 1080x1350 feed canvas.
    pub fn feed(fonts: Option<&FontBook>) -> VitrineResult<Self> {
        Self::new(Canvas::FEED, fonts)
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Overlay that `compose` would draw for a photo entry.
    pub fn plan_overlay(&mut self, metadata: &CreativeMetadata, is_first: bool) -> OverlayPlan {
        match self.text.as_mut() {
            Some(engine) => build_overlay(metadata, self.canvas, &self.profile, engine, is_first),
            None => build_overlay(
                metadata,
                self.canvas,
                &self.profile,
                &mut FixedAdvance::default(),
                is_first,
            ),
        }
    }

    /// Composite entry `index`.
    ///
    /// An entry without a decoded asset gets the deterministic placeholder for its index.
    /// `is_first` requests the call-to-action badge; it only applies to photo entries.
    #[tracing::instrument(skip(self, entry, asset, metadata), fields(entry = %entry.id))]
    pub fn compose(
        &mut self,
        entry: &TimelineEntry,
        index: usize,
        asset: Option<&DecodedAsset>,
        metadata: &CreativeMetadata,
        is_first: bool,
    ) -> VitrineResult<ComposedStill> {
        let placeholder;
        let asset = match asset {
            Some(a) => a,
            None => {
                tracing::warn!(index, "entry has no bound asset, drawing placeholder");
                placeholder = placeholder_asset(index, self.canvas.width, self.canvas.height);
                &placeholder
            }
        };
        let image = ImagePaint::from_asset(asset)?;
        let plan = match entry.kind {
            EntryKind::Photo => Some(self.plan_overlay(metadata, is_first)),
            EntryKind::Cover | EntryKind::Closing => None,
        };
        let has_cta = plan.as_ref().is_some_and(OverlayPlan::has_cta);

        let canvas = self.canvas;
        let Self { painter, text, .. } = self;
        let frame = painter.paint(canvas, |scope| {
            let full = Rect::new(0.0, 0.0, canvas.w(), canvas.h());
            scope.draw_image(&image, cover_fit(image.width(), image.height(), full));
            if let Some(plan) = &plan {
                paint_overlay(scope, plan, text.as_mut())?;
            }
            Ok(())
        })?;
        tracing::debug!(has_cta, "still composed");
        Ok(ComposedStill { frame, has_cta })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/still.rs"]
mod tests;
