//! Looping reels compositor: cross-faded segments with Ken-Burns zoom or letterboxed fit.

use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;

use crate::assets::decode::DecodedAsset;
use crate::assets::loader::{AssetSet, load_assets};
use crate::assets::placeholder::placeholder_asset;
use crate::compose::overlay::{OverlayPlan, OverlayProfile, build_overlay, paint_overlay};
use crate::compose::placement::{contain_fit, cover_fit, zoom_about};
use crate::config::policy::{ColorAdjust, EngineConfig, FitPolicy};
use crate::creative::metadata::{CreativeMetadata, FitMode};
use crate::foundation::core::{Canvas, Rect, Rgba8};
use crate::foundation::error::{VitrineError, VitrineResult};
use crate::render::adjust::{apply_color_adjust, fit_backdrop};
use crate::render::backend::FrameRGBA;
use crate::render::cpu::{CpuPainter, ImagePaint, Scope};
use crate::text::engine::{FixedAdvance, FontBook, TextLayoutEngine};
use crate::timeline::model::{EntryKind, Timeline};
use crate::timeline::schedule::{SegmentSample, sample_since_origin};

/// Lifecycle of an [`AnimatedCompositor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositorState {
    /// Waiting for decoded assets.
    Loading,
    /// Looping over the timeline.
    Playing,
    /// Released; terminal.
    TornDown,
}

struct Segment {
    kind: EntryKind,
    image: ImagePaint,
    backdrop: Option<ImagePaint>,
}

struct Prepared {
    kind: EntryKind,
    image: DecodedAsset,
    backdrop: Option<DecodedAsset>,
}

/// Renders the reels timeline as a seamless loop.
///
/// Frames are a pure function of `now - origin`, so the repaint loop and a capture session
/// sampling the same compositor always agree.
pub struct AnimatedCompositor {
    timeline: Timeline,
    metadata: Arc<CreativeMetadata>,
    canvas: Canvas,
    color: ColorAdjust,
    fit: FitPolicy,
    painter: CpuPainter,
    text: Option<TextLayoutEngine>,
    segments: Vec<Segment>,
    overlay: Option<OverlayPlan>,
    state: CompositorState,
    origin: Duration,
}

impl AnimatedCompositor {
    /// New compositor in the `Loading` state, sized for the 1080x1920 reels canvas.
    ///
    /// `metadata` is shared read-only for the whole session.
    pub fn new(
        timeline: Timeline,
        metadata: impl Into<Arc<CreativeMetadata>>,
        config: &EngineConfig,
        fonts: Option<&FontBook>,
    ) -> VitrineResult<Self> {
        let text = fonts.map(TextLayoutEngine::new).transpose()?;
        if text.is_none() {
            tracing::warn!("no overlay fonts configured, reels text will be skipped");
        }
        Ok(Self {
            timeline,
            metadata: metadata.into(),
            canvas: Canvas::REELS,
            color: config.color,
            fit: config.fit,
            painter: CpuPainter::new(),
            text,
            segments: Vec::new(),
            overlay: None,
            state: CompositorState::Loading,
            origin: Duration::ZERO,
        })
    }

    /// Render at `canvas` instead of the default reels size. Layout scales with the width.
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Listing fields drawn by the overlay.
    pub fn metadata(&self) -> &Arc<CreativeMetadata> {
        &self.metadata
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CompositorState {
        self.state
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Timeline being played.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Length of one loop.
    pub fn total_duration(&self) -> Duration {
        self.timeline.total_duration()
    }

    /// Decode the timeline's assets and start playing at `now`.
    pub fn load(&mut self, now: Duration) -> VitrineResult<()> {
        let assets = load_assets(&self.timeline)?;
        self.attach_assets(assets, now)
    }

    /// Take ownership of decoded assets and start playing with origin `now`.
    ///
    /// Color normalization, letterbox backdrops and the overlay layout are computed once here.
    #[tracing::instrument(skip(self, assets), fields(entries = assets.len()))]
    pub fn attach_assets(&mut self, assets: AssetSet, now: Duration) -> VitrineResult<()> {
        if self.state != CompositorState::Loading {
            return Err(VitrineError::validation(format!(
                "assets can only be attached while loading (state {:?})",
                self.state
            )));
        }
        if assets.len() != self.timeline.len() {
            return Err(VitrineError::validation(format!(
                "asset set has {} slots, timeline has {} entries",
                assets.len(),
                self.timeline.len()
            )));
        }

        let color = self.color;
        let fit = self.fit;
        let canvas = self.canvas;
        let letterbox = self.metadata.fit_mode == FitMode::Fit;
        let entries = self.timeline.entries();

        let prepared = assets
            .slots()
            .par_iter()
            .enumerate()
            .map(|(i, slot)| {
                let kind = entries[i].kind;
                let base = match slot {
                    Some(a) => a.as_ref().clone(),
                    None => {
                        tracing::warn!(index = i, "entry has no bound asset, using placeholder");
                        placeholder_asset(i, canvas.width, canvas.height)
                    }
                };
                let image = if color.is_identity() {
                    base
                } else {
                    apply_color_adjust(&base, &color)
                };
                let backdrop = if letterbox && kind == EntryKind::Photo {
                    Some(fit_backdrop(&image, canvas, &fit)?)
                } else {
                    None
                };
                Ok::<_, VitrineError>(Prepared {
                    kind,
                    image,
                    backdrop,
                })
            })
            .collect::<VitrineResult<Vec<_>>>()?;

        self.segments = prepared
            .iter()
            .map(|p| {
                Ok::<_, VitrineError>(Segment {
                    kind: p.kind,
                    image: ImagePaint::from_asset(&p.image)?,
                    backdrop: p.backdrop.as_ref().map(ImagePaint::from_asset).transpose()?,
                })
            })
            .collect::<VitrineResult<Vec<_>>>()?;

        let profile = OverlayProfile::reels();
        self.overlay = Some(match self.text.as_mut() {
            Some(engine) => build_overlay(&self.metadata, canvas, &profile, engine, false),
            None => build_overlay(
                &self.metadata,
                canvas,
                &profile,
                &mut FixedAdvance::default(),
                false,
            ),
        });

        self.state = CompositorState::Playing;
        self.origin = now;
        tracing::debug!(
            total_ms = self.timeline.total_duration_ms(),
            letterbox,
            "compositor playing"
        );
        Ok(())
    }

    /// Move the playback origin to `now` so the loop restarts at segment 0, offset 0.
    pub fn restart(&mut self, now: Duration) -> VitrineResult<()> {
        self.ensure_playing()?;
        self.origin = now;
        Ok(())
    }

    /// Where the loop is at `now`.
    pub fn sample_at(&self, now: Duration) -> VitrineResult<SegmentSample> {
        self.ensure_playing()?;
        Ok(sample_since_origin(
            &self.timeline,
            now.saturating_sub(self.origin),
        ))
    }

    /// Render the frame for `now`.
    pub fn render_at(&mut self, now: Duration) -> VitrineResult<FrameRGBA> {
        let sample = self.sample_at(now)?;
        let Self {
            canvas,
            fit,
            painter,
            text,
            segments,
            overlay,
            metadata,
            ..
        } = self;
        let letterbox = metadata.fit_mode == FitMode::Fit;
        let mut ctx = SegmentCtx {
            fit,
            overlay: overlay.as_ref(),
            text: text.as_mut(),
            letterbox,
        };

        painter.paint(*canvas, |scope| {
            scope.fill_canvas(Rgba8::hex(0x000000));
            if let Some(incoming) = sample.incoming
                && let Some(seg) = segments.get(incoming.index)
            {
                ctx.draw(scope, seg, 0.0, incoming.opacity)?;
            }
            if let Some(seg) = segments.get(sample.index) {
                ctx.draw(scope, seg, sample.progress, sample.opacity)?;
            }
            Ok(())
        })
    }

    /// Release decoded images and stop playing. Further renders fail.
    pub fn teardown(&mut self) {
        if self.state != CompositorState::TornDown {
            tracing::debug!("compositor torn down");
        }
        self.state = CompositorState::TornDown;
        self.segments.clear();
        self.overlay = None;
    }

    fn ensure_playing(&self) -> VitrineResult<()> {
        match self.state {
            CompositorState::Playing => Ok(()),
            s => Err(VitrineError::validation(format!(
                "compositor is not playing (state {s:?})"
            ))),
        }
    }
}

struct SegmentCtx<'a> {
    fit: &'a FitPolicy,
    overlay: Option<&'a OverlayPlan>,
    text: Option<&'a mut TextLayoutEngine>,
    letterbox: bool,
}

impl SegmentCtx<'_> {
    fn draw(
        &mut self,
        scope: &mut Scope<'_>,
        seg: &Segment,
        progress: f64,
        opacity: f32,
    ) -> VitrineResult<()> {
        let canvas = scope.canvas();
        let full = Rect::new(0.0, 0.0, canvas.w(), canvas.h());
        let (w, h) = (seg.image.width(), seg.image.height());

        scope.with_opacity(opacity, |scope| {
            match (&seg.backdrop, self.letterbox) {
                (Some(backdrop), true) => {
                    let bleed = self.fit.backdrop_bleed_px * canvas.design_scale();
                    scope.draw_image(backdrop, full.inflate(bleed, bleed));
                    let dest = contain_fit(
                        w,
                        h,
                        full,
                        self.fit.max_width_frac,
                        self.fit.max_height_frac,
                    );
                    scope.draw_image(&seg.image, dest);
                }
                _ => {
                    let scale = 1.0 + self.fit.zoom_max * progress.clamp(0.0, 1.0);
                    let dest = zoom_about(cover_fit(w, h, full), full.center(), scale);
                    scope.draw_image(&seg.image, dest);
                }
            }
            if seg.kind == EntryKind::Photo
                && let Some(plan) = self.overlay
            {
                paint_overlay(scope, plan, self.text.as_deref_mut())?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/animated.rs"]
mod tests;
