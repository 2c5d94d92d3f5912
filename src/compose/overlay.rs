//! Listing overlay: badges, location chip, headline, specs and call to action.
//!
//! Layout is computed first into an [`OverlayPlan`] (a flat list of draw ops in canvas pixels)
//! using only a [`TextMeasure`], then rasterized. Profiles are authored in 1080px-wide design
//! pixels and scaled to the canvas width.

use kurbo::{BezPath, Cap, Join, Stroke, StrokeOpts};

use crate::creative::metadata::CreativeMetadata;
use crate::foundation::core::{Canvas, Rect, Rgba8};
use crate::foundation::error::VitrineResult;
use crate::render::cpu::{GradientStops, Scope};
use crate::text::engine::{FontFace, TextLayoutEngine, TextMeasure, shrink_to_fit};

/// Brand accent (badges, chip, call to action).
pub const ACCENT: Rgba8 = Rgba8::hex(0xF29100);
const WHITE: Rgba8 = Rgba8::hex(0xFFFFFF);
const BLACK: Rgba8 = Rgba8::hex(0x000000);

const CTA_LABEL: &str = "CONFIRA";

/// A text-sized rounded badge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BadgeStyle {
    /// Label size.
    pub font_px: f32,
    /// Badge width minus label width.
    pub pad_px: f64,
    /// Badge height.
    pub height_px: f64,
    /// Corner radius.
    pub radius_px: f64,
    /// Label baseline below the badge top.
    pub baseline_dy: f64,
}

/// A shrink-to-fit text line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FittedLine {
    /// Starting size.
    pub max_px: u32,
    /// Smallest size tried.
    pub floor_px: u32,
    /// Baseline relative to the footer anchor.
    pub dy: f64,
}

/// Wording of the specs line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecsFormat {
    /// `120m²  •  3 Quartos  •  2 Vagas`
    Long,
    /// `120m² • 3 Qts • 2 Vagas`
    Short,
}

/// Call-to-action badge geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CtaStyle {
    /// Badge style; `pad_px` excludes the arrow.
    pub badge: BadgeStyle,
    /// Badge top relative to the footer anchor.
    pub top_dy: f64,
    /// Label left inset.
    pub label_dx: f64,
    /// Arrow length.
    pub arrow_w: f64,
    /// Gap between label and arrow.
    pub arrow_gap: f64,
    /// Arrow shaft below the badge top.
    pub arrow_dy: f64,
    /// Arrow head extent back along the shaft / across it.
    pub head: (f64, f64),
    /// Arrow stroke width.
    pub stroke_px: f64,
}

/// All overlay geometry for one output format.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayProfile {
    /// Side margin.
    pub margin: f64,
    /// Top of the negotiation and price badges.
    pub badges_top: f64,
    /// Negotiation badge.
    pub negotiation: BadgeStyle,
    /// Price badge.
    pub price: BadgeStyle,
    /// Footer anchor, measured up from the bottom edge.
    pub footer_from_bottom: f64,
    /// Location chip.
    pub chip: BadgeStyle,
    /// Chip top relative to the footer anchor.
    pub chip_top_dy: f64,
    /// Location prefix line.
    pub prefix: FittedLine,
    /// Neighborhood headline.
    pub headline: FittedLine,
    /// Specs line size.
    pub specs_font_px: f32,
    /// Specs line opacity.
    pub specs_alpha: f32,
    /// Specs baseline relative to the footer anchor.
    pub specs_dy: f64,
    /// Specs wording.
    pub specs_format: SpecsFormat,
    /// Scrim start as a fraction of the canvas height.
    pub scrim_from: f64,
    /// Scrim alpha stops over `[scrim_from, 1]`.
    pub scrim_stops: Vec<(f32, f32)>,
    /// Call to action, if this format has one.
    pub cta: Option<CtaStyle>,
}

impl OverlayProfile {
    /// Feed still layout (1080x1350 design).
    pub fn feed() -> Self {
        Self {
            margin: 60.0,
            badges_top: 130.0,
            negotiation: BadgeStyle {
                font_px: 34.0,
                pad_px: 36.0,
                height_px: 64.0,
                radius_px: 12.0,
                baseline_dy: 44.0,
            },
            price: BadgeStyle {
                font_px: 38.0,
                pad_px: 40.0,
                height_px: 64.0,
                radius_px: 12.0,
                baseline_dy: 46.0,
            },
            footer_from_bottom: 120.0,
            chip: BadgeStyle {
                font_px: 20.0,
                pad_px: 20.0,
                height_px: 38.0,
                radius_px: 8.0,
                baseline_dy: 26.0,
            },
            chip_top_dy: -260.0,
            prefix: FittedLine {
                max_px: 36,
                floor_px: 12,
                dy: -165.0,
            },
            headline: FittedLine {
                max_px: 78,
                floor_px: 24,
                dy: -85.0,
            },
            specs_font_px: 28.0,
            specs_alpha: 0.85,
            specs_dy: -25.0,
            specs_format: SpecsFormat::Long,
            scrim_from: 0.6,
            scrim_stops: vec![(0.0, 0.0), (1.0, 0.98)],
            cta: Some(CtaStyle {
                badge: BadgeStyle {
                    font_px: 24.0,
                    pad_px: 50.0,
                    height_px: 65.0,
                    radius_px: 12.0,
                    baseline_dy: 41.0,
                },
                top_dy: -75.0,
                label_dx: 20.0,
                arrow_w: 35.0,
                arrow_gap: 12.0,
                arrow_dy: 33.0,
                head: (10.0, 7.0),
                stroke_px: 4.0,
            }),
        }
    }

    /// Reels frame layout (1080x1920 design), kept clear of the platform's UI zones.
    pub fn reels() -> Self {
        Self {
            margin: 110.0,
            badges_top: 320.0,
            negotiation: BadgeStyle {
                font_px: 32.0,
                pad_px: 50.0,
                height_px: 75.0,
                radius_px: 16.0,
                baseline_dy: 48.0,
            },
            price: BadgeStyle {
                font_px: 32.0,
                pad_px: 60.0,
                height_px: 75.0,
                radius_px: 16.0,
                baseline_dy: 50.0,
            },
            footer_from_bottom: 580.0,
            chip: BadgeStyle {
                font_px: 24.0,
                pad_px: 40.0,
                height_px: 50.0,
                radius_px: 10.0,
                baseline_dy: 34.0,
            },
            chip_top_dy: 0.0,
            prefix: FittedLine {
                max_px: 40,
                floor_px: 12,
                dy: 115.0,
            },
            headline: FittedLine {
                max_px: 92,
                floor_px: 35,
                dy: 215.0,
            },
            specs_font_px: 32.0,
            specs_alpha: 0.9,
            specs_dy: 285.0,
            specs_format: SpecsFormat::Short,
            scrim_from: 0.45,
            scrim_stops: vec![(0.0, 0.0), (0.6, 0.4), (1.0, 0.85)],
            cta: None,
        }
    }
}

/// What an overlay op depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayRole {
    /// Legibility gradient.
    Scrim,
    /// Sale/rent badge.
    Negotiation,
    /// Price badge.
    Price,
    /// City chip.
    LocationChip,
    /// Line above the headline.
    Prefix,
    /// Neighborhood.
    Headline,
    /// Area/bedrooms/parking line.
    Specs,
    /// "CONFIRA" badge and arrow.
    CallToAction,
}

/// One draw operation in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayOp {
    /// Vertical black alpha ramp.
    Scrim {
        /// Covered area.
        rect: Rect,
        /// `(offset, alpha)` stops over the rect height.
        stops: Vec<(f32, f32)>,
    },
    /// Filled rounded rectangle.
    RoundRect {
        /// What it depicts.
        role: OverlayRole,
        /// Bounds.
        rect: Rect,
        /// Corner radius.
        radius: f64,
        /// Fill color.
        color: Rgba8,
    },
    /// One line of text.
    Text {
        /// What it depicts.
        role: OverlayRole,
        /// Content.
        text: String,
        /// Face.
        face: FontFace,
        /// Size in pixels.
        size_px: f32,
        /// Left edge.
        x: f64,
        /// Baseline.
        baseline: f64,
        /// Measured advance width.
        width: f64,
        /// Fill color.
        color: Rgba8,
    },
    /// Filled outline (the CTA arrow).
    Path {
        /// What it depicts.
        role: OverlayRole,
        /// Outline.
        path: BezPath,
        /// Fill color.
        color: Rgba8,
    },
}

impl OverlayOp {
    /// Role of this op.
    pub fn role(&self) -> OverlayRole {
        match self {
            OverlayOp::Scrim { .. } => OverlayRole::Scrim,
            OverlayOp::RoundRect { role, .. }
            | OverlayOp::Text { role, .. }
            | OverlayOp::Path { role, .. } => *role,
        }
    }
}

/// Laid-out overlay, ready to rasterize.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayPlan {
    /// Draw ops, back to front.
    pub ops: Vec<OverlayOp>,
}

impl OverlayPlan {
    /// Whether the plan draws the call-to-action badge.
    pub fn has_cta(&self) -> bool {
        self.ops.iter().any(|op| op.role() == OverlayRole::CallToAction)
    }

    /// The text op for `role`, if present.
    pub fn text(&self, role: OverlayRole) -> Option<&OverlayOp> {
        self.ops
            .iter()
            .find(|op| matches!(op, OverlayOp::Text { .. }) && op.role() == role)
    }
}

struct Planner<'m> {
    measure: &'m mut dyn TextMeasure,
    s: f64,
    ops: Vec<OverlayOp>,
}

impl Planner<'_> {
    fn width(&mut self, text: &str, face: FontFace, size_px: f32) -> f64 {
        f64::from(self.measure.advance_width(text, face, size_px))
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        role: OverlayRole,
        text: String,
        face: FontFace,
        size_px: f32,
        x: f64,
        baseline: f64,
        color: Rgba8,
    ) {
        let width = self.width(&text, face, size_px);
        self.ops.push(OverlayOp::Text {
            role,
            text,
            face,
            size_px,
            x,
            baseline,
            width,
            color,
        });
    }

    /// Badge of text width + padding at `(x, top)`, label centered. `x` is the left edge, or the
    /// right edge when `from_right`.
    #[allow(clippy::too_many_arguments)]
    fn badge(
        &mut self,
        role: OverlayRole,
        style: &BadgeStyle,
        label: String,
        x: f64,
        top: f64,
        from_right: bool,
        fill: Rgba8,
        ink: Rgba8,
    ) {
        let s = self.s;
        let size = style.font_px * s as f32;
        let tw = self.width(&label, FontFace::Heavy, size);
        let w = tw + style.pad_px * s;
        let x0 = if from_right { x - w } else { x };
        self.ops.push(OverlayOp::RoundRect {
            role,
            rect: Rect::new(x0, top, x0 + w, top + style.height_px * s),
            radius: style.radius_px * s,
            color: fill,
        });
        self.text(
            role,
            label,
            FontFace::Heavy,
            size,
            x0 + (w - tw) / 2.0,
            top + style.baseline_dy * s,
            ink,
        );
    }
}

/// Lay out the overlay for `metadata` on `canvas`.
///
/// The call-to-action is included only when `with_cta` is set and the profile defines one.
pub fn build_overlay(
    metadata: &CreativeMetadata,
    canvas: Canvas,
    profile: &OverlayProfile,
    measure: &mut dyn TextMeasure,
    with_cta: bool,
) -> OverlayPlan {
    let s = canvas.design_scale();
    let (w, h) = (canvas.w(), canvas.h());
    let margin = profile.margin * s;
    let avail = (w - 2.0 * margin).max(0.0) as f32;
    let anchor = h - profile.footer_from_bottom * s;

    let mut p = Planner {
        measure,
        s,
        ops: Vec::new(),
    };

    let scrim_top = h * profile.scrim_from;
    p.ops.push(OverlayOp::Scrim {
        rect: Rect::new(0.0, scrim_top, w, h),
        stops: profile.scrim_stops.clone(),
    });

    let top = profile.badges_top * s;
    p.badge(
        OverlayRole::Negotiation,
        &profile.negotiation,
        metadata.negotiation.label().to_owned(),
        margin,
        top,
        false,
        ACCENT,
        BLACK,
    );
    p.badge(
        OverlayRole::Price,
        &profile.price,
        metadata.price.clone(),
        w - margin,
        top,
        true,
        WHITE,
        ACCENT,
    );

    p.badge(
        OverlayRole::LocationChip,
        &profile.chip,
        metadata.city.to_uppercase(),
        margin,
        anchor + profile.chip_top_dy * s,
        false,
        ACCENT,
        WHITE,
    );

    for (role, line, face, text) in [
        (
            OverlayRole::Prefix,
            &profile.prefix,
            FontFace::Regular,
            metadata.location_prefix.to_uppercase(),
        ),
        (
            OverlayRole::Headline,
            &profile.headline,
            FontFace::Heavy,
            metadata.neighborhood.to_uppercase(),
        ),
    ] {
        let size = shrink_to_fit(
            &mut *p.measure,
            &text,
            face,
            line.max_px,
            line.floor_px,
            s as f32,
            avail,
        );
        p.text(role, text, face, size, margin, anchor + line.dy * s, WHITE);
    }

    let specs = match profile.specs_format {
        SpecsFormat::Long => format!(
            "{}m²  •  {} Quartos  •  {} Vagas",
            metadata.area, metadata.beds, metadata.parking
        ),
        SpecsFormat::Short => format!(
            "{}m² • {} Qts • {} Vagas",
            metadata.area, metadata.beds, metadata.parking
        ),
    };
    p.text(
        OverlayRole::Specs,
        specs,
        FontFace::Regular,
        profile.specs_font_px * s as f32,
        margin,
        anchor + profile.specs_dy * s,
        WHITE.with_alpha(profile.specs_alpha),
    );

    if with_cta && let Some(cta) = profile.cta.as_ref() {
        plan_cta(&mut p, cta, w, margin, anchor);
    }

    OverlayPlan { ops: p.ops }
}

fn plan_cta(p: &mut Planner<'_>, cta: &CtaStyle, w: f64, margin: f64, anchor: f64) {
    let s = p.s;
    let size = cta.badge.font_px * s as f32;
    let label_w = p.width(CTA_LABEL, FontFace::Heavy, size);
    let bw = label_w + (cta.arrow_w + cta.badge.pad_px) * s;
    let x = w - bw - margin;
    let y = anchor + cta.top_dy * s;

    p.ops.push(OverlayOp::RoundRect {
        role: OverlayRole::CallToAction,
        rect: Rect::new(x, y, x + bw, y + cta.badge.height_px * s),
        radius: cta.badge.radius_px * s,
        color: ACCENT,
    });
    p.text(
        OverlayRole::CallToAction,
        CTA_LABEL.to_owned(),
        FontFace::Heavy,
        size,
        x + cta.label_dx * s,
        y + cta.badge.baseline_dy * s,
        BLACK,
    );

    let ax = x + cta.label_dx * s + label_w + cta.arrow_gap * s;
    let ay = y + cta.arrow_dy * s;
    let tip = ax + cta.arrow_w * s;
    let (hx, hy) = (cta.head.0 * s, cta.head.1 * s);
    let mut arrow = BezPath::new();
    arrow.move_to((ax, ay));
    arrow.line_to((tip, ay));
    arrow.line_to((tip - hx, ay - hy));
    arrow.move_to((tip, ay));
    arrow.line_to((tip - hx, ay + hy));

    let style = Stroke::new(cta.stroke_px * s)
        .with_caps(Cap::Round)
        .with_join(Join::Round);
    p.ops.push(OverlayOp::Path {
        role: OverlayRole::CallToAction,
        path: kurbo::stroke(arrow, &style, &StrokeOpts::default(), 0.05),
        color: BLACK,
    });
}

/// Rasterize `plan`. Text ops are skipped when no font engine is available.
pub(crate) fn paint_overlay(
    scope: &mut Scope<'_>,
    plan: &OverlayPlan,
    mut text: Option<&mut TextLayoutEngine>,
) -> VitrineResult<()> {
    for op in &plan.ops {
        match op {
            OverlayOp::Scrim { rect, stops } => {
                scope.fill_vertical_gradient(*rect, &GradientStops(stops.clone()))?;
            }
            OverlayOp::RoundRect {
                rect,
                radius,
                color,
                ..
            } => scope.fill_round_rect(*rect, *radius, *color),
            OverlayOp::Path { path, color, .. } => scope.fill_path(path, *color),
            OverlayOp::Text {
                text: content,
                face,
                size_px,
                x,
                baseline,
                color,
                ..
            } => {
                if let Some(engine) = text.as_deref_mut() {
                    scope.draw_text(engine, content, *face, *size_px, *x, *baseline, *color)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/overlay.rs"]
mod tests;
