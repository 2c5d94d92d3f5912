use super::*;
use crate::creative::metadata::NegotiationType;
use crate::text::engine::FixedAdvance;

fn listing() -> CreativeMetadata {
    CreativeMetadata {
        price: "R$ 850.000".to_owned(),
        negotiation: NegotiationType::Sell,
        neighborhood: "Jardim Europa".to_owned(),
        city: "Rio Claro".to_owned(),
        location_prefix: "Casa no".to_owned(),
        area: "120".to_owned(),
        beds: "3".to_owned(),
        parking: "2".to_owned(),
        ..CreativeMetadata::default()
    }
}

fn text_of(plan: &OverlayPlan, role: OverlayRole) -> (String, f32, f64) {
    match plan.text(role) {
        Some(OverlayOp::Text {
            text,
            size_px,
            width,
            ..
        }) => (text.clone(), *size_px, *width),
        other => panic!("missing {role:?} text: {other:?}"),
    }
}

#[test]
fn feed_plan_includes_cta_only_when_requested() {
    let mut m = FixedAdvance::default();
    let with = build_overlay(&listing(), Canvas::FEED, &OverlayProfile::feed(), &mut m, true);
    let without = build_overlay(&listing(), Canvas::FEED, &OverlayProfile::feed(), &mut m, false);
    assert!(with.has_cta());
    assert!(!without.has_cta());
    assert_eq!(with.ops.len(), without.ops.len() + 3);
}

#[test]
fn reels_profile_never_draws_cta() {
    let mut m = FixedAdvance::default();
    let plan = build_overlay(&listing(), Canvas::REELS, &OverlayProfile::reels(), &mut m, true);
    assert!(!plan.has_cta());
}

#[test]
fn labels_are_uppercased_but_price_is_verbatim() {
    let mut m = FixedAdvance::default();
    let plan = build_overlay(&listing(), Canvas::FEED, &OverlayProfile::feed(), &mut m, false);
    assert_eq!(text_of(&plan, OverlayRole::Headline).0, "JARDIM EUROPA");
    assert_eq!(text_of(&plan, OverlayRole::LocationChip).0, "RIO CLARO");
    assert_eq!(text_of(&plan, OverlayRole::Prefix).0, "CASA NO");
    assert_eq!(text_of(&plan, OverlayRole::Negotiation).0, "VENDA");
    assert_eq!(text_of(&plan, OverlayRole::Price).0, "R$ 850.000");
    assert_eq!(
        text_of(&plan, OverlayRole::Specs).0,
        "120m²  •  3 Quartos  •  2 Vagas"
    );
}

#[test]
fn reels_specs_use_short_wording() {
    let mut m = FixedAdvance::default();
    let plan = build_overlay(&listing(), Canvas::REELS, &OverlayProfile::reels(), &mut m, false);
    assert_eq!(text_of(&plan, OverlayRole::Specs).0, "120m² • 3 Qts • 2 Vagas");
}

#[test]
fn negotiation_badge_is_text_plus_padding() {
    let mut m = FixedAdvance::default();
    let plan = build_overlay(&listing(), Canvas::FEED, &OverlayProfile::feed(), &mut m, false);
    let rect = plan
        .ops
        .iter()
        .find_map(|op| match op {
            OverlayOp::RoundRect {
                role: OverlayRole::Negotiation,
                rect,
                ..
            } => Some(*rect),
            _ => None,
        })
        .expect("negotiation badge");
    // "VENDA": 5 * 0.6 * 34 = 102, plus 36 padding.
    assert!((rect.x0 - 60.0).abs() < 1e-6);
    assert!((rect.width() - 138.0).abs() < 1e-3);
    assert!((rect.y0 - 130.0).abs() < 1e-6);
}

#[test]
fn short_headline_keeps_max_size() {
    let mut m = FixedAdvance::default();
    let plan = build_overlay(&listing(), Canvas::FEED, &OverlayProfile::feed(), &mut m, false);
    let (_, size, width) = text_of(&plan, OverlayRole::Headline);
    assert_eq!(size, 78.0);
    assert!(width <= 960.0);
}

#[test]
fn long_headline_shrinks_to_fit_margins() {
    let mut m = FixedAdvance::default();
    let mut md = listing();
    md.neighborhood = "a".repeat(42);
    let plan = build_overlay(&md, Canvas::FEED, &OverlayProfile::feed(), &mut m, false);
    let (_, size, width) = text_of(&plan, OverlayRole::Headline);
    // 42 chars * 0.6 * size <= 960 => size <= 38.
    assert_eq!(size, 38.0);
    assert!(width <= 960.0 + 1e-3);
}

#[test]
fn headline_past_floor_uses_floor_size() {
    let mut m = FixedAdvance::default();
    let mut md = listing();
    md.neighborhood = "b".repeat(100);
    let plan = build_overlay(&md, Canvas::FEED, &OverlayProfile::feed(), &mut m, false);
    assert_eq!(text_of(&plan, OverlayRole::Headline).1, 24.0);
}

#[test]
fn cta_sits_inside_right_margin() {
    let mut m = FixedAdvance::default();
    let plan = build_overlay(&listing(), Canvas::FEED, &OverlayProfile::feed(), &mut m, true);
    let rect = plan
        .ops
        .iter()
        .find_map(|op| match op {
            OverlayOp::RoundRect {
                role: OverlayRole::CallToAction,
                rect,
                ..
            } => Some(*rect),
            _ => None,
        })
        .expect("cta badge");
    assert!((rect.x1 - 1020.0).abs() < 1e-6);
    // 7 * 0.6 * 24 + 35 + 50
    assert!((rect.width() - 185.8).abs() < 1e-3);
    assert!((rect.y0 - (1350.0 - 120.0 - 75.0)).abs() < 1e-6);
}

#[test]
fn layout_scales_with_canvas_width() {
    let mut m = FixedAdvance::default();
    let small = Canvas::new(108, 135).expect("canvas");
    let plan = build_overlay(&listing(), small, &OverlayProfile::feed(), &mut m, false);
    let (_, size, _) = text_of(&plan, OverlayRole::Headline);
    assert!((size - 7.8).abs() < 1e-4);
}

#[test]
fn scrim_starts_at_profile_fraction() {
    let mut m = FixedAdvance::default();
    let plan = build_overlay(&listing(), Canvas::REELS, &OverlayProfile::reels(), &mut m, false);
    match &plan.ops[0] {
        OverlayOp::Scrim { rect, stops } => {
            assert!((rect.y0 - 1920.0 * 0.45).abs() < 1e-6);
            assert_eq!(stops.len(), 3);
        }
        other => panic!("expected scrim first, got {other:?}"),
    }
}

fn ink_of(plan: &OverlayPlan, role: OverlayRole) -> Rgba8 {
    match plan.text(role) {
        Some(OverlayOp::Text { color, .. }) => *color,
        other => panic!("missing {role:?} text: {other:?}"),
    }
}

fn fill_of(plan: &OverlayPlan, role: OverlayRole) -> Rgba8 {
    plan.ops
        .iter()
        .find_map(|op| match op {
            OverlayOp::RoundRect { role: r, color, .. } if *r == role => Some(*color),
            _ => None,
        })
        .unwrap_or_else(|| panic!("missing {role:?} badge"))
}

#[test]
fn badge_and_chip_colors() {
    let mut m = FixedAdvance::default();
    for (canvas, profile) in [
        (Canvas::FEED, OverlayProfile::feed()),
        (Canvas::REELS, OverlayProfile::reels()),
    ] {
        let plan = build_overlay(&listing(), canvas, &profile, &mut m, false);
        assert_eq!(fill_of(&plan, OverlayRole::Price), Rgba8::hex(0xFFFFFF));
        assert_eq!(ink_of(&plan, OverlayRole::Price), ACCENT);
        assert_eq!(fill_of(&plan, OverlayRole::LocationChip), ACCENT);
        assert_eq!(ink_of(&plan, OverlayRole::LocationChip), Rgba8::hex(0xFFFFFF));
        assert_eq!(fill_of(&plan, OverlayRole::Negotiation), ACCENT);
    }
}
