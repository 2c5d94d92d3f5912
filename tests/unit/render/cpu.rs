use super::*;

fn canvas() -> Canvas {
    Canvas::new(8, 8).unwrap()
}

#[test]
fn solid_fill_covers_the_canvas() {
    let mut p = CpuPainter::new();
    let frame = p
        .paint(canvas(), |s| {
            s.fill_canvas(Rgba8::hex(0xff0000));
            Ok(())
        })
        .unwrap();
    assert_eq!(frame.pixel(3, 3), Some([255, 0, 0, 255]));
    assert_eq!(frame.data.len(), 8 * 8 * 4);
}

#[test]
fn opacity_group_blends_over_background() {
    let mut p = CpuPainter::new();
    let frame = p
        .paint(canvas(), |s| {
            s.fill_canvas(Rgba8::hex(0x000000));
            s.with_opacity(0.5, |s| {
                s.fill_canvas(Rgba8::hex(0xffffff));
                Ok(())
            })
        })
        .unwrap();
    let px = frame.pixel(4, 4).unwrap();
    assert!((i32::from(px[0]) - 128).abs() <= 2, "{px:?}");
    assert_eq!(px[3], 255);
}

#[test]
fn image_is_stretched_over_its_destination() {
    let asset = DecodedAsset::from_premul(2, 2, [0u8, 0, 255, 255].repeat(4)).unwrap();
    let paint = ImagePaint::from_asset(&asset).unwrap();
    let mut p = CpuPainter::new();
    let frame = p
        .paint(canvas(), |s| {
            s.fill_canvas(Rgba8::hex(0xffffff));
            s.draw_image(&paint, Rect::new(-4.0, -4.0, 12.0, 12.0));
            Ok(())
        })
        .unwrap();
    assert_eq!(frame.pixel(4, 4), Some([0, 0, 255, 255]));
}

#[test]
fn gradient_darkens_toward_the_bottom() {
    let mut p = CpuPainter::new();
    let frame = p
        .paint(Canvas::new(4, 64).unwrap(), |s| {
            s.fill_canvas(Rgba8::hex(0xffffff));
            s.fill_vertical_gradient(
                Rect::new(0.0, 0.0, 4.0, 64.0),
                &GradientStops(vec![(0.0, 0.0), (1.0, 1.0)]),
            )
        })
        .unwrap();
    let top = frame.pixel(2, 1).unwrap()[0];
    let bottom = frame.pixel(2, 62).unwrap()[0];
    assert!(top > 230, "{top}");
    assert!(bottom < 25, "{bottom}");
}

#[test]
fn gradient_stops_interpolate_piecewise() {
    let g = GradientStops(vec![(0.0, 0.0), (0.6, 0.4), (1.0, 0.85)]);
    assert_eq!(g.alpha_at(0.0), 0.0);
    assert!((g.alpha_at(0.3) - 0.2).abs() < 1e-6);
    assert!((g.alpha_at(0.8) - 0.625).abs() < 1e-6);
    assert_eq!(g.alpha_at(1.0), 0.85);
}
