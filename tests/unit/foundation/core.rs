use super::*;

#[test]
fn fps_frame_duration_and_rounding() {
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frame_duration_ms() - 33.333_333).abs() < 1e-3);
    assert_eq!(fps.ms_to_frames_round(20_450.0), 614);
    assert_eq!(fps.ms_to_frames_round(-5.0), 0);
    assert_eq!(
        fps.duration_to_frames_round(std::time::Duration::from_millis(20_450)),
        614
    );
    assert_eq!(fps.frame_start(30), std::time::Duration::from_secs(1));
    assert_eq!(fps.frame_start(1).as_nanos(), 33_333_333);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn canvas_presets_and_validation() {
    assert_eq!((Canvas::FEED.width, Canvas::FEED.height), (1080, 1350));
    assert_eq!((Canvas::REELS.width, Canvas::REELS.height), (1080, 1920));
    assert!((Canvas::REELS.design_scale() - 1.0).abs() < 1e-12);
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    assert_eq!(Canvas::new(108, 192).unwrap().byte_len(), 108 * 192 * 4);
}

#[test]
fn hex_colors_and_premul() {
    let c = Rgba8::hex(0xf29100);
    assert_eq!((c.r, c.g, c.b, c.a), (0xf2, 0x91, 0x00, 255));
    let p = Rgba8::hex(0xffffff).with_alpha(0.5).premul();
    assert_eq!(p.a, 128);
    assert_eq!(p.r, 128);
}
