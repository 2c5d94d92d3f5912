use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> DecodedAsset {
    DecodedAsset::from_premul(w, h, px.repeat((w * h) as usize)).unwrap()
}

#[test]
fn identity_adjust_is_a_no_op() {
    let a = solid(2, 2, [10, 100, 200, 255]);
    assert_eq!(apply_color_adjust(&a, &ColorAdjust::IDENTITY), a);
}

#[test]
fn default_boost_brightens_mid_grey() {
    let a = solid(1, 1, [128, 128, 128, 255]);
    let out = apply_color_adjust(&a, &ColorAdjust::default());
    let px = &out.rgba8_premul[..4];
    // Grey stays grey under saturation, gets brighter under brightness/contrast.
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);
    assert!(px[0] > 128);
    assert_eq!(px[3], 255);
}

#[test]
fn zero_saturation_is_greyscale() {
    let src = [255u8, 0, 0, 255];
    let mut dst = [0u8; 4];
    color_matrix_rgba8_premul(&src, &mut dst, saturation_matrix(0.0));
    assert_eq!(dst[0], dst[1]);
    assert_eq!(dst[1], dst[2]);
}

#[test]
fn gaussian_kernel_sums_to_one() {
    let k = gaussian_kernel_q16(6, 2.0).unwrap();
    assert_eq!(k.len(), 13);
    assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);
    assert!(gaussian_kernel_q16(2, 0.0).is_err());
}

#[test]
fn blur_preserves_a_flat_image() {
    let a = solid(5, 4, [40, 80, 120, 255]);
    let k = gaussian_kernel_q16(3, 1.0).unwrap();
    let mut dst = vec![0u8; a.rgba8_premul.len()];
    let mut tmp = vec![0u8; a.rgba8_premul.len()];
    blur_rgba8_premul_q16(&a.rgba8_premul, &mut dst, &mut tmp, 5, 4, &k);
    assert_eq!(&dst, a.rgba8_premul.as_ref());
}

#[test]
fn backdrop_is_small_and_darkened() {
    let a = solid(40, 60, [200, 200, 200, 255]);
    let canvas = Canvas::new(108, 192).unwrap();
    let b = fit_backdrop(&a, canvas, &FitPolicy::default()).unwrap();
    assert!(b.width < canvas.width && b.height < canvas.height);
    let px = &b.rgba8_premul[..4];
    assert!(px[0] <= 81 && px[0] >= 79, "{px:?}");
}
