use super::*;

#[test]
fn frame_to_sample_uses_rational_fps() {
    // 30000/1001 ~ 29.97
    let fps = Fps {
        num: 30_000,
        den: 1001,
    };
    assert_eq!(frame_to_sample(0, fps, 48_000), 0);
    assert_eq!(frame_to_sample(30_000, fps, 48_000), 48_048_000);
}

#[test]
fn whole_fps_maps_frames_to_exact_sample_blocks() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(frame_to_sample(1, fps, 48_000), 1_600);
    assert_eq!(frame_to_sample(614, fps, 48_000), 982_400);
}

#[test]
fn gain_scales_and_clamps() {
    let mut block = vec![0.25, -0.75, 0.9];
    apply_gain(&mut block, 2.0);
    assert_eq!(block, vec![0.5, -1.0, 1.0]);
}

#[test]
fn f32le_file_is_little_endian_samples() {
    let path = std::env::temp_dir().join(format!("vitrine_mix_test_{}.f32le", std::process::id()));
    write_f32le_file(&[1.0, -0.5], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes(bytes[4..8].try_into().unwrap()), -0.5);
}
