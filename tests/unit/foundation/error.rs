use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        VitrineError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        VitrineError::invariant("x")
            .to_string()
            .contains("invariant violation:")
    );
    assert!(
        VitrineError::capture_unsupported("x")
            .to_string()
            .contains("capture unsupported:")
    );
    assert!(
        VitrineError::audio_unavailable("x")
            .to_string()
            .contains("audio source unavailable:")
    );
    assert!(
        VitrineError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        VitrineError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn asset_decode_names_the_entry() {
    let err = VitrineError::asset_decode("img-3", "bad magic");
    let msg = err.to_string();
    assert!(msg.contains("img-3"));
    assert!(msg.contains("bad magic"));
}

#[test]
fn out_of_range_reports_indices() {
    let err = VitrineError::OutOfRange {
        from: 0,
        to: 5,
        len: 4,
    };
    assert_eq!(err.to_string(), "index out of range: from=0 to=5 len=4");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = VitrineError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
