use super::*;

const PROJECT: &str = r#"{
  "metadata": { "price": "R$ 900.000", "neighborhood": "Jardim Europa", "type": "APARTAMENTO" },
  "audio": "audio/trilha.mp3",
  "feed": [
    { "id": "img-0", "kind": "photo", "source": "fotos/sala.jpg" },
    { "id": "img-1", "kind": "photo" },
    { "id": "feed-closing", "kind": "closing", "source": "./artes/fim.png" }
  ],
  "reels": [
    { "id": "img-r-0", "kind": "photo", "source": "fotos/sala.jpg" },
    { "id": "reels-closing", "kind": "closing", "source": "artes/fim.png" }
  ]
}"#;

#[test]
fn normalize_rel_path_rejects_escapes() {
    assert_eq!(normalize_rel_path("./a//b\\c.png").unwrap(), "a/b/c.png");
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("a/../b.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn feed_timeline_resolves_sources_against_root() {
    let p = CreativeProject::from_json_str(PROJECT, "/proj").unwrap();
    let t = p.feed_timeline(TimingPolicy::default()).unwrap();
    assert_eq!(t.len(), 3);
    match &t.entries()[2].source {
        AssetSource::Path(path) => assert_eq!(path, &PathBuf::from("/proj/artes/fim.png")),
        other => panic!("unexpected source {other:?}"),
    }
    assert!(!t.entries()[1].source.is_bound());
}

#[test]
fn reels_without_cover_is_rejected() {
    let p = CreativeProject::from_json_str(PROJECT, "/proj").unwrap();
    let err = p.reels_timeline(TimingPolicy::default()).unwrap_err();
    assert!(matches!(err, VitrineError::InvariantViolation(_)));
}

#[test]
fn metadata_gets_defaults_and_audio_path() {
    let p = CreativeProject::from_json_str(PROJECT, "/proj").unwrap();
    let m = p.resolved_metadata().unwrap();
    assert_eq!(m.city, "Rio Claro");
    assert_eq!(m.location_prefix, "APTO NO");
    assert!(matches!(m.audio, AudioRef::Path(ref p) if p == &PathBuf::from("/proj/audio/trilha.mp3")));
}
