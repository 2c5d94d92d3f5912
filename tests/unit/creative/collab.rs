use super::*;

struct Fixed(Option<PartialMetadata>);

impl MetadataExtractor for Fixed {
    fn extract(&self, _input: &str) -> Option<PartialMetadata> {
        self.0.clone()
    }
}

struct Failing;

impl CaptionGenerator for Failing {
    fn generate(&self, _metadata: &CreativeMetadata) -> Option<Captions> {
        None
    }
}

#[test]
fn null_extraction_leaves_fields_unset() {
    let base = CreativeMetadata {
        price: "R$ 1".into(),
        ..Default::default()
    };
    let out = apply_extraction(&base, &Fixed(None), "texto");
    assert_eq!(out.price, "R$ 1");
    assert!(out.neighborhood.is_empty());
}

#[test]
fn extraction_merges_present_fields() {
    let out = apply_extraction(
        &CreativeMetadata::default(),
        &Fixed(parse_extraction_json(r#"{ "price": "R$ 2", "city": "Limeira" }"#)),
        "texto",
    );
    assert_eq!(out.price, "R$ 2");
    assert_eq!(out.city, "Limeira");
}

#[test]
fn malformed_or_empty_extraction_is_none() {
    assert!(parse_extraction_json("not json").is_none());
    assert!(parse_extraction_json("{}").is_none());
}

#[test]
fn caption_failures_fall_back() {
    let c = captions_or_fallback(&Failing, &CreativeMetadata::default());
    assert_eq!(c, Captions::fallback());
    assert_eq!(Captions::from_response_json("{").feed, "Oportunidade!");
    let parsed = Captions::from_response_json(r#"{ "feed": "a", "reels": "b" }"#);
    assert_eq!(parsed.reels, "b");
}
