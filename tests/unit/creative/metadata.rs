use super::*;

#[test]
fn defaults_fill_only_empty_fields() {
    let m = CreativeMetadata {
        price: "R$ 500.000".into(),
        property_type: PropertyType::Apartment,
        ..Default::default()
    }
    .with_defaults();
    assert_eq!(m.price, "R$ 500.000");
    assert_eq!(m.neighborhood, "Bairro");
    assert_eq!(m.city, "Rio Claro");
    assert_eq!(m.parking, "0");
    assert_eq!(m.location_prefix, "APTO NO");
}

#[test]
fn merge_applies_present_fields_and_prefix_from_type() {
    let base = CreativeMetadata {
        city: "Campinas".into(),
        location_prefix: "LOTE NO".into(),
        ..Default::default()
    };
    let merged = base.merged(PartialMetadata {
        neighborhood: Some("Centro".into()),
        city: Some("  ".into()),
        property_type: Some(PropertyType::Apartment),
        ..Default::default()
    });
    assert_eq!(merged.neighborhood, "Centro");
    assert_eq!(merged.city, "Campinas");
    assert_eq!(merged.location_prefix, "APTO NO");
    assert_eq!(base.location_prefix, "LOTE NO");
}

#[test]
fn extractor_json_uses_listing_field_names() {
    let p: PartialMetadata =
        serde_json::from_str(r#"{ "type": "CASA", "negotiation": "ALUGA", "beds": "3" }"#)
            .unwrap();
    assert_eq!(p.property_type, Some(PropertyType::House));
    assert_eq!(p.negotiation, Some(NegotiationType::Rent));
    assert_eq!(p.beds.as_deref(), Some("3"));
}
