use super::*;

#[test]
fn seeded_words_match_byte_stream() {
    let mut a = Fnv1a64::new(FNV_OFFSET_BASIS);
    a.write_u64(7);
    assert_eq!(a.finish(), fnv1a64(&7u64.to_le_bytes()));
}

#[test]
fn different_entries_hash_apart() {
    assert_ne!(fnv1a64(b"img-0"), fnv1a64(b"img-1"));
}

#[test]
fn mul_div255_rounds_and_saturates_at_identity() {
    assert_eq!(mul_div255_u16(255, 200), 200);
    assert_eq!(mul_div255_u16(0, 200), 0);
    assert_eq!(mul_div255_u16(128, 128), 64);
}
