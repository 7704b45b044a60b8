//! Property-based tests for the block decoder.
//!
//! - Reference-encoded blocks decode back to their input, at exactly the
//!   declared size
//! - Offsets of zero, or past the start of the output, are always rejected
//! - Partial reads yield a prefix of the full decompression

use proptest::prelude::*;

use lz4kit::{Lz4DecodeError, SliceReader, decode_lz4_block};

/// Bytes from a small alphabet, so the encoder finds plenty of matches.
fn repetitive_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(0u8..4, 0..4096),
        prop::collection::vec(any::<u8>(), 0..512),
    ]
}

/// A first sequence of `literals` followed by a match at `offset`.
fn block_with_offset(literals: &[u8], offset: u16, match_nibble: u8) -> Vec<u8> {
    assert!(literals.len() < 15);
    let mut block = vec![((literals.len() as u8) << 4) | match_nibble];
    block.extend_from_slice(literals);
    block.extend_from_slice(&offset.to_le_bytes());
    block.push(0x00);
    block
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_round_trip(plain in repetitive_bytes()) {
        prop_assume!(!plain.is_empty());
        let block = lz4_flex::block::compress(&plain);
        let out = decode_lz4_block(&mut SliceReader::new(&block), plain.len(), false);
        prop_assert_eq!(out, Ok(plain));
    }

    #[test]
    fn prop_never_longer_than_declared(plain in repetitive_bytes(), size in 0usize..5000) {
        prop_assume!(!plain.is_empty());
        let block = lz4_flex::block::compress(&plain);
        match decode_lz4_block(&mut SliceReader::new(&block), size, false) {
            Ok(out) => {
                prop_assert_eq!(out.len(), size);
                prop_assert_eq!(size, plain.len());
            }
            Err(e) => prop_assert!(matches!(
                e,
                Lz4DecodeError::OutputFull | Lz4DecodeError::OutOfData
            )),
        }
    }

    #[test]
    fn prop_partial_read_is_prefix(plain in repetitive_bytes(), cut in any::<prop::sample::Index>()) {
        prop_assume!(!plain.is_empty());
        let size = cut.index(plain.len());
        let block = lz4_flex::block::compress(&plain);
        let out = decode_lz4_block(&mut SliceReader::new(&block), size, true).unwrap();
        prop_assert_eq!(&out[..], &plain[..size]);
    }

    #[test]
    fn prop_zero_offset(
        literals in prop::collection::vec(any::<u8>(), 0..15),
        match_nibble in 0u8..15,
        size in 0usize..100_000,
    ) {
        let block = block_with_offset(&literals, 0, match_nibble);
        let out = decode_lz4_block(&mut SliceReader::new(&block), size.max(literals.len()), false);
        prop_assert_eq!(out, Err(Lz4DecodeError::ZeroOffset));
    }

    #[test]
    fn prop_offset_past_output(
        literals in prop::collection::vec(any::<u8>(), 0..15),
        excess in 1u16..1000,
        match_nibble in 0u8..15,
    ) {
        let offset = literals.len() as u16 + excess;
        let block = block_with_offset(&literals, offset, match_nibble);
        let out = decode_lz4_block(&mut SliceReader::new(&block), 100_000, false);
        prop_assert_eq!(out, Err(Lz4DecodeError::OffsetTooLarge));
    }

    #[test]
    fn prop_overlapping_repeat(b in any::<u8>(), match_nibble in 0u8..15) {
        let block = block_with_offset(&[b], 1, match_nibble);
        let len = 1 + match_nibble as usize + 4;
        let out = decode_lz4_block(&mut SliceReader::new(&block), len, false);
        prop_assert_eq!(out, Ok(vec![b; len]));
    }

    #[test]
    fn prop_garbage_never_panics(data in prop::collection::vec(any::<u8>(), 0..256), size in 0usize..2048) {
        let _ = decode_lz4_block(&mut SliceReader::new(&data), size, false);
        let _ = decode_lz4_block(&mut SliceReader::new(&data), size, true);
    }
}
