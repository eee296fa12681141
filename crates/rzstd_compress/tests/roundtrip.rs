//! Whole-frame round trips through `rzstd_decompress`: every frame this
//! crate produces must decode back to the exact input it was built from,
//! across levels, checksum on/off, and with/without a dictionary.

use proptest::prelude::*;

const MAX_WINDOW: usize = 8 * 1024 * 1024;

fn decompress(frame: &[u8], dictionary: Option<&[u8]>) -> Vec<u8> {
    let mut window_buffer = vec![0u8; MAX_WINDOW + rzstd_decompress::MAX_BLOCK_SIZE as usize];
    let mut decoder = rzstd_decompress::Decoder::new(frame, &mut window_buffer, MAX_WINDOW);
    if let Some(dictionary) = dictionary {
        decoder = decoder.with_dictionary(dictionary);
    }
    let mut out = Vec::new();
    decoder.decode(&mut out).expect("decode should succeed");
    out
}

#[test]
fn empty_input_round_trips() {
    let frame = rzstd_compress::compress(b"", 3, true).unwrap();
    assert_eq!(decompress(&frame, None), b"");
}

#[test]
fn every_level_round_trips_repetitive_input() {
    let input = b"she sells sea shells by the sea shore".repeat(200);
    for level in 0..=19 {
        let frame = rzstd_compress::compress(&input, level, level % 2 == 0).unwrap();
        assert_eq!(decompress(&frame, None), input, "level {level}");
    }
}

#[test]
fn dictionary_round_trips() {
    let dictionary = b"common prefix text shared across many small payloads. ".repeat(10);
    let input = b"common prefix text shared across many small payloads, plus a tail.".to_vec();

    let frame =
        rzstd_compress::compress_with_dictionary(&input, 6, true, &dictionary).unwrap();
    assert_eq!(decompress(&frame, Some(&dictionary)), input);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn arbitrary_bytes_round_trip(
        data in proptest::collection::vec(any::<u8>(), 0..20_000),
        level in 1i32..=9,
        checksum: bool,
    ) {
        let frame = rzstd_compress::compress(&data, level, checksum).unwrap();
        let decoded = decompress(&frame, None);
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn highly_repetitive_bytes_round_trip(
        pattern in proptest::collection::vec(any::<u8>(), 1..64),
        repeats in 1usize..400,
        level in 1i32..=19,
    ) {
        let data: Vec<u8> = pattern.iter().copied().cycle().take(pattern.len() * repeats).collect();
        let frame = rzstd_compress::compress(&data, level, false).unwrap();
        let decoded = decompress(&frame, None);
        prop_assert_eq!(decoded, data);
    }
}
