use voxell_rng::rng::XorShift128;

use crate::compressor::Compressor;

const SHORT_DATA: &[u8] = b"Hello, World!";
const LONG_DATA: &[u8] =
    b"This is a longer string to test the huffman coding algorithm. It should be able to handle various lengths and characters.";
const REPEATING_DATA: &[u8] = b"a baba da babble da dabble babble doo bee babble dabble dooble dee boo dooble daddle boo";
const SINGLE_BYTE: &[u8] = b"x";
const SINGLE_SYMBOL_RUN: &[u8] = &[0u8; 300];
const SKEWED_DATA: &[u8] = b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAB";

fn rng_data() -> Vec<u8> {
    let mut data = Vec::with_capacity(1000);
    let mut rng = XorShift128::new(0xdeadcafe);
    for _ in 0..1000 {
        let next = rng.peek_next_u64();
        data.push((next & 0xFF) as u8);
        rng = XorShift128::new(next);
    }
    data
}

fn all_bytes() -> Vec<u8> {
    (0..=255u8).chain((0..=255u8).rev()).collect()
}

fn test_cases() -> Vec<(Vec<u8>, &'static str)> {
    vec![
        (REPEATING_DATA.to_vec(), "repeating data"),
        (SHORT_DATA.to_vec(), "short data"),
        (LONG_DATA.to_vec(), "long data"),
        (SINGLE_BYTE.to_vec(), "single byte"),
        (SINGLE_SYMBOL_RUN.to_vec(), "single symbol run"),
        (SKEWED_DATA.to_vec(), "skewed data"),
        (rng_data(), "rng data"),
        (all_bytes(), "every byte value"),
    ]
}

pub fn roundtrip_test<C: Compressor>(mut compressor: C) {
    for (test_case, test_name) in test_cases() {
        match compressor.test_roundtrip(&test_case) {
            Ok(eq) => {
                let ratio = compression_ratio(eq.get_original(), eq.get_compressed());

                eprintln!(
                    "Compression ratio for {} with {}: {:.2}%",
                    test_name,
                    compressor.compressor_name(),
                    ratio * 100.0
                );

                assert!(
                    eq.is_successful(),
                    "Roundtrip test for {} failed at {}:\n\tExpected: {:?}\n\tGot: {:?}\n\tCompressed: {:?}",
                    compressor.compressor_name(),
                    test_name,
                    eq.get_original(),
                    eq.get_decompressed(),
                    eq.get_compressed(),
                );
            }
            Err(e) => {
                panic!(
                    "Fatal error while trying to compress/decompress {} with {}: {}",
                    test_name,
                    compressor.compressor_name(),
                    e
                );
            }
        }
    }
}

pub fn compression_ratio(original: &[u8], compressed: &[u8]) -> f64 {
    if original.is_empty() {
        return 0.0;
    }
    compressed.len() as f64 / original.len() as f64
}

#[test]
fn empty_data_cannot_be_modelled() {
    use crate::algorithms::huffman::HuffmanCoding;

    let mut compressor = HuffmanCoding::default();
    assert!(compressor.test_roundtrip(&[]).is_err());
}

#[test]
fn rng_data_is_deterministic() {
    assert_eq!(rng_data(), rng_data());
    assert_eq!(rng_data().len(), 1000);
}
