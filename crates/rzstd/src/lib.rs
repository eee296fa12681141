//! Facade over [`rzstd_compress`] and [`rzstd_decompress`]: one-shot
//! buffer-to-buffer `compress`/`decompress` plus an [`Error`] that wraps
//! both crates' errors so callers don't need to depend on either
//! directly.

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(code(rzstd::compress))]
    Compress(#[from] rzstd_compress::Error),

    #[error(transparent)]
    #[diagnostic(code(rzstd::decompress))]
    Decompress(#[from] rzstd_decompress::Error),
}

/// Compresses `input` at `level` (`0..=19`, see
/// `rzstd_foundation::cparams_for_level`) into a single frame.
pub fn compress(input: &[u8], level: i32, checksum: bool) -> Result<Vec<u8>, Error> {
    rzstd_compress::compress(input, level, checksum).map_err(Error::from)
}

/// Compresses `input` against a dictionary's content and repeat-offset
/// seed.
pub fn compress_with_dictionary(
    input: &[u8],
    level: i32,
    checksum: bool,
    dictionary: &[u8],
) -> Result<Vec<u8>, Error> {
    rzstd_compress::compress_with_dictionary(input, level, checksum, dictionary)
        .map_err(Error::from)
}

/// Decompresses a single frame. `max_window_size` bounds how large a
/// window buffer this call is willing to allocate, guarding against a
/// maliciously large `Window_Descriptor` in untrusted input.
pub fn decompress(input: &[u8], max_window_size: usize) -> Result<Vec<u8>, Error> {
    decompress_with_dictionary(input, max_window_size, None)
}

/// Decompresses a single frame against a previously loaded dictionary.
pub fn decompress_with_dictionary(
    input: &[u8],
    max_window_size: usize,
    dictionary: Option<&[u8]>,
) -> Result<Vec<u8>, Error> {
    let mut window_buffer = vec![0u8; max_window_size + rzstd_decompress::MAX_BLOCK_SIZE as usize];
    let mut decoder = rzstd_decompress::Decoder::new(input, &mut window_buffer, max_window_size);
    if let Some(dictionary) = dictionary {
        decoder = decoder.with_dictionary(dictionary);
    }

    let mut out = Vec::new();
    decoder.decode(&mut out).map_err(Error::from)?;
    Ok(out)
}

pub use rzstd_compress::{Dictionary as CompressDictionary, Encoder, StreamEncoder};
pub use rzstd_decompress::{Dictionary as DecompressDictionary, StreamDecoder};
pub use rzstd_foundation::{Operation, Progress};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_both_crates() {
        let input = b"the quick brown fox jumps over the lazy dog".repeat(30);
        let frame = compress(&input, 5, true).unwrap();
        let decoded = decompress(&frame, 8 * 1024 * 1024).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn round_trips_with_a_shared_dictionary() {
        let dictionary = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let input = b"the quick brown fox jumps over the lazy dog".to_vec();

        let frame = compress_with_dictionary(&input, 3, false, &dictionary).unwrap();
        let decoded =
            decompress_with_dictionary(&frame, 8 * 1024 * 1024, Some(&dictionary)).unwrap();
        assert_eq!(decoded, input);
    }
}
