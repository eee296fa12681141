//! Compressor half of the workspace: turns a byte slice into a
//! Zstandard-compatible frame `rzstd_decompress::Decoder` can read back.
//! Mirrors `rzstd_decompress`'s module layout (`block`/`context`/`frame`/
//! `errors`/`window`/`dictionary`) from the encode side, plus the
//! match-finding and entropy-selection modules the decoder has no
//! counterpart for.

mod block;
mod context;
mod dictionary;
mod entropy;
mod errors;
mod frame;
mod matchfinders;
mod rep;
mod seq_store;
mod sequences;
mod stream;
mod tables;
mod window;

pub use dictionary::Dictionary;
pub use errors::Error;
pub use frame::{FrameParams, MAGIC_NUM, MAX_BLOCK_SIZE};
pub use stream::StreamEncoder;

pub use rzstd_foundation::{Operation, Progress};

use rzstd_foundation::cparams_for_level;

/// Compresses `input` at `level` (clamped to `[0, 19]`, see
/// `rzstd_foundation::cparams_for_level`) into a single frame.
pub fn compress(input: &[u8], level: i32, checksum: bool) -> Result<Vec<u8>, Error> {
    let cparams = cparams_for_level(level);
    frame::encode_frame(input, cparams, FrameParams { checksum }, None)
}

/// Compresses `input` against a previously loaded dictionary's content
/// and repeat-offset seed.
pub fn compress_with_dictionary(
    input: &[u8],
    level: i32,
    checksum: bool,
    dictionary: &[u8],
) -> Result<Vec<u8>, Error> {
    let cparams = cparams_for_level(level);
    let dict = Dictionary::load(dictionary);
    frame::encode_frame(input, cparams, FrameParams { checksum }, Some(&dict))
}

/// Thin stateful facade mirroring `rzstd_decompress::Decoder`'s naming: a
/// single-shot, whole-buffer encoder. For input that arrives
/// incrementally, see [`StreamEncoder`].
pub struct Encoder {
    level: i32,
    checksum: bool,
    dictionary: Option<Dictionary>,
}

impl Encoder {
    pub fn new(level: i32) -> Self {
        Self { level, checksum: false, dictionary: None }
    }

    pub fn with_checksum(mut self, checksum: bool) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn with_dictionary(mut self, dictionary: &[u8]) -> Self {
        self.dictionary = Some(Dictionary::load(dictionary));
        self
    }

    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>, Error> {
        let cparams = cparams_for_level(self.level);
        let params = FrameParams { checksum: self.checksum };
        frame::encode_frame(input, cparams, params, self.dictionary.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_produces_a_well_formed_frame() {
        let input = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let frame = compress(&input, 5, true).unwrap();
        assert_eq!(&frame[..4], &MAGIC_NUM.to_le_bytes());
        assert!(frame.len() < input.len());
    }

    #[test]
    fn encoder_facade_matches_free_function() {
        let input = b"repeated content repeated content repeated content".to_vec();
        let via_fn = compress(&input, 3, false).unwrap();
        let via_encoder = Encoder::new(3).compress(&input).unwrap();
        assert_eq!(via_fn, via_encoder);
    }

    #[test]
    fn dictionary_prefix_improves_small_input_compression() {
        let dictionary = b"the quick brown fox jumps over the lazy dog".repeat(5);
        let input = b"the quick brown fox jumps over the lazy dog".to_vec();

        let without = compress(&input, 3, false).unwrap();
        let with = compress_with_dictionary(&input, 3, false, &dictionary).unwrap();
        assert!(with.len() <= without.len());
    }
}
