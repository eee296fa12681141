//! Streaming decompression engine (C12, spec.md §4.11): a push-style
//! decoder that consumes compressed bytes incrementally across many
//! calls instead of blocking on a complete [`std::io::Read`], suspending
//! until more input arrives whenever the next step needs bytes that
//! haven't been supplied yet.
//!
//! The trick making this safe to build on top of the existing blocking
//! parsers (`frame::Header::read`, `Context::block`) without duplicating
//! them: every parse step this module attempts has an exact, knowable
//! byte length before it runs — a frame header's length follows from its
//! first descriptor byte, and a block's body length is exactly
//! `block::Header::content_size()` once its 3-byte header is in hand.
//! `decompress_stream` always peeks that a step's full byte range is
//! already buffered (rewinding the internal cursor if not) before
//! running it for real, so no step is ever abandoned partway through
//! with mutated state to unwind.

use std::io::Cursor;

use rzstd_foundation::Progress;
use xxhash_rust::xxh64::Xxh64;

use crate::{MAGIC_NUM, block, context::Context, dictionary::Dictionary, errors::Error, frame};

const SKIPPABLE_MAGIC_LOW: u32 = 0x184D_2A50;
const SKIPPABLE_MAGIC_HIGH: u32 = 0x184D_2A5F;

fn is_eof(err: &Error) -> bool {
    matches!(err, Error::IO(rzstd_io::Error::IO(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof)
}

/// `Cursor<Vec<u8>>` is a concrete type here rather than a generic
/// `R: rzstd_io::Reader`, so the crate's usual `read_u32()` extension
/// method (resolved elsewhere via a generic bound) isn't in scope;
/// reading the 4 bytes directly is simpler than re-exporting the trait.
fn read_u32(src: &mut Cursor<Vec<u8>>) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    std::io::Read::read_exact(src, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

enum Stage {
    BeforeFrame,
    InFrame { flushed_idx: usize, hasher: Option<Xxh64> },
    AwaitingChecksum { hasher: Xxh64 },
}

/// Streaming counterpart to [`crate::Decoder`]. Construct once (it owns
/// no frame state yet), then feed it compressed bytes as they arrive with
/// [`StreamDecoder::decompress_stream`]; it writes decompressed output to
/// the given writer as soon as enough input has accumulated to produce
/// it, and may span any number of concatenated frames.
pub struct StreamDecoder<'b> {
    ctx: Context<'b, Cursor<Vec<u8>>>,
    dictionary: Option<Dictionary>,
    stage: Stage,
}

impl<'b> StreamDecoder<'b> {
    pub fn new(dst: &'b mut [u8], window_size: usize) -> Self {
        Self {
            ctx: Context::new(Cursor::new(Vec::new()), dst, window_size),
            dictionary: None,
            stage: Stage::BeforeFrame,
        }
    }

    pub fn with_dictionary(mut self, dictionary: &[u8]) -> Self {
        self.dictionary = Some(Dictionary::load(dictionary));
        self
    }

    /// Drops already-consumed bytes from the front of the internal
    /// buffer so it doesn't grow without bound across a long stream.
    fn compact(&mut self) {
        let pos = self.ctx.src.position() as usize;
        if pos == 0 {
            return;
        }
        self.ctx.src.get_mut().drain(..pos);
        self.ctx.src.set_position(0);
    }

    fn available(&self) -> usize {
        self.ctx.src.get_ref().len() - self.ctx.src.position() as usize
    }

    pub fn decompress_stream(
        &mut self,
        input: &[u8],
        writer: &mut impl std::io::Write,
    ) -> Result<Progress, Error> {
        self.compact();
        self.ctx.src.get_mut().extend_from_slice(input);
        let bytes_consumed = input.len();
        let mut bytes_produced = 0usize;

        loop {
            match &self.stage {
                Stage::BeforeFrame => {
                    let save = self.ctx.src.position();
                    let magic = match read_u32(&mut self.ctx.src) {
                        Ok(m) => m,
                        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                            self.ctx.src.set_position(save);
                            break;
                        }
                        Err(e) => return Err(Error::from(e)),
                    };

                    if (SKIPPABLE_MAGIC_LOW..=SKIPPABLE_MAGIC_HIGH).contains(&magic) {
                        let size = match read_u32(&mut self.ctx.src) {
                            Ok(s) => s,
                            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                                self.ctx.src.set_position(save);
                                break;
                            }
                            Err(e) => return Err(Error::from(e)),
                        };
                        if self.available() < size as usize {
                            self.ctx.src.set_position(save);
                            break;
                        }
                        let skip_to = self.ctx.src.position() + size as u64;
                        self.ctx.src.set_position(skip_to);
                        continue;
                    }

                    if magic != MAGIC_NUM {
                        return Err(Error::InvalidMagicNum(magic));
                    }

                    let header = match frame::Header::read(&mut self.ctx.src) {
                        Ok(h) => h,
                        Err(e) if is_eof(&e) => {
                            self.ctx.src.set_position(save);
                            break;
                        }
                        Err(e) => return Err(e),
                    };

                    let window_size = header.window_size()? as usize;
                    if let (Some(expected), Some(dict)) = (header.dictionary_id(), self.dictionary.as_ref())
                        && expected != dict.id
                    {
                        return Err(Error::WrongDictionary { expected, loaded: dict.id });
                    }

                    self.ctx.reset(window_size, self.dictionary.as_ref());
                    let flushed_idx = self.ctx.window_buf.index();
                    let hasher = header.has_checksum().then(|| Xxh64::new(0));
                    self.stage = Stage::InFrame { flushed_idx, hasher };
                }

                Stage::InFrame { .. } => {
                    let save = self.ctx.src.position();
                    let block_header = match block::Header::read(&mut self.ctx.src) {
                        Ok(h) => h,
                        Err(e) if is_eof(&e) => {
                            self.ctx.src.set_position(save);
                            break;
                        }
                        Err(e) => return Err(e),
                    };
                    let needed = block_header.content_size() as usize;
                    if self.available() < needed {
                        self.ctx.src.set_position(save);
                        break;
                    }
                    self.ctx.src.set_position(save);

                    let last = self.ctx.block()?;

                    let (flushed_idx, hasher) = match &mut self.stage {
                        Stage::InFrame { flushed_idx, hasher } => (flushed_idx, hasher),
                        _ => unreachable!("stage cannot change between the peek above and here"),
                    };
                    let current_idx = self.ctx.window_buf.index();
                    if current_idx < *flushed_idx {
                        *flushed_idx = 0;
                    }
                    let data = &self.ctx.window_buf.as_slice()[*flushed_idx..current_idx];
                    if let Some(h) = hasher.as_mut() {
                        h.update(data);
                    }
                    writer.write_all(data).map_err(Error::from)?;
                    bytes_produced += data.len();
                    *flushed_idx = current_idx;

                    if last {
                        self.stage = match hasher.take() {
                            Some(h) => Stage::AwaitingChecksum { hasher: h },
                            None => Stage::BeforeFrame,
                        };
                    }
                }

                Stage::AwaitingChecksum { .. } => {
                    let save = self.ctx.src.position();
                    let checksum = match read_u32(&mut self.ctx.src) {
                        Ok(c) => c,
                        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                            self.ctx.src.set_position(save);
                            break;
                        }
                        Err(e) => return Err(Error::from(e)),
                    };
                    let Stage::AwaitingChecksum { hasher } = &self.stage else { unreachable!() };
                    let computed = hasher.digest() as u32;
                    if checksum != computed {
                        return Err(Error::ChecksumMismatch { expected: checksum, computed });
                    }
                    self.stage = Stage::BeforeFrame;
                }
            }
        }

        let done = matches!(self.stage, Stage::BeforeFrame) && self.available() == 0;
        Ok(Progress {
            bytes_consumed,
            bytes_produced,
            suggested_next_input_size: crate::MAX_BLOCK_SIZE as usize,
            done,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compress(input: &[u8], level: i32, checksum: bool) -> Vec<u8> {
        rzstd_compress::compress(input, level, checksum).unwrap()
    }

    #[test]
    fn feeding_one_byte_at_a_time_reproduces_the_input() {
        let input = b"the quick brown fox jumps over the lazy dog".repeat(30);
        let frame = compress(&input, 5, true);

        let mut window_buffer = vec![0u8; 8 * 1024 * 1024 + crate::MAX_BLOCK_SIZE as usize];
        let mut decoder = StreamDecoder::new(&mut window_buffer, 8 * 1024 * 1024);
        let mut out = Vec::new();
        let mut done = false;
        for byte in &frame {
            let progress = decoder.decompress_stream(std::slice::from_ref(byte), &mut out).unwrap();
            done = done || progress.done;
        }
        assert!(done);
        assert_eq!(out, input);
    }

    #[test]
    fn feeding_the_whole_frame_at_once_matches_one_shot() {
        let input = b"streaming decode streaming decode streaming decode ".repeat(200);
        let frame = compress(&input, 3, true);

        let mut window_buffer = vec![0u8; 8 * 1024 * 1024 + crate::MAX_BLOCK_SIZE as usize];
        let mut decoder = StreamDecoder::new(&mut window_buffer, 8 * 1024 * 1024);
        let mut out = Vec::new();
        let progress = decoder.decompress_stream(&frame, &mut out).unwrap();
        assert!(progress.done);
        assert_eq!(out, input);
    }

    #[test]
    fn arbitrary_chunk_boundaries_round_trip() {
        let input: Vec<u8> = (0..4000u32).map(|i| (i % 251) as u8).collect();
        let frame = compress(&input, 7, false);

        let mut window_buffer = vec![0u8; 8 * 1024 * 1024 + crate::MAX_BLOCK_SIZE as usize];
        let mut decoder = StreamDecoder::new(&mut window_buffer, 8 * 1024 * 1024);
        let mut out = Vec::new();
        for chunk in frame.chunks(7) {
            decoder.decompress_stream(chunk, &mut out).unwrap();
        }
        assert_eq!(out, input);
    }

    #[test]
    fn two_concatenated_frames_both_decode() {
        let a = b"first frame payload".repeat(10);
        let b = b"second frame payload, different content".repeat(10);
        let mut frames = compress(&a, 3, false);
        frames.extend_from_slice(&compress(&b, 3, false));

        let mut window_buffer = vec![0u8; 8 * 1024 * 1024 + crate::MAX_BLOCK_SIZE as usize];
        let mut decoder = StreamDecoder::new(&mut window_buffer, 8 * 1024 * 1024);
        let mut out = Vec::new();
        decoder.decompress_stream(&frames, &mut out).unwrap();

        let mut expected = a;
        expected.extend_from_slice(&b);
        assert_eq!(out, expected);
    }
}
