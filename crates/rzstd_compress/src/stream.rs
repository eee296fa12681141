//! Streaming compression engine (C12, spec.md §4.11): a push-style
//! encoder that accepts input incrementally across many calls instead of
//! requiring the whole buffer up front, suspending and resuming between
//! calls rather than blocking until a full frame is ready.
//!
//! Internally this is the same per-block pipeline `frame::encode_frame`
//! drives (`Context::encode_block` over a `Window`), just fed from a
//! window that grows one `push` at a time instead of being built once
//! from a complete `&[u8]`, and with the frame header written the moment
//! the first bytes arrive rather than after the whole input is known.

use xxhash_rust::xxh64::Xxh64;

use rzstd_foundation::{CParams, Operation, Progress};

use crate::Error;
use crate::context::Context;
use crate::dictionary::Dictionary;
use crate::frame::{self, MAGIC_NUM, MAX_BLOCK_SIZE};
use crate::window::Window;

/// Streaming counterpart to [`crate::Encoder`]. Construct once per frame,
/// feed it input with [`StreamEncoder::compress_stream`] as it becomes
/// available, and pass [`Operation::End`] on the final call to finalize
/// the frame (write the last block and, if enabled, the checksum).
pub struct StreamEncoder {
    ctx: Context,
    window: Window<'static>,
    cparams: CParams,
    checksum: bool,
    dictionary_id: u32,
    pos: u32,
    block_max: u32,
    header_written: bool,
    hasher: Option<Xxh64>,
    done: bool,
}

impl StreamEncoder {
    pub fn new(level: i32, checksum: bool) -> Self {
        Self::build(level, checksum, None)
    }

    pub fn with_dictionary(level: i32, checksum: bool, dictionary: &[u8]) -> Self {
        Self::build(level, checksum, Some(Dictionary::load(dictionary)))
    }

    fn build(level: i32, checksum: bool, dict: Option<Dictionary>) -> Self {
        let cparams = rzstd_foundation::cparams_for_level(level);
        let mut ctx = Context::new(cparams);
        ctx.reset(cparams, dict.as_ref().map(|d| d.rep));

        let dictionary_id = dict.as_ref().map_or(0, |d| d.id);
        let dict_content = dict.map_or_else(Vec::new, |d| d.content);
        let window = Window::owned(dict_content);
        let pos = window.dict_limit();
        let block_max = (MAX_BLOCK_SIZE as u64).min(1u64 << cparams.window_log) as u32;

        Self {
            ctx,
            window,
            cparams,
            checksum,
            dictionary_id,
            pos,
            block_max,
            header_written: false,
            hasher: checksum.then(|| Xxh64::new(0)),
            done: false,
        }
    }

    /// Feeds `input` (which is always fully consumed and appended to the
    /// internal window) and drives as much of the pipeline as `op`
    /// permits, appending any produced bytes to `dst`.
    ///
    /// - `Operation::Continue` buffers input until a full block's worth
    ///   is available, then emits blocks as they fill.
    /// - `Operation::Flush` additionally emits whatever is buffered as a
    ///   (non-last) block, even if under the target block size, so the
    ///   caller can observe output sooner.
    /// - `Operation::End` finalizes the frame: emits a last block (even
    ///   an empty one, if nothing was pending) and the checksum. No
    ///   further calls should feed new input afterward.
    pub fn compress_stream(
        &mut self,
        input: &[u8],
        dst: &mut Vec<u8>,
        op: Operation,
    ) -> Result<Progress, Error> {
        if self.done {
            return Ok(Progress {
                bytes_consumed: 0,
                bytes_produced: 0,
                suggested_next_input_size: self.block_max as usize,
                done: true,
            });
        }

        let window_size = 1u64 << self.cparams.window_log;
        if window_size > crate::frame::MAX_WINDOW_SIZE {
            return Err(Error::WindowSizeOutOfBounds(window_size));
        }

        let out_start = dst.len();

        if !self.header_written {
            dst.extend_from_slice(&MAGIC_NUM.to_le_bytes());
            frame::write_streaming_frame_header(
                dst,
                self.cparams.window_log,
                self.dictionary_id,
                self.checksum,
            );
            self.header_written = true;
        }

        self.window.push(input);
        let bytes_consumed = input.len();

        let force_flush = matches!(op, Operation::Flush | Operation::End);
        loop {
            let available = self.window.len() as u32 - self.pos;
            let full_block_ready = available >= self.block_max;
            if !full_block_ready && !(force_flush && available > 0) {
                break;
            }

            let block_end = if full_block_ready { self.pos + self.block_max } else { self.window.len() as u32 };
            let last = matches!(op, Operation::End) && block_end == self.window.len() as u32;

            self.ctx.encode_block(&self.window, self.pos, block_end, last, dst)?;
            if let Some(h) = self.hasher.as_mut() {
                h.update(self.window.slice(self.pos, block_end));
            }
            self.pos = block_end;

            if last {
                self.finish(dst);
                break;
            }
            if !full_block_ready {
                break;
            }
        }

        if matches!(op, Operation::End) && !self.done {
            // Nothing was pending to trigger the loop above (e.g. input
            // length is an exact multiple of block_max, or this is an
            // End with no input at all): still need to emit the last
            // block, possibly empty, to close the frame.
            self.ctx.encode_block(&self.window, self.pos, self.pos, true, dst)?;
            self.finish(dst);
        }

        Ok(Progress {
            bytes_consumed,
            bytes_produced: dst.len() - out_start,
            suggested_next_input_size: self.block_max as usize,
            done: self.done,
        })
    }

    fn finish(&mut self, dst: &mut Vec<u8>) {
        if let Some(h) = self.hasher.take() {
            dst.extend_from_slice(&(h.digest() as u32).to_le_bytes());
        }
        self.done = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(frame: &[u8]) -> Vec<u8> {
        let mut window_buffer = vec![0u8; 8 * 1024 * 1024 + rzstd_decompress::MAX_BLOCK_SIZE as usize];
        let mut decoder = rzstd_decompress::Decoder::new(frame, &mut window_buffer, 8 * 1024 * 1024);
        let mut out = Vec::new();
        decoder.decode(&mut out).unwrap();
        out
    }

    #[test]
    fn single_end_call_matches_one_shot_compress() {
        let input = b"the quick brown fox jumps over the lazy dog".repeat(20);

        let one_shot = crate::compress(&input, 5, true).unwrap();

        let mut stream = StreamEncoder::new(5, true);
        let mut out = Vec::new();
        let progress = stream.compress_stream(&input, &mut out, Operation::End).unwrap();
        assert!(progress.done);
        assert_eq!(progress.bytes_consumed, input.len());

        assert_eq!(decode(&out), decode(&one_shot));
    }

    #[test]
    fn partitioning_input_across_many_calls_round_trips() {
        let input = b"streaming content streaming content streaming content ".repeat(500);

        let mut stream = StreamEncoder::new(3, true);
        let mut out = Vec::new();
        for chunk in input.chunks(37) {
            let progress = stream.compress_stream(chunk, &mut out, Operation::Continue).unwrap();
            assert_eq!(progress.bytes_consumed, chunk.len());
            assert!(!progress.done);
        }
        let progress = stream.compress_stream(&[], &mut out, Operation::End).unwrap();
        assert!(progress.done);

        assert_eq!(decode(&out), input);
    }

    #[test]
    fn flush_makes_output_available_before_end() {
        let mut stream = StreamEncoder::new(3, false);
        let mut out = Vec::new();
        let progress = stream.compress_stream(b"short chunk", &mut out, Operation::Flush).unwrap();
        assert!(progress.bytes_produced > 0);
        assert!(!progress.done);

        let progress = stream.compress_stream(b" more data", &mut out, Operation::End).unwrap();
        assert!(progress.done);

        assert_eq!(decode(&out), b"short chunk more data");
    }

    #[test]
    fn empty_input_end_produces_a_valid_empty_frame() {
        let mut stream = StreamEncoder::new(3, false);
        let mut out = Vec::new();
        let progress = stream.compress_stream(&[], &mut out, Operation::End).unwrap();
        assert!(progress.done);
        assert!(decode(&out).is_empty());
    }

    #[test]
    fn calls_after_done_are_inert() {
        let mut stream = StreamEncoder::new(3, false);
        let mut out = Vec::new();
        stream.compress_stream(b"data", &mut out, Operation::End).unwrap();
        let len_before = out.len();
        let progress = stream.compress_stream(b"ignored", &mut out, Operation::Continue).unwrap();
        assert!(progress.done);
        assert_eq!(progress.bytes_consumed, 0);
        assert_eq!(out.len(), len_before);
    }
}
