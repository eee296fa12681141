//! Block encoder (C8, spec.md §4.3): runs the match finder over one
//! block's worth of the window, threads the raw back-reference offsets it
//! produced through a [`RepOffsets`] replay to get wire `offsetValue`s,
//! encodes the literals and sequences sections, and falls back to a raw
//! (or RLE) block whenever that would be smaller or the input is
//! degenerate.

use crate::context::Context;
use crate::sequences::{self, CodedSequence};
use crate::window::Window;
use crate::{Error, literals};

pub const HEADER_SIZE: usize = 3;

fn write_block_header(out: &mut Vec<u8>, last: bool, block_type: u8, size: u32) {
    let raw = (last as u32) | ((block_type as u32) << 1) | (size << 3);
    out.extend_from_slice(&raw.to_le_bytes()[..3]);
}

impl Context {
    /// Encodes `window[start..end)` as one block, appending it (header
    /// included) to `out`. `last` marks the frame's final block.
    pub fn encode_block(
        &mut self,
        window: &Window,
        start: u32,
        end: u32,
        last: bool,
        out: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let block_size = (end - start) as usize;

        if block_size == 0 {
            write_block_header(out, last, 0, 0);
            return Ok(());
        }

        let data = window.slice(start, end);
        if data.iter().all(|&b| b == data[0]) {
            write_block_header(out, last, 1, block_size as u32);
            out.push(data[0]);
            return Ok(());
        }

        let rep_before = self.rep;
        self.seq_store.clear();
        self.matchfinder.parse_block(window, start, end, &mut self.rep, &mut self.seq_store);

        let mut replay = rep_before;
        let coded: Vec<CodedSequence> = self
            .seq_store
            .sequences
            .iter()
            .map(|seq| {
                let offset_value = replay.resolve(seq.offset, seq.lit_len);
                CodedSequence::new(seq.lit_len, seq.match_len, offset_value)
            })
            .collect();
        debug_assert_eq!(replay.0, self.rep.0);

        let literals_out = literals::encode_literals(&self.seq_store.literals, self.last_huff.as_ref())?;
        let seq_out = sequences::encode_sequences(
            &coded,
            self.ll_stash.as_ref(),
            self.of_stash.as_ref(),
            self.ml_stash.as_ref(),
        )?;

        let compressed_size = literals_out.bytes.len() + seq_out.bytes.len();

        if compressed_size < block_size {
            write_block_header(out, last, 2, compressed_size as u32);
            out.extend_from_slice(&literals_out.bytes);
            out.extend_from_slice(&seq_out.bytes);

            self.last_huff = literals_out.stash;
            self.ll_stash = seq_out.ll_stash;
            self.of_stash = seq_out.of_stash;
            self.ml_stash = seq_out.ml_stash;
        } else {
            self.rep = rep_before;
            write_block_header(out, last, 0, block_size as u32);
            out.extend_from_slice(data);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rzstd_foundation::cparams_for_level;

    use super::*;

    fn compress_one_block(input: &[u8], level: i32) -> Vec<u8> {
        let cparams = cparams_for_level(level);
        let mut ctx = Context::new(cparams);
        let window = Window::no_dict(input);
        let mut out = Vec::new();
        ctx.encode_block(&window, 0, input.len() as u32, true, &mut out).unwrap();
        out
    }

    #[test]
    fn empty_block_is_zero_size_raw() {
        let out = compress_one_block(b"", 3);
        assert_eq!(out.len(), HEADER_SIZE);
        assert_eq!(out[0] & 1, 1); // last_block
        assert_eq!((out[0] >> 1) & 0x3, 0); // Raw
    }

    #[test]
    fn uniform_block_becomes_rle() {
        let input = vec![b'x'; 5000];
        let out = compress_one_block(&input, 3);
        assert_eq!((out[0] >> 1) & 0x3, 1); // RLE
        assert_eq!(out.len(), HEADER_SIZE + 1);
    }

    #[test]
    fn repetitive_block_compresses_smaller_than_raw() {
        let input = b"the quick brown fox jumps over the lazy dog. ".repeat(50);
        let out = compress_one_block(&input, 5);
        assert!(out.len() < input.len());
    }

    #[test]
    fn incompressible_block_falls_back_to_raw() {
        let input: Vec<u8> = (0..=255u8).cycle().take(300).collect();
        let out = compress_one_block(&input, 1);
        assert!(out.len() >= input.len());
    }
}
