//! Frame encoder (C10, spec.md §4.10): magic number, frame header
//! (descriptor + window descriptor + optional dictionary id + content
//! size), the block loop, and the optional xxh64 content checksum.
//! Mirrors `rzstd_decompress::frame::Header::read`'s field layout in
//! reverse.

use rzstd_foundation::CParams;
use xxhash_rust::xxh64::Xxh64;

use crate::Error;
use crate::context::Context;
use crate::dictionary::Dictionary;
use crate::window::Window;

pub const MAGIC_NUM: u32 = 0xFD2F_B528;
pub const MAX_BLOCK_SIZE: u32 = 128 * 1024;
/// Matches `rzstd_decompress::MAX_WINDOW_SIZE`: the format's hard ceiling
/// on window size regardless of requested compression level.
pub(crate) const MAX_WINDOW_SIZE: u64 = 128 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameParams {
    pub checksum: bool,
}

/// Smallest `(flag, field_bytes, wire_value)` that can carry
/// `content_size`, mirroring `rzstd_decompress::frame::FCSFieldSize` and
/// its `offset()` (only the 2-byte format subtracts 256 on read, so it is
/// the only one that needs to add it back here).
fn fcs_params(content_size: u64, single_segment: bool) -> (u8, usize, u64) {
    if single_segment && content_size < 256 {
        (0, 1, content_size)
    } else if !single_segment && content_size < 256 {
        // The 2-byte (flag 1) field can only carry values >= 256 (it
        // stores `content_size - 256`); outside single-segment mode there
        // is no 1-byte form, so flag 0 here means "absent" instead of
        // "present in 1 byte". Omit it — the decoder doesn't need
        // `content_size` once it has a window descriptor, it just relies
        // on `last_block` to know when the frame ends.
        (0, 0, 0)
    } else if content_size < 256 + 65536 {
        (1, 2, content_size - 256)
    } else if content_size <= u32::MAX as u64 {
        (2, 4, content_size)
    } else {
        (3, 8, content_size)
    }
}

pub(crate) fn did_params(dictionary_id: u32) -> (u8, usize) {
    if dictionary_id == 0 {
        (0, 0)
    } else if dictionary_id < 256 {
        (1, 1)
    } else if dictionary_id < 65536 {
        (2, 2)
    } else {
        (3, 4)
    }
}

fn write_frame_header(
    out: &mut Vec<u8>,
    content_size: u64,
    window_size: u64,
    window_log: u8,
    dictionary_id: u32,
    checksum: bool,
    has_dictionary: bool,
) {
    // Single-segment mode omits the window descriptor and lets the
    // decoder size its window from content_size alone. That is wrong
    // whenever a dictionary is in play: the encoder may reference back
    // into the dictionary prefix well past content_size, so the decoder
    // needs the real window size to know how much of the dictionary to
    // keep.
    let single_segment = !has_dictionary && content_size <= window_size;
    let (fcs_flag, fcs_bytes, fcs_value) = fcs_params(content_size, single_segment);
    let (did_flag, did_bytes) = did_params(dictionary_id);

    let descriptor = (fcs_flag << 6) | ((single_segment as u8) << 5) | ((checksum as u8) << 2) | did_flag;
    out.push(descriptor);

    if !single_segment {
        let exponent = window_log - 10;
        out.push(exponent << 3);
    }

    out.extend_from_slice(&dictionary_id.to_le_bytes()[..did_bytes]);
    out.extend_from_slice(&fcs_value.to_le_bytes()[..fcs_bytes]);
}

/// Frame header for the streaming encoder (C12, spec.md §4.11): content
/// size is never known up front (input arrives incrementally and the
/// frame may be finalized after any number of blocks), so this always
/// writes non-single-segment mode with the FCS field omitted entirely
/// (flag 0, 0 bytes) — mirroring `fcs_params`'s own "omitted" branch, but
/// unconditionally rather than only for small inputs. The decoder relies
/// on each block's `last_block` flag to know where the frame ends, same
/// as it always does.
pub(crate) fn write_streaming_frame_header(
    out: &mut Vec<u8>,
    window_log: u8,
    dictionary_id: u32,
    checksum: bool,
) {
    let (did_flag, did_bytes) = did_params(dictionary_id);
    let descriptor = ((checksum as u8) << 2) | did_flag;
    out.push(descriptor);
    out.push((window_log - 10) << 3);
    out.extend_from_slice(&dictionary_id.to_le_bytes()[..did_bytes]);
}

/// Encodes `input` as a single frame at the given `cparams`, optionally
/// against a loaded dictionary. `cparams.window_log` is used directly as
/// the frame's window size (a power of two; the window descriptor's
/// mantissa is always 0), matching the levels table in
/// `rzstd_foundation`.
pub fn encode_frame(
    input: &[u8],
    cparams: CParams,
    params: FrameParams,
    dict: Option<&Dictionary>,
) -> Result<Vec<u8>, Error> {
    let window_size = 1u64 << cparams.window_log;
    if window_size > MAX_WINDOW_SIZE {
        return Err(Error::WindowSizeOutOfBounds(window_size));
    }

    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC_NUM.to_le_bytes());

    let content_size = input.len() as u64;
    let dictionary_id = dict.map_or(0, |d| d.id);
    write_frame_header(
        &mut out,
        content_size,
        window_size,
        cparams.window_log,
        dictionary_id,
        params.checksum,
        dict.is_some(),
    );

    let mut ctx = Context::new(cparams);
    ctx.reset(cparams, dict.map(|d| d.rep));

    let dict_bytes: &[u8] = dict.map_or(&[], |d| &d.content);
    let window = Window::new(dict_bytes, input);

    let dict_limit = window.dict_limit();
    let end_of_input = dict_limit + input.len() as u32;
    let block_max = (MAX_BLOCK_SIZE as u64).min(window_size) as u32;

    let mut hasher = params.checksum.then(|| Xxh64::new(0));

    if input.is_empty() {
        ctx.encode_block(&window, dict_limit, dict_limit, true, &mut out)?;
    } else {
        let mut pos = dict_limit;
        while pos < end_of_input {
            let block_end = (pos + block_max).min(end_of_input);
            let last = block_end == end_of_input;

            ctx.encode_block(&window, pos, block_end, last, &mut out)?;
            if let Some(h) = hasher.as_mut() {
                h.update(window.slice(pos, block_end));
            }
            pos = block_end;
        }
    }

    if let Some(h) = hasher {
        out.extend_from_slice(&(h.digest() as u32).to_le_bytes());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use rzstd_foundation::cparams_for_level;

    use super::*;

    #[test]
    fn empty_input_produces_a_minimal_frame() {
        let frame = encode_frame(b"", cparams_for_level(3), FrameParams::default(), None).unwrap();
        assert!(frame.len() > 4);
        assert_eq!(&frame[..4], &MAGIC_NUM.to_le_bytes());
    }

    #[test]
    fn checksum_flag_appends_four_bytes() {
        let input = b"hello hello hello hello hello".repeat(10);
        let no_checksum =
            encode_frame(&input, cparams_for_level(3), FrameParams { checksum: false }, None).unwrap();
        let with_checksum =
            encode_frame(&input, cparams_for_level(3), FrameParams { checksum: true }, None).unwrap();
        assert_eq!(with_checksum.len(), no_checksum.len() + 4);
    }

    #[test]
    fn multi_block_frame_marks_only_the_last_block_as_last() {
        let cparams = cparams_for_level(1);
        let input = vec![7u8; (3 * MAX_BLOCK_SIZE) as usize + 10];
        let frame =
            encode_frame(&input, cparams, FrameParams::default(), None).unwrap();
        assert!(frame.len() < input.len());
    }
}
