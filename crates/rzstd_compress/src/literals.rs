//! Literals section encoder (C8, spec.md §4.2/§4.4). Picks a mode via
//! [`crate::entropy::choose_literals_mode`] and writes the header shape
//! `rzstd_decompress::literals_section::Header::read` parses back: the
//! 1/2/3-byte size-only header for `Raw`/`RLE`, or the 3/4/5-byte
//! regenerated+compressed size header for `Compressed`/`Treeless`, followed
//! by either a single reverse bitstream or four interleaved ones behind a
//! jump table.

use rzstd_huff0::EncodingTable as HuffTable;
use rzstd_io::ReverseBitWriter;

use crate::Error;
use crate::entropy::{self, LastHuff, LiteralsPlan, LitMode, Streams};

/// The exact inverse of `literals_section`'s `RAW_RLE_BUF_SIZE`/`RAW_RLE_SHIFT`
/// tables, restricted to the two size formats those tables actually use
/// (`2` is reserved and never produced).
fn write_raw_rle_header(ls_type: u8, size: u32, out: &mut Vec<u8>) {
    if size < (1 << 5) {
        out.push((ls_type as u32 | (size << 3)) as u8);
    } else if size < (1 << 12) {
        let header = (ls_type as u16) | (1 << 2) | ((size as u16) << 4);
        out.extend_from_slice(&header.to_le_bytes());
    } else {
        let header = (ls_type as u32) | (3 << 2) | (size << 4);
        out.extend_from_slice(&header.to_le_bytes()[..3]);
    }
}

/// The exact inverse of `literals_section`'s `COMPRESSED_BUF_SIZE`/
/// `COMPRESSED_BITS`/`COMPRESSED_STREAMS` tables: `Streams::One` only ever
/// uses size format 0, `Streams::Four` picks the smallest of formats 1-3
/// that fits both sizes.
fn write_compressed_header(
    ls_type: u8,
    regenerated_size: u32,
    compressed_size: u32,
    streams: Streams,
    out: &mut Vec<u8>,
) -> Result<(), Error> {
    let (size_format, buf_size, n_bits): (u64, usize, u32) = match streams {
        Streams::One => (0, 2, 10),
        Streams::Four => {
            if regenerated_size < (1 << 10) && compressed_size < (1 << 10) {
                (1, 2, 10)
            } else if regenerated_size < (1 << 14) && compressed_size < (1 << 14) {
                (2, 3, 14)
            } else {
                (3, 4, 18)
            }
        }
    };

    if regenerated_size >= (1 << n_bits) || compressed_size >= (1 << n_bits) {
        return Err(Error::BlockTooLarge(regenerated_size as usize));
    }

    let header: u64 = (ls_type as u64)
        | (size_format << 2)
        | ((regenerated_size as u64) << 4)
        | ((compressed_size as u64) << (4 + n_bits));

    out.extend_from_slice(&header.to_le_bytes()[..1 + buf_size]);
    Ok(())
}

fn encode_single_stream(literals: &[u8], table: &HuffTable) -> Result<Vec<u8>, Error> {
    let mut w = ReverseBitWriter::new();
    for &b in literals.iter().rev() {
        let (code, n_bits) = table.encode(b);
        w.add_bits(code, n_bits)?;
    }
    Ok(w.finish())
}

/// Splits `literals` into 4 chunks the same way the decoder's
/// `huff_streams` does (`chunk = ceil(len / 4)`, with the last chunk
/// absorbing the remainder), encodes each independently against `table`,
/// and prepends the 3-entry jump table of `u16` LE byte lengths the
/// decoder reads before the four interleaved streams.
fn encode_four_streams(literals: &[u8], table: &HuffTable) -> Result<Vec<u8>, Error> {
    let len = literals.len();
    let chunk = len.div_ceil(4);

    let c1 = chunk.min(len);
    let c2 = (2 * chunk).min(len);
    let c3 = (3 * chunk).min(len);

    let segments = [&literals[..c1], &literals[c1..c2], &literals[c2..c3], &literals[c3..]];

    let mut streams = Vec::with_capacity(4);
    for seg in segments {
        streams.push(encode_single_stream(seg, table)?);
    }

    let mut out = Vec::new();
    out.extend_from_slice(&(streams[0].len() as u16).to_le_bytes());
    out.extend_from_slice(&(streams[1].len() as u16).to_le_bytes());
    out.extend_from_slice(&(streams[2].len() as u16).to_le_bytes());
    for s in &streams {
        out.extend_from_slice(s);
    }

    Ok(out)
}

/// Encoded literals section plus the stash the *next* block's `repeat`
/// eligibility should be checked against.
pub struct LiteralsOutput {
    pub bytes: Vec<u8>,
    pub stash: Option<LastHuff>,
}

fn huff_payload(literals: &[u8], table: &HuffTable, streams: Streams) -> Result<Vec<u8>, Error> {
    match streams {
        Streams::One => encode_single_stream(literals, table),
        Streams::Four => encode_four_streams(literals, table),
    }
}

fn freqs_of(literals: &[u8]) -> [u32; 256] {
    let mut freqs = [0u32; 256];
    for &b in literals {
        freqs[b as usize] += 1;
    }
    freqs
}

/// Encodes one block's literals section per spec.md §4.4.
pub fn encode_literals(
    literals: &[u8],
    prev: Option<&LastHuff>,
) -> Result<LiteralsOutput, Error> {
    let (mode, plan) = entropy::choose_literals_mode(literals, prev)?;
    let mut out = Vec::new();

    match plan {
        LiteralsPlan::Raw => {
            write_raw_rle_header(mode.wire_value(), literals.len() as u32, &mut out);
            out.extend_from_slice(literals);
            Ok(LiteralsOutput { bytes: out, stash: prev.cloned() })
        }

        LiteralsPlan::Rle(byte) => {
            write_raw_rle_header(mode.wire_value(), literals.len() as u32, &mut out);
            out.push(byte);
            Ok(LiteralsOutput { bytes: out, stash: prev.cloned() })
        }

        LiteralsPlan::Huffman { table, streams } => {
            let weights_header = rzstd_huff0::write_weights_direct(table.weights())?;
            let bitstream = huff_payload(literals, &table, streams)?;

            let mut payload = weights_header;
            payload.extend_from_slice(&bitstream);

            write_compressed_header(
                mode.wire_value(),
                literals.len() as u32,
                payload.len() as u32,
                streams,
                &mut out,
            )?;
            out.extend_from_slice(&payload);

            let freqs = freqs_of(literals);
            Ok(LiteralsOutput { bytes: out, stash: Some(LastHuff { table, freqs }) })
        }

        LiteralsPlan::Repeat { streams } => {
            let prev = prev.expect("choose_literals_mode only returns Repeat when prev exists");
            let bitstream = huff_payload(literals, &prev.table, streams)?;

            write_compressed_header(
                LitMode::Treeless.wire_value(),
                literals.len() as u32,
                bitstream.len() as u32,
                streams,
                &mut out,
            )?;
            out.extend_from_slice(&bitstream);

            let freqs = freqs_of(literals);
            Ok(LiteralsOutput {
                bytes: out,
                stash: Some(LastHuff { table: prev.table.clone(), freqs }),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_mode_for_short_input() {
        let out = encode_literals(b"hi", None).unwrap();
        assert_eq!(out.bytes[0] & 0x3, LitMode::Raw.wire_value());
        assert_eq!(&out.bytes[1..], b"hi");
    }

    #[test]
    fn rle_mode_for_single_byte_run() {
        let literals = vec![b'z'; 200];
        let out = encode_literals(&literals, None).unwrap();
        assert_eq!(out.bytes[0] & 0x3, LitMode::Rle.wire_value());
        assert!(out.bytes.len() < literals.len());
    }

    #[test]
    fn compressed_mode_for_skewed_distribution() {
        let mut literals = vec![b'a'; 900];
        literals.extend(std::iter::repeat_n(b'b', 100));
        let out = encode_literals(&literals, None).unwrap();
        assert_eq!(out.bytes[0] & 0x3, LitMode::Compressed.wire_value());
        assert!(out.stash.is_some());
        assert!(out.bytes.len() < literals.len());
    }

    #[test]
    fn four_stream_mode_for_large_input() {
        let mut literals = Vec::new();
        for i in 0..4000u32 {
            literals.push((i % 17) as u8);
        }
        let out = encode_literals(&literals, None).unwrap();
        assert!(out.bytes.len() < literals.len());
    }

    #[test]
    fn repeat_mode_reuses_previous_table() {
        let mut literals = vec![b'a'; 900];
        literals.extend(std::iter::repeat_n(b'b', 100));
        let first = encode_literals(&literals, None).unwrap();

        let second = encode_literals(&literals, first.stash.as_ref()).unwrap();
        assert!(second.bytes[0] & 0x3 == LitMode::Treeless.wire_value() || second.bytes[0] & 0x3 == LitMode::Compressed.wire_value());
    }
}
