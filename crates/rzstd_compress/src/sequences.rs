//! Sequences section encoder (C8): FSE-codes the interleaved LL/OF/ML
//! symbol streams the way `rzstd_decompress::sequences_section` reads
//! them back — three independent FSE state machines sharing one
//! `ReverseBitWriter`, pushed in exactly the reverse of the order the
//! decoder's peek/update calls consume them.
//!
//! The push order is the part worth spelling out. The decoder reads three
//! initial states (LL, OF, ML), peeks sequence 0's symbols for free, then
//! for every later sequence calls `update()` (LL, ML, OF) before peeking
//! again, and finally reads each type's extra bits in OF/ML/LL order.
//! Pushing last-sequence-first means the *first* symbol this module
//! encodes per type produces bits with nowhere to go — there is no
//! sequence past the last one to consume them — and those bits are
//! simply never pushed. What ends up flushed as the initial state is the
//! state for sequence 0, which the decoder's construction step reads for
//! free.
//!
//! Concretely: processing sequence `n-1` down to `0` against a running
//! per-type FSE state produces `n` `(state, value, n_bits)` results.
//! Result `k` always decodes (via the invariant the round-trip test in
//! `rzstd_fse::encode` exercises) as symbol `k`'s own code; its `value`/
//! `n_bits` are the bits a decoder reads when moving from sequence `k`'s
//! state to sequence `k+1`'s. So result `n-1`'s bits are discarded (there
//! is no sequence `n`), results `0..=n-2` are pushed as the "update"
//! payload for sequences `1..=n-1`, and result `0`'s resulting state is
//! flushed as the initial read.

use rzstd_fse::EncodingTable as FseTable;
use rzstd_io::ReverseBitWriter;

use crate::entropy::{self, FseChoice, LastFse, SeqMode};
use crate::tables::{
    LL_MAX_SYMBOL, LL_N, LL_PREDEFINED, LL_PREDEFINED_LOG, ML_MAX_SYMBOL, ML_N, ML_PREDEFINED,
    ML_PREDEFINED_LOG, OF_MAX_SYMBOL, OF_N, OF_PREDEFINED, OF_PREDEFINED_LOG,
};
use crate::Error;

/// One sequence's already-derived FSE codes and extra-bits payloads. Built
/// by `crate::block` from a `seq_store::Sequence` plus a `RepOffsets`
/// replay (the offset must already be the wire `offsetValue`, not the raw
/// back-reference distance).
#[derive(Debug, Clone, Copy)]
pub struct CodedSequence {
    pub ll_code: u8,
    pub ll_extra: u32,
    pub ll_bits: u8,
    pub of_code: u8,
    pub of_extra: u32,
    pub of_bits: u8,
    pub ml_code: u8,
    pub ml_extra: u32,
    pub ml_bits: u8,
}

impl CodedSequence {
    pub fn new(lit_len: u32, match_len: u32, offset_value: u32) -> Self {
        let (ll_code, ll_extra, ll_bits) = crate::tables::ll_code(lit_len);
        let (ml_code, ml_extra, ml_bits) = crate::tables::ml_code(match_len);
        let (of_code, of_extra, of_bits) = crate::tables::of_code(offset_value);
        Self {
            ll_code,
            ll_extra,
            ll_bits,
            of_code,
            of_extra,
            of_bits,
            ml_code,
            ml_extra,
            ml_bits,
        }
    }
}

/// Encode-side mirror of a decoder state slot: either a real FSE table or
/// the degenerate all-zero-cost table `DecodingTable::rle` builds. Kept
/// distinct (rather than folding RLE into a one-symbol `EncodingTable`)
/// because the two are not bit-compatible — a normally-built single-symbol
/// table does not come out with `n_bits == 0` in every slot.
enum SeqEncoder<const N: usize> {
    Table(FseTable<N>),
    Rle { accuracy_log: u8 },
}

impl<const N: usize> SeqEncoder<N> {
    fn initial_state(&self) -> u32 {
        match self {
            Self::Table(t) => t.initial_state(),
            Self::Rle { .. } => 0,
        }
    }

    fn encode(&self, state: u32, symbol: u8) -> (u32, u64, u8) {
        match self {
            Self::Table(t) => t.encode(state, symbol),
            Self::Rle { .. } => (0, 0, 0),
        }
    }

    fn flush_state(&self, state: u32) -> (u64, u8) {
        match self {
            Self::Table(t) => t.flush_state(state),
            Self::Rle { accuracy_log } => (state as u64, *accuracy_log),
        }
    }
}

/// Threads `codes` through `enc` in reverse processing order, returning
/// the `n` `(value, n_bits)` results (indexed by the sequence they belong
/// to, `results[k]` coming from encoding `codes[k]`) plus the final state
/// reached after encoding `codes[0]` — the value to flush as the stream's
/// initial read.
fn thread_states<const N: usize>(enc: &SeqEncoder<N>, codes: &[u8]) -> (Vec<(u64, u8)>, u32) {
    let mut state = enc.initial_state();
    let mut results = vec![(0u64, 0u8); codes.len()];
    for k in (0..codes.len()).rev() {
        let (new_state, v, b) = enc.encode(state, codes[k]);
        results[k] = (v, b);
        state = new_state;
    }
    (results, state)
}

/// Chooses a mode for one symbol type, emits its table-description header
/// bytes (byte-aligned for `FSECompressed`, via
/// `BitWriter::finish_byte_aligned`), and returns the encoder plus the
/// stash the *next* block should see as its `repeat` candidate. The stash
/// is `None` after an `Rle` choice: `rzstd_decompress`'s `Mode::RLE` arm
/// replaces the live table with the degenerate all-zero-cost one, so a
/// later `Repeat` would have to reuse exactly that — which `choose_fse`'s
/// `LastFse<N>` (a real `EncodingTable`) cannot represent faithfully.
/// Treating RLE as clearing repeat eligibility for one block is a
/// documented simplification; see DESIGN.md.
fn plan_type<const N: usize>(
    freqs: &[u32],
    n_seq: u32,
    predefined_norm: &[i16],
    predefined_log: u8,
    repeat: Option<&LastFse<N>>,
) -> Result<(SeqMode, Vec<u8>, SeqEncoder<N>, Option<LastFse<N>>), Error> {
    let (mode, choice) =
        entropy::choose_fse(freqs, n_seq, predefined_norm, predefined_log, repeat)?;

    let (header, encoder, stash) = match choice {
        FseChoice::Repeat => {
            let prev = repeat.expect("choose_fse only returns Repeat when a stash exists");
            (Vec::new(), SeqEncoder::Table(prev.table.clone()), Some(prev.clone()))
        }
        FseChoice::Predefined(table) => {
            let stash = LastFse {
                table: table.clone(),
                norm: predefined_norm.to_vec(),
                table_log: predefined_log,
            };
            (Vec::new(), SeqEncoder::Table(table), Some(stash))
        }
        FseChoice::Rle(symbol) => {
            let accuracy_log = N.trailing_zeros() as u8;
            (vec![symbol], SeqEncoder::Rle { accuracy_log }, None)
        }
        FseChoice::Fse { table, norm, table_log } => {
            let mut w = rzstd_io::BitWriter::new();
            rzstd_fse::write_normalized_counts(&norm, freqs.len(), table_log, &mut w)?;
            let stash = LastFse { table: table.clone(), norm, table_log };
            (w.finish_byte_aligned(), SeqEncoder::Table(table), Some(stash))
        }
    };

    Ok((mode, header, encoder, stash))
}

/// `n_seqs` varint header, the exact inverse of
/// `rzstd_decompress::sequences_section::Header::read`.
fn write_n_seqs(n: u32, out: &mut Vec<u8>) {
    match n {
        0 => out.push(0),
        1..=127 => out.push(n as u8),
        128..=32511 => {
            out.push(((n >> 8) + 128) as u8);
            out.push((n & 0xFF) as u8);
        }
        _ => {
            let rem = n - 0x7F00;
            out.push(255);
            out.push((rem & 0xFF) as u8);
            out.push((rem >> 8) as u8);
        }
    }
}

/// Encoded sequences section plus the per-type stash the next block
/// should pass back in as `ll_repeat`/`of_repeat`/`ml_repeat`.
pub struct SequencesOutput {
    pub bytes: Vec<u8>,
    pub ll_stash: Option<LastFse<LL_N>>,
    pub of_stash: Option<LastFse<OF_N>>,
    pub ml_stash: Option<LastFse<ML_N>>,
}

/// Encodes the full sequences section (header, compression-modes byte,
/// table descriptions, interleaved bitstream) for one block.
pub fn encode_sequences(
    seqs: &[CodedSequence],
    ll_repeat: Option<&LastFse<LL_N>>,
    of_repeat: Option<&LastFse<OF_N>>,
    ml_repeat: Option<&LastFse<ML_N>>,
) -> Result<SequencesOutput, Error> {
    let n = seqs.len() as u32;

    let mut out = Vec::new();
    write_n_seqs(n, &mut out);

    if seqs.is_empty() {
        return Ok(SequencesOutput {
            bytes: out,
            ll_stash: ll_repeat.cloned(),
            of_stash: of_repeat.cloned(),
            ml_stash: ml_repeat.cloned(),
        });
    }

    let mut ll_freqs = vec![0u32; LL_MAX_SYMBOL + 1];
    let mut of_freqs = vec![0u32; OF_MAX_SYMBOL + 1];
    let mut ml_freqs = vec![0u32; ML_MAX_SYMBOL + 1];
    for s in seqs {
        ll_freqs[s.ll_code as usize] += 1;
        of_freqs[s.of_code as usize] += 1;
        ml_freqs[s.ml_code as usize] += 1;
    }

    let (ll_mode, ll_header, ll_enc, ll_stash) =
        plan_type::<LL_N>(&ll_freqs, n, LL_PREDEFINED, LL_PREDEFINED_LOG, ll_repeat)?;
    let (of_mode, of_header, of_enc, of_stash) =
        plan_type::<OF_N>(&of_freqs, n, OF_PREDEFINED, OF_PREDEFINED_LOG, of_repeat)?;
    let (ml_mode, ml_header, ml_enc, ml_stash) =
        plan_type::<ML_N>(&ml_freqs, n, ML_PREDEFINED, ML_PREDEFINED_LOG, ml_repeat)?;

    let modes_byte =
        (ll_mode.wire_value() << 6) | (of_mode.wire_value() << 4) | (ml_mode.wire_value() << 2);
    out.push(modes_byte);
    out.extend_from_slice(&ll_header);
    out.extend_from_slice(&of_header);
    out.extend_from_slice(&ml_header);

    let ll_codes: Vec<u8> = seqs.iter().map(|s| s.ll_code).collect();
    let of_codes: Vec<u8> = seqs.iter().map(|s| s.of_code).collect();
    let ml_codes: Vec<u8> = seqs.iter().map(|s| s.ml_code).collect();

    let (ll_results, ll_final) = thread_states(&ll_enc, &ll_codes);
    let (of_results, of_final) = thread_states(&of_enc, &of_codes);
    let (ml_results, ml_final) = thread_states(&ml_enc, &ml_codes);

    let mut w = ReverseBitWriter::new();
    let len = seqs.len();

    for i in (1..len).rev() {
        let s = &seqs[i];
        w.add_bits(s.ll_extra as u64, s.ll_bits)?;
        w.add_bits(s.ml_extra as u64, s.ml_bits)?;
        w.add_bits(s.of_extra as u64, s.of_bits)?;

        let (of_v, of_b) = of_results[i - 1];
        let (ml_v, ml_b) = ml_results[i - 1];
        let (ll_v, ll_b) = ll_results[i - 1];
        w.add_bits(of_v, of_b)?;
        w.add_bits(ml_v, ml_b)?;
        w.add_bits(ll_v, ll_b)?;
    }

    let s0 = &seqs[0];
    w.add_bits(s0.ll_extra as u64, s0.ll_bits)?;
    w.add_bits(s0.ml_extra as u64, s0.ml_bits)?;
    w.add_bits(s0.of_extra as u64, s0.of_bits)?;

    let (ml_flush_v, ml_flush_b) = ml_enc.flush_state(ml_final);
    let (of_flush_v, of_flush_b) = of_enc.flush_state(of_final);
    let (ll_flush_v, ll_flush_b) = ll_enc.flush_state(ll_final);
    w.add_bits(ml_flush_v, ml_flush_b)?;
    w.add_bits(of_flush_v, of_flush_b)?;
    w.add_bits(ll_flush_v, ll_flush_b)?;

    out.extend_from_slice(&w.finish());

    Ok(SequencesOutput { bytes: out, ll_stash, of_stash, ml_stash })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coded(lit_len: u32, match_len: u32, offset_value: u32) -> CodedSequence {
        CodedSequence::new(lit_len, match_len, offset_value)
    }

    #[test]
    fn n_seqs_header_round_trips_boundaries() {
        for &n in &[0u32, 1, 126, 127, 128, 32511, 32512, 40000] {
            let mut out = Vec::new();
            write_n_seqs(n, &mut out);

            let decoded = match out[0] {
                0 => 0,
                1..=127 => out[0] as u32,
                128..=254 => (((out[0] as u32) - 128) << 8) + out[1] as u32,
                255 => out[1] as u32 + ((out[2] as u32) << 8) + 0x7F00,
            };
            assert_eq!(decoded, n, "n={n}");
        }
    }

    #[test]
    fn single_sequence_has_no_update_events_but_still_flushes() {
        // With n == 1 the reverse loop body never runs (no `update()` calls
        // on the decoder side either); only the initial extras and the
        // flushed initial state get pushed.
        let seqs = [coded(5, 20, 103)];

        let out = encode_sequences(&seqs, None, None, None).unwrap();
        assert!(!out.bytes.is_empty());
        assert!(out.ll_stash.is_some());
        assert!(out.of_stash.is_some());
        assert!(out.ml_stash.is_some());
    }

    #[test]
    fn many_sequences_thread_states_without_panicking() {
        let mut seqs = Vec::new();
        for i in 0..500u32 {
            seqs.push(coded(1 + i % 7, 4 + i % 50, 1 + (i % 9000)));
        }
        let out = encode_sequences(&seqs, None, None, None).unwrap();
        assert!(!out.bytes.is_empty());
    }

    #[test]
    fn repeat_mode_reuses_previous_stash() {
        let seqs = [coded(3, 10, 50), coded(1, 4, 1), coded(8, 200, 4000)];
        let first = encode_sequences(&seqs, None, None, None).unwrap();

        let second = encode_sequences(
            &seqs,
            first.ll_stash.as_ref(),
            first.of_stash.as_ref(),
            first.ml_stash.as_ref(),
        )
        .unwrap();
        assert!(!second.bytes.is_empty());
    }

    #[test]
    fn all_same_code_chooses_rle_and_clears_stash() {
        // Every sequence uses literal length 0 -> ll_code 0 for all, driving
        // `choose_fse` into RLE mode for LL.
        let seqs = [coded(0, 10, 50), coded(0, 4, 1), coded(0, 200, 4000)];
        let out = encode_sequences(&seqs, None, None, None).unwrap();
        assert!(out.ll_stash.is_none());
    }
}
