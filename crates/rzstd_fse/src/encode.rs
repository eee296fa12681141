use rzstd_io::BitWriter;

use crate::Error;

const MAX_SYMBOLS: usize = 256;
const ACCURACY_LOG_RANGE: std::ops::RangeInclusive<u8> = 5..=15;

/// Normalizes raw symbol frequencies to sum exactly to `1 << table_log`.
///
/// Counts whose proportional share would round to zero are not dropped:
/// they are marked `-1`, the same low-probability escape
/// [`crate::NormalizedDistribution`] understands, and contribute a single
/// unit to the budget. Everything else is scaled by `table_size / total`
/// and then reconciled to the exact budget by the classic largest-remainder
/// method — the symbols whose rounding lost the most precision receive the
/// leftover (or give back the overage) first.
pub fn normalize_counts(counts: &[u32], table_log: u8) -> Result<Vec<i16>, Error> {
    if !ACCURACY_LOG_RANGE.contains(&table_log) {
        return Err(Error::InvalidAccuracyLog(table_log));
    }

    let table_size: i64 = 1 << table_log;
    let total: u64 = counts.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return Err(Error::SumMismatch(table_size as i32));
    }

    let mut norm = vec![0i16; counts.len()];
    let low_threshold = (total / table_size as u64).max(1);

    let mut budget = table_size;
    let mut scaled: Vec<(usize, i64, u64)> = Vec::new();

    for (idx, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        if (count as u64) < low_threshold {
            norm[idx] = -1;
            budget -= 1;
            continue;
        }

        let product = count as u128 * table_size as u128;
        let base = (product / total as u128) as i64;
        let rem = (product % total as u128) as u64;
        scaled.push((idx, base.max(1), rem));
    }

    let allocated: i64 = scaled.iter().map(|&(_, base, _)| base).sum();
    let mut diff = budget - allocated;

    scaled.sort_by(|a, b| b.2.cmp(&a.2));

    let mut i = 0;
    while diff > 0 && !scaled.is_empty() {
        scaled[i % scaled.len()].1 += 1;
        diff -= 1;
        i += 1;
    }
    while diff < 0 {
        let slot = scaled
            .iter_mut()
            .filter(|(_, base, _)| *base > 1)
            .max_by_key(|(_, base, _)| *base);
        match slot {
            Some(slot) => {
                slot.1 -= 1;
                diff += 1;
            }
            None => return Err(Error::SumMismatch(diff as i32)),
        }
    }

    for (idx, base, _) in scaled {
        norm[idx] = base as i16;
    }

    Ok(norm)
}

/// Writes a normalized distribution in the same bitstream shape
/// [`crate::NormalizedDistribution::read`] parses: a 4-bit `table_log - 5`
/// header, then each symbol's count as a minimal-width integer in
/// `0..=remaining`, with runs of zero-count symbols collapsed into chained
/// 2-bit repeat codes.
pub fn write_normalized_counts(
    counts: &[i16],
    symbol_count: usize,
    table_log: u8,
    w: &mut BitWriter,
) -> Result<(), Error> {
    if !ACCURACY_LOG_RANGE.contains(&table_log) {
        return Err(Error::InvalidAccuracyLog(table_log));
    }

    w.add_bits((table_log - 5) as u64, 4);

    let mut remaining: i32 = 1 << table_log;
    let mut idx = 0usize;

    while remaining > 0 {
        if idx >= symbol_count {
            return Err(Error::SumMismatch(remaining));
        }

        let count = counts[idx];
        let n_bits = (remaining + 1).ilog2() as u8;
        let threshold = (1i32 << (n_bits + 1)) - (remaining + 2);
        let val = count as i32 + 1;

        if val < threshold {
            w.add_bits(val as u64, n_bits);
        } else if val < (1 << n_bits) {
            w.add_bits(val as u64, n_bits);
            w.add_bits(0, 1);
        } else {
            let base = val - ((1 << n_bits) - threshold);
            w.add_bits(base as u64, n_bits);
            w.add_bits(1, 1);
        }

        idx += 1;

        if count != 0 {
            let state = if count == -1 { 1 } else { count as i32 };
            remaining -= state;
        } else {
            loop {
                let mut run = 0usize;
                while idx + run < symbol_count && counts[idx + run] == 0 && run < 3 {
                    run += 1;
                }
                w.add_bits(run as u64, 2);
                idx += run;
                if run != 3 {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Per-symbol encode-side transform, the compress-side mirror of
/// [`crate::Entry`]. `delta_n_bits` packs `(nbBits << 16) - minStatePlus`
/// so the flush width for a given state is a single shift away; negative
/// values are expected and handled in signed 64-bit arithmetic to dodge the
/// wraparound tricks the unsigned C original relies on.
#[derive(Debug, Clone, Copy, Default)]
struct SymbolTransform {
    delta_n_bits: i64,
    delta_find_state: i32,
}

/// An FSE encoding table built from a normalized distribution, the
/// compress-side counterpart of [`crate::DecodingTable`].
#[derive(Debug, Clone)]
pub struct EncodingTable<const N: usize> {
    table_log: u8,
    next_state: Vec<u16>,
    transforms: [SymbolTransform; MAX_SYMBOLS],
}

impl<const N: usize> EncodingTable<N> {
    /// `counts` holds the normalized frequency of each symbol in
    /// `0..symbol_count`, `-1` denoting the low-probability escape, using
    /// the same convention as [`crate::NormalizedDistribution`].
    pub fn new(counts: &[i16]) -> Result<Self, Error> {
        assert!(N.is_power_of_two());
        let table_log = N.trailing_zeros() as u8;

        let table_symbol = Self::spread_symbols(counts)?;

        // Rank every table slot by symbol (in table order) to recover the
        // state each slot represents, mirroring the reference
        // FSE_buildCTable's two-pass construction.
        let mut cumul = [0u32; MAX_SYMBOLS];
        {
            let mut total = 0u32;
            for (sym, &count) in counts.iter().enumerate() {
                cumul[sym] = total;
                total += if count == -1 { 1 } else { count.max(0) as u32 };
            }
        }

        let mut next_seen = [0u32; MAX_SYMBOLS];
        let mut next_state = vec![0u16; N];
        for (slot, &sym) in table_symbol.iter().enumerate() {
            let sym = sym as usize;
            let rank = cumul[sym] + next_seen[sym];
            next_seen[sym] += 1;
            next_state[rank as usize] = (N + slot) as u16;
        }

        let mut transforms = [SymbolTransform::default(); MAX_SYMBOLS];
        let mut total: i32 = 0;
        for (sym, &count) in counts.iter().enumerate() {
            transforms[sym] = match count {
                0 => SymbolTransform {
                    delta_n_bits: (((table_log as i64) + 1) << 16) - (1i64 << table_log),
                    delta_find_state: 0,
                },
                -1 | 1 => {
                    let tt = SymbolTransform {
                        delta_n_bits: ((table_log as i64) << 16) - (1i64 << table_log),
                        delta_find_state: total - 1,
                    };
                    total += 1;
                    tt
                }
                c => {
                    let max_bits_out = table_log - rzstd_foundation::highbit(c as u32) as u8;
                    let min_state_plus = (c as i64) << max_bits_out;
                    let tt = SymbolTransform {
                        delta_n_bits: ((max_bits_out as i64) << 16) - min_state_plus,
                        delta_find_state: total - c as i32,
                    };
                    total += c as i32;
                    tt
                }
            };
        }

        Ok(Self { table_log, next_state, transforms })
    }

    fn spread_symbols(counts: &[i16]) -> Result<Vec<u8>, Error> {
        let mut table_symbol = vec![0u8; N];
        let step = (N >> 1) + (N >> 3) + 3;
        let mask = N - 1;
        let mut pos = 0usize;

        let has_low_prob = counts.iter().any(|&c| c == -1);

        if has_low_prob {
            let mut high_threshold = N - 1;
            for (sym, &count) in counts.iter().enumerate() {
                if count == -1 {
                    if high_threshold >= N {
                        return Err(Error::TableOverflow);
                    }
                    table_symbol[high_threshold] = sym as u8;
                    high_threshold = high_threshold.wrapping_sub(1);
                }
            }

            for (sym, &count) in counts.iter().enumerate() {
                if count <= 0 {
                    continue;
                }
                for _ in 0..count {
                    table_symbol[pos] = sym as u8;
                    pos = (pos + step) & mask;
                    while pos > high_threshold {
                        pos = (pos + step) & mask;
                    }
                }
            }
        } else {
            for (sym, &count) in counts.iter().enumerate() {
                if count <= 0 {
                    continue;
                }
                for _ in 0..count {
                    table_symbol[pos] = sym as u8;
                    pos = (pos + step) & mask;
                }
            }
        }

        if pos != 0 {
            return Err(Error::FastSpreadAlignmentError(pos));
        }

        Ok(table_symbol)
    }

    /// The state a fresh encode stream starts from. Matches the reference
    /// encoder's plain `FSE_initCState`; the very first symbol pays for a
    /// handful of otherwise-avoidable bits that `FSE_initCState2` would
    /// save, traded here for a simpler, symmetric seed/drain.
    pub fn initial_state(&self) -> u32 {
        1u32 << self.table_log
    }

    /// Encodes `symbol` from `state`, returning the new state and the
    /// `(value, n_bits)` payload to push into a [`rzstd_io::ReverseBitWriter`]
    /// before moving on to the next symbol (FSE streams are drained in
    /// reverse processing order, last-encoded-symbol-first).
    pub fn encode(&self, state: u32, symbol: u8) -> (u32, u64, u8) {
        let tt = self.transforms[symbol as usize];
        let n_bits = ((state as i64 + tt.delta_n_bits) >> 16) as u8;
        let low_bits = (state & ((1u32 << n_bits) - 1)) as u64;
        let index = ((state as i32) >> n_bits) + tt.delta_find_state;
        let new_state = self.next_state[index as usize] as u32;
        (new_state, low_bits, n_bits)
    }

    /// The bits required to flush `state` itself once the stream is drained
    /// (always `table_log` wide).
    pub fn flush_state(&self, state: u32) -> (u64, u8) {
        (state as u64, self.table_log)
    }

    pub fn table_log(&self) -> u8 {
        self.table_log
    }
}

pub fn build_encoding_table<const N: usize>(counts: &[i16]) -> Result<EncodingTable<N>, Error> {
    EncodingTable::new(counts)
}

#[cfg(test)]
mod tests {
    use rzstd_io::{BitReader, ReverseBitReader, ReverseBitWriter};

    use super::*;
    use crate::decode::{Decoder, DecodingTable, NormalizedDistribution};

    #[test]
    fn normalize_preserves_budget() {
        let counts = [1000u32, 1, 500, 3, 2000];
        let norm = normalize_counts(&counts, 8).unwrap();
        let sum: i32 = norm.iter().map(|&c| if c == -1 { 1 } else { c as i32 }).sum();
        assert_eq!(sum, 1 << 8);
    }

    #[test]
    fn round_trips_through_fse_decoder() {
        const N: usize = 64;
        let counts: [i16; 6] = [20, 12, 10, 8, 8, 6];
        assert_eq!(counts.iter().map(|&c| c as i32).sum::<i32>(), N as i32);

        let enc = EncodingTable::<N>::new(&counts).unwrap();

        let symbols = [0u8, 1, 2, 3, 4, 5, 0, 1, 2, 0, 0, 3, 5, 4, 1];
        let mut state = enc.initial_state();
        let mut w = ReverseBitWriter::new();
        for &sym in symbols.iter().rev() {
            let (new_state, value, n_bits) = enc.encode(state, sym);
            w.add_bits(value, n_bits).unwrap();
            state = new_state;
        }
        let (flush_value, flush_bits) = enc.flush_state(state);
        w.add_bits(flush_value, flush_bits).unwrap();
        let bytes = w.finish();

        let mut dist = NormalizedDistribution::<N>::from_predefined(&counts, 6).unwrap();
        let table = DecodingTable::<N>::from_distribution(&mut dist).unwrap();

        let mut r = ReverseBitReader::new(&bytes).unwrap();
        let mut dec = Decoder::new(&table, &mut r).unwrap();
        let mut decoded = Vec::with_capacity(symbols.len());
        for _ in 0..symbols.len() {
            decoded.push(dec.decode(&mut r).unwrap());
        }

        assert_eq!(decoded, symbols);
    }

    #[test]
    fn normalized_counts_round_trip_through_wire_format() {
        const N: usize = 64;
        let counts: [i16; 6] = [20, 12, 10, 8, 8, -1];

        let mut w = rzstd_io::BitWriter::new();
        write_normalized_counts(&counts, counts.len(), 6, &mut w).unwrap();
        let bytes = w.finish();

        let mut r = BitReader::new(&bytes).unwrap();
        let dist = NormalizedDistribution::<N>::read(&mut r).unwrap();
        let rebuilt = DecodingTable::<N>::from_distribution(&mut dist.clone()).unwrap();
        // The table must at least build without error from the round-tripped
        // header; exact entry comparison is covered by the dedicated
        // DecodingTable fixture test.
        let _ = rebuilt;
    }
}
