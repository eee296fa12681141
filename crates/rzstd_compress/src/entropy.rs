//! Entropy back-end selection (C4, spec.md §4.4): decides between
//! raw/RLE/compressed/repeat for the literals section, and between
//! predefined/RLE/FSE/repeat independently for each of LL/OF/ML, by
//! costing every option against the same histograms the chosen encoder
//! will actually use — so the estimate and the emitted bitstream can
//! never disagree about which mode was cheaper.

use rzstd_fse::{EncodingTable as FseTable, normalize_counts};
use rzstd_huff0::EncodingTable as HuffTable;

use crate::Error;

/// Wire-compatible compression mode for one of LL/OF/ML, mirroring
/// `rzstd_decompress::sequences_section::Mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqMode {
    Predefined,
    Rle,
    Fse,
    Repeat,
}

impl SeqMode {
    /// The 2-bit wire value in the `CompressionModes` byte.
    pub fn wire_value(self) -> u8 {
        match self {
            Self::Predefined => 0,
            Self::Rle => 1,
            Self::Fse => 2,
            Self::Repeat => 3,
        }
    }
}

/// A chosen table, ready to drive an `EncodingTable<N>`-based bitstream
/// encode. `Repeat` carries no new table: the caller reuses whatever is
/// already stashed from the previous block.
pub enum FseChoice<const N: usize> {
    Predefined(FseTable<N>),
    Rle(u8),
    Fse { table: FseTable<N>, norm: Vec<i16>, table_log: u8 },
    Repeat,
}

/// Snapshot of a previously transmitted FSE table, stashed by the block
/// encoder so `repeat` mode (and repeat-cost estimation) can reference it
/// without re-deriving it from the table itself.
#[derive(Clone)]
pub struct LastFse<const N: usize> {
    pub table: FseTable<N>,
    pub norm: Vec<i16>,
    pub table_log: u8,
}

/// Cross-entropy bits to encode `freqs` against a fixed normalized
/// distribution `norm` at `table_log`: `sum(freq[s] * -log2(prob[s]))`.
/// Returns `None` if `norm` cannot represent some symbol that actually
/// occurs (that candidate mode is not eligible).
fn cross_entropy_bits(freqs: &[u32], norm: &[i16], table_log: u8) -> Option<u64> {
    let table_size = (1u32 << table_log) as f64;
    let mut bits = 0.0f64;

    for (sym, &freq) in freqs.iter().enumerate() {
        if freq == 0 {
            continue;
        }
        let count = norm.get(sym).copied().unwrap_or(0);
        if count == 0 {
            return None;
        }
        let prob = if count == -1 { 1.0 } else { count as f64 } / table_size;
        bits += freq as f64 * -prob.log2();
    }

    Some(bits.ceil() as u64)
}

/// `FSE_optimalTableLog`-style heuristic: no point building a table
/// deeper than the sequence count warrants, and never below the format
/// minimum of 5.
fn optimal_table_log(max_log: u8, n_seq: u32, max_symbol: usize) -> u8 {
    if n_seq == 0 {
        return 5;
    }
    let min_headroom = rzstd_foundation::highbit(n_seq.max(1)) as u8 + 2;
    let symbol_floor = rzstd_foundation::highbit((max_symbol.max(1)) as u32) as u8 + 1;
    max_log.min(min_headroom.max(symbol_floor)).max(5)
}

/// Rough header overhead in bits for a freshly transmitted normalized
/// distribution: the 4-bit log plus ~`table_log/2` bits per symbol,
/// loose enough for mode selection without needing an exact header
/// encode on every candidate.
fn fse_header_cost_estimate(symbol_count: usize, table_log: u8) -> u64 {
    4 + symbol_count as u64 * (table_log as u64 + 1) / 2
}

/// Chooses a compression mode for one sequence symbol stream (LL, OF, or
/// ML) per spec.md §4.4: predefined, repeat-previous, freshly-built FSE,
/// or RLE if the block only ever used one symbol. Ties break toward
/// `Repeat > Predefined > Fse` as required.
pub fn choose_fse<const N: usize>(
    freqs: &[u32],
    n_seq: u32,
    predefined_norm: &[i16],
    predefined_log: u8,
    repeat: Option<&LastFse<N>>,
) -> Result<(SeqMode, FseChoice<N>), Error> {
    let max_symbol = freqs.iter().rposition(|&f| f > 0).unwrap_or(0);
    let distinct = freqs.iter().filter(|&&f| f > 0).count();

    if distinct <= 1 {
        let symbol = freqs.iter().position(|&f| f > 0).unwrap_or(0) as u8;
        return Ok((SeqMode::Rle, FseChoice::Rle(symbol)));
    }

    let predefined_cost = cross_entropy_bits(freqs, predefined_norm, predefined_log);
    let repeat_cost =
        repeat.and_then(|r| cross_entropy_bits(freqs, &r.norm, r.table_log));

    let table_log = optimal_table_log(N.trailing_zeros() as u8, n_seq, max_symbol + 1);
    let new_norm = normalize_counts(freqs, table_log)?;
    let new_cost = cross_entropy_bits(freqs, &new_norm, table_log)
        .unwrap_or(u64::MAX)
        .saturating_add(fse_header_cost_estimate(max_symbol + 1, table_log));

    let mut best_mode = SeqMode::Fse;
    let mut best_cost = new_cost;

    if let Some(cost) = predefined_cost {
        if cost <= best_cost {
            best_mode = SeqMode::Predefined;
            best_cost = cost;
        }
    }
    if let Some(cost) = repeat_cost {
        if cost <= best_cost {
            best_mode = SeqMode::Repeat;
        }
    }

    match best_mode {
        SeqMode::Repeat => Ok((SeqMode::Repeat, FseChoice::Repeat)),
        SeqMode::Predefined => {
            let table = FseTable::<N>::new(predefined_norm)?;
            Ok((SeqMode::Predefined, FseChoice::Predefined(table)))
        }
        _ => {
            let table = FseTable::<N>::new(&new_norm)?;
            Ok((
                SeqMode::Fse,
                FseChoice::Fse { table, norm: new_norm, table_log },
            ))
        }
    }
}

/// Wire-compatible literals section mode, mirroring
/// `rzstd_decompress::literals_section::Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitMode {
    Raw,
    Rle,
    Compressed,
    Treeless,
}

impl LitMode {
    pub fn wire_value(self) -> u8 {
        match self {
            Self::Raw => 0,
            Self::Rle => 1,
            Self::Compressed => 2,
            Self::Treeless => 3,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Streams {
    One,
    Four,
}

pub enum LiteralsPlan {
    Raw,
    Rle(u8),
    Huffman { table: HuffTable, streams: Streams },
    Repeat { streams: Streams },
}

/// Stashed Huffman table from the last `compressed` literals block, kept
/// around so `repeat` mode can both cost and encode against it.
#[derive(Clone)]
pub struct LastHuff {
    pub table: HuffTable,
    pub freqs: [u32; 256],
}

const FOUR_STREAM_THRESHOLD: usize = 1024;
const MIN_COMPRESSIBLE_SIZE: usize = 63;

/// Picks a literals section mode per spec.md §4.4.
pub fn choose_literals_mode(
    literals: &[u8],
    prev: Option<&LastHuff>,
) -> Result<(LitMode, LiteralsPlan), Error> {
    if literals.len() < MIN_COMPRESSIBLE_SIZE {
        return Ok((LitMode::Raw, LiteralsPlan::Raw));
    }

    let mut freqs = [0u32; 256];
    for &b in literals {
        freqs[b as usize] += 1;
    }

    let distinct = freqs.iter().filter(|&&f| f > 0).count();
    if distinct == 1 {
        return Ok((LitMode::Rle, LiteralsPlan::Rle(literals[0])));
    }

    let streams =
        if literals.len() >= FOUR_STREAM_THRESHOLD { Streams::Four } else { Streams::One };

    let raw_bits = literals.len() as u64 * 8;

    if let Some(prev) = prev {
        let covers_alphabet = freqs
            .iter()
            .enumerate()
            .all(|(sym, &f)| f == 0 || prev.table.contains(sym as u8));
        if covers_alphabet {
            let repeat_bits = prev.table.cost_bits(&freqs);
            if repeat_bits + 8 < raw_bits {
                return Ok((LitMode::Treeless, LiteralsPlan::Repeat { streams }));
            }
        }
    }

    let table = match HuffTable::build(&freqs) {
        Ok(table) => table,
        Err(_) => return Ok((LitMode::Raw, LiteralsPlan::Raw)),
    };

    let header_cost = 1 + (distinct.div_ceil(2)) as u64 * 8;
    let huff_bits = table.cost_bits(&freqs) + header_cost * 8;

    if huff_bits >= raw_bits {
        return Ok((LitMode::Raw, LiteralsPlan::Raw));
    }

    Ok((LitMode::Compressed, LiteralsPlan::Huffman { table, streams }))
}
