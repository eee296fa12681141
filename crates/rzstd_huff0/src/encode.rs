use crate::Error;

const MAX_BITS: u8 = 11;

#[derive(Debug, Clone)]
struct Package {
    weight: u64,
    symbols: Vec<u8>,
}

/// Builds length-limited canonical Huffman code lengths for every symbol
/// with a nonzero frequency, using the Larmore-Hirschberg package-merge
/// algorithm: the standard way to bound the longest codeword to `max_bits`
/// without giving up optimality among length-limited prefix codes.
fn package_merge_lengths(freqs: &[(u8, u32)], max_bits: u8) -> Vec<(u8, u8)> {
    if freqs.len() == 1 {
        return vec![(freqs[0].0, 1)];
    }

    let mut sorted_leaves: Vec<Package> = freqs
        .iter()
        .map(|&(sym, freq)| Package { weight: freq as u64, symbols: vec![sym] })
        .collect();
    sorted_leaves.sort_by_key(|p| p.weight);

    let mut prev = sorted_leaves.clone();

    for _ in 1..max_bits {
        let mut packaged = Vec::with_capacity(prev.len() / 2);
        let mut i = 0;
        while i + 1 < prev.len() {
            let mut symbols = prev[i].symbols.clone();
            symbols.extend_from_slice(&prev[i + 1].symbols);
            packaged.push(Package { weight: prev[i].weight + prev[i + 1].weight, symbols });
            i += 2;
        }

        let mut merged = packaged;
        merged.extend(sorted_leaves.iter().cloned());
        merged.sort_by_key(|p| p.weight);
        prev = merged;
    }

    let take = (2 * (freqs.len() - 1)).min(prev.len());
    let mut counts = [0u32; 256];
    for pkg in &prev[..take] {
        for &sym in &pkg.symbols {
            counts[sym as usize] += 1;
        }
    }

    freqs.iter().map(|&(sym, _)| (sym, counts[sym as usize] as u8)).collect()
}

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    code: u16,
    n_bits: u8,
}

/// Compress-side canonical Huffman table, the mirror of
/// [`crate::DecodingTable`]. Holds one `(code, n_bits)` pair per symbol
/// rather than an expanded `2^max_bits`-slot lookup table, since the
/// encoder only ever needs a single codeword per symbol.
#[derive(Debug, Clone)]
pub struct EncodingTable {
    entries: [Entry; 256],
    present: [bool; 256],
    max_bits: u8,
    max_symbol: u8,
    weights: Vec<u8>,
}

impl EncodingTable {
    /// `freqs[s]` is the observed count of symbol `s`. Requires at least
    /// two distinct symbols with nonzero frequency — a single-symbol
    /// alphabet has no valid Huffman code and belongs in an RLE literals
    /// block instead.
    pub fn build(freqs: &[u32; 256]) -> Result<Self, Error> {
        let present: Vec<(u8, u32)> = freqs
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f > 0)
            .map(|(s, &f)| (s as u8, f))
            .collect();

        if present.len() < 2 {
            return Err(Error::ZeroWeightSum);
        }

        let lengths = package_merge_lengths(&present, MAX_BITS);
        let max_bits = lengths.iter().map(|&(_, l)| l).max().unwrap();
        let max_symbol = lengths.iter().map(|&(s, _)| s).max().unwrap();

        let mut len_by_symbol = [0u8; 256];
        for &(sym, len) in &lengths {
            len_by_symbol[sym as usize] = len;
        }

        // Mirrors DecodingTable::from_weights exactly, just assigning one
        // representative codeword per symbol instead of filling every
        // `2^(w-1)` table slot it would occupy in the decoder's expanded
        // table.
        let mut bit_rank = [0u32; (MAX_BITS + 1) as usize];
        for &(_, len) in &lengths {
            let w = max_bits - len + 1;
            bit_rank[w as usize] += 1;
        }

        let mut next_code = [0u32; (MAX_BITS + 1) as usize];
        let mut curr = 0u32;
        for w in 1..=max_bits as usize {
            next_code[w] = curr;
            curr += bit_rank[w] << (w - 1);
        }

        let mut entries = [Entry::default(); 256];
        let mut present_flags = [false; 256];

        for sym in 0..=max_symbol {
            let len = len_by_symbol[sym as usize];
            if len == 0 {
                continue;
            }

            let w = (max_bits - len + 1) as usize;
            let code_start = next_code[w];
            let num_slots = 1u32 << (w - 1);
            let codeword = (code_start >> (w - 1)) as u16;

            entries[sym as usize] = Entry { code: codeword, n_bits: len };
            present_flags[sym as usize] = true;
            next_code[w] += num_slots;
        }

        let mut weights = vec![0u8; max_symbol as usize];
        for &(sym, len) in &lengths {
            if sym == max_symbol {
                continue;
            }
            weights[sym as usize] = max_bits - len + 1;
        }

        Ok(Self {
            entries,
            present: present_flags,
            max_bits,
            max_symbol,
            weights,
        })
    }

    pub fn max_bits(&self) -> u8 {
        self.max_bits
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.present[symbol as usize]
    }

    /// Estimated stream cost in bits, used by the literals-mode selector to
    /// weigh Huffman against raw/RLE storage before committing to it.
    pub fn cost_bits(&self, freqs: &[u32; 256]) -> u64 {
        freqs
            .iter()
            .enumerate()
            .map(|(sym, &f)| f as u64 * self.entries[sym].n_bits as u64)
            .sum()
    }

    /// `(code, n_bits)` for `symbol`, MSB-aligned against the decoder's raw
    /// bit-window convention. Callers push these into a
    /// [`rzstd_io::ReverseBitWriter`] in reverse symbol order so a
    /// tail-first [`rzstd_io::ReverseBitReader`] recovers the original
    /// forward sequence, the same convention `rzstd_fse`'s state machine
    /// uses.
    pub fn encode(&self, symbol: u8) -> (u64, u8) {
        let entry = self.entries[symbol as usize];
        (entry.code as u64, entry.n_bits)
    }

    /// The explicit weight array for the wire header: weights for symbols
    /// `0..max_symbol`, with `max_symbol`'s own weight inferred by the
    /// reader from the Kraft-sum remainder.
    pub fn weights(&self) -> &[u8] {
        &self.weights
    }
}

/// Packs an explicit weight list into the "direct" wire header
/// [`crate::DecodingTable::read`] parses when its header byte is `>= 128`:
/// a `127 + count` header byte followed by two 4-bit weights per byte.
/// The compressed (FSE) weight header is never emitted — always encoding
/// the direct form trades a little header size for a much simpler encoder,
/// and the decoder accepts both equally.
pub fn write_weights_direct(weights: &[u8]) -> Result<Vec<u8>, Error> {
    let count = weights.len();
    if count == 0 || count > 128 {
        return Err(Error::TableOverflow);
    }

    let mut out = Vec::with_capacity(1 + count.div_ceil(2));
    out.push(127 + count as u8);

    for pair in weights.chunks(2) {
        let hi = pair[0];
        let lo = pair.get(1).copied().unwrap_or(0);
        out.push((hi << 4) | (lo & 0xF));
    }

    Ok(out)
}

pub fn build_encoding_table(freqs: &[u32; 256]) -> Result<EncodingTable, Error> {
    EncodingTable::build(freqs)
}

#[cfg(test)]
mod tests {
    use rzstd_io::{ReverseBitReader, ReverseBitWriter};

    use super::*;
    use crate::decode::{Decoder, DecodingTable};

    fn freqs_from(symbols: &[u8]) -> [u32; 256] {
        let mut freqs = [0u32; 256];
        for &s in symbols {
            freqs[s as usize] += 1;
        }
        freqs
    }

    #[test]
    fn round_trips_through_huff0_decoder() {
        let symbols: Vec<u8> = b"abracadabra_abracadabra_xyz".to_vec();
        let freqs = freqs_from(&symbols);

        let table = EncodingTable::build(&freqs).unwrap();
        let wire = write_weights_direct(table.weights()).unwrap();

        let mut w = ReverseBitWriter::new();
        for &sym in symbols.iter().rev() {
            let (code, n_bits) = table.encode(sym);
            w.add_bits(code, n_bits).unwrap();
        }
        let bytes = w.finish();

        let (decode_table, consumed) = DecodingTable::<{ 1 << 11 }>::read(&wire).unwrap();
        assert_eq!(consumed, wire.len());
        assert_eq!(decode_table.entries().len(), 1 << table.max_bits());

        let mut r = ReverseBitReader::new(&bytes).unwrap();
        let mut dec = Decoder::new(&decode_table, &mut r);
        let decoded: Vec<u8> =
            (0..symbols.len()).map(|_| dec.decode(&mut r).unwrap()).collect();

        assert_eq!(decoded, symbols);
    }

    #[test]
    fn rejects_single_symbol_alphabet() {
        let freqs = freqs_from(b"aaaaaaaa");
        assert!(matches!(EncodingTable::build(&freqs), Err(Error::ZeroWeightSum)));
    }

    #[test]
    fn package_merge_respects_max_bits() {
        let mut freqs = [0u32; 256];
        // A sharply skewed distribution that would need longer-than-11-bit
        // codes under a plain Huffman tree.
        for (i, f) in [1u32, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 1000].into_iter().enumerate() {
            freqs[i] = f;
        }

        let table = EncodingTable::build(&freqs).unwrap();
        assert!(table.max_bits() <= MAX_BITS);
    }
}
