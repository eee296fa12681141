//! Sliding-window match finders (C6). Three kernels, selected by
//! `Strategy` (spec.md §4.5):
//!
//! - `fast`/`double_fast`/`greedy`/`lazy`/`lazy2` share one chained-hash
//!   kernel (`ChainedHash`), differing only in how many forward positions
//!   are lazily re-evaluated before a match commits.
//! - `btlazy2` drives the same lazy2 lookahead loop, but its candidates
//!   come from a real binary-tree finder (`BinaryTree`) instead of a hash
//!   chain.
//! - `btopt`/`btultra` run a price-based optimal parser over the same
//!   binary tree: a forward cost relaxation (literal-byte entropy
//!   estimate vs. `(ll, ml, offset)` sequence-code bit estimate) followed
//!   by a backward walk of the cheapest-arrival table, per spec.md §4.5's
//!   "compute best arrival price ... reverse-walk the price table".

use rzstd_foundation::{CParams, Strategy};

use crate::rep::RepOffsets;
use crate::seq_store::SeqStore;
use crate::tables::{ll_code, ml_code, of_code};
use crate::window::Window;

const MAX_SEARCH_DEPTH: u32 = 1 << 12;
/// How many of the binary tree's ascending-length candidates the optimal
/// parser relaxes edges for at each position; bounds the DP's fan-out.
const MAX_OPTIMAL_CANDIDATES: usize = 8;

#[inline(always)]
fn read_u64_le(data: &[u8], pos: usize) -> u64 {
    let mut buf = [0u8; 8];
    let n = (data.len() - pos).min(8);
    buf[..n].copy_from_slice(&data[pos..pos + n]);
    u64::from_le_bytes(buf)
}

#[inline(always)]
fn hash(bytes: u64, log: u8) -> usize {
    const PRIME: u64 = 0x9E37_79B1_85EB_CA87;
    (bytes.wrapping_mul(PRIME) >> (64 - log as u32)) as usize
}

/// Chained-hash finder backing `fast`, `double_fast`, `greedy`, `lazy`,
/// `lazy2`.
struct ChainedHash {
    strategy: Strategy,
    min_match: u32,
    search_log: u8,
    hash_log: u8,
    chain_log: u8,
    window_size: u32,
    hash_table: Vec<u32>,
    chain_table: Vec<u32>,
    /// Second table for `double_fast`'s long (8-byte) context; unused by
    /// every other strategy.
    hash_table_long: Option<Vec<u32>>,
}

impl ChainedHash {
    fn new(cparams: &CParams) -> Self {
        let hash_table = vec![0u32; 1usize << cparams.hash_log];
        let chain_table = if cparams.strategy == Strategy::Fast {
            Vec::new()
        } else {
            vec![0u32; 1usize << cparams.chain_log]
        };
        let hash_table_long =
            (cparams.strategy == Strategy::DoubleFast).then(|| vec![0u32; 1usize << cparams.hash_log]);

        Self {
            strategy: cparams.strategy,
            min_match: cparams.min_match as u32,
            search_log: cparams.search_log,
            hash_log: cparams.hash_log,
            chain_log: cparams.chain_log,
            window_size: 1u32 << cparams.window_log,
            hash_table,
            chain_table,
            hash_table_long,
        }
    }

    #[inline(always)]
    fn in_window(&self, cand_pos: u32, pos: u32) -> bool {
        pos - cand_pos <= self.window_size
    }

    fn chain_mask(&self) -> u32 {
        (1u32 << self.chain_log) - 1
    }

    fn search_depth(&self) -> u32 {
        (1u32 << self.search_log).min(MAX_SEARCH_DEPTH)
    }

    #[inline(always)]
    fn insert(&mut self, window: &Window, pos: u32) {
        if pos as usize + self.min_match as usize > window.len() {
            return;
        }
        let bytes = read_u64_le(window.as_slice(), pos as usize);

        let h = hash(bytes, self.hash_log);
        if let Some(chain) = self.chain_table.get_mut(pos as usize & self.chain_mask() as usize) {
            *chain = self.hash_table[h];
        }
        self.hash_table[h] = pos + 1;

        if let Some(long) = self.hash_table_long.as_mut() {
            let lh = hash(bytes, self.hash_log);
            long[lh] = pos + 1;
        }
    }

    fn find_best_match(&self, window: &Window, pos: u32) -> Option<(u32, u32)> {
        let bytes = read_u64_le(window.as_slice(), pos as usize);
        let h = hash(bytes, self.hash_log);

        if let Some(long) = self.hash_table_long.as_ref() {
            let candidate = long[h];
            if candidate != 0 {
                let cand_pos = candidate - 1;
                if cand_pos < pos && self.in_window(cand_pos, pos) {
                    let len = window.match_length(cand_pos, pos);
                    if len >= self.min_match {
                        return Some((cand_pos, len));
                    }
                }
            }
        }

        if self.chain_table.is_empty() {
            let candidate = self.hash_table[h];
            if candidate == 0 {
                return None;
            }
            let cand_pos = candidate - 1;
            if cand_pos >= pos || !self.in_window(cand_pos, pos) {
                return None;
            }
            let len = window.match_length(cand_pos, pos);
            return (len >= self.min_match).then_some((cand_pos, len));
        }

        let mut candidate = self.hash_table[h];
        let mut depth = 0u32;
        let mut best: Option<(u32, u32)> = None;
        let low = window.low_limit();

        while candidate != 0 && depth < self.search_depth() {
            let cand_pos = candidate - 1;
            if cand_pos < low || cand_pos >= pos || !self.in_window(cand_pos, pos) {
                break;
            }
            let len = window.match_length(cand_pos, pos);
            if len >= self.min_match && best.is_none_or(|(_, bl)| len > bl) {
                best = Some((cand_pos, len));
            }
            candidate = self.chain_table[cand_pos as usize & self.chain_mask() as usize];
            depth += 1;
        }

        best
    }

    fn lazy_skip(&self) -> u32 {
        match self.strategy {
            Strategy::Fast | Strategy::DoubleFast | Strategy::Greedy => 0,
            Strategy::Lazy => 1,
            Strategy::Lazy2 | Strategy::BtLazy2 | Strategy::BtOpt | Strategy::BtUltra => 2,
        }
    }

    /// Parses `[start, end)`, filling `seq_store` and updating `rep` in
    /// matching order so later positions see up-to-date repeat offsets.
    fn parse_block(
        &mut self,
        window: &Window,
        start: u32,
        end: u32,
        rep: &mut RepOffsets,
        seq_store: &mut SeqStore,
    ) {
        let data = window.as_slice();
        let min_match = self.min_match;
        let lazy_skip = self.lazy_skip();

        let mut ip = start;
        let mut anchor = start;

        while ip + min_match <= end {
            let rep0 = rep.get(0);
            let rep_match = if rep0 > 0 && rep0 <= ip && rep0 <= self.window_size {
                let len = window.match_length(ip - rep0, ip);
                (len >= min_match).then_some((ip - rep0, len))
            } else {
                None
            };

            let hash_match = self.find_best_match(window, ip);

            let mut best = match (rep_match, hash_match) {
                (Some(r), Some(h)) => Some(if h.1 > r.1 + 1 { h } else { r }),
                (Some(r), None) => Some(r),
                (None, Some(h)) => Some(h),
                (None, None) => None,
            };

            self.insert(window, ip);

            let Some((mut match_pos, mut match_len)) = best.take() else {
                ip += 1;
                continue;
            };

            let mut commit_pos = ip;
            let mut step = 1;
            while step <= lazy_skip {
                let next_ip = commit_pos + step;
                if next_ip + min_match > end {
                    break;
                }
                if let Some((npos, nlen)) = self.find_best_match(window, next_ip) {
                    if nlen > match_len + step {
                        let mut p = ip;
                        while p <= next_ip {
                            self.insert(window, p);
                            p += 1;
                        }
                        commit_pos = next_ip;
                        match_pos = npos;
                        match_len = nlen;
                        step = 1;
                        continue;
                    }
                }
                step += 1;
            }

            let mut p = ip + 1;
            while p < commit_pos {
                self.insert(window, p);
                p += 1;
            }

            let lit_len = commit_pos - anchor;
            seq_store.push_literals(&data[anchor as usize..commit_pos as usize]);
            let raw_offset = commit_pos - match_pos;
            seq_store.push_sequence(lit_len, match_len, raw_offset);
            rep.resolve(raw_offset, lit_len);

            let match_end = commit_pos + match_len;
            let mut p = commit_pos + 1;
            while p < match_end {
                self.insert(window, p);
                p += 1;
            }

            ip = match_end;
            anchor = match_end;
        }

        if anchor < end {
            seq_store.push_literals(&data[anchor as usize..end as usize]);
        }
    }
}

/// Binary-tree match finder backing `btlazy2`/`btopt`/`btultra`
/// (spec.md §4.5: "each node stores two child indices ... insertion
/// descends from the hash slot, splitting the tree by lexicographic
/// comparison of suffixes"). Classic insertion-sort binary tree: walking
/// down from the hash bucket's root, each candidate is routed into the
/// "smaller" or "larger" subtree of the node being inserted depending on
/// whether its suffix sorts before or after the new position's, and is
/// spliced onto whichever of those two subtrees is still open; the walk
/// also collects every strictly-longer match it passes, in ascending
/// order, since those are exactly the offsets worth considering.
struct BinaryTree {
    min_match: u32,
    hash_log: u8,
    /// Arena mask: `left`/`right`/position indices are stored modulo
    /// `1 << chain_log`, same sizing convention as `ChainedHash`'s
    /// `chain_table`.
    mask: u32,
    window_size: u32,
    search_depth: u32,
    root: Vec<u32>,
    left: Vec<u32>,
    right: Vec<u32>,
}

impl BinaryTree {
    fn new(cparams: &CParams) -> Self {
        Self {
            min_match: cparams.min_match as u32,
            hash_log: cparams.hash_log,
            mask: (1u32 << cparams.chain_log) - 1,
            window_size: 1u32 << cparams.window_log,
            search_depth: (1u32 << cparams.search_log).min(MAX_SEARCH_DEPTH),
            root: vec![0u32; 1usize << cparams.hash_log],
            left: vec![0u32; 1usize << cparams.chain_log],
            right: vec![0u32; 1usize << cparams.chain_log],
        }
    }

    #[inline(always)]
    fn in_window(&self, cand: u32, pos: u32) -> bool {
        pos - cand <= self.window_size
    }

    /// Inserts `ip` into the tree (always, so later positions can find
    /// it) and returns every candidate match found during the descent
    /// whose length strictly exceeds every previous one, ascending by
    /// length — a Pareto frontier over `(length, position)` bounded by
    /// `search_depth` tree nodes visited.
    fn insert(&mut self, window: &Window, ip: u32) -> Vec<(u32, u32)> {
        if ip as usize + self.min_match as usize > window.len() {
            return Vec::new();
        }
        let data = window.as_slice();
        let bytes = read_u64_le(data, ip as usize);
        let h = hash(bytes, self.hash_log);
        let ip_masked = ip & self.mask;

        self.left[ip_masked as usize] = 0;
        self.right[ip_masked as usize] = 0;

        let mut matches = Vec::new();
        let mut best_len = self.min_match.saturating_sub(1);

        let mut match_index = self.root[h];
        self.root[h] = ip + 1;

        // Where the next "smaller than ip" / "larger than ip" candidate
        // gets spliced in: (arena index to write into, is-right-child).
        let mut smaller_parent = ip_masked;
        let mut smaller_is_right = false;
        let mut larger_parent = ip_masked;
        let mut larger_is_right = true;

        let low = window.low_limit();
        let mut depth = 0u32;

        while match_index != 0 && depth < self.search_depth {
            let cand = match_index - 1;
            if cand < low || cand >= ip || !self.in_window(cand, ip) {
                break;
            }
            depth += 1;

            let len = window.match_length(cand, ip);
            if len > best_len {
                best_len = len;
                if len >= self.min_match {
                    matches.push((len, cand));
                }
            }

            let cand_masked = cand & self.mask;
            let probe_pos = (ip + len) as usize;
            let cand_is_smaller = if probe_pos >= data.len() {
                // Candidate's suffix ran out exactly where ip's does too:
                // treat it as the smaller of the two (arbitrary but
                // consistent tie-break).
                true
            } else {
                data[(cand as usize) + len as usize] < data[probe_pos]
            };

            if cand_is_smaller {
                if smaller_is_right {
                    self.right[smaller_parent as usize] = cand + 1;
                } else {
                    self.left[smaller_parent as usize] = cand + 1;
                }
                smaller_parent = cand_masked;
                smaller_is_right = true;
                match_index = self.right[cand_masked as usize];
            } else {
                if larger_is_right {
                    self.right[larger_parent as usize] = cand + 1;
                } else {
                    self.left[larger_parent as usize] = cand + 1;
                }
                larger_parent = cand_masked;
                larger_is_right = false;
                match_index = self.left[cand_masked as usize];
            }
        }

        if smaller_is_right {
            self.right[smaller_parent as usize] = 0;
        } else {
            self.left[smaller_parent as usize] = 0;
        }
        if larger_is_right {
            self.right[larger_parent as usize] = 0;
        } else {
            self.left[larger_parent as usize] = 0;
        }

        matches
    }
}

/// Approximate sequence-code cost in bits for `(lit_len, match_len,
/// raw_offset)`, used only to rank candidate parses against each other
/// (not to reproduce the final FSE bitstream size exactly): the format's
/// `(code, extra_bits)` split for each of LL/ML/OF plus a flat
/// per-symbol estimate of the entropy-coded code itself. `rep0` is the
/// repeat-offset slot snapshotted at block start; matches reusing it are
/// nudged cheaper, mirroring "checks repeat offsets with higher
/// priority" without threading the full path-dependent `rep` state
/// through the parse (documented simplification, see DESIGN.md).
fn sequence_cost_bits(lit_len: u32, match_len: u32, raw_offset: u32, rep0: u32) -> f64 {
    const CODE_BITS_ESTIMATE: f64 = 3.0;
    let (_, _, ll_extra) = ll_code(lit_len);
    let (_, _, ml_extra) = ml_code(match_len);
    let offset_value = raw_offset + 3;
    let (_, _, of_extra) = of_code(offset_value);
    let mut bits = f64::from(ll_extra) + f64::from(ml_extra) + f64::from(of_extra) + 3.0 * CODE_BITS_ESTIMATE;
    if raw_offset == rep0 {
        bits -= 2.0;
    }
    bits.max(1.0)
}

/// Per-byte entropy estimate from this block's own literal-byte
/// histogram, used as the optimal parser's literal price (spec.md §4.5:
/// "prices are `-log2(frequency)` estimates"; "periodically rescaled
/// from the previous block's statistics" is approximated here by
/// rescaling from the block being parsed itself).
fn literal_cost_table(data: &[u8]) -> [f64; 256] {
    let mut hist = [0u32; 256];
    for &b in data {
        hist[b as usize] += 1;
    }
    let total = data.len().max(1) as f64;
    let mut cost = [8.0f64; 256];
    for (sym, &count) in hist.iter().enumerate() {
        if count > 0 {
            let p = f64::from(count) / total;
            cost[sym] = (-p.log2()).max(0.1);
        }
    }
    cost
}

/// One edge of the optimal parser's arrival-price DP: either "one
/// literal byte" (`None`) or a committed match of the given
/// `(match_len, raw_offset)`.
type Edge = Option<(u32, u32)>;

pub struct MatchFinder {
    strategy: Strategy,
    chained: Option<ChainedHash>,
    tree: Option<BinaryTree>,
}

impl MatchFinder {
    pub fn new(cparams: &CParams) -> Self {
        if cparams.strategy.is_binary_tree() {
            Self { strategy: cparams.strategy, chained: None, tree: Some(BinaryTree::new(cparams)) }
        } else {
            Self { strategy: cparams.strategy, chained: Some(ChainedHash::new(cparams)), tree: None }
        }
    }

    pub fn parse_block(
        &mut self,
        window: &Window,
        start: u32,
        end: u32,
        rep: &mut RepOffsets,
        seq_store: &mut SeqStore,
    ) {
        match self.strategy {
            Strategy::BtLazy2 => self.parse_block_bt_lazy(window, start, end, rep, seq_store),
            Strategy::BtOpt | Strategy::BtUltra => self.parse_block_optimal(window, start, end, rep, seq_store),
            _ => self
                .chained
                .as_mut()
                .expect("chained kernel selected for non-tree strategy")
                .parse_block(window, start, end, rep, seq_store),
        }
    }

    /// `btlazy2`: the same lazy2 (2-position lookahead) driving loop as
    /// the chained kernel's `lazy2`, but candidates come from the binary
    /// tree's longest match at each position instead of a hash chain.
    fn parse_block_bt_lazy(
        &mut self,
        window: &Window,
        start: u32,
        end: u32,
        rep: &mut RepOffsets,
        seq_store: &mut SeqStore,
    ) {
        let tree = self.tree.as_mut().expect("binary tree selected for bt strategy");
        let data = window.as_slice();
        let min_match = tree.min_match;

        let mut ip = start;
        let mut anchor = start;

        while ip + min_match <= end {
            let rep0 = rep.get(0);
            let rep_match = if rep0 > 0 && rep0 <= ip && rep0 <= tree.window_size {
                let len = window.match_length(ip - rep0, ip);
                (len >= min_match).then_some((ip - rep0, len))
            } else {
                None
            };

            let tree_match = tree.insert(window, ip).last().copied().map(|(len, pos)| (pos, len));

            let mut best = match (rep_match, tree_match) {
                (Some(r), Some(h)) => Some(if h.1 > r.1 + 1 { h } else { r }),
                (Some(r), None) => Some(r),
                (None, Some(h)) => Some(h),
                (None, None) => None,
            };

            let Some((mut match_pos, mut match_len)) = best.take() else {
                ip += 1;
                continue;
            };

            let mut commit_pos = ip;
            let mut step = 1u32;
            while step <= 2 {
                let next_ip = commit_pos + step;
                if next_ip + min_match > end {
                    break;
                }
                if let Some((nlen, npos)) =
                    tree.insert(window, next_ip).last().copied().map(|(len, pos)| (len, pos))
                {
                    if nlen > match_len + step {
                        let mut p = commit_pos + 1;
                        while p < next_ip {
                            tree.insert(window, p);
                            p += 1;
                        }
                        commit_pos = next_ip;
                        match_pos = npos;
                        match_len = nlen;
                        step = 1;
                        continue;
                    }
                }
                step += 1;
            }

            let mut p = ip + 1;
            while p < commit_pos {
                tree.insert(window, p);
                p += 1;
            }

            let lit_len = commit_pos - anchor;
            seq_store.push_literals(&data[anchor as usize..commit_pos as usize]);
            let raw_offset = commit_pos - match_pos;
            seq_store.push_sequence(lit_len, match_len, raw_offset);
            rep.resolve(raw_offset, lit_len);

            let match_end = commit_pos + match_len;
            let mut p = commit_pos + 1;
            while p < match_end {
                tree.insert(window, p);
                p += 1;
            }

            ip = match_end;
            anchor = match_end;
        }

        if anchor < end {
            seq_store.push_literals(&data[anchor as usize..end as usize]);
        }
    }

    /// `btopt`/`btultra`: forward cost relaxation over every position in
    /// `[start, end)` using the binary tree for match candidates, then a
    /// backward walk from `end` to reconstruct the cheapest path found,
    /// per spec.md §4.5.
    fn parse_block_optimal(
        &mut self,
        window: &Window,
        start: u32,
        end: u32,
        rep: &mut RepOffsets,
        seq_store: &mut SeqStore,
    ) {
        let tree = self.tree.as_mut().expect("binary tree selected for bt strategy");
        let data = window.as_slice();
        let min_match = tree.min_match;
        let n = (end - start) as usize;

        if n == 0 {
            return;
        }

        let rep0 = rep.get(0);
        let lit_cost = literal_cost_table(&data[start as usize..end as usize]);

        let mut cost = vec![f64::INFINITY; n + 1];
        let mut choice: Vec<Edge> = vec![None; n + 1];
        cost[0] = 0.0;

        for i in 0..n {
            if cost[i].is_infinite() {
                continue;
            }
            let ip = start + i as u32;

            let byte = data[ip as usize];
            let candidate_cost = cost[i] + lit_cost[byte as usize];
            if candidate_cost < cost[i + 1] {
                cost[i + 1] = candidate_cost;
                choice[i + 1] = None;
            }

            if ip + min_match > end {
                continue;
            }

            let mut candidates = tree.insert(window, ip);
            if rep0 > 0 && rep0 <= ip && rep0 <= tree.window_size {
                let len = window.match_length(ip - rep0, ip);
                if len >= min_match {
                    candidates.push((len, ip - rep0));
                }
            }
            candidates.sort_unstable_by_key(|&(len, _)| len);

            for &(len, pos) in candidates.iter().rev().take(MAX_OPTIMAL_CANDIDATES) {
                let max_len = len.min(end - ip);
                if max_len < min_match {
                    continue;
                }
                let raw_offset = ip - pos;

                // Try both the longest reach and the minimum commitment:
                // sometimes stopping a match early leaves a cheaper
                // continuation (e.g. right into another, better match).
                for try_len in [min_match, max_len] {
                    if try_len < min_match || try_len > max_len {
                        continue;
                    }
                    let j = i + try_len as usize;
                    let bits = sequence_cost_bits(0, try_len, raw_offset, rep0);
                    let candidate_cost = cost[i] + bits;
                    if candidate_cost < cost[j] {
                        cost[j] = candidate_cost;
                        choice[j] = Some((try_len, raw_offset));
                    }
                }
            }
        }

        // Backward walk from `end`, then reverse into forward order.
        let mut edges = Vec::with_capacity(n);
        let mut i = n;
        while i > 0 {
            match choice[i] {
                None => {
                    edges.push((i - 1, i, None));
                    i -= 1;
                }
                Some((len, off)) => {
                    let j = i - len as usize;
                    edges.push((j, i, Some((len, off))));
                    i = j;
                }
            }
        }
        edges.reverse();

        let mut anchor = 0usize;
        for (from, to, edge) in edges {
            if let Some((len, raw_offset)) = edge {
                let lit_len = (from - anchor) as u32;
                seq_store.push_literals(&data[(start as usize + anchor)..(start as usize + from)]);
                seq_store.push_sequence(lit_len, len, raw_offset);
                rep.resolve(raw_offset, lit_len);
                anchor = to;
            }
        }
        if anchor < n {
            seq_store.push_literals(&data[(start as usize + anchor)..end as usize]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rzstd_foundation::cparams_for_level;

    fn run(input: &[u8], level: i32) -> (SeqStore, RepOffsets) {
        let cparams = cparams_for_level(level);
        let window = Window::new(&[], input);
        let mut finder = MatchFinder::new(&cparams);
        let mut rep = RepOffsets::new();
        let mut store = SeqStore::new();
        finder.parse_block(&window, 0, input.len() as u32, &mut rep, &mut store);
        (store, rep)
    }

    fn reconstruct(input_len: usize, store: &SeqStore) -> Vec<u8> {
        let mut out = Vec::with_capacity(input_len);
        let mut lit_idx = 0usize;
        for seq in &store.sequences {
            let ll = seq.lit_len as usize;
            out.extend_from_slice(&store.literals[lit_idx..lit_idx + ll]);
            lit_idx += ll;
            let start = out.len() - seq.offset as usize;
            for i in 0..seq.match_len as usize {
                let byte = out[start + i];
                out.push(byte);
            }
        }
        out.extend_from_slice(&store.literals[lit_idx..]);
        out
    }

    #[test]
    fn finds_repeated_pattern() {
        let input = b"ABAB".repeat(256);
        let (store, _) = run(&input, 3);
        assert!(!store.sequences.is_empty());
        assert_eq!(reconstruct(input.len(), &store), input);
    }

    #[test]
    fn handles_no_repetition() {
        let input: Vec<u8> = (0..=255u8).collect();
        let (store, _) = run(&input, 1);
        assert_eq!(reconstruct(input.len(), &store), input);
    }

    #[test]
    fn round_trips_for_every_strategy_level() {
        let input = b"the quick brown fox jumps over the lazy dog. the quick brown fox.".repeat(20);
        for level in [1, 2, 3, 5, 7, 10, 12, 15, 17] {
            let (store, _) = run(&input, level);
            assert_eq!(reconstruct(input.len(), &store), input, "level {level}");
        }
    }

    #[test]
    fn binary_tree_strategy_finds_matches() {
        let input = b"the quick brown fox jumps over the lazy dog. ".repeat(40);
        let (store, _) = run(&input, 10); // BtLazy2
        assert!(!store.sequences.is_empty());
        assert_eq!(reconstruct(input.len(), &store), input);
    }

    #[test]
    fn optimal_parser_round_trips() {
        let input = b"the quick brown fox jumps over the lazy dog. ".repeat(40);
        for level in [12, 15, 19] {
            // BtOpt, BtUltra, BtUltra
            let (store, _) = run(&input, level);
            assert!(!store.sequences.is_empty());
            assert_eq!(reconstruct(input.len(), &store), input, "level {level}");
        }
    }

    #[test]
    fn optimal_parser_handles_empty_and_incompressible() {
        let (store, _) = run(b"", 19);
        assert!(store.sequences.is_empty());
        assert!(store.literals.is_empty());

        let input: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let (store, _) = run(&input, 19);
        assert_eq!(reconstruct(input.len(), &store), input);
    }
}
