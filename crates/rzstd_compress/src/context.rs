//! Per-frame encoder state (C7): the match finder, the repeat-offset
//! history, the transient per-block [`SeqStore`], and the stashed
//! Huffman/FSE tables `repeat` modes reuse across blocks. Mirrors
//! `rzstd_decompress::context::Context` from the other side of the wire.

use rzstd_foundation::CParams;

use crate::entropy::LastHuff;
use crate::matchfinders::MatchFinder;
use crate::rep::RepOffsets;
use crate::seq_store::SeqStore;
use crate::tables::{LL_N, ML_N, OF_N};

pub struct Context {
    pub matchfinder: MatchFinder,
    pub rep: RepOffsets,
    pub seq_store: SeqStore,

    pub last_huff: Option<LastHuff>,
    pub ll_stash: Option<crate::entropy::LastFse<LL_N>>,
    pub of_stash: Option<crate::entropy::LastFse<OF_N>>,
    pub ml_stash: Option<crate::entropy::LastFse<ML_N>>,
}

impl Context {
    pub fn new(cparams: CParams) -> Self {
        Self {
            matchfinder: MatchFinder::new(&cparams),
            rep: RepOffsets::new(),
            seq_store: SeqStore::new(),
            last_huff: None,
            ll_stash: None,
            of_stash: None,
            ml_stash: None,
        }
    }

    /// Resets all per-frame state, optionally seeding the repeat-offset
    /// history from a dictionary. Entropy table stashes always start
    /// empty: the structured dictionary format's entropy tables are not
    /// preseeded into `repeat` eligibility here (see DESIGN.md), so the
    /// first block of every frame must either transmit a fresh table or
    /// fall back to raw/predefined, exactly as the decoder's own
    /// `Context::reset` starts with `huff.table = None`.
    pub fn reset(&mut self, cparams: CParams, rep_seed: Option<[u32; 3]>) {
        self.matchfinder = MatchFinder::new(&cparams);
        self.rep = rep_seed.map_or_else(RepOffsets::new, RepOffsets::from_triple);
        self.seq_store.clear();
        self.last_huff = None;
        self.ll_stash = None;
        self.of_stash = None;
        self.ml_stash = None;
    }
}
