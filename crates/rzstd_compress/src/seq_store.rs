//! Transient per-block buffer (C5): literal bytes skipped over by matches,
//! plus the `(literal_length, match_length, offset)` triples describing
//! each back-reference, in emission order. Mirrors the decoder's
//! `sequences_section::Sequence` but holds the encoder's raw (not yet
//! rep-coded) offset.

#[derive(Debug, Clone, Copy, Default)]
pub struct Sequence {
    pub lit_len: u32,
    pub match_len: u32,
    /// Raw backward distance in bytes (1-based), not yet resolved against
    /// repeat-offset state.
    pub offset: u32,
}

#[derive(Debug, Default)]
pub struct SeqStore {
    pub literals: Vec<u8>,
    pub sequences: Vec<Sequence>,
}

impl SeqStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.literals.clear();
        self.sequences.clear();
    }

    pub fn push_literals(&mut self, bytes: &[u8]) {
        self.literals.extend_from_slice(bytes);
    }

    pub fn push_sequence(&mut self, lit_len: u32, match_len: u32, offset: u32) {
        self.sequences.push(Sequence { lit_len, match_len, offset });
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }
}
