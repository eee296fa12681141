//! Index-based view over the bytes available for back-references: an
//! optional dictionary prefix followed by the source being compressed.
//!
//! Mirrors the decoder's `window_buf` bookkeeping in spirit (see
//! `rzstd_decompress::window`) but from the encoder's side: instead of a
//! ring buffer being filled as blocks are decoded, the whole input (plus
//! any dictionary prefix) is addressable up front, and `low_limit` /
//! `dict_limit` exist so the match finders and the overflow-correction
//! path share the same index semantics a real implementation would use
//! even once blocks start being produced incrementally by the streaming
//! engine.

/// A contiguous byte arena addressed by `u32` indices, with an optional
/// dictionary prefix living below `dict_limit`.
pub struct Window<'a> {
    data: std::borrow::Cow<'a, [u8]>,
    dict_limit: u32,
    low_limit: u32,
}

impl<'a> Window<'a> {
    /// `dict` is an optional prefix (already validated/decoded content, not
    /// the raw dictionary frame) that back-references may point into;
    /// `src` is the data being compressed, placed immediately after it.
    /// When `dict` is non-empty the two are concatenated into one owned
    /// buffer so every index (anchors, match positions, `rep` offsets) is
    /// expressed in one coordinate space, exactly as `dict_limit` implies.
    pub fn new(dict: &'a [u8], src: &'a [u8]) -> Self {
        if dict.is_empty() {
            return Self { data: std::borrow::Cow::Borrowed(src), dict_limit: 0, low_limit: 0 };
        }

        let mut combined = Vec::with_capacity(dict.len() + src.len());
        combined.extend_from_slice(dict);
        combined.extend_from_slice(src);

        Self {
            data: std::borrow::Cow::Owned(combined),
            dict_limit: dict.len() as u32,
            low_limit: 0,
        }
    }

    /// Convenience for the common case of no dictionary prefix.
    pub fn no_dict(src: &'a [u8]) -> Self {
        Self::new(&[], src)
    }

    /// Appends more source bytes to the window, growing it in place.
    /// Used by the streaming encoder, which receives input incrementally
    /// instead of having it all available up front; upgrades a borrowed
    /// window to an owned one on first use, same as `Cow::to_mut`.
    pub fn push(&mut self, bytes: &[u8]) {
        self.data.to_mut().extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn dict_limit(&self) -> u32 {
        self.dict_limit
    }

    pub fn low_limit(&self) -> u32 {
        self.low_limit
    }

    #[inline(always)]
    pub fn byte(&self, idx: u32) -> u8 {
        self.data[idx as usize]
    }

    #[inline(always)]
    pub fn slice(&self, from: u32, to: u32) -> &[u8] {
        &self.data[from as usize..to as usize]
    }

    /// Length of the matching run starting at `a` and `b` (`a < b`,
    /// typically a candidate position and the current cursor), capped at
    /// the end of the buffer.
    #[inline(always)]
    pub fn match_length(&self, a: u32, b: u32) -> u32 {
        let max = self.data.len() as u32 - b;
        let mut n = 0u32;
        while n < max && self.data[(a + n) as usize] == self.data[(b + n) as usize] {
            n += 1;
        }
        n
    }

    /// Index-overflow correction (§4.6): when `current` approaches the
    /// `u32` ceiling, every table entry would need rebasing by
    /// `reducer = current - window_size`. Single-shot whole-buffer
    /// compression never accumulates a `current` anywhere near `2^32`, so
    /// this is a documented no-op retained for interface fidelity with the
    /// streaming engine, which could in principle run long enough to need
    /// it.
    pub fn needs_overflow_correction(&self, current: u32, window_size: u32) -> bool {
        (current as u64) >= (u32::MAX as u64) - window_size as u64
    }
}

impl Window<'static> {
    /// Builds an owned window seeded with `dict` as its prefix and no
    /// source bytes yet, for the streaming encoder: source bytes arrive
    /// incrementally afterward via `push`, so the window can't borrow
    /// them from a caller-held slice the way `new`/`no_dict` do.
    pub fn owned(dict: Vec<u8>) -> Self {
        let dict_limit = dict.len() as u32;
        Self { data: std::borrow::Cow::Owned(dict), dict_limit, low_limit: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_dict_borrows_source() {
        let src = b"hello world";
        let window = Window::no_dict(src);
        assert_eq!(window.dict_limit(), 0);
        assert_eq!(window.as_slice(), src);
    }

    #[test]
    fn dict_prefix_shares_one_index_space() {
        let dict = b"the quick brown fox ";
        let src = b"jumps over the quick brown fox";
        let window = Window::new(dict, src);

        assert_eq!(window.dict_limit(), dict.len() as u32);
        assert_eq!(window.len(), dict.len() + src.len());

        // "the quick brown fox" recurs once in the dictionary and once in
        // `src`; a match anchored in the dictionary must be reachable by an
        // index in `src`.
        let dict_pos = 0u32;
        let src_pos = (dict.len() + "jumps over ".len()) as u32;
        assert_eq!(window.match_length(dict_pos, src_pos), 20);
    }
}
