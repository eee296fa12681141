//! Structured dictionary loading (C17), the decode-side counterpart to
//! `rzstd_compress::dictionary`: parses the
//! `magic(4) | dictionary_id(4) | entropy_tables_size(4) | entropy_tables
//! | content` container and exposes the content prefix and repeat-offset
//! seed `Context::reset` needs to prime the window and `offset_hist`
//! before block decoding starts.
//!
//! As on the compress side, the entropy tables section is read by length
//! and skipped rather than pre-seeded as `repeat`-eligible Huffman/FSE
//! tables (see DESIGN.md); symmetry with the encoder keeps this correct,
//! since neither side will ever attempt a repeat mode the other can't
//! resolve. Honoring the length (rather than assuming the section is
//! empty) keeps a non-empty section from being misread as window content.

pub const MAGIC: u32 = 0xEC30_A437;

/// Bytes needed to parse the fixed part of the structured header:
/// `magic(4) | dictionary_id(4) | entropy_tables_size(4)`.
const HEADER_SIZE: usize = 12;

pub struct Dictionary {
    pub id: u32,
    pub content: Vec<u8>,
    pub rep: [usize; 3],
}

impl Dictionary {
    pub fn load(bytes: &[u8]) -> Self {
        if bytes.len() >= HEADER_SIZE {
            let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
            if magic == MAGIC {
                let id = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
                let entropy_tables_size = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
                let content_start = (HEADER_SIZE + entropy_tables_size).min(bytes.len());
                return Self { id, content: bytes[content_start..].to_vec(), rep: [1, 4, 8] };
            }
        }

        Self { id: 0, content: bytes.to_vec(), rep: [1, 4, 8] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_content_dictionary_has_default_rep() {
        let dict = Dictionary::load(b"plain prefix bytes");
        assert_eq!(dict.id, 0);
        assert_eq!(dict.content, b"plain prefix bytes");
        assert_eq!(dict.rep, [1, 4, 8]);
    }

    #[test]
    fn structured_dictionary_extracts_id_and_content() {
        let mut bytes = MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&7u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(b"dictionary body");

        let dict = Dictionary::load(&bytes);
        assert_eq!(dict.id, 7);
        assert_eq!(dict.content, b"dictionary body");
    }

    #[test]
    fn non_empty_entropy_tables_section_is_skipped_not_leaked() {
        let mut bytes = MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&9u32.to_le_bytes());
        let entropy_tables = vec![0x55u8; 16];
        bytes.extend_from_slice(&(entropy_tables.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&entropy_tables);
        bytes.extend_from_slice(b"dictionary body");

        let dict = Dictionary::load(&bytes);
        assert_eq!(dict.id, 9);
        assert_eq!(dict.content, b"dictionary body");
    }
}
