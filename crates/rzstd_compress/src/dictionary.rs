//! Structured dictionary loading (C17, spec.md §3 `[ADD]`): parses the
//! `magic(4) | dictionary_id(4) | entropy_tables_size(4) | entropy_tables
//! | content` container and exposes the pieces `crate::frame` needs.
//!
//! Only the repeat-offset seed is carried forward from a structured
//! dictionary's header into the frame's initial state. The
//! `entropy_tables` section, if present, is read by length and skipped
//! rather than pre-seeded as `repeat`-eligible Huffman/FSE tables (a
//! documented simplification symmetric with `rzstd_decompress::dictionary`
//! — see DESIGN.md) — but its length is always honored, so a non-empty
//! section never leaks into `content`. A raw (non-magic) dictionary is
//! treated as pure content with the default rep triple.

pub const MAGIC: u32 = 0xEC30_A437;

/// Bytes needed to parse the fixed part of the structured header:
/// `magic(4) | dictionary_id(4) | entropy_tables_size(4)`.
const HEADER_SIZE: usize = 12;

pub struct Dictionary {
    pub id: u32,
    pub content: Vec<u8>,
    pub rep: [u32; 3],
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
        bytes.extend_from_slice(&42u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(b"dictionary body");

        let dict = Dictionary::load(&bytes);
        assert_eq!(dict.id, 42);
        assert_eq!(dict.content, b"dictionary body");
    }

    #[test]
    fn non_empty_entropy_tables_section_is_skipped_not_leaked() {
        let mut bytes = MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&7u32.to_le_bytes());
        let entropy_tables = vec![0xAAu8; 20];
        bytes.extend_from_slice(&(entropy_tables.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&entropy_tables);
        bytes.extend_from_slice(b"dictionary body");

        let dict = Dictionary::load(&bytes);
        assert_eq!(dict.id, 7);
        assert_eq!(dict.content, b"dictionary body");
    }

    #[test]
    fn entropy_tables_size_past_buffer_end_clamps_to_empty_content() {
        let mut bytes = MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&1_000u32.to_le_bytes());
        bytes.extend_from_slice(b"too short");

        let dict = Dictionary::load(&bytes);
        assert_eq!(dict.id, 1);
        assert!(dict.content.is_empty());
    }
}
