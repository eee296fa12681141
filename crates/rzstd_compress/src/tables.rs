//! Code/extra-bits tables for the three sequence symbol types, and the
//! predefined FSE distributions used for the `predefined` compression
//! mode. These are the encode-side mirror of `rzstd_decompress`'s
//! `LL_DIST`/`OF_DIST`/`ML_DIST` and their baseline tables: the decoder
//! maps `code -> (baseline, extra_bits)`, the encoder needs the inverse,
//! `value -> (code, extra_value, extra_bits)`.

/// `(baseline, extra_bits)` per literal-length code, identical to
/// `rzstd_decompress::sequences_section::LL_TABLE`.
const LL_TABLE: [(u32, u8); 36] = [
    (0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0), (7, 0), (8, 0), (9, 0),
    (10, 0), (11, 0), (12, 0), (13, 0), (14, 0), (15, 0), (16, 1), (18, 1), (20, 1),
    (22, 1), (24, 2), (28, 2), (32, 3), (40, 3), (48, 4), (64, 6), (128, 7), (256, 8),
    (512, 9), (1024, 10), (2048, 11), (4096, 12), (8192, 13), (16384, 14), (32768, 15),
    (65536, 16),
];

/// `(baseline, extra_bits)` per match-length code, identical to
/// `rzstd_decompress::sequences_section::ML_TABLE`.
const ML_TABLE: [(u32, u8); 53] = [
    (3, 0), (4, 0), (5, 0), (6, 0), (7, 0), (8, 0), (9, 0), (10, 0), (11, 0), (12, 0),
    (13, 0), (14, 0), (15, 0), (16, 0), (17, 0), (18, 0), (19, 0), (20, 0), (21, 0),
    (22, 0), (23, 0), (24, 0), (25, 0), (26, 0), (27, 0), (28, 0), (29, 0), (30, 0),
    (31, 0), (32, 0), (33, 0), (34, 0), (35, 1), (37, 1), (39, 1), (41, 1), (43, 2),
    (47, 2), (51, 3), (59, 3), (67, 4), (83, 4), (99, 5), (131, 7), (259, 8), (515, 9),
    (1027, 10), (2051, 11), (4099, 12), (8195, 13), (16387, 14), (32771, 15), (65539, 16),
];

/// Literal-length alphabet size (spec.md §6: 36 predefined symbols).
pub const LL_MAX_SYMBOL: usize = 35;
/// Match-length alphabet size (53 predefined symbols).
pub const ML_MAX_SYMBOL: usize = 52;
/// Offset-code alphabet is open-ended (`code = highbit(offset)`); 32 codes
/// comfortably covers every window up to `2^31`, far past the format's
/// `2^27` ceiling.
pub const OF_MAX_SYMBOL: usize = 31;

/// `rzstd_decompress::context::FSEContext` fixes each stream's
/// `DecodingTable<N>` at `N = <dist>.table_size()`, i.e. at the
/// *predefined* accuracy log, not the format's per-stream ceiling (9/9/8).
/// A freshly built (`FSECompressed`) table therefore has to fit the same
/// `N` the predefined/repeat/RLE paths share for that stream, so these
/// constants double as both the predefined accuracy log and the hard
/// ceiling `choose_fse` is allowed to build up to.
pub const LL_TABLE_LOG: u8 = 6;
pub const ML_TABLE_LOG: u8 = 6;
pub const OF_TABLE_LOG: u8 = 5;

pub const LL_PREDEFINED_LOG: u8 = 6;
pub const ML_PREDEFINED_LOG: u8 = 6;
pub const OF_PREDEFINED_LOG: u8 = 5;

/// Fixed `DecodingTable<N>`/`EncodingTable<N>` sizes mirroring
/// `rzstd_decompress`'s `LL_DIST.table_size()` etc.
pub const LL_N: usize = 1 << LL_TABLE_LOG;
pub const ML_N: usize = 1 << ML_TABLE_LOG;
pub const OF_N: usize = 1 << OF_TABLE_LOG;

pub const LL_PREDEFINED: &[i16] = &[
    4, 3, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 2, 1,
    1, 1, 1, 1, -1, -1, -1, -1,
];

pub const ML_PREDEFINED: &[i16] = &[
    1, 4, 3, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, -1, -1, -1, -1, -1, -1, -1,
];

pub const OF_PREDEFINED: &[i16] = &[
    1, 1, 1, 1, 1, 1, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, -1, -1, -1,
    -1, -1,
];

/// Largest baseline `<= value`, linear-scanned since both tables are tiny
/// (36/53 entries) and this only runs once per sequence at compress time.
fn code_for(table: &[(u32, u8)], value: u32) -> u8 {
    let mut code = 0usize;
    for (idx, &(baseline, _)) in table.iter().enumerate() {
        if baseline <= value {
            code = idx;
        } else {
            break;
        }
    }
    code as u8
}

/// `(code, extra_value, extra_bits)` for a literal length.
pub fn ll_code(len: u32) -> (u8, u32, u8) {
    let code = code_for(&LL_TABLE, len);
    let (baseline, extra_bits) = LL_TABLE[code as usize];
    (code, len - baseline, extra_bits)
}

/// `(code, extra_value, extra_bits)` for a match length.
pub fn ml_code(len: u32) -> (u8, u32, u8) {
    let code = code_for(&ML_TABLE, len);
    let (baseline, extra_bits) = ML_TABLE[code as usize];
    (code, len - baseline, extra_bits)
}

/// `(code, extra_value, extra_bits)` for a raw `offsetValue` (already
/// resolved against `rep` by `crate::rep::RepOffsets`). The decoder's
/// `decode_of` recovers `offsetValue = (1 << code) + extra`, so `code` is
/// simply `highbit(offsetValue)` and `extra_bits == code`.
pub fn of_code(offset_value: u32) -> (u8, u32, u8) {
    let code = rzstd_foundation::highbit(offset_value.max(1)) as u8;
    let extra_bits = code;
    let extra_value = offset_value - (1u32 << code);
    (code, extra_value, extra_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ll_code_round_trips_baselines() {
        for &(baseline, extra_bits) in LL_TABLE.iter() {
            let (code, extra_value, bits) = ll_code(baseline);
            assert_eq!(extra_value, 0);
            assert_eq!(bits, extra_bits);
            let (recovered_baseline, recovered_bits) = LL_TABLE[code as usize];
            assert_eq!(recovered_baseline, baseline);
            assert_eq!(recovered_bits, extra_bits);
        }
    }

    #[test]
    fn ml_code_handles_minimum_match() {
        let (code, extra, bits) = ml_code(3);
        assert_eq!((code, extra, bits), (0, 0, 0));
    }

    #[test]
    fn of_code_matches_decoder_formula() {
        for offset_value in [1u32, 2, 3, 4, 7, 8, 1023, 1024, 1 << 20] {
            let (code, extra, bits) = of_code(offset_value);
            assert_eq!(bits, code);
            assert_eq!((1u32 << code) + extra, offset_value);
        }
    }

    #[test]
    fn ll_code_handles_large_values_via_extra_bits() {
        let (code, extra, bits) = ll_code(100_000);
        assert_eq!(code, 35);
        assert_eq!(bits, 16);
        assert_eq!(65536 + extra, 100_000);
    }
}
