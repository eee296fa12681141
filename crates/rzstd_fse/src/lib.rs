mod decode;
mod encode;
mod errors;

pub use decode::{Decoder, DecodingTable, Entry, NormalizedDistribution};
pub use encode::{EncodingTable, build_encoding_table, normalize_counts, write_normalized_counts};
pub use errors::Error;
