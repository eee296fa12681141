mod decode;
mod encode;
mod errors;

pub use decode::{Decoder, DecodingTable, Entry};
pub use encode::{EncodingTable, build_encoding_table, write_weights_direct};
pub use errors::Error;
