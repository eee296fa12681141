#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    #[error("Window size {0} exceeds the maximum allowed")]
    #[diagnostic(
        code(rzstd::compress::window_size_out_of_bounds),
        help("The requested compression level asks for a window larger than the format allows.")
    )]
    WindowSizeOutOfBounds(u64),

    #[error("Compressed block would be {0} bytes, larger than the maximum block size")]
    #[diagnostic(
        code(rzstd::compress::block_too_large),
        help("A single source block exceeds the encoder's maximum block size and must be split further upstream.")
    )]
    BlockTooLarge(usize),

    #[error("Dictionary is corrupted")]
    #[diagnostic(
        code(rzstd::compress::dictionary_corrupted),
        help("The structured dictionary's magic number matched but its entropy tables could not be parsed.")
    )]
    DictionaryCorrupted,

    #[error(transparent)]
    #[diagnostic(code(rzstd::compress::io))]
    IO(#[from] rzstd_io::Error),

    #[error(transparent)]
    #[diagnostic(code(rzstd::compress::huff0))]
    Huff0(#[from] rzstd_huff0::Error),

    #[error(transparent)]
    #[diagnostic(code(rzstd::compress::fse))]
    FSE(#[from] rzstd_fse::Error),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::IO(rzstd_io::Error::IO(value))
    }
}
