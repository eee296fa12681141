use std::{
    fs::File,
    io::{BufReader, BufWriter, Write, stdout},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use rzstd_decompress::MAX_BLOCK_SIZE;
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compresses a file
    Compress(CompressArgs),
    /// Decompresses a file
    Decompress(DecompressArgs),
}

#[derive(Args)]
struct CompressArgs {
    /// Input file to compress
    input: PathBuf,

    /// Output file
    output: Option<PathBuf>,

    /// Compression level, 0-19
    #[arg(short = 'l', long, default_value_t = 3)]
    level: i32,

    /// Append a 32-bit xxhash64 content checksum to the frame
    #[arg(short = 'c', long)]
    checksum: bool,

    /// Dictionary file used as a window prefix and repeat-offset seed
    #[arg(short = 'D', long)]
    dictionary: Option<PathBuf>,
}

#[derive(Args)]
struct DecompressArgs {
    /// Input file to decompress
    input: PathBuf,

    /// Output file
    output: Option<PathBuf>,

    /// Dictionary file the frame was compressed against
    #[arg(short = 'D', long)]
    dictionary: Option<PathBuf>,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let file_appender = tracing_appender::rolling::never("target", "dump.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .without_time()
        .with_level(false);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(stdout)
        .with_ansi(true)
        .without_time()
        .with_level(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(file_layer)
        .with(stdout_layer)
        .init();

    match cli.command {
        Commands::Compress(args) => {
            let output_file = {
                let output = args
                    .output
                    .unwrap_or_else(|| default_output(&args.input, "zst"));
                File::create(output).into_diagnostic()?
            };

            let input = std::fs::read(&args.input).into_diagnostic()?;
            let dictionary = args
                .dictionary
                .map(std::fs::read)
                .transpose()
                .into_diagnostic()?;

            let mut encoder = rzstd_compress::Encoder::new(args.level).with_checksum(args.checksum);
            if let Some(dictionary) = dictionary.as_deref() {
                encoder = encoder.with_dictionary(dictionary);
            }

            let frame = encoder.compress(&input).into_diagnostic()?;

            let mut writer = BufWriter::new(output_file);
            writer.write_all(&frame).into_diagnostic()?;
        }
        Commands::Decompress(args) => {
            let output_file = {
                let output = args
                    .output
                    .unwrap_or(args.input.file_stem().expect("Unnamed input file").into());
                File::create(output).into_diagnostic()?
            };

            let input_file = File::open(args.input).into_diagnostic()?;
            let reader = BufReader::new(input_file);

            let mut writer = BufWriter::new(output_file);

            let window_size = 100 * 1024 * 1024;
            let mut window_buffer = vec![0u8; window_size + MAX_BLOCK_SIZE as usize];

            let mut decoder =
                rzstd_decompress::Decoder::new(reader, &mut window_buffer, window_size);

            let dictionary = args
                .dictionary
                .map(std::fs::read)
                .transpose()
                .into_diagnostic()?;
            if let Some(dictionary) = dictionary.as_deref() {
                decoder = decoder.with_dictionary(dictionary);
            }

            decoder.decode(&mut writer).into_diagnostic()?;
        }
    }
    Ok(())
}

fn default_output(input: &std::path::Path, extension: &str) -> PathBuf {
    let mut out = input.as_os_str().to_owned();
    out.push(".");
    out.push(extension);
    out.into()
}
