use xxhash_rust::xxh64::Xxh64;

use crate::{MAGIC_NUM, context::Context, dictionary::Dictionary, errors::Error, frame};

const SKIPPABLE_MAGIC_LOW: u32 = 0x184D_2A50;
const SKIPPABLE_MAGIC_HIGH: u32 = 0x184D_2A5F;

/// Blocking, whole-stream decoder: `decode` runs until `src` is fully
/// consumed or a frame ends early. For compressed bytes that arrive
/// incrementally instead of all at once, see [`crate::StreamDecoder`].
pub struct Decoder<'b, R: rzstd_io::Reader> {
    ctx: Context<'b, R>,
    dictionary: Option<Dictionary>,
}

const CHUNK: usize = 64 * 1024;

impl<'b, R: rzstd_io::Reader> Decoder<'b, R> {
    pub fn new(src: R, dst: &'b mut [u8], window_size: usize) -> Self {
        Decoder {
            ctx: Context::new(src, dst, window_size),
            dictionary: None,
        }
    }

    pub fn with_dictionary(mut self, dictionary: &[u8]) -> Self {
        self.dictionary = Some(Dictionary::load(dictionary));
        self
    }

    pub fn decode(&mut self, mut writer: impl std::io::Write) -> Result<(), Error> {
        while self.decode_frame(&mut writer)? {}
        Ok(())
    }

    fn decode_frame(&mut self, writer: &mut impl std::io::Write) -> Result<bool, Error> {
        let magic_num = match self.ctx.src.read_u32() {
            Ok(it) => it,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(false),
            Err(e) => return Err(Error::from(e)),
        };

        if (SKIPPABLE_MAGIC_LOW..=SKIPPABLE_MAGIC_HIGH).contains(&magic_num) {
            tracing::debug!("skipping skippable frame");
            let frame_size = self.ctx.src.read_u32()?;
            let mut discard = [0u8; 4096];
            let mut remaining = frame_size as usize;
            while remaining > 0 {
                let chunk = remaining.min(discard.len());
                self.ctx.src.read_exact(&mut discard[..chunk])?;
                remaining -= chunk;
            }
            return Ok(true);
        }

        if magic_num != MAGIC_NUM {
            return Err(Error::InvalidMagicNum(magic_num));
        }

        tracing::debug!("decoding frame");
        let frame = frame::Header::read(&mut self.ctx.src)?;
        let window_size = frame.window_size()? as usize;

        if let (Some(expected), Some(dict)) = (frame.dictionary_id(), self.dictionary.as_ref())
            && expected != dict.id
        {
            return Err(Error::WrongDictionary { expected, loaded: dict.id });
        }

        self.ctx.reset(window_size, self.dictionary.as_ref());

        // Dictionary content (if any) was just pushed into the window by
        // `reset`; start flushing from there so it isn't written to output.
        let mut flushed_idx = self.ctx.window_buf.index();
        let mut hasher = frame.has_checksum().then(|| Xxh64::new(0));

        loop {
            tracing::debug!("decoding block");
            let last = self.ctx.block()?;
            let current_idx = self.ctx.window_buf.index();

            if current_idx < flushed_idx {
                flushed_idx = 0;
            }

            let available = current_idx.saturating_sub(flushed_idx);
            if available >= CHUNK || last {
                let data = &self.ctx.window_buf.as_slice()[flushed_idx..current_idx];
                if let Some(hasher) = hasher.as_mut() {
                    hasher.update(data);
                }
                writer.write_all(data).map_err(Error::from)?;
                flushed_idx = current_idx;
            }

            if last {
                break;
            }
        }

        if let Some(hasher) = hasher {
            let checksum = self.ctx.src.read_u32()?;
            let computed = hasher.digest() as u32;
            if checksum != computed {
                return Err(Error::ChecksumMismatch { expected: checksum, computed });
            }
        }

        Ok(true)
    }
}
