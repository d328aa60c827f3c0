//! Chunk-at-a-time decompression functions.
//!
//! A [`Decompress`] implementation turns one chunk of compressed input into
//! whatever output the codec can produce for it. Partial frames are kept
//! inside the codec state, so a call may legitimately return nothing.

use std::io::{self, Write};
use std::mem;

use bzip2::Status;
use flate2::write::MultiGzDecoder;
use log::trace;

const OUTPUT_RESERVE: usize = 64 * 1024;

/// Stateful transform from compressed chunks to decompressed bytes.
pub trait Decompress: Send {
    fn decompress(&mut self, input: &[u8]) -> io::Result<Vec<u8>>;

    /// Called once the compressed input has run out.
    ///
    /// Returns whatever output the codec still holds, or an error if the
    /// input stopped in the middle of a stream.
    fn finish(&mut self) -> io::Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

impl<F> Decompress for F
where
    F: FnMut(&[u8]) -> io::Result<Vec<u8>> + Send,
{
    fn decompress(&mut self, input: &[u8]) -> io::Result<Vec<u8>> {
        self(input)
    }
}

/// gzip decompression, one chunk at a time
///
/// Concatenated gzip members are decoded back to back.
pub struct Gzip {
    decoder: MultiGzDecoder<Vec<u8>>,
    seen_input: bool,
}

impl Gzip {
    pub fn new() -> Self {
        Self {
            decoder: MultiGzDecoder::new(Vec::new()),
            seen_input: false,
        }
    }
}

impl Default for Gzip {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompress for Gzip {
    fn decompress(&mut self, input: &[u8]) -> io::Result<Vec<u8>> {
        self.seen_input |= !input.is_empty();
        self.decoder.write_all(input)?;
        self.decoder.flush()?;
        Ok(mem::take(self.decoder.get_mut()))
    }

    fn finish(&mut self) -> io::Result<Vec<u8>> {
        // A zero-length file holds no member at all.
        if !self.seen_input {
            return Ok(Vec::new());
        }
        // Fails unless the last member ended with its trailer.
        self.decoder.try_finish()?;
        Ok(mem::take(self.decoder.get_mut()))
    }
}

/// Magic at the start of every bzip2 stream.
const BZIP2_MAGIC: &[u8] = b"BZh";

enum Bzip2State {
    /// Inside a stream, or before the first one
    Stream,
    /// A stream has ended; the next bytes decide whether another follows
    Between,
    /// Bytes after the last stream that are not bzip2
    Trailer,
}

/// bzip2 decompression, one chunk at a time
///
/// Streams written back to back (as pbzip2 does) are decoded one after the
/// other. Anything after the last stream that does not start like a bzip2
/// stream is ignored.
pub struct Bzip2 {
    stream: bzip2::Decompress,
    state: Bzip2State,
    /// Start of a following stream, collected until the magic is complete
    magic: Vec<u8>,
    seen_input: bool,
}

impl Bzip2 {
    pub fn new() -> Self {
        Self {
            stream: bzip2::Decompress::new(false),
            state: Bzip2State::Stream,
            magic: Vec::with_capacity(BZIP2_MAGIC.len()),
            seen_input: false,
        }
    }

    /// Feed `input` to the current stream, returning how much of it was used.
    ///
    /// Stops early only at the end of the stream.
    fn decode(&mut self, input: &[u8], output: &mut Vec<u8>) -> io::Result<usize> {
        let mut consumed = 0;
        loop {
            if output.len() == output.capacity() {
                output.reserve(output.capacity().max(OUTPUT_RESERVE));
            }

            let before = self.stream.total_in();
            let status = self
                .stream
                .decompress_vec(&input[consumed..], output)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            consumed += (self.stream.total_in() - before) as usize;

            match status {
                Status::StreamEnd => {
                    self.state = Bzip2State::Between;
                    return Ok(consumed);
                }
                // Everything decodable so far has been produced.
                _ if consumed == input.len() && output.len() < output.capacity() => {
                    return Ok(consumed);
                }
                _ => {}
            }
        }
    }
}

impl Default for Bzip2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompress for Bzip2 {
    fn decompress(&mut self, mut input: &[u8]) -> io::Result<Vec<u8>> {
        self.seen_input |= !input.is_empty();
        let mut output = Vec::with_capacity(OUTPUT_RESERVE);
        while !input.is_empty() {
            match self.state {
                Bzip2State::Stream => {
                    let used = self.decode(input, &mut output)?;
                    input = &input[used..];
                }
                Bzip2State::Between => {
                    let wanted = (BZIP2_MAGIC.len() - self.magic.len()).min(input.len());
                    self.magic.extend_from_slice(&input[..wanted]);
                    input = &input[wanted..];
                    if !BZIP2_MAGIC.starts_with(&self.magic) {
                        self.state = Bzip2State::Trailer;
                    } else if self.magic.len() == BZIP2_MAGIC.len() {
                        trace!("next bzip2 stream");
                        self.stream = bzip2::Decompress::new(false);
                        self.state = Bzip2State::Stream;
                        let magic = mem::take(&mut self.magic);
                        self.decode(&magic, &mut output)?;
                    }
                }
                Bzip2State::Trailer => {
                    trace!("ignoring {} bytes after the end of the bzip2 data", input.len());
                    break;
                }
            }
        }
        Ok(output)
    }

    fn finish(&mut self) -> io::Result<Vec<u8>> {
        match self.state {
            Bzip2State::Stream if self.seen_input => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "bzip2 data ends before the end of its stream",
            )),
            _ => Ok(Vec::new()),
        }
    }
}
