//! Buffered decompression over a sequential byte source.
//!
//! The raw source is read in chunks of at least [`DEFAULT_CHUNK_SIZE`]
//! bytes and each chunk is passed through the configured [`Decompress`]
//! function. The decompressor may produce any amount of output per chunk:
//! nothing at all while it waits for the rest of a frame, or far more than
//! the caller asked for. The surplus is parked in an internal buffer and
//! handed out by the following reads.

use std::io::{self, Read};

use log::trace;

use super::decompress::Decompress;

/// Lower bound for a single read from the raw source.
pub const DEFAULT_CHUNK_SIZE: usize = 128 * 1024;

pub struct CompressedStream<R> {
    decompressor: Option<Box<dyn Decompress>>,
    raw: R,
    buffer: Vec<u8>,
    /// Read cursor into `buffer`, never past its end
    buffer_pos: usize,
    chunk_size: usize,
    eof: bool,
}

impl<R: Read> CompressedStream<R> {
    /// Wrap `raw`, decompressing it with `decompressor` if one is given.
    pub fn new(raw: R, decompressor: Option<Box<dyn Decompress>>) -> Self {
        Self {
            decompressor,
            raw,
            buffer: Vec::new(),
            buffer_pos: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            eof: false,
        }
    }

    /// Set the minimum raw read size. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Number of decompressed bytes waiting in the internal buffer.
    fn buffered(&self) -> usize {
        self.buffer.len() - self.buffer_pos
    }

    #[cfg(test)]
    fn is_eof(&self) -> bool {
        self.eof
    }

    /// Take up to `length` bytes from the front of the internal buffer.
    ///
    /// The buffer is released as soon as it has been fully handed out.
    fn read_from_buffer(&mut self, length: usize) -> Vec<u8> {
        let available = self.buffered();
        if available > length {
            let data = self.buffer[self.buffer_pos..self.buffer_pos + length].to_vec();
            self.buffer_pos += length;
            data
        } else {
            let mut data = std::mem::take(&mut self.buffer);
            data.drain(..self.buffer_pos);
            self.buffer_pos = 0;
            data
        }
    }

    /// Read up to `size` decompressed bytes.
    ///
    /// The result is shorter than `size` only at the end of the stream, and
    /// empty only once the raw source is exhausted and nothing is buffered.
    /// After that every call returns an empty result without touching the
    /// raw source again.
    pub fn read_chunk(&mut self, size: usize) -> io::Result<Vec<u8>> {
        debug_assert!(self.buffer_pos <= self.buffer.len());

        let mut data = self.read_from_buffer(size);
        if self.eof {
            return Ok(data);
        }

        let mut remaining = size - data.len();
        let mut chunk = Vec::new();
        while remaining > 0 {
            let want = remaining.max(self.chunk_size);
            chunk.clear();
            let n = (&mut self.raw).take(want as u64).read_to_end(&mut chunk)?;
            if n == 0 {
                trace!("raw source exhausted");
                // On error the stream stays open, so later reads fail as well.
                let tail = match self.decompressor.as_mut() {
                    Some(decompressor) => decompressor.finish()?,
                    None => Vec::new(),
                };
                self.eof = true;
                if tail.len() > remaining {
                    self.buffer = tail;
                    self.buffer_pos = 0;
                    data.extend(self.read_from_buffer(remaining));
                } else {
                    data.extend(tail);
                }
                break;
            }

            let output = match self.decompressor.as_mut() {
                Some(decompressor) => {
                    let output = decompressor.decompress(&chunk)?;
                    trace!("decompressed {} raw bytes into {}", n, output.len());
                    if output.is_empty() {
                        continue;
                    }
                    output
                }
                None => std::mem::take(&mut chunk),
            };

            debug_assert_eq!(self.buffered(), 0);
            if output.len() >= remaining {
                self.buffer = output;
                self.buffer_pos = 0;
                data.extend(self.read_from_buffer(remaining));
                remaining = 0;
            } else {
                remaining -= output.len();
                data.extend(output);
            }
        }

        Ok(data)
    }
}

impl<R: Read> Read for CompressedStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.read_chunk(buf.len())?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}
