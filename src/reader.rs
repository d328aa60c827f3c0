//! The reader handed out to callers.

use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};
use crate::format::{self, Format};
use crate::io::Source;
use crate::stream::{DEFAULT_CHUNK_SIZE, TransStream};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for opening a [`TransRead`].
///
/// ```no_run
/// use std::time::Duration;
///
/// let reader = transread::OpenOptions::new()
///     .use_proxy(true)
///     .timeout(Some(Duration::from_secs(120)))
///     .open("https://example.com/disk.img.bz2")?;
/// # Ok::<(), transread::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct OpenOptions {
    pub(crate) chunk_size: usize,
    pub(crate) use_proxy: bool,
    pub(crate) timeout: Option<Duration>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            use_proxy: false,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Minimum number of raw bytes read from the source per decompression
    /// step. Defaults to 128 KiB.
    pub fn chunk_size(&mut self, chunk_size: usize) -> &mut Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Honour the proxy environment variables for URLs. Off by default.
    pub fn use_proxy(&mut self, use_proxy: bool) -> &mut Self {
        self.use_proxy = use_proxy;
        self
    }

    /// Timeout for HTTP transfers, `None` to wait forever. Defaults to 30s.
    pub fn timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn open(&self, name: &str) -> Result<TransRead> {
        let format = Format::detect(name);
        let source = Source::open(name, self)?;
        let is_remote = source.is_remote;
        let transferred = source.transfer_counter();

        let chain = format::open(source, format, self)?;
        debug!(
            "opened '{}': format {}, {}, size {:?}",
            name,
            format,
            if is_remote { "remote" } else { "local" },
            chain.size
        );

        Ok(TransRead {
            name: name.to_string(),
            format,
            is_remote,
            size: chain.size,
            stream: Some(chain.stream),
            transferred,
            closed_at: 0,
        })
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A local or remote file, read forward only and decompressed on the fly.
///
/// Which layers sit underneath is decided once by [`TransRead::open`] from
/// the file name; afterwards the reader behaves the same for every format.
/// Dropping the reader closes it.
pub struct TransRead {
    name: String,
    format: Format,
    is_remote: bool,
    size: Option<u64>,
    stream: Option<Box<dyn TransStream>>,
    transferred: Option<Arc<AtomicU64>>,
    closed_at: u64,
}

impl TransRead {
    /// Open a path or URL with the default [`OpenOptions`].
    pub fn open(name: &str) -> Result<Self> {
        OpenOptions::new().open(name)
    }

    pub fn options() -> OpenOptions {
        OpenOptions::new()
    }

    /// The path or URL this reader was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the content as it is returned by reads, if known.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn is_compressed(&self) -> bool {
        self.format.is_compressed()
    }

    pub fn is_remote(&self) -> bool {
        self.is_remote
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Bytes received from the network so far; `None` for local files.
    pub fn transferred_bytes(&self) -> Option<u64> {
        self.transferred
            .as_ref()
            .map(|counter| counter.load(Ordering::Relaxed))
    }

    fn stream(&mut self) -> Result<&mut Box<dyn TransStream>> {
        self.stream
            .as_mut()
            .ok_or_else(|| Error::Io(io::Error::other(format!("'{}' is closed", self.name))))
    }

    /// Read up to `size` bytes.
    ///
    /// Fewer bytes are returned only at the end of the data, and an empty
    /// result means the end has been reached. Reading on past the end keeps
    /// returning empty results.
    pub fn read_chunk(&mut self, size: usize) -> Result<Vec<u8>> {
        let stream = self.stream()?;
        let mut data = Vec::with_capacity(size.min(DEFAULT_CHUNK_SIZE));
        stream.take(size as u64).read_to_end(&mut data)?;
        Ok(data)
    }

    /// Number of bytes delivered so far.
    pub fn tell(&self) -> u64 {
        self.stream
            .as_ref()
            .map_or(self.closed_at, |stream| stream.tell())
    }

    /// Skip forward to `pos`.
    ///
    /// `SeekFrom::End` and targets behind [`tell`](Self::tell) are rejected,
    /// as is a target beyond the end of the data.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.stream()?.seek(pos)
    }

    /// Release the stream chain. Calling it again does nothing.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.closed_at = stream.tell();
            drop(stream);
            debug!("closed '{}' at offset {}", self.name, self.closed_at);
        }
    }
}

impl Drop for TransRead {
    fn drop(&mut self) {
        self.close();
    }
}

impl Read for TransRead {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.stream()?.read(buf)?)
    }
}

impl Seek for TransRead {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(TransRead::seek(self, pos)?)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.tell())
    }
}

/// Open a path or URL with the default [`OpenOptions`].
pub fn open(name: &str) -> Result<TransRead> {
    TransRead::open(name)
}
