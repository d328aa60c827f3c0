//! Forward-only `seek`/`tell` for streams that can only be read in order.

use std::io::{self, Read, Seek, SeekFrom};

use log::debug;

use super::TransStream;
use crate::error::{Result, SeekError};
use crate::io::LocalFile;

/// Largest read issued while skipping forward.
const SKIP_BUFFER_SIZE: usize = 64 * 1024;

/// Resolve `pos` against the current position, rejecting backward targets.
fn forward_target(current: u64, pos: SeekFrom) -> std::result::Result<u64, SeekError> {
    let target = match pos {
        SeekFrom::Start(offset) => offset as i128,
        SeekFrom::Current(delta) => current as i128 + delta as i128,
        SeekFrom::End(_) => return Err(SeekError::UnsupportedOrigin),
    };
    if target < current as i128 {
        return Err(SeekError::Backward {
            from: current,
            to: target,
        });
    }
    Ok(target as u64)
}

/// Adds a position counter and discard-read seeking to a sequential stream.
pub struct ForwardSeek<R> {
    inner: R,
    pos: u64,
}

impl<R: Read> ForwardSeek<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }
}

impl<R: Read> Read for ForwardSeek<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read + Send> TransStream for ForwardSeek<R> {
    fn tell(&self) -> u64 {
        self.pos
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = forward_target(self.pos, pos)?;
        let gap = target - self.pos;
        debug!("seeking forward from {} to {} by reading", self.pos, target);

        let mut scratch = vec![0u8; SKIP_BUFFER_SIZE.min(gap as usize)];
        while self.pos < target {
            let want = scratch.len().min((target - self.pos) as usize);
            let n = match self.inner.read(&mut scratch[..want]) {
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            if n == 0 {
                break;
            }
            self.pos += n as u64;
        }
        if self.pos < target {
            return Err(SeekError::PastEnd {
                reached: self.pos,
                target,
            }
            .into());
        }
        Ok(self.pos)
    }
}

/// Forward-only seeking over a local file, using the OS to skip.
///
/// The target is checked against the file size so that seeking past the
/// end fails the same way as with [`ForwardSeek`].
pub struct NativeSeek {
    file: LocalFile,
    pos: u64,
}

impl NativeSeek {
    pub fn new(file: LocalFile) -> Self {
        Self { file, pos: 0 }
    }
}

impl Read for NativeSeek {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.file.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl TransStream for NativeSeek {
    fn tell(&self) -> u64 {
        self.pos
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = forward_target(self.pos, pos)?;
        if target > self.file.size() {
            self.pos = self.file.seek(SeekFrom::End(0))?;
            return Err(SeekError::PastEnd {
                reached: self.pos,
                target,
            }
            .into());
        }
        debug!("seeking from {} to {}", self.pos, target);
        self.pos = self.file.seek(SeekFrom::Start(target))?;
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::{Cursor, Write};

    fn seek_error(result: Result<u64>) -> SeekError {
        match result {
            Err(Error::Seek(err)) => err,
            Err(other) => panic!("expected a seek error, got {other}"),
            Ok(pos) => panic!("expected a seek error, got position {pos}"),
        }
    }

    #[test]
    fn tell_counts_delivered_bytes() {
        let mut stream = ForwardSeek::new(Cursor::new(b"hello world".to_vec()));
        let mut buf = [0u8; 4];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(stream.tell(), 4);
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(stream.tell(), 8);
    }

    #[test]
    fn seek_start_and_current() {
        let mut stream = ForwardSeek::new(Cursor::new(b"hello world".to_vec()));
        assert_eq!(stream.seek(SeekFrom::Start(2)).unwrap(), 2);
        assert_eq!(stream.seek(SeekFrom::Current(4)).unwrap(), 6);
        let mut rest = String::new();
        stream.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "world");
        assert_eq!(stream.tell(), 11);
    }

    #[test]
    fn seek_to_current_position_is_allowed() {
        let mut stream = ForwardSeek::new(Cursor::new(b"abc".to_vec()));
        assert_eq!(stream.seek(SeekFrom::Current(0)).unwrap(), 0);
        assert_eq!(stream.seek(SeekFrom::Start(3)).unwrap(), 3);
        assert_eq!(stream.seek(SeekFrom::Start(3)).unwrap(), 3);
    }

    #[test]
    fn backward_seek_is_rejected() {
        let mut stream = ForwardSeek::new(Cursor::new(b"hello world".to_vec()));
        stream.seek(SeekFrom::Start(6)).unwrap();
        assert_eq!(
            seek_error(stream.seek(SeekFrom::Start(2))),
            SeekError::Backward { from: 6, to: 2 }
        );
        assert_eq!(
            seek_error(stream.seek(SeekFrom::Current(-1))),
            SeekError::Backward { from: 6, to: 5 }
        );
        assert_eq!(stream.tell(), 6);
    }

    #[test]
    fn end_origin_is_rejected() {
        let mut stream = ForwardSeek::new(Cursor::new(b"abc".to_vec()));
        assert_eq!(
            seek_error(stream.seek(SeekFrom::End(0))),
            SeekError::UnsupportedOrigin
        );
    }

    #[test]
    fn seek_past_end_fails() {
        let mut stream = ForwardSeek::new(Cursor::new(b"hello".to_vec()));
        assert_eq!(
            seek_error(stream.seek(SeekFrom::Start(9))),
            SeekError::PastEnd {
                reached: 5,
                target: 9
            }
        );
        assert_eq!(stream.tell(), 5);
    }

    #[test]
    fn native_seek_is_forward_only_and_bounded() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello world").unwrap();
        let file = LocalFile::open(tmp.path()).unwrap();

        let mut stream = NativeSeek::new(file);
        assert_eq!(stream.seek(SeekFrom::Start(6)).unwrap(), 6);
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"world");
        assert_eq!(stream.tell(), 11);

        assert!(matches!(
            seek_error(stream.seek(SeekFrom::Start(0))),
            SeekError::Backward { .. }
        ));
        assert_eq!(
            seek_error(stream.seek(SeekFrom::Current(1))),
            SeekError::PastEnd {
                reached: 11,
                target: 12
            }
        );
    }

    /// Yields `ok` bytes, then fails on every read.
    struct FailingAfter {
        ok: usize,
    }

    impl Read for FailingAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.ok == 0 {
                return Err(io::Error::other("connection reset"));
            }
            let n = buf.len().min(self.ok).min(3);
            buf[..n].fill(b'x');
            self.ok -= n;
            Ok(n)
        }
    }

    #[test]
    fn failed_skip_keeps_position_in_step() {
        let mut stream = ForwardSeek::new(FailingAfter { ok: 7 });
        match stream.seek(SeekFrom::Start(20)) {
            Err(Error::Io(err)) => assert_eq!(err.to_string(), "connection reset"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(pos) => panic!("seek must fail, got position {pos}"),
        }
        assert_eq!(stream.tell(), 7);
    }
}
