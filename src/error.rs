//! Error types for opening, reading and seeking.
//!
//! Every failure is reported as a human-readable [`Error`]. The variants
//! separate the stage that failed: opening the source, unwrapping the
//! archive, seeking, or reading bytes from the transport/decompressor.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The main error type of this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The file or URL could not be opened.
    #[error(transparent)]
    Open(#[from] OpenError),

    /// The archive does not have the expected layout.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A seek request could not be honoured.
    #[error(transparent)]
    Seek(#[from] SeekError),

    /// I/O error surfaced unmodified from the transport or decompressor.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("cannot open file '{path}': {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot open URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("tarball '{name}' is empty (no files)")]
    EmptyArchive { name: String },

    #[error("tarball '{name}' contains more than one file")]
    TooManyMembers { name: String },

    #[error("cannot read tarball '{name}': {source}")]
    Archive {
        name: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeekError {
    /// Only `SeekFrom::Start` and `SeekFrom::Current` are supported.
    #[error("seek origin must be the start or the current position")]
    UnsupportedOrigin,

    #[error("only seeking forward is supported, seeking from {from} to {to} is not allowed")]
    Backward { from: u64, to: i128 },

    #[error("seeked past the end of the data: reached {reached} instead of {target}")]
    PastEnd { reached: u64, target: u64 },
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(err) => err,
            Error::Seek(err @ SeekError::PastEnd { .. }) => {
                io::Error::new(io::ErrorKind::UnexpectedEof, err)
            }
            Error::Seek(err) => io::Error::new(io::ErrorKind::InvalidInput, err),
            other => io::Error::other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_errors_map_to_io_kinds() {
        let err: io::Error = Error::from(SeekError::UnsupportedOrigin).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err: io::Error = Error::from(SeekError::PastEnd {
            reached: 3,
            target: 10,
        })
        .into();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn io_errors_pass_through() {
        let err: io::Error = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone")).into();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(err.to_string(), "gone");
    }

    #[test]
    fn messages_are_readable() {
        let err = Error::from(FormatError::TooManyMembers {
            name: "disk.tar.gz".into(),
        });
        assert_eq!(err.to_string(), "tarball 'disk.tar.gz' contains more than one file");

        let err = Error::from(SeekError::Backward { from: 6, to: 2 });
        assert!(err.to_string().contains("from 6 to 2"));
    }
}
