//! Single-member tarballs.
//!
//! The tarball must hold exactly one member. Counting the members means
//! reading through the whole archive, which a forward-only stream cannot
//! undo, so the count is taken on one chain and the member is served from
//! a second, freshly opened chain.

use std::io::Read;

use log::debug;
use tar::Archive;

use super::Format;
use crate::error::{FormatError, Result};
use crate::io::Source;
use crate::reader::OpenOptions;
use crate::stream::{ForwardSeek, TransStream};

/// How many members a tarball has, stopping once there are more than one.
fn count_members<R: Read>(reader: R, name: &str) -> Result<usize> {
    let to_format_error = |source| FormatError::Archive {
        name: name.to_string(),
        source,
    };

    let mut archive = Archive::new(reader);
    let mut count = 0;
    for entry in archive.entries().map_err(to_format_error)? {
        entry.map_err(to_format_error)?;
        count += 1;
        if count > 1 {
            break;
        }
    }
    Ok(count)
}

/// Open the only member of the tarball behind `source`.
///
/// Returns the member's stream together with its declared size.
pub(super) fn open_member(
    source: Source,
    format: Format,
    options: &OpenOptions,
) -> Result<(Box<dyn TransStream>, u64)> {
    let name = source.name.clone();
    let to_format_error = |source| FormatError::Archive {
        name: name.clone(),
        source,
    };

    match count_members(format.decompressed(source.channel, options), &name)? {
        0 => return Err(FormatError::EmptyArchive { name }.into()),
        1 => {}
        _ => return Err(FormatError::TooManyMembers { name }.into()),
    }

    let source = Source::open(&name, options)?;
    let mut archive = Archive::new(format.decompressed(source.channel, options));
    let (path, size) = {
        let mut entries = archive.entries().map_err(to_format_error)?;
        let entry = match entries.next() {
            Some(entry) => entry.map_err(to_format_error)?,
            None => return Err(FormatError::EmptyArchive { name }.into()),
        };
        (entry.path_bytes().into_owned(), entry.size())
    };
    debug!(
        "tarball '{}' member '{}' is {} bytes",
        name,
        String::from_utf8_lossy(&path),
        size
    );

    // The archive has consumed the member's headers and nothing more.
    let member = archive.into_inner().take(size);
    Ok((Box::new(ForwardSeek::new(member)), size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn tarball(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in members {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn counts_up_to_two() {
        assert_eq!(count_members(&tarball(&[])[..], "t.tar").unwrap(), 0);
        assert_eq!(count_members(&tarball(&[("a", b"1")])[..], "t.tar").unwrap(), 1);
        let three = tarball(&[("a", b"1"), ("b", b"2"), ("c", b"3")]);
        assert_eq!(count_members(&three[..], "t.tar").unwrap(), 2);
    }

    #[test]
    fn member_data_follows_headers() {
        // Long enough to need a GNU long-name header in front of the member.
        let path = format!("{}disk.img", "nested/".repeat(30));
        let data = tarball(&[(path.as_str(), b"payload")]);
        let mut archive = Archive::new(&data[..]);
        let size = {
            let mut entries = archive.entries().unwrap();
            entries.next().unwrap().unwrap().size()
        };
        let mut member = Vec::new();
        archive.into_inner().take(size).read_to_end(&mut member).unwrap();
        assert_eq!(member, b"payload");
    }

    #[test]
    fn garbage_is_an_archive_error() {
        let garbage = vec![0x5a; 1024];
        match count_members(&garbage[..], "junk.tar") {
            Err(Error::Format(FormatError::Archive { name, .. })) => assert_eq!(name, "junk.tar"),
            other => panic!("unexpected result: {:?}", other.map_err(|e| e.to_string())),
        }
    }
}
