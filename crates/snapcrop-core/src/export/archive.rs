//! ZIP bundling of exported files.
//!
//! Output is reproducible: every entry carries the DOS epoch as its
//! modification time and the same permissions, so identical input gives
//! identical bytes.

use std::collections::HashSet;
use std::io::{self, Cursor, Write};

use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub const ARCHIVE_MIME: &str = "application/zip";

const ENTRY_PERMISSIONS: u32 = 0o644;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("No files to pack")]
    Empty,

    #[error("Archive writer failed: {0}")]
    Zip(#[from] ZipError),

    #[error("Archive I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// One file to put in the archive.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEntry<'a> {
    pub name: &'a str,
    pub bytes: &'a [u8],
}

/// Pack `entries` into a ZIP archive, in order.
///
/// Repeated names get a numeric suffix: `photo.jpg`, `photo-2.jpg`, ...
pub fn pack(entries: &[ArchiveEntry<'_>]) -> Result<Vec<u8>, PackError> {
    if entries.is_empty() {
        return Err(PackError::Empty);
    }

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(ENTRY_PERMISSIONS);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let names = unique_names(entries.iter().map(|e| e.name));

    for (entry, name) in entries.iter().zip(names) {
        writer.start_file(name, options)?;
        writer.write_all(entry.bytes)?;
    }

    let cursor = writer.finish()?;
    let bytes = cursor.into_inner();
    tracing::debug!(entries = entries.len(), bytes = bytes.len(), "packed archive");
    Ok(bytes)
}

fn unique_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut used = HashSet::new();
    names
        .map(|name| {
            let mut candidate = name.to_string();
            let mut n = 2;
            while used.contains(&candidate) {
                candidate = suffixed(name, n);
                n += 1;
            }
            used.insert(candidate.clone());
            candidate
        })
        .collect()
}

fn suffixed(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => format!("{}-{}{}", &name[..idx], n, &name[idx..]),
        _ => format!("{}-{}", name, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_back(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut contents = Vec::new();
                file.read_to_end(&mut contents).unwrap();
                (file.name().to_string(), contents)
            })
            .collect()
    }

    #[test]
    fn test_pack_round_trips_entries_in_order() {
        let entries = [
            ArchiveEntry {
                name: "a.jpg",
                bytes: b"first",
            },
            ArchiveEntry {
                name: "b.png",
                bytes: b"second file",
            },
        ];
        let zip = pack(&entries).unwrap();

        let files = read_back(&zip);
        assert_eq!(
            files,
            vec![
                ("a.jpg".to_string(), b"first".to_vec()),
                ("b.png".to_string(), b"second file".to_vec()),
            ]
        );
    }

    #[test]
    fn test_pack_is_deterministic() {
        let entries = [ArchiveEntry {
            name: "x.webp",
            bytes: &[7u8; 300],
        }];
        assert_eq!(pack(&entries).unwrap(), pack(&entries).unwrap());
    }

    #[test]
    fn test_pack_empty_is_error() {
        assert!(matches!(pack(&[]), Err(PackError::Empty)));
    }

    #[test]
    fn test_pack_disambiguates_duplicate_names() {
        let entries = [
            ArchiveEntry {
                name: "photo.jpg",
                bytes: b"1",
            },
            ArchiveEntry {
                name: "photo.jpg",
                bytes: b"2",
            },
            ArchiveEntry {
                name: "photo-2.jpg",
                bytes: b"3",
            },
        ];
        let names: Vec<_> = read_back(&pack(&entries).unwrap())
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["photo.jpg", "photo-2.jpg", "photo-2-2.jpg"]);
    }

    #[test]
    fn test_suffixed() {
        assert_eq!(suffixed("photo.jpg", 2), "photo-2.jpg");
        assert_eq!(suffixed("a.b.png", 3), "a.b-3.png");
        assert_eq!(suffixed("README", 2), "README-2");
        assert_eq!(suffixed(".hidden", 2), ".hidden-2");
    }
}
