//! In-memory zip assembly, one directory per bucket.
//!
//! Entries are held uncompressed until [`ArchiveBuilder::finalize`], which
//! writes every bucket as a directory in first-seen order followed by its
//! files in insertion order, deflated at a fixed level.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};

use thiserror::Error;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Deflate level used when none is configured.
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

/// Errors that can occur while producing the archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Nothing was added before finalizing.
    #[error("Archive has no entries")]
    NoEntries,

    /// The zip writer rejected an entry or failed to finish.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing entry data failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
struct Bucket {
    name: String,
    files: Vec<(String, Vec<u8>)>,
    /// Lowercased names already taken, so extraction on case-insensitive
    /// filesystems cannot collide either.
    taken: HashSet<String>,
}

/// Accumulates `(bucket, file, bytes)` entries for one archive.
///
/// `finalize` consumes the builder, so an archive is produced at most once.
#[derive(Debug)]
pub struct ArchiveBuilder {
    buckets: Vec<Bucket>,
    /// Keyed by lowercased bucket name.
    index: HashMap<String, usize>,
    compression_level: i64,
    entries: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::with_compression_level(DEFAULT_COMPRESSION_LEVEL)
    }

    /// Deflate level is clamped to `1..=9`.
    pub fn with_compression_level(level: i64) -> Self {
        Self {
            buckets: Vec::new(),
            index: HashMap::new(),
            compression_level: level.clamp(1, 9),
            entries: 0,
        }
    }

    /// Add a file to a bucket, creating the bucket on first use.
    ///
    /// Bucket names match case-insensitively; the first spelling seen names
    /// the directory. Both names are sanitized with [`sanitize_path_component`]. If the file
    /// name is already taken in the bucket, ` (n)` is inserted before the
    /// extension. Returns the name the file is stored under.
    pub fn add_entry(&mut self, bucket_name: &str, file_name: &str, bytes: Vec<u8>) -> String {
        let bucket_name = sanitize_path_component(bucket_name);
        let key = bucket_name.to_lowercase();
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.buckets.push(Bucket {
                    name: bucket_name,
                    files: Vec::new(),
                    taken: HashSet::new(),
                });
                self.index.insert(key, self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        let bucket = &mut self.buckets[slot];

        let requested = sanitize_path_component(file_name);
        let mut stored = requested.clone();
        let mut counter = 2;
        while bucket.taken.contains(&stored.to_lowercase()) {
            stored = numbered_name(&requested, counter);
            counter += 1;
        }

        if stored != requested {
            debug!(
                bucket = %bucket.name,
                requested = %requested,
                stored = %stored,
                "renamed colliding archive entry"
            );
        }

        bucket.taken.insert(stored.to_lowercase());
        bucket.files.push((stored.clone(), bytes));
        self.entries += 1;
        stored
    }

    /// Number of files added so far.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Bucket directory names in first-seen order.
    pub fn bucket_names(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Write the zip and return its bytes.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::NoEntries` if nothing was added, otherwise any
    /// error from the zip writer.
    pub fn finalize(self) -> Result<Vec<u8>, ArchiveError> {
        if self.is_empty() {
            return Err(ArchiveError::NoEntries);
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.compression_level));

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for bucket in self.buckets {
            zip.add_directory(format!("{}/", bucket.name), options)?;
            for (name, bytes) in bucket.files {
                zip.start_file(format!("{}/{}", bucket.name, name), options)?;
                zip.write_all(&bytes)?;
            }
        }

        let bytes = zip.finish()?.into_inner();
        debug!(
            entries = self.entries,
            bytes = bytes.len(),
            level = self.compression_level,
            "archive finalized"
        );
        Ok(bytes)
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Make a string safe to use as one path segment inside the archive.
///
/// Path separators and control characters become `_`; empty names and the
/// `.`/`..` segments are replaced so nothing can escape its bucket.
pub fn sanitize_path_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" => "_".to_string(),
        "." | ".." => cleaned.replace('.', "_"),
        _ => cleaned,
    }
}

/// Download name for an archive produced on `date` (`YYYY-MM-DD`).
pub fn archive_file_name(date: &str) -> String {
    format!("processed_images_{date}.zip")
}

fn numbered_name(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &name[..dot], n, &name[dot..]),
        _ => format!("{name} ({n})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_back(bytes: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
        ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    fn names(archive: &mut ZipArchive<Cursor<Vec<u8>>>) -> Vec<String> {
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_buckets_in_first_seen_order() {
        let mut builder = ArchiveBuilder::new();
        builder.add_entry("Web", "a.jpg", vec![1]);
        builder.add_entry("Hi-res", "a.jpg", vec![2]);
        builder.add_entry("Web", "b.jpg", vec![3]);

        assert_eq!(builder.bucket_names().collect::<Vec<_>>(), ["Web", "Hi-res"]);

        let mut archive = read_back(builder.finalize().unwrap());
        assert_eq!(
            names(&mut archive),
            ["Web/", "Web/a.jpg", "Web/b.jpg", "Hi-res/", "Hi-res/a.jpg"]
        );
    }

    #[test]
    fn test_bucket_names_match_ignoring_case() {
        let mut builder = ArchiveBuilder::new();
        builder.add_entry("Web", "a.jpg", vec![1]);
        assert_eq!(builder.add_entry("web", "a.jpg", vec![2]), "a (2).jpg");
        builder.add_entry("WEB", "b.jpg", vec![3]);

        assert_eq!(builder.bucket_names().collect::<Vec<_>>(), ["Web"]);

        let mut archive = read_back(builder.finalize().unwrap());
        assert_eq!(
            names(&mut archive),
            ["Web/", "Web/a.jpg", "Web/a (2).jpg", "Web/b.jpg"]
        );
    }

    #[test]
    fn test_entries_are_deflated_and_intact() {
        let payload = b"hello hello hello hello hello".to_vec();
        let mut builder = ArchiveBuilder::with_compression_level(9);
        builder.add_entry("Docs", "greeting.txt", payload.clone());

        let mut archive = read_back(builder.finalize().unwrap());
        let mut file = archive.by_name("Docs/greeting.txt").unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, payload);
    }

    #[test]
    fn test_collisions_are_renamed() {
        let mut builder = ArchiveBuilder::new();
        assert_eq!(builder.add_entry("Web", "photo.jpg", vec![1]), "photo.jpg");
        assert_eq!(builder.add_entry("Web", "photo.jpg", vec![2]), "photo (2).jpg");
        assert_eq!(builder.add_entry("Web", "PHOTO.jpg", vec![3]), "PHOTO (3).jpg");
        assert_eq!(builder.add_entry("Other", "photo.jpg", vec![4]), "photo.jpg");
        assert_eq!(builder.entry_count(), 4);

        let mut archive = read_back(builder.finalize().unwrap());
        let mut data = Vec::new();
        archive
            .by_name("Web/photo (2).jpg")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, vec![2]);
    }

    #[test]
    fn test_empty_builder_fails() {
        let result = ArchiveBuilder::new().finalize();
        assert!(matches!(result, Err(ArchiveError::NoEntries)));
    }

    #[test]
    fn test_names_cannot_escape_bucket() {
        let mut builder = ArchiveBuilder::new();
        let stored = builder.add_entry("../etc", "../../passwd.jpg", vec![0]);
        assert_eq!(stored, ".._.._passwd.jpg");
        builder.add_entry("..", "a\\b.png", vec![0]);

        let mut archive = read_back(builder.finalize().unwrap());
        assert_eq!(
            names(&mut archive),
            [".._etc/", ".._etc/.._.._passwd.jpg", "__/", "__/a_b.png"]
        );
    }

    #[test]
    fn test_sanitize_path_component() {
        assert_eq!(sanitize_path_component("Web"), "Web");
        assert_eq!(sanitize_path_component(" a/b\\c "), "a_b_c");
        assert_eq!(sanitize_path_component(""), "_");
        assert_eq!(sanitize_path_component("."), "_");
        assert_eq!(sanitize_path_component(".."), "__");
        assert_eq!(sanitize_path_component("tab\there"), "tab_here");
    }

    #[test]
    fn test_numbered_name() {
        assert_eq!(numbered_name("a.jpg", 2), "a (2).jpg");
        assert_eq!(numbered_name("archive.tar.gz", 3), "archive.tar (3).gz");
        assert_eq!(numbered_name(".hidden", 2), ".hidden (2)");
        assert_eq!(numbered_name("noext", 4), "noext (4)");
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(
            archive_file_name("2024-05-01"),
            "processed_images_2024-05-01.zip"
        );
    }
}
