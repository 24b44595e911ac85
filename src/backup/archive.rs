//! Zip archiving of a directory tree
//!
//! Entries are stored relative to the archived root with `/` separators, so
//! extracting a snapshot reproduces the directory structure as it was.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{ResolveBackupError, ResolveBackupResult};

/// What went into an archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub files: u64,
    pub directories: u64,
    /// Uncompressed bytes read from the source tree
    pub bytes: u64,
}

/// Recursively compress the contents of `source` into a zip at `dest_zip`
///
/// Blocks until the archive is complete. An existing file at `dest_zip` is
/// never overwritten. On failure a partially written archive may be left behind.
///
/// Symlinks to regular files are archived with the target's contents; links
/// to directories, dangling links and special files are skipped.
pub fn archive_directory(source: &Path, dest_zip: &Path) -> ResolveBackupResult<ArchiveStats> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest_zip)
        .map_err(|e| {
            ResolveBackupError::Archive(format!(
                "Failed to create archive {}: {}",
                dest_zip.display(),
                e
            ))
        })?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    let mut stats = ArchiveStats::default();

    for entry in WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if path == dest_zip {
            continue;
        }

        let rel = path.strip_prefix(source).map_err(|e| {
            ResolveBackupError::Archive(format!("{} escapes source: {}", path.display(), e))
        })?;
        let name = rel.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
            stats.directories += 1;
            continue;
        }

        if !is_regular_file(&entry) {
            continue;
        }

        zip.start_file(name, options)?;
        let mut f = File::open(path).map_err(|e| {
            ResolveBackupError::Archive(format!("Failed to read {}: {}", path.display(), e))
        })?;
        stats.bytes += io::copy(&mut f, &mut zip).map_err(|e| {
            ResolveBackupError::Archive(format!("Failed to compress {}: {}", path.display(), e))
        })?;
        stats.files += 1;
    }

    zip.finish()?;

    debug!(
        archive = %dest_zip.display(),
        files = stats.files,
        directories = stats.directories,
        bytes = stats.bytes,
        "Archive written"
    );

    Ok(stats)
}

/// Whether an entry (following one symlink level) is a regular file
fn is_regular_file(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if !file_type.is_symlink() {
        debug!(path = %entry.path().display(), "Skipping special file");
        return false;
    }

    match fs::metadata(entry.path()) {
        Ok(target) if target.is_file() => true,
        Ok(_) => {
            debug!(path = %entry.path().display(), "Skipping link to directory");
            false
        }
        Err(e) => {
            warn!(path = %entry.path().display(), error = %e, "Skipping dangling link");
            false
        }
    }
}

/// Size of a finished archive, for logging
pub fn archive_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|m| m.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Read;
    use tempfile::TempDir;

    fn read_archive(path: &Path) -> BTreeMap<String, String> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut contents = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            if entry.is_dir() {
                continue;
            }
            let mut text = String::new();
            entry.read_to_string(&mut text).unwrap();
            contents.insert(entry.name().to_string(), text);
        }
        contents
    }

    #[test]
    fn test_archive_preserves_structure() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("projects");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("a.txt"), "alpha").unwrap();
        fs::write(source.join("sub").join("b.txt"), "bravo").unwrap();

        let dest = temp.path().join("out.zip");
        let stats = archive_directory(&source, &dest).unwrap();

        assert_eq!(stats.files, 2);
        assert_eq!(stats.directories, 1);
        assert_eq!(stats.bytes, 10);

        let contents = read_archive(&dest);
        assert_eq!(contents.len(), 2);
        assert_eq!(contents["a.txt"], "alpha");
        assert_eq!(contents["sub/b.txt"], "bravo");
    }

    #[test]
    fn test_archive_keeps_empty_directories() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("projects");
        fs::create_dir_all(source.join("empty")).unwrap();

        let dest = temp.path().join("out.zip");
        archive_directory(&source, &dest).unwrap();

        let archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let names: Vec<_> = archive.file_names().collect();
        assert_eq!(names, vec!["empty/"]);
    }

    #[test]
    fn test_archive_inside_source_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "alpha").unwrap();

        let dest = temp.path().join("self.zip");
        let stats = archive_directory(temp.path(), &dest).unwrap();

        assert_eq!(stats.files, 1);
        assert!(!read_archive(&dest).contains_key("self.zip"));
    }

    #[test]
    fn test_existing_archive_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("projects");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("a.txt"), "alpha").unwrap();

        let dest = temp.path().join("out.zip");
        fs::write(&dest, "earlier snapshot").unwrap();

        let err = archive_directory(&source, &dest).unwrap_err();
        assert!(matches!(err, ResolveBackupError::Archive(_)));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "earlier snapshot");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_skipped() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("projects");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("a.txt"), "alpha").unwrap();
        std::os::unix::fs::symlink(temp.path().join("nowhere"), source.join("stale.lnk")).unwrap();

        let dest = temp.path().join("out.zip");
        let stats = archive_directory(&source, &dest).unwrap();

        assert_eq!(stats.files, 1);
        let contents = read_archive(&dest);
        assert_eq!(contents.keys().collect::<Vec<_>>(), vec!["a.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_linked_directory_is_skipped_and_linked_file_kept() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("projects");
        let other = temp.path().join("other");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&other).unwrap();
        fs::write(other.join("outside.txt"), "outside").unwrap();
        fs::write(source.join("a.txt"), "alpha").unwrap();
        std::os::unix::fs::symlink(&other, source.join("linkdir")).unwrap();
        std::os::unix::fs::symlink(source.join("a.txt"), source.join("alias.txt")).unwrap();

        let dest = temp.path().join("out.zip");
        let stats = archive_directory(&source, &dest).unwrap();

        assert_eq!(stats.files, 2);
        let contents = read_archive(&dest);
        assert_eq!(contents.len(), 2);
        assert_eq!(contents["a.txt"], "alpha");
        assert_eq!(contents["alias.txt"], "alpha");
    }

    #[test]
    fn test_missing_source_is_archive_error() {
        let temp = TempDir::new().unwrap();
        let err = archive_directory(&temp.path().join("gone"), &temp.path().join("out.zip"))
            .unwrap_err();
        assert!(matches!(err, ResolveBackupError::Archive(_)));
    }
}
