//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la selezione dei candidati.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva dei file sopra una soglia di dimensione (File Selector)
//! - Ordinamento dei candidati dal più grande al più piccolo
//! - Snapshot e ripristino dei timestamp (atime/mtime)
//! - Copie che preservano i timestamp
//! - Formattazione human-readable delle dimensioni
//!
//! ## Selezione:
//! - Nessun limite di profondità, segue tutte le sottodirectory
//! - Include solo file regolari con `size >= min_size_mb * 1024²`
//! - La radice deve essere una directory, altrimenti `ShrinkError::Selection`
//!
//! ## Esempio:
//! ```rust,ignore
//! let candidates = FileManager::select_files(Path::new("/photos"), 5.0)?;
//! for candidate in candidates {
//!     println!("{} ({})", candidate.path.display(), FileManager::format_size(candidate.size));
//! }
//! ```

use crate::error::{ShrinkError, ShrinkResult};
use crate::media_kind::lowercase_extension;
use std::fs::{File, FileTimes, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// A file selected for compression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    /// Size in bytes at selection time
    pub size: u64,
    /// Lowercased extension without the dot
    pub extension: Option<String>,
}

impl FileCandidate {
    pub fn new(path: PathBuf, size: u64) -> Self {
        let extension = lowercase_extension(&path);
        Self { path, size, extension }
    }

    /// File name for log lines
    pub fn name(&self) -> String {
        display_name(&self.path)
    }
}

/// Access and modification times of a file, captured before it is touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub accessed: SystemTime,
    pub modified: SystemTime,
}

impl FileStamp {
    pub fn capture(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            accessed: metadata.accessed()?,
            modified: metadata.modified()?,
        })
    }

    pub fn times(&self) -> FileTimes {
        FileTimes::new()
            .set_accessed(self.accessed)
            .set_modified(self.modified)
    }

    /// Write these times onto `target`, which must be writable
    pub fn apply(&self, target: &Path) -> std::io::Result<()> {
        let file = OpenOptions::new().write(true).open(target)?;
        file.set_times(self.times())
    }
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Current size of a file in bytes
    pub async fn file_size(path: &Path) -> std::io::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Walk `root` and return every regular file of at least `min_size_mb`,
    /// largest first
    pub fn select_files(root: &Path, min_size_mb: f64) -> ShrinkResult<Vec<FileCandidate>> {
        if !root.is_dir() {
            return Err(ShrinkError::Selection(format!(
                "Not a directory: {}",
                root.display()
            )));
        }

        let threshold = min_size_mb * 1024.0 * 1024.0;
        let mut candidates = Vec::new();

        for entry in WalkDir::new(root).into_iter() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    debug!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            if size as f64 >= threshold {
                candidates.push(FileCandidate::new(entry.into_path(), size));
            }
        }

        Self::sort_largest_first(&mut candidates);
        Ok(candidates)
    }

    /// Largest files first, ties broken by path for a stable order
    pub fn sort_largest_first(candidates: &mut [FileCandidate]) {
        candidates.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    }

    /// Copy `from` to a new file `to`, giving the copy the times in `stamp`
    /// and the permissions of `from`.
    ///
    /// Fails with `AlreadyExists` instead of overwriting. A partially written
    /// copy is removed on error.
    pub fn copy_with_stamp(from: &Path, to: &Path, stamp: &FileStamp) -> std::io::Result<u64> {
        let mut source = File::open(from)?;
        let permissions = source.metadata()?.permissions();
        let mut target = OpenOptions::new().write(true).create_new(true).open(to)?;

        let written = io::copy(&mut source, &mut target)
            .and_then(|copied| target.set_times(stamp.times()).map(|_| copied));
        drop(target);

        // permissions last: a read-only source yields a read-only copy
        let result = written.and_then(|copied| std::fs::set_permissions(to, permissions).map(|_| copied));
        if result.is_err() {
            let _ = std::fs::remove_file(to);
        }
        result
    }

    /// The user's Desktop, default destination for `mirror` and `archive`
    pub fn desktop_dir() -> ShrinkResult<PathBuf> {
        dirs::desktop_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
            .ok_or_else(|| {
                ShrinkError::Validation("Could not find the Desktop directory, pass --dest".to_string())
            })
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

/// Final path component for log lines
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_sized(path: &Path, size: usize) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, vec![0xAB; size]).unwrap();
    }

    #[test]
    fn test_select_files_threshold_is_inclusive() {
        let temp_dir = TempDir::new().unwrap();
        // 0.001 MB = 1048.576 bytes
        write_sized(&temp_dir.path().join("below.jpg"), 1048);
        write_sized(&temp_dir.path().join("above.jpg"), 1049);
        write_sized(&temp_dir.path().join("nested/deeper/big.mov"), 4096);

        let selected = FileManager::select_files(temp_dir.path(), 0.001).unwrap();
        let names: Vec<String> = selected.iter().map(|c| c.name()).collect();

        assert_eq!(names, vec!["big.mov".to_string(), "above.jpg".to_string()]);
        assert_eq!(selected[0].size, 4096);
        assert_eq!(selected[0].extension.as_deref(), Some("mov"));
    }

    #[test]
    fn test_select_files_exact_megabyte_boundary() {
        let temp_dir = TempDir::new().unwrap();
        write_sized(&temp_dir.path().join("exact.bin"), 1024 * 1024);
        write_sized(&temp_dir.path().join("short.bin"), 1024 * 1024 - 1);

        let selected = FileManager::select_files(temp_dir.path(), 1.0).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name(), "exact.bin");
    }

    #[test]
    fn test_select_files_sorted_largest_first() {
        let temp_dir = TempDir::new().unwrap();
        write_sized(&temp_dir.path().join("a.jpg"), 10);
        write_sized(&temp_dir.path().join("b.jpg"), 30);
        write_sized(&temp_dir.path().join("c/d.jpg"), 20);

        let selected = FileManager::select_files(temp_dir.path(), 0.0).unwrap();
        let sizes: Vec<u64> = selected.iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![30, 20, 10]);
    }

    #[test]
    fn test_select_files_rejects_non_directory_root() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not_a_dir.jpg");
        write_sized(&file, 10);

        let err = FileManager::select_files(&file, 0.0).unwrap_err();
        assert!(matches!(err, ShrinkError::Selection(_)));

        let missing = temp_dir.path().join("missing");
        assert!(FileManager::select_files(&missing, 0.0).is_err());
    }

    #[test]
    fn test_select_files_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        write_sized(&temp_dir.path().join("tiny.png"), 5);
        let selected = FileManager::select_files(temp_dir.path(), 5.0).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_file_stamp_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.bin");
        let target = temp_dir.path().join("target.bin");
        write_sized(&source, 16);
        write_sized(&target, 8);

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        FileStamp { accessed: past, modified: past }.apply(&source).unwrap();

        let stamp = FileStamp::capture(&source).unwrap();
        stamp.apply(&target).unwrap();

        let metadata = std::fs::metadata(&target).unwrap();
        assert_eq!(metadata.modified().unwrap(), past);
        assert_eq!(std::fs::read(&target).unwrap().len(), 8);
    }

    #[test]
    fn test_copy_with_stamp_keeps_times_and_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("card.jpg");
        let target = temp_dir.path().join("copy.jpg");
        write_sized(&source, 32);
        let stamp = FileStamp {
            accessed: SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000),
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000),
        };

        assert_eq!(FileManager::copy_with_stamp(&source, &target, &stamp).unwrap(), 32);
        let metadata = std::fs::metadata(&target).unwrap();
        assert_eq!(metadata.accessed().unwrap(), stamp.accessed);
        assert_eq!(metadata.modified().unwrap(), stamp.modified);

        let err = FileManager::copy_with_stamp(&source, &target, &stamp).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&target).unwrap().len(), 32);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_with_stamp_read_only_source() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("ro.jpg");
        let target = temp_dir.path().join("out.jpg");
        write_sized(&source, 64);
        std::fs::set_permissions(&source, std::fs::Permissions::from_mode(0o444)).unwrap();
        let stamp = FileStamp {
            accessed: SystemTime::UNIX_EPOCH + Duration::from_secs(1_300_000_000),
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1_400_000_000),
        };

        FileManager::copy_with_stamp(&source, &target, &stamp).unwrap();

        let metadata = std::fs::metadata(&target).unwrap();
        assert_eq!(metadata.modified().unwrap(), stamp.modified);
        assert_eq!(metadata.accessed().unwrap(), stamp.accessed);
        assert_eq!(metadata.permissions().mode() & 0o777, 0o444);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(1536), "1.50 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_calculate_reduction() {
        assert_eq!(FileManager::calculate_reduction(0, 10), 0.0);
        assert_eq!(FileManager::calculate_reduction(100, 70), 30.0);
    }
}
