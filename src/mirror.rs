//! # Mirror Module
//!
//! Copia tutti i file di un albero sorgente (tipicamente un disco esterno)
//! in un'unica cartella di destinazione piatta, di default il Desktop.
//!
//! ## Regole di deduplica (solo per dimensione):
//! - Destinazione con la stessa dimensione → già presente, nessuna copia
//! - Destinazione con dimensione diversa → rimossa e ricopiata
//! - Destinazione assente → copiata
//!
//! Le copie mantengono atime/mtime del sorgente. Gli errori sui singoli file
//! vengono loggati e contati, senza fermare il run.

use crate::error::{ShrinkError, ShrinkResult};
use crate::file_manager::{display_name, FileManager, FileStamp};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// What happened to one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    Copied,
    AlreadyPresent,
    Refreshed,
    Failed(String),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorStats {
    pub copied: usize,
    pub already_present: usize,
    pub refreshed: usize,
    pub failed: usize,
}

impl MirrorStats {
    pub fn record(&mut self, outcome: &MirrorOutcome) {
        match outcome {
            MirrorOutcome::Copied => self.copied += 1,
            MirrorOutcome::AlreadyPresent => self.already_present += 1,
            MirrorOutcome::Refreshed => self.refreshed += 1,
            MirrorOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Copied: {} | Refreshed: {} | Already present: {} | Errors: {}",
            self.copied, self.refreshed, self.already_present, self.failed
        )
    }
}

/// Flattening copier from a source tree into one folder
pub struct Mirror {
    destination: PathBuf,
}

impl Mirror {
    pub fn new(destination: PathBuf) -> Self {
        Self { destination }
    }

    /// Mirror every regular file under `source` into the destination folder
    pub async fn run(&self, source: &Path) -> Result<MirrorStats> {
        if !source.is_dir() {
            return Err(ShrinkError::Selection(format!("Not a directory: {}", source.display())).into());
        }
        tokio::fs::create_dir_all(&self.destination).await?;

        let destination = self
            .destination
            .canonicalize()
            .unwrap_or_else(|_| self.destination.clone());
        let files = Self::collect_files(source, &destination);
        info!(
            "Mirroring {} files from {} to {}",
            files.len(),
            source.display(),
            self.destination.display()
        );

        let mut stats = MirrorStats::default();
        for file in &files {
            let outcome = match self.mirror_file(file).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Error copying {} to {}: {}", file.display(), self.destination.display(), e);
                    MirrorOutcome::Failed(e.to_string())
                }
            };
            stats.record(&outcome);
        }

        info!("✅ {}", stats.format_summary());
        Ok(stats)
    }

    /// Regular files under `source`, skipping anything already inside `destination`
    fn collect_files(source: &Path, destination: &Path) -> Vec<PathBuf> {
        WalkDir::new(source)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
                !canonical.starts_with(destination)
            })
            .collect()
    }

    /// Copy one file into the destination folder unless a same-size copy exists
    pub async fn mirror_file(&self, source_file: &Path) -> ShrinkResult<MirrorOutcome> {
        let file_name = source_file.file_name().ok_or_else(|| {
            ShrinkError::Validation(format!("No file name: {}", source_file.display()))
        })?;
        let target = self.destination.join(file_name);

        let mut outcome = MirrorOutcome::Copied;
        if target.exists() {
            let source_size = FileManager::file_size(source_file).await?;
            let target_size = FileManager::file_size(&target).await?;

            if source_size == target_size {
                info!("File already exists and is the same size: {}", target.display());
                return Ok(MirrorOutcome::AlreadyPresent);
            }

            info!("File exists but differs in size: {}, copying new version.", target.display());
            tokio::fs::remove_file(&target).await?;
            outcome = MirrorOutcome::Refreshed;
        }

        let stamp = FileStamp::capture(source_file)?;
        FileManager::copy_with_stamp(source_file, &target, &stamp)?;
        info!("Copied: {} to {}", source_file.display(), target.display());
        debug!("{} -> {:?}", display_name(source_file), outcome);

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write(path: &Path, content: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_mirror_flattens_and_dedups_by_size() {
        let drive = TempDir::new().unwrap();
        let desktop = TempDir::new().unwrap();

        write(&drive.path().join("a.jpg"), b"aaaa");
        write(&drive.path().join("trip/b.mov"), b"bbbbbbbb");
        write(&drive.path().join("trip/day2/c.txt"), b"new content");
        // same size as a.jpg on the drive: left alone even though content differs
        write(&desktop.path().join("a.jpg"), b"zzzz");
        // different size: refreshed
        write(&desktop.path().join("c.txt"), b"old");

        let stats = Mirror::new(desktop.path().to_path_buf())
            .run(drive.path())
            .await
            .unwrap();

        assert_eq!(
            stats,
            MirrorStats { copied: 1, already_present: 1, refreshed: 1, failed: 0 }
        );
        assert_eq!(std::fs::read(desktop.path().join("a.jpg")).unwrap(), b"zzzz");
        assert_eq!(std::fs::read(desktop.path().join("b.mov")).unwrap(), b"bbbbbbbb");
        assert_eq!(std::fs::read(desktop.path().join("c.txt")).unwrap(), b"new content");
        assert!(!desktop.path().join("trip").exists());
    }

    #[tokio::test]
    async fn test_mirror_preserves_timestamps() {
        let drive = TempDir::new().unwrap();
        let desktop = TempDir::new().unwrap();
        let source = drive.path().join("old.wav");
        write(&source, b"riff");

        let stamp = FileStamp {
            accessed: SystemTime::UNIX_EPOCH + Duration::from_secs(1_420_000_000),
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1_400_000_000),
        };
        stamp.apply(&source).unwrap();

        let mirror = Mirror::new(desktop.path().to_path_buf());
        let outcome = mirror.mirror_file(&source).await.unwrap();

        assert_eq!(outcome, MirrorOutcome::Copied);
        let copied = std::fs::metadata(desktop.path().join("old.wav")).unwrap();
        assert_eq!(copied.modified().unwrap(), stamp.modified);
        assert_eq!(copied.accessed().unwrap(), stamp.accessed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_mirror_read_only_source_keeps_timestamps() {
        use std::os::unix::fs::PermissionsExt;

        let drive = TempDir::new().unwrap();
        let desktop = TempDir::new().unwrap();
        let source = drive.path().join("ro.jpg");
        write(&source, b"camera card");

        let stamp = FileStamp {
            accessed: SystemTime::UNIX_EPOCH + Duration::from_secs(1_350_000_000),
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1_450_000_000),
        };
        stamp.apply(&source).unwrap();
        std::fs::set_permissions(&source, std::fs::Permissions::from_mode(0o444)).unwrap();

        let mirror = Mirror::new(desktop.path().to_path_buf());
        let outcome = mirror.mirror_file(&source).await.unwrap();
        assert_eq!(outcome, MirrorOutcome::Copied);

        let copied = std::fs::metadata(desktop.path().join("ro.jpg")).unwrap();
        assert_eq!(copied.modified().unwrap(), stamp.modified);
        assert_eq!(copied.accessed().unwrap(), stamp.accessed);
        assert!(copied.permissions().readonly());

        // a later run finds the same size and leaves it alone
        assert_eq!(mirror.mirror_file(&source).await.unwrap(), MirrorOutcome::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_mirror_creates_destination_and_skips_itself() {
        let drive = TempDir::new().unwrap();
        write(&drive.path().join("one.png"), b"1");
        let nested_destination = drive.path().join("mirror_out");

        let stats = Mirror::new(nested_destination.clone())
            .run(drive.path())
            .await
            .unwrap();
        assert_eq!(stats.copied, 1);

        // a second run must not pick up files from its own destination
        let again = Mirror::new(nested_destination).run(drive.path()).await.unwrap();
        assert_eq!(again, MirrorStats { already_present: 1, ..Default::default() });
    }

    #[tokio::test]
    async fn test_mirror_rejects_missing_source() {
        let desktop = TempDir::new().unwrap();
        let err = Mirror::new(desktop.path().to_path_buf())
            .run(&desktop.path().join("no_drive"))
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<ShrinkError>(), Some(ShrinkError::Selection(_))));
    }
}
