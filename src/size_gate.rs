//! # Size Gate Module
//!
//! Contratto comune a tutti i compressori (immagine, video, audio).
//!
//! ## Responsabilità:
//! - Calcolo del target: `original_size × ratio / 100`
//! - Creazione del file temporaneo di output nella temp dir di sistema
//! - Copia dei timestamp del sorgente sul temporaneo, prima del confronto
//! - Decisione: se `temp_size <= target` il temporaneo diventa
//!   `<stem>.compressed.<ext>` accanto al sorgente, altrimenti viene eliminato
//! - Un `<stem>.compressed.<ext>` già esistente non viene mai sovrascritto:
//!   il file fallisce con `ShrinkError::OutputExists`
//!
//! ## Ciclo di vita del temporaneo:
//! Il temporaneo è un `NamedTempFile`: viene rimosso su ogni percorso di uscita
//! (errore, candidato scartato, panic) a meno che non sia stato spostato sul
//! sibling accettato.

use crate::error::{ShrinkError, ShrinkResult};
use crate::file_manager::{FileManager, FileStamp};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Accept/reject rule comparing a candidate against the ratio-derived target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeGate {
    ratio: f64,
}

impl SizeGate {
    /// `ratio` is a percentage in (0, 100]; validated by `Config::validate`
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Maximum accepted candidate size in bytes
    pub fn target(&self, original_size: u64) -> f64 {
        original_size as f64 * self.ratio / 100.0
    }

    pub fn accepts(&self, candidate_size: u64, original_size: u64) -> bool {
        candidate_size as f64 <= self.target(original_size)
    }

    /// Create the scoped temporary output for a compression attempt
    pub fn temp_output(extension: &str) -> ShrinkResult<NamedTempFile> {
        let temp = tempfile::Builder::new()
            .prefix("media-shrink-")
            .suffix(&format!(".{}", extension))
            .tempfile()?;
        Ok(temp)
    }

    /// Decide the fate of a fully written temporary output.
    ///
    /// Returns the accepted `.compressed.<ext>` sibling, or `source` itself when
    /// the candidate missed the target (the temporary file is deleted then).
    pub async fn settle(
        &self,
        source: &Path,
        original_size: u64,
        stamp: &FileStamp,
        temp: NamedTempFile,
        extension: &str,
    ) -> ShrinkResult<PathBuf> {
        stamp.apply(temp.path())?;
        let temp_size = FileManager::file_size(temp.path()).await?;

        debug!(
            "Candidate for {}: {} bytes (target {:.0} of {} bytes)",
            source.display(),
            temp_size,
            self.target(original_size),
            original_size
        );

        if !self.accepts(temp_size, original_size) {
            drop(temp);
            return Ok(source.to_path_buf());
        }

        // NamedTempFile is created 0600, the replaced file keeps the source mode
        let permissions = tokio::fs::metadata(source).await?.permissions();
        tokio::fs::set_permissions(temp.path(), permissions).await?;

        let final_path = compressed_sibling(source, extension);
        match temp.persist_noclobber(&final_path) {
            Ok(_) => Ok(final_path),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                Err(ShrinkError::OutputExists(final_path))
            }
            Err(e) => {
                // Temp dir lives on another filesystem: copy, then let the temp file drop
                debug!("Persist to {} failed ({}), copying", final_path.display(), e.error);
                match FileManager::copy_with_stamp(e.file.path(), &final_path, stamp) {
                    Ok(_) => Ok(final_path),
                    Err(copy_err) if copy_err.kind() == ErrorKind::AlreadyExists => {
                        Err(ShrinkError::OutputExists(final_path))
                    }
                    Err(copy_err) => Err(copy_err.into()),
                }
            }
        }
    }
}

/// `dir/photo.png` -> `dir/photo.compressed.jpg`
pub fn compressed_sibling(source: &Path, extension: &str) -> PathBuf {
    source.with_extension(format!("compressed.{}", extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_target_and_acceptance() {
        let gate = SizeGate::new(70.0);
        assert_eq!(gate.target(10_000_000), 7_000_000.0);
        assert!(gate.accepts(7_000_000, 10_000_000));
        assert!(gate.accepts(1, 10_000_000));
        assert!(!gate.accepts(7_000_001, 10_000_000));
        assert!(!gate.accepts(8_000_000, 10_000_000));
    }

    #[test]
    fn test_full_ratio_accepts_equal_size() {
        let gate = SizeGate::new(100.0);
        assert!(gate.accepts(500, 500));
        assert!(!gate.accepts(501, 500));
    }

    #[test]
    fn test_compressed_sibling() {
        assert_eq!(
            compressed_sibling(Path::new("/m/photo.png"), "jpg"),
            PathBuf::from("/m/photo.compressed.jpg")
        );
        assert_eq!(
            compressed_sibling(Path::new("/m/holiday.2020.MOV"), "mp4"),
            PathBuf::from("/m/holiday.2020.compressed.mp4")
        );
    }

    fn stamp_for(path: &Path) -> FileStamp {
        let stamp = FileStamp {
            accessed: SystemTime::UNIX_EPOCH + Duration::from_secs(1_577_836_800),
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(1_546_300_800),
        };
        stamp.apply(path).unwrap();
        stamp
    }

    #[tokio::test]
    async fn test_settle_accepts_small_candidate() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("clip.avi");
        std::fs::write(&source, vec![1u8; 1000]).unwrap();
        let stamp = stamp_for(&source);

        let mut temp = SizeGate::temp_output("mp4").unwrap();
        temp.write_all(&[2u8; 600]).unwrap();
        let temp_path = temp.path().to_path_buf();

        let result = SizeGate::new(70.0)
            .settle(&source, 1000, &stamp, temp, "mp4")
            .await
            .unwrap();

        assert_eq!(result, temp_dir.path().join("clip.compressed.mp4"));
        // metadata before any read, reading may bump atime
        let metadata = std::fs::metadata(&result).unwrap();
        assert_eq!(metadata.modified().unwrap(), stamp.modified);
        assert_eq!(metadata.accessed().unwrap(), stamp.accessed);
        assert_eq!(std::fs::read(&result).unwrap().len(), 600);
        assert!(!temp_path.exists());
        assert_eq!(std::fs::read(&source).unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn test_settle_rejects_large_candidate() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("song.wav");
        std::fs::write(&source, vec![1u8; 1000]).unwrap();
        let stamp = stamp_for(&source);

        let mut temp = SizeGate::temp_output("mp3").unwrap();
        temp.write_all(&[2u8; 701]).unwrap();
        let temp_path = temp.path().to_path_buf();

        let result = SizeGate::new(70.0)
            .settle(&source, 1000, &stamp, temp, "mp3")
            .await
            .unwrap();

        assert_eq!(result, source);
        assert!(!temp_path.exists());
        assert!(!temp_dir.path().join("song.compressed.mp3").exists());
    }

    #[tokio::test]
    async fn test_settle_never_overwrites_existing_sibling() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("photo.bmp");
        std::fs::write(&source, vec![1u8; 1000]).unwrap();
        let user_file = temp_dir.path().join("photo.compressed.jpg");
        std::fs::write(&user_file, b"precious user data").unwrap();
        let stamp = stamp_for(&source);

        let mut temp = SizeGate::temp_output("jpg").unwrap();
        temp.write_all(&[2u8; 100]).unwrap();
        let temp_path = temp.path().to_path_buf();

        let err = SizeGate::new(70.0)
            .settle(&source, 1000, &stamp, temp, "jpg")
            .await
            .unwrap_err();

        assert!(matches!(err, ShrinkError::OutputExists(ref path) if path == &user_file));
        assert_eq!(std::fs::read(&user_file).unwrap(), b"precious user data");
        assert!(!temp_path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_settle_keeps_source_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("clip.mov");
        std::fs::write(&source, vec![1u8; 1000]).unwrap();
        std::fs::set_permissions(&source, std::fs::Permissions::from_mode(0o644)).unwrap();
        let stamp = stamp_for(&source);

        let mut temp = SizeGate::temp_output("mp4").unwrap();
        temp.write_all(&[2u8; 300]).unwrap();

        let result = SizeGate::new(70.0)
            .settle(&source, 1000, &stamp, temp, "mp4")
            .await
            .unwrap();

        let mode = std::fs::metadata(&result).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
