//! # Archive Module
//!
//! Crea un archivio zip (deflate) di una cartella: `<dest>/<nome cartella>.zip`.
//!
//! ## Regole:
//! - Ogni file regolare viene salvato con il path relativo alla cartella, separatori `/`
//! - Le directory sono implicite (nessuna entry vuota)
//! - L'archivio non include mai se stesso, anche se `dest` è dentro la cartella
//! - In caso di errore l'archivio parziale viene rimosso

use crate::error::{ShrinkError, ShrinkResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Result of a successful archive run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: usize,
}

pub struct Archiver;

impl Archiver {
    /// `<destination>/<folder basename>.zip`
    pub fn archive_path(folder: &Path, destination: &Path) -> ShrinkResult<PathBuf> {
        let name = folder.file_name().ok_or_else(|| {
            ShrinkError::Validation(format!("Cannot name an archive for {}", folder.display()))
        })?;
        Ok(destination.join(format!("{}.zip", name.to_string_lossy())))
    }

    /// Zip `folder` into `destination`, creating the destination if needed
    pub async fn create(folder: &Path, destination: &Path) -> ShrinkResult<ArchiveSummary> {
        if !folder.is_dir() {
            return Err(ShrinkError::Selection(format!("Not a directory: {}", folder.display())));
        }
        tokio::fs::create_dir_all(destination).await?;

        let folder = folder.canonicalize()?;
        let archive_path = Self::archive_path(&folder, &destination.canonicalize()?)?;

        let task_folder = folder.clone();
        let task_archive = archive_path.clone();
        let written = tokio::task::spawn_blocking(move || Self::write_zip(&task_folder, &task_archive))
            .await
            .map_err(|e| ShrinkError::Io(std::io::Error::other(e)))?;

        match written {
            Ok(entries) => {
                info!("Created zip archive: {} ({} files)", archive_path.display(), entries);
                Ok(ArchiveSummary { path: archive_path, entries })
            }
            Err(e) => {
                error!("Failed to create {}: {}", archive_path.display(), e);
                let _ = tokio::fs::remove_file(&archive_path).await;
                Err(e)
            }
        }
    }

    fn write_zip(folder: &Path, archive_path: &Path) -> ShrinkResult<usize> {
        let file = File::create(archive_path)?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut entries = 0;

        for entry in WalkDir::new(folder).sort_by_file_name() {
            let entry = entry.map_err(|e| ShrinkError::Io(e.into()))?;
            if !entry.file_type().is_file() || entry.path() == archive_path {
                continue;
            }

            let name = Self::entry_name(folder, entry.path())?;
            let size = entry.metadata().map_err(|e| ShrinkError::Io(e.into()))?.len();
            debug!("Adding {} ({} bytes)", name, size);

            zip.start_file(name, options.large_file(size >= u32::MAX as u64))?;
            let mut source = File::open(entry.path())?;
            std::io::copy(&mut source, &mut zip)?;
            entries += 1;
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        Ok(entries)
    }

    /// Path of `file` relative to `folder`, joined with `/`
    fn entry_name(folder: &Path, file: &Path) -> ShrinkResult<String> {
        let relative = file.strip_prefix(folder).map_err(|_| {
            ShrinkError::Validation(format!("{} is outside {}", file.display(), folder.display()))
        })?;

        let parts: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Ok(parts.join("/"))
    }
}
