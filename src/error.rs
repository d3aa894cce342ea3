//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ShrinkError` enum per categorizzare gli errori per fase
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//! - Supporta error chaining per mantenere il contesto degli errori
//!
//! ## Categorie di errori:
//! - `Selection`: Directory radice non valida (fatale per il comando)
//! - `Transcode`: Fallimento di compressione per un singolo file (non fatale)
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Image`: Errori di decodifica/codifica immagini
//! - `OutputExists`: Il sibling `.compressed.<ext>` esiste già (mai sovrascritto)
//! - `FFmpeg`: Errori di transcodifica audio/video con FFmpeg
//! - `MissingDependency`: Tool esterno mancante (ffmpeg)
//! - `Validation`: Errori di validazione configurazione
//! - `Archive`: Errori di scrittura archivio zip
//!
//! ## Esempio:
//! ```rust,ignore
//! if !root.is_dir() {
//!     return Err(ShrinkError::Selection(format!("Not a directory: {}", root.display())));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for media shrinking
#[derive(thiserror::Error, Debug)]
pub enum ShrinkError {
    #[error("Selection error: {0}")]
    Selection(String),

    #[error("Compression failed for {}: {source}", .path.display())]
    Transcode {
        path: PathBuf,
        #[source]
        source: Box<ShrinkError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Configuration error: {0}")]
    Validation(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl ShrinkError {
    /// Wrap a lower-level failure with the path of the file being compressed
    pub fn transcode(path: impl Into<PathBuf>, source: ShrinkError) -> Self {
        Self::Transcode {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

pub type ShrinkResult<T> = std::result::Result<T, ShrinkError>;
