//! # Media Kind Module
//!
//! Dispatcher dei formati: mappa l'estensione di un file su una delle tre
//! strategie di compressione (immagine, video, audio).
//!
//! ## Formati supportati:
//! - **Immagini**: JPG, JPEG, PNG, TIF, TIFF, BMP, WebP
//! - **Video**: MP4, MOV, AVI, MKV, WebM
//! - **Audio**: MP3, WAV, AAC, FLAC, OGG, M4A
//!
//! Tutto il resto è "unsupported" e viene saltato senza errore.
//! Il matching è case-insensitive. Aggiungere un formato significa
//! aggiungere una variante, quindi il compilatore segnala ogni `match` da aggiornare.

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    Tiff,
    Bmp,
    WebP,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoKind {
    Mp4,
    Mov,
    Avi,
    Mkv,
    WebM,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioKind {
    Mp3,
    Wav,
    Aac,
    Flac,
    Ogg,
    M4a,
}

/// Compression strategy selected for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image(ImageKind),
    Video(VideoKind),
    Audio(AudioKind),
}

impl MediaKind {
    /// Map a lowercase extension (without the dot) to a media kind
    pub fn from_extension(ext: &str) -> Option<Self> {
        let kind = match ext {
            "jpg" | "jpeg" => Self::Image(ImageKind::Jpeg),
            "png" => Self::Image(ImageKind::Png),
            "tif" | "tiff" => Self::Image(ImageKind::Tiff),
            "bmp" => Self::Image(ImageKind::Bmp),
            "webp" => Self::Image(ImageKind::WebP),
            "mp4" => Self::Video(VideoKind::Mp4),
            "mov" => Self::Video(VideoKind::Mov),
            "avi" => Self::Video(VideoKind::Avi),
            "mkv" => Self::Video(VideoKind::Mkv),
            "webm" => Self::Video(VideoKind::WebM),
            "mp3" => Self::Audio(AudioKind::Mp3),
            "wav" => Self::Audio(AudioKind::Wav),
            "aac" => Self::Audio(AudioKind::Aac),
            "flac" => Self::Audio(AudioKind::Flac),
            "ogg" => Self::Audio(AudioKind::Ogg),
            "m4a" => Self::Audio(AudioKind::M4a),
            _ => return None,
        };
        Some(kind)
    }

    /// Classify a path by its extension, case-insensitively
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = lowercase_extension(path)?;
        Self::from_extension(&ext)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Video(_) => "video",
            Self::Audio(_) => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercased extension of a path, if any
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}
