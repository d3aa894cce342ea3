//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di compressione
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `compression_ratio`: Dimensione massima accettata in % dell'originale (0-100, default: 70)
//! - `min_size_mb`: Dimensione minima dei file da considerare in MB (default: 5)
//! - `jpeg_quality`: Qualità JPEG (1-95, default: 85)
//! - `video_crf`: CRF video (0-51, default: 28, più basso = migliore qualità)
//! - `video_preset`: Preset encoder x264 (default: "medium")
//! - `audio_bitrate`: Bitrate audio (default: "128k")
//! - `dry_run`: Flag per simulazione senza sostituzioni (default: false)
//! - `show_progress`: Mostra la progress bar (default: false)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     compression_ratio: 60.0,
//!     video_crf: 26,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ShrinkError;

/// x264 presets accepted by ffmpeg, fastest first
pub const VIDEO_PRESETS: &[&str] = &[
    "ultrafast", "superfast", "veryfast", "faster", "fast",
    "medium", "slow", "slower", "veryslow", "placebo",
];

/// Configuration for a compression run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Accept a candidate only if it is at most this percentage of the original
    pub compression_ratio: f64,
    /// Minimum file size in megabytes to be considered
    pub min_size_mb: f64,
    /// JPEG quality (1-95)
    pub jpeg_quality: u8,
    /// Video CRF value (0-51, lower = better quality)
    pub video_crf: u8,
    /// x264 encoder preset
    pub video_preset: String,
    /// Audio bitrate (ffmpeg syntax, e.g. "128k")
    pub audio_bitrate: String,
    /// Dry run - compress but never replace originals
    pub dry_run: bool,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compression_ratio: 70.0,
            min_size_mb: 5.0,
            jpeg_quality: 85,
            video_crf: 28,
            video_preset: "medium".to_string(),
            audio_bitrate: "128k".to_string(),
            dry_run: false,
            show_progress: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ShrinkError> {
        if !(self.compression_ratio > 0.0 && self.compression_ratio <= 100.0) {
            return Err(ShrinkError::Validation(format!(
                "Compression ratio must be in (0, 100], got {}",
                self.compression_ratio
            )));
        }

        if !self.min_size_mb.is_finite() || self.min_size_mb < 0.0 {
            return Err(ShrinkError::Validation(format!(
                "Minimum size must be a non-negative number of MB, got {}",
                self.min_size_mb
            )));
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 95 {
            return Err(ShrinkError::Validation("JPEG quality must be between 1 and 95".to_string()));
        }

        if self.video_crf > 51 {
            return Err(ShrinkError::Validation("Video CRF must be between 0 and 51".to_string()));
        }

        if !VIDEO_PRESETS.contains(&self.video_preset.as_str()) {
            return Err(ShrinkError::Validation(format!(
                "Unknown video preset '{}', expected one of: {}",
                self.video_preset,
                VIDEO_PRESETS.join(", ")
            )));
        }

        if self.audio_bitrate.trim().is_empty() {
            return Err(ShrinkError::Validation("Audio bitrate must not be empty".to_string()));
        }

        Ok(())
    }

    /// Minimum size threshold in bytes
    pub fn min_size_bytes(&self) -> f64 {
        self.min_size_mb * 1024.0 * 1024.0
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
