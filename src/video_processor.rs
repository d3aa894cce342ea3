//! # Video Processing Module
//!
//! Questo modulo gestisce la compressione di tutti i formati video supportati.
//!
//! ## Responsabilità:
//! - Compressione video con FFmpeg in un file temporaneo
//! - Controllo qualità tramite CRF (Constant Rate Factor) e preset x264
//! - Ricodifica audio con AAC
//! - Passaggio del risultato al size gate
//!
//! ## Formati supportati:
//! - **Input**: MP4, MOV, AVI, MKV, WebM
//! - **Output**: MP4 (H.264 + AAC) per massima compatibilità
//!
//! ## Controllo qualità (CRF):
//! - 0-17: Visualmente lossless (file grandi)
//! - 18-23: Alta qualità
//! - 24-28: Buona qualità (default 28)
//! - 29+: File piccoli, qualità in calo
//!
//! ## Esempio:
//! ```rust,ignore
//! let processor = VideoProcessor::new(config);
//! let candidate = processor.compress(&video_path, &gate).await?;
//! ```

use crate::config::Config;
use crate::error::{ShrinkError, ShrinkResult};
use crate::file_manager::{display_name, FileManager, FileStamp};
use crate::size_gate::SizeGate;
use crate::transcoder::{to_args, Transcoder};
use std::path::{Path, PathBuf};
use tracing::debug;

const OUTPUT_EXTENSION: &str = "mp4";

/// Handles video compression
pub struct VideoProcessor {
    config: Config,
}

impl VideoProcessor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Codec arguments: H.264 at the configured CRF/preset, AAC audio
    pub fn codec_args(&self) -> Vec<String> {
        to_args([
            "-c:v", "libx264",
            "-preset", &self.config.video_preset,
            "-crf", &self.config.video_crf.to_string(),
            "-c:a", "aac",
            "-map_metadata", "0",
            "-movflags", "+faststart",
        ])
    }

    /// Compress a video. Returns the accepted `.compressed.mp4` sibling or
    /// `input_path` when the result missed the target.
    pub async fn compress(&self, input_path: &Path, gate: &SizeGate) -> ShrinkResult<PathBuf> {
        self.compress_internal(input_path, gate)
            .await
            .map_err(|e| ShrinkError::transcode(input_path, e))
    }

    async fn compress_internal(&self, input_path: &Path, gate: &SizeGate) -> ShrinkResult<PathBuf> {
        debug!(
            "🎬 Compressing video: {} (CRF: {}, preset: {})",
            display_name(input_path),
            self.config.video_crf,
            self.config.video_preset
        );

        let stamp = FileStamp::capture(input_path)?;
        let original_size = FileManager::file_size(input_path).await?;
        let temp = SizeGate::temp_output(OUTPUT_EXTENSION)?;

        Transcoder::run(input_path, temp.path(), &self.codec_args()).await?;

        gate.settle(input_path, original_size, &stamp, temp, OUTPUT_EXTENSION).await
    }
}
