//! # Audio Processing Module
//!
//! Compressione dei file audio (MP3, WAV, AAC, FLAC, OGG, M4A) in MP3
//! tramite FFmpeg con `libmp3lame` al bitrate configurato.

use crate::config::Config;
use crate::error::{ShrinkError, ShrinkResult};
use crate::file_manager::{display_name, FileManager, FileStamp};
use crate::size_gate::SizeGate;
use crate::transcoder::{to_args, Transcoder};
use std::path::{Path, PathBuf};
use tracing::debug;

const OUTPUT_EXTENSION: &str = "mp3";

/// Handles audio compression
pub struct AudioProcessor {
    config: Config,
}

impl AudioProcessor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn codec_args(&self) -> Vec<String> {
        to_args([
            "-vn",
            "-c:a", "libmp3lame",
            "-b:a", &self.config.audio_bitrate,
            "-map_metadata", "0",
        ])
    }

    /// Compress an audio file. Returns the accepted `.compressed.mp3` sibling
    /// or `input_path` when the result missed the target.
    pub async fn compress(&self, input_path: &Path, gate: &SizeGate) -> ShrinkResult<PathBuf> {
        self.compress_internal(input_path, gate)
            .await
            .map_err(|e| ShrinkError::transcode(input_path, e))
    }

    async fn compress_internal(&self, input_path: &Path, gate: &SizeGate) -> ShrinkResult<PathBuf> {
        debug!(
            "🎵 Compressing audio: {} (bitrate: {})",
            display_name(input_path),
            self.config.audio_bitrate
        );

        let stamp = FileStamp::capture(input_path)?;
        let original_size = FileManager::file_size(input_path).await?;
        let temp = SizeGate::temp_output(OUTPUT_EXTENSION)?;

        Transcoder::run(input_path, temp.path(), &self.codec_args()).await?;

        gate.settle(input_path, original_size, &stamp, temp, OUTPUT_EXTENSION).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_args_use_bitrate() {
        let processor = AudioProcessor::new(Config {
            audio_bitrate: "96k".to_string(),
            ..Default::default()
        });
        let args = processor.codec_args();

        assert!(args.windows(2).any(|w| w == ["-c:a", "libmp3lame"]));
        assert!(args.windows(2).any(|w| w == ["-b:a", "96k"]));
        assert_eq!(args[0], "-vn");
    }
}
