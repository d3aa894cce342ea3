//! # Media Optimizer Main Orchestrator
//!
//! Orchestratore principale del comando `compress`.
//!
//! ## Flusso di esecuzione:
//! 1. **Validazione**: configurazione e directory radice
//! 2. **Selezione**: tutti i file sopra `min_size_mb`, dal più grande
//! 3. **Dependency check**: ffmpeg (solo warning, serve per audio/video)
//! 4. **Processing sequenziale**: un file alla volta via `TaskOptimizer`
//! 5. **Statistiche**: riepilogo finale con byte risparmiati
//!
//! Un errore su un singolo file non interrompe mai il run; solo una radice
//! non valida lo termina, prima di qualsiasi operazione sui file.

use crate::{
    config::Config,
    file_manager::{FileCandidate, FileManager},
    media_kind::MediaKind,
    optimizer::task_optimizer::TaskOptimizer,
    progress::{OptimizationStats, ProgressManager},
    replacer::CompressionOutcome,
    transcoder::Transcoder,
};
use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

/// Orchestratore principale
pub struct MediaOptimizer {
    config: Config,
    task: TaskOptimizer,
}

impl MediaOptimizer {
    /// Crea nuova istanza dell'ottimizzatore
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let task = TaskOptimizer::new(config.clone());
        Ok(Self { config, task })
    }

    /// Esegue la compressione di tutta la directory
    pub async fn run(&self, root: &Path) -> Result<OptimizationStats> {
        let start_time = std::time::Instant::now();
        self.log_configuration(root);

        let files = FileManager::select_files(root, self.config.min_size_mb)?;
        let mut stats = OptimizationStats::new();

        if files.is_empty() {
            info!("[Info] No files over {} MB found in {}", self.config.min_size_mb, root.display());
            return Ok(stats);
        }

        self.check_dependencies(&files).await;

        info!(
            "[Start] Found {} files over {}MB ({} total). Compressing...",
            files.len(),
            self.config.min_size_mb,
            FileManager::format_size(files.iter().map(|f| f.size).sum())
        );

        let progress = ProgressManager::new(files.len() as u64, self.config.show_progress);

        for candidate in &files {
            progress.set_message(&candidate.name());
            let outcome = self.task.process_file(candidate).await;
            stats.record(&outcome, candidate.size);
            progress.update(&Self::progress_message(candidate, &outcome));
        }

        let summary = stats.format_summary();
        progress.finish(&summary);
        info!("✅ {} in {:.1}s", summary, start_time.elapsed().as_secs_f64());

        Ok(stats)
    }

    fn log_configuration(&self, root: &Path) {
        info!("Starting compression in: {}", root.display());
        info!(
            "🎯 Ratio: {}% | JPEG quality: {} | Video: CRF {} ({}) | Audio: {}",
            self.config.compression_ratio,
            self.config.jpeg_quality,
            self.config.video_crf,
            self.config.video_preset,
            self.config.audio_bitrate
        );
        if self.config.dry_run {
            info!("🧪 Dry run mode: No files will be modified");
        }
    }

    /// Warn early when audio/video files are queued but ffmpeg is missing
    async fn check_dependencies(&self, files: &[FileCandidate]) {
        let needs_ffmpeg = files.iter().any(|f| {
            matches!(
                MediaKind::from_path(&f.path),
                Some(MediaKind::Video(_)) | Some(MediaKind::Audio(_))
            )
        });

        if needs_ffmpeg {
            if let Err(e) = Transcoder::check_dependencies().await {
                warn!("⚠️ {} - video and audio files will be reported as errors", e);
            }
        }
    }

    fn progress_message(candidate: &FileCandidate, outcome: &CompressionOutcome) -> String {
        match outcome {
            CompressionOutcome::Replaced { original_size, new_size } => format!(
                "✅ {}: {:.1}% saved",
                candidate.name(),
                FileManager::calculate_reduction(*original_size, *new_size)
            ),
            CompressionOutcome::Skipped(_) => format!("⏩ {}", candidate.name()),
            CompressionOutcome::Failed(_) => format!("❌ {}", candidate.name()),
        }
    }
}
