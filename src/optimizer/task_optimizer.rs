//! # Task Optimizer Module
//!
//! Worker per la compressione di singoli file.
//! Dispatcher → compressore → replacer, senza stato condiviso tra un file e l'altro.

use crate::{
    audio_processor::AudioProcessor,
    config::Config,
    error::{ShrinkError, ShrinkResult},
    file_manager::FileCandidate,
    image_processor::ImageProcessor,
    media_kind::MediaKind,
    replacer::{CompressionOutcome, InPlaceReplacer, SkipReason},
    size_gate::SizeGate,
    video_processor::VideoProcessor,
};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// One unit of work: a selected file, its strategy and the gate it must pass
#[derive(Debug, Clone)]
pub struct CompressionJob {
    pub candidate: FileCandidate,
    pub kind: MediaKind,
    pub gate: SizeGate,
}

/// Worker per elaborazione singoli file
pub struct TaskOptimizer {
    image_processor: ImageProcessor,
    video_processor: VideoProcessor,
    audio_processor: AudioProcessor,
    replacer: InPlaceReplacer,
    gate: SizeGate,
}

impl TaskOptimizer {
    pub fn new(config: Config) -> Self {
        Self {
            image_processor: ImageProcessor::new(config.clone()),
            video_processor: VideoProcessor::new(config.clone()),
            audio_processor: AudioProcessor::new(config.clone()),
            replacer: InPlaceReplacer::new(config.dry_run),
            gate: SizeGate::new(config.compression_ratio),
        }
    }

    /// Build the job for a candidate, `None` when its type is unsupported
    pub fn plan(&self, candidate: &FileCandidate) -> Option<CompressionJob> {
        let kind = candidate
            .extension
            .as_deref()
            .and_then(MediaKind::from_extension)?;

        Some(CompressionJob {
            candidate: candidate.clone(),
            kind,
            gate: self.gate,
        })
    }

    /// Process a single file. Never fails: errors become `Failed` outcomes
    pub async fn process_file(&self, candidate: &FileCandidate) -> CompressionOutcome {
        let name = candidate.name();

        let Some(job) = self.plan(candidate) else {
            info!("[Skipped] Unsupported file type: {}", name);
            return CompressionOutcome::Skipped(SkipReason::Unsupported);
        };

        debug!("Compressing {} as {}", candidate.path.display(), job.kind);

        match self.run_job(&job).await {
            Ok(outcome) => {
                match &outcome {
                    CompressionOutcome::Replaced { .. } => info!("[Overwritten] {}: {}", name, outcome),
                    CompressionOutcome::Skipped(SkipReason::DryRun { .. }) => info!("[Dry run] {}: {}", name, outcome),
                    _ => info!("[Skipped] {}: {}", name, outcome),
                }
                outcome
            }
            Err(e) => {
                error!("[Error] {}: {}", name, error_chain(&e));
                CompressionOutcome::Failed(e.to_string())
            }
        }
    }

    async fn run_job(&self, job: &CompressionJob) -> ShrinkResult<CompressionOutcome> {
        let path = &job.candidate.path;
        let compressed = self.compress(job).await?;

        match self.replacer.finalize(path, &compressed).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if &compressed != path {
                    let _ = tokio::fs::remove_file(&compressed).await;
                }
                Err(ShrinkError::transcode(path.clone(), e))
            }
        }
    }

    /// Run the strategy for the job's kind
    async fn compress(&self, job: &CompressionJob) -> ShrinkResult<PathBuf> {
        let path = &job.candidate.path;
        match job.kind {
            MediaKind::Image(_) => self.image_processor.compress(path, &job.gate).await,
            MediaKind::Video(_) => self.video_processor.compress(path, &job.gate).await,
            MediaKind::Audio(_) => self.audio_processor.compress(path, &job.gate).await,
        }
    }
}

/// `outer: inner: root` rendering of an error and its sources
fn error_chain(err: &ShrinkError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
