//! # In-Place Replacer Module
//!
//! Ultimo passo della pipeline: decide se il candidato prende il posto
//! dell'originale.
//!
//! ## Regola:
//! - Il candidato sostituisce l'originale solo se il path è diverso E la sua
//!   dimensione è **strettamente minore** della dimensione corrente dell'originale
//! - A parità di dimensione: "not worth it", l'originale resta intatto
//! - In ogni altro caso il candidato viene rimosso (mai l'originale)
//!
//! La sostituzione è una `rename` nella stessa directory, quindi atomica:
//! l'originale non si trova mai in uno stato parzialmente scritto.

use crate::error::ShrinkResult;
use crate::file_manager::FileManager;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Why a file was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Extension has no compression strategy
    Unsupported,
    /// Candidate missed the ratio or was not strictly smaller
    NotWorthIt { candidate_size: u64, original_size: u64 },
    /// Would have been replaced, but this is a dry run
    DryRun { candidate_size: u64, original_size: u64 },
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressionOutcome {
    Replaced { original_size: u64, new_size: u64 },
    Skipped(SkipReason),
    Failed(String),
}

impl fmt::Display for CompressionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replaced { original_size, new_size } => {
                write!(f, "{}KB → {}KB", original_size / 1024, new_size / 1024)
            }
            Self::Skipped(SkipReason::Unsupported) => f.write_str("Unsupported file type"),
            Self::Skipped(SkipReason::NotWorthIt { candidate_size, original_size }) => write!(
                f,
                "Compression not worth it ({} >= {})",
                candidate_size, original_size
            ),
            Self::Skipped(SkipReason::DryRun { candidate_size, original_size }) => write!(
                f,
                "Dry run, would shrink {}KB → {}KB",
                original_size / 1024,
                candidate_size / 1024
            ),
            Self::Failed(cause) => f.write_str(cause),
        }
    }
}

/// Swaps accepted candidates onto their originals
pub struct InPlaceReplacer {
    dry_run: bool,
}

impl InPlaceReplacer {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Settle `candidate` against `original`. `candidate` may be `original`
    /// itself when the compressor rejected its output.
    pub async fn finalize(&self, original: &Path, candidate: &Path) -> ShrinkResult<CompressionOutcome> {
        let original_size = FileManager::file_size(original).await?;

        if candidate == original {
            return Ok(CompressionOutcome::Skipped(SkipReason::NotWorthIt {
                candidate_size: original_size,
                original_size,
            }));
        }

        let candidate_size = FileManager::file_size(candidate).await?;

        if candidate_size >= original_size {
            debug!("Discarding candidate {}", candidate.display());
            tokio::fs::remove_file(candidate).await?;
            return Ok(CompressionOutcome::Skipped(SkipReason::NotWorthIt {
                candidate_size,
                original_size,
            }));
        }

        if self.dry_run {
            tokio::fs::remove_file(candidate).await?;
            return Ok(CompressionOutcome::Skipped(SkipReason::DryRun {
                candidate_size,
                original_size,
            }));
        }

        // Candidate is a sibling of the original: same directory, atomic rename
        tokio::fs::rename(candidate, original).await?;

        Ok(CompressionOutcome::Replaced {
            original_size,
            new_size: candidate_size,
        })
    }
}
