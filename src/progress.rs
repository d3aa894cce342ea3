//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche della compressione.
//!
//! ## Responsabilità:
//! - Progress bar opzionale con `indicatif` (stderr) per feedback real-time
//! - Tracking statistiche (file processati, sostituiti, saltati, errori)
//! - Calcolo percentuali di riduzione e byte risparmiati
//! - Riepilogo finale su una riga
//!
//! ## Statistiche tracciate:
//! - **files_processed**: Totale file elaborati
//! - **files_replaced**: File effettivamente sostituiti
//! - **files_skipped**: File saltati (non supportati o riduzione insufficiente)
//! - **total_bytes_saved**: Byte totali risparmiati
//! - **total_original_size**: Dimensione totale dei file elaborati
//! - **errors**: Numero di errori durante il processing

use crate::file_manager::FileManager;
use crate::replacer::CompressionOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a progress bar; hidden when `visible` is false
    pub fn new(total_files: u64, visible: bool) -> Self {
        if !visible {
            return Self { bar: ProgressBar::hidden() };
        }

        let bar = ProgressBar::new(total_files);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Advance by one file with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Set a custom message without incrementing
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics tracker for a compression run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OptimizationStats {
    pub files_processed: usize,
    pub files_replaced: usize,
    pub files_skipped: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
    pub errors: usize,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_replaced(&mut self, original_size: u64, new_size: u64) {
        self.files_processed += 1;
        self.files_replaced += 1;
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    pub fn add_skipped(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_skipped += 1;
        self.total_original_size += original_size;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    /// Fold a per-file outcome into the totals
    pub fn record(&mut self, outcome: &CompressionOutcome, original_size: u64) {
        match outcome {
            CompressionOutcome::Replaced { original_size, new_size } => {
                self.add_replaced(*original_size, *new_size)
            }
            CompressionOutcome::Skipped(_) => self.add_skipped(original_size),
            CompressionOutcome::Failed(_) => self.add_error(),
        }
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Replaced: {} | Skipped: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_replaced,
            self.files_skipped,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replacer::SkipReason;

    #[test]
    fn test_stats_record_outcomes() {
        let mut stats = OptimizationStats::new();
        stats.record(&CompressionOutcome::Replaced { original_size: 1000, new_size: 250 }, 1000);
        stats.record(&CompressionOutcome::Skipped(SkipReason::Unsupported), 1000);
        stats.record(&CompressionOutcome::Failed("boom".to_string()), 500);

        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.files_replaced, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.total_bytes_saved, 750);
        assert_eq!(stats.total_original_size, 2000);
        assert_eq!(stats.overall_reduction_percent(), 37.5);
    }

    #[test]
    fn test_summary_format() {
        let stats = OptimizationStats::new();
        assert_eq!(stats.overall_reduction_percent(), 0.0);
        assert!(stats.format_summary().starts_with("Processed: 0 files"));
    }

    #[test]
    fn test_hidden_progress_manager() {
        let progress = ProgressManager::new(3, false);
        progress.update("one");
        progress.set_message("two");
        progress.finish("done");
    }
}
