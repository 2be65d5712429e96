//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di compressione.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` (nascosta a meno di `--progress`)
//! - Tracking statistiche della run (file tentati, compressi, falliti)
//! - Calcolo byte risparmiati e rapporto complessivo
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================================] 12/12 (100%) clip_012.mp4
//! ```

use crate::compressor::compression_job::{compression_ratio, TranscodeJobResult};
use crate::discovery::format_size;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a compression run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager; a hidden bar swallows every update
    pub fn new(total_files: u64, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total_files);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// Statistics tracker for a compression run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub files_attempted: usize,
    pub files_compressed: usize,
    pub failures: usize,
    pub total_source_bytes: u64,
    pub total_output_bytes: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &TranscodeJobResult) {
        self.files_attempted += 1;
        if result.succeeded {
            self.files_compressed += 1;
            self.total_source_bytes += result.source_size;
            self.total_output_bytes += result.output_size;
        } else {
            self.failures += 1;
        }
    }

    /// A job that errored before producing a result.
    pub fn add_error(&mut self) {
        self.files_attempted += 1;
        self.failures += 1;
    }

    pub fn bytes_saved(&self) -> u64 {
        self.total_source_bytes.saturating_sub(self.total_output_bytes)
    }

    /// Same percentage framing as the per-file log: original over compressed.
    pub fn overall_ratio(&self) -> Option<f64> {
        compression_ratio(self.total_source_bytes, self.total_output_bytes)
    }

    pub fn format_summary(&self) -> String {
        let ratio = self
            .overall_ratio()
            .map(|r| format!("{:.2}%", r))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "Attempted: {} files | Compressed: {} | Failed: {} | Saved: {} | Ratio: {}",
            self.files_attempted,
            self.files_compressed,
            self.failures,
            format_size(self.bytes_saved()),
            ratio
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn result(source_size: u64, output_size: u64, succeeded: bool) -> TranscodeJobResult {
        TranscodeJobResult {
            source_path: PathBuf::from("/clips/a.mp4"),
            output_path: PathBuf::from("/out/a.mp4"),
            source_size,
            output_size,
            succeeded,
        }
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = RunStats::new();
        stats.record(&result(2048, 1024, true));
        stats.record(&result(4096, 1024, true));
        stats.record(&result(500, 0, false));
        stats.add_error();

        assert_eq!(stats.files_attempted, 4);
        assert_eq!(stats.files_compressed, 2);
        assert_eq!(stats.failures, 2);
        assert_eq!(stats.bytes_saved(), 4096);
        assert_eq!(stats.overall_ratio(), Some(300.0));
        assert!(stats.format_summary().contains("Saved: 4.00 KB"));
    }

    #[test]
    fn test_empty_stats_summary() {
        let stats = RunStats::new();
        assert_eq!(stats.overall_ratio(), None);
        assert!(stats.format_summary().contains("Ratio: n/a"));
    }

    #[test]
    fn test_hidden_progress_still_counts() {
        let progress = ProgressManager::new(3, false);
        progress.update("a.mp4");
        progress.update("b.mp4");
        assert_eq!(progress.position(), 2);
        progress.finish("done");
    }
}
