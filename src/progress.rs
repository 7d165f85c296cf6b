//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce la progress bar e le statistiche della conversione.
//!
//! ## Responsabilità:
//! - Progress bar con `indicatif` per feedback real-time
//! - Tracking dei risultati per file (convertiti, pianificati, saltati, falliti)
//! - Report finale con l'elenco dei file falliti
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [=========>------------------------------] 3/12 (25%) [OK] clip.mp4
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Manages progress reporting for a conversion batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Set a custom message without incrementing
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Per-batch conversion statistics
#[derive(Debug, Default)]
pub struct ConversionStats {
    pub files_found: usize,
    pub files_converted: usize,
    pub files_planned: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub bytes_written: u64,
    pub failures: Vec<(PathBuf, String)>,
}

impl ConversionStats {
    pub fn new(files_found: usize) -> Self {
        Self {
            files_found,
            ..Self::default()
        }
    }

    pub fn add_converted(&mut self, bytes_written: u64) {
        self.files_converted += 1;
        self.bytes_written += bytes_written;
    }

    pub fn add_planned(&mut self) {
        self.files_planned += 1;
    }

    pub fn add_skipped(&mut self, path: &Path, reason: String) {
        self.files_skipped += 1;
        self.failures.push((path.to_path_buf(), reason));
    }

    pub fn add_error(&mut self, path: &Path, reason: String) {
        self.files_failed += 1;
        self.failures.push((path.to_path_buf(), reason));
    }

    pub fn files_processed(&self) -> usize {
        self.files_converted + self.files_planned + self.files_skipped + self.files_failed
    }

    pub fn format_summary(&self) -> String {
        let mut summary = format!(
            "Processed: {}/{} files | Converted: {} | Skipped: {} | Errors: {} | Written: {}",
            self.files_processed(),
            self.files_found,
            self.files_converted,
            self.files_skipped,
            self.files_failed,
            FileManager::format_size(self.bytes_written),
        );
        if self.files_planned > 0 {
            summary.push_str(&format!(" | Planned (dry run): {}", self.files_planned));
        }
        summary
    }
}
