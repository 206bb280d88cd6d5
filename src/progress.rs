//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di compressione e selezione.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Progress bar con `indicatif` sulle immagini sorgente
//! - `CompressionStats`: Statistiche cumulative del compressore
//! - `SelectionStats`: Statistiche cumulative del selettore
//!
//! ## Statistiche tracciate (compressione):
//! - **images_processed**: Immagini sorgente elaborate (anche quelle fallite)
//! - **images_without_fit**: Immagini senza alcuna variante entro il budget
//! - **variants_written**: File di output scritti
//! - **bytes_written**: Byte totali scritti
//! - **errors**: Immagini saltate per errore
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:42] [=====================>------------------] 12/22 (54%) photo.png: 5 variants
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use crate::file_manager::FileManager;

/// Manages progress reporting over the source images
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        ) {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that draws nothing (JSON mode)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
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

/// Statistics of a compression run
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CompressionStats {
    pub images_processed: usize,
    pub images_without_fit: usize,
    pub variants_written: usize,
    pub bytes_written: u64,
    pub errors: usize,
}

impl CompressionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self, variants: usize) {
        self.images_processed += 1;
        if variants == 0 {
            self.images_without_fit += 1;
        }
    }

    pub fn add_variant(&mut self, size: u64) {
        self.variants_written += 1;
        self.bytes_written += size;
    }

    pub fn add_error(&mut self) {
        self.images_processed += 1;
        self.errors += 1;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Images: {} | Variants written: {} | No fit: {} | Errors: {} | Written: {}",
            self.images_processed,
            self.variants_written,
            self.images_without_fit,
            self.errors,
            FileManager::format_size(self.bytes_written)
        )
    }
}

/// Statistics of a selection run
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SelectionStats {
    pub groups: usize,
    pub copied: usize,
    pub failed: usize,
    pub bytes_copied: u64,
}

impl SelectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_copied(&mut self, size: u64) {
        self.groups += 1;
        self.copied += 1;
        self.bytes_copied += size;
    }

    pub fn add_failed(&mut self) {
        self.groups += 1;
        self.failed += 1;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Groups: {} | Copied: {} | Failed: {} | Total: {}",
            self.groups,
            self.copied,
            self.failed,
            FileManager::format_size(self.bytes_copied)
        )
    }
}
