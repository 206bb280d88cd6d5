//! # Compressor Module
//!
//! Orchestratore della prima fase: per ogni immagine sorgente cerca fino a
//! `max_images` varianti JPEG entro `target_size` e le scrive come
//! `<stem>_resized_<n>.jpg` nella directory di output.
//!
//! ## Flusso di esecuzione:
//! 1. Valida la configurazione e crea la directory di output (errore fatale)
//! 2. Trova le immagini sorgente (non ricorsivo, ordinate per nome)
//! 3. Per ogni immagine, in sequenza, esegue decode + ricerca su un thread bloccante
//! 4. Un errore su un'immagine viene loggato e si passa alla successiva
//! 5. Stampa le statistiche finali
//!
//! Le immagini non vengono mai elaborate in parallelo: i contatori di sequenza
//! sono per-immagine e i nomi dei file restano deterministici.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::codec::JpegCodec;
use crate::config::Config;
use crate::error::{FitError, FitResult};
use crate::file_manager::FileManager;
use crate::json_output::{JsonConfig, JsonMessage};
use crate::progress::{CompressionStats, ProgressManager};
use crate::search::{search_variants, SearchLimits, SearchOutcome, StopReason};

/// A variant written to disk
#[derive(Debug, Clone)]
pub struct SavedVariant {
    pub path: PathBuf,
    pub size: u64,
    pub quality: u8,
    pub scale: f64,
    pub width: u32,
    pub height: u32,
}

/// Everything produced for one source image
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub source: PathBuf,
    pub saved: Vec<SavedVariant>,
    pub outcome: SearchOutcome,
}

/// Runs the (scale, quality) search over a folder of images
pub struct Compressor {
    config: Arc<Config>,
}

impl Compressor {
    /// Create a compressor, rejecting invalid configurations
    pub fn new(config: Config) -> FitResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Compress every source image of `input_dir` into `output_dir`
    pub async fn compress_all(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> FitResult<CompressionStats> {
        let start_time = Instant::now();

        if !input_dir.is_dir() {
            return Err(FitError::Validation(format!(
                "Input directory does not exist: {}",
                input_dir.display()
            )));
        }

        tokio::fs::create_dir_all(output_dir).await?;

        let files = FileManager::find_source_images(input_dir)?;
        self.emit_start_message(input_dir, output_dir, &files);

        let progress = if self.config.json_output {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(files.len() as u64)
        };
        let mut stats = CompressionStats::new();

        for file in files {
            let file_name = display_name(&file);
            progress.set_message(&file_name);

            match self.compress_one(file.clone(), output_dir).await {
                Ok(report) => {
                    for variant in &report.saved {
                        stats.add_variant(variant.size);
                    }
                    stats.add_image(report.saved.len());
                    self.report_image(&report);
                    progress.update(&format!("{}: {} variants", file_name, report.saved.len()));
                }
                Err(e) => {
                    stats.add_error();
                    if self.config.json_output {
                        JsonMessage::ImageError {
                            source: file.clone(),
                            error: e.to_string(),
                        }
                        .emit();
                    } else {
                        error!("Error processing the image {}: {}", file_name, e);
                    }
                    progress.update(&format!("{}: failed", file_name));
                }
            }
        }

        progress.finish(&stats.format_summary());

        if self.config.json_output {
            JsonMessage::CompressComplete {
                stats: stats.clone(),
                duration_seconds: start_time.elapsed().as_secs_f64(),
            }
            .emit();
        } else {
            info!(
                "Compression finished in {:.2}s: {}",
                start_time.elapsed().as_secs_f64(),
                stats.format_summary()
            );
        }

        Ok(stats)
    }

    /// Run one image on the blocking pool and wait for it
    async fn compress_one(&self, file: PathBuf, output_dir: &Path) -> FitResult<ImageReport> {
        let config = Arc::clone(&self.config);
        let output_dir = output_dir.to_path_buf();

        tokio::task::spawn_blocking(move || compress_image(&file, &output_dir, &config)).await?
    }

    fn emit_start_message(&self, input_dir: &Path, output_dir: &Path, files: &[PathBuf]) {
        if self.config.json_output {
            JsonMessage::Start {
                input_dir: input_dir.to_path_buf(),
                output_dir: output_dir.to_path_buf(),
                total_images: files.len(),
                config: JsonConfig::from(self.config.as_ref()),
            }
            .emit();
            return;
        }

        info!("Starting compression in: {}", input_dir.display());
        info!("Output directory: {}", output_dir.display());
        info!(
            "Target size: {} | Max variants per image: {} | {} quality levels | {} resize levels",
            FileManager::format_size(self.config.target_size),
            self.config.max_images,
            self.config.quality_levels.len(),
            self.config.resize_levels.len()
        );
        info!("Found {} images to process", files.len());
    }

    fn report_image(&self, report: &ImageReport) {
        if self.config.json_output {
            JsonMessage::ImageComplete {
                source: report.source.clone(),
                variants: report.saved.len(),
                attempts: report.outcome.attempts.len(),
                stop: report.outcome.stop,
            }
            .emit();
            return;
        }

        if report.saved.is_empty() {
            info!(
                "No variant of {} fits in {} ({} encodes tried)",
                display_name(&report.source),
                FileManager::format_size(self.config.target_size),
                report.outcome.attempts.len()
            );
        } else {
            debug!(
                "{}: {} variants after {} encodes",
                display_name(&report.source),
                report.saved.len(),
                report.outcome.attempts.len()
            );
        }
    }
}

/// Decode one image, search its variants and write each fitting one to `output_dir`
pub fn compress_image(source: &Path, output_dir: &Path, config: &Config) -> FitResult<ImageReport> {
    let codec = JpegCodec::open(source)?;
    let stem = FileManager::stem(source);
    let mut saved = Vec::new();

    let limits = SearchLimits {
        quality_levels: &config.quality_levels,
        resize_levels: &config.resize_levels,
        target_size: config.target_size,
        max_images: config.max_images,
    };

    let outcome = search_variants(&codec, limits, |variant| {
        let path = output_dir.join(FileManager::variant_file_name(&stem, variant.index));
        std::fs::write(&path, &variant.bytes)?;

        let saved_variant = SavedVariant {
            path,
            size: variant.bytes.len() as u64,
            quality: variant.quality,
            scale: variant.scale,
            width: variant.width,
            height: variant.height,
        };

        if config.json_output {
            JsonMessage::VariantSaved {
                source: source.to_path_buf(),
                path: saved_variant.path.clone(),
                size: saved_variant.size,
                quality: saved_variant.quality,
                scale: saved_variant.scale,
                width: saved_variant.width,
                height: saved_variant.height,
            }
            .emit();
        } else {
            info!(
                "Image saved: {}, Size: {} B, Quality: {}, Resize: {}, Resolution: {}x{}",
                saved_variant.path.display(),
                saved_variant.size,
                saved_variant.quality,
                saved_variant.scale,
                saved_variant.width,
                saved_variant.height
            );
        }

        saved.push(saved_variant);
        Ok(())
    })?;

    if let StopReason::ResolutionTooSmall { scale, width, height } = outcome.stop {
        if !config.json_output {
            info!(
                "Resolution too small to continue resizing {} at scale {} ({}x{})",
                display_name(source),
                scale,
                width,
                height
            );
        }
    }

    Ok(ImageReport {
        source: source.to_path_buf(),
        saved,
        outcome,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
