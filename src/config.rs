//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione della ricerca (scala, qualità).
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri della ricerca
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default equivalenti all'uso tipico (1 MiB, 5 varianti)
//!
//! ## Parametri di configurazione:
//! - `quality_levels`: Qualità JPEG da provare, dalla più alta (default: 99..=78)
//! - `resize_levels`: Fattori di scala da provare, dal più grande (default: 1.00..=0.01)
//! - `target_size`: Dimensione massima in byte di una variante (default: 1_048_576)
//! - `max_images`: Numero massimo di varianti per immagine (default: 5)
//! - `json_output`: Eventi JSON su stdout invece dei log testuali (default: false)
//!
//! ## Validazione:
//! - Entrambe le liste devono essere non vuote e strettamente decrescenti
//! - Qualità in 1-100, scale in (0, 1]
//! - target_size e max_images maggiori di 0
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     target_size: 500_000,
//!     max_images: 3,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::FitError;

/// Default byte budget for a single variant (1 MiB)
pub const DEFAULT_TARGET_SIZE: u64 = 1_048_576;

/// Default number of variants kept per source image
pub const DEFAULT_MAX_IMAGES: usize = 5;

/// Configuration for the (scale, quality) search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JPEG qualities to try for each scale, highest first
    pub quality_levels: Vec<u8>,
    /// Scale factors applied to the original resolution, largest first
    pub resize_levels: Vec<f64>,
    /// Maximum byte size of a persisted variant
    pub target_size: u64,
    /// Maximum number of variants written per source image
    pub max_images: usize,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality_levels: (78..=99).rev().collect(),
            resize_levels: (1..=100).rev().map(|step| step as f64 / 100.0).collect(),
            target_size: DEFAULT_TARGET_SIZE,
            max_images: DEFAULT_MAX_IMAGES,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), FitError> {
        if self.quality_levels.is_empty() {
            return Err(FitError::Validation("at least one quality level is required".into()));
        }

        if let Some(quality) = self.quality_levels.iter().find(|q| **q == 0 || **q > 100) {
            return Err(FitError::Validation(format!(
                "quality levels must be between 1 and 100, got {}",
                quality
            )));
        }

        if self.quality_levels.windows(2).any(|pair| pair[0] <= pair[1]) {
            return Err(FitError::Validation(
                "quality levels must be strictly descending".into(),
            ));
        }

        if self.resize_levels.is_empty() {
            return Err(FitError::Validation("at least one resize level is required".into()));
        }

        if let Some(scale) = self
            .resize_levels
            .iter()
            .find(|s| !s.is_finite() || **s <= 0.0 || **s > 1.0)
        {
            return Err(FitError::Validation(format!(
                "resize levels must be in (0, 1], got {}",
                scale
            )));
        }

        if self.resize_levels.windows(2).any(|pair| pair[0] <= pair[1]) {
            return Err(FitError::Validation(
                "resize levels must be strictly descending".into(),
            ));
        }

        if self.target_size == 0 {
            return Err(FitError::Validation("target size must be greater than 0".into()));
        }

        if self.max_images == 0 {
            return Err(FitError::Validation(
                "max images must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
