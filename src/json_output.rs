//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso programmatico (`--json`).
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout per ogni evento
//! - Riusa le statistiche di `progress` e lo `StopReason` della ricerca
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio compressione
//! - `variant_saved`: Variante scritta su disco
//! - `image_complete`: Fine ricerca per un'immagine
//! - `image_error`: Immagine saltata per errore
//! - `compress_complete`: Fine compressione con statistiche
//! - `selected`: Vincitore di un gruppo copiato
//! - `copy_error`: Copia del vincitore fallita
//! - `select_complete`: Fine selezione con statistiche

use serde::Serialize;
use std::path::PathBuf;

use crate::progress::{CompressionStats, SelectionStats};
use crate::search::StopReason;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_images: usize,
        config: JsonConfig,
    },

    VariantSaved {
        source: PathBuf,
        path: PathBuf,
        size: u64,
        quality: u8,
        scale: f64,
        width: u32,
        height: u32,
    },

    ImageComplete {
        source: PathBuf,
        variants: usize,
        attempts: usize,
        stop: StopReason,
    },

    ImageError {
        source: PathBuf,
        error: String,
    },

    CompressComplete {
        stats: CompressionStats,
        duration_seconds: f64,
    },

    Selected {
        group: String,
        path: PathBuf,
        size: u64,
        candidates: usize,
    },

    CopyError {
        group: String,
        path: PathBuf,
        error: String,
    },

    SelectComplete {
        stats: SelectionStats,
        duration_seconds: f64,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub quality_levels: Vec<u8>,
    pub resize_levels: Vec<f64>,
    pub target_size: u64,
    pub max_images: usize,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }
}

impl From<&crate::Config> for JsonConfig {
    fn from(config: &crate::Config) -> Self {
        Self {
            quality_levels: config.quality_levels.clone(),
            resize_levels: config.resize_levels.clone(),
            target_size: config.target_size,
            max_images: config.max_images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_tags() {
        let message = JsonMessage::ImageComplete {
            source: PathBuf::from("in/a.png"),
            variants: 0,
            attempts: 3,
            stop: StopReason::ResolutionTooSmall { scale: 0.1, width: 9, height: 12 },
        };
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], "image_complete");
        assert_eq!(value["stop"]["reason"], "resolution_too_small");
        assert_eq!(value["stop"]["width"], 9);
    }

    #[test]
    fn test_config_conversion() {
        let config = crate::Config::default();
        let value = serde_json::to_value(JsonMessage::Start {
            input_dir: PathBuf::from("in"),
            output_dir: PathBuf::from("out"),
            total_images: 2,
            config: JsonConfig::from(&config),
        })
        .unwrap();

        assert_eq!(value["type"], "start");
        assert_eq!(value["config"]["target_size"], 1_048_576);
        assert_eq!(value["config"]["max_images"], 5);
    }
}
