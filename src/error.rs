//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore custom della libreria.
//!
//! ## Responsabilità:
//! - Definisce `FitError` per categorizzare gli errori di compressione e selezione
//! - Mantiene il path del file coinvolto nei messaggi di errore
//! - Integra con `thiserror` per la conversione automatica degli errori
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O generici (lettura directory, scrittura output)
//! - `Decode`: Immagine sorgente illeggibile, corrotta o in formato non supportato
//! - `Encode`: Fallimento durante resample o encoding JPEG
//! - `Copy`: Copia del vincitore verso la directory dei risultati fallita
//! - `Validation`: Parametri di configurazione non validi
//! - `Task`: Job bloccante andato in panic o cancellato
//!
//! Nessuna variante rappresenta il caso "nessun variant entra nel budget":
//! non è un errore, produce semplicemente meno file di output.
//!
//! ## Esempio:
//! ```rust,ignore
//! let image = image::open(path).map_err(|source| FitError::Decode {
//!     path: path.to_path_buf(),
//!     source,
//! })?;
//! ```

use std::path::PathBuf;

/// Custom error types for budget fitting and selection
#[derive(thiserror::Error, Debug)]
pub enum FitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode {width}x{height} at quality {quality}: {source}")]
    Encode {
        width: u32,
        height: u32,
        quality: u8,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Convenience result type for library operations
pub type FitResult<T> = Result<T, FitError>;
