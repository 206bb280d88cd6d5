//! # JPEG Budget Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//!
//! ## Architettura dei moduli:
//! - `config`: Parametri della ricerca e validazione
//! - `error`: Tipi di errore custom
//! - `file_manager`: Discovery immagini, naming output, copia file
//! - `codec`: Decode, resample Lanczos3 ed encoding JPEG
//! - `search`: Ricerca greedy sulla griglia (scala, qualità)
//! - `compressor`: Prima fase, scrive le varianti entro il budget
//! - `selector`: Seconda fase, copia la variante più grande per ogni sorgente
//! - `progress`: Progress bar e statistiche
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use jpeg_budget::{Compressor, Config, Selector};
//!
//! let compressor = Compressor::new(Config::default())?;
//! compressor.compress_all(&input, &resized).await?;
//! Selector::new(false).select_best(&resized, &suggest).await?;
//! ```

pub mod codec;
pub mod compressor;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod progress;
pub mod search;
pub mod selector;

pub use compressor::Compressor;
pub use config::Config;
pub use error::{FitError, FitResult};
pub use selector::Selector;
