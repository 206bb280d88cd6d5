//! # JPEG Budget - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione (file JSON + override da CLI)
//! - Avvio di compressore, selettore o entrambi in sequenza
//!
//! ## Esempio di utilizzo:
//! ```bash
//! jpeg-budget run input_images resized_images suggest --target-size 1048576 --max-images 5
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use jpeg_budget::{Compressor, Config, Selector};

#[derive(Parser)]
#[command(name = "jpeg-budget")]
#[command(about = "Shrink images under a byte budget and keep the best variant of each")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output progress and status as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Write up to MAX_IMAGES variants under the target size for every image
    Compress {
        /// Directory containing the source images
        input: PathBuf,
        /// Directory receiving <stem>_resized_<n>.jpg files
        output: PathBuf,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Copy the largest variant of every source image
    Select {
        /// Directory written by `compress`
        source: PathBuf,
        /// Directory receiving one file per source image
        destination: PathBuf,
    },
    /// Compress, then select
    Run {
        input: PathBuf,
        output: PathBuf,
        destination: PathBuf,
        #[command(flatten)]
        tuning: Tuning,
    },
}

#[derive(Args)]
struct Tuning {
    /// JSON configuration file (flags below override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JPEG qualities to try, highest first
    #[arg(short, long, value_delimiter = ',')]
    quality_levels: Option<Vec<u8>>,

    /// Scale factors to try, largest first
    #[arg(short, long, value_delimiter = ',')]
    resize_levels: Option<Vec<f64>>,

    /// Maximum size of a variant in bytes
    #[arg(short, long)]
    target_size: Option<u64>,

    /// Maximum number of variants per image
    #[arg(short, long)]
    max_images: Option<usize>,
}

impl Tuning {
    async fn into_config(self, json_output: bool) -> Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::from_file(path).await?,
            None => Config::default(),
        };

        if let Some(levels) = self.quality_levels {
            config.quality_levels = levels;
        }
        if let Some(levels) = self.resize_levels {
            config.resize_levels = levels;
        }
        if let Some(size) = self.target_size {
            config.target_size = size;
        }
        if let Some(count) = self.max_images {
            config.max_images = count;
        }
        config.json_output = json_output;

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Compress { input, output, tuning } => {
            let config = tuning.into_config(cli.json).await?;
            compress(&input, &output, config).await
        }
        Command::Select { source, destination } => select(&source, &destination, cli.json).await,
        Command::Run {
            input,
            output,
            destination,
            tuning,
        } => {
            let config = tuning.into_config(cli.json).await?;
            compress(&input, &output, config).await?;
            select(&output, &destination, cli.json).await
        }
    }
}

async fn compress(input: &Path, output: &Path, config: Config) -> Result<()> {
    let compressor = Compressor::new(config)?;
    compressor.compress_all(input, output).await?;
    Ok(())
}

async fn select(source: &Path, destination: &Path, json_output: bool) -> Result<()> {
    let stats = Selector::new(json_output)
        .select_best(source, destination)
        .await?;

    if stats.failed > 0 {
        return Err(anyhow::anyhow!(
            "{} of {} groups could not be copied to {}",
            stats.failed,
            stats.groups,
            destination.display()
        ));
    }

    Ok(())
}
