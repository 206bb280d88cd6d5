//! # Selector Module
//!
//! Seconda fase: legge la directory prodotta dal compressore, raggruppa i file
//! per stem sorgente e copia il più grande di ogni gruppo nella directory dei risultati.
//!
//! ## Regole:
//! - Solo file regolari direttamente sotto la directory sorgente
//! - Chiave del gruppo = nome del file troncato all'ultimo `_resized`
//! - Vince la dimensione strettamente massima; a parità vince il primo nell'ordine di listing
//! - La copia mantiene nome originale, permessi e timestamp
//! - Un errore di copia viene loggato e conteggiato, senza retry
//!
//! Il selettore non condivide stato con il compressore: vede solo i file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::error::{FitError, FitResult};
use crate::file_manager::FileManager;
use crate::json_output::JsonMessage;
use crate::progress::SelectionStats;

/// A file of the source directory with its byte size
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub path: PathBuf,
    pub size: u64,
}

/// Candidates sharing a source stem, in listing order
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: String,
    pub members: Vec<Candidate>,
}

impl Group {
    /// Largest member; the first one wins ties
    pub fn largest(&self) -> Option<&Candidate> {
        let mut best: Option<&Candidate> = None;
        for candidate in &self.members {
            match best {
                Some(current) if candidate.size <= current.size => {}
                _ => best = Some(candidate),
            }
        }
        best
    }
}

/// Group candidates by the stem encoded in their file name, keeping first-seen order
pub fn group_candidates(candidates: Vec<Candidate>) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for candidate in candidates {
        let file_name = candidate
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = FileManager::group_key(&file_name).to_string();

        match index.get(&key) {
            Some(&position) => groups[position].members.push(candidate),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    members: vec![candidate],
                });
            }
        }
    }

    groups
}

/// Copies the best variant of each source image to a results directory
pub struct Selector {
    json_output: bool,
}

impl Selector {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Copy the largest file of every group in `source_dir` into `destination_dir`
    pub async fn select_best(
        &self,
        source_dir: &Path,
        destination_dir: &Path,
    ) -> FitResult<SelectionStats> {
        let start_time = Instant::now();

        if !source_dir.is_dir() {
            return Err(FitError::Validation(format!(
                "Source directory does not exist: {}",
                source_dir.display()
            )));
        }

        tokio::fs::create_dir_all(destination_dir).await?;

        if source_dir.canonicalize()? == destination_dir.canonicalize()? {
            return Err(FitError::Validation(format!(
                "Destination must differ from source: {}",
                destination_dir.display()
            )));
        }

        let mut candidates = Vec::new();
        for path in FileManager::list_regular_files(source_dir)? {
            let size = FileManager::file_size(&path).await?;
            candidates.push(Candidate { path, size });
        }

        let groups = group_candidates(candidates);
        if !self.json_output {
            info!(
                "Selecting from {} groups in {}",
                groups.len(),
                source_dir.display()
            );
        }

        let mut stats = SelectionStats::new();

        for group in &groups {
            let Some(winner) = group.largest() else {
                continue;
            };
            let file_name = winner.path.file_name().unwrap_or_default();
            let target = destination_dir.join(file_name);

            debug!(
                "Group {}: {} candidates, largest {}",
                group.key,
                group.members.len(),
                winner.path.display()
            );

            match FileManager::copy_preserving(&winner.path, &target).await {
                Ok(_) => {
                    stats.add_copied(winner.size);
                    if self.json_output {
                        JsonMessage::Selected {
                            group: group.key.clone(),
                            path: target.clone(),
                            size: winner.size,
                            candidates: group.members.len(),
                        }
                        .emit();
                    } else {
                        info!(
                            "Copied {} ({}) to {}",
                            file_name.to_string_lossy(),
                            FileManager::format_size(winner.size),
                            destination_dir.display()
                        );
                    }
                }
                Err(e) => {
                    stats.add_failed();
                    if self.json_output {
                        JsonMessage::CopyError {
                            group: group.key.clone(),
                            path: winner.path.clone(),
                            error: e.to_string(),
                        }
                        .emit();
                    } else {
                        error!("{}", e);
                    }
                }
            }
        }

        if self.json_output {
            JsonMessage::SelectComplete {
                stats: stats.clone(),
                duration_seconds: start_time.elapsed().as_secs_f64(),
            }
            .emit();
        } else {
            info!("Copied the largest file of every group: {}", stats.format_summary());
        }

        Ok(stats)
    }
}
