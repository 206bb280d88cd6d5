//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Discovery non ricorsiva delle immagini sorgente in una directory
//! - Elenco dei file regolari prodotti dal compressore
//! - Naming dei file di output (`<stem>_resized_<n>.jpg`)
//! - Copia che preserva permessi e timestamp
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati supportati:
//! - **Immagini sorgente**: PNG, JPG, JPEG, BMP, TIFF (TIF)
//! - **Output**: solo JPEG
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::find_source_images(Path::new("input_images"))?;
//! for file in files {
//!     let name = FileManager::variant_file_name(&FileManager::stem(&file), 1);
//! }
//! ```

use std::fs::FileTimes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::error::{FitError, FitResult};

/// Marker separating the source stem from the generated suffix in output names
pub const VARIANT_MARKER: &str = "_resized";

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find all supported source images directly under a directory, sorted by name
    pub fn find_source_images(input_dir: &Path) -> FitResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let Some(entry) = Self::usable_entry(entry)? else {
                continue;
            };
            if entry.file_type().is_file() && Self::is_source_image(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// List the regular files directly under a directory, in listing order
    pub fn list_regular_files(dir: &Path) -> FitResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let Some(entry) = Self::usable_entry(entry)? else {
                continue;
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Skip unreadable entries (e.g. dangling symlinks); fail only if the directory itself is unreadable
    fn usable_entry(entry: walkdir::Result<DirEntry>) -> FitResult<Option<DirEntry>> {
        match entry {
            Ok(entry) => Ok(Some(entry)),
            Err(e) if e.depth() > 0 => {
                warn!(
                    "Skipping unreadable entry {}: {}",
                    e.path().map(|p| p.display().to_string()).unwrap_or_default(),
                    e
                );
                Ok(None)
            }
            Err(e) => Err(FitError::Io(e.into())),
        }
    }

    /// Check if a file is a supported source image
    pub fn is_source_image(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(
                ext_lower.as_str(),
                "png" | "jpg" | "jpeg" | "bmp" | "tiff" | "tif"
            )
        } else {
            false
        }
    }

    /// File name without its extension
    pub fn stem(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Output file name for the `index`-th variant of `stem` (1-based)
    pub fn variant_file_name(stem: &str, index: usize) -> String {
        format!("{}{}_{}.jpg", stem, VARIANT_MARKER, index)
    }

    /// Group key of a file name: everything before the last variant marker
    pub fn group_key(file_name: &str) -> &str {
        match file_name.rfind(VARIANT_MARKER) {
            Some(pos) => &file_name[..pos],
            None => file_name,
        }
    }

    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> FitResult<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Copy a file keeping its permissions and access/modification times
    pub async fn copy_preserving(from: &Path, to: &Path) -> FitResult<u64> {
        let copy_error = |source: std::io::Error| FitError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(from).await.map_err(copy_error)?;
        let copied = fs::copy(from, to).await.map_err(copy_error)?;

        let mut times = FileTimes::new().set_modified(metadata.modified().map_err(copy_error)?);
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }

        // The copy may already be read-only
        let target = fs::File::open(to).await.map_err(copy_error)?.into_std().await;
        target.set_times(times).map_err(copy_error)?;

        Ok(copied)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_is_source_image() {
        assert!(FileManager::is_source_image(Path::new("a.png")));
        assert!(FileManager::is_source_image(Path::new("a.JPG")));
        assert!(FileManager::is_source_image(Path::new("a.Jpeg")));
        assert!(FileManager::is_source_image(Path::new("a.bmp")));
        assert!(FileManager::is_source_image(Path::new("a.TIFF")));
        assert!(!FileManager::is_source_image(Path::new("a.webp")));
        assert!(!FileManager::is_source_image(Path::new("a.txt")));
        assert!(!FileManager::is_source_image(Path::new("png")));
    }

    #[test]
    fn test_variant_naming_and_grouping() {
        let name = FileManager::variant_file_name("holiday.2023", 3);
        assert_eq!(name, "holiday.2023_resized_3.jpg");
        assert_eq!(FileManager::group_key(&name), "holiday.2023");
        assert_eq!(FileManager::stem(Path::new("/in/holiday.2023.png")), "holiday.2023");
    }

    #[test]
    fn test_group_key_without_marker() {
        assert_eq!(FileManager::group_key("notes.txt"), "notes.txt");
    }

    #[test]
    fn test_group_key_stem_containing_marker() {
        let name = FileManager::variant_file_name("cat_resized", 1);
        assert_eq!(FileManager::group_key(&name), "cat_resized");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(1536), "1.50 KB");
        assert_eq!(FileManager::format_size(1_048_576), "1.00 MB");
    }

    #[test]
    fn test_find_source_images_is_flat_and_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.PNG"), b"x").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("readme.md"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();
        std::fs::write(dir.path().join("nested.png").join("c.png"), b"x").unwrap();

        let files = FileManager::find_source_images(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG"]);
    }

    #[test]
    fn test_list_regular_files_skips_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("x_resized_1.jpg"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let files = FileManager::list_regular_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_copy_preserving_keeps_mtime() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("from.jpg");
        let to = dir.path().join("to.jpg");
        std::fs::write(&from, b"payload").unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        std::fs::File::options()
            .write(true)
            .open(&from)
            .unwrap()
            .set_times(FileTimes::new().set_modified(past))
            .unwrap();

        let copied = FileManager::copy_preserving(&from, &to).await.unwrap();
        assert_eq!(copied, 7);
        assert_eq!(std::fs::read(&to).unwrap(), b"payload");
        assert_eq!(std::fs::metadata(&to).unwrap().modified().unwrap(), past);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_preserving_read_only_source() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let from = dir.path().join("locked.jpg");
        let to = dir.path().join("copy.jpg");
        std::fs::write(&from, b"read only").unwrap();
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
        std::fs::File::options()
            .write(true)
            .open(&from)
            .unwrap()
            .set_times(FileTimes::new().set_modified(past))
            .unwrap();
        std::fs::set_permissions(&from, std::fs::Permissions::from_mode(0o444)).unwrap();

        let copied = FileManager::copy_preserving(&from, &to).await.unwrap();

        assert_eq!(copied, 9);
        let metadata = std::fs::metadata(&to).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o444);
        assert_eq!(metadata.modified().unwrap(), past);
    }

    #[cfg(unix)]
    #[test]
    fn test_listing_follows_symlinks() {
        let dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        std::fs::write(elsewhere.path().join("real.png"), b"x").unwrap();
        std::os::unix::fs::symlink(
            elsewhere.path().join("real.png"),
            dir.path().join("linked.png"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            elsewhere.path().join("gone.png"),
            dir.path().join("dangling.png"),
        )
        .unwrap();

        let images = FileManager::find_source_images(dir.path()).unwrap();
        assert_eq!(images, vec![dir.path().join("linked.png")]);

        let files = FileManager::list_regular_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("linked.png")]);
    }

    #[tokio::test]
    async fn test_copy_preserving_missing_source() {
        let dir = TempDir::new().unwrap();
        let result = FileManager::copy_preserving(
            &dir.path().join("missing.jpg"),
            &dir.path().join("out.jpg"),
        )
        .await;
        assert!(matches!(result, Err(FitError::Copy { .. })));
    }
}
