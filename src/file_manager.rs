//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file e la discovery dei video.
//!
//! ## Responsabilità:
//! - Discovery (non ricorsiva) dei video in una directory
//! - Sostituzione dell'originale con il file convertito
//! - Pulizia dei file temporanei
//! - Formattazione human-readable delle dimensioni
//!
//! ## Sostituzione in-place:
//! - `BackupSwap`: rename originale → `.backup`, rename temp → originale,
//!   elimina il backup. In ogni momento esiste almeno una copia del video.
//! - `DeleteThenRename`: elimina l'originale, poi rename temp → originale.
//!   Un crash tra i due passi perde l'originale.
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::find_video_files(Path::new("/videos"), "mp4")?;
//! for file in files {
//!     // probe, plan, transcode
//! }
//! ```

use crate::config::ReplaceMode;
use crate::error::ConvertError;
use anyhow::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Find the videos with the given extension directly inside `dir`, sorted by path
    pub fn find_video_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| anyhow::anyhow!("Failed to read {}: {}", dir.display(), e))?;
            if entry.file_type().is_file() && Self::has_extension(entry.path(), extension) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Case-insensitive extension check
    pub fn has_extension(path: &Path, extension: &str) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false)
    }

    /// Backup name used while swapping: `clip.mp4` -> `clip.mp4.backup`
    pub fn backup_path(original: &Path) -> PathBuf {
        let mut name = original.as_os_str().to_os_string();
        name.push(".backup");
        PathBuf::from(name)
    }

    /// Replace `original` with `replacement`, consuming `replacement`
    pub async fn replace_file(original: &Path, replacement: &Path, mode: ReplaceMode) -> Result<(), ConvertError> {
        match mode {
            ReplaceMode::DeleteThenRename => {
                fs::remove_file(original)
                    .await
                    .map_err(|e| ConvertError::filesystem(original, e))?;
                fs::rename(replacement, original)
                    .await
                    .map_err(|e| ConvertError::filesystem(replacement, e))
            }
            ReplaceMode::BackupSwap => {
                let backup = Self::backup_path(original);

                // rename() would silently clobber it
                if backup.exists() {
                    return Err(ConvertError::filesystem(
                        &backup,
                        std::io::Error::new(ErrorKind::AlreadyExists, "backup file already exists"),
                    ));
                }

                fs::rename(original, &backup)
                    .await
                    .map_err(|e| ConvertError::filesystem(original, e))?;

                if let Err(e) = fs::rename(replacement, original).await {
                    // Put the original back
                    if let Err(restore) = fs::rename(&backup, original).await {
                        error!(
                            "Could not restore {}: {}, original left at {}",
                            original.display(),
                            restore,
                            backup.display()
                        );
                    }
                    return Err(ConvertError::filesystem(replacement, e));
                }

                if let Err(e) = fs::remove_file(&backup).await {
                    warn!("Could not remove backup {}: {}", backup.display(), e);
                } else {
                    debug!("Removed backup {}", backup.display());
                }
                Ok(())
            }
        }
    }

    /// Remove a file, treating "already gone" as success
    pub async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
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
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_find_video_files_is_flat_and_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.mp4", b"");
        touch(dir.path(), "a.MP4", b"");
        touch(dir.path(), "notes.txt", b"");
        touch(dir.path(), "movie.mkv", b"");
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested"), "c.mp4", b"");
        std::fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        let files = FileManager::find_video_files(dir.path(), "mp4").unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["a.MP4", "b.mp4"]);
    }

    #[test]
    fn test_find_video_files_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(FileManager::find_video_files(&dir.path().join("missing"), "mp4").is_err());
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            FileManager::backup_path(Path::new("/videos/clip.mp4")),
            PathBuf::from("/videos/clip.mp4.backup")
        );
    }

    #[tokio::test]
    async fn test_replace_file_backup_swap() {
        let dir = TempDir::new().unwrap();
        let original = touch(dir.path(), "clip.mp4", b"old");
        let temp = touch(dir.path(), "clip.temp.mp4", b"new");

        FileManager::replace_file(&original, &temp, ReplaceMode::BackupSwap).await.unwrap();

        assert_eq!(std::fs::read(&original).unwrap(), b"new");
        assert!(!temp.exists());
        assert!(!FileManager::backup_path(&original).exists());
    }

    #[tokio::test]
    async fn test_replace_file_delete_then_rename() {
        let dir = TempDir::new().unwrap();
        let original = touch(dir.path(), "clip.mp4", b"old");
        let temp = touch(dir.path(), "clip.temp.mp4", b"new");

        FileManager::replace_file(&original, &temp, ReplaceMode::DeleteThenRename).await.unwrap();

        assert_eq!(std::fs::read(&original).unwrap(), b"new");
        assert!(!temp.exists());
    }

    #[tokio::test]
    async fn test_backup_swap_restores_original_when_replacement_missing() {
        let dir = TempDir::new().unwrap();
        let original = touch(dir.path(), "clip.mp4", b"old");
        let missing = dir.path().join("clip.temp.mp4");

        let err = FileManager::replace_file(&original, &missing, ReplaceMode::BackupSwap)
            .await
            .unwrap_err();

        assert!(matches!(err, ConvertError::Filesystem { .. }));
        assert_eq!(std::fs::read(&original).unwrap(), b"old");
        assert!(!FileManager::backup_path(&original).exists());
    }

    #[tokio::test]
    async fn test_backup_swap_never_overwrites_existing_backup() {
        let dir = TempDir::new().unwrap();
        let original = touch(dir.path(), "clip.mp4", b"old");
        let temp = touch(dir.path(), "clip.temp.mp4", b"new");
        let backup = touch(dir.path(), "clip.mp4.backup", b"earlier backup");

        let err = FileManager::replace_file(&original, &temp, ReplaceMode::BackupSwap)
            .await
            .unwrap_err();

        assert!(matches!(err, ConvertError::Filesystem { ref path, .. } if *path == backup));
        assert_eq!(std::fs::read(&backup).unwrap(), b"earlier backup");
        assert_eq!(std::fs::read(&original).unwrap(), b"old");
        assert_eq!(std::fs::read(&temp).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_remove_if_exists() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "clip.temp.mp4", b"partial");
        FileManager::remove_if_exists(&file).await.unwrap();
        assert!(!file.exists());
        FileManager::remove_if_exists(&file).await.unwrap();
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(1536), "1.50 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
