//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore della conversione.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` per categorizzare i fallimenti di ogni file
//! - Fornisce messaggi descrittivi con il path coinvolto
//! - Integra con `thiserror` per la conversione automatica da `std::io::Error`
//!
//! ## Categorie di errori:
//! - `Probe`: ffprobe fallito o output senza width/height
//! - `Transcode`: ffmpeg terminato con exit code diverso da zero
//! - `Timeout`: tool esterno oltre il timeout configurato
//! - `Filesystem`: delete/rename falliti durante la sostituzione in-place
//! - `InvalidPath`: file senza nome utilizzabile
//! - `MissingDependency`: tool esterno mancante (ffmpeg, ffprobe)
//! - `Validation`: configurazione non valida
//!
//! ## Gestione:
//! Gli errori per singolo file non sono mai fatali: il batch li logga,
//! li conta nelle statistiche e passa al file successivo.
//!
//! ## Esempio:
//! ```rust,ignore
//! if !tool_exists {
//!     return Err(ConvertError::MissingDependency("ffprobe".to_string()));
//! }
//! ```

use crate::transcode::ExitOutcome;
use std::path::PathBuf;

/// Custom error types for video conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Probe failed for {}: {reason}", .path.display())]
    Probe { path: PathBuf, reason: String },

    #[error("Transcode failed for {}: {exit}", .path.display())]
    Transcode { path: PathBuf, exit: ExitOutcome },

    #[error("{tool} timed out after {secs}s on {}", .path.display())]
    Timeout { tool: String, path: PathBuf, secs: u64 },

    #[error("Filesystem error on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file name: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Configuration error: {0}")]
    Validation(String),
}

impl ConvertError {
    /// Probe failures skip the file instead of counting as a conversion failure
    pub fn is_skip(&self) -> bool {
        matches!(self, ConvertError::Probe { .. })
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Filesystem { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_error_is_skip() {
        let err = ConvertError::Probe {
            path: PathBuf::from("clip.mp4"),
            reason: "no video stream".to_string(),
        };
        assert!(err.is_skip());
        assert_eq!(err.to_string(), "Probe failed for clip.mp4: no video stream");
    }

    #[test]
    fn test_transcode_error_message() {
        let err = ConvertError::Transcode {
            path: PathBuf::from("clip.mp4"),
            exit: ExitOutcome::from_code(1),
        };
        assert!(!err.is_skip());
        assert_eq!(err.to_string(), "Transcode failed for clip.mp4: exit code 1");
    }
}
