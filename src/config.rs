//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione della conversione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di conversione
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `source_dir`: Directory con i video da convertire (default: ".")
//! - `extension`: Estensione dei file da cercare (default: "mp4")
//! - `aspect_ratio`: Aspect ratio finale (default: 4:3)
//! - `target`: Risoluzione finale (default: 960x720)
//! - `ratio_epsilon`: Tolleranza per considerare il ratio già corretto (default: 0.001)
//! - `output_strategy`: `suffix` (nuovo file accanto) o `in-place` (sostituisce l'originale)
//! - `replace_mode`: Come sostituire l'originale in modalità in-place (default: backup-swap)
//! - `hwaccel`: Hint di decodifica hardware per ffmpeg (default: "cuda")
//! - `video_encoder`: Encoder video (default: "h264_nvenc")
//! - `ffmpeg` / `ffprobe`: Nome o path dei tool esterni
//! - `tool_timeout_secs`: Timeout opzionale per ogni invocazione esterna
//! - `dry_run`: Solo probe e piano, nessuna conversione (default: false)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     aspect_ratio: "16:9".parse()?,
//!     target: "1280x720".parse()?,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::ConvertError;
use crate::planner::{AspectRatio, PlanSettings, TargetSize, DEFAULT_RATIO_EPSILON};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where converted videos end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputStrategy {
    /// New file next to the source, e.g. `clip_4x3_960x720.mp4`
    #[default]
    Suffix,
    /// Convert to a temp sibling, then replace the source
    InPlace,
}

/// How the in-place strategy swaps the converted file over the original
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReplaceMode {
    /// Rename original to a backup, rename temp over it, drop the backup
    #[default]
    BackupSwap,
    /// Delete the original, then rename temp over it
    DeleteThenRename,
}

/// Configuration for video conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned (non-recursively) for videos
    pub source_dir: PathBuf,
    /// Container extension to pick up, without the dot
    pub extension: String,
    /// Target aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Final output resolution
    pub target: TargetSize,
    /// Ratio difference below which a video is only scaled
    pub ratio_epsilon: f64,
    pub output_strategy: OutputStrategy,
    pub replace_mode: ReplaceMode,
    /// `-hwaccel` value, None to decode in software
    pub hwaccel: Option<String>,
    /// `-c:v` value
    pub video_encoder: String,
    pub ffmpeg: String,
    pub ffprobe: String,
    /// Kill an external tool after this many seconds (None = wait forever)
    pub tool_timeout_secs: Option<u64>,
    /// Probe and plan only
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            extension: "mp4".to_string(),
            aspect_ratio: AspectRatio::default(),
            target: TargetSize::default(),
            ratio_epsilon: DEFAULT_RATIO_EPSILON,
            output_strategy: OutputStrategy::default(),
            replace_mode: ReplaceMode::default(),
            hwaccel: Some("cuda".to_string()),
            video_encoder: "h264_nvenc".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            tool_timeout_secs: None,
            dry_run: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConvertError> {
        let invalid = |msg: &str| -> Result<(), ConvertError> { Err(ConvertError::Validation(msg.to_string())) };

        if self.aspect_ratio.width == 0 || self.aspect_ratio.height == 0 {
            return invalid("Aspect ratio terms must be greater than 0");
        }

        if self.target.width == 0 || self.target.height == 0 {
            return invalid("Target width and height must be greater than 0");
        }

        if !self.ratio_epsilon.is_finite() || self.ratio_epsilon <= 0.0 {
            return invalid("Ratio epsilon must be a positive number");
        }

        if self.extension.is_empty() || self.extension.contains('.') {
            return invalid("Extension must be non-empty and given without a dot (e.g. mp4)");
        }

        if self.video_encoder.trim().is_empty() {
            return invalid("Video encoder must not be empty");
        }

        if self.ffmpeg.trim().is_empty() || self.ffprobe.trim().is_empty() {
            return invalid("ffmpeg and ffprobe commands must not be empty");
        }

        if self.tool_timeout_secs == Some(0) {
            return invalid("Tool timeout must be greater than 0 seconds");
        }

        Ok(())
    }

    /// Settings handed to the filter planner
    pub fn plan_settings(&self) -> PlanSettings {
        PlanSettings {
            ratio: self.aspect_ratio,
            target: self.target,
            epsilon: self.ratio_epsilon,
        }
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }

    /// Load configuration from file. Missing keys take their default value,
    /// a missing file is an error.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
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
