//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output, dei file temporanei e il
//! riconoscimento dei file generati dal tool stesso.

use crate::config::{Config, OutputStrategy};
use crate::error::ConvertError;
use crate::planner::{AspectRatio, TargetSize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

const TEMP_MARKER: &str = ".temp";

/// Computes output paths for one configuration
#[derive(Debug, Clone)]
pub struct PathResolver {
    ratio: AspectRatio,
    target: TargetSize,
}

impl PathResolver {
    pub fn new(ratio: AspectRatio, target: TargetSize) -> Self {
        Self { ratio, target }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.aspect_ratio, config.target)
    }

    /// `_4x3_960x720`
    fn suffix_tag(&self) -> String {
        format!("_{}_{}", self.ratio.tag(), self.target)
    }

    /// `clip.mp4` -> `clip_4x3_960x720.mp4`
    pub fn suffix_output(&self, input: &Path) -> Result<PathBuf, ConvertError> {
        let (stem, ext) = Self::split_name(input)?;
        Ok(input.with_file_name(format!("{}{}{}", stem, self.suffix_tag(), ext)))
    }

    /// `clip.mp4` -> `clip.temp.mp4`
    pub fn temp_output(&self, input: &Path) -> Result<PathBuf, ConvertError> {
        let (stem, ext) = Self::split_name(input)?;
        Ok(input.with_file_name(format!("{}{}{}", stem, TEMP_MARKER, ext)))
    }

    /// Where the converted video ends up once everything succeeded
    pub fn final_output(&self, input: &Path, strategy: OutputStrategy) -> Result<PathBuf, ConvertError> {
        match strategy {
            OutputStrategy::Suffix => self.suffix_output(input),
            OutputStrategy::InPlace => {
                Self::split_name(input)?;
                Ok(input.to_path_buf())
            }
        }
    }

    /// True for files this configuration writes itself: suffixed outputs,
    /// temp files and swap backups
    pub fn is_generated(&self, path: &Path) -> bool {
        let Some(stem) = path.file_stem().map(OsStr::to_string_lossy) else {
            return false;
        };
        let file_name = path.file_name().map(OsStr::to_string_lossy).unwrap_or_default();

        stem.ends_with(&self.suffix_tag())
            || stem.ends_with(TEMP_MARKER)
            || file_name.ends_with(".backup")
    }

    /// Split into (stem, ".ext") keeping the original extension case
    fn split_name(input: &Path) -> Result<(String, String), ConvertError> {
        let stem = input
            .file_stem()
            .ok_or_else(|| ConvertError::InvalidPath(input.to_path_buf()))?
            .to_string_lossy()
            .into_owned();
        let ext = input
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Ok((stem, ext))
    }
}
