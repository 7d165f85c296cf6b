//! # Transcode Runner
//!
//! Runs ffmpeg with the planned filter and puts the result where the output
//! strategy says:
//!
//! ```bash
//! ffmpeg -hwaccel cuda -i clip.mp4 -vf crop=1440:1080:240:0,scale=960:720 \
//!        -c:v h264_nvenc -c:a copy -y clip_4x3_960x720.mp4
//! ```
//!
//! - **Suffix**: writes `{stem}_{ratio}_{WxH}{ext}` next to the source, never
//!   touches the original.
//! - **InPlace**: writes `{stem}.temp{ext}`, then swaps it over the original
//!   (see `FileManager::replace_file`). A failed transcode removes the temp file
//!   and leaves the original alone.

use crate::config::{Config, OutputStrategy, ReplaceMode};
use crate::converter::path_resolver::PathResolver;
use crate::error::ConvertError;
use crate::file_manager::FileManager;
use crate::planner::FilterPlan;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, warn};

/// How an external tool exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    code: Option<i32>,
}

impl ExitOutcome {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Killed by a signal, no exit code available
    pub fn terminated() -> Self {
        Self { code: None }
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        Self { code: status.code() }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// One ffmpeg invocation
#[derive(Debug, Clone, Copy)]
pub struct TranscodeRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub filter: &'a FilterPlan,
}

/// Something that can run a crop/scale transcode
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Run to completion. `Err` only when the tool could not run at all.
    async fn transcode(&self, request: TranscodeRequest<'_>) -> Result<ExitOutcome, ConvertError>;
}

/// Transcodes with the ffmpeg binary
pub struct FfmpegTranscoder {
    program: String,
    hwaccel: Option<String>,
    video_encoder: String,
    timeout: Option<Duration>,
}

impl FfmpegTranscoder {
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.ffmpeg.clone(),
            hwaccel: config.hwaccel.clone(),
            video_encoder: config.video_encoder.clone(),
            timeout: config.tool_timeout(),
        }
    }

    /// Full ffmpeg argument list for a request
    pub fn build_args(&self, request: &TranscodeRequest<'_>) -> Vec<std::ffi::OsString> {
        let mut args = Vec::new();

        // Keep ffmpeg quiet unless we are debugging
        if !tracing::enabled!(tracing::Level::DEBUG) {
            args.extend(crate::args!["-loglevel", "warning"]);
        }
        if let Some(ref hwaccel) = self.hwaccel {
            args.extend(crate::args!["-hwaccel", hwaccel]);
        }
        args.extend(crate::args![
            "-i", request.input,
            "-vf", request.filter.to_string(),
            "-c:v", self.video_encoder,
            "-c:a", "copy",
            "-y", request.output,
        ]);
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, request: TranscodeRequest<'_>) -> Result<ExitOutcome, ConvertError> {
        let args = self.build_args(&request);
        debug!("Running {} {:?}", self.program, args);

        let mut cmd = Command::new(&self.program);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            ConvertError::MissingDependency(format!("failed to execute {}: {}", self.program, e))
        })?;

        let status = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status?,
                Err(_) => {
                    // Dropping the child kills it
                    return Err(ConvertError::Timeout {
                        tool: self.program.clone(),
                        path: request.input.to_path_buf(),
                        secs: limit.as_secs(),
                    });
                }
            },
            None => child.wait().await?,
        };

        Ok(status.into())
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub output_path: PathBuf,
    pub bytes_written: u64,
}

/// Runs the transcoder and applies the output strategy
pub struct TranscodeRunner<T> {
    transcoder: T,
    resolver: PathResolver,
    strategy: OutputStrategy,
    replace_mode: ReplaceMode,
}

impl<T: Transcoder> TranscodeRunner<T> {
    pub fn new(transcoder: T, config: &Config) -> Self {
        Self {
            transcoder,
            resolver: PathResolver::from_config(config),
            strategy: config.output_strategy,
            replace_mode: config.replace_mode,
        }
    }

    /// Transcode `input` with `filter` according to the configured strategy
    pub async fn run(&self, input: &Path, filter: &FilterPlan) -> Result<RunOutcome, ConvertError> {
        match self.strategy {
            OutputStrategy::Suffix => self.run_suffix(input, filter).await,
            OutputStrategy::InPlace => self.run_in_place(input, filter).await,
        }
    }

    async fn run_suffix(&self, input: &Path, filter: &FilterPlan) -> Result<RunOutcome, ConvertError> {
        let output = self.resolver.suffix_output(input)?;

        let exit = self
            .transcoder
            .transcode(TranscodeRequest { input, output: &output, filter })
            .await;

        match exit {
            Ok(exit) if exit.success() => {
                let bytes_written = FileManager::file_size(&output).await.unwrap_or(0);
                Ok(RunOutcome { output_path: output, bytes_written })
            }
            Ok(exit) => {
                discard(&output).await;
                Err(ConvertError::Transcode { path: input.to_path_buf(), exit })
            }
            Err(e) => {
                discard(&output).await;
                Err(e)
            }
        }
    }

    async fn run_in_place(&self, input: &Path, filter: &FilterPlan) -> Result<RunOutcome, ConvertError> {
        let temp = self.resolver.temp_output(input)?;

        let exit = self
            .transcoder
            .transcode(TranscodeRequest { input, output: &temp, filter })
            .await;

        match exit {
            Ok(exit) if exit.success() => {}
            Ok(exit) => {
                discard(&temp).await;
                return Err(ConvertError::Transcode { path: input.to_path_buf(), exit });
            }
            Err(e) => {
                discard(&temp).await;
                return Err(e);
            }
        }

        // Never swap in a file ffmpeg did not write
        let bytes_written = tokio::fs::metadata(&temp)
            .await
            .map_err(|e| ConvertError::filesystem(&temp, e))?
            .len();

        if let Err(e) = FileManager::replace_file(input, &temp, self.replace_mode).await {
            settle_failed_replace(input, &temp).await;
            return Err(e);
        }

        Ok(RunOutcome {
            output_path: input.to_path_buf(),
            bytes_written,
        })
    }
}

/// Best-effort removal of a partial output
async fn discard(path: &Path) {
    if let Err(e) = FileManager::remove_if_exists(path).await {
        warn!("Could not remove partial output {}: {}", path.display(), e);
    }
}

/// After a failed replace the temp file is dropped only while the original is
/// still in place, otherwise it is kept.
async fn settle_failed_replace(input: &Path, temp: &Path) {
    if input.exists() {
        discard(temp).await;
        return;
    }

    let backup = FileManager::backup_path(input);
    if backup.exists() {
        error!(
            "Could not put {} back, original is at {}, converted copy kept at {}",
            input.display(),
            backup.display(),
            temp.display()
        );
    } else {
        error!(
            "Original {} is gone, converted copy kept at {}",
            input.display(),
            temp.display()
        );
    }
}
