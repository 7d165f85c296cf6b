//! # Resolution Prober
//!
//! Asks ffprobe for the width/height of the first video stream of a file.
//!
//! ```bash
//! ffprobe -v error -select_streams v:0 -show_entries stream=width,height -of json clip.mp4
//! ```
//!
//! Expected output: `{"streams": [{"width": 1920, "height": 1080}]}`. Any
//! deviation (non-zero exit, unparseable JSON, no streams, missing or zero
//! dimensions) becomes a `ConvertError::Probe`, and the caller skips the file.
//! A probe that outlives the configured timeout is killed and reported as
//! `ConvertError::Timeout`, which counts as a failure. There are no retries.

use crate::error::ConvertError;
use crate::planner::Resolution;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Source of video resolutions
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<Resolution, ConvertError>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Extract the resolution of the first stream from ffprobe's JSON output
pub fn parse_probe_output(stdout: &[u8]) -> Result<Resolution, String> {
    let output: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|e| format!("invalid ffprobe output: {}", e))?;

    let stream = output
        .streams
        .first()
        .ok_or_else(|| "no video stream found".to_string())?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) => Resolution::new(width, height)
            .ok_or_else(|| format!("invalid dimensions {}x{}", width, height)),
        _ => Err("stream has no width/height".to_string()),
    }
}

/// Probes files by running ffprobe
pub struct FfprobeProber {
    program: String,
    timeout: Option<Duration>,
}

impl FfprobeProber {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(crate::args![
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height",
            "-of", "json",
            path,
        ])
        .stdin(Stdio::null())
        .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<Resolution, ConvertError> {
        debug!("Probing resolution of {}", path.display());

        let probe_failure = |reason: String| ConvertError::Probe {
            path: path.to_path_buf(),
            reason,
        };

        let pending = self.command(path).output();
        let output = match self.timeout {
            // Dropping the pending output kills ffprobe
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| ConvertError::Timeout {
                    tool: self.program.clone(),
                    path: path.to_path_buf(),
                    secs: limit.as_secs(),
                })?,
            None => pending.await,
        }
        .map_err(|e| probe_failure(format!("failed to execute {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(probe_failure(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let resolution = parse_probe_output(&output.stdout).map_err(probe_failure)?;
        debug!("{} is {}", path.display(), resolution);
        Ok(resolution)
    }
}
