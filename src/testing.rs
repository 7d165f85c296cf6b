//! Fake prober and transcoder so tests never spawn ffmpeg.

use crate::error::ConvertError;
use crate::planner::Resolution;
use crate::probe::{parse_probe_output, Prober};
use crate::transcode::{ExitOutcome, TranscodeRequest, Transcoder};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Answers probes with canned ffprobe JSON keyed by file name
#[derive(Default)]
pub struct FakeProber {
    outputs: HashMap<String, String>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file_name: &str, json: &str) -> Self {
        self.outputs.insert(file_name.to_string(), json.to_string());
        self
    }

    pub fn with_resolution(self, file_name: &str, width: u32, height: u32) -> Self {
        let json = format!(r#"{{"streams": [{{"width": {}, "height": {}}}]}}"#, width, height);
        self.with(file_name, &json)
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, path: &Path) -> Result<Resolution, ConvertError> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        let failure = |reason: String| ConvertError::Probe {
            path: path.to_path_buf(),
            reason,
        };
        let json = self
            .outputs
            .get(&name)
            .ok_or_else(|| failure("ffprobe exited with exit status: 1".to_string()))?;
        parse_probe_output(json.as_bytes()).map_err(failure)
    }
}

/// Writes `converted` to the requested output and exits with a fixed code
#[derive(Clone)]
pub struct FakeTranscoder {
    exit_code: i32,
    writes_output: bool,
    calls: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

impl FakeTranscoder {
    pub fn succeeding() -> Self {
        Self::failing(0)
    }

    pub fn failing(exit_code: i32) -> Self {
        Self {
            exit_code,
            writes_output: true,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Exits 0 without writing anything
    pub fn without_output() -> Self {
        Self {
            writes_output: false,
            ..Self::succeeding()
        }
    }

    /// (output path, filter) for every invocation
    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, request: TranscodeRequest<'_>) -> Result<ExitOutcome, ConvertError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.output.to_path_buf(), request.filter.to_string()));

        // Like ffmpeg, a failing run may still leave a partial file behind
        if self.writes_output {
            let content: &[u8] = if self.exit_code == 0 { b"converted" } else { b"partial" };
            tokio::fs::write(request.output, content).await?;
        }

        Ok(ExitOutcome::from_code(self.exit_code))
    }
}

/// Executable that ignores its arguments and hangs for ten seconds
#[cfg(unix)]
pub fn slow_program(dir: &Path, name: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join(name);
    std::fs::write(&script, "#!/bin/sh\nexec sleep 10\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}
