//! # Platform-specific utilities
//!
//! Questo modulo centralizza la gestione cross-platform dei tool esterni
//! (ffmpeg, ffprobe): nome dell'eseguibile per piattaforma e verifica che
//! siano installati prima di avviare il batch.

use crate::config::Config;
use crate::error::ConvertError;
use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Platform-specific command manager
pub struct PlatformCommands {
    which_command: &'static str,
    exe_suffix: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        if cfg!(windows) {
            Self { which_command: "where", exe_suffix: ".exe" }
        } else {
            Self { which_command: "which", exe_suffix: "" }
        }
    }

    /// Get the platform-specific command name (`ffmpeg` -> `ffmpeg.exe` on Windows)
    pub fn get_command<'a>(&self, base_name: &'a str) -> Cow<'a, str> {
        if self.exe_suffix.is_empty() || Path::new(base_name).extension().is_some() {
            Cow::Borrowed(base_name)
        } else {
            Cow::Owned(format!("{}{}", base_name, self.exe_suffix))
        }
    }

    /// Get the command used to check if a program exists
    pub fn which_command(&self) -> &str {
        self.which_command
    }

    /// Check if a command is available, either as an explicit path or on PATH
    pub async fn is_command_available(&self, base_name: &str) -> bool {
        let command_name = self.get_command(base_name);

        if Path::new(command_name.as_ref()).components().count() > 1 {
            return Path::new(command_name.as_ref()).is_file();
        }

        let result = tokio::process::Command::new(self.which_command)
            .arg(command_name.as_ref())
            .output()
            .await;

        match result {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }
}

/// Make sure the tools a run needs are installed
pub async fn check_dependencies(config: &Config) -> Result<(), ConvertError> {
    let platform = PlatformCommands::instance();

    let mut tools = vec![config.ffprobe.as_str()];
    if !config.dry_run {
        tools.push(config.ffmpeg.as_str());
    }

    for tool in tools {
        if !platform.is_command_available(tool).await {
            return Err(ConvertError::MissingDependency(format!(
                "{} is required for video conversion",
                tool
            )));
        }
        debug!("Found {}", tool);
    }

    Ok(())
}
