//! # Task Converter Module
//!
//! Worker per la conversione di un singolo file: probe → piano → transcode.
//! Separato dall'orchestratore per poter testare la pipeline con tool finti.

use crate::{
    config::{Config, OutputStrategy},
    converter::path_resolver::PathResolver,
    error::ConvertError,
    planner::{self, FilterPlan, PlanSettings, Resolution},
    probe::Prober,
    transcode::{TranscodeRunner, Transcoder},
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// State of one video as it moves through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct VideoTask {
    pub input_path: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub filter: Option<FilterPlan>,
    pub output_path: PathBuf,
}

impl VideoTask {
    pub fn new(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            input_path,
            width: None,
            height: None,
            filter: None,
            output_path,
        }
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.width = Some(resolution.width());
        self.height = Some(resolution.height());
    }

    /// Known, positive resolution
    pub fn resolution(&self) -> Option<Resolution> {
        Resolution::new(self.width?, self.height?)
    }

    /// The task may only be transcoded once it has a resolution and a filter
    pub fn ready_for_transcode(&self) -> Option<&FilterPlan> {
        self.resolution().and(self.filter.as_ref())
    }

    fn display_name(path: &Path) -> String {
        path.file_name()
            .unwrap_or(path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

/// What happened to a task that did not error
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Converted { task: VideoTask, bytes_written: u64 },
    /// Dry run: probed and planned, nothing written
    Planned { task: VideoTask },
}

/// Runs the per-file pipeline
pub struct TaskConverter<P, T> {
    prober: P,
    runner: TranscodeRunner<T>,
    resolver: PathResolver,
    settings: PlanSettings,
    strategy: OutputStrategy,
    dry_run: bool,
}

impl<P: Prober, T: Transcoder> TaskConverter<P, T> {
    pub fn new(config: &Config, prober: P, transcoder: T) -> Self {
        Self {
            prober,
            runner: TranscodeRunner::new(transcoder, config),
            resolver: PathResolver::from_config(config),
            settings: config.plan_settings(),
            strategy: config.output_strategy,
            dry_run: config.dry_run,
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Probe, plan and convert a single file
    pub async fn convert(&self, input_path: &Path) -> Result<TaskOutcome, ConvertError> {
        let output_path = self.resolver.final_output(input_path, self.strategy)?;
        let mut task = VideoTask::new(input_path.to_path_buf(), output_path);

        let resolution = self.prober.probe(input_path).await?;
        task.set_resolution(resolution);

        let filter = planner::plan(resolution, &self.settings);
        debug!("{} ({}) -> {}", input_path.display(), resolution, filter);
        task.filter = Some(filter);

        let filter = task.ready_for_transcode().copied().ok_or_else(|| ConvertError::Probe {
            path: input_path.to_path_buf(),
            reason: "resolution unknown".to_string(),
        })?;

        if self.dry_run {
            info!(
                "[DRY RUN] {} ({}) -> {} with {}",
                VideoTask::display_name(&task.input_path),
                resolution,
                VideoTask::display_name(&task.output_path),
                filter
            );
            return Ok(TaskOutcome::Planned { task });
        }

        info!(
            "🎬 Processing {} -> {}",
            VideoTask::display_name(&task.input_path),
            VideoTask::display_name(&task.output_path)
        );

        let outcome = self.runner.run(&task.input_path, &filter).await?;
        task.output_path = outcome.output_path;

        Ok(TaskOutcome::Converted {
            task,
            bytes_written: outcome.bytes_written,
        })
    }
}
