//! # Batch Converter
//!
//! Orchestratore principale: trova i video nella directory sorgente e li
//! passa uno alla volta al `TaskConverter`. Gli errori per singolo file non
//! fermano mai il batch.

use crate::{
    config::Config,
    converter::task_converter::{TaskConverter, TaskOutcome},
    file_manager::FileManager,
    probe::{FfprobeProber, Prober},
    progress::{ConversionStats, ProgressManager},
    transcode::{FfmpegTranscoder, Transcoder},
};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Converts every matching video in a directory, sequentially
pub struct BatchConverter<P, T> {
    config: Config,
    task_converter: TaskConverter<P, T>,
}

impl BatchConverter<FfprobeProber, FfmpegTranscoder> {
    /// Batch converter backed by the real ffprobe and ffmpeg
    pub fn from_config(config: Config) -> Self {
        let prober = FfprobeProber::new(config.ffprobe.clone(), config.tool_timeout());
        let transcoder = FfmpegTranscoder::new(&config);
        Self::new(config, prober, transcoder)
    }
}

impl<P: Prober, T: Transcoder> BatchConverter<P, T> {
    pub fn new(config: Config, prober: P, transcoder: T) -> Self {
        let task_converter = TaskConverter::new(&config, prober, transcoder);
        Self { config, task_converter }
    }

    /// Videos to convert, minus the files this tool generated itself
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let files = FileManager::find_video_files(&self.config.source_dir, &self.config.extension)?;
        let resolver = self.task_converter.resolver();

        Ok(files
            .into_iter()
            .filter(|path| {
                let generated = resolver.is_generated(path);
                if generated {
                    debug!("Ignoring generated file {}", path.display());
                }
                !generated
            })
            .collect())
    }

    /// Run the whole batch
    pub async fn run(&self) -> Result<ConversionStats> {
        let start_time = std::time::Instant::now();
        let files = self.discover()?;

        if files.is_empty() {
            info!(
                "No .{} files found in {}",
                self.config.extension,
                self.config.source_dir.display()
            );
            return Ok(ConversionStats::new(0));
        }

        self.log_configuration(files.len());

        let progress = ProgressManager::new(files.len() as u64);
        let mut stats = ConversionStats::new(files.len());

        for file_path in &files {
            let name = file_path.file_name().unwrap_or_default().to_string_lossy().into_owned();
            progress.set_message(&name);

            let message = match self.task_converter.convert(file_path).await {
                Ok(TaskOutcome::Converted { task, bytes_written }) => {
                    info!("✅ {} -> {}", name, task.output_path.display());
                    stats.add_converted(bytes_written);
                    format!("[OK] {}", name)
                }
                Ok(TaskOutcome::Planned { .. }) => {
                    stats.add_planned();
                    format!("[PLAN] {}", name)
                }
                Err(e) if e.is_skip() => {
                    warn!("Could not retrieve resolution for {}, skipping: {}", name, e);
                    stats.add_skipped(file_path, e.to_string());
                    format!("[SKIP] {}", name)
                }
                Err(e) => {
                    error!("❌ {}", e);
                    stats.add_error(file_path, e.to_string());
                    format!("[ERROR] {}", name)
                }
            };

            progress.update(&message);
        }

        progress.finish(&stats.format_summary());
        self.print_final_stats(&stats, start_time.elapsed().as_secs_f64());

        Ok(stats)
    }

    fn log_configuration(&self, file_count: usize) {
        info!(
            "Converting {} file(s) in {} to {} at {} ({:?}{})",
            file_count,
            self.config.source_dir.display(),
            self.config.aspect_ratio,
            self.config.target,
            self.config.output_strategy,
            if self.config.dry_run { ", dry run" } else { "" }
        );
        debug!(
            "ffmpeg: {} (hwaccel: {:?}, encoder: {}), ffprobe: {}",
            self.config.ffmpeg, self.config.hwaccel, self.config.video_encoder, self.config.ffprobe
        );
    }

    fn print_final_stats(&self, stats: &ConversionStats, elapsed_secs: f64) {
        info!("{} in {:.1}s", stats.format_summary(), elapsed_secs);
        for (path, reason) in &stats.failures {
            warn!("  • {}: {}", path.display(), reason);
        }
    }
}
