//! # Aspect Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione (file JSON + override da CLI)
//! - Verifica che ffmpeg/ffprobe siano installati
//! - Avvio del batch di conversione
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, `RUST_LOG` ha la precedenza)
//! 3. Carica il file di configurazione indicato con `--config` (errore se manca)
//!    e applica gli override
//! 4. Valida la configurazione e la directory sorgente
//! 5. Istanzia BatchConverter e converte i video uno alla volta
//!
//! I fallimenti dei singoli file non cambiano l'exit code: finiscono nel
//! riepilogo finale.
//!
//! ## Esempio di utilizzo:
//! ```bash
//! aspect-converter /path/to/videos --ratio 4:3 --size 960x720 --mode in-place
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aspect_converter::{
    platform, AspectRatio, BatchConverter, Config, OutputStrategy, ReplaceMode, TargetSize,
};

#[derive(Parser)]
#[command(name = "aspect-converter")]
#[command(about = "Crop and rescale every video in a folder to a fixed aspect ratio")]
struct Args {
    /// Directory containing the videos to convert
    source_dir: Option<PathBuf>,

    /// JSON configuration file (CLI flags override its values)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target aspect ratio, e.g. 4:3
    #[arg(short, long)]
    ratio: Option<AspectRatio>,

    /// Output resolution, e.g. 960x720
    #[arg(short, long)]
    size: Option<TargetSize>,

    /// Ratio tolerance below which videos are only scaled
    #[arg(long)]
    epsilon: Option<f64>,

    /// Write a suffixed copy or replace the original
    #[arg(short, long, value_enum)]
    mode: Option<OutputStrategy>,

    /// How in-place mode swaps the converted file over the original
    #[arg(long, value_enum)]
    replace: Option<ReplaceMode>,

    /// Hardware decode hint passed to -hwaccel
    #[arg(long, conflicts_with = "no_hwaccel")]
    hwaccel: Option<String>,

    /// Decode in software (omit -hwaccel)
    #[arg(long)]
    no_hwaccel: bool,

    /// Video encoder passed to -c:v
    #[arg(short, long)]
    encoder: Option<String>,

    /// Container extension to look for
    #[arg(long)]
    extension: Option<String>,

    /// ffmpeg command or path
    #[arg(long)]
    ffmpeg: Option<String>,

    /// ffprobe command or path
    #[arg(long)]
    ffprobe: Option<String>,

    /// Kill ffmpeg/ffprobe after this many seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Dry run - probe and plan, don't convert anything
    #[arg(long)]
    dry_run: bool,

    /// Write the effective configuration to this file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Apply command line overrides on top of a loaded configuration
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref dir) = self.source_dir {
            config.source_dir = dir.clone();
        }
        if let Some(ratio) = self.ratio {
            config.aspect_ratio = ratio;
        }
        if let Some(size) = self.size {
            config.target = size;
        }
        if let Some(epsilon) = self.epsilon {
            config.ratio_epsilon = epsilon;
        }
        if let Some(mode) = self.mode {
            config.output_strategy = mode;
        }
        if let Some(replace) = self.replace {
            config.replace_mode = replace;
        }
        if self.no_hwaccel {
            config.hwaccel = None;
        } else if let Some(ref hwaccel) = self.hwaccel {
            config.hwaccel = Some(hwaccel.clone());
        }
        if let Some(ref encoder) = self.encoder {
            config.video_encoder = encoder.clone();
        }
        if let Some(ref extension) = self.extension {
            config.extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(ref ffmpeg) = self.ffmpeg {
            config.ffmpeg = ffmpeg.clone();
        }
        if let Some(ref ffprobe) = self.ffprobe {
            config.ffprobe = ffprobe.clone();
        }
        if self.timeout.is_some() {
            config.tool_timeout_secs = self.timeout;
        }
        if self.dry_run {
            config.dry_run = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;

    // Validate arguments
    if !config.source_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Source directory does not exist: {}",
            config.source_dir.display()
        ));
    }

    if let Some(ref path) = args.save_config {
        config.save_to_file(path).await?;
        info!("Saved configuration to {}", path.display());
    }

    platform::check_dependencies(&config).await?;

    let converter = BatchConverter::from_config(config);
    converter.run().await?;

    Ok(())
}
