//! # Aspect Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore per probe, transcode e filesystem
//! - `file_manager`: Discovery dei video e sostituzione dei file
//! - `probe`: Lettura della risoluzione con ffprobe
//! - `planner`: Calcolo del filtro crop/scale (funzione pura)
//! - `transcode`: Esecuzione di ffmpeg e strategia di output
//! - `converter`: Orchestratore del batch e pipeline per file
//! - `platform`: Nomi dei tool per piattaforma e verifica dipendenze
//! - `progress`: Progress bar e statistiche
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use aspect_converter::{BatchConverter, Config};
//!
//! let config = Config::default();
//! let stats = BatchConverter::from_config(config).run().await?;
//! println!("{}", stats.format_summary());
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod planner;
pub mod platform;
pub mod probe;
pub mod progress;
pub mod transcode;
pub mod utils;

#[cfg(test)]
mod testing;

pub use config::{Config, OutputStrategy, ReplaceMode};
pub use converter::BatchConverter;
pub use error::ConvertError;
pub use planner::{plan, AspectRatio, FilterPlan, PlanSettings, Resolution, TargetSize};
