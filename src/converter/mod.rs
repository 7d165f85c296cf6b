//! # Converter Module
//!
//! Modulo che separa le responsabilità della conversione in sottomoduli:
//! - `batch_converter`: Orchestratore principale (discovery, progress, report)
//! - `task_converter`: Pipeline per singolo file (probe → piano → transcode)
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod batch_converter;
pub mod path_resolver;
pub mod task_converter;

pub use batch_converter::BatchConverter;
pub use path_resolver::PathResolver;
pub use task_converter::{TaskConverter, TaskOutcome, VideoTask};
