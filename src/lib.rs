//! # Compress Clips Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce l'entry point CLI condiviso dai binari `compress-clips` e `clip-shortener`
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `size`: Parsing delle dimensioni ("10MB", "5 KB")
//! - `discovery`: Discovery e filtro dei clip in una directory
//! - `observe`: Sink di logging a livelli
//! - `transcoder`: Capability di transcodifica (FFmpeg)
//! - `compressor`: Orchestratore, pool di worker e job per singolo clip
//! - `progress`: Progress bar e statistiche
//! - `platform`: Risoluzione comandi cross-platform
//! - `cli`: Parsing argomenti e avvio
//!
//! ## Utilizzo:
//! ```rust,no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use compress_clips::{ClipCompressor, Config, FfmpegTranscoder, TracingSink};
//! use std::sync::Arc;
//!
//! let compressor = ClipCompressor::new(Config::default(), Arc::new(FfmpegTranscoder::new()), Arc::new(TracingSink))?;
//! let stats = compressor.run(None).await?;
//! println!("{}", stats.format_summary());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod compressor;
pub mod config;
pub mod discovery;
pub mod error;
pub mod observe;
pub mod platform;
pub mod progress;
pub mod size;
pub mod transcoder;

pub use compressor::{ClipCompressor, CompressionJob, TranscodeJobResult, WorkerPool};
pub use config::{CompressionOptions, Config, GpuPolicy};
pub use discovery::{Discoverer, FilterSpec};
pub use error::CompressError;
pub use observe::{EventSink, LogLevel, MemorySink, TracingSink};
pub use progress::RunStats;
pub use size::ByteSize;
pub use transcoder::{EncodeParams, FfmpegTranscoder, Transcoder};
