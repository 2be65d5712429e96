//! # Compressor Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `clip_compressor`: Orchestratore principale
//! - `compression_job`: Job per singolo clip
//! - `worker_pool`: Coda condivisa e pool di worker
//! - `path_resolver`: Calcolo dei path di output

pub mod clip_compressor;
pub mod compression_job;
pub mod path_resolver;
pub mod worker_pool;

pub use clip_compressor::ClipCompressor;
pub use compression_job::{compression_ratio, CompressionJob, TranscodeJobResult};
pub use path_resolver::PathResolver;
pub use worker_pool::{PoolOutcome, WorkQueue, WorkerPool};
