//! # Compression Job Module
//!
//! Worker per la compressione di un singolo clip.
//! Separato dall'orchestratore principale per maggiore modularità.
//!
//! Passi: calcola la destinazione, invoca il `Transcoder`, confronta le dimensioni,
//! logga il rapporto di compressione ed eventualmente elimina il sorgente.

use crate::{
    config::CompressionOptions,
    discovery::format_size,
    error::CompressError,
    observe::{EventSink, LogLevel},
    transcoder::{EncodeParams, Transcoder},
};
use crate::compressor::path_resolver::PathResolver;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of one transcode attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJobResult {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub source_size: u64,
    /// Zero when the transcode failed
    pub output_size: u64,
    pub succeeded: bool,
}

impl TranscodeJobResult {
    /// `100 * source / output`; `None` when there is no output to compare against.
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.succeeded {
            compression_ratio(self.source_size, self.output_size)
        } else {
            None
        }
    }
}

/// Original size as a percentage of the compressed size (200.0 means half the size).
pub fn compression_ratio(source_size: u64, output_size: u64) -> Option<f64> {
    if output_size == 0 {
        None
    } else {
        Some(100.0 * source_size as f64 / output_size as f64)
    }
}

/// Compresses single clips into the output directory
pub struct CompressionJob {
    transcoder: Arc<dyn Transcoder>,
    options: CompressionOptions,
    output_directory: PathBuf,
    sink: Arc<dyn EventSink>,
}

impl CompressionJob {
    pub fn new(
        transcoder: Arc<dyn Transcoder>,
        options: CompressionOptions,
        output_directory: PathBuf,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            transcoder,
            options,
            output_directory,
            sink,
        }
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    /// Processa un singolo clip.
    ///
    /// A failed transcode is not an error here: it comes back as `succeeded == false`
    /// and the source is left in place. Errors are reserved for a source that cannot be read.
    pub async fn invoke(&self, source: &Path, worker_id: usize) -> Result<TranscodeJobResult> {
        let output_path = PathResolver::destination(source, &self.output_directory)?;
        let source_size = tokio::fs::metadata(source)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get file info for {}: {}", source.display(), e))?
            .len();

        let hardware = self.options.uses_hardware(worker_id);
        let params = EncodeParams::for_source(
            source,
            self.options.compression_level,
            hardware,
            self.options.overwrite_existing,
        );

        let name = source.file_name().unwrap_or_default().to_string_lossy().to_string();
        self.sink.log(
            LogLevel::Job,
            &format!(
                "[~] Compressing \"{}\" ({}) with {} at quality {}.",
                name,
                format_size(source_size),
                params.codec(),
                params.quality
            ),
        );

        let failed = |reason: &str| {
            self.sink.log(LogLevel::Job, &format!("[-] Failed to compress \"{}\": {}", name, reason));
            TranscodeJobResult {
                source_path: source.to_path_buf(),
                output_path: output_path.clone(),
                source_size,
                output_size: 0,
                succeeded: false,
            }
        };

        if let Err(e) = self.transcoder.encode(source, &output_path, &params).await {
            let reason = match &e {
                CompressError::Transcode { stderr: Some(stderr), .. } => format!("{} ({})", e, stderr.trim()),
                _ => e.to_string(),
            };
            return Ok(failed(&reason));
        }

        let output_size = match tokio::fs::metadata(&output_path).await {
            Ok(metadata) => metadata.len(),
            Err(_) => return Ok(failed(&CompressError::MissingOutput(output_path.clone()).to_string())),
        };

        let result = TranscodeJobResult {
            source_path: source.to_path_buf(),
            output_path: output_path.clone(),
            source_size,
            output_size,
            succeeded: true,
        };

        let ratio = result
            .compression_ratio()
            .map(|r| format!("{:.2}%", r))
            .unwrap_or_else(|| "n/a".to_string());
        self.sink.log(
            LogLevel::Job,
            &format!(
                "[+] Compressed \"{}\": {} -> {} (ratio {}).",
                name,
                format_size(source_size),
                format_size(output_size),
                ratio
            ),
        );

        if self.options.delete_source_on_success {
            self.delete_source(source, &output_path, &name).await;
        }

        Ok(result)
    }

    /// Removes the source once the destination is confirmed on disk. Failure only logs.
    async fn delete_source(&self, source: &Path, output_path: &Path, name: &str) {
        if !output_path.exists() {
            self.sink.log(
                LogLevel::Job,
                &format!("[-] Kept \"{}\": output {} not found.", name, output_path.display()),
            );
            return;
        }

        match tokio::fs::remove_file(source).await {
            Ok(()) => self.sink.log(LogLevel::Job, &format!("[~] Deleted source \"{}\".", name)),
            Err(e) => self
                .sink
                .log(LogLevel::Job, &format!("[!] Could not delete source \"{}\": {}", name, e)),
        }
    }
}
