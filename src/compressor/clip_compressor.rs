//! # Clip Compressor Main Orchestrator
//!
//! Orchestratore principale che delega responsabilità ai moduli specializzati:
//! discovery dei file, pool di worker, job di compressione e statistiche.
//!
//! ## Flusso:
//! 1. Valida la configurazione (conflitto GPU/thread incluso)
//! 2. Controlla che il transcoder sia disponibile
//! 3. Crea la directory di output
//! 4. Discovery dei clip
//! 5. Avvia il pool e attende il join di tutti i worker
//! 6. Stampa le statistiche finali

use crate::{
    compressor::{
        compression_job::{CompressionJob, TranscodeJobResult},
        path_resolver::PathResolver,
        worker_pool::WorkerPool,
    },
    config::Config,
    discovery::Discoverer,
    observe::{EventSink, LogLevel},
    progress::{ProgressManager, RunStats},
    transcoder::Transcoder,
};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Orchestratore principale
pub struct ClipCompressor {
    config: Config,
    transcoder: Arc<dyn Transcoder>,
    sink: Arc<dyn EventSink>,
}

impl ClipCompressor {
    /// Crea nuova istanza; fallisce subito se la configurazione non è valida
    pub fn new(config: Config, transcoder: Arc<dyn Transcoder>, sink: Arc<dyn EventSink>) -> Result<Self> {
        if let Err(e) = config.validate() {
            sink.log(LogLevel::Fatal, &format!("[!] {}", e));
            return Err(e);
        }

        Ok(Self {
            config,
            transcoder,
            sink,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Esegue la compressione dei clip in `directory` (o nella working directory)
    pub async fn run(&self, directory: Option<&Path>) -> Result<RunStats> {
        let start_time = Instant::now();

        if let Err(e) = self.transcoder.validate().await {
            self.sink.log(LogLevel::Fatal, &format!("[!] {}", e));
            return Err(e.into());
        }

        let output_directory = PathResolver::ensure_output_directory(&self.config.output_directory).await?;
        self.log_configuration(&output_directory);

        let discoverer = Discoverer::new(self.config.filter_spec(), self.sink.clone());
        let files = discoverer.discover(directory);

        if files.is_empty() {
            self.sink.log(LogLevel::Lifecycle, "[~] No clips found to compress.");
            return Ok(RunStats::new());
        }

        self.sink.log(LogLevel::Lifecycle, &format!("[~] Found {} clip(s) to compress.", files.len()));

        let progress = ProgressManager::new(files.len() as u64, self.config.show_progress);
        let job = Arc::new(CompressionJob::new(
            self.transcoder.clone(),
            self.config.compression_options(),
            output_directory,
            self.sink.clone(),
        ));

        let pool = WorkerPool::new(self.sink.clone());
        let job_progress = progress.clone();
        let outcome = pool
            .run(files, self.config.threads, move |worker_id, path| {
                let job = job.clone();
                let progress = job_progress.clone();
                async move {
                    let result = job.invoke(&path, worker_id).await;
                    progress.update(&path.file_name().unwrap_or_default().to_string_lossy());
                    result
                }
            })
            .await;

        let mut stats = RunStats::new();
        for result in &outcome.completed {
            stats.record(result);
        }
        for _ in &outcome.failed {
            stats.add_error();
        }

        progress.finish(&stats.format_summary());
        self.print_final_stats(&stats, &outcome.completed, start_time.elapsed().as_secs_f64());

        Ok(stats)
    }

    /// Logga configurazione
    fn log_configuration(&self, output_directory: &Path) {
        let options = self.config.compression_options();
        let lines = [
            format!("Output directory: {}", output_directory.display()),
            format!("File types: {}", self.config.normalized_file_types().join(", ")),
            format!("Minimum size: {} bytes", self.config.minimum_size.bytes()),
            format!("Threads: {}", self.config.threads),
            format!("Compression: {} ({})", options.compression_level, self.transcoder.name()),
            format!(
                "Overwrite: {} | Delete after: {} | GPU: {} ({:?})",
                options.overwrite_existing,
                options.delete_source_on_success,
                options.use_hardware_acceleration,
                self.config.gpu_policy
            ),
        ];

        for line in lines {
            self.sink.log(LogLevel::Lifecycle, &format!("[~] {}", line));
        }
    }

    /// Stampa statistiche finali
    fn print_final_stats(&self, stats: &RunStats, results: &[TranscodeJobResult], duration: f64) {
        for result in results.iter().filter(|r| !r.succeeded) {
            self.sink.log(
                LogLevel::Lifecycle,
                &format!("[-] Left unconverted: {}", result.source_path.display()),
            );
        }

        self.sink.log(LogLevel::Lifecycle, "=== Compression Complete ===");
        self.sink.log(LogLevel::Lifecycle, &stats.format_summary());
        self.sink.log(LogLevel::Lifecycle, &format!("Elapsed: {:.1}s", duration));
    }
}
