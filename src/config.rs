//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di compressione
//! - Fornisce validazione dei parametri, incluso il conflitto GPU/thread
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Deriva i valori read-only condivisi dai worker (`FilterSpec`, `CompressionOptions`)
//!
//! ## Parametri di configurazione:
//! - `file_types`: Estensioni da includere (default: `.mp4`)
//! - `output_directory`: Directory di output (default: `compressed`)
//! - `threads`: Numero di worker richiesti (default: 1)
//! - `minimum_size`: Dimensione minima dei file sorgente (default: 1MB)
//! - `compression`: Qualità passata al transcoder (24-30, default: 24)
//! - `overwrite`: Sovrascrive output esistenti (default: true)
//! - `delete_after`: Elimina il sorgente dopo una compressione riuscita (default: false)
//! - `use_gpu`: Richiede encoding hardware (default: false)
//! - `gpu_policy`: Cosa fare con GPU + più thread (default: reject)
//!
//! ## Politica GPU:
//! L'encoder hardware supporta una sola sessione alla volta.
//! - `Reject`: GPU con più di un thread è un errore fatale prima di qualsiasi lavoro
//! - `FirstWorker`: solo il worker 0 usa la GPU, gli altri usano il codec software
//!
//! ## Esempio:
//! ```rust
//! use compress_clips::Config;
//!
//! let config = Config {
//!     threads: 4,
//!     compression: 28,
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! ```

use crate::discovery::{normalize_extension, FilterSpec};
use crate::error::CompressError;
use crate::size::ByteSize;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MIN_COMPRESSION: u8 = 24;
pub const MAX_COMPRESSION: u8 = 30;

/// How a hardware-encode request combines with several workers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GpuPolicy {
    /// Refuse to start when the GPU is requested with more than one thread
    #[default]
    Reject,
    /// Only the first worker encodes on the GPU
    FirstWorker,
}

/// Configuration for clip compression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dotted extensions to include
    pub file_types: Vec<String>,
    /// Directory receiving the compressed clips
    pub output_directory: PathBuf,
    /// Requested worker count
    pub threads: usize,
    /// Skip sources smaller than this
    pub minimum_size: ByteSize,
    /// Quality handed to the encoder (24-30)
    pub compression: u8,
    /// Replace existing outputs
    pub overwrite: bool,
    /// Delete the source after a successful compression
    pub delete_after: bool,
    /// Request hardware-accelerated encoding
    pub use_gpu: bool,
    pub gpu_policy: GpuPolicy,
    /// Draw a progress bar while compressing
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_types: vec![".mp4".to_string()],
            output_directory: PathBuf::from("compressed"),
            threads: 1,
            minimum_size: ByteSize::new(1024 * 1024),
            compression: MIN_COMPRESSION,
            overwrite: true,
            delete_after: false,
            use_gpu: false,
            gpu_policy: GpuPolicy::Reject,
            show_progress: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(MIN_COMPRESSION..=MAX_COMPRESSION).contains(&self.compression) {
            return Err(CompressError::Validation(format!(
                "Compression must be between {} and {} (got {})",
                MIN_COMPRESSION, MAX_COMPRESSION, self.compression
            ))
            .into());
        }

        if self.threads == 0 {
            return Err(CompressError::Validation("Number of threads must be greater than 0".to_string()).into());
        }

        if self.file_types.iter().all(|t| t.trim().trim_start_matches('.').is_empty()) {
            return Err(CompressError::Validation("At least one file type is required".to_string()).into());
        }

        if self.use_gpu && self.threads > 1 && self.gpu_policy == GpuPolicy::Reject {
            return Err(CompressError::ConfigConflict(format!(
                "GPU encoding supports a single session; use --threads 1 with --use-gpu (requested {} threads)",
                self.threads
            ))
            .into());
        }

        Ok(())
    }

    /// Extension and size filter for discovery
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec::new(Some(self.normalized_file_types()), Some(self.minimum_size.bytes()))
    }

    /// Encoder options shared read-only by every worker
    pub fn compression_options(&self) -> CompressionOptions {
        CompressionOptions {
            compression_level: self.compression,
            overwrite_existing: self.overwrite,
            delete_source_on_success: self.delete_after,
            use_hardware_acceleration: self.use_gpu,
        }
    }

    /// File types with a leading dot, duplicates removed, order kept.
    pub fn normalized_file_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for t in self.file_types.iter().map(|t| normalize_extension(t)) {
            if t.len() > 1 && !types.contains(&t) {
                types.push(t);
            }
        }
        types
    }

    /// Load configuration from file, on top of the stock defaults
    pub async fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_over(path, Self::default()).await
    }

    /// Load configuration from file, filling the fields it leaves out from `base`.
    /// A missing file yields `base` unchanged. The result is not validated; callers
    /// validate after layering command line flags.
    pub async fn from_file_over(path: &Path, base: Config) -> Result<Self> {
        if !path.exists() {
            return Ok(base);
        }

        let content = tokio::fs::read_to_string(path).await?;
        let overrides: serde_json::Value = serde_json::from_str(&content).map_err(CompressError::from)?;
        let serde_json::Value::Object(overrides) = overrides else {
            return Err(CompressError::Validation(format!(
                "Config file {} must contain a JSON object",
                path.display()
            ))
            .into());
        };

        let mut merged = serde_json::to_value(&base).map_err(CompressError::from)?;
        if let serde_json::Value::Object(ref mut fields) = merged {
            fields.extend(overrides);
        }

        Ok(serde_json::from_value(merged).map_err(CompressError::from)?)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Encoder settings derived from `Config`, read-only for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    pub compression_level: u8,
    pub overwrite_existing: bool,
    pub delete_source_on_success: bool,
    pub use_hardware_acceleration: bool,
}

impl CompressionOptions {
    /// Whether the given worker gets the hardware encoder. Only worker 0 ever does.
    pub fn uses_hardware(&self, worker_id: usize) -> bool {
        self.use_hardware_acceleration && worker_id == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.compression = 23;
        assert!(config.validate().is_err());

        config.compression = 31;
        assert!(config.validate().is_err());

        config.compression = 30;
        config.threads = 0;
        assert!(config.validate().is_err());

        config.threads = 2;
        config.file_types = vec![".".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.file_types, vec![".mp4"]);
        assert_eq!(config.output_directory, PathBuf::from("compressed"));
        assert_eq!(config.threads, 1);
        assert_eq!(config.minimum_size.bytes(), 1024 * 1024);
        assert_eq!(config.compression, 24);
        assert!(config.overwrite);
        assert!(!config.delete_after);
        assert!(!config.use_gpu);
    }

    #[test]
    fn test_gpu_with_threads_is_rejected() {
        let config = Config {
            use_gpu: true,
            threads: 2,
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CompressError>(),
            Some(CompressError::ConfigConflict(_))
        ));

        let single = Config { threads: 1, ..config };
        assert!(single.validate().is_ok());
    }

    #[test]
    fn test_gpu_first_worker_policy_accepts_threads() {
        let config = Config {
            use_gpu: true,
            threads: 4,
            gpu_policy: GpuPolicy::FirstWorker,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let options = config.compression_options();
        assert!(options.uses_hardware(0));
        assert!(!options.uses_hardware(1));
        assert!(!options.uses_hardware(3));
    }

    #[test]
    fn test_no_worker_uses_hardware_without_gpu() {
        let options = Config::default().compression_options();
        assert!(!options.uses_hardware(0));
    }

    #[test]
    fn test_normalized_file_types() {
        let config = Config {
            file_types: vec!["mp4".to_string(), ".mp4".to_string(), "mkv".to_string(), "".to_string()],
            ..Default::default()
        };
        assert_eq!(config.normalized_file_types(), vec![".mp4", ".mkv"]);
        assert!(config.filter_spec().file_types().unwrap().contains(".mkv"));
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            file_types: vec![".mkv".to_string()],
            threads: 3,
            minimum_size: ByteSize::new(0),
            compression: 27,
            delete_after: true,
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config, original_config);
    }

    #[tokio::test]
    async fn test_config_file_accepts_size_spec_and_partial_fields() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "minimum_size": "5 KB", "gpu_policy": "first-worker" }"#)
            .await
            .unwrap();

        let loaded = Config::from_file(&config_path).await.unwrap();
        assert_eq!(loaded.minimum_size.bytes(), 5 * 1024);
        assert_eq!(loaded.gpu_policy, GpuPolicy::FirstWorker);
        assert_eq!(loaded.threads, 1);
    }

    #[tokio::test]
    async fn test_config_file_fills_gaps_from_base() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "threads": 4 }"#).await.unwrap();

        let base = Config {
            minimum_size: ByteSize::new(0),
            gpu_policy: GpuPolicy::FirstWorker,
            ..Default::default()
        };
        let loaded = Config::from_file_over(&config_path, base.clone()).await.unwrap();

        assert_eq!(loaded, Config { threads: 4, ..base.clone() });
        assert_eq!(Config::from_file_over(&temp_dir.path().join("absent.json"), base.clone()).await.unwrap(), base);
    }

    #[tokio::test]
    async fn test_config_file_is_not_validated_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "use_gpu": true, "threads": 4 }"#).await.unwrap();

        let mut loaded = Config::from_file(&config_path).await.unwrap();
        assert!(loaded.validate().is_err());

        loaded.threads = 1;
        assert!(loaded.validate().is_ok());
    }

    #[tokio::test]
    async fn test_config_file_must_be_an_object() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, "[1, 2]").await.unwrap();

        assert!(Config::from_file(&config_path).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_config_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::from_file(&temp_dir.path().join("absent.json")).await.unwrap();
        assert_eq!(loaded, Config::default());
    }
}
