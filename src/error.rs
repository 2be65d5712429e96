//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `CompressError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `SizeSpec`: Stringa di dimensione non valida (es. "10" senza suffisso)
//! - `Transcode`: Il processo ffmpeg è fallito o non è partito
//! - `MissingOutput`: ffmpeg è uscito con successo ma il file di output manca
//! - `ConfigConflict`: Combinazione di opzioni non ammessa (GPU + più thread)
//! - `MissingDependency`: Tool esterno mancante (ffmpeg)
//! - `Validation`: Errori di validazione input
//!
//! ## Esempio:
//! ```rust
//! use compress_clips::CompressError;
//!
//! let err = CompressError::MissingDependency("ffmpeg".to_string());
//! assert_eq!(err.to_string(), "Dependency missing: ffmpeg");
//! ```

use std::path::PathBuf;

/// Custom error types for clip compression
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid size \"{input}\": expected digits, an optional k/m/g unit and a trailing b (e.g. 10MB)")]
    SizeSpec { input: String },

    #[error("Transcode failed for {}: {reason}", .path.display())]
    Transcode {
        path: PathBuf,
        reason: String,
        stderr: Option<String>,
    },

    #[error("Transcoder reported success but no output exists at {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Configuration conflict: {0}")]
    ConfigConflict(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config file error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompressError {
    /// Creates a transcode failure, keeping the captured stderr when there is any.
    pub fn transcode(path: impl Into<PathBuf>, reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Transcode {
            path: path.into(),
            reason: reason.into(),
            stderr: stderr.filter(|s| !s.trim().is_empty()),
        }
    }
}
