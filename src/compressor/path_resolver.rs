//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output.
//! L'output è piatto: `output_directory / nome_file_sorgente`.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Destinazione di un clip: stessa base name, dentro la directory di output
    pub fn destination(source: &Path, output_directory: &Path) -> Result<PathBuf> {
        let file_name = source
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", source.display()))?;

        Ok(output_directory.join(file_name))
    }

    /// Crea la directory di output (ricorsivamente) e ne ritorna il path assoluto
    pub async fn ensure_output_directory(output_directory: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_directory).await.map_err(|e| {
            anyhow::anyhow!("Failed to create output directory {}: {}", output_directory.display(), e)
        })?;

        if !output_directory.is_dir() {
            return Err(anyhow::anyhow!("Output path is not a directory: {}", output_directory.display()));
        }

        output_directory.canonicalize().map_err(|e| {
            anyhow::anyhow!("Failed to canonicalize output dir {}: {}", output_directory.display(), e)
        })
    }
}
