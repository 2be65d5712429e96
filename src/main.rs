//! # Compress Clips - Main Entry Point
//!
//! Punto di ingresso del binario `compress-clips`.
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, filetypes, threads, compression, etc.)
//! 2. Configura il logging (soglia da `-v` ripetuto)
//! 3. Valida la configurazione: GPU con più thread viene rifiutata
//! 4. Crea il ClipCompressor e avvia la compressione
//!
//! ## Esempio di utilizzo:
//! ```bash
//! compress-clips /path/to/clips --threads 4 --compression 26 --delete-after -vv
//! ```

use anyhow::Result;
use compress_clips::cli::{self, Profile};

#[tokio::main]
async fn main() -> Result<()> {
    cli::run(Profile::compress_clips()).await
}
