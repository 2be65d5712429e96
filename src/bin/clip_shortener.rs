//! # Clip Shortener - Entry Point
//!
//! Variante precedente dello strumento: nessuna soglia di dimensione di default
//! e, con `--use-gpu`, solo il primo worker usa l'encoder hardware.

use anyhow::Result;
use compress_clips::cli::{self, Profile};

#[tokio::main]
async fn main() -> Result<()> {
    cli::run(Profile::clip_shortener()).await
}
