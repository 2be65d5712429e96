//! # Command Line Entry Point
//!
//! Entry point condiviso dai due binari.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Costruzione della `Config` (profilo → file JSON opzionale → flag CLI)
//! - Avvio del `ClipCompressor`
//!
//! ## Profili:
//! - `compress-clips`: dimensione minima 1MB, GPU con più thread rifiutata
//! - `clip-shortener`: dimensione minima 0B, GPU solo sul primo worker
//!
//! ## Esempio di utilizzo:
//! ```bash
//! compress-clips ~/Videos/clips --filetypes mp4,mkv --threads 4 --compression 26 -vv
//! ```

use crate::{
    compressor::ClipCompressor,
    config::{Config, GpuPolicy},
    observe::{EventSink, LogLevel, TracingSink},
    size::ByteSize,
    transcoder::FfmpegTranscoder,
};
use anyhow::Result;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Default values that differ between the two binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub about: &'static str,
    pub default_minimum_size: ByteSize,
    pub default_gpu_policy: GpuPolicy,
}

impl Profile {
    pub const fn compress_clips() -> Self {
        Self {
            name: "compress-clips",
            about: "Compress every matching clip in a directory with ffmpeg",
            default_minimum_size: ByteSize::new(1024 * 1024),
            default_gpu_policy: GpuPolicy::Reject,
        }
    }

    pub const fn clip_shortener() -> Self {
        Self {
            name: "clip-shortener",
            about: "Shrink clips in a directory with ffmpeg, one GPU session at most",
            default_minimum_size: ByteSize::new(0),
            default_gpu_policy: GpuPolicy::FirstWorker,
        }
    }

    /// Defaults before any config file or flag is applied
    pub fn base_config(&self) -> Config {
        Config {
            minimum_size: self.default_minimum_size,
            gpu_policy: self.default_gpu_policy,
            ..Default::default()
        }
    }
}

#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Directory to scan (defaults to the current directory)
    pub directory: Option<PathBuf>,

    /// File extensions to include; repeatable or comma separated [default: .mp4]
    #[arg(short = 't', long = "filetypes", value_delimiter = ',')]
    pub file_types: Vec<String>,

    /// Where compressed clips are written; created if missing [default: compressed]
    #[arg(short, long)]
    pub output_directory: Option<PathBuf>,

    /// Number of parallel workers [default: 1]
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Skip clips smaller than this, e.g. 0B, 500KB, 1MB
    #[arg(short, long)]
    pub minimum_size: Option<ByteSize>,

    /// Encoder quality, 24-30; lower keeps more detail [default: 24]
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(24..=30))]
    pub compression: Option<u8>,

    /// Replace existing compressed clips (default)
    #[arg(long, overrides_with = "no_overwrite")]
    pub overwrite: bool,

    /// Leave existing compressed clips alone
    #[arg(long, overrides_with = "overwrite")]
    pub no_overwrite: bool,

    /// Delete each source clip after it compressed successfully
    #[arg(long, overrides_with = "no_delete_after")]
    pub delete_after: bool,

    /// Keep source clips (default)
    #[arg(long, overrides_with = "delete_after")]
    pub no_delete_after: bool,

    /// Encode on the GPU (a single hardware session)
    #[arg(long)]
    pub use_gpu: bool,

    /// How --use-gpu combines with more than one thread
    #[arg(long, value_enum)]
    pub gpu_policy: Option<GpuPolicy>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Load base settings from a JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the effective settings to a JSON file and exit
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// More output; repeat up to three times
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parse the process arguments under the profile's name and description
    pub fn parse_for(profile: &Profile) -> Result<Self> {
        let matches = Self::command().name(profile.name).about(profile.about).get_matches();
        Ok(Self::from_arg_matches(&matches)?)
    }

    /// Layer the explicitly given flags over `config`
    pub fn apply(&self, config: &mut Config) {
        if !self.file_types.is_empty() {
            config.file_types = self.file_types.clone();
        }
        if let Some(ref output_directory) = self.output_directory {
            config.output_directory = output_directory.clone();
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(minimum_size) = self.minimum_size {
            config.minimum_size = minimum_size;
        }
        if let Some(compression) = self.compression {
            config.compression = compression;
        }
        if self.overwrite {
            config.overwrite = true;
        } else if self.no_overwrite {
            config.overwrite = false;
        }
        if self.delete_after {
            config.delete_after = true;
        } else if self.no_delete_after {
            config.delete_after = false;
        }
        if self.use_gpu {
            config.use_gpu = true;
        }
        if let Some(policy) = self.gpu_policy {
            config.gpu_policy = policy;
        }
        if self.progress {
            config.show_progress = true;
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_logging(verbose: u8) -> Result<()> {
    let level = LogLevel::threshold(verbose).level_filter();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Profile defaults, then the optional config file, then the explicit flags
pub async fn build_config(profile: &Profile, args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => Config::from_file_over(path, profile.base_config()).await?,
        None => profile.base_config(),
    };
    args.apply(&mut config);
    Ok(config)
}

/// Full CLI run for one of the binaries
pub async fn run(profile: Profile) -> Result<()> {
    let args = Args::parse_for(&profile)?;
    init_logging(args.verbose)?;

    let sink: Arc<dyn EventSink> = Arc::new(TracingSink);

    let config = build_config(&profile, &args).await?;

    if let Some(ref path) = args.save_config {
        config.validate()?;
        config.save_to_file(path).await?;
        sink.log(LogLevel::Lifecycle, &format!("[~] Saved configuration to {}.", path.display()));
        return Ok(());
    }

    let compressor = ClipCompressor::new(config, Arc::new(FfmpegTranscoder::new()), sink)?;
    compressor.run(args.directory.as_deref()).await?;

    Ok(())
}
