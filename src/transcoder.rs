//! # Transcoder Module
//!
//! Questo modulo definisce la capability di transcodifica e la sua
//! implementazione basata su FFmpeg.
//!
//! ## Responsabilità:
//! - Trait `Transcoder`, iniettabile (i test usano implementazioni fake)
//! - Costruzione degli argomenti ffmpeg a partire da `EncodeParams`
//! - Esecuzione del processo e conversione dei fallimenti in `CompressError`
//! - Verifica della dipendenza esterna (ffmpeg)
//!
//! ## Codec:
//! - Software: `libx265` con `-crf`
//! - Hardware: `hevc_nvenc` con `-cq` (una sola sessione alla volta)
//!
//! ## Qualità:
//! Il parametro di qualità va da 24 a 30; più basso = qualità maggiore e file più grande.
//!
//! ## Esempio:
//! ```rust,no_run
//! # async fn demo() -> Result<(), compress_clips::CompressError> {
//! use compress_clips::{EncodeParams, FfmpegTranscoder, Transcoder};
//! use std::path::Path;
//!
//! let transcoder = FfmpegTranscoder::new();
//! let params = EncodeParams::for_source(Path::new("clip.mp4"), 24, false, true);
//! transcoder.encode(Path::new("clip.mp4"), Path::new("compressed/clip.mp4"), &params).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::CompressError;
use crate::platform::PlatformCommands;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

const SOFTWARE_CODEC: &str = "libx265";
const HARDWARE_CODEC: &str = "hevc_nvenc";

/// Container name ffmpeg expects for a source extension (without the dot).
pub fn container_format(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_string_lossy().to_lowercase();
    let format = match extension.as_str() {
        "mkv" => "matroska".to_string(),
        "m4v" => "mp4".to_string(),
        "ts" => "mpegts".to_string(),
        _ => extension,
    };
    Some(format)
}

/// Per-file encoder settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeParams {
    /// Quality in [24, 30]; lower keeps more detail
    pub quality: u8,
    /// Use the hardware encoder instead of the software one
    pub hardware: bool,
    /// Output container; `None` lets ffmpeg infer it from the output name
    pub format: Option<String>,
    pub copy_metadata: bool,
    /// Replace an existing output instead of failing
    pub overwrite: bool,
}

impl EncodeParams {
    pub fn for_source(source: &Path, quality: u8, hardware: bool, overwrite: bool) -> Self {
        Self {
            quality,
            hardware,
            format: container_format(source),
            copy_metadata: true,
            overwrite,
        }
    }

    pub fn codec(&self) -> &'static str {
        if self.hardware {
            HARDWARE_CODEC
        } else {
            SOFTWARE_CODEC
        }
    }
}

/// A tool that turns one media file into a compressed copy.
#[async_trait]
pub trait Transcoder: Send + Sync {
    fn name(&self) -> &str;

    async fn encode(&self, input: &Path, output: &Path, params: &EncodeParams) -> Result<(), CompressError>;

    /// Check that the transcoder can run at all.
    async fn validate(&self) -> Result<(), CompressError> {
        Ok(())
    }
}

/// Runs the system `ffmpeg` binary
#[derive(Debug, Default, Clone)]
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }

    /// Build the ffmpeg argument list for one file.
    pub fn build_args(input: &Path, output: &Path, params: &EncodeParams) -> Vec<String> {
        let quality_flag = if params.hardware { "-cq" } else { "-crf" };

        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c:v".to_string(),
            params.codec().to_string(),
            quality_flag.to_string(),
            params.quality.to_string(),
        ];

        if params.copy_metadata {
            args.extend(["-map_metadata".to_string(), "0".to_string()]);
        }

        if let Some(ref format) = params.format {
            args.extend(["-f".to_string(), format.clone()]);
        }

        args.push(if params.overwrite { "-y" } else { "-n" }.to_string());
        args.push(output.to_string_lossy().to_string());
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn encode(&self, input: &Path, output: &Path, params: &EncodeParams) -> Result<(), CompressError> {
        let ffmpeg_cmd = PlatformCommands::instance().get_command("ffmpeg");
        let args = Self::build_args(input, output, params);

        debug!("Running {} {}", ffmpeg_cmd, args.join(" "));
        let start_time = Instant::now();

        let result = Command::new(ffmpeg_cmd)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CompressError::transcode(input, format!("failed to start {}: {}", ffmpeg_cmd, e), None))?;

        if !result.status.success() {
            return Err(CompressError::transcode(
                input,
                format!("{} exited with {}", ffmpeg_cmd, result.status),
                Some(String::from_utf8_lossy(&result.stderr).to_string()),
            ));
        }

        debug!(
            "Encoded {} in {:.1}s",
            input.file_name().unwrap_or_default().to_string_lossy(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(())
    }

    async fn validate(&self) -> Result<(), CompressError> {
        if PlatformCommands::instance().is_command_available("ffmpeg").await {
            Ok(())
        } else {
            Err(CompressError::MissingDependency(
                "ffmpeg is required for clip compression".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_container_format() {
        assert_eq!(container_format(Path::new("a.mp4")).as_deref(), Some("mp4"));
        assert_eq!(container_format(Path::new("a.MKV")).as_deref(), Some("matroska"));
        assert_eq!(container_format(Path::new("a.mov")).as_deref(), Some("mov"));
        assert_eq!(container_format(Path::new("noext")), None);
    }

    #[test]
    fn test_software_args() {
        let params = EncodeParams::for_source(Path::new("/in/clip.mp4"), 24, false, true);
        let args = FfmpegTranscoder::build_args(Path::new("/in/clip.mp4"), Path::new("/out/clip.mp4"), &params);

        let joined = args.join(" ");
        assert!(joined.contains("-i /in/clip.mp4"));
        assert!(joined.contains("-c:v libx265 -crf 24"));
        assert!(joined.contains("-map_metadata 0"));
        assert!(joined.contains("-f mp4"));
        assert_eq!(args[args.len() - 2], "-y");
        assert_eq!(args.last().map(String::as_str), Some("/out/clip.mp4"));
    }

    #[test]
    fn test_hardware_args_without_overwrite() {
        let params = EncodeParams::for_source(Path::new("clip.mkv"), 30, true, false);
        let args = FfmpegTranscoder::build_args(Path::new("clip.mkv"), &PathBuf::from("out.mkv"), &params);

        let joined = args.join(" ");
        assert!(joined.contains("-c:v hevc_nvenc -cq 30"));
        assert!(joined.contains("-f matroska"));
        assert!(args.contains(&"-n".to_string()));
        assert!(!args.contains(&"-y".to_string()));
    }

    #[test]
    fn test_name() {
        assert_eq!(FfmpegTranscoder::new().name(), "ffmpeg");
    }
}
