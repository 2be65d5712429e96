//! Full runs through `ClipCompressor` with a fake transcoder.

use async_trait::async_trait;
use compress_clips::{
    ByteSize, ClipCompressor, CompressError, Config, EncodeParams, GpuPolicy, LogLevel, MemorySink, Transcoder,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Writes a quarter-size output and records every call
#[derive(Default)]
struct RecordingTranscoder {
    calls: Mutex<Vec<(PathBuf, EncodeParams)>>,
    fail_on: Option<String>,
    active_hardware: AtomicUsize,
    peak_hardware: AtomicUsize,
}

impl RecordingTranscoder {
    fn failing_on(name: &str) -> Self {
        Self {
            fail_on: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn inputs(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }
}

#[async_trait]
impl Transcoder for RecordingTranscoder {
    fn name(&self) -> &str {
        "recording"
    }

    async fn encode(&self, input: &Path, output: &Path, params: &EncodeParams) -> Result<(), CompressError> {
        self.calls.lock().unwrap().push((input.to_path_buf(), params.clone()));

        if params.hardware {
            let now = self.active_hardware.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_hardware.fetch_max(now, Ordering::SeqCst);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        if params.hardware {
            self.active_hardware.fetch_sub(1, Ordering::SeqCst);
        }

        let name = input.file_name().unwrap().to_string_lossy();
        if self.fail_on.as_deref() == Some(name.as_ref()) {
            return Err(CompressError::transcode(input, "exit status: 1", None));
        }

        let data = tokio::fs::read(input).await?;
        tokio::fs::write(output, &data[..data.len() / 4]).await?;
        Ok(())
    }
}

struct Workspace {
    _temp_dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

fn workspace() -> Workspace {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("clips");
    fs::create_dir(&input).unwrap();

    for name in ["one.mp4", "two.mp4", "three.mp4"] {
        fs::write(input.join(name), vec![9u8; 4096]).unwrap();
    }
    for name in ["notes.txt", "readme.txt"] {
        fs::write(input.join(name), vec![1u8; 4096]).unwrap();
    }

    let output = temp_dir.path().join("nested").join("compressed");
    Workspace {
        _temp_dir: temp_dir,
        input,
        output,
    }
}

fn config(workspace: &Workspace) -> Config {
    Config {
        file_types: vec![".mp4".to_string()],
        output_directory: workspace.output.clone(),
        threads: 2,
        minimum_size: ByteSize::new(1024),
        ..Default::default()
    }
}

fn names_in(dir: &Path) -> HashSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn compresses_matching_clips_only() {
    let workspace = workspace();
    let transcoder = Arc::new(RecordingTranscoder::default());
    let sink = Arc::new(MemorySink::new());

    let compressor = ClipCompressor::new(config(&workspace), transcoder.clone(), sink.clone()).unwrap();
    let stats = compressor.run(Some(&workspace.input)).await.unwrap();

    let mut inputs = transcoder.inputs();
    inputs.sort();
    inputs.dedup();
    assert_eq!(inputs.len(), 3);
    assert_eq!(transcoder.calls.lock().unwrap().len(), 3);

    let expected: HashSet<String> = ["one.mp4", "two.mp4", "three.mp4"].iter().map(|s| s.to_string()).collect();
    assert_eq!(names_in(&workspace.output), expected);

    assert_eq!(fs::read(workspace.input.join("notes.txt")).unwrap().len(), 4096);
    assert_eq!(fs::read(workspace.input.join("readme.txt")).unwrap().len(), 4096);
    assert_eq!(names_in(&workspace.input).len(), 5);

    assert_eq!(stats.files_attempted, 3);
    assert_eq!(stats.files_compressed, 3);
    assert_eq!(stats.overall_ratio(), Some(400.0));
    assert!(sink
        .messages_at(LogLevel::Lifecycle)
        .iter()
        .any(|m| m.contains("Compression Complete")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn one_failure_leaves_its_source_and_the_rest_finish() {
    let workspace = workspace();
    let transcoder = Arc::new(RecordingTranscoder::failing_on("two.mp4"));
    let config = Config {
        delete_after: true,
        ..config(&workspace)
    };

    let compressor = ClipCompressor::new(config, transcoder.clone(), Arc::new(MemorySink::new())).unwrap();
    let stats = compressor.run(Some(&workspace.input)).await.unwrap();

    assert_eq!(stats.files_attempted, 3);
    assert_eq!(stats.files_compressed, 2);
    assert_eq!(stats.failures, 1);

    let remaining = names_in(&workspace.input);
    assert!(remaining.contains("two.mp4"));
    assert!(!remaining.contains("one.mp4"));
    assert!(!remaining.contains("three.mp4"));
}

#[tokio::test]
async fn gpu_with_threads_does_no_work_under_reject() {
    let workspace = workspace();
    let config = Config {
        use_gpu: true,
        gpu_policy: GpuPolicy::Reject,
        ..config(&workspace)
    };
    let sink = Arc::new(MemorySink::new());

    let result = ClipCompressor::new(config, Arc::new(RecordingTranscoder::default()), sink.clone());

    assert!(result.is_err());
    assert!(!workspace.output.exists());
    assert!(sink.messages_at(LogLevel::Fatal)[0].contains("Configuration conflict"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn first_worker_policy_keeps_one_hardware_session() {
    let workspace = workspace();
    for i in 0..6 {
        fs::write(workspace.input.join(format!("extra{i}.mp4")), vec![3u8; 2048]).unwrap();
    }
    let transcoder = Arc::new(RecordingTranscoder::default());
    let config = Config {
        use_gpu: true,
        threads: 4,
        gpu_policy: GpuPolicy::FirstWorker,
        ..config(&workspace)
    };

    let compressor = ClipCompressor::new(config, transcoder.clone(), Arc::new(MemorySink::new())).unwrap();
    let stats = compressor.run(Some(&workspace.input)).await.unwrap();

    assert_eq!(stats.files_compressed, 9);
    assert!(transcoder.peak_hardware.load(Ordering::SeqCst) <= 1);
    let calls = transcoder.calls.lock().unwrap();
    assert!(calls.iter().any(|(_, p)| p.hardware));
    assert!(calls.iter().any(|(_, p)| !p.hardware));
}
