//! # File Discovery Module
//!
//! Questo modulo gestisce la discovery dei clip da comprimere.
//!
//! ## Responsabilità:
//! - Elenca solo i figli diretti di una directory (nessuna ricorsione)
//! - Filtra per estensione (`FilterSpec::file_types`, punto iniziale incluso)
//! - Filtra per dimensione minima (`FilterSpec::minimum_size`)
//! - Ritorna path assoluti canonici, nell'ordine di iterazione della directory
//! - Utilità per formattare dimensioni in formato leggibile
//!
//! ## Robustezza:
//! - Directory inesistente o path che punta a un file: lista vuota, nessun errore
//! - Entry illeggibili o `stat` fallite: loggate e saltate, la scansione continua
//!
//! ## Esempio:
//! ```rust,no_run
//! use compress_clips::{Discoverer, FilterSpec, TracingSink};
//! use std::sync::Arc;
//!
//! let filter = FilterSpec::new(Some(vec!["mp4".to_string()]), Some(1024));
//! let files = Discoverer::new(filter, Arc::new(TracingSink)).discover(None);
//! ```

use crate::observe::{EventSink, LogLevel};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Prefix a dot onto a bare extension (`"mp4"` becomes `".mp4"`).
pub fn normalize_extension(extension: &str) -> String {
    let extension = extension.trim();
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

/// Dotted extension of a path, matching how the filter stores them. Dotfiles have none.
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

/// Extension and size predicates applied to every candidate file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    file_types: Option<BTreeSet<String>>,
    minimum_size: Option<u64>,
}

impl FilterSpec {
    pub fn new<I, S>(file_types: Option<I>, minimum_size: Option<u64>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let file_types = file_types.map(|types| {
            types
                .into_iter()
                .map(|t| normalize_extension(t.as_ref()))
                .collect()
        });

        Self {
            file_types,
            minimum_size,
        }
    }

    pub fn file_types(&self) -> Option<&BTreeSet<String>> {
        self.file_types.as_ref()
    }

    pub fn minimum_size(&self) -> Option<u64> {
        self.minimum_size
    }

    /// Extension check. `Err` carries the offending extension for the log line.
    fn check_extension(&self, path: &Path) -> Result<(), String> {
        let Some(types) = &self.file_types else {
            return Ok(());
        };
        let extension = dotted_extension(path).unwrap_or_default();
        if types.contains(&extension) {
            Ok(())
        } else {
            Err(extension)
        }
    }

    fn check_size(&self, size: u64) -> Result<(), u64> {
        match self.minimum_size {
            Some(minimum) if size < minimum => Err(minimum),
            _ => Ok(()),
        }
    }

    fn describe_types(&self) -> String {
        self.file_types
            .as_ref()
            .map(|types| types.iter().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_default()
    }
}

/// Lists and filters candidate files in a single directory
pub struct Discoverer {
    filter: FilterSpec,
    sink: Arc<dyn EventSink>,
}

impl Discoverer {
    pub fn new(filter: FilterSpec, sink: Arc<dyn EventSink>) -> Self {
        Self { filter, sink }
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Return the accepted files in `directory` (or the working directory) as absolute paths.
    pub fn discover(&self, directory: Option<&Path>) -> Vec<PathBuf> {
        let root = match directory {
            Some(dir) => {
                self.sink.log(LogLevel::Job, &format!("[~] Created path at {}.", dir.display()));
                dir.to_path_buf()
            }
            None => match std::env::current_dir() {
                Ok(cwd) => {
                    self.sink.log(LogLevel::Job, "[~] Created path in current working directory.");
                    cwd
                }
                Err(e) => {
                    self.sink.log(LogLevel::Fatal, &format!("[!] Cannot read current working directory: {}", e));
                    return Vec::new();
                }
            },
        };

        if !root.is_dir() {
            return Vec::new();
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&root).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.sink.log(LogLevel::Discovery, &format!("[!] Skipped unreadable entry: {}", e));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(path) = self.evaluate(entry.path()) {
                files.push(path);
            }
        }

        files
    }

    /// Apply the filters to one regular file, returning its canonical path when accepted.
    fn evaluate(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name().unwrap_or_default().to_string_lossy();

        if let Err(extension) = self.filter.check_extension(path) {
            self.sink.log(
                LogLevel::Discovery,
                &format!("[-] Disqualified \"{}\" ({} != [{}]).", name, extension, self.filter.describe_types()),
            );
            return None;
        }

        let size = match std::fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                self.sink.log(LogLevel::Discovery, &format!("[!] Could not stat \"{}\": {}", name, e));
                return None;
            }
        };

        if let Err(minimum) = self.filter.check_size(size) {
            self.sink.log(
                LogLevel::Discovery,
                &format!("[-] Disqualified \"{}\" ({} < {}).", name, size, minimum),
            );
            return None;
        }

        match path.canonicalize() {
            Ok(resolved) => {
                self.sink.log(LogLevel::Discovery, &format!("[+] Discovered \"{}\".", name));
                Some(resolved)
            }
            Err(e) => {
                self.sink.log(LogLevel::Discovery, &format!("[!] Could not resolve \"{}\": {}", name, e));
                None
            }
        }
    }
}

/// Get human-readable file size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
