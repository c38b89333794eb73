/*!
 * The packaging pipeline
 *
 * Runs the stages in sequence: selection, collection, transformation,
 * rendering, artifact writing, optional clipboard copy, then metrics and
 * aggregation. Per-file work inside collection and metrics is parallel;
 * stage boundaries report progress through the callback.
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::clipboard;
use crate::collector;
use crate::config::MergedConfig;
use crate::error::{PackError, Result};
use crate::metrics::{self, TokenEncoding};
use crate::output;
use crate::report;
use crate::selector;
use crate::transform;
use crate::types::PackResult;

/// Runtime knobs that are not part of the layered configuration.
#[derive(Debug, Clone, Copy)]
pub struct PackOptions {
    /// Worker-pool bound for the metrics stage
    pub threads: usize,
    /// Tokenizer encoding for token counts
    pub encoding: TokenEncoding,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            encoding: TokenEncoding::default(),
        }
    }
}

/// Pack `root_dir` according to `config` and return the run metrics.
pub fn pack(
    root_dir: &Path,
    config: &MergedConfig,
    options: PackOptions,
    progress: &(dyn Fn(&str) + Sync),
) -> Result<PackResult> {
    let root = canonicalize_root(root_dir)?;

    progress("Searching for files...");
    let selected_paths = selector::select_files(&root, config)?;
    log::trace!("selected {} files", selected_paths.len());

    progress("Collecting files...");
    let records = collector::collect_files(&root, &selected_paths);
    log::trace!("collected {} files", records.len());

    progress("Processing files...");
    let processed = transform::process_files(records, &config.output);

    progress("Generating output...");
    let packed_paths: Vec<String> = processed.iter().map(|file| file.path.clone()).collect();
    let artifact = output::generate_output(&root, config, &processed, &packed_paths)?;

    progress("Writing output file...");
    let output_path = resolve_output_path(config);
    log::trace!("writing output to {}", output_path.display());
    fs::write(&output_path, &artifact).map_err(|source| PackError::OutputWrite {
        path: output_path.clone(),
        source,
    })?;

    if config.output.copy_to_clipboard {
        progress("Copying to clipboard...");
        clipboard::copy_to_clipboard(&artifact)?;
    }

    progress("Calculating metrics...");
    let file_metrics =
        metrics::measure_files(&processed, options.encoding, options.threads, progress)?;

    Ok(report::aggregate(file_metrics, config.output.top_files_length))
}

/// The artifact path, resolved against the configured working directory.
pub fn resolve_output_path(config: &MergedConfig) -> PathBuf {
    let path = Path::new(&config.output.file_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config.cwd.join(path)
    }
}

fn canonicalize_root(root_dir: &Path) -> Result<PathBuf> {
    fs::canonicalize(root_dir).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => PackError::Permission {
            path: root_dir.to_path_buf(),
        },
        _ => PackError::Selection {
            root: root_dir.to_path_buf(),
            message: e.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;

    #[test]
    fn test_resolve_output_path_relative() {
        let config = MergedConfig {
            cwd: PathBuf::from("/work"),
            ..Default::default()
        };
        assert_eq!(resolve_output_path(&config), PathBuf::from("/work/dirpack.txt"));
    }

    #[test]
    fn test_resolve_output_path_absolute() {
        let config = MergedConfig {
            cwd: PathBuf::from("/work"),
            output: OutputConfig {
                file_path: "/elsewhere/out.txt".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve_output_path(&config), PathBuf::from("/elsewhere/out.txt"));
    }

    #[test]
    fn test_missing_root_fails_before_writing() {
        let config = MergedConfig::default();
        let err = pack(
            Path::new("/definitely/not/here"),
            &config,
            PackOptions::default(),
            &|_| {},
        )
        .unwrap_err();
        assert!(matches!(err, PackError::Selection { .. }));
    }
}
