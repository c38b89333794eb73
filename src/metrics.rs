/*!
 * Per-file character and token metrics
 *
 * Work fans out over a bounded worker pool and aggregates by path, so
 * totals never depend on completion order. The tokenizer is acquired once
 * at the start of the pass and released when every file is measured.
 */

use clap::ValueEnum;
use rayon::prelude::*;
use strum::Display;
use tiktoken_rs::CoreBPE;

use crate::error::{PackError, Result};
use crate::types::{FileMetrics, ProcessedFile};

/// Token-count encodings available for metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Display)]
pub enum TokenEncoding {
    /// GPT-4 / GPT-3.5 family encoding
    #[strum(serialize = "cl100k_base")]
    Cl100k,
    /// GPT-4o family encoding
    #[default]
    #[strum(serialize = "o200k_base")]
    O200k,
}

/// Deterministic tokenizer: same path and content, same count.
pub trait Tokenizer: Send + Sync {
    /// Count tokens in one file's transformed content.
    fn count_tokens(&self, path: &str, content: &str) -> usize;
}

/// Offline tokenizer backed by a tiktoken BPE vocabulary.
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    pub fn new(encoding: TokenEncoding) -> Result<Self> {
        let bpe = match encoding {
            TokenEncoding::Cl100k => tiktoken_rs::cl100k_base(),
            TokenEncoding::O200k => tiktoken_rs::o200k_base(),
        }
        .map_err(|e| PackError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, _path: &str, content: &str) -> usize {
        self.bpe.encode_ordinary(content).len()
    }
}

/// Measure every processed file with the given tokenizer.
///
/// `threads` bounds the worker pool, capped at the logical core count; the
/// progress callback fires between per-file units.
pub fn compute_metrics(
    files: &[ProcessedFile],
    tokenizer: &dyn Tokenizer,
    threads: usize,
    progress: &(dyn Fn(&str) + Sync),
) -> Result<Vec<FileMetrics>> {
    let workers = threads.clamp(1, num_cpus::get());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| PackError::Unexpected(format!("failed to build metrics pool: {e}")))?;

    let total = files.len();
    let metrics = pool.install(|| {
        files
            .par_iter()
            .enumerate()
            .map(|(index, file)| {
                let result = FileMetrics {
                    path: file.path.clone(),
                    char_count: file.content.chars().count(),
                    token_count: tokenizer.count_tokens(&file.path, &file.content),
                };
                progress(&format!(
                    "Calculating metrics... ({}/{}) {}",
                    index + 1,
                    total,
                    file.path
                ));
                result
            })
            .collect()
    });
    Ok(metrics)
}

/// Acquire a tiktoken tokenizer, run the metrics pass, and release it.
pub fn measure_files(
    files: &[ProcessedFile],
    encoding: TokenEncoding,
    threads: usize,
    progress: &(dyn Fn(&str) + Sync),
) -> Result<Vec<FileMetrics>> {
    log::trace!("acquiring {encoding} tokenizer");
    let tokenizer = TiktokenTokenizer::new(encoding)?;
    let metrics = compute_metrics(files, &tokenizer, threads, progress)?;
    drop(tokenizer);
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts whitespace-separated words; cheap stand-in for a BPE.
    struct WordTokenizer;

    impl Tokenizer for WordTokenizer {
        fn count_tokens(&self, _path: &str, content: &str) -> usize {
            content.split_whitespace().count()
        }
    }

    fn files() -> Vec<ProcessedFile> {
        vec![
            ProcessedFile {
                path: "a.txt".to_string(),
                content: "hello world".to_string(),
            },
            ProcessedFile {
                path: "b.txt".to_string(),
                content: "one two three".to_string(),
            },
        ]
    }

    #[test]
    fn test_char_and_token_counts() {
        let metrics = compute_metrics(&files(), &WordTokenizer, 2, &|_| {}).unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].path, "a.txt");
        assert_eq!(metrics[0].char_count, 11);
        assert_eq!(metrics[0].token_count, 2);
        assert_eq!(metrics[1].char_count, 13);
        assert_eq!(metrics[1].token_count, 3);
    }

    #[test]
    fn test_results_keyed_by_path_regardless_of_thread_count() {
        let single = compute_metrics(&files(), &WordTokenizer, 1, &|_| {}).unwrap();
        let many = compute_metrics(&files(), &WordTokenizer, 8, &|_| {}).unwrap();
        assert_eq!(single, many);
    }

    #[test]
    fn test_progress_callback_fires_per_file() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = AtomicUsize::new(0);
        compute_metrics(&files(), &WordTokenizer, 2, &|_| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_input() {
        let metrics = compute_metrics(&[], &WordTokenizer, 4, &|_| {}).unwrap();
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_tiktoken_tokenizer_is_deterministic() {
        let tokenizer = TiktokenTokenizer::new(TokenEncoding::O200k).unwrap();
        let first = tokenizer.count_tokens("a.txt", "hello world");
        let second = tokenizer.count_tokens("a.txt", "hello world");
        assert_eq!(first, second);
        assert!(first > 0);
    }
}
