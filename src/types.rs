/*!
 * Core data types flowing through the packaging pipeline
 */

use std::collections::HashMap;

/// A file that survived selection and the binary/size filter.
///
/// Produced by the collector, consumed by the transformer; never reused
/// across runs.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path relative to the scan root, `/`-separated
    pub path: String,
    /// Decoded text content
    pub content: String,
    /// Size in bytes on disk
    pub size: u64,
}

/// A file after content transformation, ready for rendering and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    /// Path relative to the scan root, `/`-separated
    pub path: String,
    /// Transformed text content
    pub content: String,
}

/// Per-file size metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetrics {
    /// Path relative to the scan root
    pub path: String,
    /// Number of characters in the transformed content
    pub char_count: usize,
    /// Number of tokens in the transformed content
    pub token_count: usize,
}

/// Aggregated result of a pack run.
#[derive(Debug, Clone, Default)]
pub struct PackResult {
    /// Number of files included in the artifact
    pub total_files: usize,
    /// Sum of character counts across all files
    pub total_characters: usize,
    /// Sum of token counts across all files
    pub total_tokens: usize,
    /// Character count per relative path
    pub file_char_counts: HashMap<String, usize>,
    /// Token count per relative path
    pub file_token_counts: HashMap<String, usize>,
    /// Largest files by character count, ties in selection order
    pub top_files: Vec<FileMetrics>,
}
