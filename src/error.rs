//! Global error handling for dirpack
//!
//! This module provides a centralized error type covering every fatal
//! failure class of a pack run. Per-file problems (unreadable, binary,
//! oversized) are not errors; they convert to exclusion decisions inside
//! the collector.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::clipboard::ClipboardError;
use crate::remote::GitError;

/// Global error type for dirpack operations
#[derive(Error, Debug)]
pub enum PackError {
    /// Config file schema or value violations, listing field path and message
    #[error("Invalid configuration:\n  {message}\n\nPlease check the config file and try again.")]
    ConfigValidation { message: String },

    /// An explicit config path was given but no file exists there
    #[error("Config file not found at {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Target directory cannot be read or traversed
    #[error("Permission denied while scanning directory {}. Please check folder access permissions.", path.display())]
    Permission { path: PathBuf },

    /// A configured instruction file is missing
    #[error("Instruction file not found at {}", path.display())]
    InstructionFileNotFound { path: PathBuf },

    /// The output artifact could not be persisted
    #[error("Failed to write output file {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File selection failed during traversal
    #[error("Failed to select files in directory {}: {message}", root.display())]
    Selection { root: PathBuf, message: String },

    /// Remote repository errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Clipboard errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// Tokenizer errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Specialized Result type for dirpack operations
pub type Result<T> = std::result::Result<T, PackError>;
