/*!
 * Remote repository packing support
 *
 * Expands URL shorthands, shallow-clones the repository into a temporary
 * directory, and copies the finished artifact back to the invoking
 * directory. The temporary directory is cleaned up on every exit path.
 */

use std::fs;
use std::path::Path;

use git2::build::RepoBuilder;
use git2::FetchOptions;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// Errors that can occur while packing a remote repository
#[derive(Error, Debug)]
pub enum GitError {
    /// The remote target is not a recognizable repository URL
    #[error("Invalid Git URL: {0}")]
    InvalidUrl(String),

    /// Error cloning the repository
    #[error("Failed to clone repository: {0}")]
    Clone(#[source] git2::Error),

    /// Error copying the artifact back to the invoking directory
    #[error("Failed to copy output file: {0}")]
    CopyOutput(#[source] std::io::Error),

    /// IO error during remote operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Specialized Result type for remote operations
pub type GitResult<T> = std::result::Result<T, GitError>;

static SHORTHAND_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").unwrap());

static SSH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^git@[^:/]+:[^/]+/[^/]+$").unwrap());

/// Expand supported shorthands into a cloneable URL.
///
/// `owner/repo` becomes a GitHub HTTPS URL; HTTPS URLs get a `.git`
/// suffix when missing. Anything else passes through unchanged.
pub fn format_git_url(url: &str) -> String {
    if SHORTHAND_REGEX.is_match(url) {
        log::trace!("expanding GitHub shorthand: {url}");
        return format!("https://github.com/{url}.git");
    }
    if (url.starts_with("https://") || url.starts_with("http://")) && !url.ends_with(".git") {
        return format!("{url}.git");
    }
    url.to_string()
}

/// Check whether a string names a cloneable repository.
pub fn is_git_url(url: &str) -> bool {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Url::parse(url)
            .map(|parsed| {
                parsed.host_str().is_some()
                    && parsed
                        .path_segments()
                        .map_or(false, |segments| segments.filter(|s| !s.is_empty()).count() >= 2)
            })
            .unwrap_or(false);
    }
    SSH_REGEX.is_match(url) || SHORTHAND_REGEX.is_match(url)
}

/// Shallow-clone `url` into `directory`.
pub fn clone_repository(url: &str, directory: &Path) -> GitResult<()> {
    log::trace!("cloning {} into {}", url, directory.display());
    let mut fetch_options = FetchOptions::new();
    fetch_options.depth(1);
    RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(url, directory)
        .map_err(GitError::Clone)?;
    Ok(())
}

/// Copy the artifact written inside the clone back to the caller.
pub fn copy_output_to_directory(
    source_dir: &Path,
    target_dir: &Path,
    output_file: &str,
) -> GitResult<()> {
    let source = source_dir.join(output_file);
    let target = target_dir.join(output_file);
    log::trace!(
        "copying output from {} to {}",
        source.display(),
        target.display()
    );
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&source, &target).map_err(GitError::CopyOutput)?;
    Ok(())
}
