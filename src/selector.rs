/*!
 * Deterministic file selection
 *
 * Resolves include patterns and the union of every ignore source (built-in
 * defaults, per-directory `.gitignore` files, the always-honored
 * `.dirpackignore` file, and configured custom patterns) into a sorted list
 * of relative paths. The result is independent of filesystem enumeration
 * order.
 */

use std::fs;
use std::io;
use std::path::Path;

use glob_match::glob_match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use once_cell::sync::Lazy;

use crate::config::{MergedConfig, TOOL_IGNORE_FILE};
use crate::error::{PackError, Result};

/// Patterns excluded from every scan unless `ignore.useDefaultPatterns` is
/// disabled. Gitignore semantics: a bare name matches at any depth.
pub static DEFAULT_IGNORE_PATTERNS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version control
        ".git",
        ".svn",
        ".hg",
        ".gitignore",
        ".gitattributes",
        TOOL_IGNORE_FILE,
        // Dependencies
        "node_modules",
        "bower_components",
        "vendor",
        // Lockfiles
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "Cargo.lock",
        "composer.lock",
        "Gemfile.lock",
        "poetry.lock",
        // Build output
        "dist",
        "build",
        "out",
        "target",
        "release",
        "*.min.js",
        "*.min.css",
        // Python
        "__pycache__",
        ".pytest_cache",
        ".venv",
        "venv",
        "*.pyc",
        "*.pyo",
        "*.egg-info",
        // JavaScript / TypeScript
        "coverage",
        ".nyc_output",
        ".next",
        ".nuxt",
        "*.tsbuildinfo",
        // IDEs & editors
        ".idea",
        ".vscode",
        "*.swp",
        "*.swo",
        "*~",
        // Caches & temp
        ".cache",
        "tmp",
        "temp",
        "logs",
        "*.log",
        // OS noise
        ".DS_Store",
        "Thumbs.db",
        "desktop.ini",
        // Compiled artifacts & archives
        "*.class",
        "*.o",
        "*.obj",
        "*.exe",
        "*.dll",
        "*.so",
        "*.dylib",
        "*.zip",
        "*.tar.gz",
        "*.tgz",
    ]
});

/// Select the relative paths of all files a pack run should include.
///
/// The returned list is sorted ascending by path string, deduplicated, and
/// never contains the resolved output file.
pub fn select_files(root: &Path, config: &MergedConfig) -> Result<Vec<String>> {
    check_root_access(root)?;

    let ignore_matcher = build_ignore_matcher(root, config)?;

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_global(false)
        .git_exclude(false)
        .git_ignore(config.ignore.use_gitignore)
        .require_git(false)
        .follow_links(false);
    builder.add_custom_ignore_filename(TOOL_IGNORE_FILE);
    builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
        !ignore_matcher.matched(entry.path(), is_dir).is_ignore()
    });

    let mut paths = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if err
                    .io_error()
                    .map_or(false, |e| e.kind() == io::ErrorKind::PermissionDenied)
                {
                    return Err(PackError::Permission {
                        path: root.to_path_buf(),
                    });
                }
                return Err(selection_error(root, &err.to_string()));
            }
        };
        if !entry.file_type().map_or(false, |ft| ft.is_file()) {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        if !matches_includes(&config.include, &rel_str) {
            log::trace!("excluding {rel_str}: no include pattern matches");
            continue;
        }
        paths.push(rel_str);
    }

    // A run must never consume its own prior output.
    if let Some(output_rel) = output_relative_path(root, config) {
        paths.retain(|path| *path != output_rel);
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Verify read/traverse permission on the root before any traversal.
fn check_root_access(root: &Path) -> Result<()> {
    match fs::read_dir(root) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(PackError::Permission {
            path: root.to_path_buf(),
        }),
        Err(e) => Err(selection_error(root, &e.to_string())),
    }
}

/// Compile the default ignore list and custom patterns into one matcher,
/// built once per run. Later custom patterns may re-include (`!`) earlier
/// ones, matching gitignore precedence.
fn build_ignore_matcher(root: &Path, config: &MergedConfig) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    if config.ignore.use_default_patterns {
        for pattern in DEFAULT_IGNORE_PATTERNS.iter() {
            builder
                .add_line(None, pattern)
                .map_err(|e| selection_error(root, &e.to_string()))?;
        }
    }
    for pattern in &config.ignore.custom_patterns {
        builder.add_line(None, pattern).map_err(|e| PackError::ConfigValidation {
            message: format!("[ignore.customPatterns] invalid pattern '{pattern}': {e}"),
        })?;
    }
    builder
        .build()
        .map_err(|e| selection_error(root, &e.to_string()))
}

fn matches_includes(patterns: &[String], rel_path: &str) -> bool {
    if patterns.is_empty() {
        return true;
    }
    patterns.iter().any(|pattern| glob_match(pattern, rel_path))
}

/// The output file's path relative to the scan root, when it lies inside it.
fn output_relative_path(root: &Path, config: &MergedConfig) -> Option<String> {
    let output = Path::new(&config.output.file_path);
    let absolute = if output.is_absolute() {
        output.to_path_buf()
    } else {
        config.cwd.join(output)
    };
    let rel = absolute.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

fn selection_error(root: &Path, message: &str) -> PackError {
    PackError::Selection {
        root: root.to_path_buf(),
        message: message.to_string(),
    }
}
