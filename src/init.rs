/*!
 * Init action
 *
 * Writes a starter `dirpack.config.json` (local or global) and, for local
 * runs, a commented `.dirpackignore` stub. Existing files are left
 * untouched and reported; the action never prompts.
 */

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{
    self, FileConfig, IgnoreLayer, OutputLayer, OutputStyle, CONFIG_FILE_NAME, TOOL_IGNORE_FILE,
};
use crate::error::{PackError, Result};

const IGNORE_FILE_TEMPLATE: &str = "\
# Add patterns to ignore here, one per line
# Example:
# *.log
# tmp/
";

/// Create the default config file and ignore file.
pub fn run_init_action(cwd: &Path, global: bool) -> Result<()> {
    let config_path = config_file_location(cwd, global)?;

    if config_path.exists() {
        println!(
            "Config file already exists at {}, leaving it untouched",
            config_path.display()
        );
    } else {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&starter_config())
            .map_err(|e| PackError::Unexpected(format!("cannot serialize config: {e}")))?;
        fs::write(&config_path, format!("{content}\n"))?;
        println!("Created config file at {}", config_path.display());
    }

    if global {
        return Ok(());
    }

    let ignore_path = cwd.join(TOOL_IGNORE_FILE);
    if ignore_path.exists() {
        println!(
            "Ignore file already exists at {}, leaving it untouched",
            ignore_path.display()
        );
    } else {
        fs::write(&ignore_path, IGNORE_FILE_TEMPLATE)?;
        println!("Created ignore file at {}", ignore_path.display());
    }
    Ok(())
}

fn config_file_location(cwd: &Path, global: bool) -> Result<PathBuf> {
    if global {
        config::global_config_path()
            .ok_or_else(|| PackError::Unexpected("cannot determine global config directory".into()))
    } else {
        Ok(cwd.join(CONFIG_FILE_NAME))
    }
}

/// Starter layer mirroring the built-in defaults, spelled out so users see
/// every available knob.
fn starter_config() -> FileConfig {
    FileConfig {
        output: OutputLayer {
            file_path: Some(OutputStyle::Plain.default_file_path().to_string()),
            style: Some(OutputStyle::Plain),
            header_text: None,
            instruction_file_path: None,
            remove_comments: Some(false),
            remove_empty_lines: Some(false),
            top_files_length: Some(5),
            show_line_numbers: Some(false),
            copy_to_clipboard: Some(false),
        },
        include: Some(Vec::new()),
        ignore: IgnoreLayer {
            use_gitignore: Some(true),
            use_default_patterns: Some(true),
            custom_patterns: Some(Vec::new()),
        },
    }
}
