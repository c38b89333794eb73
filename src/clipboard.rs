/*!
 * Clipboard support
 *
 * Copies the generated artifact to the system clipboard by piping it to
 * the first available external clipboard command for the platform.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the clipboard command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Available clipboard providers
#[derive(Debug, Clone, Copy)]
enum ClipboardProvider {
    /// Wayland clipboard
    Wayland,
    /// X11 clipboard with xclip
    Xclip,
    /// X11 clipboard with xsel
    Xsel,
    /// macOS clipboard
    MacOs,
    /// Windows clipboard (also via WSL)
    Windows,
}

impl ClipboardProvider {
    fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Wayland => ("wl-copy", &[]),
            Self::Xclip => ("xclip", &["-selection", "clipboard", "-in"]),
            Self::Xsel => ("xsel", &["-b", "-i"]),
            Self::MacOs => ("pbcopy", &[]),
            Self::Windows => ("clip.exe", &[]),
        }
    }
}

/// Copy text to the system clipboard.
///
/// Tries the platform's clipboard commands in order of preference and
/// pipes the text into the first one that exists.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let provider = detect_provider().ok_or(ClipboardError::NoClipboardFound)?;
    let (cmd, args) = provider.command();
    execute_clipboard_command(cmd, args, text)
}

/// Check if a command exists on the system PATH.
pub fn command_exists(command: &str) -> bool {
    if let Ok(paths) = env::var("PATH") {
        for path in paths.split(':') {
            if Path::new(path).join(command).exists() {
                return true;
            }
        }
    }
    false
}

fn detect_provider() -> Option<ClipboardProvider> {
    let candidates: &[ClipboardProvider] = if cfg!(target_os = "macos") {
        &[ClipboardProvider::MacOs]
    } else if cfg!(target_os = "windows") {
        &[ClipboardProvider::Windows]
    } else {
        // Linux: Wayland first, then X11 tools, then WSL interop.
        &[
            ClipboardProvider::Wayland,
            ClipboardProvider::Xclip,
            ClipboardProvider::Xsel,
            ClipboardProvider::Windows,
        ]
    };

    candidates
        .iter()
        .copied()
        .find(|provider| command_exists(provider.command().0))
}

fn execute_clipboard_command(cmd: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| ClipboardError::CommandFailed(format!("Failed to spawn {cmd}")))?;

    let stdin = child
        .stdin
        .as_mut()
        .ok_or_else(|| ClipboardError::CommandFailed(format!("Failed to open stdin for {cmd}")))?;
    stdin
        .write_all(text.as_bytes())
        .map_err(|_| ClipboardError::CommandFailed(format!("Failed to write to {cmd}")))?;

    let status = child
        .wait()
        .map_err(|_| ClipboardError::CommandFailed(format!("Failed to wait for {cmd}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{cmd} exited with status: {status}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(command_exists("ls"));
        assert!(!command_exists("nonexistentcommandxyz"));
    }

    #[test]
    fn test_provider_commands_are_well_formed() {
        for provider in [
            ClipboardProvider::Wayland,
            ClipboardProvider::Xclip,
            ClipboardProvider::Xsel,
            ClipboardProvider::MacOs,
            ClipboardProvider::Windows,
        ] {
            let (cmd, _) = provider.command();
            assert!(!cmd.is_empty());
        }
    }
}
