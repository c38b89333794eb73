/*!
 * Configuration handling for dirpack
 *
 * Three layers feed a pack run: built-in defaults, an optional JSON config
 * file, and command-line overrides. Scalar fields resolve with CLI over
 * file over default precedence, key-by-key inside nested blocks; the list
 * fields (`include`, `ignore.customPatterns`) concatenate across layers in
 * default, file, CLI order with duplicates preserved.
 */

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};
use crate::metrics::TokenEncoding;

/// File name probed for configuration in the working directory.
pub const CONFIG_FILE_NAME: &str = "dirpack.config.json";

/// Tool-specific ignore file, honored in every scanned directory.
pub const TOOL_IGNORE_FILE: &str = ".dirpackignore";

/// Output artifact style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Plain text with `=` separators
    #[default]
    Plain,
    /// XML-tagged sections
    Xml,
    /// Markdown with fenced code blocks
    Markdown,
}

impl OutputStyle {
    /// Default artifact file name when no layer sets `output.filePath`.
    pub fn default_file_path(self) -> &'static str {
        match self {
            OutputStyle::Plain => "dirpack.txt",
            OutputStyle::Xml => "dirpack.xml",
            OutputStyle::Markdown => "dirpack.md",
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStyle::Plain => write!(f, "plain"),
            OutputStyle::Xml => write!(f, "xml"),
            OutputStyle::Markdown => write!(f, "markdown"),
        }
    }
}

/// Command-line arguments for dirpack
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "dirpack",
    version,
    about = "Pack a directory tree into a single text artifact for LLM context",
    long_about = "Packs a directory's structure and file contents into one plain, XML, or Markdown file, designed for providing context to Large Language Models (LLMs)."
)]
pub struct Args {
    /// Target directory to pack
    #[clap(default_value = ".")]
    pub directory: String,

    /// Output file path (overrides the configured one)
    #[clap(short, long)]
    pub output: Option<String>,

    /// Comma-separated list of include glob patterns
    #[clap(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Comma-separated list of additional ignore patterns
    #[clap(short, long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Path to a custom config file
    #[clap(short, long)]
    pub config: Option<String>,

    /// Output style
    #[clap(long, value_enum)]
    pub style: Option<OutputStyle>,

    /// Number of files shown in the top-files report
    #[clap(long)]
    pub top_files_len: Option<usize>,

    /// Prefix each content line with its line number
    #[clap(long)]
    pub output_show_line_numbers: bool,

    /// Copy the generated artifact to the system clipboard
    #[clap(long)]
    pub copy: bool,

    /// Strip comments from file contents
    #[clap(long)]
    pub remove_comments: bool,

    /// Drop whitespace-only lines from file contents
    #[clap(long)]
    pub remove_empty_lines: bool,

    /// Text placed in the artifact header block
    #[clap(long)]
    pub header_text: Option<String>,

    /// File whose content is appended as an instruction block
    #[clap(long)]
    pub instruction_file: Option<String>,

    /// Do not honor .gitignore files
    #[clap(long)]
    pub no_gitignore: bool,

    /// Do not apply the built-in default ignore patterns
    #[clap(long)]
    pub no_default_patterns: bool,

    /// Pack a remote Git repository instead of a local directory
    #[clap(long, value_name = "URL")]
    pub remote: Option<String>,

    /// Number of worker threads (defaults to the logical core count)
    #[clap(long)]
    pub threads: Option<usize>,

    /// Tokenizer encoding used for token counts
    #[clap(long, value_enum)]
    pub encoding: Option<TokenEncoding>,

    /// Create a default config file and ignore file, then exit
    #[clap(long)]
    pub init: bool,

    /// With --init, write the config to the global location
    #[clap(long)]
    pub global: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// Enable trace logging
    #[clap(short, long)]
    pub verbose: bool,
}

/// `output` block of a config layer; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct OutputLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<OutputStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_empty_lines: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_files_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_line_numbers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_to_clipboard: Option<bool>,
}

/// `ignore` block of a config layer; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct IgnoreLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_gitignore: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_default_patterns: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_patterns: Option<Vec<String>>,
}

/// One configuration layer as read from a file or built from CLI options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub output: OutputLayer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    pub ignore: IgnoreLayer,
}

/// The CLI layer shares the file layer's shape.
pub type CliConfig = FileConfig;

/// Fully resolved `output` block.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub file_path: String,
    pub style: OutputStyle,
    /// No default; absence means no header block
    pub header_text: Option<String>,
    /// No default; absence means no instruction block
    pub instruction_file_path: Option<String>,
    pub remove_comments: bool,
    pub remove_empty_lines: bool,
    pub top_files_length: usize,
    pub show_line_numbers: bool,
    pub copy_to_clipboard: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_path: OutputStyle::Plain.default_file_path().to_string(),
            style: OutputStyle::Plain,
            header_text: None,
            instruction_file_path: None,
            remove_comments: false,
            remove_empty_lines: false,
            top_files_length: 5,
            show_line_numbers: false,
            copy_to_clipboard: false,
        }
    }
}

/// Fully resolved `ignore` block.
#[derive(Debug, Clone, PartialEq)]
pub struct IgnoreConfig {
    pub use_gitignore: bool,
    pub use_default_patterns: bool,
    pub custom_patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            use_gitignore: true,
            use_default_patterns: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// Merged configuration: every defaulted field holds a concrete value.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    /// Directory the output path resolves against
    pub cwd: PathBuf,
    pub output: OutputConfig,
    pub include: Vec<String>,
    pub ignore: IgnoreConfig,
}

impl Default for MergedConfig {
    fn default() -> Self {
        Self {
            cwd: PathBuf::from("."),
            output: OutputConfig::default(),
            include: Vec::new(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl MergedConfig {
    /// Reject values no pack run can work with, naming the field path.
    fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.output.file_path.trim().is_empty() {
            problems.push("[output.filePath] must not be empty".to_string());
        }
        if self.include.iter().any(|p| p.trim().is_empty()) {
            problems.push("[include] patterns must not be empty".to_string());
        }
        if self.ignore.custom_patterns.iter().any(|p| p.trim().is_empty()) {
            problems.push("[ignore.customPatterns] patterns must not be empty".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(PackError::ConfigValidation {
                message: problems.join("\n  "),
            })
        }
    }
}

/// Location of the global config file, if a config directory exists.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dirpack").join(CONFIG_FILE_NAME))
}

/// Load the file configuration layer.
///
/// Resolution order: explicit path (fatal when missing) -> default-named
/// file in `cwd` -> global config location -> empty layer.
pub fn load_file_config(cwd: &Path, explicit_path: Option<&str>) -> Result<FileConfig> {
    if let Some(path) = explicit_path {
        let full_path = cwd.join(path);
        log::trace!("loading config from explicit path {}", full_path.display());
        if !full_path.is_file() {
            return Err(PackError::ConfigNotFound { path: full_path });
        }
        return read_config_file(&full_path);
    }

    let local_path = cwd.join(CONFIG_FILE_NAME);
    if local_path.is_file() {
        log::trace!("loading local config from {}", local_path.display());
        return read_config_file(&local_path);
    }

    if let Some(global_path) = global_config_path() {
        if global_path.is_file() {
            log::trace!("loading global config from {}", global_path.display());
            return read_config_file(&global_path);
        }
    }

    log::trace!("no config file found, using defaults");
    Ok(FileConfig::default())
}

fn read_config_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path).map_err(|e| PackError::ConfigValidation {
        message: format!("[{}] cannot read config file: {}", path.display(), e),
    })?;
    serde_json::from_str(&content).map_err(|e| PackError::ConfigValidation {
        message: format!("[{}] {}", path.display(), e),
    })
}

/// Turn parsed CLI options into a configuration layer.
pub fn build_cli_config(args: &Args) -> CliConfig {
    let mut cli = CliConfig::default();
    if let Some(output) = &args.output {
        cli.output.file_path = Some(output.clone());
    }
    if let Some(style) = args.style {
        cli.output.style = Some(style);
    }
    if let Some(header) = &args.header_text {
        cli.output.header_text = Some(header.clone());
    }
    if let Some(instruction) = &args.instruction_file {
        cli.output.instruction_file_path = Some(instruction.clone());
    }
    if args.remove_comments {
        cli.output.remove_comments = Some(true);
    }
    if args.remove_empty_lines {
        cli.output.remove_empty_lines = Some(true);
    }
    if let Some(len) = args.top_files_len {
        cli.output.top_files_length = Some(len);
    }
    if args.output_show_line_numbers {
        cli.output.show_line_numbers = Some(true);
    }
    if args.copy {
        cli.output.copy_to_clipboard = Some(true);
    }
    if !args.include.is_empty() {
        cli.include = Some(args.include.clone());
    }
    if !args.ignore.is_empty() {
        cli.ignore.custom_patterns = Some(args.ignore.clone());
    }
    if args.no_gitignore {
        cli.ignore.use_gitignore = Some(false);
    }
    if args.no_default_patterns {
        cli.ignore.use_default_patterns = Some(false);
    }
    cli
}

/// Merge the default, file, and CLI layers into one resolved configuration.
///
/// Explicit per-field merge: scalars take CLI over file over default; the
/// list fields concatenate default ++ file ++ CLI without deduplication.
pub fn merge_configs(cwd: PathBuf, file: &FileConfig, cli: &CliConfig) -> Result<MergedConfig> {
    let default_output = OutputConfig::default();
    let default_ignore = IgnoreConfig::default();

    let style = cli
        .output
        .style
        .or(file.output.style)
        .unwrap_or(default_output.style);

    // When no layer names an output file, the style decides it.
    let file_path = cli
        .output
        .file_path
        .clone()
        .or_else(|| file.output.file_path.clone())
        .unwrap_or_else(|| {
            let derived = style.default_file_path().to_string();
            log::trace!("output file path derived from style: {derived}");
            derived
        });

    let output = OutputConfig {
        file_path,
        style,
        header_text: cli
            .output
            .header_text
            .clone()
            .or_else(|| file.output.header_text.clone()),
        instruction_file_path: cli
            .output
            .instruction_file_path
            .clone()
            .or_else(|| file.output.instruction_file_path.clone()),
        remove_comments: cli
            .output
            .remove_comments
            .or(file.output.remove_comments)
            .unwrap_or(default_output.remove_comments),
        remove_empty_lines: cli
            .output
            .remove_empty_lines
            .or(file.output.remove_empty_lines)
            .unwrap_or(default_output.remove_empty_lines),
        top_files_length: cli
            .output
            .top_files_length
            .or(file.output.top_files_length)
            .unwrap_or(default_output.top_files_length),
        show_line_numbers: cli
            .output
            .show_line_numbers
            .or(file.output.show_line_numbers)
            .unwrap_or(default_output.show_line_numbers),
        copy_to_clipboard: cli
            .output
            .copy_to_clipboard
            .or(file.output.copy_to_clipboard)
            .unwrap_or(default_output.copy_to_clipboard),
    };

    let ignore = IgnoreConfig {
        use_gitignore: cli
            .ignore
            .use_gitignore
            .or(file.ignore.use_gitignore)
            .unwrap_or(default_ignore.use_gitignore),
        use_default_patterns: cli
            .ignore
            .use_default_patterns
            .or(file.ignore.use_default_patterns)
            .unwrap_or(default_ignore.use_default_patterns),
        custom_patterns: concat_lists(
            &default_ignore.custom_patterns,
            file.ignore.custom_patterns.as_deref(),
            cli.ignore.custom_patterns.as_deref(),
        ),
    };

    let merged = MergedConfig {
        cwd,
        output,
        include: concat_lists(&[], file.include.as_deref(), cli.include.as_deref()),
        ignore,
    };
    merged.validate()?;
    Ok(merged)
}

fn concat_lists(
    default: &[String],
    file: Option<&[String]>,
    cli: Option<&[String]>,
) -> Vec<String> {
    let mut combined = default.to_vec();
    combined.extend(file.unwrap_or_default().iter().cloned());
    combined.extend(cli.unwrap_or_default().iter().cloned());
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd() -> PathBuf {
        PathBuf::from("/tmp/project")
    }

    #[test]
    fn test_empty_layers_merge_to_defaults() {
        let merged =
            merge_configs(cwd(), &FileConfig::default(), &CliConfig::default()).unwrap();
        assert_eq!(merged.output, OutputConfig::default());
        assert_eq!(merged.ignore, IgnoreConfig::default());
        assert!(merged.include.is_empty());
    }

    #[test]
    fn test_list_fields_concatenate_in_layer_order() {
        let file = FileConfig {
            include: Some(vec!["src/**".to_string(), "*.md".to_string()]),
            ignore: IgnoreLayer {
                custom_patterns: Some(vec!["*.log".to_string()]),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliConfig {
            include: Some(vec!["*.md".to_string()]),
            ignore: IgnoreLayer {
                custom_patterns: Some(vec!["tmp/".to_string()]),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = merge_configs(cwd(), &file, &cli).unwrap();
        // Duplicates survive the merge.
        assert_eq!(merged.include, vec!["src/**", "*.md", "*.md"]);
        assert_eq!(merged.ignore.custom_patterns, vec!["*.log", "tmp/"]);
    }

    #[test]
    fn test_cli_scalars_override_file_scalars() {
        let file = FileConfig {
            output: OutputLayer {
                style: Some(OutputStyle::Xml),
                top_files_length: Some(10),
                remove_comments: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliConfig {
            output: OutputLayer {
                style: Some(OutputStyle::Markdown),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = merge_configs(cwd(), &file, &cli).unwrap();
        assert_eq!(merged.output.style, OutputStyle::Markdown);
        // Untouched file-layer scalars still apply key-by-key.
        assert_eq!(merged.output.top_files_length, 10);
        assert!(merged.output.remove_comments);
    }

    #[test]
    fn test_output_path_derived_from_style() {
        let cli = CliConfig {
            output: OutputLayer {
                style: Some(OutputStyle::Xml),
                ..Default::default()
            },
            ..Default::default()
        };
        let merged = merge_configs(cwd(), &FileConfig::default(), &cli).unwrap();
        assert_eq!(merged.output.file_path, "dirpack.xml");

        let merged =
            merge_configs(cwd(), &FileConfig::default(), &CliConfig::default()).unwrap();
        assert_eq!(merged.output.file_path, "dirpack.txt");
    }

    #[test]
    fn test_explicit_output_path_wins_over_style() {
        let file = FileConfig {
            output: OutputLayer {
                file_path: Some("context.out".to_string()),
                style: Some(OutputStyle::Markdown),
                ..Default::default()
            },
            ..Default::default()
        };
        let merged = merge_configs(cwd(), &file, &CliConfig::default()).unwrap();
        assert_eq!(merged.output.file_path, "context.out");
    }

    #[test]
    fn test_config_file_parsing() {
        let parsed: FileConfig = serde_json::from_str(
            r#"{
                "output": {"style": "markdown", "topFilesLength": 3},
                "include": ["src/**/*.rs"],
                "ignore": {"useGitignore": false, "customPatterns": ["*.tmp"]}
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.output.style, Some(OutputStyle::Markdown));
        assert_eq!(parsed.output.top_files_length, Some(3));
        assert_eq!(parsed.include.as_deref(), Some(&["src/**/*.rs".to_string()][..]));
        assert_eq!(parsed.ignore.use_gitignore, Some(false));
    }

    #[test]
    fn test_unknown_config_field_rejected() {
        let result: std::result::Result<FileConfig, _> =
            serde_json::from_str(r#"{"output": {"filepath": "x"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_style_rejected() {
        let result: std::result::Result<FileConfig, _> =
            serde_json::from_str(r#"{"output": {"style": "yaml"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file_config(dir.path(), Some("nope.json")).unwrap_err();
        assert!(matches!(err, PackError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_local_config_file_loaded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"output": {"headerText": "hello"}}"#,
        )
        .unwrap();
        let config = load_file_config(dir.path(), None).unwrap();
        assert_eq!(config.output.header_text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_empty_pattern_fails_validation() {
        let cli = CliConfig {
            include: Some(vec!["  ".to_string()]),
            ..Default::default()
        };
        let err = merge_configs(cwd(), &FileConfig::default(), &cli).unwrap_err();
        match err {
            PackError::ConfigValidation { message } => assert!(message.contains("[include]")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_cli_config_maps_flags() {
        let args = Args::parse_from([
            "dirpack",
            "--style",
            "xml",
            "--include",
            "src/**,*.md",
            "--ignore",
            "*.log",
            "--top-files-len",
            "7",
            "--copy",
            "--no-gitignore",
        ]);
        let cli = build_cli_config(&args);
        assert_eq!(cli.output.style, Some(OutputStyle::Xml));
        assert_eq!(
            cli.include.as_deref(),
            Some(&["src/**".to_string(), "*.md".to_string()][..])
        );
        assert_eq!(
            cli.ignore.custom_patterns.as_deref(),
            Some(&["*.log".to_string()][..])
        );
        assert_eq!(cli.output.top_files_length, Some(7));
        assert_eq!(cli.output.copy_to_clipboard, Some(true));
        assert_eq!(cli.ignore.use_gitignore, Some(false));
    }
}
