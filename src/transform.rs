/*!
 * Deterministic content transformations
 *
 * Comment stripping, blank-line removal, and line numbering. Every
 * transformation is a pure function of the content and configuration;
 * output never depends on read order or concurrency.
 */

use rayon::prelude::*;

use crate::config::OutputConfig;
use crate::types::{FileRecord, ProcessedFile};

/// Apply the configured transformations to every collected file.
pub fn process_files(files: Vec<FileRecord>, output: &OutputConfig) -> Vec<ProcessedFile> {
    files
        .into_par_iter()
        .map(|file| {
            let content = process_content(&file.content, &file.path, output);
            ProcessedFile {
                path: file.path,
                content,
            }
        })
        .collect()
}

/// Transform a single file's content: comments, then blank lines, then
/// line numbers.
pub fn process_content(content: &str, path: &str, output: &OutputConfig) -> String {
    let mut text = content.to_string();
    if output.remove_comments {
        if let Some(syntax) = CommentSyntax::for_path(path) {
            text = strip_comments(&text, &syntax);
        }
    }
    if output.remove_empty_lines {
        text = remove_empty_lines(&text);
    }
    let mut text = text.trim().to_string();
    if output.show_line_numbers {
        text = add_line_numbers(&text);
    }
    text
}

/// Comment delimiters for one language family.
struct CommentSyntax {
    line_prefixes: &'static [&'static str],
    block: Option<(&'static str, &'static str)>,
}

impl CommentSyntax {
    /// Best-effort lookup by file extension; `None` means the content
    /// passes through untouched.
    fn for_path(path: &str) -> Option<Self> {
        let name = path.rsplit('/').next().unwrap_or(path);
        let extension = name.rsplit('.').next()?.to_ascii_lowercase();
        if !name.contains('.') {
            return None;
        }
        let syntax = match extension.as_str() {
            "js" | "jsx" | "ts" | "tsx" | "java" | "c" | "h" | "cpp" | "hpp" | "cc" | "cs"
            | "go" | "rs" | "swift" | "kt" | "scala" | "dart" | "php" => Self {
                line_prefixes: &["//"],
                block: Some(("/*", "*/")),
            },
            "py" | "rb" | "sh" | "bash" | "zsh" | "yml" | "yaml" | "toml" | "r" | "pl" | "pm" => {
                Self {
                    line_prefixes: &["#"],
                    block: None,
                }
            }
            "sql" | "lua" | "hs" => Self {
                line_prefixes: &["--"],
                block: None,
            },
            "css" => Self {
                line_prefixes: &[],
                block: Some(("/*", "*/")),
            },
            "scss" | "sass" | "less" => Self {
                line_prefixes: &["//"],
                block: Some(("/*", "*/")),
            },
            "html" | "htm" | "xml" | "vue" | "svelte" | "md" | "markdown" => Self {
                line_prefixes: &[],
                block: Some(("<!--", "-->")),
            },
            _ => return None,
        };
        Some(syntax)
    }
}

/// Conservative strip: non-nested block comments, then lines that hold
/// nothing but a line comment. Shebang lines survive.
fn strip_comments(content: &str, syntax: &CommentSyntax) -> String {
    let text = match syntax.block {
        Some((open, close)) => remove_block_comments(content, open, close),
        None => content.to_string(),
    };

    if syntax.line_prefixes.is_empty() {
        return text;
    }

    let kept: Vec<&str> = text
        .lines()
        .enumerate()
        .filter(|(index, line)| {
            let trimmed = line.trim_start();
            if *index == 0 && trimmed.starts_with("#!") {
                return true;
            }
            !syntax
                .line_prefixes
                .iter()
                .any(|prefix| trimmed.starts_with(prefix))
        })
        .map(|(_, line)| line)
        .collect();
    kept.join("\n")
}

fn remove_block_comments(content: &str, open: &str, close: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find(open) {
        result.push_str(&rest[..start]);
        match rest[start + open.len()..].find(close) {
            Some(end) => rest = &rest[start + open.len() + end + close.len()..],
            None => {
                // Unterminated comment runs to end of input.
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

fn remove_empty_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn add_line_numbers(content: &str) -> String {
    let total = content.lines().count().max(1);
    let width = total.to_string().len();
    content
        .lines()
        .enumerate()
        .map(|(index, line)| format!("{:>width$}: {}", index + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output_with(
        remove_comments: bool,
        remove_empty_lines: bool,
        show_line_numbers: bool,
    ) -> OutputConfig {
        OutputConfig {
            remove_comments,
            remove_empty_lines,
            show_line_numbers,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_transformations_trims_only() {
        let output = output_with(false, false, false);
        assert_eq!(process_content("  fn main() {}\n\n", "a.rs", &output), "fn main() {}");
    }

    #[test]
    fn test_line_comments_stripped() {
        let output = output_with(true, false, false);
        let source = "// header\nfn main() {\n    let x = 1; // keep this line\n}\n";
        let processed = process_content(source, "main.rs", &output);
        assert!(!processed.contains("// header"));
        // Trailing comments are left alone; only full comment lines go.
        assert!(processed.contains("let x = 1; // keep this line"));
    }

    #[test]
    fn test_block_comments_stripped() {
        let output = output_with(true, false, false);
        let source = "/* license\n   banner */\nfn main() {}\n";
        let processed = process_content(source, "main.rs", &output);
        assert!(!processed.contains("license"));
        assert!(processed.contains("fn main() {}"));
    }

    #[test]
    fn test_hash_comments_and_shebang() {
        let output = output_with(true, false, false);
        let source = "#!/usr/bin/env python\n# setup\nprint(1)\n";
        let processed = process_content(source, "tool.py", &output);
        assert!(processed.contains("#!/usr/bin/env python"));
        assert!(!processed.contains("# setup"));
        assert!(processed.contains("print(1)"));
    }

    #[test]
    fn test_html_block_comments_stripped() {
        let output = output_with(true, false, false);
        let source = "<!-- note -->\n<p>text</p>\n";
        let processed = process_content(source, "index.html", &output);
        assert!(!processed.contains("note"));
        assert!(processed.contains("<p>text</p>"));
    }

    #[test]
    fn test_unknown_extension_untouched() {
        let output = output_with(true, false, false);
        let source = "// not actually a comment language";
        assert_eq!(process_content(source, "data.bin2", &output), source);
    }

    #[test]
    fn test_remove_empty_lines() {
        let output = output_with(false, true, false);
        let source = "one\n\n   \ntwo\n";
        assert_eq!(process_content(source, "a.txt", &output), "one\ntwo");
    }

    #[test]
    fn test_line_numbers_right_aligned() {
        let output = output_with(false, false, true);
        let source = (1..=12).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        let processed = process_content(&source, "a.txt", &output);
        let lines: Vec<&str> = processed.lines().collect();
        assert_eq!(lines[0], " 1: line1");
        assert_eq!(lines[11], "12: line12");
    }

    #[test]
    fn test_transformations_compose_in_order() {
        let output = output_with(true, true, true);
        let source = "// drop\n\ncode_a\n\n# not a rust comment\ncode_b\n";
        let processed = process_content(source, "lib.rs", &output);
        assert_eq!(processed, "1: code_a\n2: # not a rust comment\n3: code_b");
    }

    #[test]
    fn test_process_files_preserves_order_and_paths() {
        let records = vec![
            FileRecord {
                path: "b.txt".to_string(),
                content: "beta".to_string(),
                size: 4,
            },
            FileRecord {
                path: "a.txt".to_string(),
                content: "alpha".to_string(),
                size: 5,
            },
        ];
        let processed = process_files(records, &OutputConfig::default());
        assert_eq!(processed[0].path, "b.txt");
        assert_eq!(processed[0].content, "beta");
        assert_eq!(processed[1].path, "a.txt");
    }

    #[test]
    fn test_determinism() {
        let output = output_with(true, true, false);
        let source = "/* a */ x\n// b\ny\n";
        let first = process_content(source, "m.c", &output);
        let second = process_content(source, "m.c", &output);
        assert_eq!(first, second);
    }
}
