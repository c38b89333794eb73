/*!
 * Artifact rendering
 *
 * Instantiates one of the three style templates with the header text,
 * instruction-file content, tree string, and processed files. Content is
 * embedded verbatim in every style; the artifact is LLM context, not
 * machine-parsed markup. Files render in selection order.
 */

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::config::{MergedConfig, OutputStyle};
use crate::error::{PackError, Result};
use crate::tree;
use crate::types::ProcessedFile;

const PLAIN_SEPARATOR: &str = "================";
const PLAIN_LONG_SEPARATOR: &str =
    "================================================================";

/// Everything a style template needs.
struct RenderContext<'a> {
    header_text: Option<&'a str>,
    instruction: Option<&'a str>,
    tree_string: &'a str,
    files: &'a [ProcessedFile],
}

/// Render the full artifact for the configured style.
pub fn generate_output(
    root: &Path,
    config: &MergedConfig,
    files: &[ProcessedFile],
    file_paths: &[String],
) -> Result<String> {
    let instruction = read_instruction(root, config)?;
    let tree_string = tree::generate_tree_string(file_paths);
    let context = RenderContext {
        header_text: config.output.header_text.as_deref(),
        instruction: instruction.as_deref(),
        tree_string: &tree_string,
        files,
    };

    let rendered = match config.output.style {
        OutputStyle::Plain => render_plain(&context),
        OutputStyle::Xml => render_xml(&context),
        OutputStyle::Markdown => render_markdown(&context),
    };
    Ok(format!("{}\n", rendered.trim()))
}

/// Read the instruction file verbatim; configured-but-missing is fatal.
fn read_instruction(root: &Path, config: &MergedConfig) -> Result<Option<String>> {
    match &config.output.instruction_file_path {
        Some(rel_path) => {
            let path = root.join(rel_path);
            fs::read_to_string(&path)
                .map(Some)
                .map_err(|_| PackError::InstructionFileNotFound { path })
        }
        None => Ok(None),
    }
}

fn render_plain(context: &RenderContext) -> String {
    let mut out = String::new();
    if let Some(header) = context.header_text {
        out.push_str(header);
        out.push_str("\n\n");
    }

    let _ = writeln!(out, "{PLAIN_LONG_SEPARATOR}");
    out.push_str("Files Structure\n");
    let _ = writeln!(out, "{PLAIN_LONG_SEPARATOR}");
    out.push_str(context.tree_string);
    out.push_str("\n\n");

    let _ = writeln!(out, "{PLAIN_LONG_SEPARATOR}");
    out.push_str("Repository Files\n");
    let _ = writeln!(out, "{PLAIN_LONG_SEPARATOR}");
    out.push('\n');

    for file in context.files {
        let _ = writeln!(out, "{PLAIN_SEPARATOR}");
        let _ = writeln!(out, "File: {}", file.path);
        let _ = writeln!(out, "{PLAIN_SEPARATOR}");
        out.push_str(&file.content);
        out.push_str("\n\n");
    }

    if let Some(instruction) = context.instruction {
        let _ = writeln!(out, "{PLAIN_LONG_SEPARATOR}");
        out.push_str("Instruction\n");
        let _ = writeln!(out, "{PLAIN_LONG_SEPARATOR}");
        out.push_str(instruction);
        out.push('\n');
    }
    out
}

fn render_xml(context: &RenderContext) -> String {
    let mut out = String::new();
    if let Some(header) = context.header_text {
        let _ = writeln!(out, "<user_provided_header>\n{header}\n</user_provided_header>\n");
    }

    let _ = writeln!(
        out,
        "<repository_structure>\n{}\n</repository_structure>\n",
        context.tree_string
    );

    out.push_str("<repository_files>\n");
    out.push_str("This section contains the contents of the repository's files.\n\n");
    for file in context.files {
        let _ = writeln!(out, "<file path=\"{}\">\n{}\n</file>\n", file.path, file.content);
    }
    out.push_str("</repository_files>\n");

    if let Some(instruction) = context.instruction {
        let _ = writeln!(out, "\n<instruction>\n{instruction}\n</instruction>");
    }
    out
}

fn render_markdown(context: &RenderContext) -> String {
    let mut out = String::new();
    out.push_str("## Additional Info\n");
    if let Some(header) = context.header_text {
        out.push_str(header);
        out.push('\n');
    }
    out.push('\n');

    let _ = writeln!(out, "# Files Structure\n```\n{}\n```\n", context.tree_string);

    out.push_str("# Repository Files\n\n");
    for file in context.files {
        let _ = writeln!(
            out,
            "## File: {}\n```{}\n{}\n```\n",
            file.path,
            fence_language(&file.path),
            file.content
        );
    }

    if let Some(instruction) = context.instruction {
        let _ = writeln!(out, "# Instruction\n{instruction}");
    }
    out
}

/// Fixed extension -> fence-language table; unknown extensions get no tag.
static FENCE_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("js", "javascript"),
        ("jsx", "javascript"),
        ("ts", "typescript"),
        ("tsx", "typescript"),
        ("vue", "vue"),
        ("py", "python"),
        ("rb", "ruby"),
        ("java", "java"),
        ("c", "cpp"),
        ("cpp", "cpp"),
        ("cs", "csharp"),
        ("go", "go"),
        ("rs", "rust"),
        ("php", "php"),
        ("swift", "swift"),
        ("kt", "kotlin"),
        ("scala", "scala"),
        ("html", "html"),
        ("css", "css"),
        ("scss", "scss"),
        ("sass", "scss"),
        ("json", "json"),
        ("json5", "json5"),
        ("xml", "xml"),
        ("yaml", "yaml"),
        ("yml", "yaml"),
        ("md", "markdown"),
        ("sh", "bash"),
        ("bash", "bash"),
        ("sql", "sql"),
        ("dockerfile", "dockerfile"),
        ("dart", "dart"),
        ("fs", "fsharp"),
        ("fsx", "fsharp"),
        ("r", "r"),
        ("pl", "perl"),
        ("pm", "perl"),
        ("lua", "lua"),
        ("groovy", "groovy"),
        ("hs", "haskell"),
        ("ex", "elixir"),
        ("exs", "elixir"),
        ("erl", "erlang"),
        ("clj", "clojure"),
        ("cljs", "clojure"),
        ("ps1", "powershell"),
        ("vb", "vb"),
        ("coffee", "coffeescript"),
        ("tf", "hcl"),
        ("tfvars", "hcl"),
        ("proto", "protobuf"),
        ("pug", "pug"),
        ("graphql", "graphql"),
        ("gql", "graphql"),
        ("toml", "toml"),
    ])
});

fn fence_language(path: &str) -> &'static str {
    path.rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| FENCE_LANGUAGES.get(ext.as_str()).copied())
        .unwrap_or("")
}
