/*!
 * Metrics aggregation and console reporting
 *
 * Totals the per-file metrics into a `PackResult` and renders the
 * top-files and summary tables with the tabled library.
 */

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::config::MergedConfig;
use crate::types::{FileMetrics, PackResult};

/// Total the per-file metrics and derive the top-N largest files.
///
/// `metrics` arrives in selection order; the top list sorts by character
/// count descending and the stable sort keeps selection order for ties.
pub fn aggregate(metrics: Vec<FileMetrics>, top_files_length: usize) -> PackResult {
    let total_files = metrics.len();
    let total_characters = metrics.iter().map(|m| m.char_count).sum();
    let total_tokens = metrics.iter().map(|m| m.token_count).sum();
    let file_char_counts = metrics
        .iter()
        .map(|m| (m.path.clone(), m.char_count))
        .collect();
    let file_token_counts = metrics
        .iter()
        .map(|m| (m.path.clone(), m.token_count))
        .collect();

    let mut top_files = metrics;
    top_files.sort_by(|a, b| b.char_count.cmp(&a.char_count));
    top_files.truncate(top_files_length);

    PackResult {
        total_files,
        total_characters,
        total_tokens,
        file_char_counts,
        file_token_counts,
        top_files,
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for pack results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Print the report to stdout
    pub fn print_report(&self, result: &PackResult, config: &MergedConfig) {
        println!("\n{}", self.generate_report(result, config));
    }

    /// Generate the report string
    pub fn generate_report(&self, result: &PackResult, config: &MergedConfig) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(result, config),
        }
    }

    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    fn create_top_files_table(&self, result: &PackResult) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "#")]
            rank: String,

            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Chars")]
            chars: String,

            #[tabled(rename = "Tokens")]
            tokens: String,
        }

        let rows: Vec<FileRow> = result
            .top_files
            .iter()
            .enumerate()
            .map(|(index, file)| FileRow {
                rank: format!("{}.", index + 1),
                path: file.path.clone(),
                chars: self.format_number(file.char_count),
                tokens: self.format_number(file.token_count),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn create_summary_table(&self, result: &PackResult, config: &MergedConfig) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "📄 Total Files".to_string(),
                value: self.format_number(result.total_files),
            },
            SummaryRow {
                key: "📝 Total Chars".to_string(),
                value: self.format_number(result.total_characters),
            },
            SummaryRow {
                key: "📦 Total Tokens".to_string(),
                value: self.format_number(result.total_tokens),
            },
            SummaryRow {
                key: "📂 Output".to_string(),
                value: config.output.file_path.clone(),
            },
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn generate_console_report(&self, result: &PackResult, config: &MergedConfig) -> String {
        let summary_title = "📊  PACK SUMMARY";
        let summary_table = self.create_summary_table(result, config);

        if result.top_files.is_empty() {
            return format!("{summary_title}\n{summary_table}");
        }

        let files_title = format!(
            "📈  TOP {} FILES BY CHARACTER COUNT",
            result.top_files.len()
        );
        let files_table = self.create_top_files_table(result);
        format!("{files_title}\n{files_table}\n\n{summary_title}\n{summary_table}")
    }
}
