/*!
 * Command-line interface for dirpack
 */

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;

use dirpack::config::{self, Args, MergedConfig};
use dirpack::error::Result;
use dirpack::init;
use dirpack::packager::{self, PackOptions};
use dirpack::remote;
use dirpack::report::{ReportFormat, Reporter};
use dirpack::types::PackResult;

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "trace" } else { "warn" }),
    )
    .init();

    if let Some(shell) = args.generate {
        let mut command = Args::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    // Configure the shared thread pool used for per-file collection work.
    let threads = args.threads.unwrap_or_else(num_cpus::get);
    if let Err(e) = ThreadPoolBuilder::new().num_threads(threads).build_global() {
        eprintln!("Warning: Failed to set thread pool size: {e}");
    }

    if args.init {
        let cwd = env::current_dir()?;
        return init::run_init_action(&cwd, args.global);
    }

    if let Some(url) = args.remote.clone() {
        return run_remote_action(&url, &args);
    }

    let cwd = env::current_dir()?;
    let target = PathBuf::from(&args.directory);
    run_default_action(&target, &cwd, &args).map(|_| ())
}

/// Pack a local directory and print the report.
fn run_default_action(
    directory: &Path,
    cwd: &Path,
    args: &Args,
) -> Result<(PackResult, MergedConfig)> {
    let file_config = config::load_file_config(cwd, args.config.as_deref())?;
    log::trace!("loaded file config: {file_config:?}");

    let cli_config = config::build_cli_config(args);
    log::trace!("cli config: {cli_config:?}");

    let merged = config::merge_configs(cwd.to_path_buf(), &file_config, &cli_config)?;
    log::trace!("merged config: {merged:?}");

    let options = PackOptions {
        threads: args.threads.unwrap_or_else(num_cpus::get),
        encoding: args.encoding.unwrap_or_default(),
    };

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap(),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_message("Packing files...");

    let result = {
        let progress = progress.clone();
        packager::pack(directory, &merged, options, &move |message: &str| {
            progress.set_message(message.to_string());
        })
    };
    progress.finish_and_clear();
    let pack_result = result?;

    let reporter = Reporter::new(ReportFormat::ConsoleTable);
    reporter.print_report(&pack_result, &merged);

    println!("\n🎉 All done! Packed {} files.", pack_result.total_files);

    Ok((pack_result, merged))
}

/// Clone a remote repository into a temporary directory, pack it, and copy
/// the artifact back to the invoking directory.
fn run_remote_action(url: &str, args: &Args) -> Result<()> {
    let clone_url = remote::format_git_url(url);
    if !remote::is_git_url(&clone_url) {
        return Err(remote::GitError::InvalidUrl(url.to_string()).into());
    }

    let invoking_dir = env::current_dir()?;
    // Dropped on every exit path, so the clone never outlives the run.
    let temp_dir = tempfile::tempdir()?;

    println!("Cloning repository: {clone_url}");
    remote::clone_repository(&clone_url, temp_dir.path())?;

    let (_, merged) = run_default_action(temp_dir.path(), temp_dir.path(), args)?;

    if Path::new(&merged.output.file_path).is_absolute() {
        // Artifact already landed outside the clone; nothing to copy.
        return Ok(());
    }
    remote::copy_output_to_directory(temp_dir.path(), &invoking_dir, &merged.output.file_path)?;
    println!(
        "Output copied to {}",
        invoking_dir.join(&merged.output.file_path).display()
    );
    Ok(())
}
