use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use volunteer_sheets_import::config::{Config, DEFAULT_CONFIG_PATH};
use volunteer_sheets_import::import::{run_import, ImportOptions, ImportSummary};
use volunteer_sheets_import::ingestion::{
    discover_input_files, CompositeObserver, FileObserver, ImportObserver, ImportSeverity,
    TracingObserver,
};
use volunteer_sheets_import::logging::init_logging;
use volunteer_sheets_import::publish::{CsvDirectorySink, GridSink, SheetsClient};

/// Import volunteer sign-up CSV exports into a spreadsheet workbook.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config file (TOML). Defaults to ./config.toml when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the CSV exports.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Glob for input files inside the input directory.
    #[arg(long)]
    pattern: Option<String>,

    /// Workbook title.
    #[arg(short, long)]
    workbook: Option<String>,

    /// Write grids as CSV files into this directory instead of the workbook.
    #[arg(long, value_name = "DIR")]
    dry_run: Option<PathBuf>,

    /// Append per-file outcomes to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Emit JSON log lines.
    #[arg(long)]
    json_logs: bool,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("reading config {DEFAULT_CONFIG_PATH}"))?,
        None => Config::default(),
    };

    if let Some(dir) = &args.input_dir {
        config.import.input_dir = Some(dir.clone());
    }
    if let Some(pattern) = &args.pattern {
        config.import.pattern = pattern.clone();
    }
    if let Some(workbook) = &args.workbook {
        config.sheets.workbook = workbook.clone();
    }
    if let Some(log_file) = &args.log_file {
        config.import.log_file = Some(log_file.clone());
    }
    Ok(config)
}

fn report(summary: &ImportSummary) {
    tracing::info!(
        contacts = summary.contacts,
        published = summary.published.len(),
        empty = summary.empty.len(),
        failed = summary.failed.len(),
        rows = summary.rows,
        backfilled_phones = summary.backfilled_phones,
        defects = summary.defects,
        "import finished"
    );
    for failed in &summary.failed {
        tracing::error!(
            path = %failed.path.display(),
            severity = ?failed.severity,
            error = %failed.message,
            "file not imported"
        );
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;

    let Some(input_dir) = config.import.input_dir.clone() else {
        bail!("no input directory: set [import] input_dir or pass --input-dir");
    };
    let files = discover_input_files(&input_dir, &config.import.pattern)
        .with_context(|| format!("listing {}", input_dir.display()))?;
    if files.is_empty() {
        tracing::info!(dir = %input_dir.display(), pattern = %config.import.pattern, "no input files found");
        return Ok(ExitCode::SUCCESS);
    }

    let mut observers: Vec<Arc<dyn ImportObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(log_file) = &config.import.log_file {
        observers.push(Arc::new(FileObserver::new(log_file)));
    }
    let options = ImportOptions {
        transform: config.transform_options()?,
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        alert_at_or_above: ImportSeverity::Critical,
        delay_between_files: config.delay(),
    };

    let mut sink: Box<dyn GridSink> = match &args.dry_run {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "dry run, writing CSV grids");
            Box::new(CsvDirectorySink::new(dir))
        }
        None => {
            let client = SheetsClient::from_config(&config.sheets)?;
            let workbook = client
                .open_or_create_workbook(&config.sheets.workbook)
                .with_context(|| format!("opening workbook '{}'", config.sheets.workbook))?;
            tracing::info!(workbook = workbook.title(), id = workbook.id(), "publishing to workbook");
            Box::new(workbook)
        }
    };

    let summary = run_import(&files, sink.as_mut(), &options);
    report(&summary);

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.json_logs);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "import aborted");
            ExitCode::FAILURE
        }
    }
}
