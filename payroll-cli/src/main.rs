//! payroll-cli: reconcile monthly payroll workbooks against a Grist
//! document.

mod api;
mod config;
mod excel;
mod report;
mod runner;
mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use api::GristClient;
use config::Config;
use report::RunSummary;
use runner::SyncJob;

/// Reconcile monthly payroll workbooks against a Grist document.
#[derive(Parser, Debug)]
#[command(name = "payroll-cli", version, about)]
struct Cli {
    /// Directory containing the .xlsx workbooks (overrides EXCEL_FILES_DIR)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Process a single workbook instead of scanning the directory
    #[arg(long, conflicts_with = "dir")]
    file: Option<PathBuf>,

    /// Build and log the write-plans without issuing any writes
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // In single-file mode the directory setting is irrelevant.
    let dir_override = cli.dir.clone().or_else(|| {
        cli.file
            .as_ref()
            .and_then(|file| file.parent().map(Path::to_path_buf))
    });
    let config = Config::from_env(dir_override)?;

    let workbooks = match &cli.file {
        Some(file) => vec![file.clone()],
        None => list_workbooks(&config.workbook_dir)?,
    };

    if workbooks.is_empty() {
        log::warn!("No .xlsx workbooks found in {}", config.workbook_dir.display());
        return Ok(());
    }
    log::info!("Found {} workbook(s) to process", workbooks.len());

    let client = GristClient::new(&config)?;
    let job = SyncJob::new(&config, &client, cli.dry_run);
    let mut summary = RunSummary::new();

    for path in &workbooks {
        // One bad workbook must not take down the rest of the run.
        if let Err(error) = job.process_workbook(path, &mut summary).await {
            log::error!("Failed to process {}: {:#}", path.display(), error);
        }
    }

    log::info!("All workbooks processed.\n{}", summary);
    Ok(())
}

/// All `.xlsx` files in the directory, sorted by name. Excel's own `~$`
/// lock files are ignored.
fn list_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Workbook directory not found: {}", dir.display()))?;

    let mut workbooks: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
                .unwrap_or(false)
        })
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| !name.starts_with("~$"))
                .unwrap_or(false)
        })
        .collect();

    workbooks.sort();
    Ok(workbooks)
}
