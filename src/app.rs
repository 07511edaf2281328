//! Application flow shared by the command-line and interactive modes:
//! probe, run one batch, then print or export.

use std::path::PathBuf;

use colored::*;
use netspace_search::{
    Batch, BatchReport, Orchestrator, PageRequest, QueryType, Session, Source, SourceRegistry,
};

use crate::config::AppConfig;
use crate::console::{self, ConsoleSink};
use crate::error::Result;
use crate::export::{self, ExportFormat, ExportedFile};

/// Where the results of a batch go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Print per-target detail tables.
    Console,
    /// `-o` path; format from its extension.
    File(PathBuf),
    /// One file per target in a directory.
    Directory(PathBuf, ExportFormat),
}

/// One batch as requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub sources: Vec<Source>,
    pub query_type: QueryType,
    pub targets: Vec<String>,
    pub page: PageRequest,
    pub destination: Destination,
}

/// Build a session for `config`.
///
/// # Errors
///
/// Configuration errors from validation or HTTP client construction.
pub fn open_session(config: &AppConfig) -> Result<Session> {
    let search = config.search_config();
    let registry = SourceRegistry::new(&search)?;
    Ok(Session::new(registry, search.strict_probe))
}

/// Validate, probe and run one batch, then print or export its results.
///
/// Credentials already probed in `session` are not probed again.
///
/// # Errors
///
/// Validation of the targets, configuration (no usable source), or export
/// I/O. Per-pair failures are printed, not returned.
pub async fn execute(session: &mut Session, request: &QueryRequest) -> Result<BatchReport> {
    let batch = Batch::new(request.query_type, &request.targets)?;

    let sink = ConsoleSink::new(request.destination == Destination::Console);
    let available = session.available_sources(&request.sources, &sink).await?;
    tracing::debug!(?available, targets = batch.len(), "running batch");

    let orchestrator = Orchestrator::new(session.registry(), &sink);
    let report = orchestrator.run(&batch, &available, request.page).await;

    match &request.destination {
        Destination::Console => {}
        Destination::File(path) => {
            console::print_summary(&report);
            let (path, format, fell_back) = export::resolve_output(path);
            if fell_back {
                println!(
                    "{}",
                    format!(
                        "Warning: output extension is not csv or txt, writing CSV to {}",
                        path.display()
                    )
                    .yellow()
                );
            }
            let files = export::export_report(&report, &path, format)?;
            print_exported(&files);
        }
        Destination::Directory(dir, format) => {
            console::print_summary(&report);
            let files = export::export_to_directory(&report, dir, *format)?;
            print_exported(&files);
        }
    }
    Ok(report)
}

fn print_exported(files: &[ExportedFile]) {
    for file in files {
        let shown = std::path::absolute(&file.path).unwrap_or_else(|_| file.path.clone());
        println!(
            "{}",
            format!(
                "'{}': {} unique assets exported to {}",
                file.target,
                file.count,
                shown.display()
            )
            .green()
        );
    }
    if files.len() > 1 {
        let total: usize = files.iter().map(|f| f.count).sum();
        println!(
            "{}",
            format!("{} targets, {total} unique assets in total", files.len()).green()
        );
    }
}
