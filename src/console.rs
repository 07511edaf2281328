//! Terminal presentation: credential status, per-pair progress, result
//! tables. Colours via `colored`; logs go to stderr separately.

use colored::*;
use netspace_search::{
    Asset, BatchReport, CredentialStatus, FailureKind, PairFailure, QueryResultBlock, QueryType,
    ReportSink, Source, TargetReport,
};

/// Titles longer than this are cut in the detail table.
pub const TITLE_MAX_CHARS: usize = 50;

/// [`ReportSink`] that prints progress to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    /// Print each target's deduplicated assets as it finishes.
    pub show_details: bool,
}

impl ConsoleSink {
    pub fn new(show_details: bool) -> Self {
        Self { show_details }
    }
}

impl ReportSink for ConsoleSink {
    fn credential_checked(&self, status: &CredentialStatus) {
        let line = status_line(status);
        if status.available {
            println!("  {} {}", "✓".green().bold(), line.green());
        } else {
            println!("  {} {}", "✗".red().bold(), line.red());
        }
    }

    fn target_started(&self, target: &str, position: usize, total: usize) {
        println!("{}", format!("Querying target {position}/{total}: {target}").dimmed());
    }

    fn source_skipped(&self, source: Source, query_type: QueryType) {
        println!(
            "{}",
            format!("{source} does not support {query_type} queries, skipped").yellow()
        );
    }

    fn block_received(&self, block: &QueryResultBlock) {
        println!("{}", format!("Query: {}", block.query_used).dimmed());
        if let Some(url) = &block.request_url {
            println!("{}", format!("Request URL: {url}").dimmed());
        }
        if let Some(empty) = block.emptiness() {
            println!("{}", format!("Note: {}: {empty}", block.source).yellow());
        }
    }

    fn pair_failed(&self, failure: &PairFailure) {
        println!("{}", failure_message(failure).red());
    }

    fn target_finished(&self, report: &TargetReport) {
        if !self.show_details || report.blocks.is_empty() {
            return;
        }
        println!();
        println!("{}", format!("Target: {}", report.target).cyan().bold());
        print_details(&report.unique_assets());
    }
}

/// `fofa: available` style line.
pub fn status_line(status: &CredentialStatus) -> String {
    format!("{}: {}", status.source, status.reason)
}

/// User-facing text for a failed pair.
pub fn failure_message(failure: &PairFailure) -> String {
    match failure.kind {
        FailureKind::CredentialRejected => format!(
            "{} query for '{}' failed: credential rejected ({}). Check the {} API key.",
            failure.source, failure.target, failure.error, failure.source
        ),
        FailureKind::Failed => format!(
            "{} query for '{}' failed: {}",
            failure.source, failure.target, failure.error
        ),
    }
}

/// Print the credential status header used before a batch.
pub fn print_credential_header() {
    println!("{}", "Credential status".bold());
}

/// Cut `title` to [`TITLE_MAX_CHARS`] characters.
pub fn truncate_title(title: &str) -> String {
    title.chars().take(TITLE_MAX_CHARS).collect()
}

/// Print the detail table for one target's assets.
pub fn print_details(assets: &[Asset]) {
    if assets.is_empty() {
        println!("{}", "No results".yellow());
        return;
    }
    let rows: Vec<Vec<String>> = assets
        .iter()
        .enumerate()
        .map(|(i, a)| {
            vec![
                (i + 1).to_string(),
                a.source.clone(),
                a.ip.clone(),
                a.host.clone(),
                a.port.clone(),
                a.domain.clone(),
                truncate_title(&a.title),
                a.company.clone(),
            ]
        })
        .collect();
    let lines = render_table(
        &["#", "Source", "IP", "Host", "Port", "Domain", "Title", "Company"],
        &rows,
    );
    print_table(&lines);
    println!("{}", format!("Total unique assets: {}", assets.len()).green());
}

/// Print the per-pair summary table shown when exporting.
pub fn print_summary(report: &BatchReport) {
    let mut total = 0;
    let mut rows = Vec::new();
    for target in &report.targets {
        for block in &target.blocks {
            total += block.results.len();
            rows.push(vec![
                block.source.to_string(),
                block.query.clone(),
                block.query_type.to_string(),
                block.results.len().to_string(),
            ]);
        }
    }
    println!();
    println!("{}", "Search summary".bold());
    print_table(&render_table(&["Source", "Query", "Type", "Count"], &rows));
    println!("{}", format!("Total records (before dedup): {total}").green());
}

/// Print lines from [`render_table`], header highlighted.
pub fn print_table(lines: &[String]) {
    let mut iter = lines.iter();
    if let Some(header) = iter.next() {
        println!("{}", header.cyan().bold());
    }
    for line in iter {
        println!("{line}");
    }
}

/// Lay out rows as left-aligned columns separated by two spaces, with a
/// dashed rule under the header. Plain text; colouring is the caller's.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers.iter().copied(), &widths));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str), &widths));
    }
    lines
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| {
            let pad = w.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}
