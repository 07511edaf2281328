//! Export of deduplicated assets to CSV or plain text.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use netspace_search::orchestrator::host_normalize::bare_host;
use netspace_search::{Asset, BatchReport, QueryType, TargetReport};

use crate::error::Result;

/// CSV column order.
pub const CSV_HEADER: [&str; 7] = ["source", "ip", "domain", "host", "port", "title", "company"];

/// Maximum length of a per-target file stem.
const MAX_FILE_STEM_CHARS: usize = 200;

/// Characters replaced with `_` in per-target file names.
const UNSAFE_FILE_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Every canonical field, one row per asset.
    Csv,
    /// One IP or name per line, sorted and unique.
    Txt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }

    /// Format from a file extension, if it is one we write.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Resolve the format of an output path.
///
/// Unknown or missing extensions fall back to CSV, and the returned path
/// gets a `.csv` extension. The flag is `true` when that fallback applied.
pub fn resolve_output(path: &Path) -> (PathBuf, ExportFormat, bool) {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match ExportFormat::from_extension(ext) {
        Some(format) => (path.to_path_buf(), format, false),
        None => (path.with_extension("csv"), ExportFormat::Csv, true),
    }
}

/// Write assets as CSV with [`CSV_HEADER`].
pub fn write_csv<W: Write>(assets: &[Asset], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for a in assets {
        wtr.write_record([
            a.source.as_str(),
            a.ip.as_str(),
            a.domain.as_str(),
            a.host.as_str(),
            a.port.as_str(),
            a.title.as_str(),
            a.company.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// The plain-text value of each asset, sorted and unique.
///
/// IP queries export the IP. Other queries export the domain, else the
/// host without scheme and port, else the IP.
pub fn txt_values(assets: &[Asset], query_type: QueryType) -> Vec<String> {
    let mut values: Vec<String> = assets
        .iter()
        .map(|a| {
            let ip = a.ip.trim();
            if query_type == QueryType::Ip {
                return ip.to_string();
            }
            let domain = a.domain.trim();
            if !domain.is_empty() {
                return domain.to_string();
            }
            let host = bare_host(&a.host);
            let value = if host.is_empty() { ip } else { host };
            value.to_string()
        })
        .filter(|v| !v.is_empty())
        .collect();
    values.sort();
    values.dedup();
    values
}

/// Write assets as plain text, one value per line.
pub fn write_txt<W: Write>(assets: &[Asset], query_type: QueryType, mut writer: W) -> Result<()> {
    writer.write_all(txt_values(assets, query_type).join("\n").as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write `assets` to `path` in `format`, creating parent directories.
pub fn export_assets(
    assets: &[Asset],
    query_type: QueryType,
    path: &Path,
    format: ExportFormat,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    match format {
        ExportFormat::Csv => write_csv(assets, file),
        ExportFormat::Txt => write_txt(assets, query_type, file),
    }
}

/// Turn a target into a file stem: unsafe characters become `_` and the
/// result is capped at 200 characters.
pub fn safe_file_stem(target: &str) -> String {
    target
        .chars()
        .map(|c| if UNSAFE_FILE_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_FILE_STEM_CHARS)
        .collect()
}

/// One written file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub target: String,
    pub path: PathBuf,
    /// Unique assets written.
    pub count: usize,
}

fn export_target(
    report: &TargetReport,
    query_type: QueryType,
    path: PathBuf,
    format: ExportFormat,
) -> Result<ExportedFile> {
    let assets = report.unique_assets();
    export_assets(&assets, query_type, &path, format)?;
    tracing::debug!(target = %report.target, path = %path.display(), count = assets.len(), "exported");
    Ok(ExportedFile {
        target: report.target.clone(),
        path,
        count: assets.len(),
    })
}

/// Write one file per target into `dir`, named after the target.
///
/// Targets with no successful block are skipped.
pub fn export_to_directory(
    report: &BatchReport,
    dir: &Path,
    format: ExportFormat,
) -> Result<Vec<ExportedFile>> {
    std::fs::create_dir_all(dir)?;
    report
        .targets
        .iter()
        .filter(|t| !t.blocks.is_empty())
        .map(|t| {
            let path = dir.join(format!("{}.{}", safe_file_stem(&t.target), format.extension()));
            export_target(t, report.query_type, path, format)
        })
        .collect()
}

/// Export a batch to the `-o` path.
///
/// A single-target batch is written to `path` itself. Several targets are
/// written one file each into `path` when it is a directory, else into its
/// parent directory.
pub fn export_report(report: &BatchReport, path: &Path, format: ExportFormat) -> Result<Vec<ExportedFile>> {
    if let [only] = report.targets.as_slice() {
        if only.blocks.is_empty() {
            return Ok(Vec::new());
        }
        return export_target(only, report.query_type, path.to_path_buf(), format).map(|f| vec![f]);
    }

    let dir = if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    };
    let dir = if dir.as_os_str().is_empty() { PathBuf::from(".") } else { dir };
    export_to_directory(report, &dir, format)
}
