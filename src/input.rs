//! Parsing of target and source lists typed by the user.

use std::path::Path;

use netspace_search::{Source, SourceAdapter, SourceRegistry};

use crate::error::{AppError, Result};

/// Separators accepted between targets: ASCII and full-width commas.
const TARGET_SEPARATORS: [char; 2] = [',', '，'];

/// Parse a target argument.
///
/// An argument ending in `.txt` that names an existing file is read one
/// target per line, skipping blank lines and `#` comments. Anything else is
/// split on commas.
///
/// # Errors
///
/// [`AppError::Input`] if the target file cannot be read.
pub fn parse_targets(input: &str) -> Result<Vec<String>> {
    let input = input.trim();
    if is_target_file(input) {
        let content = std::fs::read_to_string(input)
            .map_err(|e| AppError::Input(format!("failed to read {input}: {e}")))?;
        let targets: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();
        tracing::debug!(file = input, count = targets.len(), "targets read from file");
        return Ok(targets);
    }

    Ok(input
        .split(TARGET_SEPARATORS)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect())
}

/// Whether `input` names an existing `.txt` target file.
pub fn is_target_file(input: &str) -> bool {
    let input = input.trim();
    input.ends_with(".txt") && Path::new(input).is_file()
}

/// Sources named in a `--source` argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSelection {
    /// Recognised sources, deduplicated, in the order given.
    pub sources: Vec<Source>,
    /// Names that matched no source.
    pub unknown: Vec<String>,
}

/// Parse a comma-separated source list against `registry`. `all` expands
/// to every registered source.
pub fn parse_sources(input: &str, registry: &SourceRegistry) -> SourceSelection {
    let mut selection = SourceSelection::default();
    for name in input.split(TARGET_SEPARATORS).map(str::trim).filter(|n| !n.is_empty()) {
        let resolved: Vec<Source> = if name.eq_ignore_ascii_case("all") {
            registry.adapters().map(|a| a.source()).collect()
        } else if let Some(adapter) = registry.resolve(name) {
            vec![adapter.source()]
        } else {
            selection.unknown.push(name.to_string());
            continue;
        };
        for source in resolved {
            if !selection.sources.contains(&source) {
                selection.sources.push(source);
            }
        }
    }
    selection
}
