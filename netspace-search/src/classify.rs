//! Target type detection and batch validation.
//!
//! A batch declares one [`QueryType`] for all its targets. Targets that
//! clearly look like something else (an IP in a domain batch, a domain in
//! an IP batch) are rejected up front; anything that cannot be classified,
//! such as a company name, is let through.

use std::collections::HashSet;
use std::fmt;

use crate::error::SearchError;
use crate::types::QueryType;

/// What a single target string looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Ip,
    Domain,
    /// Neither a valid IPv4 address nor a hostname.
    Indeterminate,
}

impl TargetKind {
    /// The query type this kind corresponds to, if any.
    pub fn query_type(self) -> Option<QueryType> {
        match self {
            Self::Ip => Some(QueryType::Ip),
            Self::Domain => Some(QueryType::Domain),
            Self::Indeterminate => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ip => "ip",
            Self::Domain => "domain",
            Self::Indeterminate => "indeterminate",
        })
    }
}

/// Classify a target string.
///
/// Four dot-separated all-digit groups are an IPv4 address when every group
/// has at most three digits and is in `0..=255`; otherwise they are
/// [`TargetKind::Indeterminate`], never a domain.
pub fn classify(input: &str) -> TargetKind {
    let target = input.trim();
    let groups: Vec<&str> = target.split('.').collect();

    let all_digit_groups = groups
        .iter()
        .all(|g| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit()));
    if groups.len() == 4 && all_digit_groups {
        let valid_octets = groups
            .iter()
            .all(|g| g.len() <= 3 && g.parse::<u16>().is_ok_and(|n| n <= 255));
        return if valid_octets {
            TargetKind::Ip
        } else {
            TargetKind::Indeterminate
        };
    }

    if groups.len() >= 2 && groups.iter().all(|label| is_label(label)) {
        TargetKind::Domain
    } else {
        TargetKind::Indeterminate
    }
}

/// A DNS label: alphanumeric at both ends, hyphens allowed inside.
fn is_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        }
        _ => false,
    }
}

/// Check that no target is clearly of a different kind than `query_type`.
///
/// # Errors
///
/// [`SearchError::Validation`] naming every offending target with its
/// detected kind.
pub fn validate_batch<S: AsRef<str>>(targets: &[S], query_type: QueryType) -> Result<(), SearchError> {
    let mismatches: Vec<String> = targets
        .iter()
        .filter_map(|t| {
            let target = t.as_ref().trim();
            let detected = classify(target).query_type()?;
            (detected != query_type).then(|| format!("{target} (detected as {detected})"))
        })
        .collect();

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(SearchError::Validation(format!(
            "mixed target types: {} but query type is {query_type}; all targets in a batch must share one type",
            mismatches.join(", ")
        )))
    }
}

/// An ordered, non-empty, type-consistent list of targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    query_type: QueryType,
    targets: Vec<String>,
}

impl Batch {
    /// Build a batch, trimming targets and dropping blank and repeated ones.
    /// The first occurrence of a repeated target keeps its position.
    ///
    /// # Errors
    ///
    /// [`SearchError::Validation`] if no targets remain or
    /// [`validate_batch`] rejects them.
    pub fn new<I, S>(query_type: QueryType, targets: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let targets: Vec<String> = targets
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        if targets.is_empty() {
            return Err(SearchError::Validation("no targets given".into()));
        }
        validate_batch(&targets, query_type)?;
        Ok(Self {
            query_type,
            targets,
        })
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
