//! Core types: the canonical asset record, per-query result blocks, and
//! source / query-type identification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One normalised record per discovered service or host.
///
/// Every adapter fills `source`; everything else is best-effort and is the
/// empty string when the provider did not supply it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Name of the source that produced this record (`fofa`, `hunter`, `quake`).
    pub source: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    /// The provider's original record, untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

impl Asset {
    /// Create an empty asset attributed to `source`.
    pub fn new(source: Source) -> Self {
        Self {
            source: source.name().to_string(),
            ..Default::default()
        }
    }
}

/// Outcome of one successful adapter invocation for a (target, source) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResultBlock {
    pub source: Source,
    /// The user-supplied target, as typed.
    pub query: String,
    pub query_type: QueryType,
    pub page: u32,
    /// The page size actually sent to the provider.
    pub size: u32,
    pub results: Vec<Asset>,
    /// Provider-reported total, independent of the returned page.
    pub total_size: u64,
    /// The provider-syntax query string that was sent.
    pub query_used: String,
    /// Optional provider hint (FOFA `tip`, Hunter `syntax_prompt`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    /// Request URL with credentials replaced by `***`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
}

impl QueryResultBlock {
    /// Describes why the block carries no results, or `None` if it has some.
    ///
    /// A zero provider total means nothing matched; a positive total with an
    /// empty page means the match set exists but this page is past its end.
    pub fn emptiness(&self) -> Option<Emptiness> {
        if !self.results.is_empty() {
            return None;
        }
        if self.total_size == 0 {
            Some(Emptiness::NoMatches {
                tip: self.tip.clone(),
            })
        } else {
            Some(Emptiness::EmptyPage {
                total: self.total_size,
                page: self.page,
            })
        }
    }
}

/// The two distinct reasons a block can be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emptiness {
    /// The provider found no matching assets.
    NoMatches { tip: Option<String> },
    /// Matching assets exist, but the requested page holds none of them.
    EmptyPage { total: u64, page: u32 },
}

impl fmt::Display for Emptiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatches { tip: Some(tip) } if !tip.is_empty() => {
                write!(f, "0 matching assets. {tip}")
            }
            Self::NoMatches { .. } => f.write_str("0 matching assets"),
            Self::EmptyPage { total, page } => write!(
                f,
                "{total} matching assets exist, but page {page} is empty"
            ),
        }
    }
}

/// Supported asset search providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// FOFA. Host and IP search, no organisation queries.
    Fofa,
    /// Hunter (Qi An Xin). Forces a page size of 10.
    Hunter,
    /// Quake (360). JSON POST search with a token header.
    Quake,
}

impl Source {
    /// Returns the lowercase name used in configuration and output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fofa => "fofa",
            Self::Hunter => "hunter",
            Self::Quake => "quake",
        }
    }

    /// Returns all sources in their canonical query order.
    pub fn all() -> &'static [Source] {
        &[Self::Fofa, Self::Hunter, Self::Quake]
    }

    /// Pick the value belonging to this source out of one per source.
    pub fn pick<T>(self, fofa: T, hunter: T, quake: T) -> T {
        match self {
            Self::Fofa => fofa,
            Self::Hunter => hunter,
            Self::Quake => quake,
        }
    }

    /// Whether this source can answer queries of the given type.
    pub fn supports(&self, query_type: QueryType) -> bool {
        !matches!((self, query_type), (Self::Fofa, QueryType::Company))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fofa" => Ok(Self::Fofa),
            "hunter" => Ok(Self::Hunter),
            "quake" => Ok(Self::Quake),
            _ => Err(UnknownName(s.to_string())),
        }
    }
}

/// The declared kind of every target in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Ip,
    Domain,
    /// Organisation / company name. Not supported by FOFA.
    Company,
}

impl QueryType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Domain => "domain",
            Self::Company => "company",
        }
    }

    pub fn all() -> &'static [QueryType] {
        &[Self::Domain, Self::Ip, Self::Company]
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueryType {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ip" => Ok(Self::Ip),
            "domain" => Ok(Self::Domain),
            "company" => Ok(Self::Company),
            _ => Err(UnknownName(s.to_string())),
        }
    }
}

/// A source or query-type name that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name: {0}")]
pub struct UnknownName(pub String);
