//! Source adapter implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SourceAdapter`]
//! for one provider API. [`Adapter`] is the closed set the registry hands out.

pub mod fofa;
pub mod hunter;
pub mod quake;

pub use fofa::FofaEngine;
pub use hunter::HunterEngine;
pub use quake::QuakeEngine;

use crate::config::SearchConfig;
use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::types::{QueryResultBlock, QueryType, Source};

/// One of the known provider adapters.
#[derive(Debug, Clone)]
pub enum Adapter {
    Fofa(FofaEngine),
    Hunter(HunterEngine),
    Quake(QuakeEngine),
}

impl Adapter {
    /// Build the adapter for `source`, sharing `client`.
    pub fn new(source: Source, config: &SearchConfig, client: reqwest::Client) -> Self {
        match source {
            Source::Fofa => Self::Fofa(FofaEngine::new(config, client)),
            Source::Hunter => Self::Hunter(HunterEngine::new(config, client)),
            Source::Quake => Self::Quake(QuakeEngine::new(config, client)),
        }
    }
}

impl SourceAdapter for Adapter {
    async fn search(
        &self,
        query: &str,
        query_type: QueryType,
        page: u32,
        size: u32,
    ) -> Result<QueryResultBlock, SearchError> {
        match self {
            Self::Fofa(e) => e.search(query, query_type, page, size).await,
            Self::Hunter(e) => e.search(query, query_type, page, size).await,
            Self::Quake(e) => e.search(query, query_type, page, size).await,
        }
    }

    async fn verify_credential(&self) -> Result<(), SearchError> {
        match self {
            Self::Fofa(e) => e.verify_credential().await,
            Self::Hunter(e) => e.verify_credential().await,
            Self::Quake(e) => e.verify_credential().await,
        }
    }

    fn source(&self) -> Source {
        match self {
            Self::Fofa(_) => Source::Fofa,
            Self::Hunter(_) => Source::Hunter,
            Self::Quake(_) => Source::Quake,
        }
    }

    fn has_credential(&self) -> bool {
        match self {
            Self::Fofa(e) => e.has_credential(),
            Self::Hunter(e) => e.has_credential(),
            Self::Quake(e) => e.has_credential(),
        }
    }
}
