//! Batch execution: every target against every available source, in order.
//!
//! Requests are strictly sequential. A failing (target, source) pair is
//! recorded and reported, and the loop moves on; nothing short of a
//! validation or configuration error stops a batch.

use std::collections::BTreeSet;
use std::fmt;

use crate::classify::Batch;
use crate::engine::SourceAdapter;
use crate::error::SearchError;
use crate::registry::SourceRegistry;
use crate::types::{Asset, QueryResultBlock, QueryType, Source};

use super::dedup::dedup;
use super::report::ReportSink;

/// Page selection for a batch. Hunter overrides `size` with its fixed 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 100 }
    }
}

impl PageRequest {
    /// # Errors
    ///
    /// [`SearchError::Validation`] if `page` or `size` is zero.
    pub fn new(page: u32, size: u32) -> Result<Self, SearchError> {
        if page == 0 {
            return Err(SearchError::Validation("page must be at least 1".into()));
        }
        if size == 0 {
            return Err(SearchError::Validation("size must be at least 1".into()));
        }
        Ok(Self { page, size })
    }
}

/// How a (target, source) pair failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The provider refused the key (HTTP 401/403).
    CredentialRejected,
    Failed,
}

/// A recorded (target, source) failure.
#[derive(Debug)]
pub struct PairFailure {
    pub target: String,
    pub source: Source,
    pub kind: FailureKind,
    pub error: SearchError,
}

impl PairFailure {
    fn new(target: &str, source: Source, error: SearchError) -> Self {
        let kind = if error.is_credential_rejection() {
            FailureKind::CredentialRejected
        } else {
            FailureKind::Failed
        };
        Self {
            target: target.to_string(),
            source,
            kind,
            error,
        }
    }
}

impl fmt::Display for PairFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} query for {} failed: {}", self.source, self.target, self.error)
    }
}

/// Everything gathered for one target.
#[derive(Debug)]
pub struct TargetReport {
    pub target: String,
    pub blocks: Vec<QueryResultBlock>,
    pub failures: Vec<PairFailure>,
}

impl TargetReport {
    fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            blocks: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// All assets from all blocks, in source order, before deduplication.
    pub fn raw_assets(&self) -> impl Iterator<Item = &Asset> {
        self.blocks.iter().flat_map(|b| b.results.iter())
    }

    pub fn raw_count(&self) -> usize {
        self.blocks.iter().map(|b| b.results.len()).sum()
    }

    /// This target's assets with duplicates removed.
    pub fn unique_assets(&self) -> Vec<Asset> {
        dedup(self.raw_assets().cloned().collect())
    }
}

/// Result of running one batch.
#[derive(Debug)]
pub struct BatchReport {
    pub query_type: QueryType,
    /// Per-target reports in batch order.
    pub targets: Vec<TargetReport>,
    /// Sources skipped for the whole batch because they cannot answer the
    /// query type.
    pub skipped: Vec<Source>,
}

impl BatchReport {
    /// Every pair failure across all targets.
    pub fn failures(&self) -> impl Iterator<Item = &PairFailure> {
        self.targets.iter().flat_map(|t| t.failures.iter())
    }

    /// Sum of per-target unique asset counts.
    pub fn unique_count(&self) -> usize {
        self.targets.iter().map(|t| t.unique_assets().len()).sum()
    }
}

/// Runs batches against a registry, reporting progress to a sink.
pub struct Orchestrator<'a> {
    registry: &'a SourceRegistry,
    sink: &'a dyn ReportSink,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a SourceRegistry, sink: &'a dyn ReportSink) -> Self {
        Self { registry, sink }
    }

    /// Query every target in `batch` against each of `sources`.
    ///
    /// `sources` should already be filtered to available ones. Duplicates
    /// are queried once.
    pub async fn run(&self, batch: &Batch, sources: &[Source], page: PageRequest) -> BatchReport {
        let query_type = batch.query_type();

        let mut seen = BTreeSet::new();
        let mut active = Vec::new();
        let mut skipped = Vec::new();
        for &source in sources {
            if !seen.insert(source) {
                continue;
            }
            if source.supports(query_type) {
                active.push(source);
            } else {
                // One notice per batch, not per target.
                self.sink.source_skipped(source, query_type);
                skipped.push(source);
            }
        }

        let total = batch.len();
        let mut targets = Vec::with_capacity(total);
        for (i, target) in batch.targets().iter().enumerate() {
            self.sink.target_started(target, i + 1, total);
            let report = self.run_target(target, query_type, &active, page).await;
            self.sink.target_finished(&report);
            targets.push(report);
        }

        BatchReport {
            query_type,
            targets,
            skipped,
        }
    }

    async fn run_target(
        &self,
        target: &str,
        query_type: QueryType,
        sources: &[Source],
        page: PageRequest,
    ) -> TargetReport {
        let mut report = TargetReport::new(target);
        for &source in sources {
            let adapter = self.registry.adapter(source);
            match adapter.search(target, query_type, page.page, page.size).await {
                Ok(block) => {
                    tracing::debug!(
                        %source,
                        count = block.results.len(),
                        total = block.total_size,
                        "pair succeeded"
                    );
                    self.sink.block_received(&block);
                    report.blocks.push(block);
                }
                Err(error) => {
                    let failure = PairFailure::new(target, source, error);
                    tracing::warn!(%source, error = %failure.error, "pair failed");
                    self.sink.pair_failed(&failure);
                    report.failures.push(failure);
                }
            }
        }
        report
    }
}
