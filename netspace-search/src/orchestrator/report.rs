//! Progress reporting for batches.
//!
//! The orchestrator never prints. Everything a user should see is handed to
//! a [`ReportSink`] supplied by the caller: the CLI renders it to the
//! terminal, tests record it, and [`TracingSink`] turns it into log events.

use crate::probe::CredentialStatus;
use crate::types::{QueryResultBlock, QueryType, Source};

use super::search::{PairFailure, TargetReport};

/// Receiver for orchestration progress events.
///
/// All methods take `&self`; implementors needing state use interior
/// mutability. Every method has an empty default so sinks only implement
/// the events they care about.
pub trait ReportSink: Send + Sync {
    /// A source's credential was checked (or found missing).
    fn credential_checked(&self, _status: &CredentialStatus) {}

    /// Work on `target` (1-indexed `position` of `total`) is starting.
    fn target_started(&self, _target: &str, _position: usize, _total: usize) {}

    /// `source` cannot answer `query_type` queries and is skipped for the
    /// whole batch. Reported once per batch.
    fn source_skipped(&self, _source: Source, _query_type: QueryType) {}

    /// A (target, source) pair succeeded.
    fn block_received(&self, _block: &QueryResultBlock) {}

    /// A (target, source) pair failed; the batch continues.
    fn pair_failed(&self, _failure: &PairFailure) {}

    /// All sources for a target have been queried.
    fn target_finished(&self, _report: &TargetReport) {}
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {}

/// Sink that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn credential_checked(&self, status: &CredentialStatus) {
        tracing::info!(
            source = %status.source,
            available = status.available,
            reason = %status.reason,
            "credential checked"
        );
    }

    fn target_started(&self, target: &str, position: usize, total: usize) {
        tracing::trace!(%target, position, total, "target started");
    }

    fn source_skipped(&self, source: Source, query_type: QueryType) {
        tracing::info!(%source, %query_type, "source does not support query type, skipped");
    }

    fn block_received(&self, block: &QueryResultBlock) {
        match block.emptiness() {
            Some(empty) => tracing::info!(source = %block.source, "{empty}"),
            None => tracing::debug!(
                source = %block.source,
                count = block.results.len(),
                total = block.total_size,
                "results received"
            ),
        }
    }

    fn pair_failed(&self, failure: &PairFailure) {
        tracing::warn!(
            source = %failure.source,
            target = %failure.target,
            error = %failure.error,
            "query failed"
        );
    }

    fn target_finished(&self, report: &TargetReport) {
        tracing::debug!(
            target = %report.target,
            blocks = report.blocks.len(),
            failures = report.failures.len(),
            "target finished"
        );
    }
}
