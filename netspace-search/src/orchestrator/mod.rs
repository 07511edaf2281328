//! Batch orchestration: sequential source × target queries, progress
//! reporting, and per-target deduplication.

pub mod dedup;
pub mod host_normalize;
pub mod report;
pub mod search;

pub use report::{NullSink, ReportSink, TracingSink};
pub use search::{BatchReport, FailureKind, Orchestrator, PageRequest, PairFailure, TargetReport};
