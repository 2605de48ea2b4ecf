//! The aggregation engine: grouped descriptive statistics over one
//! immutable snapshot, with deterministic group ordering for reports
//! and chart axes.

pub mod aggregate;
pub mod buckets;
pub mod types;
pub mod utility;

pub use aggregate::build_report;
pub use types::PerformanceReport;
