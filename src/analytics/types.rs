//! Result types produced by the aggregation engine.
//!
//! Everything here is a plain nested mapping when serialized (no cycles),
//! so the exporter can write it as JSON or flatten it into CSV rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Descriptive statistics for one group of records.
///
/// Means and rates are `None` when there is nothing to average over; the
/// exporter renders that as an explicit empty value, never 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub mean_wait: Option<f64>,
    pub mean_satisfaction: Option<f64>,
    pub admission_rate: Option<f64>,
    pub referral_rate: Option<f64>,
}

impl GroupStats {
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean_wait: None,
            mean_satisfaction: None,
            admission_rate: None,
            referral_rate: None,
        }
    }
}

/// One named group with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: String,
    #[serde(flatten)]
    pub stats: GroupStats,
}

/// Monthly statistics plus month-over-month volume growth.
/// `growth_pct` is `None` for the first month in the span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: String,
    #[serde(flatten)]
    pub stats: GroupStats,
    pub growth_pct: Option<f64>,
}

/// Mean satisfaction within one fixed wait-time bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitBucketRow {
    pub bucket: String,
    pub count: usize,
    pub mean_satisfaction: Option<f64>,
}

/// Evidentiary basis for any wait-time/satisfaction correlation claim:
/// the fixed buckets plus Pearson's r over complete pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitSatisfactionCorrelation {
    pub buckets: Vec<WaitBucketRow>,
    pub pearson_r: Option<f64>,
}

/// Whole-snapshot headline figures for the report summary block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_records: usize,
    pub first_visit: Option<NaiveDate>,
    pub last_visit: Option<NaiveDate>,
    #[serde(flatten)]
    pub stats: GroupStats,
}

/// Complete aggregation output for one run, exported as JSON and CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub monthly: Vec<MonthlyTrend>,
    pub departments: Vec<GroupRow>,
    pub age_bands: Vec<GroupRow>,
    pub weekdays: Vec<GroupRow>,
    pub time_of_day: Vec<GroupRow>,
    pub gender: Vec<GroupRow>,
    pub satisfaction_bands: Vec<GroupRow>,
    pub wait_satisfaction: WaitSatisfactionCorrelation,
}
