//! Report export: timestamped JSON and CSV artifacts, plus the
//! chart-ready series payload consumed by the visualization renderer.
//!
//! Export is pure serialization of already-computed results, so a retried
//! export writes identical content. Each run gets its own timestamp
//! suffix; earlier artifacts are never overwritten.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analytics::types::PerformanceReport;
use crate::quality::types::QualityReport;

/// Timestamp suffix shared by all artifacts of one run.
pub fn run_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Serializes a value as pretty JSON to `path`.
fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Renders an optional numeric cell: empty when there is no data, never 0.
fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes the quality report as JSON plus a flat issues CSV.
pub fn export_quality_report(
    dir: &Path,
    timestamp: &str,
    report: &QualityReport,
) -> Result<Vec<PathBuf>> {
    let json_path = dir.join(format!("quality_report_{timestamp}.json"));
    write_json(&json_path, report)?;

    let csv_path = dir.join(format!("quality_issues_{timestamp}.csv"));
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("creating {}", csv_path.display()))?;
    writer.write_record(["severity", "category", "description"])?;
    for issue in &report.issues {
        writer.write_record([
            issue.severity.to_string().as_str(),
            issue.category.as_str(),
            issue.description.as_str(),
        ])?;
    }
    writer.flush()?;

    info!(
        json = %json_path.display(),
        issues = report.issues.len(),
        "Quality report exported"
    );
    Ok(vec![json_path, csv_path])
}

/// Writes the performance report as JSON plus per-section CSVs
/// (monthly trends, departments, age bands, weekdays).
pub fn export_performance_report(
    dir: &Path,
    timestamp: &str,
    report: &PerformanceReport,
) -> Result<Vec<PathBuf>> {
    let json_path = dir.join(format!("performance_report_{timestamp}.json"));
    write_json(&json_path, report)?;

    let monthly_path = dir.join(format!("monthly_trends_{timestamp}.csv"));
    {
        let mut writer = csv::Writer::from_path(&monthly_path)?;
        writer.write_record([
            "month",
            "count",
            "mean_wait",
            "mean_satisfaction",
            "admission_rate",
            "referral_rate",
            "growth_pct",
        ])?;
        for trend in &report.monthly {
            writer.write_record([
                trend.month.clone(),
                trend.stats.count.to_string(),
                cell(trend.stats.mean_wait),
                cell(trend.stats.mean_satisfaction),
                cell(trend.stats.admission_rate),
                cell(trend.stats.referral_rate),
                cell(trend.growth_pct),
            ])?;
        }
        writer.flush()?;
    }

    let sections = [
        ("department_performance", &report.departments),
        ("age_group_analysis", &report.age_bands),
        ("weekday_patterns", &report.weekdays),
    ];
    let mut paths = vec![json_path, monthly_path];

    for (name, rows) in sections {
        let path = dir.join(format!("{name}_{timestamp}.csv"));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record([
            "group",
            "count",
            "mean_wait",
            "mean_satisfaction",
            "admission_rate",
            "referral_rate",
        ])?;
        for row in rows.iter() {
            writer.write_record([
                row.key.clone(),
                row.stats.count.to_string(),
                cell(row.stats.mean_wait),
                cell(row.stats.mean_satisfaction),
                cell(row.stats.admission_rate),
                cell(row.stats.referral_rate),
            ])?;
        }
        writer.flush()?;
        paths.push(path);
    }

    info!(dir = %dir.display(), files = paths.len(), "Performance report exported");
    Ok(paths)
}

/// One labeled chart axis/series pair. Label order is the deterministic
/// bucket order the renderer must keep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

/// Chart-ready payload for the external visualization renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub generated_at: DateTime<Utc>,
    pub monthly_volume: Series,
    pub monthly_mean_wait: Series,
    pub monthly_mean_satisfaction: Series,
    pub monthly_admission_rate: Series,
    pub department_volume: Series,
    pub age_band_volume: Series,
    pub weekday_volume: Series,
    pub time_of_day_volume: Series,
    pub wait_bucket_satisfaction: Series,
}

/// Builds the renderer payload from a performance report.
pub fn chart_data(report: &PerformanceReport) -> ChartData {
    let monthly_labels: Vec<String> = report.monthly.iter().map(|t| t.month.clone()).collect();
    let monthly = |f: fn(&crate::analytics::types::MonthlyTrend) -> Option<f64>| Series {
        labels: monthly_labels.clone(),
        values: report.monthly.iter().map(f).collect(),
    };
    let rows = |rows: &[crate::analytics::types::GroupRow]| Series {
        labels: rows.iter().map(|r| r.key.clone()).collect(),
        values: rows.iter().map(|r| Some(r.stats.count as f64)).collect(),
    };

    ChartData {
        generated_at: report.generated_at,
        monthly_volume: monthly(|t| Some(t.stats.count as f64)),
        monthly_mean_wait: monthly(|t| t.stats.mean_wait),
        monthly_mean_satisfaction: monthly(|t| t.stats.mean_satisfaction),
        monthly_admission_rate: monthly(|t| t.stats.admission_rate),
        department_volume: rows(&report.departments),
        age_band_volume: rows(&report.age_bands),
        weekday_volume: rows(&report.weekdays),
        time_of_day_volume: rows(&report.time_of_day),
        wait_bucket_satisfaction: Series {
            labels: report
                .wait_satisfaction
                .buckets
                .iter()
                .map(|b| b.bucket.clone())
                .collect(),
            values: report
                .wait_satisfaction
                .buckets
                .iter()
                .map(|b| b.mean_satisfaction)
                .collect(),
        },
    }
}

/// Writes the chart payload as JSON.
pub fn export_chart_data(
    dir: &Path,
    timestamp: &str,
    report: &PerformanceReport,
) -> Result<PathBuf> {
    let path = dir.join(format!("chart_data_{timestamp}.json"));
    write_json(&path, &chart_data(report))?;
    info!(path = %path.display(), "Chart data exported");
    Ok(path)
}
