//! The five dimension assessments and the composite quality score.
//!
//! Every function here is a pure function of (records, configuration).
//! Data content problems are recorded as issues; only configuration
//! problems (caught before these run) can fail a run.

use chrono::{NaiveDate, Utc};
use std::collections::HashMap;

use crate::analytics::utility::{mean, quantile, round2};
use crate::config::{AssessConfig, RangeRule};
use crate::quality::rating::rating;
use crate::quality::types::{Dimension, DimensionScore, Issue, QualityReport, Severity};
use crate::record::{Column, VisitRecord};

/// Completeness issues this many points below threshold escalate to HIGH.
const COMPLETENESS_HIGH_GAP: f64 = 5.0;

/// Runs all five dimension assessments and assembles the quality report.
///
/// Empty input is not an error: it yields zero scores and a single
/// HIGH-severity "no data" issue.
pub fn assess(records: &[VisitRecord], config: &AssessConfig, as_of: NaiveDate) -> QualityReport {
    if records.is_empty() {
        return empty_input_report();
    }

    let dimensions = vec![
        assess_completeness(records, &config.critical_columns, config.completeness_threshold),
        assess_uniqueness(records, config.key_column),
        assess_validity(records, &config.range_rules),
        assess_consistency(records, as_of),
        assess_accuracy(records, &config.numeric_columns, config.iqr_multiplier),
    ];

    let overall = round2(
        dimensions.iter().map(|d| d.score).sum::<f64>() / dimensions.len() as f64,
    );
    let issues: Vec<Issue> = dimensions.iter().flat_map(|d| d.issues.clone()).collect();

    QualityReport {
        schema_version: 1,
        generated_at: Utc::now(),
        record_count: records.len(),
        dimensions,
        overall_score: overall,
        rating: rating(overall),
        issues,
    }
}

/// Per-column fraction of non-null values across the critical columns;
/// the dimension score is the mean of the per-column percentages.
pub fn assess_completeness(
    records: &[VisitRecord],
    critical_columns: &[Column],
    threshold: f64,
) -> DimensionScore {
    let total = records.len();
    let mut percentages = Vec::with_capacity(critical_columns.len());
    let mut issues = Vec::new();

    for column in critical_columns {
        let non_null = records.iter().filter(|r| !column.is_null(r)).count();
        let pct = non_null as f64 / total as f64 * 100.0;
        percentages.push(pct);

        if pct < threshold {
            let severity = if threshold - pct >= COMPLETENESS_HIGH_GAP {
                Severity::High
            } else {
                Severity::Medium
            };
            issues.push(Issue::new(
                severity,
                Dimension::Completeness.to_string(),
                format!(
                    "Critical column '{column}' is {pct:.2}% complete ({} missing values)",
                    total - non_null
                ),
            ));
        }
    }

    DimensionScore {
        dimension: Dimension::Completeness,
        score: round2(mean(&percentages).unwrap_or(100.0)),
        issues,
    }
}

/// Score = 100 x (1 - duplicate_count / total), where duplicate_count is
/// every record whose key value occurs more than once. Null keys are a
/// completeness problem, not a duplication one.
pub fn assess_uniqueness(records: &[VisitRecord], key_column: Column) -> DimensionScore {
    let total = records.len();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        if let Some(value) = key_column.key_value(record) {
            *counts.entry(value).or_default() += 1;
        }
    }

    let duplicate_count: usize = counts.values().filter(|&&c| c > 1).sum();
    let duplicated_values = counts.values().filter(|&&c| c > 1).count();

    let mut issues = Vec::new();
    if duplicate_count > 0 {
        issues.push(Issue::new(
            Severity::High,
            Dimension::Uniqueness.to_string(),
            format!(
                "{duplicate_count} records share a '{key_column}' value with another record ({duplicated_values} duplicated values)"
            ),
        ));
    }

    DimensionScore {
        dimension: Dimension::Uniqueness,
        score: round2(100.0 * (1.0 - duplicate_count as f64 / total as f64)),
        issues,
    }
}

/// Score = 100 x fraction of non-null values within their configured
/// range, pooled across all range rules.
pub fn assess_validity(records: &[VisitRecord], range_rules: &[RangeRule]) -> DimensionScore {
    let mut checked = 0usize;
    let mut violations = 0usize;
    let mut issues = Vec::new();

    for rule in range_rules {
        let values: Vec<f64> = records
            .iter()
            .filter_map(|r| rule.column.numeric_value(r))
            .collect();
        let out_of_range = values.iter().filter(|v| !rule.contains(**v)).count();

        checked += values.len();
        violations += out_of_range;

        if out_of_range > 0 {
            issues.push(Issue::new(
                Severity::Medium,
                Dimension::Validity.to_string(),
                format!(
                    "{out_of_range} values in '{}' outside expected range {}-{}",
                    rule.column, rule.min, rule.max
                ),
            ));
        }
    }

    let score = if checked == 0 {
        100.0
    } else {
        round2(100.0 * (checked - violations) as f64 / checked as f64)
    };

    DimensionScore {
        dimension: Dimension::Validity,
        score,
        issues,
    }
}

/// Record-level logical rules: no visit date after `as_of`, and admitted
/// records must carry a department referral. Score = 100 x fraction of
/// records satisfying every rule.
pub fn assess_consistency(records: &[VisitRecord], as_of: NaiveDate) -> DimensionScore {
    let total = records.len();

    let future_date = |r: &VisitRecord| r.visit_date.is_some_and(|d| d > as_of);
    let admitted_without_referral = |r: &VisitRecord| r.is_admitted() && !r.has_referral();

    let future_count = records.iter().filter(|r| future_date(r)).count();
    let unreferred_count = records
        .iter()
        .filter(|r| admitted_without_referral(r))
        .count();
    let violators = records
        .iter()
        .filter(|r| future_date(r) || admitted_without_referral(r))
        .count();

    let mut issues = Vec::new();
    if future_count > 0 {
        issues.push(Issue::new(
            Severity::Medium,
            Dimension::Consistency.to_string(),
            format!("{future_count} records have a visit date in the future"),
        ));
    }
    if unreferred_count > 0 {
        issues.push(Issue::new(
            Severity::Medium,
            Dimension::Consistency.to_string(),
            format!("{unreferred_count} admitted records have no department referral"),
        ));
    }

    DimensionScore {
        dimension: Dimension::Consistency,
        score: round2(100.0 * (total - violators) as f64 / total as f64),
        issues,
    }
}

/// IQR-based outlier detection per numeric column; the dimension score is
/// the per-column outlier-free fraction averaged across columns. Columns
/// with no non-null values carry no evidence and are skipped.
pub fn assess_accuracy(
    records: &[VisitRecord],
    numeric_columns: &[Column],
    iqr_multiplier: f64,
) -> DimensionScore {
    let mut column_scores = Vec::new();
    let mut issues = Vec::new();

    for column in numeric_columns {
        let values: Vec<f64> = records
            .iter()
            .filter_map(|r| column.numeric_value(r))
            .collect();
        let (Some(q1), Some(q3)) = (quantile(&values, 0.25), quantile(&values, 0.75)) else {
            continue;
        };

        let iqr = q3 - q1;
        let lower = q1 - iqr_multiplier * iqr;
        let upper = q3 + iqr_multiplier * iqr;
        let outliers = values.iter().filter(|v| **v < lower || **v > upper).count();

        column_scores.push(100.0 * (1.0 - outliers as f64 / values.len() as f64));

        if outliers > 0 {
            issues.push(Issue::new(
                Severity::Low,
                Dimension::Accuracy.to_string(),
                format!("{outliers} statistical outliers in '{column}' (outside {lower:.2}-{upper:.2})"),
            ));
        }
    }

    DimensionScore {
        dimension: Dimension::Accuracy,
        score: round2(mean(&column_scores).unwrap_or(100.0)),
        issues,
    }
}

fn empty_input_report() -> QualityReport {
    let no_data = Issue::new(Severity::High, "Input", "no data");

    QualityReport {
        schema_version: 1,
        generated_at: Utc::now(),
        record_count: 0,
        dimensions: Dimension::ALL
            .into_iter()
            .map(|dimension| DimensionScore {
                dimension,
                score: 0.0,
                issues: Vec::new(),
            })
            .collect(),
        overall_score: 0.0,
        rating: rating(0.0),
        issues: vec![no_data],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_record(id: &str, day: u32) -> VisitRecord {
        VisitRecord {
            id: Some(id.to_string()),
            visit_date: NaiveDate::from_ymd_opt(2024, 3, day),
            age: Some(35),
            wait_time_minutes: Some(30.0),
            satisfaction_score: Some(7.0),
            department_referral: Some("General Practice".to_string()),
            gender: Some("F".to_string()),
            race: Some("White".to_string()),
            admitted: Some(false),
            time_of_day: Some(crate::record::TimeOfDay::Am),
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_empty_input_degenerate_report() {
        let report = assess(&[], &AssessConfig::default(), as_of());

        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::High);
        assert_eq!(report.issues[0].description, "no data");
        for dimension in &report.dimensions {
            assert_eq!(dimension.score, 0.0);
        }
    }

    #[test]
    fn test_completeness_full_and_monotone() {
        let mut records: Vec<VisitRecord> =
            (0..10).map(|i| clean_record(&format!("P-{i}"), 1 + i)).collect();
        let critical = [Column::VisitDate, Column::PatientId, Column::Age, Column::WaitTime];

        let full = assess_completeness(&records, &critical, 95.0);
        assert_eq!(full.score, 100.0);
        assert!(full.issues.is_empty());

        records[0].age = None;
        let one_null = assess_completeness(&records, &critical, 95.0);
        assert!(one_null.score < 100.0);

        records[1].age = None;
        let two_nulls = assess_completeness(&records, &critical, 95.0);
        assert!(two_nulls.score < one_null.score);
    }

    #[test]
    fn test_completeness_severity_scales_with_gap() {
        let mut records: Vec<VisitRecord> =
            (0..100).map(|i| clean_record(&format!("P-{i}"), 1)).collect();
        for record in records.iter_mut().take(2) {
            record.age = None;
        }
        // 98% complete, 2 points under a 100 threshold: MEDIUM.
        let near = assess_completeness(&records, &[Column::Age], 100.0);
        assert_eq!(near.issues[0].severity, Severity::Medium);

        for record in records.iter_mut().take(20) {
            record.age = None;
        }
        // 80% complete: HIGH.
        let far = assess_completeness(&records, &[Column::Age], 95.0);
        assert_eq!(far.issues[0].severity, Severity::High);
    }

    #[test]
    fn test_uniqueness_perfect_iff_no_repeats() {
        let records: Vec<VisitRecord> =
            (0..5).map(|i| clean_record(&format!("P-{i}"), 1 + i)).collect();
        let unique = assess_uniqueness(&records, Column::PatientId);
        assert_eq!(unique.score, 100.0);
        assert!(unique.issues.is_empty());

        let mut with_dup = records.clone();
        with_dup[1].id = Some("P-0".to_string());
        let dup = assess_uniqueness(&with_dup, Column::PatientId);
        assert!(dup.score < 100.0);
        assert_eq!(dup.issues[0].severity, Severity::High);
    }

    #[test]
    fn test_accuracy_flags_single_outlier() {
        let records: Vec<VisitRecord> = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, &wait)| VisitRecord {
                id: Some(format!("P-{i}")),
                wait_time_minutes: Some(wait),
                ..Default::default()
            })
            .collect();

        let result = assess_accuracy(&records, &[Column::WaitTime], 1.5);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Low);
        assert_eq!(result.score, round2(100.0 * 5.0 / 6.0));
    }

    #[test]
    fn test_accuracy_clean_column_has_no_outliers() {
        let records: Vec<VisitRecord> = [1.0, 2.0, 3.0, 4.0, 5.0]
            .iter()
            .map(|&wait| VisitRecord {
                wait_time_minutes: Some(wait),
                ..Default::default()
            })
            .collect();

        let result = assess_accuracy(&records, &[Column::WaitTime], 1.5);
        assert_eq!(result.score, 100.0);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_consistency_rules() {
        let mut records: Vec<VisitRecord> =
            (0..4).map(|i| clean_record(&format!("P-{i}"), 1 + i)).collect();
        records[0].visit_date = NaiveDate::from_ymd_opt(2024, 7, 1); // after as_of
        records[1].admitted = Some(true);
        records[1].department_referral = None;

        let result = assess_consistency(&records, as_of());
        assert_eq!(result.score, 50.0);
        assert_eq!(result.issues.len(), 2);
        assert!(result.issues.iter().all(|i| i.severity == Severity::Medium));
    }

    #[test]
    fn test_known_bad_snapshot_scenario() {
        // 10 records: one duplicated id pair, one negative age, one future date.
        let mut records: Vec<VisitRecord> =
            (0..10).map(|i| clean_record(&format!("P-{i}"), 1 + i)).collect();
        records[1].id = Some("P-0".to_string());
        records[2].age = Some(-5);
        records[3].visit_date = NaiveDate::from_ymd_opt(2024, 12, 25);

        let report = assess(&records, &AssessConfig::default(), as_of());

        assert_eq!(report.dimension_score(Dimension::Uniqueness), Some(80.0));
        assert!(report.overall_score < 100.0);
        for dimension in &report.dimensions {
            assert!(dimension.score >= 0.0 && dimension.score <= 100.0);
        }

        let validity_issue = report
            .issues
            .iter()
            .find(|i| i.category == "Validity")
            .expect("negative age flagged");
        assert!(validity_issue.description.contains("patient_age"));

        assert!(
            report
                .issues
                .iter()
                .any(|i| i.category == "Consistency" && i.description.contains("future"))
        );
    }

    #[test]
    fn test_scores_bounded_for_arbitrary_input() {
        let records = vec![VisitRecord::default(); 3];
        let report = assess(&records, &AssessConfig::default(), as_of());

        assert!(report.overall_score >= 0.0 && report.overall_score <= 100.0);
        for dimension in &report.dimensions {
            assert!(dimension.score >= 0.0 && dimension.score <= 100.0);
        }
    }
}
