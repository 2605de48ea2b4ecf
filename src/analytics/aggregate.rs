//! Grouped descriptive statistics over a record snapshot.
//!
//! Every grouping is deterministic: time-based keys iterate in
//! chronological order, fixed category lists (age bands, weekdays, wait
//! buckets, satisfaction bands, AM/PM) always emit every bucket in their
//! declared order with zero counts included, and data-driven categories
//! (departments, gender) sort by descending count with a name tie-break.

use chrono::{Datelike, Utc};
use std::collections::BTreeMap;

use crate::analytics::buckets::{
    AGE_BANDS, SATISFACTION_BANDS, TIMES_OF_DAY, WAIT_BUCKETS, WEEKDAYS, age_band,
    satisfaction_band, wait_bucket, weekday_label,
};
use crate::analytics::types::{
    GroupRow, GroupStats, MonthlyTrend, PerformanceReport, Summary, WaitBucketRow,
    WaitSatisfactionCorrelation,
};
use crate::analytics::utility::{mean, pearson, round2};
use crate::record::VisitRecord;

/// Label used for records without a department referral.
pub const NO_REFERRAL: &str = "No Referral";
/// Label used for records without a recorded gender.
pub const UNKNOWN: &str = "Unknown";

/// Groups records by an optional key. Records whose key is `None` are left
/// out of the grouping. The `BTreeMap` gives callers a stable key order.
pub fn group_by<'a, K: Ord>(
    records: &'a [VisitRecord],
    key_fn: impl Fn(&VisitRecord) -> Option<K>,
) -> BTreeMap<K, Vec<&'a VisitRecord>> {
    let mut groups: BTreeMap<K, Vec<&VisitRecord>> = BTreeMap::new();
    for record in records {
        if let Some(key) = key_fn(record) {
            groups.entry(key).or_default().push(record);
        }
    }
    groups
}

/// Computes the fixed statistics tuple for one group.
///
/// Means are taken over non-null values only and are `None` when no value
/// contributes. Rates are percentages of the group count and are `None`
/// for an empty group.
pub fn aggregate(group: &[&VisitRecord]) -> GroupStats {
    if group.is_empty() {
        return GroupStats::empty();
    }

    let count = group.len();
    let waits: Vec<f64> = group.iter().filter_map(|r| r.wait_time_minutes).collect();
    let scores: Vec<f64> = group.iter().filter_map(|r| r.satisfaction_score).collect();
    let admitted = group.iter().filter(|r| r.is_admitted()).count();
    let referred = group.iter().filter(|r| r.has_referral()).count();

    GroupStats {
        count,
        mean_wait: mean(&waits).map(round2),
        mean_satisfaction: mean(&scores).map(round2),
        admission_rate: Some(round2(admitted as f64 / count as f64 * 100.0)),
        referral_rate: Some(round2(referred as f64 / count as f64 * 100.0)),
    }
}

/// Monthly statistics in calendar order, with month-over-month volume
/// growth (`None` for the first month).
pub fn monthly_trends(records: &[VisitRecord]) -> Vec<MonthlyTrend> {
    let groups = group_by(records, |r| {
        r.visit_date.map(|d| (d.year(), d.month()))
    });

    let mut trends = Vec::with_capacity(groups.len());
    let mut prev_count: Option<usize> = None;

    for ((year, month), group) in groups {
        let stats = aggregate(&group);
        let growth_pct = prev_count
            .map(|prev| round2((stats.count as f64 - prev as f64) / prev as f64 * 100.0));
        prev_count = Some(stats.count);

        trends.push(MonthlyTrend {
            month: format!("{year:04}-{month:02}"),
            stats,
            growth_pct,
        });
    }

    trends
}

/// Department statistics, descending by volume, with an explicit
/// "No Referral" bucket for records that carry none.
pub fn department_performance(records: &[VisitRecord]) -> Vec<GroupRow> {
    let mut groups = group_by(records, |r| {
        Some(
            r.department_referral
                .clone()
                .unwrap_or_else(|| NO_REFERRAL.to_string()),
        )
    });
    groups.entry(NO_REFERRAL.to_string()).or_default();

    ranked_rows(groups)
}

/// Statistics per fixed age band, in age order. Records with a null or
/// negative age fall outside every band and are not counted here.
pub fn age_band_analysis(records: &[VisitRecord]) -> Vec<GroupRow> {
    fixed_rows(AGE_BANDS.iter().map(|band| band.label), records, |r| {
        r.age.and_then(age_band)
    })
}

/// Statistics per weekday, Sunday through Saturday.
pub fn weekday_patterns(records: &[VisitRecord]) -> Vec<GroupRow> {
    fixed_rows(WEEKDAYS.iter().map(|w| weekday_label(*w)), records, |r| {
        r.visit_date.map(|d| weekday_label(d.weekday()))
    })
}

/// AM/PM visit split.
pub fn time_of_day_split(records: &[VisitRecord]) -> Vec<GroupRow> {
    let labels: Vec<String> = TIMES_OF_DAY.iter().map(|t| t.to_string()).collect();
    fixed_rows(labels.iter().map(String::as_str), records, |r| {
        r.time_of_day.map(|t| match t {
            crate::record::TimeOfDay::Am => "AM",
            crate::record::TimeOfDay::Pm => "PM",
        })
    })
}

/// Gender statistics, descending by volume, with an explicit "Unknown"
/// bucket for records without one.
pub fn gender_breakdown(records: &[VisitRecord]) -> Vec<GroupRow> {
    let mut groups = group_by(records, |r| {
        Some(r.gender.clone().unwrap_or_else(|| UNKNOWN.to_string()))
    });
    groups.entry(UNKNOWN.to_string()).or_default();

    ranked_rows(groups)
}

/// Statistics per satisfaction band in ascending band order. Records with
/// no score (or one outside the 0-10 scale) are not counted here.
pub fn satisfaction_bands(records: &[VisitRecord]) -> Vec<GroupRow> {
    fixed_rows(SATISFACTION_BANDS.iter().map(|band| band.label), records, |r| {
        r.satisfaction_score.and_then(satisfaction_band)
    })
}

/// Mean satisfaction per fixed wait-time bucket, plus Pearson's r over the
/// records where both values are present.
pub fn wait_satisfaction(records: &[VisitRecord]) -> WaitSatisfactionCorrelation {
    let groups = group_by(records, |r| r.wait_time_minutes.map(wait_bucket));

    let buckets = WAIT_BUCKETS
        .iter()
        .map(|bucket| {
            let group = groups.get(bucket.label).map(Vec::as_slice).unwrap_or(&[]);
            let scores: Vec<f64> = group.iter().filter_map(|r| r.satisfaction_score).collect();
            WaitBucketRow {
                bucket: bucket.label.to_string(),
                count: group.len(),
                mean_satisfaction: mean(&scores).map(round2),
            }
        })
        .collect();

    let mut waits = Vec::new();
    let mut scores = Vec::new();
    for record in records {
        if let (Some(w), Some(s)) = (record.wait_time_minutes, record.satisfaction_score) {
            waits.push(w);
            scores.push(s);
        }
    }

    WaitSatisfactionCorrelation {
        buckets,
        pearson_r: pearson(&waits, &scores).map(|r| (r * 10000.0).round() / 10000.0),
    }
}

/// Whole-snapshot headline figures.
pub fn summarize(records: &[VisitRecord]) -> Summary {
    let refs: Vec<&VisitRecord> = records.iter().collect();
    let dates: Vec<_> = records.iter().filter_map(|r| r.visit_date).collect();

    Summary {
        total_records: records.len(),
        first_visit: dates.iter().min().copied(),
        last_visit: dates.iter().max().copied(),
        stats: aggregate(&refs),
    }
}

/// Builds the full aggregation result set for one snapshot.
pub fn build_report(records: &[VisitRecord]) -> PerformanceReport {
    PerformanceReport {
        schema_version: 1,
        generated_at: Utc::now(),
        summary: summarize(records),
        monthly: monthly_trends(records),
        departments: department_performance(records),
        age_bands: age_band_analysis(records),
        weekdays: weekday_patterns(records),
        time_of_day: time_of_day_split(records),
        gender: gender_breakdown(records),
        satisfaction_bands: satisfaction_bands(records),
        wait_satisfaction: wait_satisfaction(records),
    }
}

/// Rows for a fixed category list: every bucket appears, in declared
/// order, zero counts included.
fn fixed_rows<'a>(
    labels: impl Iterator<Item = &'a str>,
    records: &[VisitRecord],
    key_fn: impl Fn(&VisitRecord) -> Option<&'static str>,
) -> Vec<GroupRow> {
    let groups = group_by(records, key_fn);

    labels
        .map(|label| {
            let group = groups.get(label).map(Vec::as_slice).unwrap_or(&[]);
            GroupRow {
                key: label.to_string(),
                stats: aggregate(group),
            }
        })
        .collect()
}

/// Rows for a data-driven category, descending by count with a stable
/// name tie-break.
fn ranked_rows(groups: BTreeMap<String, Vec<&VisitRecord>>) -> Vec<GroupRow> {
    let mut rows: Vec<GroupRow> = groups
        .into_iter()
        .map(|(key, group)| GroupRow {
            key,
            stats: aggregate(&group),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.stats
            .count
            .cmp(&a.stats.count)
            .then_with(|| a.key.cmp(&b.key))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: (i32, u32, u32), wait: f64, sat: Option<f64>) -> VisitRecord {
        VisitRecord {
            id: Some(format!("P-{}-{}", date.1, date.2)),
            visit_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
            age: Some(40),
            wait_time_minutes: Some(wait),
            satisfaction_score: sat,
            ..Default::default()
        }
    }

    #[test]
    fn test_aggregate_empty_group() {
        let stats = aggregate(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean_wait, None);
        assert_eq!(stats.admission_rate, None);
    }

    #[test]
    fn test_aggregate_all_null_satisfaction_is_none() {
        let records = vec![
            record((2024, 1, 1), 20.0, None),
            record((2024, 1, 2), 30.0, None),
        ];
        let refs: Vec<&VisitRecord> = records.iter().collect();
        let stats = aggregate(&refs);

        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean_wait, Some(25.0));
        assert_eq!(stats.mean_satisfaction, None);
    }

    #[test]
    fn test_monthly_growth() {
        let mut records = Vec::new();
        for day in 1..=10 {
            records.push(record((2024, 1, day), 20.0, Some(6.0)));
        }
        for day in 1..=15 {
            records.push(record((2024, 2, day), 20.0, Some(6.0)));
        }

        let trends = monthly_trends(&records);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].month, "2024-01");
        assert_eq!(trends[0].growth_pct, None);
        assert_eq!(trends[1].month, "2024-02");
        assert_eq!(trends[1].stats.count, 15);
        assert_eq!(trends[1].growth_pct, Some(50.0));
    }

    #[test]
    fn test_age_bands_are_exhaustive_for_valid_ages() {
        let records: Vec<VisitRecord> = [3, 15, 22, 38, 50, 70, 70, 90]
            .iter()
            .map(|&age| VisitRecord {
                age: Some(age),
                ..Default::default()
            })
            .collect();

        let rows = age_band_analysis(&records);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].key, "Pediatric (0-12)");
        assert_eq!(rows[5].key, "Senior (65+)");

        let total: usize = rows.iter().map(|r| r.stats.count).sum();
        assert_eq!(total, records.len());
        assert_eq!(rows[5].stats.count, 3);
    }

    #[test]
    fn test_empty_bands_still_emitted() {
        let records = vec![VisitRecord {
            age: Some(8),
            ..Default::default()
        }];

        let rows = age_band_analysis(&records);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1].stats.count, 0);
        assert_eq!(rows[1].stats.mean_wait, None);
    }

    #[test]
    fn test_department_ranking_and_no_referral_bucket() {
        let mut records = vec![
            VisitRecord {
                department_referral: Some("Cardiology".into()),
                ..Default::default()
            };
            3
        ];
        records.push(VisitRecord {
            department_referral: Some("Neurology".into()),
            ..Default::default()
        });
        records.push(VisitRecord::default());

        let rows = department_performance(&records);
        assert_eq!(rows[0].key, "Cardiology");
        assert_eq!(rows[0].stats.count, 3);
        assert!(rows.iter().any(|r| r.key == NO_REFERRAL && r.stats.count == 1));
    }

    #[test]
    fn test_weekday_order_is_sunday_first() {
        let rows = weekday_patterns(&[]);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]
        );
    }

    #[test]
    fn test_wait_satisfaction_buckets_and_pearson() {
        let records = vec![
            record((2024, 1, 1), 5.0, Some(9.0)),
            record((2024, 1, 2), 20.0, Some(8.0)),
            record((2024, 1, 3), 40.0, Some(6.0)),
            record((2024, 1, 4), 55.0, Some(5.0)),
            record((2024, 1, 5), 90.0, Some(2.0)),
        ];

        let correlation = wait_satisfaction(&records);
        assert_eq!(correlation.buckets.len(), 5);
        assert_eq!(correlation.buckets[0].bucket, "<15");
        assert_eq!(correlation.buckets[0].mean_satisfaction, Some(9.0));
        assert_eq!(correlation.buckets[4].bucket, "60+");
        assert_eq!(correlation.buckets[4].count, 1);

        // Longer waits, lower scores: strongly negative.
        assert!(correlation.pearson_r.unwrap() < -0.9);
    }

    #[test]
    fn test_report_is_idempotent_for_a_snapshot() {
        let records = vec![
            record((2024, 1, 1), 5.0, Some(9.0)),
            record((2024, 2, 2), 20.0, None),
        ];

        let a = build_report(&records);
        let b = build_report(&records);

        assert_eq!(a.summary, b.summary);
        assert_eq!(a.monthly, b.monthly);
        assert_eq!(a.departments, b.departments);
        assert_eq!(a.age_bands, b.age_bands);
        assert_eq!(a.weekdays, b.weekdays);
        assert_eq!(a.gender, b.gender);
        assert_eq!(a.satisfaction_bands, b.satisfaction_bands);
        assert_eq!(a.wait_satisfaction, b.wait_satisfaction);
    }
}
