//! Fixed category buckets used for grouping and chart axes.
//!
//! Orders are deterministic (age bands in age order, weekdays
//! Sunday-first, wait buckets ascending) so report rows and chart axes
//! are reproducible across runs.

use chrono::Weekday;

use crate::record::TimeOfDay;

/// An age band: inclusive lower edge, inclusive upper edge (`None` = open).
pub struct AgeBand {
    pub label: &'static str,
    pub min: i64,
    pub max: Option<i64>,
}

pub const AGE_BANDS: &[AgeBand] = &[
    AgeBand { label: "Pediatric (0-12)", min: 0, max: Some(12) },
    AgeBand { label: "Adolescent (13-17)", min: 13, max: Some(17) },
    AgeBand { label: "Young Adult (18-29)", min: 18, max: Some(29) },
    AgeBand { label: "Adult (30-44)", min: 30, max: Some(44) },
    AgeBand { label: "Middle Age (45-64)", min: 45, max: Some(64) },
    AgeBand { label: "Senior (65+)", min: 65, max: None },
];

/// Band label for an age, or `None` for ages below every band.
pub fn age_band(age: i64) -> Option<&'static str> {
    AGE_BANDS
        .iter()
        .find(|band| age >= band.min && band.max.is_none_or(|max| age <= max))
        .map(|band| band.label)
}

/// Wait-time bucket: inclusive lower edge, exclusive upper edge.
pub struct WaitBucket {
    pub label: &'static str,
    pub max_exclusive: Option<f64>,
}

pub const WAIT_BUCKETS: &[WaitBucket] = &[
    WaitBucket { label: "<15", max_exclusive: Some(15.0) },
    WaitBucket { label: "15-30", max_exclusive: Some(30.0) },
    WaitBucket { label: "30-45", max_exclusive: Some(45.0) },
    WaitBucket { label: "45-60", max_exclusive: Some(60.0) },
    WaitBucket { label: "60+", max_exclusive: None },
];

pub fn wait_bucket(wait_minutes: f64) -> &'static str {
    WAIT_BUCKETS
        .iter()
        .find(|bucket| bucket.max_exclusive.is_none_or(|max| wait_minutes < max))
        .map(|bucket| bucket.label)
        .unwrap_or("60+")
}

/// Satisfaction band: inclusive upper edge, ascending.
pub struct SatisfactionBand {
    pub label: &'static str,
    pub max: f64,
}

pub const SATISFACTION_BANDS: &[SatisfactionBand] = &[
    SatisfactionBand { label: "Poor (0-3)", max: 3.0 },
    SatisfactionBand { label: "Fair (4-6)", max: 6.0 },
    SatisfactionBand { label: "Good (7-8)", max: 8.0 },
    SatisfactionBand { label: "Excellent (9-10)", max: 10.0 },
];

/// Band label for a satisfaction score, `None` outside [0, 10].
pub fn satisfaction_band(score: f64) -> Option<&'static str> {
    if score < 0.0 {
        return None;
    }
    SATISFACTION_BANDS
        .iter()
        .find(|band| score <= band.max)
        .map(|band| band.label)
}

/// Sunday-first weekday order used by all weekday groupings.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

pub const TIMES_OF_DAY: [TimeOfDay; 2] = [TimeOfDay::Am, TimeOfDay::Pm];
