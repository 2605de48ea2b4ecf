//! Typed visit records and column references.
//!
//! One [`VisitRecord`] per patient encounter, deserialized from the dataset
//! CSV. Every nullable dataset field is an explicit `Option` so consumers
//! must handle the missing case. Flag and time-of-day normalization happens
//! here, at the ingestion boundary.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::config::ConfigError;

/// AM/PM half of the visit day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Am => write!(f, "AM"),
            TimeOfDay::Pm => write!(f, "PM"),
        }
    }
}

/// A single patient encounter, as read from the dataset CSV.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitRecord {
    #[serde(rename = "patient_id")]
    pub id: Option<String>,
    #[serde(rename = "date", deserialize_with = "de_date", default)]
    pub visit_date: Option<NaiveDate>,
    #[serde(rename = "patient_age")]
    pub age: Option<i64>,
    #[serde(rename = "patient_waittime")]
    pub wait_time_minutes: Option<f64>,
    #[serde(rename = "patient_sat_score")]
    pub satisfaction_score: Option<f64>,
    #[serde(rename = "department_referral", deserialize_with = "de_category", default)]
    pub department_referral: Option<String>,
    #[serde(rename = "patient_gender", deserialize_with = "de_category", default)]
    pub gender: Option<String>,
    #[serde(rename = "patient_race", deserialize_with = "de_category", default)]
    pub race: Option<String>,
    #[serde(rename = "patient_admin_flag", deserialize_with = "de_flag", default)]
    pub admitted: Option<bool>,
    #[serde(rename = "Moment", deserialize_with = "de_time_of_day", default)]
    pub time_of_day: Option<TimeOfDay>,
}

impl VisitRecord {
    /// True when the record carries a department referral.
    pub fn has_referral(&self) -> bool {
        self.department_referral.is_some()
    }

    /// True when the record is a confirmed admission.
    pub fn is_admitted(&self) -> bool {
        self.admitted == Some(true)
    }
}

/// Dataset columns, as referenced by configuration (critical columns,
/// range rules, uniqueness key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Column {
    VisitDate,
    PatientId,
    Age,
    WaitTime,
    Satisfaction,
    Gender,
    Race,
    DepartmentReferral,
    AdmissionFlag,
    TimeOfDay,
}

impl Column {
    /// Canonical dataset header name.
    pub fn name(&self) -> &'static str {
        match self {
            Column::VisitDate => "date",
            Column::PatientId => "patient_id",
            Column::Age => "patient_age",
            Column::WaitTime => "patient_waittime",
            Column::Satisfaction => "patient_sat_score",
            Column::Gender => "patient_gender",
            Column::Race => "patient_race",
            Column::DepartmentReferral => "department_referral",
            Column::AdmissionFlag => "patient_admin_flag",
            Column::TimeOfDay => "Moment",
        }
    }

    /// True for columns that carry a numeric value.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Age | Column::WaitTime | Column::Satisfaction)
    }

    /// True when the record has no value for this column.
    pub fn is_null(&self, record: &VisitRecord) -> bool {
        match self {
            Column::VisitDate => record.visit_date.is_none(),
            Column::PatientId => record.id.is_none(),
            Column::Age => record.age.is_none(),
            Column::WaitTime => record.wait_time_minutes.is_none(),
            Column::Satisfaction => record.satisfaction_score.is_none(),
            Column::Gender => record.gender.is_none(),
            Column::Race => record.race.is_none(),
            Column::DepartmentReferral => record.department_referral.is_none(),
            Column::AdmissionFlag => record.admitted.is_none(),
            Column::TimeOfDay => record.time_of_day.is_none(),
        }
    }

    /// Numeric value of this column, for range rules and outlier checks.
    /// Always `None` for non-numeric columns.
    pub fn numeric_value(&self, record: &VisitRecord) -> Option<f64> {
        match self {
            Column::Age => record.age.map(|a| a as f64),
            Column::WaitTime => record.wait_time_minutes,
            Column::Satisfaction => record.satisfaction_score,
            _ => None,
        }
    }

    /// String rendering of this column's value, used as a uniqueness key.
    pub fn key_value(&self, record: &VisitRecord) -> Option<String> {
        match self {
            Column::VisitDate => record.visit_date.map(|d| d.to_string()),
            Column::PatientId => record.id.clone(),
            Column::Age => record.age.map(|a| a.to_string()),
            Column::WaitTime => record.wait_time_minutes.map(|w| w.to_string()),
            Column::Satisfaction => record.satisfaction_score.map(|s| s.to_string()),
            Column::Gender => record.gender.clone(),
            Column::Race => record.race.clone(),
            Column::DepartmentReferral => record.department_referral.clone(),
            Column::AdmissionFlag => record.admitted.map(|a| a.to_string()),
            Column::TimeOfDay => record.time_of_day.map(|t| t.to_string()),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Column {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "date" | "visit_date" => Ok(Column::VisitDate),
            "patient_id" | "id" => Ok(Column::PatientId),
            "patient_age" | "age" => Ok(Column::Age),
            "patient_waittime" | "wait_time_minutes" => Ok(Column::WaitTime),
            "patient_sat_score" | "satisfaction_score" => Ok(Column::Satisfaction),
            "patient_gender" | "gender" => Ok(Column::Gender),
            "patient_race" | "race" => Ok(Column::Race),
            "department_referral" => Ok(Column::DepartmentReferral),
            "patient_admin_flag" | "admission_flag" => Ok(Column::AdmissionFlag),
            "Moment" | "time_of_day" => Ok(Column::TimeOfDay),
            _ => Err(ConfigError::UnknownColumn(value)),
        }
    }
}

impl From<Column> for String {
    fn from(column: Column) -> Self {
        column.name().to_string()
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%m/%d/%Y %H:%M", "%d-%m-%y %H:%M"];

/// Parses the date column, tolerating the formats seen in exported datasets.
/// An unparseable value is a data issue (null), not an ingestion failure.
fn de_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else { return Ok(None) };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(Some(d));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Some(dt.date()));
        }
    }

    Ok(None)
}

/// Normalizes the stringly-typed admission flag to a boolean.
/// Anything other than a case variant of "True"/"False" becomes null.
fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }))
}

fn de_time_of_day<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<TimeOfDay>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.trim().to_ascii_uppercase().as_str() {
        "AM" => Some(TimeOfDay::Am),
        "PM" => Some(TimeOfDay::Pm),
        _ => None,
    }))
}

/// Category columns use the literal "None" as a null marker in the dataset.
fn de_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(s.to_string())
        }
    }))
}
