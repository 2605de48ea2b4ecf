//! Data types produced by the quality assessor.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// The five independent quality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dimension {
    Completeness,
    Uniqueness,
    Validity,
    Consistency,
    Accuracy,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Completeness,
        Dimension::Uniqueness,
        Dimension::Validity,
        Dimension::Consistency,
        Dimension::Accuracy,
    ];
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Completeness => "Completeness",
            Dimension::Uniqueness => "Uniqueness",
            Dimension::Validity => "Validity",
            Dimension::Consistency => "Consistency",
            Dimension::Accuracy => "Accuracy",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Low => write!(f, "LOW"),
        }
    }
}

/// One recorded data issue. Issues are findings, not errors: they never
/// abort a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    pub description: String,
}

impl Issue {
    pub fn new(severity: Severity, category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            description: description.into(),
        }
    }
}

/// Uniform result of one dimension assessment: a 0-100 score plus the
/// issues found along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub score: f64,
    pub issues: Vec<Issue>,
}

/// Complete quality assessment for one snapshot. Immutable once built;
/// the exporter serializes it as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub dimensions: Vec<DimensionScore>,
    pub overall_score: f64,
    pub rating: String,
    /// All issues in dimension order, the list reports and logs present.
    pub issues: Vec<Issue>,
}

impl QualityReport {
    pub fn dimension_score(&self, dimension: Dimension) -> Option<f64> {
        self.dimensions
            .iter()
            .find(|d| d.dimension == dimension)
            .map(|d| d.score)
    }

    pub fn high_severity_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::High)
            .count()
    }
}
