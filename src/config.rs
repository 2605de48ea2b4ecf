//! Assessment configuration.
//!
//! Stored as a plain JSON object on disk:
//! ```json
//! {
//!   "critical_columns": ["date", "patient_id", "patient_age", "patient_waittime"],
//!   "range_rules": [{ "column": "patient_age", "min": 0, "max": 120 }],
//!   "numeric_columns": ["patient_age", "patient_waittime", "patient_sat_score"],
//!   "iqr_multiplier": 1.5,
//!   "completeness_threshold": 95.0,
//!   "key_column": "patient_id"
//! }
//! ```
//!
//! Misconfiguration is fatal and surfaced before any assessment runs;
//! data content problems never are.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::Column;

/// Fatal configuration errors. Raised before a run starts, never during one.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown column '{0}' in configuration")]
    UnknownColumn(String),

    #[error("range rule for '{column}' is malformed: min {min} > max {max}")]
    InvalidRange { column: Column, min: f64, max: f64 },

    #[error("column '{0}' is not numeric and cannot carry a range or outlier rule")]
    NonNumericColumn(Column),
}

/// A valid-range rule for one numeric column (both bounds inclusive).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeRule {
    pub column: Column,
    pub min: f64,
    pub max: f64,
}

impl RangeRule {
    pub fn new(column: Column, min: f64, max: f64) -> Self {
        Self { column, min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Options recognized by the Quality Assessor, threaded explicitly through
/// every call rather than held in shared state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessConfig {
    /// Columns whose completeness is tracked and flagged.
    pub critical_columns: Vec<Column>,
    /// Valid-range rules checked by the validity dimension.
    pub range_rules: Vec<RangeRule>,
    /// Columns checked for statistical outliers by the accuracy dimension.
    pub numeric_columns: Vec<Column>,
    /// Multiplier applied to the IQR when computing outlier bounds.
    pub iqr_multiplier: f64,
    /// Minimum acceptable per-column completeness percentage.
    pub completeness_threshold: f64,
    /// Column whose values must be unique across the snapshot.
    pub key_column: Column,
}

impl Default for AssessConfig {
    fn default() -> Self {
        Self {
            critical_columns: vec![
                Column::VisitDate,
                Column::PatientId,
                Column::Age,
                Column::WaitTime,
            ],
            range_rules: vec![
                RangeRule::new(Column::Age, 0.0, 120.0),
                RangeRule::new(Column::WaitTime, 0.0, 300.0),
                RangeRule::new(Column::Satisfaction, 0.0, 10.0),
            ],
            numeric_columns: vec![Column::Age, Column::WaitTime, Column::Satisfaction],
            iqr_multiplier: 1.5,
            completeness_threshold: 95.0,
            key_column: Column::PatientId,
        }
    }
}

impl AssessConfig {
    /// Loads and validates a config from a JSON file at `path`.
    ///
    /// Unknown column names fail during deserialization; structural
    /// problems (reversed bounds, non-numeric rule targets) fail in
    /// [`AssessConfig::validate`].
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        let config: AssessConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config file {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks structural invariants the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.range_rules {
            if !rule.column.is_numeric() {
                return Err(ConfigError::NonNumericColumn(rule.column));
            }
            if rule.min > rule.max {
                return Err(ConfigError::InvalidRange {
                    column: rule.column,
                    min: rule.min,
                    max: rule.max,
                });
            }
        }

        for column in &self.numeric_columns {
            if !column.is_numeric() {
                return Err(ConfigError::NonNumericColumn(*column));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(AssessConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_reversed_bounds_rejected() {
        let mut config = AssessConfig::default();
        config.range_rules = vec![RangeRule::new(Column::Age, 120.0, 0.0)];

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                column: Column::Age,
                min: 120.0,
                max: 0.0,
            })
        );
    }

    #[test]
    fn test_non_numeric_rule_target_rejected() {
        let mut config = AssessConfig::default();
        config.numeric_columns.push(Column::Gender);

        assert_eq!(
            config.validate(),
            Err(ConfigError::NonNumericColumn(Column::Gender))
        );
    }

    #[test]
    fn test_unknown_column_fails_parse() {
        let raw = r#"{ "critical_columns": ["blood_type"] }"#;
        let parsed: Result<AssessConfig, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let raw = r#"{ "completeness_threshold": 90.0 }"#;
        let config: AssessConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.completeness_threshold, 90.0);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.key_column, Column::PatientId);
    }
}
