//! Data quality assessment.
//!
//! Scores a snapshot along five independent dimensions (completeness,
//! uniqueness, validity, consistency, accuracy), records issues, and
//! combines the dimension scores into one overall quality score.

pub mod assess;
pub mod rating;
pub mod types;

pub use assess::assess;
pub use types::QualityReport;
