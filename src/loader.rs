//! Record Store ingestion: dataset CSV to an in-memory snapshot.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

use crate::record::VisitRecord;

/// The immutable record set one run operates on. Built once at run start,
/// read many times, discarded at run end.
pub struct Snapshot {
    pub records: Vec<VisitRecord>,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Reads all visit records from `path`.
///
/// Field-level problems (blank cells, unparseable dates, odd flag text)
/// become nulls inside the records; a structurally broken row aborts the
/// load so no record is ever silently dropped.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening dataset {}", path.display()))?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let record: VisitRecord = result
            .with_context(|| format!("malformed row {} in {}", i + 2, path.display()))?;
        records.push(record);
    }

    if records.is_empty() {
        warn!(path = %path.display(), "Dataset contains no records");
    } else {
        info!(path = %path.display(), records = records.len(), "Snapshot loaded");
    }

    Ok(Snapshot {
        records,
        loaded_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_load_snapshot_reads_all_rows() {
        let path = temp_path("visit_rater_test_load.csv");
        fs::write(
            &path,
            "date,patient_id,patient_gender,patient_age,patient_sat_score,patient_waittime,department_referral,patient_admin_flag,patient_race,Moment\n\
             2024-01-02,P-1,F,30,8,20,None,True,White,AM\n\
             2024-01-03,P-2,M,62,,55,Cardiology,False,Asian,PM\n",
        )
        .unwrap();

        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.records[0].id.as_deref(), Some("P-1"));
        assert!(snapshot.records[1].satisfaction_score.is_none());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_snapshot_empty_file_is_not_an_error() {
        let path = temp_path("visit_rater_test_load_empty.csv");
        fs::write(
            &path,
            "date,patient_id,patient_gender,patient_age,patient_sat_score,patient_waittime,department_referral,patient_admin_flag,patient_race,Moment\n",
        )
        .unwrap();

        let snapshot = load_snapshot(&path).unwrap();
        assert!(snapshot.is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_snapshot_missing_file() {
        assert!(load_snapshot(temp_path("visit_rater_no_such_file.csv")).is_err());
    }
}
