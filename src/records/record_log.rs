use crate::records::patient_record::PatientRecord;
use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

pub const DEFAULT_RECORDS_PATH: &str = "patient_records.csv";

/// Append-only CSV log of diagnosed patients.
#[derive(Clone, Debug)]
pub struct RecordLog {
    path: PathBuf,
}

impl RecordLog {
    pub fn new(path: &Path) -> Self {
        RecordLog {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row. The header is written only when the file is new or empty.
    pub fn append(&self, record: &PatientRecord) -> Result<()> {
        let needs_header = fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open record log {}", self.path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer
            .serialize(record)
            .with_context(|| format!("failed to write record to {}", self.path.display()))?;
        writer.flush()?;
        debug!("Appended record for {} to {}", record.name, self.path.display());
        Ok(())
    }

    /// All records in file order. A log that does not exist yet holds no records.
    pub fn load(&self) -> Result<Vec<PatientRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open record log {}", self.path.display()))?;
        let mut records = Vec::new();
        for (row_idx, record) in reader.deserialize::<PatientRecord>().enumerate() {
            let record = record.with_context(|| {
                format!("failed to parse row {} of {}", row_idx + 1, self.path.display())
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Copies the log to `destination`, returning the number of bytes written.
    pub fn export_to(&self, destination: &Path) -> Result<u64> {
        if !self.path.exists() {
            return Err(anyhow!("no records found at {}", self.path.display()));
        }
        let bytes = fs::copy(&self.path, destination).with_context(|| {
            format!(
                "failed to export {} to {}",
                self.path.display(),
                destination.display()
            )
        })?;
        info!("Exported {} bytes of records to {}", bytes, destination.display());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::diagnosis::Diagnosis;
    use chrono::NaiveDate;

    fn record(name: &str, diagnosis: Diagnosis) -> PatientRecord {
        let at = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        PatientRecord::new(name, "555-0100", diagnosis, at)
    }

    #[test]
    fn missing_log_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = RecordLog::new(&dir.path().join("none.csv"));
        assert!(log.load().unwrap().is_empty());
        assert!(log.export_to(&dir.path().join("out.csv")).is_err());
    }

    #[test]
    fn appends_with_a_single_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records").join("patient_records.csv");
        let log = RecordLog::new(&path);
        log.append(&record("Asha", Diagnosis::CavityDetected)).unwrap();
        log.append(&record("Ravi, Jr.", Diagnosis::NoCavityFound)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Name,Contact,Datetime,Diagnosis\n\
             Asha,555-0100,2025-01-02 10:00:00,Cavity Detected\n\
             \"Ravi, Jr.\",555-0100,2025-01-02 10:00:00,No Cavity Detected\n"
        );

        let loaded = log.load().unwrap();
        assert_eq!(
            loaded,
            vec![
                record("Asha", Diagnosis::CavityDetected),
                record("Ravi, Jr.", Diagnosis::NoCavityFound)
            ]
        );
    }

    #[test]
    fn export_copies_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = RecordLog::new(&dir.path().join("log.csv"));
        log.append(&record("Asha", Diagnosis::CavityDetected)).unwrap();
        let dest = dir.path().join("download.csv");
        let bytes = log.export_to(&dest).unwrap();
        assert_eq!(bytes, fs::metadata(&dest).unwrap().len());
        assert_eq!(RecordLog::new(&dest).load().unwrap().len(), 1);
    }

    #[test]
    fn corrupt_row_is_reported_with_its_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(
            &path,
            "Name,Contact,Datetime,Diagnosis\nA,1,2025-01-02 10:00:00,Maybe\n",
        )
        .unwrap();
        let err = RecordLog::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
