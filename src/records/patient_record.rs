use crate::diagnosis::diagnosis::Diagnosis;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the patient log. Column names match the log files already in use.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PatientRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Contact")]
    pub contact: String,
    #[serde(rename = "Datetime")]
    pub datetime: String,
    #[serde(rename = "Diagnosis")]
    pub diagnosis: Diagnosis,
}

impl PatientRecord {
    pub fn new(name: &str, contact: &str, diagnosis: Diagnosis, at: NaiveDateTime) -> Self {
        PatientRecord {
            name: name.to_string(),
            contact: contact.to_string(),
            datetime: at.format(DATETIME_FORMAT).to_string(),
            diagnosis,
        }
    }

    /// Stamped with the local wall-clock time.
    pub fn now(name: &str, contact: &str, diagnosis: Diagnosis) -> Self {
        PatientRecord::new(name, contact, diagnosis, Local::now().naive_local())
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.datetime, DATETIME_FORMAT).ok()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp().map(|t| t.date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_and_parses_datetime() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 30)
            .unwrap();
        let record = PatientRecord::new("Asha", "98400", Diagnosis::CavityDetected, at);
        assert_eq!(record.datetime, "2025-03-07 09:05:30");
        assert_eq!(record.timestamp(), Some(at));
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2025, 3, 7));
    }

    #[test]
    fn unparsable_datetime_has_no_date() {
        let mut record = PatientRecord::now("A", "1", Diagnosis::NoCavityFound);
        assert!(record.date().is_some());
        record.datetime = "yesterday".to_string();
        assert_eq!(record.date(), None);
    }
}
