use crate::records::patient_record::PatientRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DailyCount {
    pub cavity: usize,
    pub no_cavity: usize,
}

impl DailyCount {
    pub fn total(&self) -> usize {
        self.cavity + self.no_cavity
    }
}

/// Dashboard figures over the whole patient log.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RecordSummary {
    pub total_patients: usize,
    pub cavity_cases: usize,
    /// Cases per calendar day, split by outcome.
    pub daily: BTreeMap<NaiveDate, DailyCount>,
    /// Rows whose timestamp could not be read; counted in the totals but not per day.
    pub undated: usize,
}

impl RecordSummary {
    pub fn from_records(records: &[PatientRecord]) -> Self {
        let mut summary = RecordSummary {
            total_patients: records.len(),
            ..Default::default()
        };
        for record in records {
            let cavity = record.diagnosis.is_cavity();
            if cavity {
                summary.cavity_cases += 1;
            }
            match record.date() {
                Some(date) => {
                    let day = summary.daily.entry(date).or_default();
                    if cavity {
                        day.cavity += 1;
                    } else {
                        day.no_cavity += 1;
                    }
                }
                None => summary.undated += 1,
            }
        }
        summary
    }
}

impl fmt::Display for RecordSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Patients: {}", self.total_patients)?;
        writeln!(f, "Cavity Cases: {}", self.cavity_cases)?;
        for (date, count) in &self.daily {
            writeln!(
                f,
                "{}  {:>4} cases  ({} cavity, {} no cavity)",
                date,
                count.total(),
                count.cavity,
                count.no_cavity
            )?;
        }
        if self.undated > 0 {
            writeln!(f, "Undated records: {}", self.undated)?;
        }
        Ok(())
    }
}
