use crate::diagnosis::diagnosis::Diagnosis;
use crate::records::patient_record::PatientRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const REPORT_SUBJECT: &str = "Dental Cavity Diagnosis";

/// The message mailed to a patient. Delivery is left to the mail system; this only renders it.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosisReport {
    pub sender: Option<String>,
    pub recipient: String,
    pub patient_name: String,
    pub diagnosis: Diagnosis,
    pub datetime: String,
}

impl DiagnosisReport {
    pub fn for_record(record: &PatientRecord, recipient: &str, sender: Option<&str>) -> Self {
        DiagnosisReport {
            sender: sender.map(str::to_string),
            recipient: recipient.to_string(),
            patient_name: record.name.clone(),
            diagnosis: record.diagnosis,
            datetime: record.datetime.clone(),
        }
    }

    pub fn subject(&self) -> &'static str {
        REPORT_SUBJECT
    }

    pub fn body(&self) -> String {
        format!(
            "Patient Name: {}\nDiagnosis: {}\nDate: {}",
            self.patient_name, self.diagnosis, self.datetime
        )
    }

    /// Headers plus body, ready to hand to a mail transfer agent.
    pub fn to_message(&self) -> String {
        let mut message = String::new();
        if let Some(sender) = &self.sender {
            message.push_str(&format!("From: {}\n", sender));
        }
        message.push_str(&format!("To: {}\n", self.recipient));
        message.push_str(&format!("Subject: {}\n\n", self.subject()));
        message.push_str(&self.body());
        message.push('\n');
        message
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        fs::write(path, self.to_message())
            .with_context(|| format!("failed to write report {}", path.display()))
    }
}
