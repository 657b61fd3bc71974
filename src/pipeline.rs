//! One diagnosis request from upload to persisted record.
//!
//! Everything a request needs travels in a [`PatientContext`]; the pipeline itself holds no
//! per-patient state, so one pipeline can serve any number of requests.

use crate::annotations::focus_region::FocusRegion;
use crate::diagnosis::annotator::{Annotation, Annotator};
use crate::diagnosis::message::{DiagnosisMessage, Language};
use crate::image_utils::image_io::decode_image_bytes;
use crate::inference::detection_service::DetectionService;
use crate::records::patient_record::PatientRecord;
use crate::records::record_log::RecordLog;
use crate::records::report::DiagnosisReport;
use anyhow::{Context, Result, anyhow};
use image::RgbImage;
use log::info;

/// Who the upload belongs to and how they want the result delivered.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientContext {
    pub name: String,
    pub contact: String,
    pub language: Language,
    pub email: Option<String>,
}

impl PatientContext {
    /// Name and contact are both required before an upload is analysed.
    pub fn new(name: &str, contact: &str) -> Result<Self> {
        let name = name.trim();
        let contact = contact.trim();
        if name.is_empty() {
            return Err(anyhow!("patient name is required"));
        }
        if contact.is_empty() {
            return Err(anyhow!("patient contact number is required"));
        }
        Ok(PatientContext {
            name: name.to_string(),
            contact: contact.to_string(),
            language: Language::default(),
            email: None,
        })
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Blank addresses are treated as "no email".
    pub fn with_email(mut self, email: Option<&str>) -> Self {
        self.email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        self
    }
}

/// An annotated upload and what was derived from it.
#[derive(Debug)]
pub struct AnnotatedUpload {
    pub image: RgbImage,
    pub annotation: Annotation,
    pub message: DiagnosisMessage,
}

#[derive(Debug)]
pub struct DiagnosisOutcome {
    pub upload: AnnotatedUpload,
    pub record: PatientRecord,
    /// Present when the patient asked for the result by email.
    pub report: Option<DiagnosisReport>,
}

pub struct DiagnosisPipeline<S: DetectionService> {
    service: S,
    annotator: Annotator,
    records: Option<RecordLog>,
    mail_sender: Option<String>,
}

impl<S: DetectionService> DiagnosisPipeline<S> {
    pub fn new(service: S, annotator: Annotator) -> Self {
        DiagnosisPipeline {
            service,
            annotator,
            records: None,
            mail_sender: None,
        }
    }

    /// Persist every diagnosis to `log`.
    pub fn with_records(mut self, log: RecordLog) -> Self {
        self.records = Some(log);
        self
    }

    pub fn with_mail_sender(mut self, sender: Option<String>) -> Self {
        self.mail_sender = sender;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Decodes the upload, asks the detection service for predictions and annotates them.
    /// Undecodable uploads are rejected before the service is called.
    pub fn annotate_upload(
        &self,
        image_bytes: &[u8],
        focus: Option<&FocusRegion>,
        language: Language,
    ) -> Result<AnnotatedUpload> {
        let mut image = decode_image_bytes(image_bytes).context("uploaded file is not a readable image")?;
        info!(
            "Analysing {}x{} image with {}",
            image.width(),
            image.height(),
            self.service.name()
        );
        let detections = self
            .service
            .detect(image_bytes)
            .with_context(|| format!("detection with {} failed", self.service.name()))?;
        let annotation = self.annotator.annotate(&mut image, &detections, focus);
        let message = DiagnosisMessage::new(&annotation, language);
        info!(
            "{} ({} of {} detections drawn)",
            annotation.diagnosis,
            annotation.qualifying.len(),
            detections.len()
        );
        Ok(AnnotatedUpload {
            image,
            annotation,
            message,
        })
    }

    /// Runs a full request: annotate, then record the result for the patient.
    pub fn run(
        &self,
        context: &PatientContext,
        image_bytes: &[u8],
        focus: Option<&FocusRegion>,
    ) -> Result<DiagnosisOutcome> {
        let upload = self.annotate_upload(image_bytes, focus, context.language)?;
        let record = PatientRecord::now(&context.name, &context.contact, upload.annotation.diagnosis);
        if let Some(log) = &self.records {
            log.append(&record)?;
            info!("Saved patient record to {}", log.path().display());
        }
        let report = context.email.as_deref().map(|recipient| {
            DiagnosisReport::for_record(&record, recipient, self.mail_sender.as_deref())
        });
        Ok(DiagnosisOutcome {
            upload,
            record,
            report,
        })
    }
}
