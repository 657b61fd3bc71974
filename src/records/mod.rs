pub mod patient_record;
pub mod record_log;
pub mod report;
pub mod summary;
