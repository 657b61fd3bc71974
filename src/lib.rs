//! Dental X-ray cavity detection: turn a hosted detector's predictions into an annotated image,
//! a diagnosis and a patient record.

pub mod annotations;
pub mod config;
pub mod diagnosis;
pub mod image_utils;
pub mod inference;
pub mod overlay;
pub mod pipeline;
pub mod records;
