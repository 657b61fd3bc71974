use crate::annotations::detection::Detection;
use crate::inference::detection_service::{DetectionService, InferenceError};
use crate::inference::prediction::parse_predictions;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Replays a saved service response instead of calling the detector, for offline annotation.
/// The uploaded bytes are ignored.
#[derive(Clone, Debug)]
pub struct RecordedPredictions {
    path: PathBuf,
    name: String,
}

impl RecordedPredictions {
    pub fn new(path: &Path) -> Self {
        RecordedPredictions {
            path: path.to_path_buf(),
            name: format!("recorded:{}", path.display()),
        }
    }
}

impl DetectionService for RecordedPredictions {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, _image_bytes: &[u8]) -> Result<Vec<Detection>, InferenceError> {
        let json = fs::read_to_string(&self.path)?;
        let detections = parse_predictions(&json)?;
        debug!("Replayed {} predictions from {}", detections.len(), self.path.display());
        Ok(detections)
    }
}
