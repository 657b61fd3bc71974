use crate::annotations::bounding_box::AnnotationError;
use crate::annotations::detection::Detection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference service answered with HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("could not reach inference service: {0}")]
    Transport(String),
    #[error("inference response is not valid JSON: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("prediction {index} is missing field '{field}'")]
    MalformedPrediction { index: usize, field: &'static str },
    #[error("prediction {index} has an invalid box: {source}")]
    InvalidBox {
        index: usize,
        #[source]
        source: AnnotationError,
    },
    #[error("could not read predictions: {0}")]
    Io(#[from] std::io::Error),
}

/// Defines a trait that every source of detections must follow.
///
/// The detector itself lives outside this crate. Implementations hand the encoded upload to it
/// and return the validated detections, in the order the service produced them.
pub trait DetectionService {
    /// Short human-readable name used in logs.
    fn name(&self) -> &str;

    fn detect(&self, image_bytes: &[u8]) -> Result<Vec<Detection>, InferenceError>;
}

impl<T: DetectionService + ?Sized> DetectionService for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn detect(&self, image_bytes: &[u8]) -> Result<Vec<Detection>, InferenceError> {
        (**self).detect(image_bytes)
    }
}
