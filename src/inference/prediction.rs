use crate::annotations::detection::Detection;
use crate::inference::detection_service::InferenceError;
use serde::Deserialize;

/// One prediction as the hosted object-detection service reports it.
///
/// Every field is optional at the JSON level so a missing value can be reported precisely
/// instead of failing the whole document. Extra fields (`class_id`, `detection_id`, ...) are
/// ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawPrediction {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub class: Option<String>,
    pub confidence: Option<f32>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct InferenceResponse {
    #[serde(default)]
    pub predictions: Vec<RawPrediction>,
    pub image: Option<ImageSize>,
    pub time: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionPayload {
    Bare(Vec<RawPrediction>),
    Response(InferenceResponse),
}

impl RawPrediction {
    /// Checks that all five fields are present. A record with a missing field is an error,
    /// never skipped, since dropping it could change the diagnosis.
    pub fn into_detection(self, index: usize) -> Result<Detection, InferenceError> {
        let missing = |field| InferenceError::MalformedPrediction { index, field };
        let x = self.x.ok_or_else(|| missing("x"))?;
        let y = self.y.ok_or_else(|| missing("y"))?;
        let width = self.width.ok_or_else(|| missing("width"))?;
        let height = self.height.ok_or_else(|| missing("height"))?;
        let class = self.class.ok_or_else(|| missing("class"))?;
        let confidence = self.confidence.ok_or_else(|| missing("confidence"))?;
        Detection::from_center(x, y, width, height, &class, confidence)
            .map_err(|source| InferenceError::InvalidBox { index, source })
    }
}

impl InferenceResponse {
    pub fn into_detections(self) -> Result<Vec<Detection>, InferenceError> {
        self.predictions
            .into_iter()
            .enumerate()
            .map(|(index, raw)| raw.into_detection(index))
            .collect()
    }
}

/// Parses a service response, or a bare JSON array of predictions, into detections.
///
/// A document without a `predictions` key yields no detections.
pub fn parse_predictions(json: &str) -> Result<Vec<Detection>, InferenceError> {
    let response = match serde_json::from_str::<PredictionPayload>(json)? {
        PredictionPayload::Bare(predictions) => InferenceResponse {
            predictions,
            ..Default::default()
        },
        PredictionPayload::Response(response) => response,
    };
    response.into_detections()
}
