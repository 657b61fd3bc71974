use crate::annotations::detection::Detection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The categorical outcome for one X-ray.
///
/// Serialized with the same wording shown to the doctor, so patient records written by the
/// record log read back into this enum.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Diagnosis {
    #[serde(rename = "Cavity Detected")]
    CavityDetected,
    #[serde(rename = "No Cavity Detected")]
    NoCavityFound,
}

impl Diagnosis {
    /// CavityDetected iff at least one of the given detections is cavity-class. Callers pass
    /// only the detections that qualified.
    pub fn from_detections<'a, I>(detections: I) -> Self
    where
        I: IntoIterator<Item = &'a Detection>,
    {
        if detections.into_iter().any(Detection::is_cavity) {
            Diagnosis::CavityDetected
        } else {
            Diagnosis::NoCavityFound
        }
    }

    pub fn is_cavity(&self) -> bool {
        matches!(self, Diagnosis::CavityDetected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Diagnosis::CavityDetected => "Cavity Detected",
            Diagnosis::NoCavityFound => "No Cavity Detected",
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
