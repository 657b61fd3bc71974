use crate::annotations::detection::Detection;
use crate::annotations::focus_region::FocusRegion;
use crate::diagnosis::diagnosis::Diagnosis;
use crate::overlay::renderer::OverlayRenderer;
use image::RgbImage;
use log::debug;

/// The result of annotating one image.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub diagnosis: Diagnosis,
    /// Detections that passed the focus filter, in the order the service returned them.
    pub qualifying: Vec<Detection>,
    /// The focus region the detections were filtered with, if any.
    pub focus: Option<FocusRegion>,
}

impl Annotation {
    pub fn is_focused(&self) -> bool {
        self.focus.is_some()
    }
}

/// Detections that may influence drawing and diagnosis.
///
/// Without a focus region every detection qualifies. With one, only detections whose center
/// lies strictly inside the radius do.
pub fn qualifying_detections<'a>(
    detections: &'a [Detection],
    focus: Option<&FocusRegion>,
) -> Vec<&'a Detection> {
    match focus {
        None => detections.iter().collect(),
        Some(region) => detections
            .iter()
            .filter(|d| region.contains(&d.center()))
            .collect(),
    }
}

/// Turns a list of detections into an overlay and a diagnosis.
#[derive(Clone, Debug, Default)]
pub struct Annotator {
    renderer: OverlayRenderer,
}

impl Annotator {
    pub fn new(renderer: OverlayRenderer) -> Self {
        Annotator { renderer }
    }

    pub fn renderer(&self) -> &OverlayRenderer {
        &self.renderer
    }

    /// Draws every qualifying detection onto `image` and derives the diagnosis from the same
    /// set. Non-qualifying detections are neither drawn nor counted, even when cavity-class.
    ///
    /// Drawing happens in place: the caller must not expect the original pixels to survive,
    /// and annotating the same canvas twice draws every box twice.
    pub fn annotate(
        &self,
        image: &mut RgbImage,
        detections: &[Detection],
        focus: Option<&FocusRegion>,
    ) -> Annotation {
        let qualifying = qualifying_detections(detections, focus);
        debug!(
            "{} of {} detections qualify{}",
            qualifying.len(),
            detections.len(),
            focus
                .map(|f| format!(" within {} px of ({}, {})", f.radius, f.center.x, f.center.y))
                .unwrap_or_default()
        );
        let diagnosis = Diagnosis::from_detections(qualifying.iter().copied());
        for detection in &qualifying {
            self.renderer.draw_detection(image, detection);
        }
        Annotation {
            diagnosis,
            qualifying: qualifying.into_iter().cloned().collect(),
            focus: focus.copied(),
        }
    }
}
