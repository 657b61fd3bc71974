use crate::annotations::bounding_box::{AnnotationError, BoundingBox};
use crate::annotations::point::Point;

/// A detection is what is produced as output from an object detection model.
///
/// A detection is any annotation combined with a confidence score: a probability value that
/// encodes the model's belief that the detection is true. Confidence is kept as reported, it is
/// not checked against [0, 1].
///
/// The center is stored as reported by the model rather than recomputed from the box corners,
/// so focus-radius checks see exactly the coordinates the service produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub annotation: BoundingBox,
    pub center: Point,
    pub confidence: f32,
}

impl Detection {
    pub fn from_center(
        center_x: f32,
        center_y: f32,
        width: f32,
        height: f32,
        class_label: &str,
        confidence: f32,
    ) -> Result<Self, AnnotationError> {
        let annotation =
            BoundingBox::from_center(center_x, center_y, width, height, class_label.to_string())?;
        Ok(Detection {
            annotation,
            center: Point::new(center_x, center_y),
            confidence,
        })
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn center_x(&self) -> f32 {
        self.center().x
    }

    pub fn center_y(&self) -> f32 {
        self.center().y
    }

    pub fn class_label(&self) -> &str {
        self.annotation.category()
    }

    /// True when the class label mentions a cavity, in any case.
    pub fn is_cavity(&self) -> bool {
        self.class_label().to_lowercase().contains("cavity")
    }

    /// The text drawn next to the box, e.g. `Cavity (0.92)`.
    pub fn label(&self) -> String {
        format!("{} ({:.2})", self.class_label(), self.confidence)
    }
}
