use crate::annotations::point::Point;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnnotationError {
    #[error("Failed to create BoundingBox, value for left > value for right ({left} > {right}).")]
    InvertedHorizontal { left: f32, right: f32 },
    #[error("Failed to create BoundingBox, value for top > value for bottom ({top} > {bottom}).")]
    InvertedVertical { top: f32, bottom: f32 },
    #[error("Failed to create BoundingBox, coordinates must be finite.")]
    NonFinite,
}

/// A struct representing a bounding box.
///
/// A bounding box is a rectangle used to annotate objects in images. The hosted detection
/// service describes each box by its center, width and height; this struct stores the
/// corners so drawing and geometry do not need to recompute them.
///
/// This project uses the standard convention of the left side of the image being x=0 and the top
/// of the image being y=0. Boxes are never clamped to the image, a box may extend past the edge.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    category: String,
}

impl BoundingBox {
    /// Checks if a box has valid parameters before constructing.
    pub fn new(
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        category: String,
    ) -> Result<Self, AnnotationError> {
        if ![left, top, right, bottom].iter().all(|v| v.is_finite()) {
            Err(AnnotationError::NonFinite)
        } else if left > right {
            Err(AnnotationError::InvertedHorizontal { left, right })
        } else if top > bottom {
            Err(AnnotationError::InvertedVertical { top, bottom })
        } else {
            Ok(BoundingBox {
                left,
                top,
                right,
                bottom,
                category,
            })
        }
    }

    /// Builds a box from the center/size form the detection service reports.
    pub fn from_center(
        center_x: f32,
        center_y: f32,
        width: f32,
        height: f32,
        category: String,
    ) -> Result<Self, AnnotationError> {
        BoundingBox::new(
            center_x - width / 2.0,
            center_y - height / 2.0,
            center_x + width / 2.0,
            center_y + height / 2.0,
            category,
        )
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn right(&self) -> f32 {
        self.right
    }

    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.left + self.right) / 2.0,
            y: (self.top + self.bottom) / 2.0,
        }
    }

    pub fn as_xyxy(&self) -> (f32, f32, f32, f32) {
        (self.left, self.top, self.right, self.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_center_computes_corners() {
        let bbox = BoundingBox::from_center(50.0, 50.0, 10.0, 10.0, "Cavity".to_string()).unwrap();
        assert_eq!(bbox.as_xyxy(), (45.0, 45.0, 55.0, 55.0));
        assert_eq!(bbox.center(), Point::new(50.0, 50.0));
        assert_eq!(bbox.area(), 100.0);
        assert_eq!(bbox.category(), "Cavity");
    }

    #[test]
    fn boxes_past_the_image_edge_are_kept() {
        let bbox = BoundingBox::from_center(2.0, 3.0, 20.0, 10.0, "cavity".to_string()).unwrap();
        assert_eq!(bbox.as_xyxy(), (-8.0, -2.0, 12.0, 8.0));
    }

    #[test]
    fn inverted_boxes_are_rejected() {
        assert_eq!(
            BoundingBox::new(5.0, 0.0, 1.0, 1.0, "x".to_string()),
            Err(AnnotationError::InvertedHorizontal { left: 5.0, right: 1.0 })
        );
        assert_eq!(
            BoundingBox::from_center(0.0, 0.0, 2.0, -2.0, "x".to_string()),
            Err(AnnotationError::InvertedVertical { top: 1.0, bottom: -1.0 })
        );
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        assert_eq!(
            BoundingBox::from_center(f32::NAN, 0.0, 2.0, 2.0, "x".to_string()),
            Err(AnnotationError::NonFinite)
        );
    }
}
