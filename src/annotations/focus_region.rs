use crate::annotations::point::Point;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FOCUS_RADIUS: f32 = 100.0;

/// A user-marked point of interest together with the radius around it that detections must
/// fall inside, in pixel units of the uploaded image.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct FocusRegion {
    pub center: Point,
    pub radius: f32,
}

impl FocusRegion {
    pub fn new(center: Point) -> Self {
        FocusRegion {
            center,
            radius: DEFAULT_FOCUS_RADIUS,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn distance_to(&self, point: &Point) -> f32 {
        self.center.distance_to(point)
    }

    /// Strictly inside: a point exactly on the circle does not count.
    pub fn contains(&self, point: &Point) -> bool {
        self.distance_to(point) < self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_radius_is_one_hundred() {
        let focus = FocusRegion::new(Point::new(0.0, 0.0));
        assert_eq!(focus.radius, 100.0);
    }

    #[test]
    fn boundary_point_is_outside() {
        let focus = FocusRegion::new(Point::new(0.0, 0.0));
        assert!(!focus.contains(&Point::new(60.0, 80.0)));
        assert!(focus.contains(&Point::new(60.0, 79.9)));
    }

    #[test]
    fn non_positive_radius_contains_nothing() {
        let focus = FocusRegion::new(Point::new(10.0, 10.0)).with_radius(0.0);
        assert!(!focus.contains(&Point::new(10.0, 10.0)));
        let focus = focus.with_radius(-5.0);
        assert!(!focus.contains(&Point::new(10.0, 10.0)));
    }
}
