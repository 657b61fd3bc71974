pub mod bounding_box;
pub mod detection;
pub mod focus_region;
pub mod point;
