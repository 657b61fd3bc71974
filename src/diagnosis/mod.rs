pub mod annotator;
#[allow(clippy::module_inception)]
pub mod diagnosis;
pub mod message;
