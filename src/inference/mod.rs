pub mod detection_service;
pub mod hosted_model;
pub mod prediction;
pub mod recorded;
