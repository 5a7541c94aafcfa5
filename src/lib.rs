// Library exports for reuse by other front-ends and tests
pub mod backend;
pub mod cli;
pub mod config_file;
pub mod error;
pub mod image_processing;
pub mod json_output;
pub mod utils;

// Re-export commonly used types
pub use backend::{Credentials, DetectionSource, Detector, ImageRef, ObjectStore, Session};
pub use error::CropError;
pub use image_processing::{CropPlan, ProcessingConfig, ProcessingEngine, ProcessingResult};
pub use json_output::JsonMessage;
