//! JSON output for scripted use
//!
//! When --json is enabled, every event of the run is emitted as one JSON line
//! on stdout and the human-oriented output is suppressed.

use serde::{Deserialize, Serialize};

use crate::image_processing::ProcessingResult;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct JsonRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct JsonShift {
    pub horizontal: f64,
    pub vertical: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Detection finished
    Detected {
        image: String,
        labels: Vec<String>,
        instances: usize,
    },
    /// Crop planned and (unless dry run) saved
    Completed {
        image: String,
        output_path: Option<String>,
        debug_path: Option<String>,
        rect: JsonRect,
        shift: JsonShift,
        content_hash: String,
        processing_time_ms: u128,
    },
    /// Run failed
    Failed { image: String, error: String },
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn detected(result: &ProcessingResult) -> Self {
        Self::Detected {
            image: result.image.to_string(),
            labels: result.labels.iter().map(|l| l.name.clone()).collect(),
            instances: result.instance_count(),
        }
    }

    pub fn completed(result: &ProcessingResult) -> Self {
        let rect = &result.plan.rect;
        Self::Completed {
            image: result.image.to_string(),
            output_path: result
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
            debug_path: result.debug_path.as_ref().map(|p| p.display().to_string()),
            rect: JsonRect {
                left: rect.left,
                top: rect.top,
                right: rect.right,
                bottom: rect.bottom,
            },
            shift: JsonShift {
                horizontal: result.plan.shift.horizontal,
                vertical: result.plan.shift.vertical,
            },
            content_hash: result.content_hash.clone(),
            processing_time_ms: result.processing_time.as_millis(),
        }
    }

    pub fn failed(image: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Failed {
            image: image.into(),
            error: error.into(),
        }
    }
}
