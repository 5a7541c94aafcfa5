use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use super::{Credentials, ImageRef};
use crate::error::CropError;
use crate::image_processing::envelope::BoundingBox;

/// One located occurrence of a label
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub confidence: f32,
}

/// A detected label and the instances where it was located
///
/// Labels for scene-level concepts typically have no instances.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// DetectLabels response body
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectLabelsResponse {
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl DetectLabelsResponse {
    pub fn from_json(json: &str) -> Result<Self, CropError> {
        serde_json::from_str(json)
            .map_err(|e| CropError::Detection(format!("invalid detector response: {}", e)))
    }

    /// Keep at most `max_labels` labels, in response order
    pub fn into_capped_labels(mut self, max_labels: usize) -> Vec<Label> {
        if self.labels.len() > max_labels {
            warn!(
                "Detector returned {} labels, considering only the first {}",
                self.labels.len(),
                max_labels
            );
            self.labels.truncate(max_labels);
        }
        self.labels
    }
}

/// Object detection capability
pub trait Detector {
    /// Detect labels for `image`, returning at most the configured number of labels
    fn detect(&self, image: &ImageRef) -> Result<Vec<Label>, CropError>;
}

/// Every bounding box across all instances of all labels
pub fn instance_boxes(labels: &[Label]) -> Vec<BoundingBox> {
    labels
        .iter()
        .flat_map(|label| label.instances.iter().map(|instance| instance.bounding_box))
        .collect()
}

/// Detector backed by an external command
///
/// The command is invoked as
/// `<program> --bucket <bucket> --image-name <key> --max-labels <n>` with the
/// region and credentials exported as `AWS_*` variables, and must print a
/// DetectLabels JSON document on stdout.
pub struct CommandDetector {
    program: PathBuf,
    credentials: Credentials,
    region: String,
    max_labels: usize,
}

impl CommandDetector {
    pub fn new(
        program: &Path,
        credentials: Credentials,
        region: &str,
        max_labels: usize,
    ) -> Self {
        Self {
            program: program.to_path_buf(),
            credentials,
            region: region.to_string(),
            max_labels,
        }
    }
}

impl Detector for CommandDetector {
    fn detect(&self, image: &ImageRef) -> Result<Vec<Label>, CropError> {
        debug!(
            "Running detector {} for {}",
            self.program.display(),
            image
        );

        let output = Command::new(&self.program)
            .arg("--bucket")
            .arg(&image.bucket)
            .arg("--image-name")
            .arg(&image.key)
            .arg("--max-labels")
            .arg(self.max_labels.to_string())
            .env("AWS_ACCESS_KEY_ID", &self.credentials.access_key_id)
            .env("AWS_SECRET_ACCESS_KEY", &self.credentials.secret_access_key)
            .env("AWS_SESSION_TOKEN", &self.credentials.session_token)
            .env("AWS_REGION", &self.region)
            .env("AWS_DEFAULT_REGION", &self.region)
            .output()
            .map_err(|e| {
                CropError::Detection(format!(
                    "failed to execute {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CropError::Detection(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(DetectLabelsResponse::from_json(&stdout)?.into_capped_labels(self.max_labels))
    }
}

/// Detector that replays a captured DetectLabels response from disk
pub struct ResponseFileDetector {
    path: PathBuf,
    max_labels: usize,
}

impl ResponseFileDetector {
    pub fn new(path: &Path, max_labels: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            max_labels,
        }
    }
}

impl Detector for ResponseFileDetector {
    fn detect(&self, image: &ImageRef) -> Result<Vec<Label>, CropError> {
        debug!(
            "Reading detections for {} from {}",
            image,
            self.path.display()
        );

        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            CropError::Detection(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        Ok(DetectLabelsResponse::from_json(&contents)?.into_capped_labels(self.max_labels))
    }
}
