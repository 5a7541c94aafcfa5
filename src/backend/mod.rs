//! External capabilities used by the pipeline: object detection and image storage.
//!
//! A [`Session`] is built fresh for every run and hands out the detector and
//! object store; nothing here is global.

pub mod detection;
pub mod storage;

use std::fmt;
use std::path::{Path, PathBuf};

pub use detection::{CommandDetector, Detector, Label, ResponseFileDetector};
pub use storage::{LocalObjectStore, ObjectStore};

/// Location of a source image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub bucket: String,
    pub key: String,
}

impl ImageRef {
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Backend credentials, forwarded to the detector as-is
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

impl Credentials {
    pub fn new(access_key_id: &str, secret_access_key: &str, session_token: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            session_token: session_token.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .finish()
    }
}

/// Where detections come from
#[derive(Debug, Clone)]
pub enum DetectionSource {
    /// External command printing a DetectLabels response
    Command(PathBuf),
    /// Previously captured DetectLabels response
    ResponseFile(PathBuf),
}

/// Per-run backend session
#[derive(Debug)]
pub struct Session {
    credentials: Credentials,
    region: String,
    bucket: String,
    storage_root: PathBuf,
}

impl Session {
    pub fn new(credentials: Credentials, region: &str, bucket: &str, storage_root: &Path) -> Self {
        Self {
            credentials,
            region: region.to_string(),
            bucket: bucket.to_string(),
            storage_root: storage_root.to_path_buf(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn image_ref(&self, key: &str) -> ImageRef {
        ImageRef::new(&self.bucket, key)
    }

    pub fn detector(&self, source: &DetectionSource, max_labels: usize) -> Box<dyn Detector> {
        match source {
            DetectionSource::Command(program) => Box::new(CommandDetector::new(
                program,
                self.credentials.clone(),
                &self.region,
                max_labels,
            )),
            DetectionSource::ResponseFile(path) => {
                Box::new(ResponseFileDetector::new(path, max_labels))
            }
        }
    }

    pub fn object_store(&self) -> LocalObjectStore {
        LocalObjectStore::new(&self.storage_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_is_redacted() {
        let credentials = Credentials::new("AKIDEXAMPLE", "very-secret", "session-token");
        let debug = format!("{:?}", credentials);

        assert!(debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("session-token"));
    }

    #[test]
    fn test_session_image_ref() {
        let session = Session::new(
            Credentials::new("id", "secret", "token"),
            "us-east-1",
            "photos",
            Path::new("/srv/buckets"),
        );
        let image = session.image_ref("2024/beach.jpg");

        assert_eq!(image, ImageRef::new("photos", "2024/beach.jpg"));
        assert_eq!(image.to_string(), "s3://photos/2024/beach.jpg");
        assert_eq!(
            session
                .object_store()
                .object_path("photos", "2024/beach.jpg")
                .unwrap(),
            PathBuf::from("/srv/buckets/photos/2024/beach.jpg")
        );
    }
}
