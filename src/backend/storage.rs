use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::CropError;

/// Read access to stored source images
pub trait ObjectStore {
    /// Fetch the raw bytes of `key` in `bucket`
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, CropError>;
}

/// Object store laid out on the local filesystem as `<root>/<bucket>/<key>`
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Resolve `key` in `bucket` below the store root
    ///
    /// Bucket and key may only contain plain path segments, so an object can
    /// never resolve outside the root.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, CropError> {
        let bucket_path = Path::new(bucket);
        let key_path = Path::new(key);

        if !is_relative_below(bucket_path) || !is_relative_below(key_path) {
            return Err(CropError::Storage {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "object name escapes the storage root",
                ),
            });
        }

        Ok(self.root.join(bucket_path).join(key_path))
    }
}

fn is_relative_below(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl ObjectStore for LocalObjectStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, CropError> {
        let path = self.object_path(bucket, key)?;
        debug!("Fetching {}", path.display());

        std::fs::read(&path).map_err(|source| CropError::Storage {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_store_reads_object() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("photos/2024")).unwrap();
        std::fs::write(root.path().join("photos/2024/beach.jpg"), b"jpeg bytes").unwrap();

        let store = LocalObjectStore::new(root.path());
        let bytes = store.get("photos", "2024/beach.jpg").unwrap();
        assert_eq!(bytes, b"jpeg bytes");
    }

    #[test]
    fn test_local_store_missing_object() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(root.path());

        match store.get("photos", "missing.jpg") {
            Err(CropError::Storage { bucket, key, .. }) => {
                assert_eq!(bucket, "photos");
                assert_eq!(key, "missing.jpg");
            }
            other => panic!("expected storage error, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_local_store_rejects_keys_outside_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("photos")).unwrap();
        std::fs::write(root.path().join("secret.txt"), b"outside the bucket").unwrap();
        let store = LocalObjectStore::new(&root.path().join("photos"));

        for (bucket, key) in [
            ("photos", "/etc/passwd"),
            ("photos", "../secret.txt"),
            ("photos", "2024/../../secret.txt"),
            ("..", "secret.txt"),
            ("/tmp", "beach.jpg"),
            ("photos", ""),
        ] {
            assert!(
                matches!(store.get(bucket, key), Err(CropError::Storage { .. })),
                "{}/{} should be rejected",
                bucket,
                key
            );
        }
    }

    #[test]
    fn test_object_path_nested_key() {
        let store = LocalObjectStore::new(Path::new("/srv/buckets"));
        assert_eq!(
            store.object_path("photos", "2024/./beach.jpg").unwrap(),
            PathBuf::from("/srv/buckets/photos/2024/beach.jpg")
        );
    }
}
