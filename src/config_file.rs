use crate::cli::{Args, DEFAULT_MAX_LABELS, DEFAULT_QUALITY, DEFAULT_RATIO, DEFAULT_STORAGE_ROOT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Saved configuration file format
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub name: Option<String>,
    pub last_modified: Option<String>,
    pub config: CropConfigJson,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropConfigJson {
    pub ratio: Option<String>,
    pub max_labels: Option<usize>,
    pub prefix: Option<String>,
    pub quality: Option<u8>,
    pub storage_root: Option<String>,
    pub detector_command: Option<String>,
    pub detections: Option<String>,
    pub dry_run: Option<bool>,
    pub debug: Option<bool>,
    pub report: Option<bool>,
    pub verbose: Option<bool>,
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let contents = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: ConfigFile = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

            let args_from_cli = std::env::args().collect::<Vec<_>>();
            self.merge_from_config(config.config, &args_from_cli);

            debug!("Loaded configuration from: {:?}", config_path);
        }
        Ok(())
    }

    fn merge_from_config(&mut self, config: CropConfigJson, args_from_cli: &[String]) {
        let on_cli = |flag: &str| {
            args_from_cli
                .iter()
                .any(|a| a == flag || a.starts_with(&format!("{}=", flag)))
        };

        if !on_cli("--ratio") && self.ratio == DEFAULT_RATIO {
            if let Some(ratio) = config.ratio {
                self.ratio = ratio;
            }
        }

        if !on_cli("--max-labels") && self.max_labels == DEFAULT_MAX_LABELS {
            if let Some(max_labels) = config.max_labels {
                self.max_labels = max_labels;
            }
        }

        if !on_cli("--prefix") && self.prefix.is_empty() {
            if let Some(prefix) = config.prefix {
                self.prefix = prefix;
            }
        }

        if !on_cli("--quality") && self.quality == DEFAULT_QUALITY {
            if let Some(quality) = config.quality {
                self.quality = quality;
            }
        }

        if !on_cli("--storage-root") && self.storage_root == PathBuf::from(DEFAULT_STORAGE_ROOT) {
            if let Some(root) = config.storage_root {
                self.storage_root = PathBuf::from(root);
            }
        }

        // Detection source - only if neither is given on the command line
        if self.detector_command.is_none() && self.detections.is_none() {
            if let Some(command) = config.detector_command {
                self.detector_command = Some(PathBuf::from(command));
            } else if let Some(detections) = config.detections {
                self.detections = Some(PathBuf::from(detections));
            }
        }

        // Boolean flags - only apply if currently false (default)
        if !self.dry_run {
            self.dry_run = config.dry_run.unwrap_or(false);
        }

        if !self.debug {
            self.debug = config.debug.unwrap_or(false);
        }

        if !self.report {
            self.report = config.report.unwrap_or(false);
        }

        if !self.verbose {
            self.verbose = config.verbose.unwrap_or(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> (Args, Vec<String>) {
        let mut argv = vec![
            "labelcrop",
            "--temp-path",
            "/tmp",
            "--image-name",
            "beach.jpg",
            "--bucket",
            "photos",
            "--region",
            "eu-west-1",
            "--access-key-id",
            "id",
            "--secret-access-key",
            "secret",
            "--session-token",
            "token",
        ];
        argv.extend_from_slice(extra);
        let cli = argv.iter().map(|s| s.to_string()).collect();
        (Args::parse_from(argv), cli)
    }

    fn parse_config(json: &str) -> CropConfigJson {
        serde_json::from_str::<ConfigFile>(json).unwrap().config
    }

    #[test]
    fn test_config_fills_defaults() {
        let (mut args, cli) = args(&[]);
        let config = parse_config(
            r#"{
                "name": "portraits",
                "config": {
                    "ratio": "4:5",
                    "maxLabels": 5,
                    "prefix": "crop_",
                    "quality": 90,
                    "storageRoot": "/srv/buckets",
                    "detectorCommand": "/usr/local/bin/detect-labels",
                    "debug": true
                }
            }"#,
        );

        args.merge_from_config(config, &cli);

        assert_eq!(args.ratio, "4:5");
        assert_eq!(args.max_labels, 5);
        assert_eq!(args.prefix, "crop_");
        assert_eq!(args.quality, 90);
        assert_eq!(args.storage_root, PathBuf::from("/srv/buckets"));
        assert_eq!(
            args.detector_command,
            Some(PathBuf::from("/usr/local/bin/detect-labels"))
        );
        assert!(args.debug);
        assert!(!args.report);
    }

    #[test]
    fn test_cli_takes_precedence() {
        let (mut args, cli) = args(&["--ratio", "3:2", "--quality=60", "--detections", "a.json"]);
        let config = parse_config(
            r#"{"config": {"ratio": "1:1", "quality": 95, "detectorCommand": "detect.sh"}}"#,
        );

        args.merge_from_config(config, &cli);

        assert_eq!(args.ratio, "3:2");
        assert_eq!(args.quality, 60);
        assert!(args.detector_command.is_none());
        assert_eq!(args.detections, Some(PathBuf::from("a.json")));
    }

    #[test]
    fn test_empty_config() {
        let (mut args, cli) = args(&[]);
        args.merge_from_config(parse_config(r#"{"config": {}}"#), &cli);

        assert_eq!(args.ratio, DEFAULT_RATIO);
        assert_eq!(args.max_labels, DEFAULT_MAX_LABELS);
        assert!(args.detection_source().is_none());
    }

    #[test]
    fn test_load_missing_config_file() {
        let (mut args, _) = args(&["--config", "/nonexistent/labelcrop.json"]);
        assert!(args.load_and_merge_config().is_err());
    }
}
