use clap::Parser;
use std::path::PathBuf;

use crate::backend::{Credentials, DetectionSource};
use crate::error::CropError;
use crate::image_processing::ratio::AspectRatio;

pub const DEFAULT_RATIO: &str = "3:2";
pub const DEFAULT_MAX_LABELS: usize = 10;
pub const DEFAULT_QUALITY: u8 = 75;
pub const DEFAULT_STORAGE_ROOT: &str = ".";

#[derive(Parser, Debug)]
#[command(
    name = "labelcrop",
    version,
    about = "Crop an image around its detected objects, padded towards a fixed aspect ratio",
    long_about = "
labelcrop - object-aware cropping

Asks a label detector for the objects in a stored image, takes the smallest
rectangle that contains every detected instance, pads it on its short side
towards the target aspect ratio and saves the crop as JPEG to
{temp-path}/{prefix}{ddmmHHMMSS}_{image-name}.

Detection comes from an external command (which receives the bucket, image
name and label cap as arguments and the region and credentials as AWS_*
environment variables, and must print a DetectLabels JSON response) or from
a captured response file.

Example Usage:
  # Crop using a detector script
  labelcrop --temp-path /tmp/crops --image-name beach.jpg --bucket photos \\
    --region eu-west-1 --access-key-id AKID --secret-access-key SECRET \\
    --session-token TOKEN --detector-command ./detect-labels.sh

  # Replay a captured response, 16:9, with a debug overlay and a report
  labelcrop --temp-path /tmp/crops --image-name beach.jpg --bucket photos \\
    --region eu-west-1 --access-key-id AKID --secret-access-key SECRET \\
    --session-token TOKEN --detections beach.json --ratio 16:9 --debug --report"
)]
pub struct Args {
    /// Directory the cropped image is written to
    #[arg(long = "temp-path", visible_alias = "temp_path", value_name = "DIR")]
    pub temp_path: PathBuf,

    /// Key of the image in the bucket
    #[arg(long = "image-name", visible_alias = "image_name", value_name = "KEY")]
    pub image_name: String,

    /// Access key ID forwarded to the detector
    #[arg(long = "access-key-id", visible_alias = "aws_access_key_id", value_name = "ID")]
    pub access_key_id: String,

    /// Secret access key forwarded to the detector
    #[arg(
        long = "secret-access-key",
        visible_alias = "aws_secret_access_key",
        value_name = "SECRET"
    )]
    pub secret_access_key: String,

    /// Session token forwarded to the detector
    #[arg(long = "session-token", visible_alias = "aws_session_token", value_name = "TOKEN")]
    pub session_token: String,

    /// Backend region
    #[arg(long = "region", visible_alias = "region_name", value_name = "REGION")]
    pub region: String,

    /// Bucket holding the source image
    #[arg(long = "bucket", value_name = "BUCKET")]
    pub bucket: String,

    /// Directory containing one sub-directory per bucket
    #[arg(long = "storage-root", default_value = DEFAULT_STORAGE_ROOT, value_name = "DIR")]
    pub storage_root: PathBuf,

    /// External command that prints a DetectLabels JSON response
    #[arg(long = "detector-command", value_name = "FILE", conflicts_with = "detections")]
    pub detector_command: Option<PathBuf>,

    /// Captured DetectLabels JSON response to use instead of running a detector
    #[arg(long = "detections", value_name = "FILE")]
    pub detections: Option<PathBuf>,

    /// Target aspect ratio (WIDTH:HEIGHT)
    #[arg(long = "ratio", default_value = DEFAULT_RATIO, value_name = "W:H")]
    pub ratio: String,

    /// Maximum number of labels considered per image
    #[arg(long = "max-labels", default_value_t = DEFAULT_MAX_LABELS, value_name = "N")]
    pub max_labels: usize,

    /// Prefix prepended to the output filename
    #[arg(long = "prefix", default_value = "", value_name = "PREFIX")]
    pub prefix: String,

    /// JPEG quality of the saved crop (1-100)
    #[arg(long = "quality", default_value_t = DEFAULT_QUALITY, value_name = "QUALITY")]
    pub quality: u8,

    /// JSON configuration file; command-line values take precedence
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Enable verbose output with detailed geometry
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Emit machine-readable JSON lines on stdout instead of human output
    #[arg(long = "json")]
    pub json: bool,

    /// Compute the crop without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Also save the source image with detection boxes and crop area drawn on it
    #[arg(long = "debug")]
    pub debug: bool,

    /// Print a table with the detected labels and crop geometry
    #[arg(long = "report")]
    pub report: bool,
}

impl Args {
    pub fn parse_ratio(&self) -> Result<AspectRatio, CropError> {
        self.ratio.parse()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            &self.access_key_id,
            &self.secret_access_key,
            &self.session_token,
        )
    }

    pub fn detection_source(&self) -> Option<DetectionSource> {
        match (&self.detector_command, &self.detections) {
            (Some(program), _) => Some(DetectionSource::Command(program.clone())),
            (None, Some(path)) => Some(DetectionSource::ResponseFile(path.clone())),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 15] = [
        "labelcrop",
        "--temp-path",
        "/tmp/crops",
        "--image-name",
        "beach.jpg",
        "--bucket",
        "photos",
        "--region",
        "eu-west-1",
        "--access-key-id",
        "AKID",
        "--secret-access-key",
        "SECRET",
        "--session-token",
        "TOKEN",
    ];

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = REQUIRED.to_vec();
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.parse_ratio().unwrap(), AspectRatio::default());
        assert_eq!(args.max_labels, 10);
        assert_eq!(args.quality, 75);
        assert_eq!(args.prefix, "");
        assert_eq!(args.storage_root, PathBuf::from("."));
        assert!(args.detection_source().is_none());
    }

    #[test]
    fn test_required_arguments() {
        assert!(Args::try_parse_from(["labelcrop", "--temp-path", "/tmp"]).is_err());
        assert!(Args::try_parse_from(REQUIRED[..REQUIRED.len() - 2].iter().copied()).is_err());
    }

    #[test]
    fn test_snake_case_aliases() {
        let args = Args::try_parse_from([
            "labelcrop",
            "--temp_path",
            "/tmp/crops",
            "--image_name",
            "beach.jpg",
            "--bucket",
            "photos",
            "--region_name",
            "eu-west-1",
            "--aws_access_key_id",
            "AKID",
            "--aws_secret_access_key",
            "SECRET",
            "--aws_session_token",
            "TOKEN",
        ])
        .unwrap();
        assert_eq!(args.image_name, "beach.jpg");
        assert_eq!(args.region, "eu-west-1");
    }

    #[test]
    fn test_detection_source() {
        let args = parse(&["--detector-command", "./detect.sh"]).unwrap();
        assert!(matches!(
            args.detection_source(),
            Some(DetectionSource::Command(p)) if p == PathBuf::from("./detect.sh")
        ));

        let args = parse(&["--detections", "beach.json"]).unwrap();
        assert!(matches!(
            args.detection_source(),
            Some(DetectionSource::ResponseFile(_))
        ));

        assert!(parse(&["--detections", "a.json", "--detector-command", "b.sh"]).is_err());
    }

    #[test]
    fn test_credentials() {
        let args = parse(&[]).unwrap();
        let credentials = args.credentials();
        assert_eq!(credentials.access_key_id, "AKID");
        assert_eq!(credentials.secret_access_key, "SECRET");
        assert_eq!(credentials.session_token, "TOKEN");
    }
}
