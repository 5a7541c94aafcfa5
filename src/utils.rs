use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

/// Initialize stderr logging
///
/// `RUST_LOG` takes precedence; otherwise `labelcrop=info`, or
/// `labelcrop=debug` in verbose mode.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "labelcrop=debug"
    } else {
        "labelcrop=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Create a styled progress bar for the processing stages (0-100)
pub fn create_stage_progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.blue} [{elapsed_precise}] [{bar:30.cyan/blue}] {percent:>3}% {msg}",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<()> {
    if !args.temp_path.is_dir() {
        return Err(anyhow::anyhow!(
            "Temp path is not an existing directory: {}",
            args.temp_path.display()
        ));
    }

    if args.image_name.trim().is_empty() {
        return Err(anyhow::anyhow!("Image name must not be empty"));
    }

    args.parse_ratio()?;

    if args.quality == 0 || args.quality > 100 {
        return Err(anyhow::anyhow!(
            "JPEG quality must be between 1 and 100, got: {}",
            args.quality
        ));
    }

    if args.max_labels == 0 {
        return Err(anyhow::anyhow!("Max labels must be at least 1"));
    }

    if args.detector_command.is_none() && args.detections.is_none() {
        return Err(anyhow::anyhow!(
            "No detection source: pass --detector-command or --detections"
        ));
    }

    if let Some(path) = &args.detections {
        if !path.is_file() {
            return Err(anyhow::anyhow!(
                "Detections file does not exist: {}",
                path.display()
            ));
        }
    }

    Ok(())
}

/// Generate a safe filename by removing/replacing invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            // Replace problematic characters with underscores
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Hex SHA-256 of `bytes`
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Print warning message
pub fn warn_println(message: &str) {
    eprintln!("{} {}", style("[WARNING]").yellow().bold(), message);
}
