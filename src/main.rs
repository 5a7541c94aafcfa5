use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::time::Instant;

use labelcrop::cli::Args;
use labelcrop::image_processing::report;
use labelcrop::utils::{
    create_stage_progress_bar, format_duration, init_logging, validate_inputs, warn_println,
};
use labelcrop::{CropError, ImageRef, JsonMessage, ProcessingConfig, ProcessingEngine, Session};

/// Turn a processing error into the error returned from `main`
///
/// Under `--json` a `failed` line is emitted first. The returned error is the
/// only human-readable report of the failure.
fn failure(json: bool, image: &ImageRef, error: CropError) -> anyhow::Error {
    if json {
        JsonMessage::failed(image.to_string(), error.to_string()).emit();
    }
    anyhow::Error::new(error).context(format!("Failed to process {}", image))
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let mut args = Args::parse();
    args.load_and_merge_config()?;

    init_logging(args.verbose);

    if !args.json {
        println!("{}", style("labelcrop - object-aware cropping").bold().blue());
        println!();
    }

    validate_inputs(&args)?;

    let config = ProcessingConfig {
        temp_path: args.temp_path.clone(),
        ratio: args.parse_ratio()?,
        prefix: args.prefix.clone(),
        jpeg_quality: args.quality,
        dry_run: args.dry_run,
        debug: args.debug,
    };

    if args.verbose && !args.json {
        println!("{}", style("Configuration:").bold());
        println!("  Image: s3://{}/{}", args.bucket, args.image_name);
        println!("  Region: {}", args.region);
        println!("  Storage root: {}", args.storage_root.display());
        println!("  Temp path: {}", config.temp_path.display());
        println!("  Target ratio: {}", config.ratio);
        println!("  Max labels: {}", args.max_labels);
        println!("  Filename prefix: {:?}", config.prefix);
        println!("  JPEG quality: {}", config.jpeg_quality);
        if config.debug {
            println!("  Debug mode: enabled - will save detection overlay");
        }
        if config.dry_run {
            println!("  Dry run mode: enabled (no files will be created)");
        }
        println!();
    }

    let source = args
        .detection_source()
        .context("No detection source configured")?;

    // Fresh session per run; nothing is shared between invocations
    let session = Session::new(
        args.credentials(),
        &args.region,
        &args.bucket,
        &args.storage_root,
    );
    let detector = session.detector(&source, args.max_labels);
    let store = session.object_store();
    let image = session.image_ref(&args.image_name);

    let engine = ProcessingEngine::new(config);
    let progress = create_stage_progress_bar(args.json);

    let result = match engine.process_with_progress(&image, detector.as_ref(), &store, &progress)
    {
        Ok(result) => {
            progress.finish_with_message(format!("✓ {} cropped", image.key));
            result
        }
        Err(e) => {
            progress.abandon();
            return Err(failure(args.json, &image, e));
        }
    };

    if args.json {
        JsonMessage::detected(&result).emit();
        JsonMessage::completed(&result).emit();
        return Ok(());
    }

    println!();
    println!(
        "{} {} labels, {} instances",
        style("Detected:").bold(),
        result.labels.len(),
        result.instance_count()
    );
    println!(
        "{} {} (shift h {:.1} / v {:.1})",
        style("Crop:").bold(),
        result.plan.rect,
        result.plan.shift.horizontal,
        result.plan.shift.vertical
    );

    match &result.output_path {
        Some(path) => println!("{} {}", style("Saved:").bold().green(), path.display()),
        None => warn_println("Dry run - no file written"),
    }
    if let Some(path) = &result.debug_path {
        println!("{} {}", style("Debug overlay:").bold(), path.display());
    }

    if args.report {
        report::print_report(&result);
    }

    println!(
        "{} {}",
        style("Total time:").dim(),
        format_duration(start_time.elapsed())
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_context_and_cause() {
        let error = failure(false, &ImageRef::new("photos", "a.jpg"), CropError::NoDetections);

        assert_eq!(error.to_string(), "Failed to process s3://photos/a.jpg");
        assert_eq!(error.root_cause().to_string(), "no detections found");
        assert!(matches!(
            error.downcast_ref::<CropError>(),
            Some(CropError::NoDetections)
        ));
    }
}
