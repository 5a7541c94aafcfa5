pub mod annotate;
pub mod crop;
pub mod envelope;
pub mod persist;
pub mod ratio;
pub mod report;

use image::GenericImageView;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::backend::detection::instance_boxes;
use crate::backend::{Detector, ImageRef, Label, ObjectStore};
use crate::error::CropError;
use crate::utils::content_hash;
use crop::PixelRect;
use envelope::{BoundingBox, Envelope};
use ratio::{AspectRatio, Shift};

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub temp_path: PathBuf,
    pub ratio: AspectRatio,
    pub prefix: String,
    pub jpeg_quality: u8,
    pub dry_run: bool,
    pub debug: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            temp_path: PathBuf::from("."),
            ratio: AspectRatio::default(),
            prefix: String::new(),
            jpeg_quality: 75,
            dry_run: false,
            debug: false,
        }
    }
}

/// Geometry of one crop, computed before any pixels are touched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropPlan {
    pub image_width: u32,
    pub image_height: u32,
    pub envelope: Envelope,
    pub envelope_width: i64,
    pub envelope_height: i64,
    pub ratio: AspectRatio,
    pub shift: Shift,
    pub rect: PixelRect,
}

impl CropPlan {
    /// Plan the crop of a `image_width` x `image_height` image around `envelope`
    pub fn new(
        envelope: Envelope,
        image_width: u32,
        image_height: u32,
        ratio: AspectRatio,
    ) -> Result<Self, CropError> {
        let (envelope_width, envelope_height) = envelope.pixel_size(image_width, image_height);
        let shift = ratio::correct(envelope_width, envelope_height, ratio);
        let rect = crop::crop_rect(&envelope, shift, image_width, image_height)?;

        Ok(Self {
            image_width,
            image_height,
            envelope,
            envelope_width,
            envelope_height,
            ratio,
            shift,
            rect,
        })
    }
}

#[derive(Debug)]
pub struct ProcessingResult {
    pub image: ImageRef,
    pub labels: Vec<Label>,
    pub plan: CropPlan,
    /// `None` in dry-run mode
    pub output_path: Option<PathBuf>,
    pub debug_path: Option<PathBuf>,
    /// SHA-256 of the encoded crop
    pub content_hash: String,
    pub processing_time: Duration,
}

impl ProcessingResult {
    pub fn instance_count(&self) -> usize {
        self.labels.iter().map(|label| label.instances.len()).sum()
    }
}

pub struct ProcessingEngine {
    config: ProcessingConfig,
}

impl ProcessingEngine {
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Detect, crop and save one image
    pub fn process(
        &self,
        image: &ImageRef,
        detector: &dyn Detector,
        store: &dyn ObjectStore,
    ) -> Result<ProcessingResult, CropError> {
        self.process_with_progress(image, detector, store, &ProgressBar::hidden())
    }

    /// Detect, crop and save one image, reporting each stage on `progress_bar`
    pub fn process_with_progress(
        &self,
        image: &ImageRef,
        detector: &dyn Detector,
        store: &dyn ObjectStore,
        progress_bar: &ProgressBar,
    ) -> Result<ProcessingResult, CropError> {
        let start = Instant::now();

        // Stage 1: Detect labels (10%)
        progress_bar.set_position(10);
        progress_bar.set_message(format!("{} - Detecting labels", image.key));
        let labels = detector.detect(image)?;
        let boxes = instance_boxes(&labels);
        info!(
            "Detected {} labels with {} instances in {}",
            labels.len(),
            boxes.len(),
            image
        );

        // Stage 2: Aggregate envelope (20%)
        progress_bar.set_position(20);
        progress_bar.set_message(format!("{} - Aggregating boxes", image.key));
        let envelope = envelope::aggregate(&boxes).ok_or(CropError::NoDetections)?;
        debug!("Envelope: {:?}", envelope);

        // Stage 3: Fetch and decode (40%)
        progress_bar.set_position(40);
        progress_bar.set_message(format!("{} - Fetching image", image.key));
        let bytes = store.get(&image.bucket, &image.key)?;
        let img = image::load_from_memory(&bytes).map_err(CropError::Decode)?;
        let (width, height) = img.dimensions();
        debug!("Decoded {} ({}x{}, {} bytes)", image, width, height, bytes.len());

        // Stage 4: Plan the crop (60%)
        progress_bar.set_position(60);
        progress_bar.set_message(format!("{} - Computing crop", image.key));
        let plan = CropPlan::new(envelope, width, height, self.config.ratio)?;
        debug!(
            "Envelope {}x{} px, shift {:?}, crop {}",
            plan.envelope_width, plan.envelope_height, plan.shift, plan.rect
        );

        // Stage 5: Crop (70%)
        progress_bar.set_position(70);
        progress_bar.set_message(format!("{} - Cropping", image.key));
        let cropped = crop::crop_image(&img, &plan.rect)?;

        // Stage 6: Encode and save (90%)
        progress_bar.set_position(90);
        let timestamp = persist::timestamp_now();
        let target = persist::output_path(
            &self.config.temp_path,
            &self.config.prefix,
            &timestamp,
            &image.key,
        );

        // Both images are encoded before either file is written
        progress_bar.set_message(format!("{} - Encoding", image.key));
        let encoded = persist::encode_jpeg(&cropped, self.config.jpeg_quality, &target)?;
        let overlay = if self.config.debug && !self.config.dry_run {
            Some(self.encode_debug_overlay(&img, &boxes, &plan, &timestamp, &image.key)?)
        } else {
            None
        };

        let (output_path, debug_path) = if self.config.dry_run {
            info!("Dry run: would save {}", target.display());
            (None, None)
        } else {
            progress_bar.set_message(format!("{} - Saving", image.key));
            let mut outputs: Vec<(&Path, &[u8])> = vec![(target.as_path(), encoded.as_slice())];
            if let Some((path, bytes)) = &overlay {
                outputs.push((path.as_path(), bytes.as_slice()));
            }
            persist::write_outputs(&outputs)?;

            info!("Saved {}", target.display());
            let debug_path = overlay.map(|(path, _)| path);
            if let Some(path) = &debug_path {
                info!("Saved debug overlay {}", path.display());
            }
            (Some(target), debug_path)
        };

        progress_bar.set_position(100);
        progress_bar.set_message(format!("{} - Complete", image.key));

        Ok(ProcessingResult {
            image: image.clone(),
            labels,
            plan,
            output_path,
            debug_path,
            content_hash: content_hash(&encoded),
            processing_time: start.elapsed(),
        })
    }

    fn encode_debug_overlay(
        &self,
        img: &image::DynamicImage,
        boxes: &[BoundingBox],
        plan: &CropPlan,
        timestamp: &str,
        image_name: &str,
    ) -> Result<(PathBuf, Vec<u8>), CropError> {
        let overlay = annotate::draw_debug_overlay(img, boxes, &plan.envelope, &plan.rect);
        let path = persist::output_path(&self.config.temp_path, "debug_", timestamp, image_name);
        let bytes = persist::encode_jpeg(
            &image::DynamicImage::ImageRgb8(overlay),
            self.config.jpeg_quality,
            &path,
        )?;

        Ok((path, bytes))
    }
}
