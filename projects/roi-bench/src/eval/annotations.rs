// Accuracy evaluation: builds the COCO-style exchange documents for the
// external mAP scorer from an aligned frame sequence and a detector.
//
// Per-frame correspondence between the two sides rests entirely on the
// synthetic `image_id` being the sequence index on both sides; the frame
// FILENAMES differ (original extraction vs re-decoded video), so they must
// never be used as keys.

use crate::pipeline::detector::Detector;
use crate::pipeline::types::Detection;
use crate::run_artifacts::{CocoAnnotation, CocoCategory, CocoDataset, CocoImage};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Highest category id emitted in the ground-truth document; matches the
/// 90-category COCO convention the scorer expects.
const CATEGORY_COUNT: i64 = 90;

/// Scale one normalized detection to a pixel-space `[x, y, w, h]` bbox.
///
/// Unlike the ROI descriptor path this keeps fractional coordinates; the
/// scorer matches boxes by IoU and floats lose nothing.
fn to_coco_bbox(det: &Detection, img_w: u32, img_h: u32) -> [f64; 4] {
    let w = det.w * f64::from(img_w);
    let h = det.h * f64::from(img_h);
    let x = det.cx * f64::from(img_w) - w / 2.0;
    let y = det.cy * f64::from(img_h) - h / 2.0;
    [x, y, w, h]
}

fn to_annotation(det: &Detection, ann_id: u64, image_id: u64, img_w: u32, img_h: u32, with_score: bool) -> CocoAnnotation {
    let bbox = to_coco_bbox(det, img_w, img_h);
    CocoAnnotation {
        id: ann_id,
        image_id,
        // scorer categories are 1-based
        category_id: det.class_id + 1,
        bbox,
        score: if with_score {
            Some(det.confidence.unwrap_or(1.0))
        } else {
            None
        },
        area: bbox[2].max(0.0) * bbox[3].max(0.0),
        iscrowd: 0,
    }
}

/// Run the detector over a frame sequence and collect one annotation set,
/// with `image_id` equal to the frame's index in the sequence.
pub fn build_annotations(
    frames: &[impl AsRef<Path>],
    detector: &mut dyn Detector,
    with_scores: bool,
) -> Result<(Vec<CocoImage>, Vec<CocoAnnotation>)> {
    let mut images = Vec::with_capacity(frames.len());
    let mut annotations = Vec::new();
    let mut ann_id: u64 = 1;

    for (image_id, frame) in frames.iter().enumerate() {
        let frame = frame.as_ref();
        let (width, height) = image::image_dimensions(frame)
            .with_context(|| format!("Failed to read image header: {}", frame.display()))?;

        images.push(CocoImage {
            file_name: frame
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            height,
            width,
            id: image_id as u64,
        });

        for det in detector.detect(frame)? {
            annotations.push(to_annotation(
                &det,
                ann_id,
                image_id as u64,
                width,
                height,
                with_scores,
            ));
            ann_id += 1;
        }
    }

    Ok((images, annotations))
}

fn default_categories() -> Vec<CocoCategory> {
    (1..=CATEGORY_COUNT)
        .map(|id| CocoCategory {
            id,
            name: id.to_string(),
        })
        .collect()
}

/// Build and write the ground-truth document (images + annotations +
/// categories). Returns the annotation count.
pub fn write_gt_dataset(
    frames: &[impl AsRef<Path>],
    detector: &mut dyn Detector,
    out_path: &Path,
) -> Result<usize> {
    let (images, annotations) = build_annotations(frames, detector, false)?;
    let count = annotations.len();
    let dataset = CocoDataset {
        images,
        annotations,
        categories: default_categories(),
    };
    let json = serde_json::to_string(&dataset)?;
    fs::write(out_path, json)
        .with_context(|| format!("Failed to write gt annotations: {}", out_path.display()))?;
    tracing::info!("Wrote {} gt annotations to {}", count, out_path.display());
    Ok(count)
}

/// Build and write the prediction document: a bare annotation list with
/// scores, no images/categories wrapper.
pub fn write_pred_annotations(
    frames: &[impl AsRef<Path>],
    detector: &mut dyn Detector,
    out_path: &Path,
) -> Result<usize> {
    let (_, annotations) = build_annotations(frames, detector, true)?;
    let count = annotations.len();
    let json = serde_json::to_string(&annotations)?;
    fs::write(out_path, json)
        .with_context(|| format!("Failed to write predictions: {}", out_path.display()))?;
    tracing::info!("Wrote {} predictions to {}", count, out_path.display());
    Ok(count)
}
