// Detection-to-ROI conversion stage.
//
// Turns per-frame normalized detections into pixel-space ROI descriptor
// files for the block-QP encoder: one `<stem>_multi.txt` per frame with a
// qualifying detection, plus an optional `<stem>_merge.txt` holding the
// single enclosing box. Frames are independent, so conversion fans out to
// a worker pool; the first malformed input fails the whole run.

use crate::pipeline::frames;
use crate::pipeline::labels;
use crate::pipeline::types::{Detection, PixelBox, RoiConfig, RoiRecord, ALL_CLASSES};
use anyhow::{Context, Result};
use crossbeam::channel;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

/// Convert one detection to a pixel-space corner box.
///
/// Corner coordinates follow the floor of the scaled center/extent formula
/// and are clamped to the frame, so boundary objects whose normalized box
/// spills past the edge cannot produce negative coordinates.
pub fn to_pixel_box(det: &Detection, img_w: u32, img_h: u32) -> PixelBox {
    let w = f64::from(img_w);
    let h = f64::from(img_h);

    let clamp_x = |v: f64| (v.floor() as i64).clamp(0, img_w as i64);
    let clamp_y = |v: f64| (v.floor() as i64).clamp(0, img_h as i64);

    PixelBox {
        x1: clamp_x((det.cx - det.w / 2.0) * w),
        y1: clamp_y((det.cy - det.h / 2.0) * h),
        x2: clamp_x((det.cx + det.w / 2.0) * w),
        y2: clamp_y((det.cy + det.h / 2.0) * h),
    }
}

/// ROI records for one frame after filtering and conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRois {
    pub records: Vec<RoiRecord>,
    pub merged: Option<RoiRecord>,
}

/// Apply the class filter and conversion to one frame's detections.
pub fn convert_frame(detections: &[Detection], config: &RoiConfig) -> FrameRois {
    let records: Vec<RoiRecord> = detections
        .iter()
        .filter(|d| config.target_class == ALL_CLASSES || d.class_id == config.target_class)
        .map(|d| RoiRecord {
            pixel_box: to_pixel_box(d, config.img_w, config.img_h),
            qp: config.qp,
        })
        .collect();

    let merged = if config.merge_enabled {
        records
            .iter()
            .map(|r| r.pixel_box)
            .reduce(|acc, b| acc.enclose(&b))
            .map(|pixel_box| RoiRecord {
                pixel_box,
                qp: config.qp,
            })
    } else {
        None
    };

    FrameRois { records, merged }
}

/// Write one frame's descriptor files. Frames with no qualifying
/// detections produce no files at all, not empty ones.
fn write_frame_rois(rois: &FrameRois, frame_id: &str, out_dir: &Path) -> Result<()> {
    if !rois.records.is_empty() {
        let lines: Vec<String> = rois.records.iter().map(|r| r.to_string()).collect();
        let path = out_dir.join(format!("{}_multi.txt", frame_id));
        fs::write(&path, lines.join("\n"))
            .with_context(|| format!("Failed to write ROI file: {}", path.display()))?;
    }

    if let Some(merged) = &rois.merged {
        let path = out_dir.join(format!("{}_merge.txt", frame_id));
        fs::write(&path, format!("{}\n", merged))
            .with_context(|| format!("Failed to write merged ROI file: {}", path.display()))?;
    }

    Ok(())
}

/// Convert a single label file; returns true when the frame had at least
/// one qualifying detection.
fn convert_one_label_file(label_path: &Path, out_dir: &Path, config: &RoiConfig) -> Result<bool> {
    let frame_id = label_path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Invalid label filename: {}", label_path.display()))?;

    let detections = labels::parse_label_file(label_path)?;
    let rois = convert_frame(&detections, config);
    write_frame_rois(&rois, frame_id, out_dir)?;
    Ok(!rois.records.is_empty())
}

/// Counts reported by a conversion run.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConversionStats {
    pub frames_seen: usize,
    pub frames_with_rois: usize,
}

/// Convert every label file in `labels_dir` into ROI descriptor files
/// under `out_dir`, fanning frames out to `workers` threads.
pub fn convert_dir(
    labels_dir: &Path,
    out_dir: &Path,
    config: &RoiConfig,
    workers: usize,
) -> Result<ConversionStats> {
    let label_files = frames::list_label_files(labels_dir)?;
    if label_files.is_empty() {
        anyhow::bail!("Label directory is empty: {}", labels_dir.display());
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create ROI output dir: {}", out_dir.display()))?;

    let workers = workers.max(1);
    tracing::info!(
        "Converting {} label files from {} with {} workers (merge={})",
        label_files.len(),
        labels_dir.display(),
        workers,
        config.merge_enabled
    );

    let pb = ProgressBar::new(label_files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({eta})")?
            .progress_chars("#>-"),
    );

    let (tx, rx) = channel::bounded::<PathBuf>(workers * 2);
    // Each frame's output files are independent, so workers share nothing
    // but the input channel; the first error wins.
    let stats = thread::scope(|scope| -> Result<ConversionStats> {
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let rx = rx.clone();
            let pb = pb.clone();
            handles.push(scope.spawn(move || -> Result<usize> {
                let mut with_rois = 0usize;
                for label_path in rx {
                    if convert_one_label_file(&label_path, out_dir, config)? {
                        with_rois += 1;
                    }
                    pb.inc(1);
                }
                Ok(with_rois)
            }));
        }
        drop(rx);

        for label_path in &label_files {
            if tx.send(label_path.clone()).is_err() {
                break; // a worker already failed and hung up
            }
        }
        drop(tx);

        let mut frames_with_rois = 0usize;
        let mut first_err = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(count)) => frames_with_rois += count,
                Ok(Err(e)) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
                Err(_) => {
                    if first_err.is_none() {
                        first_err = Some(anyhow::anyhow!("Conversion worker panicked"));
                    }
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }

        Ok(ConversionStats {
            frames_seen: label_files.len(),
            frames_with_rois,
        })
    })?;

    pb.finish_and_clear();
    tracing::info!(
        "Wrote ROI files for {}/{} frames to {}",
        stats.frames_with_rois,
        stats.frames_seen,
        out_dir.display()
    );
    Ok(stats)
}
