mod cli;
mod eval;
mod pipeline;
mod run_artifacts;
mod video;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use cli::{Args, Command, ConvertArgs, EvaluateArgs};
use eval::scorer::{CommandScorer, Scorer};
use pipeline::detector::{CommandDetector, Detector, LabelDirDetector};
use pipeline::types::RoiConfig;
use run_artifacts::RunReport;
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse_args();
    match args.command {
        Command::Convert(args) => run_convert(args),
        Command::Evaluate(args) => run_evaluate(args),
    }
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    if args.run_extract {
        let video = args
            .video
            .as_deref()
            .context("--run-extract requires --video")?;
        video::extract::extract_frames(video, &args.frames_dir)?;
    }

    if let Some(program) = &args.detector_cmd {
        detect_into_labels_dir(
            program,
            args.imgsz,
            args.conf,
            &args.frames_dir,
            &args.labels_dir,
        )?;
    }

    let config = RoiConfig {
        img_w: args.img_w,
        img_h: args.img_h,
        target_class: args.class_id,
        qp: args.qp,
        merge_enabled: args.merge_roi,
    };
    let workers = if args.workers == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        args.workers
    };

    let stats = pipeline::roi::convert_dir(&args.labels_dir, &args.roi_dir, &config, workers)?;
    println!(
        "ROI files written to {} ({}/{} frames had qualifying detections, merge={})",
        args.roi_dir.display(),
        stats.frames_with_rois,
        stats.frames_seen,
        if args.merge_roi { "on" } else { "off" }
    );
    Ok(())
}

/// Run the external detector over every frame and persist its output as
/// one label file per frame, so conversion and evaluation read one format.
fn detect_into_labels_dir(
    program: &str,
    imgsz: u32,
    conf: f64,
    frames_dir: &Path,
    labels_dir: &Path,
) -> Result<()> {
    let frames = pipeline::frames::list_frames(frames_dir)?;
    if frames.is_empty() {
        bail!("Frame directory is empty: {}", frames_dir.display());
    }
    fs::create_dir_all(labels_dir)
        .with_context(|| format!("Failed to create labels dir: {}", labels_dir.display()))?;

    let mut detector = CommandDetector::new(program, imgsz, conf);
    for frame in &frames {
        let detections = detector.detect(frame)?;
        if detections.is_empty() {
            continue; // detector convention: no file for an empty frame
        }
        let stem = frame
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Invalid frame filename: {}", frame.display()))?;
        let lines: Vec<String> = detections
            .iter()
            .map(|d| match d.confidence {
                Some(c) => format!("{} {} {} {} {} {}", d.class_id, d.cx, d.cy, d.w, d.h, c),
                None => format!("{} {} {} {} {}", d.class_id, d.cx, d.cy, d.w, d.h),
            })
            .collect();
        fs::write(labels_dir.join(format!("{}.txt", stem)), lines.join("\n"))?;
    }
    tracing::info!(
        "Detection complete; labels written to {}",
        labels_dir.display()
    );
    Ok(())
}

fn make_detector(
    labels_dir: Option<&Path>,
    detector_cmd: Option<&str>,
    imgsz: u32,
    conf: f64,
) -> Result<Box<dyn Detector>> {
    match (labels_dir, detector_cmd) {
        (Some(dir), _) => Ok(Box::new(LabelDirDetector::new(dir)?)),
        (None, Some(program)) => Ok(Box::new(CommandDetector::new(program, imgsz, conf))),
        (None, None) => bail!("No detector available: pass a labels dir or --detector-cmd"),
    }
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let gt_frames = pipeline::frames::list_frames(&args.gt_frames_dir)?;
    if gt_frames.is_empty() {
        bail!(
            "Ground-truth frame directory is empty: {} (run convert --run-extract first)",
            args.gt_frames_dir.display()
        );
    }

    fs::create_dir_all(&args.work_dir)
        .with_context(|| format!("Failed to create work dir: {}", args.work_dir.display()))?;

    // Only the encoded video still needs decoding; gt frames are reused.
    let encoded_frames_dir = args.work_dir.join("encoded_frames");
    let encoded_frames = video::extract::extract_frames(&args.encoded_video, &encoded_frames_dir)?;

    let aligned = eval::align::align(gt_frames, encoded_frames);
    let gt_count = aligned.gt.len();
    let encoded_count = aligned.candidate.len();

    let mut gt_detector = make_detector(
        args.gt_labels_dir.as_deref(),
        args.detector_cmd.as_deref(),
        args.imgsz,
        args.conf,
    )?;
    let mut pred_detector = make_detector(
        args.pred_labels_dir.as_deref(),
        args.detector_cmd.as_deref(),
        args.imgsz,
        args.conf,
    )?;

    let gt_json = args.work_dir.join("gt.json");
    let pred_json = args.work_dir.join("pred.json");
    let gt_annotations =
        eval::annotations::write_gt_dataset(&aligned.gt, gt_detector.as_mut(), &gt_json)?;
    let pred_annotations = eval::annotations::write_pred_annotations(
        &aligned.candidate,
        pred_detector.as_mut(),
        &pred_json,
    )?;

    match &args.scorer_cmd {
        Some(program) => {
            let scorer = CommandScorer::new(program);
            let summary = scorer.score(&gt_json, &pred_json)?;
            println!("{}", summary.trim_end());
        }
        None => {
            tracing::warn!(
                "No --scorer-cmd given; skipping mAP scoring ({} and {} are ready for offline scoring)",
                gt_json.display(),
                pred_json.display()
            );
        }
    }

    let compression =
        eval::compression::evaluate(&args.orig_video, &args.encoded_video, gt_count, encoded_count)?;
    println!(
        "{}",
        eval::compression::format_summary(&compression, gt_count, encoded_count)
    );

    let report = RunReport {
        created_at: Utc::now(),
        gt_frames: gt_count,
        encoded_frames: encoded_count,
        gt_annotations,
        pred_annotations,
        compression,
    };
    let report_path: PathBuf = args.work_dir.join("report.json");
    fs::write(&report_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
    tracing::info!("Run report written to {}", report_path.display());

    Ok(())
}
