use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert per-frame detections into ROI descriptor files for the
    /// block-QP encoder
    Convert(ConvertArgs),
    /// Compare detection accuracy and compression between the original
    /// and the ROI-encoded video
    Evaluate(EvaluateArgs),
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Source video (required with --run-extract)
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Directory of extracted frame images
    #[arg(long, env = "ROI_BENCH_FRAMES_DIR", default_value = "frames")]
    pub frames_dir: PathBuf,

    /// Directory of per-frame detection label files
    #[arg(long, env = "ROI_BENCH_LABELS_DIR", default_value = "labels")]
    pub labels_dir: PathBuf,

    /// ROI descriptor output directory
    #[arg(long, env = "ROI_BENCH_ROI_DIR", default_value = "roi_per_frame")]
    pub roi_dir: PathBuf,

    /// Extract frames from --video before anything else
    #[arg(long)]
    pub run_extract: bool,

    /// External detector program; when absent, --labels-dir is assumed
    /// pre-populated
    #[arg(long)]
    pub detector_cmd: Option<String>,

    /// Detector inference image size
    #[arg(long, default_value_t = 640)]
    pub imgsz: u32,

    /// Detector confidence threshold
    #[arg(long, default_value_t = 0.25)]
    pub conf: f64,

    /// Frame width in pixels
    #[arg(long, default_value_t = 1920)]
    pub img_w: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 1080)]
    pub img_h: u32,

    /// Target class id; -1 keeps all classes
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub class_id: i64,

    /// Uniform quantization parameter for every emitted region
    #[arg(long, default_value_t = 10.0)]
    pub qp: f32,

    /// Also emit one merged (enclosing-box) ROI file per frame
    #[arg(long)]
    pub merge_roi: bool,

    /// Conversion worker threads (0 = number of CPUs)
    #[arg(long, default_value_t = 0)]
    pub workers: usize,
}

#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Original frames, reused from the convert step's extraction
    #[arg(long, env = "ROI_BENCH_GT_FRAMES_DIR", default_value = "frames")]
    pub gt_frames_dir: PathBuf,

    /// Original video artifact
    #[arg(long)]
    pub orig_video: PathBuf,

    /// ROI-encoded video artifact
    #[arg(long)]
    pub encoded_video: PathBuf,

    /// Scratch and report directory
    #[arg(long, env = "ROI_BENCH_WORK_DIR", default_value = "eval_tmp")]
    pub work_dir: PathBuf,

    /// Pre-computed detector label files for the ground-truth frames
    #[arg(long)]
    pub gt_labels_dir: Option<PathBuf>,

    /// Pre-computed detector label files for the decoded encoded frames
    #[arg(long)]
    pub pred_labels_dir: Option<PathBuf>,

    /// External detector program, used for any side without a labels dir
    #[arg(long)]
    pub detector_cmd: Option<String>,

    /// External mAP scorer program, invoked as `<prog> gt.json pred.json`
    #[arg(long)]
    pub scorer_cmd: Option<String>,

    /// Detector inference image size
    #[arg(long, default_value_t = 640)]
    pub imgsz: u32,

    /// Detector confidence threshold
    #[arg(long, default_value_t = 0.25)]
    pub conf: f64,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
