// Frame extraction via the ffmpeg CLI.
//
// Decoding is an external collaborator: this wrapper shells out to ffmpeg
// to dump every frame as a numbered JPEG, then returns the naturally
// ordered listing. Unlike bitrate probing, extraction is only run when the
// user asked for it, so any failure is fatal.

use crate::pipeline::frames;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub fn extract_frames(video: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    if !video.is_file() {
        bail!("Source video not found: {}", video.display());
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create frame dir: {}", out_dir.display()))?;

    let pattern = out_dir.join("frame_%05d.jpg");
    tracing::info!(
        "Extracting frames from {} to {}",
        video.display(),
        out_dir.display()
    );

    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(video)
        .args(["-qscale:v", "2"])
        .arg(&pattern)
        .output()
        .context("Failed to run ffmpeg; is it installed and on PATH?")?;

    if !output.status.success() {
        bail!(
            "ffmpeg failed extracting {}: {}",
            video.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let extracted = frames::list_frames(out_dir)?;
    if extracted.is_empty() {
        bail!("ffmpeg produced no frames from {}", video.display());
    }
    tracing::info!("Extracted {} frames", extracted.len());
    Ok(extracted)
}
