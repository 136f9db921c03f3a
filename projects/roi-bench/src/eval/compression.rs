// Compression metrics between the original and ROI-encoded video files.

use crate::run_artifacts::CompressionReport;
use crate::video::probe;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Compute file-size and (best-effort) bitrate compression metrics.
///
/// A zero-byte original or a zero frame count makes the derived metric
/// undefined rather than an error; bitrate fields are omitted whenever
/// probing fails on either side.
pub fn evaluate(
    orig_video: &Path,
    encoded_video: &Path,
    gt_frame_count: usize,
    encoded_frame_count: usize,
) -> Result<CompressionReport> {
    let original_size_bytes = file_size(orig_video)?;
    let encoded_size_bytes = file_size(encoded_video)?;

    let size_reduction_pct = if original_size_bytes > 0 {
        Some((1.0 - encoded_size_bytes as f64 / original_size_bytes as f64) * 100.0)
    } else {
        None
    };

    let avg_bytes_per_frame_original = if gt_frame_count > 0 {
        Some(original_size_bytes as f64 / gt_frame_count as f64)
    } else {
        None
    };
    let avg_bytes_per_frame_encoded = if encoded_frame_count > 0 {
        Some(encoded_size_bytes as f64 / encoded_frame_count as f64)
    } else {
        None
    };

    let bitrate_original_bps = probe::probe_bitrate(orig_video);
    let bitrate_encoded_bps = probe::probe_bitrate(encoded_video);
    let bitrate_reduction_pct = match (bitrate_original_bps, bitrate_encoded_bps) {
        (Some(orig), Some(enc)) if orig > 0 => {
            Some((1.0 - enc as f64 / orig as f64) * 100.0)
        }
        _ => None,
    };

    Ok(CompressionReport {
        original_size_bytes,
        encoded_size_bytes,
        size_reduction_pct,
        avg_bytes_per_frame_original,
        avg_bytes_per_frame_encoded,
        bitrate_original_bps,
        bitrate_encoded_bps,
        bitrate_reduction_pct,
    })
}

fn file_size(path: &Path) -> Result<u64> {
    let meta = fs::metadata(path)
        .with_context(|| format!("Video file not found: {}", path.display()))?;
    Ok(meta.len())
}

const MB: f64 = 1024.0 * 1024.0;
const KB: f64 = 1024.0;

/// Human-readable summary, mirroring the JSON report fields.
pub fn format_summary(
    report: &CompressionReport,
    gt_frame_count: usize,
    encoded_frame_count: usize,
) -> String {
    let mut out = String::new();
    out.push_str("===================================\n");
    out.push_str(&format!(
        "Original video size: {:.2} MB\n",
        report.original_size_bytes as f64 / MB
    ));
    out.push_str(&format!(
        "Encoded video size:  {:.2} MB\n",
        report.encoded_size_bytes as f64 / MB
    ));
    match report.size_reduction_pct {
        Some(pct) => out.push_str(&format!("Size reduction:      {:.2}%\n", pct)),
        None => out.push_str("Size reduction:      undefined (original size is 0)\n"),
    }
    match report.avg_bytes_per_frame_original {
        Some(avg) => out.push_str(&format!(
            "Avg/frame (orig):    {:.2} KB over {} frames\n",
            avg / KB,
            gt_frame_count
        )),
        None => out.push_str("Avg/frame (orig):    undefined (0 frames)\n"),
    }
    match report.avg_bytes_per_frame_encoded {
        Some(avg) => out.push_str(&format!(
            "Avg/frame (encoded): {:.2} KB over {} frames\n",
            avg / KB,
            encoded_frame_count
        )),
        None => out.push_str("Avg/frame (encoded): undefined (0 frames)\n"),
    }
    match (
        report.bitrate_original_bps,
        report.bitrate_encoded_bps,
        report.bitrate_reduction_pct,
    ) {
        (Some(orig), Some(enc), Some(drop)) => out.push_str(&format!(
            "Bitrate: {:.2} Mbps -> {:.2} Mbps (down {:.2}%)\n",
            orig as f64 / 1e6,
            enc as f64 / 1e6,
            drop
        )),
        _ => out.push_str("Bitrate: n/a (probe unavailable)\n"),
    }
    out.push_str("===================================");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn video_file(dir: &Path, name: &str, size: usize) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(&vec![0u8; size]).unwrap();
        path
    }

    #[test]
    fn test_size_reduction_percentage() {
        let dir = tempfile::tempdir().unwrap();
        let orig = video_file(dir.path(), "orig.mp4", 10 * 1024 * 1024);
        let enc = video_file(dir.path(), "enc.mp4", 4 * 1024 * 1024);

        let report = evaluate(&orig, &enc, 100, 100).unwrap();
        assert_eq!(report.size_reduction_pct, Some(60.0));
        assert_eq!(
            report.avg_bytes_per_frame_original,
            Some(10.0 * 1024.0 * 1024.0 / 100.0)
        );
    }

    #[test]
    fn test_zero_original_size_is_undefined_not_a_crash() {
        let dir = tempfile::tempdir().unwrap();
        let orig = video_file(dir.path(), "orig.mp4", 0);
        let enc = video_file(dir.path(), "enc.mp4", 1024);

        let report = evaluate(&orig, &enc, 10, 10).unwrap();
        assert_eq!(report.size_reduction_pct, None);
        let summary = format_summary(&report, 10, 10);
        assert!(summary.contains("undefined"));
    }

    #[test]
    fn test_zero_frames_gives_undefined_averages() {
        let dir = tempfile::tempdir().unwrap();
        let orig = video_file(dir.path(), "orig.mp4", 1024);
        let enc = video_file(dir.path(), "enc.mp4", 512);

        let report = evaluate(&orig, &enc, 0, 0).unwrap();
        assert_eq!(report.avg_bytes_per_frame_original, None);
        assert_eq!(report.avg_bytes_per_frame_encoded, None);
    }

    #[test]
    fn test_missing_video_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let enc = video_file(dir.path(), "enc.mp4", 512);
        let err = evaluate(Path::new("/no/such/video.mp4"), &enc, 1, 1).unwrap_err();
        assert!(format!("{:#}", err).contains("/no/such/video.mp4"));
    }

    #[test]
    fn test_summary_reports_probe_unavailable() {
        // Raw byte files are not parseable videos, so probing degrades
        let dir = tempfile::tempdir().unwrap();
        let orig = video_file(dir.path(), "orig.mp4", 2048);
        let enc = video_file(dir.path(), "enc.mp4", 1024);

        let report = evaluate(&orig, &enc, 2, 2).unwrap();
        let summary = format_summary(&report, 2, 2);
        assert!(summary.contains("50.00%"));
        if report.bitrate_reduction_pct.is_none() {
            assert!(summary.contains("n/a"));
        }
    }
}
