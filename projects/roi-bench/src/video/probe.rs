// Stream metadata probing via the ffprobe CLI.

use std::path::Path;
use std::process::Command;

/// Best-effort bitrate (bps) of the first video stream.
///
/// Returns `None` when ffprobe is absent, fails, or reports no bitrate;
/// callers degrade to omitting bitrate metrics.
pub fn probe_bitrate(video: &Path) -> Option<u64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=bit_rate",
            "-of",
            "default=nw=1",
        ])
        .arg(video)
        .output();

    let output = match output {
        Ok(out) => out,
        Err(e) => {
            tracing::warn!("ffprobe unavailable ({}); skipping bitrate metrics", e);
            return None;
        }
    };

    if !output.status.success() {
        tracing::warn!(
            "ffprobe failed on {}: {}",
            video.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    parse_bitrate(&String::from_utf8_lossy(&output.stdout))
}

fn parse_bitrate(stdout: &str) -> Option<u64> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("bit_rate="))
        .and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bitrate_line() {
        assert_eq!(parse_bitrate("bit_rate=4500000\n"), Some(4_500_000));
        assert_eq!(
            parse_bitrate("codec_type=video\nbit_rate=1200\n"),
            Some(1200)
        );
    }

    #[test]
    fn test_parse_bitrate_absent_or_unparseable() {
        assert_eq!(parse_bitrate(""), None);
        assert_eq!(parse_bitrate("bit_rate=N/A\n"), None);
        assert_eq!(parse_bitrate("codec_type=video\n"), None);
    }
}
