// Detector seam: the object detector is an external capability consumed
// through a single-method trait so tests can substitute a fake.

use crate::pipeline::labels;
use crate::pipeline::types::Detection;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// A capability that maps one frame image to its detections.
pub trait Detector {
    fn detect(&mut self, image: &Path) -> Result<Vec<Detection>>;
}

/// Blanket implementation so any closure with the right signature
/// automatically implements Detector.
impl<F> Detector for F
where
    F: FnMut(&Path) -> Result<Vec<Detection>>,
{
    fn detect(&mut self, image: &Path) -> Result<Vec<Detection>> {
        self(image)
    }
}

/// Detector backed by a directory of pre-computed label files.
///
/// Looks up `<image stem>.txt`; a missing file means the detector found
/// nothing in that frame (YOLO omits the file for empty frames).
pub struct LabelDirDetector {
    labels_dir: PathBuf,
}

impl LabelDirDetector {
    pub fn new(labels_dir: &Path) -> Result<Self> {
        if !labels_dir.is_dir() {
            bail!("Label directory not found: {}", labels_dir.display());
        }
        Ok(Self {
            labels_dir: labels_dir.to_path_buf(),
        })
    }
}

impl Detector for LabelDirDetector {
    fn detect(&mut self, image: &Path) -> Result<Vec<Detection>> {
        let stem = image
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Invalid frame filename: {}", image.display()))?;

        let label_path = self.labels_dir.join(format!("{}.txt", stem));
        if !label_path.exists() {
            return Ok(Vec::new());
        }
        labels::parse_label_file(&label_path)
    }
}

/// Detector backed by an external inference program.
///
/// The program is invoked once per image as
/// `<program> <image> --imgsz N --conf C` and must print label-format
/// records (`class cx cy w h [conf]`) to stdout.
pub struct CommandDetector {
    program: String,
    imgsz: u32,
    conf: f64,
}

impl CommandDetector {
    pub fn new(program: &str, imgsz: u32, conf: f64) -> Self {
        Self {
            program: program.to_string(),
            imgsz,
            conf,
        }
    }
}

impl Detector for CommandDetector {
    fn detect(&mut self, image: &Path) -> Result<Vec<Detection>> {
        let output = Command::new(&self.program)
            .arg(image)
            .arg("--imgsz")
            .arg(self.imgsz.to_string())
            .arg("--conf")
            .arg(self.conf.to_string())
            .output()
            .with_context(|| format!("Failed to run detector command '{}'", self.program))?;

        if !output.status.success() {
            bail!(
                "Detector command '{}' failed on {}: {}",
                self.program,
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut detections = Vec::new();
        for (idx, line) in stdout.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let det = labels::parse_label_line(line).with_context(|| {
                format!(
                    "Malformed detector output for {} (line {}): '{}'",
                    image.display(),
                    idx + 1,
                    line.trim()
                )
            })?;
            detections.push(det);
        }
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_label_dir_detector_reads_matching_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("frame_0001.txt"), "0 0.5 0.5 0.2 0.4\n").unwrap();

        let mut detector = LabelDirDetector::new(dir.path()).unwrap();
        let dets = detector.detect(Path::new("frames/frame_0001.jpg")).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].class_id, 0);
    }

    #[test]
    fn test_label_dir_detector_missing_file_is_empty_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut detector = LabelDirDetector::new(dir.path()).unwrap();
        let dets = detector.detect(Path::new("frames/frame_0042.jpg")).unwrap();
        assert!(dets.is_empty());
    }

    #[test]
    fn test_label_dir_detector_missing_dir_fails() {
        assert!(LabelDirDetector::new(Path::new("/no/such/labels")).is_err());
    }

    #[test]
    fn test_closure_fake_implements_detector() {
        let mut fake = |_: &Path| -> Result<Vec<Detection>> {
            Ok(vec![Detection {
                class_id: 1,
                cx: 0.5,
                cy: 0.5,
                w: 0.1,
                h: 0.1,
                confidence: Some(0.9),
            }])
        };
        let dets = fake.detect(Path::new("any.jpg")).unwrap();
        assert_eq!(dets.len(), 1);
    }
}
