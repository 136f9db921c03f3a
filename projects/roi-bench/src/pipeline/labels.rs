// Detection label-file parser.
//
// One label file per frame, one whitespace-separated record per line:
// `class cx cy w h` with an optional trailing confidence column. All
// coordinates are normalized. A malformed line aborts the whole run;
// skipping it silently would corrupt the downstream encoding.

use crate::pipeline::types::Detection;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Parse every record of one per-frame label file, in file order.
pub fn parse_label_file(path: &Path) -> Result<Vec<Detection>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read label file: {}", path.display()))?;
    parse_label_content(&content, path)
}

fn parse_label_content(content: &str, path: &Path) -> Result<Vec<Detection>> {
    let mut detections = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let detection = parse_label_line(line).with_context(|| {
            format!(
                "Malformed detection record at {}:{}: '{}'",
                path.display(),
                idx + 1,
                line.trim()
            )
        })?;
        detections.push(detection);
    }

    Ok(detections)
}

/// Parse a single label record; used for files and detector stdout alike.
pub fn parse_label_line(line: &str) -> Result<Detection> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 && fields.len() != 6 {
        bail!(
            "expected 5 or 6 fields (class cx cy w h [conf]), got {}",
            fields.len()
        );
    }

    let num = |field: &str| -> Result<f64> {
        field
            .parse::<f64>()
            .with_context(|| format!("non-numeric field '{}'", field))
    };

    // YOLO writes the class column as a float in some export paths
    let class_id = num(fields[0])? as i64;
    let cx = num(fields[1])?;
    let cy = num(fields[2])?;
    let w = num(fields[3])?;
    let h = num(fields[4])?;
    let confidence = match fields.get(5) {
        Some(f) => Some(num(f)?),
        None => None,
    };

    Ok(Detection {
        class_id,
        cx,
        cy,
        w,
        h,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(content: &str) -> Result<Vec<Detection>> {
        parse_label_content(content, &PathBuf::from("frame_0001.txt"))
    }

    #[test]
    fn test_parse_basic_records() {
        let dets = parse("0 0.5 0.5 0.2 0.4\n2 0.1 0.2 0.05 0.05\n").unwrap();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].class_id, 0);
        assert_eq!(dets[0].cx, 0.5);
        assert_eq!(dets[0].h, 0.4);
        assert_eq!(dets[0].confidence, None);
        assert_eq!(dets[1].class_id, 2);
    }

    #[test]
    fn test_parse_with_confidence_column() {
        let dets = parse("1 0.5 0.5 0.2 0.4 0.87\n").unwrap();
        assert_eq!(dets[0].confidence, Some(0.87));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dets = parse("0 0.5 0.5 0.2 0.4\n\n1 0.3 0.3 0.1 0.1\n").unwrap();
        assert_eq!(dets.len(), 2);
    }

    #[test]
    fn test_wrong_field_count_fails_with_location() {
        let err = parse("0 0.5 0.5 0.2 0.4\n0 0.5 0.5\n").unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("frame_0001.txt:2"), "got: {}", msg);
        assert!(msg.contains("5 or 6 fields"), "got: {}", msg);
    }

    #[test]
    fn test_non_numeric_field_fails_with_location() {
        let err = parse("0 0.5 oops 0.2 0.4\n").unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("frame_0001.txt:1"), "got: {}", msg);
        assert!(msg.contains("non-numeric"), "got: {}", msg);
    }

    #[test]
    fn test_float_class_column_is_accepted() {
        let dets = parse("3.0 0.5 0.5 0.2 0.4\n").unwrap();
        assert_eq!(dets[0].class_id, 3);
    }
}
