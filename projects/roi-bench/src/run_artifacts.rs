// Run artifact struct definitions
//
// This module contains the struct definitions for artifacts that are
// persisted as JSON files within an evaluation's work directory: the
// COCO-style annotation exchange documents handed to the external scorer
// and the final machine-readable run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image metadata entry of a ground-truth annotation document.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CocoImage {
    pub file_name: String,
    pub height: u32,
    pub width: u32,
    pub id: u64,
}

/// One bounding-box annotation in scorer exchange format.
///
/// `bbox` is `[x, y, width, height]` in pixels; `category_id` follows the
/// scorer's 1-based category convention.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CocoAnnotation {
    pub id: u64,
    pub image_id: u64,
    pub category_id: i64,
    pub bbox: [f64; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub area: f64,
    pub iscrowd: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CocoCategory {
    pub id: i64,
    pub name: String,
}

/// Full ground-truth document; predictions are serialized as a bare
/// `Vec<CocoAnnotation>` instead.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CocoDataset {
    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
    pub categories: Vec<CocoCategory>,
}

/// Compression metrics between the original and ROI-encoded video.
///
/// `None` fields are metrics that are undefined for this run (zero-byte
/// original, zero frames) or unavailable (bitrate probing failed); they
/// are omitted from the JSON report and printed as "undefined"/"n/a".
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CompressionReport {
    pub original_size_bytes: u64,
    pub encoded_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_reduction_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_bytes_per_frame_original: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_bytes_per_frame_encoded: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_original_bps: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_encoded_bps: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_reduction_pct: Option<f64>,
}

/// Machine-readable summary of one evaluation run (report.json).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunReport {
    pub created_at: DateTime<Utc>,
    pub gt_frames: usize,
    pub encoded_frames: usize,
    pub gt_annotations: usize,
    pub pred_annotations: usize,
    pub compression: CompressionReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_metrics_are_omitted_from_json() {
        let report = CompressionReport {
            original_size_bytes: 0,
            encoded_size_bytes: 42,
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("size_reduction_pct").is_none());
        assert!(json.get("bitrate_reduction_pct").is_none());
        assert_eq!(json["original_size_bytes"], 0);
    }

    #[test]
    fn test_prediction_annotation_serializes_score() {
        let ann = CocoAnnotation {
            id: 1,
            image_id: 0,
            category_id: 1,
            bbox: [10.0, 20.0, 30.0, 40.0],
            score: Some(0.9),
            area: 1200.0,
            iscrowd: 0,
        };
        let json = serde_json::to_value(&ann).unwrap();
        assert_eq!(json["score"], 0.9);
        assert_eq!(json["bbox"][2], 30.0);

        let gt = CocoAnnotation { score: None, ..ann };
        let json = serde_json::to_value(&gt).unwrap();
        assert!(json.get("score").is_none());
    }

    #[test]
    fn test_run_report_round_trip() {
        let report = RunReport {
            created_at: Utc::now(),
            gt_frames: 100,
            encoded_frames: 100,
            gt_annotations: 250,
            pred_annotations: 240,
            compression: CompressionReport {
                original_size_bytes: 10 * 1024 * 1024,
                encoded_size_bytes: 4 * 1024 * 1024,
                size_reduction_pct: Some(60.0),
                ..Default::default()
            },
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.gt_frames, 100);
        assert_eq!(back.compression.size_reduction_pct, Some(60.0));
    }
}
