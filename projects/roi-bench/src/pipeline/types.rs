// Core value types shared across the pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single detector output record in normalized image coordinates.
///
/// `cx`/`cy` are the box center, `w`/`h` the box extents, all in `[0, 1]`.
/// `confidence` is present only when the detector emitted scores.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub class_id: i64,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Pixel-space corner box derived from a `Detection` and frame dimensions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl PixelBox {
    /// Smallest rectangle enclosing both boxes.
    pub fn enclose(&self, other: &PixelBox) -> PixelBox {
        PixelBox {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }
}

/// One line of a per-frame ROI descriptor file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiRecord {
    pub pixel_box: PixelBox,
    pub qp: f32,
}

impl fmt::Display for RoiRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.pixel_box;
        write!(f, "{},{},{},{}:{}", b.x1, b.y1, b.x2, b.y2, self.qp)
    }
}

/// Class filter value meaning "keep every class".
pub const ALL_CLASSES: i64 = -1;

/// Configuration for the detection-to-ROI conversion stage.
#[derive(Debug, Clone, Copy)]
pub struct RoiConfig {
    pub img_w: u32,
    pub img_h: u32,
    /// Class id to keep, or `ALL_CLASSES` for no filtering.
    pub target_class: i64,
    /// Uniform quantization parameter applied to every emitted region.
    pub qp: f32,
    /// Also emit one `_merge` file per frame with the enclosing box.
    pub merge_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi_record_wire_format() {
        let rec = RoiRecord {
            pixel_box: PixelBox {
                x1: 400,
                y1: 300,
                x2: 600,
                y2: 700,
            },
            qp: 10.0,
        };
        assert_eq!(rec.to_string(), "400,300,600,700:10");

        let rec = RoiRecord {
            pixel_box: PixelBox {
                x1: 0,
                y1: 0,
                x2: 16,
                y2: 16,
            },
            qp: 23.5,
        };
        assert_eq!(rec.to_string(), "0,0,16,16:23.5");
    }

    #[test]
    fn test_enclose_is_componentwise_min_max() {
        let a = PixelBox {
            x1: 0,
            y1: 0,
            x2: 10,
            y2: 10,
        };
        let b = PixelBox {
            x1: 5,
            y1: 5,
            x2: 20,
            y2: 20,
        };
        let merged = a.enclose(&b);
        assert_eq!(
            merged,
            PixelBox {
                x1: 0,
                y1: 0,
                x2: 20,
                y2: 20
            }
        );
    }
}
