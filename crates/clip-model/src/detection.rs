//! Object detections.

use serde::{Deserialize, Serialize};

/// One box reported by a detector, in source-frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    /// Detector confidence in `[0, 1]`.
    pub score: f64,
    /// Lower-cased class label.
    pub class_name: String,
}

impl Detection {
    pub fn new(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        score: f64,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            score,
            class_name: class_name.into(),
        }
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_extent() {
        let det = Detection::new(10.0, 20.0, 110.0, 70.0, 0.9, "deer");
        assert_eq!(det.width(), 100.0);
        assert_eq!(det.height(), 50.0);

        let inverted = Detection::new(50.0, 50.0, 10.0, 10.0, 0.5, "fox");
        assert_eq!(inverted.width(), 0.0);
    }

    #[test]
    fn test_detection_json_shape() {
        let det: Detection = serde_json::from_str(
            r#"{"x1":1.5,"y1":2.0,"x2":3.0,"y2":4.0,"score":0.7,"class_name":"bird"}"#,
        )
        .unwrap();
        assert_eq!(det.class_name, "bird");
        assert_eq!(det.x1, 1.5);
    }
}
