//! Class and confidence filtering of raw detections.

use std::collections::HashSet;

use serde::Deserialize;
use wildscan_clip_model::Detection;

/// A box as reported by the sidecar, before filtering.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawDetection {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub score: f64,
    #[serde(alias = "class")]
    pub class_name: String,
}

/// Keeps detections of allowed classes at or above a confidence threshold.
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    allowed: Option<HashSet<String>>,
    min_score: f64,
}

impl ClassFilter {
    /// An empty class list disables class filtering.
    pub fn new<S: AsRef<str>>(allowed: &[S], min_score: f64) -> Self {
        let allowed: HashSet<String> = allowed
            .iter()
            .map(|c| c.as_ref().trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        Self {
            allowed: (!allowed.is_empty()).then_some(allowed),
            min_score,
        }
    }

    pub fn allows_class(&self, class_name: &str) -> bool {
        self.allowed
            .as_ref()
            .map_or(true, |allowed| allowed.contains(class_name))
    }

    /// Lower-case class names, then drop unknown classes and weak scores.
    pub fn apply(&self, raw: Vec<RawDetection>) -> Vec<Detection> {
        raw.into_iter()
            .filter_map(|r| {
                let class_name = r.class_name.to_lowercase();
                if r.score < self.min_score || !self.allows_class(&class_name) {
                    return None;
                }
                Some(Detection::new(r.x1, r.y1, r.x2, r.y2, r.score, class_name))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(class_name: &str, score: f64) -> RawDetection {
        RawDetection {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
            score,
            class_name: class_name.to_string(),
        }
    }

    #[test]
    fn test_filters_by_class_case_insensitively() {
        let filter = ClassFilter::new(&["Bird", "bear"], 0.25);
        let out = filter.apply(vec![raw("BIRD", 0.9), raw("person", 0.9), raw("bear", 0.5)]);
        let names: Vec<_> = out.iter().map(|d| d.class_name.as_str()).collect();
        assert_eq!(names, vec!["bird", "bear"]);
    }

    #[test]
    fn test_filters_by_score() {
        let filter = ClassFilter::new::<&str>(&[], 0.5);
        let out = filter.apply(vec![raw("animal", 0.49), raw("animal", 0.5)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].score, 0.5);
    }

    #[test]
    fn test_empty_class_list_allows_everything() {
        let filter = ClassFilter::new(&["", " "], 0.0);
        assert!(filter.allows_class("vehicle"));
    }

    #[test]
    fn test_wire_class_alias() {
        let det: RawDetection = serde_json::from_str(
            r#"{"x1":1,"y1":2,"x2":3,"y2":4,"score":0.8,"class":"Animal"}"#,
        )
        .unwrap();
        assert_eq!(det.class_name, "Animal");
    }
}
