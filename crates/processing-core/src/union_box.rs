//! Union of detection boxes.

use wildscan_clip_model::{Detection, Rect};
use wildscan_common::WildscanResult;

use crate::detector::Detector;
use crate::source::FrameSource;

/// Running union of detection boxes over one frame size.
///
/// Starts inverted at `(frame_w, frame_h, 0, 0)` so the first box replaces
/// it. Box coordinates are truncated toward zero.
#[derive(Debug, Clone)]
pub struct UnionBox {
    frame_w: u32,
    frame_h: u32,
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
    seen: bool,
}

impl UnionBox {
    pub fn new(frame_w: u32, frame_h: u32) -> Self {
        Self {
            frame_w,
            frame_h,
            x1: i64::from(frame_w),
            y1: i64::from(frame_h),
            x2: 0,
            y2: 0,
            seen: false,
        }
    }

    pub fn add(&mut self, det: &Detection) {
        self.x1 = self.x1.min(det.x1 as i64);
        self.y1 = self.y1.min(det.y1 as i64);
        self.x2 = self.x2.max(det.x2 as i64);
        self.y2 = self.y2.max(det.y2 as i64);
        self.seen = true;
    }

    pub fn extend<'a>(&mut self, dets: impl IntoIterator<Item = &'a Detection>) {
        for det in dets {
            self.add(det);
        }
    }

    /// Whether no box has been added yet.
    pub fn is_empty(&self) -> bool {
        !self.seen
    }

    /// The union clamped into the frame, or `None` if no box was added.
    pub fn finish(&self) -> Option<Rect> {
        if !self.seen {
            return None;
        }
        let fw = i64::from(self.frame_w.max(1));
        let fh = i64::from(self.frame_h.max(1));
        let x1 = self.x1.clamp(0, fw - 1);
        let y1 = self.y1.clamp(0, fh - 1);
        let x2 = self.x2.clamp(x1 + 1, fw);
        let y2 = self.y2.clamp(y1 + 1, fh);
        Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Union of a single frame's detections.
    pub fn of(dets: &[Detection], frame_w: u32, frame_h: u32) -> Option<Rect> {
        let mut union = Self::new(frame_w, frame_h);
        union.extend(dets);
        union.finish()
    }
}

/// Run `detector` on every `stride`-th frame of `source` and return the
/// union of all boxes, or `None` when nothing was detected.
///
/// Frame indices count every decoded frame from 0. A stride of 0 is
/// treated as 1.
pub fn aggregate_union(
    source: &mut dyn FrameSource,
    detector: &mut dyn Detector,
    stride: u32,
) -> WildscanResult<Option<Rect>> {
    let stride = u64::from(stride.max(1));
    let mut union = UnionBox::new(source.width(), source.height());
    let mut index: u64 = 0;

    while let Some(frame) = source.read()? {
        if index % stride == 0 {
            let dets = detector.detect(&frame)?;
            union.extend(&dets);
        }
        index += 1;
    }

    tracing::debug!(
        frames = index,
        found = !union.is_empty(),
        "Aggregated detection union"
    );
    Ok(union.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryFrameSource;
    use wildscan_clip_model::Frame;

    struct Scripted {
        per_call: Vec<Vec<Detection>>,
        calls: usize,
    }

    impl Detector for Scripted {
        fn name(&self) -> &str {
            "SCRIPTED"
        }

        fn detect(&mut self, _frame: &Frame) -> WildscanResult<Vec<Detection>> {
            let dets = self.per_call.get(self.calls).cloned().unwrap_or_default();
            self.calls += 1;
            Ok(dets)
        }
    }

    #[test]
    fn test_union_truncates_and_spans() {
        let dets = vec![
            Detection::new(10.9, 20.2, 50.7, 60.0, 0.9, "deer"),
            Detection::new(40.0, 5.5, 80.3, 30.0, 0.8, "fox"),
        ];
        let rect = UnionBox::of(&dets, 100, 100).unwrap();
        assert_eq!(rect, Rect::new(10, 5, 70, 55));
    }

    #[test]
    fn test_union_clamps_out_of_frame_boxes() {
        let dets = vec![Detection::new(-20.0, 90.0, 150.0, 120.0, 0.9, "bear")];
        let rect = UnionBox::of(&dets, 100, 100).unwrap();
        assert_eq!(rect, Rect::new(0, 90, 100, 10));

        let degenerate = vec![Detection::new(120.0, 120.0, 130.0, 130.0, 0.9, "bear")];
        let rect = UnionBox::of(&degenerate, 100, 100).unwrap();
        assert_eq!(rect, Rect::new(99, 99, 1, 1));
    }

    #[test]
    fn test_no_detections_is_none() {
        assert!(UnionBox::of(&[], 100, 100).is_none());
    }

    #[test]
    fn test_aggregate_respects_stride() {
        let mut source = MemoryFrameSource::blank(100, 100, 10.0, 7);
        let mut detector = Scripted {
            per_call: vec![
                vec![],
                vec![Detection::new(10.0, 10.0, 20.0, 20.0, 0.9, "deer")],
                vec![Detection::new(60.0, 40.0, 70.0, 90.0, 0.9, "deer")],
            ],
            calls: 0,
        };
        let rect = aggregate_union(&mut source, &mut detector, 3)
            .unwrap()
            .unwrap();
        // frames 0, 3 and 6 are sampled
        assert_eq!(detector.calls, 3);
        assert_eq!(rect, Rect::new(10, 10, 60, 80));
    }

    #[test]
    fn test_aggregate_without_detections() {
        let mut source = MemoryFrameSource::blank(64, 48, 10.0, 4);
        let mut detector = Scripted {
            per_call: vec![],
            calls: 0,
        };
        assert!(aggregate_union(&mut source, &mut detector, 1)
            .unwrap()
            .is_none());
        assert_eq!(detector.calls, 4);
    }
}
