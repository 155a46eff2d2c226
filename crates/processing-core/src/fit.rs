//! Crop rectangle fitting.
//!
//! Expands a raw subject rectangle into a crop window that respects a
//! minimum output size, an optional aspect ratio and the frame bounds.

use wildscan_clip_model::Rect;

/// Constraints for [`fit_rectangle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub frame_w: u32,
    pub frame_h: u32,
    /// Minimum crop width before clamping to the frame.
    pub min_w: u32,
    /// Minimum crop height before clamping to the frame.
    pub min_h: u32,
    /// Padding added on every side, as a fraction of the longer side.
    pub margin_ratio: f64,
    /// Target width/height ratio. Non-positive or non-finite values are ignored.
    pub target_aspect: Option<f64>,
}

impl FitParams {
    pub fn new(frame_w: u32, frame_h: u32, min_w: u32, min_h: u32) -> Self {
        Self {
            frame_w,
            frame_h,
            min_w,
            min_h,
            margin_ratio: 0.0,
            target_aspect: None,
        }
    }

    pub fn with_margin(mut self, margin_ratio: f64) -> Self {
        self.margin_ratio = margin_ratio;
        self
    }

    pub fn with_aspect(mut self, aspect: f64) -> Self {
        self.target_aspect = Some(aspect);
        self
    }

    fn aspect(&self) -> Option<f64> {
        self.target_aspect.filter(|a| a.is_finite() && *a > 0.0)
    }
}

/// Fit `rect` into the frame.
///
/// Steps: add margin, enforce minimums, grow the short side to the target
/// aspect, re-center on the input's center, clamp into the frame. A result
/// larger than the frame is replaced by the largest centered rectangle of
/// the target aspect (or the full frame when there is no target aspect).
pub fn fit_rectangle(rect: Rect, params: &FitParams) -> Rect {
    let frame_w = i64::from(params.frame_w.max(1));
    let frame_h = i64::from(params.frame_h.max(1));
    let aspect = params.aspect();

    let pad = (rect.w.max(rect.h) as f64 * params.margin_ratio).round() as i64;
    let mut w = (rect.w + 2 * pad).max(1);
    let mut h = (rect.h + 2 * pad).max(1);

    w = w.max(i64::from(params.min_w));
    h = h.max(i64::from(params.min_h));

    if let Some(ar) = aspect {
        let current = w as f64 / h as f64;
        if current < ar {
            w = (h as f64 * ar).round() as i64;
        } else if current > ar {
            h = (w as f64 / ar).round() as i64;
        }
    }

    if w > frame_w || h > frame_h {
        return best_fit(frame_w, frame_h, aspect);
    }

    let (cx, cy) = rect.center();
    let x = (cx - w / 2).clamp(0, frame_w - w);
    let y = (cy - h / 2).clamp(0, frame_h - h);
    Rect::new(x, y, w, h)
}

/// Largest centered rectangle inside the frame with the given aspect.
fn best_fit(frame_w: i64, frame_h: i64, aspect: Option<f64>) -> Rect {
    let Some(ar) = aspect else {
        return Rect::new(0, 0, frame_w, frame_h);
    };

    let mut w = frame_w;
    let mut h = (frame_w as f64 / ar).round() as i64;
    if h > frame_h {
        h = frame_h;
        w = (frame_h as f64 * ar).round() as i64;
    }
    let w = w.clamp(1, frame_w);
    let h = h.clamp(1, frame_h);
    Rect::new((frame_w - w) / 2, (frame_h - h) / 2, w, h)
}
