//! Tracking camera: a jitter-resistant crop window that follows the subject.
//!
//! # Algorithm
//!
//! On stride frames the union of the frame's detections is fitted (with the
//! tracking margin and the output aspect) into a **target** rectangle. A
//! frame without detections keeps the previous target.
//!
//! Every frame the camera moves toward the target:
//!
//! 1. **Deltas** between current and target centers and sizes.
//! 2. **Deadzone**: deltas within the zone collapse to zero, larger ones
//!    shrink by the zone size.
//! 3. **Clamp** to the per-frame move/zoom limits.
//! 4. **Ease**: add `alpha * delta` to the current center and size.
//! 5. **Refit** with zero margin so the window stays inside the frame and
//!    keeps the output aspect. The eased height follows the eased width.
//! 6. **Limit**: the refit can shift or grow the window past the per-frame
//!    limits, so the realized change is measured against the previous
//!    window and pulled back toward it until every limit holds.

use wildscan_clip_model::{Detection, Rect};
use wildscan_common::ScannerConfig;

use crate::fit::{fit_rectangle, FitParams};
use crate::union_box::UnionBox;

const LIMIT_SEARCH_STEPS: u32 = 32;

/// Tuning for the tracking camera.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    /// Easing factor for center movement per frame, in `[0, 1]`.
    pub center_alpha: f64,
    /// Easing factor for size change per frame, in `[0, 1]`.
    pub size_alpha: f64,
    /// Largest center delta per frame, as a fraction of the frame dimension.
    pub max_move_frac: f64,
    /// Largest size delta per frame, as a fraction of the frame dimension.
    pub max_zoom_frac: f64,
    /// Center offsets below this fraction of the frame are ignored.
    pub center_deadzone_frac: f64,
    /// Size differences below this fraction of the frame are ignored.
    pub zoom_deadzone_frac: f64,
    /// Margin around the subject when building a target.
    pub margin: f64,
    /// Output width; also the minimum crop width.
    pub min_output_width: u32,
    /// Output height; also the minimum crop height.
    pub min_output_height: u32,
    /// Run detection on every Nth frame.
    pub stride: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            center_alpha: 0.05,
            size_alpha: 0.04,
            max_move_frac: 0.05,
            max_zoom_frac: 0.06,
            center_deadzone_frac: 0.10,
            zoom_deadzone_frac: 0.12,
            margin: 0.20,
            min_output_width: 640,
            min_output_height: 360,
            stride: 5,
        }
    }
}

impl TrackingConfig {
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self {
            center_alpha: config.tracking_center_alpha,
            size_alpha: config.tracking_size_alpha,
            max_move_frac: config.tracking_max_move_frac,
            max_zoom_frac: config.tracking_max_zoom_frac,
            center_deadzone_frac: config.tracking_center_deadzone_frac,
            zoom_deadzone_frac: config.tracking_zoom_deadzone_frac,
            margin: config.tracking_margin,
            min_output_width: config.min_output_width,
            min_output_height: config.min_output_height,
            stride: config.frame_stride,
        }
    }

    /// Fixed output resolution, at least 2×2.
    pub fn output_size(&self) -> (u32, u32) {
        (self.min_output_width.max(2), self.min_output_height.max(2))
    }

    pub fn output_aspect(&self) -> f64 {
        let (w, h) = self.output_size();
        f64::from(w) / f64::from(h)
    }
}

/// Per-frame deltas after deadzone and clamping, before easing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraStep {
    pub dcx: i64,
    pub dcy: i64,
    pub dw: i64,
    pub dh: i64,
}

/// Stateful tracking filter for one clip.
///
/// Owns the camera rectangle for the duration of one pass; create a new
/// smoother per clip.
#[derive(Debug, Clone)]
pub struct CameraSmoother {
    config: TrackingConfig,
    frame_w: u32,
    frame_h: u32,
    target: Option<Rect>,
    current: Option<Rect>,
}

impl CameraSmoother {
    pub fn new(config: TrackingConfig, frame_w: u32, frame_h: u32) -> Self {
        Self {
            config,
            frame_w,
            frame_h,
            target: None,
            current: None,
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn output_size(&self) -> (u32, u32) {
        self.config.output_size()
    }

    /// Whether detection should run on frame `index`.
    pub fn is_stride_frame(&self, index: u64) -> bool {
        index % u64::from(self.config.stride.max(1)) == 0
    }

    pub fn target(&self) -> Option<Rect> {
        self.target
    }

    /// Camera rectangle after the last [`advance`](Self::advance).
    pub fn current(&self) -> Option<Rect> {
        self.current
    }

    /// Update the target from one stride frame's detections. An empty list
    /// keeps the previous target.
    pub fn observe(&mut self, detections: &[Detection]) -> Option<Rect> {
        if let Some(raw) = UnionBox::of(detections, self.frame_w, self.frame_h) {
            let params = self.fit_params().with_margin(self.config.margin);
            self.target = Some(fit_rectangle(raw, &params));
        }
        self.target
    }

    /// Move one frame toward the target and return the crop rectangle.
    ///
    /// The first call starts at the current target, or at the largest
    /// centered window of the output aspect if nothing has been detected yet.
    pub fn advance(&mut self) -> Rect {
        let current = match self.current {
            Some(current) => current,
            None => self.target.unwrap_or_else(|| self.home()),
        };
        self.current = Some(current);

        let Some(target) = self.target else {
            return current;
        };

        let step = self.plan(current, target);
        let (cx, cy) = current.center();
        let cxn = ease(cx, step.dcx, self.config.center_alpha);
        let cyn = ease(cy, step.dcy, self.config.center_alpha);
        let wn = ease(current.w, step.dw, self.config.size_alpha).max(1);
        let hn = self.height_for(wn);

        let refit = fit_rectangle(Rect::around(cxn, cyn, wn, hn), &self.fit_params());
        let next = self.limit_step(current, refit);
        self.current = Some(next);
        next
    }

    /// Deltas from `current` toward `target` with deadzone and clamps applied.
    pub fn plan(&self, current: Rect, target: Rect) -> CameraStep {
        let fw = f64::from(self.frame_w);
        let fh = f64::from(self.frame_h);
        let c = &self.config;

        let (cxp, cyp) = current.center();
        let (cxt, cyt) = target.center();

        let max_dx = limit(fw, c.max_move_frac);
        let max_dy = limit(fh, c.max_move_frac);
        let max_dw = limit(fw, c.max_zoom_frac);
        let max_dh = limit(fh, c.max_zoom_frac);

        CameraStep {
            dcx: deadzone(cxt - cxp, zone(fw, c.center_deadzone_frac)).clamp(-max_dx, max_dx),
            dcy: deadzone(cyt - cyp, zone(fh, c.center_deadzone_frac)).clamp(-max_dy, max_dy),
            dw: deadzone(target.w - current.w, zone(fw, c.zoom_deadzone_frac))
                .clamp(-max_dw, max_dw),
            dh: deadzone(target.h - current.h, zone(fh, c.zoom_deadzone_frac))
                .clamp(-max_dh, max_dh),
        }
    }

    /// Window shown before the first detection: the whole frame, narrowed
    /// to the output aspect.
    fn home(&self) -> Rect {
        fit_rectangle(Rect::full(self.frame_w, self.frame_h), &self.fit_params())
    }

    fn height_for(&self, width: i64) -> i64 {
        ((width as f64 / self.config.output_aspect()).round() as i64).max(1)
    }

    /// The point on the way from `from` to `to` closest to `to` whose
    /// realized change stays within the per-frame limits. Falls back to
    /// `from` when no intermediate window qualifies.
    fn limit_step(&self, from: Rect, to: Rect) -> Rect {
        if self.step_allowed(from, to) {
            return to;
        }
        for k in (1..LIMIT_SEARCH_STEPS).rev() {
            let t = f64::from(k) / f64::from(LIMIT_SEARCH_STEPS);
            let w = lerp(from.w, to.w, t).max(1);
            let candidate = Rect::new(
                lerp(from.x, to.x, t),
                lerp(from.y, to.y, t),
                w,
                self.height_for(w),
            );
            if candidate.is_within(self.frame_w, self.frame_h)
                && self.step_allowed(from, candidate)
            {
                return candidate;
            }
        }
        from
    }

    fn step_allowed(&self, from: Rect, to: Rect) -> bool {
        let fw = f64::from(self.frame_w);
        let fh = f64::from(self.frame_h);
        let c = &self.config;
        let (fcx, fcy) = from.center();
        let (tcx, tcy) = to.center();

        (tcx - fcx).abs() <= limit(fw, c.max_move_frac)
            && (tcy - fcy).abs() <= limit(fh, c.max_move_frac)
            && (to.w - from.w).abs() <= limit(fw, c.max_zoom_frac)
            && (to.h - from.h).abs() <= limit(fh, c.max_zoom_frac)
    }

    fn fit_params(&self) -> FitParams {
        let (out_w, out_h) = self.output_size();
        FitParams::new(self.frame_w, self.frame_h, out_w, out_h)
            .with_aspect(self.config.output_aspect())
    }
}

/// Deltas within `zone` collapse to 0; larger ones shrink toward 0 by `zone`.
fn deadzone(delta: i64, zone: i64) -> i64 {
    if delta.abs() <= zone {
        0
    } else {
        delta - zone * delta.signum()
    }
}

fn zone(dimension: f64, frac: f64) -> i64 {
    (dimension * frac.max(0.0)).round() as i64
}

// Largest whole-pixel delta not exceeding `frac * dimension`.
fn limit(dimension: f64, frac: f64) -> i64 {
    (dimension * frac.max(0.0)).floor() as i64
}

fn ease(value: i64, delta: i64, alpha: f64) -> i64 {
    (value as f64 + alpha.clamp(0.0, 1.0) * delta as f64).round() as i64
}

// Truncates toward `a`, so the result never overshoots the interpolation.
fn lerp(a: i64, b: i64, t: f64) -> i64 {
    a + (t * (b - a) as f64).trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoother() -> CameraSmoother {
        CameraSmoother::new(TrackingConfig::default(), 1920, 1080)
    }

    #[test]
    fn test_deadzone() {
        assert_eq!(deadzone(50, 100), 0);
        assert_eq!(deadzone(-100, 100), 0);
        assert_eq!(deadzone(150, 100), 50);
        assert_eq!(deadzone(-150, 100), -50);
    }

    #[test]
    fn test_starts_at_full_frame_without_detections() {
        let mut cam = smoother();
        assert_eq!(cam.observe(&[]), None);
        assert_eq!(cam.advance(), Rect::full(1920, 1080));
        assert_eq!(cam.advance(), Rect::full(1920, 1080));
    }

    #[test]
    fn test_starts_at_first_target() {
        let mut cam = smoother();
        let target = cam
            .observe(&[Detection::new(900.0, 500.0, 1000.0, 560.0, 0.9, "deer")])
            .unwrap();
        assert_eq!(cam.advance(), target);
        assert_eq!((target.w, target.h), (640, 360));
    }

    #[test]
    fn test_empty_observation_keeps_target() {
        let mut cam = smoother();
        let det = Detection::new(100.0, 100.0, 300.0, 200.0, 0.9, "fox");
        let target = cam.observe(&[det]);
        assert_eq!(cam.observe(&[]), target);
    }

    #[test]
    fn test_plan_clamps_large_moves() {
        let cam = smoother();
        let current = Rect::new(0, 0, 640, 360);
        let target = Rect::new(1280, 720, 640, 360);
        let step = cam.plan(current, target);
        // 5% of 1920 and 1080
        assert_eq!(step.dcx, 96);
        assert_eq!(step.dcy, 54);
        assert_eq!((step.dw, step.dh), (0, 0));
    }

    #[test]
    fn test_plan_ignores_small_offsets() {
        let cam = smoother();
        let current = Rect::new(600, 300, 640, 360);
        let target = Rect::new(700, 350, 700, 400);
        assert_eq!(cam.plan(current, target), CameraStep::default());
    }

    #[test]
    fn test_advance_eases_toward_target() {
        let mut cam = smoother();
        cam.observe(&[]);
        // starts full frame
        assert_eq!(cam.advance(), Rect::full(1920, 1080));

        cam.observe(&[Detection::new(100.0, 100.0, 200.0, 160.0, 0.9, "deer")]);
        let first = cam.advance();
        assert!(first.is_within(1920, 1080));
        assert!(first.w < 1920);
        assert!((first.aspect() - 16.0 / 9.0).abs() / (16.0 / 9.0) < 1e-2);

        let mut last = first;
        for _ in 0..500 {
            last = cam.advance();
        }
        let target = cam.target().unwrap();
        let start_dist = (960 - target.center().0).abs();
        assert!((last.center().0 - target.center().0).abs() < start_dist);
        assert!(last.is_within(1920, 1080));
        assert!(last.w < first.w);
    }

    #[test]
    fn test_starts_at_aspect_window_on_narrow_frame() {
        let mut cam = CameraSmoother::new(TrackingConfig::default(), 1440, 1080);
        cam.observe(&[]);
        assert_eq!(cam.advance(), Rect::new(0, 135, 1440, 810));
    }

    #[test]
    fn test_full_alpha_steps_respect_limits() {
        let config = TrackingConfig {
            center_alpha: 1.0,
            size_alpha: 1.0,
            ..TrackingConfig::default()
        };
        let mut cam = CameraSmoother::new(config, 1440, 1080);
        let boxes = [
            (20.0, 30.0, 120.0, 90.0),
            (1300.0, 950.0, 1430.0, 1070.0),
            (0.0, 0.0, 1440.0, 1080.0),
            (700.0, 500.0, 760.0, 540.0),
            (10.0, 900.0, 300.0, 1075.0),
        ];
        let mut prev = cam.advance();
        for (x1, y1, x2, y2) in boxes {
            cam.observe(&[Detection::new(x1, y1, x2, y2, 0.9, "boar")]);
            for _ in 0..40 {
                let next = cam.advance();
                assert!(next.is_within(1440, 1080), "{next:?}");
                // 6% zoom and 5% move of 1440x1080, floored
                assert!((next.w - prev.w).abs() <= 86, "{prev:?} -> {next:?}");
                assert!((next.h - prev.h).abs() <= 64, "{prev:?} -> {next:?}");
                assert!((next.center().0 - prev.center().0).abs() <= 72);
                assert!((next.center().1 - prev.center().1).abs() <= 54);
                prev = next;
            }
        }
    }

    #[test]
    fn test_lerp_truncates_toward_start() {
        assert_eq!(lerp(10, 20, 0.55), 15);
        assert_eq!(lerp(20, 10, 0.55), 15);
        assert_eq!(lerp(5, 5, 0.9), 5);
    }
}
