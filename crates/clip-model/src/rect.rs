//! Integer crop rectangles in source-frame pixels.
//!
//! Fields are signed so intermediate geometry (re-centering, easing) can
//! step outside the frame before it is fitted back in. A rectangle handed
//! to a crop always satisfies [`Rect::is_within`].

use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle with top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    /// The whole frame.
    pub fn full(frame_w: u32, frame_h: u32) -> Self {
        Self::new(0, 0, i64::from(frame_w), i64::from(frame_h))
    }

    /// Build from corner coordinates. Degenerate extents become 1 px.
    pub fn from_corners(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self::new(x1, y1, (x2 - x1).max(1), (y2 - y1).max(1))
    }

    /// Integer center, `(x + w/2, y + h/2)`.
    pub fn center(&self) -> (i64, i64) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Rectangle of size `w`×`h` around an integer center.
    pub fn around(cx: i64, cy: i64, w: i64, h: i64) -> Self {
        Self::new(cx - w / 2, cy - h / 2, w, h)
    }

    pub fn right(&self) -> i64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.h
    }

    pub fn aspect(&self) -> f64 {
        self.w as f64 / self.h.max(1) as f64
    }

    /// Whether this is a non-empty rectangle fully inside the frame.
    pub fn is_within(&self, frame_w: u32, frame_h: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.w > 0
            && self.h > 0
            && self.right() <= i64::from(frame_w)
            && self.bottom() <= i64::from(frame_h)
    }
}
