//! Activity timestamps to clip intervals.
//!
//! # Algorithm
//!
//! 1. **Pad** each timestamp into `[t - preroll, t + postroll]`, clamped to
//!    the video duration. Empty intervals are dropped.
//! 2. **Sort** candidates by start.
//! 3. **Sweep**: merge the next candidate into the accumulator when it starts
//!    within `merge_gap` of the accumulator's end (equality merges).
//! 4. **Filter**: a flushed interval is kept only if it lasts at least
//!    `min_activity`.

use serde::{Deserialize, Serialize};
use wildscan_clip_model::VideoSegment;
use wildscan_common::ScannerConfig;

/// Padding and merge policy for activity segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPolicy {
    /// Seconds kept before each activity timestamp.
    pub preroll_sec: f64,
    /// Seconds kept after each activity timestamp.
    pub postroll_sec: f64,
    /// Shortest interval worth emitting.
    pub min_activity_sec: f64,
    /// Intervals separated by at most this many seconds are merged.
    pub merge_gap_sec: f64,
}

impl Default for SegmentPolicy {
    fn default() -> Self {
        Self {
            preroll_sec: 1.0,
            postroll_sec: 2.0,
            min_activity_sec: 0.5,
            merge_gap_sec: 1.0,
        }
    }
}

impl SegmentPolicy {
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self {
            preroll_sec: config.preroll_sec,
            postroll_sec: config.postroll_sec,
            min_activity_sec: config.min_activity_sec,
            merge_gap_sec: config.merge_gap_sec,
        }
    }
}

/// Convert activity timestamps into ordered, non-overlapping segments.
///
/// Negative (and NaN) timestamps are ignored; input order does not matter.
pub fn compute_segments(
    activity_times: &[f64],
    video_duration: f64,
    policy: &SegmentPolicy,
) -> Vec<VideoSegment> {
    let mut times: Vec<f64> = activity_times
        .iter()
        .copied()
        .filter(|t| *t >= 0.0)
        .collect();
    if times.is_empty() {
        return vec![];
    }
    times.sort_by(f64::total_cmp);

    let mut candidates: Vec<(f64, f64)> = times
        .iter()
        .map(|t| {
            let start = (t - policy.preroll_sec).max(0.0);
            let end = (t + policy.postroll_sec).min(video_duration);
            (start, end)
        })
        .filter(|(start, end)| end > start)
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut segments = Vec::new();
    let mut iter = candidates.into_iter();
    let Some((mut cur_start, mut cur_end)) = iter.next() else {
        return segments;
    };

    let mut flush = |start: f64, end: f64| {
        let segment = VideoSegment::new(start, end);
        if segment.duration() >= policy.min_activity_sec {
            segments.push(segment);
        }
    };

    for (start, end) in iter {
        if start <= cur_end + policy.merge_gap_sec {
            cur_end = cur_end.max(end);
        } else {
            flush(cur_start, cur_end);
            cur_start = start;
            cur_end = end;
        }
    }
    flush(cur_start, cur_end);

    segments
}
