//! Re-framing passes: static zoom and per-frame tracking.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb};
use wildscan_clip_model::{Frame, Rect};
use wildscan_common::{WildscanError, WildscanResult};
use wildscan_processing_core::{CameraSmoother, Detector, FrameSink, FrameSource, TrackingConfig};

use crate::ffmpeg::{EncodeSettings, FfmpegCommand};

/// `crop=w:h:x:y,scale=W:H` filter for a static zoom.
pub fn static_crop_filter(crop: Rect, out_w: u32, out_h: u32) -> String {
    format!(
        "crop={}:{}:{}:{},scale={out_w}:{out_h}",
        crop.w, crop.h, crop.x, crop.y
    )
}

/// Single ffmpeg invocation that crops `input` to `crop` and scales it to
/// the output size.
pub fn static_zoom_command(
    input: &Path,
    output: &Path,
    crop: Rect,
    out_w: u32,
    out_h: u32,
    settings: &EncodeSettings,
) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .video_filter(static_crop_filter(crop, out_w, out_h))
        .encode(settings)
        .faststart()
}

/// Crop `frame` to `rect` and resize the result to `out_w`×`out_h`
/// (bilinear). The rectangle is clamped into the frame first.
///
/// Pixels are treated as opaque 3-byte triples, so BGR order is preserved.
pub fn crop_and_scale(frame: &Frame, rect: Rect, out_w: u32, out_h: u32) -> WildscanResult<Frame> {
    let fw = i64::from(frame.width);
    let fh = i64::from(frame.height);
    let x = rect.x.clamp(0, (fw - 1).max(0));
    let y = rect.y.clamp(0, (fh - 1).max(0));
    let w = rect.w.min(fw - x).max(1);
    let h = rect.h.min(fh - y).max(1);

    let view = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(
        frame.width,
        frame.height,
        frame.data.clone(),
    )
    .ok_or_else(|| WildscanError::postprocess("Frame buffer does not match its dimensions"))?;

    let cropped = imageops::crop_imm(&view, x as u32, y as u32, w as u32, h as u32).to_image();
    let scaled = if (cropped.width(), cropped.height()) == (out_w, out_h) {
        cropped
    } else {
        imageops::resize(&cropped, out_w, out_h, FilterType::Triangle)
    };

    Frame::from_bgr(out_w, out_h, scaled.into_raw())
        .ok_or_else(|| WildscanError::postprocess("Scaled frame has unexpected size"))
}

/// Run the tracking camera over every frame of `source`, writing crops of
/// the configured output size to `sink`. Returns the number of frames
/// written. The sink is finished on success.
pub fn track_clip(
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    detector: &mut dyn Detector,
    config: &TrackingConfig,
) -> WildscanResult<u64> {
    let (out_w, out_h) = config.output_size();
    let mut camera = CameraSmoother::new(config.clone(), source.width(), source.height());
    let mut index: u64 = 0;

    while let Some(frame) = source.read()? {
        if camera.is_stride_frame(index) {
            let detections = detector.detect(&frame)?;
            camera.observe(&detections);
        }
        let crop = camera.advance();
        let out = crop_and_scale(&frame, crop, out_w, out_h)?;
        sink.write(&out)?;
        index += 1;
    }

    sink.finish()?;
    tracing::debug!(
        frames = index,
        target = ?camera.target(),
        "Tracking pass finished"
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildscan_clip_model::Detection;
    use wildscan_processing_core::MemoryFrameSource;

    fn gradient(width: u32, height: u32) -> Frame {
        let mut frame = Frame::black(width, height);
        for y in 0..height {
            for x in 0..width {
                let offset = ((y * width + x) * 3) as usize;
                frame.data[offset] = x as u8;
                frame.data[offset + 1] = y as u8;
                frame.data[offset + 2] = 200;
            }
        }
        frame
    }

    #[derive(Default)]
    struct CollectSink {
        frames: Vec<Frame>,
        finished: bool,
    }

    impl FrameSink for CollectSink {
        fn write(&mut self, frame: &Frame) -> WildscanResult<()> {
            self.frames.push(frame.clone());
            Ok(())
        }

        fn finish(&mut self) -> WildscanResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    struct FixedDetector {
        calls: usize,
    }

    impl Detector for FixedDetector {
        fn name(&self) -> &str {
            "FIXED"
        }

        fn detect(&mut self, _frame: &Frame) -> WildscanResult<Vec<Detection>> {
            self.calls += 1;
            Ok(vec![Detection::new(40.0, 30.0, 60.0, 50.0, 0.9, "deer")])
        }
    }

    #[test]
    fn test_static_crop_filter() {
        assert_eq!(
            static_crop_filter(Rect::new(10, 20, 640, 360), 640, 360),
            "crop=640:360:10:20,scale=640:360"
        );
    }

    #[test]
    fn test_static_zoom_command_args() {
        let args = static_zoom_command(
            Path::new("clip.mp4"),
            Path::new("clip_zoom.mp4"),
            Rect::new(0, 0, 320, 180),
            640,
            360,
            &EncodeSettings::default(),
        )
        .build_args();
        assert_eq!(args[0..2], ["-i", "clip.mp4"]);
        assert_eq!(args[2..4], ["-vf", "crop=320:180:0:0,scale=640:360"]);
        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("clip_zoom.mp4"));
    }

    #[test]
    fn test_crop_without_resize_copies_pixels() {
        let frame = gradient(16, 8);
        let out = crop_and_scale(&frame, Rect::new(4, 2, 6, 3), 6, 3).unwrap();
        assert_eq!((out.width, out.height), (6, 3));
        assert_eq!(out.pixel(0, 0), Some([4, 2, 200]));
        assert_eq!(out.pixel(5, 2), Some([9, 4, 200]));
    }

    #[test]
    fn test_crop_resizes_to_output() {
        let frame = gradient(32, 18);
        let out = crop_and_scale(&frame, Rect::new(0, 0, 16, 9), 64, 36).unwrap();
        assert_eq!((out.width, out.height), (64, 36));
        assert_eq!(out.data.len(), 64 * 36 * 3);
    }

    #[test]
    fn test_crop_clamps_out_of_frame_rect() {
        let frame = gradient(10, 10);
        let out = crop_and_scale(&frame, Rect::new(8, 8, 5, 5), 2, 2).unwrap();
        assert_eq!(out.pixel(0, 0), Some([8, 8, 200]));
    }

    #[test]
    fn test_track_clip_writes_every_frame() {
        let mut source = MemoryFrameSource::blank(160, 90, 10.0, 12);
        let mut sink = CollectSink::default();
        let mut detector = FixedDetector { calls: 0 };
        let config = TrackingConfig {
            min_output_width: 64,
            min_output_height: 36,
            stride: 5,
            ..TrackingConfig::default()
        };

        let written = track_clip(&mut source, &mut sink, &mut detector, &config).unwrap();
        assert_eq!(written, 12);
        assert_eq!(sink.frames.len(), 12);
        assert!(sink.finished);
        // frames 0, 5 and 10
        assert_eq!(detector.calls, 3);
        assert!(sink.frames.iter().all(|f| (f.width, f.height) == (64, 36)));
    }
}
