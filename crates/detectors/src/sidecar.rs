//! Inference sidecar process.
//!
//! # Protocol
//!
//! The sidecar is started once per detector with
//! `--kind <yolo|megadetector> --model <path> --confidence <c> --iou <i>`.
//! For every frame the detector writes one JSON header line
//! `{"width":W,"height":H,"bytes":N}` followed by exactly `N` bytes of BGR24
//! pixels. The sidecar answers with one JSON line
//! `{"detections":[{"x1":..,"y1":..,"x2":..,"y2":..,"score":..,"class_name":..}]}`
//! or `{"error":"..."}`.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use wildscan_clip_model::{Detection, Frame};
use wildscan_common::{WildscanError, WildscanResult};
use wildscan_processing_core::Detector;

use crate::factory::DetectorSettings;
use crate::filter::{ClassFilter, RawDetection};
use crate::kind::DetectorKind;

/// Side length of the blank frame sent by [`Detector::warmup`].
const WARMUP_SIZE: u32 = 320;

#[derive(Debug, Serialize)]
struct FrameHeader {
    width: u32,
    height: u32,
    bytes: usize,
}

#[derive(Debug, Deserialize)]
struct SidecarReply {
    #[serde(default)]
    detections: Vec<RawDetection>,
    #[serde(default)]
    error: Option<String>,
}

/// A detector backed by a long-running inference process.
pub struct SidecarDetector {
    kind: DetectorKind,
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    filter: ClassFilter,
}

impl SidecarDetector {
    /// Start the sidecar for `kind`.
    pub fn spawn(kind: DetectorKind, settings: &DetectorSettings) -> WildscanResult<Self> {
        let (program, args) = settings
            .command
            .split_first()
            .ok_or_else(|| WildscanError::config("Detector command is empty"))?;

        let mut child = Command::new(program)
            .args(args)
            .args(["--kind", kind.sidecar_arg()])
            .args(["--model", settings.model.as_str()])
            .arg("--confidence")
            .arg(settings.confidence.to_string())
            .arg("--iou")
            .arg(settings.iou.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| WildscanError::detector(format!("Failed to start '{program}': {e}")))?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(WildscanError::detector("Sidecar pipes unavailable"));
            }
        };

        tracing::info!(
            detector = %kind,
            model = %settings.model,
            pid = child.id(),
            "Started inference sidecar"
        );

        Ok(Self {
            kind,
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            filter: ClassFilter::new(&settings.allowed_classes, settings.confidence),
        })
    }

    pub fn kind(&self) -> DetectorKind {
        self.kind
    }

    fn request(&mut self, frame: &Frame) -> WildscanResult<Vec<RawDetection>> {
        let header = FrameHeader {
            width: frame.width,
            height: frame.height,
            bytes: frame.data.len(),
        };
        let mut line = serde_json::to_string(&header)?;
        line.push('\n');

        self.stdin
            .write_all(line.as_bytes())
            .and_then(|_| self.stdin.write_all(&frame.data))
            .and_then(|_| self.stdin.flush())
            .map_err(|e| WildscanError::detector(format!("Failed to send frame: {e}")))?;

        let mut reply = String::new();
        let read = self
            .stdout
            .read_line(&mut reply)
            .map_err(|e| WildscanError::detector(format!("Failed to read reply: {e}")))?;
        if read == 0 {
            return Err(WildscanError::detector("Sidecar exited unexpectedly"));
        }

        let reply: SidecarReply = serde_json::from_str(reply.trim_end())
            .map_err(|e| WildscanError::detector(format!("Malformed sidecar reply: {e}")))?;
        if let Some(error) = reply.error {
            return Err(WildscanError::detector(error));
        }
        Ok(reply.detections)
    }
}

impl Detector for SidecarDetector {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn warmup(&mut self) -> WildscanResult<()> {
        self.request(&Frame::black(WARMUP_SIZE, WARMUP_SIZE))?;
        Ok(())
    }

    fn detect(&mut self, frame: &Frame) -> WildscanResult<Vec<Detection>> {
        let raw = self.request(frame)?;
        let raw_count = raw.len();
        let detections = self.filter.apply(raw);
        tracing::trace!(
            detector = %self.kind,
            raw = raw_count,
            kept = detections.len(),
            "Frame detections"
        );
        Ok(detections)
    }
}

impl Drop for SidecarDetector {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    // Reads one header line and its payload per frame, answers with a fixed reply.
    fn fake_sidecar(reply: &str) -> DetectorSettings {
        let script = format!(
            r#"while IFS= read -r header; do
  n=$(printf '%s' "$header" | sed 's/.*"bytes":\([0-9]*\).*/\1/')
  head -c "$n" > /dev/null
  printf '%s\n' '{reply}'
done"#
        );
        DetectorSettings {
            command: vec!["sh".to_string(), "-c".to_string(), script],
            model: "fake.pt".to_string(),
            confidence: 0.3,
            iou: 0.45,
            allowed_classes: vec!["deer".to_string()],
        }
    }

    #[test]
    fn test_round_trip_filters_reply() {
        let settings = fake_sidecar(
            r#"{"detections":[{"x1":1,"y1":2,"x2":30,"y2":40,"score":0.9,"class_name":"Deer"},{"x1":0,"y1":0,"x2":5,"y2":5,"score":0.9,"class_name":"person"},{"x1":0,"y1":0,"x2":5,"y2":5,"score":0.1,"class_name":"deer"}]}"#,
        );
        let mut detector = SidecarDetector::spawn(DetectorKind::Yolo, &settings).unwrap();
        detector.warmup().unwrap();

        for _ in 0..3 {
            let dets = detector.detect(&Frame::black(4, 4)).unwrap();
            assert_eq!(dets.len(), 1);
            assert_eq!(dets[0].class_name, "deer");
            assert_eq!(dets[0].x2, 30.0);
        }
        assert_eq!(detector.name(), "YOLO");
    }

    #[test]
    fn test_error_reply_is_detector_error() {
        let settings = fake_sidecar(r#"{"error":"model not loaded"}"#);
        let mut detector =
            SidecarDetector::spawn(DetectorKind::MegaDetector, &settings).unwrap();
        let err = detector.detect(&Frame::black(2, 2)).unwrap_err();
        assert!(err.to_string().contains("model not loaded"));
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        let settings = DetectorSettings {
            command: vec!["wildscan-no-such-sidecar".to_string()],
            ..DetectorSettings::default()
        };
        let err = SidecarDetector::spawn(DetectorKind::Yolo, &settings)
            .err()
            .unwrap();
        assert!(matches!(err, WildscanError::Detector { .. }));
    }
}
