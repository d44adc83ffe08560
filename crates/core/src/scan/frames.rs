use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{
    config::FrameThresholds,
    models::ObjectDetector,
    scan::vocabulary::DANGEROUS_OBJECTS,
    types::{Detection, FlagList},
    vision,
};

/// Scans extracted video frames in order and stops at the first frame that
/// raises any flag.
pub struct FrameScanner<'a> {
    detector: &'a dyn ObjectDetector,
    config: &'a FrameThresholds,
}

impl<'a> FrameScanner<'a> {
    pub fn new(detector: &'a dyn ObjectDetector, config: &'a FrameThresholds) -> Self {
        Self { detector, config }
    }

    pub fn scan(&self, frames: &[PathBuf]) -> FlagList {
        let mut flags = FlagList::new();
        let total = frames.len().min(self.config.max_frames);

        let detect = self.detector.is_available();
        if !detect {
            warn!("Object detector not available, running pixel checks only");
        }

        for (idx, frame) in frames.iter().take(total).enumerate() {
            flags.append(self.check_frame(frame, detect));

            if !flags.is_empty() {
                info!(
                    "Frame {} of {} flagged {}, stopping",
                    idx + 1,
                    total,
                    frame.display()
                );
                break;
            }
        }

        flags
    }

    pub fn scan_frame(&self, frame: &Path) -> FlagList {
        self.check_frame(frame, self.detector.is_available())
    }

    fn check_frame(&self, frame: &Path, detect: bool) -> FlagList {
        let mut flags = FlagList::new();

        let detections = if detect {
            self.detector.detect(frame).unwrap_or_else(|e| {
                warn!("Detection skipped for {}: {}", frame.display(), e);
                Vec::new()
            })
        } else {
            Vec::new()
        };
        for det in &detections {
            if let Some(flag) = self.weapon_flag(det) {
                flags.push(flag);
            }
        }

        let rgb = match vision::load_rgb(frame) {
            Ok(rgb) => rgb,
            Err(e) => {
                warn!("Pixel checks skipped for {}: {}", frame.display(), e);
                return flags;
            }
        };

        let red = vision::red_percentage(&rgb, &self.config.red);
        if red > self.config.red_percentage {
            flags.push(format!("blood/gore detected ({:.1}% red content)", red));
        }

        let stats = vision::gray_stats(&vision::to_gray(&rgb));
        debug!(
            "{}: red {:.2}%, brightness {:.1}, contrast {:.1}",
            frame.display(),
            red,
            stats.mean,
            stats.std_dev
        );
        if self.is_dark_scary(stats) {
            flags.push("dark/scary content detected");
        }

        flags
    }

    fn weapon_flag(&self, det: &Detection) -> Option<String> {
        let name = det.normalized_label();
        if !DANGEROUS_OBJECTS.iter().any(|danger| name.contains(danger)) {
            return None;
        }

        if self.config.weapon_confidence > 0.0 {
            if det.confidence < self.config.weapon_confidence {
                return None;
            }
            return Some(format!(
                "weapon detected: {} (confidence: {:.2})",
                name, det.confidence
            ));
        }

        Some(format!("weapon detected: {}", name))
    }

    fn is_dark_scary(&self, stats: vision::GrayStats) -> bool {
        (stats.mean < self.config.dark_brightness && stats.std_dev > self.config.dark_contrast)
            || stats.mean < self.config.very_dark_brightness
    }
}
