use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use image::{GrayImage, RgbImage};
use tracing::{debug, info, warn};

use crate::{
    config::{FaceThresholds, HorrorSceneThresholds, MonsterThresholds, ThumbnailThresholds},
    error::{Result, ScanError},
    models::{FaceLocator, ImageClassifier, ObjectDetector},
    scan::vocabulary::{DANGEROUS_CONTENT, DANGEROUS_OBJECTS, SCARY_ANIMALS},
    types::{BoundingBox, Classification, Detection, FlagList, Rect},
    vision::{self, color::channel_means},
};

/// Fetch `url` into `dest`. Non-2xx responses and timeouts are errors.
pub async fn download_thumbnail(url: &str, dest: &Path, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(ScanError::DownloadFailed {
            url: url.to_string(),
            reason: response.status().to_string(),
        });
    }

    let bytes = response.bytes().await?;
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, &bytes).await?;

    debug!("Saved {} bytes from {} to {}", bytes.len(), url, dest.display());
    Ok(())
}

/// Removes the wrapped file when dropped
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remove(&self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("Could not remove {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Higher-precision scan of a single thumbnail.
///
/// The detector runs once. Its registered detections drive the weapon,
/// person, monster and animal rules. Classifier strategies are tried in
/// order and the first one that is available and answers is used. The
/// clustered-blood and horror-scene fallbacks run only when no classifier
/// flag was produced.
pub struct ThumbnailScanner<'a> {
    detector: &'a dyn ObjectDetector,
    faces: &'a dyn FaceLocator,
    classifiers: &'a [Box<dyn ImageClassifier>],
    config: &'a ThumbnailThresholds,
}

impl<'a> ThumbnailScanner<'a> {
    pub fn new(
        detector: &'a dyn ObjectDetector,
        faces: &'a dyn FaceLocator,
        classifiers: &'a [Box<dyn ImageClassifier>],
        config: &'a ThumbnailThresholds,
    ) -> Self {
        Self {
            detector,
            faces,
            classifiers,
            config,
        }
    }

    pub fn scan(&self, image: &Path) -> FlagList {
        let mut flags = FlagList::new();

        let detections = self.registered_detections(image);

        let mut person_detected = false;
        for det in &detections {
            let name = det.normalized_label();
            if det.confidence < self.config.action_confidence {
                continue;
            }
            if DANGEROUS_OBJECTS.iter().any(|danger| name.contains(danger)) {
                flags.push(format!(
                    "weapon detected in thumbnail: {} (confidence: {:.2})",
                    name, det.confidence
                ));
            }
            if name == "person" {
                person_detected = true;
            }
        }

        let pixels = match vision::load_rgb(image) {
            Ok(rgb) => {
                let gray = vision::to_gray(&rgb);
                Some((rgb, gray))
            }
            Err(e) => {
                warn!("Pixel checks skipped for {}: {}", image.display(), e);
                None
            }
        };

        if let Some((_, gray)) = &pixels {
            if person_detected {
                if self.scary_face_score(image, gray) >= self.config.face.flag_score {
                    flags.push("scary/distorted face detected in thumbnail (monster-like)");
                }
                if self.monster_score(&detections, gray) >= self.config.monster.flag_score {
                    flags.push("deformed/monster-like humanoid detected in thumbnail");
                }
            }

            if self.scary_animal_in_dark(&detections, gray) {
                flags.push("scary animal detected in dark/creepy context");
            }
        }

        let classifier_flags = self.classifier_flags(image);
        let classifier_flagged = !classifier_flags.is_empty();
        flags.append(classifier_flags);

        if !classifier_flagged {
            if let Some((rgb, gray)) = &pixels {
                flags.append(self.fallback_flags(rgb, gray));
            }
        }

        flags
    }

    fn registered_detections(&self, image: &Path) -> Vec<Detection> {
        match self.detector.detect(image) {
            Ok(detections) => detections
                .into_iter()
                .filter(|det| det.confidence >= self.config.register_confidence)
                .collect(),
            Err(e) => {
                warn!("Detection skipped for {}: {}", image.display(), e);
                Vec::new()
            }
        }
    }

    fn scary_face_score(&self, image: &Path, gray: &GrayImage) -> u32 {
        let faces = match self.faces.locate(image) {
            Ok(faces) => faces,
            Err(e) => {
                warn!("Face location skipped for {}: {}", image.display(), e);
                return 0;
            }
        };

        let (width, height) = gray.dimensions();
        let score: u32 = faces
            .iter()
            .filter_map(|face| {
                let roi = clamp_rect(*face, width, height)?;
                Some(face_points(face, &vision::crop(gray, roi), &self.config.face))
            })
            .sum();

        debug!("Scary face score {} over {} faces", score, faces.len());
        score
    }

    fn monster_score(&self, detections: &[Detection], gray: &GrayImage) -> u32 {
        let cfg = &self.config.monster;
        let (width, height) = gray.dimensions();

        let score: u32 = detections
            .iter()
            .filter(|det| det.normalized_label() == "person" && det.confidence >= cfg.person_confidence)
            .filter_map(|det| det.bbox.and_then(|bbox| bbox.clamp_to(width, height)))
            .map(|roi| monster_points(roi, &vision::crop(gray, roi), cfg))
            .sum();

        debug!("Monster score {}", score);
        score
    }

    fn scary_animal_in_dark(&self, detections: &[Detection], gray: &GrayImage) -> bool {
        let animal = detections.iter().any(|det| {
            SCARY_ANIMALS.contains(&det.normalized_label().as_str())
                && det.confidence >= self.config.scary_animal_confidence
        });

        animal && vision::mean_brightness(gray) < self.config.scary_animal_brightness
    }

    fn classifier_flags(&self, image: &Path) -> FlagList {
        let mut flags = FlagList::new();

        for classifier in self.classifiers {
            if !classifier.is_available() {
                debug!("Classifier {} unavailable, skipping", classifier.name());
                continue;
            }

            let mut predictions = match classifier.classify(image) {
                Ok(predictions) => predictions,
                Err(e) => {
                    warn!("Classifier {} failed: {}", classifier.name(), e);
                    continue;
                }
            };

            info!("Classified thumbnail with {}", classifier.name());
            top_k(&mut predictions, self.config.classifier_top_k);
            for prediction in &predictions {
                let label = prediction.label.to_lowercase();
                if DANGEROUS_CONTENT.iter().any(|kw| label.contains(kw))
                    && prediction.confidence > self.config.classifier_confidence
                {
                    flags.push(format!(
                        "specialized model detected {} (confidence: {:.2})",
                        prediction.label, prediction.confidence
                    ));
                }
            }
            break;
        }

        flags
    }

    fn fallback_flags(&self, rgb: &RgbImage, gray: &GrayImage) -> FlagList {
        let mut flags = FlagList::new();

        let blood = &self.config.clustered_blood;
        let clustered = vision::clustered_red_percentage(rgb, &blood.red, blood.min_region_fraction);
        if clustered >= blood.percentage {
            flags.push(format!(
                "blood/gore detected in thumbnail ({:.1}% clustered red content)",
                clustered
            ));
        }

        let score = horror_scene_score(rgb, gray, &self.config.horror_scene);
        if score >= self.config.horror_scene.flag_score {
            flags.push(format!("horror scene detected in thumbnail (score: {})", score));
        }

        flags
    }
}

fn clamp_rect(rect: Rect, width: u32, height: u32) -> Option<Rect> {
    BoundingBox::new(
        rect.x as f32,
        rect.y as f32,
        rect.x.saturating_add(rect.width) as f32,
        rect.y.saturating_add(rect.height) as f32,
    )
    .clamp_to(width, height)
}

/// Keep the `k` most confident predictions, most confident first
fn top_k(predictions: &mut Vec<Classification>, k: usize) {
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    predictions.truncate(k);
}

/// Points for one face. Aspect and asymmetry size use the located box.
fn face_points(face: &Rect, roi: &GrayImage, cfg: &FaceThresholds) -> u32 {
    let mut points = 0;
    let stats = vision::gray_stats(roi);

    if stats.mean < cfg.dark_brightness {
        points += cfg.dark_points;
    }
    if stats.std_dev > cfg.contrast && stats.mean < cfg.contrast_brightness {
        points += cfg.contrast_points;
    }

    let aspect = face.aspect_ratio();
    if aspect < cfg.min_aspect || aspect > cfg.max_aspect {
        points += cfg.aspect_points;
    }

    if vision::laplacian_variance(roi) > cfg.texture_variance {
        points += cfg.texture_points;
    }

    if face.width > cfg.asymmetry_min_size && face.height > cfg.asymmetry_min_size {
        let (left, right) = vision::half_means(roi);
        if (left - right).abs() > cfg.asymmetry {
            points += cfg.asymmetry_points;
        }
    }

    points
}

fn monster_points(roi_rect: Rect, roi: &GrayImage, cfg: &MonsterThresholds) -> u32 {
    let mut points = 0;

    if vision::mean_brightness(roi) < cfg.dark_brightness {
        points += cfg.dark_points;
    }

    let aspect = roi_rect.aspect_ratio();
    if aspect < cfg.min_aspect || aspect > cfg.max_aspect {
        points += cfg.aspect_points;
    }

    if vision::canny_edge_density(roi, cfg.canny_low, cfg.canny_high) > cfg.edge_density {
        points += cfg.edge_points;
    }

    if vision::laplacian_variance(roi) > cfg.texture_variance {
        points += cfg.texture_points;
    }

    points
}

fn horror_scene_score(rgb: &RgbImage, gray: &GrayImage, cfg: &HorrorSceneThresholds) -> u32 {
    let mut score = 0;
    let stats = vision::gray_stats(gray);

    if stats.mean < cfg.dark_brightness {
        score += cfg.dark_points;
    }
    if stats.std_dev > cfg.contrast {
        score += cfg.contrast_points;
    }
    if vision::dark_pixel_ratio(gray, cfg.dark_pixel_level) > cfg.dark_region_ratio {
        score += cfg.dark_region_points;
    }

    let (r, g, b) = channel_means(rgb);
    if r > 0.0 && r >= g * cfg.red_tint_ratio && r >= b * cfg.red_tint_ratio {
        score += cfg.red_tint_points;
    }

    debug!(
        "Horror scene score {} (brightness {:.1}, contrast {:.1})",
        score, stats.mean, stats.std_dev
    );
    score
}
