//! Scan configuration.
//!
//! Every threshold and weight used by the scanners lives here. The defaults
//! are the values the scanners ship with; a JSON file may override any
//! subset of them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

pub const DEFAULT_CONFIG_FILE: &str = "safescan.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory holding frames, audio and the thumbnail temp file
    pub work_dir: PathBuf,
    pub frames: FrameThresholds,
    pub thumbnail: ThumbnailThresholds,
    pub transcript: TranscriptThresholds,
    pub keywords: KeywordThresholds,
    pub title: TitleThresholds,
    pub speech: SpeechConfig,
    pub models: ModelsConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("tmp"),
            frames: FrameThresholds::default(),
            thumbnail: ThumbnailThresholds::default(),
            transcript: TranscriptThresholds::default(),
            keywords: KeywordThresholds::default(),
            title: TitleThresholds::default(),
            speech: SpeechConfig::default(),
            models: ModelsConfig::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScanError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ScanError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load `explicit` if given, else `safescan.json` in the current
    /// directory if it exists, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::from_file(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Red hue bands on the 8-bit 0-180 hue scale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedHsvRange {
    pub low_hue_max: u8,
    pub high_hue_min: u8,
    pub saturation_min: u8,
    pub value_min: u8,
}

impl Default for RedHsvRange {
    fn default() -> Self {
        Self {
            low_hue_max: 10,
            high_hue_min: 170,
            saturation_min: 50,
            value_min: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameThresholds {
    pub max_frames: usize,
    pub red: RedHsvRange,
    /// Percent of red pixels above which a frame is flagged
    pub red_percentage: f64,
    pub dark_brightness: f64,
    pub dark_contrast: f64,
    pub very_dark_brightness: f64,
    /// 0 flags every dangerous label; above 0 the detection must reach it
    pub weapon_confidence: f32,
}

impl Default for FrameThresholds {
    fn default() -> Self {
        Self {
            max_frames: 30,
            red: RedHsvRange::default(),
            red_percentage: 2.0,
            dark_brightness: 30.0,
            dark_contrast: 50.0,
            very_dark_brightness: 20.0,
            weapon_confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceThresholds {
    pub dark_brightness: f64,
    pub dark_points: u32,
    pub contrast: f64,
    pub contrast_brightness: f64,
    pub contrast_points: u32,
    pub min_aspect: f64,
    pub max_aspect: f64,
    pub aspect_points: u32,
    pub texture_variance: f64,
    pub texture_points: u32,
    /// Faces must exceed this size on both sides for the asymmetry check
    pub asymmetry_min_size: u32,
    pub asymmetry: f64,
    pub asymmetry_points: u32,
    pub flag_score: u32,
}

impl Default for FaceThresholds {
    fn default() -> Self {
        Self {
            dark_brightness: 30.0,
            dark_points: 2,
            contrast: 50.0,
            contrast_brightness: 50.0,
            contrast_points: 2,
            min_aspect: 0.5,
            max_aspect: 2.0,
            aspect_points: 3,
            texture_variance: 500.0,
            texture_points: 1,
            asymmetry_min_size: 20,
            asymmetry: 30.0,
            asymmetry_points: 2,
            flag_score: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterThresholds {
    pub person_confidence: f32,
    pub dark_brightness: f64,
    pub dark_points: u32,
    pub min_aspect: f64,
    pub max_aspect: f64,
    pub aspect_points: u32,
    pub canny_low: f32,
    pub canny_high: f32,
    pub edge_density: f64,
    pub edge_points: u32,
    pub texture_variance: f64,
    pub texture_points: u32,
    pub flag_score: u32,
}

impl Default for MonsterThresholds {
    fn default() -> Self {
        Self {
            person_confidence: 0.6,
            dark_brightness: 25.0,
            dark_points: 2,
            min_aspect: 0.2,
            max_aspect: 0.8,
            aspect_points: 2,
            canny_low: 50.0,
            canny_high: 150.0,
            edge_density: 0.3,
            edge_points: 1,
            texture_variance: 600.0,
            texture_points: 1,
            flag_score: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteredBloodThresholds {
    pub red: RedHsvRange,
    pub percentage: f64,
    /// Red clusters smaller than this share of the image are ignored
    pub min_region_fraction: f64,
}

impl Default for ClusteredBloodThresholds {
    fn default() -> Self {
        Self {
            red: RedHsvRange::default(),
            percentage: 3.0,
            min_region_fraction: 0.001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HorrorSceneThresholds {
    pub dark_brightness: f64,
    pub dark_points: u32,
    pub contrast: f64,
    pub contrast_points: u32,
    pub dark_pixel_level: u8,
    pub dark_region_ratio: f64,
    pub dark_region_points: u32,
    pub red_tint_ratio: f64,
    pub red_tint_points: u32,
    pub flag_score: u32,
}

impl Default for HorrorSceneThresholds {
    fn default() -> Self {
        Self {
            dark_brightness: 40.0,
            dark_points: 2,
            contrast: 60.0,
            contrast_points: 1,
            dark_pixel_level: 30,
            dark_region_ratio: 0.5,
            dark_region_points: 2,
            red_tint_ratio: 1.3,
            red_tint_points: 1,
            flag_score: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailThresholds {
    pub download_timeout_secs: u64,
    /// Detections below this confidence are discarded
    pub register_confidence: f32,
    /// Weapon and person detections must reach this to be acted on
    pub action_confidence: f32,
    pub face: FaceThresholds,
    pub monster: MonsterThresholds,
    pub scary_animal_confidence: f32,
    pub scary_animal_brightness: f64,
    pub classifier_confidence: f32,
    pub classifier_top_k: usize,
    pub clustered_blood: ClusteredBloodThresholds,
    pub horror_scene: HorrorSceneThresholds,
}

impl Default for ThumbnailThresholds {
    fn default() -> Self {
        Self {
            download_timeout_secs: 10,
            register_confidence: 0.6,
            action_confidence: 0.7,
            face: FaceThresholds::default(),
            monster: MonsterThresholds::default(),
            scary_animal_confidence: 0.6,
            scary_animal_brightness: 40.0,
            classifier_confidence: 0.3,
            classifier_top_k: 3,
            clustered_blood: ClusteredBloodThresholds::default(),
            horror_scene: HorrorSceneThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptThresholds {
    pub scream_count: u32,
    pub horror_score: u32,
    pub weapon_count: u32,
    pub escalation_count: u32,
    /// Points added to the danger score for each tripped category
    pub danger_weight: u32,
    pub danger_score: u32,
}

impl Default for TranscriptThresholds {
    fn default() -> Self {
        Self {
            scream_count: 5,
            horror_score: 10,
            weapon_count: 3,
            escalation_count: 2,
            danger_weight: 2,
            danger_score: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordThresholds {
    pub scream_count: usize,
}

impl Default for KeywordThresholds {
    fn default() -> Self {
        Self { scream_count: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleThresholds {
    /// Term hits at which the summary flag is added
    pub summary_hits: usize,
}

impl Default for TitleThresholds {
    fn default() -> Self {
        Self { summary_hits: 2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub model_name: String,
    pub model_path: Option<PathBuf>,
    /// Whisper language code, or "auto" to detect
    pub language: String,
    pub quick_scan_seconds: u32,
    pub threads: Option<i32>,
    pub use_gpu: bool,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model_name: "ggml-tiny.bin".to_string(),
            model_path: None,
            language: "auto".to_string(),
            quick_scan_seconds: 120,
            threads: None,
            use_gpu: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// argv of the object detector; the image path is appended
    pub detector_command: Vec<String>,
    pub face_command: Vec<String>,
    pub classifier_command: Vec<String>,
    /// Hugging Face repo of the ViT content classifier (feature `vit`)
    pub vit_repo: Option<String>,
}

impl ModelsConfig {
    pub const DEFAULT_VIT_REPO: &'static str = "Falconsai/nsfw_image_detection";

    pub fn vit_repo(&self) -> &str {
        self.vit_repo.as_deref().unwrap_or(Self::DEFAULT_VIT_REPO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_thresholds() {
        let config = ScanConfig::default();
        assert_eq!(config.work_dir, PathBuf::from("tmp"));
        assert_eq!(config.frames.max_frames, 30);
        assert_eq!(config.frames.red_percentage, 2.0);
        assert_eq!(config.thumbnail.download_timeout_secs, 10);
        assert_eq!(config.thumbnail.clustered_blood.percentage, 3.0);
        assert_eq!(config.transcript.danger_score, 4);
        assert_eq!(config.keywords.scream_count, 3);
        assert_eq!(config.title.summary_hits, 2);
        assert_eq!(config.speech.quick_scan_seconds, 120);
        assert_eq!(config.models.vit_repo(), ModelsConfig::DEFAULT_VIT_REPO);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: ScanConfig = serde_json::from_str(
            r#"{"work_dir": "/var/scan", "frames": {"red_percentage": 4.5}, "transcript": {"weapon_count": 1}}"#,
        )
        .unwrap();

        assert_eq!(config.work_dir, PathBuf::from("/var/scan"));
        assert_eq!(config.frames.red_percentage, 4.5);
        assert_eq!(config.frames.max_frames, 30);
        assert_eq!(config.frames.red.high_hue_min, 170);
        assert_eq!(config.transcript.weapon_count, 1);
        assert_eq!(config.transcript.horror_score, 10);
    }

    #[test]
    fn test_unreadable_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ScanConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ScanError::Config { .. }));
    }
}
