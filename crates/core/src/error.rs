use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Model download failed for {url}: {reason}")]
    ModelDownloadFailed { url: String, reason: String },

    #[error("{name} is not available")]
    ModelUnavailable { name: String },

    #[error("{name} failed: {reason}")]
    ModelFailed { name: String, reason: String },

    #[error("Transcription failed for {audio_path}: {reason}")]
    TranscriptFailed { audio_path: PathBuf, reason: String },

    #[error("Audio trim failed for {audio_path}: {reason}")]
    AudioTrimFailed { audio_path: PathBuf, reason: String },

    #[error("Audio resampling failed: {0}")]
    Resample(String),

    #[error("Invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Image decode error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("WAV decode error: {0}")]
    WavError(#[from] hound::Error),

    #[error("Invalid pattern: {0}")]
    PatternError(#[from] regex::Error),
}

impl ScanError {
    pub fn model(name: impl Into<String>, reason: impl ToString) -> Self {
        ScanError::ModelFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
