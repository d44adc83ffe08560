use std::path::{Path, PathBuf};

pub const AUDIO_FILE: &str = "audio.wav";
pub const QUICK_AUDIO_FILE: &str = "audio_quick.wav";
pub const THUMBNAIL_FILE: &str = "thumbnail.jpg";

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("safescan")
}

pub fn get_model_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("models")
}

/// Get the path of the extracted audio track
pub fn get_audio_path(work_dir: &Path) -> PathBuf {
    work_dir.join(AUDIO_FILE)
}

/// Get the path of the trimmed audio used by the quick speech scan
pub fn get_quick_audio_path(work_dir: &Path) -> PathBuf {
    work_dir.join(QUICK_AUDIO_FILE)
}

/// Get the path the thumbnail is downloaded to
pub fn get_thumbnail_path(work_dir: &Path) -> PathBuf {
    work_dir.join(THUMBNAIL_FILE)
}

/// List `.jpg` frames in `work_dir`, sorted by file name and truncated to
/// `max`. An unreadable directory yields no frames.
pub fn find_frames(work_dir: &Path, max: usize) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(work_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot read frame dir {}: {}", work_dir.display(), e);
            return Vec::new();
        }
    };

    let mut frames: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "jpg"))
        .collect();

    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    frames.truncate(max);
    frames
}
