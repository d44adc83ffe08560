pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod paths;
pub mod scan;
pub mod speech;
pub mod types;
pub mod vision;

pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use format::{format_flags_json, format_timestamp};
pub use paths::{
    find_frames, get_audio_path, get_model_dir, get_quick_audio_path, get_root_cache_dir,
    get_thumbnail_path,
};
pub use scan::{
    FrameScanner, KeywordScanner, TempFile, ThumbnailScanner, TitleScanner, TranscriptAnalyzer,
    download_thumbnail,
};
pub use types::{Classification, Detection, FlagList, Rect, Segment, Transcript};
