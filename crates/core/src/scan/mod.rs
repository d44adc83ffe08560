//! The scanners. Each one turns its input into an ordered [`FlagList`].
//!
//! [`FlagList`]: crate::types::FlagList

pub mod frames;
pub mod keywords;
pub mod thumbnail;
pub mod title;
pub mod transcript;
pub mod vocabulary;

pub use frames::FrameScanner;
pub use keywords::KeywordScanner;
pub use thumbnail::{TempFile, ThumbnailScanner, download_thumbnail};
pub use title::TitleScanner;
pub use transcript::{TranscriptAnalysis, TranscriptAnalyzer, split_sentences};
