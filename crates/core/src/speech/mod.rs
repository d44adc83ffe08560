//! Audio preparation and whisper transcription.

pub mod audio;
pub mod whisper;

pub use audio::{load_wav_mono_f32, quick_audio_source, trim_audio};
pub use whisper::{WhisperTranscriber, ensure_model, silence_native_logs};
