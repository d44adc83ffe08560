use std::path::{Path, PathBuf};

use tokio::fs;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::{
    config::SpeechConfig,
    error::{Result, ScanError},
    format::format_timestamp,
    models::Transcriber,
    paths::get_model_dir,
    speech::audio::load_wav_mono_f32,
    types::{Segment, Transcript},
};

pub const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Download the ggml model into the cache dir unless it is already there
pub async fn ensure_model(cache_dir: &Path, model_name: &str) -> Result<PathBuf> {
    let model_dir = get_model_dir(cache_dir);
    if !model_dir.exists() {
        fs::create_dir_all(&model_dir).await?;
    }

    let model_path = model_dir.join(model_name);
    if model_path.exists() {
        return Ok(model_path);
    }

    let download_url = format!("{}/{}", MODEL_BASE_URL, model_name);
    tracing::info!("Downloading whisper model {}", download_url);

    let response = reqwest::get(&download_url).await?;
    if !response.status().is_success() {
        return Err(ScanError::ModelDownloadFailed {
            url: download_url,
            reason: response.status().to_string(),
        });
    }

    let bytes = response.bytes().await?;
    let partial = model_path.with_extension("part");
    fs::write(&partial, &bytes).await?;
    fs::rename(&partial, &model_path).await?;

    Ok(model_path)
}

extern "C" fn whisper_log_callback(
    _level: u32,
    _message: *const std::ffi::c_char,
    _user_data: *mut std::ffi::c_void,
) {
    // silent
}

/// Route whisper.cpp's own logging to nowhere
pub fn silence_native_logs() {
    unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    }
}

/// Whisper speech-to-text with fast, deterministic decoding: greedy with a
/// single candidate, temperature 0 without fallback, no conditioning on
/// previous text.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
    language: String,
    threads: Option<i32>,
}

impl WhisperTranscriber {
    pub fn new(model_path: &Path, config: &SpeechConfig) -> Result<Self> {
        let model_path_str = model_path.to_str().ok_or_else(|| ScanError::ModelFailed {
            name: "whisper".to_string(),
            reason: format!("model path {} is not valid UTF-8", model_path.display()),
        })?;

        let ctx_params = WhisperContextParameters {
            use_gpu: config.use_gpu,
            ..Default::default()
        };
        let ctx = WhisperContext::new_with_params(model_path_str, ctx_params)
            .map_err(|e| ScanError::model("whisper", e))?;

        Ok(Self {
            ctx,
            language: config.language.clone(),
            threads: config.threads,
        })
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &Path) -> Result<Transcript> {
        let fail = |reason: String| ScanError::TranscriptFailed {
            audio_path: audio.to_path_buf(),
            reason,
        };

        let samples = load_wav_mono_f32(audio)?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(self.language.as_str()));
        params.set_translate(false);
        params.set_no_context(true);
        params.set_temperature(0.0);
        params.set_temperature_inc(0.0);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_special(false);
        params.set_print_timestamps(false);
        if let Some(threads) = self.threads {
            params.set_n_threads(threads);
        }

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| fail(e.to_string()))?;
        state
            .full(params, &samples)
            .map_err(|e| fail(e.to_string()))?;

        let mut text = String::new();
        let mut segments: Vec<Segment> = Vec::new();

        for segment in state.as_iter() {
            let seg_text = match segment.to_str() {
                Ok(s) => s,
                Err(_) => continue,
            };
            let seg = Segment {
                start: segment.start_timestamp() as f64 / 100.0,
                end: segment.end_timestamp() as f64 / 100.0,
                text: seg_text.to_string(),
            };
            tracing::debug!("[{}] {}", format_timestamp(seg.start), seg.text.trim());
            segments.push(seg);

            text.push_str(seg_text);
        }

        let language_index = state.full_lang_id_from_state();
        let language = whisper_rs::get_lang_str(language_index);

        Ok(Transcript {
            language: language.unwrap_or("Unknown").to_string(),
            segments,
            text,
        })
    }
}
