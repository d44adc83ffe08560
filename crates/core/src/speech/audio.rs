use std::path::{Path, PathBuf};

use hound::SampleFormat;
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{Result, ScanError};

pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Read a WAV file as 16 kHz mono f32 samples in [-1.0, 1.0]
pub fn load_wav_mono_f32(path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    debug!(
        "WAV spec for {}: {} Hz, {} channels, {} bits",
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample
    );

    if spec.sample_rate == 0 {
        return Err(ScanError::WavError(hound::Error::FormatError(
            "invalid sample rate",
        )));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let mono = downmix(&interleaved, channels);

    if spec.sample_rate != WHISPER_SAMPLE_RATE {
        resample_to_16k(&mono, spec.sample_rate)
    } else {
        Ok(mono)
    }
}

/// Average interleaved channels into one
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

pub fn resample_to_16k(input: &[f32], in_rate: u32) -> Result<Vec<f32>> {
    if in_rate == WHISPER_SAMPLE_RATE || input.is_empty() {
        return Ok(input.to_vec());
    }

    if in_rate % WHISPER_SAMPLE_RATE == 0 {
        let factor = (in_rate / WHISPER_SAMPLE_RATE) as usize;
        debug!("Downsampling {} Hz to 16 kHz by factor {}", in_rate, factor);
        return Ok(downsample_by_factor(input, factor));
    }

    debug!("Resampling {} samples from {} Hz to 16 kHz", input.len(), in_rate);
    let ratio = WHISPER_SAMPLE_RATE as f64 / in_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 48,
        f_cutoff: 0.90,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 4,
        window: rubato::WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, input.len(), 1)
        .map_err(|e| ScanError::Resample(e.to_string()))?;
    let output = resampler
        .process(&[input], None)
        .map_err(|e| ScanError::Resample(e.to_string()))?;

    Ok(output.into_iter().next().unwrap_or_default())
}

/// Downsample by averaging consecutive samples when the ratio is an integer
fn downsample_by_factor(input: &[f32], factor: usize) -> Vec<f32> {
    input
        .chunks(factor.max(1))
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}

/// Cut the first `seconds` of `src` into `dst` as 16 kHz mono using ffmpeg
pub async fn trim_audio(src: &Path, dst: &Path, seconds: u32) -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(src)
        .arg("-t")
        .arg(seconds.to_string())
        .arg("-ar")
        .arg(WHISPER_SAMPLE_RATE.to_string())
        .arg("-ac")
        .arg("1")
        .arg(dst)
        .output()
        .await?;

    if !output.status.success() {
        return Err(ScanError::AudioTrimFailed {
            audio_path: src.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

/// Audio for the quick scan: the trimmed head of `src`, or `src` itself
/// when trimming fails
pub async fn quick_audio_source(src: &Path, dst: &Path, seconds: u32) -> PathBuf {
    match trim_audio(src, dst, seconds).await {
        Ok(()) => {
            info!("Using first {}s of audio", seconds);
            dst.to_path_buf()
        }
        Err(e) => {
            warn!("{}; falling back to full audio", e);
            src.to_path_buf()
        }
    }
}
