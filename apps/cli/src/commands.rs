use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use console::style;
use safescan_core::{
    FlagList, FrameScanner, KeywordScanner, ScanConfig, TempFile, ThumbnailScanner, TitleScanner,
    TranscriptAnalyzer, download_thumbnail, find_frames, get_audio_path, get_quick_audio_path,
    get_root_cache_dir, get_thumbnail_path,
    models::{
        CommandClassifier, CommandDetector, CommandFaceLocator, ImageClassifier, Transcriber,
    },
    speech::{WhisperTranscriber, ensure_model, quick_audio_source},
};
use tracing::{info, warn};

use crate::{Command, create_spinner};

pub(crate) async fn run(command: Command, config: &ScanConfig) -> Result<FlagList> {
    match command {
        Command::Frames => scan_frames(config).await,
        Command::Thumbnail { url } => match url {
            Some(url) => scan_thumbnail(&url, config).await,
            None => {
                info!("No thumbnail URL given");
                Ok(FlagList::new())
            }
        },
        Command::Title { text } => Ok(TitleScanner::new(config.title.clone()).scan(&text)),
        Command::Transcript => scan_transcript(config).await,
        Command::QuickSpeech => scan_speech(config, true).await,
        Command::FullSpeech => scan_speech(config, false).await,
    }
}

async fn scan_frames(config: &ScanConfig) -> Result<FlagList> {
    let frames = find_frames(&config.work_dir, config.frames.max_frames);
    if frames.is_empty() {
        info!("No frames in {}", config.work_dir.display());
        return Ok(FlagList::new());
    }
    info!("Scanning {} frames", frames.len());

    let detector = CommandDetector::new(config.models.detector_command.clone());
    let thresholds = config.frames.clone();

    let flags = tokio::task::spawn_blocking(move || {
        FrameScanner::new(&detector, &thresholds).scan(&frames)
    })
    .await
    .context("frame scan panicked")?;

    Ok(flags)
}

async fn scan_thumbnail(url: &str, config: &ScanConfig) -> Result<FlagList> {
    let thumbnail = TempFile::new(get_thumbnail_path(&config.work_dir));
    let timeout = Duration::from_secs(config.thumbnail.download_timeout_secs);

    if let Err(e) = download_thumbnail(url, thumbnail.path(), timeout).await {
        warn!("{}", e);
        return Ok(FlagList::new());
    }

    let classifiers = load_classifiers(config).await;
    let detector = CommandDetector::new(config.models.detector_command.clone());
    let faces = CommandFaceLocator::new(config.models.face_command.clone());
    let thresholds = config.thumbnail.clone();
    let image = thumbnail.path().to_path_buf();

    let flags = tokio::task::spawn_blocking(move || {
        ThumbnailScanner::new(&detector, &faces, &classifiers, &thresholds).scan(&image)
    })
    .await
    .context("thumbnail scan panicked")?;

    // thumbnail is removed here as the guard drops
    Ok(flags)
}

/// Classifier strategies in rank order
async fn load_classifiers(config: &ScanConfig) -> Vec<Box<dyn ImageClassifier>> {
    let mut classifiers: Vec<Box<dyn ImageClassifier>> = Vec::new();

    #[cfg(feature = "vit")]
    {
        let repo = config.models.vit_repo().to_string();
        let spinner = create_spinner("Loading content classifier...");
        match tokio::task::spawn_blocking(move || safescan_core::models::VitClassifier::load(&repo))
            .await
        {
            Ok(Ok(vit)) => classifiers.push(Box::new(vit)),
            Ok(Err(e)) => warn!("Content classifier unavailable: {}", e),
            Err(e) => warn!("Content classifier loading panicked: {}", e),
        }
        spinner.finish_and_clear();
    }

    classifiers.push(Box::new(CommandClassifier::new(
        config.models.classifier_command.clone(),
    )));
    classifiers
}

async fn scan_transcript(config: &ScanConfig) -> Result<FlagList> {
    let audio = get_audio_path(&config.work_dir);
    if !audio.exists() {
        info!("No audio at {}", audio.display());
        return Ok(FlagList::new());
    }

    let analyzer = TranscriptAnalyzer::new(config.transcript.clone())?;
    let text = transcribe(config, audio).await?;
    Ok(analyzer.flags(&text))
}

async fn scan_speech(config: &ScanConfig, quick: bool) -> Result<FlagList> {
    let audio = get_audio_path(&config.work_dir);
    if !audio.exists() {
        info!("No audio at {}", audio.display());
        return Ok(FlagList::new());
    }

    let scanner = KeywordScanner::new(config.keywords.clone())?;
    let source = if quick {
        let quick_path = get_quick_audio_path(&config.work_dir);
        quick_audio_source(&audio, &quick_path, config.speech.quick_scan_seconds).await
    } else {
        audio
    };

    let text = transcribe(config, source).await?;
    Ok(scanner.scan(&text))
}

async fn whisper_model(config: &ScanConfig) -> Result<PathBuf> {
    if let Some(path) = &config.speech.model_path {
        return Ok(path.clone());
    }

    let spinner = create_spinner("Checking whisper model...");
    let model = ensure_model(&get_root_cache_dir(), &config.speech.model_name).await;
    match &model {
        Ok(_) => spinner.finish_with_message(format!(
            "{} Whisper model ready",
            style("✓").green().bold()
        )),
        Err(_) => spinner.finish_and_clear(),
    }

    Ok(model?)
}

async fn transcribe(config: &ScanConfig, audio: PathBuf) -> Result<String> {
    let model_path = whisper_model(config).await?;
    let speech = config.speech.clone();

    let spinner = create_spinner("Transcribing audio...");
    let transcript = tokio::task::spawn_blocking(move || {
        let transcriber = WhisperTranscriber::new(&model_path, &speech)?;
        transcriber.transcribe(&audio)
    })
    .await
    .context("transcription panicked");
    spinner.finish_and_clear();

    let transcript = transcript??;
    info!(
        "Transcribed {} segments, language {}",
        transcript.segments.len(),
        transcript.language
    );
    Ok(transcript.text)
}
