use std::{
    io::Write,
    path::PathBuf,
    time::Duration,
};

use clap::{Parser, Subcommand, error::ErrorKind};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use safescan_core::{
    FlagList, ScanConfig, format_flags_json, get_thumbnail_path, speech::silence_native_logs,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod shutdown;

#[derive(Parser)]
#[command(name = "safescan", version)]
#[command(
    about = "Flag weapons, gore, horror imagery and unsafe speech in uploaded media. \
             Prints one JSON array of flags to stdout."
)]
struct Cli {
    /// JSON config file with threshold overrides (default: ./safescan.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding frames, audio.wav and the thumbnail temp file
    #[arg(short, long, global = true)]
    work_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scan extracted *.jpg frames, stopping at the first flagged one
    Frames,
    /// Download and scan a thumbnail image
    Thumbnail {
        /// Thumbnail URL; without one nothing is scanned
        url: Option<String>,
    },
    /// Transcribe audio.wav and score it for screams, horror and weapons
    Transcript,
    /// Scan a video title for dangerous terms
    Title {
        /// Title text
        text: String,
    },
    /// Keyword scan over the first seconds of audio.wav
    QuickSpeech,
    /// Keyword scan over the whole of audio.wav
    FullSpeech,
}

pub(crate) fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Write the one line of stdout this program ever produces
fn emit(flags: &FlagList) {
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{}", format_flags_json(flags));
    let _ = stdout.flush();
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safescan=info,safescan_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    silence_native_logs();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{}", e);
            emit(&FlagList::new());
            return;
        }
    };

    let mut config = match ScanConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{} {} {}",
                style("Error:").red().bold(),
                e,
                style("(using defaults)").dim()
            );
            ScanConfig::default()
        }
    };
    if let Some(work_dir) = cli.work_dir {
        config.work_dir = work_dir;
    }

    let temp_file = matches!(cli.command, Command::Thumbnail { .. })
        .then(|| get_thumbnail_path(&config.work_dir));

    tokio::select! {
        result = commands::run(cli.command, &config) => {
            let flags = result.unwrap_or_else(|e| {
                tracing::error!("Scan aborted: {:#}", e);
                FlagList::new()
            });
            emit(&flags);
        }
        _ = shutdown::signal() => {
            if let Some(path) = temp_file {
                let _ = std::fs::remove_file(path);
            }
            emit(&FlagList::new());
            // blocking model work may still be running
            std::process::exit(0);
        }
    }
}
