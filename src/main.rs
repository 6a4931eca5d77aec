// SYNOID Clipper Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use synoid_clipper::clipper::audio::{AudioFeatureSource, FeatureFile, WavFeatureExtractor};
use synoid_clipper::clipper::classifier::StubClassifier;
use synoid_clipper::clipper::strategy::ClipStrategy;
use synoid_clipper::clipper::transcription::{
    generate_emoji_srt, generate_srt, segments_in_window, JsonTranscript, TranscriptSource,
};
use synoid_clipper::clipper::{clip_report, MomentFinder};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "synoid-clipper")]
#[command(about = "SYNOID Viral Moment Finder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ClassifierChoice {
    /// Sentiment/emotion from the chat endpoint (SYNOID_API_URL)
    Chat,
    /// Neutral signals, no network
    Stub,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the best non-overlapping clips from a transcript
    Select {
        /// Transcript JSON (segment array or {"segments": [...]})
        #[arg(short, long)]
        transcript: PathBuf,

        /// Precomputed audio features JSON
        #[arg(short, long, conflicts_with = "audio", required_unless_present = "audio")]
        features: Option<PathBuf>,

        /// WAV audio to analyze for tempo and energy
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Target clip duration in seconds (clamped to the strategy range)
        #[arg(short, long, default_value_t = 30.0)]
        duration: f64,

        /// Number of clips to return (clamped to the strategy range)
        #[arg(short, long, default_value_t = 3)]
        clips: usize,

        /// Strategy JSON (defaults to ./clip_strategy.json if present)
        #[arg(short, long)]
        strategy: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ClassifierChoice::Chat)]
        classifier: ClassifierChoice,

        /// Source video title for the report
        #[arg(long)]
        title: Option<String>,

        /// Write clip_N.srt captions for each selected clip here
        #[arg(long)]
        captions_dir: Option<PathBuf>,

        /// Decorate caption words like "money" or "wow" with emojis
        #[arg(long)]
        emoji_captions: bool,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract tempo and energy variance from a WAV file
    Features {
        #[arg(short, long)]
        audio: PathBuf,
    },

    /// Print SRT captions for a time window of a transcript
    Captions {
        #[arg(short, long)]
        transcript: PathBuf,

        #[arg(short, long)]
        start: f64,

        #[arg(short, long)]
        end: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("🚨 [SYNOID PANIC] at {}: {}", location, message);
    }));

    let args = Cli::parse();

    match args.command {
        Commands::Select {
            transcript,
            features,
            audio,
            duration,
            clips,
            strategy,
            classifier,
            title,
            captions_dir,
            emoji_captions,
            output,
        } => {
            let strategy = match strategy {
                Some(path) => ClipStrategy::load_from(&path)?,
                None => ClipStrategy::load(),
            };

            let finder = match classifier {
                ClassifierChoice::Chat => MomentFinder::with_chat_classifiers(strategy)?,
                ClassifierChoice::Stub => MomentFinder::new(
                    strategy,
                    Arc::new(StubClassifier::neutral("sentiment")),
                    Arc::new(StubClassifier::neutral("emotion")),
                )?,
            };

            let (media, feature_source): (PathBuf, Box<dyn AudioFeatureSource>) =
                match (audio, features) {
                    (Some(wav), _) => (wav, Box::new(WavFeatureExtractor::new())),
                    (None, Some(json)) => (transcript.clone(), Box::new(FeatureFile::new(json))),
                    (None, None) => anyhow::bail!("either --features or --audio is required"),
                };
            let transcripts = JsonTranscript::new(&transcript);

            let selection = finder
                .process_media(
                    &media,
                    &transcripts,
                    feature_source.as_ref(),
                    duration,
                    clips,
                )
                .await?;

            if selection.is_empty() {
                println!("No suitable clips found. Try adjusting parameters.");
                return Ok(());
            }

            let source_title = title.unwrap_or_else(|| {
                media
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "Unknown".to_string())
            });
            let report = clip_report(&selection, &source_title);

            if let Some(dir) = captions_dir {
                fs::create_dir_all(&dir)
                    .with_context(|| format!("creating captions dir {:?}", dir))?;
                for (i, clip) in selection.iter().enumerate() {
                    let path = dir.join(format!("clip_{}.srt", i + 1));
                    let srt = if emoji_captions {
                        generate_emoji_srt(&clip.source_segments, clip.start)
                    } else {
                        generate_srt(&clip.source_segments, clip.start)
                    };
                    fs::write(&path, srt).with_context(|| format!("writing {:?}", path))?;
                }
                info!("[CLIPPER] Captions written to {:?}", dir);
            }

            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    fs::write(&path, json).with_context(|| format!("writing {:?}", path))?;
                    info!(
                        "[CLIPPER] ✅ Selected {} clip(s) from {}, report: {:?}",
                        report.len(),
                        source_title,
                        path
                    );
                }
                None => println!("{}", json),
            }
        }
        Commands::Features { audio } => {
            let features = WavFeatureExtractor::new().extract(&audio).await?;
            println!("{}", serde_json::to_string_pretty(&features)?);
        }
        Commands::Captions {
            transcript,
            start,
            end,
        } => {
            anyhow::ensure!(end > start, "--end must be after --start");
            let segments = JsonTranscript::new(&transcript)
                .transcribe(&transcript)
                .await
                .context("loading transcript")?;
            let window = segments_in_window(&segments, start, end);
            print!("{}", generate_srt(&window, start));
        }
    }

    Ok(())
}
