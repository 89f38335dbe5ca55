//! voice-cast - Convert narrative text into a multi-voice audiobook

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use voice_cast::audio::{ChunkLayout, is_ffmpeg_available};
use voice_cast::config::VoiceCastConfig;
use voice_cast::extract::load_text;
use voice_cast::pipeline::{self, Planner, RenderOptions, VoicedChunk};
use voice_cast::tts::TtsBackend;
use voice_cast::tts::google::GoogleTtsBackend;
use voice_cast::voice::VoiceResolver;

#[derive(Parser, Debug)]
#[command(name = "voice-cast")]
#[command(about = "Convert narrative text into a multi-voice audiobook", long_about = None)]
#[command(version)]
struct Args {
    /// Input document (.txt or .pdf)
    input: Option<PathBuf>,

    /// Output MP3 path
    output: Option<PathBuf>,

    /// Maximum characters per synthesis request
    #[arg(long)]
    max_chars: Option<usize>,

    /// Print speaker voices and the chunk plan, then exit without synthesis
    #[arg(long)]
    plan: bool,

    /// Print the plan as JSON (with --plan)
    #[arg(long, requires = "plan")]
    json: bool,

    /// Concurrent synthesis requests
    #[arg(long)]
    concurrency: Option<usize>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the narrator / fallback voice
    SetDefaultVoice {
        /// Voice name (e.g. en-US-Wavenet-D)
        voice: String,
    },
    /// Set default speaking rate
    SetRate {
        /// Value (0.25-4.0)
        value: f32,
    },
    /// Set default pitch
    SetPitch {
        /// Semitones (-20.0-20.0)
        #[arg(allow_hyphen_values = true)]
        value: f32,
    },
    /// Set maximum characters per chunk
    SetMaxChars {
        /// Characters (at least 1)
        value: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let input = args
        .input
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Input file is required. Run 'voice-cast --help' for usage."))?;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let mut config = VoiceCastConfig::load().context("Failed to load configuration")?;
    if let Some(max_chars) = args.max_chars {
        config.set_max_chars(max_chars);
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency.max(1);
    }

    let text = load_text(&input)?;
    if text.is_empty() {
        anyhow::bail!("No text found in {}", input.display());
    }

    let planner = Planner::from_config(&config).context("Invalid segmenter configuration")?;
    let mut resolver = VoiceResolver::new(
        config.voice_pool().context("No voices configured")?,
        config.name_dictionary(),
    );
    let plan = planner.plan(&text, &mut resolver);
    if plan.is_empty() {
        anyhow::bail!("Nothing to synthesize in {}", input.display());
    }

    if args.plan {
        return print_plan(&plan, &resolver, args.json);
    }

    let output = args
        .output
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Output path is required unless --plan is given"))?;

    print_voices(&resolver);
    eprintln!("Chunks: {}", plan.len());

    if !is_ffmpeg_available() {
        log::warn!("ffmpeg not found; multi-chunk output cannot be assembled");
    }

    let backend = GoogleTtsBackend::from_config(&config)
        .context("Set GCP_API_KEY or GCP_ACCESS_TOKEN to use Google Text-to-Speech")?;
    log::debug!("Using {} backend", backend.name());

    let layout = ChunkLayout::for_output(&output);
    let options = RenderOptions {
        concurrency: config.concurrency,
        ..Default::default()
    };

    let pb = ProgressBar::new(plan.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let result = pipeline::render(&backend, &plan, &layout, &options, |done| {
        pb.set_position(done as u64);
    })
    .await;
    pb.finish_and_clear();
    let report = result?;

    eprintln!("Assembling {}...", output.display());
    pipeline::export(&report, &layout)?;

    let size_mb = std::fs::metadata(&output)?.len() as f64 / (1024.0 * 1024.0);
    eprintln!("Output: {} ({:.1} MB)", output.display(), size_mb);
    eprintln!("Chunk audio kept in {}", layout.chunk_dir.display());

    Ok(())
}

fn print_voices(resolver: &VoiceResolver) {
    eprintln!("Voices:");
    for assignment in resolver.assignments() {
        let gender = assignment
            .gender
            .map(|g| format!("{:?}", g).to_lowercase())
            .unwrap_or_else(|| "unknown".to_string());
        eprintln!(
            "  {:<20} {:<24} ({})",
            assignment.speaker.as_deref().unwrap_or("Narrator"),
            assignment.voice,
            gender
        );
    }
}

fn print_plan(plan: &[VoicedChunk], resolver: &VoiceResolver, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    print_voices(resolver);
    println!();
    for chunk in plan {
        println!(
            "{:>4}  {:<16} {:<24} {}",
            chunk.index + 1,
            chunk.speaker_label(),
            chunk.voice,
            preview(&chunk.text, 60)
        );
    }
    Ok(())
}

/// First `max` characters of `text` on a single line.
fn preview(text: &str, max: usize) -> String {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= max {
        line
    } else {
        format!("{}...", line.chars().take(max).collect::<String>())
    }
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = VoiceCastConfig::load_file()?;
            println!("Configuration file: {:?}", VoiceCastConfig::config_path()?);
            println!();
            println!("male_voices = {:?}", config.male_voices);
            println!("female_voices = {:?}", config.female_voices);
            match &config.default_voice {
                Some(voice) => println!("default_voice = \"{}\"", voice),
                None => println!("default_voice = (first configured voice)"),
            }
            println!("speaking_rate = {}", config.speaking_rate);
            println!("pitch = {}", config.pitch);
            println!("max_chars = {}", config.max_chars);
            println!("concurrency = {}", config.concurrency);
            println!("narrate_attributions = {}", config.narrate_attributions);
            println!(
                "segmenter.lead_in_attribution = {}",
                config.segmenter.lead_in_attribution
            );
            let quotes: Vec<String> = config
                .segmenter
                .quotes
                .iter()
                .map(|q| format!("{}...{}", q.open, q.close))
                .collect();
            println!("segmenter.quotes = [{}]", quotes.join(", "));
            println!(
                "api_key = {}",
                if config.api_key.is_some() { "(set)" } else { "(none)" }
            );
        }
        ConfigAction::SetDefaultVoice { voice } => {
            let mut config = VoiceCastConfig::load_file()?;
            config.default_voice = Some(voice.clone());
            config.save()?;
            println!("Default voice set to: {}", voice);
        }
        ConfigAction::SetRate { value } => {
            let mut config = VoiceCastConfig::load_file()?;
            config.set_speaking_rate(*value);
            config.save()?;
            println!("Default speaking rate set to: {}", config.speaking_rate);
        }
        ConfigAction::SetPitch { value } => {
            let mut config = VoiceCastConfig::load_file()?;
            config.set_pitch(*value);
            config.save()?;
            println!("Default pitch set to: {}", config.pitch);
        }
        ConfigAction::SetMaxChars { value } => {
            let mut config = VoiceCastConfig::load_file()?;
            config.set_max_chars(*value);
            config.save()?;
            println!("Max chunk size set to: {} chars", config.max_chars);
        }
    }
    Ok(())
}
