//! Ambience Preview
//!
//! Usage:
//!   amb-preview render --kind hover --out hover.wav
//!   amb-preview render --kind action --out action.wav --sample-rate 44100
//!   amb-preview scenario
//!
//! Set `RUST_LOG=debug` to see every tone and transition decision.

mod scenario;
mod wav;

use std::path::{Path, PathBuf};

use amb_tone::{DEFAULT_NOISE_SEED, EffectKind, OfflinePlatform, ToneEngine};
use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use crate::wav::WavFormat;

/// Silence kept after the last voice stops
const TAIL_SECS: f64 = 0.05;

#[derive(Parser)]
#[command(name = "amb-preview", about = "Ambience effect and session preview")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one UI effect to a WAV file
    Render {
        #[arg(short, long, value_enum)]
        kind: Kind,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, default_value_t = 48000)]
        sample_rate: u32,
        #[arg(long, value_enum, default_value_t = WavFormat::Pcm16)]
        format: WavFormat,
        /// Noise seed
        #[arg(long, default_value_t = DEFAULT_NOISE_SEED)]
        seed: u64,
    },
    /// Replay a scripted dashboard session and print what happened
    Scenario {
        #[arg(long, default_value_t = DEFAULT_NOISE_SEED)]
        seed: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Hover,
    Action,
}

impl From<Kind> for EffectKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Hover => EffectKind::Hover,
            Kind::Action => EffectKind::Action,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            kind,
            out,
            sample_rate,
            format,
            seed,
        } => render(kind.into(), &out, sample_rate, format, seed),
        Commands::Scenario { seed, json } => run_scenario(seed, json),
    }
}

fn render(
    kind: EffectKind,
    out: &Path,
    sample_rate: u32,
    format: WavFormat,
    seed: u64,
) -> Result<()> {
    if !(8000..=192_000).contains(&sample_rate) {
        bail!("Sample rate {} out of range (8000-192000)", sample_rate);
    }

    let platform = OfflinePlatform::new(sample_rate as f32);
    platform.grant_gesture();
    let engine = ToneEngine::with_seed(platform.clone(), seed);
    engine.trigger(kind);

    let end = platform
        .live_voices()
        .iter()
        .map(|v| v.stop_at)
        .fold(platform.now(), f64::max);
    let samples = platform.render(end - platform.now() + TAIL_SECS);

    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    log::info!(
        "[Preview] {} effect: {} frames, peak {:.4}",
        kind.name(),
        samples.len(),
        peak
    );

    wav::write_mono(out, &samples, sample_rate, format)?;
    println!("✅ Wrote {} ({} samples @ {} Hz)", out.display(), samples.len(), sample_rate);
    Ok(())
}

fn run_scenario(seed: u64, json: bool) -> Result<()> {
    let report = scenario::run(seed, 48000.0)?;

    if json {
        let value = serde_json::json!({
            "final_state": report.final_state,
            "transitions": report.transitions,
            "progress": report.progress,
            "layers_scheduled": report.layers_scheduled,
            "host_calls": report.host_calls,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("🎬 Session replay\n");
    for (from, to) in &report.transitions {
        println!("  {} → {}", from, to);
    }
    println!();
    for (story, pct) in &report.progress {
        println!("  📊 {}: {}%", story, pct);
    }
    println!(
        "\n  {} tone layers scheduled, {} host calls",
        report.layers_scheduled, report.host_calls
    );
    println!("\n✅ Final state: {}", report.final_state);
    Ok(())
}
