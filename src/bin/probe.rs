//! Diagnostics for the recognition pipeline: enumerate input devices,
//! inspect the language registry, and run the live audio meter without a
//! recognition session.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::{Duration, Instant};
use vocalis::language::{self, QualityTier};
use vocalis::{AudioProcessor, ProcessorConfig};

#[derive(Parser)]
#[command(
    name = "vocalis-probe",
    version,
    about = "Diagnostics for the vocalis recognition pipeline"
)]
struct Cli {
    /// Write JSON trace events to the file named by VOCALIS_TRACE_LOG.
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available audio input devices.
    Devices,
    /// List registered languages, optionally filtered by a search term.
    Languages { query: Option<String> },
    /// Capture from a microphone and print live metrics.
    Meter {
        /// How long to run, in seconds.
        #[arg(long, default_value_t = 5)]
        seconds: u64,
        /// Input device name; defaults to the system default.
        #[arg(long)]
        device: Option<String>,
        /// Spectral subtraction strength, 0.0 to 1.0.
        #[arg(long, default_value_t = 0.7)]
        noise_reduction_level: f32,
    },
    /// Score a text sample with the built-in language detector.
    Detect { text: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if vocalis::telemetry::init_tracing(cli.trace) {
        eprintln!(
            "tracing to {}",
            vocalis::telemetry::trace_log_path().display()
        );
    }

    match cli.command {
        Command::Devices => {
            let devices = AudioProcessor::list_devices()?;
            if devices.is_empty() {
                println!("no input devices found");
            }
            for name in devices {
                println!("{name}");
            }
        }
        Command::Languages { query } => {
            let languages: Vec<_> = match query {
                Some(query) => language::search(&query),
                None => language::all().iter().collect(),
            };
            for lang in &languages {
                println!(
                    "{:<8} {:<28} {:<24} native={:<5} tier={}",
                    lang.code,
                    lang.display_name,
                    lang.native_name,
                    lang.native_backend,
                    tier_label(lang.tier),
                );
            }
            println!("{} languages", languages.len());
        }
        Command::Meter {
            seconds,
            device,
            noise_reduction_level,
        } => {
            let mut audio = AudioProcessor::new(ProcessorConfig {
                preferred_device: device,
                noise_reduction_level,
                ..ProcessorConfig::default()
            });
            audio.start_recording()?;
            println!("capturing for {seconds}s, ctrl-c to abort");

            let deadline = Instant::now() + Duration::from_secs(seconds);
            let mut last_print = Instant::now();
            while Instant::now() < deadline {
                while audio.next_frame().is_some() {}
                if last_print.elapsed() >= Duration::from_millis(250) {
                    let m = audio.metrics();
                    println!(
                        "volume={:5.2} snr={:5.1}dB latency={:4}ms clipping={} noise={:4.2}",
                        m.volume,
                        m.signal_to_noise_ratio,
                        m.latency_ms,
                        m.clipping,
                        audio.noise_level(),
                    );
                    last_print = Instant::now();
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            let dropped = audio.frames_dropped();
            audio.stop_recording();
            println!("done, {dropped} frames dropped");
        }
        Command::Detect { text } => {
            match vocalis::language::LanguageDetector::new().detect(&text) {
                Some(code) => println!("{code}"),
                None => println!("no verdict"),
            }
        }
    }
    Ok(())
}

fn tier_label(tier: QualityTier) -> &'static str {
    match tier {
        QualityTier::High => "high",
        QualityTier::Medium => "medium",
        QualityTier::Low => "low",
    }
}
