use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mic_diagnostics::analysis::{DiagnosticReport, Metrics, Rating, Verdict};
use mic_diagnostics::config::DiagnosticConfig;
use mic_diagnostics::session::DiagnosticEngine;
use mic_diagnostics::source::{
    drive, drive_queued, open_wav, PcmFrameSource, SyntheticPattern, SyntheticSpec,
};
use mic_diagnostics::telemetry::{self, SessionEvent};
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;

#[derive(Parser, Debug)]
#[command(
    name = "mic_diag",
    about = "Microphone signal diagnostics over WAV files and synthetic signals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Diagnose a recorded WAV file
    Analyze {
        /// Path to a PCM or float WAV file (multi-channel input is mixed to mono)
        #[arg(long)]
        wav: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Diagnose a generated test signal
    Synth {
        #[arg(long, value_parser = parse_pattern)]
        pattern: SyntheticPattern,
        #[arg(long, default_value_t = 440.0)]
        frequency_hz: f32,
        #[arg(long, default_value_t = 0.1)]
        amplitude: f32,
        #[arg(long, default_value_t = 2_000)]
        duration_ms: u32,
        /// Sample rate (defaults to the analyser sample rate from the config)
        #[arg(long)]
        sample_rate: Option<u32>,
        #[arg(long, default_value_t = 0x5A5A_FFF0)]
        seed: u64,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// JSON configuration file (missing or invalid files fall back to defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format for the report
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// Also write the JSON report to this file
    #[arg(long)]
    output: Option<PathBuf>,
    /// Exit with status 2 unless the verdict is success
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Accumulate frames on a background capture worker
    #[arg(long, default_value_t = false)]
    queued: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

fn parse_pattern(value: &str) -> std::result::Result<SyntheticPattern, String> {
    value.parse()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { wav, common } => {
            let config = load_config(&common);
            let source = open_wav(&wav, &config.analyser)
                .with_context(|| format!("loading {}", wav.display()))?;
            run_session(wav.display().to_string(), source, &config, &common)
        }
        Commands::Synth {
            pattern,
            frequency_hz,
            amplitude,
            duration_ms,
            sample_rate,
            seed,
            common,
        } => {
            let config = load_config(&common);
            let spec = SyntheticSpec {
                pattern,
                frequency_hz,
                amplitude,
                duration_ms,
                sample_rate_hz: sample_rate.unwrap_or(config.analyser.sample_rate_hz),
                seed,
            };
            let source = spec
                .build_source(&config.analyser)
                .context("building synthetic source")?;
            run_session(format!("synth:{pattern}"), source, &config, &common)
        }
    }
}

fn load_config(common: &CommonArgs) -> DiagnosticConfig {
    common
        .config
        .as_ref()
        .map(DiagnosticConfig::load_from_file)
        .unwrap_or_default()
}

fn run_session(
    label: String,
    mut source: PcmFrameSource,
    config: &DiagnosticConfig,
    common: &CommonArgs,
) -> Result<ExitCode> {
    let sample_rate_hz = source.sample_rate_hz();
    let frames = source.frame_count() as u64;
    let mut events = telemetry::hub().subscribe();

    let report = if common.queued {
        drive_queued(&mut source, config.engine.clone(), &config.worker)
            .context("running queued session")?
    } else {
        let mut engine = DiagnosticEngine::new(config.engine.clone());
        drive(&mut engine, &mut source).context("running session")?
    };

    // Lag only drops the oldest events; the finalized one carries the count
    let mut level_events = 0u64;
    loop {
        match events.try_recv() {
            Ok(SessionEvent::Finalized {
                level_events: count,
                ..
            }) => level_events = count,
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    let summary = RunSummary::new(label, sample_rate_hz, frames, level_events, &report);
    let json = serde_json::to_string_pretty(&summary).context("serializing report")?;

    match common.format {
        OutputFormat::Json => println!("{json}"),
        OutputFormat::Table => summary.print_table(),
    }

    if let Some(path) = &common.output {
        fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
    }

    if common.strict && summary.verdict.status != Rating::Success {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Serialize)]
struct RunSummary {
    source: String,
    sample_rate_hz: u32,
    frames: u64,
    level_events: u64,
    metrics: Metrics,
    ratings: BTreeMap<&'static str, Rating>,
    verdict: Verdict,
}

impl RunSummary {
    fn new(
        source: String,
        sample_rate_hz: u32,
        frames: u64,
        level_events: u64,
        report: &DiagnosticReport,
    ) -> Self {
        Self {
            source,
            sample_rate_hz,
            frames,
            level_events,
            metrics: report.metrics.rounded(),
            ratings: report
                .ratings
                .iter()
                .map(|rating| (rating.metric.name(), rating.rating))
                .collect(),
            verdict: report.verdict.clone(),
        }
    }

    fn print_table(&self) {
        let m = &self.metrics;
        println!("Source                   : {}", self.source);
        println!(
            "Frames                   : {} @ {} Hz",
            self.frames, self.sample_rate_hz
        );
        self.print_row("rms", Some(format!("{:.2}", m.rms)));
        self.print_row("peak", Some(format!("{:.2}", m.peak)));
        self.print_row("clipping_percent", Some(format!("{:.2}%", m.clipping_percent)));
        self.print_row(
            "noise_floor_rms",
            m.noise_floor_rms.map(|v| format!("{v:.2}")),
        );
        self.print_row("snr_db", m.snr_db.map(|v| format!("{v:.2} dB")));
        self.print_row(
            "dominant_freq_hz",
            m.dominant_freq_hz.map(|v| format!("{v} Hz")),
        );
        self.print_row(
            "spectral_centroid_hz",
            m.spectral_centroid_hz.map(|v| format!("{v} Hz")),
        );
        self.print_row("dc_offset", Some(format!("{:.3}", m.dc_offset)));
        println!(
            "Verdict                  : {} - {}",
            self.verdict.status, self.verdict.message
        );
    }

    fn print_row(&self, metric: &'static str, value: Option<String>) {
        let value = value.unwrap_or_else(|| "n/a".to_string());
        match self.ratings.get(metric) {
            Some(rating) => println!("  {metric:<22} : {value} ({rating})"),
            None => println!("  {metric:<22} : {value}"),
        }
    }
}
