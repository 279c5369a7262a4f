use pitchlock::config::TrackerConfig;
use pitchlock::console_display;
use pitchlock::data_logger;
use pitchlock::pipeline;
use pitchlock::simulator;
use pitchlock::types::*;

use clap::Parser;
use crossbeam_channel::bounded;
use log::{info, warn};
use std::path::PathBuf;
use std::thread;

#[derive(Parser)]
#[command(name = "pitchlock")]
#[command(about = "Real-time pitch tracking and note lock-in for instrument tuning")]
struct Cli {
    /// Demo sequence: "basic" (default), "etude" (guitar tuning pass),
    /// or "noisy" (exercises rejection paths)
    #[arg(long, default_value = "basic")]
    demo: String,

    /// Built-in tuning profile: balanced, responsive, steady, or wide
    #[arg(long, default_value = "balanced")]
    profile: String,

    /// JSON config file overriding the profile
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend sample cadence (samples per second)
    #[arg(long, default_value_t = 86)]
    rate: u32,

    /// Disable the live console tuner readout
    #[arg(long)]
    no_console: bool,

    /// Console refresh rate (Hz)
    #[arg(long, default_value_t = 20)]
    display_hz: u32,

    /// Enable session logging
    #[arg(long)]
    log_data: bool,

    /// Output directory for logged sessions
    #[arg(long, default_value = "./sessions")]
    output_dir: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TrackerConfig::load(path).unwrap_or_else(|| {
            warn!("Falling back to '{}' profile", cli.profile);
            profile_or_default(&cli.profile)
        }),
        None => profile_or_default(&cli.profile),
    };

    let clock = SessionClock::new();

    info!("═══════════════════════════════════════════════");
    info!("  PITCHLOCK v{}", env!("CARGO_PKG_VERSION"));
    info!("  Demo: {}  Profile: {}", cli.demo, cli.profile);
    info!(
        "  Thresholds: strict {:.0} dB / relaxed {:.0} dB, sustain {}ms",
        config.strict_threshold_db, config.relaxed_threshold_db, config.min_sustain_ms
    );
    info!("═══════════════════════════════════════════════");

    // Channel: backend samples → pipeline
    let (sample_tx, sample_rx) = bounded::<PitchSample>(1024);

    // Channels: pipeline → consumers
    let mut display_txs: Vec<crossbeam_channel::Sender<DisplayState>> = Vec::new();

    let mut handles = Vec::new();

    // ─── Console tuner readout ──────────────────────────────────────
    if !cli.no_console {
        let (tx, rx) = bounded::<DisplayState>(256);
        display_txs.push(tx);
        let hz = cli.display_hz;
        let rate = cli.rate;
        handles.push(
            thread::Builder::new()
                .name("display".into())
                .spawn(move || {
                    console_display::ConsoleDisplay::new(rx, hz, rate).run();
                })
                .unwrap(),
        );
    }

    // ─── Session logger ─────────────────────────────────────────────
    if cli.log_data {
        let (tx, rx) = bounded::<DisplayState>(4096);
        display_txs.push(tx);
        let output_dir = cli.output_dir.clone();
        let log_config = config.clone();
        let rate = cli.rate;
        handles.push(
            thread::Builder::new()
                .name("logger".into())
                .spawn(move || {
                    data_logger::DataLogger::new(rx, &output_dir, log_config, rate).run();
                })
                .unwrap(),
        );
    }

    // ─── Tracking pipeline ──────────────────────────────────────────
    let pipe_config = config.clone();
    handles.push(
        thread::Builder::new()
            .name("pipeline".into())
            .spawn(move || {
                pipeline::Pipeline::new(sample_rx, display_txs, pipe_config).run();
            })
            .unwrap(),
    );

    // ─── Simulated backend ──────────────────────────────────────────
    info!("Starting simulator...");
    let sim_clock = clock.clone();
    let demo = cli.demo.clone();
    let rate = cli.rate;
    handles.push(
        thread::Builder::new()
            .name("simulator".into())
            .spawn(move || {
                simulator::Simulator::new(sim_clock, sample_tx, rate).run(&demo);
            })
            .unwrap(),
    );

    for h in handles {
        let _ = h.join();
    }
    info!("Done.");
}

fn profile_or_default(name: &str) -> TrackerConfig {
    TrackerConfig::profile(name).unwrap_or_else(|| {
        warn!("Unknown profile '{}', using balanced", name);
        TrackerConfig::default()
    })
}
