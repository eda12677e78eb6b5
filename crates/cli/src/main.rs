use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use footfall_core::detection::domain::face_detector::FaceDetector;
use footfall_core::detection::infrastructure::http_face_detector::HttpFaceDetector;
use footfall_core::pipeline::analysis_logger::StdoutAnalysisLogger;
use footfall_core::pipeline::analysis_pipeline::AnalysisPipeline;
use footfall_core::pipeline::eviction_scheduler::EvictionScheduler;
use footfall_core::shared::constants::{
    DETECT_COOLDOWN, GAZE_BAND_DEGREES, IDLE_TIMEOUT_MS, SWEEP_PERIOD,
};
use footfall_core::shared::settings::Settings;
use footfall_core::tracking::domain::gaze::GazeBand;
use footfall_core::tracking::domain::registry::TrackingRegistry;
use footfall_core::upload::domain::event::DeviceIdentity;
use footfall_core::upload::domain::event_sink::EventSink;
use footfall_core::upload::infrastructure::http_event_sink::HttpEventSink;
use footfall_core::video::domain::frame_source::FrameSource;
use footfall_core::video::infrastructure::image_dir_source::ImageDirSource;

/// People-flow analysis over a directory of captured frames.
#[derive(Parser)]
#[command(name = "footfall")]
struct Cli {
    /// Directory of JPEG frames to analyze, in name order.
    frames: PathBuf,

    /// Seconds between detection calls.
    #[arg(long, default_value_t = DETECT_COOLDOWN.as_secs())]
    interval: u64,

    /// Seconds a face may go unseen before its session is closed.
    #[arg(long, default_value_t = IDLE_TIMEOUT_MS / 1000)]
    idle_timeout: u64,

    /// Seconds between eviction sweeps.
    #[arg(long, default_value_t = SWEEP_PERIOD.as_secs())]
    sweep_period: u64,

    /// Head-yaw half-width (degrees) counted as facing the camera.
    #[arg(long, default_value_t = GAZE_BAND_DEGREES)]
    gaze_band: f64,

    /// Detection provider API key (overrides saved settings).
    #[arg(long)]
    provider_key: Option<String>,

    /// Detection provider base endpoint (overrides saved settings).
    #[arg(long)]
    provider_endpoint: Option<String>,

    /// Collector URL for analytics events (overrides saved settings).
    #[arg(long)]
    collector_url: Option<String>,

    /// Store identifier stamped on outbound events.
    #[arg(long)]
    store_id: Option<String>,

    /// Device identifier stamped on outbound events.
    #[arg(long)]
    device_id: Option<String>,

    /// Persist the provided overrides as the new saved settings.
    #[arg(long)]
    save_settings: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = effective_settings(&cli);
    if cli.save_settings {
        settings.save();
        log::info!("settings saved");
    }

    let source: Box<dyn FrameSource> = Box::new(ImageDirSource::open(&cli.frames)?);
    let detector: Box<dyn FaceDetector> = Box::new(HttpFaceDetector::new(
        settings.provider_key.clone(),
        settings.provider_endpoint.clone(),
    ));
    let registry = Arc::new(TrackingRegistry::new(GazeBand::new(cli.gaze_band)));
    let sink: Arc<dyn EventSink> = Arc::new(HttpEventSink::new(
        settings.collector_url.clone(),
        DeviceIdentity {
            store_id: settings.store_id.clone(),
            device_id: settings.device_id.clone(),
        },
    ));

    let scheduler = EvictionScheduler::start(
        Arc::clone(&registry),
        Arc::clone(&sink),
        Duration::from_secs(cli.sweep_period),
        cli.idle_timeout * 1000,
    );

    let mut pipeline = AnalysisPipeline::new(
        source,
        detector,
        registry,
        sink,
        Box::new(StdoutAnalysisLogger::new()),
        Duration::from_secs(cli.interval),
    );
    pipeline.run();

    // Stop ticking before the final drain so the two paths don't race
    // over the same sessions.
    scheduler.stop();
    pipeline.drain();

    Ok(())
}

fn effective_settings(cli: &Cli) -> Settings {
    let mut settings = Settings::load();
    if let Some(v) = &cli.provider_key {
        settings.provider_key = v.clone();
    }
    if let Some(v) = &cli.provider_endpoint {
        settings.provider_endpoint = v.clone();
    }
    if let Some(v) = &cli.collector_url {
        settings.collector_url = v.clone();
    }
    if let Some(v) = &cli.store_id {
        settings.store_id = v.clone();
    }
    if let Some(v) = &cli.device_id {
        settings.device_id = v.clone();
    }
    settings
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.frames.is_dir() {
        return Err(format!("Frames directory not found: {}", cli.frames.display()).into());
    }
    if cli.gaze_band < 0.0 || cli.gaze_band > 90.0 {
        return Err(format!(
            "Gaze band must be between 0 and 90 degrees, got {}",
            cli.gaze_band
        )
        .into());
    }
    if cli.sweep_period == 0 {
        return Err("Sweep period must be at least 1 second".into());
    }
    Ok(())
}
