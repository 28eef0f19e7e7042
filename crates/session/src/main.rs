//! Headless proctoring monitor
//!
//! Usage: `proctor-monitor [config.toml]`

use anyhow::{Context, Result};
use camera_capture::ImageSequenceSource;
use engagement::load_detector;
use session::{init_logging, FixedFocus, LogPresenter, Session, SessionConfig, WindowEvent};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let path = std::env::args().nth(1);
    let config = SessionConfig::load(path.as_deref()).context("failed to load configuration")?;
    init_logging(config.log_json)?;

    info!("Proctor monitor v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration (file: {})", SessionConfig::resolve_path(path.as_deref()));

    let source = ImageSequenceSource::open(&config.camera)
        .with_context(|| format!("failed to open frame source {}", config.camera.device))?;
    let detector = load_detector(&config.engagement).context("failed to load landmark detector")?;
    let mut session = Session::new(config, source, detector, LogPresenter::default())?;

    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            let _ = tx.send(WindowEvent::StopRequested).await;
        }
    });

    let report = session.run(rx, &FixedFocus(true)).await;
    info!(
        "Session finished: {:?} ({} frames processed, {:.1} fps)",
        report.reason,
        report.stats.frames_processed,
        report.stats.processing_fps().unwrap_or(0.0)
    );

    Ok(())
}
