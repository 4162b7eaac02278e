use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use screen_mic_recorder::{
    create_router, event_channel, AppState, Config, PolicyConsent, RecorderController,
    RecordingOptions, SimulatedEngine, StartOutcome,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "screen-mic-recorder")]
#[command(about = "Screen plus microphone recording session controller")]
struct Args {
    /// Config file (without extension)
    #[arg(short, long, default_value = "config/screen-mic-recorder")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve,

    /// Record one session and print the artifact path
    Record {
        /// Duration to record in seconds
        #[arg(short, long, default_value = "5")]
        seconds: u64,

        /// Record the microphone too
        #[arg(long)]
        mic: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config))?;

    info!("Loaded config: {}", cfg.service.name);

    let (events_tx, events_rx) = event_channel();
    let engine = Arc::new(SimulatedEngine::new(events_tx));
    let consent = Arc::new(PolicyConsent::new(cfg.consent.policy).with_delay(cfg.consent_delay()));
    let storage = Arc::new(cfg.storage());

    let controller = RecorderController::new(engine, consent, storage, cfg.controller());
    controller.attach_engine_events(events_rx);

    match args.command {
        Command::Serve => serve(&cfg, controller).await,
        Command::Record { seconds, mic } => record(controller, seconds, mic).await,
    }
}

async fn serve(cfg: &Config, controller: RecorderController) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let router = create_router(AppState::new(controller));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, router).await.context("HTTP server failed")?;

    Ok(())
}

async fn record(controller: RecorderController, seconds: u64, mic: bool) -> Result<()> {
    let mut logs = controller.subscribe_logs();
    tokio::spawn(async move {
        while let Ok(event) = logs.recv().await {
            println!("[recorder] {}", event.log);
        }
    });

    let outcome = controller
        .start_recording(RecordingOptions::default().with_mic(mic))
        .await?;

    if outcome == StartOutcome::UserDeniedPermission {
        info!("Capture consent denied, nothing recorded");
        return Ok(());
    }

    info!("Recording for {} seconds", seconds);
    tokio::time::sleep(Duration::from_secs(seconds)).await;

    let path = controller.stop_recording().await?;
    println!("{}", path.display());

    Ok(())
}
