use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tiku_config::Config;
use tiku_core::fuzzy::FuzzySearch;
use tiku_core::knowledge::KnowledgeBase;
use tiku_core::session::{SessionDeps, SessionMachine, SessionSettings};
use tiku_core::store::JsonRegionStore;
use tiku_ocr::{TesseractRecognizer, XcapCapture};
use tiku_types::Category;
use tokio::signal;
use tracing_subscriber::{EnvFilter, fmt};

mod console;
mod controller;
mod io;
mod presenter;
mod settings;
mod surface;

#[cfg(test)]
mod tests;

use self::controller::{AppController, Inputs};
use self::surface::ConsoleSurfaces;

#[derive(Parser, Debug)]
#[command(
    name = "tiku",
    version,
    about = "Capture an on-screen question and look up its answer"
)]
struct Args {
    /// JSON config file; defaults plus TIKU_* environment when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Category for shortcuts and for console commands that name none
    #[arg(long)]
    category: Option<String>,
    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
    /// Do not register global shortcuts
    #[arg(long)]
    no_hotkeys: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    // Plain text for a terminal, JSON when piped or asked for
    if json || !atty::is(atty::Stream::Stderr) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.json_logs);

    tracing::info!("tiku v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings::load_config(args.config.as_deref())?;
    settings::export_tessdata(&config.ocr);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(args, config))
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let category = Category::from(
        args.category
            .unwrap_or_else(|| config.hotkey.category.clone()),
    );

    let knowledge = Arc::new(KnowledgeBase::load(&config.storage).await);
    let data_dir = settings::data_dir(&config);
    tracing::info!("Regions are kept in {}", data_dir.display());

    let deps = SessionDeps {
        capture: Arc::new(XcapCapture::new()),
        recognizer: Arc::new(TesseractRecognizer::from_config(&config.ocr)),
        surfaces: Arc::new(ConsoleSurfaces::new()),
        regions: Arc::new(JsonRegionStore::new(data_dir)),
        search: Arc::new(FuzzySearch::new()),
        knowledge,
    };

    let controller = AppController::new(category.clone());
    let machine = SessionMachine::new(
        deps,
        SessionSettings::from_config(&config),
        controller.outcome_sender(),
    );
    let inputs = Inputs {
        console: true,
        hotkeys: config.hotkey.enabled && !args.no_hotkeys,
    };
    let mut tasks = controller.spawn_tasks(machine, inputs);

    // Ask the session for the region so the user knows whether `saved` works
    controller
        .command_sender()
        .send(tiku_types::Command::LoadRegion(category))
        .await?;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
            _ = controller.cancelled() => {
                tracing::info!("Shutdown requested from console");
                break;
            }
            joined = tasks.join_next() => match joined {
                Some(Ok(Ok(()))) => continue,
                Some(Ok(Err(e))) => {
                    tracing::error!("Task failed: {e:#}");
                    break;
                }
                Some(Err(e)) => {
                    tracing::error!("Task panicked: {e}");
                    break;
                }
                None => break,
            }
        }
    }

    controller.shutdown();
    if tokio::time::timeout(Duration::from_secs(2), async {
        while tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        tracing::warn!("Tasks did not stop in time, aborting");
        tasks.shutdown().await;
    }

    Ok(())
}
