//! Controller task lifecycle

use std::sync::Arc;
use std::time::Duration;

use tiku_config::Config;
use tiku_core::fuzzy::FuzzySearch;
use tiku_core::knowledge::KnowledgeBase;
use tiku_core::session::{SessionDeps, SessionMachine, SessionSettings};
use tiku_core::store::MemoryRegionStore;
use tiku_ocr::{TesseractRecognizer, XcapCapture};
use tiku_types::{Category, Command, SurfaceGeometry};
use tokio::time::timeout;

use crate::controller::{AppController, Inputs};
use crate::surface::ConsoleSurfaces;

fn identity_geometry() -> anyhow::Result<SurfaceGeometry> {
    Ok(SurfaceGeometry::default())
}

fn machine(controller: &AppController) -> SessionMachine {
    let deps = SessionDeps {
        capture: Arc::new(XcapCapture::new()),
        recognizer: Arc::new(TesseractRecognizer::new("chi_sim")),
        surfaces: Arc::new(ConsoleSurfaces::with_geometry(Box::new(identity_geometry))),
        regions: Arc::new(MemoryRegionStore::new()),
        search: Arc::new(FuzzySearch::new()),
        knowledge: Arc::new(KnowledgeBase::new()),
    };
    SessionMachine::new(
        deps,
        SessionSettings::from_config(&Config::default()),
        controller.outcome_sender(),
    )
}

const HEADLESS: Inputs = Inputs {
    console: false,
    hotkeys: false,
};

#[tokio::test]
async fn shutdown_stops_every_task() {
    let controller = AppController::new(Category::from("exam"));
    let mut tasks = controller.spawn_tasks(machine(&controller), HEADLESS);
    assert_eq!(tasks.len(), 2);

    controller.shutdown();

    let mut finished = 0;
    while let Some(joined) = timeout(Duration::from_secs(2), tasks.join_next())
        .await
        .expect("task did not stop")
    {
        joined.unwrap().unwrap();
        finished += 1;
    }
    assert_eq!(finished, 2);
}

#[tokio::test]
async fn commands_reach_the_running_session() {
    let controller = AppController::new(Category::from("exam"));
    let mut tasks = controller.spawn_tasks(machine(&controller), HEADLESS);

    // Neither command touches a screen or an OCR engine
    let commands = controller.command_sender();
    commands.send(Command::LoadRegion(Category::from("exam"))).await.unwrap();
    commands.send(Command::CancelSelection).await.unwrap();
    commands.send(Command::CloseAnswer).await.unwrap();

    timeout(Duration::from_secs(2), async {
        while !commands.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session did not drain its commands");

    controller.shutdown();
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }
}
