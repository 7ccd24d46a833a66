use std::time::Duration;

use kanal::AsyncSender;
use tiku_ocr::{HotkeyAction, HotkeyManager};
use tiku_types::{Category, Command};
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Commands a global shortcut stands for
pub fn commands_for(action: HotkeyAction, category: &Category) -> Vec<Command> {
    match action {
        HotkeyAction::RecognizeSaved => vec![Command::RecognizeWithSavedRegion(category.clone())],
        HotkeyAction::DefineRegion => vec![Command::RequestDefineRegion(category.clone())],
        HotkeyAction::Cancel => vec![Command::CancelSelection, Command::CloseAnswer],
    }
}

/// Poll global shortcuts on a blocking thread and forward their commands.
/// Failing to register shortcuts is logged and leaves the console usable.
pub async fn hotkey_listener(
    category: Category,
    command_tx: AsyncSender<Command>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let listener = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let hotkeys = match HotkeyManager::new() {
            Ok(hotkeys) => hotkeys,
            Err(e) => {
                tracing::error!("Failed to register hotkeys: {e:#}");
                return Ok(());
            }
        };
        tracing::info!("Hotkeys registered for {category} (Ctrl+Shift+S, Ctrl+Shift+D, Escape)");

        let tx = command_tx.as_sync();
        while !cancel.is_cancelled() {
            if let Some(action) = hotkeys.poll() {
                tracing::info!("Hotkey pressed: {action:?}");
                for command in commands_for(action, &category) {
                    tx.send(command)?;
                }
            }

            // Sleep briefly to avoid busy loop
            std::thread::sleep(POLL_INTERVAL);
        }

        tracing::info!("Hotkey listener stopping");
        Ok(())
    });

    listener.await?
}
