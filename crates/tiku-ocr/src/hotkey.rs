use anyhow::{Context, Result};
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    /// Recognize the saved region of the configured category
    RecognizeSaved,
    /// Start defining the region of the configured category
    DefineRegion,
    /// Abort a selection and close the answer
    Cancel,
}

/// Ctrl+Shift+S recognizes, Ctrl+Shift+D defines, Escape cancels
pub fn default_bindings() -> Vec<(HotKey, HotkeyAction)> {
    let ctrl_shift = Some(Modifiers::CONTROL | Modifiers::SHIFT);
    vec![
        (HotKey::new(ctrl_shift, Code::KeyS), HotkeyAction::RecognizeSaved),
        (HotKey::new(ctrl_shift, Code::KeyD), HotkeyAction::DefineRegion),
        (HotKey::new(None, Code::Escape), HotkeyAction::Cancel),
    ]
}

pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    bindings: Vec<(HotKey, HotkeyAction)>,
}

impl HotkeyManager {
    pub fn new() -> Result<Self> {
        Self::with_bindings(default_bindings())
    }

    pub fn with_bindings(bindings: Vec<(HotKey, HotkeyAction)>) -> Result<Self> {
        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;

        for (hotkey, action) in &bindings {
            manager
                .register(*hotkey)
                .with_context(|| format!("Failed to register hotkey for {action:?}"))?;
        }

        Ok(Self { manager, bindings })
    }

    /// Action of the next pressed hotkey, if any (non-blocking)
    pub fn poll(&self) -> Option<HotkeyAction> {
        let receiver = GlobalHotKeyEvent::receiver();
        while let Ok(event) = receiver.try_recv() {
            if event.state != HotKeyState::Pressed {
                continue;
            }
            match self.action_for(event.id) {
                Some(action) => return Some(action),
                None => tracing::debug!("Ignoring unknown hotkey id {}", event.id),
            }
        }
        None
    }

    fn action_for(&self, id: u32) -> Option<HotkeyAction> {
        self.bindings
            .iter()
            .find(|(hotkey, _)| hotkey.id() == id)
            .map(|(_, action)| *action)
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        for (hotkey, _) in &self.bindings {
            let _ = self.manager.unregister(*hotkey);
        }
    }
}
