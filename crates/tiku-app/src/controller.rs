use kanal::{AsyncReceiver, AsyncSender};
use tiku_core::session::SessionMachine;
use tiku_types::{Category, Command, Outcome};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::console::console_loop;
use crate::io::hotkey_listener;
use crate::presenter::presenter_loop;

/// Centralized channel management
pub struct ChannelSet {
    pub commands: (AsyncSender<Command>, AsyncReceiver<Command>),
    pub outcomes: (AsyncSender<Outcome>, AsyncReceiver<Outcome>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            commands: kanal::bounded_async(64),  // Console and hotkeys
            outcomes: kanal::bounded_async(256), // Presenter
        }
    }
}

/// Which inputs feed the session
#[derive(Debug, Clone, Copy)]
pub struct Inputs {
    pub console: bool,
    pub hotkeys: bool,
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    category: Category,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(category: Category) -> Self {
        Self {
            channels: ChannelSet::new(),
            category,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn outcome_sender(&self) -> AsyncSender<Outcome> {
        self.channels.outcomes.0.clone()
    }

    pub fn command_sender(&self) -> AsyncSender<Command> {
        self.channels.commands.0.clone()
    }

    pub fn spawn_tasks(&self, machine: SessionMachine, inputs: Inputs) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Session
        let commands = self.channels.commands.1.clone();
        let session_cancel = self.cancel_token.child_token();
        tasks.spawn(async move {
            machine.run(commands, session_cancel).await;
            Ok(())
        });

        // Presenter
        tasks.spawn(presenter_loop(
            self.channels.outcomes.1.clone(),
            self.cancel_token.child_token(),
        ));

        // Console may request a full shutdown, so it gets the root token
        if inputs.console {
            tasks.spawn(console_loop(
                self.category.clone(),
                self.command_sender(),
                self.cancel_token.clone(),
            ));
        }

        if inputs.hotkeys {
            tasks.spawn(hotkey_listener(
                self.category.clone(),
                self.command_sender(),
                self.cancel_token.child_token(),
            ));
        }

        tasks
    }

    pub async fn cancelled(&self) {
        self.cancel_token.cancelled().await
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
