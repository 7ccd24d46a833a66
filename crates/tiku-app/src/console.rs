use std::io::BufRead;

use anyhow::{Context, bail};
use kanal::{AsyncReceiver, AsyncSender};
use tiku_types::{Category, Command, LogicalRect};
use tokio_util::sync::CancellationToken;

pub const USAGE: &str = "\
commands:
  define [category]     pick and save the capture region
  recognize [category]  pick a region once and look it up
  saved [category]      look up the saved region
  select <x> <y> <w> <h>
                        finish the open selection (logical pixels)
  cancel                abort the open selection
  close                 close the answer
  load [category]       show the saved region
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Command(Command),
    Help,
    Quit,
}

fn number(token: Option<&str>, name: &str) -> anyhow::Result<f64> {
    let token = token.with_context(|| format!("missing {name}"))?;
    token
        .parse()
        .with_context(|| format!("{name} is not a number: {token}"))
}

/// Parse one console line; an omitted category means `default_category`
pub fn parse_line(line: &str, default_category: &Category) -> anyhow::Result<Option<ConsoleInput>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = tokens.split_first() else {
        return Ok(None);
    };
    let category = || {
        args.first()
            .map(|name| Category::from(*name))
            .unwrap_or_else(|| default_category.clone())
    };

    let input = match verb {
        "define" => ConsoleInput::Command(Command::RequestDefineRegion(category())),
        "recognize" => ConsoleInput::Command(Command::RequestRecognize(category())),
        "saved" => ConsoleInput::Command(Command::RecognizeWithSavedRegion(category())),
        "load" => ConsoleInput::Command(Command::LoadRegion(category())),
        "cancel" => ConsoleInput::Command(Command::CancelSelection),
        "close" => ConsoleInput::Command(Command::CloseAnswer),
        "select" => {
            let x = number(args.first().copied(), "x")?;
            let y = number(args.get(1).copied(), "y")?;
            let width = number(args.get(2).copied(), "width")?;
            let height = number(args.get(3).copied(), "height")?;
            ConsoleInput::Command(Command::SelectionCompleted(LogicalRect::new(
                x, y, width, height,
            )))
        }
        "help" | "?" => ConsoleInput::Help,
        "quit" | "exit" => ConsoleInput::Quit,
        other => bail!("unknown command: {other}"),
    };

    Ok(Some(input))
}

/// Forward stdin lines on a detached thread so a pending read never holds up
/// runtime shutdown
fn spawn_stdin_reader() -> AsyncReceiver<String> {
    let (line_tx, line_rx) = kanal::unbounded_async();
    let line_tx = line_tx.to_sync();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read console input: {e}");
                    break;
                }
            }
        }
    });

    line_rx
}

/// Read commands from stdin until EOF, `quit` or cancellation
pub async fn console_loop(
    default_category: Category,
    command_tx: AsyncSender<Command>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let lines = spawn_stdin_reader();
    println!("{USAGE}");

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.recv() => match line {
                Ok(line) => line,
                Err(_) => {
                    tracing::info!("Console input closed");
                    break;
                }
            },
        };

        match parse_line(&line, &default_category) {
            Ok(Some(ConsoleInput::Command(command))) => command_tx.send(command).await?,
            Ok(Some(ConsoleInput::Help)) => println!("{USAGE}"),
            Ok(Some(ConsoleInput::Quit)) => {
                tracing::info!("Quit requested from console");
                cancel.cancel();
                break;
            }
            Ok(None) => {}
            Err(e) => println!("{e:#}\n{USAGE}"),
        }
    }

    Ok(())
}
