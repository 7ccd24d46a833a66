use std::time::Duration;

use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Wait after hiding the main surface before the overlay opens
    Settle,
    /// Auto-dismiss of a presented answer
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub kind: TimerKind,
    generation: u64,
}

/// Single-shot cancellable timer delivering [`TimerFired`] on a channel.
///
/// Re-arming cancels the pending shot. A shot that fired before being
/// cancelled may still be sitting in the channel; [`Timer::accept`] rejects it
/// by generation, so at most one shot per arming is ever honored.
pub struct Timer {
    kind: TimerKind,
    generation: u64,
    token: Option<CancellationToken>,
    tx: AsyncSender<TimerFired>,
}

impl Timer {
    pub fn new(kind: TimerKind, tx: AsyncSender<TimerFired>) -> Self {
        Self {
            kind,
            generation: 0,
            token: None,
            tx,
        }
    }

    pub fn arm(&mut self, after: Duration) {
        self.cancel();
        self.generation += 1;

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        let fired = TimerFired {
            kind: self.kind,
            generation: self.generation,
        };

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(after) => {
                    let _ = tx.send(fired).await;
                }
            }
        });

        self.token = Some(token);
    }

    /// Returns whether a pending shot was cancelled
    pub fn cancel(&mut self) -> bool {
        match self.token.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.token.is_some()
    }

    /// True when `fired` is the live shot of this timer; disarms it
    pub fn accept(&mut self, fired: TimerFired) -> bool {
        if fired.kind == self.kind && fired.generation == self.generation && self.token.is_some() {
            self.token = None;
            true
        } else {
            false
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}
