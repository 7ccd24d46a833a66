use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use tiku_config::Config;
use tiku_config::matching::MatchConfig;
use tiku_types::{
    Answer, CaptureMode, Category, Command, LogicalRect, Outcome, PhysicalRect, SurfaceGeometry,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::backend::{ScreenCapture, Surfaces, TextRecognizer};
use crate::error::{RecognitionError, SessionError};
use crate::fuzzy::ApproximateSearch;
use crate::knowledge::KnowledgeBase;
use crate::matcher::MatchCascade;
use crate::preprocess::normalize;
use crate::region::transform;
use crate::store::RegionStore;
use crate::timer::{Timer, TimerFired, TimerKind};

/// Collaborators the session drives
#[derive(Clone)]
pub struct SessionDeps {
    pub capture: Arc<dyn ScreenCapture>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub surfaces: Arc<dyn Surfaces>,
    pub regions: Arc<dyn RegionStore>,
    pub search: Arc<dyn ApproximateSearch>,
    pub knowledge: Arc<KnowledgeBase>,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub settle_delay: Duration,
    pub answer_dismiss: Duration,
    pub language_pack: PathBuf,
    pub recognition_timeout: Option<Duration>,
    pub matching: MatchConfig,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            settle_delay: config.session.settle_delay(),
            answer_dismiss: config.session.answer_dismiss(),
            language_pack: config.ocr.tessdata_dir.clone(),
            recognition_timeout: config.ocr.recognition_timeout(),
            matching: config.matching.clone(),
        }
    }
}

/// One interaction, from capture request until it concludes
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSession {
    pub id: Uuid,
    pub category: Category,
    pub mode: CaptureMode,
}

impl CaptureSession {
    pub fn new(category: Category, mode: CaptureMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    SelectionRequested(CaptureSession),
    SelectionActive {
        session: CaptureSession,
        geometry: SurfaceGeometry,
    },
    Resolving {
        session: CaptureSession,
        rect: PhysicalRect,
    },
}

/// Capture lifecycle: selection request, selection, then either saving the
/// region or running capture, recognition and lookup.
///
/// Only one session exists at a time. Cancellation is honored while the
/// selection overlay is up; once resolving starts the pipeline runs to the
/// end. Every failure becomes an [`Outcome`] and the machine returns to idle.
pub struct SessionMachine {
    deps: SessionDeps,
    settings: SessionSettings,
    cascade: MatchCascade,
    state: SessionState,
    outcomes: AsyncSender<Outcome>,
    settle: Timer,
    dismiss: Timer,
    timers: AsyncReceiver<TimerFired>,
}

impl SessionMachine {
    pub fn new(deps: SessionDeps, settings: SessionSettings, outcomes: AsyncSender<Outcome>) -> Self {
        let (timer_tx, timers) = kanal::unbounded_async();
        let cascade = MatchCascade::new(settings.matching.clone(), deps.search.clone());

        Self {
            deps,
            settings,
            cascade,
            state: SessionState::Idle,
            outcomes,
            settle: Timer::new(TimerKind::Settle, timer_tx.clone()),
            dismiss: Timer::new(TimerKind::Dismiss, timer_tx),
            timers,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether an answer is currently presented and waiting for dismissal
    pub fn answer_visible(&self) -> bool {
        self.dismiss.is_armed()
    }

    /// Process commands and timer shots until the command channel closes or
    /// `shutdown` is cancelled
    pub async fn run(mut self, commands: AsyncReceiver<Command>, shutdown: CancellationToken) {
        let timers = self.timers.clone();

        tracing::info!("[SESSION] Waiting for commands");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("[SESSION] Shutdown requested");
                    break;
                }
                command = commands.recv() => match command {
                    Ok(command) => self.handle(command).await,
                    Err(_) => {
                        tracing::info!("[SESSION] Command channel closed");
                        break;
                    }
                },
                fired = timers.recv() => {
                    if let Ok(fired) = fired {
                        self.on_timer(fired).await;
                    }
                }
            }
        }
    }

    pub async fn handle(&mut self, command: Command) {
        tracing::debug!("[SESSION] Command: {command:?}");

        match command {
            Command::RequestDefineRegion(category) => {
                self.request_selection(category, CaptureMode::DefineRegion)
            }
            Command::RequestRecognize(category) => self.request_recognize(category).await,
            Command::CancelSelection => self.cancel_selection().await,
            Command::SelectionCompleted(rect) => self.complete_selection(rect).await,
            Command::RecognizeWithSavedRegion(category) => self.recognize_saved(category).await,
            Command::LoadRegion(category) => {
                let rect = self.deps.regions.load(&category).await;
                self.emit(Outcome::RegionLoaded { category, rect }).await;
            }
            Command::CloseAnswer => {
                if self.dismiss.cancel() {
                    self.emit(Outcome::AnswerDismissed).await;
                }
            }
        }
    }

    /// Wait for the next timer shot and act on it
    #[cfg(test)]
    pub(crate) async fn on_next_timer(&mut self) {
        if let Ok(fired) = self.timers.recv().await {
            self.on_timer(fired).await;
        }
    }

    async fn on_timer(&mut self, fired: TimerFired) {
        match fired.kind {
            TimerKind::Settle => {
                if !self.settle.accept(fired) {
                    return;
                }
                let SessionState::SelectionRequested(session) =
                    std::mem::replace(&mut self.state, SessionState::Idle)
                else {
                    return;
                };

                let geometry = self.deps.surfaces.open_selection();
                tracing::info!(
                    "[SESSION {}] Selection overlay open at {:?}",
                    session.id,
                    geometry
                );
                self.state = SessionState::SelectionActive { session, geometry };
            }
            TimerKind::Dismiss => {
                if self.dismiss.accept(fired) {
                    tracing::debug!("[SESSION] Answer auto-dismissed");
                    self.emit(Outcome::AnswerDismissed).await;
                }
            }
        }
    }

    fn request_selection(&mut self, category: Category, mode: CaptureMode) {
        if self.state != SessionState::Idle {
            tracing::warn!("[SESSION] Ignoring {mode:?} request for {category}: session busy");
            return;
        }

        let session = CaptureSession::new(category, mode);
        tracing::info!(
            "[SESSION {}] {:?} requested for {}",
            session.id,
            session.mode,
            session.category
        );

        self.deps.surfaces.hide_primary();
        self.state = SessionState::SelectionRequested(session);
        self.settle.arm(self.settings.settle_delay);
    }

    /// Recognizing is only offered once the category has a region
    async fn request_recognize(&mut self, category: Category) {
        if self.state != SessionState::Idle {
            tracing::warn!("[SESSION] Ignoring recognize request for {category}: session busy");
            return;
        }

        if self.deps.regions.load(&category).await.is_none() {
            tracing::info!("[SESSION] No region configured for {category}");
            self.emit(Outcome::NoRegionConfigured(category)).await;
            return;
        }

        self.request_selection(category, CaptureMode::Recognize);
    }

    async fn cancel_selection(&mut self) {
        let SessionState::SelectionActive { session, .. } = &self.state else {
            tracing::debug!("[SESSION] Cancel ignored outside selection");
            return;
        };

        tracing::info!("[SESSION {}] Selection cancelled", session.id);
        self.deps.surfaces.close_selection();
        self.deps.surfaces.show_primary();
        self.state = SessionState::Idle;
        self.emit(Outcome::SelectionCancelled).await;
    }

    async fn complete_selection(&mut self, selection: LogicalRect) {
        let (session, geometry) = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::SelectionActive { session, geometry } => (session, geometry),
            other => {
                tracing::warn!("[SESSION] Selection completed outside selection, ignoring");
                self.state = other;
                return;
            }
        };

        self.deps.surfaces.close_selection();
        self.deps.surfaces.show_primary();

        let rect = match transform(selection, geometry.origin, geometry.scale) {
            Ok(rect) if rect.is_empty() => Err(SessionError::EmptySelection),
            Ok(rect) => Ok(rect),
            Err(e) => Err(e.into()),
        };
        tracing::debug!(
            "[SESSION {}] {selection:?} at {geometry:?} -> {rect:?}",
            session.id
        );

        match rect {
            Ok(rect) => self.resolve(session, rect).await,
            Err(e) => self.fail(&session, e).await,
        }
        self.state = SessionState::Idle;
    }

    async fn recognize_saved(&mut self, category: Category) {
        if self.state != SessionState::Idle {
            tracing::warn!("[SESSION] Ignoring saved-region recognize for {category}: session busy");
            return;
        }

        let Some(rect) = self.deps.regions.load(&category).await else {
            tracing::info!("[SESSION] No region configured for {category}");
            self.emit(Outcome::NoRegionConfigured(category)).await;
            return;
        };

        let session = CaptureSession::new(category, CaptureMode::Recognize);
        self.resolve(session, rect).await;
        self.state = SessionState::Idle;
    }

    async fn resolve(&mut self, session: CaptureSession, rect: PhysicalRect) {
        self.state = SessionState::Resolving {
            session: session.clone(),
            rect,
        };

        match session.mode {
            CaptureMode::DefineRegion => {
                if let Err(e) = self.deps.regions.save(&session.category, rect).await {
                    // The store keeps the region active for this process
                    tracing::warn!("[SESSION {}] Failed to persist region: {e}", session.id);
                }
                self.emit(Outcome::RegionSaved {
                    category: session.category,
                    rect,
                })
                .await;
            }
            CaptureMode::Recognize => match self.recognize(&session, rect).await {
                Ok(answer) => self.present(answer, rect).await,
                Err(e) => self.fail(&session, e).await,
            },
        }
    }

    async fn recognize(
        &self,
        session: &CaptureSession,
        rect: PhysicalRect,
    ) -> Result<Answer, SessionError> {
        let screen = self.deps.capture.capture_full_screen().await?;
        tracing::debug!("[SESSION {}] Captured {} bytes", session.id, screen.len());

        let cropped = self.deps.capture.crop(screen, rect).await?;
        let raw = self.recognize_text(&cropped).await?;
        let query = normalize(&raw);
        tracing::info!("[SESSION {}] Recognized: {query}", session.id);

        if query.is_empty() {
            return Err(RecognitionError::NoText.into());
        }

        let corpus = self.deps.knowledge.corpus(&session.category);
        Ok(match self.cascade.resolve(&query, &corpus) {
            Some(found) => Answer::Found(found),
            None => Answer::NotFound { echoed_text: query },
        })
    }

    async fn recognize_text(&self, image: &[u8]) -> Result<String, RecognitionError> {
        let recognition = self
            .deps
            .recognizer
            .recognize(image, &self.settings.language_pack);

        match self.settings.recognition_timeout {
            Some(limit) => tokio::time::timeout(limit, recognition)
                .await
                .map_err(|_| RecognitionError::Timeout(limit))?,
            None => recognition.await,
        }
    }

    async fn present(&mut self, answer: Answer, region: PhysicalRect) {
        // A newer answer replaces the old one along with its dismiss timer
        self.dismiss.arm(self.settings.answer_dismiss);
        self.emit(Outcome::AnswerReady { answer, region }).await;
    }

    async fn fail(&self, session: &CaptureSession, error: SessionError) {
        tracing::warn!("[SESSION {}] Failed: {error}", session.id);

        self.emit(Outcome::RecognitionFailed {
            kind: error.kind(),
            reason: error.to_string(),
        })
        .await;
    }

    async fn emit(&self, outcome: Outcome) {
        if let Err(e) = self.outcomes.send(outcome).await {
            tracing::error!("[SESSION] Failed to deliver outcome: {e}");
        }
    }
}
