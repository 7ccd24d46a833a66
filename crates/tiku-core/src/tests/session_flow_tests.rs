//! Session transitions driven command by command

use tiku_types::{
    Answer, AnswerPayload, CaptureMode, Command, FailureKind, LogicalRect, MatchTier, Outcome,
    PhysicalRect,
};

use super::fakes::{FakeCapture, FakeRecognizer, Harness, Script, exam};
use crate::session::{SessionMachine, SessionState};
use crate::store::{JsonRegionStore, RegionStore};

/// Request a selection and let the settle delay pass
async fn open_selection(machine: &mut SessionMachine, command: Command) {
    machine.handle(command).await;
    assert!(matches!(machine.state(), SessionState::SelectionRequested(_)));
    machine.on_next_timer().await;
    assert!(matches!(machine.state(), SessionState::SelectionActive { .. }));
}

fn expect_failure(outcome: Outcome, expected: FailureKind) -> String {
    match outcome {
        Outcome::RecognitionFailed { kind, reason } => {
            assert_eq!(kind, expected, "unexpected failure: {reason}");
            reason
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

fn found_text(answer: &Answer) -> (&str, MatchTier) {
    match answer {
        Answer::Found(result) => match &result.entry.answer {
            AnswerPayload::Simple { text } => (text.as_str(), result.tier),
            other => panic!("unexpected payload {other:?}"),
        },
        Answer::NotFound { echoed_text } => panic!("no match for {echoed_text}"),
    }
}

#[tokio::test(start_paused = true)]
async fn defined_region_is_transformed_and_saved() {
    let harness = Harness::new(FakeRecognizer::text(""));
    let (mut machine, outcomes) = harness.machine();

    open_selection(&mut machine, Command::RequestDefineRegion(exam())).await;
    machine
        .handle(Command::SelectionCompleted(LogicalRect::new(20.0, 10.0, 200.0, 80.0)))
        .await;

    let expected = PhysicalRect::new(240, 120, 400, 160);
    assert_eq!(
        outcomes.recv().await.unwrap(),
        Outcome::RegionSaved {
            category: exam(),
            rect: expected
        }
    );
    assert_eq!(harness.regions.load(&exam()).await, Some(expected));
    assert_eq!(machine.state(), &SessionState::Idle);
    assert_eq!(
        harness.surfaces.calls(),
        vec!["hide_primary", "open_selection", "close_selection", "show_primary"]
    );
    assert_eq!(harness.capture.capture_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn saved_region_resolves_recognized_question() {
    let harness = Harness::new(FakeRecognizer::text("  天龙八部的创始人是谁 \n"));
    let region = PhysicalRect::new(240, 120, 400, 160);
    harness.regions.save(&exam(), region).await.unwrap();
    let (mut machine, outcomes) = harness.machine();

    machine
        .handle(Command::RecognizeWithSavedRegion(exam()))
        .await;

    let Outcome::AnswerReady { answer, region: at } = outcomes.recv().await.unwrap() else {
        panic!("expected an answer");
    };
    assert_eq!(found_text(&answer), ("段正明", MatchTier::Exact));
    assert_eq!(at, region);
    assert_eq!(harness.capture.cropped(), vec![region]);
    assert_eq!(
        harness.recognizer.packs.lock().unwrap().clone(),
        vec![harness.settings.language_pack.clone()]
    );
    // No overlay is involved
    assert!(harness.surfaces.calls().is_empty());
    assert_eq!(machine.state(), &SessionState::Idle);
    assert!(machine.answer_visible());
}

#[tokio::test(start_paused = true)]
async fn saved_recognize_without_region_never_captures() {
    let harness = Harness::new(FakeRecognizer::text("天龙八部的创始人是谁"));
    let (mut machine, outcomes) = harness.machine();

    machine
        .handle(Command::RecognizeWithSavedRegion(exam()))
        .await;

    assert_eq!(
        outcomes.recv().await.unwrap(),
        Outcome::NoRegionConfigured(exam())
    );
    assert_eq!(harness.capture.capture_count(), 0);
    assert_eq!(machine.state(), &SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn recognize_request_without_region_never_captures() {
    let harness = Harness::new(FakeRecognizer::text("天龙八部的创始人是谁"));
    let (mut machine, outcomes) = harness.machine();

    machine.handle(Command::RequestRecognize(exam())).await;

    assert_eq!(
        outcomes.recv().await.unwrap(),
        Outcome::NoRegionConfigured(exam())
    );
    assert_eq!(harness.capture.capture_count(), 0);
    assert!(harness.surfaces.calls().is_empty());
    assert_eq!(machine.state(), &SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn ad_hoc_selection_recognizes_transformed_rect() {
    let harness = Harness::new(FakeRecognizer::text("天龙八部的创始人是谁"));
    let saved = PhysicalRect::new(0, 0, 10, 10);
    harness.regions.save(&exam(), saved).await.unwrap();
    let (mut machine, outcomes) = harness.machine();

    open_selection(&mut machine, Command::RequestRecognize(exam())).await;
    machine
        .handle(Command::SelectionCompleted(LogicalRect::new(20.0, 10.0, 200.0, 80.0)))
        .await;

    let Outcome::AnswerReady { answer, region } = outcomes.recv().await.unwrap() else {
        panic!("expected an answer");
    };
    assert_eq!(found_text(&answer).0, "段正明");
    assert_eq!(region, PhysicalRect::new(240, 120, 400, 160));
    assert_eq!(harness.capture.cropped(), vec![region]);
    // Ad hoc selections leave the saved region alone
    assert_eq!(harness.regions.load(&exam()).await, Some(saved));
}

#[tokio::test(start_paused = true)]
async fn unmatched_text_is_echoed_normalized() {
    let harness = Harness::new(FakeRecognizer::text(" 完全 无关的问题\n"));
    harness
        .regions
        .save(&exam(), PhysicalRect::new(0, 0, 10, 10))
        .await
        .unwrap();
    let (mut machine, outcomes) = harness.machine();

    machine
        .handle(Command::RecognizeWithSavedRegion(exam()))
        .await;

    let Outcome::AnswerReady { answer, .. } = outcomes.recv().await.unwrap() else {
        panic!("expected an answer");
    };
    assert_eq!(
        answer,
        Answer::NotFound {
            echoed_text: "完全无关的问题".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_only_applies_to_an_open_selection() {
    let harness = Harness::new(FakeRecognizer::text(""));
    let (mut machine, outcomes) = harness.machine();

    machine.handle(Command::CancelSelection).await;
    assert_eq!(machine.state(), &SessionState::Idle);

    machine.handle(Command::RequestDefineRegion(exam())).await;
    machine.handle(Command::CancelSelection).await;
    assert!(matches!(machine.state(), SessionState::SelectionRequested(_)));
    assert!(outcomes.try_recv().unwrap().is_none());

    machine.on_next_timer().await;
    machine.handle(Command::CancelSelection).await;

    assert_eq!(outcomes.recv().await.unwrap(), Outcome::SelectionCancelled);
    assert_eq!(machine.state(), &SessionState::Idle);
    assert_eq!(
        harness.surfaces.calls(),
        vec!["hide_primary", "open_selection", "close_selection", "show_primary"]
    );
    assert_eq!(harness.regions.load(&exam()).await, None);
}

#[tokio::test(start_paused = true)]
async fn requests_while_selecting_are_ignored() {
    let harness = Harness::new(FakeRecognizer::text("天龙八部的创始人是谁"));
    harness
        .regions
        .save(&exam(), PhysicalRect::new(0, 0, 10, 10))
        .await
        .unwrap();
    let (mut machine, outcomes) = harness.machine();

    open_selection(&mut machine, Command::RequestDefineRegion(exam())).await;
    machine.handle(Command::RequestRecognize(exam())).await;
    machine
        .handle(Command::RecognizeWithSavedRegion(exam()))
        .await;

    let SessionState::SelectionActive { session, .. } = machine.state() else {
        panic!("selection should still be active");
    };
    assert_eq!(session.mode, CaptureMode::DefineRegion);
    assert_eq!(harness.capture.capture_count(), 0);
    assert!(outcomes.try_recv().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn completion_outside_selection_is_ignored() {
    let harness = Harness::new(FakeRecognizer::text(""));
    let (mut machine, outcomes) = harness.machine();

    machine
        .handle(Command::SelectionCompleted(LogicalRect::new(0.0, 0.0, 10.0, 10.0)))
        .await;

    assert_eq!(machine.state(), &SessionState::Idle);
    assert!(outcomes.try_recv().unwrap().is_none());
    assert!(harness.surfaces.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_area_selection_fails_without_saving() {
    let harness = Harness::new(FakeRecognizer::text(""));
    let (mut machine, outcomes) = harness.machine();

    open_selection(&mut machine, Command::RequestDefineRegion(exam())).await;
    machine
        .handle(Command::SelectionCompleted(LogicalRect::new(20.0, 10.0, 0.0, 80.0)))
        .await;

    expect_failure(outcomes.recv().await.unwrap(), FailureKind::Selection);
    assert_eq!(harness.regions.load(&exam()).await, None);
    assert_eq!(machine.state(), &SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn selection_left_of_the_screen_fails() {
    let harness = Harness::new(FakeRecognizer::text(""));
    harness
        .regions
        .save(&exam(), PhysicalRect::new(0, 0, 10, 10))
        .await
        .unwrap();
    let (mut machine, outcomes) = harness.machine();

    open_selection(&mut machine, Command::RequestRecognize(exam())).await;
    machine
        .handle(Command::SelectionCompleted(LogicalRect::new(-200.0, 10.0, 50.0, 50.0)))
        .await;

    expect_failure(outcomes.recv().await.unwrap(), FailureKind::Selection);
    assert_eq!(harness.capture.capture_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn capture_failure_is_reported() {
    let mut harness = Harness::new(FakeRecognizer::text("天龙八部的创始人是谁"));
    harness.capture = std::sync::Arc::new(FakeCapture::failing("no display"));
    harness
        .regions
        .save(&exam(), PhysicalRect::new(0, 0, 10, 10))
        .await
        .unwrap();
    let (mut machine, outcomes) = harness.machine();

    machine
        .handle(Command::RecognizeWithSavedRegion(exam()))
        .await;

    let reason = expect_failure(outcomes.recv().await.unwrap(), FailureKind::Capture);
    assert!(reason.contains("no display"));
    assert_eq!(machine.state(), &SessionState::Idle);
    assert!(!machine.answer_visible());
}

#[tokio::test(start_paused = true)]
async fn recognition_failures_are_reported() {
    let harness = Harness::new(FakeRecognizer::new(vec![
        Script::Fail("engine crashed".to_string()),
        Script::Text(" \n\u{FEFF} ".to_string()),
    ]));
    harness
        .regions
        .save(&exam(), PhysicalRect::new(0, 0, 10, 10))
        .await
        .unwrap();
    let (mut machine, outcomes) = harness.machine();

    machine
        .handle(Command::RecognizeWithSavedRegion(exam()))
        .await;
    let reason = expect_failure(outcomes.recv().await.unwrap(), FailureKind::Recognition);
    assert!(reason.contains("engine crashed"));

    // Whitespace only normalizes to nothing
    machine
        .handle(Command::RecognizeWithSavedRegion(exam()))
        .await;
    let reason = expect_failure(outcomes.recv().await.unwrap(), FailureKind::Recognition);
    assert_eq!(reason, "No text recognized");
}

#[tokio::test(start_paused = true)]
async fn load_region_reports_current_region() {
    let harness = Harness::new(FakeRecognizer::text(""));
    let (mut machine, outcomes) = harness.machine();

    machine.handle(Command::LoadRegion(exam())).await;
    assert_eq!(
        outcomes.recv().await.unwrap(),
        Outcome::RegionLoaded {
            category: exam(),
            rect: None
        }
    );

    harness
        .regions
        .save(&exam(), PhysicalRect::new(1, 2, 3, 4))
        .await
        .unwrap();
    machine.handle(Command::LoadRegion(exam())).await;
    assert_eq!(
        outcomes.recv().await.unwrap(),
        Outcome::RegionLoaded {
            category: exam(),
            rect: Some(PhysicalRect::new(1, 2, 3, 4))
        }
    );
}

#[tokio::test]
async fn saved_region_survives_restart() {
    let dir = std::env::temp_dir().join(format!("tiku-session-{}", uuid::Uuid::new_v4()));

    let mut first = Harness::new(FakeRecognizer::text(""));
    first.regions = std::sync::Arc::new(JsonRegionStore::new(&dir));
    let (mut machine, outcomes) = first.machine();
    open_selection(&mut machine, Command::RequestDefineRegion(exam())).await;
    machine
        .handle(Command::SelectionCompleted(LogicalRect::new(12.0, 8.8, 300.2, 99.8)))
        .await;
    let Outcome::RegionSaved { rect: saved, .. } = outcomes.recv().await.unwrap() else {
        panic!("expected the region to be saved");
    };
    drop(machine);

    let mut second = Harness::new(FakeRecognizer::text("天龙八部的创始人是谁"));
    second.regions = std::sync::Arc::new(JsonRegionStore::new(&dir));
    let (mut machine, outcomes) = second.machine();
    machine
        .handle(Command::RecognizeWithSavedRegion(exam()))
        .await;

    assert!(matches!(
        outcomes.recv().await.unwrap(),
        Outcome::AnswerReady { region, .. } if region == saved
    ));
    assert_eq!(second.capture.cropped(), vec![saved]);

    let _ = std::fs::remove_dir_all(dir);
}
