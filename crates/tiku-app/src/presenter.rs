use kanal::AsyncReceiver;
use tiku_types::{Answer, AnswerPayload, MatchResult, Outcome, PhysicalRect};
use tokio_util::sync::CancellationToken;

/// Gap between the recognized region and the answer placed to its right
pub const ANSWER_GAP: u64 = 20;

const NOT_FOUND: &str = "未找到匹配答案";

/// Top-left corner, in physical pixels, where the answer goes
pub fn answer_anchor(region: PhysicalRect) -> (u64, u64) {
    (region.right() + ANSWER_GAP, region.top as u64)
}

fn match_lines(result: &MatchResult) -> Vec<String> {
    let entry = &result.entry;
    let mut lines = Vec::new();

    match &entry.answer {
        AnswerPayload::Simple { text } => {
            lines.push(format!("Q: {}", entry.question));
            lines.push(format!("A: {text}"));
        }
        AnswerPayload::OptionList { label, options } => {
            lines.push(match label {
                Some(label) => format!("Q: [{label}] {}", entry.question),
                None => format!("Q: {}", entry.question),
            });
            for option in options {
                let icon = if option.recommend { "✅" } else { "❌" };
                lines.push(format!("  {icon} {}", option.text));
                if !option.subtitle.is_empty() {
                    lines.push(format!("     {}", option.subtitle));
                }
            }
        }
    }

    lines.push(format!("({} match)", result.tier.as_str()));
    lines
}

pub fn render_answer(answer: &Answer) -> String {
    match answer {
        Answer::Found(result) => match_lines(result).join("\n"),
        Answer::NotFound { echoed_text } => format!("Q: {echoed_text}\n{NOT_FOUND}"),
    }
}

pub fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::RegionSaved { category, rect } => format!(
            "Saved {category} region: {}x{} at ({}, {})",
            rect.width, rect.height, rect.left, rect.top
        ),
        Outcome::RegionLoaded {
            category,
            rect: Some(rect),
        } => format!(
            "{category} region: {}x{} at ({}, {})",
            rect.width, rect.height, rect.left, rect.top
        ),
        Outcome::RegionLoaded {
            category,
            rect: None,
        }
        | Outcome::NoRegionConfigured(category) => {
            format!("No {category} region yet, run `define {category}` first")
        }
        Outcome::AnswerReady { answer, region } => {
            let (x, y) = answer_anchor(*region);
            format!("--- answer at ({x}, {y}) ---\n{}", render_answer(answer))
        }
        Outcome::RecognitionFailed { kind, reason } => format!("{kind:?} failed: {reason}"),
        Outcome::SelectionCancelled => "Selection cancelled".to_string(),
        Outcome::AnswerDismissed => "--- answer closed ---".to_string(),
    }
}

/// Print outcomes until the session stops producing them
pub async fn presenter_loop(
    outcomes: AsyncReceiver<Outcome>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = outcomes.recv() => match outcome {
                Ok(outcome) => outcome,
                Err(_) => break,
            },
        };

        match &outcome {
            Outcome::RecognitionFailed { .. } => tracing::warn!("{}", render(&outcome)),
            _ => tracing::debug!("Outcome: {outcome:?}"),
        }
        println!("{}", render(&outcome));
    }

    tracing::info!("Presenter stopped");
    Ok(())
}
