//! Rendering of extraction results for the terminal.

use std::fmt::Write as _;

use quizgen_engine::{ExtractionResult, Question};

/// Renders one question in the same `Q<n>:` layout the model is asked for.
#[must_use]
pub fn render_question(number: usize, question: &Question) -> String {
    let mut out = format!("Q{number}: {}\n", question.text);
    for option in &question.options {
        let _ = writeln!(out, "{}) {}", option.label, option.text);
    }

    let labels: Vec<String> = question
        .correct_options()
        .map(|o| o.label.to_string())
        .collect();
    let heading = if labels.len() > 1 { "Answers" } else { "Answer" };
    let _ = writeln!(out, "{heading}: {}", labels.join(", "));

    if let Some(explanation) = &question.explanation {
        let _ = writeln!(out, "Explanation: {explanation}");
    }
    if let Some(source) = &question.source {
        let _ = writeln!(out, "Source: {source}");
    }
    out
}

/// Renders every question followed by a one-line run summary.
#[must_use]
pub fn render_text(result: &ExtractionResult) -> String {
    let mut out = String::new();
    for (i, question) in result.iter().enumerate() {
        out.push_str(&render_question(i + 1, question));
        out.push('\n');
    }
    let _ = write!(
        out,
        "{} questions from {} ({} attempts, {:.1}s)",
        result.len(),
        result.model_id,
        result.metrics.total_attempts,
        result.metrics.wall_time.as_secs_f64()
    );
    out
}

/// Renders the result as pretty-printed JSON.
///
/// # Errors
///
/// Returns the serializer error, which does not occur for well-formed results.
pub fn render_json(result: &ExtractionResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}
