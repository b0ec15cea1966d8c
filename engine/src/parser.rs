//! Parser for the textual question format returned by the model.
//!
//! ```text
//! Q1: Which organelle produces ATP?
//! A) Nucleus
//! B) Mitochondrion
//! C) Ribosome
//! Answer: B
//! Explanation: Oxidative phosphorylation happens in the mitochondria.
//! Source: Section 2.1
//! ```
//!
//! A block starts at `Q<n>:`, `Question <n>:` or `Q:`. Options are
//! `<letter>)` or `<letter>.` lines with ascending labels, and only count
//! before the `Answer:` line. Correct options are named only by the
//! `Answer:`/`Answers:` line. Lines that match nothing continue the field
//! above them until a blank line. Text before the first block is ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One labeled choice of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Upper-case letter label (`A`, `B`, ...).
    pub label: char,
    /// Option text, verbatim apart from surrounding whitespace.
    pub text: String,
    /// Whether the `Answer:` line named this option.
    pub is_correct: bool,
}

/// A multiple-choice question parsed from model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text.
    pub text: String,
    /// Options in the order the model listed them.
    pub options: Vec<QuestionOption>,
    /// Optional explanation of the answer.
    pub explanation: Option<String>,
    /// Optional reference into the source document.
    pub source: Option<String>,
}

impl Question {
    /// Options flagged correct.
    pub fn correct_options(&self) -> impl Iterator<Item = &QuestionOption> {
        self.options.iter().filter(|o| o.is_correct)
    }

    /// Whether more than one option is correct.
    #[must_use]
    pub fn is_multiple_answer(&self) -> bool {
        self.correct_options().count() > 1
    }
}

/// Why model output could not be turned into questions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No `Q<n>:` block was found.
    #[error("no question blocks found")]
    NoQuestions,

    /// A block violated the format.
    #[error("question {index}: {reason}")]
    InvalidBlock {
        /// 1-indexed block position.
        index: usize,
        /// What was wrong.
        reason: String,
    },
}

/// Parse model output into questions.
///
/// # Errors
///
/// Returns `ParseError::NoQuestions` when no block is found, and
/// `ParseError::InvalidBlock` for a block with fewer than two options,
/// duplicate or out-of-order labels, a missing or repeated `Answer:` line, an answer naming
/// an unknown option, or an answer marking every option correct.
///
/// # Examples
///
/// ```
/// use quizgen_engine::parse_questions;
///
/// let text = "Q1: 2 + 2?\nA) 3\nB) 4\nAnswer: B";
/// let questions = parse_questions(text).unwrap();
/// assert_eq!(questions[0].correct_options().next().unwrap().text, "4");
/// ```
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, ParseError> {
    let text = strip_code_fences(raw);
    let mut blocks: Vec<BlockBuilder> = Vec::new();
    let mut field = Field::None;

    for line in text.lines() {
        let line = line.trim();

        if line.is_empty() {
            field = Field::None;
            continue;
        }

        if let Some(body) = question_header(line) {
            blocks.push(BlockBuilder::new(body));
            field = Field::Question;
            continue;
        }

        let Some(block) = blocks.last_mut() else {
            continue;
        };

        // Once the answer is given, option-shaped lines ("C. Lincoln said") are prose.
        let option = if block.answers.is_empty() {
            option_line(line)
        } else {
            None
        };

        if let Some((label, body)) = option {
            block.options.push((label, body.to_string()));
            field = Field::Option;
        } else if let Some(value) = labeled_value(line, &["Answers", "Answer"]) {
            block.answers.push(value.to_string());
            field = Field::None;
        } else if let Some(value) = labeled_value(line, &["Explanation"]) {
            block.explanation = Some(value.to_string());
            field = Field::Explanation;
        } else if let Some(value) = labeled_value(line, &["Source"]) {
            block.source = Some(value.to_string());
            field = Field::Source;
        } else {
            block.continue_field(field, line);
        }
    }

    if blocks.is_empty() {
        return Err(ParseError::NoQuestions);
    }

    blocks
        .into_iter()
        .enumerate()
        .map(|(i, block)| block.build(i + 1))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Question,
    Option,
    Explanation,
    Source,
}

#[derive(Debug, Default)]
struct BlockBuilder {
    text: String,
    options: Vec<(char, String)>,
    answers: Vec<String>,
    explanation: Option<String>,
    source: Option<String>,
}

impl BlockBuilder {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    fn continue_field(&mut self, field: Field, line: &str) {
        let target = match field {
            Field::None => return,
            Field::Question => &mut self.text,
            Field::Option => match self.options.last_mut() {
                Some((_, text)) => text,
                None => return,
            },
            Field::Explanation => match self.explanation.as_mut() {
                Some(text) => text,
                None => return,
            },
            Field::Source => match self.source.as_mut() {
                Some(text) => text,
                None => return,
            },
        };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(line);
    }

    fn build(self, index: usize) -> Result<Question, ParseError> {
        let invalid = |reason: String| ParseError::InvalidBlock { index, reason };

        if self.text.is_empty() {
            return Err(invalid("question text is empty".to_string()));
        }
        if self.options.len() < 2 {
            return Err(invalid(format!(
                "expected at least 2 options, found {}",
                self.options.len()
            )));
        }
        for (i, (label, _)) in self.options.iter().enumerate() {
            if self.options[..i].iter().any(|(seen, _)| seen == label) {
                return Err(invalid(format!("option {label} appears more than once")));
            }
        }
        if let Some(pair) = self.options.windows(2).find(|pair| pair[1].0 < pair[0].0) {
            return Err(invalid(format!(
                "option {} comes after option {}",
                pair[1].0, pair[0].0
            )));
        }

        let answer = match self.answers.as_slice() {
            [] => return Err(invalid("missing Answer line".to_string())),
            [answer] => answer,
            _ => return Err(invalid("more than one Answer line".to_string())),
        };
        let correct = parse_answer_labels(answer).map_err(invalid)?;
        if let Some(unknown) = correct
            .iter()
            .find(|label| !self.options.iter().any(|(l, _)| l == *label))
        {
            return Err(invalid(format!("answer {unknown} is not one of the options")));
        }
        if correct.len() == self.options.len() {
            return Err(invalid("every option is marked correct".to_string()));
        }

        let options = self
            .options
            .into_iter()
            .map(|(label, text)| QuestionOption {
                is_correct: correct.contains(&label),
                label,
                text,
            })
            .collect();

        Ok(Question {
            text: self.text,
            options,
            explanation: self.explanation.filter(|e| !e.is_empty()),
            source: self.source.filter(|s| !s.is_empty()),
        })
    }
}

/// Recognizes `Q1: text`, `Q1. text`, `Question 3) text` and `Q: text`.
fn question_header(line: &str) -> Option<&str> {
    let line = line.trim_start_matches(['*', '#']).trim_start();
    let after = line
        .strip_prefix("Question")
        .or_else(|| line.strip_prefix('Q'))?
        .trim_start();
    let digits_end = after
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after.len());
    let (digits, tail) = after.split_at(digits_end);
    let body = if digits.is_empty() {
        tail.strip_prefix(':')?
    } else {
        tail.strip_prefix([':', '.', ')'])?
    };
    Some(body.trim_start_matches('*').trim())
}

/// Recognizes `A) text`, `b. text` and `(C) text`; labels are upper-cased.
fn option_line(line: &str) -> Option<(char, &str)> {
    let line = line.strip_prefix('(').unwrap_or(line);
    let mut chars = line.chars();
    let label = chars.next().filter(char::is_ascii_alphabetic)?;
    let rest = chars.as_str().strip_prefix([')', '.'])?;
    if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    Some((label.to_ascii_uppercase(), rest.trim()))
}

/// Returns the value after `Label:` for any of `labels`, case-insensitively.
fn labeled_value<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    let line = line.trim_start_matches('*');
    labels.iter().find_map(|label| {
        let head = line.get(..label.len())?;
        if !head.eq_ignore_ascii_case(label) {
            return None;
        }
        let rest = line[label.len()..].trim_start_matches('*');
        rest.strip_prefix(':')
            .map(|value| value.trim_start_matches('*').trim())
    })
}

/// Splits `B`, `A, C`, `A and C` or `B) Paris` into option labels.
fn parse_answer_labels(answer: &str) -> Result<Vec<char>, String> {
    let normalized = answer.replace(" and ", ",");
    let mut labels = Vec::new();

    for token in normalized.split([',', ';', '/', '&']) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let mut chars = token.chars();
        let label = chars
            .next()
            .filter(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_uppercase());
        let rest = chars.as_str();
        let ends_label = rest.is_empty() || rest.starts_with([')', '.', ' ']);
        match label {
            Some(label) if ends_label => {
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
            _ => return Err(format!("unrecognized answer '{token}'")),
        }
    }

    if labels.is_empty() {
        return Err("Answer line names no option".to_string());
    }
    Ok(labels)
}

/// Strips a surrounding ```` ``` ```` / ```` ```text ```` fence if present.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(fenced) = text.strip_prefix("```") else {
        return text;
    };
    let body = fenced.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .map_or(body, str::trim)
}
