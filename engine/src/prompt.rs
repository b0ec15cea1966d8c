//! Prompt construction for question extraction.

use crate::config::ExtractionConfig;

/// Marker lines that fence the document inside the prompt.
const DOCUMENT_START: &str = "=== DOCUMENT START ===";
const DOCUMENT_END: &str = "=== DOCUMENT END ===";

/// Build the extraction prompt for a document.
///
/// Includes:
/// - The task (multiple-choice questions grounded in the document)
/// - The exact textual format the parser accepts
/// - An optional question count
/// - The document, fenced by marker lines
///
/// # Examples
///
/// ```
/// use quizgen_engine::{prompt::build_extraction_prompt, ExtractionConfig};
///
/// let prompt = build_extraction_prompt("Water boils at 100 C.", &ExtractionConfig::default());
/// assert!(prompt.contains("Answer:"));
/// assert!(prompt.contains("Water boils at 100 C."));
/// ```
#[must_use]
pub fn build_extraction_prompt(document_text: &str, config: &ExtractionConfig) -> String {
    let mut prompt = String::from(
        "You are preparing a multiple-choice quiz from the document below.\n\
         Extract the questions the document contains, or write questions that test its key facts.\n\n",
    );

    match config.question_count {
        Some(count) => prompt.push_str(&format!("Produce exactly {count} questions.\n\n")),
        None => prompt.push_str("Produce as many questions as the document supports.\n\n"),
    }

    prompt.push_str(
        "Respond with plain text only, no Markdown, using this format for every question:\n\n\
         Q1: <question text>\n\
         A) <option>\n\
         B) <option>\n\
         C) <option>\n\
         D) <option>\n\
         Answer: <letter of the correct option, or letters separated by commas>\n\
         Explanation: <one or two sentences, optional>\n\
         Source: <section or quote from the document, optional>\n\n\
         Rules:\n\
         - Number questions Q1, Q2, Q3 and separate them with a blank line.\n\
         - Give every question at least two options with distinct letters.\n\
         - At least one option must be wrong; never mark every option correct.\n\
         - Write nothing before the first question or after the last one.\n\n",
    );

    prompt.push_str(DOCUMENT_START);
    prompt.push('\n');
    prompt.push_str(document_text.trim());
    prompt.push('\n');
    prompt.push_str(DOCUMENT_END);

    prompt
}

/// Cut `text` to at most `max_chars` characters on a char boundary.
///
/// Returns the (possibly shortened) text and whether anything was cut.
#[must_use]
pub fn truncate_document(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}
