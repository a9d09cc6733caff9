//! Post-processing (C10): the ten-step deterministic normalization
//! pipeline applied before and after each validation cycle (spec.md
//! §4.10). Idempotent by construction — running it twice on its own
//! output is a no-op.

use unicode_segmentation::UnicodeSegmentation;

use persona_config::constants::postprocess::MIN_LENGTH;
use persona_config::templates::{LENGTH_EXTENSIONS_GENERAL, LENGTH_EXTENSIONS_SEXUAL};

#[derive(Debug, Clone)]
pub struct PostprocessResult {
    pub text: String,
    pub success: bool,
}

impl PostprocessResult {
    pub fn empty() -> Self {
        Self { text: String::new(), success: false }
    }
}

fn strip_quotes(text: &str) -> String {
    text.trim_matches(|c: char| matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}' | '\u{00AB}' | '\u{00BB}')).to_string()
}

fn replace_hyphens(text: &str) -> String {
    text.replace(['-', '\u{2013}', '\u{2014}'], " ")
}

fn replace_eszett(text: &str) -> String {
    text.replace('ß', "ss")
}

fn replace_exclamations(text: &str) -> String {
    text.replace('!', ".")
}

fn collapse_question_marks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_was_question = false;
    for c in text.chars() {
        if c == '?' {
            if !prev_was_question {
                out.push(c);
            }
            prev_was_question = true;
        } else {
            out.push(c);
            prev_was_question = false;
        }
    }
    out
}

/// Splits on sentence-final punctuation, keeping the punctuation with
/// the sentence that precedes it. Unicode-aware so German umlauts never
/// split a word in half.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = vec![];
    let mut current = String::new();
    for grapheme in text.graphemes(true) {
        current.push_str(grapheme);
        if matches!(grapheme, "." | "?") {
            sentences.push(current.trim().to_string());
            current = String::new();
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current.trim().to_string());
    }
    sentences.into_iter().filter(|s| !s.is_empty()).collect()
}

fn is_question(sentence: &str) -> bool {
    sentence.trim_end().ends_with('?')
}

/// Step 6: trim sentence count down to the learning-stats target,
/// preferring to drop trailing non-question sentences first.
fn trim_to_sentence_target(sentences: Vec<String>, target: Option<usize>) -> Vec<String> {
    let Some(target) = target else { return sentences };
    if sentences.len() <= target {
        return sentences;
    }

    let mut trimmed = sentences;
    while trimmed.len() > target {
        let joined_if_shrunk: String = trimmed[..trimmed.len() - 1].join(" ");
        if joined_if_shrunk.len() < MIN_LENGTH {
            break;
        }
        if let Some(pos) = trimmed.iter().rposition(|s| !is_question(s)) {
            trimmed.remove(pos);
        } else if let Some(first_question) = trimmed.iter().position(|s| is_question(s)) {
            if trimmed.len() - 1 > first_question {
                trimmed.remove(trimmed.len() - 1);
            } else {
                break;
            }
        } else {
            break;
        }
    }
    trimmed
}

/// Step 7: append a short contextual extension when the candidate falls
/// under the minimum length, without overshooting `target_max + 20`.
fn extend_short_reply(text: String, is_sexual: bool, target_max_length: usize) -> String {
    if text.len() >= MIN_LENGTH {
        return text;
    }
    let pool = if is_sexual { LENGTH_EXTENSIONS_SEXUAL } else { LENGTH_EXTENSIONS_GENERAL };
    for extension in pool {
        let candidate = format!("{text}{extension}");
        if candidate.len() >= MIN_LENGTH && candidate.len() <= target_max_length + 20 {
            return candidate;
        }
    }
    // None fits the budget exactly; fall back to the first extension so we
    // at least clear the hard minimum rather than returning a too-short reply.
    pool.first().map(|e| format!("{text}{e}")).unwrap_or(text)
}

fn joined_len(sentences: &[String]) -> usize {
    sentences.iter().map(|s| s.len()).sum::<usize>() + sentences.len().saturating_sub(1)
}

/// Step 8: drops question sentences from the end one at a time, always
/// keeping the first question, stopping as soon as the target is hit or
/// a further drop would push the reply under the minimum length.
fn cap_question_count(sentences: Vec<String>, target_questions: usize) -> Vec<String> {
    let target = target_questions.max(1);
    let mut current = sentences;

    loop {
        let question_positions: Vec<usize> = current.iter().enumerate().filter(|(_, s)| is_question(s)).map(|(i, _)| i).collect();
        if question_positions.len() <= target {
            return current;
        }
        let last_question_index = *question_positions.last().unwrap();
        let mut candidate = current.clone();
        candidate.remove(last_question_index);
        if joined_len(&candidate) < MIN_LENGTH {
            return current;
        }
        current = candidate;
    }
}

/// Step 9: normalize trailing punctuation and drop a truncated-looking
/// final fragment.
fn finalize_punctuation(sentences: Vec<String>) -> Vec<String> {
    let mut sentences = sentences;
    if let Some(last) = sentences.last() {
        let trimmed = last.trim_end();
        let looks_truncated = trimmed.chars().count() < 10 && !trimmed.ends_with('.') && !trimmed.ends_with('?');
        if looks_truncated && sentences.len() > 1 {
            sentences.pop();
        }
    }
    if let Some(last) = sentences.last_mut() {
        let trimmed = last.trim_end();
        if !trimmed.ends_with('.') && !trimmed.ends_with('?') {
            *last = format!("{trimmed}.");
        } else {
            *last = trimmed.to_string();
        }
    }
    sentences
}

pub struct PostprocessInput<'a> {
    pub candidate: &'a str,
    pub target_sentence_count: Option<usize>,
    pub target_question_count: usize,
    pub target_max_length: usize,
    pub is_sexual: bool,
}

pub fn run(input: PostprocessInput<'_>) -> PostprocessResult {
    let mut text = input.candidate.to_string();
    text = strip_quotes(&text);
    text = replace_hyphens(&text);
    text = replace_eszett(&text);
    text = replace_exclamations(&text);
    text = collapse_question_marks(&text);

    let mut sentences = split_sentences(&text);
    sentences = trim_to_sentence_target(sentences, input.target_sentence_count);

    let mut joined = sentences.join(" ");
    joined = extend_short_reply(joined, input.is_sexual, input.target_max_length);

    sentences = split_sentences(&joined);
    sentences = cap_question_count(sentences, input.target_question_count);
    sentences = finalize_punctuation(sentences);

    let result = sentences.join(" ").trim().to_string();

    if result.is_empty() || result.len() < MIN_LENGTH {
        return PostprocessResult::empty();
    }
    PostprocessResult { text: result, success: true }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_reply(sentences: &[&str]) -> String {
        sentences.join(" ")
    }

    #[test]
    fn strips_quotes_hyphens_eszett_and_exclamations() {
        let result = run(PostprocessInput {
            candidate: "\"Na klar, lass uns das Gespräch einfach in aller Ruhe weiter fortführen - ich freue mich jedenfalls wirklich sehr riesig darüber! Straße ist wirklich schön, oder?\"",
            target_sentence_count: None,
            target_question_count: 1,
            target_max_length: 220,
            is_sexual: false,
        });
        assert!(!result.text.contains('!'));
        assert!(!result.text.contains('-'));
        assert!(result.text.contains("Strasse"));
        assert!(!result.text.starts_with('"'));
    }

    #[test]
    fn collapses_repeated_question_marks() {
        let result = run(PostprocessInput {
            candidate: &format!("{} Ist das wirklich dein Ernst???", long_reply(&[
                "Na das klingt doch richtig spannend bei dir, erzähl mir mehr davon.",
                "Was machst du sonst noch gerne in deiner Freizeit, wenn du mal Zeit hast.",
            ])),
            target_sentence_count: None,
            target_question_count: 1,
            target_max_length: 220,
            is_sexual: false,
        });
        assert!(!result.text.contains("???"));
    }

    #[test]
    fn appends_extension_when_too_short() {
        let result = run(PostprocessInput {
            candidate: "Na das klingt doch richtig spannend bei dir, das wollte ich dir nur kurz mal eben kurz sagen, bevor ich es vergesse.",
            target_sentence_count: None,
            target_question_count: 1,
            target_max_length: 220,
            is_sexual: false,
        });
        assert!(result.success);
        assert!(result.text.len() >= MIN_LENGTH);
    }

    #[test]
    fn caps_question_count_keeping_first() {
        let candidate = long_reply(&[
            "Na das klingt doch richtig spannend bei dir, erzähl mir bitte noch ein bisschen mehr davon, das würde mich wirklich sehr interessieren?",
            "Was machst du sonst noch gerne in deiner Freizeit, wenn du mal ein bisschen Zeit für dich hast?",
            "Magst du mir auch verraten was du am Wochenende so alles vorhast?",
        ]);
        let result = run(PostprocessInput {
            candidate: &candidate,
            target_sentence_count: None,
            target_question_count: 1,
            target_max_length: 220,
            is_sexual: false,
        });
        assert_eq!(result.text.matches('?').count(), 1);
    }

    #[test]
    fn too_short_after_all_passes_returns_empty_sentinel() {
        let result = run(PostprocessInput {
            candidate: ".",
            target_sentence_count: None,
            target_question_count: 1,
            target_max_length: 220,
            is_sexual: false,
        });
        assert!(!result.success);
        assert!(result.text.is_empty());
    }
}
