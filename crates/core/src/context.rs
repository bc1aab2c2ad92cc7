//! Turns ranked snippets into text for an answer: prompt context for a
//! generative model, or a condensed excerpt when no model is available.

use crate::models::SearchResult;
use regex::Regex;
use std::collections::HashSet;

const CONTEXT_CANDIDATES: usize = 5;
const CONTEXT_SNIPPETS: usize = 3;
const MIN_LATIN_RATIO: f64 = 0.3;
const EXCERPT_SENTENCES: usize = 3;
const MIN_EXCERPT_SENTENCE_CHARS: usize = 20;
const FALLBACK_EXCERPT_CHARS: usize = 300;

const AGRICULTURAL_TERMS: [&str; 9] = [
    "cultivation",
    "farming",
    "crop",
    "pest",
    "disease",
    "irrigation",
    "fertilizer",
    "soil",
    "harvest",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Malayalam,
}

impl Language {
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        if tag == "ml" || tag.starts_with("ml-") || tag.starts_with("ml_") {
            Self::Malayalam
        } else {
            Self::English
        }
    }
}

pub fn has_malayalam(text: &str) -> bool {
    text.chars().any(|c| ('\u{0D00}'..='\u{0D7F}').contains(&c))
}

fn latin_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let latin = text.chars().filter(char::is_ascii_alphabetic).count();
    latin as f64 / total as f64
}

// An English request only drops snippets that carry Latin letters below the
// ratio; snippets with no Latin letters at all may still seed an empty context.
pub fn build_context(results: &[SearchResult], language: Language) -> String {
    let mut selected: Vec<&str> = Vec::new();

    for result in results.iter().take(CONTEXT_CANDIDATES) {
        let content = result.content.as_str();
        let has_latin = content.chars().any(|c| c.is_ascii_alphabetic());

        match language {
            Language::Malayalam if has_malayalam(content) => selected.push(content),
            Language::English if has_latin => {
                if latin_ratio(content) > MIN_LATIN_RATIO {
                    selected.push(content);
                }
            }
            _ if selected.is_empty() => selected.push(content),
            _ => {}
        }
    }

    selected
        .into_iter()
        .take(CONTEXT_SNIPPETS)
        .collect::<Vec<_>>()
        .join(" ")
}

fn word_set(text: &str, word: &Regex) -> HashSet<String> {
    word.find_iter(text)
        .map(|found| found.as_str().to_string())
        .collect()
}

fn relevance(question: &str, question_words: &HashSet<String>, content: &str, word: &Regex) -> usize {
    let lowered = content.to_lowercase();
    let mut score = 0;

    if lowered.contains(question) {
        score += 10;
    }
    score += 2 * word_set(&lowered, word).intersection(question_words).count();
    if content.chars().count() > 200 {
        score += 1;
    }
    score += AGRICULTURAL_TERMS
        .iter()
        .filter(|term| lowered.contains(*term))
        .count();

    score
}

fn condense(content: &str, question_words: &HashSet<String>, sentence_break: &Regex) -> String {
    let relevant: Vec<&str> = sentence_break
        .split(content)
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() >= MIN_EXCERPT_SENTENCE_CHARS)
        .filter(|sentence| {
            let lowered = sentence.to_lowercase();
            question_words.iter().any(|word| lowered.contains(word.as_str()))
                || AGRICULTURAL_TERMS.iter().any(|term| lowered.contains(term))
        })
        .take(EXCERPT_SENTENCES)
        .collect();

    if relevant.is_empty() {
        return crate::search::truncate_snippet(content, FALLBACK_EXCERPT_CHARS);
    }

    let mut answer = relevant.join(". ");
    if !answer.ends_with('.') {
        answer.push('.');
    }
    answer
}

/// `None` means nothing suitable was found; callers should say so rather
/// than invent an answer.
pub fn best_excerpt(question: &str, results: &[SearchResult]) -> Result<Option<String>, regex::Error> {
    let word = Regex::new(r"\b\w+\b")?;
    let sentence_break = Regex::new(r"[.!?]+")?;

    let question = question.to_lowercase();
    let question_words = word_set(&question, &word);

    let mut best: Option<(&str, usize)> = None;
    for result in results {
        let score = relevance(&question, &question_words, &result.content, &word);
        if score > best.map_or(0, |(_, top)| top) {
            best = Some((&result.content, score));
        }
    }

    Ok(best
        .map(|(content, _)| condense(content, &question_words, &sentence_break))
        .filter(|excerpt| !excerpt.is_empty()))
}
