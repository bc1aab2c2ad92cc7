use regex::Regex;

const PAGE_OF_PATTERN: &str = r"(?i)\bpage\s+\d+\s+of\s+\d+\b";
const PAGE_NUMBER_LINE_PATTERN: &str = r"(?m)^[ \t]*\d+[ \t]*\r?$";
// Word characters, whitespace, the Malayalam block, punctuation and a few
// domain symbols survive; everything else becomes a space.
const DISALLOWED_PATTERN: &str = r"[^\w\s\x{0D00}-\x{0D7F}.,!?;:/%+\-]";
const SENTENCE_BREAK_PATTERN: &str = r"[.!?]+";

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone)]
pub struct TextCleaner {
    page_of: Regex,
    page_number_line: Regex,
    disallowed: Regex,
    sentence_break: Regex,
}

impl TextCleaner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            page_of: Regex::new(PAGE_OF_PATTERN)?,
            page_number_line: Regex::new(PAGE_NUMBER_LINE_PATTERN)?,
            disallowed: Regex::new(DISALLOWED_PATTERN)?,
            sentence_break: Regex::new(SENTENCE_BREAK_PATTERN)?,
        })
    }

    pub fn clean(&self, raw: &str) -> String {
        let text = self.page_number_line.replace_all(raw, "");
        let text = self.page_of.replace_all(&text, "");
        let text = normalize_whitespace(&text);
        let text = self.disallowed.replace_all(&text, " ");
        normalize_whitespace(&text)
    }

    pub fn sentences<'a>(&'a self, text: &'a str, min_chars: usize) -> impl Iterator<Item = &'a str> {
        self.sentence_break
            .split(text)
            .map(str::trim)
            .filter(move |sentence| sentence.chars().count() >= min_chars)
    }
}
