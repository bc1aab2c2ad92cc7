use crate::knowledge::KnowledgeBase;
use crate::models::{SearchOptions, SearchResult};
use std::collections::HashSet;

pub const PHRASE_BONUS: f64 = 2.0;
pub const PARTIAL_BONUS: f64 = 1.0;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone)]
pub struct ParsedQuery {
    phrase: String,
    terms: HashSet<String>,
}

impl ParsedQuery {
    pub fn parse(query: &str) -> Self {
        let phrase = query.to_lowercase();
        let terms = phrase.split_whitespace().map(str::to_string).collect();
        Self { phrase, terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Phrase bonus + normalized term overlap + partial-match bonus, in `[0, 4]`.
    ///
    /// The partial bonus is a plain substring test, so a short term can match
    /// inside a longer word ("rice" in "price").
    pub fn score(&self, content: &str) -> f64 {
        if self.terms.is_empty() {
            return 0.0;
        }

        let content = content.to_lowercase();

        let phrase_score = if content.contains(&self.phrase) {
            PHRASE_BONUS
        } else {
            0.0
        };

        let content_tokens: HashSet<&str> = content.split_whitespace().map(strip_punctuation).collect();
        let overlap = self
            .terms
            .iter()
            .filter(|term| content_tokens.contains(strip_punctuation(term)))
            .count();
        let overlap_score = overlap as f64 / self.terms.len() as f64;

        let partial_score = if self.terms.iter().any(|term| content.contains(term.as_str())) {
            PARTIAL_BONUS
        } else {
            0.0
        };

        phrase_score + overlap_score + partial_score
    }
}

fn strip_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| c.is_ascii_punctuation())
}

pub fn truncate_snippet(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{ELLIPSIS}", &content[..byte_index]),
        None => content.to_string(),
    }
}

fn round_score(score: f64) -> f64 {
    (score * 1_000.0).round() / 1_000.0
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeSearcher {
    options: SearchOptions,
}

impl KnowledgeSearcher {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn search(&self, query: &str, base: &KnowledgeBase) -> Vec<SearchResult> {
        let parsed = ParsedQuery::parse(query);
        if parsed.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();
        for (section, entries) in base.iter() {
            for entry in entries {
                let score = parsed.score(&entry.content);
                if score < self.options.min_score {
                    continue;
                }

                results.push(SearchResult {
                    section: section.clone(),
                    source: entry.source.clone(),
                    score: round_score(score),
                    content: truncate_snippet(&entry.content, self.options.snippet_max_chars),
                });
            }
        }

        results.sort_by(|left, right| right.score.total_cmp(&left.score));

        if let Some(limit) = self.options.limit {
            results.truncate(limit);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KnowledgeEntry;
    use crate::taxonomy::SectionName;

    fn entry(source: &str, content: &str) -> KnowledgeEntry {
        KnowledgeEntry {
            source: source.to_string(),
            content: content.to_string(),
        }
    }

    fn base(sections: Vec<(&str, Vec<KnowledgeEntry>)>) -> KnowledgeBase {
        KnowledgeBase::from_sections(
            sections
                .into_iter()
                .map(|(name, entries)| (SectionName::parse(name).expect("valid"), entries)),
        )
    }

    #[test]
    fn overlap_and_partial_without_phrase() {
        let base = base(vec![(
            "fertilizer",
            vec![entry("a.txt", "Apply fertilizer in three splits.")],
        )]);

        let results = KnowledgeSearcher::default().search("fertilizer splits", &base);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].section.as_str(), "fertilizer");
        assert_eq!(results[0].source, "a.txt");
        assert_eq!(results[0].score, 2.0);
    }

    #[test]
    fn exact_phrase_reaches_four() {
        let parsed = ParsedQuery::parse("Three Splits");
        assert_eq!(parsed.score("Apply fertilizer in three splits."), 4.0);
    }

    #[test]
    fn duplicate_terms_count_once() {
        let parsed = ParsedQuery::parse("neem neem oil");
        // terms {neem, oil}: one of two overlaps
        assert_eq!(parsed.score("Spray neem extract weekly"), 1.5);
    }

    #[test]
    fn partial_match_is_unanchored() {
        let parsed = ParsedQuery::parse("rice crop");
        assert_eq!(parsed.score("Market price of copra"), 1.0);
    }

    #[test]
    fn overlap_is_fractional_and_rounded() {
        let base = base(vec![(
            "soil",
            vec![entry("s.txt", "Lime acidic soil before planting")],
        )]);

        let results = KnowledgeSearcher::default().search("soil pH correction", &base);
        assert_eq!(results[0].score, 1.333);
    }

    #[test]
    fn empty_query_returns_nothing() {
        let base = base(vec![("pest", vec![entry("a.txt", "Spray neem oil.")])]);

        assert!(KnowledgeSearcher::default().search("", &base).is_empty());
        assert!(KnowledgeSearcher::default().search("   \t", &base).is_empty());
    }

    #[test]
    fn empty_base_returns_nothing() {
        let results = KnowledgeSearcher::default().search("coconut", &KnowledgeBase::default());
        assert!(results.is_empty());
    }

    #[test]
    fn results_below_minimum_are_dropped() {
        let base = base(vec![(
            "pest",
            vec![
                entry("a.txt", "Spray neem oil."),
                entry("b.txt", "Harvest coconuts every 45 days."),
            ],
        )]);

        let results = KnowledgeSearcher::default().search("neem", &base);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "a.txt");

        let strict = KnowledgeSearcher::new(SearchOptions {
            min_score: 4.5,
            ..SearchOptions::default()
        });
        assert!(strict.search("neem", &base).is_empty());
    }

    #[test]
    fn sorted_descending_with_stable_ties() {
        let base = base(vec![
            (
                "pest",
                vec![
                    entry("a.txt", "Use neem cake for pest control."),
                    entry("b.txt", "Neem oil controls mealybugs."),
                ],
            ),
            ("fertilizer", vec![entry("c.txt", "Apply neem cake with urea.")]),
        ]);

        let results = KnowledgeSearcher::default().search("neem cake", &base);
        let order: Vec<(&str, f64)> = results
            .iter()
            .map(|result| (result.source.as_str(), result.score))
            .collect();

        assert_eq!(order, vec![("a.txt", 4.0), ("c.txt", 4.0), ("b.txt", 1.5)]);
    }

    #[test]
    fn limit_caps_result_count() {
        let base = base(vec![(
            "pest",
            vec![entry("a.txt", "neem one"), entry("b.txt", "neem two")],
        )]);

        let searcher = KnowledgeSearcher::new(SearchOptions {
            limit: Some(1),
            ..SearchOptions::default()
        });
        assert_eq!(searcher.search("neem", &base).len(), 1);
    }

    #[test]
    fn long_content_is_truncated_with_ellipsis() {
        let content = "ന".repeat(10) + &"x".repeat(600);
        let snippet = truncate_snippet(&content, 500);

        assert_eq!(snippet.chars().count(), 500 + ELLIPSIS.len());
        assert!(snippet.ends_with(ELLIPSIS));
        let prefix: String = content.chars().take(500).collect();
        assert!(snippet.starts_with(&prefix));

        assert_eq!(truncate_snippet("short", 500), "short");
        assert_eq!(truncate_snippet(&"y".repeat(500), 500), "y".repeat(500));
    }
}
