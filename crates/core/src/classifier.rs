use crate::cleaning::TextCleaner;
use crate::error::TaxonomyError;
use crate::models::SectionMap;
use crate::taxonomy::{KeywordTaxonomy, SectionName};
use crate::traits::SectionClassifier;
use regex::RegexSet;

// Keywords are anchored at the start of a word only, so "pest" covers "pests"
// while "rice" never fires inside "price".
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    sections: Vec<SectionName>,
    matchers: Vec<Option<RegexSet>>,
}

impl KeywordClassifier {
    pub fn new(taxonomy: &KeywordTaxonomy) -> Result<Self, TaxonomyError> {
        let mut sections = Vec::with_capacity(taxonomy.len());
        let mut matchers = Vec::with_capacity(taxonomy.len());

        for (section, keywords) in taxonomy.iter() {
            let matcher = if keywords.is_empty() {
                None
            } else {
                let patterns = keywords
                    .iter()
                    .map(|keyword| format!(r"\b{}", regex::escape(keyword)));
                Some(RegexSet::new(patterns)?)
            };
            sections.push(section.clone());
            matchers.push(matcher);
        }

        Ok(Self { sections, matchers })
    }
}

impl SectionClassifier for KeywordClassifier {
    fn sections(&self) -> &[SectionName] {
        &self.sections
    }

    fn classify(&self, sentence: &str) -> Vec<SectionName> {
        let lowered = sentence.to_lowercase();
        self.sections
            .iter()
            .zip(&self.matchers)
            .filter(|(_, matcher)| matches!(matcher, Some(set) if set.is_match(&lowered)))
            .map(|(section, _)| section.clone())
            .collect()
    }
}

pub fn extract_sections<C>(
    cleaned: &str,
    cleaner: &TextCleaner,
    classifier: &C,
    min_sentence_chars: usize,
) -> SectionMap
where
    C: SectionClassifier + ?Sized,
{
    let mut sections: SectionMap = classifier
        .sections()
        .iter()
        .map(|section| (section.clone(), String::new()))
        .collect();

    for sentence in cleaner.sentences(cleaned, min_sentence_chars) {
        for section in classifier.classify(sentence) {
            if let Some(content) = sections.get_mut(&section) {
                content.push_str(sentence);
                content.push_str(". ");
            }
        }
    }

    sections
}
