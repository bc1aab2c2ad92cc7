use crate::error::TaxonomyError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_SECTION: &str = "general";
pub const DEFAULT_KEYWORDS: [&str; 4] = ["advice", "guidance", "tip", "information"];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectionName(String);

impl SectionName {
    pub fn parse(raw: impl Into<String>) -> Result<Self, TaxonomyError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_control) {
            return Err(TaxonomyError::InvalidSection(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SectionName {
    type Error = TaxonomyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SectionName> for String {
    fn from(value: SectionName) -> Self {
        value.0
    }
}

impl Borrow<str> for SectionName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Section order follows the configuration file and drives the order of the
// knowledge base and of equally scored search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTaxonomy {
    sections: Vec<(SectionName, Vec<String>)>,
}

impl KeywordTaxonomy {
    pub fn new<S, I, K>(sections: I) -> Result<Self, TaxonomyError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Vec<K>)>,
        K: AsRef<str>,
    {
        let mut parsed: Vec<(SectionName, Vec<String>)> = Vec::new();
        for (name, keywords) in sections {
            let name = SectionName::parse(name)?;
            if parsed.iter().any(|(existing, _)| existing == &name) {
                return Err(TaxonomyError::InvalidSection(format!(
                    "duplicate section {name}"
                )));
            }

            let keywords = keywords
                .iter()
                .map(|keyword| keyword.as_ref().trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect();
            parsed.push((name, keywords));
        }

        if parsed.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        Ok(Self { sections: parsed })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TaxonomyError> {
        let object: Map<String, Value> = serde_json::from_str(raw)?;
        let mut sections = Vec::with_capacity(object.len());

        for (section, value) in object {
            let keywords = match value {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(keyword) => Ok(keyword),
                        other => Err(TaxonomyError::InvalidKeywords {
                            section: section.clone(),
                            details: format!("expected string keyword, found {other}"),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                other => {
                    return Err(TaxonomyError::InvalidKeywords {
                        section,
                        details: format!("expected array of keywords, found {other}"),
                    })
                }
            };
            sections.push((section, keywords));
        }

        Self::new(sections)
    }

    pub fn from_file(path: &Path) -> Result<Self, TaxonomyError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "keyword config missing, using default sections");
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(taxonomy) => taxonomy,
            Err(error) => {
                warn!(
                    path = %path.display(),
                    %error,
                    "keyword config unreadable, using default sections"
                );
                Self::default()
            }
        }
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionName> {
        self.sections.iter().map(|(name, _)| name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SectionName, &[String])> {
        self.sections
            .iter()
            .map(|(name, keywords)| (name, keywords.as_slice()))
    }

    pub fn section(&self, name: &str) -> Option<&SectionName> {
        self.sections
            .iter()
            .map(|(section, _)| section)
            .find(|section| section.as_str() == name)
    }

    pub fn keywords(&self, name: &str) -> Option<&[String]> {
        self.sections
            .iter()
            .find(|(section, _)| section.as_str() == name)
            .map(|(_, keywords)| keywords.as_slice())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Default for KeywordTaxonomy {
    fn default() -> Self {
        Self {
            sections: vec![(
                SectionName(DEFAULT_SECTION.to_string()),
                DEFAULT_KEYWORDS.iter().map(|kw| kw.to_string()).collect(),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn json_key_order_is_preserved() {
        let taxonomy = KeywordTaxonomy::from_json_str(
            r#"{"pest": ["Pest", "insect"], "fertilizer": ["fertilizer"], "irrigation": []}"#,
        )
        .expect("taxonomy should parse");

        let names: Vec<&str> = taxonomy.sections().map(SectionName::as_str).collect();
        assert_eq!(names, vec!["pest", "fertilizer", "irrigation"]);
        assert_eq!(
            taxonomy.keywords("pest"),
            Some(&["pest".to_string(), "insect".to_string()][..])
        );
    }

    #[test]
    fn non_string_keywords_are_rejected() {
        let error = KeywordTaxonomy::from_json_str(r#"{"pest": [1, 2]}"#).unwrap_err();
        assert!(matches!(error, TaxonomyError::InvalidKeywords { .. }));

        let error = KeywordTaxonomy::from_json_str(r#"{"pest": "neem"}"#).unwrap_err();
        assert!(matches!(error, TaxonomyError::InvalidKeywords { .. }));
    }

    #[test]
    fn empty_config_is_an_error() {
        let error = KeywordTaxonomy::from_json_str("{}").unwrap_err();
        assert!(matches!(error, TaxonomyError::Empty));
    }

    #[test]
    fn section_names_are_validated() {
        assert!(SectionName::parse("  ").is_err());
        assert!(SectionName::parse("pest\ncontrol").is_err());
        assert_eq!(SectionName::parse(" soil ").unwrap().as_str(), "soil");
    }

    #[test]
    fn missing_config_falls_back_to_default() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let taxonomy = KeywordTaxonomy::load_or_default(&dir.path().join("absent.json"));

        assert_eq!(taxonomy, KeywordTaxonomy::default());
        assert!(taxonomy.section(DEFAULT_SECTION).is_some());
        Ok(())
    }

    #[test]
    fn malformed_config_falls_back_to_default() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("keywords.json");
        fs::write(&path, "{ not json")?;

        let taxonomy = KeywordTaxonomy::load_or_default(&path);
        assert_eq!(taxonomy.len(), 1);
        assert_eq!(taxonomy.keywords(DEFAULT_SECTION).map(<[String]>::len), Some(4));
        Ok(())
    }
}
