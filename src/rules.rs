use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::{ReleveError, Result};

#[derive(Debug, Deserialize)]
struct RuleEntry {
    main_category: String,
    patterns: Vec<String>,
}

/// One categorization rule: a subcategory, its parent category, and the
/// patterns that select it. Patterns compile to a single case-insensitive
/// alternation tested with substring semantics.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub subcategory: String,
    pub main_category: String,
    pub patterns: Vec<String>,
    matcher: Option<Regex>,
}

impl CategoryRule {
    pub fn new(
        subcategory: &str,
        main_category: &str,
        patterns: Vec<String>,
    ) -> Result<CategoryRule> {
        let matcher = if patterns.is_empty() {
            // An empty alternation would match every row; match nothing.
            None
        } else {
            let joined = patterns.join("|");
            Some(
                RegexBuilder::new(&joined)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        ReleveError::Rules(format!("invalid pattern for '{subcategory}': {e}"))
                    })?,
            )
        };
        Ok(CategoryRule {
            subcategory: subcategory.to_string(),
            main_category: main_category.to_string(),
            patterns,
            matcher,
        })
    }

    pub fn matches(&self, description: &str) -> bool {
        self.matcher
            .as_ref()
            .map_or(false, |re| re.is_match(description))
    }
}

/// The ordered rule set. Order is the override order: a later rule's match
/// overwrites an earlier one on the same row, so it is kept as a list, not
/// a map.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
}

impl RuleSet {
    /// Load from the JSON rules file: an object keyed by subcategory, in
    /// significant order, each entry carrying `main_category` and `patterns`.
    pub fn load(path: &Path) -> Result<RuleSet> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReleveError::Rules(format!("cannot read {}: {e}", path.display()))
        })?;
        // serde_json's preserve_order keeps the file's key order.
        let doc: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
            .map_err(|e| ReleveError::Rules(format!("{}: {e}", path.display())))?;

        let mut rules = Vec::with_capacity(doc.len());
        for (subcategory, value) in doc {
            let entry: RuleEntry = serde_json::from_value(value).map_err(|e| {
                ReleveError::Rules(format!("entry '{subcategory}': {e}"))
            })?;
            rules.push(CategoryRule::new(
                &subcategory,
                &entry.main_category,
                entry.patterns,
            )?);
        }
        Ok(RuleSet { rules })
    }

    pub fn from_rules(rules: Vec<CategoryRule>) -> RuleSet {
        RuleSet { rules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_rules(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_preserves_file_order() {
        let (_dir, path) = write_rules(
            r#"{
                "restaurants": {"main_category": "food", "patterns": ["UBER EATS", "DELIVEROO"]},
                "groceries": {"main_category": "food", "patterns": ["CARREFOUR"]},
                "salary": {"main_category": "income", "patterns": ["VIREMENT SALAIRE"]}
            }"#,
        );
        let rules = RuleSet::load(&path).unwrap();
        let order: Vec<&str> = rules.iter().map(|r| r.subcategory.as_str()).collect();
        assert_eq!(order, vec!["restaurants", "groceries", "salary"]);
        assert_eq!(rules.iter().next().unwrap().main_category, "food");
    }

    #[test]
    fn test_load_rejects_invalid_regex() {
        let (_dir, path) = write_rules(
            r#"{"broken": {"main_category": "x", "patterns": ["[unclosed"]}}"#,
        );
        let err = RuleSet::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_load_rejects_missing_main_category() {
        let (_dir, path) = write_rules(r#"{"bad": {"patterns": ["X"]}}"#);
        assert!(RuleSet::load(&path).is_err());
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        let rule =
            CategoryRule::new("restaurants", "food", vec!["uber eats".to_string()]).unwrap();
        assert!(rule.matches("UBER EATS PARIS"));
        assert!(rule.matches("prefix Uber Eats suffix"));
        assert!(!rule.matches("UBER *TRIP"));
    }

    #[test]
    fn test_empty_pattern_list_matches_nothing() {
        let rule = CategoryRule::new("noop", "x", Vec::new()).unwrap();
        assert!(!rule.matches("ANYTHING"));
        assert!(!rule.matches(""));
    }
}
