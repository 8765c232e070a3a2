//! GLM ("Global Mapping") rule table: a CSV of interchangeable surface
//! phrases (spec.md §3, §6). Rule ids are assigned by line index, zero-
//! padded to six digits: `<RULE_000000>`, `<RULE_000001>`, ...
//!
//! Loader shape grounded on `core/src/fuzzy.rs`'s `FuzzyRule`/
//! `FuzzyMap::from_rules`: parse a textual rule list into a small struct,
//! trimming whitespace defensively around every field.

use crate::error::{CoreError, CoreResult};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlmRule {
    pub rule_id: String,
    /// Each phrase is a whitespace-joined token sequence; any phrase in the
    /// set is an acceptable surface for any other.
    pub phrases: Vec<String>,
}

impl GlmRule {
    pub fn tag(&self) -> &str {
        &self.rule_id
    }
}

/// `rule_id -> GlmRule`, ordered by insertion (file order).
#[derive(Debug, Clone, Default)]
pub struct GlmTable {
    rules: Vec<GlmRule>,
}

impl GlmTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &[GlmRule] {
        &self.rules
    }

    /// Look up a rule by its assigned tag, e.g. `<RULE_000001>`.
    pub fn find_by_id(&self, rule_id: &str) -> Option<&GlmRule> {
        self.rules.iter().find(|r| r.rule_id == rule_id)
    }

    fn format_rule_id(index: usize) -> String {
        format!("<RULE_{index:06}>")
    }

    /// Parse a GLM CSV: one rule per line, each a comma-separated list of
    /// phrases, no header.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref).map_err(|source| CoreError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse GLM CSV content directly (used by loader and by tests/tools
    /// that don't want a filesystem round trip).
    pub fn parse(content: &str) -> CoreResult<Self> {
        let mut table = Self::new();
        for (line_idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let phrases: Vec<String> = line
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if phrases.is_empty() {
                return Err(CoreError::MalformedGlmRule {
                    line: line_idx,
                    reason: "no non-empty phrases".to_string(),
                });
            }
            table.rules.push(GlmRule {
                rule_id: Self::format_rule_id(line_idx),
                phrases,
            });
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_zero_padded_ids_in_file_order() {
        let table = GlmTable::parse("I'M,I AM\nGONNA,GOING TO\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rules()[0].rule_id, "<RULE_000000>");
        assert_eq!(table.rules()[1].rule_id, "<RULE_000001>");
        assert_eq!(table.rules()[0].phrases, vec!["I'M", "I AM"]);
    }

    #[test]
    fn trims_phrase_whitespace() {
        let table = GlmTable::parse(" I'M , I AM \n").unwrap();
        assert_eq!(table.rules()[0].phrases, vec!["I'M", "I AM"]);
    }

    #[test]
    fn reordering_lines_only_changes_ids() {
        let a = GlmTable::parse("I'M,I AM\nGONNA,GOING TO\n").unwrap();
        let b = GlmTable::parse("GONNA,GOING TO\nI'M,I AM\n").unwrap();
        let a_phrases: Vec<&Vec<String>> = a.rules().iter().map(|r| &r.phrases).collect();
        let b_phrases: Vec<&Vec<String>> = b.rules().iter().map(|r| &r.phrases).collect();
        assert_eq!(a_phrases.len(), b_phrases.len());
        assert!(a_phrases.contains(&&vec!["I'M".to_string(), "I AM".to_string()]));
        assert!(b_phrases.contains(&&vec!["I'M".to_string(), "I AM".to_string()]));
    }
}
