//! Tokenization (spec.md §4.1) and vocabulary derivation (§4.2).

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// How an utterance's text is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerMode {
    /// Split on any run of whitespace, after trimming.
    Whitespace,
    /// Strip whitespace, then yield one Unicode codepoint per token.
    Char,
}

impl std::str::FromStr for TokenizerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whitespace" => Ok(Self::Whitespace),
            "char" => Ok(Self::Char),
            other => Err(format!("unknown tokenizer mode: {other}")),
        }
    }
}

/// Tokenize `text` under `mode`, after NFC-normalizing it so codepoint-level
/// comparisons (char mode, hyphen detection) are stable across equivalent
/// input encodings.
pub fn tokenize(text: &str, mode: TokenizerMode) -> Vec<String> {
    let normalized: String = text.nfc().collect();
    match mode {
        TokenizerMode::Whitespace => normalized
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        TokenizerMode::Char => normalized
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_string())
            .collect(),
    }
}

/// Hyphen-derived surface variants for a token (spec.md §4.2): the
/// hyphen-split parts, and the hyphen-removed concatenation. Empty for a
/// token with no `-`.
pub fn hyphen_variants(token: &str) -> Option<(Vec<String>, String)> {
    if !token.contains('-') {
        return None;
    }
    let parts: Vec<String> = token
        .split('-')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    if parts.is_empty() {
        return None;
    }
    let joined = parts.concat();
    Some((parts, joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_mode_splits_on_runs() {
        let toks = tokenize("  HEY   I AM  HERE ", TokenizerMode::Whitespace);
        assert_eq!(toks, vec!["HEY", "I", "AM", "HERE"]);
    }

    #[test]
    fn char_mode_strips_spaces() {
        let toks = tokenize("你 好", TokenizerMode::Char);
        assert_eq!(toks, vec!["你", "好"]);
    }

    #[test]
    fn hyphen_variants_split_and_join() {
        let (parts, joined) = hyphen_variants("T-SHIRT").unwrap();
        assert_eq!(parts, vec!["T", "SHIRT"]);
        assert_eq!(joined, "TSHIRT");
        assert!(hyphen_variants("SHIRT").is_none());
    }
}
