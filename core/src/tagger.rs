//! GLM tagger compiler (spec.md §4.3): wraps every matched rule phrase in
//! paired rule-tag markers, e.g. for rule `<RULE_000001>` with phrases
//! `{"I'M", "I AM"}` and input `HEY I'M HERE`, produces
//! `HEY <RULE_000001> I'M <RULE_000001> HERE`.
//!
//! Implemented with `aho-corasick` multi-pattern matching over the token
//! sequence rather than the literal context-dependent-rewrite FST spec.md
//! describes, per spec.md §9's own "Tagger tractability" note: "Aho-Corasick
//! tagging over token ids producing the same tagged IR, which preserves
//! semantics because §4.3 uses unconditional left/right context." Patterns
//! are matched over a token sequence encoded with an out-of-band separator
//! so substring hits always land on token boundaries, never inside a token.

use crate::glm::GlmTable;
use aho_corasick::{AhoCorasick, MatchKind};

/// A separator byte that cannot occur in tokenized ASR text.
const SEP: char = '\u{1}';

/// One span of the tagged token stream: either a literal hypothesis token,
/// or a hypothesis span that matched a GLM rule phrase (carrying the rule's
/// tag and the literal tokens that matched).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedSegment {
    Plain(String),
    Rule { rule_id: String, tokens: Vec<String> },
}

fn encode(tokens: &[String]) -> (String, Vec<usize>) {
    let mut encoded = String::new();
    let mut starts = Vec::with_capacity(tokens.len() + 1);
    encoded.push(SEP);
    starts.push(0);
    for token in tokens {
        encoded.push_str(token);
        let pos = encoded.len();
        encoded.push(SEP);
        starts.push(pos);
    }
    (encoded, starts)
}

struct Pattern {
    rule_idx: usize,
    rule_id: String,
    phrase_idx: usize,
    phrase_tokens: Vec<String>,
}

/// Tag `tokens` against `glm`, returning the tagged segment stream.
/// Overlap resolution: leftmost match wins; among matches starting at the
/// same token, the rule inserted earlier in the GLM file wins (lowest rule
/// index), realizing spec.md §4.3's "ties broken by rule-id order."
pub fn tag(tokens: &[String], glm: &GlmTable) -> Vec<TaggedSegment> {
    if tokens.is_empty() || glm.is_empty() {
        return tokens.iter().cloned().map(TaggedSegment::Plain).collect();
    }

    let mut patterns: Vec<Pattern> = Vec::new();
    for (rule_idx, rule) in glm.rules().iter().enumerate() {
        for (phrase_idx, phrase) in rule.phrases.iter().enumerate() {
            let phrase_tokens: Vec<String> =
                phrase.split_whitespace().map(str::to_string).collect();
            if phrase_tokens.is_empty() {
                continue;
            }
            patterns.push(Pattern {
                rule_idx,
                rule_id: rule.rule_id.clone(),
                phrase_idx,
                phrase_tokens,
            });
        }
    }
    if patterns.is_empty() {
        return tokens.iter().cloned().map(TaggedSegment::Plain).collect();
    }

    let (encoded, starts) = encode(tokens);
    let mut offset_to_index = std::collections::HashMap::with_capacity(starts.len());
    for (idx, &offset) in starts.iter().enumerate() {
        offset_to_index.insert(offset, idx);
    }

    let needles: Vec<String> = patterns
        .iter()
        .map(|p| {
            let mut needle = String::new();
            needle.push(SEP);
            needle.push_str(&p.phrase_tokens.join(&SEP.to_string()));
            needle.push(SEP);
            needle
        })
        .collect();

    let ac = AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostFirst)
        .build(&needles)
        .expect("GLM phrase patterns always compile");

    struct Candidate {
        start_tok: usize,
        end_tok: usize,
        rule_idx: usize,
        phrase_idx: usize,
        rule_id: String,
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    for m in ac.find_iter(&encoded) {
        let pattern = &patterns[m.pattern().as_usize()];
        let (Some(&start_tok), Some(&end_tok)) = (
            offset_to_index.get(&m.start()),
            offset_to_index.get(&m.end()),
        ) else {
            continue;
        };
        candidates.push(Candidate {
            start_tok,
            end_tok,
            rule_idx: pattern.rule_idx,
            phrase_idx: pattern.phrase_idx,
            rule_id: pattern.rule_id.clone(),
        });
    }
    candidates.sort_by_key(|c| (c.start_tok, c.rule_idx, c.phrase_idx, c.end_tok));

    let mut segments = Vec::with_capacity(tokens.len());
    let mut next_free = 0usize;
    let mut accepted: Vec<&Candidate> = Vec::new();
    for c in &candidates {
        if c.start_tok < next_free {
            continue;
        }
        accepted.push(c);
        next_free = c.end_tok;
    }
    accepted.sort_by_key(|c| c.start_tok);

    let mut cursor = 0usize;
    for c in accepted {
        while cursor < c.start_tok {
            segments.push(TaggedSegment::Plain(tokens[cursor].clone()));
            cursor += 1;
        }
        segments.push(TaggedSegment::Rule {
            rule_id: c.rule_id.clone(),
            tokens: tokens[c.start_tok..c.end_tok].to_vec(),
        });
        cursor = c.end_tok;
    }
    while cursor < tokens.len() {
        segments.push(TaggedSegment::Plain(tokens[cursor].clone()));
        cursor += 1;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn tags_a_matching_phrase() {
        let glm = GlmTable::parse("I'M,I AM\n").unwrap();
        let segs = tag(&toks("HEY I'M HERE"), &glm);
        assert_eq!(
            segs,
            vec![
                TaggedSegment::Plain("HEY".into()),
                TaggedSegment::Rule {
                    rule_id: "<RULE_000000>".into(),
                    tokens: vec!["I'M".into()],
                },
                TaggedSegment::Plain("HERE".into()),
            ]
        );
    }

    #[test]
    fn no_rules_is_all_plain() {
        let glm = GlmTable::new();
        let segs = tag(&toks("HEY THERE"), &glm);
        assert_eq!(
            segs,
            vec![
                TaggedSegment::Plain("HEY".into()),
                TaggedSegment::Plain("THERE".into()),
            ]
        );
    }

    #[test]
    fn lower_rule_index_wins_on_overlap() {
        let glm = GlmTable::parse("A B,X\nB C,Y\n").unwrap();
        let segs = tag(&toks("A B C"), &glm);
        assert_eq!(
            segs,
            vec![
                TaggedSegment::Rule {
                    rule_id: "<RULE_000000>".into(),
                    tokens: vec!["A".into(), "B".into()],
                },
                TaggedSegment::Plain("C".into()),
            ]
        );
    }
}
