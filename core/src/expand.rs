//! Hypothesis expansion into a "sausage" FST (spec.md §4.4): the tagged
//! token stream is turned into a concatenation of unions, one union per
//! segment, encoding every acceptable surface alternative for that segment.

use crate::error::{CoreError, CoreResult};
use crate::wfst::{ops, Fst, Label};
use crate::glm::GlmTable;
use crate::symtab::SymbolTable;
use crate::tagger::TaggedSegment;
use crate::tokenize::hyphen_variants;

fn sym_id(symtab: &SymbolTable, symbol: &str) -> CoreResult<Label> {
    symtab
        .symbol_to_id(symbol)
        .ok_or_else(|| CoreError::UnknownSymbol(symbol.to_string()))
}

fn literal_acceptor(symtab: &SymbolTable, tokens: &[String]) -> CoreResult<Fst> {
    let ids = tokens
        .iter()
        .map(|t| sym_id(symtab, t))
        .collect::<CoreResult<Vec<_>>>()?;
    Ok(Fst::acceptor(&ids))
}

fn aux_acceptor(symtab: &SymbolTable, tokens: &[String]) -> CoreResult<Fst> {
    let ids = tokens
        .iter()
        .map(|t| sym_id(symtab, &SymbolTable::aux_form(t)))
        .collect::<CoreResult<Vec<_>>>()?;
    Ok(Fst::acceptor(&ids))
}

/// Branches for a plain (non-rule) hypothesis token: the literal token, and
/// if it contains a hyphen, the auxiliary hyphen-split and hyphen-removed
/// forms (spec.md §4.4 "Plain segment").
fn plain_branch(token: &str, symtab: &SymbolTable) -> CoreResult<Fst> {
    let literal = literal_acceptor(symtab, std::slice::from_ref(&token.to_string()))?;
    let mut branches = vec![literal];

    if let Some((parts, joined)) = hyphen_variants(token) {
        branches.push(aux_acceptor(symtab, &parts)?);
        branches.push(aux_acceptor(symtab, std::slice::from_ref(&joined))?);
    }

    let refs: Vec<&Fst> = branches.iter().collect();
    Ok(ops::union(&refs))
}

/// Branches for a rule segment: the matched phrase literally, and every
/// other phrase of the same rule in its token-by-token auxiliary form
/// (spec.md §4.4 "Rule segment").
fn rule_branch(
    rule_id: &str,
    matched_tokens: &[String],
    symtab: &SymbolTable,
    glm: &GlmTable,
) -> CoreResult<Fst> {
    let rule = glm
        .find_by_id(rule_id)
        .expect("tagger never emits a rule_id absent from the GLM table");
    let matched_phrase = matched_tokens.join(" ");

    let mut branches = vec![literal_acceptor(symtab, matched_tokens)?];
    for phrase in &rule.phrases {
        if phrase == &matched_phrase {
            continue;
        }
        let other_tokens: Vec<String> = phrase.split_whitespace().map(str::to_string).collect();
        branches.push(aux_acceptor(symtab, &other_tokens)?);
    }

    let refs: Vec<&Fst> = branches.iter().collect();
    Ok(ops::union(&refs))
}

/// Expand a tagged segment stream into `hyp_fst`, the concatenation of each
/// segment's alternation FST.
pub fn expand(segments: &[TaggedSegment], symtab: &SymbolTable, glm: &GlmTable) -> CoreResult<Fst> {
    let mut hyp_fst = Fst::epsilon_accepting();
    for segment in segments {
        let branch = match segment {
            TaggedSegment::Plain(token) => plain_branch(token, symtab)?,
            TaggedSegment::Rule { rule_id, tokens } => rule_branch(rule_id, tokens, symtab, glm)?,
        };
        hyp_fst = ops::concat(&hyp_fst, &branch);
    }
    Ok(hyp_fst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wfst::ops::shortest_path;
    use crate::tagger;
    use crate::tokenize::{tokenize, TokenizerMode};
    use std::cmp::Ordering;

    fn build_symtab(tokens: &[&str]) -> SymbolTable {
        let mut symtab = SymbolTable::new();
        for t in tokens {
            symtab.add_symbol(t.to_string());
            symtab.add_symbol(SymbolTable::aux_form(t));
        }
        symtab
    }

    #[test]
    fn plain_segment_accepts_literal_path() {
        let symtab = build_symtab(&["HERE"]);
        let glm = GlmTable::new();
        let segs = tagger::tag(&tokenize("HERE", TokenizerMode::Whitespace), &glm);
        let hyp_fst = ops::optimize(&expand(&segs, &symtab, &glm).unwrap());
        let (path, weight) = shortest_path(&hyp_fst, |_, _| Ordering::Equal).unwrap();
        assert_eq!(weight, 0.0);
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].ilabel, symtab.symbol_to_id("HERE").unwrap());
    }

    #[test]
    fn hyphen_token_offers_auxiliary_split_branch() {
        let symtab = build_symtab(&["T", "SHIRT", "TSHIRT", "T-SHIRT"]);
        let glm = GlmTable::new();
        let segs = tagger::tag(&tokenize("T-SHIRT", TokenizerMode::Whitespace), &glm);
        let hyp_fst = ops::optimize(&expand(&segs, &symtab, &glm).unwrap());

        let literal_id = symtab.symbol_to_id("T-SHIRT").unwrap();
        let t_aux = symtab.symbol_to_id(&SymbolTable::aux_form("T")).unwrap();
        let tshirt_aux = symtab
            .symbol_to_id(&SymbolTable::aux_form("TSHIRT"))
            .unwrap();

        let start = hyp_fst.start().unwrap();
        let start_ilabels: Vec<_> = hyp_fst.arcs(start).iter().map(|a| a.ilabel).collect();
        assert!(start_ilabels.contains(&literal_id));
        assert!(start_ilabels.contains(&t_aux) || start_ilabels.contains(&tshirt_aux));
    }

    #[test]
    fn rule_segment_offers_auxiliary_alternative() {
        let symtab = build_symtab(&["I'M", "I", "AM"]);
        let glm = GlmTable::parse("I'M,I AM\n").unwrap();
        let segs = tagger::tag(&tokenize("I'M", TokenizerMode::Whitespace), &glm);
        let hyp_fst = ops::optimize(&expand(&segs, &symtab, &glm).unwrap());
        let i_aux = symtab.symbol_to_id(&SymbolTable::aux_form("I")).unwrap();
        let start = hyp_fst.start().unwrap();
        let reaches_i_aux = hyp_fst.arcs(start).iter().any(|a| a.ilabel == i_aux);
        assert!(reaches_i_aux, "expected an arc on the I# auxiliary branch");
    }
}
