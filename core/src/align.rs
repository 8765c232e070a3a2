//! Per-utterance alignment orchestration (spec.md §4.6) and the run-level
//! setup (§4.1, §4.2) that happens once: vocabulary derivation, symbol
//! table construction, and building the shared immutable GLM tagger table
//! and edit transducer. Fan-out across utterances is parallelized with
//! `rayon` (spec.md §5 explicitly allows this provided result ordering and
//! aggregation stay deterministic).

use crate::config::AlignerConfig;
use crate::edit::EditTransducer;
use crate::error::{CoreError, CoreResult};
use crate::expand;
use crate::wfst::{ops, Arc};
use crate::glm::GlmTable;
use crate::io::{Utterance, UtteranceSet};
use crate::symtab::SymbolTable;
use crate::tagger;
use crate::tokenize::{hyphen_variants, tokenize, TokenizerMode};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTag {
    C,
    S,
    I,
    D,
}

impl EditTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditTag::C => "",
            EditTag::S => "S",
            EditTag::I => "I",
            EditTag::D => "D",
        }
    }

    /// Tie-break rank for spec.md §9's deterministic `C > S > D > I`
    /// preference among equal-cost paths.
    fn rank(self) -> u8 {
        match self {
            EditTag::C => 0,
            EditTag::S => 1,
            EditTag::D => 2,
            EditTag::I => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditRecord {
    pub tag: EditTag,
    pub ref_surface: String,
    pub hyp_surface: String,
}

#[derive(Debug, Clone)]
pub struct UtteranceAlignment {
    pub uid: String,
    pub raw_hyp_text: String,
    /// Negated best-path cost, per spec.md §6's `"score":-<dist>` field.
    pub score: f64,
    pub edits: Vec<EditRecord>,
    pub correct: u32,
    pub sub: u32,
    pub ins: u32,
    pub del: u32,
}

impl UtteranceAlignment {
    pub fn ref_len(&self) -> u32 {
        self.correct + self.sub + self.del
    }

    pub fn hyp_len(&self) -> u32 {
        self.correct + self.sub + self.ins
    }

    pub fn has_error(&self) -> bool {
        self.sub + self.ins + self.del > 0
    }
}

/// Everything the aligner needs that is built once per run and shared
/// read-only across utterances (spec.md §3 "Lifecycle", §5).
pub struct Aligner {
    symtab: SymbolTable,
    glm: GlmTable,
    edit: EditTransducer,
    tokenizer: TokenizerMode,
}

fn classify(symtab: &SymbolTable, arc: &Arc) -> EditTag {
    use crate::wfst::EPSILON;
    if arc.ilabel != EPSILON && arc.olabel != EPSILON {
        let a = SymbolTable::strip_aux(symtab.id_to_symbol(arc.ilabel));
        let b = SymbolTable::strip_aux(symtab.id_to_symbol(arc.olabel));
        if a == b {
            EditTag::C
        } else {
            EditTag::S
        }
    } else if arc.ilabel == EPSILON {
        EditTag::I
    } else {
        EditTag::D
    }
}

fn surface(symtab: &SymbolTable, label: crate::wfst::Label) -> String {
    if label == crate::wfst::EPSILON {
        "*".to_string()
    } else {
        symtab.id_to_symbol(label).to_string()
    }
}

impl Aligner {
    /// The symbol table built for this run, exposed for inspection tooling.
    pub fn symtab(&self) -> &SymbolTable {
        &self.symtab
    }

    /// The GLM table this aligner was built with, exposed for inspection
    /// tooling.
    pub fn glm(&self) -> &GlmTable {
        &self.glm
    }

    /// Derive the evaluation vocabulary (spec.md §4.2): every token of every
    /// utterance that will actually be scored, every GLM phrase token, and
    /// hyphen-derived variants, then build the symbol table and edit
    /// transducer over it.
    pub fn build(
        ref_set: &UtteranceSet,
        hyp_set: &UtteranceSet,
        glm: GlmTable,
        config: &AlignerConfig,
    ) -> Self {
        let mut vocab: Vec<String> = Vec::new();
        let mut push_with_hyphens = |vocab: &mut Vec<String>, token: &str| {
            vocab.push(token.to_string());
            if let Some((parts, joined)) = hyphen_variants(token) {
                vocab.extend(parts);
                vocab.push(joined);
            }
        };

        for utt in ref_set.iter() {
            for t in tokenize(&utt.text, config.tokenizer) {
                push_with_hyphens(&mut vocab, &t);
            }
        }
        for utt in hyp_set.iter() {
            for t in tokenize(&utt.text, config.tokenizer) {
                push_with_hyphens(&mut vocab, &t);
            }
        }
        for rule in glm.rules() {
            for phrase in &rule.phrases {
                for t in phrase.split_whitespace() {
                    push_with_hyphens(&mut vocab, t);
                }
            }
        }
        vocab.sort();
        vocab.dedup();

        let mut symtab = SymbolTable::new();
        for token in &vocab {
            symtab.add_symbol(token.clone());
        }
        for rule in glm.rules() {
            symtab.add_symbol(rule.rule_id.clone());
        }

        let edit = EditTransducer::build(&mut symtab, &vocab, &config.costs, config.bound);

        Self {
            symtab,
            glm,
            edit,
            tokenizer: config.tokenizer,
        }
    }

    /// Align a single utterance (spec.md §4.6, steps 1-6).
    pub fn align_utterance(&self, uid: &str, ref_text: &str, hyp_text: &str) -> CoreResult<UtteranceAlignment> {
        let ref_tokens = tokenize(ref_text, self.tokenizer);
        let hyp_tokens = tokenize(hyp_text, self.tokenizer);

        let ref_ids = ref_tokens
            .iter()
            .map(|t| {
                self.symtab
                    .symbol_to_id(t)
                    .ok_or_else(|| CoreError::UnknownSymbol(t.clone()))
            })
            .collect::<CoreResult<Vec<_>>>()?;
        let ref_fst = crate::wfst::Fst::acceptor(&ref_ids);

        let segments = tagger::tag(&hyp_tokens, &self.glm);
        let hyp_fst = expand::expand(&segments, &self.symtab, &self.glm)?;

        let half = ops::compose(&ops::compose(&ref_fst, &self.edit.e_i), &ops::compose(&self.edit.e_o, &hyp_fst));
        let lattice = ops::optimize(&half);

        let symtab = &self.symtab;
        let tie_break = |a: &Arc, b: &Arc| classify(symtab, a).rank().cmp(&classify(symtab, b).rank());
        let Some((path, weight)) = ops::shortest_path(&lattice, tie_break) else {
            return Err(CoreError::EmptyLattice { uid: uid.to_string() });
        };

        let mut edits = Vec::with_capacity(path.len());
        let (mut correct, mut sub, mut ins, mut del) = (0u32, 0u32, 0u32, 0u32);
        for arc in &path {
            let tag = classify(&self.symtab, arc);
            match tag {
                EditTag::C => correct += 1,
                EditTag::S => sub += 1,
                EditTag::I => ins += 1,
                EditTag::D => del += 1,
            }
            edits.push(EditRecord {
                tag,
                ref_surface: surface(&self.symtab, arc.ilabel),
                hyp_surface: surface(&self.symtab, arc.olabel),
            });
        }

        Ok(UtteranceAlignment {
            uid: uid.to_string(),
            raw_hyp_text: hyp_text.to_string(),
            score: -weight,
            edits,
            correct,
            sub,
            ins,
            del,
        })
    }

    /// Align every hyp utterance that has a non-empty matching reference
    /// (spec.md §7). Returns results in sorted-uid order together with the
    /// number of hyp utterances that had no matching reference.
    pub fn align_corpus(
        &self,
        ref_set: &UtteranceSet,
        hyp_set: &UtteranceSet,
        logk: u32,
    ) -> CoreResult<(Vec<UtteranceAlignment>, usize)> {
        let evaluable: Vec<&Utterance> = hyp_set.iter().collect();
        let num_hyp_without_ref = AtomicUsize::new(0);
        let done = AtomicUsize::new(0);

        let results: Vec<Option<CoreResult<UtteranceAlignment>>> = evaluable
            .par_iter()
            .map(|hyp_utt| {
                let Some(ref_utt) = ref_set.get(&hyp_utt.uid) else {
                    warn!(uid = %hyp_utt.uid, "no reference for hyp utterance");
                    num_hyp_without_ref.fetch_add(1, AtomicOrdering::Relaxed);
                    return None;
                };
                if ref_utt.text.is_empty() {
                    warn!(uid = %hyp_utt.uid, "empty reference text, skipping");
                    return None;
                }

                let result = self.align_utterance(&hyp_utt.uid, &ref_utt.text, &hyp_utt.text);

                if logk > 0 {
                    let n = done.fetch_add(1, AtomicOrdering::Relaxed) + 1;
                    if n % logk as usize == 0 {
                        info!(utterances = n, "alignment progress");
                    }
                }
                Some(result)
            })
            .collect();

        let mut aligned = Vec::with_capacity(results.len());
        for result in results.into_iter().flatten() {
            aligned.push(result?);
        }

        Ok((aligned, num_hyp_without_ref.load(AtomicOrdering::Relaxed)))
    }
}
