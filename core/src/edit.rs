//! Two-factor edit-distance transducer (spec.md §4.5).
//!
//! `E_i` (left factor) consumes a reference symbol and either accepts it
//! (the match arc carries the symbol itself on both tapes, so it survives
//! onto the middle tape joining `E_i` to `E_o`), deletes it, or substitutes
//! it, each non-match choice emitting a half-cost edit label; it can also
//! insert on `ε` input. `E_o` (right factor) is
//! `invert(E_i)` with `<insert>`/`<delete>` swapped, so the label an
//! insertion emits on the left is the label a deletion consumes on the
//! right and vice versa — without the swap, `E_i`'s "delete" arc consumes a
//! symbol but emits nothing, and an unmodified `invert` would turn that into
//! an arc that *emits* a symbol from nothing, i.e. an insertion, which is
//! backwards. `E_o` additionally admits every `t : t#` pairing at zero cost
//! so a hypothesis token reached through GLM/hyphen expansion matches its
//! reference form for free.

use crate::config::EditCosts;
use crate::wfst::{ops, Arc, Fst, Label, StateId, EPSILON};
use crate::symtab::SymbolTable;
use std::collections::HashMap;

pub const INSERT_TAG: &str = "<insert>";
pub const DELETE_TAG: &str = "<delete>";
pub const SUBSTITUTE_TAG: &str = "<substitute>";

/// The pair of composed factors making up the weighted edit-distance
/// transducer, plus the label ids a per-utterance aligner needs to classify
/// arcs of the final best path.
pub struct EditTransducer {
    pub e_i: Fst,
    pub e_o: Fst,
    pub insert_label: Label,
    pub delete_label: Label,
    pub substitute_label: Label,
}

impl EditTransducer {
    /// Build the edit transducer over every base symbol in `vocab` (the
    /// evaluation vocabulary, excluding `<epsilon>`, auxiliary forms and
    /// rule tags — those never participate as a *reference* symbol).
    ///
    /// `bound` caps the number of non-match (insert/delete/substitute) edits
    /// admitted in any one alignment; `0` means unbounded (spec.md §4.5).
    pub fn build(symtab: &mut SymbolTable, vocab: &[String], costs: &EditCosts, bound: u32) -> Self {
        let insert_label = symtab.add_symbol(INSERT_TAG);
        let delete_label = symtab.add_symbol(DELETE_TAG);
        let substitute_label = symtab.add_symbol(SUBSTITUTE_TAG);

        let vocab_ids: Vec<Label> = vocab
            .iter()
            .map(|t| symtab.symbol_to_id(t).expect("vocab symbol must be registered"))
            .collect();

        let e_i = build_e_i(
            &vocab_ids,
            insert_label,
            delete_label,
            substitute_label,
            costs,
            bound,
        );

        let mut swap = HashMap::new();
        swap.insert(insert_label, delete_label);
        swap.insert(delete_label, insert_label);
        let e_o_edits = ops::relabel(&ops::invert(&e_i), &swap);

        let aux_pairs = build_auxiliary_extension(symtab, vocab);
        let e_o = ops::union(&[&e_o_edits, &aux_pairs]);

        Self {
            e_i,
            e_o,
            insert_label,
            delete_label,
            substitute_label,
        }
    }
}

/// From a single state, every vocabulary symbol gets an accept arc (cost 0,
/// the symbol itself on both tapes so the match survives onto the middle
/// tape that links ref to hyp), a delete arc (cost `delete/2`, emits
/// `<delete>`), and a substitute arc
/// (cost `substitute/2`, emits `<substitute>`); an insert arc on `ε` input
/// (cost `insert/2`, emits `<insert>`) is also available. Closing this
/// single-state fragment under Kleene star gives `E_i` over an unbounded
/// reference string (`bound == 0`).
///
/// With a nonzero `bound`, the fragment is instead replicated into `bound +
/// 1` states counting non-match edits used so far: accept arcs stay within a
/// state, edit arcs (delete/substitute/insert) advance to the next counting
/// state and are simply absent once `bound` is reached. Every counting state
/// is final, so a path may stop having used anywhere from `0` to `bound`
/// edits.
fn build_e_i(
    vocab_ids: &[Label],
    insert_label: Label,
    delete_label: Label,
    substitute_label: Label,
    costs: &EditCosts,
    bound: u32,
) -> Fst {
    if bound == 0 {
        let mut step = Fst::new();
        let s = step.add_state();
        step.set_start(s);
        step.set_final(s, 0.0);

        for &sym in vocab_ids {
            step.add_arc(s, Arc::new(sym, sym, 0.0, s));
            step.add_arc(s, Arc::new(sym, delete_label, costs.delete / 2.0, s));
            step.add_arc(s, Arc::new(sym, substitute_label, costs.substitute / 2.0, s));
        }
        step.add_arc(s, Arc::new(EPSILON, insert_label, costs.insert / 2.0, s));

        return ops::closure(&step);
    }

    let bound = bound as usize;
    let mut fst = Fst::new();
    let states: Vec<StateId> = (0..=bound).map(|_| fst.add_state()).collect();
    fst.set_start(states[0]);
    for &s in &states {
        fst.set_final(s, 0.0);
    }

    for (k, &s) in states.iter().enumerate() {
        for &sym in vocab_ids {
            fst.add_arc(s, Arc::new(sym, sym, 0.0, s));
            if k < bound {
                let next = states[k + 1];
                fst.add_arc(s, Arc::new(sym, delete_label, costs.delete / 2.0, next));
                fst.add_arc(
                    s,
                    Arc::new(sym, substitute_label, costs.substitute / 2.0, next),
                );
            }
        }
        if k < bound {
            let next = states[k + 1];
            fst.add_arc(s, Arc::new(EPSILON, insert_label, costs.insert / 2.0, next));
        }
    }
    fst
}

/// `t : t#` at zero cost for every vocabulary symbol, closed under Kleene
/// star so it can apply at any position in the hypothesis (spec.md §4.5
/// "Auxiliary extension").
fn build_auxiliary_extension(symtab: &mut SymbolTable, vocab: &[String]) -> Fst {
    let mut step = Fst::new();
    let s = step.add_state();
    step.set_start(s);
    step.set_final(s, 0.0);

    for token in vocab {
        let plain = symtab
            .symbol_to_id(token)
            .expect("vocab symbol must be registered");
        let aux = symtab.add_symbol(SymbolTable::aux_form(token));
        step.add_arc(s, Arc::new(plain, aux, 0.0, s));
    }

    ops::closure(&step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wfst::ops::shortest_path;
    use std::cmp::Ordering;

    fn tied_tie_break(_a: &Arc, _b: &Arc) -> Ordering {
        Ordering::Equal
    }

    #[test]
    fn matching_symbol_costs_zero_through_both_factors() {
        let mut symtab = SymbolTable::new();
        let hey = symtab.add_symbol("HEY".to_string());
        let vocab = vec!["HEY".to_string()];
        let edit = EditTransducer::build(&mut symtab, &vocab, &EditCosts::default(), 0);

        let ref_fst = Fst::acceptor(&[hey]);
        let lattice = ops::compose(&ops::compose(&ref_fst, &edit.e_i), &edit.e_o);
        let optimized = ops::optimize(&lattice);
        let (_path, weight) = shortest_path(&optimized, tied_tie_break).unwrap();
        assert_eq!(weight, 0.0);
    }

    #[test]
    fn pure_deletion_costs_unit_delete_cost_when_costs_are_equal() {
        let mut symtab = SymbolTable::new();
        let hey = symtab.add_symbol("HEY".to_string());
        let vocab = vec!["HEY".to_string()];
        let costs = EditCosts::default();
        let edit = EditTransducer::build(&mut symtab, &vocab, &costs, 0);

        let ref_fst = Fst::acceptor(&[hey]);
        let empty_hyp = Fst::epsilon_accepting();
        let lattice = ops::compose(
            &ops::compose(&ref_fst, &edit.e_i),
            &ops::compose(&edit.e_o, &empty_hyp),
        );
        let optimized = ops::optimize(&lattice);
        let (_path, weight) = shortest_path(&optimized, tied_tie_break).unwrap();
        assert_eq!(weight, costs.delete);
    }

    #[test]
    fn bound_of_one_admits_a_single_substitution_but_not_two() {
        let vocab = vec!["HEY".to_string(), "THERE".to_string(), "YOU".to_string(), "FOO".to_string()];
        let costs = EditCosts::default();

        // bound = 1: one substitution (HEY -> THERE) fits.
        let mut symtab = SymbolTable::new();
        for t in &vocab {
            symtab.add_symbol(t.clone());
        }
        let hey = symtab.symbol_to_id("HEY").unwrap();
        let there = symtab.symbol_to_id("THERE").unwrap();
        let edit = EditTransducer::build(&mut symtab, &vocab, &costs, 1);

        let ref_fst = Fst::acceptor(&[hey]);
        let hyp_fst = Fst::acceptor(&[there]);
        let lattice = ops::compose(
            &ops::compose(&ref_fst, &edit.e_i),
            &ops::compose(&edit.e_o, &hyp_fst),
        );
        let optimized = ops::optimize(&lattice);
        let (_path, weight) = shortest_path(&optimized, tied_tie_break).unwrap();
        assert_eq!(weight, costs.substitute);

        // bound = 1: two substitutions (HEY YOU -> THERE FOO) has no path.
        let mut symtab2 = SymbolTable::new();
        for t in &vocab {
            symtab2.add_symbol(t.clone());
        }
        let hey2 = symtab2.symbol_to_id("HEY").unwrap();
        let you2 = symtab2.symbol_to_id("YOU").unwrap();
        let there2 = symtab2.symbol_to_id("THERE").unwrap();
        let foo2 = symtab2.symbol_to_id("FOO").unwrap();
        let edit2 = EditTransducer::build(&mut symtab2, &vocab, &costs, 1);

        let ref_fst2 = Fst::acceptor(&[hey2, you2]);
        let hyp_fst2 = Fst::acceptor(&[there2, foo2]);
        let lattice2 = ops::compose(
            &ops::compose(&ref_fst2, &edit2.e_i),
            &ops::compose(&edit2.e_o, &hyp_fst2),
        );
        let optimized2 = ops::optimize(&lattice2);
        assert!(shortest_path(&optimized2, tied_tie_break).is_none());
    }
}
