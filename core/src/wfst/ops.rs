//! The FST kernel's operator set: union, concat, closure, invert, relabel,
//! composition, epsilon-removal, shortest-distance, shortest-path.
//!
//! Shortest-distance/shortest-path use Dijkstra rather than a generic
//! acyclic topological DP, because `E_i`/`E_o`'s closures are cyclic
//! automata; Dijkstra is exact here since every tropical weight this crate
//! produces is non-negative (edit costs and rule weights are never
//! negative). This is the "implement the needed operators" branch spec.md
//! §9 names as an acceptable substitute for a full generic FST toolkit.

use super::{Arc, Fst, Label, StateId, Weight, EPSILON, WEIGHT_ONE, WEIGHT_ZERO};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

/// Union of a list of machines: a fresh start state epsilon-connects to each
/// branch's start; each branch's own finals are unchanged.
pub fn union(branches: &[&Fst]) -> Fst {
    let mut out = Fst::new();
    let new_start = out.add_state();
    out.set_start(new_start);

    for branch in branches {
        let Some(branch_start) = branch.start() else {
            continue;
        };
        let offset = out.num_states();
        for state in 0..branch.num_states() {
            let id = out.add_state();
            debug_assert_eq!(id, offset + state);
        }
        for state in 0..branch.num_states() {
            if let Some(w) = branch.final_weight(state) {
                out.set_final(offset + state, w);
            }
            for arc in branch.arcs(state) {
                out.add_arc(
                    offset + state,
                    Arc::new(arc.ilabel, arc.olabel, arc.weight, offset + arc.nextstate),
                );
            }
        }
        out.add_arc(
            new_start,
            Arc::new(EPSILON, EPSILON, WEIGHT_ONE, offset + branch_start),
        );
    }
    out
}

/// Concatenation: every final state of `a` gets an epsilon arc (weighted by
/// its own final weight) into `b`'s start; `a`'s finals stop being final.
pub fn concat(a: &Fst, b: &Fst) -> Fst {
    let (Some(a_start), Some(b_start)) = (a.start(), b.start()) else {
        return Fst::empty();
    };

    let mut out = Fst::new();
    for _ in 0..a.num_states() {
        out.add_state();
    }
    for state in 0..a.num_states() {
        for arc in a.arcs(state) {
            out.add_arc(state, *arc);
        }
    }
    out.set_start(a_start);

    let offset = out.num_states();
    for _ in 0..b.num_states() {
        out.add_state();
    }
    for state in 0..b.num_states() {
        if let Some(w) = b.final_weight(state) {
            out.set_final(offset + state, w);
        }
        for arc in b.arcs(state) {
            out.add_arc(
                offset + state,
                Arc::new(arc.ilabel, arc.olabel, arc.weight, offset + arc.nextstate),
            );
        }
    }

    for state in 0..a.num_states() {
        if let Some(w) = a.final_weight(state) {
            out.add_arc(state, Arc::new(EPSILON, EPSILON, w, offset + b_start));
        }
    }
    out
}

/// Kleene closure: a new start/final state (weight 0, permits zero
/// repetitions) epsilon-connects to `a`'s start; `a`'s finals loop back to
/// the new start with their own final weight.
pub fn closure(a: &Fst) -> Fst {
    let mut out = Fst::new();
    let new_start = out.add_state();
    out.set_start(new_start);
    out.set_final(new_start, WEIGHT_ONE);

    let Some(a_start) = a.start() else {
        return out;
    };

    let offset = out.num_states();
    for _ in 0..a.num_states() {
        out.add_state();
    }
    for state in 0..a.num_states() {
        for arc in a.arcs(state) {
            out.add_arc(
                offset + state,
                Arc::new(arc.ilabel, arc.olabel, arc.weight, offset + arc.nextstate),
            );
        }
    }
    out.add_arc(new_start, Arc::new(EPSILON, EPSILON, WEIGHT_ONE, offset + a_start));
    for state in 0..a.num_states() {
        if let Some(w) = a.final_weight(state) {
            out.add_arc(offset + state, Arc::new(EPSILON, EPSILON, w, new_start));
        }
    }
    out
}

/// Swap `ilabel`/`olabel` on every arc.
pub fn invert(a: &Fst) -> Fst {
    let mut out = Fst::new();
    for _ in 0..a.num_states() {
        out.add_state();
    }
    if let Some(s) = a.start() {
        out.set_start(s);
    }
    for state in 0..a.num_states() {
        if let Some(w) = a.final_weight(state) {
            out.set_final(state, w);
        }
        for arc in a.arcs(state) {
            out.add_arc(
                state,
                Arc::new(arc.olabel, arc.ilabel, arc.weight, arc.nextstate),
            );
        }
    }
    out
}

/// Remap labels on both tapes through `label_map` (identity for labels not
/// present in the map). Used to swap the `<insert>`/`<delete>` markers
/// between the edit transducer's two factors (spec.md §4.5).
pub fn relabel(a: &Fst, label_map: &HashMap<Label, Label>) -> Fst {
    let remap = |l: Label| *label_map.get(&l).unwrap_or(&l);
    let mut out = Fst::new();
    for _ in 0..a.num_states() {
        out.add_state();
    }
    if let Some(s) = a.start() {
        out.set_start(s);
    }
    for state in 0..a.num_states() {
        if let Some(w) = a.final_weight(state) {
            out.set_final(state, w);
        }
        for arc in a.arcs(state) {
            out.add_arc(
                state,
                Arc::new(remap(arc.ilabel), remap(arc.olabel), arc.weight, arc.nextstate),
            );
        }
    }
    out
}

/// Compose `a` and `b`: `a`'s output tape feeds `b`'s input tape.
///
/// Epsilon handling is the standard three-way split but without Mohri's
/// epsilon-matching filter (no `(ε,ε)` precedence state): an `a`-arc with
/// `olabel == ε` advances `a` alone, a `b`-arc with `ilabel == ε` advances
/// `b` alone, and real-symbol arcs advance both in lockstep. This can in
/// principle enumerate a path more than once when both sides offer a free
/// epsilon move at the same product state, but since composition here is
/// only ever used to find a *minimum*-weight path (never to count paths),
/// redundant equal-or-higher-weight copies of a path are harmless — they
/// never change the shortest distance, only (sometimes) the amount of
/// exploration. See spec.md §9: acyclic-lattice composition is allowed to
/// be simplified relative to a full generic toolkit.
pub fn compose(a: &Fst, b: &Fst) -> Fst {
    let (Some(a_start), Some(b_start)) = (a.start(), b.start()) else {
        return Fst::empty();
    };

    let mut out = Fst::new();
    let mut ids: HashMap<(StateId, StateId), StateId> = HashMap::new();
    let mut queue: VecDeque<(StateId, StateId)> = VecDeque::new();

    let start_id = out.add_state();
    out.set_start(start_id);
    ids.insert((a_start, b_start), start_id);
    queue.push_back((a_start, b_start));

    while let Some((ai, bi)) = queue.pop_front() {
        let out_id = ids[&(ai, bi)];

        if let (Some(wa), Some(wb)) = (a.final_weight(ai), b.final_weight(bi)) {
            out.set_final(out_id, wa + wb);
        }

        for arc_a in a.arcs(ai) {
            if arc_a.olabel == EPSILON {
                let next_id = product_state(&mut out, &mut ids, &mut queue, arc_a.nextstate, bi);
                out.add_arc(out_id, Arc::new(arc_a.ilabel, EPSILON, arc_a.weight, next_id));
            }
        }
        for arc_b in b.arcs(bi) {
            if arc_b.ilabel == EPSILON {
                let next_id = product_state(&mut out, &mut ids, &mut queue, ai, arc_b.nextstate);
                out.add_arc(out_id, Arc::new(EPSILON, arc_b.olabel, arc_b.weight, next_id));
            }
        }
        for arc_a in a.arcs(ai) {
            if arc_a.olabel == EPSILON {
                continue;
            }
            for arc_b in b.arcs(bi) {
                if arc_b.ilabel != arc_a.olabel {
                    continue;
                }
                let next_id = product_state(
                    &mut out,
                    &mut ids,
                    &mut queue,
                    arc_a.nextstate,
                    arc_b.nextstate,
                );
                out.add_arc(
                    out_id,
                    Arc::new(
                        arc_a.ilabel,
                        arc_b.olabel,
                        arc_a.weight + arc_b.weight,
                        next_id,
                    ),
                );
            }
        }
    }

    out
}

/// Look up (or allocate, enqueuing for expansion) the output state for a
/// composition product pair.
fn product_state(
    out: &mut Fst,
    ids: &mut HashMap<(StateId, StateId), StateId>,
    queue: &mut VecDeque<(StateId, StateId)>,
    ai: StateId,
    bi: StateId,
) -> StateId {
    *ids.entry((ai, bi)).or_insert_with(|| {
        let id = out.add_state();
        queue.push_back((ai, bi));
        id
    })
}

/// For each state, the set of states reachable via zero-or-more pure `ε:ε`
/// arcs together with the minimum weight of reaching them (Dijkstra
/// restricted to the epsilon subgraph; `state` itself is included at 0).
fn epsilon_closure(a: &Fst, state: StateId) -> Vec<(StateId, Weight)> {
    let mut best: HashMap<StateId, Weight> = HashMap::new();
    best.insert(state, WEIGHT_ONE);
    let mut heap: BinaryHeap<DijkstraEntry> = BinaryHeap::new();
    heap.push(DijkstraEntry {
        neg_weight: -WEIGHT_ONE,
        state,
    });

    while let Some(DijkstraEntry { neg_weight, state: u }) = heap.pop() {
        let d = -neg_weight;
        if d > *best.get(&u).unwrap_or(&WEIGHT_ZERO) {
            continue;
        }
        for arc in a.arcs(u) {
            if arc.ilabel != EPSILON || arc.olabel != EPSILON {
                continue;
            }
            let nd = d + arc.weight;
            if nd < *best.get(&arc.nextstate).unwrap_or(&WEIGHT_ZERO) {
                best.insert(arc.nextstate, nd);
                heap.push(DijkstraEntry {
                    neg_weight: -nd,
                    state: arc.nextstate,
                });
            }
        }
    }

    best.into_iter().collect()
}

/// Epsilon-removal: fold pure `ε:ε` arcs into the weight of the real arcs
/// (and final weights) they lead to, then drop them.
pub fn remove_epsilons(a: &Fst) -> Fst {
    let mut out = Fst::new();
    for _ in 0..a.num_states() {
        out.add_state();
    }
    if let Some(s) = a.start() {
        out.set_start(s);
    }

    for state in 0..a.num_states() {
        let closure = epsilon_closure(a, state);

        let mut best_final: Option<Weight> = None;
        for &(mid, w_eps) in &closure {
            if let Some(w_final) = a.final_weight(mid) {
                let total = w_eps + w_final;
                best_final = Some(best_final.map_or(total, |cur: Weight| cur.min(total)));
            }
        }
        if let Some(w) = best_final {
            out.set_final(state, w);
        }

        for &(mid, w_eps) in &closure {
            for arc in a.arcs(mid) {
                if arc.ilabel == EPSILON && arc.olabel == EPSILON {
                    continue;
                }
                out.add_arc(
                    state,
                    Arc::new(arc.ilabel, arc.olabel, w_eps + arc.weight, arc.nextstate),
                );
            }
        }
    }
    out
}

/// Drop exact-duplicate arcs from every state (same label pair, weight and
/// destination) and states unreachable from the start.
fn dedup_and_trim(a: &Fst) -> Fst {
    let Some(start) = a.start() else {
        return Fst::empty();
    };

    let mut reachable = vec![false; a.num_states()];
    let mut stack = vec![start];
    reachable[start] = true;
    while let Some(u) = stack.pop() {
        for arc in a.arcs(u) {
            if !reachable[arc.nextstate] {
                reachable[arc.nextstate] = true;
                stack.push(arc.nextstate);
            }
        }
    }

    let mut out = Fst::new();
    for _ in 0..a.num_states() {
        out.add_state();
    }
    out.set_start(start);
    for state in 0..a.num_states() {
        if !reachable[state] {
            continue;
        }
        if let Some(w) = a.final_weight(state) {
            out.set_final(state, w);
        }
        let mut seen: Vec<Arc> = Vec::new();
        for arc in a.arcs(state) {
            if !reachable[arc.nextstate] {
                continue;
            }
            if seen.iter().any(|s| {
                s.ilabel == arc.ilabel
                    && s.olabel == arc.olabel
                    && s.nextstate == arc.nextstate
                    && s.weight == arc.weight
            }) {
                continue;
            }
            seen.push(*arc);
            out.add_arc(state, *arc);
        }
    }
    out
}

/// Best-effort optimization pass: epsilon-removal followed by duplicate-arc
/// and unreachable-state trimming. This is intentionally not a general
/// Hopcroft-style minimizer (see spec.md §9 on simplifying the FST kernel
/// for acyclic-in-practice lattices); it keeps the automata the GLM tagger
/// and hypothesis expansion build from blowing up with inert epsilon
/// scaffolding, nothing more.
pub fn optimize(a: &Fst) -> Fst {
    dedup_and_trim(&remove_epsilons(a))
}

#[derive(PartialEq)]
struct DijkstraEntry {
    neg_weight: Weight,
    state: StateId,
}

impl Eq for DijkstraEntry {}

impl Ord for DijkstraEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.neg_weight
            .partial_cmp(&other.neg_weight)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for DijkstraEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest distance from the start state to every state, via Dijkstra.
/// Valid because every weight produced by this crate is non-negative.
pub fn shortest_distance(a: &Fst) -> Vec<Weight> {
    let mut dist = vec![WEIGHT_ZERO; a.num_states()];
    let Some(start) = a.start() else {
        return dist;
    };
    dist[start] = WEIGHT_ONE;

    let mut heap = BinaryHeap::new();
    heap.push(DijkstraEntry {
        neg_weight: -WEIGHT_ONE,
        state: start,
    });

    while let Some(DijkstraEntry { neg_weight, state: u }) = heap.pop() {
        let d = -neg_weight;
        if d > dist[u] {
            continue;
        }
        for arc in a.arcs(u) {
            let nd = d + arc.weight;
            if nd < dist[arc.nextstate] {
                dist[arc.nextstate] = nd;
                heap.push(DijkstraEntry {
                    neg_weight: -nd,
                    state: arc.nextstate,
                });
            }
        }
    }
    dist
}

/// The minimum-cost accepting path through `a`, as the ordered arcs it
/// traverses, plus its total weight. `tie_break(candidate, incumbent)`
/// decides, when two arcs into the same state tie on total distance, which
/// one should be kept as that state's best predecessor — callers use this
/// to impose the deterministic `C > S > D > I` preference spec.md §9 asks
/// for. Returns `None` if no accepting path exists (the lattice is empty).
///
/// Finding ties is split from computing `dist`: first `shortest_distance`
/// resolves every state's final distance via Dijkstra, then a second,
/// order-independent pass walks every arc in the machine once and applies
/// `tie_break` wherever an arc lies on some shortest path to its target
/// (`dist[u] + arc.weight == dist[target]`). Folding the tie-break into the
/// Dijkstra relaxation loop itself is tempting but not authoritative: which
/// of two equal-distance predecessors gets popped, and in what order their
/// outgoing arcs get relaxed, depends on `BinaryHeap`'s arbitrary ordering of
/// equal-priority entries, not on `tie_break`. Doing the relaxation only
/// after every `dist` value is final means every qualifying arc into a given
/// state is compared against the current incumbent exactly once, in a result
/// that depends only on `tie_break` — never on pop order.
pub fn shortest_path(
    a: &Fst,
    mut tie_break: impl FnMut(&Arc, &Arc) -> Ordering,
) -> Option<(Vec<Arc>, Weight)> {
    a.start()?;

    let dist = shortest_distance(a);
    let mut pred: Vec<Option<(StateId, Arc)>> = vec![None; a.num_states()];

    for u in 0..a.num_states() {
        if dist[u] == WEIGHT_ZERO {
            continue;
        }
        for arc in a.arcs(u) {
            let nd = dist[u] + arc.weight;
            if nd != dist[arc.nextstate] {
                continue;
            }
            let replace = match &pred[arc.nextstate] {
                None => true,
                Some((_, incumbent)) => tie_break(arc, incumbent) == Ordering::Less,
            };
            if replace {
                pred[arc.nextstate] = Some((u, *arc));
            }
        }
    }

    let mut best_final: Option<(StateId, Weight)> = None;
    for state in 0..a.num_states() {
        if let Some(w) = a.final_weight(state) {
            if dist[state] == WEIGHT_ZERO {
                continue;
            }
            let total = dist[state] + w;
            best_final = Some(match best_final {
                Some((bs, bw)) if bw <= total => (bs, bw),
                _ => (state, total),
            });
        }
    }
    let (mut cur, total) = best_final?;

    let mut path = Vec::new();
    while let Some((prev, arc)) = pred[cur] {
        path.push(arc);
        cur = prev;
    }
    path.reverse();
    Some((path, total))
}
