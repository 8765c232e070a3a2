//! Bijective string<->integer mapping shared by every FST the aligner
//! builds. Id `0` is reserved for `<epsilon>`; re-adding an existing symbol
//! is idempotent and returns its existing id.
//!
//! Reference upstream shape: `core/src/lexicon.rs`'s `HashMap`-backed
//! insert/lookup pair, generalized from phrase lists to a flat symbol
//! alphabet.

use ahash::AHashMap;
use fst::Set;

pub const EPSILON_ID: u32 = 0;
pub const EPSILON_SYMBOL: &str = "<epsilon>";

/// Suffix marking the auxiliary ("primed") form of a base token, introduced
/// by GLM/hyphen expansion so the edit transducer can match it against the
/// plain form at zero cost without double-counting edits.
pub const AUX_SUFFIX: char = '#';

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    id_to_symbol: Vec<String>,
    symbol_to_id: AHashMap<String, u32>,
}

impl SymbolTable {
    /// A fresh table containing only `<epsilon>` at id 0.
    pub fn new() -> Self {
        let mut table = Self {
            id_to_symbol: Vec::new(),
            symbol_to_id: AHashMap::new(),
        };
        let id = table.add_symbol(EPSILON_SYMBOL);
        debug_assert_eq!(id, EPSILON_ID);
        table
    }

    /// Insert `symbol`, returning its id. Re-inserting an existing symbol
    /// returns the id it already has.
    pub fn add_symbol<S: Into<String>>(&mut self, symbol: S) -> u32 {
        let symbol = symbol.into();
        if let Some(&id) = self.symbol_to_id.get(&symbol) {
            return id;
        }
        let id = self.id_to_symbol.len() as u32;
        self.symbol_to_id.insert(symbol.clone(), id);
        self.id_to_symbol.push(symbol);
        id
    }

    /// Look up the id for an existing symbol, if any.
    pub fn symbol_to_id(&self, symbol: &str) -> Option<u32> {
        self.symbol_to_id.get(symbol).copied()
    }

    /// Look up the string for an id that must have been previously
    /// assigned by this table.
    pub fn id_to_symbol(&self, id: u32) -> &str {
        &self.id_to_symbol[id as usize]
    }

    pub fn len(&self) -> usize {
        self.id_to_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_symbol.is_empty()
    }

    /// The auxiliary ("primed") form of `symbol`, e.g. `"ni"` -> `"ni#"`.
    pub fn aux_form(symbol: &str) -> String {
        format!("{symbol}{AUX_SUFFIX}")
    }

    /// Strip at most one trailing `#` from `symbol`, for the edit
    /// classifier's "equality modulo trailing `#`" rule (spec.md §4.6).
    pub fn strip_aux(symbol: &str) -> &str {
        symbol.strip_suffix(AUX_SUFFIX).unwrap_or(symbol)
    }

    /// A sorted `fst::Set` view of every symbol currently registered,
    /// consumed by `tools/dump_symtab` the same way an `fst::Map` gets
    /// streamed for inspection.
    pub fn to_fst_set(&self) -> fst::Result<Set<Vec<u8>>> {
        let mut symbols: Vec<&str> = self.id_to_symbol.iter().map(String::as_str).collect();
        symbols.sort_unstable();
        Set::from_iter(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_is_id_zero() {
        let table = SymbolTable::new();
        assert_eq!(table.symbol_to_id(EPSILON_SYMBOL), Some(EPSILON_ID));
        assert_eq!(table.id_to_symbol(EPSILON_ID), EPSILON_SYMBOL);
    }

    #[test]
    fn add_symbol_is_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.add_symbol("HEY");
        let b = table.add_symbol("HEY");
        assert_eq!(a, b);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn strip_aux_removes_one_trailing_hash() {
        assert_eq!(SymbolTable::strip_aux("I#"), "I");
        assert_eq!(SymbolTable::strip_aux("I"), "I");
        assert_eq!(SymbolTable::aux_form("I"), "I#");
    }
}
