//! Fatal error kinds (spec.md §7). All are abort-worthy: the design
//! deliberately has no recovery path for them because a silently skipped or
//! patched-over one would corrupt the leaderboard metric.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("duplicate utterance id {uid:?} in {path}")]
    DuplicateUid { uid: String, path: String },

    #[error("symbol {0:?} was never registered in the symbol table")]
    UnknownSymbol(String),

    #[error("empty composition lattice for utterance {uid:?} (vocabulary/tagger bug)")]
    EmptyLattice { uid: String },

    #[error("zero reference length at corpus level: TER is undefined")]
    ZeroRefLength,

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed GLM rule on line {line}: {reason}")]
    MalformedGlmRule { line: usize, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
