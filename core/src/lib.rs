//! asr-score-core
//!
//! GLM-aware edit-distance aligner for ASR hypothesis scoring: tokenizer and
//! symbol table, a from-scratch weighted FST kernel, a GLM rule table and
//! tagger, hypothesis ("sausage") expansion, the two-factor edit transducer,
//! per-utterance alignment, pretty-printing, and corpus statistics.
//!
//! Public API surface mirrors the pipeline: `io` and `glm` load the two
//! input files; `Aligner::build` compiles the shared immutable state once
//! per run; `Aligner::align_corpus` fans out per-utterance alignment
//! (parallelized with `rayon`); `stats::ErrorStats` and `pretty::render`
//! turn the results into the reported metrics and diff output.

pub mod align;
pub mod config;
pub mod edit;
pub mod error;
pub mod expand;
pub mod glm;
pub mod io;
pub mod pretty;
pub mod stats;
pub mod symtab;
pub mod tagger;
pub mod tokenize;
pub mod wfst;

pub use align::{Aligner, EditRecord, EditTag, UtteranceAlignment};
pub use config::{AlignerConfig, EditCosts};
pub use error::{CoreError, CoreResult};
pub use glm::{GlmRule, GlmTable};
pub use io::{Utterance, UtteranceSet};
pub use stats::ErrorStats;
pub use symtab::SymbolTable;
pub use tokenize::TokenizerMode;
