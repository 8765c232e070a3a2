//! Inspection tool: build the evaluation vocabulary/symbol table for a
//! given ref/hyp/glm triple the same way `asr-score` does, then dump it as
//! a sorted FST key set. Mirrors `list_fst_keys`'s streaming dump, but over
//! a table built fresh per run rather than loaded from a prebuilt file.

use anyhow::Result;
use asr_score_core::{Aligner, AlignerConfig, GlmTable, UtteranceSet};
use clap::Parser;
use fst::Streamer;
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    #[arg(long = "ref")]
    ref_path: PathBuf,
    #[arg(long)]
    hyp: PathBuf,
    #[arg(long)]
    glm: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let ref_set = UtteranceSet::load(&args.ref_path)?;
    let hyp_set = UtteranceSet::load(&args.hyp)?;
    let glm = GlmTable::load(&args.glm)?;
    let num_rules = glm.len();

    let aligner = Aligner::build(&ref_set, &hyp_set, glm, &AlignerConfig::default());
    let symtab = aligner.symtab();

    println!("symbols: {}", symtab.len());
    println!("glm rules: {}", num_rules);

    let set = symtab.to_fst_set()?;
    let mut stream = set.stream();
    while let Some(key) = stream.next() {
        if let Ok(s) = std::str::from_utf8(key) {
            println!("  {s}");
        }
    }

    Ok(())
}
