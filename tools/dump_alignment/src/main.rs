//! Inspection tool: align one utterance and print its best path in detail
//! (edit tag, ref surface, hyp surface per arc) in addition to the normal
//! pretty-print rendering, for debugging a single GLM rule or FST shape.

use anyhow::{Context, Result};
use asr_score_core::{pretty, Aligner, AlignerConfig, GlmTable, UtteranceSet};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    #[arg(long = "ref")]
    ref_path: PathBuf,
    #[arg(long)]
    hyp: PathBuf,
    #[arg(long)]
    glm: PathBuf,
    /// Utterance id to align and print. Must exist in both files.
    #[arg(long)]
    uid: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let ref_set = UtteranceSet::load(&args.ref_path)?;
    let hyp_set = UtteranceSet::load(&args.hyp)?;
    let glm = GlmTable::load(&args.glm)?;

    let ref_utt = ref_set
        .get(&args.uid)
        .with_context(|| format!("uid {:?} not found in reference file", args.uid))?;
    let hyp_utt = hyp_set
        .get(&args.uid)
        .with_context(|| format!("uid {:?} not found in hypothesis file", args.uid))?;

    let aligner = Aligner::build(&ref_set, &hyp_set, glm, &AlignerConfig::default());
    let alignment = aligner.align_utterance(&args.uid, &ref_utt.text, &hyp_utt.text)?;

    println!("{}", pretty::render(&alignment));
    println!();
    println!("score: {}", alignment.score);
    println!(
        "cor={} sub={} ins={} del={}",
        alignment.correct, alignment.sub, alignment.ins, alignment.del
    );
    for (idx, edit) in alignment.edits.iter().enumerate() {
        println!(
            "  [{idx}] {:>1} ref={:?} hyp={:?}",
            edit.tag.as_str(),
            edit.ref_surface,
            edit.hyp_surface
        );
    }

    Ok(())
}
