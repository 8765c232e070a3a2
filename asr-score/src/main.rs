//! CLI entry point (spec.md §6): loads a reference file, a hypothesis file
//! and a GLM rule CSV, aligns every hypothesis utterance against its
//! reference, and writes a per-utterance result stream plus an overall
//! statistics block.

use anyhow::{Context, Result};
use asr_score_core::{
    Aligner, AlignerConfig, ErrorStats, GlmTable, TokenizerMode, UtteranceAlignment, UtteranceSet,
};
use clap::Parser;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;

/// Score an ASR hypothesis file against a reference file.
#[derive(Parser, Debug)]
#[command(name = "asr-score", version, about)]
struct Args {
    /// Reference Kaldi-archive text file (UID<whitespace>TEXT per line).
    #[arg(long = "ref", value_name = "PATH")]
    ref_path: PathBuf,

    /// Hypothesis Kaldi-archive text file.
    #[arg(long, value_name = "PATH")]
    hyp: PathBuf,

    /// GLM rule CSV.
    #[arg(long, value_name = "PATH")]
    glm: PathBuf,

    /// Tokenizer mode.
    #[arg(long, value_enum, default_value_t = Tokenizer::Whitespace)]
    tokenizer: Tokenizer,

    /// Log progress to stderr every this many utterances.
    #[arg(long, default_value_t = 500)]
    logk: u32,

    /// Where to write the per-utterance result stream.
    result_file: PathBuf,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Tokenizer {
    Whitespace,
    Char,
}

impl From<Tokenizer> for TokenizerMode {
    fn from(t: Tokenizer) -> Self {
        match t {
            Tokenizer::Whitespace => TokenizerMode::Whitespace,
            Tokenizer::Char => TokenizerMode::Char,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let ref_set = UtteranceSet::load(&args.ref_path)
        .with_context(|| format!("loading reference file {}", args.ref_path.display()))?;
    let hyp_set = UtteranceSet::load(&args.hyp)
        .with_context(|| format!("loading hypothesis file {}", args.hyp.display()))?;
    let glm = GlmTable::load(&args.glm)
        .with_context(|| format!("loading GLM rules {}", args.glm.display()))?;

    let config = AlignerConfig {
        tokenizer: args.tokenizer.into(),
        logk: args.logk,
        ..AlignerConfig::default()
    };

    tracing::info!(
        ref_utts = ref_set.len(),
        hyp_utts = hyp_set.len(),
        glm_rules = glm.len(),
        "loaded inputs"
    );

    let aligner = Aligner::build(&ref_set, &hyp_set, glm, &config);
    let (alignments, num_hyp_without_ref) = aligner
        .align_corpus(&ref_set, &hyp_set, config.logk)
        .context("aligning corpus")?;

    let stats = ErrorStats::accumulate(ref_set.len(), hyp_set.len(), num_hyp_without_ref, &alignments);

    // spec.md §7: zero reference length at corpus level is fatal, not a
    // silently-reported "undefined" rate — abort before writing any output.
    stats
        .token_error_rate()
        .context("computing corpus token error rate")?;

    write_result_file(&args.result_file, &alignments, &stats)
        .with_context(|| format!("writing result file {}", args.result_file.display()))?;

    println!("{}", serde_json::to_string(&stats)?);
    println!("{}", kaldi_summary_line(&stats)?);

    Ok(())
}

/// Per-utterance TER/mTER (spec.md §4.8), `None` when the reference length
/// is zero (never reached via the CLI since empty-ref utterances are
/// skipped before alignment, but kept total rather than panicking).
fn utterance_rates(a: &UtteranceAlignment) -> (Option<f64>, Option<f64>) {
    let ref_len = a.ref_len();
    let hyp_len = a.hyp_len();
    let edits = (a.sub + a.ins + a.del) as f64;
    let ter = if ref_len == 0 {
        None
    } else {
        Some(100.0 * edits / ref_len as f64)
    };
    let mter = if ref_len == 0 && hyp_len == 0 {
        None
    } else {
        Some(100.0 * edits / ref_len.max(hyp_len) as f64)
    };
    (ter, mter)
}

fn write_result_file(path: &std::path::Path, alignments: &[UtteranceAlignment], stats: &ErrorStats) -> Result<()> {
    let mut out = std::fs::File::create(path)?;
    for alignment in alignments {
        let (ter, mter) = utterance_rates(alignment);
        let line = serde_json::json!({
            "uid": alignment.uid,
            "score": alignment.score,
            "TER": ter.map(|v| format!("{v:.2}")),
            "mTER": mter.map(|v| format!("{v:.2}")),
            "cor": alignment.correct,
            "sub": alignment.sub,
            "ins": alignment.ins,
            "del": alignment.del,
        });
        writeln!(out, "{line}")?;
        writeln!(out, "{}", asr_score_core::pretty::render(alignment))?;
    }
    writeln!(out, "{}", overall_statistics_block(stats)?)?;
    Ok(())
}

fn overall_statistics_block(stats: &ErrorStats) -> Result<String> {
    let mut block = String::new();
    writeln!(block, "=== Overall Statistics ===")?;
    writeln!(block, "ref utterances   : {}", stats.num_ref_utts)?;
    writeln!(block, "hyp utterances   : {}", stats.num_hyp_utts)?;
    writeln!(block, "evaluated        : {}", stats.num_eval_utts)?;
    writeln!(block, "hyp without ref  : {}", stats.num_hyp_without_ref)?;
    writeln!(
        block,
        "C/S/I/D          : {}/{}/{}/{}",
        stats.c, stats.s, stats.i, stats.d
    )?;
    match stats.token_error_rate() {
        Ok(ter) => writeln!(block, "TER              : {ter:.2}")?,
        Err(e) => writeln!(block, "TER              : undefined ({e})")?,
    };
    match stats.modified_token_error_rate() {
        Ok(mter) => writeln!(block, "mTER             : {mter:.2}")?,
        Err(e) => writeln!(block, "mTER             : undefined ({e})")?,
    };
    match stats.sentence_error_rate() {
        Some(ser) => writeln!(block, "SER              : {ser:.2}")?,
        None => writeln!(block, "SER              : undefined (no evaluated utterances)")?,
    };
    Ok(block.trim_end().to_string())
}

/// Kaldi-style `%WER` / `%SER` two-liner for stdout (spec.md §6).
fn kaldi_summary_line(stats: &ErrorStats) -> Result<String> {
    let wer = stats.token_error_rate();
    let ser = stats.sentence_error_rate();
    let mut line = String::new();
    match wer {
        Ok(wer) => writeln!(
            line,
            "%WER {wer:.2} [ {} / {}, {} ins, {} del, {} sub ]",
            stats.s + stats.i + stats.d,
            stats.c + stats.s + stats.d,
            stats.i,
            stats.d,
            stats.s
        )?,
        Err(e) => writeln!(line, "%WER undefined ({e})")?,
    }
    match ser {
        Some(ser) => write!(
            line,
            "%SER {ser:.2} [ {} / {} ]",
            stats.num_utts_with_error, stats.num_eval_utts
        )?,
        None => write!(line, "%SER undefined (no evaluated utterances)")?,
    }
    Ok(line)
}
