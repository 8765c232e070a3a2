//! Corpus-level error statistics (spec.md §4.8, §6).

use crate::align::UtteranceAlignment;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorStats {
    pub num_ref_utts: usize,
    pub num_hyp_utts: usize,
    pub num_eval_utts: usize,
    pub num_hyp_without_ref: usize,
    pub c: u64,
    pub s: u64,
    pub i: u64,
    pub d: u64,
    pub num_utts_with_error: usize,
}

impl ErrorStats {
    pub fn accumulate(
        num_ref_utts: usize,
        num_hyp_utts: usize,
        num_hyp_without_ref: usize,
        alignments: &[UtteranceAlignment],
    ) -> Self {
        let mut stats = Self {
            num_ref_utts,
            num_hyp_utts,
            num_eval_utts: alignments.len(),
            num_hyp_without_ref,
            ..Default::default()
        };
        for alignment in alignments {
            stats.c += alignment.correct as u64;
            stats.s += alignment.sub as u64;
            stats.i += alignment.ins as u64;
            stats.d += alignment.del as u64;
            if alignment.has_error() {
                stats.num_utts_with_error += 1;
            }
        }
        stats
    }

    fn ref_len(&self) -> u64 {
        self.c + self.s + self.d
    }

    fn hyp_len(&self) -> u64 {
        self.c + self.s + self.i
    }

    /// `100 * (S + D + I) / (C + S + D)`. Fatal (`ZeroRefLength`) when the
    /// reference length denominator is zero.
    pub fn token_error_rate(&self) -> CoreResult<f64> {
        let ref_len = self.ref_len();
        if ref_len == 0 {
            return Err(CoreError::ZeroRefLength);
        }
        Ok(100.0 * (self.s + self.d + self.i) as f64 / ref_len as f64)
    }

    /// `100 * (S + D + I) / max(C + S + D, C + S + I)`.
    pub fn modified_token_error_rate(&self) -> CoreResult<f64> {
        let denom = self.ref_len().max(self.hyp_len());
        if denom == 0 {
            return Err(CoreError::ZeroRefLength);
        }
        Ok(100.0 * (self.s + self.d + self.i) as f64 / denom as f64)
    }

    /// `100 * num_utts_with_error / num_eval_utts`. `None` when no
    /// utterances were evaluated (undefined, not fatal: spec.md §4.8).
    pub fn sentence_error_rate(&self) -> Option<f64> {
        if self.num_eval_utts == 0 {
            None
        } else {
            Some(100.0 * self.num_utts_with_error as f64 / self.num_eval_utts as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{EditRecord, EditTag};

    fn alignment(correct: u32, sub: u32, ins: u32, del: u32) -> UtteranceAlignment {
        let mut edits = Vec::new();
        for _ in 0..correct {
            edits.push(EditRecord {
                tag: EditTag::C,
                ref_surface: "x".into(),
                hyp_surface: "x".into(),
            });
        }
        UtteranceAlignment {
            uid: "u".into(),
            raw_hyp_text: String::new(),
            score: 0.0,
            edits,
            correct,
            sub,
            ins,
            del,
        }
    }

    #[test]
    fn scenario_s5_foo_vs_bar_baz() {
        let a = alignment(0, 1, 1, 0);
        let stats = ErrorStats::accumulate(1, 1, 0, &[a]);
        assert_eq!(stats.token_error_rate().unwrap(), 200.0);
        assert_eq!(stats.modified_token_error_rate().unwrap(), 100.0);
    }

    #[test]
    fn scenario_s6_a_b_vs_a() {
        let a = alignment(1, 0, 0, 1);
        let stats = ErrorStats::accumulate(1, 1, 0, &[a]);
        assert_eq!(stats.token_error_rate().unwrap(), 50.0);
        assert_eq!(stats.sentence_error_rate().unwrap(), 100.0);
    }

    #[test]
    fn zero_ref_length_is_fatal() {
        let a = alignment(0, 0, 1, 0);
        let stats = ErrorStats::accumulate(1, 1, 0, &[a]);
        assert!(matches!(
            stats.token_error_rate(),
            Err(CoreError::ZeroRefLength)
        ));
    }

    #[test]
    fn no_evaluated_utterances_means_undefined_ser() {
        let stats = ErrorStats::accumulate(0, 0, 0, &[]);
        assert!(stats.sentence_error_rate().is_none());
    }
}
