//! Column-aligned alignment pretty-printing (spec.md §4.7): four lines per
//! utterance — the raw hyp string, then the `HYP#`, `REF`, and `EDIT`
//! tracks, each column wide enough for its widest cell (in CJK-aware
//! display units) plus one trailing space.

use crate::align::UtteranceAlignment;

/// A CJK ideograph (`U+4E00..=U+9FA5`) occupies two display columns;
/// everything else occupies one. This is the literal range spec.md §4.7
/// names, not a general East-Asian-Width table.
fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FA5}').contains(&c)
}

pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| if is_cjk(c) { 2 } else { 1 }).sum()
}

fn pad_to(s: &str, width: usize) -> String {
    let dw = display_width(s);
    let mut out = String::with_capacity(s.len() + width.saturating_sub(dw));
    out.push_str(s);
    for _ in dw..width {
        out.push(' ');
    }
    out
}

/// Render an utterance's four pretty-print lines.
pub fn render(alignment: &UtteranceAlignment) -> String {
    let mut hyp_line = String::new();
    let mut ref_line = String::new();
    let mut edit_line = String::new();

    for edit in &alignment.edits {
        let label = edit.tag.as_str();
        let width = display_width(&edit.hyp_surface)
            .max(display_width(&edit.ref_surface))
            .max(display_width(label))
            + 1;
        hyp_line.push_str(&pad_to(&edit.hyp_surface, width));
        ref_line.push_str(&pad_to(&edit.ref_surface, width));
        edit_line.push_str(&pad_to(label, width));
    }

    format!(
        "{}\n{}\n{}\n{}",
        alignment.raw_hyp_text,
        hyp_line.trim_end(),
        ref_line.trim_end(),
        edit_line.trim_end()
    )
}
