//! Character-aware comparison of two runs of lines.
//!
//! Replaced line ranges are rendered the way a classic `ndiff` does:
//! close line pairs come out as a `- `/`+ ` pair with `? ` marker lines
//! flagging the exact characters that changed, everything else as
//! whole-line edits. [`Hunk`](crate::Hunk) consumes the marker lines to
//! drive character-precise highlighting and never prints them directly.

use similar::Algorithm;
use similar::DiffTag;
use similar::TextDiff;
use similar::capture_diff_slices;

/// A candidate line pair must be at least this similar to be shown as an
/// in-place edit rather than a delete plus an insert.
const SYNCH_CUTOFF: f32 = 0.75;

/// Compares two runs of lines and renders a prefixed edit script.
///
/// Equal lines get a two-space prefix, deletions `- `, insertions `+ `,
/// and close pairs the four-line `-`/`?`/`+`/`?` form.
pub(crate) fn compare_lines(a: &[String], b: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for op in capture_diff_slices(Algorithm::Lcs, a, b) {
        let (old, new) = (op.old_range(), op.new_range());
        match op.tag() {
            DiffTag::Equal => out.extend(a[old].iter().map(|line| format!("  {line}"))),
            DiffTag::Delete => out.extend(a[old].iter().map(|line| format!("- {line}"))),
            DiffTag::Insert => out.extend(b[new].iter().map(|line| format!("+ {line}"))),
            DiffTag::Replace => fancy_replace(&a[old], &b[new], &mut out),
        }
    }
    out
}

/// Renders a replaced range around its most similar line pair.
///
/// The best pair above the similarity cutoff becomes the synch point;
/// the ranges before and after it are handled recursively. Identical
/// pairs only count when no close-but-different pair exists. Without
/// either, the whole range degrades to a plain delete/insert block.
fn fancy_replace(a: &[String], b: &[String], out: &mut Vec<String>) {
    let mut best_ratio = 0.74f32;
    let mut best: Option<(usize, usize)> = None;
    let mut equal_pair: Option<(usize, usize)> = None;

    for (j, bline) in b.iter().enumerate() {
        for (i, aline) in a.iter().enumerate() {
            if aline == bline {
                if equal_pair.is_none() {
                    equal_pair = Some((i, j));
                }
                continue;
            }
            let ratio = TextDiff::from_chars(aline.as_str(), bline.as_str()).ratio();
            if ratio > best_ratio {
                best_ratio = ratio;
                best = Some((i, j));
            }
        }
    }

    let (pair, identical) = match best.filter(|_| best_ratio >= SYNCH_CUTOFF) {
        Some(pair) => (pair, false),
        None => match equal_pair {
            Some(pair) => (pair, true),
            None => {
                plain_replace(a, b, out);
                return;
            }
        },
    };
    let (pi, pj) = pair;

    fancy_helper(&a[..pi], &b[..pj], out);

    let (aline, bline) = (&a[pi], &b[pj]);
    if identical {
        out.push(format!("  {aline}"));
    } else {
        let mut atags = String::new();
        let mut btags = String::new();
        let diff = TextDiff::from_chars(aline.as_str(), bline.as_str());
        for op in diff.ops() {
            let (la, lb) = (op.old_range().len(), op.new_range().len());
            match op.tag() {
                DiffTag::Replace => {
                    atags.push_str(&"^".repeat(la));
                    btags.push_str(&"^".repeat(lb));
                }
                DiffTag::Delete => atags.push_str(&"-".repeat(la)),
                DiffTag::Insert => btags.push_str(&"+".repeat(lb)),
                DiffTag::Equal => {
                    atags.push_str(&" ".repeat(la));
                    btags.push_str(&" ".repeat(lb));
                }
            }
        }
        qformat(aline, bline, &atags, &btags, out);
    }

    fancy_helper(&a[pi + 1..], &b[pj + 1..], out);
}

fn fancy_helper(a: &[String], b: &[String], out: &mut Vec<String>) {
    if !a.is_empty() && !b.is_empty() {
        fancy_replace(a, b, out);
    } else if !a.is_empty() {
        out.extend(a.iter().map(|line| format!("- {line}")));
    } else {
        out.extend(b.iter().map(|line| format!("+ {line}")));
    }
}

/// Whole-range fallback: dump the shorter side first.
fn plain_replace(a: &[String], b: &[String], out: &mut Vec<String>) {
    if b.len() < a.len() {
        out.extend(b.iter().map(|line| format!("+ {line}")));
        out.extend(a.iter().map(|line| format!("- {line}")));
    } else {
        out.extend(a.iter().map(|line| format!("- {line}")));
        out.extend(b.iter().map(|line| format!("+ {line}")));
    }
}

/// Keeps the line's own whitespace (tabs in particular) under blank
/// marker positions so the marker columns line up when displayed.
fn keep_original_ws(line: &str, tags: &str) -> String {
    line.chars()
        .zip(tags.chars())
        .map(|(ch, tag)| if tag == ' ' && ch.is_whitespace() { ch } else { tag })
        .collect()
}

fn qformat(aline: &str, bline: &str, atags: &str, btags: &str, out: &mut Vec<String>) {
    let atags = keep_original_ws(aline, atags);
    let atags = atags.trim_end();
    let btags = keep_original_ws(bline, btags);
    let btags = btags.trim_end();

    out.push(format!("- {aline}"));
    if !atags.is_empty() {
        out.push(format!("? {atags}\n"));
    }
    out.push(format!("+ {bline}"));
    if !btags.is_empty() {
        out.push(format!("? {btags}\n"));
    }
}
