//! One renderable change region between two texts.

use std::fmt;

use similar::DiffOp;
use similar::DiffTag;

use crate::ndiff;

/// Markup color for added lines and characters.
const ADDED: &str = "lightgreen";
/// Markup color for removed lines and characters.
const REMOVED: &str = "lightred";

/// A localized change region: one contiguous group of diff operations.
///
/// A hunk renders itself twice at construction time: as plain prefixed
/// lines (`- `/`+ `/`  ` plus `? ` character markers for replaced lines)
/// and as a markup-colorized body where the marker lines have been
/// folded into character-precise highlighting.
///
/// The two context counters are owned by the
/// [`PatchManager`](crate::PatchManager) that constructed the hunk; they
/// describe how many unchanged lines sit between this hunk and its
/// neighbors (or the ends of the old text).
pub struct Hunk {
    a_rng: (usize, usize),
    b_rng: (usize, usize),
    diff_plain_text: String,
    diff_text: String,
    pre_context: usize,
    post_context: usize,
}

impl Hunk {
    /// Builds a hunk from one grouped run of opcodes over `a` and `b`.
    ///
    /// The group must be non-empty, ordered and contiguous; ranges that
    /// point outside the line sequences fail fast by slice indexing.
    pub(crate) fn new(a: &[String], b: &[String], group: &[DiffOp]) -> Self {
        let diff = create_diff(a, b, group);
        let a_rng = (
            group[0].old_range().start,
            group[group.len() - 1].old_range().end,
        );
        let b_rng = (
            group[0].new_range().start,
            group[group.len() - 1].new_range().end,
        );
        let diff_text = format_diff(&diff);
        let diff_plain_text = format!("{}\n{}", header_text(a_rng, b_rng, "@@"), diff.concat());
        Self {
            a_rng,
            b_rng,
            diff_plain_text,
            diff_text,
            pre_context: 0,
            post_context: 0,
        }
    }

    /// Span of this hunk in the old text; zero-based, end exclusive.
    pub fn a_rng(&self) -> (usize, usize) {
        self.a_rng
    }

    /// Span of this hunk in the new text.
    pub fn b_rng(&self) -> (usize, usize) {
        self.b_rng
    }

    /// `@@ -start,len +start,len @@` header for this hunk's spans.
    pub fn header(&self) -> String {
        header_text(self.a_rng, self.b_rng, "@@")
    }

    /// Header plus unformatted diff body.
    pub fn plain_text(&self) -> &str {
        &self.diff_plain_text
    }

    /// Diff body with inline color markup, header not included.
    pub fn diff_text(&self) -> &str {
        &self.diff_text
    }

    /// Unchanged lines between this hunk and the previous one (or the
    /// start of the old text).
    pub fn pre_context(&self) -> usize {
        self.pre_context
    }

    /// Unchanged lines up to the next hunk (or the end of the old text).
    pub fn post_context(&self) -> usize {
        self.post_context
    }

    pub(crate) fn set_pre_context(&mut self, lines: usize) {
        self.pre_context = lines;
    }

    pub(crate) fn set_post_context(&mut self, lines: usize) {
        self.post_context = lines;
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diff_plain_text)
    }
}

/// Unified-diff range notation: 1-based start, `,len` omitted for
/// single-line ranges, zero-length ranges report the position before
/// the insertion.
fn format_range_unified(start: usize, stop: usize) -> String {
    let length = stop - start;
    if length == 1 {
        return (start + 1).to_string();
    }
    let beginning = if length == 0 { start } else { start + 1 };
    format!("{beginning},{length}")
}

/// `@@ -a +b @@` style header over an old and a new span.
pub(crate) fn header_text(a_rng: (usize, usize), b_rng: (usize, usize), affix: &str) -> String {
    format!(
        "{affix} -{} +{} {affix}",
        format_range_unified(a_rng.0, a_rng.1),
        format_range_unified(b_rng.0, b_rng.1)
    )
}

/// Guards against content lines without a terminator: every rendered
/// diff line must end with a newline or the joined body runs together.
fn check_line(line: String) -> String {
    if line.ends_with('\n') { line } else { format!("{line}\n") }
}

/// Renders the plain diff body for one opcode group.
fn create_diff(a: &[String], b: &[String], group: &[DiffOp]) -> Vec<String> {
    let mut lines = Vec::new();
    for op in group {
        let (old, new) = (op.old_range(), op.new_range());
        match op.tag() {
            DiffTag::Equal => {
                lines.extend(a[old].iter().map(|line| check_line(format!("  {line}"))));
            }
            DiffTag::Delete => {
                lines.extend(a[old].iter().map(|line| check_line(format!("- {line}"))));
            }
            DiffTag::Insert => {
                lines.extend(b[new].iter().map(|line| check_line(format!("+ {line}"))));
            }
            DiffTag::Replace => {
                lines.extend(
                    ndiff::compare_lines(&a[old], &b[new])
                        .into_iter()
                        .map(check_line),
                );
            }
        }
    }
    lines
}

/// Colorizes the plain diff body.
///
/// A single pass over a two-line window. `? ` marker lines are consumed
/// to highlight the exact characters of the adjacent `-`/`+` line and
/// are never emitted themselves. A marker already spent on a `+` line is
/// shadowed out so it cannot be reused; a `-` line's marker stays
/// available for the paired `+` line that follows it, truncated to that
/// line's length.
fn format_diff(diff: &[String]) -> String {
    let mut out = String::new();
    let mut shadowed = false;
    let mut prev: &str = "";
    for (idx, raw) in diff.iter().enumerate() {
        let line: &str = if shadowed { "" } else { raw };
        shadowed = false;
        let next = diff.get(idx + 1).map(String::as_str).unwrap_or("");

        if !line.starts_with('?') {
            if next.starts_with('?') {
                out.push_str(&color_line(line, Some(next)));
                if line.starts_with('+') {
                    shadowed = true;
                }
            } else if line.starts_with('-') {
                out.push_str(&color_line(line, None));
            } else if line.starts_with('+') {
                let leftover = if prev.starts_with('?') { prev } else { "" };
                let leftover: String = leftover.chars().take(line.chars().count()).collect();
                let reference = if leftover.is_empty() {
                    None
                } else {
                    Some(leftover.as_str())
                };
                out.push_str(&color_line(line, reference));
            }
        }
        prev = line;
    }
    out
}

fn sign_color(sign: char) -> &'static str {
    match sign {
        '+' => ADDED,
        '-' => REMOVED,
        _ => "default",
    }
}

fn padded(s: &str, width: usize) -> impl Iterator<Item = char> + '_ {
    s.chars().chain(std::iter::repeat(' ')).take(width)
}

/// Wraps a diff line in color markup.
///
/// Without a reference the whole line is colored by its sign. With a
/// marker reference, line and reference are walked in lockstep (space
/// padded to the longer of the two) and only the characters under a
/// non-blank marker position are colored; a highlighted space gets a
/// background tint instead so whitespace changes stay visible. The
/// reference keeps its column positions (only its trailing newline is
/// dropped), so marker columns land on the exact characters they flag.
fn color_line(line: &str, line_ref: Option<&str>) -> String {
    let sign = line.chars().next().unwrap_or(' ');

    let Some(line_ref) = line_ref else {
        return match sign {
            '+' | '-' => format!("<<{}>>{line}<<default>>", sign_color(sign)),
            _ => line.to_string(),
        };
    };

    let reference = line_ref.trim_end_matches('\n');
    let width = line.chars().count().max(reference.chars().count());

    let mut colored = String::new();
    let mut open = false;
    for (ch, ch_ref) in padded(line, width).zip(padded(reference, width)) {
        if !open {
            if ch_ref != ' ' {
                if ch == ' ' {
                    colored.push_str(&format!("<<default;{}>>", sign_color(sign)));
                } else {
                    colored.push_str(&format!("<<{}>>", sign_color(sign)));
                }
                colored.push(ch);
                open = true;
            } else {
                colored.push(ch);
            }
        } else if ch_ref == ' ' {
            colored.push_str("<<default>>");
            colored.push(ch);
            open = false;
        } else {
            colored.push(ch);
        }
    }
    if open {
        colored.push_str("<<default>>");
    }
    colored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unified_range_notation() {
        assert_eq!(format_range_unified(1, 2), "2");
        assert_eq!(format_range_unified(1, 1), "1,0");
        assert_eq!(format_range_unified(0, 3), "1,3");
        assert_eq!(format_range_unified(0, 0), "0,0");
    }

    #[test]
    fn header_joins_both_ranges() {
        assert_eq!(header_text((1, 2), (1, 2), "@@"), "@@ -2 +2 @@");
        assert_eq!(header_text((1, 1), (1, 2), "@@"), "@@ -1,0 +2 @@");
    }

    #[test]
    fn whole_line_coloring_follows_the_sign() {
        assert_eq!(color_line("- old\n", None), "<<lightred>>- old\n<<default>>");
        assert_eq!(color_line("+ new\n", None), "<<lightgreen>>+ new\n<<default>>");
        assert_eq!(color_line("  same\n", None), "  same\n");
    }

    #[test]
    fn marker_reference_highlights_exact_columns() {
        let colored = color_line("- line2\n", Some("?     ^\n"));
        assert_eq!(
            colored,
            "<<lightred>>-<<default>> line<<lightred>>2<<default>>\n"
        );
    }

    #[test]
    fn highlighted_space_gets_background_tint() {
        let colored = color_line("+ a b\n", Some("?  +\n"));
        assert_eq!(
            colored,
            "<<lightgreen>>+<<default>> a<<default;lightgreen>> <<default>>b\n"
        );
    }

    #[test]
    fn reference_longer_than_line_pads_with_spaces() {
        let colored = color_line("- ab\n", Some("?     ^\n"));
        assert!(colored.starts_with("<<lightred>>-<<default>> ab\n"));
        assert!(colored.ends_with("<<default;lightred>> <<default>>"));
    }

    #[test]
    fn format_diff_consumes_marker_lines() {
        let diff = vec![
            "- line2\n".to_string(),
            "?     ^\n".to_string(),
            "+ lineX\n".to_string(),
            "?     ^\n".to_string(),
        ];
        let out = format_diff(&diff);
        assert!(!out.contains('?'));
        assert!(out.contains("line<<lightred>>2<<default>>"));
        assert!(out.contains("line<<lightgreen>>X<<default>>"));
    }

    #[test]
    fn plus_line_reuses_leftover_marker_from_the_minus_line() {
        // The `+` line has no marker of its own: the `-` marker two
        // lines back is reused, truncated to the new line's length.
        let diff = vec![
            "- abcdef\n".to_string(),
            "?   -\n".to_string(),
            "+ abdef\n".to_string(),
        ];
        let out = format_diff(&diff);
        assert!(out.contains("<<lightred>>-<<default>> ab<<lightred>>c<<default>>def\n"));
        assert!(out.contains("<<lightgreen>>+<<default>> ab<<lightgreen>>d<<default>>ef\n"));
    }

    #[test]
    fn spent_plus_marker_is_not_reused() {
        let diff = vec![
            "+ lineX\n".to_string(),
            "?     ^\n".to_string(),
            "+ other\n".to_string(),
        ];
        let out = format_diff(&diff);
        // The second `+` line is colored whole, not via the spent marker.
        assert!(out.contains("<<lightgreen>>+ other\n<<default>>"));
    }

    #[test]
    fn equal_lines_are_dropped_from_the_colored_body() {
        let diff = vec!["  same\n".to_string(), "- gone\n".to_string()];
        let out = format_diff(&diff);
        assert_eq!(out, "<<lightred>>- gone\n<<default>>");
    }
}
