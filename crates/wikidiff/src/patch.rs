//! Whole-comparison ownership: hunk construction, the block partition,
//! context-window merging and final patch rendering.

use std::io;
use std::io::Write;
use std::ops::Range;

use log::info;
use similar::Algorithm;
use similar::DiffTag;
use similar::TextDiff;
use similar::capture_diff_slices;
use similar::group_diff_ops;
use wikidiff_markup::Renderable;

use crate::Hunk;
use crate::hunk::header_text;
use crate::output;

/// One element of the full partition of the old text.
///
/// Blocks are a superset of hunks: they also cover the unchanged spans
/// between them, so concatenating every block's old-text span yields
/// exactly `0..len` with no gaps or overlaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Block {
    /// Lines `a.0..a.1` of the old text carried over unchanged.
    Unchanged { a: (usize, usize) },
    /// Lines `a.0..a.1` of the old text become lines `b.0..b.1` of the
    /// new one, owned by the hunk at `hunk`.
    Changed {
        hunk: usize,
        a: (usize, usize),
        b: (usize, usize),
    },
}

impl Block {
    /// Span of this block in the old text.
    pub fn a_rng(&self) -> (usize, usize) {
        match *self {
            Block::Unchanged { a } | Block::Changed { a, .. } => a,
        }
    }
}

/// Consecutive hunks rendered as one unit because their context windows
/// touch or overlap. Holds indexes into the manager's hunk list.
#[derive(Clone, Debug)]
struct SuperHunk {
    members: Range<usize>,
}

/// Owns the complete comparison between two texts.
///
/// Construction aligns the texts line by line (terminator-preserving
/// split), groups the opcodes with no context padding, wraps every group
/// in a [`Hunk`] and fixes up each hunk's context counters in one linear
/// pass. Context is applied uniformly at render time: hunks whose
/// windows of `context` unchanged lines touch are merged into one
/// super-hunk under a shared header.
pub struct PatchManager {
    a: Vec<String>,
    b: Vec<String>,
    context: usize,
    hunks: Vec<Hunk>,
    blocks: Vec<Block>,
    super_hunks: Vec<SuperHunk>,
}

impl PatchManager {
    pub fn new(text_a: &str, text_b: &str, context: usize) -> Self {
        let a = split_keepends(text_a);
        let b = split_keepends(text_b);

        // Lcs keeps grouped op anchors contiguous; Myers can emit
        // crossing runs whose hunk ranges come out reversed.
        let groups = group_diff_ops(capture_diff_slices(Algorithm::Lcs, &a, &b), 0);
        let mut hunks: Vec<Hunk> = groups
            .iter()
            .map(|group| Hunk::new(&a, &b, group))
            .collect();

        for idx in 0..hunks.len() {
            let pre = if idx == 0 {
                hunks[idx].a_rng().0
            } else {
                hunks[idx].a_rng().0 - hunks[idx - 1].a_rng().1
            };
            hunks[idx].set_pre_context(pre);
            if idx > 0 {
                hunks[idx - 1].set_post_context(pre);
            }
        }
        if let Some(last) = hunks.last_mut() {
            let end = last.a_rng().1;
            last.set_post_context(a.len() - end);
        }

        let blocks = build_blocks(&hunks, a.len());
        let super_hunks = build_super_hunks(&hunks, context);

        Self {
            a,
            b,
            context,
            hunks,
            blocks,
            super_hunks,
        }
    }

    /// All hunks, in text order.
    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    /// The full partition of the old text, changed and unchanged spans.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of display units after context-window merging.
    pub fn super_hunk_count(&self) -> usize {
        self.super_hunks.len()
    }

    /// Old text as terminator-preserving lines.
    pub fn old_lines(&self) -> &[String] {
        &self.a
    }

    /// New text as terminator-preserving lines.
    pub fn new_lines(&self) -> &[String] {
        &self.b
    }

    /// Renders every super-hunk, markup tags still inline.
    pub fn render(&self) -> String {
        self.super_hunks
            .iter()
            .map(|sh| self.generate_diff(sh))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Resolves markup and writes the final patch to `sink`.
    ///
    /// A comparison with no hunks writes nothing.
    pub fn print_hunks<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        if self.hunks.is_empty() {
            return Ok(());
        }
        output(sink, Renderable::Markup(&self.render()))
    }

    /// Unchanged lines rendered verbatim, space prefixed, trailing
    /// whitespace stripped.
    fn context_lines(&self, start: usize, end: usize) -> String {
        self.a[start..end]
            .iter()
            .map(|line| format!("  {}\n", line.trim_end()))
            .collect()
    }

    /// Displayed spans of a super-hunk: its own spans widened by the
    /// requested context, capped at what actually exists on each side.
    fn context_range(&self, sh: &SuperHunk) -> ((usize, usize), (usize, usize)) {
        let first = &self.hunks[sh.members.start];
        let last = &self.hunks[sh.members.end - 1];
        let pre = first.pre_context().min(self.context);
        let post = last.post_context().min(self.context);
        (
            (first.a_rng().0 - pre, last.a_rng().1 + post),
            (first.b_rng().0 - pre, last.b_rng().1 + post),
        )
    }

    /// One super-hunk: synthetic header, leading context, member bodies
    /// interleaved with the unchanged gap lines, trailing context.
    fn generate_diff(&self, sh: &SuperHunk) -> String {
        let members = &self.hunks[sh.members.clone()];
        let (a_rng, b_rng) = self.context_range(sh);

        let mut out = format!("<<aqua>>{}<<default>>\n", header_text(a_rng, b_rng, "@@"));
        out.push_str(&self.context_lines(a_rng.0, members[0].a_rng().0));
        let mut previous: Option<&Hunk> = None;
        for hunk in members {
            if let Some(previous) = previous {
                out.push_str(&self.context_lines(previous.a_rng().1, hunk.a_rng().0));
            }
            out.push_str(hunk.diff_text());
            previous = Some(hunk);
        }
        out.push_str(&self.context_lines(members[members.len() - 1].a_rng().1, a_rng.1));
        out
    }
}

/// Splits on `\n` boundaries, keeping the terminator with its line.
fn split_keepends(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices('\n') {
        lines.push(text[start..=idx].to_string());
        start = idx + 1;
    }
    if start < text.len() {
        lines.push(text[start..].to_string());
    }
    lines
}

fn build_blocks(hunks: &[Hunk], a_len: usize) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut covered = 0;
    for (idx, hunk) in hunks.iter().enumerate() {
        let (start, end) = hunk.a_rng();
        if covered < start {
            blocks.push(Block::Unchanged { a: (covered, start) });
        }
        blocks.push(Block::Changed {
            hunk: idx,
            a: hunk.a_rng(),
            b: hunk.b_rng(),
        });
        covered = end;
    }
    if covered < a_len {
        blocks.push(Block::Unchanged { a: (covered, a_len) });
    }
    blocks
}

/// A hunk joins the running super-hunk while the gap to its predecessor
/// is at most `2 * context` unchanged lines (the two half-windows touch
/// or overlap). With no context every hunk stands alone.
fn build_super_hunks(hunks: &[Hunk], context: usize) -> Vec<SuperHunk> {
    if hunks.is_empty() {
        return Vec::new();
    }
    let mut super_hunks = Vec::new();
    if context > 0 {
        let mut start = 0;
        for idx in 1..hunks.len() {
            if hunks[idx].pre_context() > context * 2 {
                super_hunks.push(SuperHunk { members: start..idx });
                start = idx;
            }
        }
        super_hunks.push(SuperHunk {
            members: start..hunks.len(),
        });
    } else {
        super_hunks.extend((0..hunks.len()).map(|idx| SuperHunk { members: idx..idx + 1 }));
    }
    super_hunks
}

/// Renders the differences between two texts to `sink`, colorized.
pub fn show_diff<W: Write>(
    sink: &mut W,
    text_a: &str,
    text_b: &str,
    context: usize,
) -> io::Result<()> {
    PatchManager::new(text_a, text_b, context).print_hunks(sink)
}

/// Logs a plain unified diff of the two texts at info level, or a
/// notice when they are identical.
pub fn log_diff(old_text: &str, new_text: &str) {
    let diff = TextDiff::from_lines(old_text, new_text);
    if diff.ops().iter().all(|op| op.tag() == DiffTag::Equal) {
        info!("no changes detected");
        return;
    }
    info!(
        "diff:\n{}",
        diff.unified_diff().context_radius(3).header("before", "after")
    );
}
