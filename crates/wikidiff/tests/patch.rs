//! End-to-end tests for patch rendering: concrete scenarios plus
//! property tests for the block partition and patch application.

use proptest::prelude::*;
use wikidiff::Block;
use wikidiff::PatchManager;
use wikidiff::markup;

#[test]
fn single_replaced_line() {
    let pm = PatchManager::new("line1\nline2\nline3\n", "line1\nlineX\nline3\n", 0);
    assert_eq!(pm.hunks().len(), 1);

    let hunk = &pm.hunks()[0];
    assert_eq!(hunk.header(), "@@ -2 +2 @@");
    assert_eq!(hunk.a_rng(), (1, 2));
    assert_eq!(hunk.b_rng(), (1, 2));

    // Plain body carries the character markers...
    assert!(hunk.plain_text().contains("- line2\n"));
    assert!(hunk.plain_text().contains("+ lineX\n"));
    assert!(hunk.plain_text().contains("?     ^\n"));

    // ...the colorized body folds them into exact highlighting.
    assert!(hunk.diff_text().contains("line<<lightred>>2<<default>>"));
    assert!(hunk.diff_text().contains("line<<lightgreen>>X<<default>>"));
    assert!(!hunk.diff_text().contains('?'));
}

#[test]
fn pure_insertion() {
    let pm = PatchManager::new("a\nb\n", "a\nx\nb\n", 0);
    assert_eq!(pm.hunks().len(), 1);

    let hunk = &pm.hunks()[0];
    // Insert-only range notation: nothing removed after old line 1.
    assert_eq!(hunk.header(), "@@ -1,0 +2 @@");
    assert_eq!(hunk.diff_text(), "<<lightgreen>>+ x\n<<default>>");
    assert!(!hunk.plain_text().contains("- "));
}

#[test]
fn context_window_merges_hunks() {
    // Three changed lines, each pair separated by exactly one
    // unchanged line.
    let a = "A\nk1\nB\nk2\nC\n";
    let b = "X\nk1\nY\nk2\nZ\n";

    let zero = PatchManager::new(a, b, 0);
    assert_eq!(zero.hunks().len(), 3);
    assert_eq!(zero.super_hunk_count(), 3);

    // A gap of 1 is within 2 * context for context = 1: all merge.
    let one = PatchManager::new(a, b, 1);
    assert_eq!(one.hunks().len(), 3);
    assert_eq!(one.super_hunk_count(), 1);

    let rendered = one.render();
    assert!(rendered.contains("  k1\n"));
    assert!(rendered.contains("  k2\n"));
    assert_eq!(rendered.matches("<<aqua>>").count(), 1);
}

#[test]
fn identical_texts_render_nothing() {
    for context in [0, 1, 10] {
        let pm = PatchManager::new("a\nb\nc\n", "a\nb\nc\n", context);
        assert!(pm.hunks().is_empty());
        assert_eq!(pm.render(), "");
    }

    let pm = PatchManager::new("", "", 0);
    assert!(pm.hunks().is_empty());
    let mut sink = Vec::new();
    pm.print_hunks(&mut sink).unwrap();
    assert!(sink.is_empty());
}

#[test]
fn more_context_never_shows_fewer_unchanged_lines() {
    let a = "k1\nold2\nk3\nk4\nold5\nk6\nk7\nold8\nk9\n";
    let b = "k1\nnew2\nk3\nk4\nnew5\nk6\nk7\nnew8\nk9\n";

    let mut previous = 0;
    for context in 0..6 {
        let rendered = PatchManager::new(a, b, context).render();
        let plain = markup::strip(&rendered);
        let shown = plain.lines().filter(|line| line.starts_with("  ")).count();
        assert!(
            shown >= previous,
            "context {context} shows {shown} unchanged lines, fewer than {previous}"
        );
        previous = shown;
    }

    // Every gap is below 2 * context for a large context: one super-hunk.
    let merged = PatchManager::new(a, b, 100);
    assert_eq!(merged.super_hunk_count(), 1);
}

#[test]
fn rendered_patch_resolves_to_ansi() {
    let pm = PatchManager::new("old\n", "new\n", 0);
    let mut sink = Vec::new();
    pm.print_hunks(&mut sink).unwrap();
    let shown = String::from_utf8(sink).unwrap();
    assert!(shown.contains("\x1b[96m@@ -1 +1 @@\x1b[00m"));
    assert!(!shown.contains("<<"));
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[ab]{0,2}", 0..8)
        .prop_map(|lines| lines.into_iter().map(|line| format!("{line}\n")).collect())
}

proptest! {
    /// Blocks partition `[0, len(a))` contiguously and in order.
    #[test]
    fn blocks_partition_old_text(
        a in text_strategy(),
        b in text_strategy(),
        context in 0usize..4,
    ) {
        let pm = PatchManager::new(&a, &b, context);
        let mut covered = 0;
        for block in pm.blocks() {
            let (start, end) = block.a_rng();
            prop_assert_eq!(start, covered);
            prop_assert!(end >= start);
            covered = end;
        }
        prop_assert_eq!(covered, pm.old_lines().len());
    }

    /// Applying the blocks to the old text reconstructs the new one.
    #[test]
    fn blocks_reconstruct_new_text(
        a in text_strategy(),
        b in text_strategy(),
    ) {
        let pm = PatchManager::new(&a, &b, 0);
        let mut rebuilt = String::new();
        for block in pm.blocks() {
            match *block {
                Block::Unchanged { a: (start, end) } => {
                    rebuilt.push_str(&pm.old_lines()[start..end].concat());
                }
                Block::Changed { b: (start, end), .. } => {
                    rebuilt.push_str(&pm.new_lines()[start..end].concat());
                }
            }
        }
        prop_assert_eq!(rebuilt, b);
    }

    /// Rendering never panics and produces balanced escape sequences.
    #[test]
    fn rendering_is_total_and_balanced(
        a in text_strategy(),
        b in text_strategy(),
        context in 0usize..4,
    ) {
        let rendered = PatchManager::new(&a, &b, context).render();
        let resolved = markup::render(&rendered);
        let opens = resolved.matches('\x1b').count();
        let resets = resolved.matches("\x1b[00m").count();
        prop_assert_eq!(opens, resets * 2);
    }
}
