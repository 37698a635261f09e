//! Diff rendering and interactive patch review for wiki bot edits.
//!
//! The heart of the crate is [`PatchManager`]: it aligns two texts line
//! by line, wraps every change cluster in a [`Hunk`], merges hunks whose
//! context windows touch into super-hunks, and renders the result as a
//! colorized patch with character-precise highlighting for replaced
//! lines. Color goes through the inline markup of
//! [`wikidiff_markup`] so the same rendered patch can also be emitted
//! plain.
//!
//! On top of that sits [`ReviewSession`], the interactive confirmation
//! loop a bot runs before saving an edit: show the patch, ask, remember
//! an "approve everything else" answer.
//!
//! Rendering is pure and synchronous; the only effect is the final
//! write to the caller's sink. Concurrent callers use one
//! [`PatchManager`] per comparison; nothing is shared between
//! instances.

mod hunk;
mod ndiff;
mod patch;
mod review;

pub use hunk::Hunk;
pub use patch::Block;
pub use patch::PatchManager;
pub use patch::log_diff;
pub use patch::show_diff;
pub use review::Prompter;
pub use review::ReviewError;
pub use review::ReviewSession;
pub use review::StdioPrompter;
pub use wikidiff_markup as markup;

use std::io;
use std::io::Write;

use wikidiff_markup::Renderable;

/// Writes one renderable value to `sink`, markup resolved, with a
/// trailing newline.
pub fn output<W: Write>(sink: &mut W, text: Renderable<'_>) -> io::Result<()> {
    writeln!(sink, "{}", text.resolve())
}
