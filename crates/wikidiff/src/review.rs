//! Interactive confirmation of pending edits.
//!
//! Every bot run owns a [`ReviewSession`]; there is no process-wide
//! state. The session shows the colorized diff for a pending edit and
//! asks the user whether to apply it, with an "approve everything else"
//! latch for long runs.

use std::io;
use std::io::BufRead;
use std::io::Write;

use log::info;
use log::warn;
use thiserror::Error;
use wikidiff_markup::Renderable;

use crate::PatchManager;
use crate::output;

/// Failure while running an interactive confirmation.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("could not write to the review sink")]
    Sink(#[source] io::Error),
    #[error("could not read a confirmation response")]
    Prompt(#[source] io::Error),
}

/// Asks the user a single question and returns the raw response line.
pub trait Prompter {
    fn read_response(&mut self, prompt: &str) -> io::Result<String>;
}

/// [`Prompter`] backed by standard input and output.
pub struct StdioPrompter;

impl Prompter for StdioPrompter {
    fn read_response(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Per-run confirmation state.
#[derive(Debug, Default)]
pub struct ReviewSession {
    ask: bool,
    approve_all: bool,
}

impl ReviewSession {
    /// New session; with `ask` disabled every edit is approved silently.
    pub fn new(ask: bool) -> Self {
        Self {
            ask,
            approve_all: false,
        }
    }

    /// Whether edits are confirmed interactively.
    pub fn is_ask_mode(&self) -> bool {
        self.ask
    }

    pub fn set_ask_mode(&mut self, enabled: bool) {
        self.ask = enabled;
    }

    /// Shows the pending edit for `page_title` and asks whether to
    /// apply it.
    ///
    /// Returns `Ok(true)` when the edit should proceed. Outside ask
    /// mode, or once the user has approved all remaining edits, the
    /// edit is approved without prompting. An empty response counts as
    /// yes; `a` approves this and every following edit; anything else
    /// skips the edit.
    pub fn confirm_edit<W: Write>(
        &mut self,
        page_title: &str,
        old_text: &str,
        new_text: &str,
        prompter: &mut dyn Prompter,
        sink: &mut W,
    ) -> Result<bool, ReviewError> {
        if self.approve_all || !self.ask {
            return Ok(true);
        }

        let rule = "=".repeat(60);
        writeln!(sink, "{rule}\nTarget: {page_title}\n{rule}").map_err(ReviewError::Sink)?;
        PatchManager::new(old_text, new_text, 0)
            .print_hunks(sink)
            .map_err(ReviewError::Sink)?;
        writeln!(sink, "{rule}").map_err(ReviewError::Sink)?;
        let options = format!(
            "<<green>>Target: {page_title}, options: [y]es / [n]o / [a]ll remaining<<default>>"
        );
        output(sink, Renderable::Markup(&options)).map_err(ReviewError::Sink)?;

        let response = prompter
            .read_response("Confirm edit? [Y/n/a]: ")
            .map_err(ReviewError::Prompt)?;
        match response.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => Ok(true),
            "a" => {
                self.approve_all = true;
                info!("auto-approving all remaining edits");
                Ok(true)
            }
            _ => {
                warn!("edit to {page_title} skipped");
                Ok(false)
            }
        }
    }
}
