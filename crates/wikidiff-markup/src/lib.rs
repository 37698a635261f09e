//! Inline color markup for terminal output.
//!
//! Text destined for the terminal carries tags like `<<red>>...<<default>>`
//! (or the escape-prefixed form `\x03{red}...`). [`render`] resolves those
//! tags into ANSI escape sequences; [`strip`] removes them for plain-text
//! sinks.
//!
//! Tags are stack based: every named tag pushes its color, and the literal
//! tag `<<previous>>` pops back to the color that was active before the
//! last push. The stack never shrinks below its initial `default` entry,
//! so unbalanced pops are absorbed rather than treated as errors. A tag
//! body may also name two colors separated by `;`, in which case the
//! second one is applied as a background. The diff renderer uses this to
//! make highlighted whitespace visible.
//!
//! Unknown color names style nothing and the text passes through
//! untouched; input without any tag token is returned borrowed.

mod table;

use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// A tag is `<<body>>` or `\x03{body}`; the body is one or two word
/// tokens separated by `;`.
fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\x03\{|<<)((?:\w+);?(?:\w+)?)(?:\}|>>)").expect("markup tag pattern is valid")
    })
}

fn push_styled(out: &mut String, text: &str, color: &str) {
    let codes = table::sgr_codes(color);
    if codes.is_empty() {
        out.push_str(text);
        return;
    }
    out.push_str("\x1b[");
    for (idx, code) in codes.iter().enumerate() {
        if idx > 0 {
            out.push(';');
        }
        out.push_str(&code.to_string());
    }
    out.push('m');
    out.push_str(text);
    out.push_str("\x1b[00m");
}

/// Resolves color markup into ANSI escape sequences.
///
/// Each run of text is wrapped in the escape code of the innermost color
/// still on the stack. Input containing no tag token is returned as-is.
pub fn render(input: &str) -> Cow<'_, str> {
    if !input.contains("<<") && !input.contains('\x03') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut stack: Vec<&str> = vec!["default"];
    let mut last = 0;
    for caps in tag_regex().captures_iter(input) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let current = stack.last().copied().unwrap_or("default");
        push_styled(&mut out, &input[last..whole.start()], current);
        last = whole.end();

        if body.as_str() == "previous" {
            // Keep the bottom `default` entry forever.
            if stack.len() > 1 {
                stack.pop();
            }
        } else {
            stack.push(body.as_str());
        }
    }
    let current = stack.last().copied().unwrap_or("default");
    push_styled(&mut out, &input[last..], current);
    Cow::Owned(out)
}

/// Removes markup tags without applying any styling.
///
/// The plain-text fallback for sinks that are not terminals.
pub fn strip(input: &str) -> Cow<'_, str> {
    if !input.contains("<<") && !input.contains('\x03') {
        return Cow::Borrowed(input);
    }
    tag_regex().replace_all(input, "")
}

/// A value headed for an output sink.
///
/// Markup text gets its tags resolved; anything else is forwarded
/// untouched. This replaces an "is this a string?" runtime check with an
/// explicit choice at the call site.
pub enum Renderable<'a> {
    /// Markup text to resolve into ANSI escape sequences.
    Markup(&'a str),
    /// An opaque value emitted via its `Display` impl, unmodified.
    Passthrough(&'a dyn fmt::Display),
}

impl Renderable<'_> {
    /// Produces the final text for the sink.
    pub fn resolve(&self) -> String {
        match self {
            Renderable::Markup(text) => render(text).into_owned(),
            Renderable::Passthrough(value) => value.to_string(),
        }
    }
}
