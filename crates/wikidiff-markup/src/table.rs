use std::collections::HashMap;
use std::sync::OnceLock;

/// Fixed name → SGR code table, computed once on first use.
///
/// Bright foreground codes for the classic colors plus a few text
/// attributes. `light*` variants alias their base color; `aqua` is an
/// alias of cyan. `default` is deliberately absent: it styles nothing.
fn color_table() -> &'static HashMap<&'static str, u8> {
    static TABLE: OnceLock<HashMap<&'static str, u8>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("red", 91u8),
            ("green", 92),
            ("yellow", 93),
            ("blue", 94),
            ("purple", 95),
            ("cyan", 96),
            ("white", 97),
            ("black", 98),
            ("grey", 100),
            ("gray", 100),
            ("bold", 1),
            ("underline", 4),
            ("blink", 5),
            ("invert", 7),
            ("lightred", 91),
            ("lightgreen", 92),
            ("lightyellow", 93),
            ("lightblue", 94),
            ("lightpurple", 95),
            ("lightcyan", 96),
            ("lightgrey", 100),
            ("lightgray", 100),
            ("lightwhite", 100),
            ("lightblack", 108),
            ("aqua", 96),
            ("lightaqua", 96),
        ])
    })
}

/// Resolves one tag body (`name` or `fg;bg`) to the SGR codes it selects.
///
/// The second token of a two-token tag is a background request: bright
/// foreground codes (91..=97) are shifted to the matching background
/// code. Unknown names and `default` contribute nothing.
pub(crate) fn sgr_codes(tag: &str) -> Vec<u8> {
    let mut codes = Vec::new();
    let mut tokens = tag.splitn(2, ';');
    if let Some(fg) = tokens.next()
        && let Some(&code) = color_table().get(fg)
    {
        codes.push(code);
    }
    if let Some(bg) = tokens.next()
        && let Some(&code) = color_table().get(bg)
    {
        codes.push(if (91..=97).contains(&code) {
            code + 10
        } else {
            code
        });
    }
    codes
}
