//! Markup translation for generated text.
//!
//! Model output arrives in a loosely Markdown-like form. Telegram accepts two
//! markup flavors with different escaping rules, so the translator is
//! dialect-dispatched: `Strict` targets MarkdownV2 (every reserved character
//! escaped), `Rich` targets legacy Markdown (emphasis converted structurally,
//! only a lone `*` escaped). Code spans are emitted verbatim in both.
//!
//! Total function — malformed markup degrades to literal passthrough, never
//! an error.

use serde::{Deserialize, Serialize};

/// Escaping/markup convention the destination renderer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Telegram MarkdownV2 — every reserved character escaped unconditionally.
    #[default]
    Strict,
    /// Telegram legacy Markdown — paired emphasis converted, the rest passed
    /// through for the renderer to interpret.
    Rich,
}

/// MarkdownV2-reserved characters escaped in the strict dialect.
/// Backtick and `*` are excluded — both have dedicated scan handling.
const STRICT_RESERVED: &[char] = &[
    '_', '[', ']', '(', ')', '~', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Scanner state. Backtick toggles Plain ↔ InCodeSpan; a run of three
/// double-quotes toggles Plain ↔ InTripleQuote. Each toggle is ignored while
/// the other non-Plain state is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Plain,
    InCodeSpan,
    InTripleQuote,
}

/// Translate raw generated text into the given dialect.
///
/// Single left-to-right scan. Content inside code spans and triple-quote
/// blocks is emitted verbatim. Outside them:
/// - `**` is a paired strong-emphasis delimiter: kept as `**` in strict,
///   converted to the legacy bold delimiter `*` in rich;
/// - a lone `*` is escaped in both dialects;
/// - strict additionally escapes every other reserved character.
///
/// Unbalanced delimiters are left as emitted — the scan state simply ends
/// with the input.
pub fn translate(raw: &str, dialect: Dialect) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    let mut state = ScanState::Plain;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        // Triple-quote toggle (legacy carry-over for docstring-style blocks).
        if ch == '"'
            && state != ScanState::InCodeSpan
            && chars.get(i + 1) == Some(&'"')
            && chars.get(i + 2) == Some(&'"')
        {
            out.push_str("\"\"\"");
            state = match state {
                ScanState::InTripleQuote => ScanState::Plain,
                _ => ScanState::InTripleQuote,
            };
            i += 3;
            continue;
        }

        // Code-span toggle. The delimiter itself is never escaped.
        if ch == '`' && state != ScanState::InTripleQuote {
            out.push('`');
            state = match state {
                ScanState::InCodeSpan => ScanState::Plain,
                _ => ScanState::InCodeSpan,
            };
            i += 1;
            continue;
        }

        if state != ScanState::Plain {
            out.push(ch);
            i += 1;
            continue;
        }

        if ch == '*' {
            if chars.get(i + 1) == Some(&'*') {
                // Paired strong-emphasis delimiter.
                match dialect {
                    Dialect::Strict => out.push_str("**"),
                    Dialect::Rich => out.push('*'),
                }
                i += 2;
                continue;
            }
            // A single `*` cannot be safely paired by the renderer.
            out.push_str("\\*");
            i += 1;
            continue;
        }

        if dialect == Dialect::Strict && STRICT_RESERVED.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
        i += 1;
    }

    out
}
