//! HTML cleaning: strip page chrome and reduce a document to prompt-ready text.
//!
//! Steps run in order:
//! 1. drop `script`/`style`/`nav`/`footer` subtrees and take the body text
//! 2. collapse whitespace runs to a single space
//! 3. neutralize any literal tag openers that survived as text
//! 4. truncate to the character cap
//!
//! The title gets steps 2 to 4 as well, with its own fixed cap.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Longest title kept, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Elements whose whole subtree is dropped before text extraction.
pub const STRIPPED_ELEMENTS: [&str; 4] = ["script", "style", "nav", "footer"];

static BODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

/// Result of cleaning one HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPage {
    /// `<title>` text, cleaned like the body and capped at [`MAX_TITLE_CHARS`].
    /// Empty when the page has none.
    pub title: String,
    /// Visible body text, at most `max_chars` characters.
    pub text: String,
}

/// Parse `html` and produce its title and cleaned body text.
pub fn clean_html(html: &str, max_chars: usize) -> CleanedPage {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&TITLE_SEL)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>(), MAX_TITLE_CHARS))
        .unwrap_or_default();

    let mut raw = String::new();
    let root = doc
        .select(&BODY_SEL)
        .next()
        .unwrap_or_else(|| doc.root_element());
    push_visible_text(root, &mut raw);

    CleanedPage {
        title,
        text: clean_text(&raw, max_chars),
    }
}

fn clean_text(raw: &str, max_chars: usize) -> String {
    let text = neutralize_tag_openers(&collapse_whitespace(raw));
    truncate_chars(&text, max_chars).trim_end().to_string()
}

/// Append the text of `el`'s subtree, skipping stripped elements.
fn push_visible_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !STRIPPED_ELEMENTS.contains(&child_el.value().name()) {
                push_visible_text(child_el, out);
            }
        }
    }
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escaped markup such as `&lt;script&gt;` decodes to a literal `<script` in
/// text nodes. Drop the whole `<` run so downstream text never carries a
/// stripped tag opener, even from `<<script`.
fn neutralize_tag_openers(text: &str) -> String {
    static OPENER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)<+(script|style|nav|footer)").expect("valid regex")
    });

    OPENER_RE.replace_all(text, "$1").into_owned()
}

/// Keep at most `max_chars` Unicode scalar values.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
