//! Text cleanup for scraped markup.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};

static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\S\n]+").expect("horizontal whitespace pattern should compile")
});

/// Elements that start a new line when flattened to text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "footer", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Normalize whitespace in scraped text.
///
/// NBSP becomes a space, horizontal whitespace runs collapse to one space,
/// every line is trimmed and runs of blank lines collapse to one.
pub fn normalize_text(input: &str) -> String {
    let input = input.replace('\u{a0}', " ").replace("\r\n", "\n");

    let mut out = String::with_capacity(input.len());
    let mut pending_blank = false;

    for line in input.split('\n') {
        let line = HORIZONTAL_WS.replace_all(line, " ");
        let line = line.trim();

        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }

        if !out.is_empty() {
            out.push('\n');
            if pending_blank {
                out.push('\n');
            }
        }
        out.push_str(line);
        pending_blank = false;
    }

    out
}

/// Flatten an element's subtree to normalized text, keeping block breaks.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) && !raw.ends_with('\n') => {
                raw.push('\n')
            }
            _ => {}
        }
    }
    normalize_text(&raw)
}

/// Convert an HTML fragment to normalized text.
///
/// Job boards often embed entity-escaped markup in JSON-LD
/// (`&lt;p&gt;...`); such input is decoded and flattened a second time.
pub fn html_to_text(html: &str) -> String {
    let text = fragment_text(html);
    if looks_like_markup(&text) {
        fragment_text(&text)
    } else {
        text
    }
}

fn fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    element_text(fragment.root_element())
}

fn looks_like_markup(text: &str) -> bool {
    text.contains("</") || text.contains("<br") || text.contains("<p>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        let input = "  Senior\u{a0}\u{a0}Engineer \t at  Acme  \n\n\n\n  Apply   now ";
        assert_eq!(normalize_text(input), "Senior Engineer at Acme\n\nApply now");
    }

    #[test]
    fn test_normalize_drops_leading_and_trailing_blank_lines() {
        assert_eq!(normalize_text("\n\n  a\n \n"), "a");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_html_to_text_keeps_block_breaks() {
        let html = "<p>About the role</p><ul><li>Rust</li><li>SQL</li></ul>";
        assert_eq!(html_to_text(html), "About the role\nRust\nSQL");
    }

    #[test]
    fn test_html_to_text_decodes_escaped_markup() {
        let html = "&lt;p&gt;Build &amp;amp; ship&lt;/p&gt;&lt;p&gt;Remote&lt;/p&gt;";
        assert_eq!(html_to_text(html), "Build & ship\nRemote");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(html_to_text("Just text, 5 < 6"), "Just text, 5 < 6");
    }
}
