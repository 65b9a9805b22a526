use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use unicode_normalization::UnicodeNormalization;

use super::types::{EmbeddedDocument, NormalizedText};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static TOC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)table\s+of\s+contents").expect("valid toc regex"));
static TRAILING_PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\s*\b\d+)+\s*\z").expect("valid page number regex"));

// Elements whose text never reaches the reader. `ix:header` holds the hidden
// inline-XBRL facts block.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "head", "ix:header"];

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "tr", "td", "th", "li", "ul", "ol", "table", "h1", "h2", "h3", "h4", "h5",
    "h6", "section", "article", "page", "hr",
];

pub fn normalize(document: &EmbeddedDocument) -> NormalizedText {
    normalize_markup(&document.raw_markup)
}

/// Flattens filing markup into a single line of readable text.
///
/// Tags are dropped and entities decoded by the HTML parser; block elements
/// become word breaks. Repeated "Table of Contents" running heads are removed,
/// whitespace runs collapse to one space and a trailing bare page number is
/// stripped.
pub fn normalize_markup(markup: &str) -> NormalizedText {
    let text = visible_text(markup);
    let text: String = text.nfkc().collect();
    let text = remove_toc_labels(&text);
    let text = collapse_whitespace(&text);

    NormalizedText::new(strip_page_number(&text))
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Drops a trailing run of bare numbers, the page footer left behind when a
/// page break is flattened. Digits attached to a word are kept.
pub fn strip_page_number(text: &str) -> String {
    TRAILING_PAGE_RE.replace(text, "").trim().to_string()
}

fn remove_toc_labels(text: &str) -> String {
    let mut current = text.to_string();
    // Removing one label can join the halves of another.
    loop {
        let next = TOC_RE.replace_all(&current, " ").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn visible_text(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let mut out = String::with_capacity(markup.len() / 2);
    collect_text(document.root_element(), &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }

    if BLOCK_ELEMENTS.contains(&name) {
        out.push(' ');
    }
}
