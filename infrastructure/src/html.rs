//! HTML to plain text for citation excerpts.

use scraper::{ElementRef, Html};
use shared::utils::normalize_whitespace;

const SKIPPED_TAGS: [&str; 3] = ["pre", "code", "img"];

fn collect_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push(&text[..]);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_TAGS.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        }
    }
}

/// Drop `<pre>`, `<code>` and `<img>` subtrees and join the remaining text
/// nodes. Entities are decoded by the parser; an unclosed `<code>` swallows
/// the rest of the fragment.
pub fn clean_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut pieces = Vec::new();
    collect_text(fragment.root_element(), &mut pieces);
    normalize_whitespace(&pieces.join(" "))
}
