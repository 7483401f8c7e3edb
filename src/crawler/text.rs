//! Rendered markup to plain text
//!
//! Non-content elements are dropped, the remaining text of the body is
//! joined and whitespace-collapsed, then capped to a character budget.

use scraper::{ElementRef, Html, Selector};

/// Returned when the document has no body to read text from
pub const NO_CONTENT_SENTINEL: &str = "No content could be extracted";

/// Appended when text was cut to fit the character budget
pub const TRUNCATION_MARKER: &str = "...";

/// Elements whose subtree never contributes text
const NON_CONTENT_TAGS: [&str; 5] = ["script", "style", "meta", "link", "noscript"];

/// Extracts the visible body text of a rendered page
///
/// The result is at most `max_content` characters plus the truncation
/// marker. A document without a `<body>` element (a frameset, for example)
/// yields [`NO_CONTENT_SENTINEL`], which is a successful outcome.
///
/// # Example
///
/// ```
/// use searx_harvest::crawler::extract_text;
///
/// let html = "<html><body><p>Hello</p>  <script>x()</script><p>world</p></body></html>";
/// assert_eq!(extract_text(html, 100), "Hello world");
/// ```
pub fn extract_text(html: &str, max_content: usize) -> String {
    let document = Html::parse_document(html);

    let Some(body) = find_body(&document) else {
        return NO_CONTENT_SENTINEL.to_string();
    };

    let mut fragments = Vec::new();
    collect_text(body, &mut fragments);

    let text = collapse_whitespace(&fragments.join(" "));
    truncate_chars(&text, max_content)
}

fn find_body(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("body").ok()?;
    document.select(&selector).next()
}

/// Depth-first walk collecting trimmed text nodes outside non-content tags
fn collect_text<'a>(element: ElementRef<'a>, fragments: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if NON_CONTENT_TAGS.contains(&name) {
                continue;
            }
            collect_text(child_element, fragments);
        } else if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                fragments.push(trimmed);
            }
        }
    }
}

/// Collapses every run of whitespace into a single space
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `text` to `max_chars` characters, appending the truncation marker
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut truncated = text[..cut].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text.to_string(),
    }
}
