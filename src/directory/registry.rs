//! Mirror registry page parsing

use scraper::{Html, Selector};

/// Extracts mirror base URLs from a rendered registry page
///
/// Each table row with a `td.column-url` cell contributes the `href` of the
/// first anchor in that cell. Only absolute HTTP(S) URLs are kept, and
/// duplicates are dropped while preserving first-seen order.
pub fn parse_registry(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let (Ok(row), Ok(cell), Ok(anchor)) = (
        Selector::parse("tr"),
        Selector::parse("td.column-url"),
        Selector::parse("a"),
    ) else {
        return Vec::new();
    };

    let hrefs = document.select(&row).filter_map(|row| {
        let cell = row.select(&cell).next()?;
        let href = cell.select(&anchor).next()?.value().attr("href")?;
        Some(href.trim().to_string())
    });

    dedup_preserving_order(hrefs.filter(|href| is_absolute_http(href)))
}

/// True for absolute `http://` and `https://` URLs
pub(crate) fn is_absolute_http(candidate: &str) -> bool {
    url::Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Drops repeated values, keeping the first occurrence of each
pub(crate) fn dedup_preserving_order(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
