//! Result-page parser for search portal mirrors
//!
//! A mirror's result page lists each hit in an `<article class="result">`
//! container. The target link is the container's `a.url_header`, and the
//! engines that contributed the hit are listed as `<span>`s inside
//! `div.engines`.

use crate::types::ResultEntry;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parses a mirror's result page into result entries
///
/// # Extraction Rules
///
/// - One entry per `article.result` container, in document order
/// - The link comes from the first `a.url_header[href]`; relative links are
///   resolved against `base_url`
/// - The source label is the trimmed text of the first `span` inside
///   `div.engines`, or the empty string when there is none
/// - Containers without a usable HTTP(S) link are skipped
///
/// Duplicate links are kept.
///
/// # Example
///
/// ```
/// use searx_harvest::search::parse_results;
/// use url::Url;
///
/// let html = r#"<article class="result">
///     <a class="url_header" href="https://example.com/">Example</a>
///     <div class="engines"><span>duckduckgo</span></div>
/// </article>"#;
/// let base = Url::parse("https://searx.example.org/search?q=x").unwrap();
/// let entries = parse_results(html, &base);
/// assert_eq!(entries[0].source, "duckduckgo");
/// assert_eq!(entries[0].link, "https://example.com/");
/// ```
pub fn parse_results(html: &str, base_url: &Url) -> Vec<ResultEntry> {
    let document = Html::parse_document(html);

    let (Ok(container), Ok(link), Ok(engine)) = (
        Selector::parse("article.result"),
        Selector::parse("a.url_header[href]"),
        Selector::parse("div.engines span"),
    ) else {
        return Vec::new();
    };

    document
        .select(&container)
        .filter_map(|result| {
            let href = result.select(&link).next()?.value().attr("href")?;
            let link = resolve_link(href, base_url)?;
            let source = source_label(result, &engine);
            Some(ResultEntry { source, link })
        })
        .collect()
}

fn source_label(result: ElementRef<'_>, engine: &Selector) -> String {
    result
        .select(engine)
        .next()
        .map(|span| span.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Resolves a result href to an absolute HTTP(S) URL
///
/// Returns None for empty hrefs, unresolvable hrefs and any scheme other
/// than http or https.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}

/// Builds the query URL `<mirror>/search?q=<query>` for a mirror
///
/// Mirrors listed with or without a trailing slash, or under a path prefix,
/// all resolve the same way.
pub fn mirror_search_url(mirror: &str, query: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(mirror)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut url = base.join("search")?;
    url.query_pairs_mut().clear().append_pair("q", query);
    Ok(url)
}
