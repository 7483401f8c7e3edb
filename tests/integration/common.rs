//! Shared fixtures for the integration tests

use searx_harvest::config::{Config, EngineKind};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration that uses the HTTP engine and never waits
pub fn test_config(registry_url: &str) -> Config {
    let mut config = Config::default();
    config.browser.engine = EngineKind::Http;
    config.search.registry_url = registry_url.to_string();
    config.crawler.settle_delay_ms = 0;
    config.crawler.quiescence_timeout_ms = 0;
    config.crawler.retry_jitter_min_ms = 0;
    config.crawler.retry_jitter_max_ms = 10;
    config
}

/// Registry page listing the given mirrors
pub fn registry_html(mirrors: &[String]) -> String {
    let rows: String = mirrors
        .iter()
        .map(|m| {
            format!(
                r#"<tr><td class="column-url"><a href="{m}" rel="noreferrer">{m}</a></td>
                   <td class="column-version">2024.5.1</td></tr>"#
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html><html><body><table class="instances">
           <thead><tr><th>URL</th><th>Version</th></tr></thead>
           <tbody>{rows}</tbody></table></body></html>"#
    )
}

/// Mirror result page with one article per `(engine, link)` pair
pub fn results_html(results: &[(&str, String)]) -> String {
    let articles: String = results
        .iter()
        .map(|(engine, link)| {
            format!(
                r#"<article class="result result-default category-general">
                     <a href="{link}" class="url_header" rel="noreferrer">
                       <div class="url_wrapper">{link}</div>
                     </a>
                     <h3><a href="{link}">Result</a></h3>
                     <p class="content">Snippet text</p>
                     <div class="engines"><span>{engine}</span></div>
                   </article>"#
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html><html><head><title>weather - SearXNG</title></head>
           <body><main id="main_results"><div id="urls">{articles}</div></main></body></html>"#
    )
}

/// Simple article page
pub fn page_html(text: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>Page</title><style>p {{ margin: 0 }}</style></head>
           <body><nav>Menu</nav><p>{text}</p><script>console.log("tracking")</script></body></html>"#
    )
}

pub fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// Mounts a registry at `/registry` listing `mirrors`
pub async fn mount_registry(server: &MockServer, mirrors: &[String]) {
    Mock::given(method("GET"))
        .and(path("/registry"))
        .respond_with(html(registry_html(mirrors)))
        .mount(server)
        .await;
}

pub fn registry_url(server: &MockServer) -> String {
    format!("{}/registry", server.uri())
}
