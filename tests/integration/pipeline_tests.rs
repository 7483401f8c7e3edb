//! End-to-end pipeline tests against mock mirrors

use crate::common::{
    html, mount_registry, page_html, registry_url, results_html, test_config,
};
use searx_harvest::{list_mirrors, run_search, QueryParams};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts `/page{i}` for each index, answering with "forecast {i}"
async fn mount_pages(server: &MockServer, count: usize) {
    for i in 0..count {
        Mock::given(method("GET"))
            .and(path(format!("/page{i}")))
            .respond_with(html(page_html(&format!("forecast {i}"))))
            .mount(server)
            .await;
    }
}

fn page_links(server: &MockServer, count: usize) -> Vec<(&'static str, String)> {
    let engines = ["duckduckgo", "brave", "wikipedia", "qwant", "startpage"];
    (0..count)
        .map(|i| (engines[i % engines.len()], format!("{}/page{i}", server.uri())))
        .collect()
}

#[tokio::test]
async fn test_weather_query_crawls_first_three_of_five() {
    let server = MockServer::start().await;
    mount_registry(&server, &[server.uri()]).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "weather"))
        .respond_with(html(results_html(&page_links(&server, 5))))
        .expect(1)
        .mount(&server)
        .await;

    mount_pages(&server, 3).await;
    for i in 3..5 {
        Mock::given(method("GET"))
            .and(path(format!("/page{i}")))
            .respond_with(html(page_html("never fetched")))
            .expect(0)
            .mount(&server)
            .await;
    }

    let config = test_config(&registry_url(&server));
    let results = run_search(&QueryParams::new("weather", 3, 500), &config)
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    let sources: Vec<_> = results.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(sources, vec!["duckduckgo", "brave", "wikipedia"]);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.link, format!("{}/page{i}", server.uri()));
        assert_eq!(result.context, format!("Menu forecast {i}"));
    }
}

#[tokio::test]
async fn test_all_mirrors_empty_gives_no_results() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_registry(&first, &[first.uri(), second.uri()]).await;

    for server in [&first, &second] {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(html(results_html(&[])))
            .expect(1)
            .mount(server)
            .await;
    }

    let config = test_config(&registry_url(&first));
    let results = run_search(&QueryParams::new("weather", 3, 500), &config)
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_failing_mirror_is_skipped() {
    let broken = MockServer::start().await;
    let working = MockServer::start().await;
    mount_registry(&working, &[broken.uri(), working.uri()]).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(1)
        .mount(&broken)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_html(&page_links(&working, 2))))
        .mount(&working)
        .await;
    mount_pages(&working, 2).await;

    let config = test_config(&registry_url(&working));
    let results = run_search(&QueryParams::new("weather", 3, 500), &config)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[1].context, "Menu forecast 1");
}

#[tokio::test]
async fn test_one_link_timing_out_gets_diagnostic() {
    let server = MockServer::start().await;
    mount_registry(&server, &[server.uri()]).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_html(&page_links(&server, 3))))
        .mount(&server)
        .await;

    for i in [0, 2] {
        Mock::given(method("GET"))
            .and(path(format!("/page{i}")))
            .respond_with(html(page_html(&format!("forecast {i}"))))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(page_html("too late")).set_delay(Duration::from_secs(3)))
        .expect(3)
        .mount(&server)
        .await;

    let config = test_config(&registry_url(&server));
    let params = QueryParams::new("weather", 3, 500).with_timeout(Duration::from_millis(500));
    let results = run_search(&params, &config).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].context, "Menu forecast 0");
    assert_eq!(
        results[1].context,
        "Error fetching content: navigation timed out after 500ms"
    );
    assert_eq!(results[2].context, "Menu forecast 2");
}

#[tokio::test]
async fn test_error_status_page_gets_diagnostic() {
    let server = MockServer::start().await;
    mount_registry(&server, &[server.uri()]).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_html(&page_links(&server, 1))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page0"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let config = test_config(&registry_url(&server));
    let results = run_search(&QueryParams::new("weather", 3, 500), &config)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].context,
        "Error fetching content: received error status: 404"
    );
}

#[tokio::test]
async fn test_long_page_is_truncated() {
    let server = MockServer::start().await;
    mount_registry(&server, &[server.uri()]).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_html(&page_links(&server, 1))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page0"))
        .respond_with(html(page_html(&"sunny and warm ".repeat(100))))
        .mount(&server)
        .await;

    let config = test_config(&registry_url(&server));
    let results = run_search(&QueryParams::new("weather", 1, 100), &config)
        .await
        .unwrap();

    assert_eq!(results[0].context.chars().count(), 103);
    assert!(results[0].context.ends_with("..."));
}

#[tokio::test]
async fn test_unreachable_registry_gives_no_results() {
    let config = test_config("http://127.0.0.1:1/");

    let results = run_search(&QueryParams::new("weather", 3, 500), &config)
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_static_mirrors_without_discovery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/registry"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_html(&page_links(&server, 1))))
        .mount(&server)
        .await;
    mount_pages(&server, 1).await;

    let mut config = test_config(&registry_url(&server));
    config.search.discover_mirrors = false;
    config.search.mirrors = vec![server.uri()];

    let results = run_search(&QueryParams::new("weather", 3, 500), &config)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source, "duckduckgo");
}

#[tokio::test]
async fn test_list_mirrors_dedups_registry() {
    let server = MockServer::start().await;
    let mirrors = vec![
        "https://searx.one.test/".to_string(),
        "https://searx.two.test/".to_string(),
        "https://searx.one.test/".to_string(),
        "/not-absolute".to_string(),
    ];
    mount_registry(&server, &mirrors).await;

    let directory = list_mirrors(&test_config(&registry_url(&server)))
        .await
        .unwrap();

    assert_eq!(
        directory.iter().collect::<Vec<_>>(),
        vec!["https://searx.one.test/", "https://searx.two.test/"]
    );
}
