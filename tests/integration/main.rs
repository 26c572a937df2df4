//! Integration tests for climbwatch
//!
//! These tests serve listing pages from wiremock servers and drive the
//! HTTP page driver, the crawl controller, and the snapshot pipeline
//! end-to-end.

mod crawl_tests;
mod pipeline_tests;

use climbwatch::config::{parse_config, Config};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders one listing page; `next` is the href of the next link, if any
pub fn listing_page(names: &[&str], next: Option<&str>) -> String {
    let mut html = String::from("<html><body><main>");
    for name in names {
        html.push_str(&format!(
            r#"<div class="SearchResult"><h3> {} </h3><p>Italian</p></div>"#,
            name
        ));
    }
    if let Some(href) = next {
        html.push_str(&format!(r#"<a rel="next" href="{}">Next page</a>"#, href));
    }
    html.push_str("</main></body></html>");
    html
}

/// Serves `html` at `route`
pub async fn serve(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

/// Serves a bare status code at `route`
pub async fn serve_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Creates a fast test configuration for a listing at `<server>/list`
pub fn create_test_config(server: &MockServer, extra: &str) -> Config {
    parse_config(&format!(
        r#"
        [crawler]
        listing-url = "{}/list"
        navigation-timeout = 5000
        card-timeout = 200
        idle-timeout = 2000
        retry-backoff = 10
        {}

        [pacing]
        min-delay = 0
        max-delay = 5
        "#,
        server.uri(),
        extra
    ))
    .unwrap()
}
