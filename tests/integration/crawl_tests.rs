//! Integration tests for the crawler
//!
//! The first group drives the coordinator with an in-memory link graph so
//! depth, scoping, de-duplication and termination can be checked exactly. The
//! second group uses wiremock servers to exercise the HTTP fetcher end-to-end.

use async_trait::async_trait;
use linkcrawl::config::Config;
use linkcrawl::crawler::{Coordinator, HttpFetcher, LinkSource};
use linkcrawl::output::{CrawlStatistics, LinkSink, MemorySink};
use linkcrawl::{CrawlError, FetchError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Upper bound for any single crawl; hitting it means the run deadlocked
const CRAWL_TIMEOUT: Duration = Duration::from_secs(10);

/// In-memory link graph standing in for the network
#[derive(Default)]
struct GraphSource {
    pages: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    delay: Duration,
    fetched: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl GraphSource {
    fn new(edges: &[(&str, &[&str])]) -> Self {
        Self {
            pages: edges
                .iter()
                .map(|(page, links)| {
                    (
                        canonical(page),
                        links.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
            ..Self::default()
        }
    }

    fn failing(mut self, page: &str) -> Self {
        self.failing.insert(canonical(page));
        self
    }

    fn panicking(mut self, page: &str) -> Self {
        self.panicking.insert(canonical(page));
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn fetch_count(&self, page: &str) -> usize {
        let page = canonical(page);
        self.fetched().iter().filter(|f| **f == page).count()
    }
}

#[async_trait]
impl LinkSource for GraphSource {
    async fn fetch_and_extract(&self, url: &Url) -> Result<Vec<String>, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        if self.panicking.contains(url.as_str()) {
            panic!("link source blew up on {}", url);
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(url.as_str()) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(self.pages.get(url.as_str()).cloned().unwrap_or_default())
    }
}

/// Formats a URL the way `Url` serializes it
fn canonical(url: &str) -> String {
    Url::parse(url).expect("test URL must parse").to_string()
}

fn create_test_config(max_depth: i32, workers: usize) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.workers = workers;
    config.filter.capacity = 10_000;
    config
}

async fn crawl(
    seed: &str,
    config: &Config,
    source: Arc<dyn LinkSource>,
) -> (CrawlStatistics, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::new(seed, config, source, sink.clone())
        .expect("Failed to create coordinator");
    let stats = tokio::time::timeout(CRAWL_TIMEOUT, coordinator.run())
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed");
    (stats, sink)
}

fn sorted(links: Vec<String>) -> Vec<String> {
    let mut links = links;
    links.sort();
    links
}

#[tokio::test]
async fn test_seed_with_two_children_at_depth_one() {
    let source = Arc::new(GraphSource::new(&[
        (
            "https://example.org",
            &["https://example.org/foo", "https://example.org/bar"],
        ),
        ("https://example.org/foo", &[]),
        ("https://example.org/bar", &[]),
    ]));

    let (stats, sink) = crawl(
        "https://example.org",
        &create_test_config(1, 10),
        source.clone(),
    )
    .await;

    assert_eq!(
        sorted(sink.links()),
        vec!["https://example.org/bar", "https://example.org/foo"]
    );
    assert_eq!(source.fetched().len(), 3);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.links_printed, 2);
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seed() {
    let source = Arc::new(GraphSource::new(&[
        ("https://example.org/", &["https://example.org/a", "https://example.org/b"]),
        ("https://example.org/a", &["https://example.org/c"]),
    ]));

    let (stats, sink) = crawl(
        "https://example.org/",
        &create_test_config(0, 4),
        source.clone(),
    )
    .await;

    assert_eq!(source.fetched(), vec!["https://example.org/"]);
    // Links of the seed are still printed
    assert_eq!(
        sorted(sink.links()),
        vec!["https://example.org/a", "https://example.org/b"]
    );
    assert_eq!(stats.depth_exhausted, 2);
}

#[tokio::test]
async fn test_depth_bound_on_chain() {
    let source = Arc::new(GraphSource::new(&[
        ("https://example.org/a", &["https://example.org/b"]),
        ("https://example.org/b", &["https://example.org/c"]),
        ("https://example.org/c", &["https://example.org/d"]),
        ("https://example.org/d", &["https://example.org/e"]),
    ]));

    let (_stats, sink) = crawl(
        "https://example.org/a",
        &create_test_config(2, 3),
        source.clone(),
    )
    .await;

    assert_eq!(
        sorted(source.fetched()),
        vec![
            "https://example.org/a",
            "https://example.org/b",
            "https://example.org/c"
        ]
    );
    // d is discovered on c but never fetched, so e is never seen
    assert_eq!(sink.count("https://example.org/d"), 1);
    assert_eq!(sink.count("https://example.org/e"), 0);
}

#[tokio::test]
async fn test_cyclic_graph_terminates() {
    for workers in [1, 2, 8] {
        let source = Arc::new(GraphSource::new(&[
            ("https://example.org/a", &["https://example.org/b"]),
            ("https://example.org/b", &["https://example.org/a"]),
        ]));

        let (_stats, sink) = crawl(
            "https://example.org/a",
            &create_test_config(10, workers),
            source.clone(),
        )
        .await;

        assert_eq!(source.fetch_count("https://example.org/a"), 1);
        assert_eq!(source.fetch_count("https://example.org/b"), 1);
        assert_eq!(
            sorted(sink.links()),
            vec!["https://example.org/a", "https://example.org/b"]
        );
    }
}

#[tokio::test]
async fn test_shared_child_fetched_and_printed_once() {
    for workers in [1, 4, 16] {
        let source = Arc::new(
            GraphSource::new(&[
                (
                    "https://example.org/",
                    &["https://example.org/b", "https://example.org/c"],
                ),
                ("https://example.org/b", &["https://example.org/shared"]),
                ("https://example.org/c", &["https://example.org/shared"]),
                ("https://example.org/shared", &["https://example.org/"]),
            ])
            .with_delay(Duration::from_millis(5)),
        );

        let (_stats, sink) = crawl(
            "https://example.org/",
            &create_test_config(5, workers),
            source.clone(),
        )
        .await;

        assert_eq!(source.fetch_count("https://example.org/shared"), 1);
        assert_eq!(sink.count("https://example.org/shared"), 1);
        assert_eq!(source.fetched().len(), 4);
    }
}

#[tokio::test]
async fn test_external_domains_not_fetched_by_default() {
    let source = Arc::new(GraphSource::new(&[
        (
            "https://example.org/",
            &["https://other.org/page", "https://example.org/local"],
        ),
        ("https://example.org/local", &["https://third.org/"]),
        ("https://other.org/page", &["https://example.org/from-other"]),
    ]));

    let (_stats, sink) = crawl(
        "https://example.org/",
        &create_test_config(3, 4),
        source.clone(),
    )
    .await;

    assert_eq!(source.fetch_count("https://other.org/page"), 0);
    assert_eq!(source.fetch_count("https://third.org/"), 0);
    assert_eq!(source.fetch_count("https://example.org/local"), 1);
    // External links are still reported
    assert_eq!(sink.count("https://other.org/page"), 1);
    assert_eq!(sink.count("https://third.org/"), 1);
    assert_eq!(sink.count("https://example.org/from-other"), 0);
}

#[tokio::test]
async fn test_external_domains_followed_when_enabled() {
    let source = Arc::new(GraphSource::new(&[
        ("https://example.org/", &["https://other.org/page"]),
        ("https://other.org/page", &["https://example.org/from-other"]),
    ]));

    let mut config = create_test_config(2, 4);
    config.crawler.external_domains = true;
    let (_stats, sink) = crawl("https://example.org/", &config, source.clone()).await;

    assert_eq!(source.fetch_count("https://other.org/page"), 1);
    assert_eq!(source.fetch_count("https://example.org/from-other"), 1);
    assert_eq!(sink.count("https://example.org/from-other"), 1);
}

#[tokio::test]
async fn test_non_http_links_printed_but_not_fetched() {
    let links: &[&str] = &[
        "mailto:foobar@example.org",
        "javascript:void(0)",
        "file:///etc/passwd",
        "https://example.org/#top",
    ];
    let source = Arc::new(GraphSource::new(&[("https://example.org/", links)]));

    let (stats, sink) = crawl(
        "https://example.org/",
        &create_test_config(3, 4),
        source.clone(),
    )
    .await;

    assert_eq!(source.fetched(), vec!["https://example.org/"]);
    assert_eq!(sorted(sink.links()), sorted(links.iter().map(|l| l.to_string()).collect()));
    assert_eq!(stats.policy_rejected, 3);
    assert_eq!(stats.duplicates_skipped, 1);
}

#[tokio::test]
async fn test_fetch_errors_do_not_stop_crawl() {
    let source = Arc::new(
        GraphSource::new(&[
            (
                "https://example.org/",
                &["https://example.org/broken", "https://example.org/ok"],
            ),
            ("https://example.org/broken", &["https://example.org/never"]),
            ("https://example.org/ok", &["https://example.org/deeper"]),
        ])
        .failing("https://example.org/broken"),
    );

    let (stats, sink) = crawl(
        "https://example.org/",
        &create_test_config(2, 2),
        source.clone(),
    )
    .await;

    assert_eq!(source.fetch_count("https://example.org/deeper"), 1);
    assert_eq!(sink.count("https://example.org/never"), 0);
    assert_eq!(stats.fetch_errors, 1);
    assert_eq!(stats.pages_fetched, 3);
}

#[tokio::test]
async fn test_failing_seed_still_terminates() {
    let source = Arc::new(GraphSource::new(&[]).failing("https://example.org/"));

    let (stats, sink) = crawl(
        "https://example.org/",
        &create_test_config(3, 4),
        source.clone(),
    )
    .await;

    assert!(sink.links().is_empty());
    assert_eq!(stats.fetch_errors, 1);
    assert_eq!(stats.tasks_handled, 1);
}

#[tokio::test]
async fn test_panicking_fetch_does_not_stall_single_worker() {
    let source = Arc::new(
        GraphSource::new(&[
            (
                "https://example.org/",
                &["https://example.org/boom", "https://example.org/fine"],
            ),
            ("https://example.org/fine", &["https://example.org/after"]),
        ])
        .panicking("https://example.org/boom"),
    );

    let (stats, sink) = crawl(
        "https://example.org/",
        &create_test_config(2, 1),
        source.clone(),
    )
    .await;

    assert_eq!(stats.handler_panics, 1);
    assert_eq!(source.fetch_count("https://example.org/boom"), 1);
    assert_eq!(source.fetch_count("https://example.org/after"), 1);
    assert_eq!(sink.count("https://example.org/after"), 1);
    assert_eq!(stats.tasks_handled, stats.tasks_enqueued);
}

#[tokio::test]
async fn test_request_limit_bounds_in_flight_fetches() {
    let children: Vec<String> = (0..12)
        .map(|i| format!("https://example.org/child/{}", i))
        .collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
    let source = Arc::new(
        GraphSource::new(&[("https://example.org/", child_refs.as_slice())])
            .with_delay(Duration::from_millis(20)),
    );

    let mut config = create_test_config(1, 8);
    config.crawler.max_concurrent_requests = Some(2);
    let (stats, _sink) = crawl("https://example.org/", &config, source.clone()).await;

    assert_eq!(stats.pages_fetched, 13);
    let peak = source.max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 2, "peak in-flight fetches was {}", peak);
}

/// Accepts a fixed number of links, then behaves like a closed pipe
struct ClosingSink {
    remaining: AtomicUsize,
    accepted: Mutex<Vec<String>>,
}

impl LinkSink for ClosingSink {
    fn emit(&self, link: &str) -> std::io::Result<()> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left == 0 {
            return Err(std::io::ErrorKind::BrokenPipe.into());
        }
        self.remaining.store(left - 1, Ordering::SeqCst);
        self.accepted.lock().unwrap().push(link.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_closed_output_ends_crawl_early() {
    let children: Vec<String> = (0..50)
        .map(|i| format!("https://example.org/c/{}", i))
        .collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
    let source = Arc::new(GraphSource::new(&[(
        "https://example.org/",
        child_refs.as_slice(),
    )]));
    let sink = Arc::new(ClosingSink {
        remaining: AtomicUsize::new(2),
        accepted: Mutex::new(Vec::new()),
    });

    let coordinator = Coordinator::new(
        "https://example.org/",
        &create_test_config(3, 1),
        source.clone(),
        sink.clone(),
    )
    .expect("Failed to create coordinator");
    let stats = tokio::time::timeout(CRAWL_TIMEOUT, coordinator.run())
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed");

    assert_eq!(source.fetched().len(), 1);
    assert_eq!(sink.accepted.lock().unwrap().len(), 2);
    assert_eq!(stats.links_printed, 2);
}

const BACK_TO_SEED: &[&str] = &["https://example.org/"];

#[tokio::test]
async fn test_wide_fan_out_terminates() {
    let children: Vec<String> = (0..300)
        .map(|i| format!("https://example.org/p/{}", i))
        .collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
    let mut edges: Vec<(&str, &[&str])> = vec![("https://example.org/", child_refs.as_slice())];
    // Every child links back to the seed
    edges.extend(child_refs.iter().map(|child| (*child, BACK_TO_SEED)));
    let source = Arc::new(GraphSource::new(&edges));

    let (stats, sink) = crawl(
        "https://example.org/",
        &create_test_config(4, 16),
        source.clone(),
    )
    .await;

    assert_eq!(stats.pages_fetched, 301);
    assert_eq!(sink.links().len(), 301);
    // The seed is enqueued like any other task
    assert_eq!(stats.tasks_handled, stats.tasks_enqueued);
}

#[tokio::test]
async fn test_invalid_seed_is_reported() {
    let result = Coordinator::new(
        "://missing-scheme",
        &Config::default(),
        Arc::new(GraphSource::default()),
        Arc::new(MemorySink::new()),
    );
    assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
}

// ===== HTTP fetcher against wiremock =====

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn http_crawl(seed: &str, config: &Config) -> (CrawlStatistics, Arc<MemorySink>) {
    let fetcher = HttpFetcher::new(&config.http).expect("Failed to build HTTP client");
    crawl(seed, config, Arc::new(fetcher)).await
}

#[tokio::test]
async fn test_http_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <a href="/page1">Page 1</a>
                <a href="page2">Page 2</a>
                <a href="mailto:admin@example.org">Mail</a>
                <a href="https://external.invalid/x">External</a>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"<a href="/page2">again</a><a href="/">home</a>"#.to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("<p>No links here</p>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (stats, sink) = http_crawl(&format!("{}/", base_url), &create_test_config(2, 4)).await;

    assert_eq!(
        sorted(sink.links()),
        sorted(vec![
            format!("{}/", base_url),
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
            "https://external.invalid/x".to_string(),
            "mailto:admin@example.org".to_string(),
        ])
    );
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.fetch_errors, 0);
}

#[tokio::test]
async fn test_http_links_resolved_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new/"))
        .respond_with(html(r#"<a href="child">Child</a>"#.to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (_stats, sink) = http_crawl(&format!("{}/old", base_url), &create_test_config(0, 2)).await;

    assert_eq!(sink.links(), vec![format!("{}/new/child", base_url)]);
}

#[tokio::test]
async fn test_http_error_page_links_are_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/missing">Missing</a><a href="/present">Present</a>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(
            r#"<p>Not found</p><a href="/sitemap">Sitemap</a>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/present"))
        .respond_with(html(r#"<a href="/deeper">Deeper</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html("<p>bottom</p>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (stats, sink) = http_crawl(&format!("{}/", base_url), &create_test_config(2, 4)).await;

    assert_eq!(stats.fetch_errors, 0);
    assert_eq!(stats.pages_fetched, 5);
    assert_eq!(sink.count(&format!("{}/sitemap", base_url)), 1);
    assert_eq!(sink.count(&format!("{}/deeper", base_url)), 1);
}

#[tokio::test]
async fn test_http_non_html_yields_no_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/report.pdf">Report</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/hidden">not really html</a>"#, "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html("<p>hidden</p>".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (_stats, sink) = http_crawl(&format!("{}/", base_url), &create_test_config(3, 2)).await;

    assert_eq!(sink.links(), vec![format!("{}/report.pdf", base_url)]);
}
