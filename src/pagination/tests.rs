//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use async_trait::async_trait;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_case::test_case;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Scripted page source
// ============================================================================

/// In-memory page source keyed by URL. Unknown URLs and scripted failures
/// answer with an HTTP status error.
pub(crate) struct ScriptedSource<T> {
    pages: HashMap<String, std::result::Result<Page<T>, u16>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl<T: Clone + Send + Sync> ScriptedSource<T> {
    pub(crate) fn new() -> Self {
        Self {
            pages: HashMap::new(),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Chain of pages `page-1 -> page-2 -> ...`, the last with a null cursor
    pub(crate) fn chain(pages: Vec<Vec<T>>) -> Self {
        let mut source = Self::new();
        let count = pages.len();
        for (i, items) in pages.into_iter().enumerate() {
            let next = (i + 1 < count).then(|| format!("page-{}", i + 2));
            source = source.page(&format!("page-{}", i + 1), items, next.as_deref());
        }
        source
    }

    pub(crate) fn page(mut self, url: &str, items: Vec<T>, next: Option<&str>) -> Self {
        self.pages
            .insert(url.to_string(), Ok(Page::new(items, next.map(String::from))));
        self
    }

    pub(crate) fn failing(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), Err(status));
        self
    }

    /// Every fetch waits for one `notify_one` on the gate
    pub(crate) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> PageSource<T> for ScriptedSource<T> {
    async fn fetch_page(&self, url: &str) -> Result<Page<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.pages.get(url) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(status)) => Err(Error::http_status(*status, "scripted failure")),
            None => Err(Error::http_status(404, format!("no page at {url}"))),
        }
    }
}

fn numbered(start: u32, count: u32) -> Vec<u32> {
    (start..start + count).collect()
}

fn collection_of(source: &Arc<ScriptedSource<u32>>, first_url: &str) -> PaginatedCollection<u32> {
    PaginatedCollection::new(source.clone(), first_url)
}

// ============================================================================
// Page / CursorPolicy Tests
// ============================================================================

#[test]
fn test_page_content_deserialize() {
    let content: PageContent<serde_json::Value> = serde_json::from_value(json!({
        "current_page": 2,
        "data": [{"slug": "a"}, {"slug": "b"}],
        "first_page_url": "http://localhost:8000/api/products?page=1",
        "next_page_url": "http://localhost:8000/api/products?page=3",
        "per_page": 2,
        "prev_page_url": "http://localhost:8000/api/products?page=1"
    }))
    .unwrap();

    let page: Page<serde_json::Value> = content.into();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.current_page, Some(2));
    assert!(page.has_next());
}

#[test]
fn test_page_content_missing_data_is_empty() {
    let content: PageContent<u32> =
        serde_json::from_value(json!({"next_page_url": null})).unwrap();
    assert!(content.data.is_empty());
    assert!(!Page::from(content).has_next());
}

#[test]
fn test_cursor_policy_verbatim() {
    let policy = CursorPolicy::Verbatim;
    assert_eq!(
        policy
            .apply(Some("https://tunnel.example/api/x?page=2".into()))
            .unwrap(),
        Some("https://tunnel.example/api/x?page=2".to_string())
    );
    assert_eq!(policy.apply(None).unwrap(), None);
    assert_eq!(policy.apply(Some(String::new())).unwrap(), None);
}

#[test]
fn test_cursor_policy_rebase_keeps_path_and_query() {
    let policy = CursorPolicy::rebase("https://shop.example.com/");
    assert_eq!(
        policy
            .apply(Some(
                "http://localhost:8000/api/sub-sub-categories?page=3".into()
            ))
            .unwrap(),
        Some("https://shop.example.com/api/sub-sub-categories?page=3".to_string())
    );
    assert_eq!(
        policy
            .apply(Some("http://localhost:8000/api/categories".into()))
            .unwrap(),
        Some("https://shop.example.com/api/categories".to_string())
    );
    assert_eq!(
        policy.apply(Some("/api/products?page=2".into())).unwrap(),
        Some("/api/products?page=2".to_string())
    );
}

#[test]
fn test_cursor_policy_rebase_invalid_url() {
    let policy = CursorPolicy::rebase("https://shop.example.com");
    let result = policy.apply(Some("http://[bad".into()));
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_fetch_outcome_helpers() {
    assert!(FetchOutcome::Fetched {
        items: 3,
        exhausted: false
    }
    .is_fetched());
    assert!(FetchOutcome::Busy.is_noop());
    assert!(FetchOutcome::Exhausted.is_noop());
    assert!(CollectionState::Idle.can_fetch());
    assert!(!CollectionState::Errored.can_fetch());
}

// ============================================================================
// PaginatedCollection Tests
// ============================================================================

#[test_case(vec![10] ; "single page")]
#[test_case(vec![10, 10, 10] ; "three full pages")]
#[test_case(vec![5, 0, 7, 1] ; "uneven pages with an empty one")]
#[tokio::test]
async fn test_fetch_all_concatenates_in_order(sizes: Vec<u32>) {
    let mut pages = Vec::new();
    let mut next = 0;
    for size in &sizes {
        pages.push(numbered(next, *size));
        next += size;
    }
    let expected: Vec<u32> = pages.iter().flatten().copied().collect();

    let source = Arc::new(ScriptedSource::chain(pages));
    let collection = collection_of(&source, "page-1");

    let items = collection.fetch_all().await.unwrap();

    assert_eq!(items, expected);
    assert_eq!(items.len() as u32, sizes.iter().sum::<u32>());
    assert_eq!(source.calls(), sizes.len());
    assert_eq!(collection.pages_fetched().await, sizes.len());
    assert_eq!(collection.state().await, CollectionState::Exhausted);
    assert!(collection.next_page_url().await.is_none());
}

#[tokio::test]
async fn test_fetch_next_appends_and_advances_cursor() {
    let source = Arc::new(ScriptedSource::chain(vec![numbered(0, 3), numbered(3, 2)]));
    let collection = collection_of(&source, "page-1");

    assert_eq!(collection.state().await, CollectionState::Idle);
    assert!(collection.is_empty().await);
    assert_eq!(collection.next_page_url().await.as_deref(), Some("page-1"));

    let outcome = collection.fetch_next().await.unwrap();
    assert_eq!(
        outcome,
        FetchOutcome::Fetched {
            items: 3,
            exhausted: false
        }
    );
    assert_eq!(collection.items().await, vec![0, 1, 2]);
    assert_eq!(collection.next_page_url().await.as_deref(), Some("page-2"));

    let outcome = collection.fetch_next().await.unwrap();
    assert_eq!(
        outcome,
        FetchOutcome::Fetched {
            items: 2,
            exhausted: true
        }
    );
    assert_eq!(collection.items().await, vec![0, 1, 2, 3, 4]);
    assert!(collection.is_exhausted().await);
}

#[tokio::test]
async fn test_fetch_next_after_exhausted_is_noop() {
    let source = Arc::new(ScriptedSource::chain(vec![numbered(0, 4)]));
    let collection = collection_of(&source, "page-1");

    collection.fetch_next().await.unwrap();
    assert_eq!(source.calls(), 1);

    for _ in 0..3 {
        assert_eq!(
            collection.fetch_next().await.unwrap(),
            FetchOutcome::Exhausted
        );
    }
    assert_eq!(source.calls(), 1);
    assert_eq!(collection.len().await, 4);
}

#[tokio::test]
async fn test_fetch_next_while_fetching_is_noop() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource::chain(vec![numbered(0, 10), numbered(10, 10)]).gated(gate.clone()));
    let collection = collection_of(&source, "page-1");

    let (first, second) = tokio::join!(collection.fetch_next(), async {
        let outcome = collection.fetch_next().await;
        assert!(collection.is_fetching());
        assert_eq!(collection.state().await, CollectionState::Fetching);
        gate.notify_one();
        outcome
    });

    assert!(first.unwrap().is_fetched());
    assert_eq!(second.unwrap(), FetchOutcome::Busy);
    assert_eq!(source.calls(), 1);
    assert_eq!(collection.len().await, 10);
    assert!(!collection.is_fetching());
}

#[tokio::test]
async fn test_failed_page_keeps_items_and_halts() {
    let source = Arc::new(
        ScriptedSource::new()
            .page("page-1", numbered(0, 10), Some("page-2"))
            .failing("page-2", 500)
            .page("page-3", numbered(20, 10), None),
    );
    let collection = collection_of(&source, "page-1");

    let result = collection.fetch_all().await;
    assert!(matches!(result, Err(Error::HttpStatus { status: 500, .. })));

    assert_eq!(collection.items().await, numbered(0, 10));
    assert_eq!(collection.state().await, CollectionState::Errored);
    assert!(collection.last_error().await.unwrap().contains("500"));
    assert_eq!(collection.next_page_url().await.as_deref(), Some("page-2"));
    assert_eq!(source.calls(), 2);

    // No further progress
    assert_eq!(collection.fetch_next().await.unwrap(), FetchOutcome::Halted);
    assert!(matches!(
        collection.fetch_all().await,
        Err(Error::Halted { .. })
    ));
    assert_eq!(source.calls(), 2);
    assert_eq!(collection.len().await, 10);
}

#[tokio::test]
async fn test_resume_retries_failed_page() {
    let source = Arc::new(
        ScriptedSource::new()
            .page("page-1", numbered(0, 2), Some("page-2"))
            .failing("page-2", 503),
    );
    let collection = collection_of(&source, "page-1");

    collection.fetch_next().await.unwrap();
    assert!(collection.fetch_next().await.is_err());

    assert!(collection.resume().await);
    assert_eq!(collection.state().await, CollectionState::Idle);
    assert!(collection.last_error().await.is_none());

    // The failed page is requested again and fails again
    assert!(collection.fetch_next().await.is_err());
    assert_eq!(source.calls(), 3);
    assert_eq!(collection.items().await, vec![0, 1]);

    assert!(collection.resume().await);
    assert!(!collection.resume().await);
}

#[tokio::test]
async fn test_refresh_starts_over() {
    let source = Arc::new(ScriptedSource::chain(vec![numbered(0, 2), numbered(2, 2)]));
    let collection = collection_of(&source, "page-1");

    collection.fetch_all().await.unwrap();
    assert_eq!(collection.len().await, 4);

    assert!(collection.refresh().await);
    assert!(collection.is_empty().await);
    assert_eq!(collection.pages_fetched().await, 0);
    assert_eq!(collection.state().await, CollectionState::Idle);
    assert_eq!(collection.next_page_url().await.as_deref(), Some("page-1"));

    let items = collection.fetch_all().await.unwrap();
    assert_eq!(items, vec![0, 1, 2, 3]);
    assert_eq!(source.calls(), 4);
}

#[tokio::test]
async fn test_refresh_refused_while_fetching() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource::chain(vec![numbered(0, 1)]).gated(gate.clone()));
    let collection = collection_of(&source, "page-1");

    let (fetched, refreshed) = tokio::join!(collection.fetch_next(), async {
        let refreshed = collection.refresh().await;
        gate.notify_one();
        refreshed
    });

    assert!(fetched.unwrap().is_fetched());
    assert!(!refreshed);
    assert_eq!(collection.len().await, 1);
}

#[tokio::test]
async fn test_cancel_drops_in_flight_page() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource::chain(vec![numbered(0, 10)]).gated(gate));
    let collection = collection_of(&source, "page-1");

    let (outcome, ()) = tokio::join!(collection.fetch_next(), async {
        collection.cancel();
    });

    assert_eq!(outcome.unwrap(), FetchOutcome::Cancelled);
    assert!(collection.is_empty().await);
    assert!(!collection.is_fetching());
    assert_eq!(collection.next_page_url().await.as_deref(), Some("page-1"));

    assert_eq!(
        collection.fetch_next().await.unwrap(),
        FetchOutcome::Cancelled
    );
    assert!(matches!(collection.fetch_all().await, Err(Error::Cancelled)));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_parent_cancellation_reaches_collection() {
    let owner = CancellationToken::new();
    let source = Arc::new(ScriptedSource::chain(vec![numbered(0, 3)]));
    let collection = collection_of(&source, "page-1").with_cancellation(&owner);

    owner.cancel();

    assert!(collection.is_cancelled());
    assert_eq!(
        collection.fetch_next().await.unwrap(),
        FetchOutcome::Cancelled
    );
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_collection_cancel_does_not_touch_parent() {
    let owner = CancellationToken::new();
    let source = Arc::new(ScriptedSource::chain(vec![numbered(0, 3)]));
    let collection = collection_of(&source, "page-1").with_cancellation(&owner);

    collection.cancel();
    assert!(!owner.is_cancelled());
}

#[tokio::test]
async fn test_collection_rebases_cursor() {
    let source = Arc::new(
        ScriptedSource::new()
            .page(
                "https://shop.example.com/api/p",
                vec![1],
                Some("http://internal:8000/api/p?page=2"),
            )
            .page("https://shop.example.com/api/p?page=2", vec![2], None),
    );
    let collection = collection_of(&source, "https://shop.example.com/api/p")
        .with_cursor_policy(CursorPolicy::rebase("https://shop.example.com"));

    assert_eq!(collection.fetch_all().await.unwrap(), vec![1, 2]);
}

// ============================================================================
// Cursor Stream Tests
// ============================================================================

#[tokio::test]
async fn test_collect_all() {
    let source: Arc<dyn PageSource<u32>> = Arc::new(ScriptedSource::chain(vec![
        numbered(0, 3),
        numbered(3, 3),
        numbered(6, 1),
    ]));

    let items = collect_all(source, "page-1", CursorPolicy::Verbatim)
        .await
        .unwrap();
    assert_eq!(items, numbered(0, 7));
}

#[tokio::test]
async fn test_pages_stream_stops_after_error() {
    let scripted = Arc::new(
        ScriptedSource::new()
            .page("page-1", vec![1u32], Some("page-2"))
            .failing("page-2", 502)
            .page("page-3", vec![3], None),
    );
    let source: Arc<dyn PageSource<u32>> = scripted.clone();

    let results: Vec<Result<Page<u32>>> = pages(source, "page-1", CursorPolicy::Verbatim)
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(scripted.calls(), 2);
}

#[tokio::test]
async fn test_collect_all_fails_whole_listing() {
    let source: Arc<dyn PageSource<u32>> = Arc::new(
        ScriptedSource::new()
            .page("page-1", vec![1u32], Some("page-2"))
            .failing("page-2", 500),
    );

    let result = collect_all(source, "page-1", CursorPolicy::Verbatim).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_pages_stream_is_lazy() {
    let scripted = Arc::new(ScriptedSource::chain(vec![vec![1u32], vec![2], vec![3]]));
    let source: Arc<dyn PageSource<u32>> = scripted.clone();

    let first: Vec<Result<Page<u32>>> = pages(source, "page-1", CursorPolicy::Verbatim)
        .take(1)
        .collect()
        .await;

    assert_eq!(first.len(), 1);
    assert_eq!(scripted.calls(), 1);
}

// ============================================================================
// HTTP Page Source Tests
// ============================================================================

async fn mount_product_pages(server: &MockServer, pages: u32, per_page: u32) {
    for page in 1..=pages {
        let data: Vec<_> = (0..per_page)
            .map(|i| {
                let n = (page - 1) * per_page + i;
                json!({"id": n, "name": format!("Produk {n}"), "slug": format!("produk-{n}"), "price": 1000 + n})
            })
            .collect();
        let next = (page < pages).then(|| format!("{}/api/products?page={}", server.uri(), page + 1));

        let mut mock = Mock::given(method("GET")).and(path("/api/products"));
        if page > 1 {
            mock = mock.and(query_param("page", page.to_string()));
        }
        mock.respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Success",
            "content": {
                "current_page": page,
                "data": data,
                "next_page_url": next,
                "per_page": per_page
            },
            "error": null
        })))
        .with_priority(if page > 1 { 1 } else { 5 })
        .expect(1)
        .mount(server)
        .await;
    }
}

#[tokio::test]
async fn test_http_page_source_follows_next_page_url() {
    let server = MockServer::start().await;
    mount_product_pages(&server, 3, 10).await;

    let client = HttpClient::with_config(
        HttpClientConfig::builder().base_url(server.uri()).build(),
    )
    .unwrap();
    let source: Arc<dyn PageSource<serde_json::Value>> = Arc::new(HttpPageSource::new(client));
    let collection = PaginatedCollection::new(source, "/api/products");

    let items = collection.fetch_all().await.unwrap();

    assert_eq!(items.len(), 30);
    assert_eq!(items[0]["slug"], "produk-0");
    assert_eq!(items[29]["slug"], "produk-29");
}

#[tokio::test]
async fn test_http_page_source_sends_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/sub-sub-categories"))
        .and(wiremock::matchers::header("ngrok-skip-browser-warning", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {"data": [{"id": 1, "name": "Kopi"}], "next_page_url": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::with_config(
        HttpClientConfig::builder().base_url(server.uri()).build(),
    )
    .unwrap();
    let source = HttpPageSource::<serde_json::Value>::new(client)
        .header("ngrok-skip-browser-warning", "true");

    let page = source.fetch_page("/api/sub-sub-categories").await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_http_page_source_failure_halts_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Server Error"})))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {
                "data": [{"id": 1}, {"id": 2}],
                "next_page_url": format!("{}/api/products?page=2", server.uri())
            }
        })))
        .with_priority(5)
        .mount(&server)
        .await;

    let client = HttpClient::with_config(
        HttpClientConfig::builder().base_url(server.uri()).build(),
    )
    .unwrap();
    let source: Arc<dyn PageSource<serde_json::Value>> = Arc::new(HttpPageSource::new(client));
    let collection = PaginatedCollection::new(source, "/api/products");

    let result = collection.fetch_all().await;
    match result {
        Err(Error::HttpStatus { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "Server Error");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert_eq!(collection.len().await, 2);
    assert_eq!(collection.state().await, CollectionState::Errored);
}
