use reviewlens::models::Sentiment;
use reviewlens::{FetchConfig, MarketplaceClient, ReviewFetcher, ReviewPipeline};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/api/entrypoint-api.bx/page/json/v2";

// Widget state arrives JSON-encoded as a string, like the live API.
fn page_body(ids: std::ops::Range<u32>, next_page: bool) -> Value {
    let reviews: Vec<Value> = ids
        .map(|id| {
            json!({
                "id": id,
                "author": format!("Покупатель {}", id),
                "text": "Отлично, очень доволен, пришло быстро и без повреждений",
                "rating": 5,
                "createdAt": 1_700_000_000_000i64 + id as i64
            })
        })
        .collect();

    let widget = json!({
        "reviews": reviews,
        "paging": {"nextPage": next_page}
    });

    json!({
        "widgetStates": {
            "webListReviews-3231710-default-1": widget.to_string()
        }
    })
}

async fn mount_page(server: &MockServer, product: &str, page: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param(
            "url",
            format!("/product/{}/reviews?page={}", product, page).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> MarketplaceClient {
    MarketplaceClient::new(&FetchConfig::immediate(server.uri())).expect("client builds")
}

#[tokio::test]
async fn test_paginates_until_next_page_is_false() {
    let server = MockServer::start().await;
    mount_page(&server, "123", 1, page_body(0..10, true)).await;
    mount_page(&server, "123", 2, page_body(10..20, true)).await;
    mount_page(&server, "123", 3, page_body(20..24, false)).await;

    let client = client_for(&server);
    let fetcher = ReviewFetcher::new(&client, FetchConfig::immediate(server.uri()).throttle);
    let reviews = fetcher.fetch("123", None).await.unwrap();

    assert_eq!(reviews.len(), 24);
    assert_eq!(reviews[0].review_id, "0");
    assert_eq!(reviews[23].review_id, "23");
    assert_eq!(reviews[5].author, "Покупатель 5");
    assert_eq!(reviews[5].rating, 5.0);
}

#[tokio::test]
async fn test_sends_browser_like_headers() {
    let server = MockServer::start().await;
    let referer = format!("{}/product/55/reviews", server.uri());

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(header_exists("user-agent"))
        .and(header("referer", referer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..3, false)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let fetcher = ReviewFetcher::new(&client, FetchConfig::immediate(server.uri()).throttle);
    let reviews = fetcher.fetch("55", None).await.unwrap();

    assert_eq!(reviews.len(), 3);
}

#[tokio::test]
async fn test_retries_service_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "7", 1, page_body(0..4, false)).await;

    let client = client_for(&server);
    let fetcher = ReviewFetcher::new(&client, FetchConfig::immediate(server.uri()).throttle);
    let reviews = fetcher.fetch("7", None).await.unwrap();

    assert_eq!(reviews.len(), 4);
}

#[tokio::test]
async fn test_request_timeout_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(0..1, false))
                .set_delay(Duration::from_millis(1500)),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "8", 1, page_body(0..1, false)).await;

    let mut config = FetchConfig::immediate(server.uri());
    config.request_timeout = Duration::from_millis(300);
    let client = MarketplaceClient::new(&config).expect("client builds");
    let fetcher = ReviewFetcher::new(&client, config.throttle.clone());
    let reviews = fetcher.fetch("8", None).await.unwrap();

    assert_eq!(reviews.len(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_return_partial_results() {
    let server = MockServer::start().await;
    mount_page(&server, "7", 1, page_body(0..10, true)).await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("url", "/product/7/reviews?page=2"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let fetcher = ReviewFetcher::new(&client, FetchConfig::immediate(server.uri()).throttle);
    let reviews = fetcher.fetch("7", None).await.unwrap();

    assert_eq!(reviews.len(), 10);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let fetcher = ReviewFetcher::new(&client, FetchConfig::immediate(server.uri()).throttle);
    let reviews = fetcher.fetch("7", Some(10)).await.unwrap();

    assert!(reviews.is_empty());
}

#[tokio::test]
async fn test_missing_widget_ends_pagination() {
    let server = MockServer::start().await;
    mount_page(&server, "9", 1, page_body(0..5, true)).await;
    mount_page(&server, "9", 2, json!({"widgetStates": {"captcha-1": "{}"}})).await;

    let client = client_for(&server);
    let fetcher = ReviewFetcher::new(&client, FetchConfig::immediate(server.uri()).throttle);
    let reviews = fetcher.fetch("9", None).await.unwrap();

    assert_eq!(reviews.len(), 5);
}

#[tokio::test]
async fn test_html_block_page_ends_pagination() {
    let server = MockServer::start().await;
    mount_page(&server, "9", 1, page_body(0..5, true)).await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("url", "/product/9/reviews?page=2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Доступ ограничен</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let fetcher = ReviewFetcher::new(&client, FetchConfig::immediate(server.uri()).throttle);
    let reviews = fetcher.fetch("9", None).await.unwrap();

    assert_eq!(reviews.len(), 5);
}

#[tokio::test]
async fn test_max_reviews_stops_requesting() {
    let server = MockServer::start().await;
    mount_page(&server, "1", 1, page_body(0..20, true)).await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("url", "/product/1/reviews?page=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(20..40, false)))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let fetcher = ReviewFetcher::new(&client, FetchConfig::immediate(server.uri()).throttle);
    let reviews = fetcher.fetch("1", Some(5)).await.unwrap();

    assert_eq!(reviews.len(), 5);
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let server = MockServer::start().await;

    let widget = json!({
        "reviews": [
            {"id": "a1", "author": "???", "text": "супер", "rating": 5, "createdAt": 1_700_000_000_000i64},
            {"id": "a2", "author": "Игорь", "text": "Ужасно, разочарован качеством швов и подошвы", "rating": 1, "createdAt": 1_700_000_100_000i64}
        ],
        "paging": {"nextPage": false}
    });
    mount_page(
        &server,
        "123456",
        1,
        json!({"widgetStates": {"webListReviews-1-default-1": widget.to_string()}}),
    )
    .await;

    let pipeline = ReviewPipeline::new(FetchConfig::immediate(server.uri()));
    let reviews = pipeline
        .run("https://example.com/product/shoes-123456/reviews", Some(10))
        .await
        .unwrap();

    assert_eq!(reviews.len(), 2);

    let first = &reviews[0];
    assert_eq!(first.product_id.as_str(), "123456");
    assert_eq!(first.review_id, "a1");
    assert_eq!(first.sentiment, Sentiment::Positive);
    assert_eq!(first.fake_score, 0.5);
    assert!(!first.is_fake);

    let second = &reviews[1];
    assert_eq!(second.sentiment, Sentiment::Negative);
    assert_eq!(second.fake_score, 0.0);
}

#[tokio::test]
async fn test_pipeline_rejects_free_text_without_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = ReviewPipeline::new(FetchConfig::immediate(server.uri()));
    let result = pipeline.run("кроссовки найк", Some(5)).await;

    assert!(matches!(result, Err(reviewlens::Error::InvalidInput(_))));
}
