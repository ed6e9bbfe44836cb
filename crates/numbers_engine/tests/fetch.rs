use std::time::Duration;

use numbers_engine::{FailureKind, FetchSettings, Fetcher, ReqwestFetcher};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(settings: FetchSettings) -> ReqwestFetcher {
    ReqwestFetcher::new(settings).expect("client builds")
}

#[tokio::test]
async fn fetcher_returns_numbers_in_payload_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/primes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "numbers": [7, 2, 3, 2] })))
        .mount(&server)
        .await;

    let url = format!("{}/primes", server.uri());
    let numbers = fetcher(FetchSettings::default())
        .fetch(&url)
        .await
        .expect("fetch ok");
    assert_eq!(numbers, vec![7, 2, 3, 2]);
}

#[tokio::test]
async fn fetcher_accepts_any_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accepted"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "numbers": [1] })))
        .mount(&server)
        .await;

    let url = format!("{}/accepted", server.uri());
    let numbers = fetcher(FetchSettings::default()).fetch(&url).await.unwrap();
    assert_eq!(numbers, vec![1]);
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/unavailable"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "numbers": [1, 2] })))
        .mount(&server)
        .await;

    let url = format!("{}/unavailable", server.uri());
    let err = fetcher(FetchSettings::default())
        .fetch(&url)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn fetcher_fails_on_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("numbers: 1, 2", "text/plain"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/floats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "numbers": [1.5, 2] })))
        .mount(&server)
        .await;

    let fetcher = fetcher(FetchSettings::default());
    for route in ["/garbage", "/floats"] {
        let url = format!("{}{}", server.uri(), route);
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode, "route {route}");
    }
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "numbers": [1] })),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher(FetchSettings::with_request_timeout(Duration::from_millis(50)));
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"numbers":[1,2,3]}"#))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: Some(10),
        ..FetchSettings::default()
    };
    let url = format!("{}/large", server.uri());

    let err = fetcher(settings).fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(19)
        }
    );
}

#[tokio::test]
async fn fetcher_rejects_invalid_url() {
    let err = fetcher(FetchSettings::default())
        .fetch("not a url")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
