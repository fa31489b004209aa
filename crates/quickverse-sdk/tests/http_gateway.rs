use mockito::Matcher;
use quickverse_common_config::ClientConfig;
use quickverse_sdk::{Error, HttpGateway, QuickVerse, Transmission};
use serde_json::json;
use std::sync::Arc;

const TOKEN: &str = "Bearer Y29tLmV4YW1wbGUuYXBwOmtleTEyMw==";

fn client(server: &mockito::ServerGuard) -> QuickVerse {
    let gateway = HttpGateway::new(&format!("{}/sdk/api/", server.url())).unwrap();
    let quickverse = QuickVerse::builder(Arc::new(gateway))
        .device_languages(["fr-FR"])
        .build();
    quickverse.configure("key123", "com.example.app");
    quickverse
}

#[tokio::test]
async fn test_fetch_request_shape() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/sdk/api/localisation/en,fr-FR")
        .match_header("authorization", TOKEN)
        .match_header("platform", "Rust")
        .match_header("x_quickverse_version", env!("CARGO_PKG_VERSION"))
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": {
                    "localisations": [
                        {"key": "A", "target_text": "hello"},
                        {"key": "B", "target_text": "world"}
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let quickverse = client(&server);
    assert_eq!(quickverse.fetch_specific("en").await.unwrap(), 2);
    assert_eq!(quickverse.string_for("B").as_deref(), Some("world"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_report_body_shape() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sdk/api/localisation/en,fr-FR")
        .with_status(200)
        .with_body(r#"{"data":{"localisations":[{"key":"A","target_text":"hello"}]}}"#)
        .create_async()
        .await;
    let report = server
        .mock("POST", "/sdk/api/report")
        .match_header("authorization", TOKEN)
        .match_body(Matcher::Json(json!({
            "missing_keys": [{"key": "C", "default_value": "fallback"}],
            "utilised_keys": [{"key": "A", "usage_count": 2}]
        })))
        .with_status(200)
        .create_async()
        .await;

    let quickverse = client(&server);
    quickverse.fetch_specific("en").await.unwrap();
    quickverse.string_for("A");
    quickverse.string_for("A");
    assert_eq!(quickverse.string_for_or("C", "fallback"), "fallback");

    assert_eq!(quickverse.settle().await, Some(Transmission::Sent));
    assert!(quickverse.pending_report().is_empty());
    report.assert_async().await;
}

#[tokio::test]
async fn test_fetch_errors_are_fetch_failed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sdk/api/localisation/en,fr-FR")
        .with_status(401)
        .with_body("unauthorised")
        .create_async()
        .await;
    server
        .mock("GET", "/sdk/api/localisation/de,fr-FR")
        .with_status(200)
        .with_body(r#"{"localisations": []}"#)
        .create_async()
        .await;

    let quickverse = client(&server);

    let err = quickverse.fetch_specific("en").await.unwrap_err();
    assert!(matches!(err, Error::FetchFailed(_)));

    // A 2xx body without the data envelope is also a failure.
    let err = quickverse.fetch_specific("de").await.unwrap_err();
    assert!(matches!(err, Error::FetchFailed(_)));
    assert!(!quickverse.has_fetched());
}

#[tokio::test]
async fn test_rejected_report_keeps_records() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/sdk/api/report")
        .with_status(503)
        .create_async()
        .await;

    let quickverse = client(&server);
    quickverse.string_for_or("C", "fallback");

    assert_eq!(quickverse.settle().await, Some(Transmission::Failed));
    assert_eq!(quickverse.pending_report().missing_default_of("C"), Some("fallback"));
}

#[tokio::test]
async fn test_from_config_sends_device_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex(r"^/localisation/it".to_string()))
        .match_header("x-quickverse-deviceid", "device-42")
        .match_header("authorization", TOKEN)
        .with_status(200)
        .with_body(r#"{"data":{"localisations":[]}}"#)
        .create_async()
        .await;

    let config = ClientConfig {
        api_key: "key123".into(),
        package_name: "com.example.app".to_string(),
        base_url: server.url(),
        device_id: Some("device-42".to_string()),
        ..ClientConfig::default()
    };

    let quickverse = QuickVerse::from_config(&config).unwrap();
    assert_eq!(quickverse.fetch_specific("it").await.unwrap(), 0);
    mock.assert_async().await;
}

#[test]
fn test_invalid_base_url_is_setup_error() {
    assert!(matches!(QuickVerse::http("not a url"), Err(Error::Setup(_))));
}
