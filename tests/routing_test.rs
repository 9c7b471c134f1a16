//! Endpoint routing, auth headers and lane selection as seen by the transport.

mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use storyboard_dispatch::config::{DEFAULT_API_ORIGIN, MemorySettingsStore, SETTINGS_KEY};
use storyboard_dispatch::dispatch::Dispatcher;
use storyboard_dispatch::retry::RetryPolicy;
use support::ScriptedTransport;

async fn url_for_host(host: &str) -> String {
    let transport = Arc::new(ScriptedTransport::ok_json(json!({})));
    let settings = json!({ "apiHost": host, "apiKey": "k-1" }).to_string();
    let dispatcher = support::dispatcher(&settings, transport.clone(), RetryPolicy::disabled());
    dispatcher
        .dispatch("gemini-2.5-flash", "generateContent", json!({}))
        .await
        .unwrap();
    transport.seen()[0].request.url.clone()
}

#[tokio::test]
async fn empty_host_targets_public_origin() {
    assert_eq!(
        url_for_host("").await,
        format!("{DEFAULT_API_ORIGIN}/v1beta/models/gemini-2.5-flash:generateContent?key=k-1")
    );
}

#[tokio::test]
async fn slash_host_stays_same_origin_relative() {
    assert_eq!(
        url_for_host("/api/").await,
        "/api/v1beta/models/gemini-2.5-flash:generateContent?key=k-1"
    );
}

#[tokio::test]
async fn bare_host_is_made_absolute_over_https() {
    assert_eq!(
        url_for_host("example.com").await,
        "https://example.com/v1beta/models/gemini-2.5-flash:generateContent?key=k-1"
    );
}

#[tokio::test]
async fn key_is_sent_in_both_auth_headers() {
    let transport = Arc::new(ScriptedTransport::ok_json(json!({})));
    let dispatcher = Dispatcher::builder()
        .settings_store(Arc::new(MemorySettingsStore::with_entry(
            SETTINGS_KEY,
            r#"{"apiKey":"k-1"}"#,
        )))
        .transport(transport.clone())
        .header("x-relay-tenant", "storyboard")
        .build()
        .unwrap();
    dispatcher
        .dispatch("gemini-2.5-flash", "countTokens", json!({ "contents": [] }))
        .await
        .unwrap();

    let request = &transport.seen()[0].request;
    assert_eq!(request.headers["x-goog-api-key"], "k-1");
    assert_eq!(request.headers["authorization"], "Bearer k-1");
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(request.headers["x-relay-tenant"], "storyboard");
    assert!(request.url.contains(":countTokens?"));
    assert_eq!(request.body, json!({ "contents": [] }));
}

#[tokio::test]
async fn settings_change_applies_to_next_dispatch() {
    let transport = Arc::new(ScriptedTransport::ok_json(json!({})));
    let store = MemorySettingsStore::with_entry(SETTINGS_KEY, r#"{"apiHost":"a.example"}"#);
    let dispatcher = Dispatcher::builder()
        .settings_store(Arc::new(store.clone()))
        .transport(transport.clone())
        .build()
        .unwrap();

    dispatcher
        .dispatch("gemini-2.5-flash", "generateContent", json!({}))
        .await
        .unwrap();
    store.set(SETTINGS_KEY, r#"{"apiHost":"b.example"}"#);
    dispatcher
        .dispatch("gemini-2.5-flash", "generateContent", json!({}))
        .await
        .unwrap();

    let seen = transport.seen();
    assert!(seen[0].request.url.starts_with("https://a.example/"));
    assert!(seen[1].request.url.starts_with("https://b.example/"));
}

#[tokio::test(start_paused = true)]
async fn image_models_are_serialized_text_models_overlap() {
    let latency = Duration::from_secs(1);

    let image_transport = Arc::new(ScriptedTransport::ok_json(json!({})).with_latency(latency));
    let dispatcher = support::dispatcher("{}", image_transport.clone(), RetryPolicy::disabled());
    let started = tokio::time::Instant::now();
    let (a, b) = tokio::join!(
        dispatcher.dispatch("gemini-2.5-flash-image", "generateContent", json!({})),
        dispatcher.dispatch("gemini-2.5-flash-image", "generateContent", json!({})),
    );
    a.unwrap();
    b.unwrap();
    assert!(started.elapsed() >= 2 * latency);
    assert_eq!(image_transport.peak_in_flight(), 1);

    let text_transport = Arc::new(ScriptedTransport::ok_json(json!({})).with_latency(latency));
    let dispatcher = support::dispatcher("{}", text_transport.clone(), RetryPolicy::disabled());
    let started = tokio::time::Instant::now();
    let (a, b) = tokio::join!(
        dispatcher.dispatch("gemini-2.5-flash", "generateContent", json!({})),
        dispatcher.dispatch("gemini-2.5-flash", "generateContent", json!({})),
    );
    a.unwrap();
    b.unwrap();
    assert!(started.elapsed() < 2 * latency);
    assert_eq!(text_transport.peak_in_flight(), 2);
}

#[tokio::test(start_paused = true)]
async fn image_config_payload_routes_text_model_to_image_lane() {
    let transport = Arc::new(
        ScriptedTransport::ok_json(json!({})).with_latency(Duration::from_millis(100)),
    );
    let dispatcher = support::dispatcher("{}", transport.clone(), RetryPolicy::disabled());
    let payload = json!({ "generationConfig": { "imageConfig": { "aspectRatio": "1:1" } } });

    let (a, b) = tokio::join!(
        dispatcher.dispatch("relay-model", "generateContent", payload.clone()),
        dispatcher.dispatch("relay-model", "generateContent", payload),
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(transport.peak_in_flight(), 1);
    assert_eq!(dispatcher.lanes().image().stats().completed, 2);
    assert_eq!(dispatcher.lanes().text().stats().completed, 0);
}
