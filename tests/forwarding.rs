//! Integration tests for `/api/v2` forwarding against a mock upstream.

mod common;

use std::time::{Duration, Instant};

use common::{closed_port, raw_get_status, start_pair, start_proxy, SLOW_UPSTREAM};

#[tokio::test]
async fn pokemon_by_name_forwards_once_and_returns_body() {
    let (addr, recorded, shutdown) = start_pair(5000).await;

    let resp = reqwest::get(format!("http://{addr}/api/v2/pokemon/pikachu"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["requested"], "/api/v2/pokemon/pikachu");
    assert_eq!(recorded.calls(), vec!["/api/v2/pokemon/pikachu"]);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn body_is_forwarded_verbatim() {
    let (addr, _recorded, shutdown) = start_pair(5000).await;

    let text = reqwest::get(format!("http://{addr}/api/v2/pokemon/25"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(text, r#"{"requested":"/api/v2/pokemon/25"}"#);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn pokemon_list_defaults_to_limit_20_offset_0() {
    let (addr, recorded, shutdown) = start_pair(5000).await;

    let resp = reqwest::get(format!("http://{addr}/api/v2/pokemon"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        recorded.calls(),
        vec!["/api/v2/pokemon?limit=20&offset=0"]
    );

    let _ = shutdown.send(());
}

#[tokio::test]
async fn pokemon_list_forwards_explicit_paging() {
    let (addr, recorded, shutdown) = start_pair(5000).await;

    let resp = reqwest::get(format!("http://{addr}/api/v2/pokemon?limit=5&offset=10"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        recorded.calls(),
        vec!["/api/v2/pokemon?limit=5&offset=10"]
    );

    let _ = shutdown.send(());
}

#[tokio::test]
async fn malformed_limit_is_rejected_without_upstream_call() {
    let (addr, recorded, shutdown) = start_pair(5000).await;

    let resp = reqwest::get(format!("http://{addr}/api/v2/pokemon?limit=twenty"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("limit"));
    assert!(recorded.calls().is_empty());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn named_resources_forward_to_matching_paths() {
    let (addr, recorded, shutdown) = start_pair(5000).await;

    for path in [
        "pokemon-species/pikachu",
        "ability/static",
        "type/electric",
        "move/thunderbolt",
    ] {
        let resp = reqwest::get(format!("http://{addr}/api/v2/{path}"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "{path}");
    }

    assert_eq!(
        recorded.calls(),
        vec![
            "/api/v2/pokemon-species/pikachu",
            "/api/v2/ability/static",
            "/api/v2/type/electric",
            "/api/v2/move/thunderbolt",
        ]
    );

    let _ = shutdown.send(());
}

#[tokio::test]
async fn generic_routes_forward_one_and_two_segments() {
    let (addr, recorded, shutdown) = start_pair(5000).await;

    let resp = reqwest::get(format!("http://{addr}/api/v2/generation"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let resp = reqwest::get(format!("http://{addr}/api/v2/generation/1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    assert_eq!(
        recorded.calls(),
        vec!["/api/v2/generation", "/api/v2/generation/1"]
    );

    let _ = shutdown.send(());
}

#[tokio::test]
async fn encoded_slash_stays_inside_one_segment() {
    let (addr, recorded, shutdown) = start_pair(5000).await;

    let resp = reqwest::get(format!("http://{addr}/api/v2/berry/a%2Fb"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(recorded.calls(), vec!["/api/v2/berry/a%2Fb"]);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn three_segments_match_nothing() {
    let (addr, recorded, shutdown) = start_pair(5000).await;

    let resp = reqwest::get(format!("http://{addr}/api/v2/a/b/c"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert!(recorded.calls().is_empty());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn dot_segments_are_rejected_without_upstream_call() {
    let (addr, recorded, shutdown) = start_pair(5000).await;

    for target in [
        "/api/v2/pokemon/%2E%2E",
        "/api/v2/pokemon/..",
        "/api/v2/berry/%2E",
        "/api/v2/%2E%2E",
        "/api/v2/%2e/1",
    ] {
        assert_eq!(raw_get_status(addr, target).await, 404, "{target}");
    }
    assert!(recorded.calls().is_empty(), "{:?}", recorded.calls());

    assert_eq!(raw_get_status(addr, "/api/v2/item/..a").await, 200);
    assert_eq!(recorded.calls(), vec!["/api/v2/item/..a"]);

    let _ = shutdown.send(());
}

async fn assert_empty_404(url: String) {
    let resp = reqwest::get(url).await.unwrap();
    assert_eq!(resp.status(), 404);
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn upstream_not_found_becomes_empty_404() {
    let (addr, recorded, shutdown) = start_pair(5000).await;

    assert_empty_404(format!("http://{addr}/api/v2/pokemon/missingno")).await;
    assert_eq!(recorded.calls().len(), 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn upstream_server_error_becomes_empty_404() {
    let (addr, _recorded, shutdown) = start_pair(5000).await;

    assert_empty_404(format!("http://{addr}/api/v2/boom")).await;

    let _ = shutdown.send(());
}

#[tokio::test]
async fn connection_refused_becomes_empty_404() {
    let dead = closed_port().await;
    let (addr, shutdown) = start_proxy(&format!("http://{dead}/api/v2"), 5000).await;

    assert_empty_404(format!("http://{addr}/api/v2/pokemon/pikachu")).await;

    let _ = shutdown.send(());
}

#[tokio::test]
async fn upstream_timeout_becomes_empty_404() {
    let (addr, recorded, shutdown) = start_pair(200).await;

    let start = Instant::now();
    assert_empty_404(format!("http://{addr}/api/v2/slow/1")).await;
    assert!(start.elapsed() < SLOW_UPSTREAM);
    assert_eq!(recorded.calls(), vec!["/api/v2/slow/1"]);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn slow_call_does_not_block_concurrent_fast_call() {
    let (addr, _recorded, shutdown) = start_pair(5000).await;

    let slow_url = format!("http://{addr}/api/v2/slow/1");
    let slow = tokio::spawn(async move { reqwest::get(slow_url).await.unwrap().status() });

    // Let the slow request reach the upstream first.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let start = Instant::now();
    let fast = reqwest::get(format!("http://{addr}/api/v2/pokemon/ditto"))
        .await
        .unwrap();
    assert_eq!(fast.status(), 200);
    assert!(start.elapsed() < Duration::from_millis(1000));
    assert!(!slow.is_finished());

    assert_eq!(slow.await.unwrap(), 200);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn correlation_id_is_echoed() {
    let (addr, _recorded, shutdown) = start_pair(5000).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/v2/pokemon/1"))
        .header("x-correlation-id", "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-correlation-id"], "req-42");

    let resp = reqwest::get(format!("http://{addr}/api/v2/boom"))
        .await
        .unwrap();
    assert!(resp.headers().contains_key("x-correlation-id"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let (addr, _recorded, shutdown) = start_pair(5000).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/v2/pokemon/1"))
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");

    let _ = shutdown.send(());
}
