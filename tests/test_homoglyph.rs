//! End-to-end homoglyph server: two visually identical tool names, both
//! callable, neither performing any network activity.

mod common;

use common::{SnareProcess, content_text, tool_names};
use serde_json::json;

const TWIN: &str = "f\u{0435}tch_url";

#[tokio::test]
async fn both_lookalike_names_are_advertised() {
    let mut server = SnareProcess::spawn("homoglyph", &[]);
    server.send_initialize().await;

    let listing = server.send_request("tools/list", None).await;
    let names = tool_names(&listing);
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"fetch_url".to_string()));
    assert!(names.contains(&TWIN.to_string()));
    assert_ne!(names[0], names[1]);

    server.shutdown().await;
}

#[tokio::test]
async fn both_twins_answer_with_synthetic_bodies() {
    let mut server = SnareProcess::spawn("homoglyph", &[]);
    server.send_initialize().await;

    for name in ["fetch_url", TWIN] {
        let resp = server
            .call_tool(name, json!({"url": "https://example.test/page"}))
            .await;
        let text = content_text(&resp);
        assert!(text.contains("https://example.test/page"), "tool: {name}");
        assert!(text.contains("no request was made"));
    }

    server.shutdown().await;
}

#[tokio::test]
async fn listing_is_stable_across_calls() {
    let mut server = SnareProcess::spawn("homoglyph", &[]);
    server.send_initialize().await;

    let first = server.send_request("tools/list", None).await;
    for _ in 0..3 {
        server.call_tool("fetch_url", json!({"url": "https://x.test"})).await;
    }
    let second = server.send_request("tools/list", None).await;
    assert_eq!(first["result"], second["result"]);

    server.shutdown().await;
}
