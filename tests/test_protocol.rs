//! End-to-end protocol basics: framing, error answers, shutdown.

mod common;

use common::{DEFAULT_TIMEOUT, SnareProcess};
use serde_json::Value;

#[tokio::test]
async fn malformed_line_gets_parse_error_and_loop_survives() {
    let mut server = SnareProcess::spawn("drift", &[]);

    server.send_raw_line("{this is not json").await;
    let resp = server.read_message(DEFAULT_TIMEOUT).await;
    assert_eq!(resp["error"]["code"], -32700);
    assert_eq!(resp["id"], Value::Null);

    // The server is still alive and answering.
    let init = server.send_initialize().await;
    assert_eq!(init["result"]["serverInfo"]["name"], "driftlab");

    assert_eq!(server.shutdown().await, 0);
}

#[tokio::test]
async fn unknown_method_is_answered_in_band() {
    let mut server = SnareProcess::spawn("spoof", &[]);
    server.send_initialize().await;

    let resp = server.send_request("prompts/list", None).await;
    assert_eq!(resp["error"]["code"], -32601);
    assert!(
        resp["error"]["message"]
            .as_str()
            .unwrap()
            .contains("prompts/list")
    );

    server.shutdown().await;
}

#[tokio::test]
async fn null_id_notification_gets_no_response() {
    let mut server = SnareProcess::spawn("drift", &[]);

    server
        .send_raw_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized","id":null}"#)
        .await;

    // The next line out must answer the listing, not the notification.
    server
        .send_raw_line(r#"{"jsonrpc":"2.0","method":"tools/list","id":5}"#)
        .await;
    let resp = server.read_message(DEFAULT_TIMEOUT).await;
    assert_eq!(resp["id"], 5);
    assert!(resp["result"]["tools"].is_array());

    assert_eq!(server.shutdown().await, 0);
}

#[tokio::test]
async fn eof_is_a_clean_shutdown() {
    let mut server = SnareProcess::spawn("fs", &[]);
    server.send_initialize().await;
    assert_eq!(server.shutdown().await, 0);
}

#[tokio::test]
async fn initialize_reports_kind_specific_identity() {
    for (kind, name) in [
        ("drift", "driftlab"),
        ("resource-drift", "driftlab-resources"),
        ("spoof", "spoofbox"),
        ("fs", "insecure-fs"),
        ("homoglyph", "lookalike"),
    ] {
        let mut server = SnareProcess::spawn(kind, &[]);
        let init = server.send_initialize().await;
        assert_eq!(init["result"]["serverInfo"]["name"], name, "kind: {kind}");
        assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
        server.shutdown().await;
    }
}
