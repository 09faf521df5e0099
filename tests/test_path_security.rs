//! End-to-end path security: classification, sentinels, and the
//! configurable virtual filesystem.

mod common;

use common::{SnareProcess, content_text};
use serde_json::json;

#[tokio::test]
async fn passwd_read_returns_watermarked_synthetic_data() {
    let mut server = SnareProcess::spawn("fs", &[]);
    server.send_initialize().await;

    let resp = server.call_tool("read_file", json!({"path": "/etc/passwd"})).await;
    assert_eq!(resp["result"]["classification"], "synthetic_sensitive");
    let text = content_text(&resp);
    assert!(text.contains("SNARE-SYNTHETIC-DATA"));
    assert!(text.contains("root:x:0:0:"));

    server.shutdown().await;
}

#[tokio::test]
async fn traversal_is_blocked_even_toward_allowed_targets() {
    let mut server = SnareProcess::spawn("fs", &[]);
    server.send_initialize().await;

    for path in ["/safe/../secrets.txt", "/etc/../etc/passwd", "../x"] {
        let resp = server.call_tool("read_file", json!({"path": path})).await;
        assert_eq!(resp["result"]["classification"], "blocked", "path: {path}");
        assert_eq!(content_text(&resp), "[snare: access blocked by policy]");
    }

    server.shutdown().await;
}

#[tokio::test]
async fn ssh_key_paths_are_redacted() {
    let mut server = SnareProcess::spawn("fs", &[]);
    server.send_initialize().await;

    let resp = server
        .call_tool("read_file", json!({"path": "~/.ssh/id_rsa"}))
        .await;
    assert_eq!(resp["result"]["classification"], "blocked");
    assert_eq!(content_text(&resp), "[snare: key material redacted]");

    server.shutdown().await;
}

#[tokio::test]
async fn benign_reads_and_listings_work() {
    let mut server = SnareProcess::spawn("fs", &[]);
    server.send_initialize().await;

    let resp = server
        .call_tool("read_file", json!({"path": "/safe/data.txt"}))
        .await;
    assert_eq!(resp["result"]["classification"], "benign");
    assert_eq!(content_text(&resp), "benign payload 001\n");

    let resp = server.call_tool("list_dir", json!({"path": "/docs"})).await;
    assert_eq!(resp["result"]["entries"], json!(["readme.md"]));

    server.shutdown().await;
}

#[tokio::test]
async fn missing_path_is_a_params_error() {
    let mut server = SnareProcess::spawn("fs", &[]);
    server.send_initialize().await;

    let resp = server
        .call_tool("read_file", json!({"path": "/safe/absent.txt"}))
        .await;
    assert_eq!(resp["error"]["code"], -32602);

    server.shutdown().await;
}

#[tokio::test]
async fn custom_fs_json_replaces_the_default_tree() {
    let mut server = SnareProcess::spawn(
        "fs",
        &[(
            "SNARE_FS_JSON",
            r#"{"/safe/custom.txt": "from env", "/safe/sub/": null}"#,
        )],
    );
    server.send_initialize().await;

    let resp = server
        .call_tool("read_file", json!({"path": "/safe/custom.txt"}))
        .await;
    assert_eq!(content_text(&resp), "from env");

    // The default tree is gone.
    let resp = server
        .call_tool("read_file", json!({"path": "/safe/data.txt"}))
        .await;
    assert_eq!(resp["error"]["code"], -32602);

    server.shutdown().await;
}

#[tokio::test]
async fn malformed_fs_json_falls_back_to_default() {
    let mut server = SnareProcess::spawn("fs", &[("SNARE_FS_JSON", "{broken")]);
    server.send_initialize().await;

    let resp = server
        .call_tool("read_file", json!({"path": "/safe/data.txt"}))
        .await;
    assert_eq!(content_text(&resp), "benign payload 001\n");

    server.shutdown().await;
}
