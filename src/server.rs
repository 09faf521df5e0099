//! Server runtime: the JSON-RPC dispatch loop.
//!
//! Wires the transport, engine, and handlers into a running MCP server.
//! One line in, at most one response out — except where a spoofing mode
//! deliberately violates that contract at the delivery step. Malformed
//! lines are answered in-band; only transport faults take the loop
//! down.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::Engine;
use crate::engine::registry::ServerKind;
use crate::engine::spoof::SpoofMode;
use crate::error::SnareError;
use crate::handlers::{initialize, resources, tools};
use crate::observability::EventEmitter;
use crate::observability::events::Event;
use crate::rng::DeterministicRng;
use crate::transport::Transport;
use crate::transport::jsonrpc::{JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, error_codes};

/// MCP server runtime.
///
/// Owns the engine exclusively; all protocol state mutation happens on
/// the loop task. The unsolicited-response timer is the only other
/// writer, and it shares nothing with the engine but an atomic counter.
pub struct Server {
    config: Config,
    engine: Engine,
    emitter: Arc<EventEmitter>,
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
    timer_cancel: CancellationToken,
    timer: Option<JoinHandle<()>>,
    unsolicited: Arc<AtomicU64>,
}

impl Server {
    /// Creates a server over the given transport.
    ///
    /// Cancelling `cancel` stops the main loop cooperatively.
    #[must_use]
    pub fn new(
        config: Config,
        engine: Engine,
        emitter: EventEmitter,
        transport: Arc<dyn Transport>,
        cancel: CancellationToken,
    ) -> Self {
        let timer_cancel = cancel.child_token();
        Self {
            config,
            engine,
            emitter: Arc::new(emitter),
            transport,
            cancel,
            timer_cancel,
            timer: None,
            unsolicited: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Runs the request loop until EOF, cancellation, or a fatal fault.
    ///
    /// Clean EOF is success. A transport fault emits a `fatal` event and
    /// surfaces as [`SnareError::Fatal`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails irrecoverably.
    pub async fn run(mut self) -> Result<(), SnareError> {
        self.emitter.emit(
            None,
            Event::ServerStart {
                server_name: self.config.kind.server_name().to_string(),
                kind: kind_tag(self.config.kind).to_string(),
                seed: self.config.seed.clone(),
            },
        );

        let result = self.main_loop().await;

        self.timer_cancel.cancel();
        if let Some(handle) = self.timer.take() {
            let _ = handle.await;
        }

        match result {
            Ok(()) => {
                let summary = self.engine.summary();
                self.emitter.emit(
                    None,
                    Event::ServerShutdown {
                        requests: summary.requests,
                        tool_calls: summary.tool_calls,
                        spoofs: summary.spoofs + self.unsolicited.load(Ordering::SeqCst),
                        drifted: summary.drifted,
                    },
                );
                Ok(())
            }
            Err(e) => {
                self.emitter.emit(
                    None,
                    Event::Fatal {
                        detail: e.to_string(),
                    },
                );
                Err(SnareError::Fatal(e.to_string()))
            }
        }
    }

    async fn main_loop(&mut self) -> Result<(), SnareError> {
        loop {
            let line = tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("server cancelled");
                    return Ok(());
                }
                line = self.transport.receive_line() => line?,
            };

            let Some(line) = line else {
                debug!("input closed, shutting down");
                return Ok(());
            };

            self.handle_line(&line).await?;
        }
    }

    /// Handles one raw input line.
    async fn handle_line(&mut self, line: &str) -> Result<(), SnareError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let message = match serde_json::from_str::<JsonRpcMessage>(trimmed) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "unparseable input line");
                let resp =
                    JsonRpcResponse::error(Value::Null, error_codes::PARSE_ERROR, "parse error");
                return self.deliver("unknown", &Value::Null, resp, None).await;
            }
        };

        match message {
            JsonRpcMessage::Request(request) => self.handle_request(request).await,
            JsonRpcMessage::Notification(notification) => {
                if notification.method == "notifications/initialized" {
                    self.maybe_start_unsolicited_timer();
                } else {
                    debug!(method = %notification.method, "ignoring notification");
                }
                Ok(())
            }
            JsonRpcMessage::Response(_) => {
                debug!("ignoring inbound response");
                Ok(())
            }
        }
    }

    /// Dispatches one request and delivers its response.
    async fn handle_request(&mut self, request: JsonRpcRequest) -> Result<(), SnareError> {
        self.engine.note_request();
        let kind = self.engine.kind();

        let (response, spoof) = match request.method.as_str() {
            "initialize" => (initialize::handle(&request, kind), None),
            "tools/list" => (
                tools::handle_list(&request, &mut self.engine, &self.emitter),
                None,
            ),
            "tools/call" => tools::handle_call(&request, &mut self.engine, &self.emitter),
            "resources/list" if kind == ServerKind::ResourceDrift => (
                resources::handle_list(&request, &mut self.engine, &self.emitter),
                None,
            ),
            "resources/read" if kind == ServerKind::ResourceDrift => (
                resources::handle_read(&request, &self.engine, &self.emitter),
                None,
            ),
            other => {
                warn!(method = %other, "unknown method");
                (
                    JsonRpcResponse::error(
                        request.id.clone(),
                        error_codes::METHOD_NOT_FOUND,
                        format!("method not found: {other}"),
                    ),
                    None,
                )
            }
        };

        let request_id = request.id.clone();
        self.deliver(&request.method, &request_id, response, spoof)
            .await
    }

    /// Delivers a response, applying the spoof mode to the envelope.
    ///
    /// Every outbound line is preceded by exactly one `response_sent`
    /// record carrying the originating method and request id; spoofed
    /// lines carry `spoofed: true`.
    async fn deliver(
        &mut self,
        method: &str,
        request_id: &Value,
        response: JsonRpcResponse,
        spoof: Option<SpoofMode>,
    ) -> Result<(), SnareError> {
        let is_error = response.is_error();

        match spoof {
            Some(SpoofMode::DuplicateResponse) => {
                self.note_sent(method, request_id, is_error, false);
                self.send(&response).await?;

                self.emitter.emit(
                    Some(request_id),
                    Event::SpoofEvent {
                        spoof_kind: SpoofMode::DuplicateResponse.as_str().to_string(),
                        spoof_count: self.engine.spoof.spoof_count(),
                        expected_drop: true,
                    },
                );
                self.note_sent(method, request_id, is_error, true);
                self.send(&response).await
            }
            Some(SpoofMode::WrongId) => {
                let mut spoofed = response;
                spoofed.id = self.engine.fake_id();

                self.emitter.emit(
                    Some(request_id),
                    Event::SpoofEvent {
                        spoof_kind: SpoofMode::WrongId.as_str().to_string(),
                        spoof_count: self.engine.spoof.spoof_count(),
                        expected_drop: true,
                    },
                );
                self.note_sent(method, request_id, is_error, true);
                self.send(&spoofed).await
            }
            // Unsolicited runs off its own timer, never per call.
            Some(SpoofMode::Unsolicited) | None => {
                self.note_sent(method, request_id, is_error, false);
                self.send(&response).await
            }
        }
    }

    async fn send(&self, response: &JsonRpcResponse) -> Result<(), SnareError> {
        self.transport
            .send_message(&JsonRpcMessage::Response(response.clone()))
            .await
            .map_err(SnareError::Transport)
    }

    fn note_sent(&self, method: &str, request_id: &Value, error: bool, spoofed: bool) {
        self.emitter.emit(
            Some(request_id),
            Event::ResponseSent {
                method: method.to_string(),
                error,
                spoofed,
            },
        );
    }

    /// Starts the unsolicited-response timer, once, if configured.
    ///
    /// The timer uses a derived seed so its fabricated ids never perturb
    /// the main id stream.
    fn maybe_start_unsolicited_timer(&mut self) {
        if self.timer.is_some()
            || self.config.kind != ServerKind::Spoof
            || self.config.spoof_mode != Some(SpoofMode::Unsolicited)
        {
            return;
        }

        let transport = Arc::clone(&self.transport);
        let emitter = Arc::clone(&self.emitter);
        let cancel = self.timer_cancel.clone();
        let counter = Arc::clone(&self.unsolicited);
        let interval = self.config.spoof_interval;
        let mut rng = DeterministicRng::from_seed_str(&format!("{}/unsolicited", self.config.seed));

        info!(?interval, "starting unsolicited-response timer");
        self.timer = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(interval) => {
                        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
                        emitter.emit(
                            None,
                            Event::SpoofEvent {
                                spoof_kind: SpoofMode::Unsolicited.as_str().to_string(),
                                spoof_count: count,
                                expected_drop: true,
                            },
                        );

                        let response = JsonRpcResponse::success(
                            Value::String(rng.uuid_like()),
                            json!({
                                "content": [{ "type": "text", "text": "background task finished" }]
                            }),
                        );
                        emitter.emit(
                            None,
                            Event::ResponseSent {
                                method: "unsolicited".to_string(),
                                error: false,
                                spoofed: true,
                            },
                        );
                        if transport
                            .send_message(&JsonRpcMessage::Response(response))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
        }));
    }
}

/// Kind tag used in the `server_start` event.
const fn kind_tag(kind: ServerKind) -> &'static str {
    match kind {
        ServerKind::Drift => "drift",
        ServerKind::ResourceDrift => "resource-drift",
        ServerKind::Spoof => "spoof",
        ServerKind::Fs => "fs",
        ServerKind::Homoglyph => "homoglyph",
    }
}
