//! Replay a captured transport script through the socket tap.
//!
//! Reads one directive per line from stdin and prints every published event
//! as a JSON line. Directives:
//!
//! ```text
//! send 42["chat",{"msg":"hi"}]     outbound frame on the current socket
//! recv 42["update",{"hp":9}]      inbound frame on the current socket
//! poll 9:42["a",1]9:42["b",2]     polling-fallback response body
//! close                            close the current socket instance
//! ```
//!
//! Run with: cargo run -p tap-replay < capture.txt

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use socket_tap_core::{ConnectionId, RawPayload};
use socket_tap_intercept::{TransportError, TransportObserver, TransportSource, install};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Drives the observer from a line-oriented script on stdin.
///
/// A new connection id is minted lazily on the first `send`/`recv` after a
/// `close`, mirroring how a reconnecting page creates a fresh socket.
struct ScriptSource {
    current: Option<ConnectionId>,
}

impl ScriptSource {
    const fn new() -> Self {
        Self { current: None }
    }

    fn connection(&mut self) -> ConnectionId {
        *self.current.get_or_insert_with(Uuid::new_v4)
    }
}

#[async_trait]
impl TransportSource for ScriptSource {
    async fn pump(&mut self, observer: Arc<dyn TransportObserver>) -> Result<(), TransportError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim_end();
            match line.split_once(' ') {
                Some(("send", frame)) => {
                    observer.on_send(self.connection(), RawPayload::from(frame));
                }
                Some(("recv", frame)) => {
                    observer.on_receive(self.connection(), RawPayload::from(frame));
                }
                Some(("poll", body)) => observer.on_poll_response(body),
                _ if line == "close" => {
                    if let Some(conn) = self.current.take() {
                        observer.on_close(conn);
                    }
                }
                _ if line.is_empty() || line.starts_with('#') => {}
                _ => tracing::warn!(line, "unrecognized directive"),
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let tap = install();
    if std::env::args().any(|a| a == "--trace-frames") {
        tap.set_debug_mode(true, true);
    }

    // Print every published event before pumping starts.
    let mut events = tap.bus().events();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match serde_json::to_string(&event) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("failed to serialize event: {e}"),
            }
        }
    });

    let mut source = ScriptSource::new();
    source.pump(tap.observer()).await?;

    // Let the printer drain what the pump published.
    tokio::task::yield_now().await;
    printer.abort();
    Ok(())
}
