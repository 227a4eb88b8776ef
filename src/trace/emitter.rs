//! Best-effort delivery of segments to the local trace daemon.
//!
//! # Responsibilities
//! - Serialize segments to the daemon wire protocol
//! - Deliver over UDP datagram or the daemon's HTTP proxy endpoint
//! - Swallow every transport failure at this boundary
//!
//! # Design Decisions
//! - `emit` never returns an error and never blocks past the configured
//!   timeout; a stalled or absent daemon cannot stall request handling
//! - No retries; a failed emission is dropped, counted, and (optionally)
//!   logged as a warning

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::UdpSocket;

use crate::config::schema::{TraceConfig, TransportKind};
use crate::observability::metrics;
use crate::trace::segment::Segment;

/// Fixed first line of every datagram payload.
pub const DAEMON_PROTOCOL_HEADER: &str = r#"{"format":"json","version":1}"#;

/// Path of the daemon's HTTP proxy ingestion endpoint.
pub const TRACE_SEGMENTS_PATH: &str = "/TraceSegments";

/// Errors produced while constructing an [`Emitter`].
#[derive(Debug, Error)]
pub enum EmitterSetupError {
    #[error("invalid daemon address {addr}: {source}")]
    Address {
        addr: String,
        source: std::net::AddrParseError,
    },
    #[error("failed to bind datagram socket: {0}")]
    Bind(#[from] std::io::Error),
    #[error("failed to build daemon proxy client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Internal transport failure; never escapes [`Emitter::emit`].
#[derive(Debug, Error)]
enum EmitError {
    #[error("failed to serialize segment: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("datagram send failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("send timed out")]
    Timeout,
    #[error("daemon proxy request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("daemon proxy returned status {0}")]
    Status(reqwest::StatusCode),
}

enum Transport {
    Udp {
        socket: UdpSocket,
        daemon: SocketAddr,
    },
    HttpProxy {
        client: reqwest::Client,
        endpoint: String,
    },
}

impl Transport {
    fn label(&self) -> &'static str {
        match self {
            Transport::Udp { .. } => "udp",
            Transport::HttpProxy { .. } => "http_proxy",
        }
    }
}

/// Fire-and-forget segment sender.
pub struct Emitter {
    transport: Transport,
    timeout: Duration,
    log_failures: bool,
}

impl Emitter {
    /// Build an emitter from the trace configuration.
    pub async fn from_config(config: &TraceConfig) -> Result<Self, EmitterSetupError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let transport = match config.transport {
            TransportKind::Udp => {
                let daemon: SocketAddr = config.daemon_address.parse().map_err(|source| {
                    EmitterSetupError::Address {
                        addr: config.daemon_address.clone(),
                        source,
                    }
                })?;
                Transport::Udp {
                    socket: UdpSocket::bind("0.0.0.0:0").await?,
                    daemon,
                }
            }
            TransportKind::HttpProxy => Transport::HttpProxy {
                client: reqwest::Client::builder().timeout(timeout).build()?,
                endpoint: config.http_endpoint.trim_end_matches('/').to_string(),
            },
        };
        Ok(Self {
            transport,
            timeout,
            log_failures: config.log_failures,
        })
    }

    /// Convenience constructor for a datagram emitter with defaults.
    pub async fn udp(daemon: SocketAddr) -> Result<Self, EmitterSetupError> {
        let config = TraceConfig {
            daemon_address: daemon.to_string(),
            ..TraceConfig::default()
        };
        Self::from_config(&config).await
    }

    /// Deliver one segment, best effort.
    ///
    /// This is the sole catch-log-discard boundary for transport
    /// failures: nothing here ever reaches the caller.
    pub async fn emit(&self, segment: &Segment) {
        match self.send(segment).await {
            Ok(()) => {
                let kind = if segment.is_subsegment() {
                    "subsegment"
                } else {
                    "segment"
                };
                metrics::record_segment_emitted(kind);
                tracing::debug!(
                    name = %segment.name,
                    id = %segment.id,
                    trace_id = %segment.trace_id,
                    "Emitted trace segment"
                );
            }
            Err(e) => {
                metrics::record_emit_failure(self.transport.label());
                if self.log_failures {
                    tracing::warn!(
                        name = %segment.name,
                        trace_id = %segment.trace_id,
                        error = %e,
                        "Dropping trace segment"
                    );
                }
            }
        }
    }

    async fn send(&self, segment: &Segment) -> Result<(), EmitError> {
        let document = serde_json::to_string(segment)?;
        match &self.transport {
            Transport::Udp { socket, daemon } => {
                let payload = format!("{DAEMON_PROTOCOL_HEADER}\n{document}");
                match tokio::time::timeout(self.timeout, socket.send_to(payload.as_bytes(), daemon))
                    .await
                {
                    Ok(result) => {
                        result?;
                        Ok(())
                    }
                    Err(_) => Err(EmitError::Timeout),
                }
            }
            Transport::HttpProxy { client, endpoint } => {
                let envelope = serde_json::json!({ "TraceSegmentDocuments": [document] });
                let response = client
                    .post(format!("{endpoint}{TRACE_SEGMENTS_PATH}"))
                    .json(&envelope)
                    .send()
                    .await?;
                if !response.status().is_success() {
                    return Err(EmitError::Status(response.status()));
                }
                Ok(())
            }
        }
    }
}
