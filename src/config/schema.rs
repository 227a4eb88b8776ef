//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

use crate::trace::id::IdStrategy;

/// Root configuration for the inference gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inference engine settings.
    pub inference: InferenceConfig,

    /// Request-tracing settings.
    pub trace: TraceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Inference engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Model label reported in completions and trace annotations.
    pub model_name: String,

    /// Maximum accepted input length in characters.
    pub max_input_chars: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_name: "echo-1".to_string(),
            max_input_chars: 8_192,
        }
    }
}

/// Transport used to deliver segments to the local trace daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Single best-effort UDP datagram per segment.
    #[default]
    Udp,
    /// POST to the daemon's local HTTP proxy endpoint.
    HttpProxy,
}

/// Request-tracing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Master switch; when false every request gets a disabled context.
    pub enabled: bool,

    /// Transport used to reach the trace daemon.
    pub transport: TransportKind,

    /// Daemon datagram address (UDP transport).
    pub daemon_address: String,

    /// Daemon proxy base URL (HTTP transport).
    pub http_endpoint: String,

    /// Identifier generation strategy.
    pub id_strategy: IdStrategy,

    /// Service name recorded on the root segment and in annotations.
    pub service_name: String,

    /// Optional job tag added to every segment's annotations.
    pub job: Option<String>,

    /// Emission timeout in milliseconds. A stalled daemon must never
    /// block request handling.
    pub timeout_ms: u64,

    /// Log dropped segments as warnings; failures are counted in
    /// metrics either way.
    pub log_failures: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            transport: TransportKind::Udp,
            daemon_address: "127.0.0.1:2000".to_string(),
            http_endpoint: "http://127.0.0.1:2000".to_string(),
            id_strategy: IdStrategy::Random,
            service_name: "inference-gateway".to_string(),
            job: None,
            timeout_ms: 1_000,
            log_failures: true,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset.
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable lines.
    pub log_json: bool,

    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter listen address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "inference_gateway=debug,tower_http=debug".to_string(),
            log_json: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_daemon() {
        let config = GatewayConfig::default();
        assert_eq!(config.trace.daemon_address, "127.0.0.1:2000");
        assert_eq!(config.trace.transport, TransportKind::Udp);
        assert_eq!(config.trace.timeout_ms, 1_000);
        assert!(config.trace.enabled);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.inference.model_name, "echo-1");
    }

    #[test]
    fn listener_section_parses() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn trace_section_parses() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [trace]
            transport = "http_proxy"
            http_endpoint = "http://127.0.0.1:2000"
            id_strategy = "deterministic"
            log_failures = false
            "#,
        )
        .unwrap();
        assert_eq!(config.trace.transport, TransportKind::HttpProxy);
        assert_eq!(config.trace.id_strategy, IdStrategy::Deterministic);
        assert!(!config.trace.log_failures);
    }
}
