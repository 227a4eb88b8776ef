//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check transport settings match the selected transport
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{GatewayConfig, TransportKind};

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidDaemonAddress(String),
    InvalidMetricsAddress(String),
    InvalidHttpEndpoint(String),
    ZeroRequestTimeout,
    ZeroEmitTimeout,
    EmptyServiceName,
    ZeroMaxInputChars,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address is not a socket address: {addr}")
            }
            ValidationError::InvalidDaemonAddress(addr) => {
                write!(f, "trace.daemon_address is not a socket address: {addr}")
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address is not a socket address: {addr}")
            }
            ValidationError::InvalidHttpEndpoint(url) => {
                write!(f, "trace.http_endpoint must be an http(s) URL: {url}")
            }
            ValidationError::ZeroRequestTimeout => {
                write!(f, "timeouts.request_secs must be greater than zero")
            }
            ValidationError::ZeroEmitTimeout => {
                write!(f, "trace.timeout_ms must be greater than zero")
            }
            ValidationError::EmptyServiceName => {
                write!(f, "trace.service_name must not be empty")
            }
            ValidationError::ZeroMaxInputChars => {
                write!(f, "inference.max_input_chars must be greater than zero")
            }
        }
    }
}

/// Run all semantic checks, collecting every failure.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.inference.max_input_chars == 0 {
        errors.push(ValidationError::ZeroMaxInputChars);
    }

    if config.trace.timeout_ms == 0 {
        errors.push(ValidationError::ZeroEmitTimeout);
    }

    if config.trace.service_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    match config.trace.transport {
        TransportKind::Udp => {
            if config.trace.daemon_address.parse::<SocketAddr>().is_err() {
                errors.push(ValidationError::InvalidDaemonAddress(
                    config.trace.daemon_address.clone(),
                ));
            }
        }
        TransportKind::HttpProxy => {
            if !config.trace.http_endpoint.starts_with("http://")
                && !config.trace.http_endpoint.starts_with("https://")
            {
                errors.push(ValidationError::InvalidHttpEndpoint(
                    config.trace.http_endpoint.clone(),
                ));
            }
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
