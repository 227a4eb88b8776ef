//! Per-request trace context recovery.
//!
//! # Responsibilities
//! - Recover a trace ID from inbound request headers
//! - Fall back to the composite custom-attributes carrier
//! - Degrade to a disabled context when no usable carrier is present
//!
//! # Design Decisions
//! - The context is immutable after creation and passed explicitly to
//!   every traced operation; there is no ambient "current context"
//! - A present-but-unparseable carrier disables tracing for the request
//!   instead of failing it

use axum::http::HeaderMap;

use crate::trace::id::{EntityId, IdGenerator, TraceId};
use crate::trace::unix_seconds_now;

/// Primary trace carrier header.
pub const TRACE_HEADER: &str = "x-amzn-trace-id";

/// Secondary carrier: a comma-separated custom-attributes string that may
/// embed the primary carrier's key/value pair among other fields.
pub const CUSTOM_ATTRIBUTES_HEADER: &str = "x-amzn-sagemaker-custom-attributes";

const ROOT_FIELD: &str = "Root=";
const EMBEDDED_MARKER: &str = "X-Amzn-Trace-Id=";

/// A request's place in a distributed trace.
///
/// Created once per inbound request, read-only afterwards. The root
/// segment ID is pre-allocated here but not emitted until the request
/// completes and [`Tracer::finalize`](crate::trace::Tracer::finalize) runs.
#[derive(Debug, Clone)]
pub struct TraceContext {
    trace_id: Option<TraceId>,
    root_segment_id: EntityId,
    enabled: bool,
    start_time: f64,
}

impl TraceContext {
    /// Recover a context from inbound request headers.
    ///
    /// Tries the primary carrier first, then the custom-attributes
    /// fallback. Returns a disabled context when neither yields a valid
    /// trace ID.
    pub fn from_headers(headers: &HeaderMap, ids: &IdGenerator) -> Self {
        let raw = headers
            .get(TRACE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| {
                headers
                    .get(CUSTOM_ATTRIBUTES_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(embedded_trace_value)
            });

        match raw.as_deref().and_then(parse_carrier) {
            Some(trace_id) => Self::with_trace_id(trace_id, ids),
            None => Self::disabled(ids),
        }
    }

    /// Build an enabled context for a known trace ID.
    pub fn with_trace_id(trace_id: TraceId, ids: &IdGenerator) -> Self {
        Self {
            trace_id: Some(trace_id),
            root_segment_id: ids.new_entity_id(),
            enabled: true,
            start_time: unix_seconds_now(),
        }
    }

    /// Build a disabled context: tracing is skipped for this request.
    pub fn disabled(ids: &IdGenerator) -> Self {
        Self {
            trace_id: None,
            root_segment_id: ids.new_entity_id(),
            enabled: false,
            start_time: unix_seconds_now(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn root_segment_id(&self) -> &EntityId {
        &self.root_segment_id
    }

    /// Wall-clock context creation time, seconds since epoch.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }
}

/// Parse a raw carrier value: `Root=<id>[;...]` or a bare trace ID.
fn parse_carrier(raw: &str) -> Option<TraceId> {
    if let Some(pos) = raw.find(ROOT_FIELD) {
        let rest = &raw[pos + ROOT_FIELD.len()..];
        let value = rest.split(';').next().unwrap_or(rest);
        return TraceId::parse(value.trim());
    }
    TraceId::parse(raw.trim())
}

/// Extract the embedded primary-carrier value from a comma-separated
/// custom-attributes string, stripping surrounding whitespace and any
/// trailing fields.
fn embedded_trace_value(attrs: &str) -> Option<String> {
    let (_, rest) = attrs.split_once(EMBEDDED_MARKER)?;
    let value = rest.split(',').next().unwrap_or(rest).trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}
