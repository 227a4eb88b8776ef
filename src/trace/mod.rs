//! Request-tracing subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request headers
//!     → context.rs (recover or fabricate a TraceContext)
//!     → tracer.rs (run work units, build subsegments)
//!     → segment.rs (wire model)
//!     → emitter.rs (best-effort delivery to the local daemon)
//!
//! request complete
//!     → tracer.rs finalize (root segment, after all subsegments)
//! ```
//!
//! # Design Decisions
//! - Context is passed explicitly; no thread-local or global lookup
//! - Tracing is fully optional per request: missing headers or an
//!   unreachable daemon never change a request's functional outcome
//! - The emitter is the single catch-log-discard boundary for
//!   transport failures

pub mod context;
pub mod emitter;
pub mod id;
pub mod segment;
pub mod tracer;

pub use context::{TraceContext, CUSTOM_ATTRIBUTES_HEADER, TRACE_HEADER};
pub use emitter::{Emitter, EmitterSetupError, DAEMON_PROTOCOL_HEADER};
pub use id::{EntityId, IdGenerator, IdStrategy, TraceId};
pub use segment::Segment;
pub use tracer::Tracer;

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock time as fractional seconds since the epoch.
pub(crate) fn unix_seconds_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
