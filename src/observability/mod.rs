//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! The request-tracing subsystem itself lives in crate::trace; this
//! module covers the gateway's own logs and metrics.
//! ```
//!
//! # Design Decisions
//! - Structured logging via the tracing facade, JSON selectable by config
//! - Metrics are cheap (atomic increments behind the metrics facade)
//! - Trace emission failures are visible here even when log_failures is off

pub mod logging;
pub mod metrics;
