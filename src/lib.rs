//! Inference gateway with a request-tracing core.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │               INFERENCE GATEWAY                 │
//!                    │                                                 │
//!   Client Request   │  ┌─────────┐   ┌───────────┐   ┌───────────┐   │
//!   ─────────────────┼─▶│  http   │──▶│   trace   │──▶│ inference │   │
//!                    │  │ server  │   │  context  │   │  engine   │   │
//!                    │  └─────────┘   └─────┬─────┘   └─────┬─────┘   │
//!                    │                      │   subsegments │         │
//!                    │                      ▼               ▼         │
//!                    │                ┌──────────────────────────┐    │
//!   Trace Daemon     │                │     trace emitter        │    │
//!   ◀────────────────┼────────────────│  (UDP / HTTP proxy,      │    │
//!   (127.0.0.1:2000) │                │   best effort, bounded)  │    │
//!                    │                └──────────────────────────┘    │
//!                    │                                                 │
//!                    │  ┌───────────────────────────────────────────┐ │
//!                    │  │          Cross-Cutting Concerns            │ │
//!                    │  │  config │ observability │ lifecycle        │ │
//!                    │  └───────────────────────────────────────────┘ │
//!                    └────────────────────────────────────────────────┘
//! ```
//!
//! Tracing is fully optional per request: its total or partial
//! unavailability never changes the functional outcome of a request,
//! only the presence of observability data.

pub mod config;
pub mod http;
pub mod inference;
pub mod lifecycle;
pub mod observability;
pub mod trace;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use trace::{TraceContext, Tracer};
