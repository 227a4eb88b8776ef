//! Inference engine subsystem.
//!
//! The engine is the seam where a real model server would be called;
//! the gateway treats it as an arbitrary unit of work that may succeed,
//! return a value, or fail. Its failures are the traced failures the
//! tracing subsystem observes and re-signals.

pub mod engine;

pub use engine::{Completion, InferenceEngine, InferenceError, InvokeRequest, Prompt};
