//! Traced-operation wrapper and root segment finalizer.
//!
//! # Responsibilities
//! - Run units of work, measure wall-clock duration, emit subsegments
//! - Re-signal work failures unchanged after recording them
//! - Emit the root segment once a request's work is complete
//!
//! # Design Decisions
//! - Context is an explicit argument everywhere; there is no ambient
//!   "current context" lookup, so concurrent requests cannot interfere
//! - A disabled context makes every call a pure passthrough

use std::future::Future;

use axum::http::HeaderMap;

use crate::config::schema::TraceConfig;
use crate::trace::context::TraceContext;
use crate::trace::emitter::{Emitter, EmitterSetupError};
use crate::trace::id::{EntityId, IdGenerator};
use crate::trace::segment::Segment;
use crate::trace::unix_seconds_now;

/// Exception `type` recorded for failed traced work.
const WORK_ERROR_KIND: &str = "InferenceError";

/// The public tracing API surface used by business logic.
///
/// Owns the emitter and the identifier generator; safe to share across
/// concurrent requests behind an `Arc`.
pub struct Tracer {
    emitter: Emitter,
    ids: IdGenerator,
    enabled: bool,
    service: String,
    job: Option<String>,
}

impl Tracer {
    /// Build a tracer from the trace configuration.
    pub async fn from_config(config: &TraceConfig) -> Result<Self, EmitterSetupError> {
        Ok(Self {
            emitter: Emitter::from_config(config).await?,
            ids: IdGenerator::new(config.id_strategy),
            enabled: config.enabled,
            service: config.service_name.clone(),
            job: config.job.clone(),
        })
    }

    /// Build a tracer from already-constructed parts.
    pub fn new(emitter: Emitter, ids: IdGenerator, service: impl Into<String>) -> Self {
        Self {
            emitter,
            ids,
            enabled: true,
            service: service.into(),
            job: None,
        }
    }

    /// Tag every emitted segment with a job annotation.
    pub fn with_job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Recover a per-request context from inbound headers.
    ///
    /// When tracing is disabled by configuration the carriers are not
    /// even consulted.
    pub fn extract_context(&self, headers: &HeaderMap) -> TraceContext {
        if !self.enabled {
            return TraceContext::disabled(&self.ids);
        }
        TraceContext::from_headers(headers, &self.ids)
    }

    /// Run `work`, emit a subsegment describing it, and pass its result
    /// through unchanged.
    ///
    /// `parent` defaults to the context's root segment id. With a
    /// disabled context this is a zero-overhead passthrough.
    pub async fn trace<F, Fut, T, E>(
        &self,
        ctx: &TraceContext,
        name: &str,
        parent: Option<EntityId>,
        work: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.trace_with_id(ctx, name, parent, work).await.0
    }

    /// Like [`trace`](Self::trace), additionally returning the emitted
    /// subsegment's id so callers can nest further subsegments under it.
    ///
    /// The id is `None` when the context is disabled.
    pub async fn trace_with_id<F, Fut, T, E>(
        &self,
        ctx: &TraceContext,
        name: &str,
        parent: Option<EntityId>,
        work: F,
    ) -> (Result<T, E>, Option<EntityId>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let Some(trace_id) = ctx.trace_id().filter(|_| ctx.enabled()) else {
            return (work().await, None);
        };

        let start = unix_seconds_now();
        let result = work().await;
        // Wall clock is not monotonic; a subsegment must never have
        // negative duration.
        let end = unix_seconds_now().max(start);

        let id = self.ids.new_entity_id();
        let parent_id = parent.unwrap_or_else(|| ctx.root_segment_id().clone());
        let mut segment = Segment::subsegment(
            name,
            id.clone(),
            trace_id.clone(),
            parent_id,
            start,
            end,
        )
        .annotate("duration_ms", (end - start) * 1000.0)
        .annotate("service", self.service.as_str())
        .annotate("success", result.is_ok());
        if let Some(job) = &self.job {
            segment = segment.annotate("job", job.as_str());
        }
        if let Err(e) = &result {
            segment = segment.with_error(&e.to_string(), WORK_ERROR_KIND);
        }

        self.emitter.emit(&segment).await;
        (result, Some(id))
    }

    /// Emit the root segment summarizing the whole request.
    ///
    /// Must be called exactly once per request, after every subsegment
    /// for the request has been emitted. No-op for a disabled context.
    pub async fn finalize(&self, ctx: &TraceContext, success: bool, error_message: Option<&str>) {
        let Some(trace_id) = ctx.trace_id().filter(|_| ctx.enabled()) else {
            return;
        };

        let start = ctx.start_time();
        let end = unix_seconds_now().max(start);
        let mut segment = Segment::root(
            self.service.clone(),
            ctx.root_segment_id().clone(),
            trace_id.clone(),
            start,
            end,
        )
        .annotate("duration_ms", (end - start) * 1000.0)
        .annotate("success", success);
        if let Some(job) = &self.job {
            segment = segment.annotate("job", job.as_str());
        }
        if let Some(message) = error_message {
            segment = segment.with_error(message, WORK_ERROR_KIND);
        }

        self.emitter.emit(&segment).await;
    }
}
