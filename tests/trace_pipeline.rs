//! Library-level end-to-end scenarios for the tracing subsystem.

use axum::http::{HeaderMap, HeaderValue};

use inference_gateway::config::{TraceConfig, TransportKind};
use inference_gateway::trace::{Emitter, IdGenerator, Tracer, TRACE_HEADER};

mod common;

const ROOT_HEADER: &str = "Root=1-5f43a1b2-aaaaaaaaaaaaaaaaaaaaaaaa";
const TRACE_ID: &str = "1-5f43a1b2-aaaaaaaaaaaaaaaaaaaaaaaa";

async fn capture_tracer() -> (Tracer, tokio::sync::mpsc::UnboundedReceiver<inference_gateway::trace::Segment>) {
    let (daemon, rx) = common::start_trace_capture().await;
    let emitter = Emitter::udp(daemon).await.unwrap();
    let tracer = Tracer::new(emitter, IdGenerator::deterministic(), "inference-gateway");
    (tracer, rx)
}

fn traced_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TRACE_HEADER, HeaderValue::from_static(ROOT_HEADER));
    headers
}

#[tokio::test]
async fn two_step_success_emits_two_subsegments_then_root() {
    let (tracer, mut rx) = capture_tracer().await;
    let ctx = tracer.extract_context(&traced_headers());
    assert!(ctx.enabled());

    let a: Result<&str, String> = tracer.trace(&ctx, "step-a", None, || async { Ok("a") }).await;
    assert_eq!(a.unwrap(), "a");
    let b: Result<&str, String> = tracer.trace(&ctx, "step-b", None, || async { Ok("b") }).await;
    assert_eq!(b.unwrap(), "b");
    tracer.finalize(&ctx, true, None).await;

    let first = common::recv_segment(&mut rx).await;
    let second = common::recv_segment(&mut rx).await;
    let root = common::recv_segment(&mut rx).await;

    assert_eq!(first.name, "step-a");
    assert_eq!(second.name, "step-b");
    for segment in [&first, &second] {
        assert!(segment.is_subsegment());
        assert_eq!(segment.trace_id.as_str(), TRACE_ID);
        assert_eq!(segment.parent_id.as_ref(), Some(ctx.root_segment_id()));
        assert_eq!(segment.annotations["success"], true);
    }

    // Root arrives after both subsegments.
    assert!(root.parent_id.is_none());
    assert!(!root.is_subsegment());
    assert_eq!(&root.id, ctx.root_segment_id());
    assert_eq!(root.trace_id.as_str(), TRACE_ID);
    assert_eq!(root.annotations["success"], true);

    common::assert_no_segments(&mut rx).await;
}

#[tokio::test]
async fn failure_in_first_step_skips_second_and_resignals() {
    let (tracer, mut rx) = capture_tracer().await;
    let ctx = tracer.extract_context(&traced_headers());

    let outcome: Result<(), String> = async {
        tracer
            .trace(&ctx, "step-a", None, || async {
                Err::<(), String>("Missing required field".to_string())
            })
            .await?;
        tracer.trace(&ctx, "step-b", None, || async { Ok(()) }).await
    }
    .await;
    let error = outcome.unwrap_err();
    assert_eq!(error, "Missing required field");
    tracer.finalize(&ctx, false, Some(&error)).await;

    let step_a = common::recv_segment(&mut rx).await;
    assert_eq!(step_a.name, "step-a");
    assert_eq!(step_a.annotations["success"], false);
    assert_eq!(
        step_a.cause.as_ref().unwrap().exceptions[0].message,
        "Missing required field"
    );

    let root = common::recv_segment(&mut rx).await;
    assert!(root.parent_id.is_none());
    assert_eq!(root.annotations["success"], false);

    // step-b never ran, so exactly two segments were emitted.
    common::assert_no_segments(&mut rx).await;
}

#[tokio::test]
async fn absent_carrier_emits_nothing_and_passes_results_through() {
    let (tracer, mut rx) = capture_tracer().await;
    let ctx = tracer.extract_context(&HeaderMap::new());
    assert!(!ctx.enabled());

    let a: Result<u32, String> = tracer.trace(&ctx, "step-a", None, || async { Ok(7) }).await;
    assert_eq!(a.unwrap(), 7);
    let b: Result<u32, String> = tracer
        .trace(&ctx, "step-b", None, || async { Err("boom".to_string()) })
        .await;
    assert_eq!(b.unwrap_err(), "boom");
    tracer.finalize(&ctx, true, None).await;

    common::assert_no_segments(&mut rx).await;
}

#[tokio::test]
async fn http_proxy_transport_delivers_segments() {
    let (daemon, mut rx) = common::start_http_trace_capture().await;
    let config = TraceConfig {
        transport: TransportKind::HttpProxy,
        http_endpoint: format!("http://{daemon}"),
        id_strategy: inference_gateway::trace::IdStrategy::Deterministic,
        ..TraceConfig::default()
    };
    let tracer = Tracer::from_config(&config).await.unwrap();
    let ctx = tracer.extract_context(&traced_headers());

    let result: Result<(), String> = tracer.trace(&ctx, "step-a", None, || async { Ok(()) }).await;
    result.unwrap();
    tracer.finalize(&ctx, true, None).await;

    let subsegment = common::recv_segment(&mut rx).await;
    assert_eq!(subsegment.name, "step-a");
    assert!(subsegment.is_subsegment());
    let root = common::recv_segment(&mut rx).await;
    assert_eq!(&root.id, ctx.root_segment_id());
}
