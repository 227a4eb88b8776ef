//! Shared utilities for integration testing.
//!
//! Stands up capture collectors that play the role of the trace daemon:
//! a UDP socket for the datagram transport and a tiny axum app for the
//! HTTP proxy transport, both feeding parsed segments into a channel.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::mpsc;

use inference_gateway::trace::{Segment, DAEMON_PROTOCOL_HEADER};

/// Start a UDP collector; returns its address and a stream of parsed
/// segments. Every datagram must carry the fixed protocol header line.
pub async fn start_trace_capture() -> (SocketAddr, mpsc::UnboundedReceiver<Segment>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let Ok((len, _)) = socket.recv_from(&mut buf).await else {
                break;
            };
            let payload = String::from_utf8_lossy(&buf[..len]).to_string();
            let Some((header, body)) = payload.split_once('\n') else {
                panic!("datagram without protocol header: {payload:?}");
            };
            assert_eq!(header, DAEMON_PROTOCOL_HEADER);
            let segment: Segment = serde_json::from_str(body).expect("unparseable segment");
            if tx.send(segment).is_err() {
                break;
            }
        }
    });

    (addr, rx)
}

/// Start an HTTP collector accepting `POST /TraceSegments` envelopes.
#[allow(dead_code)]
pub async fn start_http_trace_capture() -> (SocketAddr, mpsc::UnboundedReceiver<Segment>) {
    let (tx, rx) = mpsc::unbounded_channel::<Segment>();

    async fn accept_segments(
        State(tx): State<mpsc::UnboundedSender<Segment>>,
        Json(envelope): Json<serde_json::Value>,
    ) -> StatusCode {
        let documents = envelope["TraceSegmentDocuments"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        for document in documents {
            let raw = document.as_str().expect("document is not a string");
            let segment: Segment = serde_json::from_str(raw).expect("unparseable segment");
            let _ = tx.send(segment);
        }
        StatusCode::OK
    }

    let app = Router::new()
        .route("/TraceSegments", post(accept_segments))
        .with_state(tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, rx)
}

/// Wait for the next captured segment.
pub async fn recv_segment(rx: &mut mpsc::UnboundedReceiver<Segment>) -> Segment {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for segment")
        .expect("capture task ended")
}

/// Assert that no segment arrives within a short grace period.
pub async fn assert_no_segments(rx: &mut mpsc::UnboundedReceiver<Segment>) {
    let received = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
    assert!(received.is_err(), "unexpected segment: {received:?}");
}
