//! Tests for the HTTP sink against a one-shot HTTP responder.

use chrono::{TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use volley_protocol::{EndReason, MatchSummary, MatchType, Score, SessionId, Slot};
use volley_report::{HttpResultSink, NoopResultSink, ReportError, ResultSink};

// =========================================================================
// Helpers
// =========================================================================

fn summary() -> MatchSummary {
    MatchSummary {
        session_id: SessionId(4),
        players: ["alice".into(), "bob".into()],
        score: Score::new(0, 5),
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        match_type: MatchType::Ranked,
        reason: EndReason::Timeout,
        winner: Slot::Two,
    }
}

/// Accepts one request, answers with `status_line`, and hands back the raw
/// request text.
async fn respond_once(status_line: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/matches", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        // Read until the whole body announced by Content-Length is in.
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(split) = text.find("\r\n\r\n") {
                let length = text[..split]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= split + 4 + length {
                    break;
                }
            }
        }
        let response = format!("{status_line}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf).into_owned()
    });

    (url, server)
}

// =========================================================================
// HttpResultSink
// =========================================================================

#[tokio::test]
async fn test_report_posts_summary_as_json() {
    let (url, server) = respond_once("HTTP/1.1 201 Created").await;
    let sink = HttpResultSink::new(url).unwrap();

    sink.report(&summary()).await.expect("201 is success");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /matches HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["sessionId"], 4);
    assert_eq!(json["players"][1], "bob");
    assert_eq!(json["reason"], "timeout");
    assert_eq!(json["matchType"], "ranked");
    assert_eq!(json["score"]["slot2"], 5);
}

#[tokio::test]
async fn test_report_non_success_status_is_error() {
    let (url, server) = respond_once("HTTP/1.1 503 Service Unavailable").await;
    let sink = HttpResultSink::new(url).unwrap();

    let result = sink.report(&summary()).await;

    match result {
        Err(ReportError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "ok");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_report_unreachable_service_is_http_error() {
    // Bind then drop to get a port nobody is listening on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let sink = HttpResultSink::new(format!("http://{addr}/matches")).unwrap();

    let result = sink.report(&summary()).await;

    assert!(matches!(result, Err(ReportError::Http(_))));
}

// =========================================================================
// NoopResultSink
// =========================================================================

#[tokio::test]
async fn test_noop_sink_always_succeeds() {
    assert!(NoopResultSink.report(&summary()).await.is_ok());
}
