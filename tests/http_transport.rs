#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::time::Duration;
use sysmetrics::aggregate::{Aggregate, CPU_PERCENT, MEM_USED_PERCENT};
use sysmetrics::transport::{HttpTransport, Transport, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// A request as seen by the fake collector
struct Captured {
    head: String,
    body: Vec<u8>,
}

async fn read_request(stream: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        let n = stream.read(&mut chunk).await.expect("read request");
        assert!(n > 0, "connection closed before headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length: usize = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await.expect("read body");
        assert!(n > 0, "connection closed before body");
        buf.extend_from_slice(&chunk[..n]);
    }

    Captured {
        head,
        body: buf[head_end..head_end + content_length].to_vec(),
    }
}

/// Accept one request, answer with `status`, and hand the request back
async fn one_shot_collector(status: &'static str) -> (String, oneshot::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut stream).await;
        let response =
            format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
        let _ = tx.send(captured);
    });

    (format!("http://{addr}/metric"), rx)
}

fn sample_window() -> Aggregate {
    let mut agg = Aggregate::new();
    for v in [60.0, 70.0, 65.0] {
        agg.add(CPU_PERCENT, v);
    }
    agg.add(MEM_USED_PERCENT, 42.0);
    agg
}

#[tokio::test]
async fn posts_json_window_to_metric_path() {
    let (endpoint, captured) = one_shot_collector("200 OK").await;
    let transport = HttpTransport::new(endpoint.clone(), Duration::from_secs(5)).unwrap();
    assert_eq!(transport.target(), endpoint);

    transport.deliver(sample_window()).await.expect("delivery");

    let request = captured.await.unwrap();
    assert!(request.head.starts_with("POST /metric HTTP/1.1\r\n"));
    assert!(request
        .head
        .to_ascii_lowercase()
        .contains("content-type: application/json"));

    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "system.cpu.percent": { "count": 3, "value": 195.0 },
            "system.mem.used_percent": { "count": 1, "value": 42.0 },
        })
    );
}

#[tokio::test]
async fn any_2xx_is_success() {
    let (endpoint, _captured) = one_shot_collector("202 Accepted").await;
    let transport = HttpTransport::new(endpoint, Duration::from_secs(5)).unwrap();

    assert!(transport.deliver(sample_window()).await.is_ok());
}

#[tokio::test]
async fn non_2xx_is_reported() {
    let (endpoint, _captured) = one_shot_collector("500 Internal Server Error").await;
    let transport = HttpTransport::new(endpoint, Duration::from_secs(5)).unwrap();

    let err = transport.deliver(sample_window()).await.unwrap_err();
    assert!(matches!(err, TransportError::Status(s) if s.as_u16() == 500));
}

#[tokio::test]
async fn unreachable_collector_is_a_request_error() {
    // grab a free port, then close it again
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport =
        HttpTransport::new(format!("http://{addr}/metric"), Duration::from_secs(5)).unwrap();
    let err = transport.deliver(sample_window()).await.unwrap_err();
    assert!(matches!(err, TransportError::Request(_)));

    // the log line must name the OS-level cause, not just the URL
    let rendered = err.cause_chain();
    assert!(rendered.starts_with("request failed: "), "{rendered}");
    assert!(rendered.to_lowercase().contains("refused"), "{rendered}");
}

#[tokio::test]
async fn silent_collector_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        // hold the connection open without answering
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let transport =
        HttpTransport::new(format!("http://{addr}/metric"), Duration::from_millis(200)).unwrap();
    let started = std::time::Instant::now();
    let err = transport.deliver(sample_window()).await.unwrap_err();

    match err {
        TransportError::Request(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(5));
}
