//! End-to-end poll tests over real HTTP.
//!
//! A small canned-response server stands in for the SnapRoute REST API, so the
//! collector runs through the production `reqwest` transport.
//!
//! ```bash
//! cargo test -p snapmon-core --test poll_cycle
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use snapmon_core::{
    Config, HttpDeviceApi, LineProtocolSink, MemorySink, MetricKind, PortMetricsCollector,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Routes = Arc<Mutex<HashMap<String, VecDeque<(u16, String)>>>>;

/// Serves queued `(status, body)` responses per request path.
struct FakeDevice {
    base_url: String,
    routes: Routes,
}

impl FakeDevice {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Routes = Arc::default();

        let server_routes = routes.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let routes = server_routes.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, routes).await;
                });
            }
        });

        Self { base_url: format!("http://{}/public/v1/", addr), routes }
    }

    fn respond(&self, path: &str, status: u16, body: impl Into<String>) {
        let mut routes = self.routes.lock().unwrap();
        routes
            .entry(format!("/public/v1/{}", path))
            .or_default()
            .push_back((status, body.into()));
    }

    fn collector(&self) -> PortMetricsCollector {
        let api = HttpDeviceApi::new(StdDuration::from_secs(2)).unwrap();
        PortMetricsCollector::new(self.base_url.clone(), api)
    }
}

async fn serve(mut stream: TcpStream, routes: Routes) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
    }

    let request = String::from_utf8_lossy(&request);
    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
    let (status, body) = routes
        .lock()
        .unwrap()
        .get_mut(&path)
        .and_then(VecDeque::pop_front)
        .unwrap_or((404, "not found".to_string()));

    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\n{}\r\n\r\n{}",
        status,
        body.len(),
        "Connection: close",
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn ports_body(counters: [i64; 7]) -> String {
    json!({
        "Objects": [
            {
                "ObjectId": "a1",
                "Object": {
                    "IntfRef": "fpPort1",
                    "IfIndex": 1,
                    "OperState": "UP",
                    "IfInDiscards": counters[0],
                    "IfOutDiscards": counters[1],
                    "IfEtherPkts": counters[2],
                    "IfEtherMCPkts": counters[3],
                    "IfEtherBcastPkts": counters[4],
                    "IfInOctets": counters[5],
                    "IfOutOctets": counters[6]
                }
            },
            {
                "ObjectId": "a2",
                "Object": { "IntfRef": "fpPort2", "IfIndex": 2, "OperState": "DOWN" }
            }
        ]
    })
    .to_string()
}

fn status_body(ready: bool) -> String {
    json!({ "ObjectId": "s", "Object": { "Ready": ready } }).to_string()
}

fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

#[tokio::test]
async fn test_two_polls_over_http() {
    let device = FakeDevice::start().await;
    device.respond("state/Ports", 200, ports_body([10, 20, 1000, 100, 50, 1000, 2000]));
    device.respond("state/SystemStatus", 200, status_body(true));
    device.respond("state/Ports", 200, ports_body([12, 25, 1100, 110, 60, 1500, 2500]));
    device.respond("state/SystemStatus", 200, status_body(true));

    let mut collector = device.collector();
    let mut sink = MemorySink::new();

    collector.gather_at(t0(), &mut sink).await.unwrap();
    assert_eq!(sink.measurement("ports").count(), 0);

    collector.gather_at(t0() + Duration::seconds(5), &mut sink).await.unwrap();

    let ports: Vec<_> = sink.measurement("ports").collect();
    assert_eq!(ports.len(), 7);
    assert!(ports.iter().all(|s| s.tag("port") == Some("fpPort1")));

    let in_octets = ports.iter().find(|s| s.field("in_octets").is_some()).unwrap();
    assert_eq!(in_octets.kind, MetricKind::Gauge);
    assert_eq!(in_octets.field("in_octets").and_then(|v| v.as_int()), Some(100));

    let discards = ports.iter().find(|s| s.field("discard_out").is_some()).unwrap();
    assert_eq!(discards.kind, MetricKind::Counter);
    assert_eq!(discards.field("discard_out").and_then(|v| v.as_int()), Some(5));

    assert_eq!(sink.measurement("status").count(), 2);
}

#[tokio::test]
async fn test_http_error_status_with_document_polls_normally() {
    let device = FakeDevice::start().await;
    device.respond("state/Ports", 503, r#"{"Objects": []}"#);
    device.respond("state/SystemStatus", 200, status_body(true));

    let mut collector = device.collector();
    let mut sink = MemorySink::new();
    collector.gather_at(t0(), &mut sink).await.unwrap();

    assert_eq!(sink.len(), 1);
    let status = sink.measurement("status").next().unwrap();
    assert_eq!(status.field("ready").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(collector.last_sample_time(), Some(t0()));
}

#[tokio::test]
async fn test_http_error_status_with_garbage_is_decode_failure() {
    let device = FakeDevice::start().await;
    device.respond("state/Ports", 503, "Service Unavailable");

    let mut collector = device.collector();
    let mut sink = MemorySink::new();
    let err = collector.gather_at(t0(), &mut sink).await.unwrap_err();

    assert!(err.is_decode());
    assert!(sink.is_empty());
    assert_eq!(collector.last_sample_time(), None);
}

#[tokio::test]
async fn test_unreachable_device() {
    // Reserve a port, then close it so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config { url: format!("http://{}/public/v1/", addr), ..Config::default() };
    let mut collector = PortMetricsCollector::from_config(&config).unwrap();
    let mut sink = MemorySink::new();

    let err = collector.gather(&mut sink).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(sink.measurement("ports").count(), 0);
    assert_eq!(sink.measurement("status").count(), 1);
}

#[tokio::test]
async fn test_garbled_status_keeps_port_samples() {
    let device = FakeDevice::start().await;
    device.respond("state/Ports", 200, ports_body([10, 20, 1000, 100, 0, 1000, 2000]));
    device.respond("state/SystemStatus", 200, "Service Unavailable");

    let mut collector = device.collector();
    let mut sink = MemorySink::new();
    let err = collector.gather_at(t0(), &mut sink).await.unwrap_err();

    assert!(err.is_decode());
    let ports: Vec<_> = sink.measurement("ports").collect();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].field("sent_bc").and_then(|v| v.as_int()), Some(0));
    assert_eq!(sink.measurement("status").count(), 0);
}

#[tokio::test]
async fn test_line_protocol_output() {
    let device = FakeDevice::start().await;
    device.respond("state/Ports", 200, ports_body([10, 20, 1000, 100, 50, 1000, 2000]));
    device.respond("state/SystemStatus", 200, status_body(true));
    device.respond("state/Ports", 200, ports_body([10, 20, 1000, 100, 50, 1000, 2000]));
    device.respond("state/SystemStatus", 200, status_body(false));

    let mut collector = device.collector();
    let mut sink = LineProtocolSink::new(Vec::new());
    collector.gather_at(t0(), &mut sink).await.unwrap();
    collector.gather_at(t0() + Duration::seconds(10), &mut sink).await.unwrap();

    let out = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    let ts = (t0() + Duration::seconds(10)).timestamp_nanos_opt().unwrap();

    assert_eq!(lines.first(), Some(&"status ready=true 1700000000000000000"));
    assert!(lines.contains(&format!("ports,port=fpPort1 sent=0i {}", ts).as_str()));
    assert!(lines.contains(&format!("ports,port=fpPort1 discard_in=0i {}", ts).as_str()));
    assert_eq!(lines.last(), Some(&format!("status ready=false {}", ts).as_str()));
}
