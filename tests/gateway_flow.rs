//! End-to-end tests for the gateway forward pipeline.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_gateway::config::{GatewayConfig, ServiceConfig};
use api_gateway::{GatewayServer, Shutdown};

mod common;

fn base_config(proxy_addr: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = proxy_addr.to_string();
    config.observability.metrics_enabled = false;
    config.timeouts.upstream_secs = 2;
    config
}

fn service(name: &str, backend_addr: SocketAddr) -> ServiceConfig {
    ServiceConfig {
        name: name.into(),
        endpoints: vec![format!("http://{}", backend_addr).parse().unwrap()],
    }
}

async fn start_gateway(config: GatewayConfig) -> Shutdown {
    let listener = tokio::net::TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let server = GatewayServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    shutdown
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn health_bypasses_forwarding() {
    let proxy_addr: SocketAddr = "127.0.0.1:28411".parse().unwrap();
    let shutdown = start_gateway(base_config(proxy_addr)).await;

    let res = client()
        .get(format!("http://{}/health", proxy_addr))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "status": "healthy" }));

    shutdown.trigger();
}

#[tokio::test]
async fn unknown_service_returns_404_naming_it() {
    let proxy_addr: SocketAddr = "127.0.0.1:28421".parse().unwrap();
    let shutdown = start_gateway(base_config(proxy_addr)).await;

    let res = client()
        .get(format!("http://{}/unknown-svc/foo", proxy_addr))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 404);
    assert!(res.text().await.unwrap().contains("unknown-svc"));

    shutdown.trigger();
}

#[tokio::test]
async fn forwards_and_relays_backend_status_verbatim() {
    let backend_addr: SocketAddr = "127.0.0.1:28431".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28432".parse().unwrap();

    common::start_programmable_backend(backend_addr, |head| async move {
        if head.starts_with("GET /ping") {
            (200, r#"{"msg":"pong"}"#.into())
        } else {
            (404, r#"{"detail":"no such route"}"#.into())
        }
    })
    .await;

    let mut config = base_config(proxy_addr);
    config.services.push(service("svc", backend_addr));
    let shutdown = start_gateway(config).await;

    let res = client()
        .get(format!("http://{}/svc/ping", proxy_addr))
        .send()
        .await
        .expect("gateway unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), r#"{"msg":"pong"}"#);

    // Backend error statuses pass through unchanged and never feed the
    // breaker: more consecutive 404s than the threshold still forward.
    for _ in 0..6 {
        let res = client()
            .get(format!("http://{}/svc/missing", proxy_addr))
            .send()
            .await
            .expect("gateway unreachable");
        assert_eq!(res.status(), 404);
        assert_eq!(res.text().await.unwrap(), r#"{"detail":"no such route"}"#);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn breaker_trips_after_consecutive_transport_failures() {
    // Nothing listens on the backend port: every forward is refused.
    let dead_addr: SocketAddr = "127.0.0.1:28441".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28442".parse().unwrap();

    let mut config = base_config(proxy_addr);
    config.services.push(service("svc", dead_addr));
    let shutdown = start_gateway(config).await;

    // Threshold (5) transport failures, each answered with the transport
    // error description
    for _ in 0..5 {
        let res = client()
            .get(format!("http://{}/svc/data", proxy_addr))
            .send()
            .await
            .expect("gateway unreachable");
        assert_eq!(res.status(), 503);
        assert!(res.text().await.unwrap().contains("connection failed"));
    }

    // Tripped: rejected without a network attempt
    let res = client()
        .get(format!("http://{}/svc/data", proxy_addr))
        .send()
        .await
        .expect("gateway unreachable");
    assert_eq!(res.status(), 503);
    assert!(res
        .text()
        .await
        .unwrap()
        .contains("temporarily unavailable"));

    shutdown.trigger();
}

#[tokio::test]
async fn forwarded_request_carries_gateway_trace_context() {
    let backend_addr: SocketAddr = "127.0.0.1:28451".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28452".parse().unwrap();

    let captured: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();
    common::start_programmable_backend(backend_addr, move |head| {
        let sink = sink.clone();
        async move {
            sink.lock().unwrap().push(head);
            (200, "{}".into())
        }
    })
    .await;

    let mut config = base_config(proxy_addr);
    config.services.push(service("svc", backend_addr));
    let shutdown = start_gateway(config).await;

    let res = client()
        .get(format!("http://{}/svc/echo?verbose=1", proxy_addr))
        .header(
            "traceparent",
            "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01",
        )
        .send()
        .await
        .expect("gateway unreachable");
    assert_eq!(res.status(), 200);
    // The request id layer stamps every response
    assert!(res.headers().get("x-request-id").is_some());

    let heads = captured.lock().unwrap();
    let head = heads.first().expect("backend saw no request").to_lowercase();

    // Path and query forwarded intact, service prefix stripped
    assert!(head.starts_with("get /echo?verbose=1"));
    // Same trace, but the gateway's own span replaces the caller's
    assert!(head.contains("traceparent: 00-0af7651916cd43dd8448eb211c80319c-"));
    assert!(!head.contains("b7ad6b7169203331"));
    // Request id travels to the backend too
    assert!(head.contains("x-request-id:"));

    shutdown.trigger();
}
