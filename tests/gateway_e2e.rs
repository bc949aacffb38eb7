//! End-to-end tests for the gateway pipeline.

use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use api_gateway::config::{GatewayConfig, RouteConfig};
use api_gateway::{GatewayServer, Shutdown};
use serde::Serialize;

mod common;

fn route(prefix: &str, target: &str, auth_required: bool, rate_limited: bool) -> RouteConfig {
    RouteConfig {
        prefix: prefix.into(),
        target: target.into(),
        auth_required,
        rate_limited,
    }
}

async fn spawn_gateway(config: GatewayConfig, addr: SocketAddr) -> Shutdown {
    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    exp: u64,
}

fn bearer(secret: &str, sub: &str) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 600;
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &TestClaims {
            sub: sub.into(),
            exp,
        },
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let proxy_addr: SocketAddr = "127.0.0.1:28401".parse().unwrap();

    let mut config = GatewayConfig::default();
    config
        .routes
        .push(route("/api", "http://127.0.0.1:28499", false, false));

    let shutdown = spawn_gateway(config, proxy_addr).await;

    let res = client()
        .get(format!("http://{proxy_addr}/unknown"))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 404);
    assert!(res.headers().contains_key("x-request-id"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"error": "Route not found"}));

    shutdown.trigger();
}

#[tokio::test]
async fn missing_authorization_rejected() {
    let proxy_addr: SocketAddr = "127.0.0.1:28402".parse().unwrap();

    let mut config = GatewayConfig::default();
    config.auth.jwt_secret = "e2e-secret".into();
    config
        .routes
        .push(route("/secure", "http://127.0.0.1:28498", true, false));

    let shutdown = spawn_gateway(config, proxy_addr).await;

    let res = client()
        .get(format!("http://{proxy_addr}/secure/data"))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 401);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["message"], "missing authorization");

    shutdown.trigger();
}

#[tokio::test]
async fn valid_token_reaches_backend() {
    let backend_addr: SocketAddr = "127.0.0.1:28411".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28412".parse().unwrap();

    common::start_backend(backend_addr, 200, "hello from backend").await;

    let mut config = GatewayConfig::default();
    config.auth.jwt_secret = "e2e-secret".into();
    config.routes.push(route(
        "/svc",
        &format!("http://{backend_addr}"),
        true,
        false,
    ));

    let shutdown = spawn_gateway(config, proxy_addr).await;

    let res = client()
        .get(format!("http://{proxy_addr}/svc/hello"))
        .header("Authorization", bearer("e2e-secret", "alice"))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "hello from backend");

    shutdown.trigger();
}

#[tokio::test]
async fn invalid_token_rejected() {
    let proxy_addr: SocketAddr = "127.0.0.1:28413".parse().unwrap();

    let mut config = GatewayConfig::default();
    config.auth.jwt_secret = "e2e-secret".into();
    config
        .routes
        .push(route("/secure", "http://127.0.0.1:28498", true, false));

    let shutdown = spawn_gateway(config, proxy_addr).await;

    let res = client()
        .get(format!("http://{proxy_addr}/secure/data"))
        .header("Authorization", bearer("wrong-secret", "mallory"))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 401);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "invalid or expired token");

    shutdown.trigger();
}

#[tokio::test]
async fn rate_limit_exhaustion_within_window() {
    let backend_addr: SocketAddr = "127.0.0.1:28421".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28422".parse().unwrap();

    common::start_backend(backend_addr, 200, "ok").await;

    let mut config = GatewayConfig::default();
    config.routes.push(route(
        "/items",
        &format!("http://{backend_addr}"),
        false,
        true,
    ));

    let shutdown = spawn_gateway(config, proxy_addr).await;
    let client = client();

    for i in 0..10 {
        let res = client
            .get(format!("http://{proxy_addr}/items"))
            .send()
            .await
            .expect("Gateway unreachable");
        assert_eq!(res.status(), 200, "request {i} should pass");
        assert_eq!(
            res.headers().get("x-ratelimit-limit").unwrap(),
            "10",
            "rate-limit headers are present on allowed responses"
        );
        assert_eq!(
            res.headers()
                .get("x-ratelimit-remaining")
                .unwrap()
                .to_str()
                .unwrap(),
            (9 - i).to_string()
        );
    }

    let res = client
        .get(format!("http://{proxy_addr}/items"))
        .send()
        .await
        .expect("Gateway unreachable");
    assert_eq!(res.status(), 429);
    assert_eq!(res.headers().get("x-ratelimit-remaining").unwrap(), "0");
    let reset: u64 = res
        .headers()
        .get("x-ratelimit-reset")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(reset > 0);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Too Many Requests");

    shutdown.trigger();
}

#[tokio::test]
async fn forwarded_header_separates_clients() {
    let backend_addr: SocketAddr = "127.0.0.1:28423".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28424".parse().unwrap();

    common::start_backend(backend_addr, 200, "ok").await;

    let mut config = GatewayConfig::default();
    config.routes.push(route(
        "/items",
        &format!("http://{backend_addr}"),
        false,
        true,
    ));

    let shutdown = spawn_gateway(config, proxy_addr).await;
    let client = client();

    for _ in 0..10 {
        let res = client
            .get(format!("http://{proxy_addr}/items"))
            .header("X-Forwarded-For", "203.0.113.7")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }
    let res = client
        .get(format!("http://{proxy_addr}/items"))
        .header("X-Forwarded-For", "203.0.113.7")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 429, "first client is exhausted");

    let res = client
        .get(format!("http://{proxy_addr}/items"))
        .header("X-Forwarded-For", "203.0.113.8")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200, "second client has its own window");

    shutdown.trigger();
}

#[tokio::test]
async fn circuit_breaker_fails_fast_after_failures() {
    // Nothing listens on the backend port: every forward is a transport
    // failure.
    let proxy_addr: SocketAddr = "127.0.0.1:28431".parse().unwrap();

    let mut config = GatewayConfig::default();
    config
        .routes
        .push(route("/flaky", "http://127.0.0.1:28497", false, true));

    let shutdown = spawn_gateway(config, proxy_addr).await;
    let client = client();

    for i in 0..3 {
        let res = client
            .get(format!("http://{proxy_addr}/flaky"))
            .send()
            .await
            .expect("Gateway unreachable");
        assert_eq!(res.status(), 502, "failure {i} reaches the backend");
    }

    // Within the reset timeout: fail fast, no backend contact.
    let res = client
        .get(format!("http://{proxy_addr}/flaky"))
        .send()
        .await
        .expect("Gateway unreachable");
    assert_eq!(res.status(), 503);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Service Unavailable");
    assert_eq!(body["message"], "circuit breaker is open");

    shutdown.trigger();
}

#[tokio::test]
async fn backend_status_passes_through_untouched() {
    let backend_addr: SocketAddr = "127.0.0.1:28441".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28442".parse().unwrap();

    common::start_backend(backend_addr, 418, "short and stout").await;

    let mut config = GatewayConfig::default();
    config.routes.push(route(
        "/tea",
        &format!("http://{backend_addr}"),
        false,
        true,
    ));

    let shutdown = spawn_gateway(config, proxy_addr).await;
    let client = client();

    // A 4xx from the backend is a successful proxy operation; repeating it
    // past the failure threshold must not trip the breaker.
    for _ in 0..4 {
        let res = client
            .get(format!("http://{proxy_addr}/tea"))
            .send()
            .await
            .expect("Gateway unreachable");
        assert_eq!(res.status(), 418);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn path_rewrite_and_request_id_propagation() {
    let backend_addr: SocketAddr = "127.0.0.1:28451".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28452".parse().unwrap();

    common::start_programmable_backend(backend_addr, |head| {
        let path = common::request_path(head);
        let request_id = common::request_header(head, "x-request-id").unwrap_or_default();
        (200, format!("{path}|{request_id}"))
    })
    .await;

    let mut config = GatewayConfig::default();
    config.routes.push(route(
        "/products",
        &format!("http://{backend_addr}"),
        false,
        false,
    ));

    let shutdown = spawn_gateway(config, proxy_addr).await;

    let res = client()
        .get(format!("http://{proxy_addr}/products/item/10?full=1"))
        .header("X-Request-Id", "e2e-fixed-id")
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("x-request-id").unwrap(), "e2e-fixed-id");
    assert_eq!(res.text().await.unwrap(), "/item/10?full=1|e2e-fixed-id");

    shutdown.trigger();
}

#[tokio::test]
async fn unprotected_route_has_no_rate_headers() {
    let backend_addr: SocketAddr = "127.0.0.1:28461".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28462".parse().unwrap();

    common::start_backend(backend_addr, 200, "ok").await;

    let mut config = GatewayConfig::default();
    config.routes.push(route(
        "/open",
        &format!("http://{backend_addr}"),
        false,
        false,
    ));

    let shutdown = spawn_gateway(config, proxy_addr).await;

    let res = client()
        .get(format!("http://{proxy_addr}/open"))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("x-ratelimit-limit").is_none());
    assert!(res.headers().contains_key("x-request-id"));

    shutdown.trigger();
}
